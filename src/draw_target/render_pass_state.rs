//! Per-draw-target render pass state.

use crate::scene::{Collection, ScenePath};
use crate::types::ClearValue;

/// The render-pass configuration a draw target hands to pass orchestration:
/// camera, clear values and the collection to gather.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderPassState {
    camera_id: ScenePath,
    depth_clear_value: f32,
    color_clear_values: Vec<ClearValue>,
    collection: Option<Collection>,
}

impl Default for RenderPassState {
    fn default() -> Self {
        Self {
            camera_id: ScenePath::default(),
            depth_clear_value: 1.0,
            color_clear_values: Vec::new(),
            collection: None,
        }
    }
}

impl RenderPassState {
    /// Create the default state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the camera the pass renders from.
    pub fn set_camera(&mut self, camera_id: ScenePath) {
        self.camera_id = camera_id;
    }

    /// The camera the pass renders from.
    pub fn camera(&self) -> &ScenePath {
        &self.camera_id
    }

    /// Set the depth clear value.
    pub fn set_depth_clear_value(&mut self, value: f32) {
        self.depth_clear_value = value;
    }

    /// The depth clear value.
    pub fn depth_clear_value(&self) -> f32 {
        self.depth_clear_value
    }

    /// Resize the per-attachment clear value list, preserving existing
    /// entries.
    pub fn set_num_color_clear_values(&mut self, count: usize) {
        self.color_clear_values.resize(count, ClearValue::None);
    }

    /// Set one attachment's clear value.
    pub fn set_color_clear_value(&mut self, index: usize, value: ClearValue) {
        if let Some(slot) = self.color_clear_values.get_mut(index) {
            *slot = value;
        } else {
            log::warn!(
                "color clear index {index} out of range ({})",
                self.color_clear_values.len()
            );
        }
    }

    /// The per-attachment clear values.
    pub fn color_clear_values(&self) -> &[ClearValue] {
        &self.color_clear_values
    }

    /// Set the collection the pass gathers.
    pub fn set_collection(&mut self, collection: Collection) {
        self.collection = Some(collection);
    }

    /// The collection the pass gathers, if assigned.
    pub fn collection(&self) -> Option<&Collection> {
        self.collection.as_ref()
    }
}
