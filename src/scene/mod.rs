//! Scene-delegate collaborator interfaces.
//!
//! The rendering subsystem pulls authored attribute values from a scene
//! delegate: per-entity fetch by (path, attribute name) with an explicit
//! default-if-absent policy, a render index for sibling entity lookup and
//! subtree queries, and a change tracker for collection invalidation. The
//! delegate itself lives outside this crate; [`SceneDelegate`] is the
//! narrow seam it is consumed through, and [`RenderIndex`] /
//! [`ChangeTracker`] are the concrete registries the draw-target machinery
//! works against.

use parking_lot::{Mutex, RwLock};
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::draw_target::{AttachmentDescList, DrawTarget};
use crate::types::Extent2d;

/// Hierarchical identity of a scene entity, e.g. `/scene/shadow_target`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ScenePath(String);

impl ScenePath {
    /// Create a path.
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    /// The absolute root path.
    pub fn root() -> Self {
        Self("/".to_string())
    }

    /// Returns true for the empty (unset) path.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Append a property name, e.g. `/target` + `color` = `/target.color`.
    pub fn append_property(&self, name: &str) -> Self {
        Self(format!("{}.{name}", self.0))
    }

    /// Returns true if `self` is `prefix` or a descendant of it.
    pub fn has_prefix(&self, prefix: &ScenePath) -> bool {
        if prefix.0 == "/" {
            return true;
        }
        self.0 == prefix.0
            || self
                .0
                .strip_prefix(&prefix.0)
                .is_some_and(|rest| rest.starts_with('/'))
    }

    /// The path as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ScenePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A named collection of renderable entities gathered by a render pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Collection {
    name: String,
    root: ScenePath,
}

impl Collection {
    /// Create a collection rooted at the absolute root.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            root: ScenePath::root(),
        }
    }

    /// Collection name, used for change tracking.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Root of the subtree the collection gathers.
    pub fn root(&self) -> &ScenePath {
        &self.root
    }
}

/// A camera entity referenced by draw targets.
#[derive(Debug, Clone)]
pub struct Camera {
    id: ScenePath,
    view_matrix: glam::Mat4,
    projection_matrix: glam::Mat4,
}

impl Camera {
    /// Create a camera with explicit matrices.
    pub fn new(id: ScenePath, view_matrix: glam::Mat4, projection_matrix: glam::Mat4) -> Self {
        Self {
            id,
            view_matrix,
            projection_matrix,
        }
    }

    /// Camera entity path.
    pub fn id(&self) -> &ScenePath {
        &self.id
    }

    /// World-to-view matrix.
    pub fn view_matrix(&self) -> glam::Mat4 {
        self.view_matrix
    }

    /// Projection matrix.
    pub fn projection_matrix(&self) -> glam::Mat4 {
        self.projection_matrix
    }
}

/// A typed attribute value returned by the scene delegate.
///
/// Absent attributes come back as [`Value::Empty`]; the `*_or` accessors
/// apply the caller's default-if-absent policy.
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// The attribute is not authored.
    #[default]
    Empty,
    /// Boolean value.
    Bool(bool),
    /// Float value.
    Float(f32),
    /// Entity path value.
    Path(ScenePath),
    /// 2D extent value.
    Extent(Extent2d),
    /// Draw-target attachment descriptors.
    Attachments(AttachmentDescList),
    /// Render collections.
    Collections(Vec<Collection>),
}

impl Value {
    /// Boolean value, or `default` when absent or mistyped.
    pub fn bool_or(&self, default: bool) -> bool {
        match self {
            Self::Bool(value) => *value,
            _ => default,
        }
    }

    /// Float value, or `default` when absent or mistyped.
    pub fn float_or(&self, default: f32) -> f32 {
        match self {
            Self::Float(value) => *value,
            _ => default,
        }
    }

    /// Extent value, or `default` when absent or mistyped.
    pub fn extent_or(&self, default: Extent2d) -> Extent2d {
        match self {
            Self::Extent(value) => *value,
            _ => default,
        }
    }

    /// Path value, if present.
    pub fn path(&self) -> Option<&ScenePath> {
        match self {
            Self::Path(value) => Some(value),
            _ => None,
        }
    }

    /// Attachment descriptors, or an empty list when absent.
    pub fn attachments_or_default(&self) -> AttachmentDescList {
        match self {
            Self::Attachments(value) => value.clone(),
            _ => AttachmentDescList::default(),
        }
    }

    /// Collections, or an empty slice when absent.
    pub fn collections(&self) -> &[Collection] {
        match self {
            Self::Collections(value) => value,
            _ => &[],
        }
    }
}

/// Tracks invalidation of named collections.
///
/// Versions start at 0 and bump on every `mark_collection_dirty`; render
/// passes compare versions to decide whether to regather.
#[derive(Debug, Default)]
pub struct ChangeTracker {
    collection_versions: Mutex<HashMap<String, u64>>,
}

impl ChangeTracker {
    /// Mark the named collection dirty.
    pub fn mark_collection_dirty(&self, name: &str) {
        let mut versions = self.collection_versions.lock();
        *versions.entry(name.to_string()).or_insert(0) += 1;
    }

    /// Current version of the named collection.
    pub fn collection_version(&self, name: &str) -> u64 {
        self.collection_versions.lock().get(name).copied().unwrap_or(0)
    }
}

/// Registry of render-index entities, by type.
#[derive(Debug, Default)]
pub struct RenderIndex {
    cameras: RwLock<HashMap<ScenePath, Arc<Camera>>>,
    draw_targets: RwLock<HashMap<ScenePath, Arc<RwLock<DrawTarget>>>>,
    change_tracker: ChangeTracker,
}

impl RenderIndex {
    /// Create an empty render index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a camera entity.
    pub fn insert_camera(&self, camera: Arc<Camera>) {
        self.cameras.write().insert(camera.id().clone(), camera);
    }

    /// Look up a camera entity by path.
    pub fn camera(&self, id: &ScenePath) -> Option<Arc<Camera>> {
        self.cameras.read().get(id).cloned()
    }

    /// Register a draw-target entity.
    pub fn insert_draw_target(&self, id: ScenePath, draw_target: Arc<RwLock<DrawTarget>>) {
        self.draw_targets.write().insert(id, draw_target);
    }

    /// Look up a draw-target entity by path.
    pub fn draw_target(&self, id: &ScenePath) -> Option<Arc<RwLock<DrawTarget>>> {
        self.draw_targets.read().get(id).cloned()
    }

    /// All draw targets under `root`, in path order.
    pub fn draw_target_subtree(&self, root: &ScenePath) -> Vec<Arc<RwLock<DrawTarget>>> {
        let draw_targets = self.draw_targets.read();
        let mut entries: Vec<_> = draw_targets
            .iter()
            .filter(|(id, _)| id.has_prefix(root))
            .collect();
        entries.sort_by(|(a, _), (b, _)| a.cmp(b));
        entries.into_iter().map(|(_, dt)| dt.clone()).collect()
    }

    /// The change tracker for collection invalidation.
    pub fn change_tracker(&self) -> &ChangeTracker {
        &self.change_tracker
    }
}

/// The scene-delegate seam: per-entity attribute fetch plus render-index
/// access.
pub trait SceneDelegate: Send + Sync {
    /// Fetch an attribute value; [`Value::Empty`] when not authored.
    fn get(&self, id: &ScenePath, attribute: &str) -> Value;

    /// The render index this delegate populates.
    fn render_index(&self) -> &RenderIndex;
}

static_assertions::assert_impl_all!(RenderIndex: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_prefix() {
        let root = ScenePath::root();
        let target = ScenePath::new("/scene/target");
        assert!(target.has_prefix(&root));
        assert!(target.has_prefix(&ScenePath::new("/scene")));
        assert!(target.has_prefix(&target));
        assert!(!target.has_prefix(&ScenePath::new("/scene/tar")));
        assert!(!ScenePath::new("/other").has_prefix(&ScenePath::new("/scene")));
    }

    #[test]
    fn test_append_property() {
        let path = ScenePath::new("/target").append_property("color");
        assert_eq!(path.as_str(), "/target.color");
    }

    #[test]
    fn test_value_defaults() {
        assert!(Value::Empty.bool_or(true));
        assert!(!Value::Bool(false).bool_or(true));
        assert_eq!(Value::Empty.float_or(1.0), 1.0);
        assert!(Value::Empty.path().is_none());
        assert!(Value::Empty.collections().is_empty());
    }

    #[test]
    fn test_change_tracker_versions() {
        let tracker = ChangeTracker::default();
        assert_eq!(tracker.collection_version("shadow"), 0);
        tracker.mark_collection_dirty("shadow");
        tracker.mark_collection_dirty("shadow");
        assert_eq!(tracker.collection_version("shadow"), 2);
        assert_eq!(tracker.collection_version("picking"), 0);
    }
}
