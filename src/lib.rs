//! # Prism Graphics
//!
//! Mesh quadrangulation and offscreen draw-target management for the Prism
//! rendering engine.
//!
//! ## Overview
//!
//! This crate provides:
//! - [`mesh`] - Mesh topology and the quadrangulation computation graph
//!   (CPU and GPU paths producing identical results)
//! - [`draw_target`] - Offscreen framebuffers with attachment textures,
//!   driven by scene-delegate dirty bits
//! - [`backend`] - GPU backend abstraction with a software implementation
//! - [`computation`] - The buffer-source interfaces the external
//!   computation-graph scheduler dispatches through
//!
//! ## Example
//!
//! ```ignore
//! use prism_graphics::mesh::quadrangulate::{QuadInfoBuilder, QuadIndexBuilder};
//!
//! let quad_info = Arc::new(QuadInfoBuilder::new(Some(topology.clone()), id.clone()));
//! let indices = QuadIndexBuilder::new(Some(topology), quad_info.clone(), id);
//! quad_info.resolve();
//! indices.resolve();
//! ```

pub mod backend;
pub mod computation;
pub mod context;
pub mod draw_target;
pub mod error;
pub mod mesh;
pub mod scene;
pub mod types;

// Re-export main types for convenience
pub use backend::{create_backend, GpuBackend};
pub use computation::{BufferArrayRange, BufferData, BufferSource, GpuComputation};
pub use draw_target::{AttachmentDesc, AttachmentDescList, DrawTarget, DrawTargetDirty};
pub use error::RenderError;
pub use mesh::{MeshTopology, QuadInfo};
pub use scene::{RenderIndex, SceneDelegate, ScenePath, Value};
pub use types::{
    BufferSpec, ClearValue, ElementType, Extent2d, SamplerDescriptor, TextureFormat, TextureUsage,
};

/// Graphics library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Initialize the graphics subsystem.
///
/// This should be called before using any graphics functionality.
pub fn init() {
    log::info!("Prism Graphics v{VERSION} initialized");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }

    #[test]
    fn test_create_backend() {
        let backend = create_backend().unwrap();
        assert_eq!(backend.name(), "Software");
    }
}
