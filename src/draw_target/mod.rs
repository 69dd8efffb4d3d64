//! Offscreen draw targets.
//!
//! A [`DrawTarget`] is a long-lived scene entity owning a GPU framebuffer,
//! its attachment textures, a camera reference and a render-pass state. It
//! reacts to per-field dirty bits from the scene delegate: attachment
//! changes rebuild the framebuffer and re-register texture resources,
//! resolution changes resize in place, and the remaining categories update
//! single fields. Auxiliary passes (shadow maps, picking buffers) render
//! into draw targets and sample their attachments through the shared
//! texture-resource registry.

mod attachment;
mod render_pass_state;
pub mod texture_resource;

pub use attachment::{AttachmentDesc, AttachmentDescList, Framebuffer, FramebufferAttachment};
pub use render_pass_state::RenderPassState;
pub use texture_resource::{DrawTargetTextureResource, TextureResourceId};

use bitflags::bitflags;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

use crate::backend::GpuBackend;
use crate::context::{self, GpuContext, ScopedContext};
use crate::scene::{Collection, RenderIndex, SceneDelegate, ScenePath};
use crate::types::{Extent2d, TextureFormat};

/// Attribute names the draw target fetches from the scene delegate.
pub mod tokens {
    /// Enabled flag; optional, defaults to true.
    pub const ENABLE: &str = "enable";
    /// Camera entity path.
    pub const CAMERA: &str = "camera";
    /// Framebuffer resolution.
    pub const RESOLUTION: &str = "resolution";
    /// Attachment descriptor list.
    pub const ATTACHMENTS: &str = "attachments";
    /// Depth clear value; optional, defaults to 1.0.
    pub const DEPTH_CLEAR_VALUE: &str = "depth_clear_value";
    /// Render collection list.
    pub const COLLECTION: &str = "collection";
    /// Name of the implicit depth attachment.
    pub const DEPTH_ATTACHMENT_NAME: &str = "depth";
}

bitflags! {
    /// Dirty-bit categories driving [`DrawTarget::sync`].
    ///
    /// Checked and cleared as a batch at the end of a synchronization
    /// pass.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct DrawTargetDirty: u32 {
        /// Enabled flag changed.
        const ENABLE = 1 << 0;
        /// Camera reference changed.
        const CAMERA = 1 << 1;
        /// Resolution changed.
        const RESOLUTION = 1 << 2;
        /// Attachment set changed.
        const ATTACHMENT = 1 << 3;
        /// Depth clear value changed.
        const DEPTH_CLEAR_VALUE = 1 << 4;
        /// Collection list changed.
        const COLLECTION = 1 << 5;
    }
}

/// An offscreen render destination: a depth attachment plus zero or more
/// color attachments, resident on a shared GPU context.
pub struct DrawTarget {
    id: ScenePath,
    backend: Arc<dyn GpuBackend>,
    // Clients tracking attachment identity start at 0.
    version: u64,
    enabled: bool,
    camera_id: ScenePath,
    resolution: Extent2d,
    collections: Vec<Collection>,
    render_pass_state: RenderPassState,
    context: Option<Arc<GpuContext>>,
    framebuffer: Option<Framebuffer>,
    color_texture_resources: Vec<Arc<DrawTargetTextureResource>>,
    depth_texture_resource: Option<Arc<DrawTargetTextureResource>>,
}

impl DrawTarget {
    /// Create the draw target for a scene entity.
    ///
    /// The framebuffer and attachments are created lazily by the first
    /// [`DrawTarget::sync`]; the initial dirty mask requests everything.
    pub fn new(id: ScenePath, backend: Arc<dyn GpuBackend>) -> Self {
        Self {
            id,
            backend,
            version: 1,
            enabled: true,
            camera_id: ScenePath::default(),
            resolution: Extent2d::default(),
            collections: Vec::new(),
            render_pass_state: RenderPassState::new(),
            context: None,
            framebuffer: None,
            color_texture_resources: Vec::new(),
            depth_texture_resource: None,
        }
    }

    /// The dirty mask a freshly inserted draw target starts with.
    pub fn initial_dirty_bits() -> DrawTargetDirty {
        DrawTargetDirty::all()
    }

    /// Entity path of this draw target.
    pub fn id(&self) -> &ScenePath {
        &self.id
    }

    /// Version counter, incremented whenever the framebuffer or its
    /// attachment set is recreated or resized.
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Whether the draw target participates in rendering.
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// The referenced camera entity.
    pub fn camera_id(&self) -> &ScenePath {
        &self.camera_id
    }

    /// Current resolution.
    pub fn resolution(&self) -> Extent2d {
        self.resolution
    }

    /// The render-pass state handed to pass orchestration.
    pub fn render_pass_state(&self) -> &RenderPassState {
        &self.render_pass_state
    }

    /// The live framebuffer, if configured.
    pub fn framebuffer(&self) -> Option<&Framebuffer> {
        self.framebuffer.as_ref()
    }

    /// The assigned collections.
    pub fn collections(&self) -> &[Collection] {
        &self.collections
    }

    /// Pull dirty attribute values from the scene delegate and reconfigure.
    ///
    /// Every transition clears its dirty bit; the whole mask is cleared on
    /// return.
    pub fn sync(&mut self, delegate: &dyn SceneDelegate, dirty_bits: &mut DrawTargetDirty) {
        let bits = *dirty_bits;

        if bits.contains(DrawTargetDirty::ENABLE) {
            // Optional attribute.
            self.enabled = delegate.get(&self.id, tokens::ENABLE).bool_or(true);
        }

        if bits.contains(DrawTargetDirty::CAMERA) {
            self.camera_id = delegate
                .get(&self.id, tokens::CAMERA)
                .path()
                .cloned()
                .unwrap_or_default();
            self.render_pass_state.set_camera(self.camera_id.clone());
        }

        if bits.contains(DrawTargetDirty::RESOLUTION) {
            self.resolution = delegate
                .get(&self.id, tokens::RESOLUTION)
                .extent_or(self.resolution);

            // No point resizing textures that are about to be recreated.
            if self.framebuffer.is_some() && !bits.contains(DrawTargetDirty::ATTACHMENT) {
                self.resize_framebuffer();
            }
        }

        if bits.contains(DrawTargetDirty::ATTACHMENT) {
            // Depends on resolution being set correctly.
            let attachments = delegate
                .get(&self.id, tokens::ATTACHMENTS)
                .attachments_or_default();
            self.set_attachments(&attachments);
        }

        if bits.contains(DrawTargetDirty::DEPTH_CLEAR_VALUE) {
            let value = delegate
                .get(&self.id, tokens::DEPTH_CLEAR_VALUE)
                .float_or(1.0);
            self.render_pass_state.set_depth_clear_value(value);
        }

        if bits.contains(DrawTargetDirty::COLLECTION) {
            let value = delegate.get(&self.id, tokens::COLLECTION);
            let collections = value.collections();
            self.collections = collections.to_vec();

            let change_tracker = delegate.render_index().change_tracker();
            for collection in collections {
                change_tracker.mark_collection_dirty(collection.name());
            }

            if !collections.is_empty() {
                // Each collection needs its own render pass; until passes
                // multiplex clear state, only one is supported.
                if collections.len() != 1 {
                    log::error!(
                        "draw target {} supports only a single collection, got {}; using the first",
                        self.id,
                        collections.len()
                    );
                }
                self.render_pass_state
                    .set_collection(collections[0].clone());
            }
        }

        *dirty_bits = DrawTargetDirty::empty();
    }

    /// Write the named attachment's contents to an image file.
    ///
    /// Reports missing framebuffer, attachment or camera with a warning and
    /// a false return, leaving all state untouched.
    pub fn write_to_file(
        &self,
        render_index: &RenderIndex,
        attachment_name: &str,
        path: &Path,
    ) -> bool {
        // Check the draw target has been allocated.
        let (Some(framebuffer), Some(context)) = (&self.framebuffer, &self.context) else {
            log::warn!("missing draw target for {}", self.id);
            return false;
        };
        let Some(attachment) = framebuffer.attachment(attachment_name) else {
            log::warn!("missing attachment {attachment_name:?} on {}", self.id);
            return false;
        };
        let Some(camera) = render_index.camera(&self.camera_id) else {
            log::warn!("missing camera {} for {}", self.camera_id, self.id);
            return false;
        };

        // Camera matrices ride along as image metadata.
        log::debug!(
            "writing {attachment_name:?} of {} (view {:?}, projection {:?})",
            self.id,
            camera.view_matrix(),
            camera.projection_matrix()
        );

        let _ctx = ScopedContext::make_current(context.clone());

        let size = framebuffer.size();
        let Some(bytes) = framebuffer.read_attachment(attachment_name) else {
            return false;
        };

        let image = match attachment.format() {
            TextureFormat::Rgba8Unorm => image::RgbaImage::from_raw(size.width, size.height, bytes)
                .map(image::DynamicImage::ImageRgba8),
            TextureFormat::R8Unorm => image::GrayImage::from_raw(size.width, size.height, bytes)
                .map(image::DynamicImage::ImageLuma8),
            TextureFormat::Depth32Float => {
                let depths: Vec<f32> = bytemuck::pod_collect_to_vec(&bytes[..]);
                let pixels: Vec<u8> = depths
                    .iter()
                    .map(|d| (d.clamp(0.0, 1.0) * 255.0) as u8)
                    .collect();
                image::GrayImage::from_raw(size.width, size.height, pixels)
                    .map(image::DynamicImage::ImageLuma8)
            }
            format => {
                log::warn!("attachment format {format:?} has no file representation");
                return false;
            }
        };

        let Some(image) = image else {
            log::warn!("attachment {attachment_name:?} readback has unexpected size");
            return false;
        };
        if let Err(error) = image.save(path) {
            log::warn!("failed to write {}: {error}", path.display());
            return false;
        }
        true
    }

    /// All draw targets registered in the render index, in path order.
    pub fn collect(render_index: &RenderIndex) -> Vec<Arc<RwLock<DrawTarget>>> {
        render_index.draw_target_subtree(&ScenePath::root())
    }

    fn set_attachments(&mut self, attachments: &AttachmentDescList) {
        let context = match &self.context {
            Some(context) => context.clone(),
            None => {
                // Adopt one of the shared contexts as the master.
                let context = context::shared();
                self.context = Some(context.clone());
                context
            }
        };

        // Old texture resources are dropped here; the registry keeps the
        // keyed objects alive for reuse below.
        self.color_texture_resources.clear();
        self.depth_texture_resource = None;

        // All framebuffer operations happen on the draw target's context.
        let _ctx = ScopedContext::make_current(context);

        // Discard the old framebuffer and build a new one at the current
        // resolution.
        let mut framebuffer = Framebuffer::new(self.backend.clone(), self.resolution);
        self.render_pass_state
            .set_num_color_clear_values(attachments.len());

        for (index, desc) in attachments.attachments().iter().enumerate() {
            let texture = match framebuffer.add_attachment(&desc.name, desc.format) {
                Ok(texture) => texture,
                Err(error) => {
                    log::warn!("skipping attachment {:?} on {}: {error}", desc.name, self.id);
                    continue;
                }
            };
            self.render_pass_state
                .set_color_clear_value(index, desc.clear_color);

            let resource = texture_resource::register_or_create(
                TextureResourceId::for_attachment(&self.id, &desc.name),
            );
            resource.set_attachment(texture);
            resource.set_sampler(desc.sampler);
            self.color_texture_resources.push(resource);
        }

        // The depth attachment must be added last or attachment indexing
        // breaks.
        match framebuffer.add_attachment(tokens::DEPTH_ATTACHMENT_NAME, TextureFormat::Depth32Float)
        {
            Ok(texture) => {
                let resource = texture_resource::register_or_create(
                    TextureResourceId::for_attachment(&self.id, tokens::DEPTH_ATTACHMENT_NAME),
                );
                resource.set_attachment(texture);
                resource.set_sampler(attachments.depth_sampler());
                self.depth_texture_resource = Some(resource);
            }
            Err(error) => {
                log::warn!("failed to add depth attachment on {}: {error}", self.id);
            }
        }

        self.framebuffer = Some(framebuffer);

        // The texture bindings have changed.
        self.version += 1;
    }

    fn resize_framebuffer(&mut self) {
        let Some(context) = self.context.clone() else {
            return;
        };
        let _ctx = ScopedContext::make_current(context);

        if let Some(framebuffer) = &mut self.framebuffer {
            framebuffer.set_size(self.resolution);
        }

        // The texture bindings might have changed.
        self.version += 1;
    }
}

impl std::fmt::Debug for DrawTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DrawTarget")
            .field("id", &self.id)
            .field("version", &self.version)
            .field("enabled", &self.enabled)
            .field("resolution", &self.resolution)
            .field("configured", &self.framebuffer.is_some())
            .finish()
    }
}

static_assertions::assert_impl_all!(DrawTarget: Send, Sync);
