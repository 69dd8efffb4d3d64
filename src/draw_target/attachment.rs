//! Draw-target attachment descriptors and the framebuffer they configure.

use std::sync::Arc;

use crate::backend::{GpuBackend, GpuTexture};
use crate::error::RenderError;
use crate::types::{
    ClearValue, Extent2d, SamplerDescriptor, TextureDescriptor, TextureFormat, TextureUsage,
};

/// Description of one authored color attachment.
#[derive(Debug, Clone, PartialEq)]
pub struct AttachmentDesc {
    /// Attachment name, unique within the draw target.
    pub name: String,
    /// Abstract pixel format.
    pub format: TextureFormat,
    /// Clear value applied at the start of the pass.
    pub clear_color: ClearValue,
    /// Sampler state for passes that read the attachment back.
    pub sampler: SamplerDescriptor,
}

impl AttachmentDesc {
    /// Create an attachment description.
    pub fn new(name: impl Into<String>, format: TextureFormat) -> Self {
        Self {
            name: name.into(),
            format,
            clear_color: ClearValue::None,
            sampler: SamplerDescriptor::default(),
        }
    }

    /// Set the clear color.
    pub fn with_clear_color(mut self, r: f32, g: f32, b: f32, a: f32) -> Self {
        self.clear_color = ClearValue::color(r, g, b, a);
        self
    }

    /// Set the sampler state.
    pub fn with_sampler(mut self, sampler: SamplerDescriptor) -> Self {
        self.sampler = sampler;
        self
    }
}

/// The ordered attachment set authored on a draw target, plus the sampler
/// state of the implicit depth attachment.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AttachmentDescList {
    attachments: Vec<AttachmentDesc>,
    depth_sampler: SamplerDescriptor,
}

impl AttachmentDescList {
    /// Create an empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an attachment description.
    pub fn with_attachment(mut self, desc: AttachmentDesc) -> Self {
        self.attachments.push(desc);
        self
    }

    /// Set the depth attachment's sampler state.
    pub fn with_depth_sampler(mut self, sampler: SamplerDescriptor) -> Self {
        self.depth_sampler = sampler;
        self
    }

    /// The authored color attachments, in order.
    pub fn attachments(&self) -> &[AttachmentDesc] {
        &self.attachments
    }

    /// Number of authored color attachments.
    pub fn len(&self) -> usize {
        self.attachments.len()
    }

    /// Returns true if no color attachments are authored.
    pub fn is_empty(&self) -> bool {
        self.attachments.is_empty()
    }

    /// Sampler state of the depth attachment.
    pub fn depth_sampler(&self) -> SamplerDescriptor {
        self.depth_sampler
    }
}

/// One live attachment of a framebuffer.
pub struct FramebufferAttachment {
    name: String,
    format: TextureFormat,
    texture: GpuTexture,
}

impl FramebufferAttachment {
    /// Attachment name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Attachment format.
    pub fn format(&self) -> TextureFormat {
        self.format
    }

    /// The backing texture handle.
    pub fn texture(&self) -> &GpuTexture {
        &self.texture
    }
}

impl std::fmt::Debug for FramebufferAttachment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FramebufferAttachment")
            .field("name", &self.name)
            .field("format", &self.format)
            .finish()
    }
}

/// A GPU framebuffer: an ordered set of attachment textures sharing one
/// resolution.
///
/// Attachment order is meaningful: passes bind attachments by index, and
/// the draw target relies on depth being added last.
pub struct Framebuffer {
    backend: Arc<dyn GpuBackend>,
    size: Extent2d,
    attachments: Vec<FramebufferAttachment>,
}

impl Framebuffer {
    /// Create an empty framebuffer at `size`.
    pub fn new(backend: Arc<dyn GpuBackend>, size: Extent2d) -> Self {
        Self {
            backend,
            size,
            attachments: Vec::new(),
        }
    }

    /// Current framebuffer size.
    pub fn size(&self) -> Extent2d {
        self.size
    }

    /// Append an attachment texture sized to the framebuffer, returning a
    /// handle to the created texture.
    pub fn add_attachment(
        &mut self,
        name: impl Into<String>,
        format: TextureFormat,
    ) -> Result<GpuTexture, RenderError> {
        let name = name.into();
        if self.attachment(&name).is_some() {
            return Err(RenderError::InvalidParameter(format!(
                "framebuffer already has an attachment named {name:?}"
            )));
        }
        // The abstract format resolves to a concrete layout here; the
        // backend never sees the abstract enum's semantics.
        let info = format.info();
        log::trace!(
            "adding attachment {name:?} ({}x{}, {} components, {} bpp)",
            self.size.width,
            self.size.height,
            info.components,
            info.bytes_per_pixel
        );
        let texture = self.backend.create_texture(
            &TextureDescriptor::new_2d(
                self.size.width,
                self.size.height,
                format,
                TextureUsage::RENDER_ATTACHMENT | TextureUsage::TEXTURE_BINDING,
            )
            .with_label(name.clone()),
        )?;
        self.attachments.push(FramebufferAttachment {
            name,
            format,
            texture: texture.clone(),
        });
        Ok(texture)
    }

    /// Look up an attachment by name.
    pub fn attachment(&self, name: &str) -> Option<&FramebufferAttachment> {
        self.attachments.iter().find(|a| a.name == name)
    }

    /// All attachments, in bind order.
    pub fn attachments(&self) -> &[FramebufferAttachment] {
        &self.attachments
    }

    /// Resize every attachment in place. Contents are discarded.
    pub fn set_size(&mut self, size: Extent2d) {
        self.size = size;
        for attachment in &self.attachments {
            self.backend.resize_texture(&attachment.texture, size);
        }
    }

    /// Read back the contents of the named attachment.
    pub fn read_attachment(&self, name: &str) -> Option<Vec<u8>> {
        self.attachment(name)
            .map(|attachment| self.backend.read_texture(&attachment.texture))
    }
}

impl std::fmt::Debug for Framebuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("size", &self.size)
            .field("attachments", &self.attachments)
            .finish()
    }
}
