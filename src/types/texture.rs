//! Texture formats and descriptors.

use bitflags::bitflags;

use super::Extent2d;

/// Texture format enumeration.
///
/// Draw-target attachment descriptors use these abstract formats; the
/// backend-facing layout is resolved through [`TextureFormat::info`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[non_exhaustive]
pub enum TextureFormat {
    /// 8-bit red channel, unsigned normalized.
    R8Unorm,
    /// 8-bit RG channels, unsigned normalized.
    Rg8Unorm,
    /// 8-bit RGBA channels, unsigned normalized.
    #[default]
    Rgba8Unorm,
    /// 32-bit red channel, float.
    R32Float,
    /// 32-bit red channel, signed integer.
    R32Sint,
    /// 16-bit RGBA channels, float.
    Rgba16Float,
    /// 32-bit RGBA channels, float.
    Rgba32Float,
    /// 32-bit depth, float.
    Depth32Float,
}

/// Scalar type of a texture component.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ComponentType {
    /// Unsigned normalized 8-bit.
    UnsignedByte,
    /// 16-bit float.
    HalfFloat,
    /// 32-bit float.
    Float,
    /// 32-bit signed integer.
    Int,
}

/// Backend-facing layout of an abstract [`TextureFormat`]: component count,
/// component type and bytes per pixel. This is what attachment allocation
/// consumes in place of a raw API format triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FormatInfo {
    /// Number of components per pixel.
    pub components: u32,
    /// Scalar type of each component.
    pub component_type: ComponentType,
    /// Total bytes per pixel.
    pub bytes_per_pixel: u32,
}

impl TextureFormat {
    /// Returns true if this is a depth format.
    pub fn is_depth(&self) -> bool {
        matches!(self, Self::Depth32Float)
    }

    /// Resolve the backend-facing layout for this format.
    pub fn info(&self) -> FormatInfo {
        match self {
            Self::R8Unorm => FormatInfo {
                components: 1,
                component_type: ComponentType::UnsignedByte,
                bytes_per_pixel: 1,
            },
            Self::Rg8Unorm => FormatInfo {
                components: 2,
                component_type: ComponentType::UnsignedByte,
                bytes_per_pixel: 2,
            },
            Self::Rgba8Unorm => FormatInfo {
                components: 4,
                component_type: ComponentType::UnsignedByte,
                bytes_per_pixel: 4,
            },
            Self::R32Float => FormatInfo {
                components: 1,
                component_type: ComponentType::Float,
                bytes_per_pixel: 4,
            },
            Self::R32Sint => FormatInfo {
                components: 1,
                component_type: ComponentType::Int,
                bytes_per_pixel: 4,
            },
            Self::Rgba16Float => FormatInfo {
                components: 4,
                component_type: ComponentType::HalfFloat,
                bytes_per_pixel: 8,
            },
            Self::Rgba32Float => FormatInfo {
                components: 4,
                component_type: ComponentType::Float,
                bytes_per_pixel: 16,
            },
            Self::Depth32Float => FormatInfo {
                components: 1,
                component_type: ComponentType::Float,
                bytes_per_pixel: 4,
            },
        }
    }
}

bitflags! {
    /// Usage flags for textures.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct TextureUsage: u32 {
        /// Texture can be copied from.
        const COPY_SRC = 1 << 0;
        /// Texture can be copied to.
        const COPY_DST = 1 << 1;
        /// Texture can be sampled in a shader.
        const TEXTURE_BINDING = 1 << 2;
        /// Texture can be used as a render attachment.
        const RENDER_ATTACHMENT = 1 << 3;
    }
}

impl Default for TextureUsage {
    fn default() -> Self {
        Self::empty()
    }
}

/// Descriptor for creating a texture.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TextureDescriptor {
    /// Debug label for the texture.
    pub label: Option<String>,
    /// Size of the texture.
    pub size: Extent2d,
    /// Texture format.
    pub format: TextureFormat,
    /// Usage flags.
    pub usage: TextureUsage,
}

impl TextureDescriptor {
    /// Create a new 2D texture descriptor.
    pub fn new_2d(width: u32, height: u32, format: TextureFormat, usage: TextureUsage) -> Self {
        Self {
            label: None,
            size: Extent2d::new(width, height),
            format,
            usage,
        }
    }

    /// Set the debug label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Size in bytes of the full texture contents.
    pub fn byte_size(&self) -> usize {
        self.size.pixel_count() * self.format.info().bytes_per_pixel as usize
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_info() {
        let info = TextureFormat::Rgba8Unorm.info();
        assert_eq!(info.components, 4);
        assert_eq!(info.bytes_per_pixel, 4);

        let info = TextureFormat::Depth32Float.info();
        assert_eq!(info.component_type, ComponentType::Float);
        assert!(TextureFormat::Depth32Float.is_depth());
        assert!(!TextureFormat::Rgba8Unorm.is_depth());
    }

    #[test]
    fn test_descriptor_byte_size() {
        let desc = TextureDescriptor::new_2d(
            16,
            16,
            TextureFormat::Rgba32Float,
            TextureUsage::RENDER_ATTACHMENT,
        );
        assert_eq!(desc.byte_size(), 16 * 16 * 16);
    }
}
