//! Sampler types and descriptors.

/// Texture coordinate addressing mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum AddressMode {
    /// Clamp coordinates to the edge of the texture.
    #[default]
    ClampToEdge,
    /// Repeat the texture.
    Repeat,
    /// Repeat the texture, mirroring at every integer boundary.
    MirrorRepeat,
    /// Clamp to a border color.
    ClampToBorder,
}

/// Texture filtering mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FilterMode {
    /// Nearest neighbor filtering.
    #[default]
    Nearest,
    /// Linear interpolation.
    Linear,
}

/// Sampler state of a draw-target attachment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SamplerDescriptor {
    /// Address mode for U coordinate.
    pub wrap_s: AddressMode,
    /// Address mode for V coordinate.
    pub wrap_t: AddressMode,
    /// Minification filter.
    pub min_filter: FilterMode,
    /// Magnification filter.
    pub mag_filter: FilterMode,
}

impl SamplerDescriptor {
    /// Create a sampler descriptor with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a linear filtering sampler.
    pub fn linear() -> Self {
        Self {
            min_filter: FilterMode::Linear,
            mag_filter: FilterMode::Linear,
            ..Default::default()
        }
    }

    /// Create a nearest neighbor filtering sampler.
    pub fn nearest() -> Self {
        Self {
            min_filter: FilterMode::Nearest,
            mag_filter: FilterMode::Nearest,
            ..Default::default()
        }
    }

    /// Set address mode for both coordinates.
    pub fn with_wrap(mut self, mode: AddressMode) -> Self {
        self.wrap_s = mode;
        self.wrap_t = mode;
        self
    }
}
