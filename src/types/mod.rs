//! Common value types shared across the rendering subsystem.

mod buffer;
mod common;
mod sampler;
mod texture;

pub use buffer::{BufferSpec, ElementType};
pub use common::{ClearValue, Extent2d};
pub use sampler::{AddressMode, FilterMode, SamplerDescriptor};
pub use texture::{ComponentType, FormatInfo, TextureDescriptor, TextureFormat, TextureUsage};
