//! Software GPU backend.
//!
//! Resources live in CPU memory and dispatches execute synchronously on the
//! calling thread. This backend is the default: it lets the test suite
//! exercise every GPU-side code path without hardware, and it is the
//! reference a real backend's quadrangulation results are compared against.

use parking_lot::Mutex;
use std::sync::Arc;

use crate::error::RenderError;
use crate::types::{Extent2d, TextureDescriptor};

use super::{GpuBackend, GpuBuffer, GpuTexture, QuadrangulateDispatch};

/// CPU-resident buffer storage.
pub struct SoftwareBuffer {
    label: String,
    bytes: Mutex<Vec<u8>>,
}

impl SoftwareBuffer {
    /// Buffer size in bytes.
    pub fn size(&self) -> usize {
        self.bytes.lock().len()
    }

    /// Debug label.
    pub fn label(&self) -> &str {
        &self.label
    }
}

impl std::fmt::Debug for SoftwareBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SoftwareBuffer")
            .field("label", &self.label)
            .field("size", &self.size())
            .finish()
    }
}

/// CPU-resident texture storage.
pub struct SoftwareTexture {
    descriptor: Mutex<TextureDescriptor>,
    bytes: Mutex<Vec<u8>>,
}

impl SoftwareTexture {
    /// Current texture descriptor (size may change via resize).
    pub fn descriptor(&self) -> TextureDescriptor {
        self.descriptor.lock().clone()
    }
}

impl std::fmt::Debug for SoftwareTexture {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let desc = self.descriptor.lock();
        f.debug_struct("SoftwareTexture")
            .field("label", &desc.label)
            .field("size", &desc.size)
            .field("format", &desc.format)
            .finish()
    }
}

/// Software GPU backend.
#[derive(Debug, Default)]
pub struct SoftwareBackend {
    last_error: Mutex<Option<RenderError>>,
}

impl SoftwareBackend {
    /// Create a new software backend.
    pub fn new() -> Self {
        Self::default()
    }

    fn record_error(&self, error: RenderError) {
        log::warn!("software backend dispatch failed: {error}");
        *self.last_error.lock() = Some(error);
    }
}

fn software_buffer(buffer: &GpuBuffer) -> &Arc<SoftwareBuffer> {
    match buffer {
        GpuBuffer::Software(buffer) => buffer,
    }
}

fn software_texture(texture: &GpuTexture) -> &Arc<SoftwareTexture> {
    match texture {
        GpuTexture::Software(texture) => texture,
    }
}

impl GpuBackend for SoftwareBackend {
    fn name(&self) -> &'static str {
        "Software"
    }

    fn create_buffer(&self, size: usize, label: &str) -> Result<GpuBuffer, RenderError> {
        log::trace!("SoftwareBackend: creating buffer {label:?} ({size} bytes)");
        Ok(GpuBuffer::Software(Arc::new(SoftwareBuffer {
            label: label.to_string(),
            bytes: Mutex::new(vec![0; size]),
        })))
    }

    fn write_buffer(&self, buffer: &GpuBuffer, offset: usize, data: &[u8]) {
        let buffer = software_buffer(buffer);
        let mut bytes = buffer.bytes.lock();
        let end = offset + data.len();
        if end > bytes.len() {
            log::warn!(
                "write to buffer {:?} out of range ({end} > {})",
                buffer.label,
                bytes.len()
            );
            return;
        }
        bytes[offset..end].copy_from_slice(data);
    }

    fn read_buffer(&self, buffer: &GpuBuffer, offset: usize, size: usize) -> Vec<u8> {
        let buffer = software_buffer(buffer);
        let bytes = buffer.bytes.lock();
        let end = (offset + size).min(bytes.len());
        bytes[offset.min(end)..end].to_vec()
    }

    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, RenderError> {
        log::trace!(
            "SoftwareBackend: creating texture {:?} ({}x{})",
            descriptor.label,
            descriptor.size.width,
            descriptor.size.height
        );
        Ok(GpuTexture::Software(Arc::new(SoftwareTexture {
            bytes: Mutex::new(vec![0; descriptor.byte_size()]),
            descriptor: Mutex::new(descriptor.clone()),
        })))
    }

    fn resize_texture(&self, texture: &GpuTexture, size: Extent2d) {
        let texture = software_texture(texture);
        let mut descriptor = texture.descriptor.lock();
        descriptor.size = size;
        *texture.bytes.lock() = vec![0; descriptor.byte_size()];
    }

    fn write_texture(&self, texture: &GpuTexture, data: &[u8]) {
        let texture = software_texture(texture);
        let mut bytes = texture.bytes.lock();
        let len = data.len().min(bytes.len());
        bytes[..len].copy_from_slice(&data[..len]);
    }

    fn read_texture(&self, texture: &GpuTexture) -> Vec<u8> {
        software_texture(texture).bytes.lock().clone()
    }

    fn dispatch_quadrangulate(&self, dispatch: &QuadrangulateDispatch<'_>, primvar: &GpuBuffer) {
        let table_buffer = software_buffer(dispatch.table);
        let primvar = software_buffer(primvar);
        if table_buffer.size() % 4 != 0 || primvar.size() % 4 != 0 {
            self.record_error(RenderError::InvalidParameter(format!(
                "buffers {:?}/{:?} are not 4-byte sized",
                table_buffer.label, primvar.label
            )));
            return;
        }

        let table: Vec<i32> = bytemuck::pod_collect_to_vec(&table_buffer.bytes.lock()[..]);
        let mut bytes = primvar.bytes.lock();
        let mut values: Vec<f32> = bytemuck::pod_collect_to_vec(&bytes[..]);

        let stride = dispatch.table_stride;
        let components = dispatch.components;
        let total = dispatch.points_offset + dispatch.num_additional_points;

        if components == 0 || stride < 2 {
            self.record_error(RenderError::InvalidParameter(format!(
                "degenerate dispatch (components {components}, stride {stride})"
            )));
            return;
        }
        if table.len() < dispatch.num_additional_points * stride {
            self.record_error(RenderError::InvalidParameter(format!(
                "quadrangulate table too small ({} < {})",
                table.len(),
                dispatch.num_additional_points * stride
            )));
            return;
        }
        if values.len() < total * components {
            self.record_error(RenderError::InvalidParameter(format!(
                "primvar buffer {:?} too small ({} < {})",
                primvar.label,
                values.len(),
                total * components
            )));
            return;
        }

        for k in 0..dispatch.num_additional_points {
            let record = &table[k * stride..(k + 1) * stride];
            let count = record[0];
            if count < 1 || count as usize > stride - 1 {
                self.record_error(RenderError::InvalidParameter(format!(
                    "table record {k} has invalid count {count}"
                )));
                return;
            }
            let weight = 1.0 / count as f32;
            for c in 0..components {
                let mut sum = 0.0f32;
                for &index in &record[1..1 + count as usize] {
                    if index < 0 || index as usize >= dispatch.points_offset {
                        self.record_error(RenderError::InvalidParameter(format!(
                            "table record {k} indexes point {index} outside source range"
                        )));
                        return;
                    }
                    sum += values[index as usize * components + c];
                }
                values[(dispatch.points_offset + k) * components + c] = sum * weight;
            }
        }

        bytes.copy_from_slice(bytemuck::cast_slice(&values));
    }

    fn take_last_error(&self) -> Option<RenderError> {
        self.last_error.lock().take()
    }
}

// Ensure backend resources are Send + Sync
static_assertions::assert_impl_all!(SoftwareBackend: Send, Sync);
static_assertions::assert_impl_all!(SoftwareBuffer: Send, Sync);
static_assertions::assert_impl_all!(SoftwareTexture: Send, Sync);

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{TextureFormat, TextureUsage};

    #[test]
    fn test_buffer_roundtrip() {
        let backend = SoftwareBackend::new();
        let buffer = backend.create_buffer(16, "test").unwrap();
        backend.write_buffer(&buffer, 4, &[1, 2, 3, 4]);
        assert_eq!(backend.read_buffer(&buffer, 4, 4), vec![1, 2, 3, 4]);
        assert_eq!(backend.read_buffer(&buffer, 0, 4), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_out_of_range_write_is_ignored() {
        let backend = SoftwareBackend::new();
        let buffer = backend.create_buffer(4, "test").unwrap();
        backend.write_buffer(&buffer, 2, &[1, 2, 3, 4]);
        assert_eq!(backend.read_buffer(&buffer, 0, 4), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_texture_resize_discards_contents() {
        let backend = SoftwareBackend::new();
        let texture = backend
            .create_texture(&TextureDescriptor::new_2d(
                2,
                2,
                TextureFormat::Rgba8Unorm,
                TextureUsage::RENDER_ATTACHMENT,
            ))
            .unwrap();
        backend.write_texture(&texture, &[255; 16]);
        backend.resize_texture(&texture, Extent2d::new(4, 4));
        let bytes = backend.read_texture(&texture);
        assert_eq!(bytes.len(), 4 * 4 * 4);
        assert!(bytes.iter().all(|&b| b == 0));
    }

    #[test]
    fn test_bad_dispatch_records_error() {
        let backend = SoftwareBackend::new();
        let table = backend.create_buffer(3 * 4, "table").unwrap();
        backend.write_buffer(&table, 0, bytemuck::cast_slice(&[5i32, 0, 1]));
        let primvar = backend.create_buffer(3 * 4, "points").unwrap();

        backend.dispatch_quadrangulate(
            &QuadrangulateDispatch {
                table: &table,
                table_stride: 3,
                points_offset: 2,
                num_additional_points: 1,
                components: 1,
            },
            &primvar,
        );

        // Count 5 exceeds the record capacity; the error is polled, not thrown.
        assert!(backend.take_last_error().is_some());
        assert!(backend.take_last_error().is_none());
    }
}
