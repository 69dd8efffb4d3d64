//! GPU backend abstraction layer.
//!
//! This module provides a trait-based abstraction for GPU backends,
//! allowing the rendering subsystem to work with different GPU APIs.
//!
//! # Available Backends
//!
//! - `software`: CPU-resident resources with synchronous dispatch, used
//!   for testing and as the reference a real GPU backend's quadrangulation
//!   results are compared against
//!
//! # Architecture
//!
//! Each backend implements the [`GpuBackend`] trait, which provides:
//! - Buffer and texture creation
//! - Buffer/texture upload and readback
//! - Quadrangulation dispatch
//! - A polled error channel for asynchronous dispatch failures

pub mod software;

use std::sync::Arc;

use crate::error::RenderError;
use crate::types::{Extent2d, TextureDescriptor};

/// Handle to a GPU buffer resource.
#[derive(Debug, Clone)]
pub enum GpuBuffer {
    /// Software backend buffer (CPU-resident bytes).
    Software(Arc<software::SoftwareBuffer>),
}

/// Handle to a GPU texture resource.
#[derive(Debug, Clone)]
pub enum GpuTexture {
    /// Software backend texture (CPU-resident bytes).
    Software(Arc<software::SoftwareTexture>),
}

/// Arguments for a quadrangulation interpolation dispatch.
///
/// The kernel reads fixed-stride records from `table` (each record is
/// `[count, idx0, idx1, ...]`, zero-padded to `table_stride` ints) and, for
/// the k-th synthetic point, averages the listed original-point values into
/// element `points_offset + k` of the primvar buffer. The weight is the
/// record's implicit `1/count`.
#[derive(Debug, Clone, Copy)]
pub struct QuadrangulateDispatch<'a> {
    /// Resident table buffer of `i32` records.
    pub table: &'a GpuBuffer,
    /// Ints per table record.
    pub table_stride: usize,
    /// Element index where the synthetic-point region begins.
    pub points_offset: usize,
    /// Number of synthetic points to fill.
    pub num_additional_points: usize,
    /// Scalar components per element.
    pub components: usize,
}

/// GPU backend trait for abstracting different GPU APIs.
///
/// Dispatch entry points do not return errors to the caller; failures are
/// recorded on the backend's error channel and retrieved by the system-wide
/// GPU error poller via [`GpuBackend::take_last_error`].
pub trait GpuBackend: Send + Sync + 'static {
    /// Get the backend name.
    fn name(&self) -> &'static str;

    /// Create a buffer resource of `size` bytes.
    fn create_buffer(&self, size: usize, label: &str) -> Result<GpuBuffer, RenderError>;

    /// Write data to a buffer at a byte offset.
    fn write_buffer(&self, buffer: &GpuBuffer, offset: usize, data: &[u8]);

    /// Read `size` bytes from a buffer at a byte offset.
    ///
    /// This is a blocking operation that waits for the GPU to finish.
    fn read_buffer(&self, buffer: &GpuBuffer, offset: usize, size: usize) -> Vec<u8>;

    /// Create a texture resource.
    fn create_texture(&self, descriptor: &TextureDescriptor) -> Result<GpuTexture, RenderError>;

    /// Resize a texture in place. Contents are discarded.
    fn resize_texture(&self, texture: &GpuTexture, size: Extent2d);

    /// Write the full contents of a texture.
    fn write_texture(&self, texture: &GpuTexture, data: &[u8]);

    /// Read back the full contents of a texture.
    fn read_texture(&self, texture: &GpuTexture) -> Vec<u8>;

    /// Dispatch the quadrangulation interpolation kernel over `primvar`.
    ///
    /// The original-point region `[0, points_offset)` must already be
    /// resident; the synthetic-point region is written in place.
    fn dispatch_quadrangulate(&self, dispatch: &QuadrangulateDispatch<'_>, primvar: &GpuBuffer);

    /// Take the most recent dispatch error, if any.
    fn take_last_error(&self) -> Option<RenderError>;
}

/// Selects and creates the best available backend.
///
/// Real GPU backends, when compiled in, take precedence; the software
/// backend is the unconditional fallback.
pub fn create_backend() -> Result<Arc<dyn GpuBackend>, RenderError> {
    log::info!("Using software backend");
    Ok(Arc::new(software::SoftwareBackend::new()))
}
