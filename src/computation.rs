//! Computation-graph node interfaces.
//!
//! Quadrangulation runs as nodes in an externally scheduled,
//! dependency-ordered computation graph. This module defines the two node
//! capabilities that graph sees:
//!
//! - [`BufferSource`]: CPU-phase nodes that produce (or merely feed) buffer
//!   data — the quad-info builder, the index builder, the table builder and
//!   the CPU quadrangulation paths.
//! - [`GpuComputation`]: GPU-phase nodes that fill a region of an
//!   already-resident buffer — the GPU quadrangulation path.
//!
//! The scheduler dispatches only through these interfaces. Nodes never
//! propagate errors across node boundaries: `resolve` returns a flag, and
//! downstream nodes check their dependency's validity before consuming its
//! output. Nodes are not incremental; a node must not be resolved twice
//! with different inputs without being rebuilt from scratch.

use std::sync::Arc;

use crate::backend::GpuBackend;
use crate::types::{BufferSpec, ElementType};

/// Typed CPU-side buffer contents.
#[derive(Debug, Clone, PartialEq)]
pub enum BufferContents {
    /// 32-bit signed integers (index and table buffers).
    Int32(Vec<i32>),
    /// 32-bit floats (primvar buffers).
    Float32(Vec<f32>),
}

/// A named, typed CPU-side buffer produced by a [`BufferSource`].
#[derive(Debug, Clone, PartialEq)]
pub struct BufferData {
    name: String,
    element_type: ElementType,
    contents: BufferContents,
}

impl BufferData {
    /// Create a float buffer. `values` holds flattened scalar components.
    pub fn new_f32(name: impl Into<String>, element_type: ElementType, values: Vec<f32>) -> Self {
        debug_assert!(element_type.is_float());
        Self {
            name: name.into(),
            element_type,
            contents: BufferContents::Float32(values),
        }
    }

    /// Create an integer buffer. `values` holds flattened scalar components.
    pub fn new_i32(name: impl Into<String>, element_type: ElementType, values: Vec<i32>) -> Self {
        debug_assert!(!element_type.is_float());
        Self {
            name: name.into(),
            element_type,
            contents: BufferContents::Int32(values),
        }
    }

    /// Buffer name the result is aggregated under.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Element data type.
    pub fn element_type(&self) -> ElementType {
        self.element_type
    }

    /// Number of elements (scalar count / components).
    pub fn num_elements(&self) -> usize {
        let scalars = match &self.contents {
            BufferContents::Int32(values) => values.len(),
            BufferContents::Float32(values) => values.len(),
        };
        scalars / self.element_type.components()
    }

    /// Flattened float components, if this is a float buffer.
    pub fn as_f32(&self) -> Option<&[f32]> {
        match &self.contents {
            BufferContents::Float32(values) => Some(values),
            BufferContents::Int32(_) => None,
        }
    }

    /// Flattened integer components, if this is an integer buffer.
    pub fn as_i32(&self) -> Option<&[i32]> {
        match &self.contents {
            BufferContents::Int32(values) => Some(values),
            BufferContents::Float32(_) => None,
        }
    }

    /// Raw little-endian bytes, for backend upload.
    pub fn bytes(&self) -> Vec<u8> {
        match &self.contents {
            BufferContents::Int32(values) => bytemuck::cast_slice(values).to_vec(),
            BufferContents::Float32(values) => bytemuck::cast_slice(values).to_vec(),
        }
    }

    /// The buffer spec this data satisfies.
    pub fn spec(&self) -> BufferSpec {
        BufferSpec::new(self.name.clone(), self.element_type, self.num_elements())
    }
}

/// A CPU-phase computation node producing buffer data.
///
/// Every capability here is mandatory for a concrete node; there are no
/// optional overrides. A node that chains no downstream buffer answers
/// `false` / `None`, a dependency-only node answers `None` from `result`.
pub trait BufferSource: Send + Sync {
    /// Name of the buffer this node produces.
    fn name(&self) -> &str;

    /// Declare the output buffer specs for aggregation-compatible
    /// allocation. Must be callable before `resolve`.
    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>);

    /// Perform the computation. Returns false if the node is invalid or a
    /// dependency is unresolved; never panics across the node boundary.
    fn resolve(&self) -> bool;

    /// Whether the node's inputs were valid at construction.
    fn is_valid(&self) -> bool;

    /// Whether `resolve` has completed successfully.
    fn is_resolved(&self) -> bool;

    /// The resolved output, if any. Dependency-only nodes return `None`
    /// even when resolved.
    fn result(&self) -> Option<Arc<BufferData>>;

    /// The upstream node that must resolve before this one, if any.
    fn dependency(&self) -> Option<Arc<dyn BufferSource>>;

    /// Whether this node fills an additional downstream buffer during its
    /// own resolve.
    fn has_chained_buffer(&self) -> bool;

    /// The chained downstream buffer, registered with the allocator
    /// alongside this node's own output.
    fn chained_buffer(&self) -> Option<Arc<dyn BufferSource>>;
}

/// A set of named buffers resident within one allocated range.
///
/// GPU computations receive the range their output lives in; buffer storage
/// is otherwise opaque to them.
#[derive(Debug, Default)]
pub struct BufferArrayRange {
    resources: Vec<(String, crate::backend::GpuBuffer)>,
}

impl BufferArrayRange {
    /// Create an empty range.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a resident buffer under `name`.
    pub fn add_resource(&mut self, name: impl Into<String>, buffer: crate::backend::GpuBuffer) {
        self.resources.push((name.into(), buffer));
    }

    /// Look up a resident buffer by name.
    pub fn resource(&self, name: &str) -> Option<&crate::backend::GpuBuffer> {
        self.resources
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, buffer)| buffer)
    }
}

/// A GPU-phase computation node.
///
/// GPU computations have no CPU-visible output buffer; success or failure
/// is reported through the backend's polled error channel, not returned to
/// the caller.
pub trait GpuComputation: Send + Sync {
    /// Declare required buffer specs (name, element type, element count) so
    /// the allocator can co-locate all per-point buffers compatibly.
    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>);

    /// Dispatch the computation over the resident `range`.
    fn execute(&self, range: &BufferArrayRange, backend: &dyn GpuBackend);

    /// Total number of output elements after the computation runs.
    fn num_output_elements(&self) -> usize;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_buffer_data_elements() {
        let data = BufferData::new_f32("points", ElementType::Float32Vec3, vec![0.0; 12]);
        assert_eq!(data.num_elements(), 4);
        assert_eq!(data.bytes().len(), 48);
        assert!(data.as_i32().is_none());

        let spec = data.spec();
        assert_eq!(spec.name, "points");
        assert_eq!(spec.num_elements, 4);
    }

    #[test]
    fn test_range_lookup() {
        use crate::backend::GpuBackend as _;

        let backend = crate::backend::software::SoftwareBackend::new();
        let mut range = BufferArrayRange::new();
        range.add_resource("points", backend.create_buffer(16, "points").unwrap());
        assert!(range.resource("points").is_some());
        assert!(range.resource("normals").is_none());
    }
}
