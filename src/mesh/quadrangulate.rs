//! Quadrangulation computations.
//!
//! Dependency graph, CPU path:
//!
//! ```text
//! Topology --> QuadInfoBuilder --> QuadIndexBuilder (+ chained primitive param)
//!                             --> QuadrangulateCpu  (copies originals, appends synthetics)
//! ```
//!
//! GPU path:
//!
//! ```text
//! Topology --> QuadInfoBuilder --> QuadIndexBuilder
//!                             --> QuadrangulateTableBuilder --> QuadrangulateGpu
//! ```
//!
//! The CPU computation produces the whole output buffer, originals
//! included, so nothing extra has to be uploaded. The GPU computation only
//! fills the synthetic-point region; the original values must already be
//! resident in the range it executes over.

use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use crate::backend::{GpuBackend, QuadrangulateDispatch};
use crate::computation::{BufferArrayRange, BufferData, BufferSource, GpuComputation};
use crate::scene::ScenePath;
use crate::types::{BufferSpec, ElementType};

use super::{MeshTopology, QuadInfo};

/// Buffer name of the quad index output.
pub const QUAD_INDICES: &str = "quad_indices";
/// Buffer name of the chained primitive-param output.
pub const PRIMITIVE_PARAM: &str = "primitive_param";
/// Buffer name of the GPU quadrangulation table.
pub const QUADRANGULATE_TABLE: &str = "quadrangulate_table";

/// Encode an output quad's originating face and sub-quad position.
///
/// The low byte carries the sub-quad index within the face's fan (0 for an
/// original quad face), the remaining bits the authored face index. Fans
/// wider than 256 sub-quads are not representable.
pub fn encode_primitive_param(face_index: i32, sub_quad_index: i32) -> i32 {
    (face_index << 8) | (sub_quad_index & 0xff)
}

/// Recover the authored face index from a primitive param.
pub fn decode_face_index(param: i32) -> i32 {
    param >> 8
}

/// Recover the sub-quad index from a primitive param.
pub fn decode_sub_quad_index(param: i32) -> i32 {
    param & 0xff
}

/// Number of quads the quadrangulated topology emits.
///
/// A quad face contributes one quad, a non-quad face of arity N
/// contributes N; degenerate faces (arity < 3) contribute nothing.
fn num_output_quads(topology: &MeshTopology) -> usize {
    topology
        .face_vertex_counts()
        .iter()
        .map(|&n| match n {
            4 => 1,
            n if n >= 3 => n as usize,
            _ => 0,
        })
        .sum()
}

// ---------------------------------------------------------------------------
// QuadInfoBuilder
// ---------------------------------------------------------------------------

/// Quad info computation.
///
/// Dependency-only node: it produces no buffer of its own, but installs the
/// resolved [`QuadInfo`] on the topology for every dependent computation to
/// read.
pub struct QuadInfoBuilder {
    id: ScenePath,
    topology: Option<Arc<MeshTopology>>,
    resolved: AtomicBool,
}

impl QuadInfoBuilder {
    /// Create the builder. `topology` may be absent, in which case the
    /// node is invalid and resolves to a failure.
    pub fn new(topology: Option<Arc<MeshTopology>>, id: ScenePath) -> Self {
        Self {
            id,
            topology,
            resolved: AtomicBool::new(false),
        }
    }

    fn build(topology: &MeshTopology) -> Option<QuadInfo> {
        let counts = topology.face_vertex_counts();
        let indices = topology.face_vertex_indices();

        let mut info = QuadInfo {
            points_offset: topology.num_points(),
            ..Default::default()
        };

        let mut offset = 0usize;
        for &num_vert in counts {
            let arity = num_vert.max(0) as usize;
            if offset + arity > indices.len() {
                log::warn!(
                    "face arities overrun vertex indices ({} > {})",
                    offset + arity,
                    indices.len()
                );
                return None;
            }
            if arity != 4 && arity >= 3 {
                info.num_verts.push(num_vert);
                info.verts.extend_from_slice(&indices[offset..offset + arity]);
                // One midpoint per edge plus the face center.
                info.num_additional_points += arity + 1;
                info.max_num_vert = info.max_num_vert.max(arity);
            }
            offset += arity;
        }
        Some(info)
    }
}

impl BufferSource for QuadInfoBuilder {
    fn name(&self) -> &str {
        "quad_info"
    }

    fn add_buffer_specs(&self, _specs: &mut Vec<BufferSpec>) {}

    fn resolve(&self) -> bool {
        if self.is_resolved() {
            return true;
        }
        if !self.is_valid() {
            log::warn!("quad info builder for {} is invalid", self.id);
            return false;
        }
        let Some(topology) = self.topology.as_ref() else {
            return false;
        };
        let Some(info) = Self::build(topology) else {
            return false;
        };
        topology.set_quad_info(Arc::new(info));
        self.resolved.store(true, Ordering::Release);
        true
    }

    fn is_valid(&self) -> bool {
        self.topology
            .as_ref()
            .is_some_and(|topology| topology.num_points() > 0)
    }

    fn is_resolved(&self) -> bool {
        self.resolved.load(Ordering::Acquire)
    }

    fn result(&self) -> Option<Arc<BufferData>> {
        None
    }

    fn dependency(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }

    fn has_chained_buffer(&self) -> bool {
        false
    }

    fn chained_buffer(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }
}

// ---------------------------------------------------------------------------
// QuadIndexBuilder
// ---------------------------------------------------------------------------

/// Holder for the primitive-param buffer chained off the quad index
/// builder. It is filled by the parent's resolve; its own resolve merely
/// reports whether that has happened.
struct ChainedPrimitiveParam {
    num_quads: usize,
    result: Mutex<Option<Arc<BufferData>>>,
}

impl BufferSource for ChainedPrimitiveParam {
    fn name(&self) -> &str {
        PRIMITIVE_PARAM
    }

    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>) {
        specs.push(BufferSpec::new(
            PRIMITIVE_PARAM,
            ElementType::Int32,
            self.num_quads,
        ));
    }

    fn resolve(&self) -> bool {
        self.is_resolved()
    }

    fn is_valid(&self) -> bool {
        true
    }

    fn is_resolved(&self) -> bool {
        self.result.lock().is_some()
    }

    fn result(&self) -> Option<Arc<BufferData>> {
        self.result.lock().clone()
    }

    fn dependency(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }

    fn has_chained_buffer(&self) -> bool {
        false
    }

    fn chained_buffer(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }
}

/// Quad index computation.
///
/// Emits the final 4-index-per-quad index buffer and chains the parallel
/// primitive-param buffer mapping each output quad back to its authored
/// face.
pub struct QuadIndexBuilder {
    id: ScenePath,
    topology: Option<Arc<MeshTopology>>,
    quad_info_builder: Arc<QuadInfoBuilder>,
    result: Mutex<Option<Arc<BufferData>>>,
    primitive_param: Arc<ChainedPrimitiveParam>,
}

impl QuadIndexBuilder {
    /// Create the builder, holding a shared handle to its quad-info
    /// dependency.
    pub fn new(
        topology: Option<Arc<MeshTopology>>,
        quad_info_builder: Arc<QuadInfoBuilder>,
        id: ScenePath,
    ) -> Self {
        let num_quads = topology.as_deref().map(num_output_quads).unwrap_or(0);
        Self {
            id,
            topology,
            quad_info_builder,
            result: Mutex::new(None),
            primitive_param: Arc::new(ChainedPrimitiveParam {
                num_quads,
                result: Mutex::new(None),
            }),
        }
    }
}

impl BufferSource for QuadIndexBuilder {
    fn name(&self) -> &str {
        QUAD_INDICES
    }

    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>) {
        specs.push(BufferSpec::new(
            QUAD_INDICES,
            ElementType::Int32Vec4,
            self.primitive_param.num_quads,
        ));
    }

    fn resolve(&self) -> bool {
        if self.is_resolved() {
            return true;
        }
        if !self.is_valid() {
            log::warn!("quad index builder for {} is invalid", self.id);
            return false;
        }
        let Some(topology) = self.topology.as_ref() else {
            return false;
        };
        let Some(quad_info) = topology.quad_info() else {
            log::warn!("quad index builder for {} resolved before quad info", self.id);
            return false;
        };

        let counts = topology.face_vertex_counts();
        let face_indices = topology.face_vertex_indices();
        let num_quads = self.primitive_param.num_quads;

        let mut indices: Vec<i32> = Vec::with_capacity(num_quads * 4);
        let mut params: Vec<i32> = Vec::with_capacity(num_quads);

        let points_offset = quad_info.points_offset as i32;
        // Cursor into the synthetic-point region, advanced per non-quad face.
        let mut synthetic = 0i32;
        let mut offset = 0usize;
        for (face, &num_vert) in counts.iter().enumerate() {
            let arity = num_vert.max(0) as usize;
            let verts = &face_indices[offset..offset + arity];
            if arity == 4 {
                indices.extend_from_slice(verts);
                params.push(encode_primitive_param(face as i32, 0));
            } else if arity >= 3 {
                let center = points_offset + synthetic + num_vert;
                for i in 0..arity {
                    let edge = points_offset + synthetic + i as i32;
                    let prev_edge =
                        points_offset + synthetic + ((i + arity - 1) % arity) as i32;
                    indices.extend_from_slice(&[verts[i], edge, center, prev_edge]);
                    params.push(encode_primitive_param(face as i32, i as i32));
                }
                synthetic += num_vert + 1;
            }
            offset += arity;
        }

        *self.primitive_param.result.lock() = Some(Arc::new(BufferData::new_i32(
            PRIMITIVE_PARAM,
            ElementType::Int32,
            params,
        )));
        *self.result.lock() = Some(Arc::new(BufferData::new_i32(
            QUAD_INDICES,
            ElementType::Int32Vec4,
            indices,
        )));
        true
    }

    fn is_valid(&self) -> bool {
        self.topology.is_some() && self.quad_info_builder.is_valid()
    }

    fn is_resolved(&self) -> bool {
        self.result.lock().is_some()
    }

    fn result(&self) -> Option<Arc<BufferData>> {
        self.result.lock().clone()
    }

    fn dependency(&self) -> Option<Arc<dyn BufferSource>> {
        Some(self.quad_info_builder.clone())
    }

    fn has_chained_buffer(&self) -> bool {
        true
    }

    fn chained_buffer(&self) -> Option<Arc<dyn BufferSource>> {
        Some(self.primitive_param.clone())
    }
}

// ---------------------------------------------------------------------------
// QuadrangulateTableBuilder
// ---------------------------------------------------------------------------

/// Quadrangulate table computation, for GPU quadrangulation.
///
/// Serializes the resolved [`QuadInfo`] into fixed-stride `i32` records,
/// one per synthetic point, ordered exactly like the synthetic-point region
/// itself (edge midpoints then center, per non-quad face, in face order).
/// Each record is `[count, idx0, idx1, ...]`, zero-padded to
/// `max_num_vert + 1` ints; the interpolation weight is the implicit
/// `1/count`.
pub struct QuadrangulateTableBuilder {
    id: ScenePath,
    topology: Option<Arc<MeshTopology>>,
    quad_info_builder: Arc<QuadInfoBuilder>,
    result: Mutex<Option<Arc<BufferData>>>,
}

impl QuadrangulateTableBuilder {
    /// Create the builder, holding a shared handle to its quad-info
    /// dependency.
    pub fn new(
        topology: Option<Arc<MeshTopology>>,
        quad_info_builder: Arc<QuadInfoBuilder>,
        id: ScenePath,
    ) -> Self {
        Self {
            id,
            topology,
            quad_info_builder,
            result: Mutex::new(None),
        }
    }

    /// Ints per table record for the given quad info.
    pub fn table_stride(quad_info: &QuadInfo) -> usize {
        quad_info.max_num_vert + 1
    }
}

impl BufferSource for QuadrangulateTableBuilder {
    fn name(&self) -> &str {
        QUADRANGULATE_TABLE
    }

    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>) {
        let num_ints = self
            .topology
            .as_ref()
            .and_then(|topology| topology.quad_info())
            .map(|info| info.num_additional_points * Self::table_stride(&info))
            .unwrap_or(0);
        specs.push(BufferSpec::new(
            QUADRANGULATE_TABLE,
            ElementType::Int32,
            num_ints,
        ));
    }

    fn resolve(&self) -> bool {
        if self.is_resolved() {
            return true;
        }
        if !self.is_valid() {
            log::warn!("quadrangulate table builder for {} is invalid", self.id);
            return false;
        }
        let Some(topology) = self.topology.as_ref() else {
            return false;
        };
        let Some(quad_info) = topology.quad_info() else {
            log::warn!(
                "quadrangulate table builder for {} resolved before quad info",
                self.id
            );
            return false;
        };

        let stride = Self::table_stride(&quad_info);
        let mut table: Vec<i32> =
            Vec::with_capacity(quad_info.num_additional_points * stride);

        let mut vert_offset = 0usize;
        for &num_vert in &quad_info.num_verts {
            let arity = num_vert as usize;
            let verts = &quad_info.verts[vert_offset..vert_offset + arity];
            for i in 0..arity {
                table.push(2);
                table.push(verts[i]);
                table.push(verts[(i + 1) % arity]);
                table.resize(table.len() + stride - 3, 0);
            }
            table.push(num_vert);
            table.extend_from_slice(verts);
            table.resize(table.len() + stride - 1 - arity, 0);
            vert_offset += arity;
        }

        *self.result.lock() = Some(Arc::new(BufferData::new_i32(
            QUADRANGULATE_TABLE,
            ElementType::Int32,
            table,
        )));
        true
    }

    fn is_valid(&self) -> bool {
        self.topology.is_some() && self.quad_info_builder.is_valid()
    }

    fn is_resolved(&self) -> bool {
        self.result.lock().is_some()
    }

    fn result(&self) -> Option<Arc<BufferData>> {
        self.result.lock().clone()
    }

    fn dependency(&self) -> Option<Arc<dyn BufferSource>> {
        Some(self.quad_info_builder.clone())
    }

    fn has_chained_buffer(&self) -> bool {
        false
    }

    fn chained_buffer(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }
}

// ---------------------------------------------------------------------------
// QuadrangulateCpu
// ---------------------------------------------------------------------------

/// CPU primvar quadrangulation.
///
/// Produces a new buffer of `points_offset + num_additional_points`
/// elements: the source values verbatim, then the synthetic-point values.
/// Each synthetic value is the exact average of its contributing original
/// values, accumulated in table order so the result is bit-identical to
/// the GPU path.
pub struct QuadrangulateCpu {
    id: ScenePath,
    topology: Option<Arc<MeshTopology>>,
    source: Arc<BufferData>,
    quad_info_builder: Arc<QuadInfoBuilder>,
    result: Mutex<Option<Arc<BufferData>>>,
}

impl QuadrangulateCpu {
    /// Create the computation over `source`, a per-original-point primvar.
    pub fn new(
        topology: Option<Arc<MeshTopology>>,
        source: Arc<BufferData>,
        quad_info_builder: Arc<QuadInfoBuilder>,
        id: ScenePath,
    ) -> Self {
        Self {
            id,
            topology,
            source,
            quad_info_builder,
            result: Mutex::new(None),
        }
    }
}

/// Append the average of `count` source elements, accumulated in index
/// order then scaled by the exact rational weight `1/count`.
fn append_average(out: &mut Vec<f32>, source: &[f32], components: usize, indices: &[i32]) {
    let weight = 1.0 / indices.len() as f32;
    for component in 0..components {
        let mut sum = 0.0f32;
        for &index in indices {
            sum += source[index as usize * components + component];
        }
        out.push(sum * weight);
    }
}

impl BufferSource for QuadrangulateCpu {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>) {
        let num_elements = self
            .topology
            .as_ref()
            .and_then(|topology| topology.quad_info())
            .map(|info| info.points_offset + info.num_additional_points)
            .unwrap_or_else(|| self.source.num_elements());
        specs.push(BufferSpec::new(
            self.source.name(),
            self.source.element_type(),
            num_elements,
        ));
    }

    fn resolve(&self) -> bool {
        if self.is_resolved() {
            return true;
        }
        if !self.is_valid() {
            log::warn!("quadrangulation of {} for {} is invalid", self.source.name(), self.id);
            return false;
        }
        let Some(topology) = self.topology.as_ref() else {
            return false;
        };
        let Some(quad_info) = topology.quad_info() else {
            log::warn!(
                "quadrangulation of {} for {} resolved before quad info",
                self.source.name(),
                self.id
            );
            return false;
        };
        if self.source.num_elements() != quad_info.points_offset {
            log::warn!(
                "primvar {} has {} elements, expected {}",
                self.source.name(),
                self.source.num_elements(),
                quad_info.points_offset
            );
            return false;
        }

        if quad_info.is_all_quads() {
            // Pass-through: the source already is the full output.
            *self.result.lock() = Some(self.source.clone());
            return true;
        }

        let Some(source) = self.source.as_f32() else {
            log::warn!(
                "primvar {} has integer elements, which cannot be averaged",
                self.source.name()
            );
            return false;
        };
        let components = self.source.element_type().components();

        let mut out: Vec<f32> = Vec::with_capacity(
            (quad_info.points_offset + quad_info.num_additional_points) * components,
        );
        out.extend_from_slice(source);

        let mut vert_offset = 0usize;
        for &num_vert in &quad_info.num_verts {
            let arity = num_vert as usize;
            let verts = &quad_info.verts[vert_offset..vert_offset + arity];
            for i in 0..arity {
                append_average(
                    &mut out,
                    source,
                    components,
                    &[verts[i], verts[(i + 1) % arity]],
                );
            }
            append_average(&mut out, source, components, verts);
            vert_offset += arity;
        }

        *self.result.lock() = Some(Arc::new(BufferData::new_f32(
            self.source.name(),
            self.source.element_type(),
            out,
        )));
        true
    }

    fn is_valid(&self) -> bool {
        self.topology.is_some() && self.quad_info_builder.is_valid()
    }

    fn is_resolved(&self) -> bool {
        self.result.lock().is_some()
    }

    fn result(&self) -> Option<Arc<BufferData>> {
        self.result.lock().clone()
    }

    fn dependency(&self) -> Option<Arc<dyn BufferSource>> {
        Some(self.quad_info_builder.clone())
    }

    fn has_chained_buffer(&self) -> bool {
        false
    }

    fn chained_buffer(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }
}

// ---------------------------------------------------------------------------
// QuadrangulateFaceVaryingCpu
// ---------------------------------------------------------------------------

/// CPU face-varying primvar quadrangulation.
///
/// The source holds one value per authored face corner. Each output quad
/// gets 4 corner values: a quad face copies its corners; a non-quad face's
/// fan quads interpolate within that face's corner values only.
pub struct QuadrangulateFaceVaryingCpu {
    id: ScenePath,
    topology: Option<Arc<MeshTopology>>,
    source: Arc<BufferData>,
    result: Mutex<Option<Arc<BufferData>>>,
}

impl QuadrangulateFaceVaryingCpu {
    /// Create the computation over `source`, a per-face-corner primvar.
    pub fn new(topology: Option<Arc<MeshTopology>>, source: Arc<BufferData>, id: ScenePath) -> Self {
        Self {
            id,
            topology,
            source,
            result: Mutex::new(None),
        }
    }
}

impl BufferSource for QuadrangulateFaceVaryingCpu {
    fn name(&self) -> &str {
        self.source.name()
    }

    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>) {
        let num_quads = self.topology.as_deref().map(num_output_quads).unwrap_or(0);
        specs.push(BufferSpec::new(
            self.source.name(),
            self.source.element_type(),
            num_quads * 4,
        ));
    }

    fn resolve(&self) -> bool {
        if self.is_resolved() {
            return true;
        }
        if !self.is_valid() {
            log::warn!(
                "face-varying quadrangulation of {} for {} is invalid",
                self.source.name(),
                self.id
            );
            return false;
        }
        let Some(topology) = self.topology.as_ref() else {
            return false;
        };
        if self.source.num_elements() != topology.num_face_corners() {
            log::warn!(
                "face-varying primvar {} has {} elements, expected {}",
                self.source.name(),
                self.source.num_elements(),
                topology.num_face_corners()
            );
            return false;
        }
        let Some(source) = self.source.as_f32() else {
            log::warn!(
                "face-varying primvar {} has integer elements, which cannot be averaged",
                self.source.name()
            );
            return false;
        };
        let components = self.source.element_type().components();

        let num_quads = num_output_quads(topology);
        let mut out: Vec<f32> = Vec::with_capacity(num_quads * 4 * components);

        let mut corner = 0usize;
        for &num_vert in topology.face_vertex_counts() {
            let arity = num_vert.max(0) as usize;
            if arity == 4 {
                out.extend_from_slice(&source[corner * components..(corner + 4) * components]);
            } else if arity >= 3 {
                // Corner indices local to this face.
                let local: Vec<i32> = (corner as i32..(corner + arity) as i32).collect();
                for i in 0..arity {
                    let prev = (i + arity - 1) % arity;
                    let next = (i + 1) % arity;
                    out.extend_from_slice(
                        &source[(corner + i) * components..(corner + i + 1) * components],
                    );
                    append_average(&mut out, source, components, &[local[i], local[next]]);
                    append_average(&mut out, source, components, &local);
                    append_average(&mut out, source, components, &[local[prev], local[i]]);
                }
            }
            corner += arity;
        }

        *self.result.lock() = Some(Arc::new(BufferData::new_f32(
            self.source.name(),
            self.source.element_type(),
            out,
        )));
        true
    }

    fn is_valid(&self) -> bool {
        self.topology.is_some()
    }

    fn is_resolved(&self) -> bool {
        self.result.lock().is_some()
    }

    fn result(&self) -> Option<Arc<BufferData>> {
        self.result.lock().clone()
    }

    fn dependency(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }

    fn has_chained_buffer(&self) -> bool {
        false
    }

    fn chained_buffer(&self) -> Option<Arc<dyn BufferSource>> {
        None
    }
}

// ---------------------------------------------------------------------------
// QuadrangulateGpu
// ---------------------------------------------------------------------------

/// GPU primvar quadrangulation.
///
/// Second-phase computation: it produces no CPU-visible buffer. The named
/// source primvar must already be resident at `points_offset` elements
/// within the range; the dispatch fills the synthetic-point region in
/// place. Dispatch failures land on the backend's polled error channel.
pub struct QuadrangulateGpu {
    id: ScenePath,
    topology: Option<Arc<MeshTopology>>,
    name: String,
    element_type: ElementType,
}

impl QuadrangulateGpu {
    /// Create the computation for the named resident primvar.
    pub fn new(
        topology: Option<Arc<MeshTopology>>,
        name: impl Into<String>,
        element_type: ElementType,
        id: ScenePath,
    ) -> Self {
        Self {
            id,
            topology,
            name: name.into(),
            element_type,
        }
    }
}

impl GpuComputation for QuadrangulateGpu {
    fn add_buffer_specs(&self, specs: &mut Vec<BufferSpec>) {
        specs.push(BufferSpec::new(
            self.name.clone(),
            self.element_type,
            self.num_output_elements(),
        ));
    }

    fn execute(&self, range: &BufferArrayRange, backend: &dyn GpuBackend) {
        let Some(quad_info) = self.topology.as_ref().and_then(|t| t.quad_info()) else {
            log::warn!(
                "GPU quadrangulation of {} for {} executed before quad info",
                self.name,
                self.id
            );
            return;
        };
        if quad_info.is_all_quads() {
            return;
        }
        let Some(table) = range.resource(QUADRANGULATE_TABLE) else {
            log::warn!("quadrangulate table not resident for {}", self.id);
            return;
        };
        let Some(primvar) = range.resource(&self.name) else {
            log::warn!("primvar {} not resident for {}", self.name, self.id);
            return;
        };

        backend.dispatch_quadrangulate(
            &QuadrangulateDispatch {
                table,
                table_stride: QuadrangulateTableBuilder::table_stride(&quad_info),
                points_offset: quad_info.points_offset,
                num_additional_points: quad_info.num_additional_points,
                components: self.element_type.components(),
            },
            primvar,
        );
    }

    fn num_output_elements(&self) -> usize {
        self.topology
            .as_ref()
            .and_then(|topology| topology.quad_info())
            .map(|info| info.points_offset + info.num_additional_points)
            .unwrap_or(0)
    }
}
