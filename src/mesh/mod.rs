//! Mesh topology and quadrangulation.
//!
//! A [`MeshTopology`] describes authored polygonal faces: a run of face
//! arities and the flattened vertex indices they consume. Faces of arity 4
//! pass through untouched; every other face is quadrangulated by inserting
//! synthetic points — one midpoint per edge and one center per face — and
//! fanning quads around the center. The bookkeeping for those synthetic
//! points is the cached [`QuadInfo`] artifact, rebuilt whenever the
//! topology is marked dirty and shared read-only by every dependent
//! computation in the [`quadrangulate`] module.
//!
//! Quadrangulated buffers lay out the original points first, then the
//! synthetic points: for each non-quad face, its edge midpoints in edge
//! order followed by its center. `QuadInfo::points_offset` marks the start
//! of the synthetic region.

pub mod quadrangulate;

use parking_lot::RwLock;
use std::sync::Arc;

use crate::scene::ScenePath;

/// Derived quadrangulation bookkeeping for one topology.
///
/// `num_verts` holds the arity of every non-quad face in face order;
/// `verts` holds the flattened original-vertex indices those faces consume,
/// ordered to match.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QuadInfo {
    /// Count of original points; start of the synthetic-point region.
    pub points_offset: usize,
    /// Synthetic points appended after the original points.
    pub num_additional_points: usize,
    /// Largest non-quad face arity encountered.
    pub max_num_vert: usize,
    /// Arity of each non-quad face, in face order.
    pub num_verts: Vec<i32>,
    /// Original-vertex indices of the non-quad faces, flattened.
    pub verts: Vec<i32>,
}

impl QuadInfo {
    /// Returns true if the mesh is all-quads.
    ///
    /// When true, downstream computations degenerate to a pass-through
    /// copy of their source.
    pub fn is_all_quads(&self) -> bool {
        self.num_additional_points == 0
    }
}

/// Polygonal mesh topology: ordered face arities plus flattened vertex
/// indices.
///
/// The topology is owned externally and referenced (never owned) by the
/// quadrangulation computations; it must not change for the duration of a
/// computation pass. It exclusively owns the cached [`QuadInfo`], which the
/// quad-info builder installs and dependents read.
#[derive(Debug)]
pub struct MeshTopology {
    id: ScenePath,
    face_vertex_counts: Vec<i32>,
    face_vertex_indices: Vec<i32>,
    num_points: usize,
    quad_info: RwLock<Option<Arc<QuadInfo>>>,
}

impl MeshTopology {
    /// Create a new topology.
    ///
    /// `num_points` is the point count of the mesh's points primvar, which
    /// bounds the valid vertex indices.
    pub fn new(
        id: ScenePath,
        face_vertex_counts: Vec<i32>,
        face_vertex_indices: Vec<i32>,
        num_points: usize,
    ) -> Self {
        Self {
            id,
            face_vertex_counts,
            face_vertex_indices,
            num_points,
            quad_info: RwLock::new(None),
        }
    }

    /// Identity of the mesh this topology belongs to.
    pub fn id(&self) -> &ScenePath {
        &self.id
    }

    /// Per-face arities, in face order.
    pub fn face_vertex_counts(&self) -> &[i32] {
        &self.face_vertex_counts
    }

    /// Flattened vertex indices consumed by the faces.
    pub fn face_vertex_indices(&self) -> &[i32] {
        &self.face_vertex_indices
    }

    /// Point count of the mesh's points primvar.
    pub fn num_points(&self) -> usize {
        self.num_points
    }

    /// Total number of face corners (sum of arities).
    pub fn num_face_corners(&self) -> usize {
        self.face_vertex_counts.iter().map(|&n| n as usize).sum()
    }

    /// The cached quadrangulation info, if the builder has resolved.
    pub fn quad_info(&self) -> Option<Arc<QuadInfo>> {
        self.quad_info.read().clone()
    }

    /// Drop the cached quadrangulation info. Called when the topology is
    /// marked dirty; the next quad-info builder resolve repopulates it.
    pub fn invalidate_quad_info(&self) {
        *self.quad_info.write() = None;
    }

    pub(crate) fn set_quad_info(&self, info: Arc<QuadInfo>) {
        *self.quad_info.write() = Some(info);
    }
}

// Topologies are shared read-only across computation nodes.
static_assertions::assert_impl_all!(MeshTopology: Send, Sync);
