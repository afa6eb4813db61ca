use crate::geom::{Plane, PlaneFrame, Polygon};
use crate::types::{FaceHandle, KernelError, SolidHandle, ToolSolid};
use tenon_types::FaceSelector;

/// Mutating kernel operations. The pipeline only ever needs tool-solid
/// construction and the two booleans; everything else is a query.
pub trait BrepKernel {
    /// Materialize a finger prism described by `tool` as a solid.
    fn make_tool_solid(&mut self, tool: &ToolSolid) -> Result<SolidHandle, KernelError>;

    /// Subtract `tool` from `body`, returning a new revision of the body.
    /// The input revision stays valid. Fails with a typed error when the
    /// result would be empty or non-manifold.
    fn boolean_subtract(
        &mut self,
        body: &SolidHandle,
        tool: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;

    /// Union `tool` into `body`, returning a new revision of the body.
    fn boolean_union(
        &mut self,
        body: &SolidHandle,
        tool: &SolidHandle,
    ) -> Result<SolidHandle, KernelError>;
}

/// Read-only queries on kernel geometry.
pub trait BrepIntrospect {
    /// All faces of a solid revision.
    fn body_faces(&self, solid: &SolidHandle) -> Vec<FaceHandle>;

    /// Resolve a persisted face selector against a solid revision.
    fn resolve_face(&self, solid: &SolidHandle, selector: &FaceSelector) -> Option<FaceHandle>;

    fn is_planar(&self, face: FaceHandle) -> bool;

    /// Supporting plane of a planar face, normal pointing out of the body.
    fn face_plane(&self, face: FaceHandle) -> Result<Plane, KernelError>;

    /// Boundary of a planar face as a polygon in a frame on its plane.
    fn face_polygon(&self, face: FaceHandle) -> Result<(PlaneFrame, Polygon), KernelError>;

    /// Faces sharing an edge with `face` on the same body.
    fn adjacent_faces(&self, face: FaceHandle) -> Vec<FaceHandle>;

    /// Overlap of two mating faces: `Some` only when the faces lie in one
    /// plane with opposite outward normals and intersect with positive
    /// area. The returned frame lies on the shared plane with its normal
    /// pointing out of `face_a`'s body.
    fn coplanar_overlap(
        &self,
        face_a: FaceHandle,
        face_b: FaceHandle,
    ) -> Result<Option<(PlaneFrame, Polygon)>, KernelError>;

    fn volume(&self, solid: &SolidHandle) -> Result<f64, KernelError>;
}

/// Combined trait for pipeline stages that interleave queries with boolean
/// operations on the same kernel instance.
///
/// Avoids the borrow-checker issue of needing &mut and & on the same value.
pub trait KernelSession: BrepKernel + BrepIntrospect {
    fn as_introspect(&self) -> &dyn BrepIntrospect;
}

impl<T: BrepKernel + BrepIntrospect> KernelSession for T {
    fn as_introspect(&self) -> &dyn BrepIntrospect {
        self
    }
}
