use crate::geom::PlaneFrame;
use serde::{Deserialize, Serialize};

/// Opaque handle to one revision of a solid in the kernel.
///
/// Boolean operations return a new revision and leave the input revision
/// valid, so a caller can adopt the result or keep the original. Handles are
/// session-scoped and never persisted; `tenon_types::BodyId` is the durable
/// identity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SolidHandle(pub(crate) u64);

impl SolidHandle {
    pub(crate) fn id(&self) -> u64 {
        self.0
    }
}

/// Transient handle to a face of a specific solid revision.
/// Valid only for the current kernel session, never persisted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FaceHandle(pub u64);

/// Errors from kernel operations.
#[derive(Debug, Clone, thiserror::Error)]
pub enum KernelError {
    #[error("boolean operation failed: {reason}")]
    BooleanFailed { reason: String },

    #[error("degenerate geometry: {reason}")]
    Degenerate { reason: String },

    #[error("entity not found: {id}")]
    EntityNotFound { id: u64 },

    #[error("operation not supported: {operation}")]
    NotSupported { operation: String },
}

/// Description of one finger cut/join prism, ready for a boolean operation.
///
/// The prism occupies `axis_range` x `cross_range` in the contact frame and
/// extends `depth` along the negative frame normal, i.e. into the receiving
/// body. Corner relief entries describe tool-radius compensation at the
/// prism's internal walls.
#[derive(Debug, Clone)]
pub struct ToolSolid {
    /// Contact-plane frame: x = pattern axis, y = cross axis, normal = x
    /// cross y pointing out of the receiving body.
    pub frame: PlaneFrame,
    /// Extent along the frame x axis, `start < end`.
    pub axis_range: (f64, f64),
    /// Extent along the frame y axis, `start < end`.
    pub cross_range: (f64, f64),
    /// Extent along the negative frame normal.
    pub depth: f64,
    /// Tool-radius compensation at the prism walls.
    pub reliefs: Vec<CornerRelief>,
}

/// Tool-radius compensation attached to one internal corner of a finger
/// prism, at the wall located at `axis_pos` along the pattern axis.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CornerRelief {
    pub axis_pos: f64,
    pub kind: ReliefKind,
    pub radius: f64,
}

/// Whether a relief rounds a concave corner or enlarges the mating convex
/// corner. A void-free fit requires these to come in equal-radius pairs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReliefKind {
    ConcaveFillet,
    ConvexEnlarge,
}
