use brep_kernel::{FaceHandle, KernelError, PlaneFrame, Polygon};
use tenon_types::BodyId;

/// One planar patch where two bodies press together.
///
/// Regions are session-scoped: face handles and the frame are only valid
/// against the kernel revisions they were detected on. The frame normal
/// points out of `body_a`, i.e. into the space `body_b` occupies.
#[derive(Debug, Clone)]
pub struct ContactRegion {
    pub body_a: BodyId,
    pub face_a: FaceHandle,
    pub body_b: BodyId,
    pub face_b: FaceHandle,
    pub frame: PlaneFrame,
    pub polygon: Polygon,
    /// Interior angle between the two selected outside faces, in degrees,
    /// strictly inside (0, 180).
    pub dihedral_deg: f64,
}

/// Which body keeps the material of a finger segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Owner {
    BodyA,
    BodyB,
}

/// One finger along the pattern axis, `start < end` in frame x coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FingerSegment {
    pub start: f64,
    pub end: f64,
    pub owner: Owner,
}

impl FingerSegment {
    pub fn width(&self) -> f64 {
        self.end - self.start
    }
}

/// Matched tool-radius compensation at one internal segment boundary: a
/// concave fillet on the receiving side and an equal-radius convex
/// enlargement on the protruding side, so the assembled joint has no voids.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReliefPair {
    pub axis_pos: f64,
    pub radius: f64,
}

/// A synthesized finger pattern for one contact region.
///
/// Segments partition `axis_span` exactly with equal widths and alternate
/// ownership starting with [`Owner::BodyA`]. Identical inputs always produce
/// an identical pattern.
#[derive(Debug, Clone)]
pub struct FingerPattern {
    /// Contact frame, x axis along the pattern direction, normal out of
    /// body A.
    pub frame: PlaneFrame,
    /// Margin-trimmed extent of the pattern along the frame x axis.
    pub axis_span: (f64, f64),
    /// Extent of the contact across the pattern, along the frame y axis.
    pub cross_range: (f64, f64),
    /// How deep each finger reaches into the receiving body.
    pub depth: f64,
    pub segments: Vec<FingerSegment>,
    /// One pair per internal boundary; empty when corner rounding is
    /// disabled or the tool radius is zero.
    pub relief_pairs: Vec<ReliefPair>,
}

impl FingerPattern {
    pub fn span(&self) -> f64 {
        self.axis_span.1 - self.axis_span.0
    }
}

/// Errors from the joint pipeline.
#[derive(Debug, Clone, thiserror::Error)]
pub enum JointError {
    #[error("invalid selection: {reason}")]
    InvalidSelection { reason: String },

    #[error("no contact region found between the selected faces")]
    NoContactFound,

    #[error("contact region unusable: {reason}")]
    DegenerateRegion { reason: String },

    #[error("parameter conflict: {reason}")]
    ParameterConflict { reason: String },

    #[error("kernel boolean failed")]
    BooleanFailure(#[from] KernelError),
}

impl JointError {
    /// Rank for picking the most informative error when every region of a
    /// recompute failed. Higher is more specific.
    pub fn specificity(&self) -> u8 {
        match self {
            JointError::ParameterConflict { .. } => 4,
            JointError::DegenerateRegion { .. } => 3,
            JointError::BooleanFailure(_) => 2,
            JointError::InvalidSelection { .. } => 1,
            JointError::NoContactFound => 0,
        }
    }
}
