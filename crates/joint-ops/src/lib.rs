//! Joint operations: the pure pipeline stages between face selection and
//! committed bodies.
//!
//! Stage order is contact detection ([`detect_contacts`]), finger-pattern
//! synthesis ([`synthesize`]), and joint application ([`apply_pattern`]).
//! Detection and synthesis are read-only and deterministic; application is
//! the only stage that mutates the kernel, and it does so transactionally
//! per contact region.

pub mod apply;
pub mod contact;
pub mod pattern;
pub mod types;

pub use apply::apply_pattern;
pub use contact::{detect_contacts, ContactReport, SelectionInput};
pub use pattern::{synthesize, synthesize_all, validate_parameters};
pub use types::{
    ContactRegion, FingerPattern, FingerSegment, JointError, Owner, ReliefPair,
};
