//! Shared persisted types for the tenon joint engine.
//!
//! Everything in this crate survives document save/load: body identity,
//! persistent face selectors, and joint parameters. Derived geometry
//! (contact regions, finger patterns) lives in `joint-ops` and is never
//! persisted.

pub mod params;
pub mod refs;

pub use params::{CornerFilletPolicy, FingerSize, JointParameters};
pub use refs::{BodyId, FaceSelector, SelectedFace};
