//! The parametric box joint feature.
//!
//! Wraps the joint-ops pipeline in a timeline citizen: persisted selections
//! and parameters, a recomputation lifecycle, and committed output revisions
//! layered over the upstream bodies in the [`BodyStore`]. Recomputation is
//! always a full rebuild from the current upstream revisions; nothing
//! geometric is cached across recomputes.

pub mod error;
pub mod feature;
pub mod persist;
pub mod store;

pub use error::FeatureError;
pub use feature::{BoxJointFeature, FeatureState, RecomputeReport};
pub use persist::FeatureRecord;
pub use store::BodyStore;
