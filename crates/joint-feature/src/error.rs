use joint_ops::JointError;
use tenon_types::BodyId;

/// Errors surfaced by the feature lifecycle.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FeatureError {
    #[error("feature has no selections configured")]
    Unconfigured,

    #[error("feature is suppressed")]
    Suppressed,

    #[error("body {id} is not present in the body store")]
    UnknownBody { id: BodyId },

    #[error(transparent)]
    Joint(#[from] JointError),
}
