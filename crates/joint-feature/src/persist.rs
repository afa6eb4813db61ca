//! Persistence of the feature record.
//!
//! Only the user's intent is persisted: identity, selections, parameters.
//! Regions, patterns, and output revisions are derived and rebuilt by the
//! first recompute after load.

use serde::{Deserialize, Serialize};
use tenon_types::{JointParameters, SelectedFace};
use uuid::Uuid;

use crate::feature::BoxJointFeature;

/// The serialized form of a box joint feature.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub id: Uuid,
    pub name: String,
    pub selections: Vec<SelectedFace>,
    pub parameters: JointParameters,
}

impl FeatureRecord {
    pub fn from_feature(feature: &BoxJointFeature) -> Self {
        Self {
            id: feature.id(),
            name: feature.name().to_owned(),
            selections: feature.selections().to_vec(),
            parameters: feature.parameters().clone(),
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Rehydrate the feature in the unconfigured-until-recomputed state.
    pub fn into_feature(self) -> BoxJointFeature {
        BoxJointFeature::restore(self.id, self.name, self.selections, self.parameters)
    }
}
