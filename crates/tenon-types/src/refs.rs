use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identity of a solid body owned by the host timeline.
///
/// Bodies are referenced by identity, never by value: the kernel hands out
/// transient revision handles for the current shape, but a `BodyId` stays
/// valid across rebuilds and document reloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyId(pub Uuid);

impl BodyId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for BodyId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for BodyId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// A persisted reference to one outside face of a body.
///
/// Resolved to a transient face handle at recomputation time. If the face no
/// longer resolves (body deleted, face consumed by an upstream edit) or
/// resolves to a non-planar face, the feature reports `InvalidSelection`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SelectedFace {
    pub body: BodyId,
    pub selector: FaceSelector,
}

impl SelectedFace {
    pub fn by_normal(body: BodyId, direction: [f64; 3]) -> Self {
        Self {
            body,
            selector: FaceSelector::OutwardNormal { direction },
        }
    }
}

/// How to find a specific face of a body across rebuilds.
///
/// The durable analog of a host entity token: selectors describe the face
/// geometrically instead of naming a kernel-internal id.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum FaceSelector {
    /// Match the planar face whose outward normal is closest to `direction`.
    OutwardNormal { direction: [f64; 3] },
    /// Match the face whose centroid is nearest to `point`.
    NearPoint { point: [f64; 3] },
}
