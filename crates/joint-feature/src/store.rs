//! The body store: the feature's view of the host timeline boundary.
//!
//! Upstream revisions belong to the features (or imports) before this one in
//! the timeline. The box joint feature never mutates them; its committed
//! outputs are layered on top by [`crate::BoxJointFeature`], so dropping the
//! feature's outputs restores the upstream shapes with no kernel work.

use std::collections::HashMap;

use brep_kernel::SolidHandle;
use tenon_types::BodyId;

/// Upstream body revisions, keyed by durable identity.
#[derive(Debug, Default)]
pub struct BodyStore {
    upstream: HashMap<BodyId, SolidHandle>,
}

impl BodyStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register or replace the upstream revision of a body. Replacing is how
    /// an upstream edit reaches the feature: the next recompute starts from
    /// the new revision.
    pub fn set_upstream(&mut self, id: BodyId, solid: SolidHandle) {
        self.upstream.insert(id, solid);
    }

    pub fn upstream(&self, id: BodyId) -> Option<SolidHandle> {
        self.upstream.get(&id).copied()
    }

    pub fn bodies(&self) -> impl Iterator<Item = BodyId> + '_ {
        self.upstream.keys().copied()
    }
}
