//! Scenario builders: boards arranged for joints, ready-made features.

use brep_kernel::{MockKernel, SolidHandle};
use joint_feature::{BodyStore, BoxJointFeature};
use tenon_types::{BodyId, FingerSize, JointParameters, SelectedFace};

// ── Error Type ──────────────────────────────────────────────────────────────

/// Unified error type for the test harness.
#[derive(Debug, thiserror::Error)]
pub enum HarnessError {
    #[error("assertion failed: {detail}")]
    AssertionFailed { detail: String },

    #[error("scenario setup failed: {detail}")]
    SetupFailed { detail: String },
}

// ── Scenario Builders ───────────────────────────────────────────────────────

/// A two-board bench: kernel, store, and the ids/handles of both boards.
pub struct JointBench {
    pub kernel: MockKernel,
    pub store: BodyStore,
    pub id_a: BodyId,
    pub id_b: BodyId,
    pub board_a: SolidHandle,
    pub board_b: SolidHandle,
}

impl JointBench {
    pub fn upstream_volume(&self, id: BodyId) -> f64 {
        use brep_kernel::BrepIntrospect;
        self.store
            .upstream(id)
            .and_then(|h| self.kernel.volume(&h).ok())
            .unwrap_or(0.0)
    }
}

/// Two boards in an L: a horizontal board `length x 50 x thickness` with a
/// vertical board of the same length standing on its top face along
/// y in [0, thickness].
pub fn l_bench(length: f64, thickness: f64) -> JointBench {
    let mut kernel = MockKernel::new();
    let board_a = kernel.create_plate([0.0, 0.0, 0.0], [length, 50.0, thickness]);
    let board_b = kernel.create_plate([0.0, 0.0, thickness], [length, thickness, thickness + 50.0]);

    let id_a = BodyId::new();
    let id_b = BodyId::new();
    let mut store = BodyStore::new();
    store.set_upstream(id_a, board_a);
    store.set_upstream(id_b, board_b);

    JointBench {
        kernel,
        store,
        id_a,
        id_b,
        board_a,
        board_b,
    }
}

/// The outside-face selections a user would click for an L bench: the
/// underside of the horizontal board and the outer side of the vertical one.
pub fn l_selections(bench: &JointBench) -> Vec<SelectedFace> {
    vec![
        SelectedFace::by_normal(bench.id_a, [0.0, 0.0, -1.0]),
        SelectedFace::by_normal(bench.id_b, [0.0, -1.0, 0.0]),
    ]
}

/// The reference parameter set used throughout the suites: 10 mm target
/// fingers cut with a 3 mm bit into 6 mm stock.
pub fn reference_params() -> JointParameters {
    JointParameters {
        material_thickness: 6.0,
        finger_size: FingerSize::TargetWidth(10.0),
        tool_radius: 1.5,
        ..Default::default()
    }
}

/// A feature configured for the bench with the given parameters, not yet
/// recomputed.
pub fn joint_feature(bench: &JointBench, params: JointParameters) -> BoxJointFeature {
    let mut feature = BoxJointFeature::new("box joint");
    feature.set_selections(l_selections(bench));
    feature.set_parameters(params);
    feature
}
