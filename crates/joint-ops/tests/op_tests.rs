//! Pipeline tests over the mock kernel: two boards in an L configuration,
//! joined along the strip where the vertical board stands on the
//! horizontal one.

use approx::assert_relative_eq;
use brep_kernel::{
    BrepIntrospect, BrepKernel, MockKernel, PlaneFrame, ReliefKind, SolidHandle, ToolSolid,
};
use joint_ops::{apply_pattern, detect_contacts, synthesize, JointError, Owner, SelectionInput};
use nalgebra::{Point3, Vector3};
use tenon_types::{BodyId, FaceSelector, FingerSize, JointParameters};

/// Horizontal board, 100 x 50 x 6 mm.
fn board_a(kernel: &mut MockKernel) -> SolidHandle {
    kernel.create_plate([0.0, 0.0, 0.0], [100.0, 50.0, 6.0])
}

/// Vertical board standing on A's top face along y in [0, 6].
fn board_b(kernel: &mut MockKernel) -> SolidHandle {
    kernel.create_plate([0.0, 0.0, 6.0], [100.0, 6.0, 56.0])
}

fn selections(a: SolidHandle, b: SolidHandle) -> (Vec<SelectionInput>, BodyId, BodyId) {
    let id_a = BodyId::new();
    let id_b = BodyId::new();
    let sels = vec![
        SelectionInput {
            body: id_a,
            solid: a,
            selector: FaceSelector::OutwardNormal {
                direction: [0.0, 0.0, -1.0],
            },
        },
        SelectionInput {
            body: id_b,
            solid: b,
            selector: FaceSelector::OutwardNormal {
                direction: [0.0, -1.0, 0.0],
            },
        },
    ];
    (sels, id_a, id_b)
}

fn params() -> JointParameters {
    JointParameters {
        finger_size: FingerSize::TargetWidth(10.0),
        tool_radius: 1.5,
        ..Default::default()
    }
}

// ── detection ───────────────────────────────────────────────────────────

#[test]
fn l_configuration_yields_one_region() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, id_a, id_b) = selections(a, b);

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    assert_eq!(regions.len(), 1);

    let region = &regions[0];
    assert_eq!(region.body_a, id_a);
    assert_eq!(region.body_b, id_b);
    assert_relative_eq!(region.dihedral_deg, 90.0);
    assert_relative_eq!(region.polygon.area(), 600.0);
    // Normal points out of A, up into B.
    assert_relative_eq!(region.frame.normal().z, 1.0);
}

#[test]
fn detection_is_deterministic() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, _, _) = selections(a, b);

    let first = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    let second = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    assert_eq!(first.len(), second.len());
    for (l, r) in first.iter().zip(&second) {
        assert_eq!(l.face_a, r.face_a);
        assert_eq!(l.face_b, r.face_b);
        assert_relative_eq!(l.polygon.area(), r.polygon.area());
    }
}

#[test]
fn separated_boards_yield_no_regions() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    // Floating 10 mm above A.
    let b = kernel.create_plate([0.0, 0.0, 16.0], [100.0, 6.0, 66.0]);
    let (sels, _, _) = selections(a, b);

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    assert!(regions.is_empty());
}

#[test]
fn single_selection_is_invalid() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let sels = vec![SelectionInput {
        body: BodyId::new(),
        solid: a,
        selector: FaceSelector::OutwardNormal {
            direction: [0.0, 0.0, -1.0],
        },
    }];
    let err = detect_contacts(&kernel, &sels, &params()).unwrap_err();
    assert!(matches!(err, JointError::InvalidSelection { .. }));
}

#[test]
fn unresolvable_selector_is_dropped_with_a_warning() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (mut sels, _, _) = selections(a, b);
    // Third selection on a body that never registered faces.
    sels.push(SelectionInput {
        body: BodyId::new(),
        solid: a,
        selector: FaceSelector::OutwardNormal {
            direction: [0.577, 0.577, 0.577],
        },
    });

    let report = detect_contacts(&kernel, &sels, &params()).unwrap();
    assert_eq!(report.regions.len(), 1);
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        JointError::InvalidSelection { .. }
    ));
}

#[test]
fn sliver_overlap_is_dropped_as_degenerate() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    // A 1 mm veneer standing on A: the seam is 100 mm long but only 1 mm
    // wide, below the minimum feature size.
    let b = kernel.create_plate([0.0, 0.0, 6.0], [100.0, 1.0, 56.0]);
    let (sels, _, _) = selections(a, b);

    let report = detect_contacts(&kernel, &sels, &params()).unwrap();
    assert!(report.regions.is_empty());
    assert_eq!(report.warnings.len(), 1);
    assert!(matches!(
        report.warnings[0],
        JointError::DegenerateRegion { .. }
    ));
}

#[test]
fn selections_on_one_body_are_invalid() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let id = BodyId::new();
    let sels = vec![
        SelectionInput {
            body: id,
            solid: a,
            selector: FaceSelector::OutwardNormal {
                direction: [0.0, 0.0, -1.0],
            },
        },
        SelectionInput {
            body: id,
            solid: a,
            selector: FaceSelector::OutwardNormal {
                direction: [0.0, 0.0, 1.0],
            },
        },
    ];
    let err = detect_contacts(&kernel, &sels, &params()).unwrap_err();
    assert!(matches!(err, JointError::InvalidSelection { .. }));
}

// ── end to end ──────────────────────────────────────────────────────────

#[test]
fn joint_conserves_total_volume() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, _, _) = selections(a, b);

    let total_before = kernel.volume(&a).unwrap() + kernel.volume(&b).unwrap();

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    let pattern = synthesize(&regions[0], &params()).unwrap();
    let (a2, b2) = apply_pattern(&mut kernel, &a, &b, &pattern).unwrap();

    let total_after = kernel.volume(&a2).unwrap() + kernel.volume(&b2).unwrap();
    assert_relative_eq!(total_after, total_before);

    // 10 segments, 5 owned by B: 5 pockets out of A, 5 fingers onto B.
    let pocket_volume = 10.0 * 6.0 * 6.0;
    assert_relative_eq!(
        kernel.volume(&a2).unwrap(),
        kernel.volume(&a).unwrap() - 5.0 * pocket_volume
    );
    assert_relative_eq!(
        kernel.volume(&b2).unwrap(),
        kernel.volume(&b).unwrap() + 5.0 * pocket_volume
    );
}

#[test]
fn applied_tools_carry_matched_reliefs() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, _, _) = selections(a, b);

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    let pattern = synthesize(&regions[0], &params()).unwrap();
    let (a2, b2) = apply_pattern(&mut kernel, &a, &b, &pattern).unwrap();

    let cuts = kernel.applied_cuts(&a2);
    let joins = kernel.applied_joins(&b2);
    assert_eq!(cuts.len(), 5);
    assert_eq!(joins.len(), 5);

    // Every pocket wall at an internal boundary is filleted, and the finger
    // carries the matching enlargement at the same position and radius.
    let mut fillets = 0;
    for (cut, join) in cuts.iter().zip(joins) {
        assert_eq!(cut.reliefs.len(), join.reliefs.len());
        for (cr, jr) in cut.reliefs.iter().zip(&join.reliefs) {
            assert_eq!(cr.kind, ReliefKind::ConvexEnlarge);
            assert_eq!(jr.kind, ReliefKind::ConcaveFillet);
            assert_relative_eq!(cr.axis_pos, jr.axis_pos);
            assert_relative_eq!(cr.radius, jr.radius);
            assert_relative_eq!(cr.radius, 1.5);
            fillets += 1;
        }
    }
    // 9 internal boundaries, but only the 5 B-owned segments carry tools
    // and each interior B segment touches two boundaries.
    assert_eq!(fillets, 9);
}

#[test]
fn first_and_last_fingers_stay_on_body_a() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, _, _) = selections(a, b);

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    let pattern = synthesize(&regions[0], &params()).unwrap();
    assert_eq!(pattern.segments.first().unwrap().owner, Owner::BodyA);
    assert_eq!(pattern.segments.last().unwrap().owner, Owner::BodyA);
}

#[test]
fn failed_application_leaves_input_revisions_intact() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, _, _) = selections(a, b);

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    let mut pattern = synthesize(&regions[0], &params()).unwrap();
    // Sabotage: move the pattern far from both bodies so the first
    // subtraction removes nothing.
    pattern.frame = PlaneFrame::new(
        Point3::new(0.0, 0.0, 500.0),
        Vector3::x(),
        Vector3::y(),
    );

    let vol_a = kernel.volume(&a).unwrap();
    let vol_b = kernel.volume(&b).unwrap();
    let err = apply_pattern(&mut kernel, &a, &b, &pattern).unwrap_err();
    assert!(matches!(err, JointError::BooleanFailure(_)));

    assert_relative_eq!(kernel.volume(&a).unwrap(), vol_a);
    assert_relative_eq!(kernel.volume(&b).unwrap(), vol_b);
    assert!(kernel.applied_cuts(&a).is_empty());
}

#[test]
fn reapplying_to_old_revisions_reproduces_the_result() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, _, _) = selections(a, b);

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    let pattern = synthesize(&regions[0], &params()).unwrap();

    let (a1, b1) = apply_pattern(&mut kernel, &a, &b, &pattern).unwrap();
    let (a2, b2) = apply_pattern(&mut kernel, &a, &b, &pattern).unwrap();
    assert_relative_eq!(kernel.volume(&a1).unwrap(), kernel.volume(&a2).unwrap());
    assert_relative_eq!(kernel.volume(&b1).unwrap(), kernel.volume(&b2).unwrap());
}

// ── tool construction ───────────────────────────────────────────────────

#[test]
fn pocket_prisms_span_the_receiving_thickness() {
    let mut kernel = MockKernel::new();
    let a = board_a(&mut kernel);
    let b = board_b(&mut kernel);
    let (sels, _, _) = selections(a, b);

    let regions = detect_contacts(&kernel, &sels, &params()).unwrap().regions;
    let pattern = synthesize(&regions[0], &params()).unwrap();
    assert_relative_eq!(pattern.depth, 6.0);

    let (a2, _) = apply_pattern(&mut kernel, &a, &b, &pattern).unwrap();
    for cut in kernel.applied_cuts(&a2) {
        assert_relative_eq!(cut.bbox.min[2], 0.0);
        assert_relative_eq!(cut.bbox.max[2], 6.0);
        assert_relative_eq!(cut.bbox.min[1], 0.0);
        assert_relative_eq!(cut.bbox.max[1], 6.0);
    }
}

#[test]
fn tool_solid_fails_closed_on_degenerate_ranges() {
    let mut kernel = MockKernel::new();
    let frame = PlaneFrame::new(Point3::origin(), Vector3::x(), Vector3::y());
    let tool = ToolSolid {
        frame,
        axis_range: (3.0, 3.0),
        cross_range: (0.0, 6.0),
        depth: 6.0,
        reliefs: Vec::new(),
    };
    assert!(kernel.make_tool_solid(&tool).is_err());
}
