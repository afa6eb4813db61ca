//! Contact detection: find the planar patches where selected bodies butt
//! against each other.
//!
//! Selections name an *outside* face of each body. The mating patch itself
//! is never selected directly; it is found by walking the faces adjacent to
//! one body's selected face and testing them against the other body's faces
//! for coplanar overlap. This matches how a user thinks about a box joint:
//! pick the two visible outer faces, let the tool find the seam.

use brep_kernel::{BrepIntrospect, FaceHandle, SolidHandle, LINEAR_TOL};
use tenon_types::{BodyId, FaceSelector, JointParameters};
use tracing::debug;

use crate::types::{ContactRegion, JointError};

/// One body participating in the joint, with its selected outside face.
#[derive(Debug, Clone)]
pub struct SelectionInput {
    pub body: BodyId,
    pub solid: SolidHandle,
    pub selector: FaceSelector,
}

/// Dihedral angles this close to flat or folded are rejected.
const DIHEDRAL_TOL_DEG: f64 = 0.01;

struct ResolvedSelection {
    body: BodyId,
    solid: SolidHandle,
    face: FaceHandle,
}

/// Outcome of contact detection: the regions found plus non-fatal problems
/// with individual selections.
#[derive(Debug)]
pub struct ContactReport {
    pub regions: Vec<ContactRegion>,
    pub warnings: Vec<JointError>,
}

/// Detect all contact regions between the selected bodies.
///
/// Considers every ordered pair of selections on distinct bodies; a region
/// lists the body whose face gets pockets cut as `body_a` and the body that
/// grows fingers as `body_b`. Output order is deterministic for a given
/// kernel state.
///
/// A selection that no longer resolves, or resolves to a non-planar face,
/// is dropped with a warning rather than failing the whole detection; the
/// remaining selections can still form joints. Only a configuration that
/// can never yield a joint (fewer than two selections, or every selection
/// on one body) is an error here. Zero regions is not an error; the caller
/// decides what an empty result means.
pub fn detect_contacts(
    kernel: &dyn BrepIntrospect,
    selections: &[SelectionInput],
    params: &JointParameters,
) -> Result<ContactReport, JointError> {
    if selections.len() < 2 {
        return Err(JointError::InvalidSelection {
            reason: "a joint needs at least two selected faces".into(),
        });
    }

    let mut warnings = Vec::new();
    let mut resolved = Vec::with_capacity(selections.len());
    for sel in selections {
        let Some(face) = kernel.resolve_face(&sel.solid, &sel.selector) else {
            warnings.push(JointError::InvalidSelection {
                reason: format!("selector {:?} matches no face", sel.selector),
            });
            continue;
        };
        if !kernel.is_planar(face) {
            warnings.push(JointError::InvalidSelection {
                reason: "selected face is not planar".into(),
            });
            continue;
        }
        resolved.push(ResolvedSelection {
            body: sel.body,
            solid: sel.solid,
            face,
        });
    }

    if !resolved.is_empty() && resolved.iter().all(|r| r.body == resolved[0].body) {
        return Err(JointError::InvalidSelection {
            reason: "selected faces all belong to one body".into(),
        });
    }

    let mut regions = Vec::new();
    for a in &resolved {
        for b in &resolved {
            if a.body == b.body {
                continue;
            }
            collect_pair_regions(kernel, a, b, params, &mut regions, &mut warnings)?;
        }
    }

    // Deterministic order independent of HashMap iteration inside the
    // kernel: by body pair, then by position on the shared plane.
    regions.sort_by(|l, r| {
        (l.body_a, l.body_b)
            .cmp(&(r.body_a, r.body_b))
            .then_with(|| total_cmp_point(&l.frame.origin, &r.frame.origin))
    });
    Ok(ContactReport { regions, warnings })
}

fn total_cmp_point(l: &nalgebra::Point3<f64>, r: &nalgebra::Point3<f64>) -> std::cmp::Ordering {
    l.x.total_cmp(&r.x)
        .then(l.y.total_cmp(&r.y))
        .then(l.z.total_cmp(&r.z))
}

/// Find regions where body B butts against body A.
///
/// A butting face of B is adjacent to B's selected outside face, parallel to
/// A's selected outside face but not coplanar with it, and pressed flat
/// against some face of A with positive overlap.
fn collect_pair_regions(
    kernel: &dyn BrepIntrospect,
    a: &ResolvedSelection,
    b: &ResolvedSelection,
    params: &JointParameters,
    out: &mut Vec<ContactRegion>,
    warnings: &mut Vec<JointError>,
) -> Result<(), JointError> {
    let plane_a_sel = kernel.face_plane(a.face)?;
    let plane_b_sel = kernel.face_plane(b.face)?;

    let dihedral_deg = 180.0 - plane_a_sel.normal_angle_deg(&plane_b_sel);
    if dihedral_deg < DIHEDRAL_TOL_DEG || dihedral_deg > 180.0 - DIHEDRAL_TOL_DEG {
        debug!(dihedral_deg, "skipping flush or folded face pair");
        return Ok(());
    }

    for butting in kernel.adjacent_faces(b.face) {
        if !kernel.is_planar(butting) {
            continue;
        }
        let butting_plane = kernel.face_plane(butting)?;
        if !butting_plane.is_parallel(&plane_a_sel)
            || butting_plane.is_coincident(&plane_a_sel)
        {
            continue;
        }
        for face_a in kernel.body_faces(&a.solid) {
            if !kernel.is_planar(face_a) {
                continue;
            }
            let Some((frame, polygon)) = kernel.coplanar_overlap(face_a, butting)? else {
                continue;
            };
            if polygon.area() < LINEAR_TOL {
                continue;
            }
            // A strip narrower than the minimum feature size in either
            // in-plane direction is a sliver no tool can cut.
            let (lo, hi) = polygon.bounds();
            let (dx, dy) = (hi.x - lo.x, hi.y - lo.y);
            if dx.min(dy) < params.min_feature_size {
                warnings.push(JointError::DegenerateRegion {
                    reason: format!(
                        "contact overlap {:.3} x {:.3} mm is narrower than the minimum feature size {:.3} mm",
                        dx, dy, params.min_feature_size
                    ),
                });
                continue;
            }
            debug!(
                body_a = %a.body,
                body_b = %b.body,
                area = polygon.area(),
                dihedral_deg,
                "contact region found"
            );
            out.push(ContactRegion {
                body_a: a.body,
                face_a,
                body_b: b.body,
                face_b: butting,
                frame,
                polygon,
                dihedral_deg,
            });
        }
    }
    Ok(())
}
