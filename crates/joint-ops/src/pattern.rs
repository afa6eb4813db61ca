//! Finger-pattern synthesis: partition a contact region into alternating
//! segments along its primary axis.
//!
//! Synthesis is pure and deterministic. All widths come out of one exact
//! division, so the segments partition the span with no residue and a
//! recompute over unchanged inputs reproduces the pattern bit for bit.

use brep_kernel::PlaneFrame;
use rayon::prelude::*;
use tenon_types::{CornerFilletPolicy, FingerSize, JointParameters};
use tracing::debug;

use crate::types::{ContactRegion, FingerPattern, FingerSegment, JointError, Owner, ReliefPair};

/// Synthesize the finger pattern for one contact region.
///
/// The pattern axis is the longer in-plane dimension of the contact polygon.
/// Segment count honors the sizing rule and the finger-count bounds; every
/// segment gets the same width. Ownership alternates starting with body A,
/// so the first and last fingers stay on the pocketed body.
pub fn synthesize(
    region: &ContactRegion,
    params: &JointParameters,
) -> Result<FingerPattern, JointError> {
    validate_parameters(params)?;

    let (bounds_min, bounds_max) = region.polygon.bounds();
    let dx = bounds_max.x - bounds_min.x;
    let dy = bounds_max.y - bounds_min.y;

    // Orient the frame so x runs along the longer dimension, keeping the
    // normal unchanged (x' = y, y' = -x is a rotation in the plane).
    let (frame, axis_lo, axis_hi, cross_range) = if dy > dx {
        let rotated = PlaneFrame::new(
            region.frame.origin,
            region.frame.y.into_inner(),
            -region.frame.x.into_inner(),
        );
        (rotated, bounds_min.y, bounds_max.y, (-bounds_max.x, -bounds_min.x))
    } else {
        (
            region.frame,
            bounds_min.x,
            bounds_max.x,
            (bounds_min.y, bounds_max.y),
        )
    };

    let start = axis_lo + params.margin;
    let end = axis_hi - params.margin;
    let span = end - start;
    if span < params.min_feature_size {
        return Err(JointError::DegenerateRegion {
            reason: format!(
                "contact span {:.3} mm after margins is below the minimum feature size {:.3} mm",
                span, params.min_feature_size
            ),
        });
    }

    let n = segment_count(span, params)?;
    let width = span / n as f64;
    if width > params.max_finger_width + 1e-9 {
        return Err(JointError::ParameterConflict {
            reason: format!(
                "finger width {:.3} mm exceeds the maximum finger width {:.3} mm",
                width, params.max_finger_width
            ),
        });
    }
    if width < params.min_finger_width - 1e-9 {
        let err_reason = format!(
            "finger width {:.3} mm is below the minimum finger width {:.3} mm",
            width, params.min_finger_width
        );
        return Err(match params.finger_size {
            // An explicit count asked for the impossible.
            FingerSize::Count(_) => JointError::ParameterConflict { reason: err_reason },
            // The span simply cannot hold two fingers of the minimum width.
            FingerSize::TargetWidth(_) => JointError::DegenerateRegion { reason: err_reason },
        });
    }
    if width < params.min_feature_size {
        return Err(JointError::DegenerateRegion {
            reason: format!(
                "finger width {:.3} mm is below the minimum feature size {:.3} mm",
                width, params.min_feature_size
            ),
        });
    }
    if 2.0 * params.tool_radius > width {
        return Err(JointError::ParameterConflict {
            reason: format!(
                "tool diameter {:.3} mm exceeds finger width {:.3} mm",
                2.0 * params.tool_radius,
                width
            ),
        });
    }

    let segments: Vec<FingerSegment> = (0..n)
        .map(|i| FingerSegment {
            start: start + i as f64 * width,
            end: start + (i + 1) as f64 * width,
            owner: if i % 2 == 0 { Owner::BodyA } else { Owner::BodyB },
        })
        .collect();

    let relief_pairs = match params.corner_fillet_policy {
        CornerFilletPolicy::RoundBoth if params.tool_radius > 0.0 => (1..n)
            .map(|i| ReliefPair {
                axis_pos: start + i as f64 * width,
                radius: params.tool_radius,
            })
            .collect(),
        _ => Vec::new(),
    };

    debug!(
        segments = n,
        width,
        span,
        reliefs = relief_pairs.len(),
        "finger pattern synthesized"
    );

    Ok(FingerPattern {
        frame,
        axis_span: (start, end),
        cross_range,
        depth: params.material_thickness,
        segments,
        relief_pairs,
    })
}

/// Synthesize patterns for many regions in parallel.
///
/// Per-region failures are kept in place so the caller can commit the
/// regions that worked and report the ones that did not.
pub fn synthesize_all(
    regions: &[ContactRegion],
    params: &JointParameters,
) -> Vec<Result<FingerPattern, JointError>> {
    regions
        .par_iter()
        .map(|region| synthesize(region, params))
        .collect()
}

/// Geometry-independent parameter validation. A conflict here is fatal for
/// the whole recompute, not a per-region condition.
pub fn validate_parameters(params: &JointParameters) -> Result<(), JointError> {
    if params.material_thickness <= 0.0 {
        return Err(JointError::ParameterConflict {
            reason: "material thickness must be positive".into(),
        });
    }
    if params.tool_radius < 0.0 {
        return Err(JointError::ParameterConflict {
            reason: "tool radius cannot be negative".into(),
        });
    }
    if params.margin < 0.0 {
        return Err(JointError::ParameterConflict {
            reason: "margin cannot be negative".into(),
        });
    }
    if params.min_fingers > params.max_fingers {
        return Err(JointError::ParameterConflict {
            reason: format!(
                "min fingers {} exceeds max fingers {}",
                params.min_fingers, params.max_fingers
            ),
        });
    }
    if params.min_finger_width < 0.0 {
        return Err(JointError::ParameterConflict {
            reason: "minimum finger width cannot be negative".into(),
        });
    }
    if params.min_finger_width > params.max_finger_width {
        return Err(JointError::ParameterConflict {
            reason: format!(
                "minimum finger width {:.3} mm exceeds maximum finger width {:.3} mm",
                params.min_finger_width, params.max_finger_width
            ),
        });
    }
    if let FingerSize::TargetWidth(w) = params.finger_size {
        if w <= 0.0 {
            return Err(JointError::ParameterConflict {
                reason: "target finger width must be positive".into(),
            });
        }
    }
    Ok(())
}

/// A joint needs at least one finger on each body.
const MIN_SEGMENTS: u32 = 2;

fn segment_count(span: f64, params: &JointParameters) -> Result<u32, JointError> {
    let lower = params.min_fingers.max(MIN_SEGMENTS);
    match params.finger_size {
        FingerSize::Count(c) => {
            if c < MIN_SEGMENTS {
                return Err(JointError::ParameterConflict {
                    reason: format!("finger count {} is below the minimum of {}", c, MIN_SEGMENTS),
                });
            }
            if c < params.min_fingers || c > params.max_fingers {
                return Err(JointError::ParameterConflict {
                    reason: format!(
                        "finger count {} is outside the bounds [{}, {}]",
                        c, params.min_fingers, params.max_fingers
                    ),
                });
            }
            Ok(c)
        }
        FingerSize::TargetWidth(w) => {
            let ideal = (span / w).round() as u32;
            let mut n = ideal.clamp(lower, params.max_fingers);
            // Adjust the count rather than reject when the target width
            // lands outside the width bounds.
            if span / n as f64 > params.max_finger_width {
                n = ((span / params.max_finger_width).ceil() as u32)
                    .clamp(lower, params.max_fingers);
            } else if span / (n as f64) < params.min_finger_width {
                let widest = (span / params.min_finger_width).floor() as u32;
                n = widest.clamp(lower, params.max_fingers);
            }
            Ok(n)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use brep_kernel::Polygon;
    use nalgebra::{Point2, Point3, Vector3};
    use proptest::prelude::*;
    use tenon_types::BodyId;

    fn region(length: f64, width: f64) -> ContactRegion {
        ContactRegion {
            body_a: BodyId::new(),
            face_a: brep_kernel::FaceHandle(1),
            body_b: BodyId::new(),
            face_b: brep_kernel::FaceHandle(2),
            frame: PlaneFrame::new(Point3::origin(), Vector3::x(), Vector3::y()),
            polygon: Polygon::rectangle(
                Point2::new(-length / 2.0, -width / 2.0),
                Point2::new(length / 2.0, width / 2.0),
            ),
            dihedral_deg: 90.0,
        }
    }

    fn params() -> JointParameters {
        JointParameters {
            material_thickness: 6.0,
            finger_size: FingerSize::TargetWidth(10.0),
            tool_radius: 1.5,
            ..Default::default()
        }
    }

    // ── sizing ──────────────────────────────────────────────────────────

    #[test]
    fn hundred_mm_at_ten_mm_target_gives_ten_segments() {
        let pattern = synthesize(&region(100.0, 6.0), &params()).unwrap();
        assert_eq!(pattern.segments.len(), 10);
        for seg in &pattern.segments {
            assert_relative_eq!(seg.width(), 10.0);
        }
        let a = pattern
            .segments
            .iter()
            .filter(|s| s.owner == Owner::BodyA)
            .count();
        assert_eq!(a, 5);
        assert_eq!(pattern.relief_pairs.len(), 9);
    }

    #[test]
    fn ownership_alternates_starting_with_body_a() {
        let pattern = synthesize(&region(100.0, 6.0), &params()).unwrap();
        for (i, seg) in pattern.segments.iter().enumerate() {
            let expect = if i % 2 == 0 { Owner::BodyA } else { Owner::BodyB };
            assert_eq!(seg.owner, expect);
        }
    }

    #[test]
    fn segments_partition_span_exactly() {
        let pattern = synthesize(&region(103.7, 6.0), &params()).unwrap();
        let (start, end) = pattern.axis_span;
        assert_relative_eq!(pattern.segments[0].start, start);
        assert_relative_eq!(pattern.segments.last().unwrap().end, end);
        for w in pattern.segments.windows(2) {
            assert_relative_eq!(w[0].end, w[1].start);
        }
    }

    #[test]
    fn explicit_count_overrides_target_width() {
        let p = JointParameters {
            finger_size: FingerSize::Count(4),
            ..params()
        };
        let pattern = synthesize(&region(100.0, 6.0), &p).unwrap();
        assert_eq!(pattern.segments.len(), 4);
        assert_relative_eq!(pattern.segments[0].width(), 25.0);
    }

    #[test]
    fn margin_trims_both_ends() {
        let p = JointParameters {
            margin: 5.0,
            ..params()
        };
        let pattern = synthesize(&region(100.0, 6.0), &p).unwrap();
        assert_relative_eq!(pattern.axis_span.0, -45.0);
        assert_relative_eq!(pattern.axis_span.1, 45.0);
        assert_eq!(pattern.segments.len(), 9);
    }

    #[test]
    fn pattern_axis_follows_longer_dimension() {
        // 6 mm along x, 100 mm along y: the frame must rotate.
        let pattern = synthesize(&region(6.0, 100.0), &params()).unwrap();
        assert_relative_eq!(pattern.span(), 100.0);
        let n = pattern.frame.normal();
        assert_relative_eq!(n.z, 1.0);
    }

    #[test]
    fn min_width_bound_lowers_the_count() {
        let p = JointParameters {
            min_finger_width: 12.0,
            ..params()
        };
        // 10 mm target would give 10 fingers of 10 mm; the bound forces
        // fewer, wider fingers instead of a rejection.
        let pattern = synthesize(&region(100.0, 6.0), &p).unwrap();
        assert_eq!(pattern.segments.len(), 8);
        assert_relative_eq!(pattern.segments[0].width(), 12.5);
    }

    #[test]
    fn max_width_bound_raises_the_count() {
        let p = JointParameters {
            finger_size: FingerSize::TargetWidth(40.0),
            max_finger_width: 15.0,
            ..params()
        };
        let pattern = synthesize(&region(100.0, 6.0), &p).unwrap();
        assert_eq!(pattern.segments.len(), 7);
        assert!(pattern.segments[0].width() <= 15.0);
    }

    #[test]
    fn explicit_count_violating_width_bounds_is_a_conflict() {
        let p = JointParameters {
            finger_size: FingerSize::Count(2),
            max_finger_width: 15.0,
            ..params()
        };
        // 2 fingers over 100 mm would be 50 mm wide.
        let err = synthesize(&region(100.0, 6.0), &p).unwrap_err();
        assert!(matches!(err, JointError::ParameterConflict { .. }));
    }

    #[test]
    fn inverted_width_bounds_are_rejected() {
        let p = JointParameters {
            min_finger_width: 20.0,
            max_finger_width: 10.0,
            ..params()
        };
        let err = synthesize(&region(100.0, 6.0), &p).unwrap_err();
        assert!(matches!(err, JointError::ParameterConflict { .. }));
    }

    // ── rejection ───────────────────────────────────────────────────────

    #[test]
    fn short_contact_is_degenerate() {
        let err = synthesize(&region(7.0, 6.0), &params()).unwrap_err();
        assert!(matches!(err, JointError::DegenerateRegion { .. }));
    }

    #[test]
    fn oversized_tool_is_a_parameter_conflict() {
        let p = JointParameters {
            tool_radius: 6.0, // 12 mm bit against 10 mm fingers
            ..params()
        };
        let err = synthesize(&region(100.0, 6.0), &p).unwrap_err();
        assert!(matches!(err, JointError::ParameterConflict { .. }));
    }

    #[test]
    fn count_of_one_is_rejected() {
        let p = JointParameters {
            finger_size: FingerSize::Count(1),
            ..params()
        };
        let err = synthesize(&region(100.0, 6.0), &p).unwrap_err();
        assert!(matches!(err, JointError::ParameterConflict { .. }));
    }

    #[test]
    fn inverted_finger_bounds_are_rejected() {
        let p = JointParameters {
            min_fingers: 8,
            max_fingers: 4,
            ..params()
        };
        let err = synthesize(&region(100.0, 6.0), &p).unwrap_err();
        assert!(matches!(err, JointError::ParameterConflict { .. }));
    }

    #[test]
    fn sharp_corner_policy_emits_no_reliefs() {
        let p = JointParameters {
            corner_fillet_policy: CornerFilletPolicy::RoundNoneRequireManualFit,
            ..params()
        };
        let pattern = synthesize(&region(100.0, 6.0), &p).unwrap();
        assert!(pattern.relief_pairs.is_empty());
    }

    // ── properties ──────────────────────────────────────────────────────

    proptest! {
        #[test]
        fn partition_has_no_residue(length in 20.0f64..500.0, target in 5.0f64..40.0) {
            let p = JointParameters {
                finger_size: FingerSize::TargetWidth(target),
                tool_radius: 0.0,
                min_feature_size: 0.5,
                ..params()
            };
            if let Ok(pattern) = synthesize(&region(length, 6.0), &p) {
                let total: f64 = pattern.segments.iter().map(|s| s.width()).sum();
                prop_assert!((total - pattern.span()).abs() < 1e-9);
                prop_assert!(pattern.segments.len() >= 2);
                let first = pattern.segments[0].width();
                for seg in &pattern.segments {
                    prop_assert!((seg.width() - first).abs() < 1e-9);
                }
            }
        }

        #[test]
        fn synthesis_is_deterministic(length in 20.0f64..300.0) {
            let r = region(length, 6.0);
            let a = synthesize(&r, &params());
            let b = synthesize(&r, &params());
            match (a, b) {
                (Ok(x), Ok(y)) => {
                    prop_assert_eq!(x.segments, y.segments);
                    prop_assert_eq!(x.relief_pairs, y.relief_pairs);
                }
                (Err(_), Err(_)) => {}
                _ => prop_assert!(false, "divergent outcomes"),
            }
        }
    }
}
