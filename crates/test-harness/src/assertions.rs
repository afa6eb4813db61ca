//! Rich assertion helpers with diagnostic output.
//!
//! Every failure names the scenario context and reports expected vs actual,
//! so a broken invariant can be diagnosed from the test log alone.

use brep_kernel::{BrepIntrospect, MockKernel, ReliefKind, SolidHandle};
use joint_ops::{FingerPattern, Owner};

use crate::helpers::HarnessError;

const VOLUME_TOL: f64 = 1e-6;

/// Assert that a joint moved material without creating or destroying any:
/// the volumes of the two output revisions must sum to the two inputs.
pub fn assert_volume_conserved(
    kernel: &MockKernel,
    before: (&SolidHandle, &SolidHandle),
    after: (&SolidHandle, &SolidHandle),
    ctx: &str,
) -> Result<(), HarnessError> {
    let volume = |h: &SolidHandle| {
        kernel.volume(h).map_err(|e| HarnessError::AssertionFailed {
            detail: format!("[{}] volume query failed: {}", ctx, e),
        })
    };
    let total_before = volume(before.0)? + volume(before.1)?;
    let total_after = volume(after.0)? + volume(after.1)?;

    if (total_before - total_after).abs() > VOLUME_TOL {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] volume not conserved: {:.6} before, {:.6} after",
                ctx, total_before, total_after,
            ),
        });
    }
    Ok(())
}

/// Assert that every internal boundary of the applied joint carries a
/// matched relief pair: a convex enlargement on the cut side and a concave
/// fillet of the same radius at the same position on the finger side.
pub fn assert_matched_reliefs(
    kernel: &MockKernel,
    out_a: &SolidHandle,
    out_b: &SolidHandle,
    expected_pairs: usize,
    ctx: &str,
) -> Result<(), HarnessError> {
    let cuts = kernel.applied_cuts(out_a);
    let joins = kernel.applied_joins(out_b);
    if cuts.len() != joins.len() {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] {} cuts but {} joins",
                ctx,
                cuts.len(),
                joins.len(),
            ),
        });
    }

    let mut pairs = 0;
    for (cut, join) in cuts.iter().zip(joins) {
        if cut.reliefs.len() != join.reliefs.len() {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] relief count mismatch on one segment: {} vs {}",
                    ctx,
                    cut.reliefs.len(),
                    join.reliefs.len(),
                ),
            });
        }
        for (cr, jr) in cut.reliefs.iter().zip(&join.reliefs) {
            if cr.kind != ReliefKind::ConvexEnlarge || jr.kind != ReliefKind::ConcaveFillet {
                return Err(HarnessError::AssertionFailed {
                    detail: format!(
                        "[{}] relief kinds not paired: cut {:?}, join {:?}",
                        ctx, cr.kind, jr.kind,
                    ),
                });
            }
            if (cr.axis_pos - jr.axis_pos).abs() > VOLUME_TOL
                || (cr.radius - jr.radius).abs() > VOLUME_TOL
            {
                return Err(HarnessError::AssertionFailed {
                    detail: format!(
                        "[{}] relief pair mismatched: cut at {:.3} r {:.3}, join at {:.3} r {:.3}",
                        ctx, cr.axis_pos, cr.radius, jr.axis_pos, jr.radius,
                    ),
                });
            }
            pairs += 1;
        }
    }

    if pairs != expected_pairs {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] expected {} relief pairs, found {}",
                ctx, expected_pairs, pairs,
            ),
        });
    }
    Ok(())
}

/// Assert that a pattern is a clean partition: equal-width segments covering
/// the span with alternating ownership starting at body A.
pub fn assert_pattern_partition(pattern: &FingerPattern, ctx: &str) -> Result<(), HarnessError> {
    let segments = &pattern.segments;
    if segments.len() < 2 {
        return Err(HarnessError::AssertionFailed {
            detail: format!("[{}] only {} segments", ctx, segments.len()),
        });
    }

    let width = segments[0].width();
    let mut cursor = pattern.axis_span.0;
    for (i, seg) in segments.iter().enumerate() {
        if (seg.start - cursor).abs() > VOLUME_TOL {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] segment {} starts at {:.6}, expected {:.6}",
                    ctx, i, seg.start, cursor,
                ),
            });
        }
        if (seg.width() - width).abs() > VOLUME_TOL {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] segment {} width {:.6} differs from {:.6}",
                    ctx, i, seg.width(), width,
                ),
            });
        }
        let expected_owner = if i % 2 == 0 { Owner::BodyA } else { Owner::BodyB };
        if seg.owner != expected_owner {
            return Err(HarnessError::AssertionFailed {
                detail: format!(
                    "[{}] segment {} owned by {:?}, expected {:?}",
                    ctx, i, seg.owner, expected_owner,
                ),
            });
        }
        cursor = seg.end;
    }

    if (cursor - pattern.axis_span.1).abs() > VOLUME_TOL {
        return Err(HarnessError::AssertionFailed {
            detail: format!(
                "[{}] partition ends at {:.6}, span ends at {:.6}",
                ctx, cursor, pattern.axis_span.1,
            ),
        });
    }
    Ok(())
}
