//! Joint application: carve the pockets out of body A and grow the matching
//! fingers onto body B.
//!
//! Each body-B segment becomes one prism applied twice: subtracted from A to
//! open the pocket, unioned into B to fill it. The two tool solids share a
//! box but carry opposite relief kinds: the cut is enlarged at each internal
//! corner so the tool can clear it, and the finger's matching convex corner
//! is filleted by the same radius so the surfaces mate without a void.
//!
//! Application is transactional per region. Kernel booleans return fresh
//! revisions and leave their inputs untouched, so a failure partway through
//! simply abandons the intermediate revisions; the caller keeps the handles
//! it passed in.

use brep_kernel::{CornerRelief, KernelSession, ReliefKind, SolidHandle, ToolSolid};
use tracing::debug;

use crate::types::{FingerPattern, JointError, Owner};

/// Apply a synthesized pattern to the two bodies of its contact region.
///
/// Returns the new revisions `(body_a, body_b)`. On error, no observable
/// state has changed: the input revisions are still the current shapes.
pub fn apply_pattern(
    kernel: &mut dyn KernelSession,
    body_a: &SolidHandle,
    body_b: &SolidHandle,
    pattern: &FingerPattern,
) -> Result<(SolidHandle, SolidHandle), JointError> {
    let mut cur_a = *body_a;
    let mut cur_b = *body_b;
    let mut fingers = 0;

    for segment in &pattern.segments {
        if segment.owner != Owner::BodyB {
            continue;
        }

        let pocket = tool_for_segment(pattern, segment.start, segment.end, ReliefKind::ConvexEnlarge);
        let finger = tool_for_segment(pattern, segment.start, segment.end, ReliefKind::ConcaveFillet);

        let pocket_tool = kernel.make_tool_solid(&pocket)?;
        cur_a = kernel.boolean_subtract(&cur_a, &pocket_tool)?;

        let finger_tool = kernel.make_tool_solid(&finger)?;
        cur_b = kernel.boolean_union(&cur_b, &finger_tool)?;
        fingers += 1;
    }

    debug!(fingers, "pattern applied");
    Ok((cur_a, cur_b))
}

/// Build the tool prism for one segment, with reliefs at whichever of its
/// walls are internal pattern boundaries.
fn tool_for_segment(
    pattern: &FingerPattern,
    start: f64,
    end: f64,
    kind: ReliefKind,
) -> ToolSolid {
    let reliefs: Vec<CornerRelief> = pattern
        .relief_pairs
        .iter()
        .filter(|pair| {
            (pair.axis_pos - start).abs() < 1e-9 || (pair.axis_pos - end).abs() < 1e-9
        })
        .map(|pair| CornerRelief {
            axis_pos: pair.axis_pos,
            kind,
            radius: pair.radius,
        })
        .collect();

    ToolSolid {
        frame: pattern.frame,
        axis_range: (start, end),
        cross_range: pattern.cross_range,
        depth: pattern.depth,
        reliefs,
    }
}
