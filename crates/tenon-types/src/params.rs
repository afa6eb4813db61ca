use serde::{Deserialize, Serialize};

/// User-editable parameters of a box joint.
///
/// All lengths are millimeters. The set is persisted with the feature and
/// re-applied verbatim on every recomputation; validation happens in the
/// pipeline so a stored record can always be loaded and edited even when its
/// values no longer make sense for the current geometry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JointParameters {
    /// Depth of the joint: how far fingers reach through the receiving body.
    pub material_thickness: f64,
    /// Finger sizing rule along the contact length.
    pub finger_size: FingerSize,
    /// Radius of the rotating cutter. Zero means an ideal sharp tool.
    pub tool_radius: f64,
    /// How internal corners are compensated for the tool radius.
    pub corner_fillet_policy: CornerFilletPolicy,
    /// Uncut strip left at each end of the contact length.
    pub margin: f64,
    /// Lower bound on the synthesized finger count.
    pub min_fingers: u32,
    /// Upper bound on the synthesized finger count.
    pub max_fingers: u32,
    /// Lower bound on the synthesized finger width. The count is adjusted
    /// down before a pattern is rejected for violating it.
    pub min_finger_width: f64,
    /// Upper bound on the synthesized finger width.
    pub max_finger_width: f64,
    /// Smallest feature a tool can cut; slivers below this are rejected.
    pub min_feature_size: f64,
}

impl Default for JointParameters {
    fn default() -> Self {
        Self {
            material_thickness: 6.0,
            finger_size: FingerSize::TargetWidth(10.0),
            tool_radius: 3.175, // half of a 1/4" bit
            corner_fillet_policy: CornerFilletPolicy::RoundBoth,
            margin: 0.0,
            min_fingers: 2,
            max_fingers: 99,
            min_finger_width: 5.0,
            max_finger_width: 150.0, // 15 cm
            min_feature_size: 5.0,
        }
    }
}

/// Finger sizing: either a target width the synthesizer rounds to an exact
/// partition, or an explicit segment count.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum FingerSize {
    TargetWidth(f64),
    Count(u32),
}

/// Tool-radius compensation at internal corners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CornerFilletPolicy {
    /// Fillet the concave corner on the notch side and enlarge the mating
    /// convex corner on the tab side by the same radius, so the machined
    /// surfaces mate without a void. The default.
    RoundBoth,
    /// Emit sharp corners and leave the fit to manual post-machining.
    RoundNoneRequireManualFit,
}
