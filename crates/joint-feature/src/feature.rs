//! The box joint feature state machine.

use std::collections::HashMap;

use brep_kernel::{KernelSession, SolidHandle};
use joint_ops::{
    apply_pattern, detect_contacts, synthesize_all, validate_parameters, JointError,
    SelectionInput,
};
use tenon_types::{BodyId, JointParameters, SelectedFace};
use tracing::{debug, instrument, warn};
use uuid::Uuid;

use crate::error::FeatureError;
use crate::store::BodyStore;

/// Lifecycle state of a feature instance.
///
/// `Recomputing` is only observable from within a recompute (the `&mut self`
/// receiver makes the feature non-reentrant); it exists so a panic-safe host
/// can tell a half-finished feature from a settled one. `Suppressed` is
/// terminal: the feature keeps its record but never computes again.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FeatureState {
    Unconfigured,
    Recomputing,
    Computed,
    Failed,
    Suppressed,
}

/// Summary of one successful recomputation.
#[derive(Debug, Clone)]
pub struct RecomputeReport {
    pub regions_detected: usize,
    pub regions_committed: usize,
    /// Per-region failures that did not stop the recompute.
    pub warnings: Vec<JointError>,
}

/// A box joint feature: persisted selections and parameters plus the derived
/// output revisions of its bodies.
#[derive(Debug)]
pub struct BoxJointFeature {
    id: Uuid,
    name: String,
    selections: Vec<SelectedFace>,
    parameters: JointParameters,
    state: FeatureState,
    last_error: Option<JointError>,
    outputs: HashMap<BodyId, SolidHandle>,
}

impl BoxJointFeature {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            selections: Vec::new(),
            parameters: JointParameters::default(),
            state: FeatureState::Unconfigured,
            last_error: None,
            outputs: HashMap::new(),
        }
    }

    pub(crate) fn restore(
        id: Uuid,
        name: String,
        selections: Vec<SelectedFace>,
        parameters: JointParameters,
    ) -> Self {
        Self {
            id,
            name,
            selections,
            parameters,
            state: FeatureState::Unconfigured,
            last_error: None,
            outputs: HashMap::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> FeatureState {
        self.state
    }

    pub fn selections(&self) -> &[SelectedFace] {
        &self.selections
    }

    pub fn parameters(&self) -> &JointParameters {
        &self.parameters
    }

    /// The most recent fatal error, kept across edits until a recompute
    /// succeeds.
    pub fn last_error(&self) -> Option<&JointError> {
        self.last_error.as_ref()
    }

    /// The committed output revision of a body, if this feature produced one.
    /// `None` means the upstream revision is current for that body.
    pub fn output(&self, id: BodyId) -> Option<SolidHandle> {
        self.outputs.get(&id).copied()
    }

    /// The revision downstream consumers should see: this feature's output
    /// when it has one, the upstream revision otherwise.
    pub fn current(&self, store: &BodyStore, id: BodyId) -> Option<SolidHandle> {
        self.output(id).or_else(|| store.upstream(id))
    }

    /// Replace the selected faces. Takes effect on the next recompute.
    pub fn set_selections(&mut self, selections: Vec<SelectedFace>) {
        self.selections = selections;
    }

    /// Replace the parameters. Takes effect on the next recompute.
    pub fn set_parameters(&mut self, parameters: JointParameters) {
        self.parameters = parameters;
    }

    /// Suppress the feature: drop all outputs so upstream shapes show
    /// through. Terminal; a suppressed feature refuses to recompute.
    pub fn suppress(&mut self) {
        self.outputs.clear();
        self.last_error = None;
        self.state = FeatureState::Suppressed;
    }

    /// Full recomputation from the current upstream revisions.
    ///
    /// Runs the whole pipeline: resolve selections, detect contact regions,
    /// synthesize a finger pattern per region, apply each pattern as a
    /// transaction. Geometric per-region failures become warnings as long as
    /// at least one region commits; a recompute where nothing commits fails
    /// with the most specific error it saw. A parameter conflict on any
    /// region fails the whole recompute, because it indicts the stored
    /// parameters rather than that region's geometry. New outputs are staged and swapped in
    /// only on success, so a failed recompute retains the last committed
    /// geometry rather than leaving bodies half-cut.
    #[instrument(skip(self, kernel, store), fields(feature = %self.id, name = %self.name))]
    pub fn recompute(
        &mut self,
        kernel: &mut dyn KernelSession,
        store: &BodyStore,
    ) -> Result<RecomputeReport, FeatureError> {
        match self.state {
            FeatureState::Suppressed => return Err(FeatureError::Suppressed),
            _ if self.selections.is_empty() => return Err(FeatureError::Unconfigured),
            _ => {}
        }

        self.state = FeatureState::Recomputing;

        match self.run_pipeline(kernel, store) {
            Ok((report, outputs)) => {
                self.outputs = outputs;
                self.state = FeatureState::Computed;
                self.last_error = None;
                debug!(
                    committed = report.regions_committed,
                    warnings = report.warnings.len(),
                    "recompute finished"
                );
                Ok(report)
            }
            Err(err) => {
                self.state = FeatureState::Failed;
                if let FeatureError::Joint(joint) = &err {
                    self.last_error = Some(joint.clone());
                }
                Err(err)
            }
        }
    }

    fn run_pipeline(
        &self,
        kernel: &mut dyn KernelSession,
        store: &BodyStore,
    ) -> Result<(RecomputeReport, HashMap<BodyId, SolidHandle>), FeatureError> {
        validate_parameters(&self.parameters).map_err(FeatureError::Joint)?;

        let mut inputs = Vec::with_capacity(self.selections.len());
        for sel in &self.selections {
            let solid = store
                .upstream(sel.body)
                .ok_or(FeatureError::UnknownBody { id: sel.body })?;
            inputs.push(SelectionInput {
                body: sel.body,
                solid,
                selector: sel.selector.clone(),
            });
        }

        let detection = detect_contacts(kernel.as_introspect(), &inputs, &self.parameters)?;
        let regions = detection.regions;
        let mut warnings = detection.warnings;
        if regions.is_empty() {
            let best = warnings
                .into_iter()
                .max_by_key(JointError::specificity)
                .unwrap_or(JointError::NoContactFound);
            return Err(FeatureError::Joint(best));
        }

        // Synthesis is pure and per-region independent; application below is
        // serialized because regions may share a body.
        let patterns = synthesize_all(&regions, &self.parameters);

        // A parameter conflict means the stored parameters contradict
        // themselves on real geometry. The other regions would commit a
        // joint the user is about to re-parameterize, so nothing commits.
        if let Some(conflict) = patterns.iter().find_map(|p| match p {
            Err(err @ JointError::ParameterConflict { .. }) => Some(err.clone()),
            _ => None,
        }) {
            return Err(FeatureError::Joint(conflict));
        }

        // Staged outputs for this recompute only. Always derived from the
        // upstream revisions, never from a previous recompute's outputs.
        let mut staged: HashMap<BodyId, SolidHandle> = HashMap::new();
        let mut committed = 0usize;
        for (region, pattern) in regions.iter().zip(patterns) {
            let pattern = match pattern {
                Ok(p) => p,
                Err(err) => {
                    warn!(body_a = %region.body_a, body_b = %region.body_b, %err,
                        "skipping region: synthesis failed");
                    warnings.push(err);
                    continue;
                }
            };

            // Later regions on the same body build on earlier commits.
            let cur_a = Self::staged_current(&staged, store, region.body_a)?;
            let cur_b = Self::staged_current(&staged, store, region.body_b)?;
            match apply_pattern(kernel, &cur_a, &cur_b, &pattern) {
                Ok((new_a, new_b)) => {
                    staged.insert(region.body_a, new_a);
                    staged.insert(region.body_b, new_b);
                    committed += 1;
                }
                Err(err) => {
                    warn!(body_a = %region.body_a, body_b = %region.body_b, %err,
                        "skipping region: application failed");
                    warnings.push(err);
                }
            }
        }

        if committed == 0 {
            let best = warnings
                .into_iter()
                .max_by_key(JointError::specificity)
                .unwrap_or(JointError::NoContactFound);
            return Err(FeatureError::Joint(best));
        }

        let report = RecomputeReport {
            regions_detected: regions.len(),
            regions_committed: committed,
            warnings,
        };
        Ok((report, staged))
    }

    fn staged_current(
        staged: &HashMap<BodyId, SolidHandle>,
        store: &BodyStore,
        id: BodyId,
    ) -> Result<SolidHandle, FeatureError> {
        staged
            .get(&id)
            .copied()
            .or_else(|| store.upstream(id))
            .ok_or(FeatureError::UnknownBody { id })
    }
}
