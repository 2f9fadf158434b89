//! Propagates one cohort's volume through the funnel in topological order.

use crate::graph::FunnelGraph;
use crate::model::{Cohort, Stage, Transition};
use log::trace;
use std::collections::BTreeMap;

/// Volume arriving at each stage, keyed by stage id.
pub type StageVolumes = BTreeMap<String, f64>;

/// Per-transition rates that replace a cohort's own rates for one walk.
pub type RateOverrides = BTreeMap<String, f64>;

/// Extra volume added at stages before propagation, keyed by stage id.
pub type VolumeInjections = BTreeMap<String, f64>;

/// Clamps a conversion rate into `[0, 1]`. A NaN rate converts nothing.
pub fn clamp_rate(rate: f64) -> f64 {
    if rate.is_nan() {
        0.0
    } else {
        rate.clamp(0.0, 1.0)
    }
}

/// Walks a funnel for one cohort, building the graph index on the fly.
///
/// Use [`FunnelWalker`] directly when walking the same graph many times.
pub fn walk(
    stages: &[Stage],
    transitions: &[Transition],
    cohort: &Cohort,
    rate_overrides: Option<&RateOverrides>,
    volume_injections: Option<&VolumeInjections>,
) -> StageVolumes {
    let graph = FunnelGraph::new(stages, transitions);
    FunnelWalker::new(&graph).walk(cohort, rate_overrides, volume_injections)
}

/// Per-stage volumes for one cohort with no opportunities applied.
pub fn compute_stage_volumes(
    stages: &[Stage],
    transitions: &[Transition],
    cohort: &Cohort,
) -> StageVolumes {
    walk(stages, transitions, cohort, None, None)
}

/// Sum of volume at every terminal stage.
pub fn terminal_volume(stages: &[Stage], volumes: &StageVolumes) -> f64 {
    stages
        .iter()
        .filter(|s| s.is_terminal)
        .map(|s| volumes.get(&s.id).copied().unwrap_or(0.0))
        .sum()
}

/// Single-pass volume propagation over a prebuilt [`FunnelGraph`].
pub struct FunnelWalker<'g, 'a> {
    graph: &'g FunnelGraph<'a>,
}

impl<'g, 'a> FunnelWalker<'g, 'a> {
    pub fn new(graph: &'g FunnelGraph<'a>) -> Self {
        Self { graph }
    }

    /// Computes the volume reaching every stage.
    ///
    /// Each stage is finalized before its children are visited, so a stage's
    /// volume is the sum over all paths reaching it. Overrides win over the
    /// cohort's own rates; every rate is clamped before use. Stages excluded
    /// from the order keep only what they receive directly.
    pub fn walk(
        &self,
        cohort: &Cohort,
        rate_overrides: Option<&RateOverrides>,
        volume_injections: Option<&VolumeInjections>,
    ) -> StageVolumes {
        let mut volumes: StageVolumes = self
            .graph
            .stages()
            .iter()
            .map(|s| (s.id.clone(), 0.0))
            .collect();

        let seeds = cohort
            .entries
            .iter()
            .chain(volume_injections.into_iter().flatten());
        for (stage_id, volume) in seeds {
            match volumes.get_mut(stage_id) {
                Some(v) => *v += volume,
                None => trace!(
                    "cohort '{}': ignoring volume for unknown stage '{}'",
                    cohort.id, stage_id
                ),
            }
        }

        for stage_id in &self.graph.order().sorted {
            let volume = volumes.get(stage_id).copied().unwrap_or(0.0);
            if volume == 0.0 {
                continue;
            }

            for transition in self.graph.outgoing(stage_id) {
                let rate = rate_overrides
                    .and_then(|o| o.get(&transition.id))
                    .copied()
                    .unwrap_or_else(|| cohort.rate(&transition.id));
                if let Some(target) = volumes.get_mut(&transition.target_id) {
                    *target += volume * clamp_rate(rate);
                }
            }
        }

        volumes
    }
}
