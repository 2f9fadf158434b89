//! Turns opportunities into concrete rate overrides and volume injections.

use crate::model::{Cohort, Opportunity, OpportunityMode};
use crate::walker::{RateOverrides, VolumeInjections};
use serde::{Deserialize, Serialize};

/// The adjustments one cohort's walk should apply.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResolvedAdjustments {
    pub rate_overrides: RateOverrides,
    pub volume_injections: VolumeInjections,
}

impl ResolvedAdjustments {
    pub fn is_empty(&self) -> bool {
        self.rate_overrides.is_empty() && self.volume_injections.is_empty()
    }
}

/// Resolves the opportunities that apply to `cohort`.
///
/// Absolute-mode opportunities add `absolute_count * likelihood` at their stage.
/// Rate-mode opportunities add `(target_rate - baseline) * likelihood` on top of
/// whatever the transition has accumulated so far, starting from the cohort's
/// baseline rate. Several opportunities on one transition therefore compose as
/// a sum of weighted improvements. Overrides are left unclamped here; the walker
/// clamps them.
pub fn resolve<'o, I>(cohort: &Cohort, opportunities: I) -> ResolvedAdjustments
where
    I: IntoIterator<Item = &'o Opportunity>,
{
    let mut resolved = ResolvedAdjustments::default();

    for opp in opportunities {
        if !opp.applies_to(&cohort.id) {
            continue;
        }

        match &opp.mode {
            OpportunityMode::Absolute {
                target_stage_id,
                absolute_count,
            } => {
                *resolved
                    .volume_injections
                    .entry(target_stage_id.clone())
                    .or_insert(0.0) += absolute_count * opp.likelihood;
            }
            OpportunityMode::Rate {
                edge_id,
                target_rate,
            } => {
                let baseline = cohort.rate(edge_id);
                let improvement = (target_rate - baseline) * opp.likelihood;
                *resolved
                    .rate_overrides
                    .entry(edge_id.clone())
                    .or_insert(baseline) += improvement;
            }
        }
    }

    resolved
}
