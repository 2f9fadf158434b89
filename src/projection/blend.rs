use super::ProjectionResult;
use crate::model::Cohort;
use serde::{Deserialize, Serialize};

/// Cohort results combined into one volume-weighted view.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlendedSummary {
    pub baseline_conversion: f64,
    pub projected_conversion: f64,
    pub delta: f64,
    pub total_base_paid: f64,
    pub total_proj_paid: f64,
}

/// Blends per-cohort results by entry volume.
///
/// Conversions are total paid over total entry volume, not a mean of the
/// cohort ratios. With no entry volume at all the summary is all zeros.
pub fn compute_blended(results: &[ProjectionResult], cohorts: &[Cohort]) -> BlendedSummary {
    let total_volume: f64 = cohorts.iter().map(Cohort::total_entry_volume).sum();
    if total_volume == 0.0 {
        return BlendedSummary::default();
    }

    let (total_base_paid, total_proj_paid) = results
        .iter()
        .fold((0.0, 0.0), |(base, proj), r| {
            (base + r.baseline_paid, proj + r.projected_paid)
        });

    BlendedSummary {
        baseline_conversion: total_base_paid / total_volume,
        projected_conversion: total_proj_paid / total_volume,
        delta: (total_proj_paid - total_base_paid) / total_volume,
        total_base_paid,
        total_proj_paid,
    }
}
