use crate::model::Opportunity;
use crate::projection::{BlendedSummary, ProjectionResult};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum StepKind {
    Baseline,
    Opportunity,
    Total,
}

/// One bar of the baseline-to-projected breakdown. Ratios are fractions, not percent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WaterfallStep {
    pub name: String,
    pub kind: StepKind,
    /// Where the bar starts.
    pub base: f64,
    /// The bar's own height.
    pub lift: f64,
    /// `base + lift`.
    pub total: f64,
    /// `lift` expressed as customers out of the total entry volume.
    pub customers: f64,
}

/// Breaks the blended conversion down step by step across enabled opportunities.
///
/// Each opportunity's lift is its marginal contribution averaged over all cohort
/// results, with cohorts that lack an entry counting as zero. Because marginals
/// are isolated, the final step is the running total of those lifts and can
/// differ from `blended.projected_conversion`.
pub fn waterfall(
    results: &[ProjectionResult],
    opportunities: &[Opportunity],
    blended: &BlendedSummary,
    total_volume: f64,
) -> Vec<WaterfallStep> {
    let mut steps = Vec::new();
    let baseline = blended.baseline_conversion;
    steps.push(WaterfallStep {
        name: "Current".to_string(),
        kind: StepKind::Baseline,
        base: 0.0,
        lift: baseline,
        total: baseline,
        customers: baseline * total_volume,
    });

    let cohort_count = results.len();
    let mut running = baseline;
    for opp in opportunities.iter().filter(|o| o.enabled) {
        let sum: f64 = results
            .iter()
            .filter_map(|r| r.contribution_of(&opp.id))
            .sum();
        let lift = if cohort_count > 0 {
            sum / cohort_count as f64
        } else {
            0.0
        };
        steps.push(WaterfallStep {
            name: opp.name.clone(),
            kind: StepKind::Opportunity,
            base: running,
            lift,
            total: running + lift,
            customers: lift * total_volume,
        });
        running += lift;
    }

    steps.push(WaterfallStep {
        name: "Projected".to_string(),
        kind: StepKind::Total,
        base: 0.0,
        lift: running,
        total: running,
        customers: running * total_volume,
    });
    steps
}
