//! Baseline, combined and per-opportunity projections for every cohort.

use crate::error::GraphError;
use crate::graph::FunnelGraph;
use crate::model::{Cohort, Opportunity, ProjectBundle, Stage, Transition};
use crate::resolver::resolve;
use crate::walker::{FunnelWalker, terminal_volume};
use log::debug;
use serde::{Deserialize, Serialize};
use std::iter;

mod blend;

pub use blend::{BlendedSummary, compute_blended};

/// One opportunity's isolated effect on a cohort's conversion ratio.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpportunityContribution {
    pub opportunity_id: String,
    pub contribution: f64,
}

/// Projection output for a single cohort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionResult {
    pub cohort_id: String,
    pub baseline_conversion: f64,
    pub projected_conversion: f64,
    pub baseline_paid: f64,
    pub projected_paid: f64,
    /// `projected_conversion - baseline_conversion`.
    pub delta: f64,
    /// Marginal contributions, one per participating opportunity. These need not
    /// sum to `delta` when opportunities share a transition.
    pub per_opportunity: Vec<OpportunityContribution>,
}

impl ProjectionResult {
    pub fn contribution_of(&self, opportunity_id: &str) -> Option<f64> {
        self.per_opportunity
            .iter()
            .find(|c| c.opportunity_id == opportunity_id)
            .map(|c| c.contribution)
    }
}

/// Per-cohort results and their blended aggregate.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProjectionReport {
    pub results: Vec<ProjectionResult>,
    pub blended: BlendedSummary,
}

/// Projects every cohort under its enabled opportunities.
///
/// Never fails: cycles truncate propagation, dangling references contribute
/// nothing, and zero-volume cohorts report zero conversion.
pub fn compute_projections(
    stages: &[Stage],
    transitions: &[Transition],
    cohorts: &[Cohort],
    opportunities: &[Opportunity],
) -> Vec<ProjectionResult> {
    let graph = FunnelGraph::new(stages, transitions);
    let enabled: Vec<&Opportunity> = opportunities.iter().filter(|o| o.enabled).collect();
    project_cohorts(&graph, cohorts, &enabled)
}

fn project_cohorts(
    graph: &FunnelGraph<'_>,
    cohorts: &[Cohort],
    opportunities: &[&Opportunity],
) -> Vec<ProjectionResult> {
    let walker = FunnelWalker::new(graph);
    cohorts
        .iter()
        .map(|cohort| project_cohort(graph, &walker, cohort, opportunities))
        .collect()
}

fn project_cohort(
    graph: &FunnelGraph<'_>,
    walker: &FunnelWalker<'_, '_>,
    cohort: &Cohort,
    opportunities: &[&Opportunity],
) -> ProjectionResult {
    let entry = cohort.total_entry_volume();
    let conversion = |paid: f64| if entry > 0.0 { paid / entry } else { 0.0 };

    let baseline_volumes = walker.walk(cohort, None, None);
    let baseline_paid = terminal_volume(graph.stages(), &baseline_volumes);
    let baseline_conversion = conversion(baseline_paid);

    let combined = resolve(cohort, opportunities.iter().copied());
    let projected_volumes = walker.walk(
        cohort,
        Some(&combined.rate_overrides),
        Some(&combined.volume_injections),
    );
    let projected_paid = terminal_volume(graph.stages(), &projected_volumes);
    let projected_conversion = conversion(projected_paid);

    // Each marginal assumes every other opportunity is absent.
    let per_opportunity = opportunities
        .iter()
        .map(|opp| {
            let contribution = if opp.applies_to(&cohort.id) {
                let single = resolve(cohort, iter::once(*opp));
                let volumes = walker.walk(
                    cohort,
                    Some(&single.rate_overrides),
                    Some(&single.volume_injections),
                );
                conversion(terminal_volume(graph.stages(), &volumes)) - baseline_conversion
            } else {
                0.0
            };
            OpportunityContribution {
                opportunity_id: opp.id.clone(),
                contribution,
            }
        })
        .collect();

    debug!(
        "cohort '{}': entry={} baseline={:.4} projected={:.4}",
        cohort.id, entry, baseline_conversion, projected_conversion
    );

    ProjectionResult {
        cohort_id: cohort.id.clone(),
        baseline_conversion,
        projected_conversion,
        baseline_paid,
        projected_paid,
        delta: projected_conversion - baseline_conversion,
        per_opportunity,
    }
}

/// How a `Projector` treats stages a cycle keeps out of the order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum CyclePolicy {
    /// Drop them from propagation and project anyway.
    #[default]
    Truncate,
    /// Refuse to project and report the excluded stages.
    Reject,
}

/// Configured projection over a whole `ProjectBundle`.
pub struct Projector<'a> {
    bundle: &'a ProjectBundle,
    cycle_policy: CyclePolicy,
    include_disabled: bool,
}

pub struct ProjectorBuilder<'a> {
    bundle: &'a ProjectBundle,
    cycle_policy: CyclePolicy,
    include_disabled: bool,
}

impl<'a> ProjectorBuilder<'a> {
    pub fn new(bundle: &'a ProjectBundle) -> Self {
        Self {
            bundle,
            cycle_policy: CyclePolicy::default(),
            include_disabled: false,
        }
    }

    pub fn cycle_policy(mut self, policy: CyclePolicy) -> Self {
        self.cycle_policy = policy;
        self
    }

    /// Project every opportunity, ignoring their `enabled` flag.
    pub fn include_disabled(mut self, include: bool) -> Self {
        self.include_disabled = include;
        self
    }

    pub fn build(self) -> Projector<'a> {
        Projector {
            bundle: self.bundle,
            cycle_policy: self.cycle_policy,
            include_disabled: self.include_disabled,
        }
    }
}

impl<'a> Projector<'a> {
    pub fn builder(bundle: &'a ProjectBundle) -> ProjectorBuilder<'a> {
        ProjectorBuilder::new(bundle)
    }

    pub fn project(&self) -> Result<ProjectionReport, GraphError> {
        let graph = FunnelGraph::new(&self.bundle.stages, &self.bundle.transitions);
        if self.cycle_policy == CyclePolicy::Reject {
            graph.validate()?;
        }

        let opportunities: Vec<&Opportunity> = self
            .bundle
            .opportunities
            .iter()
            .filter(|o| self.include_disabled || o.enabled)
            .collect();

        let results = project_cohorts(&graph, &self.bundle.cohorts, &opportunities);
        let blended = compute_blended(&results, &self.bundle.cohorts);
        Ok(ProjectionReport { results, blended })
    }
}
