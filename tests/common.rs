//! Common test utilities for building funnels, cohorts and opportunities.
use funnelcast::prelude::*;

/// Tolerance for comparing accumulated floating-point volumes.
#[allow(dead_code)]
pub const EPSILON: f64 = 1e-9;

#[allow(dead_code)]
pub fn assert_close(actual: f64, expected: f64) {
    assert!(
        (actual - expected).abs() < EPSILON,
        "expected {}, got {}",
        expected,
        actual
    );
}

/// A straight three-stage funnel: `A -(e1)-> B -(e2)-> C`, with `C` paid.
#[allow(dead_code)]
pub fn create_linear_funnel() -> (Vec<Stage>, Vec<Transition>) {
    (
        vec![
            Stage::new("A", "Visit", false),
            Stage::new("B", "Trial", false),
            Stage::new("C", "Paid", true),
        ],
        vec![Transition::new("e1", "A", "B"), Transition::new("e2", "B", "C")],
    )
}

/// Cohort `K`: 1000 entering at `A`, `e1 = 0.5`, `e2 = 0.4`.
///
/// Baseline: B receives 500, C receives 200, conversion 0.2.
#[allow(dead_code)]
pub fn create_linear_cohort() -> Cohort {
    Cohort::new("K", "Self-serve")
        .with_entry("A", 1000.0)
        .with_rate("e1", 0.5)
        .with_rate("e2", 0.4)
}

/// A diamond funnel: `A -> B`, `A -> C`, `B -> D`, `C -> D`, with `D` paid.
#[allow(dead_code)]
pub fn create_diamond_funnel() -> (Vec<Stage>, Vec<Transition>) {
    (
        vec![
            // Listed out of topological order on purpose.
            Stage::new("D", "Paid", true),
            Stage::new("B", "Demo", false),
            Stage::new("A", "Visit", false),
            Stage::new("C", "Trial", false),
        ],
        vec![
            Transition::new("ab", "A", "B"),
            Transition::new("ac", "A", "C"),
            Transition::new("bd", "B", "D"),
            Transition::new("cd", "C", "D"),
        ],
    )
}

/// Two cohorts of different sizes and conversion over the linear funnel.
///
/// `small`: 1000 entering, converts 0.2 (200 paid).
/// `large`: 3000 entering, converts 0.5 (1500 paid).
#[allow(dead_code)]
pub fn create_two_cohorts() -> Vec<Cohort> {
    vec![
        Cohort::new("small", "Small")
            .with_entry("A", 1000.0)
            .with_rate("e1", 0.5)
            .with_rate("e2", 0.4),
        Cohort::new("large", "Large")
            .with_entry("A", 3000.0)
            .with_rate("e1", 1.0)
            .with_rate("e2", 0.5),
    ]
}

/// The linear funnel with one cohort and one "improve e2" opportunity, as a bundle.
#[allow(dead_code)]
pub fn create_linear_bundle() -> ProjectBundle {
    let (stages, transitions) = create_linear_funnel();
    ProjectBundle {
        stages,
        transitions,
        cohorts: vec![create_linear_cohort()],
        opportunities: vec![Opportunity::rate("improve-e2", "Improve e2", "e2", 0.6)],
    }
}

/// The persisted JSON shape written by the editor, in the current schema.
#[allow(dead_code)]
pub const LINEAR_PROJECT_JSON: &str = r##"{
  "state": {
    "stages": [
      { "id": "A", "name": "Visit", "isTerminal": false },
      { "id": "B", "name": "Trial", "isTerminal": false },
      { "id": "C", "name": "Paid", "isTerminal": true }
    ],
    "edges": [
      { "id": "e1", "sourceId": "A", "targetId": "B" },
      { "id": "e2", "sourceId": "B", "targetId": "C" }
    ],
    "cohorts": [
      {
        "id": "K",
        "name": "Self-serve",
        "color": "#4f46e5",
        "entries": { "A": 1000 },
        "conversionRates": { "e1": 0.5, "e2": 0.4 }
      }
    ],
    "opportunities": [
      {
        "id": "improve-e2",
        "name": "Improve e2",
        "mode": "rate",
        "edgeId": "e2",
        "targetRate": 0.6,
        "targetStageId": "",
        "absoluteCount": 0,
        "cohortIds": [],
        "likelihood": 1,
        "enabled": true
      },
      {
        "id": "referrals",
        "name": "Referral push",
        "mode": "absolute",
        "edgeId": "",
        "targetRate": 0,
        "targetStageId": "C",
        "absoluteCount": 100,
        "cohortIds": ["K"],
        "likelihood": 0.5,
        "enabled": false
      }
    ]
  },
  "version": 2
}"##;
