//! Tests for error messages and small entity helpers.
use funnelcast::prelude::*;

#[test]
fn test_error_messages() {
    let cycle = GraphError::Cycle {
        stages: vec!["A".to_string(), "B".to_string()],
    };
    assert_eq!(
        cycle.to_string(),
        "Funnel contains a cycle; stages excluded from propagation: A, B"
    );

    let version = MigrationError::UnsupportedVersion { found: 3, latest: 2 };
    assert_eq!(
        BundleError::from(version).to_string(),
        "Failed to migrate project data: Schema version 3 is newer than the latest supported version 2"
    );

    assert_eq!(
        StateError::SelfLoop("A".to_string()).to_string(),
        "Stage 'A' cannot transition to itself"
    );
}

#[test]
fn test_cohort_rate_lookup() {
    let cohort = Cohort::new("k", "K").with_rate("e1", 1.5);
    // Stored rates are returned as given; clamping happens during the walk.
    assert_eq!(cohort.rate("e1"), 1.5);
    assert_eq!(cohort.rate("missing"), 0.0);
}

#[test]
fn test_opportunity_scope() {
    let everyone = Opportunity::rate("o", "O", "e1", 0.5);
    assert!(everyone.applies_to("anything"));

    let scoped = everyone.clone().with_cohorts(["a", "b"]);
    assert!(scoped.applies_to("b"));
    assert!(!scoped.applies_to("c"));

    let off = everyone.disabled();
    assert!(!off.enabled);
    assert_eq!(off.likelihood, 1.0);
}
