//! Tests for the volume-weighted blend across cohorts.
mod common;
use common::*;
use funnelcast::prelude::*;

#[test]
fn test_blend_is_volume_weighted() {
    let (stages, transitions) = create_linear_funnel();
    let cohorts = create_two_cohorts();
    let results = compute_projections(&stages, &transitions, &cohorts, &[]);

    assert_close(results[0].baseline_conversion, 0.2);
    assert_close(results[1].baseline_conversion, 0.5);

    let blended = compute_blended(&results, &cohorts);
    // (200 + 1500) / (1000 + 3000), not (0.2 + 0.5) / 2
    assert_close(blended.baseline_conversion, 0.425);
    assert!((blended.baseline_conversion - 0.35).abs() > 0.05);
    assert_close(blended.total_base_paid, 1700.0);
    assert_close(blended.total_proj_paid, 1700.0);
    assert_eq!(blended.delta, 0.0);
}

#[test]
fn test_blend_delta_and_totals() {
    let (stages, transitions) = create_linear_funnel();
    let cohorts = create_two_cohorts();
    let opportunities = vec![Opportunity::absolute("o", "Referrals", "C", 400.0)];
    let results = compute_projections(&stages, &transitions, &cohorts, &opportunities);

    let blended = compute_blended(&results, &cohorts);
    assert_close(blended.total_proj_paid, 1700.0 + 800.0);
    assert_close(blended.projected_conversion, 2500.0 / 4000.0);
    assert_close(
        blended.delta,
        blended.projected_conversion - blended.baseline_conversion,
    );
}

#[test]
fn test_blend_with_no_volume_is_all_zero() {
    let cohorts = vec![Cohort::new("a", "A"), Cohort::new("b", "B")];
    let (stages, transitions) = create_linear_funnel();
    let opportunities = vec![Opportunity::absolute("o", "Inject", "C", 10.0)];
    let results = compute_projections(&stages, &transitions, &cohorts, &opportunities);

    assert_eq!(compute_blended(&results, &cohorts), BlendedSummary::default());
    assert_eq!(compute_blended(&[], &[]), BlendedSummary::default());
}
