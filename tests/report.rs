//! Tests for the waterfall breakdown and the text summary.
mod common;
use common::*;
use funnelcast::prelude::*;
use funnelcast::report::StepKind;

#[test]
fn test_waterfall_steps() {
    let bundle = create_linear_bundle();
    let report = Projector::builder(&bundle).build().project().unwrap();
    let steps = waterfall(&report.results, &bundle.opportunities, &report.blended, 1000.0);

    assert_eq!(steps.len(), 3);
    assert_eq!(steps[0].name, "Current");
    assert_eq!(steps[0].kind, StepKind::Baseline);
    assert_close(steps[0].total, 0.2);
    assert_close(steps[0].customers, 200.0);

    assert_eq!(steps[1].name, "Improve e2");
    assert_eq!(steps[1].kind, StepKind::Opportunity);
    assert_close(steps[1].base, 0.2);
    assert_close(steps[1].lift, 0.1);
    assert_close(steps[1].total, 0.3);
    assert_close(steps[1].customers, 100.0);

    assert_eq!(steps[2].kind, StepKind::Total);
    assert_eq!(steps[2].base, 0.0);
    assert_close(steps[2].total, 0.3);
}

#[test]
fn test_waterfall_averages_over_all_cohorts() {
    let (stages, transitions) = create_linear_funnel();
    let cohorts = create_two_cohorts();
    let opportunities = vec![
        Opportunity::rate("o", "Small only", "e2", 0.6).with_cohorts(["small"]),
        Opportunity::rate("off", "Switched off", "e1", 1.0).disabled(),
    ];
    let results = compute_projections(&stages, &transitions, &cohorts, &opportunities);
    let blended = compute_blended(&results, &cohorts);
    let steps = waterfall(&results, &opportunities, &blended, 4000.0);

    // Disabled opportunities get no bar.
    assert_eq!(steps.len(), 3);
    // 0.1 lift on `small`, 0 on `large`, averaged over both.
    assert_close(steps[1].lift, 0.05);
    assert_close(steps[1].customers, 200.0);
    assert_close(steps[2].total, blended.baseline_conversion + 0.05);
}

#[test]
fn test_waterfall_without_results() {
    let steps = waterfall(&[], &[], &BlendedSummary::default(), 0.0);
    assert_eq!(steps.len(), 2);
    assert!(steps.iter().all(|s| s.total == 0.0));
}

#[test]
fn test_format_helpers() {
    assert_eq!(SummaryFormatter::format_ratio(0.2), "20.00%");
    assert_eq!(SummaryFormatter::format_ratio(0.0), "0.00%");
    assert_eq!(SummaryFormatter::format_delta(0.1), "+10.00pp");
    assert_eq!(SummaryFormatter::format_delta(-0.025), "-2.50pp");
    assert_eq!(SummaryFormatter::format_delta(0.0), "--");
    assert_eq!(SummaryFormatter::format_count(199.6), "200");
}

#[test]
fn test_summary_table() {
    let bundle = create_linear_bundle();
    let report = Projector::builder(&bundle).build().project().unwrap();
    let text = SummaryFormatter::format(&report.results, &bundle.cohorts, &report.blended);
    let lines: Vec<&str> = text.lines().collect();

    assert_eq!(lines.len(), 5);
    assert!(lines[0].starts_with("Cohort"));
    assert!(lines[1].chars().all(|c| c == '-'));
    assert!(lines[2].starts_with("Self-serve"));
    assert!(lines[2].contains("20.00%"));
    assert!(lines[2].contains("30.00%"));
    assert!(lines[2].contains("+10.00pp"));
    assert!(lines[4].starts_with("Blended"));
    assert!(lines[4].contains("1000"));
    assert!(lines[4].ends_with("300"));
    // Every row is padded to the same width.
    assert!(lines.iter().all(|l| l.len() == lines[0].len()));
}

#[test]
fn test_summary_skips_results_for_removed_cohorts() {
    let bundle = create_linear_bundle();
    let report = Projector::builder(&bundle).build().project().unwrap();
    let text = SummaryFormatter::format(&report.results, &[], &BlendedSummary::default());
    assert!(!text.contains("Self-serve"));
    assert_eq!(text.lines().count(), 4);
}
