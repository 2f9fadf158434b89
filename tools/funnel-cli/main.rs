use clap::{Parser, Subcommand};
use funnelcast::graph::FunnelGraph;
use funnelcast::prelude::*;
use std::time::Instant;

/// Conversion funnel projection CLI
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand, Debug)]
enum CliCommand {
    /// Project every cohort and print the summary table
    Project {
        /// Path to the project JSON file
        bundle_path: String,
        /// Print the report as JSON instead of a table
        #[arg(long)]
        json: bool,
        /// Fail instead of truncating when the funnel has a cycle
        #[arg(long)]
        strict: bool,
        /// Include disabled opportunities
        #[arg(long)]
        all: bool,
        /// Also write a binary snapshot of the project and report
        #[arg(long, value_name = "PATH")]
        snapshot: Option<String>,
    },
    /// Print baseline per-stage volumes
    Volumes {
        bundle_path: String,
        /// Only this cohort (default: every cohort)
        #[arg(short, long)]
        cohort: Option<String>,
    },
    /// Check the funnel for cycles and dangling references
    Check { bundle_path: String },
    /// Print the baseline-to-projected breakdown per opportunity
    Waterfall { bundle_path: String },
    /// Print the report stored in a binary snapshot
    ShowSnapshot { snapshot_path: String },
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    match cli.command {
        CliCommand::Project {
            bundle_path,
            json,
            strict,
            all,
            snapshot,
        } => run_project(&bundle_path, json, strict, all, snapshot.as_deref()),
        CliCommand::Volumes {
            bundle_path,
            cohort,
        } => run_volumes(&bundle_path, cohort.as_deref()),
        CliCommand::Check { bundle_path } => run_check(&bundle_path),
        CliCommand::Waterfall { bundle_path } => run_waterfall(&bundle_path),
        CliCommand::ShowSnapshot { snapshot_path } => run_show_snapshot(&snapshot_path),
    }
}

fn load_bundle(path: &str) -> ProjectBundle {
    ProjectBundle::from_file(path).unwrap_or_else(|e| {
        exit_with_error(&format!("Failed to load project from '{}': {}", path, e))
    })
}

fn run_project(path: &str, json: bool, strict: bool, all: bool, snapshot: Option<&str>) {
    let bundle = load_bundle(path);

    let policy = if strict {
        CyclePolicy::Reject
    } else {
        CyclePolicy::Truncate
    };
    let start = Instant::now();
    let report = Projector::builder(&bundle)
        .cycle_policy(policy)
        .include_disabled(all)
        .build()
        .project()
        .unwrap_or_else(|e| exit_with_error(&format!("Projection failed: {}", e)));
    let elapsed = start.elapsed();

    if json {
        let out = serde_json::to_string_pretty(&report)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to encode report: {}", e)));
        println!("{}", out);
    } else {
        println!(
            "{}",
            SummaryFormatter::format(&report.results, &bundle.cohorts, &report.blended)
        );
        println!(
            "\n{} cohort(s), {} opportunity(ies) projected in {:?}",
            report.results.len(),
            bundle.opportunities.len(),
            elapsed
        );
    }

    if let Some(out_path) = snapshot {
        ProjectionSnapshot::new(bundle, report)
            .save(out_path)
            .unwrap_or_else(|e| exit_with_error(&format!("Failed to save snapshot: {}", e)));
        println!("Snapshot written to '{}'", out_path);
    }
}

fn run_volumes(path: &str, cohort_id: Option<&str>) {
    let bundle = load_bundle(path);
    let cohorts: Vec<&Cohort> = match cohort_id {
        Some(id) => vec![bundle.cohort(id).unwrap_or_else(|| {
            exit_with_error(&format!("Cohort '{}' not found", id))
        })],
        None => bundle.cohorts.iter().collect(),
    };

    for cohort in cohorts {
        let entry = cohort.total_entry_volume();
        let volumes = compute_stage_volumes(&bundle.stages, &bundle.transitions, cohort);
        println!("\n{} ({} entering)", cohort.name, entry.round());
        for stage in &bundle.stages {
            let volume = volumes.get(&stage.id).copied().unwrap_or(0.0);
            let share = if entry > 0.0 { volume / entry } else { 0.0 };
            let marker = if stage.is_terminal { " [paid]" } else { "" };
            println!(
                "  {:<24} {:>12.1}  {:>8}{}",
                stage.name,
                volume,
                SummaryFormatter::format_ratio(share),
                marker
            );
        }
    }
}

fn run_check(path: &str) {
    let bundle = load_bundle(path);
    let graph = FunnelGraph::new(&bundle.stages, &bundle.transitions);
    let mut problems = 0;

    if let Err(e) = graph.validate() {
        println!("- {}", e);
        problems += 1;
    }
    for t in &bundle.transitions {
        if !graph.contains_stage(&t.source_id) || !graph.contains_stage(&t.target_id) {
            println!(
                "- Transition '{}' references a missing stage ({} -> {})",
                t.id, t.source_id, t.target_id
            );
            problems += 1;
        }
    }
    for opp in &bundle.opportunities {
        let missing = match &opp.mode {
            OpportunityMode::Rate { edge_id, .. } => bundle.transition(edge_id).is_none(),
            OpportunityMode::Absolute {
                target_stage_id, ..
            } => bundle.stage(target_stage_id).is_none(),
        };
        if missing {
            println!(
                "- Opportunity '{}' targets a missing stage or transition",
                opp.name
            );
            problems += 1;
        }
    }

    if problems == 0 {
        println!("OK: {} stage(s), {} transition(s)", bundle.stages.len(), bundle.transitions.len());
    } else {
        exit_with_error(&format!("{} problem(s) found", problems));
    }
}

fn run_waterfall(path: &str) {
    let bundle = load_bundle(path);
    let report = Projector::builder(&bundle)
        .build()
        .project()
        .unwrap_or_else(|e| exit_with_error(&format!("Projection failed: {}", e)));
    let total_volume: f64 = bundle.cohorts.iter().map(Cohort::total_entry_volume).sum();

    let steps = waterfall(
        &report.results,
        &bundle.opportunities,
        &report.blended,
        total_volume,
    );
    for step in steps {
        println!(
            "  {:<28} {:>9} -> {:>9}  ({:+.0} customers)",
            step.name,
            SummaryFormatter::format_ratio(step.base),
            SummaryFormatter::format_ratio(step.total),
            step.customers
        );
    }
}

fn run_show_snapshot(path: &str) {
    let snapshot = ProjectionSnapshot::from_file(path)
        .unwrap_or_else(|e| exit_with_error(&format!("Failed to load snapshot: {}", e)));
    println!("Snapshot schema v{}", snapshot.schema_version);
    println!(
        "{}",
        SummaryFormatter::format(
            &snapshot.report.results,
            &snapshot.bundle.cohorts,
            &snapshot.report.blended
        )
    );
}

fn exit_with_error(message: &str) -> ! {
    eprintln!("\nError: {}", message);
    std::process::exit(1);
}
