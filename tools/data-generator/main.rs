use clap::Parser;
use funnelcast::model::{Cohort, Opportunity, ProjectBundle, Stage, Transition};
use rand::rngs::ThreadRng;
use rand::seq::IndexedRandom;
use rand::{Rng, rng};

/// A CLI tool to generate random funnel projects for the projection engine
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// The path to write the generated JSON file to
    #[arg(short, long, default_value = "generated_project.json")]
    output: String,

    /// Number of stage layers between entry and paid
    #[arg(long, default_value_t = 3)]
    layers: usize,

    /// Maximum number of stages per layer
    #[arg(long, default_value_t = 3)]
    width: usize,

    /// Number of cohorts to generate
    #[arg(long, default_value_t = 3)]
    cohorts: usize,

    /// Number of opportunities to generate
    #[arg(long, default_value_t = 5)]
    opportunities: usize,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let mut rng = rng();

    if cli.width == 0 {
        eprintln!("Error: --width must be at least 1");
        std::process::exit(1);
    }

    println!(
        "Generating funnel ({} layer(s), up to {} stage(s) each)...",
        cli.layers, cli.width
    );

    let (stages, transitions) = generate_graph(&mut rng, cli.layers, cli.width);
    let cohorts = generate_cohorts(&mut rng, cli.cohorts, &stages, &transitions);
    let opportunities = generate_opportunities(
        &mut rng,
        cli.opportunities,
        &stages,
        &transitions,
        &cohorts,
    );

    let bundle = ProjectBundle {
        stages,
        transitions,
        cohorts,
        opportunities,
    };
    bundle.save_json(&cli.output)?;

    println!(
        "Successfully generated {} stage(s), {} transition(s) and saved them to '{}'",
        bundle.stages.len(),
        bundle.transitions.len(),
        cli.output
    );

    Ok(())
}

/// Builds a layered DAG: one entry stage, `layers` middle layers, one paid stage.
/// Every stage links to at least one stage in the next layer.
fn generate_graph(
    rng: &mut ThreadRng,
    layers: usize,
    width: usize,
) -> (Vec<Stage>, Vec<Transition>) {
    let mut stages = vec![Stage::new("s0", "Visit", false)];
    let mut layer_ids: Vec<Vec<String>> = vec![vec!["s0".to_string()]];

    for layer in 1..=layers {
        let count = rng.random_range(1..=width);
        let ids: Vec<String> = (0..count)
            .map(|i| {
                let id = format!("s{}_{}", layer, i);
                stages.push(Stage::new(id.clone(), format!("Step {}.{}", layer, i), false));
                id
            })
            .collect();
        layer_ids.push(ids);
    }
    stages.push(Stage::new("paid", "Paid", true));
    layer_ids.push(vec!["paid".to_string()]);

    let mut transitions = Vec::new();
    for pair in layer_ids.windows(2) {
        let (from, to) = (&pair[0], &pair[1]);
        for source in from {
            let fan_out = rng.random_range(1..=to.len());
            for target in to.choose_multiple(rng, fan_out) {
                transitions.push(Transition::new(
                    format!("e{}", transitions.len()),
                    source.clone(),
                    target.clone(),
                ));
            }
        }
    }
    println!("-> Generated {} transition(s).", transitions.len());
    (stages, transitions)
}

fn generate_cohorts(
    rng: &mut ThreadRng,
    count: usize,
    stages: &[Stage],
    transitions: &[Transition],
) -> Vec<Cohort> {
    (0..count)
        .map(|i| {
            let mut cohort = Cohort::new(format!("c{}", i), format!("Cohort {}", i))
                .with_entry(stages[0].id.clone(), rng.random_range(500.0..20_000.0).round());
            if stages.len() > 2 && rng.random_bool(0.3) {
                let side_entry = &stages[rng.random_range(1..stages.len() - 1)];
                cohort = cohort.with_entry(side_entry.id.clone(), rng.random_range(50.0..2_000.0).round());
            }
            for t in transitions {
                cohort = cohort.with_rate(t.id.clone(), rng.random_range(0.05..0.8));
            }
            cohort
        })
        .collect()
}

fn generate_opportunities(
    rng: &mut ThreadRng,
    count: usize,
    stages: &[Stage],
    transitions: &[Transition],
    cohorts: &[Cohort],
) -> Vec<Opportunity> {
    (0..count)
        .filter_map(|i| {
            let id = format!("o{}", i);
            let name = format!("Opportunity {}", i);
            let opp = if rng.random_bool(0.7) {
                let edge = transitions.choose(rng)?;
                Opportunity::rate(id, name, edge.id.clone(), rng.random_range(0.2..0.95))
            } else {
                let stage = stages.choose(rng)?;
                Opportunity::absolute(id, name, stage.id.clone(), rng.random_range(10.0..500.0).round())
            };
            let mut opp = opp.with_likelihood(rng.random_range(0.3..1.0));
            if !cohorts.is_empty() && rng.random_bool(0.3) {
                opp = opp.with_cohorts([cohorts[rng.random_range(0..cohorts.len())].id.clone()]);
            }
            Some(opp)
        })
        .collect()
}
