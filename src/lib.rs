//! # Funnelcast - Conversion Funnel Projection Engine
//!
//! **Funnelcast** models a multi-stage conversion funnel (a marketing or sales
//! pipeline) as a directed acyclic graph of stages and transitions, and projects
//! how hypothetical interventions ("opportunities") change the number of entrants
//! who reach terminal, paid stages. Results are broken out per customer cohort and
//! blended across cohorts by volume.
//!
//! ## Core Workflow
//!
//! The engine works on plain data. Editors and dashboards hand it a snapshot of
//! stages, transitions, cohorts and opportunities, and get fresh result values back.
//!
//! 1.  **Load Your Data**: Parse a persisted project with [`ProjectBundle::from_json`](model::ProjectBundle::from_json),
//!     which also upgrades older schema versions, or implement [`IntoBundle`](model::IntoBundle) for your own format.
//! 2.  **Walk**: [`compute_stage_volumes`] propagates one cohort's entry volume through the funnel.
//! 3.  **Project**: [`compute_projections`] computes baseline, combined and per-opportunity
//!     results for every cohort.
//! 4.  **Blend**: [`compute_blended`] folds those results into one volume-weighted summary.
//!
//! All four entry points are pure: identical inputs always give bit-identical outputs,
//! and none of them fail. Cycles truncate propagation instead of erroring; use
//! [`Projector`](projection::Projector) with [`CyclePolicy::Reject`](projection::CyclePolicy::Reject)
//! to have them reported.
//!
//! ## Quick Start
//!
//! ```rust
//! use funnelcast::prelude::*;
//!
//! let stages = vec![
//!     Stage::new("a", "Visit", false),
//!     Stage::new("b", "Trial", false),
//!     Stage::new("c", "Paid", true),
//! ];
//! let transitions = vec![Transition::new("e1", "a", "b"), Transition::new("e2", "b", "c")];
//! let cohorts = vec![
//!     Cohort::new("k", "Self-serve")
//!         .with_entry("a", 1000.0)
//!         .with_rate("e1", 0.5)
//!         .with_rate("e2", 0.4),
//! ];
//! let opportunities = vec![Opportunity::rate("o1", "Improve onboarding", "e2", 0.6)];
//!
//! let results = compute_projections(&stages, &transitions, &cohorts, &opportunities);
//! assert!((results[0].baseline_conversion - 0.2).abs() < 1e-12);
//! assert!((results[0].projected_conversion - 0.3).abs() < 1e-12);
//!
//! let blended = compute_blended(&results, &cohorts);
//! assert!((blended.total_proj_paid - 300.0).abs() < 1e-9);
//! ```

pub mod error;
pub mod graph;
pub mod model;
pub mod prelude;
pub mod projection;
pub mod report;
pub mod resolver;
pub mod state;
pub mod walker;

#[cfg(feature = "python-bindings")]
mod python;

pub use model::total_entry_volume;
pub use projection::{compute_blended, compute_projections};
pub use walker::compute_stage_volumes;
