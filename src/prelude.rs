//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types and functions from the
//! funnelcast crate.
//!
//! # Example
//!
//! ```rust,no_run
//! use funnelcast::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let bundle = ProjectBundle::from_file("path/to/project.json")?;
//! let report = Projector::builder(&bundle).build().project()?;
//!
//! println!("{}", SummaryFormatter::format(&report.results, &bundle.cohorts, &report.blended));
//! # Ok(())
//! # }
//! ```

// Core projection functions
pub use crate::model::total_entry_volume;
pub use crate::projection::{
    BlendedSummary, CyclePolicy, OpportunityContribution, ProjectionReport, ProjectionResult,
    Projector, compute_blended, compute_projections,
};
pub use crate::walker::{StageVolumes, compute_stage_volumes};

// Entities and persistence
pub use crate::model::{
    Cohort, IntoBundle, Opportunity, OpportunityMode, ProjectBundle, ProjectionSnapshot, Stage,
    Transition,
};

// Editing
pub use crate::state::{Command, OpportunityDraft, ProjectState};

// Error types
pub use crate::error::{BundleError, GraphError, MigrationError, StateError};

// Reporting
pub use crate::report::{SummaryFormatter, WaterfallStep, waterfall};

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
