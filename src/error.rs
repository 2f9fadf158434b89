use thiserror::Error;

/// Errors raised when the funnel graph is checked for well-formedness.
///
/// The projection functions never raise these on their own; they only surface
/// through an explicit validation call or a `Projector` configured to reject cycles.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GraphError {
    #[error("Funnel contains a cycle; stages excluded from propagation: {}", .stages.join(", "))]
    Cycle { stages: Vec<String> },
}

/// Errors that can occur while loading or saving a project bundle or snapshot.
#[derive(Error, Debug, Clone)]
pub enum BundleError {
    #[error("Failed to parse project JSON: {0}")]
    JsonParseError(String),

    #[error("Failed to migrate project data: {0}")]
    Migration(#[from] MigrationError),

    #[error("I/O error on '{path}': {message}")]
    Io { path: String, message: String },

    #[error("Snapshot encoding error: {0}")]
    Snapshot(String),
}

/// Errors raised by the persisted-schema migration chain.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MigrationError {
    #[error("Schema version {found} is newer than the latest supported version {latest}")]
    UnsupportedVersion { found: u32, latest: u32 },

    #[error("Expected '{field}' to be {expected}")]
    MalformedField {
        field: &'static str,
        expected: &'static str,
    },
}

/// Errors returned when a command cannot be applied to a `ProjectState`.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StateError {
    #[error("Stage '{0}' not found")]
    StageNotFound(String),

    #[error("Transition '{0}' not found")]
    TransitionNotFound(String),

    #[error("Cohort '{0}' not found")]
    CohortNotFound(String),

    #[error("Opportunity '{0}' not found")]
    OpportunityNotFound(String),

    #[error("A transition from '{source_id}' to '{target_id}' already exists")]
    DuplicateTransition {
        source_id: String,
        target_id: String,
    },

    #[error("Stage '{0}' cannot transition to itself")]
    SelfLoop(String),
}
