use super::definition::{Cohort, Opportunity, Stage, Transition};
use super::migration::{self, CURRENT_SCHEMA_VERSION};
use crate::error::BundleError;
use crate::projection::ProjectionReport;
use bincode::config::standard;
use bincode::serde::{decode_from_slice, encode_to_vec};
use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{Read, Write};

/// The flat, serializable set of entities that describes one funnel project.
///
/// This is the exact shape collaborators persist and hand to the projection
/// functions. Transitions are stored under the `edges` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProjectBundle {
    #[serde(default)]
    pub stages: Vec<Stage>,
    #[serde(default, rename = "edges")]
    pub transitions: Vec<Transition>,
    #[serde(default)]
    pub cohorts: Vec<Cohort>,
    #[serde(default)]
    pub opportunities: Vec<Opportunity>,
}

impl ProjectBundle {
    /// Parses a persisted project, migrating older schema versions first.
    pub fn from_json(json: &str) -> Result<Self, BundleError> {
        let document: serde_json::Value = serde_json::from_str(json)
            .map_err(|e| BundleError::JsonParseError(e.to_string()))?;
        let current = migration::migrate(document)?;
        serde_json::from_value(current).map_err(|e| BundleError::JsonParseError(e.to_string()))
    }

    /// Loads and migrates a project from a JSON file.
    pub fn from_file(path: &str) -> Result<Self, BundleError> {
        let content = fs::read_to_string(path).map_err(|e| io_error(path, e))?;
        Self::from_json(&content)
    }

    /// Serializes the project in the current schema, wrapped in a versioned envelope.
    pub fn to_json(&self) -> Result<String, BundleError> {
        let envelope = serde_json::json!({
            "state": self,
            "version": CURRENT_SCHEMA_VERSION,
        });
        serde_json::to_string_pretty(&envelope)
            .map_err(|e| BundleError::JsonParseError(e.to_string()))
    }

    pub fn save_json(&self, path: &str) -> Result<(), BundleError> {
        fs::write(path, self.to_json()?).map_err(|e| io_error(path, e))
    }

    pub fn stage(&self, id: &str) -> Option<&Stage> {
        self.stages.iter().find(|s| s.id == id)
    }

    pub fn transition(&self, id: &str) -> Option<&Transition> {
        self.transitions.iter().find(|t| t.id == id)
    }

    pub fn cohort(&self, id: &str) -> Option<&Cohort> {
        self.cohorts.iter().find(|c| c.id == id)
    }

    pub fn opportunity(&self, id: &str) -> Option<&Opportunity> {
        self.opportunities.iter().find(|o| o.id == id)
    }
}

/// A precomputed projection together with the project it was computed from.
///
/// Read-only consumers (a shared dashboard, for example) can load this without
/// re-running the projection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectionSnapshot {
    pub schema_version: u32,
    pub bundle: ProjectBundle,
    pub report: ProjectionReport,
}

impl ProjectionSnapshot {
    pub fn new(bundle: ProjectBundle, report: ProjectionReport) -> Self {
        Self {
            schema_version: CURRENT_SCHEMA_VERSION,
            bundle,
            report,
        }
    }

    /// Encodes the snapshot using the bincode format.
    pub fn to_bytes(&self) -> Result<Vec<u8>, BundleError> {
        encode_to_vec(self, standard())
            .map_err(|e| BundleError::Snapshot(format!("Serialization failed: {}", e)))
    }

    /// Saves the snapshot to a file using the bincode format.
    pub fn save(&self, path: &str) -> Result<(), BundleError> {
        let bytes = self.to_bytes()?;
        let mut file = fs::File::create(path).map_err(|e| io_error(path, e))?;
        file.write_all(&bytes).map_err(|e| io_error(path, e))?;
        Ok(())
    }

    /// Loads a snapshot from a file.
    pub fn from_file(path: &str) -> Result<Self, BundleError> {
        let mut file = fs::File::open(path).map_err(|e| io_error(path, e))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(|e| io_error(path, e))?;
        Self::from_bytes(&bytes)
    }

    /// Deserializes a snapshot from a byte slice.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, BundleError> {
        let snapshot: Self = decode_from_slice(bytes, standard())
            .map(|(snapshot, _)| snapshot) // bincode 2 returns (data, bytes_read)
            .map_err(|e| BundleError::Snapshot(format!("Deserialization failed: {}", e)))?;

        if snapshot.schema_version > CURRENT_SCHEMA_VERSION {
            return Err(BundleError::Migration(
                crate::error::MigrationError::UnsupportedVersion {
                    found: snapshot.schema_version,
                    latest: CURRENT_SCHEMA_VERSION,
                },
            ));
        }
        Ok(snapshot)
    }
}

fn io_error(path: &str, e: std::io::Error) -> BundleError {
    BundleError::Io {
        path: path.to_string(),
        message: e.to_string(),
    }
}
