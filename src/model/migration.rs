//! Upgrades older persisted project layouts to the current schema.
//!
//! Migrations run on the raw JSON tree before it is deserialized into typed
//! entities, so the projection code only ever sees current-schema data.
//!
//! | From | To | Change |
//! |------|----|--------|
//! | 0    | 1  | single `entryStageId`/`entryVolume` per cohort becomes the `entries` map |
//! | 1    | 2  | opportunities with a missing, null or empty `mode` become rate-mode, seeded from the legacy `improvement` |

use crate::error::MigrationError;
use log::debug;
use serde_json::{Map, Value};

/// The schema version written by this crate.
pub const CURRENT_SCHEMA_VERSION: u32 = 2;

type Migration = fn(&mut Map<String, Value>) -> Result<(), MigrationError>;

/// Ordered chain; entry `n` upgrades version `n` to `n + 1`.
const MIGRATIONS: [Migration; CURRENT_SCHEMA_VERSION as usize] =
    [migrate_cohort_entries, migrate_opportunity_modes];

/// Unwraps a persisted document and brings it up to `CURRENT_SCHEMA_VERSION`.
///
/// Accepts either a bare `{ stages, edges, cohorts, opportunities }` object or the
/// `{ "state": { ... }, "version": n }` envelope. A bare object without a version
/// is treated as version 0; every migration is idempotent on already-current data.
pub fn migrate(document: Value) -> Result<Value, MigrationError> {
    let (mut state, version) = unwrap_envelope(document)?;

    if version > CURRENT_SCHEMA_VERSION {
        return Err(MigrationError::UnsupportedVersion {
            found: version,
            latest: CURRENT_SCHEMA_VERSION,
        });
    }

    for (step, migration) in MIGRATIONS.iter().enumerate().skip(version as usize) {
        debug!("Migrating project data from schema v{} to v{}", step, step + 1);
        migration(&mut state)?;
    }

    for key in ["stages", "edges", "cohorts", "opportunities"] {
        state
            .entry(key.to_string())
            .or_insert_with(|| Value::Array(Vec::new()));
    }

    Ok(Value::Object(state))
}

fn unwrap_envelope(document: Value) -> Result<(Map<String, Value>, u32), MigrationError> {
    let Value::Object(mut root) = document else {
        return Err(MigrationError::MalformedField {
            field: "<root>",
            expected: "an object",
        });
    };

    let version = match root.get("version") {
        None | Some(Value::Null) => 0,
        Some(v) => v
            .as_u64()
            .and_then(|n| u32::try_from(n).ok())
            .ok_or(MigrationError::MalformedField {
                field: "version",
                expected: "a non-negative integer",
            })?,
    };

    match root.remove("state") {
        Some(Value::Object(state)) => Ok((state, version)),
        Some(_) => Err(MigrationError::MalformedField {
            field: "state",
            expected: "an object",
        }),
        None => {
            root.remove("version");
            Ok((root, version))
        }
    }
}

fn records_mut<'a>(
    state: &'a mut Map<String, Value>,
    field: &'static str,
) -> Result<Option<&'a mut Vec<Value>>, MigrationError> {
    match state.get_mut(field) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Array(items)) => Ok(Some(items)),
        Some(_) => Err(MigrationError::MalformedField {
            field,
            expected: "an array",
        }),
    }
}

/// v0 -> v1: one entry point per cohort becomes a stage -> volume map.
fn migrate_cohort_entries(state: &mut Map<String, Value>) -> Result<(), MigrationError> {
    let Some(cohorts) = records_mut(state, "cohorts")? else {
        return Ok(());
    };

    for cohort in cohorts.iter_mut().filter_map(Value::as_object_mut) {
        if cohort.get("entries").is_some_and(Value::is_object) {
            continue;
        }
        let stage_id = cohort.remove("entryStageId");
        let volume = cohort.remove("entryVolume");

        let mut entries = Map::new();
        if let (Some(Value::String(stage_id)), Some(volume)) = (stage_id, volume) {
            if !stage_id.is_empty() && volume.is_number() {
                entries.insert(stage_id, volume);
            }
        }
        cohort.insert("entries".to_string(), Value::Object(entries));
    }
    Ok(())
}

/// v1 -> v2: opportunities gain an explicit mode; legacy ones become rate-mode.
fn migrate_opportunity_modes(state: &mut Map<String, Value>) -> Result<(), MigrationError> {
    let Some(opportunities) = records_mut(state, "opportunities")? else {
        return Ok(());
    };

    for opp in opportunities.iter_mut().filter_map(Value::as_object_mut) {
        let has_mode = opp
            .get("mode")
            .and_then(Value::as_str)
            .is_some_and(|mode| !mode.is_empty());
        if has_mode {
            continue;
        }
        // Approximate: the legacy improvement becomes the target rate.
        let improvement = opp
            .get("improvement")
            .and_then(Value::as_f64)
            .unwrap_or(0.0);
        opp.insert("mode".to_string(), Value::from("rate"));
        opp.insert("targetRate".to_string(), Value::from(improvement));
        opp.insert("targetStageId".to_string(), Value::from(""));
        opp.insert("absoluteCount".to_string(), Value::from(0));
    }
    Ok(())
}
