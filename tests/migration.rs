//! Tests for upgrading older persisted project layouts.
mod common;
use common::*;
use funnelcast::model::{CURRENT_SCHEMA_VERSION, migrate};
use funnelcast::prelude::*;
use serde_json::json;

const LEGACY_PROJECT_JSON: &str = r##"{
  "stages": [
    { "id": "A", "name": "Visit", "isTerminal": false },
    { "id": "B", "name": "Trial", "isTerminal": false },
    { "id": "C", "name": "Paid", "isTerminal": true }
  ],
  "edges": [
    { "id": "e1", "sourceId": "A", "targetId": "B" },
    { "id": "e2", "sourceId": "B", "targetId": "C" }
  ],
  "cohorts": [
    {
      "id": "K",
      "name": "Self-serve",
      "color": "#4f46e5",
      "entryStageId": "A",
      "entryVolume": 1000,
      "conversionRates": { "e1": 0.5, "e2": 0.4 }
    }
  ],
  "opportunities": [
    {
      "id": "improve-e2",
      "name": "Improve e2",
      "edgeId": "e2",
      "improvement": 0.6,
      "cohortIds": [],
      "likelihood": 1,
      "enabled": true
    }
  ]
}"##;

#[test]
fn test_unversioned_project_is_fully_migrated() {
    let bundle = ProjectBundle::from_json(LEGACY_PROJECT_JSON).expect("legacy project should load");

    let cohort = bundle.cohort("K").unwrap();
    assert_eq!(cohort.entries.len(), 1);
    assert_eq!(cohort.entries["A"], 1000.0);

    let opp = bundle.opportunity("improve-e2").unwrap();
    assert_eq!(
        opp.mode,
        OpportunityMode::Rate {
            edge_id: "e2".to_string(),
            target_rate: 0.6
        }
    );

    // The migrated project projects identically to the current-schema one.
    assert_eq!(bundle, create_linear_bundle_with_color());
    let results = compute_projections(
        &bundle.stages,
        &bundle.transitions,
        &bundle.cohorts,
        &bundle.opportunities,
    );
    assert_close(results[0].projected_conversion, 0.3);
}

fn create_linear_bundle_with_color() -> ProjectBundle {
    let mut bundle = create_linear_bundle();
    bundle.cohorts[0].color = "#4f46e5".to_string();
    bundle
}

#[test]
fn test_v1_envelope_only_migrates_opportunities() {
    let migrated = migrate(json!({
        "state": {
            "cohorts": [{ "id": "K", "name": "K", "entries": { "A": 5 }, "entryStageId": "B", "entryVolume": 9 }],
            "opportunities": [{ "id": "o", "name": "Old", "edgeId": "e1", "improvement": 0.3 }]
        },
        "version": 1
    }))
    .unwrap();

    // Cohort layout is already v1, so its legacy keys are left alone.
    assert_eq!(migrated["cohorts"][0]["entries"], json!({ "A": 5 }));
    assert_eq!(migrated["opportunities"][0]["mode"], json!("rate"));
    assert_eq!(migrated["opportunities"][0]["targetRate"], json!(0.3));
    assert_eq!(migrated["stages"], json!([]));
    assert_eq!(migrated["edges"], json!([]));
}

#[test]
fn test_current_version_is_untouched() {
    let document: serde_json::Value = serde_json::from_str(LINEAR_PROJECT_JSON).unwrap();
    let migrated = migrate(document.clone()).unwrap();
    assert_eq!(migrated, document["state"]);
}

#[test]
fn test_missing_entry_point_yields_empty_entries() {
    let migrated = migrate(json!({
        "cohorts": [{ "id": "K", "name": "K", "entryStageId": "", "entryVolume": 100 }]
    }))
    .unwrap();
    assert_eq!(migrated["cohorts"][0]["entries"], json!({}));
    assert!(migrated["cohorts"][0].get("entryVolume").is_none());
}

#[test]
fn test_newer_version_is_rejected() {
    let err = migrate(json!({ "state": {}, "version": CURRENT_SCHEMA_VERSION + 1 })).unwrap_err();
    assert_eq!(
        err,
        MigrationError::UnsupportedVersion {
            found: CURRENT_SCHEMA_VERSION + 1,
            latest: CURRENT_SCHEMA_VERSION
        }
    );

    let result = ProjectBundle::from_json(r#"{ "state": {}, "version": 3 }"#);
    assert!(matches!(
        result,
        Err(BundleError::Migration(MigrationError::UnsupportedVersion { found: 3, .. }))
    ));
}

#[test]
fn test_empty_document_loads_as_empty_bundle() {
    let bundle = ProjectBundle::from_json(r#"{ "state": {}, "version": 2 }"#).unwrap();
    assert_eq!(bundle, ProjectBundle::default());
    let bundle = ProjectBundle::from_json("{}").unwrap();
    assert_eq!(bundle, ProjectBundle::default());
}

#[test]
fn test_malformed_documents() {
    assert_eq!(
        migrate(json!([])).unwrap_err(),
        MigrationError::MalformedField {
            field: "<root>",
            expected: "an object"
        }
    );
    assert_eq!(
        migrate(json!({ "cohorts": 5 })).unwrap_err(),
        MigrationError::MalformedField {
            field: "cohorts",
            expected: "an array"
        }
    );
    assert!(matches!(
        migrate(json!({ "state": {}, "version": "two" })),
        Err(MigrationError::MalformedField { field: "version", .. })
    ));
    assert!(matches!(
        ProjectBundle::from_json("not json"),
        Err(BundleError::JsonParseError(_))
    ));
}

#[test]
fn test_null_or_empty_mode_is_treated_as_legacy() {
    let bundle = ProjectBundle::from_json(
        r#"{
          "state": {
            "edges": [{ "id": "e1", "sourceId": "A", "targetId": "B" }],
            "opportunities": [
              { "id": "o", "name": "Null", "mode": null, "edgeId": "e1", "improvement": 0.3 },
              { "id": "p", "name": "Empty", "mode": "", "edgeId": "e1", "improvement": 0.7 }
            ]
          },
          "version": 1
        }"#,
    )
    .expect("legacy opportunities should load");

    assert_eq!(
        bundle.opportunity("o").unwrap().mode,
        OpportunityMode::Rate {
            edge_id: "e1".to_string(),
            target_rate: 0.3
        }
    );
    assert_eq!(
        bundle.opportunity("p").unwrap().mode,
        OpportunityMode::Rate {
            edge_id: "e1".to_string(),
            target_rate: 0.7
        }
    );
}

#[test]
fn test_null_entries_are_rebuilt_from_entry_point() {
    let migrated = migrate(json!({
        "cohorts": [{ "id": "K", "name": "K", "entries": null, "entryStageId": "A", "entryVolume": 250 }]
    }))
    .unwrap();
    assert_eq!(migrated["cohorts"][0]["entries"], json!({ "A": 250 }));
}
