//! Catalog Command Tests
//!
//! End-to-end tests over files on disk:
//! - Configuration and object dump are loaded and indexed
//! - Commands return the expected JSON data
//! - Failures surface with their CLI error code

use std::io::Write;
use std::path::Path;

use appy_catalog::catalog::CatalogRegistry;
use appy_catalog::cli::{self, CliErrorCode, Source};
use appy_catalog::config::CatalogConfig;
use appy_catalog::index::IndexErrorCode;
use appy_catalog::model::{JsonLinesScan, ObjectScan};
use serde_json::{json, Value};
use tempfile::TempDir;

// =============================================================================
// Helper Functions
// =============================================================================

const CONFIG: &str = r#"{
    "log_level": "error",
    "classes": [
        { "name": "Person", "indexes": [
            { "field": "name", "type": "sortable" },
            { "field": "birth", "type": "date" },
            { "field": "height", "type": "float", "precision": 1 },
            { "field": "friends", "type": "ref" }
        ] },
        { "name": "Place", "indexes": [ { "field": "name", "type": "sortable" } ] }
    ]
}"#;

fn objects() -> Vec<Value> {
    vec![
        json!({"iid": 1, "class": "Person", "fields": {"name": "Zoé", "birth": "1990-05-01", "height": 1.72, "friends": [{"iid": 2}, {"iid": 3}]}}),
        json!({"iid": 2, "class": "Person", "fields": {"name": "adam", "birth": "1985-11-20 08:30", "height": 1.80}}),
        json!({"iid": 3, "class": "Person", "fields": {"name": "Marc", "height": "1.64", "friends": [{"iid": 2}]}}),
        json!({"iid": 4, "class": "Person", "deleted": true, "fields": {"name": "Gone"}}),
        json!({"iid": 5, "class": "Place", "fields": {"name": "Namur"}}),
        json!({"iid": 6, "class": "Person", "fields": {"name": "Bad", "birth": "someday"}}),
    ]
}

fn write_file(path: &Path, content: &str) {
    let mut file = std::fs::File::create(path).unwrap();
    file.write_all(content.as_bytes()).unwrap();
}

fn setup() -> (TempDir, Source) {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("catalog.json");
    let dump = dir.path().join("objects.jsonl");

    write_file(&config, CONFIG);
    let lines: Vec<String> = objects().iter().map(Value::to_string).collect();
    write_file(&dump, &(lines.join("\n") + "\n\n"));

    let source = Source {
        config,
        objects: dump,
    };
    (dir, source)
}

// =============================================================================
// Loading Tests
// =============================================================================

/// The dump is scanned in order and blank lines are skipped.
#[test]
fn test_json_lines_scan() {
    let (_dir, source) = setup();
    let mut scan = JsonLinesScan::open(&source.objects).unwrap();

    let mut iids = Vec::new();
    while let Some(object) = scan.scan_next().unwrap() {
        iids.push(object.iid);
    }
    assert_eq!(iids, vec![1, 2, 3, 4, 5, 6]);

    scan.reset().unwrap();
    assert_eq!(scan.scan_next().unwrap().map(|o| o.iid), Some(1));
}

/// Populating reports the objects that failed to index.
#[test]
fn test_populate_from_files() {
    let (_dir, source) = setup();
    let config = CatalogConfig::load(&source.config).unwrap();
    let mut registry = CatalogRegistry::from_config(&config);
    let mut scan = JsonLinesScan::open(&source.objects).unwrap();

    let report = registry.populate(&mut scan).unwrap();
    assert_eq!(report.scanned, 6);
    assert_eq!(report.indexed, 4);
    assert_eq!(report.failures.len(), 1);
    assert_eq!(report.failures[0].iid, 6);
    assert_eq!(report.failures[0].index, "birth");

    let person = registry.catalog("Person").unwrap();
    assert_eq!(person.all_ids().len(), 4);
    assert!(person.index("name").unwrap().stored_value(4).is_none());
}

/// A malformed line aborts population with a scan failure.
#[test]
fn test_populate_aborts_on_bad_line() {
    let (_dir, source) = setup();
    write_file(&source.objects, "{\"iid\": 1, \"class\": \"Person\"}\nnot json\n");

    let config = CatalogConfig::load(&source.config).unwrap();
    let mut registry = CatalogRegistry::from_config(&config);
    let mut scan = JsonLinesScan::open(&source.objects).unwrap();

    let err = registry.populate(&mut scan).unwrap_err();
    assert_eq!(err.code(), IndexErrorCode::ScanFailed);
    assert!(err.is_fatal());
    assert!(err.message().contains("position 2"));
}

// =============================================================================
// Command Tests
// =============================================================================

#[test]
fn test_stats_command() {
    let (_dir, source) = setup();
    let data = cli::stats(&source).unwrap();

    assert_eq!(data["populate"]["scanned"], 6);
    let catalogs = data["catalogs"].as_array().unwrap();
    assert_eq!(catalogs.len(), 2);
    assert_eq!(catalogs[0]["catalog"], "Person");
    assert_eq!(catalogs[0]["objects"], 4);
    assert_eq!(catalogs[1]["catalog"], "Place");
}

#[test]
fn test_search_command_sorted_and_paged() {
    let (_dir, source) = setup();
    let criteria = vec!["height=1.7..2".to_string()];

    let data = cli::search(&source, "Person", &criteria, Some("name"), false, 0, 10).unwrap();
    assert_eq!(data["total"], 2);
    assert_eq!(data["ids"], json!([2, 1]));

    let data = cli::search(&source, "Person", &criteria, Some("name"), true, 0, 1).unwrap();
    assert_eq!(data["ids"], json!([1]));
    let data = cli::search(&source, "Person", &criteria, Some("name"), true, 1, 1).unwrap();
    assert_eq!(data["ids"], json!([2]));
}

#[test]
fn test_search_command_by_reference() {
    let (_dir, source) = setup();

    let data = cli::search(&source, "Person", &["friends=2".to_string()], None, false, 0, 10).unwrap();
    assert_eq!(data["ids"], json!([1, 3]));

    // Negation is relative to the objects having a value in the index
    let data = cli::search(&source, "Person", &["friends=!3".to_string()], None, false, 0, 10).unwrap();
    assert_eq!(data["ids"], json!([3]));

    let data = cli::search(&source, "Person", &[], Some("birth"), false, 0, 10).unwrap();
    assert_eq!(data["ids"], json!([3, 6, 2, 1]));
}

#[test]
fn test_search_command_errors() {
    let (_dir, source) = setup();

    let err = cli::search(&source, "Person", &["=1".to_string()], None, false, 0, 10).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::InvalidCriterion);

    let err = cli::search(&source, "Animal", &[], None, false, 0, 10).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::IndexError);

    let err = cli::search(&source, "Person", &["birth=true".to_string()], None, false, 0, 10).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::IndexError);
    assert!(err.message().contains("CATALOG_QUERY_INVALID"));
}

#[test]
fn test_recompute_command() {
    let (_dir, source) = setup();

    let data = cli::recompute(&source, "Person", Some("height")).unwrap();
    let reports = data["recompute"].as_array().unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0]["objects_before"], reports[0]["objects_after"]);
    assert_eq!(reports[0]["values_after"], 3);

    let data = cli::recompute(&source, "Person", None).unwrap();
    assert_eq!(data["recompute"].as_array().unwrap().len(), 4);
}

#[test]
fn test_show_command() {
    let (_dir, source) = setup();

    let data = cli::show(&source, "Person", "height", None).unwrap();
    assert_eq!(data["codec"], "float");
    assert_eq!(data["objects"], 3);
    assert_eq!(data["entries"][0]["ids"], json!([3]));

    let data = cli::show(&source, "Person", "birth", Some(2)).unwrap();
    assert_eq!(data["value"], "1985-11-20 08:30");

    let data = cli::show(&source, "Person", "birth", Some(3)).unwrap();
    assert_eq!(data["value"], Value::Null);
}

#[test]
fn test_missing_config() {
    let (dir, mut source) = setup();
    source.config = dir.path().join("absent.json");

    let err = cli::stats(&source).unwrap_err();
    assert_eq!(err.code(), &CliErrorCode::ConfigError);
}
