//! End-to-end scenarios: a user editing a catalog while remote detection
//! results trickle in, and the resulting change log surviving persistence.

use crate::catalog::{CatalogConfig, CatalogPatch, SettingsPatch};
use crate::db::Database;
use crate::marker::{MarkerPatch, ViewportTransform};
use crate::registry::CatalogRegistry;
use crate::store::SourceRecord;
use crate::task::{apply_response, Applied, TaskResponse};
use rusqlite::Connection;
use serde_json::json;

fn record(fields: serde_json::Value) -> SourceRecord {
    serde_json::from_value(fields).unwrap()
}

fn response(value: serde_json::Value) -> TaskResponse {
    serde_json::from_value(value).unwrap()
}

#[test]
fn user_session_with_remote_results() {
    let mut registry = CatalogRegistry::new();
    registry
        .create_catalog("cat-0", CatalogConfig::default())
        .unwrap();

    // The viewer attaches its transform before the user clicks anything.
    registry
        .current_mut()
        .unwrap()
        .update(CatalogPatch::Viewport(ViewportTransform::new(1.0)))
        .unwrap();

    // User clicks two stars.
    let catalog = registry.current_mut().unwrap();
    let a = catalog
        .add_source(record(json!({"ra": 83.8, "dec": -5.4, "x": 120.0, "y": 80.0})))
        .unwrap();
    catalog
        .add_source(record(json!({"x": 30.25, "y": 44.125})))
        .unwrap();
    assert_eq!(a, "83.8,-5.4");
    assert_eq!(catalog.markers().len(), 2);

    // A detection batch lands for the same catalog; one source collides
    // with the user's click and is dropped.
    let resp = response(json!({
        "id": "detect_sources",
        "status": "success",
        "cid": "cat-0",
        "sources": [
            {"id": "83.8,-5.4", "x": 119.9, "y": 80.1},
            {"id": "det-1", "x": 300.0, "y": 200.0},
            {"id": "det-2", "x": 310.0, "y": 210.0}
        ]
    }));
    assert_eq!(apply_response(&mut registry, &resp).unwrap(), Applied::Merged);

    let catalog = registry.current_mut().unwrap();
    assert_eq!(catalog.store().len(), 4);
    // the user's coordinates survived the stale remote duplicate
    assert_eq!(catalog.store().get_row(&a).unwrap()["x"], json!(120.0));

    // Select, zoom, check the highlight follows.
    catalog.select_source("det-1").unwrap();
    catalog
        .update(CatalogPatch::Viewport(ViewportTransform::new(2.0)))
        .unwrap();
    let highlight = catalog.highlight().unwrap();
    assert_eq!(highlight.key, "det-1");
    assert_eq!(highlight.settings.line_width, 4.0); // doubled default
    assert_eq!(highlight.geometry.line_width, 8.0); // and scaled on screen
    assert_eq!(catalog.markers().len(), 4);

    // Deleting the selected source drops its marker and the highlight.
    assert_eq!(catalog.delete_source("det-1"), 1);
    assert_eq!(catalog.selected(), None);
    assert!(catalog.highlight().is_none());
    assert_eq!(catalog.markers().len(), 3);

    // Only the user's two adds and the delete went to the change log;
    // the detection merge is server data and needs no round trip.
    let actions: Vec<&str> = catalog
        .change_log()
        .entries()
        .iter()
        .map(|e| e.action.as_str())
        .collect();
    assert_eq!(actions, vec!["add_src", "add_src", "delete_src"]);
}

#[test]
fn restyled_catalog_survives_save_and_reload() {
    let mut registry = CatalogRegistry::new();
    registry
        .create_catalog("m42", CatalogConfig::default())
        .unwrap();
    let catalog = registry.get_mut("m42").unwrap();
    catalog
        .add_source(record(json!({"id": "s1", "x": 10.0, "y": 20.0})))
        .unwrap();
    catalog
        .update(CatalogPatch::Settings(SettingsPatch {
            name: Some("Orion Nebula".to_string()),
            marker: MarkerPatch {
                color: Some("#00FF00".to_string()),
                ..MarkerPatch::default()
            },
        }))
        .unwrap();

    let conn = Connection::open_in_memory().unwrap();
    let db = Database::new(&conn);
    db.init().unwrap();
    db.save_catalog(registry.get("m42").unwrap()).unwrap();

    let loaded = db.load_catalog("m42").unwrap();
    assert_eq!(loaded.name(), "Orion Nebula");
    assert_eq!(loaded.settings().color, "#00FF00");
    assert_eq!(loaded.store().len(), 1);

    // A fresh registry can adopt the loaded catalog and route to it.
    let mut registry = CatalogRegistry::new();
    registry.insert(loaded).unwrap();
    registry.set_current("m42").unwrap();
    assert_eq!(registry.current().unwrap().cid(), "m42");
}

#[test]
fn removed_catalog_swallows_late_responses() {
    let mut registry = CatalogRegistry::new();
    registry
        .create_catalog("cat-0", CatalogConfig::default())
        .unwrap();
    registry
        .create_catalog("cat-1", CatalogConfig::default())
        .unwrap();
    registry.remove_catalog("cat-0");

    // cat-1 was created after cat-0 and is current; the late response for
    // cat-0 must neither crash nor leak into cat-1.
    let resp = response(json!({
        "id": "detect_sources",
        "status": "success",
        "cid": "cat-0",
        "sources": [{"id": "s1", "x": 1.0, "y": 2.0}]
    }));
    assert_eq!(apply_response(&mut registry, &resp).unwrap(), Applied::Ignored);
    assert!(registry.get("cat-1").unwrap().store().is_empty());
    assert_eq!(registry.current().unwrap().cid(), "cat-1");
}
