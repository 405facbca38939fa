//! Schema-constrained, ordered store of point-source records.

use crate::error::{CatalogError, Result};
use crate::utils::{format_float, round_to};
use serde_json::Value;
use std::collections::BTreeMap;
use std::collections::HashMap;

/// One source: a mapping from column name to value. Only columns declared in
/// the owning store's schema survive insertion.
pub type SourceRecord = BTreeMap<String, Value>;

/// Read a record field as a float, accepting JSON numbers only.
pub fn record_number(record: &SourceRecord, column: &str) -> Option<f64> {
    record.get(column).and_then(Value::as_f64)
}

/// An ordered, uniquely-keyed collection of source records.
///
/// Insertion order is preserved for iteration and display; lookup goes
/// through the key index. Keys are unique and duplicate inserts are
/// rejected, never overwritten.
#[derive(Debug, Clone)]
pub struct SourceStore {
    columns: Vec<String>,
    key_column: String,
    order: Vec<String>,
    rows: HashMap<String, SourceRecord>,
}

impl SourceStore {
    /// Create an empty store. The key column is added to the schema if the
    /// caller left it out of `columns`.
    pub fn new(columns: Vec<String>, key_column: &str) -> Self {
        let mut columns = columns;
        if !columns.iter().any(|c| c == key_column) {
            columns.insert(0, key_column.to_string());
        }
        SourceStore {
            columns,
            key_column: key_column.to_string(),
            order: Vec::new(),
            rows: HashMap::new(),
        }
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn key_column(&self) -> &str {
        &self.key_column
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.rows.contains_key(key)
    }

    /// Project `record` onto the schema, assign a key and insert.
    ///
    /// When the record carries no key, one is derived from `ra,dec`
    /// (concatenated) or, failing that, from `x,y` rounded to two decimal
    /// places. Returns the assigned key; fails with `DuplicateKey` when a
    /// record with the same key is already stored.
    pub fn add_row(&mut self, record: SourceRecord) -> Result<String> {
        let mut record = self.project(record);
        let key = match record.get(&self.key_column) {
            Some(value) => value_to_key(value),
            None => self.derive_key(&record)?,
        };
        if self.rows.contains_key(&key) {
            return Err(CatalogError::DuplicateKey { key });
        }
        record.insert(self.key_column.clone(), Value::String(key.clone()));
        self.order.push(key.clone());
        self.rows.insert(key.clone(), record);
        Ok(key)
    }

    /// Remove one record by key. Removing an absent key is a no-op.
    pub fn delete_row(&mut self, key: &str) -> usize {
        if self.rows.remove(key).is_some() {
            self.order.retain(|k| k != key);
            1
        } else {
            0
        }
    }

    /// Remove several records; returns how many were actually present.
    pub fn delete_rows(&mut self, keys: &[String]) -> usize {
        keys.iter().map(|k| self.delete_row(k)).sum()
    }

    pub fn get_row(&self, key: &str) -> Result<&SourceRecord> {
        self.rows
            .get(key)
            .ok_or_else(|| CatalogError::not_found(format!("source '{}'", key)))
    }

    /// Records in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &SourceRecord)> {
        self.order
            .iter()
            .map(move |k| (k.as_str(), &self.rows[k]))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// Drop every field the schema does not declare.
    fn project(&self, record: SourceRecord) -> SourceRecord {
        record
            .into_iter()
            .filter(|(name, _)| self.columns.iter().any(|c| c == name))
            .collect()
    }

    fn derive_key(&self, record: &SourceRecord) -> Result<String> {
        if let (Some(ra), Some(dec)) = (
            record_number(record, "ra"),
            record_number(record, "dec"),
        ) {
            return Ok(format!("{},{}", format_float(ra), format_float(dec)));
        }
        if let (Some(x), Some(y)) = (record_number(record, "x"), record_number(record, "y")) {
            return Ok(format!(
                "{},{}",
                format_float(round_to(x, 2)),
                format_float(round_to(y, 2))
            ));
        }
        Err(CatalogError::InvalidCoordinate {
            value: "source has neither ra/dec nor x/y to derive a key from".to_string(),
        })
    }
}

fn value_to_key(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Number(n) => n
            .as_f64()
            .map(format_float)
            .unwrap_or_else(|| n.to_string()),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn default_columns() -> Vec<String> {
        ["id", "ra", "dec", "x", "y"]
            .iter()
            .map(|c| c.to_string())
            .collect()
    }

    fn record(fields: Value) -> SourceRecord {
        serde_json::from_value(fields).unwrap()
    }

    #[test]
    fn test_key_derived_from_ra_dec() {
        let mut store = SourceStore::new(default_columns(), "id");
        let key = store
            .add_row(record(json!({"ra": 10.5, "dec": -20.25})))
            .unwrap();
        assert_eq!(key, "10.5,-20.25");
        let row = store.get_row(&key).unwrap();
        assert_eq!(row["id"], json!("10.5,-20.25"));
    }

    #[test]
    fn test_key_derived_from_rounded_x_y() {
        let mut store = SourceStore::new(default_columns(), "id");
        let key = store
            .add_row(record(json!({"x": 3.14159, "y": 2.71828})))
            .unwrap();
        assert_eq!(key, "3.14,2.72");
    }

    #[test]
    fn test_supplied_key_wins_over_derivation() {
        let mut store = SourceStore::new(default_columns(), "id");
        let key = store
            .add_row(record(json!({"id": "a", "ra": 1.0, "dec": 2.0})))
            .unwrap();
        assert_eq!(key, "a");
    }

    #[test]
    fn test_schema_projection_drops_undeclared_fields() {
        let mut store = SourceStore::new(default_columns(), "id");
        let key = store
            .add_row(record(json!({"id": "a", "ra": 1.0, "dec": 2.0, "bogus": 99})))
            .unwrap();
        let row = store.get_row(&key).unwrap();
        assert!(!row.contains_key("bogus"));
        assert_eq!(row["ra"], json!(1.0));
    }

    #[test]
    fn test_duplicate_key_rejected() {
        let mut store = SourceStore::new(default_columns(), "id");
        store.add_row(record(json!({"id": "a", "x": 1.0, "y": 1.0}))).unwrap();
        let err = store
            .add_row(record(json!({"id": "a", "x": 2.0, "y": 2.0})))
            .unwrap_err();
        assert_eq!(err, CatalogError::DuplicateKey { key: "a".to_string() });
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_delete_missing_key_is_noop() {
        let mut store = SourceStore::new(default_columns(), "id");
        assert_eq!(store.delete_row("missing"), 0);
        assert_eq!(store.delete_rows(&["a".to_string(), "b".to_string()]), 0);
    }

    #[test]
    fn test_delete_counts_present_keys_only() {
        let mut store = SourceStore::new(default_columns(), "id");
        store.add_row(record(json!({"id": "a", "x": 1.0, "y": 1.0}))).unwrap();
        store.add_row(record(json!({"id": "b", "x": 2.0, "y": 2.0}))).unwrap();
        let removed = store.delete_rows(&[
            "a".to_string(),
            "missing".to_string(),
            "b".to_string(),
        ]);
        assert_eq!(removed, 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_row_missing_fails() {
        let store = SourceStore::new(default_columns(), "id");
        assert!(matches!(
            store.get_row("nope"),
            Err(CatalogError::NotFound { .. })
        ));
    }

    #[test]
    fn test_iteration_preserves_insertion_order() {
        let mut store = SourceStore::new(default_columns(), "id");
        for id in ["c", "a", "b"] {
            store
                .add_row(record(json!({"id": id, "x": 1.0, "y": 1.0})))
                .unwrap();
        }
        let keys: Vec<&str> = store.iter().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["c", "a", "b"]);
        // restartable
        let again: Vec<&str> = store.keys().collect();
        assert_eq!(again, keys);
    }

    #[test]
    fn test_key_column_added_to_schema_when_missing() {
        let store = SourceStore::new(vec!["ra".to_string(), "dec".to_string()], "id");
        assert!(store.columns().iter().any(|c| c == "id"));
    }
}
