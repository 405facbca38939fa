//! A named collection of point sources with marker state and a change log.

use crate::changelog::{ChangeAction, ChangeLog};
use crate::error::{CatalogError, Result};
use crate::marker::{
    compute_geometry, MarkerGeometry, MarkerPatch, MarkerSettings, ViewportTransform,
};
use crate::store::{record_number, SourceRecord, SourceStore};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Construction parameters for a [`Catalog`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogConfig {
    pub name: Option<String>,
    pub columns: Vec<String>,
    pub key_column: String,
    pub marker: MarkerSettings,
}

impl Default for CatalogConfig {
    fn default() -> Self {
        CatalogConfig {
            name: None,
            columns: ["id", "ra", "dec", "x", "y"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            key_column: "id".to_string(),
            marker: MarkerSettings::default(),
        }
    }
}

/// A marker the catalog has asked the rendering collaborator to draw.
/// The catalog owns this bookkeeping; it never touches pixels itself.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedMarker {
    pub key: String,
    pub geometry: MarkerGeometry,
    pub settings: MarkerSettings,
}

/// Tagged update commands, one variant per field group, so merge behavior
/// is explicit per variant instead of inferred from key presence.
#[derive(Debug, Clone)]
pub enum CatalogPatch {
    Settings(SettingsPatch),
    Data(DataPatch),
    Viewport(ViewportTransform),
}

#[derive(Debug, Clone, Default)]
pub struct SettingsPatch {
    pub name: Option<String>,
    pub marker: MarkerPatch,
}

/// Bulk data updates, typically carrying server-side detection results.
/// These bypass the change log: the log records client-side edits that
/// still need to reach the server, not data that came from it.
#[derive(Debug, Clone)]
pub enum DataPatch {
    /// Drop every stored row and insert these instead.
    Replace(Vec<SourceRecord>),
    /// Insert new rows, skipping keys already present.
    Merge(Vec<SourceRecord>),
}

/// One point-source catalog: a schema-constrained store, an append-only
/// change log, marker display settings, and at most one selected source.
#[derive(Debug)]
pub struct Catalog {
    cid: String,
    name: String,
    settings: MarkerSettings,
    store: SourceStore,
    log: ChangeLog,
    selected: Option<String>,
    viewport: Option<ViewportTransform>,
    markers: Vec<RenderedMarker>,
    highlight: Option<RenderedMarker>,
    overrides: HashMap<String, MarkerPatch>,
    created: DateTime<Utc>,
}

impl Catalog {
    pub fn new(cid: &str, config: CatalogConfig) -> Self {
        let name = config.name.unwrap_or_else(|| cid.to_string());
        Catalog {
            cid: cid.to_string(),
            name,
            settings: config.marker,
            store: SourceStore::new(config.columns, &config.key_column),
            log: ChangeLog::new(),
            selected: None,
            viewport: None,
            markers: Vec::new(),
            highlight: None,
            overrides: HashMap::new(),
            created: Utc::now(),
        }
    }

    /// Reassemble a catalog from persisted parts.
    pub fn from_parts(
        cid: &str,
        name: &str,
        settings: MarkerSettings,
        store: SourceStore,
        log: ChangeLog,
        created: DateTime<Utc>,
    ) -> Self {
        Catalog {
            cid: cid.to_string(),
            name: name.to_string(),
            settings,
            store,
            log,
            selected: None,
            viewport: None,
            markers: Vec::new(),
            highlight: None,
            overrides: HashMap::new(),
            created,
        }
    }

    pub fn cid(&self) -> &str {
        &self.cid
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn settings(&self) -> &MarkerSettings {
        &self.settings
    }

    pub fn store(&self) -> &SourceStore {
        &self.store
    }

    pub fn change_log(&self) -> &ChangeLog {
        &self.log
    }

    pub fn selected(&self) -> Option<&str> {
        self.selected.as_deref()
    }

    pub fn viewport(&self) -> Option<&ViewportTransform> {
        self.viewport.as_ref()
    }

    pub fn markers(&self) -> &[RenderedMarker] {
        &self.markers
    }

    pub fn highlight(&self) -> Option<&RenderedMarker> {
        self.highlight.as_ref()
    }

    pub fn created(&self) -> DateTime<Utc> {
        self.created
    }

    /// Add one source: project onto the schema, assign a key, log the
    /// post-projection payload, and mark it if a viewport is attached.
    pub fn add_source(&mut self, info: SourceRecord) -> Result<String> {
        let key = self.store.add_row(info)?;
        let stored = self.store.get_row(&key)?.clone();
        self.log
            .push(ChangeAction::AddSrc, record_to_value(&stored));
        tracing::debug!(cid = %self.cid, key = %key, "added source");
        if self.viewport.is_some() {
            if let Some(marker) = self.build_marker(&key, &stored, None) {
                self.markers.push(marker);
            }
        }
        Ok(key)
    }

    /// Remove one source by key. Logs the full removed payload, drops its
    /// marker and clears the selection if it pointed at the removed record.
    /// Removing an absent key is a no-op returning 0.
    pub fn delete_source(&mut self, key: &str) -> usize {
        let removed = match self.store.get_row(key) {
            Ok(record) => record.clone(),
            Err(_) => return 0,
        };
        self.store.delete_row(key);
        self.log
            .push(ChangeAction::DeleteSrc, record_to_value(&removed));
        self.markers.retain(|m| m.key != key);
        self.overrides.remove(key);
        if self.selected.as_deref() == Some(key) {
            self.selected = None;
            self.highlight = None;
        }
        tracing::debug!(cid = %self.cid, key = %key, "deleted source");
        1
    }

    /// Selection state machine: selecting the already-selected key toggles
    /// the selection off; selecting another key moves the single highlight
    /// marker (drawn with doubled line width) to it.
    pub fn select_source(&mut self, key: &str) -> Result<()> {
        if !self.store.contains_key(key) {
            return Err(CatalogError::not_found(format!("source '{}'", key)));
        }
        if self.selected.as_deref() == Some(key) {
            self.selected = None;
            self.highlight = None;
            tracing::debug!(cid = %self.cid, key = %key, "selection toggled off");
            return Ok(());
        }
        self.highlight = None;
        self.selected = Some(key.to_string());
        if self.viewport.is_some() {
            let record = self.store.get_row(key)?.clone();
            let mut highlight = self.effective_settings(key);
            highlight.line_width *= 2.0;
            self.highlight = self.build_marker(key, &record, Some(highlight));
        }
        tracing::debug!(cid = %self.cid, key = %key, "selected source");
        Ok(())
    }

    /// Pin per-source marker settings that survive redraws.
    pub fn set_marker_override(&mut self, key: &str, patch: MarkerPatch) -> Result<()> {
        if !self.store.contains_key(key) {
            return Err(CatalogError::not_found(format!("source '{}'", key)));
        }
        self.overrides.insert(key.to_string(), patch);
        if self.viewport.is_some() {
            self.redraw();
        }
        Ok(())
    }

    /// Apply a tagged update. Marker-settings and data patches trigger a
    /// redraw only while a viewport is attached; without one the state is
    /// mutated and the visual refresh is deferred to the next attach.
    pub fn update(&mut self, patch: CatalogPatch) -> Result<()> {
        let mut needs_redraw = false;
        match patch {
            CatalogPatch::Settings(settings) => {
                if let Some(name) = settings.name {
                    self.name = name;
                }
                if !settings.marker.is_empty() {
                    settings.marker.apply_to(&mut self.settings);
                    needs_redraw = true;
                }
            }
            CatalogPatch::Data(DataPatch::Replace(rows)) => {
                let columns = self.store.columns().to_vec();
                let key_column = self.store.key_column().to_string();
                let mut store = SourceStore::new(columns, &key_column);
                for row in rows {
                    store.add_row(row)?;
                }
                if let Some(selected) = &self.selected {
                    if !store.contains_key(selected) {
                        self.selected = None;
                        self.highlight = None;
                    }
                }
                self.store = store;
                needs_redraw = true;
            }
            CatalogPatch::Data(DataPatch::Merge(rows)) => {
                for row in rows {
                    match self.store.add_row(row) {
                        Ok(_) => {}
                        Err(CatalogError::DuplicateKey { key }) => {
                            tracing::warn!(cid = %self.cid, key = %key, "merge skipped duplicate source");
                        }
                        Err(err) => return Err(err),
                    }
                }
                needs_redraw = true;
            }
            CatalogPatch::Viewport(transform) => {
                self.viewport = Some(transform);
                needs_redraw = true;
            }
        }
        if needs_redraw && self.viewport.is_some() {
            self.redraw();
        }
        Ok(())
    }

    /// Clear every rendered marker and re-render one per stored record,
    /// reapplying per-source overrides and the selection highlight.
    pub fn redraw(&mut self) {
        self.markers.clear();
        self.highlight = None;
        if self.viewport.is_none() {
            return;
        }
        let records: Vec<(String, SourceRecord)> = self
            .store
            .iter()
            .map(|(k, r)| (k.to_string(), r.clone()))
            .collect();
        for (key, record) in &records {
            if let Some(marker) = self.build_marker(key, record, None) {
                self.markers.push(marker);
            }
        }
        if let Some(selected) = self.selected.clone() {
            if let Some((_, record)) = records.iter().find(|(k, _)| *k == selected) {
                let mut highlight = self.effective_settings(&selected);
                highlight.line_width *= 2.0;
                self.highlight = self.build_marker(&selected, record, Some(highlight));
            }
        }
    }

    /// Catalog defaults merged with any per-source override.
    fn effective_settings(&self, key: &str) -> MarkerSettings {
        let mut settings = self.settings.clone();
        if let Some(patch) = self.overrides.get(key) {
            patch.apply_to(&mut settings);
        }
        settings
    }

    fn build_marker(
        &self,
        key: &str,
        record: &SourceRecord,
        settings: Option<MarkerSettings>,
    ) -> Option<RenderedMarker> {
        let transform = self.viewport.as_ref()?;
        let x = record_number(record, "x");
        let y = record_number(record, "y");
        let (x, y) = match (x, y) {
            (Some(x), Some(y)) => (x, y),
            _ => {
                tracing::debug!(cid = %self.cid, key = %key, "source has no pixel coordinates, not marked");
                return None;
            }
        };
        let settings = settings.unwrap_or_else(|| self.effective_settings(key));
        let geometry = compute_geometry(x, y, &settings, transform);
        Some(RenderedMarker {
            key: key.to_string(),
            geometry,
            settings,
        })
    }
}

fn record_to_value(record: &SourceRecord) -> Value {
    serde_json::to_value(record).unwrap_or(Value::Null)
}
