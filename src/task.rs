//! Envelopes for the remote task executor and status-checked merging of
//! its responses into the catalog registry.
//!
//! The transport itself is someone else's problem: from the model's point
//! of view a remote worker is just an external actor that eventually hands
//! us a [`TaskResponse`]. Success is never inferred from the absence of an
//! error; only an explicit `status` of `"success"` is applied.

use crate::catalog::{CatalogConfig, CatalogPatch, DataPatch};
use crate::error::{CatalogError, Result};
use crate::registry::CatalogRegistry;
use crate::store::SourceRecord;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Outbound request envelope: `{module, task, parameters}` plus a caller
/// side correlation id chosen by the transport.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskRequest {
    pub module: String,
    pub task: String,
    pub parameters: Value,
}

/// Inbound response envelope. `id` names the operation the worker ran;
/// everything besides `id` and `status` stays in `payload`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskResponse {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl TaskResponse {
    pub fn is_success(&self) -> bool {
        self.status.as_deref() == Some("success")
    }

    fn cid(&self) -> Option<&str> {
        self.payload.get("cid").and_then(Value::as_str)
    }
}

/// What became of a response once inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The response mutated a catalog.
    Merged,
    /// The response was dropped: failed status, unknown operation, missing
    /// or since-removed catalog, or a stale result already superseded.
    Ignored,
}

/// Merge one worker response into the registry through the same entry
/// points a user action would use. Responses that no longer have a target
/// are a no-op, never an error.
pub fn apply_response(registry: &mut CatalogRegistry, response: &TaskResponse) -> Result<Applied> {
    if !response.is_success() {
        tracing::warn!(
            id = %response.id,
            status = response.status.as_deref().unwrap_or("<none>"),
            "remote task did not succeed, response dropped"
        );
        return Ok(Applied::Ignored);
    }
    match response.id.as_str() {
        "create_catalog" => apply_create_catalog(registry, response),
        "add_src" => apply_add_src(registry, response),
        "delete_src" => apply_delete_src(registry, response),
        "detect_sources" => apply_detect_sources(registry, response),
        other => {
            tracing::debug!(id = %other, "unrecognized task response ignored");
            Ok(Applied::Ignored)
        }
    }
}

fn apply_create_catalog(
    registry: &mut CatalogRegistry,
    response: &TaskResponse,
) -> Result<Applied> {
    let cid = match response.cid() {
        Some(cid) => cid.to_string(),
        None => {
            tracing::warn!("create_catalog response without a cid ignored");
            return Ok(Applied::Ignored);
        }
    };
    let mut config = CatalogConfig::default();
    if let Some(name) = response.payload.get("name").and_then(Value::as_str) {
        config.name = Some(name.to_string());
    }
    if let Some(columns) = response
        .payload
        .get("dataframe")
        .and_then(|df| df.get("columns"))
        .and_then(Value::as_array)
    {
        config.columns = columns
            .iter()
            .filter_map(Value::as_str)
            .map(str::to_string)
            .collect();
    }
    match registry.create_catalog(&cid, config) {
        Ok(_) => {}
        Err(CatalogError::DuplicateId { cid }) => {
            tracing::warn!(cid = %cid, "catalog already exists, create_catalog response dropped");
            return Ok(Applied::Ignored);
        }
        Err(err) => return Err(err),
    }
    let rows = payload_records(&response.payload, "sources");
    if !rows.is_empty() {
        let catalog = registry
            .get_mut(&cid)
            .expect("catalog was just created");
        catalog.update(CatalogPatch::Data(DataPatch::Replace(rows)))?;
    }
    Ok(Applied::Merged)
}

fn apply_add_src(registry: &mut CatalogRegistry, response: &TaskResponse) -> Result<Applied> {
    let catalog = match response.cid().and_then(|cid| registry.get_mut(cid)) {
        Some(catalog) => catalog,
        None => {
            tracing::debug!(id = %response.id, "response targets no known catalog, ignored");
            return Ok(Applied::Ignored);
        }
    };
    let record = match response.payload.get("src") {
        Some(value) => match serde_json::from_value::<SourceRecord>(value.clone()) {
            Ok(record) => record,
            Err(_) => {
                tracing::warn!("add_src response carried a non-object src, ignored");
                return Ok(Applied::Ignored);
            }
        },
        None => {
            tracing::warn!("add_src response without a src payload ignored");
            return Ok(Applied::Ignored);
        }
    };
    match catalog.add_source(record) {
        Ok(_) => Ok(Applied::Merged),
        Err(CatalogError::DuplicateKey { key }) => {
            // An in-flight result for a source the user already added.
            tracing::warn!(key = %key, "stale add_src response dropped");
            Ok(Applied::Ignored)
        }
        Err(err) => Err(err),
    }
}

fn apply_delete_src(registry: &mut CatalogRegistry, response: &TaskResponse) -> Result<Applied> {
    let key = response
        .payload
        .get("key")
        .and_then(Value::as_str)
        .map(str::to_string);
    let catalog = match response.cid().and_then(|cid| registry.get_mut(cid)) {
        Some(catalog) => catalog,
        None => {
            tracing::debug!(id = %response.id, "response targets no known catalog, ignored");
            return Ok(Applied::Ignored);
        }
    };
    let key = match key {
        Some(key) => key,
        None => {
            tracing::warn!("delete_src response without a key ignored");
            return Ok(Applied::Ignored);
        }
    };
    if catalog.delete_source(&key) == 0 {
        return Ok(Applied::Ignored);
    }
    Ok(Applied::Merged)
}

fn apply_detect_sources(
    registry: &mut CatalogRegistry,
    response: &TaskResponse,
) -> Result<Applied> {
    let rows = payload_records(&response.payload, "sources");
    let catalog = match response.cid().and_then(|cid| registry.get_mut(cid)) {
        Some(catalog) => catalog,
        None => {
            tracing::debug!(id = %response.id, "response targets no known catalog, ignored");
            return Ok(Applied::Ignored);
        }
    };
    if rows.is_empty() {
        return Ok(Applied::Ignored);
    }
    catalog.update(CatalogPatch::Data(DataPatch::Merge(rows)))?;
    Ok(Applied::Merged)
}

fn payload_records(payload: &Map<String, Value>, field: &str) -> Vec<SourceRecord> {
    payload
        .get(field)
        .and_then(Value::as_array)
        .map(|rows| {
            rows.iter()
                .filter_map(|row| serde_json::from_value(row.clone()).ok())
                .collect()
        })
        .unwrap_or_default()
}
