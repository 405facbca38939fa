use crate::catalog::{Catalog, CatalogConfig};
use crate::changelog::{ChangeAction, ChangeEntry};
use crate::db::Database;
use crate::error::CatalogError;
use anyhow::{Context, Result};
use rusqlite::Connection;
use serde_json::Value;

/// Apply a change-log file (a JSON array of `{action, info}` entries) to a
/// saved catalog, the way the server applies a client's pending changes.
pub fn replay(conn: &Connection, cid: &str, log_path: &str, create: bool, dry_run: bool) -> Result<()> {
    let text = std::fs::read_to_string(log_path)
        .with_context(|| format!("Failed to read change log {}", log_path))?;
    let entries: Vec<ChangeEntry> =
        serde_json::from_str(&text).context("Change log is not a JSON array of entries")?;

    let db = Database::new(conn);
    let mut catalog = if db.catalog_exists(cid)? {
        db.load_catalog(cid)?
    } else if create {
        Catalog::new(cid, CatalogConfig::default())
    } else {
        anyhow::bail!("Catalog '{}' not found (use --create to make one)", cid);
    };

    let mut added = 0usize;
    let mut deleted = 0usize;
    let mut skipped = 0usize;
    for entry in &entries {
        match entry.action {
            ChangeAction::AddSrc => {
                let record = serde_json::from_value(entry.info.clone())
                    .context("add_src entry info is not an object")?;
                match catalog.add_source(record) {
                    Ok(_) => added += 1,
                    Err(CatalogError::DuplicateKey { key }) => {
                        tracing::warn!(key = %key, "replay skipped duplicate add_src");
                        skipped += 1;
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            ChangeAction::DeleteSrc => {
                let key = entry_key(&entry.info, catalog.store().key_column());
                match key {
                    Some(key) => {
                        let removed = catalog.delete_source(&key);
                        deleted += removed;
                        skipped += 1 - removed;
                    }
                    None => {
                        tracing::warn!("delete_src entry carries no usable key, skipped");
                        skipped += 1;
                    }
                }
            }
        }
    }

    println!(
        "{}: {} added, {} deleted, {} skipped ({} entries)",
        cid,
        added,
        deleted,
        skipped,
        entries.len()
    );

    if dry_run {
        println!("Dry run, nothing saved");
    } else {
        db.init()?;
        db.save_catalog(&catalog)?;
        println!("Saved catalog '{}'", cid);
    }

    Ok(())
}

/// A delete entry's info is either the removed record or a bare key.
fn entry_key(info: &Value, key_column: &str) -> Option<String> {
    match info {
        Value::String(key) => Some(key.clone()),
        Value::Object(map) => map.get(key_column).and_then(Value::as_str).map(str::to_string),
        _ => None,
    }
}
