use crate::catalog::Catalog;
use crate::changelog::{ChangeAction, ChangeEntry, ChangeLog};
use crate::marker::MarkerSettings;
use crate::store::{SourceRecord, SourceStore};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;

/// Database access layer for saved catalogs.
///
/// Three tables: `catalog_meta` (one row per catalog), `catalog_src`
/// (ordered source records as JSON) and `catalog_log` (the append-only
/// change log).
pub struct Database<'a> {
    conn: &'a Connection,
}

/// One row of `list_catalogs` output.
#[derive(Debug, Serialize)]
pub struct CatalogSummary {
    pub cid: String,
    pub name: String,
    pub created: String,
    pub source_count: i64,
    pub log_count: i64,
}

impl<'a> Database<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        Database { conn }
    }

    pub fn init(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS catalog_meta (
                 cid        TEXT PRIMARY KEY,
                 name       TEXT NOT NULL,
                 settings   TEXT NOT NULL,
                 columns    TEXT NOT NULL,
                 key_column TEXT NOT NULL,
                 created    TEXT NOT NULL
             );
             CREATE TABLE IF NOT EXISTS catalog_src (
                 cid      TEXT NOT NULL,
                 position INTEGER NOT NULL,
                 key      TEXT NOT NULL,
                 record   TEXT NOT NULL,
                 PRIMARY KEY (cid, key)
             );
             CREATE TABLE IF NOT EXISTS catalog_log (
                 id     INTEGER PRIMARY KEY AUTOINCREMENT,
                 cid    TEXT NOT NULL,
                 action TEXT NOT NULL,
                 entry  TEXT NOT NULL,
                 at     TEXT NOT NULL
             );
             CREATE INDEX IF NOT EXISTS idx_catalog_src_cid ON catalog_src(cid);
             CREATE INDEX IF NOT EXISTS idx_catalog_log_cid ON catalog_log(cid);",
        )?;
        Ok(())
    }

    /// Persist a catalog: meta and source rows are replaced, the change
    /// log is rewritten in full (entries are immutable, so a rewrite is
    /// append-equivalent), all in one transaction.
    pub fn save_catalog(&self, catalog: &Catalog) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;

        tx.execute(
            "INSERT INTO catalog_meta (cid, name, settings, columns, key_column, created)
             VALUES (?, ?, ?, ?, ?, ?)
             ON CONFLICT(cid) DO UPDATE SET
                 name = excluded.name,
                 settings = excluded.settings,
                 columns = excluded.columns,
                 key_column = excluded.key_column",
            params![
                catalog.cid(),
                catalog.name(),
                serde_json::to_string(catalog.settings())?,
                serde_json::to_string(catalog.store().columns())?,
                catalog.store().key_column(),
                catalog.created().to_rfc3339(),
            ],
        )?;

        tx.execute("DELETE FROM catalog_src WHERE cid = ?", [catalog.cid()])?;
        for (position, (key, record)) in catalog.store().iter().enumerate() {
            tx.execute(
                "INSERT INTO catalog_src (cid, position, key, record) VALUES (?, ?, ?, ?)",
                params![
                    catalog.cid(),
                    position as i64,
                    key,
                    serde_json::to_string(record)?
                ],
            )?;
        }

        tx.execute("DELETE FROM catalog_log WHERE cid = ?", [catalog.cid()])?;
        for entry in catalog.change_log().entries() {
            tx.execute(
                "INSERT INTO catalog_log (cid, action, entry, at) VALUES (?, ?, ?, ?)",
                params![
                    catalog.cid(),
                    entry.action.as_str(),
                    serde_json::to_string(&entry.info)?,
                    entry.at.to_rfc3339(),
                ],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Load a saved catalog with its sources, settings and change log.
    pub fn load_catalog(&self, cid: &str) -> Result<Catalog> {
        let meta = self
            .conn
            .query_row(
                "SELECT name, settings, columns, key_column, created
                 FROM catalog_meta WHERE cid = ?",
                [cid],
                |row| {
                    Ok((
                        row.get::<_, String>(0)?,
                        row.get::<_, String>(1)?,
                        row.get::<_, String>(2)?,
                        row.get::<_, String>(3)?,
                        row.get::<_, String>(4)?,
                    ))
                },
            )
            .optional()?
            .with_context(|| format!("Catalog '{}' not found", cid))?;

        let (name, settings, columns, key_column, created) = meta;
        let settings: MarkerSettings =
            serde_json::from_str(&settings).context("Corrupt marker settings")?;
        let columns: Vec<String> =
            serde_json::from_str(&columns).context("Corrupt column list")?;
        let created: DateTime<Utc> = DateTime::parse_from_rfc3339(&created)
            .context("Corrupt creation timestamp")?
            .with_timezone(&Utc);

        let mut store = SourceStore::new(columns, &key_column);
        let mut stmt = self.conn.prepare(
            "SELECT record FROM catalog_src WHERE cid = ? ORDER BY position",
        )?;
        let records = stmt
            .query_map([cid], |row| row.get::<_, String>(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for record in records {
            let record: SourceRecord =
                serde_json::from_str(&record).context("Corrupt source record")?;
            store.add_row(record)?;
        }

        let mut stmt = self.conn.prepare(
            "SELECT action, entry, at FROM catalog_log WHERE cid = ? ORDER BY id",
        )?;
        let entries = stmt
            .query_map([cid], |row| {
                Ok((
                    row.get::<_, String>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let mut log_entries = Vec::with_capacity(entries.len());
        for (action, entry, at) in entries {
            let action: ChangeAction =
                serde_json::from_value(serde_json::Value::String(action))
                    .context("Corrupt log action")?;
            log_entries.push(ChangeEntry {
                action,
                info: serde_json::from_str(&entry).context("Corrupt log entry")?,
                at: DateTime::parse_from_rfc3339(&at)
                    .context("Corrupt log timestamp")?
                    .with_timezone(&Utc),
            });
        }

        Ok(Catalog::from_parts(
            cid,
            &name,
            settings,
            store,
            ChangeLog::from_entries(log_entries),
            created,
        ))
    }

    pub fn list_catalogs(&self) -> Result<Vec<CatalogSummary>> {
        let mut stmt = self.conn.prepare(
            "SELECT m.cid, m.name, m.created,
                    (SELECT COUNT(*) FROM catalog_src s WHERE s.cid = m.cid) AS source_count,
                    (SELECT COUNT(*) FROM catalog_log l WHERE l.cid = m.cid) AS log_count
             FROM catalog_meta m
             ORDER BY m.created",
        )?;

        let summaries = stmt
            .query_map([], |row| {
                Ok(CatalogSummary {
                    cid: row.get(0)?,
                    name: row.get(1)?,
                    created: row.get(2)?,
                    source_count: row.get(3)?,
                    log_count: row.get(4)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(summaries)
    }

    pub fn catalog_exists(&self, cid: &str) -> Result<bool> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM catalog_meta WHERE cid = ?",
            [cid],
            |row| row.get(0),
        )?;
        Ok(count > 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::CatalogConfig;
    use serde_json::json;

    fn record(fields: serde_json::Value) -> SourceRecord {
        serde_json::from_value(fields).unwrap()
    }

    fn sample_catalog() -> Catalog {
        let mut catalog = Catalog::new("cat-0", CatalogConfig::default());
        catalog
            .add_source(record(json!({"id": "a", "ra": 10.5, "dec": -20.25, "x": 1.0, "y": 2.0})))
            .unwrap();
        catalog
            .add_source(record(json!({"id": "b", "x": 3.0, "y": 4.0})))
            .unwrap();
        catalog.delete_source("b");
        catalog
    }

    #[test]
    fn test_save_load_round_trip() {
        let conn = Connection::open_in_memory().unwrap();
        let db = Database::new(&conn);
        db.init().unwrap();

        let catalog = sample_catalog();
        db.save_catalog(&catalog).unwrap();

        let loaded = db.load_catalog("cat-0").unwrap();
        assert_eq!(loaded.cid(), "cat-0");
        assert_eq!(loaded.name(), "cat-0");
        assert_eq!(loaded.store().len(), 1);
        assert_eq!(
            loaded.store().get_row("a").unwrap()["ra"],
            json!(10.5)
        );
        // full log survives: add, add, delete
        assert_eq!(loaded.change_log().len(), 3);
        assert_eq!(loaded.settings(), catalog.settings());
        assert_eq!(loaded.created(), catalog.created());
    }

    #[test]
    fn test_resave_replaces_rows() {
        let conn = Connection::open_in_memory().unwrap();
        let db = Database::new(&conn);
        db.init().unwrap();

        let mut catalog = sample_catalog();
        db.save_catalog(&catalog).unwrap();
        catalog
            .add_source(record(json!({"id": "c", "x": 5.0, "y": 6.0})))
            .unwrap();
        db.save_catalog(&catalog).unwrap();

        let loaded = db.load_catalog("cat-0").unwrap();
        assert_eq!(loaded.store().len(), 2);
        assert_eq!(loaded.change_log().len(), 4);
    }

    #[test]
    fn test_load_missing_catalog_fails() {
        let conn = Connection::open_in_memory().unwrap();
        let db = Database::new(&conn);
        db.init().unwrap();
        assert!(db.load_catalog("ghost").is_err());
    }

    #[test]
    fn test_list_catalogs() {
        let conn = Connection::open_in_memory().unwrap();
        let db = Database::new(&conn);
        db.init().unwrap();
        db.save_catalog(&sample_catalog()).unwrap();

        let summaries = db.list_catalogs().unwrap();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].cid, "cat-0");
        assert_eq!(summaries[0].source_count, 1);
        assert_eq!(summaries[0].log_count, 3);
        assert!(db.catalog_exists("cat-0").unwrap());
        assert!(!db.catalog_exists("cat-1").unwrap());
    }
}
