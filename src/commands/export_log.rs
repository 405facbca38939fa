use crate::db::Database;
use anyhow::{Context, Result};
use rusqlite::Connection;

pub fn export_log(conn: &Connection, cid: &str, output: Option<&str>) -> Result<()> {
    let db = Database::new(conn);
    let catalog = db.load_catalog(cid)?;
    let json = serde_json::to_string_pretty(catalog.change_log().entries())?;

    match output {
        Some(path) => {
            std::fs::write(path, &json)
                .with_context(|| format!("Failed to write log to {}", path))?;
            println!(
                "Wrote {} entries to {}",
                catalog.change_log().len(),
                path
            );
        }
        None => println!("{}", json),
    }

    Ok(())
}
