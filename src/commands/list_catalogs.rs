use crate::db::Database;
use crate::utils::truncate_string;
use anyhow::Result;
use rusqlite::Connection;

pub fn list_catalogs(conn: &Connection, format: &str) -> Result<()> {
    let db = Database::new(conn);
    let summaries = db.list_catalogs()?;

    if format == "json" {
        println!("{}", serde_json::to_string_pretty(&summaries)?);
        return Ok(());
    }

    println!(
        "{:<20} {:<30} {:<28} {:<10} {:<10}",
        "CID", "Name", "Created", "Sources", "Changes"
    );
    println!("{:-<100}", "");

    for summary in &summaries {
        println!(
            "{:<20} {:<30} {:<28} {:<10} {:<10}",
            truncate_string(&summary.cid, 20),
            truncate_string(&summary.name, 30),
            truncate_string(&summary.created, 28),
            summary.source_count,
            summary.log_count
        );
    }

    println!("\nTotal: {} catalogs", summaries.len());
    Ok(())
}
