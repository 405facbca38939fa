use crate::db::Database;
use crate::utils::truncate_string;
use anyhow::Result;
use rusqlite::Connection;
use serde_json::Value;

pub fn show_catalog(conn: &Connection, cid: &str, format: &str) -> Result<()> {
    let db = Database::new(conn);
    let catalog = db.load_catalog(cid)?;
    let columns = catalog.store().columns().to_vec();

    match format {
        "json" => {
            let rows: Vec<&crate::store::SourceRecord> =
                catalog.store().iter().map(|(_, r)| r).collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        "csv" => {
            println!("{}", columns.join(","));
            for (_, record) in catalog.store().iter() {
                let fields: Vec<String> = columns
                    .iter()
                    .map(|c| record.get(c).map(cell_text).unwrap_or_default())
                    .collect();
                println!("{}", fields.join(","));
            }
        }
        _ => {
            for column in &columns {
                print!("{:<18} ", column);
            }
            println!();
            println!("{:-<width$}", "", width = 19 * columns.len());
            for (_, record) in catalog.store().iter() {
                for column in &columns {
                    let text = record.get(column).map(cell_text).unwrap_or_default();
                    print!("{:<18} ", truncate_string(&text, 18));
                }
                println!();
            }
            println!(
                "\n{}: {} sources, {} logged changes",
                catalog.cid(),
                catalog.store().len(),
                catalog.change_log().len()
            );
        }
    }

    Ok(())
}

fn cell_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}
