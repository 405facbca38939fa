use anyhow::Context;
use clap::Parser;
use rusqlite::Connection;
use skymark::cli::{Cli, Commands};
use skymark::commands;
use skymark::db::Database;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            ra,
            dec,
            degrees,
            precision,
            format,
        } => {
            commands::convert(ra, dec, degrees, precision, &format)?;
        }
        Commands::ListCatalogs { format } => {
            let conn = open_database(&cli.database)?;
            commands::list_catalogs(&conn, &format)?;
        }
        Commands::ShowCatalog { cid, format } => {
            let conn = open_database(&cli.database)?;
            commands::show_catalog(&conn, &cid, &format)?;
        }
        Commands::Replay {
            cid,
            log,
            create,
            dry_run,
        } => {
            let conn = open_database(&cli.database)?;
            commands::replay(&conn, &cid, &log, create, dry_run)?;
        }
        Commands::ExportLog { cid, output } => {
            let conn = open_database(&cli.database)?;
            commands::export_log(&conn, &cid, output.as_deref())?;
        }
    }

    Ok(())
}

fn open_database(path: &str) -> anyhow::Result<Connection> {
    let conn = Connection::open(path)
        .with_context(|| format!("Failed to open database: {}", path))?;
    Database::new(&conn).init()?;
    Ok(conn)
}
