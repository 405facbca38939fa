use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "skymark")]
#[command(about = "Point-source catalog tool for astronomical images", long_about = None)]
pub struct Cli {
    /// Catalog database file
    #[arg(short, long, default_value = "catalogs.sqlite")]
    pub database: String,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Convert coordinates between decimal degrees and sexagesimal
    Convert {
        /// Right ascension in decimal degrees (formatted as hours)
        #[arg(long, requires = "dec")]
        ra: Option<f64>,

        /// Declination in decimal degrees
        #[arg(long, requires = "ra")]
        dec: Option<f64>,

        /// A single angle in decimal degrees
        #[arg(long, conflicts_with = "ra")]
        degrees: Option<f64>,

        /// Decimal places for the seconds field
        #[arg(short, long, default_value = "3")]
        precision: u32,

        /// Output format (json, plain)
        #[arg(short, long, default_value = "plain")]
        format: String,
    },

    /// List all saved catalogs
    ListCatalogs {
        /// Output format (json, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Show the sources of a saved catalog
    ShowCatalog {
        /// Catalog id
        cid: String,

        /// Output format (json, csv, table)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// Apply a change-log JSON file to a saved catalog
    Replay {
        /// Catalog id
        cid: String,

        /// Path to a JSON array of {action, info} entries
        log: String,

        /// Create the catalog if it does not exist yet
        #[arg(long)]
        create: bool,

        /// Show what would change without saving
        #[arg(long)]
        dry_run: bool,
    },

    /// Export a catalog's change log as JSON
    ExportLog {
        /// Catalog id
        cid: String,

        /// Write to a file instead of stdout
        #[arg(short, long)]
        output: Option<String>,
    },
}
