pub mod catalog;
pub mod changelog;
pub mod cli;
pub mod commands;
pub mod coords;
pub mod db;
pub mod error;
pub mod marker;
pub mod registry;
pub mod store;
pub mod task;
pub mod utils;

#[cfg(test)]
mod test_catalog_flow;

// Re-export commonly used items
pub use catalog::{Catalog, CatalogConfig, CatalogPatch, DataPatch, SettingsPatch};
pub use error::{CatalogError, Result};
pub use registry::CatalogRegistry;
