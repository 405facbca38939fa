pub mod convert;
pub mod export_log;
pub mod list_catalogs;
pub mod replay;
pub mod show_catalog;

pub use convert::convert;
pub use export_log::export_log;
pub use list_catalogs::list_catalogs;
pub use replay::replay;
pub use show_catalog::show_catalog;
