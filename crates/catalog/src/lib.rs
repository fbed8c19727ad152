pub mod cache;
pub mod config;
pub mod source;

pub use cache::StrategyCatalog;
pub use config::{CatalogConfig, CategoryConfig};
pub use source::{CatalogRow, CatalogSource, HttpCatalogSource};
