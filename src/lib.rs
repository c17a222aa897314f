pub mod adapters;
pub mod app;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use adapters::csv_import::CsvImporter;
pub use adapters::http::{AuditedClient, ClientSettings};
pub use adapters::sqlite::Store;
pub use adapters::storage::LocalStorage;
pub use app::pipelines::SetPipeline;
pub use config::toml_config::TomlConfig;
pub use crate::core::etl::EtlEngine;
pub use utils::error::{EtlError, Result};
