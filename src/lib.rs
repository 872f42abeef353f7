pub mod config;
pub mod core;
pub mod domain;
pub mod parsers;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::CliConfig;

pub use config::local::LocalStorage;
pub use config::toml_config::TomlConfig;
pub use crate::core::{etl::EtlEngine, fetch::HttpFetcher, resolver::SourceResolver};
pub use domain::dataset::{Dataset, DatasetRequest, ExportCategory, ImportCategory, ProcessingCategory};
pub use domain::model::{BilateralRecord, ItemRecord, Metadata, Records, SubRecord};
pub use utils::error::{EtlError, Result};
