pub mod local;
pub mod toml_config;

#[cfg(feature = "cli")]
use crate::domain::dataset::{
    Dataset, DatasetRequest, ExportCategory, ImportCategory, ProcessingCategory,
};
#[cfg(feature = "cli")]
use crate::utils::error::Result;
#[cfg(feature = "cli")]
use crate::utils::validation::{self, Validate};
#[cfg(feature = "cli")]
use clap::{Parser, Subcommand};
#[cfg(feature = "cli")]
use toml_config::TomlConfig;

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Parser)]
#[command(name = "vitibrasil")]
#[command(about = "Viticulture statistics for Rio Grande do Sul, scraped from Embrapa VitiBrasil")]
pub struct CliConfig {
    /// Path to a TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<String>,

    /// Override source.base_url
    #[arg(long, global = true)]
    pub base_url: Option<String>,

    /// Override fallback.data_dir
    #[arg(long, global = true)]
    pub data_dir: Option<String>,

    /// Override source.timeout_seconds
    #[arg(long, global = true)]
    pub timeout_seconds: Option<u64>,

    /// Write the JSON array to this file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<String>,

    /// Pretty-print the JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    #[arg(short, long, global = true, help = "Enable verbose output")]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,

    /// Show the page URL and CSV fallback without fetching anything
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[cfg(feature = "cli")]
#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Wine, juice and derivatives production
    Production {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Wine, juice and derivatives commercialization
    Commercialization {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Grapes processed, by grape category
    Processing {
        #[arg(value_enum)]
        category: ProcessingCategory,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Imports of grape derivatives, by product
    Import {
        #[arg(value_enum)]
        category: ImportCategory,
        #[arg(long)]
        year: Option<i32>,
    },
    /// Exports of grape derivatives, by product
    Export {
        #[arg(value_enum)]
        category: ExportCategory,
        #[arg(long)]
        year: Option<i32>,
    },
    /// List every dataset with its page URL and CSV extract
    Datasets,
}

#[cfg(feature = "cli")]
impl Command {
    /// The dataset request this command stands for; `None` for `datasets`.
    /// A missing `--year` resolves to the dataset's latest published year.
    pub fn request(&self) -> Option<DatasetRequest> {
        let (dataset, year) = match *self {
            Command::Production { year } => (Dataset::Production, year),
            Command::Commercialization { year } => (Dataset::Commercialization, year),
            Command::Processing { category, year } => (Dataset::Processing(category), year),
            Command::Import { category, year } => (Dataset::Import(category), year),
            Command::Export { category, year } => (Dataset::Export(category), year),
            Command::Datasets => return None,
        };
        Some(DatasetRequest::new(
            dataset,
            year.unwrap_or_else(|| dataset.default_year()),
        ))
    }
}

#[cfg(feature = "cli")]
impl CliConfig {
    /// TOML file (if any) with command-line overrides applied on top.
    pub fn load_config(&self) -> Result<TomlConfig> {
        let mut config = match &self.config {
            Some(path) => TomlConfig::from_file(path)?,
            None => TomlConfig::default(),
        };

        if let Some(base_url) = &self.base_url {
            config.source.base_url = base_url.clone();
        }
        if let Some(data_dir) = &self.data_dir {
            config.fallback.data_dir = data_dir.clone();
        }
        if let Some(timeout) = self.timeout_seconds {
            config.source.timeout_seconds = timeout;
        }
        if self.verbose {
            config.logging.verbose = true;
        }
        if self.json_logs {
            config.logging.format = "json".to_string();
        }

        Ok(config)
    }
}

#[cfg(feature = "cli")]
impl Validate for CliConfig {
    fn validate(&self) -> Result<()> {
        if let Some(request) = self.command.request() {
            let (min, max) = request.dataset.year_range();
            validation::validate_range("year", request.year, min, max)?;
        }
        if let Some(base_url) = &self.base_url {
            validation::validate_url("base_url", base_url)?;
        }
        if let Some(timeout) = self.timeout_seconds {
            validation::validate_positive_number("timeout_seconds", timeout, 1)?;
        }
        Ok(())
    }
}
