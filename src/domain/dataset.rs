//! Dataset descriptors for the Embrapa VitiBrasil website.
//!
//! Every logical dataset maps to a page on the website (selected through the
//! `opcao` / `subopcao` query parameters) and to a CSV extract downloaded from
//! the same site, used when the page cannot be fetched.

use crate::domain::model::Metadata;
use serde::Serialize;
use std::fmt;
use url::Url;

pub const DEFAULT_BASE_URL: &str = "http://vitibrasil.cnpuv.embrapa.br/index.php";
pub const MIN_YEAR: i32 = 1970;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ProcessingCategory {
    Viniferas,
    AmericanasEHibridas,
    UvaDeMesa,
    SemClassificacao,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ImportCategory {
    VinhosDeMesa,
    Espumantes,
    UvasFrescas,
    UvasPassas,
    SucoDeUva,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
pub enum ExportCategory {
    VinhosDeMesa,
    Espumantes,
    UvasFrescas,
    SucoDeUva,
}

impl ProcessingCategory {
    pub const ALL: [ProcessingCategory; 4] = [
        ProcessingCategory::Viniferas,
        ProcessingCategory::AmericanasEHibridas,
        ProcessingCategory::UvaDeMesa,
        ProcessingCategory::SemClassificacao,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ProcessingCategory::Viniferas => "viniferas",
            ProcessingCategory::AmericanasEHibridas => "americanas-e-hibridas",
            ProcessingCategory::UvaDeMesa => "uva-de-mesa",
            ProcessingCategory::SemClassificacao => "sem-classificacao",
        }
    }

    fn subopcao(self) -> &'static str {
        match self {
            ProcessingCategory::Viniferas => "subopt_01",
            ProcessingCategory::AmericanasEHibridas => "subopt_02",
            ProcessingCategory::UvaDeMesa => "subopt_03",
            ProcessingCategory::SemClassificacao => "subopt_04",
        }
    }
}

impl ImportCategory {
    pub const ALL: [ImportCategory; 5] = [
        ImportCategory::VinhosDeMesa,
        ImportCategory::Espumantes,
        ImportCategory::UvasFrescas,
        ImportCategory::UvasPassas,
        ImportCategory::SucoDeUva,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ImportCategory::VinhosDeMesa => "vinhos-de-mesa",
            ImportCategory::Espumantes => "espumantes",
            ImportCategory::UvasFrescas => "uvas-frescas",
            ImportCategory::UvasPassas => "uvas-passas",
            ImportCategory::SucoDeUva => "suco-de-uva",
        }
    }

    fn subopcao(self) -> &'static str {
        match self {
            ImportCategory::VinhosDeMesa => "subopt_01",
            ImportCategory::Espumantes => "subopt_02",
            ImportCategory::UvasFrescas => "subopt_03",
            ImportCategory::UvasPassas => "subopt_04",
            ImportCategory::SucoDeUva => "subopt_05",
        }
    }
}

impl ExportCategory {
    pub const ALL: [ExportCategory; 4] = [
        ExportCategory::VinhosDeMesa,
        ExportCategory::Espumantes,
        ExportCategory::UvasFrescas,
        ExportCategory::SucoDeUva,
    ];

    pub fn slug(self) -> &'static str {
        match self {
            ExportCategory::VinhosDeMesa => "vinhos-de-mesa",
            ExportCategory::Espumantes => "espumantes",
            ExportCategory::UvasFrescas => "uvas-frescas",
            ExportCategory::SucoDeUva => "suco-de-uva",
        }
    }

    fn subopcao(self) -> &'static str {
        match self {
            ExportCategory::VinhosDeMesa => "subopt_01",
            ExportCategory::Espumantes => "subopt_02",
            ExportCategory::UvasFrescas => "subopt_03",
            ExportCategory::SucoDeUva => "subopt_04",
        }
    }
}

/// Shape of the records a dataset produces.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordForm {
    /// Item / sub-item table; the CSV extract names items in `key_column`.
    Item { key_column: &'static str },
    /// Per-country quantity and amount.
    Bilateral,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Dataset {
    Production,
    Commercialization,
    Processing(ProcessingCategory),
    Import(ImportCategory),
    Export(ExportCategory),
}

impl Dataset {
    /// Every dataset the website publishes, in menu order.
    pub fn all() -> Vec<Dataset> {
        let mut datasets = vec![Dataset::Production, Dataset::Commercialization];
        datasets.extend(ProcessingCategory::ALL.into_iter().map(Dataset::Processing));
        datasets.extend(ImportCategory::ALL.into_iter().map(Dataset::Import));
        datasets.extend(ExportCategory::ALL.into_iter().map(Dataset::Export));
        datasets
    }

    pub fn name(&self) -> &'static str {
        match self {
            Dataset::Production => "production",
            Dataset::Commercialization => "commercialization",
            Dataset::Processing(_) => "processing",
            Dataset::Import(_) => "import",
            Dataset::Export(_) => "export",
        }
    }

    pub fn category(&self) -> Option<&'static str> {
        match self {
            Dataset::Production | Dataset::Commercialization => None,
            Dataset::Processing(c) => Some(c.slug()),
            Dataset::Import(c) => Some(c.slug()),
            Dataset::Export(c) => Some(c.slug()),
        }
    }

    fn opcao(&self) -> &'static str {
        match self {
            Dataset::Production => "opt_02",
            Dataset::Commercialization => "opt_04",
            Dataset::Processing(_) => "opt_03",
            Dataset::Import(_) => "opt_05",
            Dataset::Export(_) => "opt_06",
        }
    }

    fn subopcao(&self) -> Option<&'static str> {
        match self {
            Dataset::Production | Dataset::Commercialization => None,
            Dataset::Processing(c) => Some(c.subopcao()),
            Dataset::Import(c) => Some(c.subopcao()),
            Dataset::Export(c) => Some(c.subopcao()),
        }
    }

    /// Page URL for `year`, built on top of `base_url`.
    pub fn url(&self, base_url: &Url, year: i32) -> Url {
        let mut url = base_url.clone();
        {
            let mut query = url.query_pairs_mut();
            if let Some(subopcao) = self.subopcao() {
                query.append_pair("subopcao", subopcao);
            }
            query.append_pair("opcao", self.opcao());
            query.append_pair("ano", &year.to_string());
        }
        url
    }

    /// File name of the CSV extract, relative to the fallback data dir.
    pub fn csv_file(&self) -> String {
        match self {
            Dataset::Production => "producao.csv".to_string(),
            Dataset::Commercialization => "comercializacao.csv".to_string(),
            Dataset::Processing(c) => format!("processamento-{}.csv", c.slug()),
            Dataset::Import(c) => format!("importacao-{}.csv", c.slug()),
            Dataset::Export(c) => format!("exportacao-{}.csv", c.slug()),
        }
    }

    pub fn csv_delimiter(&self) -> u8 {
        match self {
            Dataset::Production | Dataset::Commercialization => b';',
            Dataset::Processing(ProcessingCategory::Viniferas) => b';',
            Dataset::Processing(_) => b'\t',
            Dataset::Import(ImportCategory::SucoDeUva) => b';',
            Dataset::Import(_) => b'\t',
            Dataset::Export(_) => b'\t',
        }
    }

    pub fn form(&self) -> RecordForm {
        match self {
            Dataset::Production => RecordForm::Item {
                key_column: "produto",
            },
            Dataset::Commercialization => RecordForm::Item {
                key_column: "Produto",
            },
            Dataset::Processing(_) => RecordForm::Item {
                key_column: "cultivar",
            },
            Dataset::Import(_) | Dataset::Export(_) => RecordForm::Bilateral,
        }
    }

    /// Overlay applied to every record: the category, when there is one.
    pub fn metadata(&self) -> Metadata {
        match self.category() {
            Some(category) => Metadata::new().with("category", category),
            None => Metadata::new(),
        }
    }

    /// Inclusive range of years the website publishes for this dataset.
    pub fn year_range(&self) -> (i32, i32) {
        match self {
            Dataset::Import(_) | Dataset::Export(_) => (MIN_YEAR, 2024),
            _ => (MIN_YEAR, 2023),
        }
    }

    pub fn default_year(&self) -> i32 {
        self.year_range().1
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.category() {
            Some(category) => write!(f, "{}/{}", self.name(), category),
            None => f.write_str(self.name()),
        }
    }
}

/// One logical request: which dataset, for which year.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DatasetRequest {
    pub dataset: Dataset,
    pub year: i32,
}

impl DatasetRequest {
    pub fn new(dataset: Dataset, year: i32) -> Self {
        Self { dataset, year }
    }
}
