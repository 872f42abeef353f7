use crate::core::fetch::HttpFetcher;
use crate::core::{ConfigProvider, Fetcher, Pipeline, RawSource, Records, Storage};
use crate::domain::dataset::{
    Dataset, DatasetRequest, ExportCategory, ImportCategory, ProcessingCategory, RecordForm,
};
use crate::domain::model::{BilateralRecord, ItemRecord};
use crate::parsers::{parse_bilateral_csv, parse_bilateral_table, parse_item_csv, parse_item_table};
use crate::utils::error::{EtlError, Result};
use crate::utils::validation::validate_url;
use crate::LocalStorage;
use url::Url;

/// Scrape-first, CSV-fallback source for every VitiBrasil dataset.
///
/// Each request makes exactly one fetch. Page content goes to the HTML
/// parser of the dataset's form; no content sends the request to the local
/// CSV extract instead. The two paths are never mixed.
pub struct SourceResolver<F: Fetcher, S: Storage> {
    fetcher: F,
    storage: S,
    base_url: Url,
}

impl<F: Fetcher, S: Storage> SourceResolver<F, S> {
    pub fn new(fetcher: F, storage: S, base_url: Url) -> Self {
        Self {
            fetcher,
            storage,
            base_url,
        }
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn storage(&self) -> &S {
        &self.storage
    }

    pub async fn production_data(&self, year: i32) -> Result<Vec<ItemRecord>> {
        self.item_records(&DatasetRequest::new(Dataset::Production, year))
            .await
    }

    pub async fn commercialization_data(&self, year: i32) -> Result<Vec<ItemRecord>> {
        self.item_records(&DatasetRequest::new(Dataset::Commercialization, year))
            .await
    }

    pub async fn processing_data(
        &self,
        year: i32,
        category: ProcessingCategory,
    ) -> Result<Vec<ItemRecord>> {
        self.item_records(&DatasetRequest::new(Dataset::Processing(category), year))
            .await
    }

    pub async fn import_data(
        &self,
        year: i32,
        category: ImportCategory,
    ) -> Result<Vec<BilateralRecord>> {
        self.bilateral_records(&DatasetRequest::new(Dataset::Import(category), year))
            .await
    }

    pub async fn export_data(
        &self,
        year: i32,
        category: ExportCategory,
    ) -> Result<Vec<BilateralRecord>> {
        self.bilateral_records(&DatasetRequest::new(Dataset::Export(category), year))
            .await
    }

    async fn item_records(&self, request: &DatasetRequest) -> Result<Vec<ItemRecord>> {
        let raw = self.extract(request).await?;
        parse_items(request, raw)
    }

    async fn bilateral_records(&self, request: &DatasetRequest) -> Result<Vec<BilateralRecord>> {
        let raw = self.extract(request).await?;
        parse_bilaterals(request, raw)
    }

    async fn read_fallback(&self, request: &DatasetRequest) -> Result<RawSource> {
        let path = request.dataset.csv_file();
        tracing::warn!(
            "📝 No content for {} ({}), falling back to {}",
            request.dataset,
            request.year,
            self.storage.describe(&path)
        );

        let data = self
            .storage
            .read_file(&path)
            .await
            .map_err(|e| match e {
                EtlError::IoError(source) => EtlError::FallbackFileError {
                    path: self.storage.describe(&path),
                    source,
                },
                other => other,
            })?;

        Ok(RawSource::Csv { path, data })
    }
}

impl SourceResolver<HttpFetcher, LocalStorage> {
    /// Builds the production wiring: `reqwest` fetcher plus CSV extracts
    /// under the configured data dir.
    pub fn from_config<C: ConfigProvider>(config: &C) -> Result<Self> {
        let base_url = validate_url("source.base_url", config.base_url())?;
        let fetcher = HttpFetcher::new(config.timeout())?;
        let storage = LocalStorage::new(config.data_dir().to_string());
        Ok(Self::new(fetcher, storage, base_url))
    }
}

fn item_key_column(dataset: Dataset) -> Result<&'static str> {
    match dataset.form() {
        RecordForm::Item { key_column } => Ok(key_column),
        RecordForm::Bilateral => Err(EtlError::ProcessingError {
            message: format!("{} is not an item dataset", dataset),
        }),
    }
}

fn parse_items(request: &DatasetRequest, raw: RawSource) -> Result<Vec<ItemRecord>> {
    let dataset = request.dataset;
    let metadata = dataset.metadata();
    match raw {
        RawSource::Html(html) => parse_item_table(&html, request.year, &metadata),
        RawSource::Csv { data, .. } => parse_item_csv(
            &data,
            request.year,
            item_key_column(dataset)?,
            dataset.csv_delimiter(),
            &metadata,
        ),
    }
}

fn parse_bilaterals(request: &DatasetRequest, raw: RawSource) -> Result<Vec<BilateralRecord>> {
    let dataset = request.dataset;
    let metadata = dataset.metadata();
    match raw {
        RawSource::Html(html) => parse_bilateral_table(&html, request.year, &metadata),
        RawSource::Csv { data, .. } => {
            parse_bilateral_csv(&data, request.year, dataset.csv_delimiter(), &metadata)
        }
    }
}

#[async_trait::async_trait]
impl<F: Fetcher, S: Storage> Pipeline for SourceResolver<F, S> {
    async fn extract(&self, request: &DatasetRequest) -> Result<RawSource> {
        let url = request.dataset.url(&self.base_url, request.year);
        tracing::info!("🚀 Fetching {} ({}) from: {}", request.dataset, request.year, url);

        match self.fetcher.fetch(&url).await {
            Some(html) if !html.is_empty() => Ok(RawSource::Html(html)),
            _ => self.read_fallback(request).await,
        }
    }

    async fn transform(&self, request: &DatasetRequest, raw: RawSource) -> Result<Records> {
        match request.dataset.form() {
            RecordForm::Item { .. } => parse_items(request, raw).map(Records::Item),
            RecordForm::Bilateral => parse_bilaterals(request, raw).map(Records::Bilateral),
        }
    }
}
