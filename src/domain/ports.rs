use crate::domain::dataset::DatasetRequest;
use crate::domain::model::{RawSource, Records};
use crate::utils::error::Result;
use async_trait::async_trait;
use std::time::Duration;

/// Reads the pre-downloaded CSV extracts.
pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;

    /// Human-readable location of `path`, for logs and errors.
    fn describe(&self, path: &str) -> String {
        path.to_string()
    }
}

/// Single-attempt page fetch. `None` means "no content": the caller falls
/// back to the CSV extract.
pub trait Fetcher: Send + Sync {
    fn fetch(&self, url: &url::Url) -> impl std::future::Future<Output = Option<String>> + Send;
}

pub trait ConfigProvider: Send + Sync {
    fn base_url(&self) -> &str;
    fn data_dir(&self) -> &str;
    fn timeout(&self) -> Duration;
}

#[async_trait]
pub trait Pipeline: Send + Sync {
    async fn extract(&self, request: &DatasetRequest) -> Result<RawSource>;
    async fn transform(&self, request: &DatasetRequest, raw: RawSource) -> Result<Records>;
}
