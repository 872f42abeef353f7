use crate::core::Fetcher;
use crate::utils::error::{EtlError, Result};
use reqwest::Client;
use std::time::Duration;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// `reqwest` implementation of [`Fetcher`]: one GET, no retries.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: Client,
}

impl HttpFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self { client })
    }

    async fn get_text(&self, url: &Url) -> Result<String> {
        tracing::debug!("Making request to: {}", url);
        let response = self
            .client
            .get(url.clone())
            .send()
            .await?
            .error_for_status()?;
        tracing::debug!("Response status: {}", response.status());

        let body = response.bytes().await?;
        String::from_utf8(body.to_vec()).map_err(|e| EtlError::ProcessingError {
            message: format!("Response body is not valid UTF-8: {}", e),
        })
    }
}

impl Fetcher for HttpFetcher {
    async fn fetch(&self, url: &Url) -> Option<String> {
        match self.get_text(url).await {
            Ok(body) => Some(body),
            Err(e) => {
                tracing::error!("Failed to fetch data from {}: {}", url, e);
                None
            }
        }
    }
}
