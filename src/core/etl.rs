use crate::core::{Pipeline, RawSource, Records};
use crate::domain::dataset::DatasetRequest;
use crate::utils::error::Result;
use std::time::Instant;

/// Drives one request through a [`Pipeline`]: extract, then transform.
pub struct EtlEngine<P: Pipeline> {
    pipeline: P,
}

impl<P: Pipeline> EtlEngine<P> {
    pub fn new(pipeline: P) -> Self {
        Self { pipeline }
    }

    pub fn pipeline(&self) -> &P {
        &self.pipeline
    }

    pub async fn run(&self, request: &DatasetRequest) -> Result<Records> {
        let started = Instant::now();
        tracing::info!("Starting {} for {}", request.dataset, request.year);

        let raw = self.pipeline.extract(request).await?;
        match &raw {
            RawSource::Html(html) => tracing::debug!("Extracted {} bytes of HTML", html.len()),
            RawSource::Csv { path, data } => {
                tracing::debug!("Extracted {} bytes from {}", data.len(), path)
            }
        }

        let records = self.pipeline.transform(request, raw).await?;
        tracing::info!(
            "📊 {} ({}): {} records in {:?}",
            request.dataset,
            request.year,
            records.len(),
            started.elapsed()
        );

        Ok(records)
    }
}
