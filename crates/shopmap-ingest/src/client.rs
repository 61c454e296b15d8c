use std::time::Duration;

use reqwest::Client;
use shopmap_core::{normalize_text, SchemaMapping};

use crate::error::IngestError;
use crate::source::DataSource;
use crate::LoadedDataset;

/// Fetches the tabular shop file and hands it to the normalizer.
///
/// No automatic retry: a failed load is reported once and the caller keeps
/// whatever it rendered last.
#[derive(Debug, Clone)]
pub struct TableClient {
    client: Client,
}

impl TableClient {
    /// Creates a `TableClient` with the configured timeout and `User-Agent`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(timeout_secs: u64, user_agent: &str) -> Result<Self, IngestError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;
        Ok(Self { client })
    }

    /// Reads the raw bytes of `source`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError::Io`] for unreadable files, and
    /// [`IngestError::Http`] / [`IngestError::UnexpectedStatus`] for URLs.
    pub async fn fetch(&self, source: &DataSource) -> Result<Vec<u8>, IngestError> {
        match source {
            DataSource::Path(path) => {
                tokio::fs::read(path)
                    .await
                    .map_err(|e| IngestError::Io {
                        path: path.display().to_string(),
                        source: e,
                    })
            }
            DataSource::Url(url) => {
                let response = self.client.get(url.clone()).send().await?;
                let status = response.status();
                if !status.is_success() {
                    return Err(IngestError::UnexpectedStatus {
                        status: status.as_u16(),
                        url: url.to_string(),
                    });
                }
                Ok(response.bytes().await?.to_vec())
            }
        }
    }

    /// Fetch `source` and normalize it with `schema`.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the fetch fails or the body is not a table.
    /// Bad rows are not errors; they come back in [`LoadedDataset::skipped`].
    pub async fn load(
        &self,
        source: &DataSource,
        schema: &SchemaMapping,
    ) -> Result<LoadedDataset, IngestError> {
        tracing::info!(%source, "loading shop table");

        let body = self.fetch(source).await?;
        let report = normalize_text(&body, schema).map_err(|error| IngestError::Malformed {
            source_label: source.to_string(),
            error,
        })?;

        if !report.skipped.is_empty() {
            for (reason, count) in report.skipped_by_reason() {
                tracing::debug!(%source, %reason, count, "rows skipped");
            }
        }

        let skipped = report.skipped.clone();
        let dataset = report.into_dataset();
        tracing::info!(
            %source,
            dataset = %dataset.id(),
            records = dataset.len(),
            skipped = skipped.len(),
            "shop table loaded"
        );

        Ok(LoadedDataset { dataset, skipped })
    }
}
