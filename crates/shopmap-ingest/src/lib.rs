//! Ingestion of the tabular shop file from disk or over HTTP.

pub mod client;
pub mod error;
pub mod source;

use std::collections::BTreeMap;

use shopmap_core::{count_by_reason, Dataset, RowSkipped, SkipReason};

pub use client::TableClient;
pub use error::IngestError;
pub use source::DataSource;

/// A successfully normalized load.
#[derive(Debug, Clone)]
pub struct LoadedDataset {
    pub dataset: Dataset,
    pub skipped: Vec<RowSkipped>,
}

impl LoadedDataset {
    #[must_use]
    pub fn skipped_by_reason(&self) -> BTreeMap<SkipReason, usize> {
        count_by_reason(&self.skipped)
    }
}
