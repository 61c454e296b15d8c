//! Shared server state: configuration, the ingest client, and the last good
//! dataset.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use shopmap_core::{AppConfig, SchemaMapping};
use shopmap_ingest::{DataSource, IngestError, LoadedDataset, TableClient};
use tokio::sync::{Mutex, RwLock};

/// A successful load and when it happened.
#[derive(Debug)]
pub struct LoadedSnapshot {
    pub loaded: LoadedDataset,
    pub loaded_at: DateTime<Utc>,
}

#[derive(Debug)]
pub struct ReloadOutcome {
    pub snapshot: Arc<LoadedSnapshot>,
    /// `false` when the new table had the same identity as the previous one.
    pub changed: bool,
}

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<AppConfig>,
    schema: Arc<SchemaMapping>,
    source: Arc<DataSource>,
    client: TableClient,
    current: Arc<RwLock<Option<Arc<LoadedSnapshot>>>>,
    reloading: Arc<Mutex<()>>,
}

impl AppState {
    /// Resolve the schema and build the ingest client. Does not load.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured schema file is invalid, the data
    /// source is a malformed URL, or the HTTP client cannot be built.
    pub fn new(config: AppConfig) -> anyhow::Result<Self> {
        let schema = SchemaMapping::resolve_active(config.schema_path.as_deref())?;
        let source = DataSource::parse(&config.data_source)?;
        let client = TableClient::new(config.fetch_timeout_secs, &config.user_agent)
            .map_err(|e| anyhow::anyhow!("failed to build table client: {e}"))?;

        Ok(Self {
            config: Arc::new(config),
            schema: Arc::new(schema),
            source: Arc::new(source),
            client,
            current: Arc::new(RwLock::new(None)),
            reloading: Arc::new(Mutex::new(())),
        })
    }

    pub async fn current(&self) -> Option<Arc<LoadedSnapshot>> {
        self.current.read().await.clone()
    }

    /// Fetch and normalize the data source, replacing the current dataset on
    /// success. On failure the previous dataset is left in place.
    ///
    /// Reloads are serialized; the one that finishes last wins.
    ///
    /// # Errors
    ///
    /// Returns [`IngestError`] if the source cannot be fetched or parsed.
    pub async fn reload(&self) -> Result<ReloadOutcome, IngestError> {
        let _reloading = self.reloading.lock().await;

        let loaded = match self.client.load(&self.source, &self.schema).await {
            Ok(loaded) => loaded,
            Err(e) => {
                tracing::warn!(
                    source = %self.source,
                    error = %e,
                    "reload failed; keeping last good dataset"
                );
                return Err(e);
            }
        };

        let mut current = self.current.write().await;
        let changed = current
            .as_ref()
            .is_none_or(|prev| prev.loaded.dataset.id() != loaded.dataset.id());
        let snapshot = Arc::new(LoadedSnapshot {
            loaded,
            loaded_at: Utc::now(),
        });
        *current = Some(Arc::clone(&snapshot));

        tracing::info!(
            dataset = %snapshot.loaded.dataset.id(),
            records = snapshot.loaded.dataset.len(),
            changed,
            "dataset reloaded"
        );

        Ok(ReloadOutcome { snapshot, changed })
    }
}
