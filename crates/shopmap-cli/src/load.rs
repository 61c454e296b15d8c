use shopmap_core::{AppConfig, SchemaMapping};
use shopmap_ingest::{DataSource, LoadedDataset, TableClient};

/// Fetch and normalize the shop table named by `source_override`, or by
/// `SHOPMAP_DATA_SOURCE` when no override is given.
///
/// # Errors
///
/// Returns an error if the schema file is invalid, the source is not a
/// usable path or URL, the client cannot be built, or the table cannot be
/// fetched or parsed.
pub(crate) async fn load_dataset(
    config: &AppConfig,
    source_override: Option<&str>,
) -> anyhow::Result<(DataSource, LoadedDataset)> {
    let schema = SchemaMapping::resolve_active(config.schema_path.as_deref())?;
    let source = DataSource::parse(source_override.unwrap_or(&config.data_source))?;

    let client = TableClient::new(config.fetch_timeout_secs, &config.user_agent)
        .map_err(|e| anyhow::anyhow!("failed to build table client: {e}"))?;
    let loaded = client
        .load(&source, &schema)
        .await
        .map_err(|e| anyhow::anyhow!("failed to load {source}: {e}"))?;

    Ok((source, loaded))
}
