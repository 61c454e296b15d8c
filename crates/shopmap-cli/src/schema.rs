use shopmap_core::{AppConfig, SchemaMapping};

/// Print the active schema mapping (built-in or `SHOPMAP_SCHEMA_PATH`) as YAML.
///
/// # Errors
///
/// Returns an error if the configured schema file is unreadable or invalid.
pub(crate) fn run_schema(config: &AppConfig) -> anyhow::Result<()> {
    let schema = SchemaMapping::resolve_active(config.schema_path.as_deref())?;
    print!("{}", serde_yaml::to_string(&schema)?);
    Ok(())
}
