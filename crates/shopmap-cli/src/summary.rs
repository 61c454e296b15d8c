use std::fmt::Write as _;

use shopmap_core::AppConfig;
use shopmap_ingest::{DataSource, LoadedDataset};

/// Load the shop table and print record, status, province, and skip counts.
///
/// # Errors
///
/// Returns an error if the table cannot be loaded.
pub(crate) async fn run_summary(
    config: &AppConfig,
    source_override: Option<&str>,
) -> anyhow::Result<()> {
    let (source, loaded) = crate::load::load_dataset(config, source_override).await?;
    print!("{}", format_summary(&source, &loaded)?);
    Ok(())
}

pub(crate) fn format_summary(
    source: &DataSource,
    loaded: &LoadedDataset,
) -> Result<String, std::fmt::Error> {
    let summary = loaded.dataset.summary();
    let mut out = String::new();

    writeln!(out, "source:   {source}")?;
    writeln!(out, "dataset:  {}", loaded.dataset.id())?;
    writeln!(
        out,
        "records:  {} (checked-in {}, pending {})",
        summary.total, summary.checked_in, summary.pending
    )?;
    writeln!(out, "skipped:  {}", loaded.skipped.len())?;
    for (reason, count) in loaded.skipped_by_reason() {
        writeln!(out, "  {reason:<24}{count}")?;
    }

    if !summary.by_province.is_empty() {
        writeln!(out, "{:<24}SHOPS", "PROVINCE")?;
        for (province, count) in &summary.by_province {
            writeln!(out, "{province:<24}{count}")?;
        }
    }

    Ok(out)
}
