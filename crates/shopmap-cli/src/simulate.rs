//! Headless replay of zoom events through a `MapSession`.
//!
//! Uses the same session, layer manager and styling as a real host, with an
//! `InMemoryHost` standing in for the map surface.

use std::convert::Infallible;

use shopmap_core::AppConfig;
use shopmap_viz::{HostSnapshot, InMemoryHost, MapSession, SessionConfig, SessionStatus};

/// Load the table, then apply `zooms` in order and print the resulting mode
/// and layer counts after each step.
///
/// # Errors
///
/// Returns an error if the maps API key is not configured, the table cannot
/// be loaded, or the session stops unexpectedly.
pub(crate) async fn run_simulate(
    config: &AppConfig,
    source_override: Option<&str>,
    zooms: &[f64],
) -> anyhow::Result<()> {
    config.require_maps_api_key()?;
    let (_, loaded) = crate::load::load_dataset(config, source_override).await?;

    let host = InMemoryHost::ready();
    let (session, handle) = MapSession::new(host.clone(), SessionConfig::from_app_config(config));
    let task = tokio::spawn(session.run());

    let dataset = loaded.dataset;
    handle
        .begin_load(async move { Ok::<_, Infallible>(dataset) })?
        .await?;

    let status = handle.status().await?;
    println!("{}", format_step("start", &status, &host.snapshot()));

    for zoom in zooms {
        handle.zoom_changed(*zoom)?;
        let status = handle.status().await?;
        println!("{}", format_step("zoom", &status, &host.snapshot()));
    }

    handle.shutdown()?;
    let host = task.await?;
    let snap = host.snapshot();
    tracing::debug!(
        live_markers = snap.live_markers,
        live_heatmaps = snap.live_heatmaps,
        "session disposed"
    );

    Ok(())
}

pub(crate) fn format_step(label: &str, status: &SessionStatus, snap: &HostSnapshot) -> String {
    format!(
        "{label:<6}{:>5.1}  {:<10}{}  markers {}/{} visible  heatmap {}/{} visible",
        status.zoom,
        status.mode.to_string(),
        status.mode_label,
        snap.attached_markers,
        snap.live_markers,
        snap.attached_heatmaps,
        snap.live_heatmaps,
    )
}
