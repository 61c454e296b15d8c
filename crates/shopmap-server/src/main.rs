mod api;
mod middleware;
mod state;

use shopmap_core::app_config::MAPS_API_KEY_VAR;
use tracing_subscriber::EnvFilter;

use crate::{api::build_app, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = shopmap_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    if config.maps_api_key.is_none() {
        tracing::warn!(
            var = MAPS_API_KEY_VAR,
            "maps API key not set; map-config will report configuration_missing"
        );
    }

    let bind_addr = config.bind_addr;
    let state = AppState::new(config)?;

    // Serve regardless; a failed first load shows up as `not_loaded`.
    if let Err(e) = state.reload().await {
        tracing::warn!(error = %e, "initial dataset load failed");
    }

    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(bind_addr).await?;
    tracing::info!(%bind_addr, "shopmap-server listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("received shutdown signal, starting graceful shutdown");
}
