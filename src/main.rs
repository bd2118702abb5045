use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api_rest::{AppState, UploadLimits, router};
use cenad_files::{FilesService, StorageConfig};

/// Main entry point for the CENAD files server
///
/// Resolves configuration from the environment once, then serves the REST API
/// until interrupted.
///
/// # Environment Variables
/// - `CENAD_REST_ADDR`: REST server address (default: "0.0.0.0:3000")
/// - `CENAD_FILES_ROOT`: storage root (default: "cenad_files")
/// - `CENAD_TENANT_PREFIX` and the `CENAD_*_DIR` folder names
/// - `CENAD_MAX_*_BYTES`: upload limits per category
///
/// # Returns
/// * `Ok(())` - If the server starts and shuts down cleanly
/// * `Err(anyhow::Error)` - If configuration is invalid, the storage root cannot
///   be created, or the server fails
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("cenad=info".parse()?)
                .add_directive("cenad_files=info".parse()?)
                .add_directive("api_rest=info".parse()?),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let lookup = |key: &str| std::env::var(key).ok();
    let cfg = StorageConfig::from_lookup(lookup)?;
    let limits = UploadLimits::from_lookup(lookup)?;

    std::fs::create_dir_all(cfg.root()).map_err(|e| {
        anyhow::anyhow!(
            "Cannot create storage root {}: {}",
            cfg.root().display(),
            e
        )
    })?;

    let rest_addr = std::env::var("CENAD_REST_ADDR").unwrap_or_else(|_| "0.0.0.0:3000".into());

    tracing::info!("++ Storage root {}", cfg.root().display());
    tracing::info!("++ Starting CENAD files REST on {}", rest_addr);

    let app = router(AppState {
        files: FilesService::new(Arc::new(cfg)),
        limits,
    });

    let listener = tokio::net::TcpListener::bind(&rest_addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("-- CENAD files REST stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {:?}", e);
        std::future::pending::<()>().await;
    }
}
