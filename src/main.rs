use anyhow::Context;
use tracing_subscriber::EnvFilter;

use skillmarket_api::config::AppConfig;
use skillmarket_api::database::{seed::seed_if_empty, DatabaseManager};
use skillmarket_api::routes;
use skillmarket_api::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("skillmarket_api=info,tower_http=info")),
        )
        .init();

    // Initialize configuration (this loads the config singleton)
    let mut config: AppConfig = skillmarket_api::config::config().clone();
    config.validate().context("invalid configuration")?;
    tracing::info!(
        "Starting Skill Marketplace API in {:?} mode ({:?} storage)",
        config.environment,
        config.database.backend
    );

    let store = DatabaseManager::open(&config.database)
        .await
        .context("failed to open storage")?;

    if let Some(path) = &config.files.reference_data_path {
        // A missing or malformed catalog should not keep the API down.
        if let Err(e) = seed_if_empty(store.as_ref(), path).await {
            tracing::warn!("Reference data not loaded: {}", e);
        }
    }

    let port = config.server.port;
    let app = routes::app(AppState::new(store, config));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Skill Marketplace API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
