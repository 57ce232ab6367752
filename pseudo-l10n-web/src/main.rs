use std::sync::Arc;
use tracing::info;

use pseudo_l10n::Pipeline;

mod config;
mod routes;

use config::ServerConfig;
use routes::{AppState, app};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let config = ServerConfig::from_env()?;
    let state = AppState {
        pipeline: Arc::new(Pipeline::default()),
    };

    info!(
        "Starting pseudo-l10n web server (max body {} bytes)",
        config.max_body
    );

    let router = app(state, config.max_body);
    let listener = tokio::net::TcpListener::bind(config.addr).await?;
    info!("Server running at http://{}", config.addr);

    axum::serve(listener, router).await?;

    Ok(())
}
