//! crewsmith HTTP server binary.
//!
//! # Environment Variables
//!
//! - `GEMINI_API_KEY`: Gemini key for synthesis, execution and embeddings
//! - `CREW_STORE_URI`: Prompt store: `sqlite://<path>` (default), `memory://` or `postgres://...`
//! - `CREWS_DIR`: Root of crew directories (default: `data/crews`)
//! - `PORT`: HTTP port (default: 8000)
//! - `SIMILARITY_THRESHOLD`: Reuse threshold in `[0, 1]` (default: 0.9)
//! - `RUST_LOG`: Tracing filter (default: "info,crewsmith=debug")
//!
//! A `.env` file in the working directory is loaded first.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin server
//! # or with postgres:
//! cargo run --bin server --features postgres
//! ```

use anyhow::Context;
use crewsmith::server::{app_router, AppState};
use crewsmith::utilities::config::ServiceConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,crewsmith=debug".into()),
        )
        .init();

    let config = ServiceConfig::from_env().context("invalid configuration")?;
    tracing::info!("Configuration: {:?}", config);

    let state = AppState::from_config(&config)
        .await
        .context("failed to initialize crew service")?;
    let app = app_router(state);

    let bind_addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("crewsmith server starting on {}", bind_addr);
    tracing::info!("Endpoints:");
    tracing::info!("  GET    /health          : liveness probe");
    tracing::info!("  POST   /generate_agents : prompt → crew → answer");
    tracing::info!("  GET    /agents/{{id}}     : crew agent YAML");
    tracing::info!("  DELETE /agents/{{id}}     : delete a crew");

    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("server failed")?;

    tracing::info!("crewsmith server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
