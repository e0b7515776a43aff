//! Gains sync server
//!
//! Stores each user's fitness document and hands out bearer tokens.
//!
//! # Configuration
//!
//! Environment variables:
//! - `PORT`: Port to listen on (default: 3000)
//! - `DB_PATH`: SQLite database file (default: ./database/gains.db)
//! - `JWT_SECRET`: Token signing secret (a built-in development secret is used if unset)
//! - `JWT_EXPIRES_IN`: Token lifetime, e.g. `7d`, `12h`, `3600` (default: 7d)
//! - `BCRYPT_COST`: Password hashing cost (default: 10)
//! - `CORS_ORIGINS`: Comma-separated allowed origins (default: any)
//! - `RUST_LOG`: Log filter (default: gains=info,tower_http=info)

use std::net::SocketAddr;

use gains::server::{init_db, router, AppState, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gains=info,gains_server=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    if let Err(e) = run().await {
        tracing::error!("{}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = ServerConfig::from_env();

    if config.uses_fallback_secret() {
        tracing::warn!("JWT_SECRET is not set; using the built-in development secret");
    }

    tracing::info!("Database: {}", config.db_path.display());
    let pool = init_db(&config.db_path)
        .await
        .map_err(|e| format!("Failed to open database: {}", e))?;

    let state = AppState::new(pool, &config);
    let app = router(state, &config.cors_origins);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
}
