//! Statsdash server.

use std::sync::Arc;

use statsdash::{AppState, Config, MemoryStorage, SqlxStorage};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    init_logging();

    let config = Config::from_env()?;
    let http_client = reqwest::Client::new();

    let state = match std::env::var("DATABASE_URL") {
        Ok(url) => {
            let pool = sqlx::PgPool::connect(&url).await?;
            let storage = SqlxStorage::new(pool);
            storage.migrate().await?;
            tracing::info!("Connected to database");
            AppState::with_http_client(config.clone(), storage, http_client)
        }
        Err(_) => {
            tracing::warn!("DATABASE_URL not set, statistics will come from in-memory storage");
            AppState::with_http_client(config.clone(), MemoryStorage::new(), http_client)
        }
    };

    let app = statsdash::app(Arc::new(state));

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Starting server on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

fn init_logging() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "statsdash=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutting down");
}
