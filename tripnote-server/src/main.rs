use std::net::SocketAddr;

use anyhow::Context;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tripnote_server::config::{Settings, DEV_JWT_SECRET};
use tripnote_server::db::Database;
use tripnote_server::routes;
use tripnote_server::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables from .env file
    dotenv::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "tripnote_server=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let settings = Settings::new().context("Failed to load settings")?;
    if settings.auth.jwt_secret == DEV_JWT_SECRET {
        tracing::warn!("JWT_SECRET is not set, using the development secret");
    }

    let db = Database::new(&settings.database.path).context("Failed to create database")?;
    db.initialize()
        .context("Failed to initialize database schema")?;
    tracing::info!("Database initialized at {}", settings.database.path);

    let state = AppState::from_settings(db, &settings).context("Failed to build HTTP clients")?;
    if !state.yahoo.is_configured() {
        tracing::warn!("YAHOO_CLIENT_ID is not set, Yahoo search routes will fail");
    }
    let app = routes::app(state);

    let addr: SocketAddr = format!("{}:{}", settings.server.host, settings.server.port)
        .parse()
        .context("Failed to parse server address")?;
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    axum::serve(listener, app).await.context("Server error")?;

    Ok(())
}
