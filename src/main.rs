use anyhow::Context;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

use ruso_api::config::AppConfig;
use ruso_api::database::{schema, DatabaseManager, MemoryStore, PgStore, Store};
use ruso_api::{router, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info,tower_http=debug")))
        .init();

    let config = AppConfig::from_env();
    tracing::info!("Starting Ruso API in {:?} mode", config.environment);
    if config.security.jwt_secret.is_empty() {
        anyhow::bail!("JWT_SECRET must be set outside development");
    }

    let store: Arc<dyn Store> = match config.database.url {
        Some(_) => {
            let db = DatabaseManager::connect(&config.database).await?;
            if config.database.run_migrations {
                schema::migrate(db.pool()).await?;
                schema::seed_roles(db.pool()).await?;
            }
            Arc::new(PgStore::new(&db))
        }
        None => {
            tracing::warn!("DATABASE_URL not set; using an in-memory store, data will not persist");
            Arc::new(MemoryStore::new())
        }
    };

    let port = config.api.port;
    let app = router(AppState::new(config, store));

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Ruso API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.context("server error")?;
    Ok(())
}
