use std::sync::Arc;

use vitrine_api::config::Config;
use vitrine_store::Store;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    vitrine_observability::init();

    let config = Config::from_env();
    let store = build_store(&config).await?;
    let app = vitrine_api::app::build_app(store, config.clone());

    let listener = tokio::net::TcpListener::bind(&config.address).await?;
    tracing::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("shutting down");
    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn Store>> {
    #[cfg(feature = "postgres")]
    if let Some(url) = &config.database_url {
        tracing::info!("connecting to postgres");
        let pool = sqlx::PgPool::connect(url).await?;
        let store = vitrine_store::PostgresStore::new(pool);
        store.migrate().await?;
        return Ok(Arc::new(store));
    }

    if config.database_url.is_some() {
        tracing::warn!("VITRINE_DATABASE_URL is set but the postgres feature is not compiled in");
    }
    tracing::info!("using in-memory store");
    Ok(Arc::new(vitrine_store::MemoryStore::new()))
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %err, "failed to install shutdown handler");
    }
}
