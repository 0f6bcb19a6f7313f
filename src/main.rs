use std::net::SocketAddr;
use std::sync::Arc;

use lending_dashboard::{
    blockchain::{AlloyChainReader, EthereumClient},
    config::Settings,
    handlers::create_router,
    models::AssetRegistry,
    utils::{
        caching::{CacheStore, InMemoryStore, RedisStore},
        logging::init_logging,
        monitoring::ApiMetrics,
    },
    AppError, AppState,
};
use tracing::{info, warn};

const REDIS_NAMESPACE: &str = "lending-dashboard";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    if let Err(e) = dotenvy::dotenv() {
        if !e.not_found() {
            return Err(e.into());
        }
    }

    let settings = Settings::new()?;
    init_logging(&settings.logging);
    info!("Starting lending dashboard backend");

    let metrics = Arc::new(ApiMetrics::new()?);

    let client = EthereumClient::new(&settings.blockchain.rpc_url)?;
    client.test_connection().await;
    let reader = Arc::new(AlloyChainReader::new(
        client,
        settings.blockchain.pool_address()?,
        settings.blockchain.data_provider_address()?,
        metrics.clone(),
    ));

    let store = build_store(&settings).await?;
    let addr: SocketAddr = format!("{}:{}", settings.api.host, settings.api.port).parse()?;

    let state = AppState::from_parts(reader, store, settings, AssetRegistry::mainnet(), metrics)?;
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "API server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Shutting down lending dashboard backend");
    Ok(())
}

async fn build_store(settings: &Settings) -> Result<Arc<dyn CacheStore>, AppError> {
    match settings.cache.redis_url()? {
        Some(url) => match RedisStore::connect(&url, REDIS_NAMESPACE).await {
            Ok(store) => Ok(Arc::new(store)),
            Err(e) => {
                warn!(error = %e, "Redis unavailable, falling back to in-memory cache");
                Ok(Arc::new(InMemoryStore::new(settings.cache.max_capacity)))
            }
        },
        None => Ok(Arc::new(InMemoryStore::new(settings.cache.max_capacity))),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Failed to listen for shutdown signal");
    }
}
