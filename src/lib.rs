pub mod blockchain;
pub mod config;
pub mod error;
pub mod handlers;
pub mod models;
pub mod security;
pub mod services;
pub mod utils;

use std::sync::Arc;

use crate::blockchain::ChainReader;
use crate::config::Settings;
use crate::models::AssetRegistry;
use crate::services::{ProtocolDataService, ReserveAggregator, TransactionBuilder};
use crate::utils::caching::{CacheStore, ReadThroughCache};
use crate::utils::monitoring::ApiMetrics;

pub use error::types::*;

/// Shared, read-only request state. The chain reader and cache store are
/// injected so tests can substitute stubs and the in-memory store.
#[derive(Clone)]
pub struct AppState {
    pub settings: Arc<Settings>,
    pub registry: Arc<AssetRegistry>,
    pub data: Arc<ProtocolDataService>,
    pub aggregator: Arc<ReserveAggregator>,
    pub transactions: Arc<TransactionBuilder>,
    pub metrics: Arc<ApiMetrics>,
}

impl AppState {
    /// Mainnet registry and a fresh metrics registry.
    pub fn new(reader: Arc<dyn ChainReader>, store: Arc<dyn CacheStore>, settings: Settings) -> Result<Self, AppError> {
        Self::from_parts(
            reader,
            store,
            settings,
            AssetRegistry::mainnet(),
            Arc::new(ApiMetrics::new()?),
        )
    }

    pub fn from_parts(
        reader: Arc<dyn ChainReader>,
        store: Arc<dyn CacheStore>,
        settings: Settings,
        registry: AssetRegistry,
        metrics: Arc<ApiMetrics>,
    ) -> Result<Self, AppError> {
        let pool = settings.blockchain.pool_address()?;
        let registry = Arc::new(registry);

        let cache = ReadThroughCache::new(store, metrics.clone());
        let data = Arc::new(ProtocolDataService::new(reader, cache, settings.cache.ttls()));
        let aggregator = Arc::new(ReserveAggregator::new(data.clone(), registry.clone()));
        let transactions = Arc::new(TransactionBuilder::new(
            pool,
            settings.blockchain.chain_id,
            registry.clone(),
        ));

        Ok(Self {
            settings: Arc::new(settings),
            registry,
            data,
            aggregator,
            transactions,
            metrics,
        })
    }
}
