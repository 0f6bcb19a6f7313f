use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use alloy::primitives::{Address, U256};
use serde::{de::DeserializeOwned, Serialize};
use tracing::debug;

use crate::blockchain::ChainReader;
use crate::error::AppError;
use crate::models::{Asset, BalanceSnapshot, ReserveSnapshot, UserAccountSnapshot};
use crate::utils::caching::{CacheKey, CacheStatus, CacheTtls, ReadThroughCache};

/// Every protocol read goes through here: cache lookup, chain read on miss,
/// populate. Failed reads are never cached.
pub struct ProtocolDataService {
    reader: Arc<dyn ChainReader>,
    cache: ReadThroughCache,
    ttls: CacheTtls,
}

impl ProtocolDataService {
    pub fn new(reader: Arc<dyn ChainReader>, cache: ReadThroughCache, ttls: CacheTtls) -> Self {
        Self { reader, cache, ttls }
    }

    pub async fn reserve(&self, asset: Address) -> Result<ReserveSnapshot, AppError> {
        let (snapshot, _) = self
            .read_through("reserve", CacheKey::reserve(&asset), self.ttls.reserve_data, self.reader.reserve_data(asset))
            .await?;
        Ok(snapshot)
    }

    pub async fn user_account(&self, user: Address) -> Result<(UserAccountSnapshot, CacheStatus), AppError> {
        self.read_through("user", CacheKey::user(&user), self.ttls.user_data, self.reader.user_account_data(user))
            .await
    }

    pub async fn balance(&self, user: Address, asset: &Asset) -> Result<BalanceSnapshot, AppError> {
        let (snapshot, _) = self
            .read_through(
                "balance",
                CacheKey::balance(&user, &asset.address),
                self.ttls.balances,
                self.reader.token_balance(user, asset),
            )
            .await?;
        Ok(snapshot)
    }

    pub async fn allowance(&self, owner: Address, asset: &Asset, spender: Address) -> Result<U256, AppError> {
        let (allowance, _) = self
            .read_through(
                "allowance",
                CacheKey::allowance(&owner, &asset.address),
                self.ttls.balances,
                self.reader.token_allowance(owner, asset.address, spender),
            )
            .await?;
        Ok(allowance)
    }

    /// Uncached; used for liveness reporting.
    pub async fn block_number(&self) -> Result<u64, AppError> {
        self.reader.block_number().await
    }

    pub fn cache_backend(&self) -> &'static str {
        self.cache.backend()
    }

    async fn read_through<T, F>(
        &self,
        entity: &str,
        key: String,
        ttl: Duration,
        fetch: F,
    ) -> Result<(T, CacheStatus), AppError>
    where
        T: Serialize + DeserializeOwned,
        F: Future<Output = Result<T, AppError>>,
    {
        if let Some(value) = self.cache.get::<T>(entity, &key).await {
            return Ok((value, CacheStatus::Hit));
        }

        let value = fetch.await?;
        debug!(entity, key = %key, "Fetched from chain");
        self.cache.set(&key, &value, ttl).await;
        Ok((value, CacheStatus::Miss))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use alloy::primitives::address;
    use async_trait::async_trait;

    use crate::utils::caching::InMemoryStore;
    use crate::utils::monitoring::ApiMetrics;

    const USER: Address = address!("742d35Cc6634C0532925a3b8D8b7C8b8b8b8b8b8");
    const USDC: Address = address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48");

    #[derive(Default)]
    struct CountingReader {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl ChainReader for CountingReader {
        async fn reserve_data(&self, asset: Address) -> Result<ReserveSnapshot, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(AppError::NetworkError("node down".to_string()));
            }
            Ok(ReserveSnapshot {
                asset,
                available_liquidity: U256::from(800u64),
                total_variable_debt: U256::from(200u64),
                total_stable_debt: U256::ZERO,
                liquidity_rate: U256::ZERO,
                variable_borrow_rate: U256::ZERO,
                stable_borrow_rate: U256::ZERO,
                liquidity_index: U256::ZERO,
                variable_borrow_index: U256::ZERO,
                last_update_timestamp: 1_700_000_000,
            })
        }

        async fn user_account_data(&self, _user: Address) -> Result<UserAccountSnapshot, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(UserAccountSnapshot::from_base_units(
                U256::ZERO,
                U256::ZERO,
                U256::ZERO,
                U256::ZERO,
                U256::ZERO,
                U256::MAX,
            ))
        }

        async fn token_balance(&self, user: Address, asset: &Asset) -> Result<BalanceSnapshot, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(BalanceSnapshot {
                user_address: user,
                token_address: asset.address,
                balance: U256::from(1_000_000u64),
                decimals: asset.decimals,
            })
        }

        async fn token_allowance(&self, _owner: Address, _token: Address, _spender: Address) -> Result<U256, AppError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(U256::MAX)
        }

        async fn block_number(&self) -> Result<u64, AppError> {
            Ok(19_000_000)
        }
    }

    fn service(reader: Arc<CountingReader>) -> ProtocolDataService {
        let cache = ReadThroughCache::new(
            Arc::new(InMemoryStore::default()),
            Arc::new(ApiMetrics::new().unwrap()),
        );
        ProtocolDataService::new(reader, cache, CacheTtls::default())
    }

    #[tokio::test]
    async fn test_second_read_is_served_from_cache() {
        let reader = Arc::new(CountingReader::default());
        let service = service(reader.clone());

        let first = service.reserve(USDC).await.unwrap();
        let second = service.reserve(USDC).await.unwrap();

        assert_eq!(first, second);
        assert_eq!(reader.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_user_account_reports_cache_status() {
        let service = service(Arc::new(CountingReader::default()));

        let (snapshot, status) = service.user_account(USER).await.unwrap();
        assert_eq!(status, CacheStatus::Miss);
        assert!(snapshot.health_factor.is_none());

        let (_, status) = service.user_account(USER).await.unwrap();
        assert_eq!(status, CacheStatus::Hit);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let reader = Arc::new(CountingReader {
            fail: true,
            ..Default::default()
        });
        let service = service(reader.clone());

        assert!(matches!(service.reserve(USDC).await, Err(AppError::NetworkError(_))));
        assert!(service.reserve(USDC).await.is_err());
        assert_eq!(reader.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_balance_and_allowance_use_separate_keys() {
        let reader = Arc::new(CountingReader::default());
        let service = service(reader.clone());
        let usdc = Asset::new(USDC, 6, "USDC", "USD Coin");

        let balance = service.balance(USER, &usdc).await.unwrap();
        assert_eq!(balance.formatted(), "1.0");

        let allowance = service.allowance(USER, &usdc, Address::ZERO).await.unwrap();
        assert_eq!(allowance, U256::MAX);

        service.balance(USER, &usdc).await.unwrap();
        assert_eq!(reader.calls.load(Ordering::SeqCst), 2);
    }
}
