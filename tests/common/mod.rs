#![allow(dead_code)]

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use alloy::primitives::{address, Address, U256};
use async_trait::async_trait;
use axum::Router;
use lending_dashboard::{
    blockchain::ChainReader,
    config::Settings,
    handlers::create_router,
    models::{Asset, AssetRegistry, BalanceSnapshot, ReserveSnapshot, UserAccountSnapshot},
    utils::{caching::InMemoryStore, monitoring::ApiMetrics},
    AppError, AppState,
};

pub const TEST_TOKEN: Address = address!("BBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB");
pub const SECOND_TOKEN: Address = address!("CCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC");
pub const THIRD_TOKEN: Address = address!("DDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDDD");
pub const USER: Address = address!("AAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA");

pub fn test_registry() -> AssetRegistry {
    AssetRegistry::new(vec![
        Asset::new(TEST_TOKEN, 6, "TST", "Test Token"),
        Asset::new(SECOND_TOKEN, 18, "SEC", "Second Token"),
        Asset::new(THIRD_TOKEN, 8, "THR", "Third Token"),
    ])
}

/// Canned protocol state. Reads for assets in `failing` return a network error.
pub struct StubReader {
    pub balance: U256,
    pub allowance: U256,
    pub failing: HashSet<Address>,
    pub block: Option<u64>,
    pub account_calls: AtomicUsize,
}

impl Default for StubReader {
    fn default() -> Self {
        Self {
            balance: U256::from(1_000_000u64),
            allowance: U256::from(2_500_000u64),
            failing: HashSet::new(),
            block: Some(19_000_000),
            account_calls: AtomicUsize::new(0),
        }
    }
}

impl StubReader {
    pub fn failing_for(asset: Address) -> Self {
        Self {
            failing: HashSet::from([asset]),
            ..Default::default()
        }
    }
}

#[async_trait]
impl ChainReader for StubReader {
    async fn reserve_data(&self, asset: Address) -> Result<ReserveSnapshot, AppError> {
        if self.failing.contains(&asset) {
            return Err(AppError::NetworkError("connection reset".to_string()));
        }
        Ok(ReserveSnapshot {
            asset,
            available_liquidity: U256::from(800_000_000u64),
            total_variable_debt: U256::from(200_000_000u64),
            total_stable_debt: U256::ZERO,
            liquidity_rate: U256::from(30_000_000_000_000_000_000_000_000u128),
            variable_borrow_rate: U256::from(50_000_000_000_000_000_000_000_000u128),
            stable_borrow_rate: U256::ZERO,
            liquidity_index: U256::from(10u64).pow(U256::from(27u64)),
            variable_borrow_index: U256::from(10u64).pow(U256::from(27u64)),
            last_update_timestamp: 1_700_000_000,
        })
    }

    async fn user_account_data(&self, _user: Address) -> Result<UserAccountSnapshot, AppError> {
        self.account_calls.fetch_add(1, Ordering::SeqCst);
        Ok(UserAccountSnapshot::from_base_units(
            U256::from(1_000_000_000_000u64),
            U256::ZERO,
            U256::from(750_000_000_000u64),
            U256::from(8250u64),
            U256::from(7500u64),
            U256::MAX,
        ))
    }

    async fn token_balance(&self, user: Address, asset: &Asset) -> Result<BalanceSnapshot, AppError> {
        Ok(BalanceSnapshot {
            user_address: user,
            token_address: asset.address,
            balance: self.balance,
            decimals: asset.decimals,
        })
    }

    async fn token_allowance(&self, _owner: Address, _token: Address, _spender: Address) -> Result<U256, AppError> {
        Ok(self.allowance)
    }

    async fn block_number(&self) -> Result<u64, AppError> {
        self.block
            .ok_or_else(|| AppError::NetworkError("node unreachable".to_string()))
    }
}

pub fn test_app(reader: StubReader) -> Router {
    test_app_with_reader(Arc::new(reader))
}

pub fn test_app_with_reader(reader: Arc<StubReader>) -> Router {
    let state = AppState::from_parts(
        reader,
        Arc::new(InMemoryStore::default()),
        Settings::default(),
        test_registry(),
        Arc::new(ApiMetrics::new().unwrap()),
    )
    .unwrap();
    create_router(state)
}

/// Production wiring: mainnet registry, fresh metrics.
pub fn mainnet_app(reader: StubReader) -> Router {
    let state = AppState::new(Arc::new(reader), Arc::new(InMemoryStore::default()), Settings::default()).unwrap();
    create_router(state)
}
