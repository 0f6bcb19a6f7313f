use std::sync::Arc;

use alloy::primitives::{Address, U256};
use async_trait::async_trait;
use tracing::debug;

use crate::blockchain::contracts::{ILendingPool, IProtocolDataProvider, IERC20};
use crate::blockchain::ethereum_client::EthereumClient;
use crate::error::AppError;
use crate::models::{Asset, BalanceSnapshot, ReserveSnapshot, UserAccountSnapshot};
use crate::utils::monitoring::ApiMetrics;

/// Read-only view of the lending protocol. Implementations do not cache or
/// retry; a failed read is returned as-is.
#[async_trait]
pub trait ChainReader: Send + Sync {
    async fn reserve_data(&self, asset: Address) -> Result<ReserveSnapshot, AppError>;

    async fn user_account_data(&self, user: Address) -> Result<UserAccountSnapshot, AppError>;

    async fn token_balance(&self, user: Address, asset: &Asset) -> Result<BalanceSnapshot, AppError>;

    async fn token_allowance(&self, owner: Address, token: Address, spender: Address) -> Result<U256, AppError>;

    async fn block_number(&self) -> Result<u64, AppError>;
}

/// [`ChainReader`] over JSON-RPC using the generated contract bindings.
pub struct AlloyChainReader {
    client: EthereumClient,
    pool: Address,
    data_provider: Address,
    metrics: Arc<ApiMetrics>,
}

impl AlloyChainReader {
    pub fn new(client: EthereumClient, pool: Address, data_provider: Address, metrics: Arc<ApiMetrics>) -> Self {
        Self {
            client,
            pool,
            data_provider,
            metrics,
        }
    }

    fn observe<T, E>(&self, call: &str, result: Result<T, E>) -> Result<T, AppError>
    where
        AppError: From<E>,
    {
        self.metrics.record_chain_read(call, result.is_ok());
        result.map_err(|e| {
            let error = AppError::from(e);
            debug!(call, error = %error, "Chain read failed");
            error
        })
    }
}

#[async_trait]
impl ChainReader for AlloyChainReader {
    async fn reserve_data(&self, asset: Address) -> Result<ReserveSnapshot, AppError> {
        let provider = IProtocolDataProvider::new(self.data_provider, self.client.provider().clone());
        let reserve = self.observe("getReserveData", provider.getReserveData(asset).call().await)?;

        Ok(ReserveSnapshot {
            asset,
            available_liquidity: reserve.availableLiquidity,
            total_variable_debt: reserve.totalVariableDebt,
            total_stable_debt: reserve.totalStableDebt,
            liquidity_rate: reserve.liquidityRate,
            variable_borrow_rate: reserve.variableBorrowRate,
            stable_borrow_rate: reserve.stableBorrowRate,
            liquidity_index: reserve.liquidityIndex,
            variable_borrow_index: reserve.variableBorrowIndex,
            last_update_timestamp: reserve.lastUpdateTimestamp.saturating_to::<u64>(),
        })
    }

    async fn user_account_data(&self, user: Address) -> Result<UserAccountSnapshot, AppError> {
        let pool = ILendingPool::new(self.pool, self.client.provider().clone());
        let account = self.observe("getUserAccountData", pool.getUserAccountData(user).call().await)?;

        Ok(UserAccountSnapshot::from_base_units(
            account.totalCollateralETH,
            account.totalDebtETH,
            account.availableBorrowsETH,
            account.currentLiquidationThreshold,
            account.ltv,
            account.healthFactor,
        ))
    }

    async fn token_balance(&self, user: Address, asset: &Asset) -> Result<BalanceSnapshot, AppError> {
        let token = IERC20::new(asset.address, self.client.provider().clone());
        let balance = self.observe("balanceOf", token.balanceOf(user).call().await)?._0;

        Ok(BalanceSnapshot {
            user_address: user,
            token_address: asset.address,
            balance,
            decimals: asset.decimals,
        })
    }

    async fn token_allowance(&self, owner: Address, token: Address, spender: Address) -> Result<U256, AppError> {
        let erc20 = IERC20::new(token, self.client.provider().clone());
        Ok(self.observe("allowance", erc20.allowance(owner, spender).call().await)?._0)
    }

    async fn block_number(&self) -> Result<u64, AppError> {
        let result = self.client.get_block_number().await;
        self.metrics.record_chain_read("blockNumber", result.is_ok());
        result
    }
}
