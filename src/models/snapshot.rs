use alloy::primitives::{Address, U256};
use serde::{Deserialize, Serialize};

use crate::utils::fixed_point::{format_units, BASE_CURRENCY_DECIMALS, BASIS_POINT_DECIMALS};

/// Point-in-time reserve state as returned by the data provider, in raw units.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReserveSnapshot {
    pub asset: Address,
    pub available_liquidity: U256,
    pub total_variable_debt: U256,
    pub total_stable_debt: U256,
    pub liquidity_rate: U256,
    pub variable_borrow_rate: U256,
    pub stable_borrow_rate: U256,
    pub liquidity_index: U256,
    pub variable_borrow_index: U256,
    pub last_update_timestamp: u64,
}

impl ReserveSnapshot {
    pub fn total_borrowed(&self) -> U256 {
        self.total_variable_debt.saturating_add(self.total_stable_debt)
    }
}

/// Account-wide position summary, normalized for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserAccountSnapshot {
    pub total_collateral: String,
    pub total_debt: String,
    pub available_borrows: String,
    /// Percentage, e.g. "82.5".
    pub liquidation_threshold: String,
    /// Percentage, e.g. "75.0".
    pub ltv: String,
    /// `None` when the account has no debt.
    pub health_factor: Option<String>,
}

impl UserAccountSnapshot {
    pub fn from_base_units(
        total_collateral: U256,
        total_debt: U256,
        available_borrows: U256,
        liquidation_threshold_bps: U256,
        ltv_bps: U256,
        health_factor: U256,
    ) -> Self {
        Self {
            total_collateral: format_units(total_collateral, BASE_CURRENCY_DECIMALS),
            total_debt: format_units(total_debt, BASE_CURRENCY_DECIMALS),
            available_borrows: format_units(available_borrows, BASE_CURRENCY_DECIMALS),
            liquidation_threshold: format_units(liquidation_threshold_bps, BASIS_POINT_DECIMALS),
            ltv: format_units(ltv_bps, BASIS_POINT_DECIMALS),
            health_factor: (health_factor != U256::MAX)
                .then(|| format_units(health_factor, BASE_CURRENCY_DECIMALS)),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceSnapshot {
    pub user_address: Address,
    pub token_address: Address,
    pub balance: U256,
    pub decimals: u8,
}

impl BalanceSnapshot {
    pub fn formatted(&self) -> String {
        format_units(self.balance, self.decimals)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_account_snapshot_normalization() {
        let snapshot = UserAccountSnapshot::from_base_units(
            U256::from(1_250_000_000_000u64),
            U256::from(500_000_000_000u64),
            U256::from(437_500_000_000u64),
            U256::from(8250u64),
            U256::from(7500u64),
            U256::from(206_250_000u64),
        );

        assert_eq!(snapshot.total_collateral, "12500.0");
        assert_eq!(snapshot.total_debt, "5000.0");
        assert_eq!(snapshot.available_borrows, "4375.0");
        assert_eq!(snapshot.liquidation_threshold, "82.5");
        assert_eq!(snapshot.ltv, "75.0");
        assert_eq!(snapshot.health_factor.as_deref(), Some("2.0625"));
    }

    #[test]
    fn test_debt_free_account_has_no_health_factor() {
        let snapshot = UserAccountSnapshot::from_base_units(
            U256::from(100u64),
            U256::ZERO,
            U256::ZERO,
            U256::ZERO,
            U256::ZERO,
            U256::MAX,
        );
        assert!(snapshot.health_factor.is_none());
    }

    #[test]
    fn test_balance_formatting() {
        let snapshot = BalanceSnapshot {
            user_address: Address::repeat_byte(0xaa),
            token_address: Address::repeat_byte(0xbb),
            balance: U256::from(1_000_000u64),
            decimals: 6,
        };
        assert_eq!(snapshot.formatted(), "1.0");
    }
}
