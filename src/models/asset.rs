use std::collections::HashMap;

use alloy::primitives::{address, Address};
use serde::{Deserialize, Serialize};

use crate::error::AppError;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Asset {
    pub address: Address,
    pub decimals: u8,
    pub symbol: String,
    pub name: String,
}

impl Asset {
    pub fn new(address: Address, decimals: u8, symbol: &str, name: &str) -> Self {
        Self {
            address,
            decimals,
            symbol: symbol.to_string(),
            name: name.to_string(),
        }
    }
}

/// Immutable set of supported reserves, built once at startup.
#[derive(Debug, Clone)]
pub struct AssetRegistry {
    assets: Vec<Asset>,
    index: HashMap<Address, usize>,
}

impl AssetRegistry {
    pub fn new(assets: Vec<Asset>) -> Self {
        let index = assets
            .iter()
            .enumerate()
            .map(|(position, asset)| (asset.address, position))
            .collect();

        Self { assets, index }
    }

    /// Ethereum mainnet reserves shown on the dashboard.
    pub fn mainnet() -> Self {
        Self::new(vec![
            Asset::new(address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"), 6, "USDC", "USD Coin"),
            Asset::new(address!("dAC17F958D2ee523a2206206994597C13D831ec7"), 6, "USDT", "Tether USD"),
            Asset::new(address!("6B175474E89094C44Da98b954EedeAC495271d0F"), 18, "DAI", "Dai Stablecoin"),
            Asset::new(address!("C02aaA39b223FE8D0A0e5C4F27eAD9083C756Cc2"), 18, "WETH", "Wrapped Ether"),
            Asset::new(address!("2260FAC5E5542a773Aa44fBCfeDf7C193bc2C599"), 8, "WBTC", "Wrapped Bitcoin"),
        ])
    }

    pub fn get(&self, address: &Address) -> Option<&Asset> {
        self.index.get(address).map(|&position| &self.assets[position])
    }

    /// Look up a token, rejecting anything outside the registry.
    pub fn require(&self, address: &Address) -> Result<&Asset, AppError> {
        self.get(address).ok_or_else(|| {
            AppError::ValidationError(format!("Unsupported token address: {}", address))
        })
    }

    pub fn assets(&self) -> &[Asset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mainnet_registry() {
        let registry = AssetRegistry::mainnet();
        assert_eq!(registry.len(), 5);

        let usdc = registry
            .get(&address!("A0b86991c6218b36c1d19D4a2e9Eb0cE3606eB48"))
            .expect("USDC is registered");
        assert_eq!(usdc.symbol, "USDC");
        assert_eq!(usdc.decimals, 6);
    }

    #[test]
    fn test_require_rejects_unknown_token() {
        let registry = AssetRegistry::mainnet();
        let result = registry.require(&Address::repeat_byte(0x11));
        assert!(matches!(result, Err(AppError::ValidationError(_))));
    }
}
