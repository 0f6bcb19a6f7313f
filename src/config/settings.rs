use std::env;
use std::str::FromStr;
use std::time::Duration;

use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::error::AppError;
use crate::utils::caching::CacheTtls;

pub const MAINNET_CHAIN_ID: u64 = 1;

const DEFAULT_RPC_URL: &str = "https://eth-mainnet.g.alchemy.com/v2/demo";
/// Lending pool on Ethereum mainnet.
const DEFAULT_POOL_ADDRESS: &str = "0x7d2768dE32b0b80b7a3454c06BdAc94A69DDc7A9";
/// Protocol data provider on Ethereum mainnet.
const DEFAULT_DATA_PROVIDER_ADDRESS: &str = "0x057835Ad21a177dbdd3090bB1CAE03EaCF78Fc6d";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub api: ApiSettings,
    pub blockchain: BlockchainSettings,
    pub cache: CacheSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockchainSettings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub pool_address: String,
    pub data_provider_address: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheSettings {
    /// Redis URL; the in-memory store is used when unset.
    pub url: Option<String>,
    pub token: Option<String>,
    pub user_data_ttl_seconds: u64,
    pub reserve_data_ttl_seconds: u64,
    pub balance_ttl_seconds: u64,
    pub max_capacity: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingSettings {
    pub level: String,
    /// One of `json`, `pretty` or `compact`.
    pub format: String,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            api: ApiSettings::default(),
            blockchain: BlockchainSettings::default(),
            cache: CacheSettings::default(),
            logging: LoggingSettings::default(),
        }
    }
}

impl Default for ApiSettings {
    fn default() -> Self {
        ApiSettings {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for BlockchainSettings {
    fn default() -> Self {
        BlockchainSettings {
            rpc_url: DEFAULT_RPC_URL.to_string(),
            chain_id: MAINNET_CHAIN_ID,
            pool_address: DEFAULT_POOL_ADDRESS.to_string(),
            data_provider_address: DEFAULT_DATA_PROVIDER_ADDRESS.to_string(),
        }
    }
}

impl Default for CacheSettings {
    fn default() -> Self {
        CacheSettings {
            url: None,
            token: None,
            user_data_ttl_seconds: 30,
            reserve_data_ttl_seconds: 60,
            balance_ttl_seconds: 30,
            max_capacity: 10_000,
        }
    }
}

impl Default for LoggingSettings {
    fn default() -> Self {
        LoggingSettings {
            level: "info".to_string(),
            format: "compact".to_string(),
        }
    }
}

impl Settings {
    /// Defaults, then `config/dashboard.*`, then `APP__SECTION__KEY` variables,
    /// then the canonical variables (`RPC_URL`, `CACHE_URL`, ...).
    pub fn new() -> Result<Self, AppError> {
        let defaults = Settings::default();

        let settings: Settings = config::Config::builder()
            .set_default("api.host", defaults.api.host)?
            .set_default("api.port", i64::from(defaults.api.port))?
            .set_default("blockchain.rpc_url", defaults.blockchain.rpc_url)?
            .set_default("blockchain.chain_id", defaults.blockchain.chain_id as i64)?
            .set_default("blockchain.pool_address", defaults.blockchain.pool_address)?
            .set_default("blockchain.data_provider_address", defaults.blockchain.data_provider_address)?
            .set_default("cache.user_data_ttl_seconds", defaults.cache.user_data_ttl_seconds as i64)?
            .set_default("cache.reserve_data_ttl_seconds", defaults.cache.reserve_data_ttl_seconds as i64)?
            .set_default("cache.balance_ttl_seconds", defaults.cache.balance_ttl_seconds as i64)?
            .set_default("cache.max_capacity", defaults.cache.max_capacity as i64)?
            .set_default("logging.level", defaults.logging.level)?
            .set_default("logging.format", defaults.logging.format)?
            .add_source(config::File::with_name("config/dashboard").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .set_override_option("blockchain.rpc_url", env::var("RPC_URL").ok())?
            .set_override_option("blockchain.chain_id", env::var("CHAIN_ID").ok())?
            .set_override_option("cache.url", env::var("CACHE_URL").ok())?
            .set_override_option("cache.token", env::var("CACHE_TOKEN").ok())?
            .set_override_option("api.host", env::var("API_HOST").ok())?
            .set_override_option("api.port", env::var("API_PORT").ok())?
            .set_override_option("logging.level", env::var("LOG_LEVEL").ok())?
            .set_override_option("logging.format", env::var("LOG_FORMAT").ok())?
            .build()?
            .try_deserialize()?;

        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if self.blockchain.chain_id != MAINNET_CHAIN_ID {
            return Err(AppError::ConfigError(format!(
                "Unsupported chain id {}: only Ethereum mainnet ({}) is supported",
                self.blockchain.chain_id, MAINNET_CHAIN_ID
            )));
        }

        Url::parse(&self.blockchain.rpc_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid RPC URL: {}", e)))?;

        self.blockchain.pool_address()?;
        self.blockchain.data_provider_address()?;
        self.cache.redis_url()?;

        let ttls = [
            self.cache.user_data_ttl_seconds,
            self.cache.reserve_data_ttl_seconds,
            self.cache.balance_ttl_seconds,
        ];
        if ttls.contains(&0) {
            return Err(AppError::ConfigError("Cache TTLs must be greater than zero".to_string()));
        }

        Ok(())
    }
}

impl BlockchainSettings {
    pub fn pool_address(&self) -> Result<Address, AppError> {
        parse_config_address("blockchain.pool_address", &self.pool_address)
    }

    pub fn data_provider_address(&self) -> Result<Address, AppError> {
        parse_config_address("blockchain.data_provider_address", &self.data_provider_address)
    }
}

impl CacheSettings {
    pub fn ttls(&self) -> CacheTtls {
        CacheTtls {
            user_data: Duration::from_secs(self.user_data_ttl_seconds),
            reserve_data: Duration::from_secs(self.reserve_data_ttl_seconds),
            balances: Duration::from_secs(self.balance_ttl_seconds),
        }
    }

    /// Connection URL for the shared store with the token applied as password.
    pub fn redis_url(&self) -> Result<Option<String>, AppError> {
        let Some(raw) = self.url.as_deref() else {
            return Ok(None);
        };

        let mut url = Url::parse(raw)
            .map_err(|e| AppError::ConfigError(format!("Invalid cache URL: {}", e)))?;

        if let Some(token) = self.token.as_deref() {
            if url.username().is_empty() {
                url.set_username("default")
                    .map_err(|_| AppError::ConfigError("Cache URL cannot carry credentials".to_string()))?;
            }
            url.set_password(Some(token))
                .map_err(|_| AppError::ConfigError("Cache URL cannot carry credentials".to_string()))?;
        }

        Ok(Some(url.to_string()))
    }
}

fn parse_config_address(key: &str, value: &str) -> Result<Address, AppError> {
    Address::from_str(value)
        .map_err(|e| AppError::ConfigError(format!("Invalid {}: {}", key, e)))
}
