use alloy::{
    providers::{Provider, ProviderBuilder, RootProvider},
    transports::http::{Client, Http},
};
use tracing::{info, warn};
use url::Url;

use crate::error::AppError;

/// Thin handle over the HTTP provider. Cloning shares the underlying client.
#[derive(Debug, Clone)]
pub struct EthereumClient {
    provider: RootProvider<Http<Client>>,
    rpc_url: String,
}

impl EthereumClient {
    /// Build the provider without touching the network.
    pub fn new(rpc_url: &str) -> Result<Self, AppError> {
        let url = Url::parse(rpc_url)
            .map_err(|e| AppError::ConfigError(format!("Invalid RPC URL: {}", e)))?;

        Ok(Self {
            provider: ProviderBuilder::new().on_http(url),
            rpc_url: rpc_url.to_string(),
        })
    }

    /// Probe the node once. Startup continues on failure; `/health` reports it.
    pub async fn test_connection(&self) -> bool {
        match self.provider.get_block_number().await {
            Ok(block_number) => {
                info!(rpc_url = %redacted(&self.rpc_url), block_number, "Ethereum RPC connection established");
                true
            }
            Err(e) => {
                warn!(rpc_url = %redacted(&self.rpc_url), error = %e, "Ethereum RPC unreachable");
                false
            }
        }
    }

    pub async fn get_block_number(&self) -> Result<u64, AppError> {
        Ok(self.provider.get_block_number().await?)
    }

    /// The provider used to instantiate contract bindings.
    pub fn provider(&self) -> &RootProvider<Http<Client>> {
        &self.provider
    }
}

/// Drop path and query, which commonly carry the provider API key.
fn redacted(rpc_url: &str) -> String {
    match Url::parse(rpc_url) {
        Ok(url) => format!("{}://{}", url.scheme(), url.host_str().unwrap_or("unknown")),
        Err(_) => "invalid".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_invalid_url() {
        assert!(matches!(EthereumClient::new("not a url"), Err(AppError::ConfigError(_))));
    }

    #[test]
    fn test_redacts_api_key() {
        assert_eq!(
            redacted("https://eth-mainnet.g.alchemy.com/v2/secret-key"),
            "https://eth-mainnet.g.alchemy.com"
        );
    }
}
