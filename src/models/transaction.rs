use alloy::primitives::{Address, Bytes, U256};
use serde::{Deserialize, Serialize};

/// Call payload handed to the wallet; never signed or submitted here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UnsignedTransaction {
    pub from: Address,
    pub to: Address,
    pub data: Bytes,
    pub value: U256,
    pub chain_id: u64,
}

impl UnsignedTransaction {
    pub fn data_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.data))
    }
}

/// Body accepted by every `POST /transactions/{action}` route.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareTransactionRequest {
    pub user_address: Option<String>,
    pub token_address: Option<String>,
    pub amount: Option<String>,
    pub interest_rate_mode: Option<u64>,
    pub callback_address: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PrepareTransactionResponse {
    pub success: bool,
    /// Always empty: the hash only exists once the wallet submits.
    pub transaction_hash: String,
    pub from: Address,
    pub to: Address,
    pub data: String,
    pub value: String,
    pub chain_id: u64,
    pub message: String,
}

impl PrepareTransactionResponse {
    pub fn prepared(transaction: &UnsignedTransaction, message: impl Into<String>) -> Self {
        Self {
            success: true,
            transaction_hash: String::new(),
            from: transaction.from,
            to: transaction.to,
            data: transaction.data_hex(),
            value: transaction.value.to_string(),
            chain_id: transaction.chain_id,
            message: message.into(),
        }
    }
}
