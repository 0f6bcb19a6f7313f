use alloy::transports::{RpcError, TransportError};
use tracing::debug;

use crate::error::AppError;

/// Protocol-rejected preconditions recognised in node error messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RevertKind {
    InsufficientFunds,
    InsufficientLiquidity,
    HealthFactor,
    Network,
    Other,
}

const REVERT_PATTERNS: &[(&str, RevertKind)] = &[
    ("insufficient balance", RevertKind::InsufficientFunds),
    ("insufficient funds", RevertKind::InsufficientFunds),
    ("insufficient liquidity", RevertKind::InsufficientLiquidity),
    ("health factor", RevertKind::HealthFactor),
    ("network", RevertKind::Network),
    ("timeout", RevertKind::Network),
    ("timed out", RevertKind::Network),
    ("connection", RevertKind::Network),
];

pub fn classify_message(message: &str) -> RevertKind {
    let lowered = message.to_lowercase();
    REVERT_PATTERNS
        .iter()
        .find(|(pattern, _)| lowered.contains(pattern))
        .map(|(_, kind)| *kind)
        .unwrap_or(RevertKind::Other)
}

/// Map a node-reported failure message onto the error taxonomy.
pub fn classify_error_message(message: &str) -> AppError {
    let kind = classify_message(message);
    debug!(?kind, message, "Classified upstream error");

    match kind {
        RevertKind::InsufficientFunds => AppError::InsufficientFunds("Insufficient funds".to_string()),
        RevertKind::InsufficientLiquidity => {
            AppError::InsufficientLiquidity("Insufficient liquidity".to_string())
        }
        RevertKind::HealthFactor => AppError::HealthFactorError("Health factor too low".to_string()),
        RevertKind::Network => AppError::NetworkError(message.to_string()),
        RevertKind::Other => AppError::ContractError(message.to_string()),
    }
}

/// Error responses from the node are contract failures; everything below the
/// JSON-RPC layer means the node could not be reached.
pub fn classify_transport_error(err: &TransportError) -> AppError {
    match err {
        RpcError::ErrorResp(payload) => classify_error_message(&payload.message),
        RpcError::Transport(kind) => AppError::NetworkError(kind.to_string()),
        RpcError::NullResp => AppError::NetworkError("Node returned an empty response".to_string()),
        other => AppError::ContractError(other.to_string()),
    }
}

impl From<alloy::contract::Error> for AppError {
    fn from(err: alloy::contract::Error) -> Self {
        match err {
            alloy::contract::Error::TransportError(transport) => classify_transport_error(&transport),
            other => AppError::ContractError(other.to_string()),
        }
    }
}

impl From<TransportError> for AppError {
    fn from(err: TransportError) -> Self {
        classify_transport_error(&err)
    }
}
