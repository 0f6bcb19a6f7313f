use axum::{http::StatusCode, response::{IntoResponse, Response}, Json};
use serde::Serialize;
use tracing::{error, warn};

const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred. Please try again later.";

#[derive(Debug, Clone, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    ValidationError(String),

    #[error("{0}")]
    NotFound(String),

    #[error("Network error: {0}")]
    NetworkError(String),

    #[error("Contract error: {0}")]
    ContractError(String),

    #[error("{0}")]
    InsufficientFunds(String),

    #[error("{0}")]
    InsufficientLiquidity(String),

    #[error("{0}")]
    HealthFactorError(String),

    #[error("Cache error: {0}")]
    CacheError(String),

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Internal error: {0}")]
    InternalError(String),
}

/// JSON body returned for every failed request.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<&'static str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    pub timestamp: String,
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_)
            | AppError::InsufficientFunds(_)
            | AppError::InsufficientLiquidity(_)
            | AppError::HealthFactorError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::NetworkError(_) => StatusCode::SERVICE_UNAVAILABLE,
            AppError::ContractError(_)
            | AppError::CacheError(_)
            | AppError::ConfigError(_)
            | AppError::InternalError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Machine-readable code for the protocol-level error kinds.
    pub fn code(&self) -> Option<&'static str> {
        match self {
            AppError::ValidationError(_) => Some("VALIDATION_ERROR"),
            AppError::NotFound(_) => Some("NOT_FOUND"),
            AppError::NetworkError(_) => Some("NETWORK_ERROR"),
            AppError::ContractError(_) => Some("CONTRACT_ERROR"),
            AppError::InsufficientFunds(_) => Some("INSUFFICIENT_FUNDS"),
            AppError::InsufficientLiquidity(_) => Some("INSUFFICIENT_LIQUIDITY"),
            AppError::HealthFactorError(_) => Some("HEALTH_FACTOR_ERROR"),
            AppError::CacheError(_) | AppError::ConfigError(_) | AppError::InternalError(_) => None,
        }
    }

    pub fn to_error_response(&self) -> ErrorResponse {
        let timestamp = chrono::Utc::now().to_rfc3339();

        match self {
            AppError::CacheError(_) | AppError::ConfigError(_) | AppError::InternalError(_) => {
                ErrorResponse {
                    error: GENERIC_ERROR_MESSAGE.to_string(),
                    code: None,
                    details: cfg!(debug_assertions).then(|| self.to_string()),
                    timestamp,
                }
            }
            AppError::NetworkError(_) => ErrorResponse {
                error: "Network error. Please try again.".to_string(),
                code: self.code(),
                details: cfg!(debug_assertions).then(|| self.to_string()),
                timestamp,
            },
            _ => ErrorResponse {
                error: self.to_string(),
                code: self.code(),
                details: None,
                timestamp,
            },
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();

        if status.is_server_error() {
            error!(status = status.as_u16(), error = %self, "Request failed");
        } else {
            warn!(status = status.as_u16(), code = ?self.code(), error = %self, "Request rejected");
        }

        (status, Json(self.to_error_response())).into_response()
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(err.to_string())
    }
}

impl From<serde_json::Error> for AppError {
    fn from(err: serde_json::Error) -> Self {
        AppError::InternalError(format!("JSON serialization error: {}", err))
    }
}

impl From<prometheus::Error> for AppError {
    fn from(err: prometheus::Error) -> Self {
        AppError::InternalError(format!("Prometheus metrics error: {}", err))
    }
}

impl From<redis::RedisError> for AppError {
    fn from(err: redis::RedisError) -> Self {
        AppError::CacheError(err.to_string())
    }
}
