use axum::{extract::State, http::StatusCode, response::Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::AppState;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub timestamp: DateTime<Utc>,
    pub version: String,
    pub chain_id: u64,
    pub latest_block: Option<u64>,
    pub cache_backend: String,
}

/// Reports `degraded` with 503 when the node cannot be reached.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let latest_block = match state.data.block_number().await {
        Ok(block) => Some(block),
        Err(e) => {
            warn!(error = %e, "Health check could not reach the node");
            None
        }
    };

    let (status_code, status) = if latest_block.is_some() {
        (StatusCode::OK, "healthy")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "degraded")
    };

    let response = HealthResponse {
        status: status.to_string(),
        timestamp: Utc::now(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        chain_id: state.settings.blockchain.chain_id,
        latest_block,
        cache_backend: state.data.cache_backend().to_string(),
    };

    (status_code, Json(response))
}
