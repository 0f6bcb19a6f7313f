use axum::{extract::State, response::Json, routing::get, Router};
use chrono::Utc;

use crate::models::{AnalyticsReport, Asset, ReserveView};
use crate::AppState;

/// Reserves that could not be read are omitted rather than failing the list.
pub async fn get_reserves(State(state): State<AppState>) -> Json<Vec<ReserveView>> {
    Json(state.aggregator.reserves().await)
}

pub async fn get_analytics(State(state): State<AppState>) -> Json<AnalyticsReport> {
    Json(state.aggregator.analytics(Utc::now()).await)
}

pub async fn get_assets(State(state): State<AppState>) -> Json<Vec<Asset>> {
    Json(state.registry.assets().to_vec())
}

pub fn create_reserve_routes() -> Router<AppState> {
    Router::new()
        .route("/reserves", get(get_reserves))
        .route("/analytics", get(get_analytics))
        .route("/assets", get(get_assets))
}
