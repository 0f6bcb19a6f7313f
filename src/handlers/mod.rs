pub mod account_handlers;
pub mod health;
pub mod metrics;
pub mod reserve_handlers;
pub mod transaction_handlers;

use axum::{routing::get, Router};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::AppState;

pub use health::health_check;
pub use metrics::metrics_handler;

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .merge(account_handlers::create_account_routes())
        .merge(reserve_handlers::create_reserve_routes())
        .merge(transaction_handlers::create_transaction_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
