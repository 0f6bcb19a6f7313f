use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::post,
    Router,
};

use crate::error::AppError;
use crate::models::{PrepareTransactionRequest, PrepareTransactionResponse};
use crate::services::TransactionAction;
use crate::AppState;

/// `POST /transactions/:action`. Unknown actions are 404; bad input is 400.
pub async fn prepare_transaction(
    State(state): State<AppState>,
    Path(action): Path<String>,
    body: Result<Json<PrepareTransactionRequest>, JsonRejection>,
) -> Result<Json<PrepareTransactionResponse>, AppError> {
    let action: TransactionAction = action.parse()?;
    let Json(request) = body.map_err(|e| AppError::ValidationError(format!("Invalid request body: {}", e.body_text())))?;

    let transaction = state.transactions.prepare(action, &request)?;
    Ok(Json(PrepareTransactionResponse::prepared(&transaction, action.prepared_message())))
}

pub fn create_transaction_routes() -> Router<AppState> {
    Router::new().route("/transactions/:action", post(prepare_transaction))
}
