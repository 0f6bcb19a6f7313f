use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::HeaderValue,
    response::{IntoResponse, Json, Response},
    routing::get,
    Router,
};
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::AppError;
use crate::security::parse_address;
use crate::utils::fixed_point::format_units;
use crate::AppState;

pub const CACHE_STATUS_HEADER: &str = "x-cache";

#[derive(Debug, Deserialize)]
pub struct AccountQuery {
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct BalanceQuery {
    pub user: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AllowanceQuery {
    pub owner: Option<String>,
    pub token: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct BalanceResponse {
    pub balance: String,
}

#[derive(Debug, Serialize)]
pub struct AllowanceResponse {
    pub allowance: String,
    pub spender: String,
}

fn invalid_query(e: QueryRejection) -> AppError {
    AppError::ValidationError(format!("Invalid query string: {}", e.body_text()))
}

/// `GET /user/account?address=` with an `X-Cache: HIT|MISS` header.
pub async fn get_user_account(
    State(state): State<AppState>,
    query: Result<Query<AccountQuery>, QueryRejection>,
) -> Result<Response, AppError> {
    let Query(query) = query.map_err(invalid_query)?;
    let user = parse_address("Ethereum address", query.address.as_deref())?;
    debug!(user = %user, "Fetching user account data");

    let (snapshot, status) = state.data.user_account(user).await?;

    let mut response = Json(snapshot).into_response();
    response
        .headers_mut()
        .insert(CACHE_STATUS_HEADER, HeaderValue::from_static(status.as_header_value()));
    Ok(response)
}

pub async fn get_balance(
    State(state): State<AppState>,
    query: Result<Query<BalanceQuery>, QueryRejection>,
) -> Result<Json<BalanceResponse>, AppError> {
    let Query(query) = query.map_err(invalid_query)?;
    let user = parse_address("user address", query.user.as_deref())?;
    let token = parse_address("token address", query.token.as_deref())?;
    let asset = state.registry.require(&token)?;

    let snapshot = state.data.balance(user, asset).await?;
    Ok(Json(BalanceResponse {
        balance: snapshot.formatted(),
    }))
}

/// Allowance granted by `owner` to the lending pool, in token units.
pub async fn get_allowance(
    State(state): State<AppState>,
    query: Result<Query<AllowanceQuery>, QueryRejection>,
) -> Result<Json<AllowanceResponse>, AppError> {
    let Query(query) = query.map_err(invalid_query)?;
    let owner = parse_address("owner address", query.owner.as_deref())?;
    let token = parse_address("token address", query.token.as_deref())?;
    let asset = state.registry.require(&token)?;
    let spender = state.transactions.pool();

    let allowance = state.data.allowance(owner, asset, spender).await?;
    Ok(Json(AllowanceResponse {
        allowance: format_units(allowance, asset.decimals),
        spender: spender.to_string(),
    }))
}

pub fn create_account_routes() -> Router<AppState> {
    Router::new()
        .route("/user/account", get(get_user_account))
        .route("/balance", get(get_balance))
        .route("/allowance", get(get_allowance))
}
