use std::sync::Arc;

use axum::{
    http::StatusCode,
    routing::{get, post},
    Extension, Json, Router,
};
use tower_http::cors::CorsLayer;

use crate::api::balance_query::{
    create_group, get_group, get_group_balances, get_user_balances, list_groups,
};
use crate::api::expense_handler::{create_expense, get_group_expenses};
use crate::models::{ApiResponse, LedgerError};
use crate::service::ExpenseService;

pub struct AppState {
    pub service: ExpenseService,
}

pub fn create_app(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/groups", post(create_group).get(list_groups))
        .route("/groups/:group_id", get(get_group))
        .route("/groups/:group_id/expenses", post(create_expense).get(get_group_expenses))
        .route("/groups/:group_id/balances", get(get_group_balances))
        .route("/users/:user_id/balances", get(get_user_balances))
        .layer(Extension(state))
        .layer(CorsLayer::permissive())
}

pub type Rejection = (StatusCode, Json<ApiResponse<Option<()>>>);

/// Map a ledger error onto an HTTP status plus the error envelope.
/// Validation failures are the caller's fault, lock timeouts are
/// retryable, everything else is on us.
pub fn reject(err: LedgerError) -> Rejection {
    let status = if err.is_user_error() {
        StatusCode::BAD_REQUEST
    } else if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_retryable() {
        StatusCode::SERVICE_UNAVAILABLE
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };

    if status.is_server_error() {
        log::error!("Request failed: {}: {}", err.error_code(), err);
    } else {
        log::debug!("Request rejected: {}: {}", err.error_code(), err);
    }

    (status, Json(ApiResponse::from_error(&err)))
}
