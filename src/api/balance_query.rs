// Read paths (balances, directory). These never take the write region:
// they observe the most recently committed log, which always sums to
// zero per group.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};

use crate::api::router::{reject, AppState, Rejection};
use crate::models::{
    ApiResponse, BalanceEntry, CreateGroupRequest, Group, GroupId, LedgerError,
    UserBalanceSummary, UserId,
};

pub async fn get_group_balances(
    Extension(state): Extension<Arc<AppState>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<ApiResponse<Vec<BalanceEntry>>>, Rejection> {
    let balances = state.service.group_balances(group_id).map_err(reject)?;
    Ok(Json(ApiResponse::success(balances)))
}

pub async fn get_user_balances(
    Extension(state): Extension<Arc<AppState>>,
    Path(user_id): Path<UserId>,
) -> Result<Json<ApiResponse<UserBalanceSummary>>, Rejection> {
    let summary = state.service.user_balances(user_id).map_err(reject)?;
    Ok(Json(ApiResponse::success(summary)))
}

pub async fn create_group(
    Extension(state): Extension<Arc<AppState>>,
    Json(req): Json<CreateGroupRequest>,
) -> Result<Json<ApiResponse<Group>>, Rejection> {
    if req.name.trim().is_empty() {
        return Err(reject(LedgerError::EmptyGroupName));
    }
    let group = state.service.store().create_group(&req).map_err(reject)?;
    log::info!("Group {} created with {} members", group.id, group.members.len());
    Ok(Json(ApiResponse::success(group)))
}

pub async fn list_groups(
    Extension(state): Extension<Arc<AppState>>,
) -> Result<Json<ApiResponse<Vec<Group>>>, Rejection> {
    let groups = state.service.store().list_groups().map_err(reject)?;
    Ok(Json(ApiResponse::success(groups)))
}

pub async fn get_group(
    Extension(state): Extension<Arc<AppState>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<ApiResponse<Group>>, Rejection> {
    let group = state.service.group(group_id).map_err(reject)?;
    Ok(Json(ApiResponse::success(group)))
}
