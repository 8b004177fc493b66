// Expense write path: validate, compute frozen splits, append, all behind
// the group's write region. On success the persisted expense is returned
// with its splits; on failure the group's log is untouched.

use std::sync::Arc;

use axum::{
    extract::{Extension, Path},
    Json,
};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::api::router::{reject, AppState, Rejection};
use crate::models::{
    ApiResponse, CreateExpenseRequest, Expense, ExpenseId, GroupId, Split, SplitId, SplitKind,
    UserId,
};
use crate::money;

/// Client-facing expense: minor units rendered back as decimals.
#[derive(Debug, Serialize)]
pub struct ExpenseView {
    pub id: ExpenseId,
    pub group_id: GroupId,
    pub description: String,
    pub amount: Decimal,
    pub paid_by: UserId,
    pub split_kind: SplitKind,
    pub created_at: i64,
    pub splits: Vec<SplitView>,
}

#[derive(Debug, Serialize)]
pub struct SplitView {
    pub id: SplitId,
    pub user_id: UserId,
    pub amount: Decimal,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub percentage: Option<Decimal>,
}

impl From<&Split> for SplitView {
    fn from(split: &Split) -> Self {
        Self {
            id: split.id,
            user_id: split.user_id,
            amount: money::to_decimal(split.amount_minor),
            percentage: split.percentage,
        }
    }
}

impl From<&Expense> for ExpenseView {
    fn from(expense: &Expense) -> Self {
        Self {
            id: expense.id,
            group_id: expense.group_id,
            description: expense.description.clone(),
            amount: money::to_decimal(expense.amount_minor),
            paid_by: expense.paid_by,
            split_kind: expense.split_kind,
            created_at: expense.created_at,
            splits: expense.splits.iter().map(SplitView::from).collect(),
        }
    }
}

pub async fn create_expense(
    Extension(state): Extension<Arc<AppState>>,
    Path(group_id): Path<GroupId>,
    Json(req): Json<CreateExpenseRequest>,
) -> Result<Json<ApiResponse<ExpenseView>>, Rejection> {
    let expense = state
        .service
        .create_expense(group_id, &req)
        .await
        .map_err(reject)?;
    Ok(Json(ApiResponse::success(ExpenseView::from(&expense))))
}

pub async fn get_group_expenses(
    Extension(state): Extension<Arc<AppState>>,
    Path(group_id): Path<GroupId>,
) -> Result<Json<ApiResponse<Vec<ExpenseView>>>, Rejection> {
    let expenses = state.service.group_expenses(group_id).map_err(reject)?;
    let views = expenses.iter().map(ExpenseView::from).collect();
    Ok(Json(ApiResponse::success(views)))
}
