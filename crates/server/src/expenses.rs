//! Expense API endpoints

use api_types::{
    expense::{ExpenseInput, ExpenseNew, ExpenseView, ReplaceOutcome},
    page::{ListQuery, ListResponse, ReplaceRequest},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Expense, ExpenseCmd, ExpenseItem};

use crate::{
    AuthUser, ServerError, auth::record_period, money, page_info, record_query,
    server::ServerState,
};

fn view(expense: Expense) -> ExpenseView {
    ExpenseView {
        id: expense.id,
        period_code: expense.period_code,
        category_id: expense.category_id,
        liability_id: expense.liability_id,
        name: expense.name,
        date: expense.date,
        value: expense.value.to_decimal(),
        notes: expense.notes,
        order_no: expense.order_no,
    }
}

fn outcome(outcome: engine::ReplaceOutcome) -> ReplaceOutcome {
    ReplaceOutcome {
        refetch_liability: outcome.refetch_liability,
    }
}

fn cmd(user_id: i64, payload: ExpenseNew) -> Result<ExpenseCmd, ServerError> {
    let mut cmd = ExpenseCmd::new(user_id, payload.date, money(payload.value)?);
    if let Some(category_id) = payload.category_id {
        cmd = cmd.category(category_id);
    }
    if let Some(liability_id) = payload.liability_id {
        cmd = cmd.liability(liability_id);
    }
    if let Some(notes) = payload.notes {
        cmd = cmd.notes(notes);
    }
    Ok(cmd)
}

fn item(input: ExpenseInput) -> Result<ExpenseItem, ServerError> {
    let mut item = ExpenseItem::new(input.name, money(input.value)?, input.order_no);
    if let Some(category_id) = input.category_id {
        item = item.category(category_id);
    }
    if let Some(liability_id) = input.liability_id {
        item = item.liability(liability_id);
    }
    if let Some(date) = input.date {
        item = item.date(date);
    }
    if let Some(notes) = input.notes {
        item = item.notes(notes);
    }
    Ok(item)
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<ExpenseView>>, ServerError> {
    let page = state
        .engine
        .list_expenses(user.id, &record_query(query))
        .await?;
    Ok(Json(ListResponse {
        data: page.items.into_iter().map(view).collect(),
        page: page_info(page.info),
    }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ExpenseNew>,
) -> Result<(StatusCode, Json<ExpenseView>), ServerError> {
    let expense = state.engine.add_expense(cmd(user.id, payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(expense))))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ExpenseView>, ServerError> {
    Ok(Json(view(state.engine.expense(user.id, id).await?)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<ExpenseNew>,
) -> Result<Json<ExpenseView>, ServerError> {
    let expense = state
        .engine
        .update_expense(id, cmd(user.id, payload)?)
        .await?;
    Ok(Json(view(expense)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<ReplaceOutcome>, ServerError> {
    let result = state.engine.delete_expense(user.id, id).await?;
    Ok(Json(outcome(result)))
}

pub async fn replace(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ReplaceRequest<ExpenseInput>>,
) -> Result<Json<ReplaceOutcome>, ServerError> {
    record_period(&payload.period_code);
    if !payload.deleted_items.is_empty() {
        tracing::debug!(
            deleted_items = payload.deleted_items.len(),
            "deleted_items ignored, the period is replaced wholesale"
        );
    }
    let items = payload
        .data
        .into_iter()
        .map(item)
        .collect::<Result<Vec<_>, _>>()?;
    let result = state
        .engine
        .replace_expenses_for_period(user.id, &payload.period_code, items)
        .await?;
    Ok(Json(outcome(result)))
}
