//! Income API endpoints

use api_types::{
    ReplaceCount,
    income::{IncomeInput, IncomeNew, IncomeView},
    page::{ListQuery, ListResponse, ReplaceRequest},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Income, IncomeCmd, IncomeItem};

use crate::{
    AuthUser, ServerError, auth::record_period, money, page_info, record_query,
    server::ServerState,
};

fn view(income: Income) -> IncomeView {
    IncomeView {
        id: income.id,
        period_code: income.period_code,
        category_id: income.category_id,
        name: income.name,
        date: income.date,
        value: income.value.to_decimal(),
        notes: income.notes,
        order_no: income.order_no,
    }
}

fn cmd(user_id: i64, payload: IncomeNew) -> Result<IncomeCmd, ServerError> {
    let cmd = IncomeCmd::new(
        user_id,
        payload.category_id,
        payload.date,
        money(payload.value)?,
    );
    Ok(match payload.notes {
        Some(notes) => cmd.notes(notes),
        None => cmd,
    })
}

fn item(input: IncomeInput) -> Result<IncomeItem, ServerError> {
    let mut item = IncomeItem::new(input.name, money(input.value)?, input.order_no);
    if let Some(category_id) = input.category_id {
        item = item.category(category_id);
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
) -> Result<Json<ListResponse<IncomeView>>, ServerError> {
    let page = state
        .engine
        .list_incomes(user.id, &record_query(query))
        .await?;
    Ok(Json(ListResponse {
        data: page.items.into_iter().map(view).collect(),
        page: page_info(page.info),
    }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<IncomeNew>,
) -> Result<(StatusCode, Json<IncomeView>), ServerError> {
    let income = state.engine.add_income(cmd(user.id, payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(income))))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<IncomeView>, ServerError> {
    Ok(Json(view(state.engine.income(user.id, id).await?)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<IncomeNew>,
) -> Result<Json<IncomeView>, ServerError> {
    let income = state
        .engine
        .update_income(id, cmd(user.id, payload)?)
        .await?;
    Ok(Json(view(income)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_income(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ReplaceRequest<IncomeInput>>,
) -> Result<Json<ReplaceCount>, ServerError> {
    record_period(&payload.period_code);
    let items = payload
        .data
        .into_iter()
        .map(item)
        .collect::<Result<Vec<_>, _>>()?;
    let written = state
        .engine
        .replace_incomes_for_period(user.id, &payload.period_code, items)
        .await?;
    Ok(Json(ReplaceCount { written }))
}
