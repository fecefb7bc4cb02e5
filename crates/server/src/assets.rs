use api_types::{
    ReplaceCount,
    asset::{AssetInput, AssetNew, AssetView},
    page::{ListQuery, ListResponse, ReplaceRequest},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use engine::{Asset, AssetCmd, AssetItem};

use crate::{
    AuthUser, ServerError, auth::record_period, money, page_info, record_query,
    server::ServerState,
};

fn view(asset: Asset) -> AssetView {
    AssetView {
        id: asset.id,
        period_code: asset.period_code,
        category_id: asset.category_id,
        name: asset.name,
        amount: asset.amount.to_decimal(),
        value: asset.value.to_decimal(),
        notes: asset.notes,
        order_no: asset.order_no,
    }
}

fn cmd(user_id: i64, payload: AssetNew) -> Result<AssetCmd, ServerError> {
    let cmd = AssetCmd::new(
        user_id,
        payload.period_code,
        payload.category_id,
        money(payload.amount)?,
        money(payload.value)?,
    );
    Ok(match payload.notes {
        Some(notes) => cmd.notes(notes),
        None => cmd,
    })
}

fn item(input: AssetInput) -> Result<AssetItem, ServerError> {
    let mut item = AssetItem::new(
        input.name,
        money(input.amount)?,
        money(input.value)?,
        input.order_no,
    );
    if let Some(category_id) = input.category_id {
        item = item.category(category_id);
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
) -> Result<Json<ListResponse<AssetView>>, ServerError> {
    let page = state
        .engine
        .list_assets(user.id, &record_query(query))
        .await?;
    Ok(Json(ListResponse {
        data: page.items.into_iter().map(view).collect(),
        page: page_info(page.info),
    }))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<AssetNew>,
) -> Result<(StatusCode, Json<AssetView>), ServerError> {
    let asset = state.engine.add_asset(cmd(user.id, payload)?).await?;
    Ok((StatusCode::CREATED, Json(view(asset))))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<AssetView>, ServerError> {
    Ok(Json(view(state.engine.asset(user.id, id).await?)))
}

pub async fn update(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
    Json(payload): Json<AssetNew>,
) -> Result<Json<AssetView>, ServerError> {
    let asset = state
        .engine
        .update_asset(id, cmd(user.id, payload)?)
        .await?;
    Ok(Json(view(asset)))
}

pub async fn delete(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<StatusCode, ServerError> {
    state.engine.delete_asset(user.id, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn replace(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ReplaceRequest<AssetInput>>,
) -> Result<Json<ReplaceCount>, ServerError> {
    record_period(&payload.period_code);
    let items = payload
        .data
        .into_iter()
        .map(item)
        .collect::<Result<Vec<_>, _>>()?;
    let written = state
        .engine
        .replace_assets_for_period(user.id, &payload.period_code, items)
        .await?;
    Ok(Json(ReplaceCount { written }))
}
