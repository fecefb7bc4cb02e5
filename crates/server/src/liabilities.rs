//! Liability API endpoints

use api_types::{
    liability::{LiabilityInput, LiabilityReplaceResponse, LiabilityView},
    page::{ListQuery, ListResponse, ReplaceRequest},
};
use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use engine::{Liability, LiabilityItem};

use crate::{
    AuthUser, ServerError, auth::record_period, money, opt_money, page_info, record_query,
    server::ServerState,
};

fn view(liability: Liability) -> LiabilityView {
    LiabilityView {
        id: liability.id,
        period_code: liability.period_code,
        name: liability.name,
        value: liability.value.to_decimal(),
        installment: liability.installment.map(|value| value.to_decimal()),
        order_no: liability.order_no,
    }
}

fn item(input: LiabilityInput) -> Result<LiabilityItem, ServerError> {
    let mut item = LiabilityItem::new(input.name, money(input.value)?, input.order_no);
    if let Some(id) = input.id {
        item = item.id(id);
    }
    if let Some(installment) = opt_money(input.installment)? {
        item = item.installment(installment);
    }
    Ok(item)
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<ListResponse<LiabilityView>>, ServerError> {
    let page = state
        .engine
        .list_liabilities(user.id, &record_query(query))
        .await?;
    Ok(Json(ListResponse {
        data: page.items.into_iter().map(view).collect(),
        page: page_info(page.info),
    }))
}

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(id): Path<i64>,
) -> Result<Json<LiabilityView>, ServerError> {
    Ok(Json(view(state.engine.liability(user.id, id).await?)))
}

pub async fn replace(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<ReplaceRequest<LiabilityInput>>,
) -> Result<Json<LiabilityReplaceResponse>, ServerError> {
    record_period(&payload.period_code);
    let items = payload
        .data
        .into_iter()
        .map(item)
        .collect::<Result<Vec<_>, _>>()?;
    let ids = state
        .engine
        .replace_liabilities_for_period(user.id, &payload.period_code, items)
        .await?;
    Ok(Json(LiabilityReplaceResponse { ids }))
}
