//! Category API endpoints

use api_types::category::{CategoryNew, CategoryView};
use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
};
use engine::{Category, CategoryKind};

use crate::{AuthUser, ServerError, server::ServerState};

fn view(category: Category) -> CategoryView {
    CategoryView {
        id: category.id,
        kind: category.kind.as_str().to_string(),
        name: category.name,
    }
}

fn parse_kind(kind: &str) -> Result<CategoryKind, ServerError> {
    CategoryKind::try_from(kind)
        .map_err(|_| ServerError::Generic(format!("unknown category kind '{kind}'")))
}

pub async fn list(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
) -> Result<Json<Vec<CategoryView>>, ServerError> {
    let kind = parse_kind(&kind)?;
    let categories = state.engine.list_categories(user.id, kind).await?;
    Ok(Json(categories.into_iter().map(view).collect()))
}

pub async fn create(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Path(kind): Path<String>,
    Json(payload): Json<CategoryNew>,
) -> Result<(StatusCode, Json<CategoryView>), ServerError> {
    let kind = parse_kind(&kind)?;
    let category = state
        .engine
        .new_category(user.id, kind, &payload.name)
        .await?;
    Ok((StatusCode::CREATED, Json(view(category))))
}
