use api_types::period::PeriodSettingsView;
use axum::{Extension, Json, extract::State};

use crate::{AuthUser, ServerError, server::ServerState};

pub async fn get(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<PeriodSettingsView>, ServerError> {
    let settings = state.engine.period_settings(user.id).await?;
    Ok(Json(PeriodSettingsView {
        day_of_month: settings.day_of_month,
    }))
}

pub async fn set(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
    Json(payload): Json<PeriodSettingsView>,
) -> Result<Json<PeriodSettingsView>, ServerError> {
    let settings = state
        .engine
        .set_period_day(user.id, payload.day_of_month)
        .await?;
    Ok(Json(PeriodSettingsView {
        day_of_month: settings.day_of_month,
    }))
}
