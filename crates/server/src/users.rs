//! Registration, login and the current user.

use api_types::auth::{LoginRequest, LoginResponse, RegisterRequest, UserView};
use axum::{Extension, Json, extract::State, http::StatusCode};
use engine::{RegisterCmd, UserProfile};

use crate::{AuthUser, ServerError, server::ServerState};

fn view(profile: UserProfile) -> UserView {
    UserView {
        id: profile.id,
        name: profile.name,
        username: profile.username,
        email: profile.email,
    }
}

pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<UserView>), ServerError> {
    let mut cmd = RegisterCmd::new(payload.name, payload.username, payload.password);
    if let Some(email) = payload.email {
        cmd = cmd.email(email);
    }
    let profile = state.engine.register(cmd).await?;
    Ok((StatusCode::CREATED, Json(view(profile))))
}

pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ServerError> {
    let profile = state
        .engine
        .verify_credentials(&payload.username, &payload.password)
        .await?;
    let token = state.signer.issue(profile.id, &profile.username)?;
    tracing::info!(user_id = profile.id, "user logged in");

    Ok(Json(LoginResponse {
        token,
        user: view(profile),
    }))
}

pub async fn me(
    Extension(user): Extension<AuthUser>,
    State(state): State<ServerState>,
) -> Result<Json<UserView>, ServerError> {
    Ok(Json(view(state.engine.user_profile(user.id).await?)))
}
