use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use cookbook_user::{
    LoginInput, RegisterInput, UserRow,
    password::{ChangePasswordInput, RequestResetInput, ResetPasswordInput},
};
use serde::Serialize;
use serde_json::json;

use super::{
    AppState,
    resource::{AuthUserResource, CurrentUserResource},
};
use crate::{
    auth::{AuthUser, Guest, RefreshAuth, generate_token},
    error::AppResult,
    extract::JsonBody,
};

#[derive(Serialize)]
struct TokenResponse {
    message: &'static str,
    user: AuthUserResource,
    token: String,
}

async fn issue_token(
    state: &AppState,
    user: &UserRow,
    message: &'static str,
) -> AppResult<Json<TokenResponse>> {
    let access_id = state.user_command.issue_access(user.id).await?;
    let token = generate_token(&state.config.jwt, user.id, &access_id)?;

    Ok(Json(TokenResponse {
        message,
        user: user.into(),
        token,
    }))
}

/// POST /api/register
#[tracing::instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    _guest: Guest,
    JsonBody(input): JsonBody<RegisterInput>,
) -> AppResult<impl IntoResponse> {
    let user = state.user_command.register(input).await?;
    tracing::info!(user_id = user.id, "user registered");

    Ok((
        StatusCode::CREATED,
        issue_token(&state, &user, "Registration successful").await?,
    ))
}

/// POST /api/login
#[tracing::instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    _guest: Guest,
    JsonBody(input): JsonBody<LoginInput>,
) -> AppResult<impl IntoResponse> {
    let user = state.user_command.login(input).await?;

    issue_token(&state, &user, "Login successful").await
}

/// POST /api/forgot-password
///
/// Answers the same way whether or not the address is known.
#[tracing::instrument(skip_all)]
pub async fn forgot_password(
    State(state): State<AppState>,
    _guest: Guest,
    JsonBody(input): JsonBody<RequestResetInput>,
) -> AppResult<impl IntoResponse> {
    let email = input.email.to_lowercase();

    if let Some(token) = state.user_command.request_password_reset(input).await? {
        state.email.send_password_reset(&email, &token).await?;
    }

    Ok(Json(
        json!({ "status": "We have emailed your password reset link." }),
    ))
}

/// POST /api/reset-password
#[tracing::instrument(skip_all)]
pub async fn reset_password(
    State(state): State<AppState>,
    _guest: Guest,
    JsonBody(input): JsonBody<ResetPasswordInput>,
) -> AppResult<impl IntoResponse> {
    state.user_command.reset_password(input).await?;

    Ok(Json(json!({ "status": "Your password has been reset." })))
}

/// POST /api/auth/refresh - rotates the access id behind the token
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn refresh(
    State(state): State<AppState>,
    RefreshAuth(auth): RefreshAuth,
) -> AppResult<impl IntoResponse> {
    state
        .user_command
        .revoke_access(auth.access_id.to_owned())
        .await?;

    issue_token(&state, &auth.user, "Token refreshed successfully").await
}

/// POST /api/logout
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn logout(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<impl IntoResponse> {
    state
        .user_command
        .revoke_access(auth.access_id.to_owned())
        .await?;

    Ok(Json(json!({ "message": "Logout successful" })))
}

/// GET /api/user
pub async fn current_user(auth: AuthUser) -> impl IntoResponse {
    Json(CurrentUserResource::from(&auth.user))
}

/// PUT /api/password
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    JsonBody(input): JsonBody<ChangePasswordInput>,
) -> AppResult<impl IntoResponse> {
    state
        .user_command
        .change_password(auth.user.id, input)
        .await?;

    Ok(Json(json!({ "message": "Password changed successfully." })))
}
