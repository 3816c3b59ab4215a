use axum::{Json, extract::State, response::IntoResponse};
use cookbook_user::admin::{self, ListInput, UpdateUserInput};
use serde_json::json;

use crate::{
    auth::AdminUser,
    error::{AppError, AppResult},
    extract::{JsonBody, ListParams, PathParam},
    routes::{
        AppState,
        resource::{AdminUserResource, envelope},
    },
};

/// GET /api/admin/users
pub async fn index(
    State(state): State<AppState>,
    _admin: AdminUser,
    params: ListParams,
) -> AppResult<impl IntoResponse> {
    let page = state
        .user_command
        .admin_list(ListInput {
            search: params.string("search"),
            is_admin: params.bool("is_admin"),
            sort_by: params.string("sort_by"),
            sort_order: params.string("sort_order"),
            page: params.page(admin::DEFAULT_PER_PAGE, admin::MAX_PER_PAGE),
        })
        .await?;

    Ok(Json(envelope(
        page,
        params.filters(),
        params.sortings(),
        |user| user.id,
        AdminUserResource::from,
    )))
}

/// GET /api/admin/users/{id}
pub async fn show(
    State(state): State<AppState>,
    _admin: AdminUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let Some(user) = state.user_command.find_with_counts(id).await? else {
        return Err(AppError::not_found("User not found."));
    };

    Ok(Json(json!({ "data": AdminUserResource::from(user) })))
}

/// PUT /api/admin/users/{id}
#[tracing::instrument(skip_all, fields(admin_id = admin.user.id, user_id = id))]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<UpdateUserInput>,
) -> AppResult<impl IntoResponse> {
    let user = state.user_command.admin_update(id, input).await?;

    Ok(Json(json!({
        "message": "User updated successfully",
        "data": AdminUserResource::from(user),
    })))
}

/// DELETE /api/admin/users/{id}
///
/// Removes the image files of the recipes that went with the user.
#[tracing::instrument(skip_all, fields(admin_id = admin.user.id, user_id = id))]
pub async fn destroy(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let images = state.user_command.admin_delete(admin.user.id, id).await?;

    for image in images {
        state.images.delete(&image).await;
    }

    tracing::info!("user deleted");

    Ok(Json(json!({ "message": "User deleted successfully" })))
}
