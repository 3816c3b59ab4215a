use axum::{Json, extract::State, response::IntoResponse};
use cookbook_recipe::comment::{self, AdminListInput};
use serde_json::json;

use crate::{
    auth::AdminUser,
    error::AppResult,
    extract::{ListParams, PathParam},
    routes::{
        AppState,
        resource::{AdminCommentResource, envelope},
    },
};

/// GET /api/admin/comments
pub async fn index(
    State(state): State<AppState>,
    _admin: AdminUser,
    params: ListParams,
) -> AppResult<impl IntoResponse> {
    let page = state
        .recipe_command
        .admin_list_comments(AdminListInput {
            user_id: params.int("user_id"),
            recipe_id: params.int("recipe_id"),
            sort_by: params.string("sort_by"),
            sort_order: params.string("sort_order"),
            page: params.page(comment::DEFAULT_PER_PAGE, comment::MAX_PER_PAGE),
        })
        .await?;

    Ok(Json(envelope(
        page,
        params.filters(),
        params.sortings(),
        |comment| comment.id,
        AdminCommentResource::from,
    )))
}

/// DELETE /api/admin/comments/{id}
#[tracing::instrument(skip_all, fields(admin_id = admin.user.id, comment_id = id))]
pub async fn destroy(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    state.recipe_command.admin_delete_comment(id).await?;

    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
