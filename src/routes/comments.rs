use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use cookbook_recipe::comment::{self, CommentInput, ListInput};
use serde_json::json;

use super::{
    AppState,
    resource::{CommentResource, envelope},
};
use crate::{
    auth::AuthUser,
    error::AppResult,
    extract::{JsonBody, ListParams, PathParam},
};

/// GET /api/recipes/{id}/comments
pub async fn index(
    State(state): State<AppState>,
    PathParam(recipe_id): PathParam<i64>,
    params: ListParams,
) -> AppResult<impl IntoResponse> {
    let page = state
        .recipe_command
        .list_comments(
            recipe_id,
            ListInput {
                sort_by: params.string("sort_by"),
                sort_order: params.string("sort_order"),
                page: params.page(comment::DEFAULT_PER_PAGE, comment::MAX_PER_PAGE),
            },
        )
        .await?;

    Ok(Json(envelope(
        page,
        params.filters(),
        params.sortings(),
        |comment| comment.id,
        CommentResource::from,
    )))
}

/// POST /api/recipes/{id}/comments
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn store(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(recipe_id): PathParam<i64>,
    JsonBody(input): JsonBody<CommentInput>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .recipe_command
        .create_comment(auth.actor(), recipe_id, input)
        .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Comment created successfully",
            "data": CommentResource::from(comment),
        })),
    ))
}

/// PUT /api/comments/{id}
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<CommentInput>,
) -> AppResult<impl IntoResponse> {
    let comment = state
        .recipe_command
        .update_comment(auth.actor(), id, input)
        .await?;

    Ok(Json(json!({
        "message": "Comment updated successfully",
        "data": CommentResource::from(comment),
    })))
}

/// DELETE /api/comments/{id}
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    state.recipe_command.delete_comment(auth.actor(), id).await?;

    Ok(Json(json!({ "message": "Comment deleted successfully" })))
}
