use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use cookbook_recipe::like;
use serde_json::json;

use super::{
    AppState,
    resource::{RecipeResource, envelope},
};
use crate::{
    auth::AuthUser,
    error::AppResult,
    extract::{ListParams, PathParam},
};

fn like_state_message(is_liked: bool) -> &'static str {
    if is_liked { "Recipe liked" } else { "Like removed" }
}

/// GET /api/user/liked-recipes
pub async fn index(
    State(state): State<AppState>,
    auth: AuthUser,
    params: ListParams,
) -> AppResult<impl IntoResponse> {
    let page = state
        .recipe_command
        .liked_recipes(
            auth.user.id,
            params.page(like::DEFAULT_PER_PAGE, like::MAX_PER_PAGE),
        )
        .await?;

    Ok(Json(envelope(
        page,
        params.filters(),
        params.sortings(),
        |recipe| recipe.id,
        |recipe| RecipeResource::new(recipe, &state.images),
    )))
}

/// POST /api/user/liked-recipes/{id}
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn store(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(recipe_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let likes_count = state.recipe_command.like(auth.user.id, recipe_id).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Recipe liked",
            "is_liked": true,
            "likes_count": likes_count,
        })),
    ))
}

/// GET /api/user/liked-recipes/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(recipe_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let is_liked = state
        .recipe_command
        .is_liked(auth.user.id, recipe_id)
        .await?;

    Ok(Json(json!({
        "is_liked": is_liked,
        "recipe_id": recipe_id,
    })))
}

/// DELETE /api/user/liked-recipes/{id}
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(recipe_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let likes_count = state.recipe_command.unlike(auth.user.id, recipe_id).await?;

    Ok(Json(json!({
        "message": "Like removed",
        "is_liked": false,
        "likes_count": likes_count,
    })))
}

/// POST /api/recipes/{id}/like
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn toggle(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(recipe_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let (is_liked, likes_count) = state
        .recipe_command
        .toggle_like(auth.user.id, recipe_id)
        .await?;

    Ok(Json(json!({
        "message": like_state_message(is_liked),
        "is_liked": is_liked,
        "likes_count": likes_count,
    })))
}

/// GET /api/recipes/{id}/is-liked
pub async fn is_liked(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(recipe_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let is_liked = state
        .recipe_command
        .is_liked(auth.user.id, recipe_id)
        .await?;

    Ok(Json(json!({ "is_liked": is_liked })))
}

/// GET /api/recipes/{id}/likes
pub async fn count(
    State(state): State<AppState>,
    PathParam(recipe_id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let likes_count = state.recipe_command.count_likes(recipe_id).await?;

    Ok(Json(json!({ "likes_count": likes_count })))
}
