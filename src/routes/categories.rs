use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use cookbook_recipe::category::{self, CategoryInput, ListInput};
use serde_json::json;

use super::{
    AppState,
    resource::{CategoryResource, RecipeResource, envelope},
};
use crate::{
    auth::AdminUser,
    error::{AppError, AppResult},
    extract::{JsonBody, ListParams, PathParam},
};

/// GET /api/categories
pub async fn index(
    State(state): State<AppState>,
    params: ListParams,
) -> AppResult<impl IntoResponse> {
    let page = state
        .recipe_command
        .list_categories(ListInput {
            sort_by: params.string("sort_by"),
            sort_order: params.string("sort_order"),
            page: params.page(category::DEFAULT_PER_PAGE, category::MAX_PER_PAGE),
        })
        .await?;

    Ok(Json(envelope(
        page,
        params.filters(),
        params.sortings(),
        |category| category.id,
        CategoryResource::from,
    )))
}

/// GET /api/categories/{id}
pub async fn show(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let Some(detail) = state.recipe_command.category_detail(id).await? else {
        return Err(AppError::not_found("Category not found."));
    };

    let mut category = CategoryResource::from(detail.category);
    category.recipes = Some(
        detail
            .recipes
            .into_iter()
            .map(|recipe| RecipeResource::new(recipe, &state.images))
            .collect(),
    );

    Ok(Json(json!({ "data": category })))
}

/// POST /api/categories
#[tracing::instrument(skip_all, fields(user_id = admin.user.id))]
pub async fn store(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    JsonBody(input): JsonBody<CategoryInput>,
) -> AppResult<impl IntoResponse> {
    let category = state.recipe_command.create_category(input).await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Category created successfully",
            "data": CategoryResource::from(category),
        })),
    ))
}

/// PUT /api/categories/{id}
#[tracing::instrument(skip_all, fields(user_id = admin.user.id))]
pub async fn update(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<i64>,
    JsonBody(input): JsonBody<CategoryInput>,
) -> AppResult<impl IntoResponse> {
    let category = state.recipe_command.update_category(id, input).await?;

    Ok(Json(json!({
        "message": "Category updated successfully",
        "data": CategoryResource::from(category),
    })))
}

/// DELETE /api/categories/{id}
#[tracing::instrument(skip_all, fields(user_id = admin.user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    state.recipe_command.delete_category(id).await?;

    Ok(Json(json!({ "message": "Category deleted successfully" })))
}
