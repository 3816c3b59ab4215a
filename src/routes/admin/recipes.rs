use axum::{Json, extract::State, response::IntoResponse};
use cookbook_recipe::recipe::{self, AdminListInput};
use serde_json::json;

use crate::{
    auth::AdminUser,
    error::AppResult,
    extract::{ListParams, PathParam},
    routes::{
        AppState,
        resource::{RecipeResource, envelope},
    },
};

/// GET /api/admin/recipes
pub async fn index(
    State(state): State<AppState>,
    _admin: AdminUser,
    params: ListParams,
) -> AppResult<impl IntoResponse> {
    let page = state
        .recipe_command
        .admin_list(AdminListInput {
            search: params.string("search"),
            user_id: params.int("user_id"),
            category_id: params.int("category_id"),
            sort_by: params.string("sort_by"),
            sort_order: params.string("sort_order"),
            page: params.page(recipe::ADMIN_DEFAULT_PER_PAGE, recipe::ADMIN_MAX_PER_PAGE),
        })
        .await?;

    Ok(Json(envelope(
        page,
        params.filters(),
        params.sortings(),
        |recipe| recipe.id,
        |recipe| RecipeResource::new(recipe, &state.images),
    )))
}

/// DELETE /api/admin/recipes/{id}
#[tracing::instrument(skip_all, fields(admin_id = admin.user.id, recipe_id = id))]
pub async fn destroy(
    State(state): State<AppState>,
    AdminUser(admin): AdminUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    if let Some(image) = state.recipe_command.admin_delete(id).await? {
        state.images.delete(&image).await;
    }

    Ok(Json(json!({ "message": "Recipe deleted successfully" })))
}
