use axum::{
    Json,
    extract::{FromRequest, Multipart, Request, State},
    http::{StatusCode, header},
    response::IntoResponse,
};
use cookbook_recipe::{
    RecipeInput,
    recipe::{self, ListInput},
};
use serde_json::json;

use super::{
    AppState,
    resource::{RecipeResource, envelope},
    storage::UploadedImage,
};
use crate::{
    auth::{AuthUser, OptionalAuth},
    error::{AppError, AppResult},
    extract::{JsonBody, ListParams, PathParam},
};

/// Recipe fields sent as JSON, or as a multipart form that may carry an
/// `image` file. Form arrays use `ingredients[]` or `ingredients[N]` keys.
pub struct RecipeForm {
    pub input: RecipeInput,
    pub image: Option<UploadedImage>,
}

fn is_multipart(req: &Request) -> bool {
    req.headers()
        .get(header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.to_lowercase().starts_with("multipart/form-data"))
}

fn form_int(field: &'static str, value: &str) -> AppResult<i64> {
    value.parse().map_err(|_| {
        AppError::invalid(
            field,
            format!("The {} field must be an integer.", field.replace('_', " ")),
        )
    })
}

impl FromRequest<AppState> for RecipeForm {
    type Rejection = AppError;

    async fn from_request(req: Request, state: &AppState) -> Result<Self, Self::Rejection> {
        if !is_multipart(&req) {
            let JsonBody(input) = JsonBody::<RecipeInput>::from_request(req, state).await?;
            return Ok(Self { input, image: None });
        }

        let mut multipart = Multipart::from_request(req, state)
            .await
            .map_err(|e| AppError::BadBody(e.body_text()))?;
        let mut input = RecipeInput::default();
        let mut image = None;

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadBody(e.body_text()))?
        {
            let Some(name) = field.name().map(str::to_owned) else {
                continue;
            };

            if name == "image" {
                let file = UploadedImage::read(field).await?;
                if file.file_name.is_some() || !file.bytes.is_empty() {
                    image = Some(file);
                }
                continue;
            }

            let value = field
                .text()
                .await
                .map_err(|e| AppError::BadBody(e.body_text()))?;
            let value = value.trim().to_owned();

            match name.as_str() {
                "title" => input.title = Some(value),
                "description" => input.description = Some(value),
                "instructions" => input.instructions = Some(value),
                "difficulty" => input.difficulty = Some(value),
                "image_url" => input.image_url = Some(value).filter(|v| !v.is_empty()),
                "category_id" if value.is_empty() => input.category_id = Some(None),
                "category_id" => input.category_id = Some(Some(form_int("category_id", &value)?)),
                "cooking_time" => input.cooking_time = Some(form_int("cooking_time", &value)?),
                "servings" => input.servings = Some(form_int("servings", &value)?),
                key if key == "ingredients" || key.starts_with("ingredients[") => {
                    input.ingredients.get_or_insert_with(Vec::new).push(value);
                }
                _ => {}
            }
        }

        Ok(Self { input, image })
    }
}

/// Stores an uploaded file and points `image_url` at it. Returns the URL so
/// the file can be removed if the recipe write fails.
async fn attach_image(
    state: &AppState,
    input: &mut RecipeInput,
    image: Option<UploadedImage>,
) -> AppResult<Option<String>> {
    let Some(image) = image else {
        return Ok(None);
    };

    let path = image.store(&state.images).await?;
    let url = state.images.url(&path);
    input.image_url = Some(url.to_owned());

    Ok(Some(url))
}

/// GET /api/recipes
pub async fn index(
    State(state): State<AppState>,
    auth: OptionalAuth,
    params: ListParams,
) -> AppResult<impl IntoResponse> {
    let page = state
        .recipe_command
        .list(ListInput {
            search: params.string("search"),
            category_id: params.int("category_id"),
            difficulty: params.string("difficulty"),
            sort_by: params.string("sort_by"),
            sort_order: params.string("sort_order"),
            page: params.page(recipe::DEFAULT_PER_PAGE, recipe::MAX_PER_PAGE),
            viewer: auth.user_id(),
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

/// GET /api/recipes/{id}
pub async fn show(
    State(state): State<AppState>,
    auth: OptionalAuth,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let Some(recipe) = state.recipe_command.find(id, auth.user_id()).await? else {
        return Err(AppError::not_found("Recipe not found."));
    };

    Ok(Json(json!({ "data": RecipeResource::new(recipe, &state.images) })))
}

/// POST /api/recipes
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn store(
    State(state): State<AppState>,
    auth: AuthUser,
    RecipeForm { mut input, image }: RecipeForm,
) -> AppResult<impl IntoResponse> {
    let uploaded = attach_image(&state, &mut input, image).await?;

    let mut recipe = match state.recipe_command.create(auth.actor(), input).await {
        Ok(recipe) => recipe,
        Err(e) => {
            if let Some(url) = uploaded {
                state.images.delete(&url).await;
            }
            return Err(e.into());
        }
    };
    recipe.is_liked = Some(false);

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Recipe created successfully",
            "data": RecipeResource::new(recipe, &state.images),
        })),
    ))
}

/// PUT /api/recipes/{id}
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn update(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
    RecipeForm { mut input, image }: RecipeForm,
) -> AppResult<impl IntoResponse> {
    let uploaded = attach_image(&state, &mut input, image).await?;

    let (mut recipe, replaced) = match state.recipe_command.update(auth.actor(), id, input).await {
        Ok(updated) => updated,
        Err(e) => {
            if let Some(url) = uploaded {
                state.images.delete(&url).await;
            }
            return Err(e.into());
        }
    };

    if let Some(old_image) = replaced {
        state.images.delete(&old_image).await;
    }

    recipe.is_liked = Some(state.recipe_command.is_liked(auth.user.id, id).await?);

    Ok(Json(json!({
        "message": "Recipe updated successfully",
        "data": RecipeResource::new(recipe, &state.images),
    })))
}

/// DELETE /api/recipes/{id}
#[tracing::instrument(skip_all, fields(user_id = auth.user.id))]
pub async fn destroy(
    State(state): State<AppState>,
    auth: AuthUser,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    if let Some(image) = state.recipe_command.delete(auth.actor(), id).await? {
        state.images.delete(&image).await;
    }

    Ok(Json(json!({ "message": "Recipe deleted successfully" })))
}

/// POST /api/recipes/{id}/increment-views
pub async fn increment_views(
    State(state): State<AppState>,
    PathParam(id): PathParam<i64>,
) -> AppResult<impl IntoResponse> {
    let views_count = state.recipe_command.increment_views(id).await?;

    Ok(Json(json!({
        "message": "View count incremented",
        "views_count": views_count,
    })))
}
