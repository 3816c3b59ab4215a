mod list;
mod view;

use std::str::FromStr;

use cookbook_db::table::{Category, Recipe};
use cookbook_shared::{Actor, Difficulty, add_field_error};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use validator::{Validate, ValidationError, ValidationErrors};

pub use list::{
    ADMIN_DEFAULT_PER_PAGE, ADMIN_MAX_PER_PAGE, AdminListInput, DEFAULT_PER_PAGE, ListInput, MAX_PER_PAGE,
};
pub use view::RecipeView;

pub(crate) use view::{mark_liked, select};

#[derive(Validate, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct RecipeInput {
    #[serde(deserialize_with = "crate::double_option")]
    pub category_id: Option<Option<i64>>,
    #[validate(length(
        max = 255,
        message = "The title field must not be greater than 255 characters."
    ))]
    pub title: Option<String>,
    pub description: Option<String>,
    #[validate(
        length(min = 1, message = "At least one ingredient is required."),
        custom(function = "validate_ingredients")
    )]
    pub ingredients: Option<Vec<String>>,
    pub instructions: Option<String>,
    #[validate(
        url(message = "The image url field must be a valid URL."),
        length(
            max = 2048,
            message = "The image url field must not be greater than 2048 characters."
        )
    )]
    pub image_url: Option<String>,
    #[validate(range(min = 1, message = "The cooking time field must be at least 1."))]
    pub cooking_time: Option<i64>,
    #[validate(range(min = 1, message = "The servings field must be at least 1."))]
    pub servings: Option<i64>,
    #[validate(custom(function = "validate_difficulty"))]
    pub difficulty: Option<String>,
}

fn validate_ingredients(value: &[String]) -> Result<(), ValidationError> {
    if value.iter().any(|ingredient| ingredient.trim().is_empty()) {
        return Err(ValidationError::new("required").with_message("Ingredient cannot be empty.".into()));
    }

    Ok(())
}

fn validate_difficulty(value: &str) -> Result<(), ValidationError> {
    if Difficulty::from_str(value).is_err() {
        return Err(ValidationError::new("in")
            .with_message("Difficulty must be easy, medium, or hard.".into()));
    }

    Ok(())
}

fn is_blank(value: &Option<String>) -> bool {
    value.as_deref().is_none_or(|v| v.trim().is_empty())
}

impl RecipeInput {
    fn normalize(&mut self) {
        if self.image_url.as_deref().is_some_and(str::is_empty) {
            self.image_url = None;
        }
    }

    fn check_required(&self, errors: &mut ValidationErrors) {
        if is_blank(&self.title) {
            add_field_error(errors, "title", "required", "The title field is required.");
        }
        if is_blank(&self.description) {
            add_field_error(errors, "description", "required", "The description field is required.");
        }
        if self.ingredients.is_none() {
            add_field_error(errors, "ingredients", "required", "At least one ingredient is required.");
        }
        if is_blank(&self.instructions) {
            add_field_error(errors, "instructions", "required", "The instructions field is required.");
        }
        if self.cooking_time.is_none() {
            add_field_error(errors, "cooking_time", "required", "The cooking time field is required.");
        }
        if self.servings.is_none() {
            add_field_error(errors, "servings", "required", "The servings field is required.");
        }
        if is_blank(&self.difficulty) {
            add_field_error(errors, "difficulty", "required", "The difficulty field is required.");
        }
    }

    /// Fields that are present must not be blank.
    fn check_present(&self, errors: &mut ValidationErrors) {
        for (field, value, message) in [
            ("title", &self.title, "The title field is required."),
            ("description", &self.description, "The description field is required."),
            ("instructions", &self.instructions, "The instructions field is required."),
        ] {
            if value.is_some() && is_blank(value) {
                add_field_error(errors, field, "required", message);
            }
        }
    }
}

impl crate::Command {
    async fn validate_recipe(&self, input: &RecipeInput, creating: bool) -> cookbook_shared::Result<()> {
        let mut errors = match input.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if creating {
            input.check_required(&mut errors);
        } else {
            input.check_present(&mut errors);
        }

        if let Some(Some(category_id)) = input.category_id {
            if !self.category_exists(category_id).await? {
                add_field_error(
                    &mut errors,
                    "category_id",
                    "exists",
                    "The selected category id is invalid.",
                );
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        Ok(())
    }

    async fn category_exists(&self, id: i64) -> cookbook_shared::Result<bool> {
        let statement = Query::select()
            .column(Category::Id)
            .from(Category::Table)
            .and_where(Expr::col(Category::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?;

        Ok(row.is_some())
    }

    /// Loads a recipe with its author, category and counts. `is_liked` is
    /// filled only when a viewer is given.
    pub async fn find(&self, id: i64, viewer: Option<i64>) -> cookbook_shared::Result<Option<RecipeView>> {
        let Some(recipe) = view::find(&self.read_db, id).await? else {
            return Ok(None);
        };

        let mut rows = [recipe];
        if let Some(user_id) = viewer {
            mark_liked(&self.read_db, user_id, &mut rows).await?;
        }

        let [recipe] = rows;

        Ok(Some(recipe))
    }

    async fn load(&self, id: i64) -> cookbook_shared::Result<RecipeView> {
        match view::find(&self.write_db, id).await? {
            Some(recipe) => Ok(recipe),
            None => cookbook_shared::not_found!("Recipe not found."),
        }
    }

    #[tracing::instrument(skip(self, input), fields(user_id = actor.id))]
    pub async fn create(&self, actor: Actor, mut input: RecipeInput) -> cookbook_shared::Result<RecipeView> {
        input.normalize();
        self.validate_recipe(&input, true).await?;

        let ingredients = serde_json::to_string(&input.ingredients.unwrap_or_default())?;
        let difficulty = input
            .difficulty
            .as_deref()
            .and_then(|d| Difficulty::from_str(d).ok())
            .unwrap_or_default();
        let now = cookbook_shared::now();

        let statement = Query::insert()
            .into_table(Recipe::Table)
            .columns([
                Recipe::UserId,
                Recipe::CategoryId,
                Recipe::Title,
                Recipe::Description,
                Recipe::Ingredients,
                Recipe::Instructions,
                Recipe::Image,
                Recipe::CookingTime,
                Recipe::Servings,
                Recipe::Difficulty,
                Recipe::ViewsCount,
                Recipe::CreatedAt,
                Recipe::UpdatedAt,
            ])
            .values_panic([
                actor.id.into(),
                input.category_id.flatten().into(),
                input.title.unwrap_or_default().into(),
                input.description.unwrap_or_default().into(),
                ingredients.into(),
                input.instructions.unwrap_or_default().into(),
                input.image_url.into(),
                input.cooking_time.unwrap_or(1).into(),
                input.servings.unwrap_or(1).into(),
                difficulty.to_string().into(),
                0.into(),
                now.into(),
                now.into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let id = sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?
            .last_insert_rowid();

        tracing::info!(recipe_id = id, "recipe created");

        self.load(id).await
    }

    /// Applies the present fields. Returns the previous image when a new
    /// `image_url` replaced it.
    #[tracing::instrument(skip(self, input), fields(user_id = actor.id))]
    pub async fn update(
        &self,
        actor: Actor,
        id: i64,
        mut input: RecipeInput,
    ) -> cookbook_shared::Result<(RecipeView, Option<String>)> {
        let recipe = self.load(id).await?;
        if !actor.can_modify(recipe.user_id) {
            cookbook_shared::forbidden!("This action is unauthorized.");
        }

        input.normalize();
        self.validate_recipe(&input, false).await?;

        let mut statement = Query::update()
            .table(Recipe::Table)
            .value(Recipe::UpdatedAt, cookbook_shared::now())
            .and_where(Expr::col(Recipe::Id).eq(id))
            .to_owned();

        if let Some(category_id) = input.category_id {
            statement.value(Recipe::CategoryId, category_id);
        }
        if let Some(title) = input.title {
            statement.value(Recipe::Title, title);
        }
        if let Some(description) = input.description {
            statement.value(Recipe::Description, description);
        }
        if let Some(ingredients) = input.ingredients {
            statement.value(Recipe::Ingredients, serde_json::to_string(&ingredients)?);
        }
        if let Some(instructions) = input.instructions {
            statement.value(Recipe::Instructions, instructions);
        }
        if let Some(cooking_time) = input.cooking_time {
            statement.value(Recipe::CookingTime, cooking_time);
        }
        if let Some(servings) = input.servings {
            statement.value(Recipe::Servings, servings);
        }
        if let Some(difficulty) = input.difficulty {
            statement.value(Recipe::Difficulty, difficulty);
        }

        let mut replaced = None;
        if let Some(image_url) = input.image_url {
            replaced = recipe.image.filter(|image| !image.is_empty() && *image != image_url);
            statement.value(Recipe::Image, image_url);
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        Ok((self.load(id).await?, replaced))
    }

    /// Deletes a recipe owned by the actor, or any recipe for admins.
    /// Returns the image reference so the caller can remove the file.
    #[tracing::instrument(skip(self), fields(user_id = actor.id))]
    pub async fn delete(&self, actor: Actor, id: i64) -> cookbook_shared::Result<Option<String>> {
        let recipe = self.load(id).await?;
        if !actor.can_modify(recipe.user_id) {
            cookbook_shared::forbidden!("Forbidden. You can only delete your own recipes.");
        }

        self.delete_row(id).await?;

        Ok(recipe.image.filter(|image| !image.is_empty()))
    }

    pub async fn admin_delete(&self, id: i64) -> cookbook_shared::Result<Option<String>> {
        let recipe = self.load(id).await?;
        self.delete_row(id).await?;

        Ok(recipe.image.filter(|image| !image.is_empty()))
    }

    async fn delete_row(&self, id: i64) -> cookbook_shared::Result<()> {
        let statement = Query::delete()
            .from_table(Recipe::Table)
            .and_where(Expr::col(Recipe::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        tracing::info!(recipe_id = id, "recipe deleted");

        Ok(())
    }

    pub async fn increment_views(&self, id: i64) -> cookbook_shared::Result<i64> {
        let statement = Query::update()
            .table(Recipe::Table)
            .value(Recipe::ViewsCount, Expr::col(Recipe::ViewsCount).add(1))
            .value(Recipe::UpdatedAt, cookbook_shared::now())
            .and_where(Expr::col(Recipe::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(&self.write_db).await?;
        if result.rows_affected() == 0 {
            cookbook_shared::not_found!("Recipe not found.");
        }

        let statement = Query::select()
            .column(Recipe::ViewsCount)
            .from(Recipe::Table)
            .and_where(Expr::col(Recipe::Id).eq(id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let (views_count,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.write_db)
            .await?;

        Ok(views_count)
    }
}
