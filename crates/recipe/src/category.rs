use cookbook_db::table::{Category, Field, Recipe};
use cookbook_shared::{
    SortOrder, add_field_error,
    pagination::{Page, PageRequest},
    slugify,
};
use sea_query::{Expr, ExprTrait, Func, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use sqlx::prelude::FromRow;
use validator::{Validate, ValidationErrors};

use crate::recipe::{RecipeView, select as select_recipes};

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

/// Recipes embedded in the category detail.
const LATEST_RECIPES: u64 = 20;

#[derive(FromRow, Debug, Clone)]
pub struct CategoryRow {
    pub id: i64,
    pub name: String,
    pub slug: String,
    pub created_at: i64,
    pub updated_at: i64,
    pub recipes_count: i64,
}

#[derive(Debug, Clone)]
pub struct CategoryDetail {
    pub category: CategoryRow,
    pub recipes: Vec<RecipeView>,
}

#[derive(Debug, Default, Clone)]
pub struct ListInput {
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: PageRequest,
}

#[derive(Validate, Deserialize, Default, Debug, Clone)]
#[serde(default)]
pub struct CategoryInput {
    #[validate(length(
        max = 255,
        message = "The name field must not be greater than 255 characters."
    ))]
    pub name: Option<String>,
    #[validate(length(
        max = 255,
        message = "The slug field must not be greater than 255 characters."
    ))]
    pub slug: Option<String>,
}

fn select() -> SelectStatement {
    Query::select()
        .columns([
            (Category::Table, Category::Id),
            (Category::Table, Category::Name),
            (Category::Table, Category::Slug),
            (Category::Table, Category::CreatedAt),
            (Category::Table, Category::UpdatedAt),
        ])
        .expr_as(
            Expr::cust(r#"(SELECT COUNT(*) FROM "recipe" WHERE "recipe"."category_id" = "category"."id")"#),
            Field::RecipesCount,
        )
        .from(Category::Table)
        .to_owned()
}

impl crate::Command {
    pub async fn list_categories(&self, input: ListInput) -> cookbook_shared::Result<Page<CategoryRow>> {
        let statement = Query::select()
            .expr(Func::count(Expr::col(Category::Id)))
            .from(Category::Table)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        let order = SortOrder::desc_or_asc(input.sort_order.as_deref()).to_order();
        let mut statement = select();
        match input.sort_by.as_deref() {
            Some("created_at") => statement.order_by((Category::Table, Category::CreatedAt), order),
            Some("recipes_count") => statement.order_by(Field::RecipesCount, order),
            _ => statement.order_by((Category::Table, Category::Name), order),
        };

        statement
            .order_by((Category::Table, Category::Id), Order::Asc)
            .limit(input.page.per_page)
            .offset(input.page.offset());

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, CategoryRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(Page::new(rows, total as u64, input.page))
    }

    pub async fn find_category(&self, id: i64) -> cookbook_shared::Result<Option<CategoryRow>> {
        let statement = select()
            .and_where(Expr::col((Category::Table, Category::Id)).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, CategoryRow, _>(&sql, values)
            .fetch_optional(&self.write_db)
            .await?)
    }

    /// Category with its latest recipes.
    pub async fn category_detail(&self, id: i64) -> cookbook_shared::Result<Option<CategoryDetail>> {
        let Some(category) = self.find_category(id).await? else {
            return Ok(None);
        };

        let statement = select_recipes()
            .and_where(Expr::col((Recipe::Table, Recipe::CategoryId)).eq(id))
            .order_by((Recipe::Table, Recipe::CreatedAt), Order::Desc)
            .order_by((Recipe::Table, Recipe::Id), Order::Desc)
            .limit(LATEST_RECIPES)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let recipes = sqlx::query_as_with::<_, RecipeView, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(Some(CategoryDetail { category, recipes }))
    }

    async fn is_category_taken(
        &self,
        column: Category,
        value: &str,
        except_id: Option<i64>,
    ) -> cookbook_shared::Result<bool> {
        let mut statement = Query::select()
            .column(Category::Id)
            .from(Category::Table)
            .and_where(Expr::col(column).eq(value))
            .to_owned();

        if let Some(id) = except_id {
            statement.and_where(Expr::col(Category::Id).ne(id));
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_optional(&self.write_db)
            .await?;

        Ok(row.is_some())
    }

    async fn validate_category(
        &self,
        input: &CategoryInput,
        except_id: Option<i64>,
    ) -> cookbook_shared::Result<()> {
        let mut errors = match input.validate() {
            Ok(()) => ValidationErrors::new(),
            Err(errors) => errors,
        };

        if except_id.is_none() && input.name.as_deref().is_none_or(|n| n.trim().is_empty()) {
            add_field_error(&mut errors, "name", "required", "The name field is required.");
        }

        if let Some(name) = input.name.as_deref() {
            if self.is_category_taken(Category::Name, name, except_id).await? {
                add_field_error(&mut errors, "name", "unique", "The name has already been taken.");
            }
        }

        if let Some(slug) = input.slug.as_deref() {
            if self.is_category_taken(Category::Slug, slug, except_id).await? {
                add_field_error(&mut errors, "slug", "unique", "The slug has already been taken.");
            }
        }

        if !errors.is_empty() {
            return Err(errors.into());
        }

        Ok(())
    }

    pub async fn create_category(&self, input: CategoryInput) -> cookbook_shared::Result<CategoryRow> {
        self.validate_category(&input, None).await?;

        let name = input.name.unwrap_or_default();
        let slug = input
            .slug
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| slugify(&name));
        let now = cookbook_shared::now();

        let statement = Query::insert()
            .into_table(Category::Table)
            .columns([
                Category::Name,
                Category::Slug,
                Category::CreatedAt,
                Category::UpdatedAt,
            ])
            .values_panic([name.into(), slug.into(), now.into(), now.into()])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let id = sqlx::query_with(&sql, values)
            .execute(&self.write_db)
            .await?
            .last_insert_rowid();

        match self.find_category(id).await? {
            Some(category) => Ok(category),
            None => cookbook_shared::bail!("category {id} not found after create"),
        }
    }

    /// Renaming without an explicit slug regenerates the slug.
    pub async fn update_category(
        &self,
        id: i64,
        input: CategoryInput,
    ) -> cookbook_shared::Result<CategoryRow> {
        if self.find_category(id).await?.is_none() {
            cookbook_shared::not_found!("Category not found.");
        }

        self.validate_category(&input, Some(id)).await?;

        let mut statement = Query::update()
            .table(Category::Table)
            .value(Category::UpdatedAt, cookbook_shared::now())
            .and_where(Expr::col(Category::Id).eq(id))
            .to_owned();

        let slug = match (&input.name, input.slug.filter(|s| !s.is_empty())) {
            (_, Some(slug)) => Some(slug),
            (Some(name), None) => Some(slugify(name)),
            (None, None) => None,
        };

        if let Some(name) = input.name {
            statement.value(Category::Name, name);
        }
        if let Some(slug) = slug {
            statement.value(Category::Slug, slug);
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        match self.find_category(id).await? {
            Some(category) => Ok(category),
            None => cookbook_shared::not_found!("Category not found."),
        }
    }

    /// Deletes a category. Its recipes lose their category.
    pub async fn delete_category(&self, id: i64) -> cookbook_shared::Result<()> {
        if self.find_category(id).await?.is_none() {
            cookbook_shared::not_found!("Category not found.");
        }

        let mut tx = self.write_db.begin().await?;

        let (sql, values) = Query::update()
            .table(Recipe::Table)
            .value(Recipe::CategoryId, Option::<i64>::None)
            .and_where(Expr::col(Recipe::CategoryId).eq(id))
            .build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        let (sql, values) = Query::delete()
            .from_table(Category::Table)
            .and_where(Expr::col(Category::Id).eq(id))
            .build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        tx.commit().await?;

        Ok(())
    }
}
