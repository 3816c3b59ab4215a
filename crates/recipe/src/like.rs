use cookbook_db::table::{Recipe, RecipeLike};
use cookbook_shared::pagination::{Page, PageRequest};
use sea_query::{Expr, ExprTrait, Func, OnConflict, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;

use crate::recipe::{RecipeView, select as select_recipes};

pub const DEFAULT_PER_PAGE: u64 = 15;
pub const MAX_PER_PAGE: u64 = 50;

impl crate::Command {
    pub async fn is_liked(&self, user_id: i64, recipe_id: i64) -> cookbook_shared::Result<bool> {
        self.ensure_recipe(recipe_id).await?;
        self.has_like(user_id, recipe_id).await
    }

    async fn has_like(&self, user_id: i64, recipe_id: i64) -> cookbook_shared::Result<bool> {
        let statement = Query::select()
            .column(RecipeLike::Id)
            .from(RecipeLike::Table)
            .and_where(Expr::col(RecipeLike::UserId).eq(user_id))
            .and_where(Expr::col(RecipeLike::RecipeId).eq(recipe_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_optional(&self.write_db)
            .await?;

        Ok(row.is_some())
    }

    pub async fn count_likes(&self, recipe_id: i64) -> cookbook_shared::Result<i64> {
        self.ensure_recipe(recipe_id).await?;
        self.likes_count(recipe_id).await
    }

    async fn likes_count(&self, recipe_id: i64) -> cookbook_shared::Result<i64> {
        let statement = Query::select()
            .expr(Func::count(Expr::col(RecipeLike::Id)))
            .from(RecipeLike::Table)
            .and_where(Expr::col(RecipeLike::RecipeId).eq(recipe_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let (count,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.write_db)
            .await?;

        Ok(count)
    }

    /// Inserts the like unless it exists. Returns whether a row was added.
    async fn insert_like(&self, user_id: i64, recipe_id: i64) -> cookbook_shared::Result<bool> {
        let statement = Query::insert()
            .into_table(RecipeLike::Table)
            .columns([
                RecipeLike::UserId,
                RecipeLike::RecipeId,
                RecipeLike::CreatedAt,
            ])
            .values_panic([
                user_id.into(),
                recipe_id.into(),
                cookbook_shared::now().into(),
            ])
            .on_conflict(
                OnConflict::columns([RecipeLike::UserId, RecipeLike::RecipeId])
                    .do_nothing()
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        Ok(result.rows_affected() > 0)
    }

    async fn delete_like(&self, user_id: i64, recipe_id: i64) -> cookbook_shared::Result<u64> {
        let statement = Query::delete()
            .from_table(RecipeLike::Table)
            .and_where(Expr::col(RecipeLike::UserId).eq(user_id))
            .and_where(Expr::col(RecipeLike::RecipeId).eq(recipe_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        Ok(result.rows_affected())
    }

    /// Adds a like and returns the new likes count.
    pub async fn like(&self, user_id: i64, recipe_id: i64) -> cookbook_shared::Result<i64> {
        self.ensure_recipe(recipe_id).await?;

        if !self.insert_like(user_id, recipe_id).await? {
            cookbook_shared::conflict!("Already liked");
        }

        self.likes_count(recipe_id).await
    }

    /// Removes a like and returns the new likes count.
    pub async fn unlike(&self, user_id: i64, recipe_id: i64) -> cookbook_shared::Result<i64> {
        self.ensure_recipe(recipe_id).await?;

        if self.delete_like(user_id, recipe_id).await? == 0 {
            cookbook_shared::not_found!("Recipe not in liked list");
        }

        self.likes_count(recipe_id).await
    }

    /// Flips the like state. Returns whether the recipe is now liked and the
    /// likes count.
    pub async fn toggle_like(
        &self,
        user_id: i64,
        recipe_id: i64,
    ) -> cookbook_shared::Result<(bool, i64)> {
        self.ensure_recipe(recipe_id).await?;

        // A like added concurrently between the two statements still counts
        // as liked.
        let is_liked = if self.delete_like(user_id, recipe_id).await? > 0 {
            false
        } else {
            self.insert_like(user_id, recipe_id).await?;
            true
        };

        Ok((is_liked, self.likes_count(recipe_id).await?))
    }

    /// Recipes liked by the user, most recently liked first.
    pub async fn liked_recipes(
        &self,
        user_id: i64,
        page: PageRequest,
    ) -> cookbook_shared::Result<Page<RecipeView>> {
        let (sql, values) = Query::select()
            .expr(Func::count(Expr::col(RecipeLike::Id)))
            .from(RecipeLike::Table)
            .and_where(Expr::col(RecipeLike::UserId).eq(user_id))
            .build_sqlx(SqliteQueryBuilder);
        let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        let (sql, values) = select_recipes()
            .inner_join(
                RecipeLike::Table,
                Expr::col((RecipeLike::Table, RecipeLike::RecipeId))
                    .equals((Recipe::Table, Recipe::Id)),
            )
            .and_where(Expr::col((RecipeLike::Table, RecipeLike::UserId)).eq(user_id))
            .order_by((RecipeLike::Table, RecipeLike::CreatedAt), Order::Desc)
            .order_by((RecipeLike::Table, RecipeLike::Id), Order::Desc)
            .limit(page.per_page)
            .offset(page.offset())
            .build_sqlx(SqliteQueryBuilder);

        let mut rows = sqlx::query_as_with::<_, RecipeView, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        for row in rows.iter_mut() {
            row.is_liked = Some(true);
        }

        Ok(Page::new(rows, total as u64, page))
    }
}
