use cookbook_db::table::{Category, Field, Recipe, RecipeLike, User};
use cookbook_shared::Difficulty;
use sea_query::{Expr, ExprTrait, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};

#[derive(FromRow, Debug, Clone)]
pub struct RecipeView {
    pub id: i64,
    pub user_id: i64,
    pub category_id: Option<i64>,
    pub title: String,
    pub description: String,
    pub ingredients: sqlx::types::Json<Vec<String>>,
    pub instructions: String,
    pub image: Option<String>,
    pub cooking_time: i64,
    pub servings: i64,
    pub difficulty: sqlx::types::Text<Difficulty>,
    pub views_count: i64,
    pub likes_count: i64,
    pub comments_count: i64,
    pub user_name: String,
    pub category_name: Option<String>,
    pub category_slug: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
    #[sqlx(skip)]
    pub is_liked: Option<bool>,
}

fn count_of(table: &str) -> Expr {
    Expr::cust(format!(
        r#"(SELECT COUNT(*) FROM "{table}" WHERE "{table}"."recipe_id" = "recipe"."id")"#
    ))
}

/// Recipe columns joined with author, category and aggregate counts.
pub(crate) fn select() -> SelectStatement {
    Query::select()
        .columns([
            (Recipe::Table, Recipe::Id),
            (Recipe::Table, Recipe::UserId),
            (Recipe::Table, Recipe::CategoryId),
            (Recipe::Table, Recipe::Title),
            (Recipe::Table, Recipe::Description),
            (Recipe::Table, Recipe::Ingredients),
            (Recipe::Table, Recipe::Instructions),
            (Recipe::Table, Recipe::Image),
            (Recipe::Table, Recipe::CookingTime),
            (Recipe::Table, Recipe::Servings),
            (Recipe::Table, Recipe::Difficulty),
            (Recipe::Table, Recipe::ViewsCount),
            (Recipe::Table, Recipe::CreatedAt),
            (Recipe::Table, Recipe::UpdatedAt),
        ])
        .expr_as(count_of("recipe_like"), Field::LikesCount)
        .expr_as(count_of("comment"), Field::CommentsCount)
        .expr_as(Expr::col((User::Table, User::Name)), Field::UserName)
        .expr_as(Expr::col((Category::Table, Category::Name)), Field::CategoryName)
        .expr_as(Expr::col((Category::Table, Category::Slug)), Field::CategorySlug)
        .from(Recipe::Table)
        .inner_join(
            User::Table,
            Expr::col((User::Table, User::Id)).equals((Recipe::Table, Recipe::UserId)),
        )
        .left_join(
            Category::Table,
            Expr::col((Category::Table, Category::Id)).equals((Recipe::Table, Recipe::CategoryId)),
        )
        .to_owned()
}

pub(crate) async fn find(pool: &SqlitePool, id: i64) -> cookbook_shared::Result<Option<RecipeView>> {
    let statement = select()
        .and_where(Expr::col((Recipe::Table, Recipe::Id)).eq(id))
        .limit(1)
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RecipeView, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

/// Fills `is_liked` for every recipe in `rows` with one query.
pub(crate) async fn mark_liked(
    pool: &SqlitePool,
    user_id: i64,
    rows: &mut [RecipeView],
) -> cookbook_shared::Result<()> {
    if rows.is_empty() {
        return Ok(());
    }

    let ids: Vec<i64> = rows.iter().map(|r| r.id).collect();
    let statement = Query::select()
        .column(RecipeLike::RecipeId)
        .from(RecipeLike::Table)
        .and_where(Expr::col(RecipeLike::UserId).eq(user_id))
        .and_where(Expr::col(RecipeLike::RecipeId).is_in(ids))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let liked: Vec<(i64,)> = sqlx::query_as_with(&sql, values).fetch_all(pool).await?;

    for row in rows.iter_mut() {
        row.is_liked = Some(liked.iter().any(|(id,)| *id == row.id));
    }

    Ok(())
}
