use std::str::FromStr;

use cookbook_db::table::{Field, Recipe};
use cookbook_shared::{
    Difficulty, SortOrder,
    pagination::{Page, PageRequest},
};
use sea_query::{Cond, Expr, ExprTrait, Func, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;

use super::{RecipeView, mark_liked, select};

pub const DEFAULT_PER_PAGE: u64 = 15;
pub const MAX_PER_PAGE: u64 = 50;
pub const ADMIN_DEFAULT_PER_PAGE: u64 = 20;
pub const ADMIN_MAX_PER_PAGE: u64 = 100;

#[derive(Debug, Default, Clone)]
pub struct ListInput {
    pub search: Option<String>,
    pub category_id: Option<i64>,
    pub difficulty: Option<String>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: PageRequest,
    pub viewer: Option<i64>,
}

#[derive(Debug, Default, Clone)]
pub struct AdminListInput {
    pub search: Option<String>,
    pub user_id: Option<i64>,
    pub category_id: Option<i64>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: PageRequest,
}

fn apply_public_filters(statement: &mut SelectStatement, input: &ListInput) {
    if let Some(search) = input.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        statement.cond_where(
            Cond::any()
                .add(Expr::col((Recipe::Table, Recipe::Title)).like(pattern.to_owned()))
                .add(Expr::col((Recipe::Table, Recipe::Description)).like(pattern)),
        );
    }

    if let Some(category_id) = input.category_id {
        statement.and_where(Expr::col((Recipe::Table, Recipe::CategoryId)).eq(category_id));
    }

    let difficulty = input
        .difficulty
        .as_deref()
        .and_then(|d| Difficulty::from_str(d).ok());

    if let Some(difficulty) = difficulty {
        statement.and_where(Expr::col((Recipe::Table, Recipe::Difficulty)).eq(difficulty.to_string()));
    }
}

fn apply_admin_filters(statement: &mut SelectStatement, input: &AdminListInput) {
    if let Some(search) = input.search.as_deref().filter(|s| !s.is_empty()) {
        statement.and_where(Expr::col((Recipe::Table, Recipe::Title)).like(format!("%{search}%")));
    }

    if let Some(user_id) = input.user_id {
        statement.and_where(Expr::col((Recipe::Table, Recipe::UserId)).eq(user_id));
    }

    if let Some(category_id) = input.category_id {
        statement.and_where(Expr::col((Recipe::Table, Recipe::CategoryId)).eq(category_id));
    }
}

async fn count(pool: &SqlitePool, mut statement: SelectStatement) -> cookbook_shared::Result<u64> {
    statement
        .expr(Func::count(Expr::col((Recipe::Table, Recipe::Id))))
        .from(Recipe::Table);

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_one(pool)
        .await?;

    Ok(total as u64)
}

async fn fetch(
    pool: &SqlitePool,
    statement: &mut SelectStatement,
    page: PageRequest,
) -> cookbook_shared::Result<Vec<RecipeView>> {
    statement
        .order_by((Recipe::Table, Recipe::Id), Order::Asc)
        .limit(page.per_page)
        .offset(page.offset());

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, RecipeView, _>(&sql, values)
        .fetch_all(pool)
        .await?)
}

impl crate::Command {
    /// Public recipe listing. An unknown `sort_by` keeps the natural id order.
    pub async fn list(&self, input: ListInput) -> cookbook_shared::Result<Page<RecipeView>> {
        let mut filter = Query::select();
        apply_public_filters(&mut filter, &input);
        let total = count(&self.read_db, filter).await?;

        let mut statement = select();
        apply_public_filters(&mut statement, &input);

        let order = SortOrder::asc_or_desc(input.sort_order.as_deref()).to_order();
        match input.sort_by.as_deref().unwrap_or("created_at") {
            "views_count" => {
                statement.order_by((Recipe::Table, Recipe::ViewsCount), order);
            }
            "created_at" => {
                statement.order_by((Recipe::Table, Recipe::CreatedAt), order);
            }
            "title" => {
                statement.order_by((Recipe::Table, Recipe::Title), order);
            }
            "likes_count" => {
                statement.order_by(Field::LikesCount, order);
            }
            "comments_count" => {
                statement.order_by(Field::CommentsCount, order);
            }
            _ => {}
        }

        let mut rows = fetch(&self.read_db, &mut statement, input.page).await?;
        if let Some(user_id) = input.viewer {
            mark_liked(&self.read_db, user_id, &mut rows).await?;
        }

        Ok(Page::new(rows, total, input.page))
    }

    pub async fn admin_list(&self, input: AdminListInput) -> cookbook_shared::Result<Page<RecipeView>> {
        let mut filter = Query::select();
        apply_admin_filters(&mut filter, &input);
        let total = count(&self.read_db, filter).await?;

        let mut statement = select();
        apply_admin_filters(&mut statement, &input);

        let order = SortOrder::asc_or_desc(input.sort_order.as_deref()).to_order();
        match input.sort_by.as_deref().unwrap_or("created_at") {
            "title" => statement.order_by((Recipe::Table, Recipe::Title), order),
            "created_at" => statement.order_by((Recipe::Table, Recipe::CreatedAt), order),
            "views_count" => statement.order_by((Recipe::Table, Recipe::ViewsCount), order),
            "updated_at" => statement.order_by((Recipe::Table, Recipe::UpdatedAt), order),
            _ => statement.order_by((Recipe::Table, Recipe::CreatedAt), Order::Desc),
        };

        let rows = fetch(&self.read_db, &mut statement, input.page).await?;

        Ok(Page::new(rows, total, input.page))
    }
}
