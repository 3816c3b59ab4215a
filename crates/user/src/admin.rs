//! User management for administrators.

use cookbook_db::table::{Field, User};
use cookbook_shared::{
    SortOrder,
    pagination::{Page, PageRequest},
};
use sea_query::{Cond, Expr, ExprTrait, Func, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use sqlx::prelude::FromRow;
use validator::Validate;

use crate::repository::{self, UpdateInput};

pub const DEFAULT_PER_PAGE: u64 = 20;
pub const MAX_PER_PAGE: u64 = 100;

#[derive(FromRow, Debug, Clone)]
pub struct UserAdminRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub email_verified_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
    pub recipes_count: i64,
    pub comments_count: i64,
    pub likes_count: i64,
}

#[derive(Debug, Default, Clone)]
pub struct ListInput {
    pub search: Option<String>,
    pub is_admin: Option<bool>,
    pub sort_by: Option<String>,
    pub sort_order: Option<String>,
    pub page: PageRequest,
}

#[derive(Validate, Deserialize, Default, Debug)]
#[serde(default)]
pub struct UpdateUserInput {
    #[validate(length(
        min = 1,
        max = 255,
        message = "The name field must be a string between 1 and 255 characters."
    ))]
    pub name: Option<String>,
    #[validate(
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not be greater than 255 characters.")
    )]
    pub email: Option<String>,
    pub is_admin: Option<bool>,
}

fn select_with_counts() -> SelectStatement {
    Query::select()
        .columns([
            (User::Table, User::Id),
            (User::Table, User::Name),
            (User::Table, User::Email),
            (User::Table, User::IsAdmin),
            (User::Table, User::EmailVerifiedAt),
            (User::Table, User::CreatedAt),
            (User::Table, User::UpdatedAt),
        ])
        .expr_as(count_of("recipe", "user_id"), Field::RecipesCount)
        .expr_as(count_of("comment", "user_id"), Field::CommentsCount)
        .expr_as(count_of("recipe_like", "user_id"), Field::LikesCount)
        .from(User::Table)
        .to_owned()
}

fn count_of(table: &str, column: &str) -> Expr {
    Expr::cust(format!(
        r#"(SELECT COUNT(*) FROM "{table}" WHERE "{table}"."{column}" = "user"."id")"#
    ))
}

fn apply_filters(statement: &mut SelectStatement, input: &ListInput) {
    if let Some(search) = input.search.as_deref().filter(|s| !s.is_empty()) {
        let pattern = format!("%{search}%");
        statement.cond_where(
            Cond::any()
                .add(Expr::col((User::Table, User::Name)).like(pattern.to_owned()))
                .add(Expr::col((User::Table, User::Email)).like(pattern)),
        );
    }

    if let Some(is_admin) = input.is_admin {
        statement.and_where(Expr::col((User::Table, User::IsAdmin)).eq(is_admin));
    }
}

fn apply_sorting(statement: &mut SelectStatement, input: &ListInput) {
    let order = SortOrder::asc_or_desc(input.sort_order.as_deref()).to_order();
    match input.sort_by.as_deref().unwrap_or("created_at") {
        "name" => statement.order_by((User::Table, User::Name), order),
        "email" => statement.order_by((User::Table, User::Email), order),
        "created_at" => statement.order_by((User::Table, User::CreatedAt), order),
        "recipes_count" => statement.order_by(Field::RecipesCount, order),
        "comments_count" => statement.order_by(Field::CommentsCount, order),
        _ => statement.order_by((User::Table, User::CreatedAt), sea_query::Order::Desc),
    };

    statement.order_by((User::Table, User::Id), sea_query::Order::Asc);
}

impl crate::Command {
    pub async fn admin_list(&self, input: ListInput) -> cookbook_shared::Result<Page<UserAdminRow>> {
        let mut count = Query::select()
            .expr(Func::count(Expr::col((User::Table, User::Id))))
            .from(User::Table)
            .to_owned();
        apply_filters(&mut count, &input);

        let (sql, values) = count.build_sqlx(SqliteQueryBuilder);
        let (total,) = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
            .fetch_one(&self.read_db)
            .await?;

        let mut statement = select_with_counts();
        apply_filters(&mut statement, &input);
        apply_sorting(&mut statement, &input);
        statement
            .limit(input.page.per_page)
            .offset(input.page.offset());

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, UserAdminRow, _>(&sql, values)
            .fetch_all(&self.read_db)
            .await?;

        Ok(Page::new(rows, total as u64, input.page))
    }

    pub async fn find_with_counts(&self, id: i64) -> cookbook_shared::Result<Option<UserAdminRow>> {
        let statement = select_with_counts()
            .and_where(Expr::col((User::Table, User::Id)).eq(id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, UserAdminRow, _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?)
    }

    pub async fn admin_update(
        &self,
        id: i64,
        input: UpdateUserInput,
    ) -> cookbook_shared::Result<UserAdminRow> {
        input.validate()?;

        if self.find(id).await?.is_none() {
            cookbook_shared::not_found!("User not found.");
        }

        let email = input.email.map(|email| email.to_lowercase());
        if let Some(email) = email.as_deref() {
            if repository::is_email_taken(&self.read_db, email, Some(id)).await? {
                cookbook_shared::invalid!("email", "The email has already been taken.");
            }
        }

        repository::update(
            &self.write_db,
            UpdateInput {
                id,
                name: input.name,
                email,
                password: None,
                is_admin: input.is_admin,
            },
        )
        .await?;

        let Some(user) = self.find_with_counts(id).await? else {
            cookbook_shared::not_found!("User not found.");
        };

        Ok(user)
    }

    /// Deletes a user and everything they own. Returns the image references
    /// of their recipes so the caller can remove the files.
    pub async fn admin_delete(&self, actor_id: i64, id: i64) -> cookbook_shared::Result<Vec<String>> {
        if actor_id == id {
            cookbook_shared::forbidden!("Cannot delete yourself.");
        }

        if self.find(id).await?.is_none() {
            cookbook_shared::not_found!("User not found.");
        }

        let images = repository::recipe_images(&self.read_db, id).await?;
        repository::delete(&self.write_db, id).await?;

        tracing::info!(user_id = id, actor_id, "user deleted");

        Ok(images)
    }
}
