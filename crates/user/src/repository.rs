use cookbook_db::table::{AccessToken, Recipe, User};
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};

#[derive(FromRow, Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
    pub email_verified_at: Option<i64>,
    pub created_at: i64,
    pub updated_at: i64,
}

pub enum FindType {
    Id(i64),
    Email(String),
}

pub(crate) async fn find(
    pool: &SqlitePool,
    arg_type: FindType,
) -> cookbook_shared::Result<Option<UserRow>> {
    let mut statement = Query::select()
        .columns([
            User::Id,
            User::Name,
            User::Email,
            User::Password,
            User::IsAdmin,
            User::EmailVerifiedAt,
            User::CreatedAt,
            User::UpdatedAt,
        ])
        .from(User::Table)
        .limit(1)
        .to_owned();

    match arg_type {
        FindType::Id(id) => statement.and_where(Expr::col(User::Id).eq(id)),
        FindType::Email(email) => {
            statement.and_where(Expr::col(User::Email).eq(email.to_lowercase()))
        }
    };

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

    Ok(sqlx::query_as_with::<_, UserRow, _>(&sql, values)
        .fetch_optional(pool)
        .await?)
}

pub(crate) struct CreateInput {
    pub name: String,
    pub email: String,
    pub password: String,
    pub is_admin: bool,
}

pub(crate) async fn create(pool: &SqlitePool, input: CreateInput) -> cookbook_shared::Result<i64> {
    let now = cookbook_shared::now();
    let statement = Query::insert()
        .into_table(User::Table)
        .columns([
            User::Name,
            User::Email,
            User::Password,
            User::IsAdmin,
            User::CreatedAt,
            User::UpdatedAt,
        ])
        .values_panic([
            input.name.into(),
            input.email.into(),
            input.password.into(),
            input.is_admin.into(),
            now.into(),
            now.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.last_insert_rowid())
}

#[derive(Default)]
pub(crate) struct UpdateInput {
    pub id: i64,
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub is_admin: Option<bool>,
}

pub(crate) async fn update(pool: &SqlitePool, input: UpdateInput) -> cookbook_shared::Result<()> {
    let mut statement = Query::update()
        .table(User::Table)
        .value(User::UpdatedAt, cookbook_shared::now())
        .and_where(Expr::col(User::Id).eq(input.id))
        .to_owned();

    if let Some(name) = input.name {
        statement.value(User::Name, name);
    }

    if let Some(email) = input.email {
        statement.value(User::Email, email);
    }

    if let Some(password) = input.password {
        statement.value(User::Password, password);
    }

    if let Some(is_admin) = input.is_admin {
        statement.value(User::IsAdmin, is_admin);
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

/// True when another user already owns `email`.
pub(crate) async fn is_email_taken(
    pool: &SqlitePool,
    email: &str,
    except_id: Option<i64>,
) -> cookbook_shared::Result<bool> {
    let mut statement = Query::select()
        .column(User::Id)
        .from(User::Table)
        .and_where(Expr::col(User::Email).eq(email.to_lowercase()))
        .to_owned();

    if let Some(id) = except_id {
        statement.and_where(Expr::col(User::Id).ne(id));
    }

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let row = sqlx::query_as_with::<_, (i64,), _>(&sql, values)
        .fetch_optional(pool)
        .await?;

    Ok(row.is_some())
}

pub(crate) async fn recipe_images(
    pool: &SqlitePool,
    user_id: i64,
) -> cookbook_shared::Result<Vec<String>> {
    let statement = Query::select()
        .column(Recipe::Image)
        .from(Recipe::Table)
        .and_where(Expr::col(Recipe::UserId).eq(user_id))
        .and_where(Expr::col(Recipe::Image).is_not_null())
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let rows = sqlx::query_as_with::<_, (String,), _>(&sql, values)
        .fetch_all(pool)
        .await?;

    Ok(rows
        .into_iter()
        .map(|(image,)| image)
        .filter(|image| !image.is_empty())
        .collect())
}

pub(crate) async fn delete(pool: &SqlitePool, id: i64) -> cookbook_shared::Result<()> {
    let statement = Query::delete()
        .from_table(User::Table)
        .and_where(Expr::col(User::Id).eq(id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(())
}

pub(crate) async fn delete_access_tokens(
    pool: &SqlitePool,
    user_id: i64,
) -> cookbook_shared::Result<u64> {
    let statement = Query::delete()
        .from_table(AccessToken::Table)
        .and_where(Expr::col(AccessToken::UserId).eq(user_id))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected())
}
