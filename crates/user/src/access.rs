use cookbook_db::table::AccessToken;
use sea_query::{Expr, ExprTrait, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::prelude::FromRow;
use ulid::Ulid;

use crate::repository::{self, FindType, UserRow};

#[derive(FromRow, Debug, Clone)]
pub struct AccessRow {
    pub id: String,
    pub user_id: i64,
    pub created_at: i64,
    pub last_used_at: Option<i64>,
}

impl super::Command {
    /// Stores a new access id for the user. The id becomes the token `jti`.
    pub async fn issue_access(&self, user_id: i64) -> cookbook_shared::Result<String> {
        let id = Ulid::new().to_string();
        let statement = Query::insert()
            .into_table(AccessToken::Table)
            .columns([AccessToken::Id, AccessToken::UserId, AccessToken::CreatedAt])
            .values_panic([
                id.to_owned().into(),
                user_id.into(),
                cookbook_shared::now().into(),
            ])
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        Ok(id)
    }

    pub async fn revoke_access(&self, access_id: impl Into<String>) -> cookbook_shared::Result<()> {
        let statement = Query::delete()
            .from_table(AccessToken::Table)
            .and_where(Expr::col(AccessToken::Id).eq(access_id.into()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        Ok(())
    }

    pub async fn revoke_all_access(&self, user_id: i64) -> cookbook_shared::Result<u64> {
        repository::delete_access_tokens(&self.write_db, user_id).await
    }

    /// Resolves a live access id to its user and records the use.
    pub async fn find_access(
        &self,
        access_id: impl Into<String>,
    ) -> cookbook_shared::Result<Option<(AccessRow, UserRow)>> {
        let access_id = access_id.into();
        let statement = Query::select()
            .columns([
                AccessToken::Id,
                AccessToken::UserId,
                AccessToken::CreatedAt,
                AccessToken::LastUsedAt,
            ])
            .from(AccessToken::Table)
            .and_where(Expr::col(AccessToken::Id).eq(access_id.to_owned()))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let Some(access) = sqlx::query_as_with::<_, AccessRow, _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?
        else {
            return Ok(None);
        };

        let Some(user) = repository::find(&self.read_db, FindType::Id(access.user_id)).await?
        else {
            return Ok(None);
        };

        let statement = Query::update()
            .table(AccessToken::Table)
            .value(AccessToken::LastUsedAt, cookbook_shared::now())
            .and_where(Expr::col(AccessToken::Id).eq(access_id))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        Ok(Some((access, user)))
    }
}
