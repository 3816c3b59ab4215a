use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{AccessToken, User};

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(AccessToken::Table)
        .col(
            ColumnDef::new(AccessToken::Id)
                .string()
                .string_len(26)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(AccessToken::UserId).integer().not_null())
        .col(ColumnDef::new(AccessToken::CreatedAt).big_integer().not_null())
        .col(ColumnDef::new(AccessToken::LastUsedAt).big_integer().null())
        .foreign_key(
            ForeignKey::create()
                .name("fk_access_token_user")
                .from(AccessToken::Table, AccessToken::UserId)
                .to(User::Table, User::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(AccessToken::Table).to_owned()
}

#[async_trait::async_trait]
impl sqlx_migrator::Operation<sqlx::Sqlite> for CreateTable {
    async fn up(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statment = create_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }

    async fn down(
        &self,
        connection: &mut sqlx::SqliteConnection,
    ) -> Result<(), sqlx_migrator::Error> {
        let statment = drop_table().to_string(sea_query::SqliteQueryBuilder);
        sqlx::query(&statment).execute(connection).await?;

        Ok(())
    }
}
