use sea_query::{ColumnDef, Table, TableCreateStatement, TableDropStatement};

use crate::table::PasswordReset;

pub struct CreateTable;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(PasswordReset::Table)
        .col(
            ColumnDef::new(PasswordReset::Email)
                .string()
                .string_len(255)
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(PasswordReset::TokenHash).string().not_null())
        .col(ColumnDef::new(PasswordReset::CreatedAt).big_integer().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(PasswordReset::Table).to_owned()
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
