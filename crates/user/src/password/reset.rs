use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use cookbook_db::table::{AccessToken, PasswordReset, User};
use sea_query::{Expr, ExprTrait, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use serde::Deserialize;
use sha3::{Digest, Sha3_256};
use uuid::Uuid;
use validator::Validate;

use crate::repository::{self, FindType};

/// Reset tokens expire after an hour.
pub const RESET_TOKEN_TTL: i64 = 60 * 60;

#[derive(Validate, Deserialize, Default, Debug)]
#[serde(default)]
pub struct RequestResetInput {
    #[validate(email(message = "The email field must be a valid email address."))]
    pub email: String,
}

#[derive(Validate, Deserialize, Default, Debug)]
#[serde(default)]
pub struct ResetPasswordInput {
    #[validate(length(min = 1, message = "The token field is required."))]
    pub token: String,
    #[validate(email(message = "The email field must be a valid email address."))]
    pub email: String,
    #[validate(
        length(min = 8, message = "The password field must be at least 8 characters."),
        must_match(
            other = "password_confirmation",
            message = "The password field confirmation does not match."
        )
    )]
    pub password: String,
    pub password_confirmation: String,
}

fn hash_token(token: &str) -> String {
    let mut hasher = Sha3_256::default();
    hasher.update(token.as_bytes());

    format!("{:x}", hasher.finalize())
}

impl crate::Command {
    /// Returns the plain token to mail, or `None` when the email is unknown.
    pub async fn request_password_reset(
        &self,
        input: RequestResetInput,
    ) -> cookbook_shared::Result<Option<String>> {
        input.validate()?;

        let Some(user) = repository::find(&self.read_db, FindType::Email(input.email)).await?
        else {
            return Ok(None);
        };

        let token = format!("{}{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
        let statement = Query::insert()
            .into_table(PasswordReset::Table)
            .columns([
                PasswordReset::Email,
                PasswordReset::TokenHash,
                PasswordReset::CreatedAt,
            ])
            .values_panic([
                user.email.into(),
                hash_token(&token).into(),
                cookbook_shared::now().into(),
            ])
            .on_conflict(
                OnConflict::column(PasswordReset::Email)
                    .update_columns([PasswordReset::TokenHash, PasswordReset::CreatedAt])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&self.write_db).await?;

        Ok(Some(token))
    }

    pub async fn reset_password(&self, input: ResetPasswordInput) -> cookbook_shared::Result<()> {
        input.validate()?;

        let email = input.email.to_lowercase();
        let statement = Query::select()
            .columns([PasswordReset::TokenHash, PasswordReset::CreatedAt])
            .from(PasswordReset::Table)
            .and_where(Expr::col(PasswordReset::Email).eq(email.to_owned()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let row = sqlx::query_as_with::<_, (String, i64), _>(&sql, values)
            .fetch_optional(&self.read_db)
            .await?;

        let valid = match row {
            Some((token_hash, created_at)) => {
                token_hash == hash_token(&input.token)
                    && cookbook_shared::now() - created_at < RESET_TOKEN_TTL
            }
            None => false,
        };

        if !valid {
            cookbook_shared::invalid!("email", "This password reset token is invalid.");
        }

        let Some(user) = repository::find(&self.read_db, FindType::Email(email.to_owned())).await?
        else {
            cookbook_shared::invalid!("email", "This password reset token is invalid.");
        };

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = Argon2::default()
            .hash_password(input.password.as_bytes(), &salt)?
            .to_string();

        let mut tx = self.write_db.begin().await?;

        let (sql, values) = Query::update()
            .table(User::Table)
            .value(User::Password, password_hash)
            .value(User::UpdatedAt, cookbook_shared::now())
            .and_where(Expr::col(User::Id).eq(user.id))
            .build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        let (sql, values) = Query::delete()
            .from_table(PasswordReset::Table)
            .and_where(Expr::col(PasswordReset::Email).eq(email))
            .build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        let (sql, values) = Query::delete()
            .from_table(AccessToken::Table)
            .and_where(Expr::col(AccessToken::UserId).eq(user.id))
            .build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        tx.commit().await?;

        tracing::info!(user_id = user.id, "password reset");

        Ok(())
    }
}
