use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use validator::Validate;

use crate::repository::{self, FindType, UpdateInput};

#[derive(Validate, Deserialize, Default, Debug)]
#[serde(default)]
pub struct ChangePasswordInput {
    #[validate(length(min = 1, message = "The current password field is required."))]
    pub current_password: String,
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

impl crate::Command {
    pub async fn change_password(
        &self,
        user_id: i64,
        input: ChangePasswordInput,
    ) -> cookbook_shared::Result<()> {
        input.validate()?;

        let Some(user) = repository::find(&self.read_db, FindType::Id(user_id)).await? else {
            cookbook_shared::not_found!("User not found.");
        };

        let argon2 = Argon2::default();
        let parsed_hash = PasswordHash::new(&user.password)?;
        if argon2
            .verify_password(input.current_password.as_bytes(), &parsed_hash)
            .is_err()
        {
            cookbook_shared::invalid!(
                "current_password",
                "The provided password does not match your current password."
            );
        }

        let salt = SaltString::generate(&mut OsRng);
        let password_hash = argon2
            .hash_password(input.password.as_bytes(), &salt)?
            .to_string();

        repository::update(
            &self.write_db,
            UpdateInput {
                id: user.id,
                password: Some(password_hash),
                ..Default::default()
            },
        )
        .await?;

        Ok(())
    }
}
