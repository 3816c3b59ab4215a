use argon2::{Argon2, PasswordHash, PasswordVerifier};
use serde::Deserialize;
use validator::Validate;

use crate::repository::{self, FindType, UserRow};

#[derive(Validate, Deserialize, Default, Debug)]
#[serde(default)]
pub struct LoginInput {
    #[validate(email(message = "The email field must be a valid email address."))]
    pub email: String,
    #[validate(length(min = 1, message = "The password field is required."))]
    pub password: String,
}

impl super::Command {
    pub async fn login(&self, input: LoginInput) -> cookbook_shared::Result<UserRow> {
        input.validate()?;

        let Some(user) = repository::find(&self.read_db, FindType::Email(input.email)).await?
        else {
            cookbook_shared::invalid!("email", "These credentials do not match our records.");
        };

        let parsed_hash = PasswordHash::new(&user.password)?;
        if Argon2::default()
            .verify_password(input.password.as_bytes(), &parsed_hash)
            .is_err()
        {
            cookbook_shared::invalid!("email", "These credentials do not match our records.");
        }

        Ok(user)
    }
}
