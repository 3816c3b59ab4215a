use argon2::{
    Argon2, PasswordHasher,
    password_hash::{SaltString, rand_core::OsRng},
};
use serde::Deserialize;
use validator::{Validate, ValidationError};

use crate::repository::{self, CreateInput, FindType, UserRow};

#[derive(Validate, Deserialize, Default, Debug)]
#[serde(default)]
pub struct RegisterInput {
    #[validate(custom(function = "validate_name"))]
    pub name: String,
    #[validate(
        email(message = "The email field must be a valid email address."),
        length(max = 255, message = "The email field must not be greater than 255 characters.")
    )]
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

fn validate_name(value: &str) -> Result<(), ValidationError> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("required").with_message("The name field is required.".into()));
    }

    if value.chars().count() > 255 {
        return Err(ValidationError::new("max")
            .with_message("The name field must not be greater than 255 characters.".into()));
    }

    Ok(())
}

impl super::Command {
    pub async fn register(&self, input: RegisterInput) -> cookbook_shared::Result<UserRow> {
        self.create_user(input, false).await
    }

    /// Registers a user with the given role, used by the seeder.
    pub async fn create_user(
        &self,
        input: RegisterInput,
        is_admin: bool,
    ) -> cookbook_shared::Result<UserRow> {
        input.validate()?;

        let email = input.email.to_lowercase();
        if repository::is_email_taken(&self.read_db, &email, None).await? {
            cookbook_shared::invalid!("email", "The email has already been taken.");
        }

        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let password_hash = argon2
            .hash_password(input.password.as_bytes(), &salt)?
            .to_string();

        let id = repository::create(
            &self.write_db,
            CreateInput {
                name: input.name,
                email,
                password: password_hash,
                is_admin,
            },
        )
        .await?;

        let Some(user) = repository::find(&self.write_db, FindType::Id(id)).await? else {
            cookbook_shared::bail!("user {id} not found after register");
        };

        tracing::info!(user_id = id, "user registered");

        Ok(user)
    }
}
