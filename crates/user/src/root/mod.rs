use std::ops::Deref;

use cookbook_shared::State;

use crate::repository::{self, FindType, UserRow};

mod login;
mod register;

pub use login::LoginInput;
pub use register::RegisterInput;

#[derive(Clone)]
pub struct Command {
    state: State,
}

impl Deref for Command {
    type Target = State;

    fn deref(&self) -> &Self::Target {
        &self.state
    }
}

impl Command {
    pub fn new(state: State) -> Self {
        Self { state }
    }

    pub async fn find(&self, id: i64) -> cookbook_shared::Result<Option<UserRow>> {
        repository::find(&self.read_db, FindType::Id(id)).await
    }

    pub async fn find_by_email(
        &self,
        email: impl Into<String>,
    ) -> cookbook_shared::Result<Option<UserRow>> {
        repository::find(&self.read_db, FindType::Email(email.into())).await
    }

    /// Grants or revokes the admin role, used by the `user` CLI command.
    pub async fn set_admin(
        &self,
        email: impl Into<String>,
        is_admin: bool,
    ) -> cookbook_shared::Result<UserRow> {
        let email = email.into();
        let Some(user) = repository::find(&self.write_db, FindType::Email(email.to_owned())).await?
        else {
            cookbook_shared::not_found!("User {email} not found.");
        };

        repository::update(
            &self.write_db,
            repository::UpdateInput {
                id: user.id,
                is_admin: Some(is_admin),
                ..Default::default()
            },
        )
        .await?;

        tracing::info!(user_id = user.id, is_admin, "user role changed");

        Ok(UserRow { is_admin, ..user })
    }
}
