use clap::ValueEnum;
use cookbook_shared::State;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Role {
    User,
    Admin,
}

pub async fn set_role(config: crate::config::Config, email: String, role: Role) -> anyhow::Result<()> {
    let pool = crate::db::create_pool(&config.database.url, 1).await?;
    let command = cookbook_user::Command::new(State::single(pool.clone()));

    let result = command.set_admin(email.to_owned(), role == Role::Admin).await;
    pool.close().await;

    match result {
        Ok(user) if user.is_admin => tracing::info!("{email} now has admin access"),
        Ok(_) => tracing::info!("{email} is now a regular user"),
        Err(cookbook_shared::Error::NotFound(_)) => tracing::error!("user {email} not found"),
        Err(e) => return Err(e.into()),
    }

    Ok(())
}
