use std::{path::PathBuf, str::FromStr};

use cookbook_shared::State;
use cookbook_user::{Command, RegisterInput, UserRow};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

pub async fn setup_test_state(path: PathBuf) -> anyhow::Result<State> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    cookbook_db::migrator()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    Ok(State::single(pool))
}

#[allow(dead_code)]
pub async fn create_user(cmd: &Command, name: impl Into<String>) -> anyhow::Result<UserRow> {
    let users = create_users(cmd, vec![name]).await?;

    Ok(users.into_iter().next().unwrap())
}

#[allow(dead_code)]
pub async fn create_users(
    cmd: &Command,
    names: impl IntoIterator<Item = impl Into<String>>,
) -> anyhow::Result<Vec<UserRow>> {
    let mut users = vec![];
    for name in names.into_iter() {
        let name = name.into();
        let user = cmd
            .register(RegisterInput {
                name: name.to_owned(),
                email: format!("{name}@cookbook.localhost"),
                password: "my_password".to_owned(),
                password_confirmation: "my_password".to_owned(),
            })
            .await?;
        users.push(user);
    }

    Ok(users)
}
