use std::{path::PathBuf, str::FromStr};

use cookbook_recipe::{RecipeInput, RecipeView, category::CategoryInput};
use cookbook_shared::{Actor, State};
use cookbook_user::RegisterInput;
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
pub async fn create_actor(state: &State, name: &str, is_admin: bool) -> anyhow::Result<Actor> {
    let cmd = cookbook_user::Command::new(state.clone());
    let user = cmd
        .create_user(
            RegisterInput {
                name: name.to_owned(),
                email: format!("{name}@cookbook.localhost"),
                password: "my_password".to_owned(),
                password_confirmation: "my_password".to_owned(),
            },
            is_admin,
        )
        .await?;

    Ok(Actor {
        id: user.id,
        is_admin: user.is_admin,
    })
}

#[allow(dead_code)]
pub async fn create_category(cmd: &cookbook_recipe::Command, name: &str) -> anyhow::Result<i64> {
    let category = cmd
        .create_category(CategoryInput {
            name: Some(name.to_owned()),
            slug: None,
        })
        .await?;

    Ok(category.id)
}

#[allow(dead_code)]
pub fn recipe_input(title: &str) -> RecipeInput {
    RecipeInput {
        title: Some(title.to_owned()),
        description: Some(format!("{title} description")),
        ingredients: Some(vec!["flour".to_owned(), "water".to_owned()]),
        instructions: Some("Mix and bake.".to_owned()),
        cooking_time: Some(30),
        servings: Some(2),
        difficulty: Some("easy".to_owned()),
        ..Default::default()
    }
}

#[allow(dead_code)]
pub async fn create_recipe(
    cmd: &cookbook_recipe::Command,
    actor: Actor,
    title: &str,
) -> anyhow::Result<RecipeView> {
    Ok(cmd.create(actor, recipe_input(title)).await?)
}
