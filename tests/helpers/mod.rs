//! Shared setup for the router-level tests: a migrated temp database, an
//! `AppState` on top of it and helpers to call the API.

#![allow(dead_code)]

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use std::time::{SystemTime, UNIX_EPOCH};

use cookbook::{
    AppState,
    auth::Claims,
    config::{
        Config, DatabaseConfig, EmailConfig, JwtConfig, LogConfig, ServerConfig, StorageConfig,
    },
};
use cookbook_recipe::RecipeInput;
use cookbook_shared::Actor;
use cookbook_user::{RegisterInput, UserRow};
use http_body_util::BodyExt;
use jsonwebtoken::{EncodingKey, Header, encode};
use serde_json::Value;
use temp_dir::TempDir;
use tower::ServiceExt;

pub const PASSWORD: &str = "password123";
pub const BASE_URL: &str = "http://localhost:8000";

pub fn test_config(dir: &TempDir) -> Config {
    Config {
        server: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 8000,
            base_url: BASE_URL.to_string(),
            cors_origins: vec!["http://localhost:5173".to_string()],
        },
        database: DatabaseConfig {
            url: format!("sqlite:{}", dir.child("cookbook.sqlite3").display()),
            max_connections: 4,
        },
        jwt: JwtConfig {
            secret: "test_secret_key_minimum_32_characters_long".to_string(),
            issuer: "cookbook".to_string(),
            audience: "cookbook-api".to_string(),
            expiration_minutes: 60,
            refresh_window_minutes: 120,
        },
        storage: StorageConfig {
            root: dir.child("storage").display().to_string(),
        },
        email: EmailConfig {
            skip_sending: true,
            ..Default::default()
        },
        log: LogConfig::default(),
    }
}

pub struct TestApp {
    pub dir: TempDir,
    pub state: AppState,
}

pub struct TestUser {
    pub user: UserRow,
    pub token: String,
}

impl TestUser {
    pub fn id(&self) -> i64 {
        self.user.id
    }

    pub fn actor(&self) -> Actor {
        Actor {
            id: self.user.id,
            is_admin: self.user.is_admin,
        }
    }
}

impl TestApp {
    pub async fn new() -> anyhow::Result<Self> {
        let dir = TempDir::new()?;
        let config = test_config(&dir);

        cookbook::migrate::migrate(&config.database.url).await?;
        let write_pool = cookbook::db::create_write_pool(&config.database.url).await?;
        let read_pool = cookbook::db::create_read_pool(&config.database.url, 4).await?;
        let state = AppState::new(config, read_pool, write_pool)?;

        Ok(Self { dir, state })
    }

    pub fn router(&self) -> Router {
        cookbook::router(self.state.clone())
    }

    /// Creates a user directly and signs a token for it.
    pub async fn user(&self, name: &str, email: &str, is_admin: bool) -> anyhow::Result<TestUser> {
        let user = self
            .state
            .user_command
            .create_user(
                RegisterInput {
                    name: name.to_string(),
                    email: email.to_string(),
                    password: PASSWORD.to_string(),
                    password_confirmation: PASSWORD.to_string(),
                },
                is_admin,
            )
            .await?;

        let token = self.token_for(user.id).await?;

        Ok(TestUser { user, token })
    }

    pub async fn token_for(&self, user_id: i64) -> anyhow::Result<String> {
        let access_id = self.state.user_command.issue_access(user_id).await?;

        cookbook::auth::generate_token(&self.state.config.jwt, user_id, &access_id)
    }

    /// A correctly signed token whose `exp` passed `expired_secs` ago.
    pub async fn expired_token(&self, user_id: i64, expired_secs: u64) -> anyhow::Result<String> {
        let access_id = self.state.user_command.issue_access(user_id).await?;
        let now = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
        let jwt = &self.state.config.jwt;

        let claims = Claims {
            sub: user_id.to_string(),
            jti: access_id,
            iat: now - expired_secs - 3600,
            exp: now - expired_secs,
            iss: jwt.issuer.to_owned(),
            aud: jwt.audience.to_owned(),
        };

        Ok(encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(jwt.secret.as_bytes()),
        )?)
    }

    pub async fn recipe(&self, author: &TestUser, title: &str) -> anyhow::Result<i64> {
        let recipe = self
            .state
            .recipe_command
            .create(author.actor(), recipe_input(title))
            .await?;

        Ok(recipe.id)
    }

    pub async fn category(&self, name: &str) -> anyhow::Result<i64> {
        let category = self
            .state
            .recipe_command
            .create_category(cookbook_recipe::category::CategoryInput {
                name: Some(name.to_string()),
                slug: None,
            })
            .await?;

        Ok(category.id)
    }

    pub async fn send(&self, request: Request<Body>) -> anyhow::Result<(StatusCode, Value)> {
        let response = self.router().oneshot(request).await?;
        let status = response.status();
        let bytes = response.into_body().collect().await?.to_bytes();

        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes)?
        };

        Ok((status, body))
    }

    pub async fn call(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.send(request(method, uri, token, body)).await
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        self.call(Method::GET, uri, token, None).await
    }

    pub async fn post(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.call(Method::POST, uri, token, Some(body)).await
    }

    pub async fn put(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> anyhow::Result<(StatusCode, Value)> {
        self.call(Method::PUT, uri, token, Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: Option<&str>) -> anyhow::Result<(StatusCode, Value)> {
        self.call(Method::DELETE, uri, token, None).await
    }
}

pub fn request(method: Method, uri: &str, token: Option<&str>, body: Option<Value>) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::ACCEPT, "application/json");

    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
    }

    let body = match body {
        Some(body) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(body.to_string())
        }
        None => Body::empty(),
    };

    builder.body(body).unwrap()
}

pub fn recipe_input(title: &str) -> RecipeInput {
    RecipeInput {
        title: Some(title.to_string()),
        description: Some(format!("{title} description")),
        ingredients: Some(vec!["2 eggs".to_string(), "salt".to_string()]),
        instructions: Some("Mix and cook.".to_string()),
        cooking_time: Some(15),
        servings: Some(2),
        difficulty: Some("easy".to_string()),
        ..Default::default()
    }
}

pub fn recipe_body(title: &str) -> Value {
    serde_json::json!({
        "title": title,
        "description": format!("{title} description"),
        "ingredients": ["2 eggs", "salt"],
        "instructions": "Mix and cook.",
        "cooking_time": 15,
        "servings": 2,
        "difficulty": "easy",
    })
}
