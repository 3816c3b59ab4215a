use std::sync::Arc;

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post, put},
};
use sqlx::SqlitePool;
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::{config::Config, email::EmailService, storage::ImageStore};

mod admin;
mod auth;
mod categories;
mod comments;
mod health;
mod likes;
mod recipes;
pub mod resource;
mod storage;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub user_command: cookbook_user::Command,
    pub recipe_command: cookbook_recipe::Command,
    pub images: ImageStore,
    pub email: EmailService,
    pub pool: SqlitePool,
}

impl AppState {
    pub fn new(config: Config, read_db: SqlitePool, write_db: SqlitePool) -> anyhow::Result<Self> {
        let state = cookbook_shared::State {
            read_db: read_db.clone(),
            write_db,
        };
        let images = ImageStore::new(&config.storage.root, &config.server.base_url);
        let email = EmailService::new(&config.email)?;

        Ok(Self {
            user_command: cookbook_user::Command::new(state.clone()),
            recipe_command: cookbook_recipe::Command::new(state),
            images,
            email,
            pool: read_db,
            config: Arc::new(config),
        })
    }
}

fn cors(config: &Config) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .server
        .cors_origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::warn!(origin = %origin, "ignoring invalid CORS origin: {e}");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([
            header::CONTENT_TYPE,
            header::AUTHORIZATION,
            HeaderName::from_static("x-requested-with"),
        ])
        .allow_credentials(true)
}

fn api() -> Router<AppState> {
    Router::new()
        .route("/health", get(health::health))
        .route("/ready", get(health::ready))
        .route("/storage/{*path}", get(storage::show))
        // Public catalogue
        .route(
            "/categories",
            get(categories::index).post(categories::store),
        )
        .route(
            "/categories/{id}",
            get(categories::show)
                .put(categories::update)
                .delete(categories::destroy),
        )
        .route("/recipes", get(recipes::index).post(recipes::store))
        .route(
            "/recipes/{id}",
            get(recipes::show)
                .put(recipes::update)
                .delete(recipes::destroy),
        )
        .route(
            "/recipes/{id}/increment-views",
            post(recipes::increment_views),
        )
        .route(
            "/recipes/{id}/comments",
            get(comments::index).post(comments::store),
        )
        .route("/recipes/{id}/likes", get(likes::count))
        .route("/recipes/{id}/like", post(likes::toggle))
        .route("/recipes/{id}/is-liked", get(likes::is_liked))
        // Guest
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        // Authenticated
        .route("/auth/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
        .route("/user", get(auth::current_user))
        .route("/password", put(auth::change_password))
        .route("/upload", post(storage::upload))
        .route(
            "/comments/{id}",
            put(comments::update).delete(comments::destroy),
        )
        .route("/user/liked-recipes", get(likes::index))
        .route(
            "/user/liked-recipes/{id}",
            get(likes::show).post(likes::store).delete(likes::destroy),
        )
        .nest("/admin", admin::router())
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api())
        .layer(storage::body_limit())
        .layer(cors(&state.config))
        .layer(CompressionLayer::new().br(true).gzip(true))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
