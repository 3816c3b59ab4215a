//! Moderation endpoints under `/api/admin`. Every handler takes [`AdminUser`].
//!
//! [`AdminUser`]: crate::auth::AdminUser

mod comments;
mod recipes;
mod users;

use axum::{
    Router,
    routing::{delete, get},
};

use super::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::index))
        .route(
            "/users/{id}",
            get(users::show).put(users::update).delete(users::destroy),
        )
        .route("/recipes", get(recipes::index))
        .route("/recipes/{id}", delete(recipes::destroy))
        .route("/comments", get(comments::index))
        .route("/comments/{id}", delete(comments::destroy))
}
