pub mod auth;
pub mod cli;
pub mod client;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod extract;
pub mod migrate;
pub mod observability;
pub mod routes;
pub mod seed;
pub mod storage;

pub use config::Config;
pub use routes::{AppState, router};
