mod server;
mod user;

pub use server::serve;
pub use user::{Role, set_role};
