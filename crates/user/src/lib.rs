mod access;
pub mod admin;
pub mod password;
pub(crate) mod repository;
mod root;

pub use access::AccessRow;
pub use repository::UserRow;
pub use root::*;
