mod command;
mod date;
mod difficulty;
pub mod pagination;
mod slug;

pub use command::*;
pub use date::*;
pub use difficulty::*;
pub use slug::slugify;

#[derive(Clone)]
pub struct State {
    pub read_db: sqlx::SqlitePool,
    pub write_db: sqlx::SqlitePool,
}

impl State {
    /// Same pool for reads and writes, used by the CLI and tests.
    pub fn single(pool: sqlx::SqlitePool) -> Self {
        Self {
            read_db: pool.clone(),
            write_db: pool,
        }
    }
}

/// The authenticated user acting on a resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub is_admin: bool,
}

impl Actor {
    /// Owners and admins may modify a resource.
    pub fn can_modify(&self, owner_id: i64) -> bool {
        self.is_admin || self.id == owner_id
    }
}
