//! Database migration utilities

use std::{path::PathBuf, str::FromStr};

use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};

/// Create the database if missing and apply every pending migration.
pub async fn migrate(database_url: &str) -> anyhow::Result<()> {
    let options = SqliteConnectOptions::from_str(database_url)?
        .create_if_missing(true)
        .foreign_keys(true);

    let pool = SqlitePool::connect_with(options).await?;
    let mut conn = pool.acquire().await?;

    tracing::info!("Migrating database {database_url}");

    cookbook_db::migrator()?
        .run(&mut *conn, &Plan::apply_all())
        .await?;

    drop(conn);
    pool.close().await;

    tracing::info!("Migrations completed successfully");

    Ok(())
}

/// Drop the database file and its WAL companions, then migrate.
pub async fn reset(database_url: &str) -> anyhow::Result<()> {
    tracing::info!("Dropping database");

    for path in database_files(database_url)? {
        match std::fs::remove_file(&path) {
            Ok(()) => tracing::info!("Dropped {}", path.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }
    }

    migrate(database_url).await
}

fn database_files(database_url: &str) -> anyhow::Result<Vec<PathBuf>> {
    let options = SqliteConnectOptions::from_str(database_url)?;
    let db = options.get_filename().to_path_buf();

    let mut files = vec![db.to_owned()];
    for suffix in ["-wal", "-shm"] {
        let mut name = db.as_os_str().to_owned();
        name.push(suffix);
        files.push(name.into());
    }

    Ok(files)
}
