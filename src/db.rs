use std::str::FromStr;

use log::info;
use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};

pub async fn connect(database_url: &str, max_connections: u32) -> Result<SqlitePool, sqlx::Error> {
    let options = SqliteConnectOptions::from_str(database_url)?.create_if_missing(true);
    SqlitePoolOptions::new()
        .max_connections(max_connections)
        .connect_with(options)
        .await
}

// Creates the workers, assignments and queue tables if they do not exist yet
pub async fn init_db(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    sqlx::query(
        "
        CREATE TABLE IF NOT EXISTS workers (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            name TEXT NOT NULL,
            title TEXT,
            department TEXT,
            hard_chores_counter INTEGER NOT NULL DEFAULT 0,
            outer_partner_counter INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS ix_workers_name ON workers (name)")
        .execute(pool)
        .await?;

    sqlx::query(
        "
        CREATE TABLE IF NOT EXISTS assignments (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            date TEXT NOT NULL,
            time_slot TEXT,
            task_type TEXT NOT NULL,
            worker_id INTEGER REFERENCES workers (id) ON DELETE SET NULL,
            is_commander INTEGER NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        ",
    )
    .execute(pool)
    .await?;

    // Full-day tasks have no slot; NULLs would never collide in a plain unique index
    sqlx::query(
        "CREATE UNIQUE INDEX IF NOT EXISTS ux_assignments_slot
         ON assignments (date, COALESCE(time_slot, ''), task_type, worker_id)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "
        CREATE TABLE IF NOT EXISTS task_queues (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            worker_id INTEGER NOT NULL REFERENCES workers (id) ON DELETE CASCADE,
            task_type TEXT NOT NULL,
            position INTEGER NOT NULL,
            UNIQUE (worker_id, task_type)
        )
        ",
    )
    .execute(pool)
    .await?;

    info!("Database initialized");
    Ok(())
}

#[cfg(test)]
pub async fn memory_pool() -> SqlitePool {
    // One connection: every new in-memory connection is a fresh database.
    let pool = connect("sqlite::memory:", 1).await.unwrap();
    init_db(&pool).await.unwrap();
    pool
}
