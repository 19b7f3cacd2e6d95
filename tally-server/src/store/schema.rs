//! SQL schema creation.

use sqlx::{Executor as _, SqlitePool};

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    username TEXT NOT NULL UNIQUE,
    password_digest TEXT NOT NULL,
    logged_in BOOLEAN NOT NULL DEFAULT FALSE,
    vote TEXT,
    is_master BOOLEAN NOT NULL DEFAULT FALSE,
    inserted_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS option (
    name TEXT PRIMARY KEY NOT NULL,
    value TEXT
);
"#;

/// Creates every table that does not exist yet.
pub async fn create_all(db: &SqlitePool) -> Result<(), sqlx::Error> {
    db.execute(SCHEMA).await?;
    Ok(())
}
