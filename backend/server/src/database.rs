//! # SQLite
//!
//! Relational store for accounts, couples, check-ins and content.
//!
//! ## Requirements
//!
//! - One small database per deployment, a handful of rows per couple per day
//! - Check-ins unique per couple per date, looked up newest first
//! - Concurrent readers while a check-in is being written
//!
//! ## Implementation
//!
//! - `r2d2` pool of `rusqlite` connections, built once at startup and handed to [`crate::state::State`]
//! - WAL journal and a 5 second busy timeout on every pooled connection
//! - Dates are `YYYY-MM-DD` text so lexical order is date order; timestamps are RFC 3339 text
//! - Schema is created with `IF NOT EXISTS`, so startup is idempotent
use std::{path::Path, time::Duration};

use r2d2_sqlite::SqliteConnectionManager;
use rusqlite::Connection;
use thiserror::Error;
use tracing::info;

pub type Pool = r2d2::Pool<SqliteConnectionManager>;

const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

#[derive(Error, Debug)]
pub enum DbError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Blocking task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
}

const SCHEMA: &str = r#"
CREATE TABLE IF NOT EXISTS user (
    id TEXT PRIMARY KEY,
    email TEXT NOT NULL UNIQUE,
    email_verified INTEGER NOT NULL DEFAULT 0,
    name TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS session (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user(id) ON DELETE CASCADE,
    token TEXT NOT NULL UNIQUE,
    expires_at TEXT NOT NULL,
    ip_address TEXT,
    user_agent TEXT,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS couple (
    id TEXT PRIMARY KEY,
    user_id TEXT NOT NULL REFERENCES user(id) ON DELETE CASCADE,
    her_user_id TEXT REFERENCES user(id) ON DELETE CASCADE,
    him_user_id TEXT REFERENCES user(id) ON DELETE CASCADE,
    partner_name TEXT NOT NULL DEFAULT '',
    cycle_length INTEGER NOT NULL DEFAULT 28,
    period_length INTEGER NOT NULL DEFAULT 5,
    last_period_start TEXT NOT NULL,
    onboarding_complete INTEGER NOT NULL DEFAULT 0,
    notification_time TEXT DEFAULT '09:00',
    cycle_tracking_shared INTEGER NOT NULL DEFAULT 1,
    invite_code TEXT UNIQUE,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS phase_preferences (
    id TEXT PRIMARY KEY,
    couple_id TEXT NOT NULL REFERENCES couple(id) ON DELETE CASCADE,
    phase TEXT NOT NULL,
    smart_moves TEXT NOT NULL,
    avoidances TEXT NOT NULL,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL,
    UNIQUE (couple_id, phase)
);

CREATE TABLE IF NOT EXISTS cycle_updates (
    id TEXT PRIMARY KEY,
    couple_id TEXT NOT NULL REFERENCES couple(id) ON DELETE CASCADE,
    period_start TEXT NOT NULL,
    created_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS articles (
    id TEXT PRIMARY KEY,
    phase TEXT NOT NULL,
    title TEXT NOT NULL,
    content TEXT NOT NULL,
    summary TEXT NOT NULL,
    read_time INTEGER NOT NULL DEFAULT 3,
    published INTEGER NOT NULL DEFAULT 1,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS mood_check_ins (
    id TEXT PRIMARY KEY,
    couple_id TEXT NOT NULL REFERENCES couple(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    mood TEXT NOT NULL,
    note TEXT,
    created_at TEXT NOT NULL,
    UNIQUE (couple_id, date)
);

CREATE TABLE IF NOT EXISTS period_check_ins (
    id TEXT PRIMARY KEY,
    couple_id TEXT NOT NULL REFERENCES couple(id) ON DELETE CASCADE,
    date TEXT NOT NULL,
    is_active INTEGER NOT NULL,
    created_at TEXT NOT NULL,
    UNIQUE (couple_id, date)
);

CREATE INDEX IF NOT EXISTS idx_articles_phase ON articles(phase, published);
"#;

pub fn init_pool(path: &Path, size: u32) -> Result<Pool, DbError> {
    let manager = SqliteConnectionManager::file(path).with_init(|conn| {
        conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get::<_, String>(0))?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        conn.busy_timeout(BUSY_TIMEOUT)
    });

    let pool = r2d2::Pool::builder().max_size(size).build(manager)?;

    let conn = pool.get()?;
    migrate(&conn)?;
    info!("Database ready at {}", path.display());

    Ok(pool)
}

pub fn migrate(conn: &Connection) -> Result<(), DbError> {
    conn.execute_batch(SCHEMA)?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use tempfile::TempDir;

    use super::*;

    #[test]
    fn test_init_pool_migrates_and_reopens() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("tempo.db");

        let pool = init_pool(&path, 1).unwrap();
        let tables: i64 = pool
            .get()
            .unwrap()
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name IN ('couple', 'period_check_ins')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(tables, 2);
        drop(pool);

        assert!(init_pool(&path, 1).is_ok());
    }
}
