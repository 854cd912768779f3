//! Database schema definitions
//!
//! This module contains all SQL schema definitions for the checker database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- Track crawl runs
CREATE TABLE IF NOT EXISTS runs (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    seed_url TEXT NOT NULL,
    started_at TEXT NOT NULL,
    finished_at TEXT,
    config_hash TEXT NOT NULL,
    status TEXT NOT NULL
);

-- One row per emitted link record, in completion order
CREATE TABLE IF NOT EXISTS link_records (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    run_id INTEGER NOT NULL REFERENCES runs(id),
    referer TEXT NOT NULL,
    response_url TEXT,
    status TEXT NOT NULL,
    status_code INTEGER,
    link_url TEXT NOT NULL,
    link_text TEXT NOT NULL,
    redirect_url TEXT,
    link_img TEXT NOT NULL,
    recorded_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_link_records_run ON link_records(run_id);
CREATE INDEX IF NOT EXISTS idx_link_records_status ON link_records(status);
CREATE INDEX IF NOT EXISTS idx_link_records_url ON link_records(link_url);
"#;

/// Initializes the database schema
///
/// # Arguments
///
/// * `conn` - The database connection
///
/// # Returns
///
/// * `Ok(())` - Schema initialized successfully
/// * `Err(rusqlite::Error)` - Failed to initialize schema
pub fn initialize_schema(conn: &rusqlite::Connection) -> Result<(), rusqlite::Error> {
    conn.execute_batch(SCHEMA_SQL)?;
    Ok(())
}
