//! Database schema definitions
//!
//! This module contains the SQL schema for the Rank-Scout database.

/// SQL schema for the database
pub const SCHEMA_SQL: &str = r#"
-- One rank outcome per tracked ASIN
CREATE TABLE IF NOT EXISTS results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    asin TEXT NOT NULL UNIQUE,
    keyword TEXT NOT NULL,
    found INTEGER NOT NULL,
    matched_asin TEXT,
    page INTEGER,
    page_position INTEGER,
    total_position INTEGER,
    sponsored INTEGER,
    created_at TEXT NOT NULL,
    updated_at TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS idx_results_keyword ON results(keyword);
CREATE INDEX IF NOT EXISTS idx_results_found ON results(found);
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
