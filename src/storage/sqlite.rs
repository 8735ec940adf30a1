//! SQLite storage implementation
//!
//! This module provides a SQLite-based implementation of the ResultStore trait.

use crate::model::{Asin, PositionResult, StoredResult};
use crate::storage::schema::initialize_schema;
use crate::storage::traits::{ResultStore, StorageError, StorageResult};
use crate::storage::RankStats;
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};

/// SQLite result store
///
/// The connection sits behind a mutex so one store can be shared by every
/// worker; each statement runs with the lock held.
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// Opens or creates the database at `path`
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the SQLite database file
    ///
    /// # Returns
    ///
    /// * `Ok(SqliteStore)` - Successfully opened/created database
    /// * `Err(StorageError)` - Failed to open database
    pub fn new(path: &Path) -> StorageResult<Self> {
        let conn = Connection::open(path)?;

        conn.execute_batch(
            "
            PRAGMA journal_mode = WAL;
            PRAGMA synchronous = NORMAL;
            PRAGMA temp_store = MEMORY;
        ",
        )?;

        initialize_schema(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Creates an in-memory database
    pub fn new_in_memory() -> StorageResult<Self> {
        let conn = Connection::open_in_memory()?;
        initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> StorageResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| StorageError::LockPoisoned)
    }
}

/// Raw column values of one `results` row
struct ResultRow {
    asin: String,
    keyword: String,
    found: bool,
    matched_asin: Option<String>,
    page: Option<u32>,
    page_position: Option<u32>,
    total_position: Option<u32>,
    sponsored: Option<bool>,
    created_at: String,
    updated_at: String,
}

impl ResultRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            asin: row.get(0)?,
            keyword: row.get(1)?,
            found: row.get(2)?,
            matched_asin: row.get(3)?,
            page: row.get(4)?,
            page_position: row.get(5)?,
            total_position: row.get(6)?,
            sponsored: row.get(7)?,
            created_at: row.get(8)?,
            updated_at: row.get(9)?,
        })
    }

    fn into_result(self) -> StorageResult<StoredResult> {
        let corrupt = |reason: String| StorageError::Corrupt {
            asin: self.asin.clone(),
            reason,
        };

        let asin = Asin::parse(&self.asin).map_err(|e| corrupt(e.to_string()))?;
        let created_at = parse_timestamp(&self.created_at).map_err(&corrupt)?;
        let updated_at = parse_timestamp(&self.updated_at).map_err(&corrupt)?;

        Ok(StoredResult {
            asin,
            keyword: self.keyword,
            position: PositionResult {
                found: self.found,
                matched_asin: self.matched_asin,
                page: self.page,
                page_position: self.page_position,
                total_position: self.total_position,
                sponsored: self.sponsored,
            },
            created_at,
            updated_at,
        })
    }
}

fn parse_timestamp(value: &str) -> Result<DateTime<Utc>, String> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|e| format!("bad timestamp '{}': {}", value, e))
}

impl ResultStore for SqliteStore {
    fn save(&self, result: &StoredResult) -> StorageResult<()> {
        let position = &result.position;
        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO results
                (asin, keyword, found, matched_asin, page, page_position,
                 total_position, sponsored, created_at, updated_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
             ON CONFLICT(asin) DO UPDATE SET
                keyword = excluded.keyword,
                found = excluded.found,
                matched_asin = excluded.matched_asin,
                page = excluded.page,
                page_position = excluded.page_position,
                total_position = excluded.total_position,
                sponsored = excluded.sponsored,
                updated_at = excluded.updated_at",
            params![
                result.asin.as_str(),
                result.keyword,
                position.found,
                position.matched_asin,
                position.page,
                position.page_position,
                position.total_position,
                position.sponsored,
                result.created_at.to_rfc3339(),
                result.updated_at.to_rfc3339(),
            ],
        )?;
        Ok(())
    }

    fn get(&self, asin: &Asin) -> StorageResult<Option<StoredResult>> {
        let row = {
            let conn = self.lock()?;
            conn.query_row(
                "SELECT asin, keyword, found, matched_asin, page, page_position,
                        total_position, sponsored, created_at, updated_at
                 FROM results WHERE asin = ?1",
                params![asin.as_str()],
                ResultRow::from_row,
            )
            .optional()?
        };

        row.map(ResultRow::into_result).transpose()
    }

    fn stats(&self) -> StorageResult<RankStats> {
        let conn = self.lock()?;
        let stats = conn.query_row(
            "SELECT COUNT(*),
                    COALESCE(SUM(CASE WHEN found = 1 THEN 1 ELSE 0 END), 0),
                    COALESCE(SUM(CASE WHEN found = 1 AND sponsored = 1 THEN 1 ELSE 0 END), 0),
                    AVG(CASE WHEN found = 1 THEN total_position END)
             FROM results",
            [],
            |row| {
                Ok(RankStats {
                    total: row.get::<_, i64>(0)? as u64,
                    found: row.get::<_, i64>(1)? as u64,
                    sponsored: row.get::<_, i64>(2)? as u64,
                    average_total_position: row.get(3)?,
                })
            },
        )?;
        Ok(stats)
    }
}
