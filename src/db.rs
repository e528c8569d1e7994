//! Database module for the game server
//!
//! A single SQLite key-value table holds the aggregate Stats record.

mod schema;

pub use schema::STATS_KEY;
use schema::SCHEMA;

use crate::game::Stats;
use chrono::Utc;
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database error: {0}")]
    Sqlite(#[from] rusqlite::Error),
    #[error("Stored value for {key} is not valid JSON: {source}")]
    CorruptValue {
        key: String,
        source: serde_json::Error,
    },
    #[error("Failed to encode value: {0}")]
    Encode(#[source] serde_json::Error),
    #[error("Database connection lock poisoned")]
    Poisoned,
}

pub type DbResult<T> = Result<T, DbError>;

/// Thread-safe database handle
#[derive(Clone)]
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    /// Open or create database at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> DbResult<Self> {
        Self::init(Connection::open(path)?)
    }

    /// Open an in-memory database (for testing)
    #[allow(dead_code)] // Used in tests
    pub fn open_in_memory() -> DbResult<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> DbResult<Self> {
        conn.execute_batch(SCHEMA)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    fn conn(&self) -> DbResult<MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|_| DbError::Poisoned)
    }

    // ==================== Key-Value Operations ====================

    fn get_value(&self, key: &str) -> DbResult<Option<String>> {
        let conn = self.conn()?;
        let value = conn
            .query_row("SELECT value FROM kv WHERE key = ?1", params![key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    fn put_value(&self, key: &str, value: &str) -> DbResult<()> {
        let conn = self.conn()?;
        conn.execute(
            "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
             ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
            params![key, value, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    // ==================== Stats Operations ====================

    /// Load the Stats record; a missing record reads as all zeros
    pub fn get_stats(&self) -> DbResult<Stats> {
        match self.get_value(STATS_KEY)? {
            Some(json) => serde_json::from_str(&json).map_err(|source| DbError::CorruptValue {
                key: STATS_KEY.to_string(),
                source,
            }),
            None => Ok(Stats::default()),
        }
    }

    /// Overwrite the Stats record
    pub fn save_stats(&self, stats: &Stats) -> DbResult<()> {
        let json = serde_json::to_string(stats).map_err(DbError::Encode)?;
        self.put_value(STATS_KEY, &json)
    }
}
