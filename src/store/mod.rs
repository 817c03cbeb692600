//! Metadata store module using SQLite.
//!
//! Owns all persisted indexing state: per-file change fingerprints, the
//! artifact each file was last written into, the flat symbol search index,
//! and free-form project metadata. Every mutating operation runs inside a
//! single transaction so readers only ever observe committed, mutually
//! consistent state.

use std::path::Path;

use rusqlite::{Connection, Result};
use tracing::info;

pub mod records;
pub mod search;

pub use records::Fingerprint;
pub use search::SearchHit;

/// Bumped whenever the table layout changes; stored in the `project` table
/// to gate future migrations.
pub const SCHEMA_VERSION: i32 = 2;

/// Database file name under the index output directory.
pub const DB_NAME: &str = "index_meta.db";

const SCHEMA_SQL: &str = r#"
CREATE TABLE IF NOT EXISTS files (
    path TEXT PRIMARY KEY,
    mtime_ms INTEGER NOT NULL,
    size INTEGER NOT NULL,
    indexed_in TEXT,
    checksum TEXT,
    symbols TEXT
);

CREATE TABLE IF NOT EXISTS project (
    key TEXT PRIMARY KEY,
    value TEXT
);

CREATE TABLE IF NOT EXISTS search_index (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    path TEXT NOT NULL,
    symbol TEXT NOT NULL,
    kind TEXT,
    context TEXT
);

CREATE INDEX IF NOT EXISTS idx_search_symbol ON search_index(symbol);
CREATE INDEX IF NOT EXISTS idx_search_path ON search_index(path);
"#;

/// A wrapper around a SQLite connection holding the index metadata schema.
pub struct MetaStore {
    pub(crate) conn: Connection,
}

impl MetaStore {
    /// Open (creating if needed) the metadata database under `index_dir`.
    pub fn open<P: AsRef<Path>>(index_dir: P) -> std::result::Result<Self, crate::error::IndexError> {
        let index_dir = index_dir.as_ref();
        std::fs::create_dir_all(index_dir)?;
        let db_path = index_dir.join(DB_NAME);
        info!("Opening metadata store: {}", db_path.display());

        let conn = Connection::open(db_path)?;
        Ok(Self::init(conn)?)
    }

    /// Open an in-memory store (useful for testing).
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        conn.execute_batch(SCHEMA_SQL)?;

        conn.execute(
            "INSERT OR REPLACE INTO project (key, value) VALUES ('schema_version', ?)",
            [SCHEMA_VERSION.to_string()],
        )?;
        conn.execute(
            "INSERT OR IGNORE INTO project (key, value) VALUES ('created_at', ?)",
            [chrono::Utc::now().to_rfc3339()],
        )?;

        Ok(Self { conn })
    }

    // ── Project metadata ─────────────────────────────────────────────

    pub fn set_project_type(&self, project_type: &str) -> Result<()> {
        self.set_meta("project_type", project_type)
    }

    pub fn project_type(&self) -> Result<Option<String>> {
        self.get_meta("project_type")
    }

    /// Stamp the store with the time of the last completed run.
    pub fn touch_updated_at(&self) -> Result<()> {
        self.set_meta("updated_at", &chrono::Utc::now().to_rfc3339())
    }

    fn set_meta(&self, key: &str, value: &str) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO project (key, value) VALUES (?, ?)",
            [key, value],
        )?;
        Ok(())
    }

    fn get_meta(&self, key: &str) -> Result<Option<String>> {
        use rusqlite::OptionalExtension;
        self.conn
            .query_row("SELECT value FROM project WHERE key = ?", [key], |row| {
                row.get(0)
            })
            .optional()
    }

    /// Counters for the post-run summary.
    pub fn stats(&self) -> Result<StoreStats> {
        let file_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))?;
        let symbol_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM search_index", [], |row| row.get(0))?;
        Ok(StoreStats {
            file_count: file_count as usize,
            symbol_count: symbol_count as usize,
            created_at: self.get_meta("created_at")?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    pub file_count: usize,
    pub symbol_count: usize,
    pub created_at: Option<String>,
}
