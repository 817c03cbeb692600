//! Per-file records: change fingerprints, artifact associations, symbols.

use std::collections::HashSet;
use std::path::Path;
use std::time::UNIX_EPOCH;

use rusqlite::{OptionalExtension, Result, params};
use tracing::debug;

use super::MetaStore;
use super::search::split_symbol;

/// Cheap change proxy for a file: (last-modified time, byte size).
///
/// Not a content hash; a future checksum-based fingerprint can slot in here
/// without touching any store interface (the `checksum` column is already
/// reserved in the schema).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Fingerprint {
    pub mtime_ms: i64,
    pub size: u64,
}

impl Fingerprint {
    /// Stat-only; never reads file contents.
    pub fn of(path: &Path) -> std::io::Result<Self> {
        let meta = std::fs::metadata(path)?;
        let mtime_ms = meta
            .modified()?
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0);
        Ok(Self {
            mtime_ms,
            size: meta.len(),
        })
    }
}

impl MetaStore {
    /// Whether `path` must be (re)processed this run.
    ///
    /// True when the path was never recorded or its on-disk fingerprint
    /// changed. A path that no longer exists on disk returns false; deletion
    /// is handled by [`MetaStore::deleted_files`] + [`MetaStore::cleanup`],
    /// not by re-indexing.
    pub fn needs_reindex(&self, path: &str) -> Result<bool> {
        if !Path::new(path).exists() {
            return Ok(false);
        }

        let stored: Option<(i64, i64)> = self
            .conn
            .query_row(
                "SELECT mtime_ms, size FROM files WHERE path = ?",
                [path],
                |row| Ok((row.get(0)?, row.get(1)?)),
            )
            .optional()?;

        let Some((mtime_ms, size)) = stored else {
            return Ok(true);
        };

        // A stat failure (e.g. permission flip between the exists() check and
        // here) falls through to "re-attempt next pass".
        let Ok(current) = Fingerprint::of(Path::new(path)) else {
            return Ok(true);
        };
        Ok(current.mtime_ms != mtime_ms || current.size != size as u64)
    }

    /// Replace the record for `path` and fully regenerate its search rows.
    ///
    /// Delete-all-then-insert-all in one transaction, so a rename or removal
    /// of a symbol can never leave a stale search entry behind and a reader
    /// never observes a partially updated symbol set.
    pub fn record_file(&mut self, path: &str, artifact: &str, symbols: &[String]) -> Result<()> {
        // File vanished between listing and recording: no record update,
        // needs_reindex will re-attempt it next run.
        let Ok(fingerprint) = Fingerprint::of(Path::new(path)) else {
            debug!("skipping record for vanished file: {path}");
            return Ok(());
        };

        let tx = self.conn.transaction()?;

        tx.execute(
            r#"
            INSERT OR REPLACE INTO files (path, mtime_ms, size, indexed_in, checksum, symbols)
            VALUES (?, ?, ?, ?, NULL, ?)
            "#,
            params![
                path,
                fingerprint.mtime_ms,
                fingerprint.size as i64,
                artifact,
                symbols.join("\n"),
            ],
        )?;

        tx.execute("DELETE FROM search_index WHERE path = ?", [path])?;
        for symbol in symbols {
            let (kind, name) = split_symbol(symbol);
            tx.execute(
                "INSERT INTO search_index (path, symbol, kind, context) VALUES (?, ?, ?, ?)",
                params![path, name, kind, symbol.trim()],
            )?;
        }

        tx.commit()?;
        Ok(())
    }

    /// Every previously recorded path absent from `current`.
    pub fn deleted_files(&self, current: &HashSet<String>) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT path FROM files ORDER BY path")?;
        let rows = stmt.query_map([], |row| row.get::<_, String>(0))?;

        let mut deleted = Vec::new();
        for row in rows {
            let path = row?;
            if !current.contains(&path) {
                deleted.push(path);
            }
        }
        Ok(deleted)
    }

    /// Remove file records and all associated search rows, atomically.
    pub fn cleanup(&mut self, paths: &[String]) -> Result<()> {
        if paths.is_empty() {
            return Ok(());
        }
        let tx = self.conn.transaction()?;
        for path in paths {
            tx.execute("DELETE FROM files WHERE path = ?", [path])?;
            tx.execute("DELETE FROM search_index WHERE path = ?", [path])?;
        }
        tx.commit()?;
        debug!("cleaned up {} deleted file(s)", paths.len());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn symbol_count(store: &MetaStore, path: &str) -> i64 {
        store
            .conn
            .query_row(
                "SELECT COUNT(*) FROM search_index WHERE path = ?",
                [path],
                |row| row.get(0),
            )
            .unwrap()
    }

    #[test]
    fn test_change_detection_idempotence() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("mod.py");
        fs::write(&file, "def a(): pass\n").unwrap();
        let path = file.to_string_lossy().to_string();

        let mut store = MetaStore::open_in_memory().unwrap();

        // Never recorded -> needs indexing.
        assert!(store.needs_reindex(&path).unwrap());

        store
            .record_file(&path, "directories/root.md", &["def a()".to_string()])
            .unwrap();
        assert!(!store.needs_reindex(&path).unwrap());

        // Changing size flips it back.
        fs::write(&file, "def a(): pass\n\ndef b(): pass\n").unwrap();
        assert!(store.needs_reindex(&path).unwrap());
    }

    #[test]
    fn test_missing_file_is_not_reindexed() {
        let store = MetaStore::open_in_memory().unwrap();
        assert!(!store.needs_reindex("/nonexistent/file.py").unwrap());
    }

    #[test]
    fn test_search_rows_fully_regenerated() {
        let temp = tempfile::tempdir().unwrap();
        let file = temp.path().join("svc.py");
        fs::write(&file, "x = 1\n").unwrap();
        let path = file.to_string_lossy().to_string();

        let mut store = MetaStore::open_in_memory().unwrap();
        store
            .record_file(
                &path,
                "directories/root.md",
                &["def old_name(x)".to_string(), "class Gone".to_string()],
            )
            .unwrap();
        assert_eq!(symbol_count(&store, &path), 2);

        store
            .record_file(&path, "directories/root.md", &["def new_name(x)".to_string()])
            .unwrap();
        assert_eq!(symbol_count(&store, &path), 1);

        // Nothing from the superseded set survives.
        let hits = store.search("old_name", 10).unwrap();
        assert!(hits.is_empty());
        let hits = store.search("Gone", 10).unwrap();
        assert!(hits.is_empty());
        let hits = store.search("new_name", 10).unwrap();
        assert_eq!(hits.len(), 1);
    }

    #[test]
    fn test_deleted_files_and_cleanup() {
        let temp = tempfile::tempdir().unwrap();
        let keep = temp.path().join("keep.py");
        let gone = temp.path().join("gone.py");
        fs::write(&keep, "a = 1\n").unwrap();
        fs::write(&gone, "b = 2\n").unwrap();

        let keep_path = keep.to_string_lossy().to_string();
        let gone_path = gone.to_string_lossy().to_string();

        let mut store = MetaStore::open_in_memory().unwrap();
        store
            .record_file(&keep_path, "directories/root.md", &["def ka()".to_string()])
            .unwrap();
        store
            .record_file(&gone_path, "directories/root.md", &["def ga()".to_string()])
            .unwrap();

        fs::remove_file(&gone).unwrap();

        let current: HashSet<String> = [keep_path.clone()].into_iter().collect();
        let deleted = store.deleted_files(&current).unwrap();
        assert_eq!(deleted, vec![gone_path.clone()]);

        store.cleanup(&deleted).unwrap();

        let remaining: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 1);
        assert_eq!(symbol_count(&store, &gone_path), 0);
        assert_eq!(symbol_count(&store, &keep_path), 1);
    }

    #[test]
    fn test_record_vanished_file_is_noop() {
        let mut store = MetaStore::open_in_memory().unwrap();
        store
            .record_file("/no/such/file.py", "a.md", &["def x()".to_string()])
            .unwrap();

        let count: i64 = store
            .conn
            .query_row("SELECT COUNT(*) FROM files", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 0);
    }
}
