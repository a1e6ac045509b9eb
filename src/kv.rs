// Key-value store backends used by the persistence bridge

use eyre::{Context, Result};
use rusqlite::{Connection, OptionalExtension};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Database filename inside the data directory
pub const DB_FILENAME: &str = "tasklist.db";

// Helper function for timestamps
fn now_ms() -> i64 {
    use std::time::{SystemTime, UNIX_EPOCH};
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as i64)
        .unwrap_or(0)
}

/// String-keyed, string-valued durable storage
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>>;

    fn set(&mut self, key: &str, value: &str) -> Result<()>;

    fn remove(&mut self, key: &str) -> Result<()>;
}

impl<K: KeyValueStore + ?Sized> KeyValueStore for Box<K> {
    fn get(&self, key: &str) -> Result<Option<String>> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        (**self).remove(key)
    }
}

/// In-memory store; nothing survives the process
#[derive(Debug, Clone, Default)]
pub struct MemoryKv {
    entries: HashMap<String, String>,
}

impl MemoryKv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(self.entries.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.entries.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.entries.remove(key);
        Ok(())
    }
}

/// SQLite-backed store, one row per key
pub struct SqliteKv {
    path: PathBuf,
    db: Connection,
}

impl SqliteKv {
    /// Open or create `tasklist.db` inside `dir`
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).context("Failed to create data directory")?;

        let path = dir.join(DB_FILENAME);
        let db = Connection::open(&path).context("Failed to open SQLite database")?;

        let store = Self { path, db };
        store.create_schema()?;

        Ok(store)
    }

    /// Path of the database file
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn create_schema(&self) -> Result<()> {
        debug!(path = ?self.path, "Creating key-value schema");

        self.db
            .execute_batch(
                r#"
            CREATE TABLE IF NOT EXISTS kv (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL,
                updated_at INTEGER NOT NULL
            );
            "#,
            )
            .context("Failed to create key-value schema")?;

        Ok(())
    }
}

impl KeyValueStore for SqliteKv {
    fn get(&self, key: &str) -> Result<Option<String>> {
        self.db
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| row.get(0))
            .optional()
            .with_context(|| format!("Failed to read key {}", key))
    }

    fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.db
            .execute(
                "INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at",
                rusqlite::params![key, value, now_ms()],
            )
            .with_context(|| format!("Failed to write key {}", key))?;

        debug!(key, bytes = value.len(), "Wrote key");
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<()> {
        self.db
            .execute("DELETE FROM kv WHERE key = ?1", [key])
            .with_context(|| format!("Failed to remove key {}", key))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_now_ms() {
        assert!(now_ms() > 1_600_000_000_000);
    }

    #[test]
    fn test_memory_kv() {
        let mut kv = MemoryKv::new();
        assert!(kv.get("tasks").unwrap().is_none());

        kv.set("tasks", "[]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[]"));

        kv.set("tasks", "[1]").unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some("[1]"));
        assert_eq!(kv.len(), 1);

        kv.remove("tasks").unwrap();
        assert!(kv.is_empty());
    }

    #[test]
    fn test_sqlite_kv_open_creates_database() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("nested").join("data");

        let kv = SqliteKv::open(&dir).unwrap();
        assert!(dir.join(DB_FILENAME).exists());
        assert_eq!(kv.path(), dir.join(DB_FILENAME).as_path());
    }

    #[test]
    fn test_sqlite_kv_set_get_overwrite() {
        let temp = TempDir::new().unwrap();
        let mut kv = SqliteKv::open(temp.path()).unwrap();

        assert!(kv.get("filterType").unwrap().is_none());

        kv.set("filterType", "All").unwrap();
        kv.set("filterType", "Pending").unwrap();
        assert_eq!(kv.get("filterType").unwrap().as_deref(), Some("Pending"));

        kv.remove("filterType").unwrap();
        assert!(kv.get("filterType").unwrap().is_none());
    }

    #[test]
    fn test_sqlite_kv_persists_across_open() {
        let temp = TempDir::new().unwrap();

        {
            let mut kv = SqliteKv::open(temp.path()).unwrap();
            kv.set("tasks", r#"[{"id":1}]"#).unwrap();
        }

        let kv = SqliteKv::open(temp.path()).unwrap();
        assert_eq!(kv.get("tasks").unwrap().as_deref(), Some(r#"[{"id":1}]"#));
    }
}
