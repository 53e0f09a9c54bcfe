//! Database connection and operations

use chrono::Utc;
use parking_lot::Mutex;
use rusqlite::{Connection, OptionalExtension};
use std::path::Path;
use std::sync::Arc;

use crate::migrations::{get_schema_version, run_migrations};
use crate::Result;

/// Shared handle to the single SQLite connection.
///
/// Cloning is cheap; every clone talks to the same connection, and the
/// mutex serializes access to it.
pub struct Database {
    conn: Arc<Mutex<Connection>>,
}

impl Database {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }

        let conn = Connection::open(path)?;

        // WAL mode for better concurrent performance
        let _: String =
            conn.pragma_update_and_check(None, "journal_mode", "WAL", |row| row.get(0))?;

        run_migrations(&conn)?;

        tracing::debug!(path = %path.display(), "Opened database");

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        run_migrations(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    pub fn with_connection<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock();
        f(&conn)
    }

    /// Run `f` inside a transaction. Nothing is committed if `f` fails.
    pub fn transaction<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let mut conn = self.conn.lock();
        let tx = conn.transaction()?;
        let result = f(&tx)?;
        tx.commit()?;
        Ok(result)
    }

    pub fn schema_version(&self) -> Result<i32> {
        self.with_connection(get_schema_version)
    }

    pub fn get_setting(&self, key: &str) -> Result<Option<String>> {
        self.with_connection(|conn| read_setting(conn, key))
    }

    pub fn set_setting(&self, key: &str, value: &str) -> Result<()> {
        self.with_connection(|conn| write_setting(conn, key, value))
    }
}

impl Clone for Database {
    fn clone(&self) -> Self {
        Self {
            conn: Arc::clone(&self.conn),
        }
    }
}

/// Read a setting on an already locked connection (or open transaction).
pub fn read_setting(conn: &Connection, key: &str) -> Result<Option<String>> {
    let value = conn
        .query_row("SELECT value FROM settings WHERE key = ?1", [key], |row| {
            row.get(0)
        })
        .optional()?;
    Ok(value)
}

/// Write a setting on an already locked connection (or open transaction).
pub fn write_setting(conn: &Connection, key: &str, value: &str) -> Result<()> {
    let updated_at = Utc::now().to_rfc3339();
    conn.execute(
        "INSERT OR REPLACE INTO settings (key, value, updated_at) VALUES (?1, ?2, ?3)",
        rusqlite::params![key, value, updated_at],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{StorageError, SCHEMA_VERSION};

    #[test]
    fn test_open_in_memory() {
        let db = Database::open_in_memory().unwrap();
        db.with_connection(|conn| {
            let count: i32 =
                conn.query_row("SELECT COUNT(*) FROM zipcodes", [], |row| row.get(0))?;
            assert_eq!(count, 0);
            Ok(())
        })
        .unwrap();
        assert_eq!(db.schema_version().unwrap(), SCHEMA_VERSION);
    }

    #[test]
    fn test_settings_round_trip() {
        let db = Database::open_in_memory().unwrap();
        assert_eq!(db.get_setting("missing").unwrap(), None);

        db.set_setting("zipcodes.source", "data/zipcodes.json").unwrap();
        db.set_setting("zipcodes.source", "https://example.com/zipcodes.json")
            .unwrap();

        assert_eq!(
            db.get_setting("zipcodes.source").unwrap().as_deref(),
            Some("https://example.com/zipcodes.json")
        );
    }

    #[test]
    fn test_failed_transaction_is_rolled_back() {
        let db = Database::open_in_memory().unwrap();

        let result: Result<()> = db.transaction(|conn| {
            conn.execute(
                "INSERT INTO zipcodes (code, city, region) VALUES ('02134', 'Allston', 'MA')",
                [],
            )?;
            write_setting(conn, "zipcodes.populated_at", "now")?;
            Err(StorageError::Io(std::io::Error::other("source went away")))
        });
        assert!(result.is_err());

        let count: i32 = db
            .with_connection(|conn| {
                Ok(conn.query_row("SELECT COUNT(*) FROM zipcodes", [], |row| row.get(0))?)
            })
            .unwrap();
        assert_eq!(count, 0);
        assert_eq!(db.get_setting("zipcodes.populated_at").unwrap(), None);
    }

    #[test]
    fn test_reopen_file_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("zipdb.db");

        {
            let db = Database::open(&path).unwrap();
            db.set_setting("zipcodes.source", "inline").unwrap();
        }

        let db = Database::open(&path).unwrap();
        assert_eq!(
            db.get_setting("zipcodes.source").unwrap().as_deref(),
            Some("inline")
        );
    }

    #[test]
    fn test_open_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("zipdb.db");

        {
            let db = Database::open(&path).unwrap();
            db.with_connection(|conn| {
                crate::migrations::set_schema_version(conn, SCHEMA_VERSION + 5)
            })
            .unwrap();
        }

        let err = Database::open(&path).err().unwrap();
        assert!(matches!(err, StorageError::SchemaTooNew { .. }));
    }
}
