pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use rusqlite::Connection;

pub struct Database {
    conn: Mutex<Connection>,
}

impl Database {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;

        // WAL mode for concurrent reads
        conn.pragma_update(None, "journal_mode", "WAL")?;

        let db = Self::init(conn)?;
        info!("Database opened at {}", path.display());
        Ok(db)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        // Comment cascade on message delete depends on this.
        conn.pragma_update(None, "foreign_keys", "ON")?;

        migrations::run(&conn)?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` against the connection. The handle is held only for the
    /// duration of the call and released on every exit path, including
    /// errors and panics inside `f`.
    pub fn with_conn<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&Connection) -> std::result::Result<T, E>,
        E: From<anyhow::Error>,
    {
        let conn = self
            .conn
            .lock()
            .map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn reopening_a_file_database_keeps_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("agora.db");

        {
            let db = Database::open(&path).unwrap();
            db.with_conn(|conn| queries::insert_user(conn, "alice", "alice@x.com", "hash"))
                .unwrap()
                .expect("fresh email");
        }

        // Migrations must be idempotent across restarts.
        let db = Database::open(&path).unwrap();
        let user = db
            .with_conn(|conn| queries::user_by_email(conn, "alice@x.com"))
            .unwrap()
            .expect("user persisted");
        assert_eq!(user.user_name, "alice");
    }

    #[test]
    fn foreign_keys_are_enforced() {
        let db = Database::open_in_memory().unwrap();
        let enabled: i64 = db
            .with_conn(|conn| {
                conn.query_row("PRAGMA foreign_keys", [], |row| row.get(0))
                    .map_err(anyhow::Error::from)
            })
            .unwrap();
        assert_eq!(enabled, 1);
    }
}
