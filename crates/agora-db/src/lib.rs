pub mod clock;
pub mod migrations;
pub mod models;
pub mod queries;

use anyhow::Result;
use rusqlite::Connection;
use std::path::Path;
use std::sync::Mutex;
use tracing::info;

pub use clock::Clock;
pub use queries::UniqueViolation;

pub struct Database {
    conn: Mutex<Connection>,
    clock: Clock,
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

    /// Private throwaway database, used by tests.
    pub fn open_in_memory() -> Result<Self> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self> {
        conn.pragma_update(None, "foreign_keys", "ON")?;
        migrations::run(&conn)?;

        let latest = migrations::latest_timestamp(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            clock: Clock::starting_after(latest),
        })
    }

    pub fn with_conn<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T>,
    {
        let conn = self.conn.lock().map_err(|e| anyhow::anyhow!("DB lock poisoned: {}", e))?;
        f(&conn)
    }

    /// Run `f` with a fresh timestamp from the store clock. The timestamp is
    /// drawn while the connection lock is held, so row order and timestamp
    /// order always agree.
    pub fn with_timestamp<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection, i64) -> Result<T>,
    {
        self.with_conn(|conn| f(conn, self.clock.next()))
    }
}
