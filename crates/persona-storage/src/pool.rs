//! WriteConnection — the single serialized writer for a timeline database.
//!
//! The only place in the crate that owns a `Connection`. Everything else
//! goes through `with_conn` / `with_conn_sync`.

use std::path::Path;
use std::time::Duration;

use rusqlite::Connection;
use tokio::sync::Mutex;

use persona_core::errors::PersonaResult;

use crate::{from_sqlite, migrations, to_storage_err};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Apply connection pragmas. WAL is requested for file databases; in-memory
/// databases report `memory` and keep working.
pub fn configure_connection(conn: &Connection) -> PersonaResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT).map_err(from_sqlite)?;
    conn.execute_batch(
        "PRAGMA journal_mode = WAL;
         PRAGMA synchronous = NORMAL;
         PRAGMA foreign_keys = ON;",
    )
    .map_err(|e| to_storage_err(format!("configure connection: {e}")))
}

/// One write connection behind an async mutex.
pub struct WriteConnection {
    conn: Mutex<Connection>,
}

impl WriteConnection {
    /// Open a file-backed database and bring its schema up to date.
    pub fn open(path: &Path) -> PersonaResult<Self> {
        let conn = Connection::open(path)
            .map_err(|e| to_storage_err(format!("open {}: {e}", path.display())))?;
        Self::from_connection(conn)
    }

    /// Open a private in-memory database (tests, scratch stores).
    pub fn open_in_memory() -> PersonaResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| to_storage_err(format!("open in-memory: {e}")))?;
        Self::from_connection(conn)
    }

    fn from_connection(conn: Connection) -> PersonaResult<Self> {
        configure_connection(&conn)?;
        migrations::run_migrations(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Run `f` with exclusive access to the connection.
    pub async fn with_conn<F, T>(&self, f: F) -> PersonaResult<T>
    where
        F: FnOnce(&Connection) -> PersonaResult<T>,
    {
        let conn = self.conn.lock().await;
        f(&conn)
    }

    /// Blocking variant for synchronous callers.
    ///
    /// Must not be called from inside an async runtime worker.
    pub fn with_conn_sync<F, T>(&self, f: F) -> PersonaResult<T>
    where
        F: FnOnce(&Connection) -> PersonaResult<T>,
    {
        let conn = self.conn.blocking_lock();
        f(&conn)
    }
}

/// Run `f` inside `BEGIN IMMEDIATE` / `COMMIT`, rolling back on error.
pub fn in_transaction<F, T>(conn: &Connection, f: F) -> PersonaResult<T>
where
    F: FnOnce(&Connection) -> PersonaResult<T>,
{
    conn.execute_batch("BEGIN IMMEDIATE").map_err(from_sqlite)?;
    match f(conn) {
        Ok(value) => {
            conn.execute_batch("COMMIT")
                .map_err(|e| to_storage_err(format!("commit: {e}")))?;
            Ok(value)
        }
        Err(e) => {
            let _ = conn.execute_batch("ROLLBACK");
            Err(e)
        }
    }
}
