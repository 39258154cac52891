use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusqlite::Connection;
use tracing::{debug, info};

use crate::error::{MealError, Result};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// The schema script shipped with the crate. Front ends write it to disk when
/// no other script has been configured.
pub const BUNDLED_SCHEMA: &str = include_str!("../sql/create_meal_table.sql");

/// Where the store gets its database and schema script from.
#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub db_path: PathBuf,
    pub schema_path: PathBuf,
}

/// Hands out a connection for the duration of one store operation.
///
/// The returned guard releases the connection when dropped, so every exit
/// path (including `?` on an error) gives it back.
pub trait ConnectionProvider: Send + Sync {
    fn acquire(&self) -> Result<ConnectionGuard<'_>>;
}

pub enum ConnectionGuard<'a> {
    Owned(Connection),
    Shared(MutexGuard<'a, Connection>),
}

impl Deref for ConnectionGuard<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            ConnectionGuard::Owned(conn) => conn,
            ConnectionGuard::Shared(guard) => &**guard,
        }
    }
}

impl DerefMut for ConnectionGuard<'_> {
    fn deref_mut(&mut self) -> &mut Connection {
        match self {
            ConnectionGuard::Owned(conn) => conn,
            ConnectionGuard::Shared(guard) => &mut **guard,
        }
    }
}

/// Opens a fresh connection to a database file on every acquisition.
#[derive(Debug, Clone)]
pub struct FileConnections {
    path: PathBuf,
}

impl FileConnections {
    #[must_use]
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ConnectionProvider for FileConnections {
    fn acquire(&self) -> Result<ConnectionGuard<'_>> {
        let conn = Connection::open(&self.path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        Ok(ConnectionGuard::Owned(conn))
    }
}

/// A single connection behind a mutex. Needed for in-memory databases,
/// where every new connection would see an empty database.
pub struct SharedConnection {
    conn: Mutex<Connection>,
}

impl SharedConnection {
    #[must_use]
    pub fn new(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    pub fn open_in_memory() -> Result<Self> {
        Ok(Self::new(Connection::open_in_memory()?))
    }
}

impl ConnectionProvider for SharedConnection {
    fn acquire(&self) -> Result<ConnectionGuard<'_>> {
        // A panic mid-operation leaves SQLite itself consistent, so a poisoned lock is still usable.
        let guard = self.conn.lock().unwrap_or_else(PoisonError::into_inner);
        Ok(ConnectionGuard::Shared(guard))
    }
}

/// Read the schema script at `path` and run it as one batch.
pub fn provision_schema(conn: &Connection, path: &Path) -> Result<()> {
    let script = std::fs::read_to_string(path).map_err(|source| MealError::Schema {
        path: path.to_path_buf(),
        source,
    })?;
    conn.execute_batch(&script)?;
    info!(schema = %path.display(), "provisioned meals table");
    Ok(())
}

/// Provision the schema only when the `meals` table does not exist yet.
pub fn ensure_schema(conn: &Connection, path: &Path) -> Result<()> {
    let exists: bool = conn.query_row(
        "SELECT EXISTS (SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'meals')",
        [],
        |row| row.get(0),
    )?;
    if exists {
        debug!("meals table already present");
        return Ok(());
    }
    provision_schema(conn, path)
}

#[cfg(test)]
pub(crate) fn bundled_schema_path() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("sql/create_meal_table.sql")
}
