//! Connection provider abstraction.
//!
//! Services never open connections themselves; they ask a provider for one.
//! Lifecycle (open, reuse, close) belongs entirely to the provider.

use super::{open_db, open_db_in_memory, DbResult};
use once_cell::unsync::OnceCell;
use rusqlite::Connection;
use std::path::PathBuf;

/// Supplies a live, migrated connection on request.
pub trait ConnectionProvider {
    /// Returns a connection ready for queries.
    fn database_connection(&self) -> DbResult<&Connection>;
}

/// An already-open connection is its own provider.
impl ConnectionProvider for Connection {
    fn database_connection(&self) -> DbResult<&Connection> {
        Ok(self)
    }
}

/// Where a [`SqliteConnectionProvider`] opens its database.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DbTarget {
    File(PathBuf),
    Memory,
}

/// Lazily opens one SQLite connection on first request and reuses it after.
pub struct SqliteConnectionProvider {
    target: DbTarget,
    conn: OnceCell<Connection>,
}

impl SqliteConnectionProvider {
    pub fn new(target: DbTarget) -> Self {
        Self {
            target,
            conn: OnceCell::new(),
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::new(DbTarget::File(path.into()))
    }

    pub fn in_memory() -> Self {
        Self::new(DbTarget::Memory)
    }

    pub fn target(&self) -> &DbTarget {
        &self.target
    }

    /// Whether a connection has been opened yet.
    pub fn is_open(&self) -> bool {
        self.conn.get().is_some()
    }
}

impl ConnectionProvider for SqliteConnectionProvider {
    fn database_connection(&self) -> DbResult<&Connection> {
        self.conn.get_or_try_init(|| match &self.target {
            DbTarget::File(path) => open_db(path),
            DbTarget::Memory => open_db_in_memory(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{ConnectionProvider, SqliteConnectionProvider};

    #[test]
    fn provider_opens_lazily_and_reuses_connection() {
        let provider = SqliteConnectionProvider::in_memory();
        assert!(!provider.is_open());

        let first = provider.database_connection().expect("first open") as *const _;
        let second = provider.database_connection().expect("reuse") as *const _;
        assert!(provider.is_open());
        assert_eq!(first, second);
    }
}
