//! SQLite storage bootstrap: connection provisioning and schema setup.
//!
//! # Responsibility
//! - Hand out short-lived SQLite connections through `ConnectionProvider`.
//! - Create the `contactos` table idempotently before first use.
//!
//! # Invariants
//! - Connection failures surface as `DbError::Connection`, never as a
//!   missing/invalid handle.
//! - Every leased connection is released when its lease goes out of scope.

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

mod provider;
pub mod schema;

pub use provider::{lease, ConnectionLease, ConnectionProvider, SqliteFileProvider};
pub use schema::{init_default_schema, init_schema, DEFAULT_SCHEMA_SQL};

pub type DbResult<T> = Result<T, DbError>;

#[derive(Debug)]
pub enum DbError {
    /// The provider could not open a connection.
    Connection {
        path: PathBuf,
        source: rusqlite::Error,
    },
    Sqlite(rusqlite::Error),
    /// The DDL script could not be read.
    SchemaRead {
        path: PathBuf,
        source: std::io::Error,
    },
}

impl Display for DbError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Connection { path, source } => {
                write!(f, "failed to open database `{}`: {source}", path.display())
            }
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::SchemaRead { path, source } => {
                write!(f, "failed to read schema `{}`: {source}", path.display())
            }
        }
    }
}

impl Error for DbError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Connection { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::SchemaRead { source, .. } => Some(source),
        }
    }
}

impl From<rusqlite::Error> for DbError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}
