//! Connection provider contract and the file-backed SQLite implementation.
//!
//! # Responsibility
//! - Open one configured SQLite connection per unit of work.
//! - Guarantee release through a scoped lease.
//!
//! # Invariants
//! - Returned connections have `foreign_keys=ON` and a busy timeout.
//! - A `ConnectionLease` releases its connection exactly once, on drop.

use super::{DbError, DbResult};
use log::{error, info, warn};
use rusqlite::Connection;
use std::ops::{Deref, DerefMut};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Source of short-lived storage connections.
pub trait ConnectionProvider {
    /// Opens a ready-to-use connection.
    fn acquire(&self) -> DbResult<Connection>;

    /// Returns a connection obtained from `acquire`.
    ///
    /// The default implementation closes it; close failures are logged since
    /// the unit of work has already finished.
    fn release(&self, conn: Connection) {
        if let Err((_, err)) = conn.close() {
            warn!("event=db_close module=db status=error error={err}");
        }
    }
}

impl<P: ConnectionProvider + ?Sized> ConnectionProvider for &P {
    fn acquire(&self) -> DbResult<Connection> {
        (**self).acquire()
    }

    fn release(&self, conn: Connection) {
        (**self).release(conn);
    }
}

/// Acquires a connection that is released when the lease is dropped.
pub fn lease<P: ConnectionProvider + ?Sized>(provider: &P) -> DbResult<ConnectionLease<'_, P>> {
    let conn = provider.acquire()?;
    Ok(ConnectionLease {
        provider,
        conn: Some(conn),
    })
}

/// Scoped connection handle bound to its provider.
pub struct ConnectionLease<'p, P: ConnectionProvider + ?Sized> {
    provider: &'p P,
    conn: Option<Connection>,
}

impl<P: ConnectionProvider + ?Sized> Deref for ConnectionLease<'_, P> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        self.conn
            .as_ref()
            .expect("lease holds its connection until drop")
    }
}

impl<P: ConnectionProvider + ?Sized> DerefMut for ConnectionLease<'_, P> {
    fn deref_mut(&mut self) -> &mut Connection {
        self.conn
            .as_mut()
            .expect("lease holds its connection until drop")
    }
}

impl<P: ConnectionProvider + ?Sized> Drop for ConnectionLease<'_, P> {
    fn drop(&mut self) {
        if let Some(conn) = self.conn.take() {
            self.provider.release(conn);
        }
    }
}

/// Opens the SQLite database file at a fixed path for every unit of work.
#[derive(Debug, Clone)]
pub struct SqliteFileProvider {
    path: PathBuf,
}

impl SqliteFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl ConnectionProvider for SqliteFileProvider {
    fn acquire(&self) -> DbResult<Connection> {
        let started_at = Instant::now();

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                if let Err(err) = std::fs::create_dir_all(parent) {
                    // Connection::open reports the precise failure below.
                    warn!(
                        "event=db_open module=db status=warn error_code=db_dir_create_failed dir={} error={err}",
                        parent.display()
                    );
                }
            }
        }

        let conn = Connection::open(&self.path)
            .and_then(|conn| {
                configure_connection(&conn)?;
                Ok(conn)
            })
            .map_err(|source| {
                error!(
                    "event=db_open module=db status=error duration_ms={} error_code=db_open_failed error={}",
                    started_at.elapsed().as_millis(),
                    source
                );
                DbError::Connection {
                    path: self.path.clone(),
                    source,
                }
            })?;

        info!(
            "event=db_open module=db status=ok duration_ms={}",
            started_at.elapsed().as_millis()
        );
        Ok(conn)
    }
}

fn configure_connection(conn: &Connection) -> rusqlite::Result<()> {
    conn.execute_batch("PRAGMA foreign_keys = ON;")?;
    conn.busy_timeout(BUSY_TIMEOUT)?;
    Ok(())
}
