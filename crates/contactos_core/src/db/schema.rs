//! Idempotent schema bootstrap for the `contactos` table.
//!
//! # Responsibility
//! - Execute a DDL script against one leased connection and commit.
//!
//! # Invariants
//! - Scripts must use `CREATE ... IF NOT EXISTS`; running them on every
//!   startup never touches existing rows.
//! - A failing script is rolled back as a whole. There is no repair path.

use super::provider::{lease, ConnectionProvider};
use super::{DbError, DbResult};
use log::{error, info};
use rusqlite::Connection;
use std::path::Path;
use std::time::Instant;

/// Bundled DDL for the `contactos` table.
pub const DEFAULT_SCHEMA_SQL: &str = include_str!("schema.sql");

/// Reads the DDL script at `path` and applies it.
///
/// # Errors
/// - `DbError::SchemaRead` when the file cannot be read.
/// - `DbError::Connection` when no connection can be acquired.
/// - `DbError::Sqlite` when the script fails; nothing is committed.
pub fn init_schema<P>(provider: &P, path: impl AsRef<Path>) -> DbResult<()>
where
    P: ConnectionProvider + ?Sized,
{
    let path = path.as_ref();
    let sql = std::fs::read_to_string(path).map_err(|source| {
        error!(
            "event=schema_init module=db status=error error_code=schema_read_failed path={} error={}",
            path.display(),
            source
        );
        DbError::SchemaRead {
            path: path.to_path_buf(),
            source,
        }
    })?;

    apply_script(provider, &sql, "file")
}

/// Applies the bundled `contactos` DDL.
pub fn init_default_schema<P>(provider: &P) -> DbResult<()>
where
    P: ConnectionProvider + ?Sized,
{
    apply_script(provider, DEFAULT_SCHEMA_SQL, "bundled")
}

fn apply_script<P>(provider: &P, sql: &str, source: &str) -> DbResult<()>
where
    P: ConnectionProvider + ?Sized,
{
    let started_at = Instant::now();
    info!("event=schema_init module=db status=start source={source}");

    let mut conn = lease(provider)?;
    let result = execute_script(&mut conn, sql);

    match &result {
        Ok(()) => info!(
            "event=schema_init module=db status=ok source={source} duration_ms={}",
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=schema_init module=db status=error source={source} duration_ms={} error_code=schema_apply_failed error={err}",
            started_at.elapsed().as_millis()
        ),
    }
    result
}

fn execute_script(conn: &mut Connection, sql: &str) -> DbResult<()> {
    let tx = conn.transaction()?;
    tx.execute_batch(sql)?;
    tx.commit()?;
    Ok(())
}
