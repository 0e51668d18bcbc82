//! Contact repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide CRUD APIs over the `contactos` table.
//! - Own the diff-based partial update.
//!
//! # Invariants
//! - Every call leases its own connection; no connection or transaction
//!   outlives a call.
//! - Not-found is a normal outcome (`None` / `false`), never an error.
//! - Partial updates write only columns whose incoming value is non-empty
//!   and differs from the stored value.
//! - The repository does not validate contacts; callers do.

use crate::db::{lease, ConnectionProvider, DbError};
use crate::model::contact::{Contact, ContactId, ContactRow};
use crate::model::patch::{ContactPatch, FieldChange};
use log::debug;
use rusqlite::types::Value;
use rusqlite::{params, params_from_iter, Connection, OptionalExtension, Row, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};

const CONTACT_SELECT_SQL: &str = "SELECT
    id,
    nombre,
    apellido,
    telefono,
    email
FROM contactos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error for contact persistence operations.
#[derive(Debug)]
pub enum RepoError {
    /// Rejected before any statement ran.
    InvalidArgument(String),
    /// Connection, statement or constraint failure from storage.
    Db(DbError),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidArgument(message) => write!(f, "invalid argument: {message}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidArgument(_) => None,
            Self::Db(err) => Some(err),
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Repository interface for contact CRUD operations.
pub trait ContactRepository {
    /// Inserts a new row and returns the storage-assigned id.
    ///
    /// Any `id` already set on `contact` is ignored.
    fn agregar(&self, contact: &Contact) -> RepoResult<ContactId>;

    /// Gets one contact by primary key.
    fn obtener_por_id(&self, id: ContactId) -> RepoResult<Option<Contact>>;

    /// Lists every contact in storage order. Callers must not rely on order.
    fn obtener_todos(&self) -> RepoResult<Vec<Contact>>;

    /// Applies a sparse update. Returns `false` when the row is missing or
    /// nothing differs; in both cases no UPDATE is issued.
    ///
    /// # Errors
    /// - `InvalidArgument` when a present field is empty (clearing a
    ///   required column).
    fn aplicar_parche(&self, patch: &ContactPatch) -> RepoResult<bool>;

    /// Deletes by primary key. Returns whether a row was removed.
    fn eliminar_por_id(&self, id: ContactId) -> RepoResult<bool>;

    /// Counts stored contacts.
    fn contar(&self) -> RepoResult<u64>;

    /// Updates from a full contact where empty fields mean "leave as stored".
    ///
    /// # Errors
    /// - `InvalidArgument` when `contact.id` is absent.
    fn actualizar(&self, contact: &Contact) -> RepoResult<bool> {
        let patch = ContactPatch::from_contact(contact).ok_or_else(|| {
            RepoError::InvalidArgument("contact id is required to update".to_string())
        })?;
        self.aplicar_parche(&patch)
    }

    /// Deletes the row bound to `contact.id`.
    ///
    /// # Errors
    /// - `InvalidArgument` when `contact.id` is absent.
    fn eliminar(&self, contact: &Contact) -> RepoResult<bool> {
        let id = contact.id.ok_or_else(|| {
            RepoError::InvalidArgument("contact id is required to delete".to_string())
        })?;
        self.eliminar_por_id(id)
    }
}

/// SQLite-backed contact repository.
pub struct SqliteContactRepository<P: ConnectionProvider> {
    provider: P,
}

impl<P: ConnectionProvider> SqliteContactRepository<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: ConnectionProvider> ContactRepository for SqliteContactRepository<P> {
    fn agregar(&self, contact: &Contact) -> RepoResult<ContactId> {
        let (nombre, apellido, telefono, email) = contact.to_fields();
        let conn = lease(&self.provider)?;
        conn.execute(
            "INSERT INTO contactos (nombre, apellido, telefono, email)
             VALUES (?1, ?2, ?3, ?4);",
            params![nombre, apellido, telefono, email],
        )?;

        let id = conn.last_insert_rowid();
        debug!("event=contact_insert module=repo status=ok id={id}");
        Ok(id)
    }

    fn obtener_por_id(&self, id: ContactId) -> RepoResult<Option<Contact>> {
        let conn = lease(&self.provider)?;
        select_by_id(&conn, id)
    }

    fn obtener_todos(&self) -> RepoResult<Vec<Contact>> {
        let conn = lease(&self.provider)?;
        let mut stmt = conn.prepare(&format!("{CONTACT_SELECT_SQL};"))?;
        let mut rows = stmt.query([])?;
        let mut contacts = Vec::new();

        while let Some(row) = rows.next()? {
            contacts.extend(Contact::from_row(Some(read_contact_row(row)?)));
        }

        Ok(contacts)
    }

    fn aplicar_parche(&self, patch: &ContactPatch) -> RepoResult<bool> {
        let cleared = patch.cleared_columns();
        if !cleared.is_empty() {
            let names = cleared
                .iter()
                .map(|column| column.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            return Err(RepoError::InvalidArgument(format!(
                "required column(s) cannot be cleared: {names}"
            )));
        }

        let mut conn = lease(&self.provider)?;
        let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

        let Some(existing) = select_by_id(&tx, patch.id)? else {
            debug!(
                "event=contact_update module=repo status=not_found id={}",
                patch.id
            );
            return Ok(false);
        };

        let changes = patch.changes_against(&existing);
        if changes.is_empty() {
            debug!("event=contact_update module=repo status=noop id={}", patch.id);
            return Ok(false);
        }

        let (sql, bind_values) = build_update_sql(patch.id, &changes);
        let affected = tx.execute(&sql, params_from_iter(bind_values))?;
        tx.commit()?;

        debug!(
            "event=contact_update module=repo status=ok id={} columns={}",
            patch.id,
            changes.len()
        );
        Ok(affected > 0)
    }

    fn eliminar_por_id(&self, id: ContactId) -> RepoResult<bool> {
        let conn = lease(&self.provider)?;
        let removed = conn.execute("DELETE FROM contactos WHERE id = ?1;", [id])?;
        Ok(removed > 0)
    }

    fn contar(&self) -> RepoResult<u64> {
        let conn = lease(&self.provider)?;
        let count: i64 = conn.query_row("SELECT COUNT(*) FROM contactos;", [], |row| row.get(0))?;
        Ok(u64::try_from(count).unwrap_or_default())
    }
}

fn select_by_id(conn: &Connection, id: ContactId) -> RepoResult<Option<Contact>> {
    let row = conn
        .query_row(
            &format!("{CONTACT_SELECT_SQL} WHERE id = ?1;"),
            [id],
            read_contact_row,
        )
        .optional()?;
    Ok(Contact::from_row(row))
}

fn read_contact_row(row: &Row<'_>) -> rusqlite::Result<ContactRow> {
    Ok((
        row.get("id")?,
        row.get::<_, Option<String>>("nombre")?.unwrap_or_default(),
        row.get::<_, Option<String>>("apellido")?.unwrap_or_default(),
        row.get::<_, Option<String>>("telefono")?.unwrap_or_default(),
        row.get::<_, Option<String>>("email")?.unwrap_or_default(),
    ))
}

/// Builds `UPDATE contactos SET <changed columns> WHERE id = ?`.
///
/// Column names come from `ContactColumn`, never from input.
fn build_update_sql(id: ContactId, changes: &[FieldChange]) -> (String, Vec<Value>) {
    let assignments = changes
        .iter()
        .enumerate()
        .map(|(index, change)| format!("{} = ?{}", change.column.as_str(), index + 1))
        .collect::<Vec<_>>()
        .join(", ");

    let mut bind_values: Vec<Value> = changes
        .iter()
        .map(|change| Value::Text(change.value.clone()))
        .collect();
    bind_values.push(Value::Integer(id));

    let sql = format!(
        "UPDATE contactos SET {assignments} WHERE id = ?{};",
        changes.len() + 1
    );
    (sql, bind_values)
}
