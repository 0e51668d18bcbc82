//! Core data-access logic for the contacts book.
//! This crate is the single source of truth for contact invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, ContactosConfig};
pub use db::{
    init_default_schema, init_schema, ConnectionProvider, DbError, DbResult, SqliteFileProvider,
};
pub use logging::{
    default_log_level, init_logging, init_stderr_logging, logging_status, LogTarget,
};
pub use model::contact::{Contact, ContactId, ContactValidationError, ContactValidationErrors};
pub use model::patch::{ContactColumn, ContactPatch, FieldChange};
pub use repo::contact_repo::{ContactRepository, RepoError, RepoResult, SqliteContactRepository};
pub use service::contact_service::{ContactService, ServiceError, ServiceResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
