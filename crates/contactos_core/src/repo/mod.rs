//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define the contact data-access contract consumed by services and UIs.
//! - Isolate SQLite query details from use-case orchestration.
//!
//! # Invariants
//! - No storage-specific type crosses the repository API.

pub mod contact_repo;
