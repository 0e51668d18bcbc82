//! Contact domain model.
//!
//! # Responsibility
//! - Define the contact record and its normalization/validation rules.
//! - Define the sparse patch used by partial updates.
//!
//! # Invariants
//! - Model types carry no storage handles; they are plain values.

pub mod contact;
pub mod patch;
