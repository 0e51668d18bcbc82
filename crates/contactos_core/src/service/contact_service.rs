//! Contact use-case service.
//!
//! # Responsibility
//! - Validate contacts before they reach the repository.
//! - Provide stable entry points for presentation layers.
//!
//! # Invariants
//! - Write paths never call the repository with a contact that failed the
//!   applicable validation.
//! - Service layer remains storage-agnostic.

use crate::model::contact::{Contact, ContactId, ContactValidationErrors};
use crate::model::patch::ContactPatch;
use crate::repo::contact_repo::{ContactRepository, RepoError};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ServiceResult<T> = Result<T, ServiceError>;

#[derive(Debug)]
pub enum ServiceError {
    Validation(ContactValidationErrors),
    Repo(RepoError),
}

impl Display for ServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Validation(err) => write!(f, "{err}"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Validation(err) => Some(err),
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<ContactValidationErrors> for ServiceError {
    fn from(value: ContactValidationErrors) -> Self {
        Self::Validation(value)
    }
}

impl From<RepoError> for ServiceError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for contact operations.
pub struct ContactService<R: ContactRepository> {
    repo: R,
}

impl<R: ContactRepository> ContactService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Validates with the data-access rules, then inserts.
    pub fn registrar(&self, contact: &Contact) -> ServiceResult<ContactId> {
        contact.validate()?;
        Ok(self.repo.agregar(contact)?)
    }

    /// Validates with the input-form rules (name lengths), then inserts.
    pub fn registrar_formulario(&self, contact: &Contact) -> ServiceResult<ContactId> {
        contact.validate_input()?;
        Ok(self.repo.agregar(contact)?)
    }

    /// Updates with "empty means untouched" semantics.
    ///
    /// Non-empty fields must satisfy their rules; empty ones are skipped.
    pub fn modificar(&self, contact: &Contact) -> ServiceResult<bool> {
        if let Some(patch) = ContactPatch::from_contact(contact) {
            patch.validate()?;
        }
        Ok(self.repo.actualizar(contact)?)
    }

    /// Applies a sparse update after checking the present fields.
    pub fn modificar_parche(&self, patch: &ContactPatch) -> ServiceResult<bool> {
        patch.validate()?;
        Ok(self.repo.aplicar_parche(patch)?)
    }

    pub fn buscar(&self, id: ContactId) -> ServiceResult<Option<Contact>> {
        Ok(self.repo.obtener_por_id(id)?)
    }

    pub fn listar(&self) -> ServiceResult<Vec<Contact>> {
        Ok(self.repo.obtener_todos()?)
    }

    /// Removes a contact by id; `false` when it did not exist.
    pub fn dar_de_baja(&self, id: ContactId) -> ServiceResult<bool> {
        Ok(self.repo.eliminar_por_id(id)?)
    }

    pub fn total(&self) -> ServiceResult<u64> {
        Ok(self.repo.contar()?)
    }
}
