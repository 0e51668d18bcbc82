//! Partial-update request for contacts.
//!
//! # Responsibility
//! - Express "touch only these columns" explicitly, field by field.
//! - Compute the column diff against a stored contact as a pure function.
//!
//! # Invariants
//! - `None` leaves the stored column untouched.
//! - `Some(value)` is compared after the same normalization `Contact` applies.
//! - A present value that normalizes to empty is a clear request and is
//!   reported by `cleared_columns()`; it never qualifies as a change.

use crate::model::contact::{
    check_email, check_telefono, normalize_email, normalize_text, Contact, ContactId,
    ContactValidationError, ContactValidationErrors,
};

/// Writable `contactos` columns, in update order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactColumn {
    Nombre,
    Apellido,
    Telefono,
    Email,
}

impl ContactColumn {
    pub const ALL: [ContactColumn; 4] = [
        ContactColumn::Nombre,
        ContactColumn::Apellido,
        ContactColumn::Telefono,
        ContactColumn::Email,
    ];

    /// SQL column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Nombre => "nombre",
            Self::Apellido => "apellido",
            Self::Telefono => "telefono",
            Self::Email => "email",
        }
    }

    fn normalize(self, value: &str) -> String {
        match self {
            Self::Email => normalize_email(value),
            _ => normalize_text(value),
        }
    }

    fn stored(self, contact: &Contact) -> &str {
        match self {
            Self::Nombre => &contact.nombre,
            Self::Apellido => &contact.apellido,
            Self::Telefono => &contact.telefono,
            Self::Email => &contact.email,
        }
    }
}

/// One column that differs from storage and must be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldChange {
    pub column: ContactColumn,
    pub value: String,
}

/// Sparse update for one stored contact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactPatch {
    pub id: ContactId,
    pub nombre: Option<String>,
    pub apellido: Option<String>,
    pub telefono: Option<String>,
    pub email: Option<String>,
}

impl ContactPatch {
    /// Creates a patch that touches nothing.
    pub fn new(id: ContactId) -> Self {
        Self {
            id,
            nombre: None,
            apellido: None,
            telefono: None,
            email: None,
        }
    }

    /// Converts a full contact using the "empty means untouched" convention.
    ///
    /// Fields are normalized first, so whitespace-only values also count as
    /// empty. Returns `None` when the contact has no `id`.
    pub fn from_contact(contact: &Contact) -> Option<Self> {
        let id = contact.id?;
        let field = |column: ContactColumn| {
            let value = column.normalize(column.stored(contact));
            (!value.is_empty()).then_some(value)
        };
        Some(Self {
            id,
            nombre: field(ContactColumn::Nombre),
            apellido: field(ContactColumn::Apellido),
            telefono: field(ContactColumn::Telefono),
            email: field(ContactColumn::Email),
        })
    }

    pub fn nombre(mut self, value: impl Into<String>) -> Self {
        self.nombre = Some(value.into());
        self
    }

    pub fn apellido(mut self, value: impl Into<String>) -> Self {
        self.apellido = Some(value.into());
        self
    }

    pub fn telefono(mut self, value: impl Into<String>) -> Self {
        self.telefono = Some(value.into());
        self
    }

    pub fn email(mut self, value: impl Into<String>) -> Self {
        self.email = Some(value.into());
        self
    }

    /// Whether no column is present at all.
    pub fn is_empty(&self) -> bool {
        self.present().next().is_none()
    }

    /// Columns present with a value that normalizes to empty.
    pub fn cleared_columns(&self) -> Vec<ContactColumn> {
        self.present()
            .filter(|(column, value)| column.normalize(value).is_empty())
            .map(|(column, _)| column)
            .collect()
    }

    /// Columns whose incoming value is non-empty and differs from `existing`.
    pub fn changes_against(&self, existing: &Contact) -> Vec<FieldChange> {
        self.present()
            .filter_map(|(column, value)| {
                let value = column.normalize(value);
                if value.is_empty() || value == column.stored(existing) {
                    None
                } else {
                    Some(FieldChange { column, value })
                }
            })
            .collect()
    }

    /// Applies field rules to the present columns only.
    pub fn validate(&self) -> Result<(), ContactValidationErrors> {
        let mut errors = Vec::new();
        for (column, value) in self.present() {
            let value = column.normalize(value);
            match column {
                ContactColumn::Nombre if value.is_empty() => {
                    errors.push(ContactValidationError::NombreRequired);
                }
                ContactColumn::Apellido if value.is_empty() => {
                    errors.push(ContactValidationError::ApellidoRequired);
                }
                ContactColumn::Telefono => check_telefono(&value, &mut errors),
                ContactColumn::Email => check_email(&value, &mut errors),
                _ => {}
            }
        }
        match ContactValidationErrors::from_vec(errors) {
            Some(errors) => Err(errors),
            None => Ok(()),
        }
    }

    fn get(&self, column: ContactColumn) -> Option<&str> {
        match column {
            ContactColumn::Nombre => self.nombre.as_deref(),
            ContactColumn::Apellido => self.apellido.as_deref(),
            ContactColumn::Telefono => self.telefono.as_deref(),
            ContactColumn::Email => self.email.as_deref(),
        }
    }

    fn present(&self) -> impl Iterator<Item = (ContactColumn, &str)> + '_ {
        ContactColumn::ALL
            .into_iter()
            .filter_map(move |column| self.get(column).map(|value| (column, value)))
    }
}
