//! Contact domain model.
//!
//! # Responsibility
//! - Hold one contact's fields and normalize them on construction.
//! - Evaluate field rules without mutating state.
//!
//! # Invariants
//! - Normalization (trim all fields, lowercase email) runs once, before any
//!   validation or persistence, and is idempotent.
//! - `id == None` means "not persisted yet"; `Some(id)` matches one row.
//! - `validate()` reports every violated rule, in field order.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Storage-assigned contact identifier (`contactos.id`).
pub type ContactId = i64;

/// Storage row shape: `(id, nombre, apellido, telefono, email)`.
pub type ContactRow = (ContactId, String, String, String, String);

/// Minimum trimmed length for name/surname in input forms.
pub const NAME_MIN_CHARS: usize = 2;
/// Maximum trimmed length for name/surname in input forms.
pub const NAME_MAX_CHARS: usize = 60;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[\d+\-\(\)\s]{6,20}$").expect("valid phone regex"));
static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

/// One contact record.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawContact")]
pub struct Contact {
    /// Absent until the repository inserts the row.
    pub id: Option<ContactId>,
    pub nombre: String,
    pub apellido: String,
    pub telefono: String,
    /// Always lowercase after normalization.
    pub email: String,
}

impl Contact {
    /// Creates an unpersisted contact from raw input.
    pub fn new(
        nombre: impl Into<String>,
        apellido: impl Into<String>,
        telefono: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let mut contact = Self {
            id: None,
            nombre: nombre.into(),
            apellido: apellido.into(),
            telefono: telefono.into(),
            email: email.into(),
        };
        contact.normalize();
        contact
    }

    /// Creates a contact bound to an existing storage id.
    ///
    /// Used when rebuilding from rows or when the caller targets an update or
    /// delete by id.
    pub fn with_id(
        id: ContactId,
        nombre: impl Into<String>,
        apellido: impl Into<String>,
        telefono: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        let mut contact = Self::new(nombre, apellido, telefono, email);
        contact.id = Some(id);
        contact
    }

    /// Rebuilds a contact from a storage row, or `None` for a missing row.
    pub fn from_row(row: Option<ContactRow>) -> Option<Self> {
        row.map(|(id, nombre, apellido, telefono, email)| {
            Self::with_id(id, nombre, apellido, telefono, email)
        })
    }

    /// Trims every text field and lowercases the email.
    pub fn normalize(&mut self) {
        normalize_in_place(&mut self.nombre);
        normalize_in_place(&mut self.apellido);
        normalize_in_place(&mut self.telefono);
        self.email = normalize_email(&self.email);
    }

    /// Ordered write tuple `(nombre, apellido, telefono, email)`; excludes `id`.
    pub fn to_fields(&self) -> (&str, &str, &str, &str) {
        (
            self.nombre.as_str(),
            self.apellido.as_str(),
            self.telefono.as_str(),
            self.email.as_str(),
        )
    }

    /// Checks the data-access rules and returns every violation.
    ///
    /// # Errors
    /// - Returns all failing rules in field order; never short-circuits.
    pub fn validate(&self) -> Result<(), ContactValidationErrors> {
        let mut errors = Vec::new();
        if self.nombre.is_empty() {
            errors.push(ContactValidationError::NombreRequired);
        }
        if self.apellido.is_empty() {
            errors.push(ContactValidationError::ApellidoRequired);
        }
        check_telefono(&self.telefono, &mut errors);
        check_email(&self.email, &mut errors);
        ContactValidationErrors::into_result(errors)
    }

    /// Checks the stricter input-form rules (2 to 60 chars for name/surname).
    pub fn validate_input(&self) -> Result<(), ContactValidationErrors> {
        let mut errors = Vec::new();
        if !name_length_ok(&self.nombre) {
            errors.push(ContactValidationError::NombreLength);
        }
        if !name_length_ok(&self.apellido) {
            errors.push(ContactValidationError::ApellidoLength);
        }
        check_telefono(&self.telefono, &mut errors);
        check_email(&self.email, &mut errors);
        ContactValidationErrors::into_result(errors)
    }

    /// Boolean half of the `(ok, errors)` validation pair.
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }
}

/// Wire shape accepted before normalization.
#[derive(Deserialize)]
struct RawContact {
    #[serde(default)]
    id: Option<ContactId>,
    #[serde(default)]
    nombre: String,
    #[serde(default)]
    apellido: String,
    #[serde(default)]
    telefono: String,
    #[serde(default)]
    email: String,
}

impl From<RawContact> for Contact {
    fn from(raw: RawContact) -> Self {
        let mut contact = Self::new(raw.nombre, raw.apellido, raw.telefono, raw.email);
        contact.id = raw.id;
        contact
    }
}

/// Trims a text field value.
pub fn normalize_text(value: &str) -> String {
    value.trim().to_string()
}

/// Trims and lowercases an email value.
pub fn normalize_email(value: &str) -> String {
    value.trim().to_lowercase()
}

fn normalize_in_place(value: &mut String) {
    let trimmed = value.trim();
    if trimmed.len() != value.len() {
        *value = trimmed.to_string();
    }
}

fn name_length_ok(value: &str) -> bool {
    let chars = value.chars().count();
    (NAME_MIN_CHARS..=NAME_MAX_CHARS).contains(&chars)
}

pub(crate) fn check_telefono(value: &str, errors: &mut Vec<ContactValidationError>) {
    if value.is_empty() {
        errors.push(ContactValidationError::TelefonoRequired);
    } else if !PHONE_RE.is_match(value) {
        errors.push(ContactValidationError::TelefonoFormat);
    }
}

pub(crate) fn check_email(value: &str, errors: &mut Vec<ContactValidationError>) {
    if value.is_empty() {
        errors.push(ContactValidationError::EmailRequired);
    } else if !EMAIL_RE.is_match(value) {
        errors.push(ContactValidationError::EmailFormat);
    }
}

/// One violated contact rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContactValidationError {
    NombreRequired,
    ApellidoRequired,
    NombreLength,
    ApellidoLength,
    TelefonoRequired,
    TelefonoFormat,
    EmailRequired,
    EmailFormat,
}

impl ContactValidationError {
    /// User-facing message for this rule.
    pub fn message(self) -> &'static str {
        match self {
            Self::NombreRequired => "El nombre es obligatorio",
            Self::ApellidoRequired => "El apellido es obligatorio",
            Self::NombreLength => "El nombre debe tener entre 2 y 60 caracteres.",
            Self::ApellidoLength => "El apellido debe tener entre 2 y 60 caracteres.",
            Self::TelefonoRequired => "El teléfono es obligatorio",
            Self::TelefonoFormat => "El número de teléfono tiene un formato inválido",
            Self::EmailRequired => "El email es obligatorio",
            Self::EmailFormat => "El email tiene un formato inválido",
        }
    }
}

impl Display for ContactValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.message())
    }
}

impl Error for ContactValidationError {}

/// Ordered, non-empty set of violated rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContactValidationErrors(Vec<ContactValidationError>);

impl ContactValidationErrors {
    fn into_result(errors: Vec<ContactValidationError>) -> Result<(), Self> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(Self(errors))
        }
    }

    pub(crate) fn from_vec(errors: Vec<ContactValidationError>) -> Option<Self> {
        Self::into_result(errors).err()
    }

    /// Violated rules in check order.
    pub fn errors(&self) -> &[ContactValidationError] {
        &self.0
    }

    /// User-facing messages in check order.
    pub fn messages(&self) -> Vec<&'static str> {
        self.0.iter().map(|err| err.message()).collect()
    }

    pub fn contains(&self, error: ContactValidationError) -> bool {
        self.0.contains(&error)
    }
}

impl Display for ContactValidationErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.messages().join("; "))
    }
}

impl Error for ContactValidationErrors {}
