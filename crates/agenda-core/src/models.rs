//! Data models for Agenda
//!
//! Defines the contact record as the remote service serves it, the id-less
//! draft used for creation, and the enumeration of editable fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize};

/// Server-assigned contact identifier
pub type ContactId = i64;

/// A persisted contact record
///
/// Field names on the wire are the service's own (`apeP`, `apeM`, ...).
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Contact {
    /// Unique identifier, assigned by the service
    pub id: ContactId,
    /// Given name
    #[serde(default, deserialize_with = "nullable_string")]
    pub nombre: String,
    /// Paternal surname
    #[serde(rename = "apeP", default, deserialize_with = "nullable_string")]
    pub ape_p: String,
    /// Maternal surname
    #[serde(rename = "apeM", default, deserialize_with = "nullable_string")]
    pub ape_m: String,
    /// Email address (not validated)
    #[serde(default, deserialize_with = "nullable_string")]
    pub correo: String,
    /// Phone number
    #[serde(default, deserialize_with = "nullable_string")]
    pub tel: String,
    /// Postal address
    #[serde(default, deserialize_with = "nullable_string")]
    pub dir: String,
}

impl Contact {
    /// Build a contact from a draft and the id the service assigned to it
    pub fn from_draft(id: ContactId, draft: ContactDraft) -> Self {
        Self {
            id,
            nombre: draft.nombre,
            ape_p: draft.ape_p,
            ape_m: draft.ape_m,
            correo: draft.correo,
            tel: draft.tel,
            dir: draft.dir,
        }
    }

    /// Full display name: given name followed by both surnames
    pub fn full_name(&self) -> String {
        join_name(&self.nombre, &self.ape_p, &self.ape_m)
    }

    /// Read a field by name
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Nombre => &self.nombre,
            ContactField::ApeP => &self.ape_p,
            ContactField::ApeM => &self.ape_m,
            ContactField::Correo => &self.correo,
            ContactField::Tel => &self.tel,
            ContactField::Dir => &self.dir,
        }
    }

    /// Replace a field by name
    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        *self.field_mut(field) = value.into();
    }

    fn field_mut(&mut self, field: ContactField) -> &mut String {
        match field {
            ContactField::Nombre => &mut self.nombre,
            ContactField::ApeP => &mut self.ape_p,
            ContactField::ApeM => &mut self.ape_m,
            ContactField::Correo => &mut self.correo,
            ContactField::Tel => &mut self.tel,
            ContactField::Dir => &mut self.dir,
        }
    }
}

/// Contact fields for a record the service has not assigned an id to yet
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ContactDraft {
    pub nombre: String,
    #[serde(rename = "apeP")]
    pub ape_p: String,
    #[serde(rename = "apeM")]
    pub ape_m: String,
    pub correo: String,
    pub tel: String,
    pub dir: String,
}

impl ContactDraft {
    /// Create an empty draft
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a field by name
    pub fn field(&self, field: ContactField) -> &str {
        match field {
            ContactField::Nombre => &self.nombre,
            ContactField::ApeP => &self.ape_p,
            ContactField::ApeM => &self.ape_m,
            ContactField::Correo => &self.correo,
            ContactField::Tel => &self.tel,
            ContactField::Dir => &self.dir,
        }
    }

    /// Replace a field by name
    pub fn set_field(&mut self, field: ContactField, value: impl Into<String>) {
        let slot = match field {
            ContactField::Nombre => &mut self.nombre,
            ContactField::ApeP => &mut self.ape_p,
            ContactField::ApeM => &mut self.ape_m,
            ContactField::Correo => &mut self.correo,
            ContactField::Tel => &mut self.tel,
            ContactField::Dir => &mut self.dir,
        };
        *slot = value.into();
    }

    /// Full display name of the draft
    pub fn full_name(&self) -> String {
        join_name(&self.nombre, &self.ape_p, &self.ape_m)
    }
}

impl From<Contact> for ContactDraft {
    fn from(contact: Contact) -> Self {
        Self {
            nombre: contact.nombre,
            ape_p: contact.ape_p,
            ape_m: contact.ape_m,
            correo: contact.correo,
            tel: contact.tel,
            dir: contact.dir,
        }
    }
}

/// The six editable contact fields
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ContactField {
    Nombre,
    ApeP,
    ApeM,
    Correo,
    Tel,
    Dir,
}

impl ContactField {
    /// All fields, in form order
    pub const ALL: [ContactField; 6] = [
        ContactField::Nombre,
        ContactField::ApeP,
        ContactField::ApeM,
        ContactField::Tel,
        ContactField::Correo,
        ContactField::Dir,
    ];

    /// Name used by the remote service
    pub fn wire_name(self) -> &'static str {
        match self {
            ContactField::Nombre => "nombre",
            ContactField::ApeP => "apeP",
            ContactField::ApeM => "apeM",
            ContactField::Correo => "correo",
            ContactField::Tel => "tel",
            ContactField::Dir => "dir",
        }
    }

    /// Human label for forms and detail views
    pub fn label(self) -> &'static str {
        match self {
            ContactField::Nombre => "Nombre",
            ContactField::ApeP => "Apellido paterno",
            ContactField::ApeM => "Apellido materno",
            ContactField::Correo => "Correo",
            ContactField::Tel => "Teléfono",
            ContactField::Dir => "Dirección",
        }
    }
}

impl fmt::Display for ContactField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// Error returned when parsing an unknown field name
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown contact field: '{0}'. Valid fields: nombre, apeP, apeM, correo, tel, dir")]
pub struct UnknownField(pub String);

impl FromStr for ContactField {
    type Err = UnknownField;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "nombre" => Ok(ContactField::Nombre),
            "apep" | "ape_p" => Ok(ContactField::ApeP),
            "apem" | "ape_m" => Ok(ContactField::ApeM),
            "correo" => Ok(ContactField::Correo),
            "tel" => Ok(ContactField::Tel),
            "dir" => Ok(ContactField::Dir),
            _ => Err(UnknownField(s.to_string())),
        }
    }
}

fn join_name(first: &str, second: &str, third: &str) -> String {
    [first, second, third]
        .iter()
        .map(|part| part.trim())
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Decode `null` (or a missing key, via `#[serde(default)]`) as an empty string
fn nullable_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_default())
}
