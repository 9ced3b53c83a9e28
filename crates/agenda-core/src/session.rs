//! Edit and create sessions
//!
//! A session is a transient draft of contact fields. It is not shared with the
//! contact store until committed, and it carries a ticket so that replies for
//! a session that has since been closed can be recognised.

use std::fmt;

use crate::models::{Contact, ContactDraft, ContactField, ContactId};

/// Identifies one session (or one pending edit fetch)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionTicket(u64);

impl SessionTicket {
    pub(crate) fn new(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for SessionTicket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Draft of an existing contact, seeded from a fetch by id
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditSession {
    ticket: SessionTicket,
    draft: Contact,
}

impl EditSession {
    pub(crate) fn new(ticket: SessionTicket, contact: Contact) -> Self {
        Self {
            ticket,
            draft: contact,
        }
    }

    /// Ticket identifying this session
    pub fn ticket(&self) -> SessionTicket {
        self.ticket
    }

    /// Id of the contact being edited
    pub fn id(&self) -> ContactId {
        self.draft.id
    }

    /// Current draft, including the id
    pub fn draft(&self) -> &Contact {
        &self.draft
    }

    /// Replace one field of the draft
    ///
    /// No validation is applied. The id is not an editable field.
    pub fn update_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.draft.set_field(field, value);
    }
}

/// Draft of a contact the service has not seen yet
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateSession {
    ticket: SessionTicket,
    draft: ContactDraft,
}

impl CreateSession {
    pub(crate) fn new(ticket: SessionTicket) -> Self {
        Self {
            ticket,
            draft: ContactDraft::default(),
        }
    }

    /// Ticket identifying this session
    pub fn ticket(&self) -> SessionTicket {
        self.ticket
    }

    /// Current draft
    pub fn draft(&self) -> &ContactDraft {
        &self.draft
    }

    /// Replace one field of the draft
    pub fn update_field(&mut self, field: ContactField, value: impl Into<String>) {
        self.draft.set_field(field, value);
    }
}
