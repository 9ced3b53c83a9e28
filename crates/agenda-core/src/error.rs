//! Error handling
//!
//! Typed errors for round-trips with the remote contact service and for
//! operations on the screen controller.

use thiserror::Error;

use crate::models::ContactId;

/// Errors that can occur while talking to the remote contact service
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ServiceError {
    /// The request could not be sent or no response was received
    #[error("Could not reach the contact service: {message}")]
    Network { message: String, timed_out: bool },

    /// The service answered with a non-2xx status
    #[error("Contact service rejected the request with status {status}{}", body_suffix(.body))]
    Rejected { status: u16, body: String },

    /// No contact exists with the requested id
    #[error("Contact {id} not found")]
    NotFound { id: ContactId },

    /// The service answered 2xx but the body could not be decoded
    #[error("Unexpected response from the contact service: {details}")]
    InvalidResponse { details: String },
}

impl ServiceError {
    /// Build a network error from a transport message
    pub fn network(message: impl Into<String>) -> Self {
        ServiceError::Network {
            message: message.into(),
            timed_out: false,
        }
    }

    /// Build a network error for a request that timed out
    pub fn timeout(message: impl Into<String>) -> Self {
        ServiceError::Network {
            message: message.into(),
            timed_out: true,
        }
    }

    /// Build a rejection from a status code and (possibly empty) body preview
    pub fn rejected(status: u16, body: impl Into<String>) -> Self {
        ServiceError::Rejected {
            status,
            body: body.into(),
        }
    }

    /// Build a decoding error
    pub fn invalid_response(details: impl Into<String>) -> Self {
        ServiceError::InvalidResponse {
            details: details.into(),
        }
    }

    /// Message shown to the user in a notice
    ///
    /// Kept short; the full error goes to the log.
    pub fn user_notice(&self) -> String {
        match self {
            ServiceError::Network {
                timed_out: true, ..
            } => "The contact service did not answer in time.".to_string(),
            ServiceError::Network { .. } => {
                "Could not connect to the contact service. Check the base_url setting.".to_string()
            }
            ServiceError::Rejected { status, .. } => {
                format!("The contact service rejected the request (HTTP {}).", status)
            }
            ServiceError::NotFound { id } => format!("Contact {} no longer exists.", id),
            ServiceError::InvalidResponse { .. } => {
                "The contact service sent a response that could not be read.".to_string()
            }
        }
    }
}

fn body_suffix(body: &str) -> String {
    if body.is_empty() {
        String::new()
    } else {
        format!(": {}", body)
    }
}

/// Result type for service round-trips
pub type ServiceResult<T> = Result<T, ServiceError>;

/// Errors returned by the screen controller
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ScreenError {
    /// A session operation was requested while no matching session is open
    #[error("No contact is being edited or created")]
    NoActiveSession,

    /// The referenced contact is not in the local store
    #[error("Contact {id} is not in the list")]
    UnknownContact { id: ContactId },

    /// The remote round-trip failed
    #[error(transparent)]
    Service(#[from] ServiceError),
}

impl ScreenError {
    /// Message shown to the user in a notice
    pub fn user_notice(&self) -> String {
        match self {
            ScreenError::Service(e) => e.user_notice(),
            other => other.to_string(),
        }
    }
}
