//! Remote contact service
//!
//! The `ContactService` trait is the port the screen controller talks to.
//! `HttpContactService` is the production adapter (REST/JSON over reqwest).
//!
//! ## Endpoints
//!
//! | Operation | Method | Path             |
//! |-----------|--------|------------------|
//! | list      | GET    | `/usuario`       |
//! | get       | GET    | `/usuario/{id}`  |
//! | create    | POST   | `/usuario`       |
//! | update    | PUT    | `/usuario/{id}`  |
//! | delete    | DELETE | `/usuario/{id}`  |

mod http;

use async_trait::async_trait;

use crate::error::ServiceResult;
use crate::models::{Contact, ContactDraft, ContactId};

pub use http::HttpContactService;

/// Resource path of contacts under the service base URL
pub const RESOURCE_PATH: &str = "usuario";

/// CRUD round-trips against the remote contact service
///
/// Implementations only report what happened; reconciling local state is the
/// caller's job.
#[async_trait]
pub trait ContactService: Send + Sync {
    /// Fetch every contact, in service order
    async fn list(&self) -> ServiceResult<Vec<Contact>>;

    /// Fetch one contact by id
    async fn get(&self, id: ContactId) -> ServiceResult<Contact>;

    /// Create a contact, returning the stored record with its new id
    async fn create(&self, draft: &ContactDraft) -> ServiceResult<Contact>;

    /// Replace a contact (keyed by `contact.id`)
    async fn update(&self, contact: &Contact) -> ServiceResult<()>;

    /// Delete a contact by id
    async fn delete(&self, id: ContactId) -> ServiceResult<()>;
}
