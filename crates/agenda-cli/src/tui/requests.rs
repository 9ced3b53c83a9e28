//! Service round-trips run off the UI loop
//!
//! The event loop never awaits the service directly. A key press yields a
//! [`Request`], which is performed on a spawned task; its [`Reply`] comes
//! back over a channel and is applied to the screen with the matching
//! `finish_*` call.

use std::sync::Arc;

use agenda_core::{
    Contact, ContactId, ContactService, PendingCreate, PendingUpdate, ServiceResult, SessionTicket,
};
use tokio::sync::mpsc::UnboundedSender;
use tracing::debug;

/// A round-trip to perform
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// Fetch every contact
    Load,
    /// Fetch one contact to edit it
    Fetch(SessionTicket, ContactId),
    /// Send an edited contact
    Update(PendingUpdate),
    /// Send a new contact
    Create(PendingCreate),
    /// Delete a contact
    Delete(ContactId),
}

/// Result of a round-trip, tagged with what it answers
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Loaded(ServiceResult<Vec<Contact>>),
    Fetched(SessionTicket, ServiceResult<Contact>),
    Updated(PendingUpdate, ServiceResult<()>),
    Created(PendingCreate, ServiceResult<Contact>),
    Deleted(ContactId, ServiceResult<()>),
}

/// Run one request against the service
pub async fn perform(service: &dyn ContactService, request: Request) -> Reply {
    match request {
        Request::Load => Reply::Loaded(service.list().await),
        Request::Fetch(ticket, id) => Reply::Fetched(ticket, service.get(id).await),
        Request::Update(pending) => {
            let result = service.update(&pending.contact).await;
            Reply::Updated(pending, result)
        }
        Request::Create(pending) => {
            let result = service.create(&pending.draft).await;
            Reply::Created(pending, result)
        }
        Request::Delete(id) => Reply::Deleted(id, service.delete(id).await),
    }
}

/// Perform `request` on a new task and send its reply to `tx`
pub fn spawn(service: &Arc<dyn ContactService>, request: Request, tx: &UnboundedSender<Reply>) {
    debug!("Dispatching {:?}", request);
    let service = Arc::clone(service);
    let tx = tx.clone();
    tokio::spawn(async move {
        let reply = perform(service.as_ref(), request).await;
        // The UI may have quit already
        let _ = tx.send(reply);
    });
}
