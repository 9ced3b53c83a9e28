//! Shared helpers for agenda-core integration tests

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use agenda_core::{
    Contact, ContactDraft, ContactId, ContactScreen, ContactService, ServiceError, ServiceResult,
};
use async_trait::async_trait;

/// Kind of request, for injecting failures
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Op {
    List,
    Get,
    Create,
    Update,
    Delete,
}

/// A request the fake received
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    List,
    Get(ContactId),
    Create(ContactDraft),
    Update(Contact),
    Delete(ContactId),
}

#[derive(Default)]
struct FakeState {
    contacts: Vec<Contact>,
    next_id: ContactId,
    calls: Vec<Call>,
    failures: HashMap<Op, ServiceError>,
}

/// In-memory contact service that behaves like the real backend
#[derive(Default)]
pub struct FakeService {
    state: Mutex<FakeState>,
}

impl FakeService {
    pub fn with_contacts(contacts: Vec<Contact>) -> Arc<Self> {
        let next_id = contacts.iter().map(|c| c.id).max().unwrap_or(0) + 1;
        Arc::new(Self {
            state: Mutex::new(FakeState {
                contacts,
                next_id,
                ..FakeState::default()
            }),
        })
    }

    /// Make every request of kind `op` fail with `error` until cleared
    pub fn fail(&self, op: Op, error: ServiceError) {
        self.state.lock().unwrap().failures.insert(op, error);
    }

    pub fn clear_failures(&self) {
        self.state.lock().unwrap().failures.clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.state.lock().unwrap().calls.clone()
    }

    fn record(&self, op: Op, call: Call) -> Result<std::sync::MutexGuard<'_, FakeState>, ServiceError> {
        let mut state = self.state.lock().unwrap();
        state.calls.push(call);
        if let Some(error) = state.failures.get(&op).cloned() {
            return Err(error);
        }
        Ok(state)
    }
}

#[async_trait]
impl ContactService for FakeService {
    async fn list(&self) -> ServiceResult<Vec<Contact>> {
        let state = self.record(Op::List, Call::List)?;
        Ok(state.contacts.clone())
    }

    async fn get(&self, id: ContactId) -> ServiceResult<Contact> {
        let state = self.record(Op::Get, Call::Get(id))?;
        state
            .contacts
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or(ServiceError::NotFound { id })
    }

    async fn create(&self, draft: &ContactDraft) -> ServiceResult<Contact> {
        let mut state = self.record(Op::Create, Call::Create(draft.clone()))?;
        let id = state.next_id;
        state.next_id += 1;
        let contact = Contact::from_draft(id, draft.clone());
        state.contacts.push(contact.clone());
        Ok(contact)
    }

    async fn update(&self, contact: &Contact) -> ServiceResult<()> {
        let mut state = self.record(Op::Update, Call::Update(contact.clone()))?;
        match state.contacts.iter_mut().find(|c| c.id == contact.id) {
            Some(entry) => {
                *entry = contact.clone();
                Ok(())
            }
            None => Err(ServiceError::NotFound { id: contact.id }),
        }
    }

    async fn delete(&self, id: ContactId) -> ServiceResult<()> {
        let mut state = self.record(Op::Delete, Call::Delete(id))?;
        let before = state.contacts.len();
        state.contacts.retain(|c| c.id != id);
        if state.contacts.len() == before {
            return Err(ServiceError::NotFound { id });
        }
        Ok(())
    }
}

pub fn contact(id: ContactId, nombre: &str, ape_p: &str, ape_m: &str) -> Contact {
    Contact {
        id,
        nombre: nombre.to_string(),
        ape_p: ape_p.to_string(),
        ape_m: ape_m.to_string(),
        correo: format!("{}@example.com", nombre.to_lowercase()),
        tel: "555-0100".to_string(),
        dir: "Calle 1".to_string(),
    }
}

/// The two-contact store used throughout the scenarios
pub fn ana_and_ben() -> Vec<Contact> {
    vec![
        contact(1, "Ana", "Lopez", "Diaz"),
        contact(2, "Ben", "Cruz", "Ruiz"),
    ]
}

/// Screen backed by `service`, already loaded
pub async fn loaded_screen(service: &Arc<FakeService>) -> ContactScreen {
    let mut screen = ContactScreen::new(service.clone());
    screen.load_all().await.unwrap();
    screen
}
