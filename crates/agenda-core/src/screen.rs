//! Contact screen controller
//!
//! `ContactScreen` owns the state behind the contact screen: the master list
//! (last known server state), the search term and the filtered view derived
//! from it, the single active mode, and the last notice shown to the user.
//! Presentation reads it through [`ScreenView`] snapshots and changes it only
//! through the operations below.
//!
//! ## Round-trips
//!
//! Every round-trip comes in two forms:
//!
//! - an async operation (`load_all`, `begin_edit`, `commit_edit`,
//!   `create_contact`, `delete_contact`) that calls the service and applies
//!   the result
//! - a `start_*` / `finish_*` pair, for callers that run the request elsewhere
//!   (the TUI spawns it on a task) and apply the reply later
//!
//! The async form is exactly start, one service call, finish.
//!
//! ## Failures
//!
//! A failed round-trip is logged, turned into a failure notice, and leaves
//! the store unchanged. Nothing is retried.

use std::sync::Arc;

use tracing::{debug, info, warn};

use crate::error::{ScreenError, ServiceError, ServiceResult};
use crate::filter::filter;
use crate::models::{Contact, ContactDraft, ContactField, ContactId};
use crate::service::ContactService;
use crate::session::{CreateSession, EditSession, SessionTicket};

/// What the screen is currently showing on top of the list
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum Mode {
    /// Just the list
    #[default]
    Closed,
    /// Read-only detail of one contact
    Viewing(Contact),
    /// Editing an existing contact
    Editing(EditSession),
    /// Creating a new contact
    Creating(CreateSession),
}

impl Mode {
    /// Short name for logs
    pub fn name(&self) -> &'static str {
        match self {
            Mode::Closed => "closed",
            Mode::Viewing(_) => "viewing",
            Mode::Editing(_) => "editing",
            Mode::Creating(_) => "creating",
        }
    }
}

/// Severity of a notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Failure,
}

/// User-visible outcome of the last operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Failure,
            message: message.into(),
        }
    }

    /// Whether this notice reports a failure
    pub fn is_failure(&self) -> bool {
        self.level == NoticeLevel::Failure
    }
}

/// Two-choice confirmation asked before a destructive call
///
/// Returning `false` cancels the operation.
pub trait Confirm {
    fn confirm_delete(&mut self, contact: &Contact) -> bool;
}

impl<F> Confirm for F
where
    F: FnMut(&Contact) -> bool,
{
    fn confirm_delete(&mut self, contact: &Contact) -> bool {
        self(contact)
    }
}

/// Result of a delete request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeleteOutcome {
    /// The user declined; nothing was sent
    Cancelled,
    /// The service deleted the contact and it was removed locally
    Deleted(Contact),
}

/// Request prepared by [`ContactScreen::start_commit`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingUpdate {
    pub ticket: SessionTicket,
    pub contact: Contact,
}

/// Request prepared by [`ContactScreen::start_create`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingCreate {
    pub ticket: SessionTicket,
    pub draft: ContactDraft,
}

/// Immutable snapshot handed to presentation
#[derive(Debug, Clone, Copy)]
pub struct ScreenView<'a> {
    /// Contacts to display (filtered view)
    pub contacts: &'a [Contact],
    /// Size of the master list
    pub total: usize,
    /// Active search term
    pub search_term: &'a str,
    /// Active mode
    pub mode: &'a Mode,
    /// Whether an edit fetch is in flight
    pub opening_edit: bool,
    /// Last notice
    pub notice: Option<&'a Notice>,
}

/// Screen-level state and the operations that mutate it
pub struct ContactScreen {
    service: Arc<dyn ContactService>,
    master: Vec<Contact>,
    filtered: Vec<Contact>,
    search_term: String,
    mode: Mode,
    /// Edit fetch in flight: ticket and contact id
    pending_edit: Option<(SessionTicket, ContactId)>,
    notice: Option<Notice>,
    next_ticket: u64,
}

impl ContactScreen {
    /// Create an empty screen backed by `service`
    pub fn new(service: Arc<dyn ContactService>) -> Self {
        Self {
            service,
            master: Vec::new(),
            filtered: Vec::new(),
            search_term: String::new(),
            mode: Mode::Closed,
            pending_edit: None,
            notice: None,
            next_ticket: 0,
        }
    }

    /// Shared handle to the service, for running requests elsewhere
    pub fn service(&self) -> Arc<dyn ContactService> {
        Arc::clone(&self.service)
    }

    // ==================== Reading ====================

    /// Snapshot for presentation
    pub fn view(&self) -> ScreenView<'_> {
        ScreenView {
            contacts: &self.filtered,
            total: self.master.len(),
            search_term: &self.search_term,
            mode: &self.mode,
            opening_edit: self.pending_edit.is_some(),
            notice: self.notice.as_ref(),
        }
    }

    /// Unfiltered list, in service order
    pub fn master(&self) -> &[Contact] {
        &self.master
    }

    /// Filtered view
    pub fn contacts(&self) -> &[Contact] {
        &self.filtered
    }

    /// Active search term
    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    /// Active mode
    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    /// Last notice
    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    /// Drop the last notice
    pub fn clear_notice(&mut self) {
        self.notice = None;
    }

    /// Find a contact in the master list
    pub fn find(&self, id: ContactId) -> Option<&Contact> {
        self.master.iter().find(|c| c.id == id)
    }

    // ==================== Fetch-all ====================

    /// Fetch every contact and replace the master list
    pub async fn load_all(&mut self) -> Result<(), ScreenError> {
        let result = self.service.list().await;
        self.finish_load(result)
    }

    /// Apply the reply of a list request
    pub fn finish_load(&mut self, result: ServiceResult<Vec<Contact>>) -> Result<(), ScreenError> {
        match result {
            Ok(contacts) => {
                info!("Loaded {} contacts", contacts.len());
                self.master = contacts;
                self.refilter();
                self.refresh_viewed();
                Ok(())
            }
            Err(e) => Err(self.fail("load contacts", e)),
        }
    }

    // ==================== Search ====================

    /// Set the search term and re-derive the filtered view from the master list
    pub fn set_search_term(&mut self, term: impl Into<String>) {
        self.search_term = term.into();
        self.refilter();
    }

    fn refilter(&mut self) {
        self.filtered = filter(&self.search_term, &self.master);
    }

    // ==================== Viewing ====================

    /// Show the detail of a contact from the store
    pub fn view_contact(&mut self, id: ContactId) -> Result<(), ScreenError> {
        let contact = self
            .find(id)
            .cloned()
            .ok_or(ScreenError::UnknownContact { id })?;
        self.set_mode(Mode::Viewing(contact));
        Ok(())
    }

    /// Re-seed the detail view from the master list; close it if the contact is gone
    fn refresh_viewed(&mut self) {
        let Mode::Viewing(viewed) = &self.mode else {
            return;
        };
        let id = viewed.id;
        match self.find(id).cloned() {
            Some(current) => self.mode = Mode::Viewing(current),
            None => {
                debug!("Viewed contact {} is no longer in the list", id);
                self.set_mode(Mode::Closed);
            }
        }
    }

    /// Return to the list, discarding any open session or pending edit fetch
    pub fn close(&mut self) {
        self.pending_edit = None;
        self.set_mode(Mode::Closed);
    }

    // ==================== Editing ====================

    /// Fetch a contact by id and open an edit session seeded with it
    pub async fn begin_edit(&mut self, id: ContactId) -> Result<(), ScreenError> {
        let ticket = self.start_edit(id);
        let result = self.service.get(id).await;
        self.finish_begin_edit(ticket, result)
    }

    /// Mark an edit fetch as pending
    ///
    /// No session is open until [`finish_begin_edit`](Self::finish_begin_edit)
    /// applies a successful reply with this ticket.
    pub fn start_edit(&mut self, id: ContactId) -> SessionTicket {
        let ticket = self.issue_ticket();
        debug!("Fetching contact {} for edit ({})", id, ticket);
        self.pending_edit = Some((ticket, id));
        ticket
    }

    /// Apply the reply of an edit fetch
    ///
    /// Replies whose ticket is not the pending one are ignored; the edit was
    /// cancelled or superseded while the request was in flight.
    pub fn finish_begin_edit(
        &mut self,
        ticket: SessionTicket,
        result: ServiceResult<Contact>,
    ) -> Result<(), ScreenError> {
        if !matches!(self.pending_edit, Some((pending, _)) if pending == ticket) {
            debug!("Ignoring stale edit fetch {}", ticket);
            return Ok(());
        }
        self.pending_edit = None;

        match result {
            Ok(contact) => {
                info!("Editing contact {}", contact.id);
                self.set_mode(Mode::Editing(EditSession::new(ticket, contact)));
                Ok(())
            }
            Err(e) => Err(self.fail("open contact for editing", e)),
        }
    }

    /// Replace one field of the open edit or create session
    pub fn update_field(
        &mut self,
        field: ContactField,
        value: impl Into<String>,
    ) -> Result<(), ScreenError> {
        match &mut self.mode {
            Mode::Editing(session) => session.update_field(field, value),
            Mode::Creating(session) => session.update_field(field, value),
            _ => return Err(ScreenError::NoActiveSession),
        }
        Ok(())
    }

    /// Send the edit session as an update and reconcile the store
    pub async fn commit_edit(&mut self) -> Result<Contact, ScreenError> {
        let pending = self.start_commit()?;
        let result = self.service.update(&pending.contact).await;
        self.finish_commit(pending, result)
    }

    /// Snapshot the edit session payload to send
    pub fn start_commit(&self) -> Result<PendingUpdate, ScreenError> {
        match &self.mode {
            Mode::Editing(session) => Ok(PendingUpdate {
                ticket: session.ticket(),
                contact: session.draft().clone(),
            }),
            _ => Err(ScreenError::NoActiveSession),
        }
    }

    /// Apply the reply of an update
    ///
    /// On success the master entry with the same id is replaced by the
    /// committed payload, and the session closes if it is still the one that
    /// was committed. On failure nothing changes and the session stays open.
    pub fn finish_commit(
        &mut self,
        pending: PendingUpdate,
        result: ServiceResult<()>,
    ) -> Result<Contact, ScreenError> {
        if let Err(e) = result {
            return Err(self.fail("save contact", e));
        }

        let contact = pending.contact;
        match self.master.iter_mut().find(|c| c.id == contact.id) {
            Some(entry) => *entry = contact.clone(),
            None => warn!("Updated contact {} is not in the list", contact.id),
        }
        self.refilter();
        self.refresh_viewed();

        if self.session_ticket() == Some(pending.ticket) {
            self.set_mode(Mode::Closed);
        } else {
            debug!("Edit session {} closed before its update returned", pending.ticket);
        }

        info!("Updated contact {}", contact.id);
        self.notice = Some(Notice::success(format!("Saved '{}'", display_name(&contact))));
        Ok(contact)
    }

    /// Discard the edit session without contacting the service
    pub fn cancel_edit(&mut self) {
        if matches!(self.mode, Mode::Editing(_)) {
            self.set_mode(Mode::Closed);
        }
        self.pending_edit = None;
    }

    // ==================== Creating ====================

    /// Open a create session with an empty draft
    pub fn begin_create(&mut self) {
        let ticket = self.issue_ticket();
        self.pending_edit = None;
        self.set_mode(Mode::Creating(CreateSession::new(ticket)));
    }

    /// Send the create session and append the created record
    pub async fn create_contact(&mut self) -> Result<Contact, ScreenError> {
        let pending = self.start_create()?;
        let result = self.service.create(&pending.draft).await;
        self.finish_create(pending, result)
    }

    /// Snapshot the create session payload to send
    pub fn start_create(&self) -> Result<PendingCreate, ScreenError> {
        match &self.mode {
            Mode::Creating(session) => Ok(PendingCreate {
                ticket: session.ticket(),
                draft: session.draft().clone(),
            }),
            _ => Err(ScreenError::NoActiveSession),
        }
    }

    /// Apply the reply of a create
    ///
    /// On success the returned record (with its server-assigned id) is
    /// appended to the master list.
    pub fn finish_create(
        &mut self,
        pending: PendingCreate,
        result: ServiceResult<Contact>,
    ) -> Result<Contact, ScreenError> {
        let created = match result {
            Ok(contact) => contact,
            Err(e) => return Err(self.fail("create contact", e)),
        };

        if self.find(created.id).is_some() {
            // Already present (e.g. a reload raced the create)
            warn!("Created contact {} is already in the list", created.id);
        } else {
            self.master.push(created.clone());
        }
        self.refilter();

        if self.session_ticket() == Some(pending.ticket) {
            self.set_mode(Mode::Closed);
        }

        info!("Created contact {}", created.id);
        self.notice = Some(Notice::success(format!("Created '{}'", display_name(&created))));
        Ok(created)
    }

    // ==================== Deleting ====================

    /// Ask for confirmation, then delete a contact and remove it locally
    pub async fn delete_contact(
        &mut self,
        id: ContactId,
        confirm: &mut impl Confirm,
    ) -> Result<DeleteOutcome, ScreenError> {
        if !self.confirm_delete(id, confirm)? {
            return Ok(DeleteOutcome::Cancelled);
        }
        let result = self.service.delete(id).await;
        self.finish_delete(id, result).map(DeleteOutcome::Deleted)
    }

    /// Ask `confirm` whether contact `id` should be deleted
    ///
    /// Fails without asking when the contact is not in the store.
    pub fn confirm_delete(
        &self,
        id: ContactId,
        confirm: &mut impl Confirm,
    ) -> Result<bool, ScreenError> {
        let contact = self.find(id).ok_or(ScreenError::UnknownContact { id })?;
        let confirmed = confirm.confirm_delete(contact);
        if !confirmed {
            debug!("Delete of contact {} cancelled", id);
        }
        Ok(confirmed)
    }

    /// Apply the reply of a delete
    ///
    /// The contact is removed only after the service confirmed the delete.
    pub fn finish_delete(
        &mut self,
        id: ContactId,
        result: ServiceResult<()>,
    ) -> Result<Contact, ScreenError> {
        if let Err(e) = result {
            return Err(self.fail("delete contact", e));
        }

        let Some(position) = self.master.iter().position(|c| c.id == id) else {
            // Removed by a reload while the request was in flight
            self.refilter();
            return Err(ScreenError::UnknownContact { id });
        };
        let removed = self.master.remove(position);
        self.refilter();

        if matches!(&self.mode, Mode::Viewing(c) if c.id == id) {
            self.set_mode(Mode::Closed);
        }

        info!("Deleted contact {}", id);
        self.notice = Some(Notice::success(format!(
            "Deleted '{}'",
            display_name(&removed)
        )));
        Ok(removed)
    }

    // ==================== Internals ====================

    fn issue_ticket(&mut self) -> SessionTicket {
        self.next_ticket += 1;
        SessionTicket::new(self.next_ticket)
    }

    fn session_ticket(&self) -> Option<SessionTicket> {
        match &self.mode {
            Mode::Editing(session) => Some(session.ticket()),
            Mode::Creating(session) => Some(session.ticket()),
            _ => None,
        }
    }

    fn set_mode(&mut self, mode: Mode) {
        if self.mode.name() != mode.name() {
            debug!("Mode {} -> {}", self.mode.name(), mode.name());
        }
        self.mode = mode;
    }

    /// Log a failed round-trip and surface it as a notice
    fn fail(&mut self, action: &str, error: ServiceError) -> ScreenError {
        warn!("Failed to {}: {}", action, error);
        self.notice = Some(Notice::failure(format!(
            "Could not {}. {}",
            action,
            error.user_notice()
        )));
        ScreenError::Service(error)
    }
}

fn display_name(contact: &Contact) -> String {
    let name = contact.full_name();
    if name.is_empty() {
        format!("#{}", contact.id)
    } else {
        name
    }
}
