//! Application state and logic

use std::time::{Duration, Instant};

use agenda_core::{Contact, ContactField, ContactId, ContactScreen, Mode, SessionTicket};

use super::requests::{Reply, Request};

/// How long a success message stays in the status bar
const STATUS_TIMEOUT: Duration = Duration::from_secs(3);

/// How long a failure message stays in the status bar
const ERROR_TIMEOUT: Duration = Duration::from_secs(8);

/// Input mode for the list
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Normal navigation mode
    Normal,
    /// Search input (after pressing /)
    Search,
}

/// Application state
pub struct App {
    /// Contact list state, shared with the CLI commands
    pub screen: ContactScreen,
    /// Whether the app should exit
    pub should_quit: bool,
    /// Current input mode
    pub input_mode: InputMode,
    /// Search input buffer
    pub search_input: String,
    /// Cursor position in search input, in characters
    pub search_cursor: usize,
    /// Selected row in the filtered list
    pub selected: usize,
    /// Focused field in the edit/create form (index into `ContactField::ALL`)
    pub form_field: usize,
    /// Contact awaiting a y/n answer before deletion
    pub pending_delete: Option<ContactId>,
    /// Status message to display temporarily
    pub status_message: Option<String>,
    /// Whether the status message reports a failure
    pub status_is_error: bool,
    /// When the status message was set (for auto-dismiss)
    pub status_message_time: Option<Instant>,
    /// Whether help overlay is visible
    pub show_help: bool,
    /// Requests sent and not answered yet
    pub in_flight: usize,
    /// Session of the submitted form whose reply is still awaited
    pub saving: Option<SessionTicket>,
}

impl App {
    pub fn new(screen: ContactScreen) -> Self {
        Self {
            screen,
            should_quit: false,
            input_mode: InputMode::Normal,
            search_input: String::new(),
            search_cursor: 0,
            selected: 0,
            form_field: 0,
            pending_delete: None,
            status_message: None,
            status_is_error: false,
            status_message_time: None,
            show_help: false,
            in_flight: 0,
            saving: None,
        }
    }

    // ==================== Status ====================

    /// Set a status message (auto-dismissed after a few seconds)
    pub fn set_status(&mut self, message: impl Into<String>, is_error: bool) {
        self.status_message = Some(message.into());
        self.status_is_error = is_error;
        self.status_message_time = Some(Instant::now());
    }

    /// Check and clear expired status message
    pub fn check_status_timeout(&mut self) {
        let timeout = if self.status_is_error {
            ERROR_TIMEOUT
        } else {
            STATUS_TIMEOUT
        };
        if let Some(time) = self.status_message_time {
            if time.elapsed() > timeout {
                self.status_message = None;
                self.status_message_time = None;
            }
        }
    }

    /// Toggle help overlay
    pub fn toggle_help(&mut self) {
        self.show_help = !self.show_help;
    }

    /// Whether any request is in flight
    pub fn is_busy(&self) -> bool {
        self.in_flight > 0
    }

    // ==================== List ====================

    /// Get the currently selected contact
    pub fn current_contact(&self) -> Option<&Contact> {
        self.screen.contacts().get(self.selected)
    }

    /// Contact shown in the detail pane: the one being viewed, else the selection
    pub fn detail_contact(&self) -> Option<&Contact> {
        match self.screen.mode() {
            Mode::Viewing(contact) => Some(contact),
            _ => self.current_contact(),
        }
    }

    pub fn move_up(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.follow_selection();
        }
    }

    pub fn move_down(&mut self) {
        if self.selected < self.screen.contacts().len().saturating_sub(1) {
            self.selected += 1;
            self.follow_selection();
        }
    }

    pub fn move_to_first(&mut self) {
        self.selected = 0;
        self.follow_selection();
    }

    pub fn move_to_last(&mut self) {
        self.selected = self.screen.contacts().len().saturating_sub(1);
        self.follow_selection();
    }

    /// Keep an open detail view on the selected contact
    fn follow_selection(&mut self) {
        if matches!(self.screen.mode(), Mode::Viewing(_)) {
            self.open_detail();
        }
    }

    /// Clamp selection to the list bounds after it changed
    fn clamp_selection(&mut self) {
        let len = self.screen.contacts().len();
        self.selected = if len == 0 { 0 } else { self.selected.min(len - 1) };
    }

    /// Fetch the whole list again
    pub fn reload(&mut self) -> Request {
        self.in_flight += 1;
        Request::Load
    }

    // ==================== Search ====================

    pub fn enter_search_mode(&mut self) {
        self.input_mode = InputMode::Search;
        self.search_input = self.screen.search_term().to_string();
        self.search_cursor = self.search_input.chars().count();
    }

    /// Leave search input, keeping the filter
    pub fn exit_search_mode(&mut self) {
        self.input_mode = InputMode::Normal;
    }

    /// Leave search input and drop the filter
    pub fn clear_search(&mut self) {
        self.input_mode = InputMode::Normal;
        self.search_input.clear();
        self.search_cursor = 0;
        self.apply_search();
    }

    pub fn insert_char(&mut self, c: char) {
        let at = byte_index(&self.search_input, self.search_cursor);
        self.search_input.insert(at, c);
        self.search_cursor += 1;
        self.apply_search();
    }

    pub fn delete_char(&mut self) {
        if self.search_cursor == 0 {
            return;
        }
        self.search_cursor -= 1;
        let at = byte_index(&self.search_input, self.search_cursor);
        self.search_input.remove(at);
        self.apply_search();
    }

    pub fn cursor_left(&mut self) {
        self.search_cursor = self.search_cursor.saturating_sub(1);
    }

    pub fn cursor_right(&mut self) {
        if self.search_cursor < self.search_input.chars().count() {
            self.search_cursor += 1;
        }
    }

    /// Re-filter as the user types
    fn apply_search(&mut self) {
        self.screen.set_search_term(self.search_input.clone());
        self.selected = 0;
        self.clamp_selection();
    }

    // ==================== Detail ====================

    /// Show the selected contact in the detail pane
    pub fn open_detail(&mut self) {
        let Some(id) = self.current_contact().map(|c| c.id) else {
            return;
        };
        if let Err(e) = self.screen.view_contact(id) {
            self.set_status(e.user_notice(), true);
        }
    }

    /// Back to the plain list; also abandons an edit that is still loading
    pub fn close_detail(&mut self) {
        self.screen.close();
    }

    // ==================== Form ====================

    /// Whether the edit/create form is open
    pub fn form_open(&self) -> bool {
        matches!(self.screen.mode(), Mode::Editing(_) | Mode::Creating(_))
    }

    /// Field with input focus
    pub fn focused_field(&self) -> ContactField {
        ContactField::ALL[self.form_field % ContactField::ALL.len()]
    }

    /// Current value of a form field
    pub fn form_value(&self, field: ContactField) -> &str {
        match self.screen.mode() {
            Mode::Editing(session) => session.draft().field(field),
            Mode::Creating(session) => session.draft().field(field),
            _ => "",
        }
    }

    /// Start editing the viewed or selected contact
    ///
    /// The form opens when the fetch reply arrives.
    pub fn begin_edit(&mut self) -> Option<Request> {
        let id = self.detail_contact()?.id;
        let ticket = self.screen.start_edit(id);
        self.form_field = 0;
        self.saving = None;
        self.in_flight += 1;
        Some(Request::Fetch(ticket, id))
    }

    pub fn begin_create(&mut self) {
        self.screen.begin_create();
        self.form_field = 0;
        self.saving = None;
    }

    pub fn next_field(&mut self) {
        self.form_field = (self.form_field + 1) % ContactField::ALL.len();
    }

    pub fn prev_field(&mut self) {
        let len = ContactField::ALL.len();
        self.form_field = (self.form_field + len - 1) % len;
    }

    pub fn form_insert_char(&mut self, c: char) {
        self.edit_focused(|value| value.push(c));
    }

    pub fn form_delete_char(&mut self) {
        self.edit_focused(|value| {
            value.pop();
        });
    }

    pub fn form_clear_field(&mut self) {
        self.edit_focused(String::clear);
    }

    fn edit_focused(&mut self, change: impl FnOnce(&mut String)) {
        let field = self.focused_field();
        let mut value = self.form_value(field).to_string();
        change(&mut value);
        if let Err(e) = self.screen.update_field(field, value) {
            self.set_status(e.user_notice(), true);
        }
    }

    /// Send the open form; ignored while a previous submit is in flight
    pub fn submit_form(&mut self) -> Option<Request> {
        if self.saving.is_some() {
            return None;
        }
        let (ticket, request) = match self.screen.mode() {
            Mode::Editing(_) => {
                let pending = self.screen.start_commit().ok()?;
                (pending.ticket, Request::Update(pending))
            }
            Mode::Creating(_) => {
                let pending = self.screen.start_create().ok()?;
                (pending.ticket, Request::Create(pending))
            }
            _ => return None,
        };
        self.saving = Some(ticket);
        self.in_flight += 1;
        Some(request)
    }

    /// Discard the open form
    pub fn cancel_form(&mut self) {
        self.screen.close();
        self.saving = None;
    }

    // ==================== Delete ====================

    /// Ask before deleting the viewed or selected contact
    pub fn request_delete(&mut self) {
        self.pending_delete = self.detail_contact().map(|c| c.id);
    }

    /// Contact named in the delete popup
    pub fn pending_delete_contact(&self) -> Option<&Contact> {
        self.pending_delete.and_then(|id| self.screen.find(id))
    }

    /// Answer the delete popup
    pub fn answer_delete(&mut self, yes: bool) -> Option<Request> {
        let id = self.pending_delete.take()?;
        match self.screen.confirm_delete(id, &mut |_: &Contact| yes) {
            Ok(true) => {
                self.in_flight += 1;
                Some(Request::Delete(id))
            }
            Ok(false) => {
                self.set_status("Delete cancelled", false);
                None
            }
            Err(e) => {
                self.set_status(e.user_notice(), true);
                None
            }
        }
    }

    // ==================== Replies ====================

    /// Apply a round-trip reply to the screen
    pub fn apply(&mut self, reply: Reply) {
        self.in_flight = self.in_flight.saturating_sub(1);

        let result = match reply {
            Reply::Loaded(result) => self.screen.finish_load(result),
            Reply::Fetched(ticket, result) => self.screen.finish_begin_edit(ticket, result),
            Reply::Updated(pending, result) => {
                self.settle_save(pending.ticket);
                self.screen.finish_commit(pending, result).map(drop)
            }
            Reply::Created(pending, result) => {
                self.settle_save(pending.ticket);
                self.screen.finish_create(pending, result).map(drop)
            }
            Reply::Deleted(id, result) => self.screen.finish_delete(id, result).map(drop),
        };

        match self.screen.notice().cloned() {
            Some(notice) => {
                let is_error = notice.is_failure();
                self.set_status(notice.message, is_error);
                self.screen.clear_notice();
            }
            None => {
                if let Err(e) = result {
                    self.set_status(e.user_notice(), true);
                }
            }
        }

        self.clamp_selection();
    }

    /// Allow saving again once the reply for the open form's submit is in
    fn settle_save(&mut self, ticket: SessionTicket) {
        if self.saving == Some(ticket) {
            self.saving = None;
        }
    }
}

/// Byte offset of the `char_index`-th character
fn byte_index(s: &str, char_index: usize) -> usize {
    s.char_indices()
        .nth(char_index)
        .map(|(i, _)| i)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use agenda_core::{ContactDraft, ContactService, ServiceError, ServiceResult};
    use async_trait::async_trait;
    use std::sync::Arc;

    /// The app never awaits the service; replies are fed in by the tests
    struct Offline;

    #[async_trait]
    impl ContactService for Offline {
        async fn list(&self) -> ServiceResult<Vec<Contact>> {
            Err(ServiceError::network("offline"))
        }
        async fn get(&self, _id: ContactId) -> ServiceResult<Contact> {
            Err(ServiceError::network("offline"))
        }
        async fn create(&self, _draft: &ContactDraft) -> ServiceResult<Contact> {
            Err(ServiceError::network("offline"))
        }
        async fn update(&self, _contact: &Contact) -> ServiceResult<()> {
            Err(ServiceError::network("offline"))
        }
        async fn delete(&self, _id: ContactId) -> ServiceResult<()> {
            Err(ServiceError::network("offline"))
        }
    }

    fn contact(id: ContactId, nombre: &str, ape_p: &str) -> Contact {
        Contact {
            id,
            nombre: nombre.to_string(),
            ape_p: ape_p.to_string(),
            ..Contact::default()
        }
    }

    fn loaded_app() -> App {
        let mut app = App::new(ContactScreen::new(Arc::new(Offline)));
        let request = app.reload();
        assert_eq!(request, Request::Load);
        app.apply(Reply::Loaded(Ok(vec![
            contact(1, "Ana", "Lopez"),
            contact(2, "Ben", "Cruz"),
        ])));
        app
    }

    #[test]
    fn test_load_reply_fills_list() {
        let app = loaded_app();
        assert_eq!(app.screen.contacts().len(), 2);
        assert_eq!(app.current_contact().unwrap().id, 1);
        assert!(!app.is_busy());
    }

    #[test]
    fn test_failed_load_shows_error() {
        let mut app = loaded_app();
        app.reload();
        app.apply(Reply::Loaded(Err(ServiceError::network("connection refused"))));

        assert!(app.status_is_error);
        assert!(app.status_message.as_ref().unwrap().starts_with("Could not load contacts"));
        assert_eq!(app.screen.contacts().len(), 2);
    }

    #[test]
    fn test_search_filters_while_typing() {
        let mut app = loaded_app();
        app.move_down();
        app.enter_search_mode();
        app.insert_char('c');
        app.insert_char('r');

        let ids: Vec<_> = app.screen.contacts().iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![2]);
        assert_eq!(app.selected, 0);

        app.exit_search_mode();
        assert_eq!(app.input_mode, InputMode::Normal);
        assert_eq!(app.screen.search_term(), "cr");

        app.enter_search_mode();
        assert_eq!(app.search_cursor, 2);
        app.clear_search();
        assert_eq!(app.screen.contacts().len(), 2);
    }

    #[test]
    fn test_search_cursor_handles_multibyte() {
        let mut app = loaded_app();
        app.enter_search_mode();
        for c in "peña".chars() {
            app.insert_char(c);
        }
        app.cursor_left();
        app.delete_char();
        assert_eq!(app.search_input, "pea");
        app.cursor_right();
        app.cursor_right();
        assert_eq!(app.search_cursor, 3);
    }

    #[test]
    fn test_edit_round_trip() {
        let mut app = loaded_app();

        let Some(Request::Fetch(ticket, 1)) = app.begin_edit() else {
            panic!("expected fetch of contact 1");
        };
        assert!(!app.form_open());
        assert!(app.screen.view().opening_edit);

        app.apply(Reply::Fetched(ticket, Ok(contact(1, "Ana", "Lopez"))));
        assert!(app.form_open());
        assert_eq!(app.focused_field(), ContactField::Nombre);

        app.form_delete_char();
        app.form_insert_char('í');
        assert_eq!(app.form_value(ContactField::Nombre), "Aní");

        let Some(Request::Update(pending)) = app.submit_form() else {
            panic!("expected update");
        };
        assert_eq!(pending.contact.nombre, "Aní");
        // Second Enter while saving sends nothing
        assert_eq!(app.submit_form(), None);

        app.apply(Reply::Updated(pending, Ok(())));
        assert!(!app.form_open());
        assert_eq!(app.saving, None);
        assert_eq!(app.screen.find(1).unwrap().nombre, "Aní");
        assert_eq!(app.status_message.as_deref(), Some("Saved 'Aní Lopez'"));
        assert!(!app.status_is_error);
    }

    #[test]
    fn test_failed_update_keeps_form_open() {
        let mut app = loaded_app();
        let Some(Request::Fetch(ticket, _)) = app.begin_edit() else {
            panic!("expected fetch");
        };
        app.apply(Reply::Fetched(ticket, Ok(contact(1, "Ana", "Lopez"))));
        app.form_clear_field();

        let Some(Request::Update(pending)) = app.submit_form() else {
            panic!("expected update");
        };
        app.apply(Reply::Updated(pending, Err(ServiceError::rejected(500, "boom"))));

        assert!(app.form_open());
        assert_eq!(app.saving, None);
        assert!(app.status_is_error);
        assert_eq!(app.screen.find(1).unwrap().nombre, "Ana");
    }

    #[test]
    fn test_closing_abandons_loading_edit() {
        let mut app = loaded_app();
        let Some(Request::Fetch(ticket, _)) = app.begin_edit() else {
            panic!("expected fetch");
        };
        app.close_detail();
        app.apply(Reply::Fetched(ticket, Ok(contact(1, "Ana", "Lopez"))));
        assert!(!app.form_open());
    }

    #[test]
    fn test_create_appends_contact() {
        let mut app = loaded_app();
        app.begin_create();
        app.form_insert_char('C');
        app.form_insert_char('y');
        app.next_field();
        assert_eq!(app.focused_field(), ContactField::ApeP);

        let Some(Request::Create(pending)) = app.submit_form() else {
            panic!("expected create");
        };
        assert_eq!(pending.draft.nombre, "Cy");

        app.apply(Reply::Created(pending, Ok(contact(3, "Cy", ""))));
        assert!(!app.form_open());
        assert_eq!(app.screen.contacts().len(), 3);
        assert_eq!(app.status_message.as_deref(), Some("Created 'Cy'"));
    }

    #[test]
    fn test_late_update_reply_does_not_unlock_new_form() {
        let mut app = loaded_app();
        let Some(Request::Fetch(ticket, _)) = app.begin_edit() else {
            panic!("expected fetch");
        };
        app.apply(Reply::Fetched(ticket, Ok(contact(1, "Ana", "Lopez"))));
        let Some(Request::Update(old)) = app.submit_form() else {
            panic!("expected update");
        };

        app.cancel_form();
        app.begin_create();
        app.form_insert_char('C');
        let Some(Request::Create(pending)) = app.submit_form() else {
            panic!("expected create");
        };

        // The abandoned edit returns while the create is still in flight
        app.apply(Reply::Updated(old, Ok(())));
        assert!(app.form_open());
        assert_eq!(app.saving, Some(pending.ticket));
        assert_eq!(app.submit_form(), None);

        app.apply(Reply::Created(pending, Ok(contact(3, "C", ""))));
        assert_eq!(app.saving, None);
        assert!(!app.form_open());
        assert_eq!(app.screen.contacts().len(), 3);
    }

    #[test]
    fn test_form_field_focus_wraps() {
        let mut app = loaded_app();
        app.begin_create();
        app.prev_field();
        assert_eq!(app.focused_field(), ContactField::Dir);
        app.next_field();
        assert_eq!(app.focused_field(), ContactField::Nombre);
    }

    #[test]
    fn test_delete_needs_yes() {
        let mut app = loaded_app();
        app.request_delete();
        assert_eq!(app.pending_delete_contact().unwrap().id, 1);

        assert_eq!(app.answer_delete(false), None);
        assert_eq!(app.pending_delete, None);
        assert_eq!(app.status_message.as_deref(), Some("Delete cancelled"));
        assert_eq!(app.screen.contacts().len(), 2);

        app.request_delete();
        assert_eq!(app.answer_delete(true), Some(Request::Delete(1)));
        app.apply(Reply::Deleted(1, Ok(())));
        assert_eq!(app.screen.contacts().len(), 1);
        assert_eq!(app.current_contact().unwrap().id, 2);
    }

    #[test]
    fn test_selection_clamped_after_deleting_last_row() {
        let mut app = loaded_app();
        app.move_to_last();
        app.request_delete();
        let request = app.answer_delete(true);
        assert_eq!(request, Some(Request::Delete(2)));

        app.apply(Reply::Deleted(2, Ok(())));
        assert_eq!(app.selected, 0);
    }

    #[test]
    fn test_failed_delete_keeps_contact() {
        let mut app = loaded_app();
        app.request_delete();
        app.answer_delete(true);
        app.apply(Reply::Deleted(1, Err(ServiceError::rejected(500, ""))));

        assert_eq!(app.screen.contacts().len(), 2);
        assert!(app.status_is_error);
    }

    #[test]
    fn test_detail_follows_selection() {
        let mut app = loaded_app();
        app.open_detail();
        app.move_down();
        assert!(matches!(app.screen.mode(), Mode::Viewing(c) if c.id == 2));
        app.close_detail();
        assert_eq!(app.screen.mode(), &Mode::Closed);
    }
}
