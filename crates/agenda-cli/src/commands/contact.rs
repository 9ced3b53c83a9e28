//! Contact command handlers
//!
//! Each command drives the same `ContactScreen` the TUI uses, so the CLI
//! reports exactly the notices the screen produces.

use anyhow::{anyhow, bail, Result};
use clap::Args;

use agenda_core::{Contact, ContactField, ContactId, ContactScreen, DeleteOutcome, Mode, ScreenError};

use crate::output::Output;
use crate::prompt::{confirm, prompt_with_default};

/// Field values given as flags
#[derive(Args, Debug, Clone, Default)]
pub struct FieldArgs {
    /// First name
    #[arg(long)]
    pub nombre: Option<String>,
    /// Paternal surname
    #[arg(long)]
    pub ape_p: Option<String>,
    /// Maternal surname
    #[arg(long)]
    pub ape_m: Option<String>,
    /// Phone number
    #[arg(long)]
    pub tel: Option<String>,
    /// Email address
    #[arg(long)]
    pub correo: Option<String>,
    /// Postal address
    #[arg(long)]
    pub dir: Option<String>,
}

impl FieldArgs {
    fn get(&self, field: ContactField) -> Option<&str> {
        match field {
            ContactField::Nombre => self.nombre.as_deref(),
            ContactField::ApeP => self.ape_p.as_deref(),
            ContactField::ApeM => self.ape_m.as_deref(),
            ContactField::Tel => self.tel.as_deref(),
            ContactField::Correo => self.correo.as_deref(),
            ContactField::Dir => self.dir.as_deref(),
        }
    }

    /// Fields that were given, in form order
    pub fn values(&self) -> Vec<(ContactField, &str)> {
        ContactField::ALL
            .into_iter()
            .filter_map(|field| self.get(field).map(|value| (field, value)))
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.values().is_empty()
    }
}

/// List contacts, optionally narrowed by a search term
pub async fn list(screen: &mut ContactScreen, search: Option<String>, output: &Output) -> Result<()> {
    screen.load_all().await.map_err(|e| failure(screen, e))?;
    if let Some(term) = search {
        screen.set_search_term(term);
    }

    let view = screen.view();
    output.print_contacts(view.contacts, view.total);
    Ok(())
}

/// Show a single contact
pub async fn show(screen: &mut ContactScreen, id: ContactId, output: &Output) -> Result<()> {
    screen.load_all().await.map_err(|e| failure(screen, e))?;
    screen.view_contact(id).map_err(|e| failure(screen, e))?;

    if let Mode::Viewing(contact) = screen.mode() {
        output.print_contact(contact);
    }
    Ok(())
}

/// Create a contact from flags, or by prompting for each field
pub async fn create(screen: &mut ContactScreen, fields: FieldArgs, output: &Output) -> Result<()> {
    screen.begin_create();

    if fields.is_empty() && output.should_prompt() {
        println!("New contact. Leave a field blank to skip it.\n");
        for field in ContactField::ALL {
            if let Some(value) = prompt_with_default(field.label(), "")? {
                screen.update_field(field, value)?;
            }
        }
    } else {
        apply_fields(screen, &fields)?;
    }

    let created = screen.create_contact().await.map_err(|e| failure(screen, e))?;
    report(screen, output);
    output.print_contact(&created);
    Ok(())
}

/// Edit a contact from flags, or by prompting for each field
pub async fn edit(
    screen: &mut ContactScreen,
    id: ContactId,
    fields: FieldArgs,
    output: &Output,
) -> Result<()> {
    screen.begin_edit(id).await.map_err(|e| failure(screen, e))?;

    if fields.is_empty() {
        if !output.should_prompt() {
            bail!("Nothing to change. Pass field flags (e.g. --tel 555-0101) or run without --json/--quiet.");
        }

        println!("Editing contact: {}", id);
        println!("Press Enter to keep current value, or type new value.\n");
        for field in ContactField::ALL {
            let current = match screen.mode() {
                Mode::Editing(session) => session.draft().field(field).to_string(),
                _ => String::new(),
            };
            if let Some(value) = prompt_with_default(field.label(), &current)? {
                screen.update_field(field, value)?;
            }
        }
    } else {
        apply_fields(screen, &fields)?;
    }

    let saved = screen.commit_edit().await.map_err(|e| failure(screen, e))?;
    report(screen, output);
    output.print_contact(&saved);
    Ok(())
}

/// Delete a contact after confirmation
pub async fn delete(screen: &mut ContactScreen, id: ContactId, yes: bool, output: &Output) -> Result<()> {
    screen.load_all().await.map_err(|e| failure(screen, e))?;

    let prompt = output.should_prompt() && !yes;
    let mut ask = |contact: &Contact| -> bool {
        if !prompt {
            return true;
        }
        println!("Delete contact: {} - {}", contact.id, contact.full_name());
        confirm("Are you sure?").unwrap_or(false)
    };

    let outcome = screen
        .delete_contact(id, &mut ask)
        .await
        .map_err(|e| failure(screen, e))?;

    match outcome {
        DeleteOutcome::Cancelled => output.message("Cancelled."),
        DeleteOutcome::Deleted(_) => report(screen, output),
    }
    Ok(())
}

fn apply_fields(screen: &mut ContactScreen, fields: &FieldArgs) -> Result<()> {
    for (field, value) in fields.values() {
        screen.update_field(field, value)?;
    }
    Ok(())
}

/// Print the success notice of the last round-trip
fn report(screen: &ContactScreen, output: &Output) {
    if let Some(notice) = screen.notice() {
        output.success(&notice.message);
    }
}

/// Error carrying the notice the screen recorded for a failed round-trip
fn failure(screen: &ContactScreen, err: ScreenError) -> anyhow::Error {
    match (&err, screen.notice()) {
        (ScreenError::Service(_), Some(notice)) if notice.is_failure() => {
            anyhow!("{}", notice.message)
        }
        _ => anyhow!("{}", err.user_notice()),
    }
}
