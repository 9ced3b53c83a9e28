//! Search filtering
//!
//! Narrows the master list to the contacts whose name fields contain the
//! search term. Always applied to the full master list, never to a previous
//! result.

use crate::models::Contact;

/// Filter `master` by `term`
///
/// An empty term returns the master list unchanged. Otherwise a contact is
/// kept when its given name, paternal surname, or maternal surname contains
/// the term, ignoring case. Master order is preserved.
pub fn filter(term: &str, master: &[Contact]) -> Vec<Contact> {
    if term.is_empty() {
        return master.to_vec();
    }

    let needle = term.to_lowercase();
    master
        .iter()
        .filter(|contact| matches_lowercase(contact, &needle))
        .cloned()
        .collect()
}

/// Check a single contact against a search term
pub fn matches(contact: &Contact, term: &str) -> bool {
    term.is_empty() || matches_lowercase(contact, &term.to_lowercase())
}

fn matches_lowercase(contact: &Contact, needle: &str) -> bool {
    [&contact.nombre, &contact.ape_p, &contact.ape_m]
        .iter()
        .any(|field| field.to_lowercase().contains(needle))
}
