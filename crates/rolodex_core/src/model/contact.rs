//! Contact domain model.
//!
//! # Responsibility
//! - Define the contact record and its identifier.
//! - Provide the note-appending helper used by the manager.
//!
//! # Invariants
//! - `id` is assigned by the manager and never reused.
//! - `notes` only grows; earlier fragments are never rewritten.

use serde::{Deserialize, Serialize};
use std::fmt::{Display, Formatter};

/// Stable identifier for a contact.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ContactId(pub i64);

impl Display for ContactId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for ContactId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A named person with free-text notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    pub id: ContactId,
    pub name: String,
    pub notes: String,
}

impl Contact {
    pub fn new(id: ContactId, name: impl Into<String>, notes: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            notes: notes.into(),
        }
    }

    /// Appends a note fragment, separated from existing notes by `", "`.
    pub fn add_notes(&mut self, text: &str) {
        super::append_notes(&mut self.notes, text);
    }

    /// Case-sensitive substring match on the contact name.
    ///
    /// A blank query never matches.
    pub fn name_matches(&self, query: &str) -> bool {
        !query.trim().is_empty() && self.name.contains(query)
    }
}

#[cfg(test)]
mod tests {
    use super::{Contact, ContactId};

    #[test]
    fn add_notes_accumulates() {
        let mut contact = Contact::new(ContactId(1), "Alan", "nice");
        contact.add_notes("likes cheese");
        assert_eq!(contact.notes, "nice, likes cheese");
    }

    #[test]
    fn name_matches_substring_but_not_blank() {
        let contact = Contact::new(ContactId(1), "Alan Turing", "");
        assert!(contact.name_matches("Alan"));
        assert!(contact.name_matches("Turing"));
        assert!(!contact.name_matches("alan"));
        assert!(!contact.name_matches(""));
        assert!(!contact.name_matches("   "));
    }

    #[test]
    fn contact_id_serializes_as_plain_integer() {
        let json = serde_json::to_string(&ContactId(7)).expect("contact id should serialize");
        assert_eq!(json, "7");
    }
}
