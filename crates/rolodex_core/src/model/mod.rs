//! Domain model for contacts and meetings.
//!
//! # Responsibility
//! - Define the canonical records owned by the contact manager.
//! - Keep future/past meeting variants under one tagged union.
//!
//! # Invariants
//! - Contacts and meetings are identified by integer ids assigned once.
//! - Meetings reference participants by `ContactId`, never by ownership.
//! - Nothing in the model is ever deleted.

pub mod contact;
pub mod meeting;

/// Separator inserted between accumulated note fragments.
pub const NOTES_SEPARATOR: &str = ", ";

/// Appends `text` to `notes` using [`NOTES_SEPARATOR`].
///
/// Empty existing notes take the new text verbatim.
pub(crate) fn append_notes(notes: &mut String, text: &str) {
    if !notes.is_empty() {
        notes.push_str(NOTES_SEPARATOR);
    }
    notes.push_str(text);
}
