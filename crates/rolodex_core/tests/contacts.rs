mod common;

use common::with_book;
use rolodex_core::{ContactId, ErrorKind, ManagerError};

#[test]
fn add_contact_assigns_sequential_ids() {
    with_book(|book, _| {
        let id = book.add_contact("Fred", "new").unwrap();
        assert_eq!(id, ContactId(3));

        let fred = book.get_contact(id).unwrap();
        assert_eq!(fred.name, "Fred");
        assert_eq!(fred.notes, "new");
    });
}

#[test]
fn add_contact_rejects_missing_name_or_notes() {
    with_book(|book, _| {
        let name_err = book.add_contact(None, "notes").unwrap_err();
        assert!(matches!(name_err, ManagerError::MissingArgument("name")));
        assert_eq!(name_err.kind(), ErrorKind::NullArgument);

        let notes_err = book.add_contact("Fred", None).unwrap_err();
        assert!(matches!(notes_err, ManagerError::MissingArgument("notes")));

        assert_eq!(book.contacts().count(), 2);
        // Rejected calls do not consume ids.
        assert_eq!(book.add_contact("Fred", "").unwrap(), ContactId(3));
    });
}

#[test]
fn search_by_exact_name_returns_contact() {
    with_book(|book, _| {
        let found = book.get_contacts_by_name("Alan").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, ContactId(1));
        assert_eq!(found[0].notes, "nice");
    });
}

#[test]
fn search_by_unrelated_or_blank_name_returns_empty() {
    with_book(|book, _| {
        assert!(book.get_contacts_by_name("Gandalf").unwrap().is_empty());
        assert!(book.get_contacts_by_name("").unwrap().is_empty());
    });
}

#[test]
fn search_matches_name_substrings_in_id_order() {
    with_book(|book, _| {
        book.add_contact("Alana", "").unwrap();
        let found = book.get_contacts_by_name("Ala").unwrap();
        let ids: Vec<ContactId> = found.iter().map(|contact| contact.id).collect();
        assert_eq!(ids, vec![ContactId(1), ContactId(3)]);
    });
}

#[test]
fn search_without_query_is_null_argument() {
    with_book(|book, _| {
        let err = book.get_contacts_by_name(None).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::NullArgument);
    });
}

#[test]
fn get_contacts_by_ids_returns_all_known() {
    with_book(|book, _| {
        let found = book
            .get_contacts_by_ids(&[ContactId(2), ContactId(1), ContactId(2)])
            .unwrap();
        let names: Vec<&str> = found.iter().map(|contact| contact.name.as_str()).collect();
        assert_eq!(names, vec!["Alan", "Sarah"]);
    });
}

#[test]
fn get_contacts_by_ids_rejects_unknown_id() {
    with_book(|book, _| {
        let err = book
            .get_contacts_by_ids(&[ContactId(1), ContactId(99)])
            .unwrap_err();
        assert!(matches!(err, ManagerError::UnknownContact(ContactId(99))));
        assert_eq!(err.kind(), ErrorKind::InvalidArgument);

        let zero = book.get_contacts_by_ids(&[ContactId(0)]).unwrap_err();
        assert_eq!(zero.kind(), ErrorKind::InvalidArgument);
    });
}

#[test]
fn contact_notes_append_with_separator() {
    with_book(|book, _| {
        book.add_contact_notes(ContactId(1), "likes cheese").unwrap();
        assert_eq!(
            book.get_contact(ContactId(1)).unwrap().notes,
            "nice, likes cheese"
        );

        let missing = book.add_contact_notes(ContactId(1), None).unwrap_err();
        assert_eq!(missing.kind(), ErrorKind::NullArgument);

        let unknown = book.add_contact_notes(ContactId(42), "x").unwrap_err();
        assert!(matches!(unknown, ManagerError::UnknownContact(ContactId(42))));
    });
}
