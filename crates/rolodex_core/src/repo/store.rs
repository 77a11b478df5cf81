//! Contact book store contract and SQLite implementation.
//!
//! # Responsibility
//! - Persist contacts, meetings and participant links as they change.
//! - Rebuild the full in-memory state from storage on startup.
//! - Force buffered state to durable storage on `flush`.
//!
//! # Invariants
//! - A meeting row and its participant rows are written in one transaction.
//! - `notes` is NULL exactly for future meetings.
//! - Recording meeting notes is one `UPDATE` that sets `state = 'past'` and
//!   `notes` together, so a conversion is never half applied.

use crate::db::migrations::{current_user_version, latest_version};
use crate::db::DbError;
use crate::model::contact::{Contact, ContactId};
use crate::model::meeting::{FutureMeeting, Meeting, MeetingId, PastMeeting};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, Row, TransactionBehavior};
use std::collections::{BTreeMap, BTreeSet};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Text format of `meetings.scheduled_at`.
pub const SCHEDULED_AT_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

pub type RepoResult<T> = Result<T, RepoError>;

/// Error for contact book persistence operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Connection was not migrated to the schema this binary expects.
    SchemaNotReady { found: u32, expected: u32 },
    /// Targeted row does not exist.
    NotFound(&'static str, i64),
    /// Persisted row violates the schema contract.
    InvalidData(String),
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::SchemaNotReady { found, expected } => write!(
                f,
                "contact book schema not ready: found version {found}, expected {expected}"
            ),
            Self::NotFound(table, id) => write!(f, "{table} row not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted contact book data: {message}"),
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Everything persisted, as loaded at startup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    pub contacts: BTreeMap<ContactId, Contact>,
    pub meetings: BTreeMap<MeetingId, Meeting>,
}

/// Write-through persistence used by the contact manager.
pub trait ContactStore {
    /// Loads every contact and meeting.
    fn load_snapshot(&self) -> RepoResult<Snapshot>;
    fn insert_contact(&self, contact: &Contact) -> RepoResult<()>;
    /// Replaces the stored notes of one contact.
    fn update_contact_notes(&self, id: ContactId, notes: &str) -> RepoResult<()>;
    /// Inserts a meeting together with its participant links.
    fn insert_meeting(&mut self, meeting: &Meeting) -> RepoResult<()>;
    /// Stores `notes` on a meeting and marks it past.
    ///
    /// Converts a future meeting or replaces the notes of a past one.
    fn record_meeting_notes(&self, id: MeetingId, notes: &str) -> RepoResult<()>;
    /// Forces buffered state to durable storage.
    fn flush(&self) -> RepoResult<()>;
}

/// SQLite-backed contact book store.
pub struct SqliteContactStore<'conn> {
    conn: &'conn mut Connection,
}

impl<'conn> SqliteContactStore<'conn> {
    /// Wraps a connection opened through `db::open_db*`.
    ///
    /// Rejects connections whose schema version does not match this binary.
    pub fn try_new(conn: &'conn mut Connection) -> RepoResult<Self> {
        let found = current_user_version(conn)?;
        let expected = latest_version();
        if found != expected {
            return Err(RepoError::SchemaNotReady { found, expected });
        }
        Ok(Self { conn })
    }
}

impl ContactStore for SqliteContactStore<'_> {
    fn load_snapshot(&self) -> RepoResult<Snapshot> {
        let mut snapshot = Snapshot::default();

        let mut stmt = self
            .conn
            .prepare("SELECT id, name, notes FROM contacts ORDER BY id ASC;")?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let contact = Contact {
                id: ContactId(row.get("id")?),
                name: row.get("name")?,
                notes: row.get("notes")?,
            };
            snapshot.contacts.insert(contact.id, contact);
        }

        let mut participants = load_participants(&*self.conn)?;
        let mut stmt = self.conn.prepare(
            "SELECT id, state, scheduled_at, notes FROM meetings ORDER BY id ASC;",
        )?;
        let mut rows = stmt.query([])?;
        while let Some(row) = rows.next()? {
            let id = MeetingId(row.get("id")?);
            let links = participants.remove(&id).unwrap_or_default();
            for contact in &links {
                if !snapshot.contacts.contains_key(contact) {
                    return Err(RepoError::InvalidData(format!(
                        "meeting {id} references unknown contact {contact}"
                    )));
                }
            }
            snapshot.meetings.insert(id, parse_meeting_row(row, id, links)?);
        }

        if let Some(orphan) = participants.keys().next() {
            return Err(RepoError::InvalidData(format!(
                "participants reference unknown meeting {orphan}"
            )));
        }

        Ok(snapshot)
    }

    fn insert_contact(&self, contact: &Contact) -> RepoResult<()> {
        self.conn.execute(
            "INSERT INTO contacts (id, name, notes) VALUES (?1, ?2, ?3);",
            params![contact.id.0, contact.name.as_str(), contact.notes.as_str()],
        )?;
        Ok(())
    }

    fn update_contact_notes(&self, id: ContactId, notes: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE contacts SET notes = ?2 WHERE id = ?1;",
            params![id.0, notes],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound("contacts", id.0));
        }
        Ok(())
    }

    fn insert_meeting(&mut self, meeting: &Meeting) -> RepoResult<()> {
        let (state, notes) = match meeting {
            Meeting::Future(_) => ("future", None),
            Meeting::Past(past) => ("past", Some(past.notes.as_str())),
        };

        let tx = self
            .conn
            .transaction_with_behavior(TransactionBehavior::Immediate)?;
        tx.execute(
            "INSERT INTO meetings (id, state, scheduled_at, notes) VALUES (?1, ?2, ?3, ?4);",
            params![
                meeting.id().0,
                state,
                format_scheduled_at(meeting.date()),
                notes,
            ],
        )?;
        {
            let mut link = tx.prepare(
                "INSERT INTO meeting_participants (meeting_id, contact_id) VALUES (?1, ?2);",
            )?;
            for contact in meeting.participants() {
                link.execute(params![meeting.id().0, contact.0])?;
            }
        }
        tx.commit()?;
        Ok(())
    }

    fn record_meeting_notes(&self, id: MeetingId, notes: &str) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE meetings SET state = 'past', notes = ?2 WHERE id = ?1;",
            params![id.0, notes],
        )?;
        if changed == 0 {
            return Err(RepoError::NotFound("meetings", id.0));
        }
        Ok(())
    }

    fn flush(&self) -> RepoResult<()> {
        // In-memory and rollback-journal databases report -1 here; nothing to do.
        self.conn
            .query_row("PRAGMA wal_checkpoint(TRUNCATE);", [], |_| Ok(()))?;
        Ok(())
    }
}

/// Formats a meeting date for `meetings.scheduled_at`.
pub fn format_scheduled_at(date: NaiveDateTime) -> String {
    date.format(SCHEDULED_AT_FORMAT).to_string()
}

fn load_participants(conn: &Connection) -> RepoResult<BTreeMap<MeetingId, BTreeSet<ContactId>>> {
    let mut stmt = conn.prepare(
        "SELECT meeting_id, contact_id
         FROM meeting_participants
         ORDER BY meeting_id ASC, contact_id ASC;",
    )?;
    let mut rows = stmt.query([])?;
    let mut links: BTreeMap<MeetingId, BTreeSet<ContactId>> = BTreeMap::new();
    while let Some(row) = rows.next()? {
        links
            .entry(MeetingId(row.get("meeting_id")?))
            .or_default()
            .insert(ContactId(row.get("contact_id")?));
    }
    Ok(links)
}

fn parse_meeting_row(
    row: &Row<'_>,
    id: MeetingId,
    participants: BTreeSet<ContactId>,
) -> RepoResult<Meeting> {
    let scheduled_at: String = row.get("scheduled_at")?;
    let date = NaiveDateTime::parse_from_str(&scheduled_at, SCHEDULED_AT_FORMAT).map_err(|_| {
        RepoError::InvalidData(format!(
            "invalid scheduled_at `{scheduled_at}` in meetings.scheduled_at for meeting {id}"
        ))
    })?;

    if participants.is_empty() {
        return Err(RepoError::InvalidData(format!(
            "meeting {id} has no participants"
        )));
    }

    let state: String = row.get("state")?;
    let notes: Option<String> = row.get("notes")?;
    match (state.as_str(), notes) {
        ("future", None) => Ok(Meeting::Future(FutureMeeting {
            id,
            date,
            participants,
        })),
        ("past", Some(notes)) => Ok(Meeting::Past(PastMeeting {
            id,
            date,
            participants,
            notes,
        })),
        (other, _) => Err(RepoError::InvalidData(format!(
            "invalid state `{other}` or notes combination in meetings for meeting {id}"
        ))),
    }
}
