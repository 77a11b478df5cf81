//! Contact manager use-case service.
//!
//! # Responsibility
//! - Own the live contact and meeting state and the id counters.
//! - Validate every mutation against live state before persisting it.
//! - Answer id, contact and calendar-day queries from memory.
//!
//! # Invariants
//! - Mutations reach the store first; memory changes only after the store
//!   accepted them, so a storage failure leaves state untouched.
//! - Meeting ids come from one counter shared by future and past meetings.
//! - A meeting id maps to exactly one `Meeting` value, future or past.
//! - Listings are chronological (date, then id) and free of duplicates.

use crate::clock::{whole_seconds, Clock};
use crate::error::{ErrorKind, ManagerError, ManagerResult};
use crate::model::contact::{Contact, ContactId};
use crate::model::meeting::{FutureMeeting, Meeting, MeetingId, PastMeeting};
use crate::repo::store::ContactStore;
use chrono::{NaiveDate, NaiveDateTime};
use log::{error, info, warn};
use std::collections::{BTreeMap, BTreeSet};

/// In-process organizer for contacts and meetings.
pub struct ContactManager<S: ContactStore, C: Clock> {
    store: S,
    clock: C,
    contacts: BTreeMap<ContactId, Contact>,
    meetings: BTreeMap<MeetingId, Meeting>,
    next_contact_id: i64,
    next_meeting_id: i64,
}

impl<S: ContactStore, C: Clock> ContactManager<S, C> {
    /// Builds a manager from everything the store has persisted.
    ///
    /// Id counters continue after the highest persisted id.
    pub fn load(store: S, clock: C) -> ManagerResult<Self> {
        let snapshot = match store.load_snapshot() {
            Ok(snapshot) => snapshot,
            Err(err) => {
                error!(
                    "event=store_load module=manager status=error error_code=store_load_failed error={}",
                    err
                );
                return Err(err.into());
            }
        };

        let next_contact_id = snapshot.contacts.keys().next_back().map_or(1, |id| id.0 + 1);
        let next_meeting_id = snapshot.meetings.keys().next_back().map_or(1, |id| id.0 + 1);
        info!(
            "event=store_load module=manager status=ok contacts={} meetings={} next_contact_id={} next_meeting_id={}",
            snapshot.contacts.len(),
            snapshot.meetings.len(),
            next_contact_id,
            next_meeting_id
        );

        Ok(Self {
            store,
            clock,
            contacts: snapshot.contacts,
            meetings: snapshot.meetings,
            next_contact_id,
            next_meeting_id,
        })
    }

    /// Creates a contact and returns its new id.
    ///
    /// # Errors
    /// - `MissingArgument` when `name` or `notes` is `None`.
    pub fn add_contact<'a>(
        &mut self,
        name: impl Into<Option<&'a str>>,
        notes: impl Into<Option<&'a str>>,
    ) -> ManagerResult<ContactId> {
        let result = self.try_add_contact(name.into(), notes.into());
        traced("contact_add", result, |id| format!("contact_id={id}"))
    }

    fn try_add_contact(
        &mut self,
        name: Option<&str>,
        notes: Option<&str>,
    ) -> ManagerResult<ContactId> {
        let name = require(name, "name")?;
        let notes = require(notes, "notes")?;

        let contact = Contact::new(ContactId(self.next_contact_id), name, notes);
        self.store.insert_contact(&contact)?;

        let id = contact.id;
        self.contacts.insert(id, contact);
        self.next_contact_id += 1;
        Ok(id)
    }

    /// Appends text to a contact's notes.
    ///
    /// # Errors
    /// - `MissingArgument` when `text` is `None`.
    /// - `UnknownContact` when no contact has `id`.
    pub fn add_contact_notes<'a>(
        &mut self,
        id: ContactId,
        text: impl Into<Option<&'a str>>,
    ) -> ManagerResult<()> {
        let result = self.try_add_contact_notes(id, text.into());
        traced("contact_notes_add", result, |_| format!("contact_id={id}"))
    }

    fn try_add_contact_notes(&mut self, id: ContactId, text: Option<&str>) -> ManagerResult<()> {
        let text = require(text, "text")?;
        let contact = self
            .contacts
            .get_mut(&id)
            .ok_or(ManagerError::UnknownContact(id))?;

        let mut updated = contact.clone();
        updated.add_notes(text);
        self.store.update_contact_notes(id, &updated.notes)?;
        *contact = updated;
        Ok(())
    }

    /// Schedules a meeting at or after now and returns its id.
    ///
    /// # Errors
    /// - `FutureMeetingInPast` when `date` is before now.
    /// - `EmptyParticipants` / `UnknownContact` for a bad participant list.
    pub fn add_future_meeting(
        &mut self,
        contacts: &[ContactId],
        date: NaiveDateTime,
    ) -> ManagerResult<MeetingId> {
        let result = self.try_add_future_meeting(contacts, date);
        traced("meeting_add", result, |id| {
            format!("meeting_id={id} state=future participants={}", contacts.len())
        })
    }

    fn try_add_future_meeting(
        &mut self,
        contacts: &[ContactId],
        date: NaiveDateTime,
    ) -> ManagerResult<MeetingId> {
        let date = whole_seconds(date);
        let now = self.now();
        if date < now {
            return Err(ManagerError::FutureMeetingInPast { date, now });
        }
        let participants = self.known_participants(contacts)?;

        let meeting = Meeting::Future(FutureMeeting {
            id: MeetingId(self.next_meeting_id),
            date,
            participants,
        });
        self.insert_meeting(meeting)
    }

    /// Records a meeting that already took place and returns its id.
    ///
    /// # Errors
    /// - `MissingArgument` when `notes` is `None`.
    /// - `EmptyParticipants` / `UnknownContact` for a bad participant list.
    /// - `PastMeetingInFuture` when `date` is after now.
    pub fn add_past_meeting<'a>(
        &mut self,
        contacts: &[ContactId],
        date: NaiveDateTime,
        notes: impl Into<Option<&'a str>>,
    ) -> ManagerResult<MeetingId> {
        let result = self.try_add_past_meeting(contacts, date, notes.into());
        traced("meeting_add", result, |id| {
            format!("meeting_id={id} state=past participants={}", contacts.len())
        })
    }

    fn try_add_past_meeting(
        &mut self,
        contacts: &[ContactId],
        date: NaiveDateTime,
        notes: Option<&str>,
    ) -> ManagerResult<MeetingId> {
        let notes = require(notes, "notes")?;
        let participants = self.known_participants(contacts)?;
        let date = whole_seconds(date);
        let now = self.now();
        if date > now {
            return Err(ManagerError::PastMeetingInFuture { date, now });
        }

        let meeting = Meeting::Past(PastMeeting {
            id: MeetingId(self.next_meeting_id),
            date,
            participants,
            notes: notes.to_string(),
        });
        self.insert_meeting(meeting)
    }

    /// Adds notes to a meeting that has taken place.
    ///
    /// A future meeting whose date has arrived becomes a past meeting carrying
    /// `text`; a past meeting gets `text` appended to its notes.
    ///
    /// # Errors
    /// - `MissingArgument` when `text` is `None`.
    /// - `UnknownMeeting` when no meeting has `id`.
    /// - `MeetingNotYetHeld` when the meeting date is still ahead.
    pub fn add_meeting_notes<'a>(
        &mut self,
        id: MeetingId,
        text: impl Into<Option<&'a str>>,
    ) -> ManagerResult<()> {
        let result = self.try_add_meeting_notes(id, text.into());
        traced("meeting_notes_add", result, |_| format!("meeting_id={id}"))
    }

    fn try_add_meeting_notes(&mut self, id: MeetingId, text: Option<&str>) -> ManagerResult<()> {
        let text = require(text, "text")?;
        let now = self.now();

        let (updated, converted) = match self.meetings.get(&id) {
            None => return Err(ManagerError::UnknownMeeting(id)),
            Some(Meeting::Future(meeting)) if meeting.date > now => {
                return Err(ManagerError::MeetingNotYetHeld {
                    id,
                    date: meeting.date,
                });
            }
            Some(Meeting::Future(meeting)) => (meeting.clone().into_past(text), true),
            Some(Meeting::Past(meeting)) => {
                let mut meeting = meeting.clone();
                meeting.add_notes(text);
                (meeting, false)
            }
        };

        self.store.record_meeting_notes(id, &updated.notes)?;

        if converted {
            info!(
                "event=meeting_convert module=manager status=ok meeting_id={}",
                id
            );
        }
        self.meetings.insert(id, Meeting::Past(updated));
        Ok(())
    }

    /// Returns the meeting with `id`, future or past.
    pub fn get_meeting(&self, id: MeetingId) -> Option<&Meeting> {
        self.meetings.get(&id)
    }

    /// Returns the future meeting with `id`.
    ///
    /// # Errors
    /// - `MeetingIsPast` when `id` names a past meeting.
    pub fn get_future_meeting(&self, id: MeetingId) -> ManagerResult<Option<&FutureMeeting>> {
        match self.meetings.get(&id) {
            Some(Meeting::Future(meeting)) => Ok(Some(meeting)),
            Some(Meeting::Past(_)) => Err(ManagerError::MeetingIsPast(id)),
            None => Ok(None),
        }
    }

    /// Returns the past meeting with `id`.
    ///
    /// # Errors
    /// - `MeetingIsFuture` when `id` names a future meeting.
    pub fn get_past_meeting(&self, id: MeetingId) -> ManagerResult<Option<&PastMeeting>> {
        match self.meetings.get(&id) {
            Some(Meeting::Past(meeting)) => Ok(Some(meeting)),
            Some(Meeting::Future(_)) => Err(ManagerError::MeetingIsFuture(id)),
            None => Ok(None),
        }
    }

    /// Future meetings with `contact` among the participants, chronologically.
    pub fn get_future_meeting_list(&self, contact: ContactId) -> ManagerResult<Vec<&FutureMeeting>> {
        self.ensure_contact(contact)?;
        let mut meetings: Vec<&FutureMeeting> = self
            .meetings
            .values()
            .filter(|meeting| meeting.has_participant(contact))
            .filter_map(|meeting| match meeting {
                Meeting::Future(future) => Some(future),
                Meeting::Past(_) => None,
            })
            .collect();
        meetings.sort_by_key(|meeting| (meeting.date, meeting.id));
        Ok(meetings)
    }

    /// Past meetings with `contact` among the participants, chronologically.
    pub fn get_past_meeting_list(&self, contact: ContactId) -> ManagerResult<Vec<&PastMeeting>> {
        self.ensure_contact(contact)?;
        let mut meetings: Vec<&PastMeeting> = self
            .meetings
            .values()
            .filter(|meeting| meeting.has_participant(contact))
            .filter_map(|meeting| match meeting {
                Meeting::Past(past) => Some(past),
                Meeting::Future(_) => None,
            })
            .collect();
        meetings.sort_by_key(|meeting| (meeting.date, meeting.id));
        Ok(meetings)
    }

    /// Every meeting, future or past, held on calendar day `day`,
    /// chronologically.
    pub fn get_meeting_list_on(&self, day: NaiveDate) -> Vec<&Meeting> {
        let mut meetings: Vec<&Meeting> = self
            .meetings
            .values()
            .filter(|meeting| meeting.is_on(day))
            .collect();
        meetings.sort_by_key(|meeting| meeting.chronological_key());
        meetings
    }

    /// Contacts for the given ids, sorted by id without duplicates.
    ///
    /// # Errors
    /// - `UnknownContact` for the first id with no contact.
    pub fn get_contacts_by_ids(&self, ids: &[ContactId]) -> ManagerResult<Vec<&Contact>> {
        ids.iter()
            .copied()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .map(|id| {
                self.contacts
                    .get(&id)
                    .ok_or(ManagerError::UnknownContact(id))
            })
            .collect()
    }

    /// Contacts whose name contains `query`, sorted by id.
    ///
    /// # Errors
    /// - `MissingArgument` when `query` is `None`.
    pub fn get_contacts_by_name<'a>(
        &self,
        query: impl Into<Option<&'a str>>,
    ) -> ManagerResult<Vec<&Contact>> {
        let query = require(query.into(), "name")?;
        Ok(self
            .contacts
            .values()
            .filter(|contact| contact.name_matches(query))
            .collect())
    }

    /// Returns the contact with `id`.
    pub fn get_contact(&self, id: ContactId) -> Option<&Contact> {
        self.contacts.get(&id)
    }

    /// All contacts, by id.
    pub fn contacts(&self) -> impl Iterator<Item = &Contact> {
        self.contacts.values()
    }

    /// All meetings, by id.
    pub fn meetings(&self) -> impl Iterator<Item = &Meeting> {
        self.meetings.values()
    }

    /// Forces persisted state to durable storage.
    pub fn flush(&self) -> ManagerResult<()> {
        let result = self.store.flush().map_err(ManagerError::from);
        traced("store_flush", result, |_| {
            format!(
                "contacts={} meetings={}",
                self.contacts.len(),
                self.meetings.len()
            )
        })
    }

    fn now(&self) -> NaiveDateTime {
        whole_seconds(self.clock.now())
    }

    fn ensure_contact(&self, id: ContactId) -> ManagerResult<()> {
        if self.contacts.contains_key(&id) {
            Ok(())
        } else {
            Err(ManagerError::UnknownContact(id))
        }
    }

    fn known_participants(&self, contacts: &[ContactId]) -> ManagerResult<BTreeSet<ContactId>> {
        if contacts.is_empty() {
            return Err(ManagerError::EmptyParticipants);
        }
        let participants: BTreeSet<ContactId> = contacts.iter().copied().collect();
        for id in &participants {
            self.ensure_contact(*id)?;
        }
        Ok(participants)
    }

    fn insert_meeting(&mut self, meeting: Meeting) -> ManagerResult<MeetingId> {
        self.store.insert_meeting(&meeting)?;
        let id = meeting.id();
        self.meetings.insert(id, meeting);
        self.next_meeting_id += 1;
        Ok(id)
    }
}

fn require<'a>(value: Option<&'a str>, name: &'static str) -> ManagerResult<&'a str> {
    value.ok_or(ManagerError::MissingArgument(name))
}

/// Logs the outcome of one manager operation and passes the result through.
///
/// Rejected inputs log at `warn`, storage failures at `error`. Only ids and
/// counts are logged, never names or note text.
fn traced<T>(
    event: &'static str,
    result: ManagerResult<T>,
    detail: impl FnOnce(&T) -> String,
) -> ManagerResult<T> {
    match &result {
        Ok(value) => info!(
            "event={} module=manager status=ok {}",
            event,
            detail(value)
        ),
        Err(err) if err.kind() == ErrorKind::Storage => error!(
            "event={} module=manager status=error error_code={} error={}",
            event,
            err.code(),
            err
        ),
        Err(err) => warn!(
            "event={} module=manager status=rejected error_code={}",
            event,
            err.code()
        ),
    }
    result
}
