//! Meeting domain model.
//!
//! # Responsibility
//! - Define future and past meeting records.
//! - Wrap both under the `Meeting` tagged union with shared accessors.
//!
//! # Invariants
//! - Meeting ids are unique across both variants.
//! - A past meeting is never turned back into a future one.
//! - `participants` holds ids of contacts that existed at creation time.

use super::contact::ContactId;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter};

/// Stable identifier for a meeting, shared by both variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MeetingId(pub i64);

impl Display for MeetingId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for MeetingId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

/// A meeting scheduled at or after the time it was created.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FutureMeeting {
    pub id: MeetingId,
    pub date: NaiveDateTime,
    pub participants: BTreeSet<ContactId>,
}

/// A meeting that has taken place, with accumulated notes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PastMeeting {
    pub id: MeetingId,
    pub date: NaiveDateTime,
    pub participants: BTreeSet<ContactId>,
    pub notes: String,
}

impl FutureMeeting {
    /// Consumes the future meeting and returns its past form.
    pub fn into_past(self, notes: impl Into<String>) -> PastMeeting {
        PastMeeting {
            id: self.id,
            date: self.date,
            participants: self.participants,
            notes: notes.into(),
        }
    }
}

impl PastMeeting {
    pub fn add_notes(&mut self, text: &str) {
        super::append_notes(&mut self.notes, text);
    }
}

/// Either an upcoming or a concluded meeting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Meeting {
    Future(FutureMeeting),
    Past(PastMeeting),
}

impl Meeting {
    pub fn id(&self) -> MeetingId {
        match self {
            Self::Future(meeting) => meeting.id,
            Self::Past(meeting) => meeting.id,
        }
    }

    pub fn date(&self) -> NaiveDateTime {
        match self {
            Self::Future(meeting) => meeting.date,
            Self::Past(meeting) => meeting.date,
        }
    }

    pub fn participants(&self) -> &BTreeSet<ContactId> {
        match self {
            Self::Future(meeting) => &meeting.participants,
            Self::Past(meeting) => &meeting.participants,
        }
    }

    /// Notes of a past meeting; `None` for future meetings.
    pub fn notes(&self) -> Option<&str> {
        match self {
            Self::Future(_) => None,
            Self::Past(meeting) => Some(meeting.notes.as_str()),
        }
    }

    pub fn is_past(&self) -> bool {
        matches!(self, Self::Past(_))
    }

    pub fn has_participant(&self, contact: ContactId) -> bool {
        self.participants().contains(&contact)
    }

    /// Whether the meeting falls on the given calendar day.
    pub fn is_on(&self, day: NaiveDate) -> bool {
        self.date().date() == day
    }

    /// Ordering key for chronological listings: date, then id.
    pub fn chronological_key(&self) -> (NaiveDateTime, MeetingId) {
        (self.date(), self.id())
    }
}

#[cfg(test)]
mod tests {
    use super::{FutureMeeting, Meeting, MeetingId};
    use crate::model::contact::ContactId;
    use chrono::NaiveDate;
    use std::collections::BTreeSet;

    fn sample_future() -> FutureMeeting {
        FutureMeeting {
            id: MeetingId(3),
            date: NaiveDate::from_ymd_opt(2030, 4, 4)
                .and_then(|d| d.and_hms_opt(14, 30, 0))
                .expect("valid date"),
            participants: BTreeSet::from([ContactId(1), ContactId(2)]),
        }
    }

    #[test]
    fn into_past_keeps_identity_and_participants() {
        let future = sample_future();
        let past = future.clone().into_past("went well");
        assert_eq!(past.id, future.id);
        assert_eq!(past.date, future.date);
        assert_eq!(past.participants, future.participants);
        assert_eq!(past.notes, "went well");
    }

    #[test]
    fn shared_accessors_work_for_both_variants() {
        let future = Meeting::Future(sample_future());
        assert!(!future.is_past());
        assert_eq!(future.notes(), None);
        assert!(future.has_participant(ContactId(2)));
        assert!(!future.has_participant(ContactId(9)));
        assert!(future.is_on(NaiveDate::from_ymd_opt(2030, 4, 4).expect("valid date")));

        let past = Meeting::Past(sample_future().into_past("done"));
        assert!(past.is_past());
        assert_eq!(past.notes(), Some("done"));
        assert_eq!(past.id(), MeetingId(3));
    }

    #[test]
    fn meeting_serializes_with_state_tag() {
        let past = Meeting::Past(sample_future().into_past("x"));
        let value = serde_json::to_value(&past).expect("meeting should serialize");
        assert_eq!(value["state"], "past");
        assert_eq!(value["id"], 3);
    }
}
