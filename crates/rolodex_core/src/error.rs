//! Errors surfaced by contact manager operations.
//!
//! Every variant maps to one [`ErrorKind`] so callers can branch on the
//! category (missing input, bad argument, wrong state, storage) without
//! matching each variant.

use crate::model::contact::ContactId;
use crate::model::meeting::MeetingId;
use crate::repo::store::RepoError;
use chrono::NaiveDateTime;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type ManagerResult<T> = Result<T, ManagerError>;

/// Error category of a [`ManagerError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// A required input was not supplied.
    NullArgument,
    /// An input refers to something unknown or of the wrong kind.
    InvalidArgument,
    /// The operation is not allowed in the target's current state.
    InvalidState,
    /// Persistence failed; in-memory state is unchanged.
    Storage,
}

#[derive(Debug)]
pub enum ManagerError {
    /// Named required input was `None`.
    MissingArgument(&'static str),
    UnknownContact(ContactId),
    UnknownMeeting(MeetingId),
    /// A meeting needs at least one participant.
    EmptyParticipants,
    /// A future meeting was requested for a date already gone.
    FutureMeetingInPast {
        date: NaiveDateTime,
        now: NaiveDateTime,
    },
    /// A past meeting was recorded for a date still ahead.
    PastMeetingInFuture {
        date: NaiveDateTime,
        now: NaiveDateTime,
    },
    /// Future meeting requested by the id of a past meeting.
    MeetingIsPast(MeetingId),
    /// Past meeting requested by the id of a future meeting.
    MeetingIsFuture(MeetingId),
    /// Notes added to a meeting whose date has not arrived.
    MeetingNotYetHeld {
        id: MeetingId,
        date: NaiveDateTime,
    },
    Store(RepoError),
}

impl ManagerError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingArgument(_) => ErrorKind::NullArgument,
            Self::UnknownContact(_)
            | Self::UnknownMeeting(_)
            | Self::EmptyParticipants
            | Self::FutureMeetingInPast { .. }
            | Self::PastMeetingInFuture { .. }
            | Self::MeetingIsPast(_)
            | Self::MeetingIsFuture(_) => ErrorKind::InvalidArgument,
            Self::MeetingNotYetHeld { .. } => ErrorKind::InvalidState,
            Self::Store(_) => ErrorKind::Storage,
        }
    }

    /// Stable snake_case code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::MissingArgument(_) => "missing_argument",
            Self::UnknownContact(_) => "unknown_contact",
            Self::UnknownMeeting(_) => "unknown_meeting",
            Self::EmptyParticipants => "empty_participants",
            Self::FutureMeetingInPast { .. } => "future_meeting_in_past",
            Self::PastMeetingInFuture { .. } => "past_meeting_in_future",
            Self::MeetingIsPast(_) => "meeting_is_past",
            Self::MeetingIsFuture(_) => "meeting_is_future",
            Self::MeetingNotYetHeld { .. } => "meeting_not_yet_held",
            Self::Store(_) => "store_failed",
        }
    }
}

impl Display for ManagerError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingArgument(name) => write!(f, "missing required argument `{name}`"),
            Self::UnknownContact(id) => write!(f, "unknown contact: {id}"),
            Self::UnknownMeeting(id) => write!(f, "unknown meeting: {id}"),
            Self::EmptyParticipants => write!(f, "meeting must have at least one participant"),
            Self::FutureMeetingInPast { date, now } => {
                write!(f, "future meeting date {date} is before now ({now})")
            }
            Self::PastMeetingInFuture { date, now } => {
                write!(f, "past meeting date {date} is after now ({now})")
            }
            Self::MeetingIsPast(id) => write!(f, "meeting {id} is a past meeting"),
            Self::MeetingIsFuture(id) => write!(f, "meeting {id} is a future meeting"),
            Self::MeetingNotYetHeld { id, date } => {
                write!(f, "meeting {id} is scheduled for {date} and has not taken place")
            }
            Self::Store(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ManagerError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for ManagerError {
    fn from(value: RepoError) -> Self {
        Self::Store(value)
    }
}
