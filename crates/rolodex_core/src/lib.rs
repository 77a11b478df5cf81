//! Core logic for the Rolodex contact and meeting organizer.
//! This crate is the single source of truth for contact/meeting invariants.

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use clock::{Clock, FixedClock, SystemClock};
pub use config::{ConfigError, ManagerConfig, StorageLocation};
pub use error::{ErrorKind, ManagerError, ManagerResult};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::contact::{Contact, ContactId};
pub use model::meeting::{FutureMeeting, Meeting, MeetingId, PastMeeting};
pub use model::NOTES_SEPARATOR;
pub use repo::store::{ContactStore, RepoError, RepoResult, Snapshot, SqliteContactStore};
pub use service::manager::ContactManager;
