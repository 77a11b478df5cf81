//! Use-case services.
//!
//! # Responsibility
//! - Enforce contact and meeting invariants above the store.
//! - Keep callers decoupled from SQLite details.

pub mod manager;
