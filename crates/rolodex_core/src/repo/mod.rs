//! Persistence contracts and the SQLite implementation.
//!
//! # Responsibility
//! - Define the write-through store the contact manager persists into.
//! - Keep SQL and row decoding out of the manager.
//!
//! # Invariants
//! - Stores never decide business rules; the manager validates first.
//! - Reads reject persisted rows that violate the schema contract.

pub mod store;
