//! Domain models for tire storage management.
//!
//! This module contains the slot identifier grammar, the slot engine that
//! classifies and suggests slots, the registries of disabled slots and
//! stored wheel sets, and the audit log of changes.

/// Slot identifier grammar and parsing.
pub mod slot;
pub use slot::{InvalidFormat, SlotId};

/// Slot universe, status classification and next-free suggestion.
pub mod scheme;
pub use scheme::{Classification, SlotStatus, Snapshot};

/// Registry of administratively disabled slots.
pub mod disabled;
pub use disabled::{DisableError, DisabledSlotEntry, DisabledSlots};

/// Stored wheel sets and their slot assignments.
pub mod wheelset;
pub use wheelset::{AssignError, Details, WheelSet, WheelSets};

/// Append-only log of changes.
pub mod audit;
pub use audit::{Action, AuditEntry, AuditLog};

mod config;
pub use config::Config;
