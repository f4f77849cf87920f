//! Plain-text Tire Storage Management
//!
//! Wheel sets are stored in a fixed scheme of shelf and garage slots. Slots
//! can be taken out of service, and the next free slot is suggested in a
//! stable order.

pub mod domain;
pub use domain::{Config, DisabledSlots, SlotId, SlotStatus, WheelSet, WheelSets};

/// Filesystem storage for the slot registries and configuration.
pub mod storage;
pub use storage::Store;
