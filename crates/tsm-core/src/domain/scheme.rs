//! The position scheme: slot universe, classification and free-slot
//! suggestions.
//!
//! Everything here is a pure function of the grammar tables and the sets handed
//! in by the caller. Callers are responsible for reading the occupied and
//! disabled sets from one consistent snapshot.

use std::collections::{BTreeMap, HashSet};

use crate::domain::slot::{self, Family, SlotId};

/// Whether a slot can take a new wheel set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SlotStatus {
    /// Neither occupied nor disabled.
    Free,
    /// Holds an active wheel set.
    Occupied,
    /// Administratively excluded. Takes precedence over [`SlotStatus::Occupied`].
    Disabled,
}

impl SlotStatus {
    /// Every status, in display order.
    pub const ALL: [Self; 3] = [Self::Free, Self::Occupied, Self::Disabled];

    /// Lowercase name used in machine-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Free => "free",
            Self::Occupied => "occupied",
            Self::Disabled => "disabled",
        }
    }
}

impl std::fmt::Display for SlotStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every valid slot identifier, container family first, in ascending sort
/// order.
#[must_use]
pub fn enumerate_universe() -> Vec<SlotId> {
    Family::ALL
        .iter()
        .flat_map(|family| family.grammar().slots())
        .collect()
}

/// The status of one slot given the occupied and disabled sets.
#[must_use]
pub fn status_of(
    slot: &SlotId,
    occupied: &HashSet<SlotId>,
    disabled: &HashSet<SlotId>,
) -> SlotStatus {
    if disabled.contains(slot) {
        SlotStatus::Disabled
    } else if occupied.contains(slot) {
        SlotStatus::Occupied
    } else {
        SlotStatus::Free
    }
}

/// Classifies every slot of `universe`.
///
/// A slot that is both occupied and disabled is reported as disabled. Use
/// [`conflicts`] to find such slots.
#[must_use]
pub fn classify(
    universe: &[SlotId],
    occupied: &HashSet<SlotId>,
    disabled: &HashSet<SlotId>,
) -> Classification {
    let statuses = universe
        .iter()
        .map(|slot| (*slot, status_of(slot, occupied, disabled)))
        .collect();
    Classification { statuses }
}

/// Returns the first free slot in universe order.
///
/// `None` means there is no free space left. It is not an error.
#[must_use]
pub fn suggest_next_free(
    universe: &[SlotId],
    occupied: &HashSet<SlotId>,
    disabled: &HashSet<SlotId>,
) -> Option<SlotId> {
    universe
        .iter()
        .find(|slot| status_of(slot, occupied, disabled) == SlotStatus::Free)
        .copied()
}

/// All free slots, in universe order.
#[must_use]
pub fn free_slots(
    universe: &[SlotId],
    occupied: &HashSet<SlotId>,
    disabled: &HashSet<SlotId>,
) -> Vec<SlotId> {
    universe
        .iter()
        .filter(|slot| status_of(slot, occupied, disabled) == SlotStatus::Free)
        .copied()
        .collect()
}

/// Slots that appear in both sets, in sort order.
#[must_use]
pub fn conflicts(occupied: &HashSet<SlotId>, disabled: &HashSet<SlotId>) -> Vec<SlotId> {
    let mut both: Vec<SlotId> = occupied.intersection(disabled).copied().collect();
    both.sort_unstable();
    both
}

/// Whether `input` is a valid identifier that is not disabled.
#[must_use]
pub fn is_usable(input: &str, disabled: &HashSet<SlotId>) -> bool {
    slot::parse(input).is_ok_and(|slot| !disabled.contains(&slot))
}

/// The occupied and disabled sets, read together at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    /// Slots holding an active wheel set.
    pub occupied: HashSet<SlotId>,
    /// Administratively disabled slots.
    pub disabled: HashSet<SlotId>,
}

impl Snapshot {
    /// See [`classify`].
    #[must_use]
    pub fn classify(&self, universe: &[SlotId]) -> Classification {
        classify(universe, &self.occupied, &self.disabled)
    }

    /// See [`suggest_next_free`].
    #[must_use]
    pub fn suggest_next_free(&self, universe: &[SlotId]) -> Option<SlotId> {
        suggest_next_free(universe, &self.occupied, &self.disabled)
    }

    /// See [`free_slots`].
    #[must_use]
    pub fn free_slots(&self, universe: &[SlotId]) -> Vec<SlotId> {
        free_slots(universe, &self.occupied, &self.disabled)
    }

    /// See [`conflicts`].
    #[must_use]
    pub fn conflicts(&self) -> Vec<SlotId> {
        conflicts(&self.occupied, &self.disabled)
    }
}

/// The status of every slot of a universe, keyed in sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Classification {
    statuses: BTreeMap<SlotId, SlotStatus>,
}

impl Classification {
    /// The status of a slot, or `None` if it is not part of the classified
    /// universe.
    #[must_use]
    pub fn status(&self, slot: &SlotId) -> Option<SlotStatus> {
        self.statuses.get(slot).copied()
    }

    /// Iterates over all slots and their status in sort order.
    pub fn iter(&self) -> impl Iterator<Item = (SlotId, SlotStatus)> + '_ {
        self.statuses.iter().map(|(slot, status)| (*slot, *status))
    }

    /// Slots with the given status, in sort order.
    pub fn with_status(&self, status: SlotStatus) -> impl Iterator<Item = SlotId> + '_ {
        self.iter()
            .filter(move |(_, s)| *s == status)
            .map(|(slot, _)| slot)
    }

    /// Number of slots with the given status.
    #[must_use]
    pub fn count(&self, status: SlotStatus) -> usize {
        self.statuses.values().filter(|s| **s == status).count()
    }

    /// Number of classified slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.statuses.len()
    }

    /// Whether nothing was classified.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.statuses.is_empty()
    }
}
