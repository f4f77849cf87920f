use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};

use crate::domain::slot::SlotId;

/// A slot that has been taken out of service by an administrator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisabledSlotEntry {
    slot: SlotId,
    reason: NonEmptyString,
    disabled_at: DateTime<Utc>,
    disabled_by: Option<String>,
}

impl DisabledSlotEntry {
    /// Creates an entry timestamped now.
    ///
    /// # Errors
    ///
    /// Returns [`DisableError::EmptyReason`] if the reason is blank.
    pub fn new(
        slot: SlotId,
        reason: &str,
        disabled_by: Option<String>,
    ) -> Result<Self, DisableError> {
        Self::with_timestamp(slot, reason, Utc::now(), disabled_by)
    }

    fn with_timestamp(
        slot: SlotId,
        reason: &str,
        disabled_at: DateTime<Utc>,
        disabled_by: Option<String>,
    ) -> Result<Self, DisableError> {
        let reason = NonEmptyString::new(reason.trim().to_string())
            .map_err(|_| DisableError::EmptyReason(slot))?;
        let disabled_by = disabled_by
            .map(|by| by.trim().to_string())
            .filter(|by| !by.is_empty());
        Ok(Self {
            slot,
            reason,
            disabled_at,
            disabled_by,
        })
    }

    /// The disabled slot.
    #[must_use]
    pub const fn slot(&self) -> SlotId {
        self.slot
    }

    /// Why the slot was disabled.
    #[must_use]
    pub fn reason(&self) -> &str {
        self.reason.as_str()
    }

    /// When the slot was disabled.
    #[must_use]
    pub const fn disabled_at(&self) -> DateTime<Utc> {
        self.disabled_at
    }

    /// Who disabled the slot, if recorded.
    #[must_use]
    pub fn disabled_by(&self) -> Option<&str> {
        self.disabled_by.as_deref()
    }
}

/// Errors raised when disabling a slot.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum DisableError {
    /// The reason was empty or whitespace.
    #[error("A reason is required to disable slot {0}")]
    EmptyReason(SlotId),
}

/// The set of disabled slots, keyed in sort order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct DisabledSlots {
    entries: BTreeMap<SlotId, DisabledSlotEntry>,
}

impl DisabledSlots {
    /// Disables a slot.
    ///
    /// Returns `true` if a new entry was created and `false` if the slot was
    /// already disabled, in which case the existing entry is kept.
    ///
    /// # Errors
    ///
    /// Returns [`DisableError::EmptyReason`] if the reason is blank.
    pub fn disable(
        &mut self,
        slot: SlotId,
        reason: &str,
        disabled_by: Option<String>,
    ) -> Result<bool, DisableError> {
        if self.entries.contains_key(&slot) {
            tracing::debug!(%slot, "slot already disabled");
            return Ok(false);
        }
        let entry = DisabledSlotEntry::new(slot, reason, disabled_by)?;
        self.entries.insert(slot, entry);
        Ok(true)
    }

    /// Enables a slot again.
    ///
    /// Returns `true` if an entry was removed and `false` if the slot was not
    /// disabled.
    pub fn enable(&mut self, slot: &SlotId) -> bool {
        self.entries.remove(slot).is_some()
    }

    /// Returns the entry for a slot, if it is disabled.
    #[must_use]
    pub fn get(&self, slot: &SlotId) -> Option<&DisabledSlotEntry> {
        self.entries.get(slot)
    }

    /// Whether the slot is disabled.
    #[must_use]
    pub fn contains(&self, slot: &SlotId) -> bool {
        self.entries.contains_key(slot)
    }

    /// All entries, in slot sort order.
    pub fn list(&self) -> impl Iterator<Item = &DisabledSlotEntry> {
        self.entries.values()
    }

    /// The disabled slots as a key-set for the scheme functions.
    #[must_use]
    pub fn slots(&self) -> HashSet<SlotId> {
        self.entries.keys().copied().collect()
    }

    /// Number of disabled slots.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no slot is disabled.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// The serialized versions of the disabled-slot file.
#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, rename = "slot", skip_serializing_if = "Vec::is_empty")]
        slots: Vec<EntryV1>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct EntryV1 {
    id: SlotId,
    reason: String,
    disabled_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    disabled_by: Option<String>,
}

impl TryFrom<Versions> for DisabledSlots {
    type Error = DisableError;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 { slots } => {
                let mut entries = BTreeMap::new();
                for entry in slots {
                    let entry = DisabledSlotEntry::with_timestamp(
                        entry.id,
                        &entry.reason,
                        entry.disabled_at,
                        entry.disabled_by,
                    )?;
                    // The first entry for a slot wins, matching `disable`.
                    entries.entry(entry.slot).or_insert(entry);
                }
                Ok(Self { entries })
            }
        }
    }
}

impl From<DisabledSlots> for Versions {
    fn from(disabled: DisabledSlots) -> Self {
        Self::V1 {
            slots: disabled
                .entries
                .into_values()
                .map(|entry| EntryV1 {
                    id: entry.slot,
                    reason: entry.reason.as_str().to_string(),
                    disabled_at: entry.disabled_at,
                    disabled_by: entry.disabled_by,
                })
                .collect(),
        }
    }
}
