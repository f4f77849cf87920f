//! An append-only record of the changes made to a storage.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::slot::SlotId;

/// The kind of change an audit entry records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// A wheel set was stored.
    Create,
    /// The details of a wheel set were changed.
    Update,
    /// A wheel set was moved to another slot.
    Move,
    /// A wheel set was removed.
    Delete,
    /// A slot was disabled.
    Disable,
    /// A slot was enabled again.
    Enable,
    /// A backup was written.
    Backup,
}

impl Action {
    /// Lowercase name used in files and machine-readable output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Move => "move",
            Self::Delete => "delete",
            Self::Disable => "disable",
            Self::Enable => "enable",
            Self::Backup => "backup",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One recorded change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    action: Action,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    slot: Option<SlotId>,
    details: String,
    timestamp: DateTime<Utc>,
}

impl AuditEntry {
    /// What happened.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// The slot the change concerns. `None` for backups.
    #[must_use]
    pub const fn slot(&self) -> Option<SlotId> {
        self.slot
    }

    /// Human-readable summary.
    #[must_use]
    pub fn details(&self) -> &str {
        &self.details
    }

    /// When it happened.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }
}

/// The audit log, oldest entry first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Versions", into = "Versions")]
pub struct AuditLog {
    entries: Vec<AuditEntry>,
}

impl AuditLog {
    /// Appends an entry timestamped now.
    pub fn record(&mut self, action: Action, slot: Option<SlotId>, details: impl Into<String>) {
        let entry = AuditEntry {
            action,
            slot,
            details: details.into(),
            timestamp: Utc::now(),
        };
        tracing::debug!(action = %entry.action, details = %entry.details, "audit");
        self.entries.push(entry);
    }

    /// All entries, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &AuditEntry> {
        self.entries.iter()
    }

    /// Up to `limit` entries, newest first, optionally only those concerning
    /// one slot.
    #[must_use]
    pub fn recent(&self, limit: usize, slot: Option<SlotId>) -> Vec<&AuditEntry> {
        self.entries
            .iter()
            .rev()
            .filter(|entry| slot.is_none() || entry.slot == slot)
            .take(limit)
            .collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, rename = "entry", skip_serializing_if = "Vec::is_empty")]
        entries: Vec<AuditEntry>,
    },
}

impl From<Versions> for AuditLog {
    fn from(versions: Versions) -> Self {
        match versions {
            Versions::V1 { entries } => Self { entries },
        }
    }
}

impl From<AuditLog> for Versions {
    fn from(log: AuditLog) -> Self {
        Self::V1 {
            entries: log.entries,
        }
    }
}
