//! Customer wheel-set records and the registry that assigns them to slots.
//!
//! Each record occupies exactly one slot and no two records share a slot, so
//! the registry is keyed by position.

use std::collections::{BTreeMap, HashSet};

use chrono::{DateTime, Utc};
use non_empty_string::NonEmptyString;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{
    disabled::DisabledSlots,
    scheme,
    slot::SlotId,
};

/// The customer-facing details of a wheel set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Details {
    customer_name: NonEmptyString,
    license_plate: NonEmptyString,
    car_type: NonEmptyString,
    note: Option<String>,
}

impl Details {
    /// Validates and trims the details of a wheel set.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::MissingField`] if the customer name, license plate
    /// or car type is blank.
    pub fn new(
        customer_name: &str,
        license_plate: &str,
        car_type: &str,
        note: Option<&str>,
    ) -> Result<Self, AssignError> {
        Ok(Self {
            customer_name: required("customer_name", customer_name)?,
            license_plate: required("license_plate", license_plate)?,
            car_type: required("car_type", car_type)?,
            note: note
                .map(str::trim)
                .filter(|note| !note.is_empty())
                .map(ToString::to_string),
        })
    }

    /// The customer's name.
    #[must_use]
    pub fn customer_name(&self) -> &str {
        self.customer_name.as_str()
    }

    /// The license plate of the customer's car.
    #[must_use]
    pub fn license_plate(&self) -> &str {
        self.license_plate.as_str()
    }

    /// The car model.
    #[must_use]
    pub fn car_type(&self) -> &str {
        self.car_type.as_str()
    }

    /// Free-text note.
    #[must_use]
    pub fn note(&self) -> Option<&str> {
        self.note.as_deref()
    }

    fn matches(&self, needle: &str) -> bool {
        [self.customer_name(), self.license_plate(), self.car_type()]
            .iter()
            .any(|field| field.to_lowercase().contains(needle))
    }
}

fn required(field: &'static str, value: &str) -> Result<NonEmptyString, AssignError> {
    NonEmptyString::new(value.trim().to_string()).map_err(|_| AssignError::MissingField(field))
}

/// A stored set of wheels and the slot it occupies.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WheelSet {
    id: Uuid,
    details: Details,
    position: SlotId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl WheelSet {
    fn new(details: Details, position: SlotId) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            details,
            position,
            created_at: now,
            updated_at: now,
        }
    }

    /// Stable identity of the record.
    #[must_use]
    pub const fn id(&self) -> Uuid {
        self.id
    }

    /// Customer details.
    #[must_use]
    pub const fn details(&self) -> &Details {
        &self.details
    }

    /// The slot the wheel set is stored in.
    #[must_use]
    pub const fn position(&self) -> SlotId {
        self.position
    }

    /// When the record was created.
    #[must_use]
    pub const fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// When the record was last changed.
    #[must_use]
    pub const fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// Errors raised when creating or moving wheel sets.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AssignError {
    /// A required text field was blank.
    #[error("Field '{0}' must not be empty")]
    MissingField(&'static str),

    /// The target slot already holds a wheel set.
    #[error("Slot {0} is already occupied")]
    Occupied(SlotId),

    /// The target slot is disabled.
    #[error("Slot {0} is disabled")]
    Disabled(SlotId),

    /// No slot is free, so no position could be suggested.
    #[error("No free slot left")]
    NoFreeSlot,

    /// No wheel set is stored in the slot.
    #[error("No wheel set stored in slot {0}")]
    NotFound(SlotId),
}

/// How disabled slots are treated when assigning positions.
#[derive(Debug, Clone, Copy)]
pub struct Assignment<'a> {
    /// The current disabled slots.
    pub disabled: &'a DisabledSlots,
    /// Whether disabled slots may be chosen explicitly.
    pub allow_disabled: bool,
}

impl Assignment<'_> {
    fn check(&self, occupied: bool, slot: SlotId) -> Result<(), AssignError> {
        if occupied {
            return Err(AssignError::Occupied(slot));
        }
        if !self.allow_disabled && self.disabled.contains(&slot) {
            return Err(AssignError::Disabled(slot));
        }
        Ok(())
    }
}

/// All wheel sets, keyed by the slot they occupy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Versions", into = "Versions")]
pub struct WheelSets {
    by_position: BTreeMap<SlotId, WheelSet>,
}

impl WheelSets {
    /// Stores a new wheel set.
    ///
    /// Without an explicit position, the first free slot of the universe is
    /// used.
    ///
    /// # Errors
    ///
    /// - [`AssignError::Occupied`] or [`AssignError::Disabled`] if the chosen
    ///   slot cannot take the wheel set
    /// - [`AssignError::NoFreeSlot`] if no position was given and none is free
    pub fn add(
        &mut self,
        details: Details,
        position: Option<SlotId>,
        assignment: Assignment<'_>,
    ) -> Result<&WheelSet, AssignError> {
        let position = match position {
            Some(position) => {
                assignment.check(self.by_position.contains_key(&position), position)?;
                position
            }
            None => self
                .suggest(assignment.disabled)
                .ok_or(AssignError::NoFreeSlot)?,
        };

        tracing::info!(%position, plate = details.license_plate(), "storing wheel set");
        Ok(self
            .by_position
            .entry(position)
            .or_insert_with(|| WheelSet::new(details, position)))
    }

    /// The next free slot given the current records and disabled slots.
    #[must_use]
    pub fn suggest(&self, disabled: &DisabledSlots) -> Option<SlotId> {
        scheme::suggest_next_free(
            &scheme::enumerate_universe(),
            &self.occupied(),
            &disabled.slots(),
        )
    }

    /// Moves the wheel set stored in `from` to `to`.
    ///
    /// Moving a wheel set onto its own slot changes nothing.
    ///
    /// # Errors
    ///
    /// - [`AssignError::NotFound`] if nothing is stored in `from`
    /// - [`AssignError::Occupied`] or [`AssignError::Disabled`] if `to` cannot
    ///   take the wheel set
    pub fn relocate(
        &mut self,
        from: SlotId,
        to: SlotId,
        assignment: Assignment<'_>,
    ) -> Result<&WheelSet, AssignError> {
        if !self.by_position.contains_key(&from) {
            return Err(AssignError::NotFound(from));
        }
        if from != to {
            assignment.check(self.by_position.contains_key(&to), to)?;
            let mut wheel_set = self
                .by_position
                .remove(&from)
                .ok_or(AssignError::NotFound(from))?;
            wheel_set.position = to;
            wheel_set.updated_at = Utc::now();
            tracing::info!(%from, %to, "moved wheel set");
            self.by_position.insert(to, wheel_set);
        }
        self.by_position.get(&to).ok_or(AssignError::NotFound(to))
    }

    /// Replaces the customer details of the wheel set stored in a slot and
    /// refreshes its `updated_at`. The position is unchanged.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::NotFound`] if the slot is empty.
    pub fn update(&mut self, position: &SlotId, details: Details) -> Result<&WheelSet, AssignError> {
        let wheel_set = self
            .by_position
            .get_mut(position)
            .ok_or(AssignError::NotFound(*position))?;
        wheel_set.details = details;
        wheel_set.updated_at = Utc::now();
        tracing::info!(%position, "updated wheel set");
        Ok(wheel_set)
    }

    /// Deletes the wheel set stored in a slot and returns it.
    ///
    /// # Errors
    ///
    /// Returns [`AssignError::NotFound`] if the slot is empty.
    pub fn remove(&mut self, position: &SlotId) -> Result<WheelSet, AssignError> {
        let removed = self
            .by_position
            .remove(position)
            .ok_or(AssignError::NotFound(*position))?;
        tracing::info!(%position, "removed wheel set");
        Ok(removed)
    }

    /// The wheel set stored in a slot, if any.
    #[must_use]
    pub fn find_by_position(&self, position: &SlotId) -> Option<&WheelSet> {
        self.by_position.get(position)
    }

    /// Wheel sets whose customer name, license plate or car type contains the
    /// query, ignoring case, most recently updated first.
    ///
    /// A blank query matches everything.
    #[must_use]
    pub fn search(&self, query: &str) -> Vec<&WheelSet> {
        let needle = query.trim().to_lowercase();
        let mut found: Vec<&WheelSet> = self
            .by_position
            .values()
            .filter(|w| needle.is_empty() || w.details.matches(&needle))
            .collect();
        found.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        found
    }

    /// All wheel sets, in slot order.
    pub fn iter(&self) -> impl Iterator<Item = &WheelSet> {
        self.by_position.values()
    }

    /// The occupied slots as a key-set for the scheme functions.
    #[must_use]
    pub fn occupied(&self) -> HashSet<SlotId> {
        self.by_position.keys().copied().collect()
    }

    /// Number of stored wheel sets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.by_position.len()
    }

    /// Whether nothing is stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_position.is_empty()
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(tag = "_version")]
enum Versions {
    #[serde(rename = "1")]
    V1 {
        #[serde(default, rename = "wheelset", skip_serializing_if = "Vec::is_empty")]
        wheel_sets: Vec<WheelSetV1>,
    },
}

#[derive(Debug, Serialize, Deserialize)]
struct WheelSetV1 {
    id: Uuid,
    position: SlotId,
    customer_name: String,
    license_plate: String,
    car_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    note: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<Versions> for WheelSets {
    type Error = AssignError;

    fn try_from(versions: Versions) -> Result<Self, Self::Error> {
        match versions {
            Versions::V1 { wheel_sets } => {
                let mut by_position = BTreeMap::new();
                for record in wheel_sets {
                    let wheel_set = WheelSet {
                        id: record.id,
                        details: Details::new(
                            &record.customer_name,
                            &record.license_plate,
                            &record.car_type,
                            record.note.as_deref(),
                        )?,
                        position: record.position,
                        created_at: record.created_at,
                        updated_at: record.updated_at,
                    };
                    if by_position.insert(record.position, wheel_set).is_some() {
                        return Err(AssignError::Occupied(record.position));
                    }
                }
                Ok(Self { by_position })
            }
        }
    }
}

impl From<WheelSets> for Versions {
    fn from(wheel_sets: WheelSets) -> Self {
        Self::V1 {
            wheel_sets: wheel_sets
                .by_position
                .into_values()
                .map(|w| WheelSetV1 {
                    id: w.id,
                    position: w.position,
                    customer_name: w.details.customer_name().to_string(),
                    license_plate: w.details.license_plate().to_string(),
                    car_type: w.details.car_type().to_string(),
                    note: w.details.note,
                    created_at: w.created_at,
                    updated_at: w.updated_at,
                })
                .collect(),
        }
    }
}
