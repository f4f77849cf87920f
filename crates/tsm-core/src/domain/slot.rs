use std::{fmt, ops::RangeInclusive, str::FromStr};

use serde::{Deserialize, Serialize};

/// The storage family a slot belongs to.
///
/// Declaration order is the sort order: containers come before the garage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Family {
    /// Stackable containers, prefixed `C`.
    Container,
    /// Shelves in the garage, prefixed `GR`.
    Garage,
}

impl Family {
    /// Every family, in sort order.
    pub const ALL: [Self; 2] = [Self::Container, Self::Garage];

    /// Returns the grammar table for this family.
    #[must_use]
    pub fn grammar(self) -> &'static Grammar {
        match self {
            Self::Container => &CONTAINER,
            Self::Garage => &GARAGE,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Container => write!(f, "container"),
            Self::Garage => write!(f, "garage"),
        }
    }
}

/// Which side of a container a slot is on. Only container slots have a side.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Side {
    /// `R`
    Right,
    /// `L`
    Left,
}

impl Side {
    /// The single-letter code used in identifiers.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Right => 'R',
            Self::Left => 'L',
        }
    }

    const fn from_code(c: char) -> Option<Self> {
        match c {
            'R' => Some(Self::Right),
            'L' => Some(Self::Left),
            _ => None,
        }
    }
}

/// The shelf level of a slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Level {
    /// `O`
    Top,
    /// `M`
    Middle,
    /// `U`
    Bottom,
}

impl Level {
    /// The single-letter code used in identifiers.
    #[must_use]
    pub const fn code(self) -> char {
        match self {
            Self::Top => 'O',
            Self::Middle => 'M',
            Self::Bottom => 'U',
        }
    }

    const fn from_code(c: char) -> Option<Self> {
        match c {
            'O' => Some(Self::Top),
            'M' => Some(Self::Middle),
            'U' => Some(Self::Bottom),
            _ => None,
        }
    }
}

/// The position of a slot within a shelf, ordered outer-to-inner.
///
/// Containers use all six codes, the garage only uses `L`, `M` and `R`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SubSlot {
    /// `LL`
    LeftLeft,
    /// `L`
    Left,
    /// `MM`
    MiddleMiddle,
    /// `M`
    Middle,
    /// `RR`
    RightRight,
    /// `R`
    Right,
}

impl SubSlot {
    /// The code used in identifiers.
    #[must_use]
    pub const fn code(self) -> &'static str {
        match self {
            Self::LeftLeft => "LL",
            Self::Left => "L",
            Self::MiddleMiddle => "MM",
            Self::Middle => "M",
            Self::RightRight => "RR",
            Self::Right => "R",
        }
    }

    fn from_code(s: &str) -> Option<Self> {
        match s {
            "LL" => Some(Self::LeftLeft),
            "L" => Some(Self::Left),
            "MM" => Some(Self::MiddleMiddle),
            "M" => Some(Self::Middle),
            "RR" => Some(Self::RightRight),
            "R" => Some(Self::Right),
            _ => None,
        }
    }
}

/// The allowed values of every axis of one family.
///
/// The tables are listed in sort order, so iterating them yields identifiers in
/// ascending order.
#[derive(Debug)]
pub struct Grammar {
    family: Family,
    prefix: &'static str,
    bays: RangeInclusive<u8>,
    sides: &'static [Side],
    levels: &'static [Level],
    sub_slots: &'static [SubSlot],
}

const LEVELS: [Level; 3] = [Level::Top, Level::Middle, Level::Bottom];

static CONTAINER: Grammar = Grammar {
    family: Family::Container,
    prefix: "C",
    bays: 1..=4,
    sides: &[Side::Right, Side::Left],
    levels: &LEVELS,
    sub_slots: &[
        SubSlot::LeftLeft,
        SubSlot::Left,
        SubSlot::MiddleMiddle,
        SubSlot::Middle,
        SubSlot::RightRight,
        SubSlot::Right,
    ],
};

static GARAGE: Grammar = Grammar {
    family: Family::Garage,
    prefix: "GR",
    bays: 1..=8,
    sides: &[],
    levels: &LEVELS,
    sub_slots: &[SubSlot::Left, SubSlot::Middle, SubSlot::Right],
};

impl Grammar {
    /// The family this grammar describes.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.family
    }

    /// The identifier prefix (`C` or `GR`).
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        self.prefix
    }

    /// The valid bay numbers.
    #[must_use]
    pub fn bays(&self) -> RangeInclusive<u8> {
        self.bays.clone()
    }

    /// The valid sides. Empty if the family has no side axis.
    #[must_use]
    pub const fn sides(&self) -> &'static [Side] {
        self.sides
    }

    /// The valid levels.
    #[must_use]
    pub const fn levels(&self) -> &'static [Level] {
        self.levels
    }

    /// The valid sub-slots.
    #[must_use]
    pub const fn sub_slots(&self) -> &'static [SubSlot] {
        self.sub_slots
    }

    /// Shortest and longest identifier this grammar accepts.
    #[must_use]
    pub fn length_bounds(&self) -> (usize, usize) {
        let fixed = self.prefix.len() + 1 + usize::from(!self.sides.is_empty()) + 1;
        let codes = self.sub_slots.iter().map(|s| s.code().len());
        let min = codes.clone().min().unwrap_or_default();
        let max = codes.max().unwrap_or_default();
        (fixed + min, fixed + max)
    }

    /// The number of slots described by this grammar.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bays().count()
            * self.sides.len().max(1)
            * self.levels.len()
            * self.sub_slots.len()
    }

    /// Whether this grammar describes no slots at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Generates every identifier of this family in ascending order.
    pub fn slots(&'static self) -> impl Iterator<Item = SlotId> {
        let sides: Vec<Option<Side>> = if self.sides.is_empty() {
            vec![None]
        } else {
            self.sides.iter().copied().map(Some).collect()
        };

        self.bays().flat_map(move |bay| {
            sides.clone().into_iter().flat_map(move |side| {
                self.levels.iter().flat_map(move |&level| {
                    self.sub_slots.iter().map(move |&sub_slot| SlotId {
                        family: self.family,
                        bay,
                        side,
                        level,
                        sub_slot,
                    })
                })
            })
        })
    }

    fn sub_slot_codes(&self) -> String {
        self.sub_slots
            .iter()
            .map(|s| s.code())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Picks the grammar by prefix. `GR` is checked before `C`.
    fn for_input(s: &str) -> Option<&'static Self> {
        if s.starts_with(GARAGE.prefix) {
            Some(&GARAGE)
        } else if s.starts_with(CONTAINER.prefix) {
            Some(&CONTAINER)
        } else {
            None
        }
    }

    fn parse(&'static self, s: &str) -> Result<SlotId, Reason> {
        let (min, max) = self.length_bounds();
        let found = s.chars().count();
        if !(min..=max).contains(&found) {
            return Err(Reason::Length { min, max, found });
        }

        let truncated = Reason::Length { min, max, found };
        let mut rest = s[self.prefix.len()..].chars();

        let bay_code = rest.next().ok_or_else(|| truncated.clone())?;
        let bay = bay_code
            .to_digit(10)
            .and_then(|d| u8::try_from(d).ok())
            .ok_or(Reason::Bay(bay_code))?;
        if !self.bays.contains(&bay) {
            return Err(Reason::BayOutOfRange {
                bay,
                max: *self.bays.end(),
            });
        }

        let side = if self.sides.is_empty() {
            None
        } else {
            let code = rest.next().ok_or_else(|| truncated.clone())?;
            let side = Side::from_code(code)
                .filter(|side| self.sides.contains(side))
                .ok_or(Reason::Side(code))?;
            Some(side)
        };

        let level_code = rest.next().ok_or(truncated)?;
        let level = Level::from_code(level_code)
            .filter(|level| self.levels.contains(level))
            .ok_or(Reason::Level(level_code))?;

        let sub_code = rest.as_str();
        let sub_slot = SubSlot::from_code(sub_code)
            .filter(|sub| self.sub_slots.contains(sub))
            .ok_or_else(|| Reason::SubSlot {
                found: sub_code.to_string(),
                family: self.family,
            })?;

        Ok(SlotId {
            family: self.family,
            bay,
            side,
            level,
            sub_slot,
        })
    }
}

/// A validated storage slot identifier.
///
/// Format:
/// - container: `C{bay}{side}{level}{sub-slot}`, e.g. `C1ROLL`, `C4LUR`
/// - garage: `GR{bay}{level}{sub-slot}`, e.g. `GR1OL`, `GR8UR`
///
/// The derived ordering is the physical layout order: family, bay, side, level,
/// then sub-slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SlotId {
    family: Family,
    bay: u8,
    side: Option<Side>,
    level: Level,
    sub_slot: SubSlot,
}

impl SlotId {
    /// Creates a container slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the bay is out of range.
    pub fn container(
        bay: u8,
        side: Side,
        level: Level,
        sub_slot: SubSlot,
    ) -> Result<Self, InvalidFormat> {
        Self::checked(Family::Container, bay, Some(side), level, sub_slot)
    }

    /// Creates a garage slot.
    ///
    /// # Errors
    ///
    /// Returns an error if the bay is out of range or the sub-slot is not one
    /// of `L`, `M` or `R`.
    pub fn garage(bay: u8, level: Level, sub_slot: SubSlot) -> Result<Self, InvalidFormat> {
        Self::checked(Family::Garage, bay, None, level, sub_slot)
    }

    fn checked(
        family: Family,
        bay: u8,
        side: Option<Side>,
        level: Level,
        sub_slot: SubSlot,
    ) -> Result<Self, InvalidFormat> {
        let slot = Self {
            family,
            bay,
            side,
            level,
            sub_slot,
        };
        // Re-parsing the rendered form applies the same table checks as user input.
        parse(&slot.to_string())
    }

    /// The family this slot belongs to.
    #[must_use]
    pub const fn family(&self) -> Family {
        self.family
    }

    /// The container or shelf number.
    #[must_use]
    pub const fn bay(&self) -> u8 {
        self.bay
    }

    /// The container side. Always `None` for garage slots.
    #[must_use]
    pub const fn side(&self) -> Option<Side> {
        self.side
    }

    /// The shelf level.
    #[must_use]
    pub const fn level(&self) -> Level {
        self.level
    }

    /// The position within the shelf.
    #[must_use]
    pub const fn sub_slot(&self) -> SubSlot {
        self.sub_slot
    }
}

impl fmt::Display for SlotId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}{}", self.family.grammar().prefix, self.bay)?;
        if let Some(side) = self.side {
            write!(f, "{}", side.code())?;
        }
        write!(f, "{}{}", self.level.code(), self.sub_slot.code())
    }
}

/// Parses a slot identifier, ignoring ASCII case.
///
/// # Errors
///
/// Returns [`InvalidFormat`] naming the first grammar component that failed.
pub fn parse(input: &str) -> Result<SlotId, InvalidFormat> {
    let canonical = input.to_ascii_uppercase();
    Grammar::for_input(&canonical)
        .ok_or(Reason::Prefix)
        .and_then(|grammar| grammar.parse(&canonical))
        .map_err(|reason| InvalidFormat {
            input: input.to_string(),
            reason,
        })
}

/// Returns `true` if the input is a structurally valid slot identifier.
#[must_use]
pub fn is_valid(input: &str) -> bool {
    parse(input).is_ok()
}

impl FromStr for SlotId {
    type Err = InvalidFormat;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}

impl TryFrom<&str> for SlotId {
    type Error = InvalidFormat;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        parse(value)
    }
}

impl TryFrom<String> for SlotId {
    type Error = InvalidFormat;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse(&value)
    }
}

impl From<SlotId> for String {
    fn from(slot: SlotId) -> Self {
        slot.to_string()
    }
}

/// Error returned when a string is not a valid slot identifier.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
#[error("Invalid slot identifier '{input}': {reason}")]
pub struct InvalidFormat {
    input: String,
    reason: Reason,
}

impl InvalidFormat {
    /// The rejected input, as given.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.input
    }

    /// Which part of the grammar rejected the input.
    #[must_use]
    pub const fn reason(&self) -> &Reason {
        &self.reason
    }
}

/// The grammar component that rejected an identifier.
#[derive(Debug, Clone, thiserror::Error, PartialEq, Eq)]
pub enum Reason {
    /// The identifier starts with neither `C` nor `GR`.
    #[error("expected prefix 'C' (container) or 'GR' (garage)")]
    Prefix,

    /// The identifier is too short or too long for its family.
    #[error("expected {min} to {max} characters, found {found}")]
    Length {
        /// Shortest accepted length.
        min: usize,
        /// Longest accepted length.
        max: usize,
        /// Length of the input.
        found: usize,
    },

    /// The bay is not a digit.
    #[error("expected a bay number, found '{0}'")]
    Bay(char),

    /// The bay number is outside the family's range.
    #[error("bay {bay} is out of range 1-{max}")]
    BayOutOfRange {
        /// The parsed bay number.
        bay: u8,
        /// Highest valid bay for the family.
        max: u8,
    },

    /// Unknown container side.
    #[error("unknown side '{0}', expected R or L")]
    Side(char),

    /// Unknown level.
    #[error("unknown level '{0}', expected O, M or U")]
    Level(char),

    /// Unknown sub-slot code for the family.
    #[error("unknown sub-slot '{found}' for a {family} slot, expected one of {}", sub_slot_codes(.family))]
    SubSlot {
        /// The trailing code that did not match.
        found: String,
        /// The family whose table was consulted.
        family: Family,
    },
}

fn sub_slot_codes(family: &Family) -> String {
    family.grammar().sub_slot_codes()
}
