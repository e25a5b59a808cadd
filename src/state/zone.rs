//! Court geometry.
//!
//! Maps a point on the rendered full court to a rotational zone. Both teams
//! share one drawing: the top half belongs to one side and the bottom half to
//! the other, and the two halves number their zones in opposite rotational
//! orientation.
//!
//! ```text
//!   x:  0 ──── 35 ──── 65 ──── 100
//! y 0   ┌───────┬───────┬───────┐
//!       │   1   │   6   │   5   │  top back row
//! 34.67 ├───────┼───────┼───────┤
//!       │   2   │   3   │   4   │  top front row
//! 50    ╞═══════╪═══════╪═══════╡  net
//!       │   4   │   3   │   2   │  bottom front row
//! 65.33 ├───────┼───────┼───────┤
//!       │   5   │   6   │   1   │  bottom back row
//! 100   └───────┴───────┴───────┘
//! ```

use super::side::Side;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Upper bound of normalized court space.
pub const COURT_EXTENT: f64 = 100.0;

/// Net line splitting the two halves.
pub const NET_LINE: f64 = 50.0;

/// Attack line of the top half.
pub const TOP_ATTACK_LINE: f64 = 34.67;

/// Attack line of the bottom half.
pub const BOTTOM_ATTACK_LINE: f64 = 65.33;

/// Right edge of the left column.
pub const LEFT_COLUMN_END: f64 = 35.0;

/// Right edge of the center column.
pub const CENTER_COLUMN_END: f64 = 65.0;

/// Volleyball rotational position, 1 through 6.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum Zone {
    One = 1,
    Two = 2,
    Three = 3,
    Four = 4,
    Five = 5,
    Six = 6,
}

impl Zone {
    /// All zones in numeric order.
    pub const ALL: [Zone; 6] = [
        Zone::One,
        Zone::Two,
        Zone::Three,
        Zone::Four,
        Zone::Five,
        Zone::Six,
    ];

    pub fn number(self) -> u8 {
        self as u8
    }

    /// Position in a zero-based six element array.
    pub fn index(self) -> usize {
        self as usize - 1
    }

    pub fn is_front_row(self) -> bool {
        matches!(self, Self::Two | Self::Three | Self::Four)
    }

    pub fn is_back_row(self) -> bool {
        !self.is_front_row()
    }
}

impl Default for Zone {
    /// Fallback zone for actions with no spatial tag.
    fn default() -> Self {
        Self::One
    }
}

impl fmt::Display for Zone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.number())
    }
}

/// Error when a number is not a zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidZone(pub u8);

impl fmt::Display for InvalidZone {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Invalid zone {}: expected 1-6", self.0)
    }
}

impl std::error::Error for InvalidZone {}

impl TryFrom<u8> for Zone {
    type Error = InvalidZone;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::One),
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            4 => Ok(Self::Four),
            5 => Ok(Self::Five),
            6 => Ok(Self::Six),
            other => Err(InvalidZone(other)),
        }
    }
}

impl From<Zone> for u8 {
    fn from(zone: Zone) -> Self {
        zone.number()
    }
}

/// A point in normalized court space, origin top-left, y growing downward.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub x: f64,
    pub y: f64,
}

impl Coordinate {
    /// Create a coordinate, clamping both axes into `[0, 100]`.
    pub fn new(x: f64, y: f64) -> Self {
        Self {
            x: clamp_axis(x),
            y: clamp_axis(y),
        }
    }

    pub fn half(&self) -> CourtHalf {
        if self.y < NET_LINE {
            CourtHalf::Top
        } else {
            CourtHalf::Bottom
        }
    }

    pub fn row(&self) -> Row {
        match self.half() {
            CourtHalf::Top if self.y > TOP_ATTACK_LINE => Row::Front,
            CourtHalf::Top => Row::Back,
            CourtHalf::Bottom if self.y < BOTTOM_ATTACK_LINE => Row::Front,
            CourtHalf::Bottom => Row::Back,
        }
    }

    pub fn column(&self) -> Column {
        if self.x < LEFT_COLUMN_END {
            Column::Left
        } else if self.x < CENTER_COLUMN_END {
            Column::Center
        } else {
            Column::Right
        }
    }
}

fn clamp_axis(value: f64) -> f64 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, COURT_EXTENT)
    }
}

/// Half of the rendered full court.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CourtHalf {
    Top,
    Bottom,
}

/// Distance from the net within one half.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Row {
    Front,
    Back,
}

/// Horizontal third of the court.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Left,
    Center,
    Right,
}

/// Classify a court point into its rotational zone.
pub fn classify(coordinate: Coordinate) -> Zone {
    use Column::*;

    match (coordinate.half(), coordinate.row(), coordinate.column()) {
        (CourtHalf::Top, Row::Back, Left) => Zone::One,
        (CourtHalf::Top, Row::Back, Center) => Zone::Six,
        (CourtHalf::Top, Row::Back, Right) => Zone::Five,
        (CourtHalf::Top, Row::Front, Left) => Zone::Two,
        (CourtHalf::Top, Row::Front, Center) => Zone::Three,
        (CourtHalf::Top, Row::Front, Right) => Zone::Four,
        (CourtHalf::Bottom, Row::Front, Left) => Zone::Four,
        (CourtHalf::Bottom, Row::Front, Center) => Zone::Three,
        (CourtHalf::Bottom, Row::Front, Right) => Zone::Two,
        (CourtHalf::Bottom, Row::Back, Left) => Zone::Five,
        (CourtHalf::Bottom, Row::Back, Center) => Zone::Six,
        (CourtHalf::Bottom, Row::Back, Right) => Zone::One,
    }
}

/// Zones in on-screen order for a two-row lineup grid, front row first.
pub fn court_layout(side: Side) -> [Zone; 6] {
    match side {
        Side::Home => [
            Zone::Four,
            Zone::Three,
            Zone::Two,
            Zone::Five,
            Zone::Six,
            Zone::One,
        ],
        Side::Away => [
            Zone::Five,
            Zone::Six,
            Zone::One,
            Zone::Four,
            Zone::Three,
            Zone::Two,
        ],
    }
}
