//! Score, serve possession and lineups.
//!
//! [`MatchState::apply_result`] is the only rally transition. It never
//! mutates in place: every call returns a new state, so callers can keep the
//! previous one around for undo.
//!
//! ```text
//!            Point by server / Error by receiver
//!           ┌──────────────┐
//!           ▼              │
//!   ┌──────────────┐  side-out   ┌──────────────┐
//!   │ Home serving │────────────▶│ Away serving │
//!   │              │◀────────────│              │
//!   └──────────────┘  side-out   └──────────────┘
//!     (winner's lineup rotates once on every side-out)
//! ```

use super::event::TagEvent;
use super::rotation::{rotate, Lineup};
use super::side::Side;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{debug, info};

/// Points per side in the current set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl Score {
    pub fn new(home: u32, away: u32) -> Self {
        Self { home, away }
    }

    pub fn get(&self, side: Side) -> u32 {
        match side {
            Side::Home => self.home,
            Side::Away => self.away,
        }
    }

    /// Score with one more point for `side`.
    pub fn increment(self, side: Side) -> Self {
        match side {
            Side::Home => Self {
                home: self.home + 1,
                ..self
            },
            Side::Away => Self {
                away: self.away + 1,
                ..self
            },
        }
    }
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.home, self.away)
    }
}

/// Both teams' lineups.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lineups {
    #[serde(default)]
    pub home: Lineup,
    #[serde(default)]
    pub away: Lineup,
}

impl Lineups {
    pub fn get(&self, side: Side) -> &Lineup {
        match side {
            Side::Home => &self.home,
            Side::Away => &self.away,
        }
    }

    pub fn get_mut(&mut self, side: Side) -> &mut Lineup {
        match side {
            Side::Home => &mut self.home,
            Side::Away => &mut self.away,
        }
    }
}

/// Everything derived from the committed events.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchState {
    pub score: Score,
    pub serving: Side,
    pub set: u8,
    pub lineups: Lineups,
}

impl Default for MatchState {
    fn default() -> Self {
        Self {
            score: Score::default(),
            serving: Side::Home,
            set: 1,
            lineups: Lineups::default(),
        }
    }
}

impl MatchState {
    pub fn new(serving: Side, set: u8) -> Self {
        Self {
            serving,
            set,
            ..Self::default()
        }
    }

    pub fn with_lineups(mut self, lineups: Lineups) -> Self {
        self.lineups = lineups;
        self
    }

    pub fn lineup(&self, side: Side) -> &Lineup {
        self.lineups.get(side)
    }

    pub fn lineup_mut(&mut self, side: Side) -> &mut Lineup {
        self.lineups.get_mut(side)
    }

    /// Apply the outcome of a committed event.
    ///
    /// A rally won by the receiving team is a side-out: serve changes hands
    /// and the new server rotates once. A rally won by the server changes
    /// only the score.
    pub fn apply_result(&self, event: &TagEvent) -> MatchState {
        let mut next = self.clone();

        let Some(winner) = event.winner() else {
            return next;
        };

        next.score = self.score.increment(winner);

        if winner != self.serving {
            info!(side = %winner, score = %next.score, "Side-out");
            next.serving = winner;
            *next.lineup_mut(winner) = rotate(self.lineup(winner));
        } else {
            debug!(side = %winner, score = %next.score, "Server holds");
        }

        next
    }

    /// Rotate one side without touching score or serve.
    pub fn rotate_side(&self, side: Side) -> MatchState {
        let mut next = self.clone();
        *next.lineup_mut(side) = rotate(self.lineup(side));
        next
    }

    /// Start the next set at 0-0, keeping serve and lineups.
    pub fn next_set(&self) -> MatchState {
        MatchState {
            score: Score::default(),
            set: self.set.saturating_add(1),
            ..self.clone()
        }
    }
}
