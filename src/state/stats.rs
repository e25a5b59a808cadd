//! Per-player skill statistics over the event log.

use super::event::{EventLog, RallyResult, Skill};
use super::side::Side;
use std::collections::BTreeMap;

/// Attempts and outcomes for one skill.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SkillLine {
    pub attempts: u32,
    pub points: u32,
    pub errors: u32,
}

impl SkillLine {
    /// `(points - errors) / attempts`, or 0 with no attempts.
    pub fn efficiency(&self) -> f64 {
        if self.attempts == 0 {
            return 0.0;
        }
        (self.points as f64 - self.errors as f64) / self.attempts as f64
    }

    fn record(&mut self, result: RallyResult) {
        self.attempts += 1;
        match result {
            RallyResult::Point => self.points += 1,
            RallyResult::Error => self.errors += 1,
            RallyResult::Continue => {}
        }
    }
}

/// One player's lines, keyed by skill.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlayerStats {
    pub skills: BTreeMap<Skill, SkillLine>,
}

impl PlayerStats {
    pub fn skill(&self, skill: Skill) -> SkillLine {
        self.skills.get(&skill).copied().unwrap_or_default()
    }

    pub fn total(&self) -> SkillLine {
        self.skills
            .values()
            .fold(SkillLine::default(), |acc, line| SkillLine {
                attempts: acc.attempts + line.attempts,
                points: acc.points + line.points,
                errors: acc.errors + line.errors,
            })
    }
}

/// Statistics for every player that appears in the log.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MatchStats {
    players: BTreeMap<(u8, String), PlayerStats>,
}

fn side_key(side: Side) -> u8 {
    match side {
        Side::Home => 0,
        Side::Away => 1,
    }
}

impl MatchStats {
    /// Tally the whole log, or only one set.
    pub fn from_log(log: &EventLog, set: Option<u8>) -> Self {
        let mut stats = Self::default();
        for event in log.iter().filter(|e| set.map_or(true, |s| e.set == s)) {
            stats
                .players
                .entry((side_key(event.team), event.player_number.clone()))
                .or_default()
                .skills
                .entry(event.skill)
                .or_default()
                .record(event.result);
        }
        stats
    }

    pub fn player(&self, side: Side, number: &str) -> Option<&PlayerStats> {
        self.players.get(&(side_key(side), number.to_string()))
    }

    /// Players of one side with their stats, in jersey-string order.
    pub fn side(&self, side: Side) -> impl Iterator<Item = (&str, &PlayerStats)> {
        let key = side_key(side);
        self.players
            .iter()
            .filter(move |((s, _), _)| *s == key)
            .map(|((_, number), stats)| (number.as_str(), stats))
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}
