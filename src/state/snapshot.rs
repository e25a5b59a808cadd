//! Persisted match snapshot.
//!
//! The whole match is written as one JSON document after every change:
//!
//! ```text
//! { "metadata": {..}, "lineup": {"home": {..}, "away": {..}},
//!   "events": [..], "score": {"home": n, "away": n},
//!   "serving": "Home", "set": 1 }
//! ```
//!
//! Writes are fire-and-forget. A document that cannot be parsed is replaced
//! by an empty match rather than surfaced to the caller.

use super::event::EventLog;
use super::match_state::{Lineups, MatchState, Score};
use super::roster::Team;
use super::side::Side;
use super::store::KeyValueStore;
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, warn};

/// Descriptive match information.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchMetadata {
    pub date: NaiveDate,

    #[serde(default)]
    pub tournament: String,

    #[serde(default)]
    pub home_team: Team,

    #[serde(default)]
    pub away_team: Team,
}

impl Default for MatchMetadata {
    fn default() -> Self {
        Self {
            date: Utc::now().date_naive(),
            tournament: String::new(),
            home_team: Team::default(),
            away_team: Team::default(),
        }
    }
}

impl MatchMetadata {
    pub fn team(&self, side: Side) -> &Team {
        match side {
            Side::Home => &self.home_team,
            Side::Away => &self.away_team,
        }
    }

    pub fn team_mut(&mut self, side: Side) -> &mut Team {
        match side {
            Side::Home => &mut self.home_team,
            Side::Away => &mut self.away_team,
        }
    }
}

fn default_set() -> u8 {
    1
}

/// Everything needed to resume a match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchSnapshot {
    #[serde(default)]
    pub metadata: MatchMetadata,

    #[serde(default)]
    pub lineup: Lineups,

    #[serde(default)]
    pub events: EventLog,

    #[serde(default)]
    pub score: Score,

    #[serde(default)]
    pub serving: Side,

    #[serde(default = "default_set")]
    pub set: u8,
}

impl Default for MatchSnapshot {
    fn default() -> Self {
        Self {
            metadata: MatchMetadata::default(),
            lineup: Lineups::default(),
            events: EventLog::default(),
            score: Score::default(),
            serving: Side::Home,
            set: default_set(),
        }
    }
}

impl MatchSnapshot {
    pub fn new(metadata: MatchMetadata, state: &MatchState, events: EventLog) -> Self {
        Self {
            metadata,
            lineup: state.lineups.clone(),
            events,
            score: state.score,
            serving: state.serving,
            set: state.set,
        }
    }

    /// Rebuild the live match state.
    pub fn match_state(&self) -> MatchState {
        MatchState {
            score: self.score,
            serving: self.serving,
            set: self.set,
            lineups: self.lineup.clone(),
        }
    }

    /// Read the snapshot stored under `key`, or an empty match.
    pub fn load(store: &impl KeyValueStore, key: &str) -> Self {
        Self::try_load(store, key).unwrap_or_default()
    }

    /// Read the snapshot stored under `key`; `None` if missing or corrupt.
    pub fn try_load(store: &impl KeyValueStore, key: &str) -> Option<Self> {
        let Some(raw) = store.get(key) else {
            debug!(key, "No saved match");
            return None;
        };

        match serde_json::from_str(&raw) {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                warn!(key, error = %e, "Corrupt saved match, starting empty");
                None
            }
        }
    }

    /// Write the snapshot under `key`. Failures are logged, not returned.
    pub fn save(&self, store: &mut impl KeyValueStore, key: &str) {
        match serde_json::to_string(self) {
            Ok(raw) => store.set(key, raw),
            Err(e) => error!(key, error = %e, "Failed to serialize match"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::event::{EventRecorder, RallyResult, RecordingContext, Skill};
    use crate::state::roster::{Player, Role};
    use crate::state::rotation::Slot;
    use crate::state::store::{MemoryStore, MATCH_STORAGE_KEY};
    use crate::state::zone::Zone;
    use pretty_assertions::assert_eq;

    fn sample() -> MatchSnapshot {
        let mut metadata = MatchMetadata::default();
        metadata.tournament = "HVL".to_string();
        metadata.home_team = Team::with_players("Neihu", [Player::new("7", "Kuo", Role::Setter)]);

        let mut state = MatchState::new(Side::Away, 2);
        let setter = metadata.home_team.roster()[0].clone();
        state.lineup_mut(Side::Home).place(Slot::Zone(Zone::One), setter);
        state.score = Score::new(4, 6);

        let mut recorder = EventRecorder::new();
        recorder.pending_mut().select_player(Side::Home, "7");
        recorder.pending_mut().select_skill(Skill::Set);
        recorder
            .commit(RallyResult::Continue, &RecordingContext::new(3.0, 2))
            .unwrap();

        MatchSnapshot::new(metadata, &state, recorder.log().clone())
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let snapshot = sample();
        snapshot.save(&mut store, MATCH_STORAGE_KEY);

        let loaded = MatchSnapshot::load(&store, MATCH_STORAGE_KEY);
        assert_eq!(loaded, snapshot);
        assert_eq!(loaded.match_state().serving, Side::Away);
        assert_eq!(loaded.match_state().set, 2);
    }

    #[test]
    fn test_document_shape() {
        let json = serde_json::to_value(sample()).unwrap();
        assert_eq!(json["score"]["home"], 4);
        assert_eq!(json["metadata"]["homeTeam"]["name"], "Neihu");
        assert_eq!(json["lineup"]["home"]["1"]["number"], "7");
        assert_eq!(json["events"].as_array().unwrap().len(), 1);
    }

    #[test]
    fn test_missing_key_loads_default() {
        let store = MemoryStore::new();
        let loaded = MatchSnapshot::load(&store, MATCH_STORAGE_KEY);
        assert!(loaded.events.is_empty());
        assert_eq!(loaded.score, Score::default());
    }

    #[test]
    fn test_corrupt_document_loads_default() {
        let mut store = MemoryStore::new();
        store.set(MATCH_STORAGE_KEY, "{\"score\": ".to_string());
        let loaded = MatchSnapshot::load(&store, MATCH_STORAGE_KEY);
        assert_eq!(loaded.match_state(), MatchState::default());
    }

    #[test]
    fn test_legacy_document_without_serve_or_set() {
        let raw = r#"{
            "metadata": {"date": "2025-03-01", "tournament": "", "homeTeam": {"name": "A", "roster": []}, "awayTeam": {"name": "B", "roster": []}},
            "lineup": {"home": {}, "away": {}},
            "events": [],
            "score": {"home": 2, "away": 1}
        }"#;
        let mut store = MemoryStore::new();
        store.set(MATCH_STORAGE_KEY, raw.to_string());

        let loaded = MatchSnapshot::load(&store, MATCH_STORAGE_KEY);
        assert_eq!(loaded.score, Score::new(2, 1));
        assert_eq!(loaded.serving, Side::Home);
        assert_eq!(loaded.set, 1);
        assert_eq!(loaded.metadata.away_team.name, "B");
    }
}
