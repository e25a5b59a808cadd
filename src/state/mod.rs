//! State management module for volleyball tagging.
//!
//! This module provides the core state types and the combined session:
//!
//! - `zone` - Court coordinate to rotational zone
//! - `roster` - Teams, players and roles
//! - `rotation` - Lineups and the rotation/libero rules
//! - `event` - Pending events, committed events and the event log
//! - `match_state` - Score, serve and lineups driven by committed events
//! - `store` - Key-value storage and role memory capabilities
//! - `snapshot` - Persisted match document
//! - `database` - Saved teams
//! - `presets` - Built-in team catalog
//! - `phase` - Workflow phase state machine
//! - `stats` - Per-player skill statistics
//!
//! # Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────────┐
//! │                        TaggingSession                            │
//! │                                                                  │
//! │  PendingEvent ──commit──▶ EventRecorder ──TagEvent──▶ EventLog   │
//! │                                │                                 │
//! │                                ▼ apply_result                    │
//! │                          MatchState ──side-out──▶ rotate(Lineup) │
//! │                                │                                 │
//! │                                ▼ after every change              │
//! │                          MatchSnapshot ──▶ KeyValueStore         │
//! │                                                                  │
//! │  Team ◀──roles── PersistedRoles ◀──── KeyValueStore              │
//! └──────────────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod database;
pub mod event;
pub mod match_state;
pub mod phase;
pub mod presets;
pub mod roster;
pub mod rotation;
pub mod side;
pub mod snapshot;
pub mod stats;
pub mod store;
pub mod zone;

// Re-export commonly used types
pub use config::{ConfigError, TaggerConfig};
pub use database::{TeamDatabase, TeamDbError};
pub use event::{
    EventLog, EventRecorder, Grade, PendingEvent, RallyResult, RecordingContext, Skill,
    SkillSubType, TagEvent, ValidationError,
};
pub use match_state::{Lineups, MatchState, Score};
pub use phase::{InvalidTransition, PhaseEvent, SessionPhase};
pub use presets::{find_preset, preset_names, preset_teams};
pub use roster::{ImportSummary, Player, Role, RosterError, Team};
pub use rotation::{rotate, Lineup, Slot};
pub use side::Side;
pub use snapshot::{MatchMetadata, MatchSnapshot};
pub use stats::{MatchStats, PlayerStats, SkillLine};
pub use store::{KeyValueStore, MemoryRoleStore, MemoryStore, PersistedRoles, RoleStore};
pub use zone::{classify, Coordinate, Zone};

use std::collections::VecDeque;
use std::fmt;
use tracing::{debug, info};

/// Session errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionError {
    Validation(ValidationError),
    Roster(RosterError),
    TeamDb(TeamDbError),
    Phase(InvalidTransition),
    /// A side has fewer players than the configured minimum
    RosterTooSmall {
        side: Side,
        required: usize,
        found: usize,
    },
}

impl fmt::Display for SessionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Validation(e) => write!(f, "{}", e),
            Self::Roster(e) => write!(f, "{}", e),
            Self::TeamDb(e) => write!(f, "{}", e),
            Self::Phase(e) => write!(f, "{}", e),
            Self::RosterTooSmall {
                side,
                required,
                found,
            } => write!(
                f,
                "{} roster has {} players, at least {} required",
                side, found, required
            ),
        }
    }
}

impl std::error::Error for SessionError {}

impl From<ValidationError> for SessionError {
    fn from(e: ValidationError) -> Self {
        Self::Validation(e)
    }
}

impl From<RosterError> for SessionError {
    fn from(e: RosterError) -> Self {
        Self::Roster(e)
    }
}

impl From<TeamDbError> for SessionError {
    fn from(e: TeamDbError) -> Self {
        Self::TeamDb(e)
    }
}

impl From<InvalidTransition> for SessionError {
    fn from(e: InvalidTransition) -> Self {
        Self::Phase(e)
    }
}

/// Combined tagging state for one operator.
///
/// Owns the store it persists to. Every state change is followed by a
/// snapshot write; role assignments and saved teams go to their own keys.
#[derive(Debug)]
pub struct TaggingSession<S> {
    config: TaggerConfig,
    store: S,
    phase: SessionPhase,
    metadata: MatchMetadata,
    teams: TeamDatabase,
    recorder: EventRecorder,
    state: MatchState,
    /// State before each committed event, newest last, for undo
    history: VecDeque<MatchState>,
}

impl<S: KeyValueStore> TaggingSession<S> {
    /// Open a session with default configuration, resuming any saved match.
    pub fn new(store: S) -> Self {
        Self::with_config(TaggerConfig::default(), store)
    }

    pub fn with_config(config: TaggerConfig, store: S) -> Self {
        let teams = TeamDatabase::load(&store, &config.team_storage_key);

        let (metadata, recorder, state) =
            match MatchSnapshot::try_load(&store, &config.match_storage_key) {
                Some(snapshot) => {
                    info!(events = snapshot.events.len(), score = %snapshot.score, "Resumed match");
                    let state = snapshot.match_state();
                    (
                        snapshot.metadata,
                        EventRecorder::with_log(snapshot.events),
                        state,
                    )
                }
                None => (
                    MatchMetadata::default(),
                    EventRecorder::new(),
                    MatchState::new(config.initial_server, config.first_set),
                ),
            };

        Self {
            config,
            store,
            phase: SessionPhase::Setup,
            metadata,
            teams,
            recorder,
            state,
            history: VecDeque::new(),
        }
    }

    pub fn config(&self) -> &TaggerConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn metadata(&self) -> &MatchMetadata {
        &self.metadata
    }

    pub fn team(&self, side: Side) -> &Team {
        self.metadata.team(side)
    }

    pub fn teams(&self) -> &TeamDatabase {
        &self.teams
    }

    pub fn state(&self) -> &MatchState {
        &self.state
    }

    pub fn score(&self) -> Score {
        self.state.score
    }

    pub fn serving(&self) -> Side {
        self.state.serving
    }

    pub fn lineup(&self, side: Side) -> &Lineup {
        self.state.lineup(side)
    }

    pub fn log(&self) -> &EventLog {
        self.recorder.log()
    }

    pub fn pending(&self) -> &PendingEvent {
        self.recorder.pending()
    }

    pub fn pending_mut(&mut self) -> &mut PendingEvent {
        self.recorder.pending_mut()
    }

    /// Role memory backed by this session's store.
    pub fn roles(&mut self) -> PersistedRoles<&mut S> {
        PersistedRoles::new(&mut self.store, self.config.role_storage_key.as_str())
    }

    // Match details

    pub fn set_team_name(&mut self, side: Side, name: &str) {
        self.metadata.team_mut(side).name = name.to_string();
        self.persist();
    }

    pub fn set_tournament(&mut self, tournament: &str) {
        self.metadata.tournament = tournament.to_string();
        self.persist();
    }

    pub fn set_date(&mut self, date: chrono::NaiveDate) {
        self.metadata.date = date;
        self.persist();
    }

    // Roster

    /// Add a player to a side's roster; the role comes from role memory.
    pub fn add_player(&mut self, side: Side, number: &str, name: &str) -> Result<(), SessionError> {
        let roles = PersistedRoles::new(&mut self.store, self.config.role_storage_key.as_str());
        self.metadata.team_mut(side).enroll(number, name, &roles)?;
        self.persist();
        Ok(())
    }

    /// Change a player's number and name on the roster and in the lineup.
    pub fn edit_player(
        &mut self,
        side: Side,
        player_id: &str,
        number: &str,
        name: &str,
    ) -> Result<(), SessionError> {
        let team = self.metadata.team_mut(side);
        team.edit_player(player_id, number, name)?;

        if let Some(updated) = team.get(player_id).cloned() {
            let lineup = self.state.lineup_mut(side);
            if let Some(slot) = lineup.slot_of(player_id) {
                lineup.place(slot, updated);
            }
        }

        self.lineup_edited();
        self.persist();
        Ok(())
    }

    /// Remove a player from the roster and vacate their lineup slot.
    pub fn remove_player(&mut self, side: Side, player_id: &str) -> Result<Player, SessionError> {
        let player = self
            .metadata
            .team_mut(side)
            .remove_player(player_id)
            .ok_or_else(|| RosterError::PlayerNotFound(player_id.to_string()))?;
        self.state.lineup_mut(side).remove_player(player_id);
        self.lineup_edited();
        self.persist();
        Ok(player)
    }

    /// Import pasted `<number> <name>` lines into a side's roster.
    pub fn import_roster_text(&mut self, side: Side, text: &str) -> ImportSummary {
        let roles = PersistedRoles::new(&mut self.store, self.config.role_storage_key.as_str());
        let summary = self.metadata.team_mut(side).import_lines(text, &roles);
        debug!(side = %side, added = summary.added, skipped = summary.skipped, "Imported roster text");
        self.persist();
        summary
    }

    // Team database

    /// Load a saved or preset team onto a side, with fresh ids and
    /// remembered roles. Saved teams shadow presets of the same name.
    pub fn import_team(&mut self, side: Side, name: &str) -> Result<usize, SessionError> {
        let saved = self
            .teams
            .find_or_preset(name)
            .ok_or_else(|| TeamDbError::NotFound(name.trim().to_string()))?;
        let roles = PersistedRoles::new(&mut self.store, self.config.role_storage_key.as_str());
        let team = saved.reissue(&roles);
        let count = team.len();

        info!(side = %side, team = %team.name, players = count, "Imported team");
        *self.metadata.team_mut(side) = team;
        self.persist();
        Ok(count)
    }

    /// Save a side's team to the database.
    pub fn save_team(&mut self, side: Side) -> Result<(), SessionError> {
        self.teams.save(self.metadata.team(side))?;
        self.teams
            .save_to(&mut self.store, &self.config.team_storage_key);
        Ok(())
    }

    /// Delete a side's team from the database and clear it from the match.
    pub fn delete_team(&mut self, side: Side) -> Result<Team, SessionError> {
        let removed = self.teams.remove(&self.metadata.team(side).name)?;
        self.teams
            .save_to(&mut self.store, &self.config.team_storage_key);

        *self.metadata.team_mut(side) = Team::default();
        self.persist();
        Ok(removed)
    }

    /// Delete several saved teams by name.
    pub fn delete_saved_teams<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> usize {
        let removed = self.teams.remove_many(names);
        self.teams
            .save_to(&mut self.store, &self.config.team_storage_key);
        removed
    }

    // Lineup

    /// Put a rostered player into a lineup slot.
    ///
    /// Placing into the libero slot makes the player a libero, on the
    /// roster and in role memory. A player already elsewhere in the lineup
    /// is moved, not duplicated.
    pub fn place_player(&mut self, side: Side, player_id: &str, slot: Slot) -> Result<(), SessionError> {
        let player = self
            .metadata
            .team(side)
            .get(player_id)
            .cloned()
            .ok_or_else(|| RosterError::PlayerNotFound(player_id.to_string()))?;

        debug!(side = %side, number = %player.number, slot = %slot, "Placed player");
        self.state.lineup_mut(side).place(slot, player);
        if slot == Slot::Libero {
            self.assign_libero(side);
        }
        self.lineup_edited();
        self.persist();
        Ok(())
    }

    /// Swap the occupants of two slots.
    ///
    /// Whoever ends up in the libero slot becomes a libero, as with
    /// [`place_player`](Self::place_player).
    pub fn move_player(&mut self, side: Side, from: Slot, to: Slot) {
        self.state.lineup_mut(side).swap(from, to);
        if from == Slot::Libero || to == Slot::Libero {
            self.assign_libero(side);
        }
        self.lineup_edited();
        self.persist();
    }

    pub fn clear_slot(&mut self, side: Side, slot: Slot) -> Option<Player> {
        let player = self.state.lineup_mut(side).clear(slot);
        self.lineup_edited();
        self.persist();
        player
    }

    /// Give the libero slot's occupant role L on the lineup, the roster
    /// and in role memory.
    fn assign_libero(&mut self, side: Side) {
        let Some(libero) = self.state.lineup(side).libero() else {
            return;
        };
        let (id, number) = (libero.id.clone(), libero.number.clone());

        self.state
            .lineup_mut(side)
            .set_role_at(Slot::Libero, &id, Role::Libero);
        let team = self.metadata.team_mut(side);
        team.set_role(&number, Role::Libero);
        let team_name = team.name.clone();
        self.roles().set_role(&team_name, &number, Role::Libero);
    }

    /// Lineup, roster or role data changed outside a commit.
    ///
    /// Saved states hold stale lineups from here on, so undo is no longer
    /// offered for earlier commits.
    fn lineup_edited(&mut self) {
        if !self.history.is_empty() {
            debug!(dropped = self.history.len(), "Undo history cleared by lineup edit");
            self.history.clear();
        }
    }

    /// Change the role of the player in `slot`.
    ///
    /// Lineup copy, roster copy and role memory are all updated.
    pub fn change_role(
        &mut self,
        side: Side,
        slot: Slot,
        player_id: &str,
        role: Role,
    ) -> Result<(), SessionError> {
        let number = self
            .state
            .lineup(side)
            .get(slot)
            .filter(|p| p.id == player_id)
            .or_else(|| self.metadata.team(side).get(player_id))
            .map(|p| p.number.clone())
            .ok_or_else(|| RosterError::PlayerNotFound(player_id.to_string()))?;

        self.state.lineup_mut(side).set_role_at(slot, player_id, role);
        let team = self.metadata.team_mut(side);
        team.set_role(&number, role);
        let team_name = team.name.clone();
        PersistedRoles::new(&mut self.store, self.config.role_storage_key.as_str())
            .set_role(&team_name, &number, role);

        self.lineup_edited();
        self.persist();
        Ok(())
    }

    /// Operator-forced rotation of one side.
    pub fn rotate(&mut self, side: Side) {
        info!(side = %side, "Manual rotation");
        self.state = self.state.rotate_side(side);
        self.lineup_edited();
        self.persist();
    }

    // Workflow

    /// Move to another phase. Confirming rosters needs enough players.
    pub fn advance(&mut self, event: PhaseEvent) -> Result<SessionPhase, SessionError> {
        if event == PhaseEvent::ConfirmRosters {
            for side in Side::ALL {
                let found = self.metadata.team(side).len();
                if found < self.config.min_roster_size {
                    return Err(SessionError::RosterTooSmall {
                        side,
                        required: self.config.min_roster_size,
                        found,
                    });
                }
            }
        }

        self.phase = self.phase.apply(event)?;
        debug!(phase = %self.phase, "Phase changed");
        Ok(self.phase)
    }

    // Recording

    /// Commit the pending event and apply its result to the match.
    pub fn commit(&mut self, result: RallyResult, playback_time: f64) -> Result<TagEvent, SessionError> {
        let context = RecordingContext::new(playback_time, self.state.set);
        let event = self.recorder.commit(result, &context)?;

        let next = self.state.apply_result(&event);
        self.history.push_back(std::mem::replace(&mut self.state, next));
        if self.history.len() > self.config.undo_depth {
            self.history.pop_front();
        }
        self.persist();
        Ok(event)
    }

    /// Abandon the pending event.
    pub fn discard_pending(&mut self) {
        self.recorder.discard();
    }

    /// Take back the last event committed in this session.
    ///
    /// Restores the match state from just before that commit. Only the
    /// newest `undo_depth` commits since the last lineup, roster or role
    /// edit can be undone; events loaded from a saved match never can.
    pub fn undo_last(&mut self) -> Option<TagEvent> {
        if self.history.is_empty() {
            return None;
        }
        let event = self.recorder.retract_last()?;
        self.state = self.history.pop_back()?;
        info!(team = %event.team, result = ?event.result, "Undid event");
        self.persist();
        Some(event)
    }

    pub fn can_undo(&self) -> bool {
        !self.history.is_empty()
    }

    /// Start the next set at 0-0.
    pub fn next_set(&mut self) {
        self.state = self.state.next_set();
        info!(set = self.state.set, "Next set");
        self.persist();
    }

    pub fn stats(&self, set: Option<u8>) -> MatchStats {
        MatchStats::from_log(self.recorder.log(), set)
    }

    /// Drop the current match. Role memory and saved teams are kept.
    pub fn reset(&mut self) {
        self.store.remove(&self.config.match_storage_key);
        self.phase = SessionPhase::Setup;
        self.metadata = MatchMetadata::default();
        self.recorder.reset();
        self.state = MatchState::new(self.config.initial_server, self.config.first_set);
        self.history.clear();
        info!("Match reset");
    }

    // Persistence

    pub fn snapshot(&self) -> MatchSnapshot {
        MatchSnapshot::new(self.metadata.clone(), &self.state, self.recorder.log().clone())
    }

    fn persist(&mut self) {
        let snapshot = self.snapshot();
        snapshot.save(&mut self.store, &self.config.match_storage_key);
    }
}
