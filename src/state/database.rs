//! Saved team database.
//!
//! Teams are looked up by their trimmed, case-folded name, so "Neihu HS" and
//! " neihu hs" are the same entry.

use super::presets::find_preset;
use super::roster::{identity_key, Team};
use super::store::KeyValueStore;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::{info, warn};

/// Team database errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TeamDbError {
    /// Team name is blank
    MissingName,
    /// Refusing to save a team with no players
    EmptyRoster,
    /// No saved team with this name
    NotFound(String),
}

impl fmt::Display for TeamDbError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "Team name is required"),
            Self::EmptyRoster => write!(f, "Team roster is empty"),
            Self::NotFound(name) => write!(f, "Team {} is not in the database", name),
        }
    }
}

impl std::error::Error for TeamDbError {}

/// User-saved teams.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TeamDatabase {
    teams: Vec<Team>,
}

impl TeamDatabase {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn teams(&self) -> &[Team] {
        &self.teams
    }

    pub fn len(&self) -> usize {
        self.teams.len()
    }

    pub fn is_empty(&self) -> bool {
        self.teams.is_empty()
    }

    pub fn find(&self, name: &str) -> Option<&Team> {
        let key = identity_key(name);
        self.teams.iter().find(|t| t.identity_key() == key)
    }

    /// A saved team by name, falling back to the preset catalog.
    pub fn find_or_preset(&self, name: &str) -> Option<Team> {
        self.find(name).cloned().or_else(|| find_preset(name))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.find(name).is_some()
    }

    /// Save a team, replacing any entry with the same name.
    pub fn save(&mut self, team: &Team) -> Result<(), TeamDbError> {
        let name = team.name.trim();
        if name.is_empty() {
            return Err(TeamDbError::MissingName);
        }
        if team.is_empty() {
            return Err(TeamDbError::EmptyRoster);
        }

        let key = identity_key(name);
        self.teams.retain(|t| t.identity_key() != key);

        let mut saved = team.clone();
        saved.name = name.to_string();
        self.teams.push(saved);

        info!(team = name, players = team.len(), "Saved team");
        Ok(())
    }

    /// Delete a team by name.
    pub fn remove(&mut self, name: &str) -> Result<Team, TeamDbError> {
        let key = identity_key(name);
        let index = self
            .teams
            .iter()
            .position(|t| t.identity_key() == key)
            .ok_or_else(|| TeamDbError::NotFound(name.trim().to_string()))?;
        Ok(self.teams.remove(index))
    }

    /// Delete several teams, returning how many were removed.
    pub fn remove_many<'a>(&mut self, names: impl IntoIterator<Item = &'a str>) -> usize {
        let keys: Vec<String> = names.into_iter().map(identity_key).collect();
        let before = self.teams.len();
        self.teams.retain(|t| !keys.contains(&t.identity_key()));
        before - self.teams.len()
    }

    /// Read the database stored under `key`; an unreadable one is empty.
    pub fn load(store: &impl KeyValueStore, key: &str) -> Self {
        let Some(raw) = store.get(key) else {
            return Self::default();
        };
        serde_json::from_str(&raw).unwrap_or_else(|e| {
            warn!(key, error = %e, "Corrupt team database, starting empty");
            Self::default()
        })
    }

    pub fn save_to(&self, store: &mut impl KeyValueStore, key: &str) {
        match serde_json::to_string(self) {
            Ok(raw) => store.set(key, raw),
            Err(e) => warn!(key, error = %e, "Failed to save team database"),
        }
    }
}
