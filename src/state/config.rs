//! Tagger configuration.

use super::side::Side;
use super::store::{MATCH_STORAGE_KEY, ROLE_STORAGE_KEY, TEAM_STORAGE_KEY};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Players each side needs before rosters can be confirmed.
pub const DEFAULT_MIN_ROSTER_SIZE: usize = 7;

/// Committed events that can be taken back.
pub const DEFAULT_UNDO_DEPTH: usize = 100;

/// Session settings. Every field has a default, so `{}` is a valid config.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TaggerConfig {
    /// Storage key of the match snapshot
    pub match_storage_key: String,

    /// Storage key of the role memory
    pub role_storage_key: String,

    /// Storage key of the saved team database
    pub team_storage_key: String,

    pub min_roster_size: usize,

    /// Side serving first in a fresh match
    pub initial_server: Side,

    pub first_set: u8,

    /// Most recent commits kept for undo
    pub undo_depth: usize,
}

impl Default for TaggerConfig {
    fn default() -> Self {
        Self {
            match_storage_key: MATCH_STORAGE_KEY.to_string(),
            role_storage_key: ROLE_STORAGE_KEY.to_string(),
            team_storage_key: TEAM_STORAGE_KEY.to_string(),
            min_roster_size: DEFAULT_MIN_ROSTER_SIZE,
            initial_server: Side::Home,
            first_set: 1,
            undo_depth: DEFAULT_UNDO_DEPTH,
        }
    }
}

impl TaggerConfig {
    pub fn from_json(raw: &str) -> Result<Self, ConfigError> {
        serde_json::from_str(raw).map_err(|e| ConfigError::Parse(e.to_string()))
    }
}

/// Configuration errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Parse(msg) => write!(f, "Invalid configuration: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}
