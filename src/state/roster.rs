//! Teams, players and role assignment.
//!
//! A team's roster is always kept sorted by the numeric value of the jersey
//! number, and no two players on a team share a number. Roles come from a
//! [`RoleStore`] so that a role assigned to "#7 of Team X" in one session is
//! still there the next time Team X is loaded.

use super::store::RoleStore;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use tracing::debug;

/// Player specialisation on court.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Role {
    /// Outside hitter
    #[serde(rename = "OH")]
    OutsideHitter,
    /// Middle blocker
    #[serde(rename = "MB")]
    MiddleBlocker,
    /// Opposite
    #[serde(rename = "OP")]
    Opposite,
    /// Setter
    #[serde(rename = "S")]
    Setter,
    /// Libero
    #[serde(rename = "L")]
    Libero,
    /// Defensive specialist
    #[serde(rename = "DS")]
    DefensiveSpecialist,
    /// Not assigned yet
    #[default]
    #[serde(rename = "?")]
    Unassigned,
}

impl Role {
    pub const ALL: [Role; 7] = [
        Role::OutsideHitter,
        Role::MiddleBlocker,
        Role::Opposite,
        Role::Setter,
        Role::Libero,
        Role::DefensiveSpecialist,
        Role::Unassigned,
    ];

    /// Short code used in storage and on screen.
    pub fn code(&self) -> &'static str {
        match self {
            Self::OutsideHitter => "OH",
            Self::MiddleBlocker => "MB",
            Self::Opposite => "OP",
            Self::Setter => "S",
            Self::Libero => "L",
            Self::DefensiveSpecialist => "DS",
            Self::Unassigned => "?",
        }
    }

    pub fn from_code(code: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|r| r.code() == code)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::OutsideHitter => "Outside hitter",
            Self::MiddleBlocker => "Middle blocker",
            Self::Opposite => "Opposite",
            Self::Setter => "Setter",
            Self::Libero => "Libero",
            Self::DefensiveSpecialist => "Defensive specialist",
            Self::Unassigned => "Unassigned",
        }
    }

    pub fn is_assigned(&self) -> bool {
        !matches!(self, Self::Unassigned)
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// A rostered player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Player {
    /// Opaque identity, stable for the life of the roster entry
    pub id: String,

    /// Jersey number, unique within a team
    pub number: String,

    /// Display name
    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub role: Role,
}

impl Player {
    /// Create a player with a fresh id.
    pub fn new(number: impl Into<String>, name: impl Into<String>, role: Role) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            number: number.into(),
            name: name.into(),
            role,
        }
    }

    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }

    /// Numeric value of the jersey number, if it has one.
    pub fn number_value(&self) -> Option<u32> {
        self.number.parse().ok()
    }
}

/// Roster ordering: numeric jersey value first, non-numeric numbers last.
fn by_number(a: &Player, b: &Player) -> Ordering {
    match (a.number_value(), b.number_value()) {
        (Some(x), Some(y)) => x.cmp(&y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.number.cmp(&b.number),
    }
}

/// Outcome of a bulk roster import.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportSummary {
    pub added: usize,
    pub skipped: usize,
}

/// Roster errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterError {
    /// Another player already wears this number
    DuplicateNumber(String),
    /// Jersey number was blank
    MissingNumber,
    /// No player with this id
    PlayerNotFound(String),
}

impl fmt::Display for RosterError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateNumber(n) => write!(f, "Number {} is already on the roster", n),
            Self::MissingNumber => write!(f, "Jersey number is required"),
            Self::PlayerNotFound(id) => write!(f, "Player {} not found", id),
        }
    }
}

impl std::error::Error for RosterError {}

/// A named team and its roster.
///
/// Stored teams are read back through [`Team::with_players`], so a saved
/// roster is re-sorted and loses any repeated numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "TeamRecord")]
pub struct Team {
    pub name: String,
    roster: Vec<Player>,
}

#[derive(Deserialize)]
struct TeamRecord {
    #[serde(default)]
    name: String,

    #[serde(default)]
    roster: Vec<RosterEntry>,
}

/// A stored roster entry: a full player, or a bare `"<number> <name>"` line.
#[derive(Deserialize)]
#[serde(untagged)]
enum RosterEntry {
    Line(String),
    Player(Player),
}

impl From<TeamRecord> for Team {
    fn from(record: TeamRecord) -> Self {
        let players = record.roster.into_iter().filter_map(|entry| match entry {
            RosterEntry::Player(player) => Some(player),
            RosterEntry::Line(line) => parse_roster_line(&line)
                .map(|(number, name)| Player::new(number, name, Role::Unassigned)),
        });
        Team::with_players(record.name, players)
    }
}

impl Team {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            roster: Vec::new(),
        }
    }

    /// Build a team from existing players, dropping later duplicates.
    pub fn with_players(name: impl Into<String>, players: impl IntoIterator<Item = Player>) -> Self {
        let mut team = Self::new(name);
        for player in players {
            let _ = team.add_player(player);
        }
        team
    }

    /// Identity used for persistence lookups: trimmed and case-folded.
    pub fn identity_key(&self) -> String {
        identity_key(&self.name)
    }

    pub fn roster(&self) -> &[Player] {
        &self.roster
    }

    pub fn len(&self) -> usize {
        self.roster.len()
    }

    pub fn is_empty(&self) -> bool {
        self.roster.is_empty()
    }

    pub fn get(&self, player_id: &str) -> Option<&Player> {
        self.roster.iter().find(|p| p.id == player_id)
    }

    pub fn get_by_number(&self, number: &str) -> Option<&Player> {
        self.roster.iter().find(|p| p.number == number)
    }

    pub fn has_number(&self, number: &str) -> bool {
        self.get_by_number(number).is_some()
    }

    /// Insert a player, refusing a number already on the roster.
    pub fn add_player(&mut self, mut player: Player) -> Result<(), RosterError> {
        player.number = player.number.trim().to_string();
        player.name = player.name.trim().to_string();

        if player.number.is_empty() {
            return Err(RosterError::MissingNumber);
        }
        if self.has_number(&player.number) {
            return Err(RosterError::DuplicateNumber(player.number));
        }

        self.roster.push(player);
        self.sort();
        Ok(())
    }

    /// Enroll a new player, taking their role from the role store.
    pub fn enroll(
        &mut self,
        number: &str,
        name: &str,
        roles: &impl RoleStore,
    ) -> Result<&Player, RosterError> {
        let number = number.trim();
        let role = roles.role(&self.name, number);
        let player = Player::new(number, name, role);
        let id = player.id.clone();
        self.add_player(player)?;
        debug!(team = %self.name, number, role = %role, "Enrolled player");
        self.get(&id).ok_or(RosterError::PlayerNotFound(id))
    }

    /// Change a player's number and name.
    pub fn edit_player(
        &mut self,
        player_id: &str,
        number: &str,
        name: &str,
    ) -> Result<(), RosterError> {
        let number = number.trim();
        if number.is_empty() {
            return Err(RosterError::MissingNumber);
        }
        if self
            .roster
            .iter()
            .any(|p| p.number == number && p.id != player_id)
        {
            return Err(RosterError::DuplicateNumber(number.to_string()));
        }

        let player = self
            .roster
            .iter_mut()
            .find(|p| p.id == player_id)
            .ok_or_else(|| RosterError::PlayerNotFound(player_id.to_string()))?;
        player.number = number.to_string();
        player.name = name.trim().to_string();

        self.sort();
        Ok(())
    }

    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let index = self.roster.iter().position(|p| p.id == player_id)?;
        Some(self.roster.remove(index))
    }

    /// Set the role of the player wearing `number`. Returns false on a miss.
    pub fn set_role(&mut self, number: &str, role: Role) -> bool {
        match self.roster.iter_mut().find(|p| p.number == number) {
            Some(player) => {
                player.role = role;
                true
            }
            None => false,
        }
    }

    /// Import pasted roster text, one `<number> <name>` per line.
    ///
    /// Lines that do not start with a digit are skipped, as are numbers
    /// already on the roster.
    pub fn import_lines(&mut self, text: &str, roles: &impl RoleStore) -> ImportSummary {
        let mut summary = ImportSummary::default();

        for line in text.lines().filter(|l| !l.trim().is_empty()) {
            let Some((number, name)) = parse_roster_line(line) else {
                summary.skipped += 1;
                continue;
            };
            match self.enroll(number, name, roles) {
                Ok(_) => summary.added += 1,
                Err(_) => summary.skipped += 1,
            }
        }

        summary
    }

    /// Copy this team with fresh player ids and roles re-read from the store.
    pub fn reissue(&self, roles: &impl RoleStore) -> Team {
        let players = self.roster.iter().map(|p| {
            Player::new(p.number.clone(), p.name.clone(), roles.role(&self.name, &p.number))
        });
        Team::with_players(self.name.clone(), players)
    }

    fn sort(&mut self) {
        self.roster.sort_by(by_number);
    }
}

/// Trimmed, lowercase team name.
pub fn identity_key(name: &str) -> String {
    name.trim().to_lowercase()
}

/// Split a roster line into number and name.
///
/// Accepts a run of digits followed by any mix of `.`, `,`, `-` or whitespace
/// and then the name, e.g. `"12. Jane Doe"`, `"7-Kim"`, `"3"`.
pub fn parse_roster_line(line: &str) -> Option<(&str, &str)> {
    let line = line.trim();
    let digits_end = line
        .char_indices()
        .find(|(_, c)| !c.is_ascii_digit())
        .map(|(i, _)| i)
        .unwrap_or(line.len());
    if digits_end == 0 {
        return None;
    }

    let (number, rest) = line.split_at(digits_end);
    let name = rest
        .trim_start_matches(|c: char| c == '.' || c == ',' || c == '-' || c.is_whitespace())
        .trim();
    Some((number, name))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::store::MemoryRoleStore;
    use pretty_assertions::assert_eq;

    fn numbers(team: &Team) -> Vec<&str> {
        team.roster().iter().map(|p| p.number.as_str()).collect()
    }

    #[test]
    fn test_duplicate_number_rejected() {
        let mut team = Team::new("Neihu");
        team.add_player(Player::new("7", "Kim", Role::Setter)).unwrap();

        let result = team.add_player(Player::new("7", "Lee", Role::Libero));
        assert_eq!(result, Err(RosterError::DuplicateNumber("7".to_string())));
        assert_eq!(team.len(), 1);
        assert_eq!(team.get_by_number("7").unwrap().name, "Kim");
    }

    #[test]
    fn test_blank_number_rejected() {
        let mut team = Team::new("Neihu");
        let result = team.add_player(Player::new("  ", "Ghost", Role::Unassigned));
        assert_eq!(result, Err(RosterError::MissingNumber));
        assert!(team.is_empty());
    }

    #[test]
    fn test_sorted_numerically() {
        let mut team = Team::new("Neihu");
        for n in ["10", "2", "19", "7", "1"] {
            team.add_player(Player::new(n, "", Role::Unassigned)).unwrap();
        }
        assert_eq!(numbers(&team), vec!["1", "2", "7", "10", "19"]);
    }

    #[test]
    fn test_non_numeric_numbers_sort_last() {
        let mut team = Team::new("Neihu");
        for n in ["B", "3", "A", "12"] {
            team.add_player(Player::new(n, "", Role::Unassigned)).unwrap();
        }
        assert_eq!(numbers(&team), vec!["3", "12", "A", "B"]);
    }

    #[test]
    fn test_enroll_reads_role_store() {
        let mut roles = MemoryRoleStore::new();
        roles.set_role("Neihu", "5", Role::MiddleBlocker);

        let mut team = Team::new("Neihu");
        let role = team.enroll("5", "Kuo", &roles).unwrap().role;
        assert_eq!(role, Role::MiddleBlocker);

        let role = team.enroll("6", "Lin", &roles).unwrap().role;
        assert_eq!(role, Role::Unassigned);
    }

    #[test]
    fn test_edit_player_resorts_and_checks_conflicts() {
        let mut team = Team::new("Neihu");
        team.add_player(Player::new("2", "A", Role::Unassigned)).unwrap();
        team.add_player(Player::new("9", "B", Role::Unassigned)).unwrap();
        let id = team.get_by_number("2").unwrap().id.clone();

        assert_eq!(
            team.edit_player(&id, "9", "A"),
            Err(RosterError::DuplicateNumber("9".to_string()))
        );

        team.edit_player(&id, "14", " Alex ").unwrap();
        assert_eq!(numbers(&team), vec!["9", "14"]);
        assert_eq!(team.get(&id).unwrap().name, "Alex");

        // Keeping one's own number is not a conflict
        team.edit_player(&id, "14", "Alex").unwrap();

        assert_eq!(
            team.edit_player("missing", "1", ""),
            Err(RosterError::PlayerNotFound("missing".to_string()))
        );
    }

    #[test]
    fn test_parse_roster_line() {
        assert_eq!(parse_roster_line("12. Jane Doe"), Some(("12", "Jane Doe")));
        assert_eq!(parse_roster_line("  7-Kim "), Some(("7", "Kim")));
        assert_eq!(parse_roster_line("3"), Some(("3", "")));
        assert_eq!(parse_roster_line("4 , Wang"), Some(("4", "Wang")));
        assert_eq!(parse_roster_line("Coach Lin"), None);
    }

    #[test]
    fn test_import_lines() {
        let roles = MemoryRoleStore::new();
        let mut team = Team::new("Jianguo");
        team.add_player(Player::new("4", "Wang", Role::Unassigned)).unwrap();

        let summary = team.import_lines("2 Lee\n4 Wang again\n\nCoach\n11. Chen\n", &roles);
        assert_eq!(summary, ImportSummary { added: 2, skipped: 2 });
        assert_eq!(numbers(&team), vec!["2", "4", "11"]);
        assert_eq!(team.get_by_number("4").unwrap().name, "Wang");
    }

    #[test]
    fn test_reissue_refreshes_ids_and_roles() {
        let mut roles = MemoryRoleStore::new();
        let mut team = Team::new("Chenggong");
        team.enroll("1", "Yang", &roles).unwrap();
        roles.set_role("Chenggong", "1", Role::Libero);

        let copy = team.reissue(&roles);
        assert_eq!(copy.len(), 1);
        assert_ne!(copy.roster()[0].id, team.roster()[0].id);
        assert_eq!(copy.roster()[0].role, Role::Libero);
    }

    #[test]
    fn test_identity_key() {
        assert_eq!(identity_key("  Neihu HS "), "neihu hs");
        assert_eq!(Team::new("NEIHU").identity_key(), Team::new("neihu ").identity_key());
    }

    #[test]
    fn test_stored_team_is_resorted_and_deduplicated() {
        let raw = r#"{"name": "Neihu", "roster": [
            {"id": "a", "number": "12", "name": "Chen", "role": "OH"},
            {"id": "b", "number": "3", "name": "Lin", "role": "S"},
            {"id": "c", "number": "12", "name": "Wu", "role": "MB"}
        ]}"#;
        let team: Team = serde_json::from_str(raw).unwrap();

        assert_eq!(numbers(&team), vec!["3", "12"]);
        assert_eq!(team.get_by_number("12").unwrap().name, "Chen");
        assert_eq!(team.get_by_number("3").unwrap().role, Role::Setter);
    }

    #[test]
    fn test_stored_team_accepts_roster_lines() {
        let raw = r#"{"name": "Neihu", "roster": ["10 Tseng", "2 Chang", "Coach"]}"#;
        let team: Team = serde_json::from_str(raw).unwrap();

        assert_eq!(numbers(&team), vec!["2", "10"]);
        assert_eq!(team.get_by_number("10").unwrap().name, "Tseng");
        assert_eq!(team.get_by_number("2").unwrap().role, Role::Unassigned);
    }

    #[test]
    fn test_role_codes() {
        for role in Role::ALL {
            assert_eq!(Role::from_code(role.code()), Some(role));
        }
        assert_eq!(serde_json::to_string(&Role::Unassigned).unwrap(), "\"?\"");
        assert_eq!(serde_json::to_string(&Role::MiddleBlocker).unwrap(), "\"MB\"");
    }
}
