//! Lineups and rotation.
//!
//! A lineup is six rotational zones plus a libero slot. The libero slot is
//! not a playing position; it holds whoever is waiting to be swapped back in.
//!
//! # Rotation
//!
//! ```text
//!   front   4 ◀── 5       each occupant moves one zone clockwise:
//!           3     6       zone(n) takes the player from zone(n+1),
//!           2 ──▶ 1       zone 6 takes the player from zone 1
//!   back
//! ```
//!
//! After the shift two libero rules are checked, in order, against the
//! shifted lineup:
//!
//! 1. a middle blocker arriving in zone 1 swaps with the libero slot;
//! 2. a libero arriving in zone 4 swaps with the libero slot.

use super::roster::{Player, Role};
use super::zone::Zone;
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

/// One of the seven lineup positions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Slot {
    Zone(Zone),
    Libero,
}

impl Slot {
    pub const ALL: [Slot; 7] = [
        Slot::Zone(Zone::One),
        Slot::Zone(Zone::Two),
        Slot::Zone(Zone::Three),
        Slot::Zone(Zone::Four),
        Slot::Zone(Zone::Five),
        Slot::Zone(Zone::Six),
        Slot::Libero,
    ];
}

impl From<Zone> for Slot {
    fn from(zone: Zone) -> Self {
        Slot::Zone(zone)
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Zone(zone) => write!(f, "{}", zone),
            Self::Libero => write!(f, "L"),
        }
    }
}

/// One side's on-court assignment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "LineupRecord", into = "LineupRecord")]
pub struct Lineup {
    zones: [Option<Player>; 6],
    libero: Option<Player>,
}

impl Lineup {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, slot: Slot) -> Option<&Player> {
        match slot {
            Slot::Zone(zone) => self.zones[zone.index()].as_ref(),
            Slot::Libero => self.libero.as_ref(),
        }
    }

    pub fn zone(&self, zone: Zone) -> Option<&Player> {
        self.get(Slot::Zone(zone))
    }

    pub fn libero(&self) -> Option<&Player> {
        self.libero.as_ref()
    }

    fn slot_mut(&mut self, slot: Slot) -> &mut Option<Player> {
        match slot {
            Slot::Zone(zone) => &mut self.zones[zone.index()],
            Slot::Libero => &mut self.libero,
        }
    }

    /// Where a player currently sits, if anywhere.
    pub fn slot_of(&self, player_id: &str) -> Option<Slot> {
        Slot::ALL
            .into_iter()
            .find(|slot| self.get(*slot).is_some_and(|p| p.id == player_id))
    }

    /// Put a player into a slot.
    ///
    /// The player is first vacated from any other slot they hold, so nobody
    /// ever appears twice. Returns whoever was displaced from `slot`.
    pub fn place(&mut self, slot: Slot, player: Player) -> Option<Player> {
        if let Some(previous) = self.slot_of(&player.id) {
            *self.slot_mut(previous) = None;
        }
        self.slot_mut(slot).replace(player)
    }

    /// Empty a slot.
    pub fn clear(&mut self, slot: Slot) -> Option<Player> {
        self.slot_mut(slot).take()
    }

    /// Vacate whichever slot holds this player.
    pub fn remove_player(&mut self, player_id: &str) -> Option<Player> {
        let slot = self.slot_of(player_id)?;
        self.clear(slot)
    }

    /// Exchange the occupants of two slots.
    pub fn swap(&mut self, a: Slot, b: Slot) {
        if a == b {
            return;
        }
        let first = self.slot_mut(a).take();
        let second = std::mem::replace(self.slot_mut(b), first);
        *self.slot_mut(a) = second;
    }

    /// Set the role of the player in `slot`, if it is `player_id`.
    pub fn set_role_at(&mut self, slot: Slot, player_id: &str, role: Role) -> bool {
        match self.slot_mut(slot) {
            Some(player) if player.id == player_id => {
                player.role = role;
                true
            }
            _ => false,
        }
    }

    /// Occupants of all seven slots, zones first.
    pub fn players(&self) -> impl Iterator<Item = &Player> {
        self.zones.iter().chain(std::iter::once(&self.libero)).flatten()
    }

    pub fn headcount(&self) -> usize {
        self.players().count()
    }

    pub fn is_empty(&self) -> bool {
        self.headcount() == 0
    }

    fn role_at(&self, zone: Zone) -> Option<Role> {
        self.zone(zone).map(|p| p.role)
    }
}

/// Advance a lineup by one rotation and apply the libero rules.
pub fn rotate(lineup: &Lineup) -> Lineup {
    let mut next = Lineup {
        zones: std::array::from_fn(|i| lineup.zones[(i + 1) % 6].clone()),
        libero: lineup.libero.clone(),
    };

    if next.role_at(Zone::One) == Some(Role::MiddleBlocker) && next.libero.is_some() {
        debug!("Libero replaces middle blocker in zone 1");
        next.swap(Slot::Zone(Zone::One), Slot::Libero);
    }

    if next.role_at(Zone::Four) == Some(Role::Libero) && next.libero.is_some() {
        debug!("Libero leaves the court from zone 4");
        next.swap(Slot::Zone(Zone::Four), Slot::Libero);
    }

    next
}

/// Persisted shape: `{"1": .., "2": .., .., "6": .., "L": ..}`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LineupRecord {
    #[serde(rename = "1", default)]
    one: Option<Player>,
    #[serde(rename = "2", default)]
    two: Option<Player>,
    #[serde(rename = "3", default)]
    three: Option<Player>,
    #[serde(rename = "4", default)]
    four: Option<Player>,
    #[serde(rename = "5", default)]
    five: Option<Player>,
    #[serde(rename = "6", default)]
    six: Option<Player>,
    #[serde(rename = "L", default)]
    libero: Option<Player>,
}

impl From<LineupRecord> for Lineup {
    fn from(r: LineupRecord) -> Self {
        Self {
            zones: [r.one, r.two, r.three, r.four, r.five, r.six],
            libero: r.libero,
        }
    }
}

impl From<Lineup> for LineupRecord {
    fn from(lineup: Lineup) -> Self {
        let [one, two, three, four, five, six] = lineup.zones;
        Self {
            one,
            two,
            three,
            four,
            five,
            six,
            libero: lineup.libero,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    fn player(number: &str, role: Role) -> Player {
        Player::new(number, format!("Player {}", number), role)
    }

    /// Zone n holds jersey n, all outside hitters.
    fn plain_lineup() -> Lineup {
        let mut lineup = Lineup::new();
        for zone in Zone::ALL {
            lineup.place(zone.into(), player(&zone.to_string(), Role::OutsideHitter));
        }
        lineup
    }

    fn numbers(lineup: &Lineup) -> Vec<Option<String>> {
        Slot::ALL
            .into_iter()
            .map(|s| lineup.get(s).map(|p| p.number.clone()))
            .collect()
    }

    fn sorted_ids(lineup: &Lineup) -> Vec<String> {
        let mut ids: Vec<String> = lineup.players().map(|p| p.id.clone()).collect();
        ids.sort();
        ids
    }

    #[test]
    fn test_base_shift() {
        let rotated = rotate(&plain_lineup());
        let expected: Vec<Option<String>> = ["2", "3", "4", "5", "6", "1"]
            .into_iter()
            .map(|n| Some(n.to_string()))
            .chain(std::iter::once(None))
            .collect();
        assert_eq!(numbers(&rotated), expected);
    }

    #[test]
    fn test_six_rotations_is_identity() {
        let original = plain_lineup();
        let mut lineup = original.clone();
        for _ in 0..6 {
            lineup = rotate(&lineup);
        }
        assert_eq!(lineup, original);
    }

    #[test]
    fn test_libero_replaces_middle_blocker() {
        let mut lineup = plain_lineup();
        let mb = player("12", Role::MiddleBlocker);
        let libero = player("1L", Role::Libero);
        lineup.place(Slot::Zone(Zone::Two), mb.clone());
        lineup.place(Slot::Libero, libero.clone());
        let before = sorted_ids(&lineup);

        let rotated = rotate(&lineup);

        assert_eq!(rotated.libero(), Some(&mb));
        assert_eq!(rotated.zone(Zone::One), Some(&libero));
        assert_eq!(sorted_ids(&rotated), before);
        assert_eq!(rotated.headcount(), 7);
    }

    #[test]
    fn test_middle_blocker_stays_without_libero() {
        let mut lineup = plain_lineup();
        let mb = player("12", Role::MiddleBlocker);
        lineup.place(Slot::Zone(Zone::Two), mb.clone());

        let rotated = rotate(&lineup);
        assert_eq!(rotated.zone(Zone::One), Some(&mb));
        assert!(rotated.libero().is_none());
    }

    #[test]
    fn test_libero_cycle_returns_middle_blocker() {
        // MB arrives in zone 1, libero goes in; three rotations later the
        // libero reaches zone 4 and the MB comes back.
        let mut lineup = plain_lineup();
        let mb = player("12", Role::MiddleBlocker);
        let libero = player("99", Role::Libero);
        lineup.place(Slot::Zone(Zone::Two), mb.clone());
        lineup.place(Slot::Libero, libero.clone());

        let mut state = rotate(&lineup);
        assert_eq!(state.zone(Zone::One), Some(&libero));

        state = rotate(&state);
        assert_eq!(state.zone(Zone::Six), Some(&libero));
        state = rotate(&state);
        assert_eq!(state.zone(Zone::Five), Some(&libero));
        state = rotate(&state);

        assert_eq!(state.zone(Zone::Four), Some(&mb));
        assert_eq!(state.libero(), Some(&libero));
        assert_eq!(sorted_ids(&state), sorted_ids(&lineup));
    }

    #[test]
    fn test_both_rules_fire_in_one_rotation() {
        let mut lineup = Lineup::new();
        let mb = player("12", Role::MiddleBlocker);
        let court_libero = player("5", Role::Libero);
        let bench_libero = player("7", Role::Libero);
        lineup.place(Slot::Zone(Zone::Two), mb.clone());
        lineup.place(Slot::Zone(Zone::Five), court_libero.clone());
        lineup.place(Slot::Libero, bench_libero.clone());

        let rotated = rotate(&lineup);

        // MB check: bench libero to zone 1, MB to the libero slot. L check:
        // the court libero in zone 4 then swaps with the MB.
        assert_eq!(rotated.zone(Zone::One), Some(&bench_libero));
        assert_eq!(rotated.zone(Zone::Four), Some(&mb));
        assert_eq!(rotated.libero(), Some(&court_libero));
    }

    #[test]
    fn test_place_vacates_previous_slot() {
        let mut lineup = Lineup::new();
        let p = player("3", Role::Setter);
        lineup.place(Slot::Zone(Zone::One), p.clone());
        lineup.place(Slot::Zone(Zone::Four), p.clone());

        assert!(lineup.zone(Zone::One).is_none());
        assert_eq!(lineup.slot_of(&p.id), Some(Slot::Zone(Zone::Four)));
        assert_eq!(lineup.headcount(), 1);
    }

    #[test]
    fn test_place_returns_displaced() {
        let mut lineup = Lineup::new();
        let a = player("3", Role::Setter);
        let b = player("4", Role::Opposite);
        lineup.place(Slot::Libero, a.clone());
        let displaced = lineup.place(Slot::Libero, b.clone());
        assert_eq!(displaced, Some(a));
        assert_eq!(lineup.libero(), Some(&b));
    }

    #[test]
    fn test_swap_and_remove() {
        let mut lineup = plain_lineup();
        lineup.swap(Slot::Zone(Zone::One), Slot::Zone(Zone::Three));
        assert_eq!(lineup.zone(Zone::One).unwrap().number, "3");
        assert_eq!(lineup.zone(Zone::Three).unwrap().number, "1");

        lineup.swap(Slot::Zone(Zone::Two), Slot::Libero);
        assert!(lineup.zone(Zone::Two).is_none());
        assert_eq!(lineup.libero().unwrap().number, "2");

        let id = lineup.libero().unwrap().id.clone();
        assert!(lineup.remove_player(&id).is_some());
        assert_eq!(lineup.headcount(), 5);
        assert!(lineup.remove_player(&id).is_none());
    }

    #[test]
    fn test_set_role_at_checks_identity() {
        let mut lineup = plain_lineup();
        let id = lineup.zone(Zone::Two).unwrap().id.clone();
        assert!(!lineup.set_role_at(Slot::Zone(Zone::Three), &id, Role::Setter));
        assert!(lineup.set_role_at(Slot::Zone(Zone::Two), &id, Role::Setter));
        assert_eq!(lineup.zone(Zone::Two).unwrap().role, Role::Setter);
    }

    #[test]
    fn test_serialized_shape() {
        let mut lineup = Lineup::new();
        lineup.place(Slot::Zone(Zone::Three), player("8", Role::MiddleBlocker));

        let json = serde_json::to_value(&lineup).unwrap();
        assert_eq!(json["3"]["number"], "8");
        assert_eq!(json["3"]["role"], "MB");
        assert!(json["1"].is_null());
        assert!(json["L"].is_null());

        let back: Lineup = serde_json::from_value(json).unwrap();
        assert_eq!(back, lineup);

        let sparse: Lineup = serde_json::from_str(r#"{"L": null}"#).unwrap();
        assert!(sparse.is_empty());
    }

    proptest! {
        #[test]
        fn prop_rotate_preserves_players(
            roles in proptest::collection::vec(0usize..7, 7),
            occupied in proptest::collection::vec(any::<bool>(), 7),
        ) {
            let mut lineup = Lineup::new();
            for (i, slot) in Slot::ALL.into_iter().enumerate() {
                if occupied[i] {
                    lineup.place(slot, player(&i.to_string(), Role::ALL[roles[i]]));
                }
            }

            let rotated = rotate(&lineup);
            prop_assert_eq!(sorted_ids(&rotated), sorted_ids(&lineup));
        }
    }
}
