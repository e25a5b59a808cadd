//! Storage capabilities.
//!
//! The engine never picks a storage medium. Callers hand it something that
//! implements [`KeyValueStore`]; role memory is layered on top of that as a
//! [`RoleStore`].

use super::roster::Role;
use std::collections::{BTreeMap, HashMap};
use tracing::warn;

/// Default key of the persisted match snapshot.
pub const MATCH_STORAGE_KEY: &str = "volleyTagData_Base2";

/// Default key of the role memory map.
pub const ROLE_STORAGE_KEY: &str = "volleyTag_PlayerRoles";

/// Default key of the saved team database.
pub const TEAM_STORAGE_KEY: &str = "volleyTag_UserTeams";

/// String key-value storage, e.g. browser local storage or a file.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&mut self, key: &str, value: String);
    fn remove(&mut self, key: &str);
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for &mut S {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&mut self, key: &str, value: String) {
        (**self).set(key, value)
    }

    fn remove(&mut self, key: &str) {
        (**self).remove(key)
    }
}

/// In-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn set(&mut self, key: &str, value: String) {
        self.entries.insert(key.to_string(), value);
    }

    fn remove(&mut self, key: &str) {
        self.entries.remove(key);
    }
}

/// Durable role memory keyed by team name and jersey number.
///
/// A miss is not an error: it yields [`Role::Unassigned`].
pub trait RoleStore {
    fn role(&self, team: &str, number: &str) -> Role;
    fn set_role(&mut self, team: &str, number: &str, role: Role);
}

/// Storage key of one player's role: `"<team>-<number>"`.
pub fn role_key(team: &str, number: &str) -> String {
    format!("{}-{}", team, number)
}

/// Role memory held in a plain map.
#[derive(Debug, Clone, Default)]
pub struct MemoryRoleStore {
    roles: HashMap<String, Role>,
}

impl MemoryRoleStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl RoleStore for MemoryRoleStore {
    fn role(&self, team: &str, number: &str) -> Role {
        self.roles
            .get(&role_key(team, number))
            .copied()
            .unwrap_or_default()
    }

    fn set_role(&mut self, team: &str, number: &str, role: Role) {
        self.roles.insert(role_key(team, number), role);
    }
}

/// Role memory serialized as one JSON object under a single storage key.
///
/// Every read goes to the backing store, so a role written through one
/// handle is visible through any other handle on the same store.
#[derive(Debug)]
pub struct PersistedRoles<S> {
    store: S,
    key: String,
}

impl<S: KeyValueStore> PersistedRoles<S> {
    pub fn new(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    pub fn into_inner(self) -> S {
        self.store
    }

    /// Read the whole map. Unknown role codes are dropped.
    fn load(&self) -> BTreeMap<String, String> {
        let Some(raw) = self.store.get(&self.key) else {
            return BTreeMap::new();
        };
        match serde_json::from_str(&raw) {
            Ok(map) => map,
            Err(e) => {
                warn!(key = %self.key, error = %e, "Corrupt role memory, starting empty");
                BTreeMap::new()
            }
        }
    }
}

impl<S: KeyValueStore> RoleStore for PersistedRoles<S> {
    fn role(&self, team: &str, number: &str) -> Role {
        self.load()
            .get(&role_key(team, number))
            .and_then(|code| Role::from_code(code))
            .unwrap_or_default()
    }

    fn set_role(&mut self, team: &str, number: &str, role: Role) {
        let mut map = self.load();
        map.insert(role_key(team, number), role.code().to_string());
        match serde_json::to_string(&map) {
            Ok(raw) => self.store.set(&self.key, raw),
            Err(e) => warn!(key = %self.key, error = %e, "Failed to save role"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memory_store() {
        let mut store = MemoryStore::new();
        assert!(store.get("a").is_none());
        store.set("a", "1".to_string());
        assert_eq!(store.get("a").as_deref(), Some("1"));
        store.remove("a");
        assert!(store.is_empty());
    }

    #[test]
    fn test_role_miss_defaults() {
        let roles = MemoryRoleStore::new();
        assert_eq!(roles.role("Neihu", "7"), Role::Unassigned);
    }

    #[test]
    fn test_persisted_roles_shape() {
        let mut store = MemoryStore::new();
        {
            let mut roles = PersistedRoles::new(&mut store, ROLE_STORAGE_KEY);
            roles.set_role("Neihu", "7", Role::Libero);
            roles.set_role("Neihu", "8", Role::MiddleBlocker);
        }

        let raw = store.get(ROLE_STORAGE_KEY).unwrap();
        let map: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(map["Neihu-7"], "L");
        assert_eq!(map["Neihu-8"], "MB");
    }

    #[test]
    fn test_persisted_roles_survive_new_handle() {
        let mut store = MemoryStore::new();
        PersistedRoles::new(&mut store, ROLE_STORAGE_KEY).set_role("Jianguo", "4", Role::Setter);

        let roles = PersistedRoles::new(&mut store, ROLE_STORAGE_KEY);
        assert_eq!(roles.role("Jianguo", "4"), Role::Setter);
        assert_eq!(roles.role("jianguo", "4"), Role::Unassigned);
    }

    #[test]
    fn test_corrupt_roles_default() {
        let mut store = MemoryStore::new();
        store.set(ROLE_STORAGE_KEY, "{not json".to_string());

        let mut roles = PersistedRoles::new(&mut store, ROLE_STORAGE_KEY);
        assert_eq!(roles.role("Neihu", "7"), Role::Unassigned);

        roles.set_role("Neihu", "7", Role::Opposite);
        assert_eq!(roles.role("Neihu", "7"), Role::Opposite);
    }

    #[test]
    fn test_unknown_role_code_ignored() {
        let mut store = MemoryStore::new();
        store.set(ROLE_STORAGE_KEY, r#"{"Neihu-7":"XX","Neihu-8":"DS"}"#.to_string());

        let roles = PersistedRoles::new(store, ROLE_STORAGE_KEY);
        assert_eq!(roles.role("Neihu", "7"), Role::Unassigned);
        assert_eq!(roles.role("Neihu", "8"), Role::DefensiveSpecialist);
    }
}
