//! Light state cache
//!
//! Written by the drain loop (authoritative script output) and by the power /
//! brightness entry points (optimistic writes). Reads never wait on a script.

use parking_lot::RwLock;
use rflights_shared::{LightState, StatusUpdate};
use std::collections::HashMap;
use std::sync::Arc;

/// A single field written ahead of the script that will apply it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateField {
    On(bool),
    Brightness(u8),
}

/// Shared map of `"<light>-<part>"` -> cached state
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    states: Arc<RwLock<HashMap<String, LightState>>>,
}

impl StateStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Current cached state, `None` until a status query or set touched it
    pub fn get(&self, id: &str) -> Option<LightState> {
        self.states.read().get(id).copied()
    }

    /// Overwrite entries with values parsed from script output
    pub fn apply_authoritative(&self, update: StatusUpdate) {
        let mut states = self.states.write();
        for (id, state) in update {
            states.insert(id, state);
        }
    }

    /// Write one field immediately, creating the entry from defaults if needed
    ///
    /// Returns the resulting state.
    pub fn apply_optimistic(&self, id: &str, field: StateField) -> LightState {
        let mut states = self.states.write();
        let entry = states.entry(id.to_string()).or_default();
        match field {
            StateField::On(on) => entry.on = on,
            StateField::Brightness(brightness) => {
                *entry = LightState::new(entry.on, brightness);
            }
        }
        *entry
    }

    /// Get the number of cached entries
    pub fn len(&self) -> usize {
        self.states.read().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_absent_until_touched() {
        let store = StateStore::new();
        assert!(store.get("tao95-default").is_none());
        assert_eq!(store.len(), 0);
    }

    #[test]
    fn test_authoritative_overwrites() {
        let store = StateStore::new();
        store.apply_optimistic("tao95-main", StateField::On(false));

        store.apply_authoritative(vec![
            ("tao95-default".to_string(), LightState::new(true, 80)),
            ("tao95-main".to_string(), LightState::new(true, 60)),
        ]);

        assert_eq!(store.get("tao95-default"), Some(LightState::new(true, 80)));
        assert_eq!(store.get("tao95-main"), Some(LightState::new(true, 60)));
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_optimistic_creates_from_defaults() {
        let store = StateStore::new();

        let state = store.apply_optimistic("txone-default", StateField::On(true));
        assert_eq!(state, LightState::new(true, 100));

        let state = store.apply_optimistic("tao95-aux", StateField::Brightness(40));
        assert_eq!(state, LightState::new(false, 40));
    }

    #[test]
    fn test_power_off_keeps_brightness() {
        let store = StateStore::new();
        store.apply_authoritative(vec![("tao95-default".to_string(), LightState::new(true, 35))]);

        store.apply_optimistic("tao95-default", StateField::On(false));

        let state = store.get("tao95-default").expect("entry");
        assert!(!state.on);
        assert_eq!(state.brightness, 35);
    }

    #[test]
    fn test_optimistic_brightness_is_clamped() {
        let store = StateStore::new();
        let state = store.apply_optimistic("tao95-default", StateField::Brightness(180));
        assert_eq!(state.brightness, 100);
    }

    #[test]
    fn test_clones_share_entries() {
        let store = StateStore::new();
        let other = store.clone();
        other.apply_optimistic("tao95-default", StateField::On(true));
        assert_eq!(store.get("tao95-default"), Some(LightState::new(true, 100)));
        assert_eq!(store.len(), 1);
    }
}
