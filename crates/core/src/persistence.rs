//! Durable cache of the last simulation run
//!
//! Fire vectors and action plans are stored as JSON under two fixed string
//! keys and rewritten in full on every run. Reads are forgiving: a key holding
//! malformed JSON falls back to an empty list without affecting the other key.

use crate::spread::{ActionPlan, FireVector, SimulationState};
use rustc_hash::FxHashMap;
use serde::de::DeserializeOwned;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Storage key for `FireVector[]`
pub const FIRE_VECTORS_KEY: &str = "fire-vectors";
/// Storage key for `ActionPlan[]`
pub const ACTION_PLANS_KEY: &str = "action-plans";

/// Persistence seam for simulation results
pub trait SimulationStore {
    /// Last saved state, `None` if nothing was ever saved
    fn load(&self) -> Option<SimulationState>;

    /// Overwrite the stored state
    ///
    /// # Errors
    /// Returns error if the state cannot be serialized or written
    fn save(&mut self, state: &SimulationState) -> Result<(), StoreError>;
}

/// Decode both keys from raw JSON strings
///
/// Returns `None` only when neither key is present.
fn decode_state(fire_vectors: Option<&str>, action_plans: Option<&str>) -> Option<SimulationState> {
    if fire_vectors.is_none() && action_plans.is_none() {
        return None;
    }
    Some(SimulationState {
        fire_vectors: decode_list::<FireVector>(FIRE_VECTORS_KEY, fire_vectors),
        action_plans: decode_list::<ActionPlan>(ACTION_PLANS_KEY, action_plans),
    })
}

fn decode_list<T: DeserializeOwned>(key: &str, raw: Option<&str>) -> Vec<T> {
    let Some(raw) = raw else {
        return Vec::new();
    };
    match serde_json::from_str(raw) {
        Ok(list) => list,
        Err(e) => {
            warn!("Ignoring malformed stored '{}': {}", key, e);
            Vec::new()
        }
    }
}

fn encode_state(state: &SimulationState) -> Result<[(&'static str, String); 2], StoreError> {
    let vectors = serde_json::to_string(&state.fire_vectors)
        .map_err(|e| StoreError::SerializeFailed(e.to_string()))?;
    let plans = serde_json::to_string(&state.action_plans)
        .map_err(|e| StoreError::SerializeFailed(e.to_string()))?;
    Ok([(FIRE_VECTORS_KEY, vectors), (ACTION_PLANS_KEY, plans)])
}

/// In-process string key/value store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: FxHashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Raw stored value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Store a raw value, bypassing serialization
    pub fn insert_raw(&mut self, key: &str, value: impl Into<String>) {
        self.entries.insert(key.to_string(), value.into());
    }
}

impl SimulationStore for MemoryStore {
    fn load(&self) -> Option<SimulationState> {
        decode_state(self.get(FIRE_VECTORS_KEY), self.get(ACTION_PLANS_KEY))
    }

    fn save(&mut self, state: &SimulationState) -> Result<(), StoreError> {
        for (key, value) in encode_state(state)? {
            self.insert_raw(key, value);
        }
        Ok(())
    }
}

/// One `<key>.json` file per key inside a directory
#[derive(Debug, Clone)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().to_path_buf(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn key_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json"))
    }

    fn temp_path(&self, key: &str) -> PathBuf {
        self.dir.join(format!("{key}.json.tmp"))
    }

    fn read_key(&self, key: &str) -> Option<String> {
        fs::read_to_string(self.key_path(key)).ok()
    }
}

impl SimulationStore for FileStore {
    fn load(&self) -> Option<SimulationState> {
        let vectors = self.read_key(FIRE_VECTORS_KEY);
        let plans = self.read_key(ACTION_PLANS_KEY);
        decode_state(vectors.as_deref(), plans.as_deref())
    }

    /// Both keys are staged to temp files first, so a failed write leaves
    /// the previous pair in place.
    fn save(&mut self, state: &SimulationState) -> Result<(), StoreError> {
        let entries = encode_state(state)?;
        fs::create_dir_all(&self.dir).map_err(|e| StoreError::SaveFailed(e.to_string()))?;

        let mut staged = Vec::with_capacity(entries.len());
        for (key, value) in entries {
            let tmp = self.temp_path(key);
            if let Err(e) = fs::write(&tmp, value) {
                for (_, written) in &staged {
                    let _ = fs::remove_file(written);
                }
                return Err(StoreError::SaveFailed(format!("{key}: {e}")));
            }
            staged.push((key, tmp));
        }

        for (key, tmp) in staged {
            fs::rename(&tmp, self.key_path(key)).map_err(|e| {
                warn!("Failed to commit stored '{}': {}", key, e);
                StoreError::SaveFailed(format!("{key}: {e}"))
            })?;
        }
        Ok(())
    }
}

/// Errors that can occur when saving simulation results
#[derive(Debug)]
pub enum StoreError {
    /// Failed to serialize state
    SerializeFailed(String),
    /// Failed to write to the backing storage
    SaveFailed(String),
}

impl std::fmt::Display for StoreError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StoreError::SerializeFailed(msg) => write!(f, "Failed to serialize: {msg}"),
            StoreError::SaveFailed(msg) => write!(f, "Failed to save: {msg}"),
        }
    }
}

impl std::error::Error for StoreError {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core_types::GeoPoint;

    fn sample_state() -> SimulationState {
        SimulationState::from_vectors(vec![FireVector {
            start: GeoPoint::new(-15.0, -62.0),
            end: GeoPoint::new(-15.0, -61.999),
        }])
    }

    #[test]
    fn test_empty_store_loads_nothing() {
        assert_eq!(MemoryStore::new().load(), None);
    }

    #[test]
    fn test_memory_save_and_load() {
        let mut store = MemoryStore::new();
        let state = sample_state();
        store.save(&state).unwrap();
        assert_eq!(store.load(), Some(state));
        assert!(store.get(FIRE_VECTORS_KEY).unwrap().contains("\"lat\""));
    }

    #[test]
    fn test_save_overwrites() {
        let mut store = MemoryStore::new();
        store.save(&sample_state()).unwrap();
        store.save(&SimulationState::default()).unwrap();
        assert_eq!(store.load(), Some(SimulationState::default()));
    }

    #[test]
    fn test_malformed_key_falls_back_alone() {
        let mut store = MemoryStore::new();
        let state = sample_state();
        store.save(&state).unwrap();
        store.insert_raw(FIRE_VECTORS_KEY, "{not json");

        let loaded = store.load().unwrap();
        assert!(loaded.fire_vectors.is_empty());
        assert_eq!(loaded.action_plans, state.action_plans);
    }

    #[test]
    fn test_file_store_save_and_load() {
        let dir = std::env::temp_dir().join(format!("wildfire_store_{}", std::process::id()));
        let mut store = FileStore::new(&dir);
        let state = sample_state();

        store.save(&state).unwrap();
        assert!(dir.join("fire-vectors.json").exists());
        assert!(dir.join("action-plans.json").exists());

        let reopened = FileStore::new(&dir);
        assert_eq!(reopened.load(), Some(state));

        // Cleanup
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_file_store_missing_dir_loads_nothing() {
        let store = FileStore::new(std::env::temp_dir().join("wildfire_store_never_written"));
        assert_eq!(store.load(), None);
    }

    #[test]
    fn test_coordinates_survive_exactly() {
        let mut store = MemoryStore::new();
        let state = SimulationState::from_vectors(vec![FireVector {
            start: GeoPoint::new(-15.001_262_586_661_305, -62.000_051),
            end: GeoPoint::new(-15.000_883, -61.999_37),
        }]);
        store.save(&state).unwrap();

        let loaded = store.load().unwrap();
        assert_eq!(loaded.fire_vectors[0].start.lat, -15.001_262_586_661_305);
        assert_eq!(loaded, state);
    }

    #[test]
    fn test_file_store_failed_save_keeps_previous_pair() {
        let dir = std::env::temp_dir().join(format!("wildfire_store_partial_{}", std::process::id()));
        let mut store = FileStore::new(&dir);
        let state = sample_state();
        store.save(&state).unwrap();

        // A directory in the way of the staged plans file fails the second write
        fs::create_dir_all(dir.join("action-plans.json.tmp")).unwrap();
        let result = store.save(&SimulationState::default());
        assert!(matches!(result, Err(StoreError::SaveFailed(_))));

        assert_eq!(store.load(), Some(state));
        assert!(!dir.join("fire-vectors.json.tmp").exists());

        // Cleanup
        let _ = fs::remove_dir_all(&dir);
    }
}
