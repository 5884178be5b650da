//! Durable key-value storage for the player's view between sessions.

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

pub const PLAYER_POS_KEY: &str = "player_pos";
pub const PLAYER_LOOK_AT_KEY: &str = "player_lookAt";

/// How far ahead of the camera the saved look-at point sits.
pub const LOOK_AT_DISTANCE: f32 = 10.0;

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("storage file {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("storage file {path:?} is not valid JSON: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("could not encode stored value: {0}")]
    Encode(#[source] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
struct StoredVec3 {
    x: f32,
    y: f32,
    z: f32,
}

impl From<Vec3> for StoredVec3 {
    fn from(v: Vec3) -> Self {
        Self { x: v.x, y: v.y, z: v.z }
    }
}

impl From<StoredVec3> for Vec3 {
    fn from(v: StoredVec3) -> Self {
        Vec3::new(v.x, v.y, v.z)
    }
}

/// Player view saved when leaving for a page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SavedView {
    pub position: Vec3,
    pub look_at: Option<Vec3>,
}

/// String keys to string values, mirrored to a JSON file on every write.
#[derive(Debug, Default)]
pub struct DurableStore {
    path: Option<PathBuf>,
    entries: BTreeMap<String, String>,
}

impl DurableStore {
    /// Open the store at `path`. An unreadable file is logged and treated as empty.
    pub fn open(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let entries = match read_entries(&path) {
            Ok(entries) => entries,
            Err(e) => {
                log::warn!("{}; starting with empty storage", e);
                BTreeMap::new()
            }
        };
        Self {
            path: Some(path),
            entries,
        }
    }

    /// Store that never touches disk.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    #[cfg(test)]
    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), StorageError> {
        self.entries.insert(key.to_string(), value.into());
        self.flush()
    }

    /// Remove every key.
    pub fn clear(&mut self) -> Result<(), StorageError> {
        self.entries.clear();
        self.flush()
    }

    #[cfg(test)]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Save the player position and the point they are looking at.
    pub fn save_view(&mut self, position: Vec3, look_at: Vec3) -> Result<(), StorageError> {
        self.entries.insert(PLAYER_POS_KEY.to_string(), encode_vec3(position)?);
        self.entries.insert(PLAYER_LOOK_AT_KEY.to_string(), encode_vec3(look_at)?);
        self.flush()
    }

    /// Saved view, if a readable position was stored.
    pub fn load_view(&self) -> Option<SavedView> {
        let position = self.get(PLAYER_POS_KEY).and_then(decode_vec3)?;
        let look_at = self.get(PLAYER_LOOK_AT_KEY).and_then(decode_vec3);
        Some(SavedView { position, look_at })
    }

    fn flush(&self) -> Result<(), StorageError> {
        let Some(path) = &self.path else {
            return Ok(());
        };
        let data = serde_json::to_string_pretty(&self.entries).map_err(StorageError::Encode)?;
        std::fs::write(path, data).map_err(|source| StorageError::Io {
            path: path.clone(),
            source,
        })
    }
}

fn read_entries(path: &Path) -> Result<BTreeMap<String, String>, StorageError> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(BTreeMap::new()),
        Err(source) => {
            return Err(StorageError::Io {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    serde_json::from_str(&data).map_err(|source| StorageError::Json {
        path: path.to_path_buf(),
        source,
    })
}

fn encode_vec3(v: Vec3) -> Result<String, StorageError> {
    serde_json::to_string(&StoredVec3::from(v)).map_err(StorageError::Encode)
}

fn decode_vec3(s: &str) -> Option<Vec3> {
    match serde_json::from_str::<StoredVec3>(s) {
        Ok(v) => Some(v.into()),
        Err(e) => {
            log::warn!("Ignoring stored vector {:?}: {}", s, e);
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn view_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        {
            let mut store = DurableStore::open(&path);
            store
                .save_view(Vec3::new(1.0, 1.0, -3.5), Vec3::new(1.0, 1.0, -13.5))
                .unwrap();
        }
        let store = DurableStore::open(&path);
        assert_eq!(
            store.load_view(),
            Some(SavedView {
                position: Vec3::new(1.0, 1.0, -3.5),
                look_at: Some(Vec3::new(1.0, 1.0, -13.5)),
            })
        );
    }

    #[test]
    fn values_are_xyz_objects() {
        let mut store = DurableStore::in_memory();
        store.save_view(Vec3::new(1.0, 2.0, 3.0), Vec3::ZERO).unwrap();
        let raw: serde_json::Value = serde_json::from_str(store.get(PLAYER_POS_KEY).unwrap()).unwrap();
        assert_eq!(raw, serde_json::json!({ "x": 1.0, "y": 2.0, "z": 3.0 }));
    }

    #[test]
    fn clear_removes_everything_on_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        let mut store = DurableStore::open(&path);
        store.set("other", "1").unwrap();
        store.save_view(Vec3::ONE, Vec3::ONE).unwrap();
        store.clear().unwrap();
        assert!(store.is_empty());
        assert!(DurableStore::open(&path).is_empty());
    }

    #[test]
    fn corrupt_file_starts_empty() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("storage.json");
        std::fs::write(&path, "{ nope").unwrap();
        let store = DurableStore::open(&path);
        assert!(store.is_empty());
        assert!(matches!(read_entries(&path), Err(StorageError::Json { .. })));
    }

    #[test]
    fn bad_position_means_no_view() {
        let mut store = DurableStore::in_memory();
        store.set(PLAYER_POS_KEY, r#"{"x":1}"#).unwrap();
        store.set(PLAYER_LOOK_AT_KEY, r#"{"x":0,"y":0,"z":0}"#).unwrap();
        assert_eq!(store.load_view(), None);

        store.set(PLAYER_POS_KEY, r#"{"x":4,"y":1,"z":0}"#).unwrap();
        store.set(PLAYER_LOOK_AT_KEY, "garbage").unwrap();
        assert_eq!(
            store.load_view(),
            Some(SavedView { position: Vec3::new(4.0, 1.0, 0.0), look_at: None })
        );
    }
}
