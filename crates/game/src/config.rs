//! Game configuration (window, timing, paths). Loaded from config.ron at startup.

use crate::level::LevelKind;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Persistent game settings. Loaded from `config.ron` in the current directory.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    /// Window width in logical pixels.
    #[serde(default = "default_window_width")]
    pub window_width: u32,
    /// Window height in logical pixels.
    #[serde(default = "default_window_height")]
    pub window_height: u32,
    /// Mouse sensitivity multiplier (1.0 = default).
    #[serde(default = "default_one")]
    pub sensitivity: f32,
    /// Walking speed in units per second.
    #[serde(default = "default_move_speed")]
    pub move_speed: f32,
    /// Fixed simulation step in seconds.
    #[serde(default = "default_fixed_timestep")]
    pub fixed_timestep: f64,
    /// Longest frame the simulation will catch up on, in seconds.
    #[serde(default = "default_max_frame_delta")]
    pub max_frame_delta: f64,
    /// Level opened at startup.
    #[serde(default)]
    pub start_level: LevelKind,
    /// Directory holding the level models.
    #[serde(default = "default_asset_dir")]
    pub asset_dir: PathBuf,
    /// Directory holding the algorithm pages (`Kruskal.html`, ...).
    #[serde(default = "default_pages_dir")]
    pub pages_dir: PathBuf,
    /// Directory probed for optional overlay step images (`1.png` .. `6.png`).
    #[serde(default = "default_overlay_dir")]
    pub overlay_dir: PathBuf,
    /// File backing the durable key-value store.
    #[serde(default = "default_storage_path")]
    pub storage_path: PathBuf,
    /// Open algorithm pages in the system browser when a door leads to one.
    #[serde(default = "default_true")]
    pub open_external_pages: bool,
}

fn default_window_width() -> u32 {
    1280
}
fn default_window_height() -> u32 {
    720
}
fn default_one() -> f32 {
    1.0
}
fn default_true() -> bool {
    true
}
fn default_move_speed() -> f32 {
    5.0
}
fn default_fixed_timestep() -> f64 {
    engine_core::DEFAULT_FIXED_TIMESTEP
}
fn default_max_frame_delta() -> f64 {
    engine_core::DEFAULT_MAX_FRAME_DELTA
}
fn default_asset_dir() -> PathBuf {
    PathBuf::from("assets")
}
fn default_pages_dir() -> PathBuf {
    PathBuf::from("pages")
}
fn default_overlay_dir() -> PathBuf {
    PathBuf::from("assets/AlgorithmsInstructions/bucketSortAlgo")
}
fn default_storage_path() -> PathBuf {
    PathBuf::from("storage.json")
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            window_width: default_window_width(),
            window_height: default_window_height(),
            sensitivity: default_one(),
            move_speed: default_move_speed(),
            fixed_timestep: default_fixed_timestep(),
            max_frame_delta: default_max_frame_delta(),
            start_level: LevelKind::default(),
            asset_dir: default_asset_dir(),
            pages_dir: default_pages_dir(),
            overlay_dir: default_overlay_dir(),
            storage_path: default_storage_path(),
            open_external_pages: default_true(),
        }
    }
}

impl GameConfig {
    /// Load config from `config.ron`. If the file is missing or invalid, returns default config.
    pub fn load() -> Self {
        Self::load_from(&Self::path())
    }

    pub fn load_from(path: &Path) -> Self {
        if let Ok(data) = std::fs::read_to_string(path) {
            match ron::from_str(&data) {
                Ok(c) => return c,
                Err(e) => log::warn!("Invalid config at {:?}: {}, using defaults", path, e),
            }
        }
        Self::default()
    }

    /// Save current config to `config.ron`. Logs on error.
    pub fn save(&self) {
        self.save_to(&Self::path());
    }

    pub fn save_to(&self, path: &Path) {
        if let Ok(s) = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default()) {
            if let Err(e) = std::fs::write(path, s) {
                log::warn!("Could not write config to {:?}: {}", path, e);
            }
        }
    }

    /// `config.ron` in the current directory.
    pub fn path() -> PathBuf {
        std::env::current_dir().unwrap_or_else(|_| PathBuf::from(".")).join("config.ron")
    }
}
