//! Game settings and tuning
//!
//! Persisted as JSON in the data directory, separate from high scores.

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::consts::{FRAME_INTERVAL_MS, MAX_MOVE_REWARD, MOVE_REWARD, PURSUER_MOVE_INTERVAL_MS};
use crate::error::GameError;
use crate::sim::Difficulty;
use crate::sim::state::DifficultyRepr;

/// Environment variable naming the data directory (defaults to cwd)
pub const DATA_DIR_ENV: &str = "GRID_CHASE_DATA_DIR";

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Number of police (Easy 1, Medium 3, Hard 4)
    pub difficulty: Difficulty,

    // === Timing ===
    /// Police step interval
    pub pursuer_move_interval_ms: u64,
    /// Target loop iteration budget (~60 FPS)
    pub frame_interval_ms: u64,

    // === Scoring ===
    /// Points per successful step (1..=MAX_MOVE_REWARD)
    pub move_reward: u32,

    /// Fixed run seed (random per run when absent)
    pub seed: Option<u64>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Easy,
            pursuer_move_interval_ms: PURSUER_MOVE_INTERVAL_MS,
            frame_interval_ms: FRAME_INTERVAL_MS,
            move_reward: MOVE_REWARD,
            seed: None,
        }
    }
}

impl Settings {
    /// Storage key (file stem inside the data directory)
    const STORAGE_KEY: &'static str = "grid_chase_settings";

    /// Data directory from the environment, falling back to cwd
    pub fn data_dir() -> PathBuf {
        std::env::var_os(DATA_DIR_ENV)
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", Self::STORAGE_KEY))
    }

    /// Reject values that cannot drive a session
    pub fn validate(&self) -> Result<(), GameError> {
        if self.pursuer_move_interval_ms == 0 {
            return Err(GameError::InvalidSettings(
                "pursuer_move_interval_ms must be positive".to_string(),
            ));
        }
        if self.frame_interval_ms == 0 {
            return Err(GameError::InvalidSettings(
                "frame_interval_ms must be positive".to_string(),
            ));
        }
        if self.move_reward == 0 || self.move_reward > MAX_MOVE_REWARD {
            return Err(GameError::InvalidSettings(format!(
                "move_reward must be between 1 and {}, got {}",
                MAX_MOVE_REWARD, self.move_reward
            )));
        }
        Ok(())
    }

    /// Load settings from `dir`. A missing file yields defaults.
    ///
    /// An out-of-range difficulty surfaces as `InvalidDifficulty` rather
    /// than a generic JSON error.
    pub fn load_from(dir: &Path) -> Result<Self, GameError> {
        let path = Self::path_in(dir);
        let json = match fs::read_to_string(&path) {
            Ok(json) => json,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No settings at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(e) => return Err(e.into()),
        };

        let mut value: serde_json::Value = serde_json::from_str(&json)?;
        let difficulty = match value.as_object_mut().and_then(|map| map.remove("difficulty")) {
            Some(raw) => Some(Difficulty::try_from(serde_json::from_value::<DifficultyRepr>(raw)?)?),
            None => None,
        };

        let mut settings: Settings = serde_json::from_value(value)?;
        if let Some(difficulty) = difficulty {
            settings.difficulty = difficulty;
        }
        settings.validate()?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    /// Save settings into `dir`
    pub fn save_to(&self, dir: &Path) -> Result<(), GameError> {
        fs::create_dir_all(dir)?;
        let json = serde_json::to_string_pretty(self)?;
        fs::write(Self::path_in(dir), json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
