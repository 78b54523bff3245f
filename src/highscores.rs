//! High score persistence
//!
//! The best score is stored as JSON under a fixed namespace and only
//! replaced by a strictly greater score.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, PoisonError};

use serde::{Deserialize, Serialize};

use crate::error::GameError;

/// Receives the final score of every finished session
pub trait ScoreSink: Send {
    fn report_score(&mut self, score: u32);
}

/// Stored best score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct HighScores {
    #[serde(rename = "highScore")]
    pub high_score: u32,
}

impl HighScores {
    /// Storage namespace (file stem inside the data directory)
    pub const NAMESPACE: &'static str = "HighScores";

    /// Create empty record
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score beats the stored best
    pub fn qualifies(&self, score: u32) -> bool {
        score > self.high_score
    }

    /// Record a score; returns true if it became the new best
    pub fn record(&mut self, score: u32) -> bool {
        if !self.qualifies(score) {
            return false;
        }
        self.high_score = score;
        true
    }

    pub fn path_in(dir: &Path) -> PathBuf {
        dir.join(format!("{}.json", Self::NAMESPACE))
    }

    /// Load from `dir`; a missing file means no score yet
    pub fn load_from(dir: &Path) -> Result<Self, GameError> {
        match fs::read_to_string(Self::path_in(dir)) {
            Ok(json) => {
                let scores: HighScores = serde_json::from_str(&json)?;
                log::info!("Loaded high score {}", scores.high_score);
                Ok(scores)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                log::info!("No high score found, starting fresh");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save_to(&self, dir: &Path) -> Result<(), GameError> {
        fs::create_dir_all(dir)?;
        fs::write(Self::path_in(dir), serde_json::to_string(self)?)?;
        log::info!("High score saved ({})", self.high_score);
        Ok(())
    }
}

/// File-backed sink: persists a reported score only when it is a new best
#[derive(Debug, Clone)]
pub struct HighScoreStore {
    dir: PathBuf,
    scores: HighScores,
}

impl HighScoreStore {
    /// Open the store in `dir`. Unreadable records start fresh.
    pub fn open(dir: impl Into<PathBuf>) -> Self {
        let dir = dir.into();
        let scores = HighScores::load_from(&dir).unwrap_or_else(|e| {
            log::warn!("Ignoring unreadable high score file: {}", e);
            HighScores::new()
        });
        Self { dir, scores }
    }

    pub fn high_score(&self) -> u32 {
        self.scores.high_score
    }
}

impl ScoreSink for HighScoreStore {
    fn report_score(&mut self, score: u32) {
        if !self.scores.record(score) {
            return;
        }
        if let Err(e) = self.scores.save_to(&self.dir) {
            log::warn!("Failed to save high score {}: {}", score, e);
        }
    }
}

/// In-memory sink for headless runs and tests
#[derive(Debug, Clone, Default)]
pub struct MemoryScores {
    pub scores: HighScores,
    /// Every reported score, in order
    pub reported: Vec<u32>,
}

impl ScoreSink for MemoryScores {
    fn report_score(&mut self, score: u32) {
        self.reported.push(score);
        self.scores.record(score);
    }
}

/// Shared sink, so the caller can read scores while the loop owns a clone
impl<T: ScoreSink> ScoreSink for Arc<Mutex<T>> {
    fn report_score(&mut self, score: u32) {
        self.lock()
            .unwrap_or_else(PoisonError::into_inner)
            .report_score(score);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("grid-chase-scores-{}-{}", name, std::process::id()));
        let _ = fs::remove_dir_all(&dir);
        dir
    }

    #[test]
    fn test_record_only_greater() {
        let mut scores = HighScores::new();
        assert!(!scores.record(0));
        assert!(scores.record(120));
        assert!(!scores.record(120));
        assert!(!scores.record(40));
        assert!(scores.record(180));
        assert_eq!(scores.high_score, 180);
    }

    #[test]
    fn test_json_key() {
        let json = serde_json::to_string(&HighScores { high_score: 90 }).unwrap();
        assert_eq!(json, r#"{"highScore":90}"#);
    }

    #[test]
    fn test_store_persists_best_only() {
        let dir = scratch_dir("store");
        let mut store = HighScoreStore::open(&dir);
        assert_eq!(store.high_score(), 0);

        store.report_score(150);
        store.report_score(60);
        assert_eq!(HighScores::load_from(&dir).unwrap().high_score, 150);

        let reopened = HighScoreStore::open(&dir);
        assert_eq!(reopened.high_score(), 150);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_store_ignores_corrupt_file() {
        let dir = scratch_dir("corrupt");
        fs::create_dir_all(&dir).unwrap();
        fs::write(HighScores::path_in(&dir), "garbage").unwrap();

        let mut store = HighScoreStore::open(&dir);
        assert_eq!(store.high_score(), 0);
        store.report_score(30);
        assert_eq!(HighScores::load_from(&dir).unwrap().high_score, 30);
        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_memory_sink() {
        let mut sink = MemoryScores::default();
        sink.report_score(50);
        sink.report_score(20);
        assert_eq!(sink.reported, vec![50, 20]);
        assert_eq!(sink.scores.high_score, 50);
    }
}
