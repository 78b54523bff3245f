//! Session state and core simulation types
//!
//! Everything a running session mutates lives in [`GameState`]; the grid
//! itself is immutable once the session is built.

use std::str::FromStr;
use std::time::{Duration, Instant};

use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::grid::{GridModel, Position};
use super::pursuer::spawn_pursuers;
use crate::consts::*;
use crate::error::GameError;
use crate::settings::Settings;

/// Current phase of a session. Exactly one holds at any time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Active gameplay
    Running,
    /// Player reached the exit (terminal)
    Victory,
    /// Player ran out of hearts (terminal)
    Defeat,
}

impl GamePhase {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, GamePhase::Running)
    }
}

/// Difficulty selects how many police patrol the yard.
///
/// Stored as its menu level; names are accepted on input as well.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(try_from = "DifficultyRepr", into = "i32")]
pub enum Difficulty {
    #[default]
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    /// Menu level (1 = Easy, 2 = Medium, 3 = Hard)
    pub fn from_level(level: i32) -> Result<Self, GameError> {
        match level {
            1 => Ok(Difficulty::Easy),
            2 => Ok(Difficulty::Medium),
            3 => Ok(Difficulty::Hard),
            other => Err(GameError::InvalidDifficulty(other)),
        }
    }

    pub fn level(&self) -> i32 {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 2,
            Difficulty::Hard => 3,
        }
    }

    pub fn pursuer_count(&self) -> usize {
        match self {
            Difficulty::Easy => 1,
            Difficulty::Medium => 3,
            Difficulty::Hard => 4,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Medium => "Medium",
            Difficulty::Hard => "Hard",
        }
    }
}

impl FromStr for Difficulty {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "medium" | "med" => Ok(Difficulty::Medium),
            "hard" | "impossible" => Ok(Difficulty::Hard),
            other => match other.parse::<i32>() {
                Ok(level) => Difficulty::from_level(level),
                Err(_) => Err(GameError::UnknownDifficulty(s.to_string())),
            },
        }
    }
}

/// On-disk difficulty: a menu level or a name
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub(crate) enum DifficultyRepr {
    Level(i32),
    Name(String),
}

impl TryFrom<DifficultyRepr> for Difficulty {
    type Error = GameError;

    fn try_from(repr: DifficultyRepr) -> Result<Self, Self::Error> {
        match repr {
            DifficultyRepr::Level(level) => Difficulty::from_level(level),
            DifficultyRepr::Name(name) => name.parse(),
        }
    }
}

impl From<Difficulty> for i32 {
    fn from(difficulty: Difficulty) -> Self {
        difficulty.level()
    }
}

/// Notable outcomes of a single tick
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Player was caught but still has hearts; positions were reset
    Caught { health: u8 },
    /// Player reached the exit with this final score
    Victory { score: u32 },
    /// Last heart lost with this final score
    Defeat { score: u32 },
}

/// Read-only view handed to the render callback
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Frame<'a> {
    pub grid: &'a GridModel,
    pub player: Position,
    pub pursuers: &'a [Position],
    pub health: u8,
    pub score: u32,
    pub phase: GamePhase,
    pub tick: u64,
}

/// Complete session state
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility
    pub seed: u64,
    /// Static level data
    pub grid: GridModel,
    pub difficulty: Difficulty,
    pub player: Position,
    /// Police positions; identity is the index, count fixed per session
    pub pursuers: Vec<Position>,
    /// Hearts remaining, 0..=3
    pub health: u8,
    pub score: u32,
    pub phase: GamePhase,
    /// Update ticks processed while running
    pub time_ticks: u64,
    /// Wall-clock time of the last police move (None = move due now)
    pub last_pursuer_move: Option<Instant>,
    pub pursuer_move_interval: Duration,
    /// Score per successful player step
    pub move_reward: u32,
    pub(crate) rng: Pcg32,
}

impl GameState {
    /// Create a session with default tuning
    pub fn new(grid: GridModel, difficulty: Difficulty, seed: u64) -> Self {
        let mut rng = Pcg32::seed_from_u64(seed);
        let pursuers = spawn_pursuers(difficulty.pursuer_count(), &grid, &mut rng);

        log::info!(
            "New {} session: {} police, seed {}",
            difficulty.as_str(),
            pursuers.len(),
            seed
        );

        Self {
            seed,
            player: grid.start(),
            grid,
            difficulty,
            pursuers,
            health: STARTING_HEALTH,
            score: 0,
            phase: GamePhase::Running,
            time_ticks: 0,
            last_pursuer_move: None,
            pursuer_move_interval: Duration::from_millis(PURSUER_MOVE_INTERVAL_MS),
            move_reward: MOVE_REWARD,
            rng,
        }
    }

    /// Create a session from a menu level; levels outside 1..=3 are rejected
    pub fn from_level(grid: GridModel, level: i32, seed: u64) -> Result<Self, GameError> {
        let difficulty = Difficulty::from_level(level)?;
        Ok(Self::new(grid, difficulty, seed))
    }

    /// Create a session from validated settings
    pub fn from_settings(grid: GridModel, settings: &Settings, seed: u64) -> Result<Self, GameError> {
        settings.validate()?;
        let mut state = Self::new(grid, settings.difficulty, seed);
        state.pursuer_move_interval = Duration::from_millis(settings.pursuer_move_interval_ms);
        state.move_reward = settings.move_reward;
        Ok(state)
    }

    /// Player back to start, police re-rolled. Health and score untouched.
    pub fn reset_positions(&mut self) {
        self.player = self.grid.start();
        self.pursuers = spawn_pursuers(self.pursuers.len(), &self.grid, &mut self.rng);
    }

    /// Full restart: hearts, score and positions back to session start
    pub fn restart(&mut self) {
        self.health = STARTING_HEALTH;
        self.score = 0;
        self.time_ticks = 0;
        self.last_pursuer_move = None;
        self.phase = GamePhase::Running;
        self.reset_positions();
        log::info!("Session restarted ({})", self.difficulty.as_str());
    }

    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Index of the first pursuer standing on the player's tile
    pub fn pursuer_at_player(&self) -> Option<usize> {
        self.pursuers.iter().position(|&p| p == self.player)
    }

    /// Borrowed view for rendering
    pub fn frame(&self) -> Frame<'_> {
        Frame {
            grid: &self.grid,
            player: self.player,
            pursuers: &self.pursuers,
            health: self.health,
            score: self.score,
            phase: self.phase,
            tick: self.time_ticks,
        }
    }
}
