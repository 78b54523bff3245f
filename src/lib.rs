//! Grid Chase - escape a 10x10 prison yard before the police catch you
//!
//! Core modules:
//! - `sim`: Game simulation (grid, collisions, police AI, session state)
//! - `game_loop`: Threaded fixed-cadence driver with pause/resume/restart
//! - `renderer`: Render callback contract plus text/JSON renderers
//! - `highscores`: Persisted best score
//! - `settings`: Runtime configuration

pub mod error;
pub mod game_loop;
pub mod highscores;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::GameError;
pub use game_loop::{GameHandle, GameLoop, LoopParts, SessionObserver};
pub use highscores::{HighScoreStore, HighScores, MemoryScores, ScoreSink};
pub use settings::Settings;

/// Game configuration constants
pub mod consts {
    use crate::sim::Position;

    /// Battlefield dimensions (tiles)
    pub const GRID_ROWS: i32 = 10;
    pub const GRID_COLS: i32 = 10;

    /// Player spawns bottom-left
    pub const START: Position = Position::new(GRID_ROWS - 1, 0);
    /// Exit is top-right
    pub const EXIT: Position = Position::new(0, GRID_COLS - 1);

    /// Hearts at session start
    pub const STARTING_HEALTH: u8 = 3;
    /// Score awarded per successful player step
    pub const MOVE_REWARD: u32 = 10;
    /// Largest per-step reward settings may configure
    pub const MAX_MOVE_REWARD: u32 = 1000;

    /// Police move every 500ms, independent of the frame rate
    pub const PURSUER_MOVE_INTERVAL_MS: u64 = 500;
    /// ~60 FPS loop budget
    pub const FRAME_INTERVAL_MS: u64 = 16;

    /// Probability a pursuer steps toward the player instead of wandering
    pub const CHASE_PROBABILITY: f32 = 0.7;

    /// Random spawn draws before falling back to a deterministic scan
    pub const MAX_SPAWN_ATTEMPTS: u32 = 1000;
}
