//! Game simulation module
//!
//! All gameplay logic lives here:
//! - Seeded RNG only (a session replays given its seed, inputs and clock)
//! - Stable pursuer order (identity = index)
//! - No rendering, threading or platform dependencies

pub mod collision;
pub mod grid;
pub mod pursuer;
pub mod state;
pub mod tick;

pub use collision::{clamp_to_bounds, is_blocked};
pub use grid::{Direction, GridModel, Position, TileRect};
pub use pursuer::{advance_pursuer, decide_move, spawn_pursuers};
pub use state::{Difficulty, Frame, GameEvent, GamePhase, GameState};
pub use tick::{move_player, tick};
