//! Error types for session construction and the loop driver
//!
//! Gameplay outcomes (collisions, blocked moves, defeat) are state
//! transitions, never errors.

/// Errors surfaced by the game core.
#[derive(Debug, thiserror::Error)]
pub enum GameError {
    /// Difficulty level outside 1..=3. No session is created.
    #[error("invalid difficulty level: {0} (expected 1, 2 or 3)")]
    InvalidDifficulty(i32),

    /// Difficulty name that matches no known level.
    #[error("unknown difficulty: {0:?}")]
    UnknownDifficulty(String),

    /// Grid layout that cannot host a session.
    #[error("invalid grid layout: {0}")]
    InvalidLayout(String),

    /// Settings values that cannot drive a session.
    #[error("invalid settings: {0}")]
    InvalidSettings(String),

    /// Reading or writing a persisted file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// A persisted file held malformed JSON.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The loop thread could not be spawned.
    #[error("failed to spawn game loop thread: {0}")]
    Spawn(std::io::Error),

    /// The loop thread panicked; its collaborators are lost.
    #[error("game loop thread panicked")]
    LoopPanicked,

    /// Resume was requested after the collaborators were lost to a panic.
    #[error("game loop collaborators are unavailable")]
    LoopParts,
}
