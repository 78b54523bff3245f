//! JSON-lines snapshot renderer
//!
//! Emits one serialized [`Frame`] per line whenever gameplay state changes,
//! for piping into external front ends.

use std::io::Write;

use super::Renderer;
use crate::sim::{Frame, GamePhase, Position};

/// Gameplay-relevant part of a frame (the tick counter is ignored)
#[derive(Debug, Clone, PartialEq, Eq)]
struct FrameKey {
    player: Position,
    pursuers: Vec<Position>,
    health: u8,
    score: u32,
    phase: GamePhase,
}

impl FrameKey {
    fn of(frame: &Frame<'_>) -> Self {
        Self {
            player: frame.player,
            pursuers: frame.pursuers.to_vec(),
            health: frame.health,
            score: frame.score,
            phase: frame.phase,
        }
    }
}

pub struct JsonRenderer<W: Write + Send> {
    surface: Option<W>,
    last: Option<FrameKey>,
}

impl<W: Write + Send> JsonRenderer<W> {
    pub fn new(surface: W) -> Self {
        Self {
            surface: Some(surface),
            last: None,
        }
    }

    pub fn detach(&mut self) -> Option<W> {
        self.surface.take()
    }
}

impl<W: Write + Send> Renderer for JsonRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let key = FrameKey::of(frame);
        if self.last.as_ref() == Some(&key) {
            return;
        }

        let result = serde_json::to_writer(&mut *surface, frame)
            .map_err(std::io::Error::from)
            .and_then(|_| writeln!(surface))
            .and_then(|_| surface.flush());
        if let Err(e) = result {
            log::warn!("JSON surface failed, detaching: {}", e);
            self.surface = None;
            return;
        }
        self.last = Some(key);
    }
}
