//! ASCII renderer for terminals
//!
//! Legend: `P` player, `X` police, `#` rock, `E` exit, `.` open ground.

use std::fmt::Write as _;
use std::io::Write;

use super::Renderer;
use crate::sim::{Frame, GamePhase, Position};

/// Draw a frame as text: HUD line, then one line per grid row
pub fn draw_frame(frame: &Frame<'_>) -> String {
    let grid = frame.grid;
    let mut out = String::new();

    let hearts = "♥".repeat(frame.health as usize);
    let _ = writeln!(out, "Hearts: {:<3}  Score: {}", hearts, frame.score);

    for row in 0..grid.rows() {
        let line: Vec<&str> = (0..grid.cols())
            .map(|col| {
                let p = Position::new(row, col);
                if p == frame.player {
                    "P"
                } else if frame.pursuers.contains(&p) {
                    "X"
                } else if grid.is_obstacle(p) {
                    "#"
                } else if p == grid.exit() {
                    "E"
                } else {
                    "."
                }
            })
            .collect();
        let _ = writeln!(out, "{}", line.join(" "));
    }

    match frame.phase {
        GamePhase::Running => {}
        GamePhase::Victory => out.push_str("You escaped the prison!\n"),
        GamePhase::Defeat => out.push_str("You were caught by the police!\n"),
    }
    out
}

/// Writes a frame to the surface whenever the drawing changes
pub struct TextRenderer<W: Write + Send> {
    surface: Option<W>,
    last: Option<String>,
}

impl<W: Write + Send> TextRenderer<W> {
    pub fn new(surface: W) -> Self {
        Self {
            surface: Some(surface),
            last: None,
        }
    }

    /// Renderer with no surface yet; frames are skipped until `attach`
    pub fn detached() -> Self {
        Self {
            surface: None,
            last: None,
        }
    }

    pub fn attach(&mut self, surface: W) {
        self.surface = Some(surface);
        self.last = None;
    }

    pub fn detach(&mut self) -> Option<W> {
        self.surface.take()
    }

    pub fn is_attached(&self) -> bool {
        self.surface.is_some()
    }
}

impl<W: Write + Send> Renderer for TextRenderer<W> {
    fn render(&mut self, frame: &Frame<'_>) {
        let Some(surface) = self.surface.as_mut() else {
            return;
        };

        let drawing = draw_frame(frame);
        if self.last.as_deref() == Some(drawing.as_str()) {
            return;
        }

        if let Err(e) = surface
            .write_all(drawing.as_bytes())
            .and_then(|_| writeln!(surface))
            .and_then(|_| surface.flush())
        {
            log::warn!("Text surface failed, detaching: {}", e);
            self.surface = None;
            return;
        }
        self.last = Some(drawing);
    }
}
