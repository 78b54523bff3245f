//! Collision queries shared by the player and the police
//!
//! Pure functions over a [`GridModel`]; no state.

use super::grid::{GridModel, Position};

/// True if `p` is off the grid or under a rock
#[inline]
pub fn is_blocked(p: Position, grid: &GridModel) -> bool {
    !grid.in_bounds(p) || grid.is_obstacle(p)
}

/// Clamp row and column independently into the grid
#[inline]
pub fn clamp_to_bounds(p: Position, grid: &GridModel) -> Position {
    Position::new(
        p.row.clamp(0, grid.rows() - 1),
        p.col.clamp(0, grid.cols() - 1),
    )
}
