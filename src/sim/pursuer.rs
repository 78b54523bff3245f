//! Police movement and spawning
//!
//! Police use a cheap biased-random heuristic rather than pathfinding: most
//! of the time they step toward the player (diagonals allowed), otherwise
//! they wander one tile in a random cardinal direction. Rocks simply veto a
//! move, so the player can use them to shake pursuit.

use rand::Rng;

use super::collision::clamp_to_bounds;
use super::grid::{Direction, GridModel, Position};
use crate::consts::{CHASE_PROBABILITY, MAX_SPAWN_ATTEMPTS};

/// Candidate next tile for a pursuer, before bounds/obstacle validation.
///
/// Consumes one `f32` draw, plus one direction draw on the wander branch,
/// so the result is reproducible for a given RNG state.
pub fn decide_move<R: Rng>(pursuer: Position, target: Position, rng: &mut R) -> Position {
    if rng.random::<f32>() < CHASE_PROBABILITY {
        // At most one step per axis, never overshooting
        let d_row = (target.row - pursuer.row).signum();
        let d_col = (target.col - pursuer.col).signum();
        pursuer.offset(d_row, d_col)
    } else {
        let (d_row, d_col) = Direction::ALL[rng.random_range(0..Direction::ALL.len())].delta();
        pursuer.offset(d_row, d_col)
    }
}

/// Committed position after one AI step.
///
/// The candidate is clamped to the grid; if it lands on a rock the pursuer
/// stays put this tick (no fallback direction).
pub fn advance_pursuer<R: Rng>(
    current: Position,
    target: Position,
    grid: &GridModel,
    rng: &mut R,
) -> Position {
    let candidate = clamp_to_bounds(decide_move(current, target, rng), grid);
    if grid.is_obstacle(candidate) {
        current
    } else {
        candidate
    }
}

/// Place `count` pursuers on free tiles other than the player's start
pub fn spawn_pursuers<R: Rng>(count: usize, grid: &GridModel, rng: &mut R) -> Vec<Position> {
    (0..count).map(|_| spawn_one(grid, rng)).collect()
}

/// Rejection sampling with a retry cap, then a row-major scan.
fn spawn_one<R: Rng>(grid: &GridModel, rng: &mut R) -> Position {
    let valid = |p: Position| p != grid.start() && !grid.is_obstacle(p);

    for _ in 0..MAX_SPAWN_ATTEMPTS {
        let p = Position::new(
            rng.random_range(0..grid.rows()),
            rng.random_range(0..grid.cols()),
        );
        if valid(p) {
            return p;
        }
    }

    log::warn!(
        "No free spawn tile after {} draws, scanning the grid",
        MAX_SPAWN_ATTEMPTS
    );
    // A valid layout always leaves the exit free and distinct from start
    grid.tiles().find(|&p| valid(p)).unwrap_or(grid.exit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::grid::TileRect;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_decide_move_reproducible() {
        let mut rng1 = Pcg32::seed_from_u64(42);
        let mut rng2 = Pcg32::seed_from_u64(42);
        let from = Position::new(2, 2);
        let target = Position::new(9, 0);

        for _ in 0..100 {
            assert_eq!(
                decide_move(from, target, &mut rng1),
                decide_move(from, target, &mut rng2)
            );
        }
    }

    #[test]
    fn test_decide_move_chase_bias() {
        let mut rng = Pcg32::seed_from_u64(7);
        let from = Position::new(0, 0);
        let target = Position::new(5, 5);
        let chase_step = Position::new(1, 1);

        let trials = 10_000;
        let mut chased = 0;
        for _ in 0..trials {
            let candidate = decide_move(from, target, &mut rng);
            if candidate == chase_step {
                chased += 1;
            } else {
                // Wander branch changes exactly one axis by one
                let moved = (candidate.row - from.row).abs() + (candidate.col - from.col).abs();
                assert_eq!(moved, 1, "unexpected wander step {candidate:?}");
            }
        }

        let ratio = chased as f32 / trials as f32;
        assert!((0.65..0.75).contains(&ratio), "chase ratio {ratio}");
    }

    #[test]
    fn test_chase_keeps_aligned_axis() {
        let mut rng = Pcg32::seed_from_u64(3);
        let from = Position::new(4, 1);
        let target = Position::new(4, 8);
        // Chase only moves along the column; the rest are wander steps
        let allowed = [
            Position::new(4, 2),
            Position::new(3, 1),
            Position::new(5, 1),
            Position::new(4, 0),
        ];
        for _ in 0..200 {
            let candidate = decide_move(from, target, &mut rng);
            assert!(allowed.contains(&candidate), "unexpected candidate {candidate:?}");
        }
    }

    #[test]
    fn test_advance_vetoed_when_surrounded() {
        // Ring of rocks around (5,5)
        let ring = vec![
            TileRect::new(4, 4, 1, 3),
            TileRect::new(6, 4, 1, 3),
            TileRect::tile(5, 4),
            TileRect::tile(5, 6),
        ];
        let grid = GridModel::new(10, 10, ring, Position::new(9, 0), Position::new(0, 9)).unwrap();
        let mut rng = Pcg32::seed_from_u64(11);
        let caged = Position::new(5, 5);

        for _ in 0..200 {
            assert_eq!(advance_pursuer(caged, Position::new(9, 0), &grid, &mut rng), caged);
        }
    }

    #[test]
    fn test_advance_stays_in_bounds_at_corner() {
        let grid = GridModel::reference();
        let mut rng = Pcg32::seed_from_u64(5);
        let corner = Position::new(0, 0);

        for _ in 0..200 {
            let next = advance_pursuer(corner, corner, &grid, &mut rng);
            assert!(grid.in_bounds(next));
            assert!(!grid.is_obstacle(next));
        }
    }

    #[test]
    fn test_spawn_avoids_start_and_obstacles() {
        let grid = GridModel::reference();
        let mut rng = Pcg32::seed_from_u64(99);
        for _ in 0..50 {
            for p in spawn_pursuers(4, &grid, &mut rng) {
                assert!(grid.in_bounds(p));
                assert!(!grid.is_obstacle(p));
                assert_ne!(p, grid.start());
            }
        }
    }

    #[test]
    fn test_spawn_on_nearly_full_grid() {
        // Only start (1,0) and exit (1,1) are free on a 2x2 grid
        let rocks = vec![TileRect::new(0, 0, 1, 2)];
        let grid = GridModel::new(2, 2, rocks, Position::new(1, 0), Position::new(1, 1)).unwrap();
        let mut rng = Pcg32::seed_from_u64(1);

        let spawned = spawn_pursuers(3, &grid, &mut rng);
        assert_eq!(spawned, vec![Position::new(1, 1); 3]);
    }
}
