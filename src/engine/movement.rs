use crate::constants::ON_GRID_TOLERANCE;
use crate::geometry::{self, cell_center, round_to_cell};
use crate::maze::Maze;
use crate::types::{Cell, Direction, Vec2};

/// Shared continuous-motion state: every agent owns one of these and the
/// free functions below resolve one tick of motion over it. Invariant: at
/// every tick boundary the position is either within the snap tolerance of
/// a cell center or strictly between two adjacent centers along `dir`.
#[derive(Clone, Debug)]
pub struct Mover {
    home: Vec2,
    home_dir: Direction,
    pub pos: Vec2,
    pub dir: Direction,
    pub pending: Direction,
    speed: f32,
}

impl Mover {
    pub fn new(x: f32, y: f32, dir: Direction, speed: f32) -> Mover {
        debug_assert!(speed > 0.0 && speed <= 1.0);
        let home = Vec2 { x, y };
        Mover {
            home,
            home_dir: dir,
            pos: home,
            dir,
            pending: dir,
            speed,
        }
    }

    pub fn home(&self) -> Vec2 {
        self.home
    }

    pub fn home_cell(&self) -> Cell {
        round_to_cell(self.home)
    }

    pub fn cell(&self) -> Cell {
        round_to_cell(self.pos)
    }

    /// Back to the construction-time spawn state. Never touches anything
    /// beyond position and direction; counters stay with their owners.
    pub fn reborn(&mut self) {
        self.pos = self.home;
        self.dir = self.home_dir;
        self.pending = self.home_dir;
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveOutcome {
    Moved,
    Blocked,
}

/// Candidate position one `speed` step along `dir`, or `None` when the
/// cell half a cell further along is a wall. The half-cell lookahead
/// rejects a move before the sprite could clip into a wall corner.
pub fn probe(mover: &Mover, maze: &Maze, dir: Direction) -> Option<Vec2> {
    let v = dir.vector();
    let next = geometry::add(mover.pos, geometry::scale(v, mover.speed));
    let ahead = maze.wrap_cell(round_to_cell(geometry::add(next, geometry::scale(v, 0.5))));
    if maze.is_wall(ahead) {
        None
    } else {
        Some(next)
    }
}

/// One tick of motion. A pending reversal commits unconditionally; any
/// other pending turn commits only when the way is clear and the agent is
/// inside the snap window, and then snaps to the cell center so no
/// fractional offset leaks into the new axis. Otherwise the agent steps
/// along its current direction, wrapping at the grid edges, or stays put
/// when walled in. An uncommitted turn intent stays pending.
pub fn resolve(mover: &mut Mover, maze: &Maze) -> MoveOutcome {
    if mover.pending != mover.dir {
        if mover.pending == mover.dir.reverse() {
            mover.dir = mover.pending;
        } else if let Some(next) = probe(mover, maze, mover.pending) {
            if geometry::is_on_grid(mover.pos, ON_GRID_TOLERANCE) {
                mover.dir = mover.pending;
                mover.pos = cell_center(round_to_cell(next));
                return MoveOutcome::Moved;
            }
        }
    }

    match probe(mover, maze, mover.dir) {
        Some(next) => {
            mover.pos = maze.wrap_point(next);
            MoveOutcome::Moved
        }
        None => MoveOutcome::Blocked,
    }
}
