use std::collections::VecDeque;

use crate::geometry::offset;
use crate::maze::Maze;
use crate::types::{Cell, Direction, Waypoint};

/// Breadth-first search from `start` to `goal` over integral cells.
/// Returns the shortest unweighted path as waypoints (ties broken by the
/// `Direction::ALL` expansion order), or `None` when the goal is
/// unreachable. Grid edges are hard boundaries here: wrap-around is a
/// property of continuous motion only, so a path never crosses a seam.
pub fn find_path(start: Cell, goal: Cell, maze: &Maze) -> Option<Vec<Waypoint>> {
    if maze.is_off_grid(start) || maze.is_off_grid(goal) {
        return None;
    }

    let mut visited = vec![vec![false; maze.width() as usize]; maze.height() as usize];
    let mut frontier: VecDeque<(Cell, Vec<Waypoint>)> = VecDeque::new();
    visited[start.y as usize][start.x as usize] = true;
    frontier.push_back((start, Vec::new()));

    while let Some((cell, path)) = frontier.pop_front() {
        if cell == goal {
            return Some(path);
        }
        for dir in Direction::ALL {
            let next = offset(cell, dir);
            if !maze.is_open(next) || visited[next.y as usize][next.x as usize] {
                continue;
            }
            visited[next.y as usize][next.x as usize] = true;
            let mut next_path = path.clone();
            next_path.push(Waypoint { cell: next, dir });
            frontier.push_back((next, next_path));
        }
    }

    None
}
