use std::collections::VecDeque;

use crate::constants::{
    CHASE_REPLAN_TICKS, HOMED_DELAY_TICKS, ON_GRID_TOLERANCE, OPPORTUNIST_RANGE,
    PURSUER_BASE_SPEED, SCATTER_DELAY_TICKS,
};
use crate::engine::movement::{self, MoveOutcome, Mover};
use crate::engine::player::Player;
use crate::geometry::{self, round_to_cell};
use crate::maze::Maze;
use crate::pathfinder;
use crate::rng::Rng;
use crate::types::{Cell, Direction, Mood, PursuerRole, PursuerView, SimEvent, Vec2, Waypoint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StepOutcome {
    Moved,
    Blocked,
    /// Collision while not frightened: the player lost a life.
    CaughtPlayer,
    /// Collision while frightened: this pursuer went home.
    Captured,
}

/// An autonomous pursuit agent: shared movement state plus a mood state
/// machine, a per-role target heuristic and a cached waypoint path.
#[derive(Clone, Debug)]
pub struct Pursuer {
    pub(crate) mover: Mover,
    pub(crate) role: PursuerRole,
    pub(crate) corner: Cell,
    pub(crate) mood: Mood,
    pub(crate) target: Cell,
    pub(crate) path: VecDeque<Waypoint>,
    pub(crate) replan: bool,
}

impl Pursuer {
    pub fn new(x: f32, y: f32, dir: Direction, role: PursuerRole, corner: Cell) -> Pursuer {
        let mover = Mover::new(x, y, dir, PURSUER_BASE_SPEED);
        let target = mover.home_cell();
        Pursuer {
            mover,
            role,
            corner,
            mood: Mood::Homed {
                until_tick: HOMED_DELAY_TICKS,
            },
            target,
            path: VecDeque::new(),
            replan: false,
        }
    }

    pub fn role(&self) -> PursuerRole {
        self.role
    }

    pub fn mood(&self) -> Mood {
        self.mood
    }

    pub fn target(&self) -> Cell {
        self.target
    }

    pub fn corner(&self) -> Cell {
        self.corner
    }

    pub fn position(&self) -> Vec2 {
        self.mover.pos
    }

    pub fn direction(&self) -> Direction {
        self.mover.dir
    }

    /// Back to the pen: spawn state restored, path dropped, mood re-enters
    /// Homed with a fresh deadline.
    pub fn reborn(&mut self, tick: u64) {
        self.mover.reborn();
        self.path.clear();
        self.replan = false;
        self.mood = Mood::Homed {
            until_tick: tick + HOMED_DELAY_TICKS,
        };
    }

    /// One tick: mood transitions, then steering (random walk in the pen,
    /// path following otherwise), then the collision check, then motion.
    /// A collision settles the tick by itself; motion is skipped.
    pub fn advance(
        &mut self,
        tick: u64,
        maze: &Maze,
        player: &mut Player,
        rng: &mut Rng,
        events: &mut Vec<SimEvent>,
    ) -> StepOutcome {
        self.update_mood(tick, player.powered());

        if geometry::is_on_grid(self.mover.pos, ON_GRID_TOLERANCE) {
            if matches!(self.mood, Mood::Homed { .. }) {
                self.wander(maze, rng);
            } else {
                self.follow_path(maze, player);
            }
        }

        let here = maze.wrap_cell(round_to_cell(self.mover.pos));
        let there = maze.wrap_cell(round_to_cell(player.position()));
        if here == there {
            self.path.clear();
            if matches!(self.mood, Mood::Frightened) {
                self.reborn(tick);
                events.push(SimEvent::PursuerCaught { role: self.role });
                return StepOutcome::Captured;
            }
            player.kill(events);
            return StepOutcome::CaughtPlayer;
        }

        match movement::resolve(&mut self.mover, maze) {
            MoveOutcome::Moved => StepOutcome::Moved,
            MoveOutcome::Blocked => StepOutcome::Blocked,
        }
    }

    pub fn view(&self) -> PursuerView {
        PursuerView {
            role: self.role,
            x: self.mover.pos.x,
            y: self.mover.pos.y,
            dir: self.mover.dir,
            mood: self.mood,
            target: self.target,
            path: self.path.iter().copied().collect(),
        }
    }

    fn update_mood(&mut self, tick: u64, player_powered: bool) {
        self.mood = match self.mood {
            Mood::Homed { until_tick } if tick >= until_tick => Mood::Scatter {
                until_tick: tick + SCATTER_DELAY_TICKS,
            },
            Mood::Scatter { until_tick } if tick >= until_tick => Mood::Chase {
                replan_at_tick: tick + CHASE_REPLAN_TICKS,
            },
            Mood::Chase { .. } if player_powered => Mood::Frightened,
            Mood::Chase { replan_at_tick } if tick >= replan_at_tick => {
                self.replan = true;
                Mood::Chase {
                    replan_at_tick: tick + CHASE_REPLAN_TICKS,
                }
            }
            Mood::Frightened if !player_powered => Mood::Chase {
                replan_at_tick: tick + CHASE_REPLAN_TICKS,
            },
            mood => mood,
        };
    }

    /// Aimless pen wandering: keep the pending direction while it is
    /// passable, otherwise re-pick among the other three. Retries are
    /// bounded so a walled-in pursuer cannot spin the tick.
    fn wander(&mut self, maze: &Maze, rng: &mut Rng) {
        for _ in 0..16 {
            if movement::probe(&self.mover, maze, self.mover.pending).is_some() {
                return;
            }
            self.mover.pending = random_direction_excluding(rng, self.mover.pending);
        }
    }

    fn follow_path(&mut self, maze: &Maze, player: &Player) {
        if self.replan || self.path.is_empty() {
            self.target = self.select_target(maze, player);
            let start = maze.wrap_cell(round_to_cell(self.mover.pos));
            // Not-found keeps the previous cache; a stale route beats a
            // frozen pursuer.
            if let Some(path) = pathfinder::find_path(start, self.target, maze) {
                self.path = path.into();
            }
            self.replan = false;
        }

        let here = maze.wrap_cell(round_to_cell(self.mover.pos));
        if self.path.front().map(|w| w.cell) == Some(here) {
            self.path.pop_front();
        }
        if let Some(next) = self.path.front() {
            self.mover.pending = next.dir;
        }
    }

    fn select_target(&self, maze: &Maze, player: &Player) -> Cell {
        match self.mood {
            Mood::Scatter { .. } => self.corner,
            Mood::Frightened => self.mover.home_cell(),
            _ => self.chase_target(maze, player),
        }
    }

    fn chase_target(&self, maze: &Maze, player: &Player) -> Cell {
        match self.role {
            PursuerRole::Leader => self.look_ahead(0, maze, player),
            PursuerRole::AmbusherA => self.look_ahead(4, maze, player),
            PursuerRole::AmbusherB => self.look_ahead(2, maze, player),
            PursuerRole::Opportunist => {
                let here = maze.wrap_cell(round_to_cell(self.mover.pos));
                let there = maze.wrap_cell(round_to_cell(player.position()));
                if geometry::manhattan(here, there) > OPPORTUNIST_RANGE {
                    self.corner
                } else {
                    self.look_ahead(1, maze, player)
                }
            }
        }
    }

    /// `n` cells ahead of the player along its facing; reflected to the
    /// opposite side when the straight projection leaves the grid, then
    /// walked onward until an open cell turns up. Leaving the grid during
    /// that walk falls back to this pursuer's home cell.
    fn look_ahead(&self, n: i32, maze: &Maze, player: &Player) -> Cell {
        let dir = player.direction();
        let from = maze.wrap_cell(round_to_cell(player.position()));
        let mut cell = project(from, dir, n);
        if maze.is_off_grid(cell) {
            cell = project(from, dir, -n);
        }
        while !maze.is_open(cell) {
            cell = geometry::offset(cell, dir);
            if maze.is_off_grid(cell) {
                return self.mover.home_cell();
            }
        }
        cell
    }
}

fn project(from: Cell, dir: Direction, n: i32) -> Cell {
    let v = dir.vector();
    Cell {
        x: from.x + v.x as i32 * n,
        y: from.y + v.y as i32 * n,
    }
}

fn random_direction_excluding(rng: &mut Rng, exclude: Direction) -> Direction {
    let mut options = [exclude; 3];
    let mut count = 0;
    for dir in Direction::ALL {
        if dir != exclude {
            options[count] = dir;
            count += 1;
        }
    }
    options[rng.pick_index(options.len())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::STARTING_LIVES;

    fn open_room() -> Maze {
        Maze::parse(&[
            "##########", //
            "#........#", //
            "#........#", //
            "#........#", //
            "#........#", //
            "##########",
        ])
    }

    fn leader_at(x: f32, y: f32) -> Pursuer {
        Pursuer::new(x, y, Direction::Left, PursuerRole::Leader, Cell { x: 1, y: 1 })
    }

    #[test]
    fn mood_ladder_runs_homed_scatter_chase_on_deadlines() {
        let maze = open_room();
        let mut rng = Rng::new(1);
        let mut events = Vec::new();
        let mut player = Player::new(8.0, 4.0);
        let mut pursuer = leader_at(1.0, 1.0);

        assert!(matches!(pursuer.mood(), Mood::Homed { .. }));
        for tick in 1..=HOMED_DELAY_TICKS {
            pursuer.advance(tick, &maze, &mut player, &mut rng, &mut events);
        }
        assert!(matches!(pursuer.mood(), Mood::Scatter { .. }));

        let scatter_until = match pursuer.mood() {
            Mood::Scatter { until_tick } => until_tick,
            _ => unreachable!(),
        };
        assert_eq!(scatter_until, HOMED_DELAY_TICKS + SCATTER_DELAY_TICKS);
        for tick in HOMED_DELAY_TICKS + 1..=scatter_until {
            pursuer.advance(tick, &maze, &mut player, &mut rng, &mut events);
        }
        assert!(matches!(pursuer.mood(), Mood::Chase { .. }));
    }

    #[test]
    fn frightened_is_slaved_to_the_powered_flag_both_ways() {
        let maze = open_room();
        let mut rng = Rng::new(1);
        let mut events = Vec::new();
        let mut player = Player::new(8.0, 4.0);
        let mut pursuer = leader_at(1.0, 1.0);
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };

        player.powered = true;
        player.powered_until_tick = u64::MAX;
        pursuer.advance(1, &maze, &mut player, &mut rng, &mut events);
        assert!(matches!(pursuer.mood(), Mood::Frightened));

        player.powered = false;
        pursuer.advance(2, &maze, &mut player, &mut rng, &mut events);
        assert!(matches!(pursuer.mood(), Mood::Chase { .. }));
    }

    #[test]
    fn chase_deadline_requests_a_replan_without_changing_mood() {
        let player = Player::new(8.0, 4.0);
        let mut pursuer = leader_at(1.0, 1.0);
        pursuer.mood = Mood::Chase { replan_at_tick: 5 };
        pursuer.update_mood(5, player.powered());
        assert!(pursuer.replan);
        match pursuer.mood() {
            Mood::Chase { replan_at_tick } => {
                assert_eq!(replan_at_tick, 5 + CHASE_REPLAN_TICKS)
            }
            mood => panic!("unexpected mood {mood:?}"),
        }
    }

    #[test]
    fn opportunist_far_from_the_player_targets_its_corner() {
        let maze = open_room();
        let corner = Cell { x: 8, y: 4 };
        let mut player = Player::new(1.0, 1.0);
        player.mover.pending = Direction::Right;
        let pursuer = Pursuer::new(
            7.0,
            4.0,
            Direction::Left,
            PursuerRole::Opportunist,
            corner,
        );
        // Manhattan distance 9 exceeds the range; the corner wins.
        let mut chasing = pursuer.clone();
        chasing.mood = Mood::Chase { replan_at_tick: 10_000 };
        assert_eq!(chasing.chase_target(&maze, &player), corner);
    }

    #[test]
    fn opportunist_near_the_player_uses_the_short_lookahead() {
        let maze = open_room();
        let corner = Cell { x: 8, y: 4 };
        let mut player = Player::new(3.0, 1.0);
        player.mover.dir = Direction::Right;
        let mut pursuer = Pursuer::new(
            3.0,
            3.0,
            Direction::Left,
            PursuerRole::Opportunist,
            corner,
        );
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };
        assert_eq!(pursuer.chase_target(&maze, &player), Cell { x: 4, y: 1 });
    }

    #[test]
    fn leader_targets_the_player_cell() {
        let maze = open_room();
        let mut player = Player::new(4.0, 2.0);
        player.mover.dir = Direction::Left;
        let mut pursuer = leader_at(1.0, 1.0);
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };
        assert_eq!(pursuer.chase_target(&maze, &player), Cell { x: 4, y: 2 });
    }

    #[test]
    fn lookahead_reflects_when_the_projection_exits_the_grid() {
        let maze = open_room();
        let mut player = Player::new(7.0, 2.0);
        player.mover.dir = Direction::Right;
        let mut pursuer = Pursuer::new(
            1.0,
            1.0,
            Direction::Left,
            PursuerRole::AmbusherA,
            Cell { x: 1, y: 1 },
        );
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };
        // Four ahead of x=7 leaves the room, so the projection flips to
        // four behind.
        assert_eq!(pursuer.chase_target(&maze, &player), Cell { x: 3, y: 2 });
    }

    #[test]
    fn lookahead_walks_past_walls_to_the_next_open_cell() {
        // Two ahead of the player lands inside the wall block; the walk
        // continues to the open cell beyond it.
        let maze = Maze::parse(&[
            "#######", //
            "#..##.#", //
            "#######",
        ]);
        let mut player = Player::new(1.0, 1.0);
        player.mover.dir = Direction::Right;
        let mut pursuer = Pursuer::new(
            5.0,
            1.0,
            Direction::Left,
            PursuerRole::AmbusherB,
            Cell { x: 1, y: 1 },
        );
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };
        assert_eq!(pursuer.chase_target(&maze, &player), Cell { x: 5, y: 1 });
    }

    #[test]
    fn lookahead_falls_back_home_when_the_walk_leaves_the_grid() {
        // Everything below the player is walled all the way down, so the
        // walk runs off the grid and the pursuer points home.
        let maze = Maze::parse(&[
            "#####", //
            "#...#", //
            "#.#.#", //
            "#.#.#", //
            "#####",
        ]);
        let mut player = Player::new(2.0, 1.0);
        player.mover.dir = Direction::Down;
        let mut pursuer = Pursuer::new(
            3.0,
            3.0,
            Direction::Left,
            PursuerRole::AmbusherB,
            Cell { x: 1, y: 1 },
        );
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };
        assert_eq!(pursuer.chase_target(&maze, &player), Cell { x: 3, y: 3 });
    }

    #[test]
    fn scatter_targets_the_corner_and_frightened_targets_home() {
        let maze = open_room();
        let player = Player::new(8.0, 4.0);
        let mut pursuer = Pursuer::new(
            2.0,
            2.0,
            Direction::Left,
            PursuerRole::Leader,
            Cell { x: 8, y: 1 },
        );
        pursuer.mood = Mood::Scatter { until_tick: 10_000 };
        assert_eq!(pursuer.select_target(&maze, &player), Cell { x: 8, y: 1 });
        pursuer.mood = Mood::Frightened;
        assert_eq!(pursuer.select_target(&maze, &player), Cell { x: 2, y: 2 });
    }

    #[test]
    fn a_chase_collision_costs_the_player_a_life() {
        let maze = open_room();
        let mut rng = Rng::new(1);
        let mut events = Vec::new();
        let mut player = Player::new(5.0, 2.0);
        let mut pursuer = leader_at(5.0, 2.0);
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };

        let outcome = pursuer.advance(1, &maze, &mut player, &mut rng, &mut events);
        assert_eq!(outcome, StepOutcome::CaughtPlayer);
        assert_eq!(player.lives(), STARTING_LIVES - 1);
        assert_eq!(player.position().x, 5.0);
        assert_eq!(player.position().y, 2.0);
        assert!(pursuer.path.is_empty());
    }

    #[test]
    fn a_frightened_collision_sends_the_pursuer_home_instead() {
        let maze = open_room();
        let mut rng = Rng::new(1);
        let mut events = Vec::new();
        let mut player = Player::new(5.0, 2.0);
        player.powered = true;
        player.powered_until_tick = u64::MAX;
        let mut pursuer = leader_at(2.0, 4.0);
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };
        pursuer.mover.pos = Vec2 { x: 5.0, y: 2.0 };

        let outcome = pursuer.advance(7, &maze, &mut player, &mut rng, &mut events);
        assert_eq!(outcome, StepOutcome::Captured);
        assert_eq!(player.lives(), STARTING_LIVES);
        assert_eq!(pursuer.position().x, 2.0);
        assert_eq!(pursuer.position().y, 4.0);
        assert!(matches!(pursuer.mood(), Mood::Homed { until_tick } if until_tick == 7 + HOMED_DELAY_TICKS));
        assert!(events
            .iter()
            .any(|event| matches!(event, SimEvent::PursuerCaught { role: PursuerRole::Leader })));
    }

    #[test]
    fn homed_pursuers_random_walk_instead_of_pathing() {
        let maze = Maze::parse(&[
            "#######", //
            "#.....#", //
            "#######",
        ]);
        let mut rng = Rng::new(5);
        let mut events = Vec::new();
        let mut player = Player::new(5.0, 1.0);
        let mut pursuer = leader_at(1.0, 1.0);

        // Thirty ticks covers at most three cells, so the player at x=5
        // stays out of reach while the pen behavior is observed.
        for tick in 1..=30 {
            pursuer.advance(tick, &maze, &mut player, &mut rng, &mut events);
            assert!(matches!(pursuer.mood(), Mood::Homed { .. }));
            assert!(pursuer.path.is_empty());
        }
        assert_eq!(player.lives(), STARTING_LIVES);
    }

    #[test]
    fn a_failed_replan_keeps_the_previous_path() {
        let maze = Maze::parse(&[
            "#######", //
            "#...#.#", //
            "#######",
        ]);
        let mut player = Player::new(5.0, 1.0);
        player.mover.dir = Direction::Left;
        let mut pursuer = leader_at(1.0, 1.0);
        pursuer.mood = Mood::Chase { replan_at_tick: 10_000 };
        let stale = VecDeque::from(vec![Waypoint {
            cell: Cell { x: 2, y: 1 },
            dir: Direction::Right,
        }]);
        pursuer.path = stale.clone();
        pursuer.replan = true;

        // The player's cell is sealed off; the stale route stays.
        pursuer.follow_path(&maze, &player);
        assert!(!pursuer.replan);
        assert_eq!(pursuer.path, stale);
    }

    #[test]
    fn path_following_pops_the_reached_waypoint_and_steers_to_the_next() {
        let maze = open_room();
        let player = Player::new(8.0, 4.0);
        let mut pursuer = leader_at(2.0, 2.0);
        pursuer.mood = Mood::Scatter { until_tick: 10_000 };
        pursuer.path = VecDeque::from(vec![
            Waypoint {
                cell: Cell { x: 2, y: 2 },
                dir: Direction::Right,
            },
            Waypoint {
                cell: Cell { x: 2, y: 3 },
                dir: Direction::Down,
            },
        ]);

        pursuer.follow_path(&maze, &player);
        assert_eq!(pursuer.path.len(), 1);
        assert_eq!(pursuer.mover.pending, Direction::Down);
    }
}
