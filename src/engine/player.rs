use crate::constants::{
    DOT_POINTS, PLAYER_BASE_SPEED, POWERED_MULTIPLIER, POWER_DURATION_TICKS, POWER_PILL_POINTS,
    STARTING_LIVES,
};
use crate::engine::movement::{self, MoveOutcome, Mover};
use crate::geometry::round_to_cell;
use crate::maze::Maze;
use crate::types::{Direction, PlayerView, SimEvent, Tile, Vec2};

/// The player-controlled agent: shared movement state plus the round
/// counters. Score, lives and level are owned here and never reset by a
/// respawn; only a new-round construction starts them over.
#[derive(Clone, Debug)]
pub struct Player {
    pub(crate) mover: Mover,
    pub(crate) facing_deg: i32,
    pub(crate) score: i32,
    pub(crate) lives: i32,
    pub(crate) level: i32,
    pub(crate) powered: bool,
    pub(crate) powered_until_tick: u64,
}

impl Player {
    pub fn new(x: f32, y: f32) -> Player {
        Player {
            mover: Mover::new(x, y, Direction::Down, PLAYER_BASE_SPEED),
            facing_deg: facing_degrees(Direction::Down),
            score: 0,
            lives: STARTING_LIVES,
            level: 1,
            powered: false,
            powered_until_tick: 0,
        }
    }

    pub fn score(&self) -> i32 {
        self.score
    }

    pub fn lives(&self) -> i32 {
        self.lives
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn powered(&self) -> bool {
        self.powered
    }

    pub fn facing_deg(&self) -> i32 {
        self.facing_deg
    }

    pub fn position(&self) -> Vec2 {
        self.mover.pos
    }

    pub fn direction(&self) -> Direction {
        self.mover.dir
    }

    /// Direction intent from the input layer; takes effect per the turning
    /// rule of the movement model.
    pub fn set_intent(&mut self, dir: Direction) {
        self.mover.pending = dir;
    }

    pub fn intent(&self) -> Direction {
        self.mover.pending
    }

    /// Level is owned by the external progression logic; the core only
    /// stores and reports it.
    pub fn set_level(&mut self, level: i32, events: &mut Vec<SimEvent>) {
        self.level = level;
        events.push(SimEvent::LevelChanged { level });
    }

    /// One life lost: back to the spawn state, one died pulse per call.
    pub fn kill(&mut self, events: &mut Vec<SimEvent>) {
        self.lives -= 1;
        self.mover.reborn();
        events.push(SimEvent::LivesChanged { lives: self.lives });
        events.push(SimEvent::PlayerDied {
            lives_left: self.lives,
        });
    }

    /// One tick: expire the powered state, resolve motion, then eat
    /// whatever sits on the reached cell. Returns whether the player moved.
    pub fn advance(&mut self, tick: u64, maze: &mut Maze, events: &mut Vec<SimEvent>) -> bool {
        if self.powered && tick >= self.powered_until_tick {
            self.powered = false;
            events.push(SimEvent::PoweredChanged { powered: false });
        }

        if movement::resolve(&mut self.mover, maze) == MoveOutcome::Blocked {
            return false;
        }
        self.facing_deg = facing_degrees(self.mover.dir);

        let cell = maze.wrap_cell(round_to_cell(self.mover.pos));
        match maze.consume(cell) {
            Tile::Dot => {
                self.eat(DOT_POINTS * self.multiplier(), events);
                events.push(SimEvent::CellConsumed {
                    x: cell.x,
                    y: cell.y,
                    item: Tile::Dot,
                });
            }
            Tile::PowerPill => {
                // Energize first: the pill that flips the flag already
                // scores at the powered rate.
                self.energize(tick, events);
                self.eat(POWER_PILL_POINTS * self.multiplier(), events);
                events.push(SimEvent::CellConsumed {
                    x: cell.x,
                    y: cell.y,
                    item: Tile::PowerPill,
                });
            }
            _ => {}
        }
        true
    }

    pub fn view(&self) -> PlayerView {
        PlayerView {
            x: self.mover.pos.x,
            y: self.mover.pos.y,
            dir: self.mover.dir,
            facing_deg: self.facing_deg,
            score: self.score,
            lives: self.lives,
            level: self.level,
            powered: self.powered,
        }
    }

    fn multiplier(&self) -> i32 {
        if self.powered {
            POWERED_MULTIPLIER
        } else {
            1
        }
    }

    fn eat(&mut self, points: i32, events: &mut Vec<SimEvent>) {
        self.score += points;
        events.push(SimEvent::ScoreChanged { score: self.score });
    }

    fn energize(&mut self, tick: u64, events: &mut Vec<SimEvent>) {
        self.powered_until_tick = tick + POWER_DURATION_TICKS;
        if !self.powered {
            self.powered = true;
            events.push(SimEvent::PoweredChanged { powered: true });
        }
    }
}

fn facing_degrees(dir: Direction) -> i32 {
    match dir {
        Direction::Right => 0,
        Direction::Down => 90,
        Direction::Left => 180,
        Direction::Up => 270,
    }
}
