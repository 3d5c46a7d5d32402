use crate::maze::Maze;
use crate::rng::Rng;
use crate::types::{Direction, PursuerSetup, SimEvent, Snapshot};

pub mod movement;
pub mod player;
pub mod pursuer;

pub use self::player::Player;
pub use self::pursuer::{Pursuer, StepOutcome};

/// One round of the chase: the maze, the player, the pursuers in a fixed
/// stable order, one seeded RNG and the event queue. Single-threaded and
/// tick-driven; determinism depends on tick count and seed only.
#[derive(Clone, Debug)]
pub struct Simulation {
    maze: Maze,
    player: Player,
    pursuers: Vec<Pursuer>,
    rng: Rng,
    tick: u64,
    events: Vec<SimEvent>,
}

impl Simulation {
    pub fn new(
        maze: Maze,
        player_spawn: (f32, f32),
        pursuers: Vec<PursuerSetup>,
        seed: u32,
    ) -> Simulation {
        let player = Player::new(player_spawn.0, player_spawn.1);
        let pursuers = pursuers
            .into_iter()
            .map(|setup| Pursuer::new(setup.x, setup.y, setup.dir, setup.role, setup.corner))
            .collect();
        Simulation {
            maze,
            player,
            pursuers,
            rng: Rng::new(seed),
            tick: 0,
            events: Vec::new(),
        }
    }

    /// Advances one tick: the player first, then each pursuer in
    /// construction order (the pursuers read the player's already-updated
    /// position). A kill mid-loop sends every pursuer home at once, the
    /// catcher included, before the remaining pursuers advance.
    pub fn step(&mut self) {
        self.tick += 1;
        let tick = self.tick;

        self.player.advance(tick, &mut self.maze, &mut self.events);

        for idx in 0..self.pursuers.len() {
            let outcome = self.pursuers[idx].advance(
                tick,
                &self.maze,
                &mut self.player,
                &mut self.rng,
                &mut self.events,
            );
            if outcome == StepOutcome::CaughtPlayer {
                for pursuer in &mut self.pursuers {
                    pursuer.reborn(tick);
                }
            }
        }
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn set_player_direction(&mut self, dir: Direction) {
        self.player.set_intent(dir);
    }

    pub fn set_level(&mut self, level: i32) {
        self.player.set_level(level, &mut self.events);
    }

    pub fn score(&self) -> i32 {
        self.player.score()
    }

    pub fn lives(&self) -> i32 {
        self.player.lives()
    }

    pub fn level(&self) -> i32 {
        self.player.level()
    }

    pub fn powered(&self) -> bool {
        self.player.powered()
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    /// Serializable view of the round. `include_events` drains the event
    /// queue into the snapshot; otherwise events stay queued for a later
    /// drain.
    pub fn build_snapshot(&mut self, include_events: bool) -> Snapshot {
        Snapshot {
            tick: self.tick,
            player: self.player.view(),
            pursuers: self.pursuers.iter().map(Pursuer::view).collect(),
            items_left: self.maze.remaining_items(),
            events: if include_events {
                std::mem::take(&mut self.events)
            } else {
                Vec::new()
            },
        }
    }
}
