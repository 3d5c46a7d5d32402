pub const TICK_RATE: u32 = 20;

pub const PLAYER_BASE_SPEED: f32 = 0.1;
pub const PURSUER_BASE_SPEED: f32 = 0.1;

pub const ON_GRID_TOLERANCE: f32 = 0.3;

pub const STARTING_LIVES: i32 = 3;
pub const DOT_POINTS: i32 = 10;
pub const POWER_PILL_POINTS: i32 = 50;
pub const POWERED_MULTIPLIER: i32 = 2;

pub const POWER_DURATION_TICKS: u64 = 15 * TICK_RATE as u64;
pub const HOMED_DELAY_TICKS: u64 = 3 * TICK_RATE as u64;
pub const SCATTER_DELAY_TICKS: u64 = 15 * TICK_RATE as u64;
pub const CHASE_REPLAN_TICKS: u64 = 15 * TICK_RATE as u64;

pub const OPPORTUNIST_RANGE: i32 = 8;
