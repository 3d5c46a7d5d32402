use serde::Serialize;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    /// Canonical enumeration order. The pathfinder expands neighbors in
    /// exactly this order, so shortest-path ties resolve identically on
    /// every run.
    pub const ALL: [Direction; 4] = [
        Direction::Left,
        Direction::Right,
        Direction::Up,
        Direction::Down,
    ];

    pub fn vector(self) -> Vec2 {
        match self {
            Self::Left => Vec2 { x: -1.0, y: 0.0 },
            Self::Right => Vec2 { x: 1.0, y: 0.0 },
            Self::Up => Vec2 { x: 0.0, y: -1.0 },
            Self::Down => Vec2 { x: 0.0, y: 1.0 },
        }
    }

    pub fn reverse(self) -> Direction {
        match self {
            Self::Up => Self::Down,
            Self::Down => Self::Up,
            Self::Left => Self::Right,
            Self::Right => Self::Left,
        }
    }

    pub fn parse_move(value: &str) -> Option<Self> {
        match value {
            "up" => Some(Self::Up),
            "down" => Some(Self::Down),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }
}

/// Continuous position in grid-cell units; integral values sit exactly on
/// a cell center.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

/// An integral grid cell (a rounded position).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Tile {
    Empty,
    Wall,
    Dot,
    PowerPill,
}

/// One path step: the cell entered plus the direction used to get there.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct Waypoint {
    pub cell: Cell,
    pub dir: Direction,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PursuerRole {
    Leader,
    AmbusherA,
    AmbusherB,
    Opportunist,
}

/// Pursuer behavioral state. Timed states carry their tick deadline so
/// "advance N ticks" is deterministic without any wall clock.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum Mood {
    Homed {
        #[serde(rename = "untilTick")]
        until_tick: u64,
    },
    Scatter {
        #[serde(rename = "untilTick")]
        until_tick: u64,
    },
    Chase {
        #[serde(rename = "replanAtTick")]
        replan_at_tick: u64,
    },
    Frightened,
}

#[derive(Clone, Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SimEvent {
    CellConsumed {
        x: i32,
        y: i32,
        item: Tile,
    },
    PlayerDied {
        #[serde(rename = "livesLeft")]
        lives_left: i32,
    },
    ScoreChanged {
        score: i32,
    },
    LivesChanged {
        lives: i32,
    },
    LevelChanged {
        level: i32,
    },
    PoweredChanged {
        powered: bool,
    },
    PursuerCaught {
        role: PursuerRole,
    },
}

#[derive(Clone, Debug, Serialize)]
pub struct PlayerView {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    #[serde(rename = "facingDeg")]
    pub facing_deg: i32,
    pub score: i32,
    pub lives: i32,
    pub level: i32,
    pub powered: bool,
}

#[derive(Clone, Debug, Serialize)]
pub struct PursuerView {
    pub role: PursuerRole,
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub mood: Mood,
    pub target: Cell,
    pub path: Vec<Waypoint>,
}

#[derive(Clone, Debug, Serialize)]
pub struct Snapshot {
    pub tick: u64,
    pub player: PlayerView,
    pub pursuers: Vec<PursuerView>,
    #[serde(rename = "itemsLeft")]
    pub items_left: usize,
    pub events: Vec<SimEvent>,
}

/// Construction-time description of one pursuer.
#[derive(Clone, Copy, Debug)]
pub struct PursuerSetup {
    pub x: f32,
    pub y: f32,
    pub dir: Direction,
    pub role: PursuerRole,
    pub corner: Cell,
}
