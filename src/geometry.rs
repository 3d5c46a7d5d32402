use crate::types::{Cell, Direction, Vec2};

pub fn round_to_cell(p: Vec2) -> Cell {
    Cell {
        x: p.x.round() as i32,
        y: p.y.round() as i32,
    }
}

pub fn cell_center(c: Cell) -> Vec2 {
    Vec2 {
        x: c.x as f32,
        y: c.y as f32,
    }
}

/// True when the position is within `tolerance` of its rounded cell on
/// both axes. This is the snap window during which a pending turn may be
/// committed.
pub fn is_on_grid(p: Vec2, tolerance: f32) -> bool {
    let c = round_to_cell(p);
    (p.x - c.x as f32).abs() < tolerance && (p.y - c.y as f32).abs() < tolerance
}

pub fn add(a: Vec2, b: Vec2) -> Vec2 {
    Vec2 {
        x: a.x + b.x,
        y: a.y + b.y,
    }
}

pub fn scale(v: Vec2, n: f32) -> Vec2 {
    Vec2 {
        x: v.x * n,
        y: v.y * n,
    }
}

pub fn offset(c: Cell, dir: Direction) -> Cell {
    match dir {
        Direction::Up => Cell { x: c.x, y: c.y - 1 },
        Direction::Down => Cell { x: c.x, y: c.y + 1 },
        Direction::Left => Cell { x: c.x - 1, y: c.y },
        Direction::Right => Cell { x: c.x + 1, y: c.y },
    }
}

pub fn manhattan(a: Cell, b: Cell) -> i32 {
    (a.x - b.x).abs() + (a.y - b.y).abs()
}
