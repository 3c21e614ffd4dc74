/// Grid math: cells, directions, stepping and bounds.
///
/// Coordinates are in board units, not grid indices: every cell sits on a
/// multiple of the step size. A 600×600 board with step 10 holds 60×60 cells.

use rand::Rng;

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct Cell {
    pub x: i32,
    pub y: i32,
}

impl Cell {
    pub const fn new(x: i32, y: i32) -> Self {
        Cell { x, y }
    }
}

#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    #[cfg(test)]
    pub const ALL: [Direction; 4] = [Direction::Up, Direction::Down, Direction::Left, Direction::Right];

    #[cfg(test)]
    pub fn reverse(self) -> Direction {
        match self {
            Direction::Up => Direction::Down,
            Direction::Down => Direction::Up,
            Direction::Left => Direction::Right,
            Direction::Right => Direction::Left,
        }
    }

    /// Unit offset for one step in this direction.
    fn delta(self) -> (i32, i32) {
        match self {
            Direction::Up    => (0, -1),
            Direction::Down  => (0, 1),
            Direction::Left  => (-1, 0),
            Direction::Right => (1, 0),
        }
    }
}

/// Antiparallel pairs, unordered.
const OPPOSITES: [(Direction, Direction); 2] = [
    (Direction::Up, Direction::Down),
    (Direction::Left, Direction::Right),
];

/// Are `a` and `b` antiparallel? Symmetric in its arguments.
pub fn opposite(a: Direction, b: Direction) -> bool {
    OPPOSITES.iter().any(|&(p, q)| (a == p && b == q) || (a == q && b == p))
}

/// The cell one step away from `cell` in `dir`.
pub fn move_cell(cell: Cell, dir: Direction, step: i32) -> Cell {
    let (dx, dy) = dir.delta();
    Cell::new(cell.x + dx * step, cell.y + dy * step)
}

/// Wall test. A cell exactly on `width` / `height` still counts as inside;
/// only strictly greater values (or negatives) are out.
pub fn out_of_bounds(cell: Cell, width: i32, height: i32) -> bool {
    cell.x < 0 || cell.x > width || cell.y < 0 || cell.y > height
}

/// Step-aligned random cell, uniform over `[0, (extent - step) / step] * step`
/// on each axis.
pub fn random_cell<R: Rng + ?Sized>(rng: &mut R, width: i32, height: i32, step: i32) -> Cell {
    let max_col = ((width - step) / step).max(0);
    let max_row = ((height - step) / step).max(0);
    Cell::new(
        rng.gen_range(0..=max_col) * step,
        rng.gen_range(0..=max_row) * step,
    )
}
