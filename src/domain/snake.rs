/// Snake body: ordered cells, tail at the front, head at the back.
///
/// `advance()` is the only operation that changes the body's topology.
/// Out-of-bounds results are reported, not rejected: the caller decides
/// what a wall hit means.

use std::collections::VecDeque;

use super::grid::{move_cell, out_of_bounds, Cell, Direction};

/// Outcome of one `advance()`.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Advance {
    pub head: Cell,
    pub old_head: Cell,
    /// Tail cell removed this move; `None` on a grow move.
    pub vacated: Option<Cell>,
    pub in_bounds: bool,
}

#[derive(Clone, Debug)]
pub struct Snake {
    body: VecDeque<Cell>,
    step: i32,
    width: i32,
    height: i32,
}

impl Snake {
    /// Vertical snake of `length` cells with its head at `head` and the
    /// rest of the body trailing downwards.
    pub fn vertical(head: Cell, length: usize, step: i32, width: i32, height: i32) -> Self {
        let length = length.max(1);
        let body = (0..length)
            .rev()
            .map(|i| Cell::new(head.x, head.y + i as i32 * step))
            .collect();
        Snake { body, step, width, height }
    }

    /// Snake from explicit cells, tail first.
    #[cfg(test)]
    pub fn from_cells(cells: &[Cell], step: i32, width: i32, height: i32) -> Self {
        assert!(!cells.is_empty(), "snake needs at least one cell");
        Snake { body: cells.iter().copied().collect(), step, width, height }
    }

    #[inline]
    pub fn head(&self) -> Cell {
        self.body[self.body.len() - 1]
    }

    #[inline]
    pub fn tail(&self) -> Cell {
        self.body[0]
    }

    pub fn len(&self) -> usize {
        self.body.len()
    }

    /// Cells from tail to head.
    pub fn body(&self) -> impl Iterator<Item = Cell> + '_ {
        self.body.iter().copied()
    }

    pub fn contains(&self, cell: Cell) -> bool {
        self.body.contains(&cell)
    }

    /// Push a new head one step in `dir`; drop the tail unless `grow`.
    pub fn advance(&mut self, dir: Direction, grow: bool) -> Advance {
        let old_head = self.head();
        let head = move_cell(old_head, dir, self.step);
        self.body.push_back(head);

        // Length stays >= 1: we just pushed, so there are at least two cells.
        let vacated = if grow { None } else { self.body.pop_front() };

        Advance {
            head,
            old_head,
            vacated,
            in_bounds: !out_of_bounds(head, self.width, self.height),
        }
    }

    /// Does `cell` overlap the body, ignoring the head slot?
    pub fn collides_with_self(&self, cell: Cell) -> bool {
        let n = self.body.len();
        self.body.iter().take(n - 1).any(|&c| c == cell)
    }
}
