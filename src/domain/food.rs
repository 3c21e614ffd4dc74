/// Food: one active cell, replaced whenever it is eaten.
///
/// Respawn does not look at the snake. Food can land on the body; that
/// overlap is accepted and covered by the step tests.

use rand::Rng;

use super::grid::{random_cell, Cell};

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Food {
    cell: Cell,
}

impl Food {
    #[cfg(test)]
    pub fn at(cell: Cell) -> Self {
        Food { cell }
    }

    pub fn random<R: Rng + ?Sized>(rng: &mut R, width: i32, height: i32, step: i32) -> Self {
        Food { cell: random_cell(rng, width, height, step) }
    }

    pub fn respawn<R: Rng + ?Sized>(&mut self, rng: &mut R, width: i32, height: i32, step: i32) {
        self.cell = random_cell(rng, width, height, step);
    }

    #[inline]
    pub fn position(&self) -> Cell {
        self.cell
    }
}
