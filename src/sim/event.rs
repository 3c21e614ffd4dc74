/// Events emitted during a simulation step.
/// The presentation layer consumes these to redraw only what changed.

use crate::domain::grid::Cell;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum CrashCause {
    Wall,
    SelfBite,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GameEvent {
    /// The head moved; `vacated` is the tail cell freed this tick, if any.
    Advanced { head: Cell, old_head: Cell, vacated: Option<Cell> },
    FoodEaten { at: Cell },
    FoodSpawned { at: Cell },
    ScoreChanged { score: u32, high_score: u32 },
    SpeedChanged { speed_ms: u64 },
    /// Terminal collision. Carries the final numbers of the run that ended.
    RunEnded { cause: CrashCause, score: u32, length: usize },
    /// A fresh snake and food are on the board.
    RunStarted { run: u32 },
}
