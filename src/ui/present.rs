/// Presentation seam between the simulation and any output device.
///
/// The step function reports what changed as `GameEvent`s; `present()`
/// turns them into per-cell draw calls on a `Surface` and value updates on a
/// `ScoreBoard`. Only a new run triggers a full redraw.

use crate::domain::grid::Cell;
use crate::sim::event::GameEvent;
use crate::sim::world::GameState;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Sprite {
    SnakeHead,
    SnakeBody,
    Food,
}

/// Something that can draw single board cells.
pub trait Surface {
    /// Clear the whole board to its background.
    fn fill_board(&mut self);
    fn paint(&mut self, cell: Cell, sprite: Sprite);
    fn erase(&mut self, cell: Cell);
}

/// Score / status sink.
pub trait ScoreBoard {
    fn show_score(&mut self, score: u32, high_score: u32);
    fn show_speed(&mut self, speed_ms: u64);
}

/// Draw everything from scratch.
pub fn redraw<O: Surface + ScoreBoard>(world: &GameState, out: &mut O) {
    out.fill_board();
    let food = world.food.position();
    if !world.snake.contains(food) {
        out.paint(food, Sprite::Food);
    }
    let head = world.snake.head();
    for cell in world.snake.body() {
        let sprite = if cell == head { Sprite::SnakeHead } else { Sprite::SnakeBody };
        out.paint(cell, sprite);
    }
    out.show_score(world.score, world.high_score);
    out.show_speed(world.speed_ms);
}

/// Apply one step's events. `world` is the state after the step.
pub fn present<O: Surface + ScoreBoard>(world: &GameState, events: &[GameEvent], out: &mut O) {
    for event in events {
        match *event {
            GameEvent::Advanced { head, old_head, vacated } => {
                // Order matters when the head moves into the cell the tail
                // just left, or when the snake is a single cell.
                out.paint(old_head, Sprite::SnakeBody);
                if let Some(tail) = vacated {
                    if tail == world.food.position() {
                        out.paint(tail, Sprite::Food);
                    } else {
                        out.erase(tail);
                    }
                }
                out.paint(head, Sprite::SnakeHead);
            }
            GameEvent::FoodSpawned { at } => {
                if !world.snake.contains(at) {
                    out.paint(at, Sprite::Food);
                }
            }
            GameEvent::ScoreChanged { score, high_score } => out.show_score(score, high_score),
            GameEvent::SpeedChanged { speed_ms } => out.show_speed(speed_ms),
            GameEvent::RunStarted { .. } => redraw(world, out),
            GameEvent::FoodEaten { .. } | GameEvent::RunEnded { .. } => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::{BoardConfig, GameConfig};
    use crate::domain::food::Food;
    use crate::domain::grid::Direction;
    use crate::domain::snake::Snake;
    use crate::sim::step::step;

    #[derive(Debug, PartialEq, Eq)]
    enum Op {
        Fill,
        Paint(Cell, Sprite),
        Erase(Cell),
        Score(u32, u32),
        Speed(u64),
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        fn fill_board(&mut self) { self.ops.push(Op::Fill); }
        fn paint(&mut self, cell: Cell, sprite: Sprite) { self.ops.push(Op::Paint(cell, sprite)); }
        fn erase(&mut self, cell: Cell) { self.ops.push(Op::Erase(cell)); }
    }

    impl ScoreBoard for Recorder {
        fn show_score(&mut self, score: u32, high_score: u32) { self.ops.push(Op::Score(score, high_score)); }
        fn show_speed(&mut self, speed_ms: u64) { self.ops.push(Op::Speed(speed_ms)); }
    }

    fn world() -> GameState {
        let cfg = GameConfig {
            board: BoardConfig { width: 600, height: 600, step: 10 },
            ..GameConfig::default()
        };
        let mut w = GameState::with_rng(&cfg, StdRng::seed_from_u64(5));
        w.snake = Snake::vertical(Cell::new(300, 300), 3, 10, 600, 600);
        w.food = Food::at(Cell::new(0, 0));
        w
    }

    #[test]
    fn plain_move_touches_three_cells() {
        let mut w = world();
        let events = step(&mut w);
        let mut rec = Recorder::default();
        present(&w, &events, &mut rec);
        assert_eq!(rec.ops, vec![
            Op::Paint(Cell::new(300, 300), Sprite::SnakeBody),
            Op::Erase(Cell::new(300, 320)),
            Op::Paint(Cell::new(300, 290), Sprite::SnakeHead),
        ]);
    }

    #[test]
    fn eating_repaints_food_and_score() {
        let mut w = world();
        w.food = Food::at(Cell::new(300, 290));
        let events = step(&mut w);
        let mut rec = Recorder::default();
        present(&w, &events, &mut rec);

        assert!(rec.ops.contains(&Op::Score(1, 1)));
        let food = w.food.position();
        if !w.snake.contains(food) {
            assert!(rec.ops.contains(&Op::Paint(food, Sprite::Food)));
        }
        assert!(!rec.ops.contains(&Op::Fill));
    }

    #[test]
    fn new_run_redraws_everything() {
        let mut w = world();
        w.current_direction = Direction::Left;
        w.pending_direction = Direction::Left;
        let mut events = vec![];
        for _ in 0..31 {
            events = step(&mut w);
        }
        let mut rec = Recorder::default();
        present(&w, &events, &mut rec);

        assert_eq!(rec.ops.first(), Some(&Op::Fill));
        let painted_snake = rec.ops.iter()
            .filter(|op| matches!(op, Op::Paint(_, Sprite::SnakeHead | Sprite::SnakeBody)))
            .count();
        assert_eq!(painted_snake, w.snake.len());
        assert!(rec.ops.contains(&Op::Score(0, 0)));
        assert!(rec.ops.contains(&Op::Speed(100)));
    }

    #[test]
    fn vacated_food_cell_keeps_food() {
        // Food under the tail: when the tail leaves, the food shows again.
        let mut w = world();
        w.food = Food::at(Cell::new(300, 320));
        let events = step(&mut w);
        let mut rec = Recorder::default();
        present(&w, &events, &mut rec);
        assert!(rec.ops.contains(&Op::Paint(Cell::new(300, 320), Sprite::Food)));
        assert!(!rec.ops.contains(&Op::Erase(Cell::new(300, 320))));
    }

    #[test]
    fn single_cell_snake_moves_cleanly() {
        let mut w = world();
        w.snake = Snake::vertical(Cell::new(100, 100), 1, 10, 600, 600);
        let events = step(&mut w);
        let mut rec = Recorder::default();
        present(&w, &events, &mut rec);
        assert_eq!(rec.ops, vec![
            Op::Paint(Cell::new(100, 100), Sprite::SnakeBody),
            Op::Erase(Cell::new(100, 100)),
            Op::Paint(Cell::new(100, 90), Sprite::SnakeHead),
        ]);
    }
}
