/// The step function: advances the game by one tick.
///
/// Processing order:
///   1. Commit the pending direction (reversals are dropped)
///   2. Decide whether this is a grow tick
///   3. Advance the snake
///   4. Wall check        → end run, restart
///   5. Self-bite check   → end run, restart
///   6. Food check        → respawn food, score, speed-up
///
/// Scheduling the next tick is the caller's job; it reads `speed_ms`
/// after the step returns.

use crate::config::GrowthTiming;
use crate::domain::grid::{move_cell, opposite};
use super::event::{CrashCause, GameEvent};
use super::world::{GameState, Phase};

// ══════════════════════════════════════════════════════════════
// Main entry point
// ══════════════════════════════════════════════════════════════

pub fn step(world: &mut GameState) -> Vec<GameEvent> {
    if world.paused || world.phase != Phase::Running { return vec![]; }

    let mut events: Vec<GameEvent> = Vec::new();
    world.tick += 1;

    resolve_direction(world);

    let dir = world.current_direction;
    let grow = resolve_grow(world);
    let adv = world.snake.advance(dir, grow);

    let crash = if !adv.in_bounds {
        Some(CrashCause::Wall)
    } else if world.snake.collides_with_self(adv.head) {
        Some(CrashCause::SelfBite)
    } else {
        None
    };
    if let Some(cause) = crash {
        end_run(world, cause, &mut events);
        return events;
    }

    events.push(GameEvent::Advanced { head: adv.head, old_head: adv.old_head, vacated: adv.vacated });

    if adv.head == world.food.position() {
        resolve_food(world, &mut events);
    }

    events
}

// ══════════════════════════════════════════════════════════════
// Steering / growth
// ══════════════════════════════════════════════════════════════

fn resolve_direction(world: &mut GameState) {
    if !opposite(world.pending_direction, world.current_direction) {
        world.current_direction = world.pending_direction;
    }
}

/// Is the tail kept this tick?
fn resolve_grow(world: &mut GameState) -> bool {
    match world.growth {
        GrowthTiming::Deferred => std::mem::take(&mut world.grow_next),
        GrowthTiming::Immediate => {
            // Food lying on the tail: keeping the tail would put the head on
            // it, so this tick eats without growing.
            let ahead = move_cell(world.snake.head(), world.current_direction, world.board.step);
            ahead == world.food.position() && ahead != world.snake.tail()
        }
    }
}

// ══════════════════════════════════════════════════════════════
// Food / score / speed
// ══════════════════════════════════════════════════════════════

fn resolve_food(world: &mut GameState, events: &mut Vec<GameEvent>) {
    let eaten = world.food.position();
    let b = world.board;
    world.food.respawn(&mut world.rng, b.width, b.height, b.step);
    events.push(GameEvent::FoodEaten { at: eaten });
    events.push(GameEvent::FoodSpawned { at: world.food.position() });

    if world.growth == GrowthTiming::Deferred {
        world.grow_next = true;
    }

    world.score += 1;
    world.high_score = world.high_score.max(world.score);
    events.push(GameEvent::ScoreChanged { score: world.score, high_score: world.high_score });

    if world.score % world.speed_cfg.speedup_every == 0 {
        let next = next_speed(world.speed_ms, world.speed_cfg.decrement_ms, world.speed_cfg.min_ms);
        if next != world.speed_ms {
            world.speed_ms = next;
            events.push(GameEvent::SpeedChanged { speed_ms: next });
        }
    }
}

/// Shorter tick interval, never below `floor`.
pub fn next_speed(current: u64, decrement: u64, floor: u64) -> u64 {
    current.saturating_sub(decrement).max(floor)
}

// ══════════════════════════════════════════════════════════════
// Terminal collision → restart
// ══════════════════════════════════════════════════════════════

fn end_run(world: &mut GameState, cause: CrashCause, events: &mut Vec<GameEvent>) {
    world.phase = Phase::Terminal;
    let length = world.snake.len();
    events.push(GameEvent::RunEnded { cause, score: world.score, length });

    world.start_run();
    events.push(GameEvent::RunStarted { run: world.run });
    events.push(GameEvent::ScoreChanged { score: world.score, high_score: world.high_score });
    events.push(GameEvent::SpeedChanged { speed_ms: world.speed_ms });
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use crate::config::{BoardConfig, GameConfig};
    use crate::domain::food::Food;
    use crate::domain::grid::{Cell, Direction};
    use crate::domain::snake::Snake;

    fn config(growth: GrowthTiming) -> GameConfig {
        GameConfig {
            board: BoardConfig { width: 600, height: 600, step: 10 },
            growth,
            ..GameConfig::default()
        }
    }

    /// 600×600 board, length-5 snake with its head at (300, 300) moving up,
    /// food parked in the top-left corner.
    fn world(growth: GrowthTiming) -> GameState {
        let mut w = GameState::with_rng(&config(growth), StdRng::seed_from_u64(11));
        w.snake = Snake::vertical(Cell::new(300, 300), 5, 10, 600, 600);
        w.food = Food::at(Cell::new(0, 0));
        w
    }

    fn food_ahead(w: &mut GameState) {
        let ahead = move_cell(w.snake.head(), w.current_direction, 10);
        w.food = Food::at(ahead);
    }

    /// Move the food somewhere the head will not reach by going straight.
    fn park_food(w: &mut GameState) {
        w.food = Food::at(Cell::new(0, 0));
    }

    fn ended(events: &[GameEvent]) -> Option<CrashCause> {
        events.iter().find_map(|e| match e {
            GameEvent::RunEnded { cause, .. } => Some(*cause),
            _ => None,
        })
    }

    #[test]
    fn straight_up_hits_wall_on_tick_31() {
        let mut w = world(GrowthTiming::Deferred);
        for tick in 1..=30 {
            let ev = step(&mut w);
            assert_eq!(ended(&ev), None, "ended early on tick {tick}");
        }
        assert_eq!(w.snake.head(), Cell::new(300, 0));

        let ev = step(&mut w);
        assert_eq!(ended(&ev), Some(CrashCause::Wall));
        assert!(ev.contains(&GameEvent::RunStarted { run: 2 }));
        assert_eq!(w.phase, Phase::Running);
        assert_eq!(w.snake.len(), 5);
        assert_eq!(w.score, 0);
        assert_eq!(w.current_direction, Direction::Up);
    }

    #[test]
    fn immediate_growth_lengthens_on_eating_tick() {
        let mut w = world(GrowthTiming::Immediate);
        food_ahead(&mut w);

        let ev = step(&mut w);
        assert_eq!(w.score, 1);
        assert_eq!(w.snake.len(), 6);
        assert!(ev.contains(&GameEvent::FoodEaten { at: Cell::new(300, 290) }));

        park_food(&mut w);
        step(&mut w);
        assert_eq!(w.snake.len(), 6);
    }

    #[test]
    fn deferred_growth_lengthens_on_following_tick() {
        let mut w = world(GrowthTiming::Deferred);
        food_ahead(&mut w);

        step(&mut w);
        assert_eq!(w.score, 1);
        assert_eq!(w.snake.len(), 5);
        assert!(w.grow_next);

        park_food(&mut w);
        let ev = step(&mut w);
        assert_eq!(w.snake.len(), 6);
        assert!(matches!(ev[0], GameEvent::Advanced { vacated: None, .. }));

        step(&mut w);
        assert_eq!(w.snake.len(), 6);
    }

    #[test]
    fn eating_respawns_food() {
        let mut w = world(GrowthTiming::Deferred);
        food_ahead(&mut w);
        let ev = step(&mut w);
        let spawned = ev.iter().find_map(|e| match e {
            GameEvent::FoodSpawned { at } => Some(*at),
            _ => None,
        });
        assert_eq!(spawned, Some(w.food.position()));
        assert!(ev.contains(&GameEvent::ScoreChanged { score: 1, high_score: 1 }));
    }

    #[test]
    fn tight_loop_bites_self() {
        let mut w = world(GrowthTiming::Deferred);
        let mut results = vec![];
        for dir in [Direction::Right, Direction::Down, Direction::Left] {
            w.request_direction(dir);
            results.push(ended(&step(&mut w)));
        }
        assert_eq!(results, vec![None, None, Some(CrashCause::SelfBite)]);
        assert_eq!(w.run, 2);
    }

    #[test]
    fn reversal_is_rejected_at_commit() {
        let mut w = world(GrowthTiming::Deferred);
        w.current_direction = Direction::Right;
        w.pending_direction = Direction::Left;
        step(&mut w);
        assert_eq!(w.current_direction, Direction::Right);
        assert_eq!(w.snake.head(), Cell::new(310, 300));
    }

    #[test]
    fn turn_is_committed_on_next_tick() {
        let mut w = world(GrowthTiming::Deferred);
        w.request_direction(Direction::Left);
        assert_eq!(w.current_direction, Direction::Up);
        step(&mut w);
        assert_eq!(w.current_direction, Direction::Left);
        assert_eq!(w.snake.head(), Cell::new(290, 300));
    }

    #[test]
    fn high_score_survives_restarts() {
        let mut w = world(GrowthTiming::Deferred);
        let mut best_seen = 0;

        // Run 1: three foods, then drive into the left wall.
        for _ in 0..3 {
            food_ahead(&mut w);
            step(&mut w);
            best_seen = best_seen.max(w.score);
        }
        park_food(&mut w);
        w.request_direction(Direction::Left);
        while ended(&step(&mut w)).is_none() {}
        assert_eq!(w.score, 0);
        assert_eq!(w.high_score, 3);

        // Run 2: one food, then crash upwards.
        w.snake = Snake::vertical(Cell::new(300, 300), 5, 10, 600, 600);
        food_ahead(&mut w);
        step(&mut w);
        best_seen = best_seen.max(w.score);
        park_food(&mut w);
        while ended(&step(&mut w)).is_none() {}

        assert_eq!(w.high_score, 3);
        assert!(w.high_score >= best_seen);
        assert_eq!(w.run, 3);
    }

    #[test]
    fn restart_resets_length_regardless_of_previous_run() {
        let mut w = world(GrowthTiming::Immediate);
        for _ in 0..8 {
            food_ahead(&mut w);
            step(&mut w);
        }
        assert_eq!(w.snake.len(), 13);
        assert_eq!(w.score, 8);
        while ended(&step(&mut w)).is_none() {}
        assert_eq!(w.snake.len(), 5);
        assert_eq!(w.score, 0);
        assert_eq!(w.speed_ms, 100);
    }

    #[test]
    fn speed_up_every_fifth_food() {
        let mut w = world(GrowthTiming::Deferred);
        w.score = 4;
        food_ahead(&mut w);
        let ev = step(&mut w);
        assert_eq!(w.score, 5);
        assert_eq!(w.speed_ms, 90);
        assert!(ev.contains(&GameEvent::SpeedChanged { speed_ms: 90 }));

        food_ahead(&mut w);
        step(&mut w);
        assert_eq!(w.speed_ms, 90);
    }

    #[test]
    fn speed_is_clamped_to_floor() {
        let mut w = world(GrowthTiming::Deferred);
        w.score = 9;
        w.speed_ms = 25;
        food_ahead(&mut w);
        step(&mut w);
        assert_eq!(w.speed_ms, 20);

        w.score = 14;
        food_ahead(&mut w);
        let ev = step(&mut w);
        assert_eq!(w.speed_ms, 20);
        assert!(!ev.iter().any(|e| matches!(e, GameEvent::SpeedChanged { .. })));
    }

    #[test]
    fn next_speed_floor() {
        assert_eq!(next_speed(100, 10, 20), 90);
        assert_eq!(next_speed(25, 10, 20), 20);
        assert_eq!(next_speed(5, 10, 20), 20);
    }

    #[test]
    fn paused_step_does_nothing() {
        let mut w = world(GrowthTiming::Deferred);
        w.paused = true;
        assert!(step(&mut w).is_empty());
        assert_eq!(w.tick, 0);
        assert_eq!(w.snake.head(), Cell::new(300, 300));
    }

    #[test]
    fn food_on_body_is_not_eaten_until_head_reaches_it() {
        // Overlap with the body is allowed; only the head eats.
        let mut w = world(GrowthTiming::Deferred);
        w.food = Food::at(Cell::new(300, 320));
        step(&mut w);
        assert_eq!(w.score, 0);
        assert_eq!(w.food.position(), Cell::new(300, 320));
    }

    #[test]
    fn eating_food_on_the_tail_is_not_a_bite() {
        // 2×2 loop: moving up puts the head on the cell the tail leaves.
        let cells = [Cell::new(10, 0), Cell::new(0, 0), Cell::new(0, 10), Cell::new(10, 10)];
        for growth in [GrowthTiming::Immediate, GrowthTiming::Deferred] {
            let mut w = world(growth);
            w.snake = Snake::from_cells(&cells, 10, 600, 600);
            w.food = Food::at(Cell::new(10, 0));

            let ev = step(&mut w);
            assert_eq!(ended(&ev), None, "{growth:?}");
            assert_eq!(w.score, 1, "{growth:?}");
            assert_eq!(w.snake.head(), Cell::new(10, 0));
            assert_eq!(w.snake.len(), 4, "{growth:?}");
        }
    }

    #[test]
    fn food_can_spawn_on_body() {
        // 2×5 board fully covered by spawn candidates; a length-5 snake fills
        // half of it, so some seed must drop food onto the body.
        let cfg = GameConfig {
            board: BoardConfig { width: 20, height: 50, step: 10 },
            ..GameConfig::default()
        };
        let overlapped = (0..200u64).any(|seed| {
            let w = GameState::with_rng(&cfg, StdRng::seed_from_u64(seed));
            w.snake.contains(w.food.position())
        });
        assert!(overlapped);
    }
}
