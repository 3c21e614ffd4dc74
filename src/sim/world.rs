/// GameState: everything one run of the game owns, plus the high score
/// that outlives runs.
///
/// ## Runs
///
/// A run starts with a fresh snake, fresh food, score 0 and the initial
/// speed. A terminal collision ends it and `start_run()` immediately begins
/// the next one; only `high_score`, `run`, `tick` and the RNG carry over.
///
/// ## Input
///
/// Key handlers only ever call `request_direction()`, which writes the
/// single `pending_direction` slot. The step function commits it.

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::config::{BoardConfig, GameConfig, GrowthTiming, SnakeConfig, SpeedConfig};
use crate::domain::food::Food;
use crate::domain::grid::{opposite, random_cell, Direction};
use crate::domain::snake::Snake;

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Phase {
    Running,
    /// Collision happened; the body is frozen until the restart.
    Terminal,
}

pub struct GameState {
    // ── Entities ──
    pub snake: Snake,
    pub food: Food,

    // ── Scoring ──
    pub score: u32,
    pub high_score: u32,
    /// Current tick interval in milliseconds.
    pub speed_ms: u64,

    // ── Steering ──
    pub current_direction: Direction,
    pub pending_direction: Direction,
    /// Set by a food collision; consumed by the next tick under deferred growth.
    pub grow_next: bool,

    // ── Meta ──
    pub phase: Phase,
    pub run: u32,
    pub tick: u64,
    pub paused: bool,

    pub rng: StdRng,

    // ── Rules (copied from config, immutable) ──
    pub board: BoardConfig,
    pub snake_cfg: SnakeConfig,
    pub speed_cfg: SpeedConfig,
    pub growth: GrowthTiming,
}

// ── Construction ──

impl GameState {
    /// New state seeded from `config.seed`, or from entropy when unset.
    pub fn new(config: &GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        Self::with_rng(config, rng)
    }

    pub fn with_rng(config: &GameConfig, mut rng: StdRng) -> Self {
        let board = config.board;
        let snake = spawn_snake(&mut rng, board, config.snake.initial_length);
        let food = Food::random(&mut rng, board.width, board.height, board.step);

        GameState {
            snake,
            food,
            score: 0,
            high_score: 0,
            speed_ms: config.speed.initial_ms,
            current_direction: Direction::Up,
            pending_direction: Direction::Up,
            grow_next: false,
            phase: Phase::Running,
            run: 1,
            tick: 0,
            paused: false,
            rng,
            board,
            snake_cfg: config.snake,
            speed_cfg: config.speed,
            growth: config.growth,
        }
    }

    /// Discard the current snake, food and per-run counters and begin a new
    /// run. The high score survives.
    pub fn start_run(&mut self) {
        let board = self.board;
        self.snake = spawn_snake(&mut self.rng, board, self.snake_cfg.initial_length);
        self.food = Food::random(&mut self.rng, board.width, board.height, board.step);
        self.score = 0;
        self.speed_ms = self.speed_cfg.initial_ms;
        self.current_direction = Direction::Up;
        self.pending_direction = Direction::Up;
        self.grow_next = false;
        self.phase = Phase::Running;
        self.run += 1;
    }
}

// ── Input ──

impl GameState {
    /// Queue a turn for the next tick. Reversals against the direction the
    /// snake is currently moving are dropped; otherwise the last call wins.
    pub fn request_direction(&mut self, dir: Direction) {
        if !opposite(dir, self.current_direction) {
            self.pending_direction = dir;
        }
    }

    pub fn toggle_pause(&mut self) {
        self.paused = !self.paused;
    }
}

/// Vertical snake from a random seed cell. The seed is drawn from a board
/// shortened by the body length so the whole body starts on the board.
fn spawn_snake(rng: &mut StdRng, board: BoardConfig, length: usize) -> Snake {
    let trail = (length.saturating_sub(1)) as i32 * board.step;
    let head = random_cell(rng, board.width, board.height - trail, board.step);
    Snake::vertical(head, length, board.step, board.width, board.height)
}
