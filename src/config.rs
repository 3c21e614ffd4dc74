/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory (or CWD).
/// Missing file or missing keys fall back to defaults; a file that does not
/// parse is reported and ignored. Values that parse but cannot describe a
/// playable board are a startup error.

use std::path::PathBuf;

use anyhow::{bail, ensure};
use crossterm::style::Color;
use serde::Deserialize;

// ── Public Config Struct ──

/// Immutable game configuration, built once at startup and passed down.
#[derive(Clone, Debug)]
pub struct GameConfig {
    pub board: BoardConfig,
    pub snake: SnakeConfig,
    pub speed: SpeedConfig,
    pub growth: GrowthTiming,
    pub theme: ThemeConfig,
    pub gamepad: GamepadConfig,
    pub seed: Option<u64>,
}

/// Board extent in board units; `step` is the cell edge length.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BoardConfig {
    pub width: i32,
    pub height: i32,
    pub step: i32,
}

impl BoardConfig {
    /// Number of cell columns the board draws.
    pub fn cols(&self) -> usize {
        (self.width / self.step) as usize
    }

    pub fn rows(&self) -> usize {
        (self.height / self.step) as usize
    }
}

#[derive(Clone, Copy, Debug)]
pub struct SnakeConfig {
    pub initial_length: usize,
}

/// Tick interval progression, in milliseconds.
#[derive(Clone, Copy, Debug)]
pub struct SpeedConfig {
    pub initial_ms: u64,
    pub decrement_ms: u64,
    pub min_ms: u64,      // floor for the tick interval
    pub speedup_every: u32, // score multiple that triggers a speed-up
}

/// When the snake gets its extra cell after eating.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GrowthTiming {
    /// Tail is kept on the tick after the food was eaten.
    Deferred,
    /// Tail is kept on the eating tick itself.
    Immediate,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ThemeConfig {
    pub board: Color,
    pub snake: Color,
    pub snake_head: Color,
    pub food: Color,
    pub food_border: Color,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        ThemeConfig {
            board: Color::Rgb { r: 240, g: 248, b: 255 },     // aliceblue
            snake: Color::Rgb { r: 0, g: 128, b: 0 },         // green
            snake_head: Color::Rgb { r: 0, g: 100, b: 0 },    // darkgreen
            food: Color::Rgb { r: 255, g: 0, b: 0 },          // red
            food_border: Color::Rgb { r: 255, g: 255, b: 0 }, // yellow
        }
    }
}

#[derive(Clone, Debug)]
pub struct GamepadConfig {
    pub pause: Vec<String>,
    pub quit: Vec<String>,
}

// ── TOML Schema (with serde defaults) ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    board: TomlBoard,
    #[serde(default)]
    snake: TomlSnake,
    #[serde(default)]
    speed: TomlSpeed,
    #[serde(default)]
    rules: TomlRules,
    #[serde(default)]
    theme: TomlTheme,
    #[serde(default)]
    gamepad: TomlGamepad,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlBoard {
    #[serde(default = "default_width")]
    width: i32,
    #[serde(default = "default_height")]
    height: i32,
    #[serde(default = "default_step")]
    step: i32,
}

#[derive(Deserialize, Debug)]
struct TomlSnake {
    #[serde(default = "default_initial_length")]
    initial_length: usize,
}

#[derive(Deserialize, Debug)]
struct TomlSpeed {
    #[serde(default = "default_initial_ms")]
    initial_ms: u64,
    #[serde(default = "default_decrement_ms")]
    decrement_ms: u64,
    #[serde(default = "default_min_ms")]
    min_ms: u64,
    #[serde(default = "default_speedup_every")]
    speedup_every: u32,
}

#[derive(Deserialize, Debug)]
struct TomlRules {
    #[serde(default = "default_growth")]
    growth: GrowthTiming,
}

/// Colour names; anything left out keeps the built-in palette.
#[derive(Deserialize, Debug, Default)]
struct TomlTheme {
    board: Option<String>,
    snake: Option<String>,
    snake_head: Option<String>,
    food: Option<String>,
    food_border: Option<String>,
}

#[derive(Deserialize, Debug)]
struct TomlGamepad {
    #[serde(default = "default_pause_buttons")]
    pause: Vec<String>,
    #[serde(default = "default_quit_buttons")]
    quit: Vec<String>,
}

#[derive(Deserialize, Debug, Default)]
struct TomlGeneral {
    seed: Option<u64>,
}

// ── Defaults ──

fn default_width() -> i32 { 380 }
fn default_height() -> i32 { 180 }
fn default_step() -> i32 { 10 }
fn default_initial_length() -> usize { 5 }
fn default_initial_ms() -> u64 { 100 }
fn default_decrement_ms() -> u64 { 10 }
fn default_min_ms() -> u64 { 20 }
fn default_speedup_every() -> u32 { 5 }
fn default_growth() -> GrowthTiming { GrowthTiming::Deferred }

fn default_pause_buttons() -> Vec<String> { vec!["Start".into()] }
fn default_quit_buttons() -> Vec<String> { vec!["Select".into()] }

impl Default for TomlBoard {
    fn default() -> Self {
        TomlBoard { width: default_width(), height: default_height(), step: default_step() }
    }
}

impl Default for TomlSnake {
    fn default() -> Self {
        TomlSnake { initial_length: default_initial_length() }
    }
}

impl Default for TomlSpeed {
    fn default() -> Self {
        TomlSpeed {
            initial_ms: default_initial_ms(),
            decrement_ms: default_decrement_ms(),
            min_ms: default_min_ms(),
            speedup_every: default_speedup_every(),
        }
    }
}

impl Default for TomlRules {
    fn default() -> Self {
        TomlRules { growth: default_growth() }
    }
}

impl Default for TomlGamepad {
    fn default() -> Self {
        TomlGamepad { pause: default_pause_buttons(), quit: default_quit_buttons() }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            board: BoardConfig { width: default_width(), height: default_height(), step: default_step() },
            snake: SnakeConfig { initial_length: default_initial_length() },
            speed: SpeedConfig {
                initial_ms: default_initial_ms(),
                decrement_ms: default_decrement_ms(),
                min_ms: default_min_ms(),
                speedup_every: default_speedup_every(),
            },
            growth: default_growth(),
            theme: ThemeConfig::default(),
            gamepad: GamepadConfig { pause: default_pause_buttons(), quit: default_quit_buttons() },
            seed: None,
        }
    }
}

// ── Loading ──

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) current working directory,
    /// (3) `~/.local/share/snake`.
    pub fn load() -> anyhow::Result<Self> {
        let search_dirs = candidate_dirs();
        let toml_cfg = load_toml(&search_dirs);
        Self::from_toml(toml_cfg)
    }

    /// Parse a config document directly. Syntax errors are returned, not
    /// swallowed.
    #[cfg(test)]
    pub fn from_toml_str(text: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        let cfg: TomlConfig = toml::from_str(text).context("config.toml is not valid TOML")?;
        Self::from_toml(cfg)
    }

    fn from_toml(t: TomlConfig) -> anyhow::Result<Self> {
        let defaults = ThemeConfig::default();
        let theme = ThemeConfig {
            board: theme_color("board", t.theme.board.as_deref(), defaults.board)?,
            snake: theme_color("snake", t.theme.snake.as_deref(), defaults.snake)?,
            snake_head: theme_color("snake_head", t.theme.snake_head.as_deref(), defaults.snake_head)?,
            food: theme_color("food", t.theme.food.as_deref(), defaults.food)?,
            food_border: theme_color("food_border", t.theme.food_border.as_deref(), defaults.food_border)?,
        };

        let cfg = GameConfig {
            board: BoardConfig {
                width: t.board.width,
                height: t.board.height,
                step: t.board.step,
            },
            snake: SnakeConfig { initial_length: t.snake.initial_length },
            speed: SpeedConfig {
                initial_ms: t.speed.initial_ms,
                decrement_ms: t.speed.decrement_ms,
                min_ms: t.speed.min_ms,
                speedup_every: t.speed.speedup_every,
            },
            growth: t.rules.growth,
            theme,
            gamepad: GamepadConfig { pause: t.gamepad.pause, quit: t.gamepad.quit },
            seed: t.general.seed,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Reject values the game loop cannot run with.
    pub fn validate(&self) -> anyhow::Result<()> {
        let b = &self.board;
        ensure!(b.step > 0, "board.step must be positive (got {})", b.step);
        ensure!(
            b.width >= b.step && b.height >= b.step,
            "board {}x{} is smaller than one {} unit cell", b.width, b.height, b.step
        );
        ensure!(
            b.width % b.step == 0 && b.height % b.step == 0,
            "board {}x{} is not a multiple of step {}", b.width, b.height, b.step
        );

        let len = self.snake.initial_length;
        ensure!(len >= 1, "snake.initial_length must be at least 1");
        ensure!(
            len as i64 * b.step as i64 <= b.height as i64,
            "a {len} cell snake does not fit vertically on a board {} high", b.height
        );

        let s = &self.speed;
        ensure!(s.min_ms > 0, "speed.min_ms must be positive");
        ensure!(
            s.initial_ms >= s.min_ms,
            "speed.initial_ms ({}) is below speed.min_ms ({})", s.initial_ms, s.min_ms
        );
        ensure!(s.speedup_every > 0, "speed.speedup_every must be positive");
        Ok(())
    }
}

fn theme_color(key: &str, value: Option<&str>, fallback: Color) -> anyhow::Result<Color> {
    match value {
        None => Ok(fallback),
        Some(name) => match parse_color(name) {
            Some(c) => Ok(c),
            None => bail!("theme.{key}: unknown colour {name:?}"),
        },
    }
}

/// Accepts `#rrggbb`, a handful of CSS names, or any crossterm colour name.
pub fn parse_color(name: &str) -> Option<Color> {
    let trimmed = name.trim();
    if let Some(hex) = trimmed.strip_prefix('#') {
        if hex.len() != 6 || !hex.is_ascii() {
            return None;
        }
        let channel = |i: usize| u8::from_str_radix(&hex[i..i + 2], 16).ok();
        return Some(Color::Rgb { r: channel(0)?, g: channel(2)?, b: channel(4)? });
    }

    let key: String = trimmed
        .chars()
        .filter(|c| !matches!(c, '_' | '-' | ' '))
        .collect::<String>()
        .to_lowercase();
    let rgb = match key.as_str() {
        "aliceblue" => (240, 248, 255),
        "green" => (0, 128, 0),
        "darkgreen" => (0, 100, 0),
        "red" => (255, 0, 0),
        "yellow" => (255, 255, 0),
        "orange" => (255, 165, 0),
        "white" => (255, 255, 255),
        "black" => (0, 0, 0),
        "gray" | "grey" => (128, 128, 128),
        "navy" => (0, 0, 128),
        _ => return Color::try_from(trimmed).ok(),
    };
    Some(Color::Rgb { r: rgb.0, g: rgb.1, b: rgb.2 })
}

/// Candidate directories to search: exe dir + CWD + XDG data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/snake");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

/// Search for config.toml in candidate directories.
fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => {
                    tracing::debug!(path = %path.display(), "loaded config");
                    return cfg;
                }
                Err(e) => {
                    tracing::warn!(path = %path.display(), "config.toml parse error, using defaults: {e}");
                    return TomlConfig::default();
                }
            },
            Err(e) => {
                tracing::warn!("could not read {}: {e}", path.display());
            }
        }
    }
    TomlConfig::default()
}
