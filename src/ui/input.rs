/// Keyboard input: drains crossterm events once per frame.
///
/// Steering is edge-triggered; every key press in the frame is reported in
/// order, so the last direction pressed before a tick is the one the game
/// keeps. Release events are ignored (Windows reports them, Unix does not).

use std::time::Duration;

use crossterm::event::{self, poll, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};

use crate::domain::grid::Direction;

// ── Key Constants ──

pub const KEYS_UP: &[KeyCode] = &[KeyCode::Up, KeyCode::Char('w'), KeyCode::Char('W')];
pub const KEYS_DOWN: &[KeyCode] = &[KeyCode::Down, KeyCode::Char('s'), KeyCode::Char('S')];
pub const KEYS_LEFT: &[KeyCode] = &[KeyCode::Left, KeyCode::Char('a'), KeyCode::Char('A')];
pub const KEYS_RIGHT: &[KeyCode] = &[KeyCode::Right, KeyCode::Char('d'), KeyCode::Char('D')];
pub const KEYS_PAUSE: &[KeyCode] = &[KeyCode::Esc, KeyCode::F(1), KeyCode::Char('p'), KeyCode::Char('P')];
pub const KEYS_QUIT: &[KeyCode] = &[KeyCode::Char('q'), KeyCode::Char('Q')];

/// Map a key code to a steering direction. Anything else is not steering.
pub fn direction_for(code: KeyCode) -> Option<Direction> {
    if KEYS_UP.contains(&code) {
        Some(Direction::Up)
    } else if KEYS_DOWN.contains(&code) {
        Some(Direction::Down)
    } else if KEYS_LEFT.contains(&code) {
        Some(Direction::Left)
    } else if KEYS_RIGHT.contains(&code) {
        Some(Direction::Right)
    } else {
        None
    }
}

fn is_ctrl_c(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
        && (key.code == KeyCode::Char('c') || key.code == KeyCode::Char('C'))
}

pub struct Keyboard {
    /// Presses collected during the most recent `drain_events()`, in order.
    presses: Vec<KeyEvent>,
}

impl Keyboard {
    pub fn new() -> Self {
        Keyboard { presses: Vec::with_capacity(8) }
    }

    /// Read all pending terminal events without blocking.
    pub fn drain_events(&mut self) -> std::io::Result<()> {
        self.presses.clear();
        while poll(Duration::ZERO)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Release {
                    self.presses.push(key);
                }
            }
        }
        Ok(())
    }

    /// Steering presses this frame, oldest first.
    pub fn directions(&self) -> impl Iterator<Item = Direction> + '_ {
        self.presses.iter().filter_map(|k| direction_for(k.code))
    }

    pub fn any_pressed(&self, codes: &[KeyCode]) -> bool {
        self.presses.iter().any(|k| codes.contains(&k.code))
    }

    pub fn quit_pressed(&self) -> bool {
        self.presses.iter().any(is_ctrl_c) || self.any_pressed(KEYS_QUIT)
    }

    pub fn pause_pressed(&self) -> bool {
        self.any_pressed(KEYS_PAUSE)
    }

    #[cfg(test)]
    fn push(&mut self, code: KeyCode, modifiers: KeyModifiers) {
        self.presses.push(KeyEvent::new(code, modifiers));
    }
}
