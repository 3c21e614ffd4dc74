/// Presentation layer: diff-based terminal renderer.
///
/// How it works:
///   1. `Surface` / `ScoreBoard` calls write into the `front` buffer
///   2. `present()` compares each glyph with `back` (what the terminal shows)
///   3. Only changed glyphs are emitted, batched with `queue!`, flushed once
///   4. `front` is copied into `back`
///
/// `front` is never cleared between frames: the game draws incrementally,
/// so the buffer is the board's memory.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};

use crate::config::{BoardConfig, ThemeConfig};
use crate::domain::grid::Cell;
use super::present::{ScoreBoard, Sprite, Surface};

// ── Glyph: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
struct Glyph {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Glyph {
    const BASE_BG: Color = Color::Rgb { r: 22, g: 22, b: 35 };

    const BLANK: Glyph = Glyph { ch: ' ', fg: Color::White, bg: Glyph::BASE_BG };

    /// Sentinel used to invalidate the back buffer.
    const INVALID: Glyph = Glyph { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    const fn new(ch: char, fg: Color, bg: Color) -> Self {
        Glyph { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Glyphs ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Glyph::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        self.width = w;
        self.height = h;
        self.cells = vec![Glyph::BLANK; w * h];
    }

    fn set(&mut self, x: usize, y: usize, g: Glyph) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = g;
        }
    }

    fn get(&self, x: usize, y: usize) -> Glyph {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Glyph::BLANK
        }
    }

    /// Write a string at (x, y). Each char occupies 1 column.
    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            if x + i >= self.width { break; }
            self.set(x + i, y, Glyph::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: usize, bg: Color) {
        for x in 0..self.width {
            self.set(x, y, Glyph::new(' ', Color::White, bg));
        }
    }
}

// ── Renderer ──

/// Each board cell is 2 terminal columns wide, which keeps cells roughly square.
const CELL_W: usize = 2;

const HUD_ROW: usize = 0;
/// First terminal row / column inside the border.
const BOARD_ROW: usize = 2;
const BOARD_COL: usize = 1;

const HUD_BG: Color = Color::Rgb { r: 20, g: 20, b: 60 };
const BORDER_FG: Color = Color::Rgb { r: 120, g: 120, b: 150 };

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    board: BoardConfig,
    theme: ThemeConfig,
    score: u32,
    high_score: u32,
    speed_ms: u64,
    paused: bool,
}

impl Renderer {
    pub fn new(board: BoardConfig, theme: ThemeConfig) -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            board,
            theme,
            score: 0,
            high_score: 0,
            speed_ms: 0,
            paused: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Glyph::BASE_BG),
            Clear(ClearType::All)
        )?;

        let (tw, th) = terminal::size()?;
        self.resize_buffers(tw as usize, th as usize);

        let (need_w, need_h) = self.required_size();
        if self.term_w < need_w || self.term_h < need_h {
            tracing::warn!(
                term_w = self.term_w, term_h = self.term_h, need_w, need_h,
                "terminal smaller than the board; edges will be clipped"
            );
        }
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        execute!(
            self.writer,
            ResetColor,
            cursor::Show,
            terminal::LeaveAlternateScreen
        )?;
        terminal::disable_raw_mode()
    }

    /// Pick up a terminal resize. Returns true when the buffers were reset
    /// and the caller must redraw the whole board.
    pub fn check_resize(&mut self) -> io::Result<bool> {
        let (tw, th) = terminal::size()?;
        if tw as usize == self.term_w && th as usize == self.term_h {
            return Ok(false);
        }
        self.resize_buffers(tw as usize, th as usize);
        queue!(self.writer, SetBackgroundColor(Glyph::BASE_BG), Clear(ClearType::All))?;
        Ok(true)
    }

    pub fn set_paused(&mut self, paused: bool) {
        self.paused = paused;
        self.compose_footer();
    }

    /// Emit every glyph that changed since the last call.
    pub fn present(&mut self) -> io::Result<()> {
        self.flush_diff()?;
        self.back.cells.copy_from_slice(&self.front.cells);
        Ok(())
    }

    // ── Layout ──

    /// Terminal size needed to show the whole board plus HUD and footer.
    fn required_size(&self) -> (usize, usize) {
        let w = BOARD_COL + self.board.cols() * CELL_W + 1;
        let h = BOARD_ROW + self.board.rows() + 3;
        (w, h)
    }

    fn resize_buffers(&mut self, w: usize, h: usize) {
        self.term_w = w;
        self.term_h = h;
        self.front.resize(w, h);
        self.back.resize(w, h);
        // Force full repaint: back ≠ front for every glyph.
        self.back.cells.fill(Glyph::INVALID);
    }

    /// Terminal position of a board cell. Cells off the drawable grid
    /// (including the `x == width` edge the wall test still accepts) have none.
    fn screen_pos(&self, cell: Cell) -> Option<(usize, usize)> {
        if cell.x < 0 || cell.y < 0 {
            return None;
        }
        let gx = (cell.x / self.board.step) as usize;
        let gy = (cell.y / self.board.step) as usize;
        if gx >= self.board.cols() || gy >= self.board.rows() {
            return None;
        }
        Some((BOARD_COL + gx * CELL_W, BOARD_ROW + gy))
    }

    fn put_cell(&mut self, cell: Cell, left: Glyph, right: Glyph) {
        if let Some((col, row)) = self.screen_pos(cell) {
            self.front.set(col, row, left);
            self.front.set(col + 1, row, right);
        }
    }

    // ── Compose: build front buffer content ──

    fn compose_border(&mut self) {
        let inner_w = self.board.cols() * CELL_W;
        let rows = self.board.rows();
        let top = BOARD_ROW - 1;
        let bottom = BOARD_ROW + rows;
        let right = BOARD_COL + inner_w;
        let bg = Glyph::BASE_BG;

        for x in BOARD_COL..right {
            self.front.set(x, top, Glyph::new('─', BORDER_FG, bg));
            self.front.set(x, bottom, Glyph::new('─', BORDER_FG, bg));
        }
        for y in BOARD_ROW..bottom {
            self.front.set(0, y, Glyph::new('│', BORDER_FG, bg));
            self.front.set(right, y, Glyph::new('│', BORDER_FG, bg));
        }
        self.front.set(0, top, Glyph::new('┌', BORDER_FG, bg));
        self.front.set(right, top, Glyph::new('┐', BORDER_FG, bg));
        self.front.set(0, bottom, Glyph::new('└', BORDER_FG, bg));
        self.front.set(right, bottom, Glyph::new('┘', BORDER_FG, bg));
    }

    fn compose_hud(&mut self) {
        let hud = format!(
            " SNAKE   Score:{:<5}  High:{:<5}  Tick:{}ms ",
            self.score, self.high_score, self.speed_ms,
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);
    }

    fn compose_footer(&mut self) {
        let row = BOARD_ROW + self.board.rows() + 2;
        self.front.fill_row(row, Glyph::BASE_BG);
        if self.paused {
            let msg = " PAUSED   Esc/P: Resume   Q: Quit ";
            self.front.put_str(0, row, msg, Color::Black, Color::Rgb { r: 200, g: 180, b: 50 });
        } else {
            let help = " ←↑↓→/WASD: Steer   Esc/P: Pause   Q/Ctrl+C: Quit";
            self.front.put_str(0, row, help, Color::DarkGrey, Glyph::BASE_BG);
        }
    }

    // ── Diff flush: only write changed glyphs ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Glyph::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer,
            SetForegroundColor(Color::White),
            SetBackgroundColor(Glyph::BASE_BG),
        )?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let g = self.front.get(x, y);
                if g == self.back.get(x, y) {
                    continue;
                }

                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if g.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(g.fg))?;
                    last_fg = g.fg;
                }
                if g.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(g.bg))?;
                    last_bg = g.bg;
                }
                queue!(self.writer, Print(g.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }
}

impl Surface for Renderer {
    fn fill_board(&mut self) {
        let bg = self.theme.board;
        for gy in 0..self.board.rows() {
            for x in 0..self.board.cols() * CELL_W {
                self.front.set(BOARD_COL + x, BOARD_ROW + gy, Glyph::new(' ', Color::White, bg));
            }
        }
        self.compose_border();
        self.compose_hud();
        self.compose_footer();
    }

    fn paint(&mut self, cell: Cell, sprite: Sprite) {
        let t = self.theme;
        let (left, right) = match sprite {
            Sprite::SnakeBody => (Glyph::new(' ', t.snake, t.snake), Glyph::new(' ', t.snake, t.snake)),
            Sprite::SnakeHead => (Glyph::new(' ', t.snake_head, t.snake_head), Glyph::new(' ', t.snake_head, t.snake_head)),
            Sprite::Food => (Glyph::new('[', t.food_border, t.food), Glyph::new(']', t.food_border, t.food)),
        };
        self.put_cell(cell, left, right);
    }

    fn erase(&mut self, cell: Cell) {
        let blank = Glyph::new(' ', Color::White, self.theme.board);
        self.put_cell(cell, blank, blank);
    }
}

impl ScoreBoard for Renderer {
    fn show_score(&mut self, score: u32, high_score: u32) {
        self.score = score;
        self.high_score = high_score;
        self.compose_hud();
    }

    fn show_speed(&mut self, speed_ms: u64) {
        self.speed_ms = speed_ms;
        self.compose_hud();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn renderer() -> Renderer {
        let board = BoardConfig { width: 100, height: 50, step: 10 };
        let mut r = Renderer::new(board, ThemeConfig::default());
        r.front.resize(40, 12);
        r.back.resize(40, 12);
        r
    }

    #[test]
    fn default_board_fits_80x24() {
        let r = Renderer::new(crate::config::GameConfig::default().board, ThemeConfig::default());
        let (w, h) = r.required_size();
        assert!(w <= 80 && h <= 24, "needs {w}x{h}");
    }

    #[test]
    fn cell_to_screen_mapping() {
        let r = renderer();
        assert_eq!(r.screen_pos(Cell::new(0, 0)), Some((BOARD_COL, BOARD_ROW)));
        assert_eq!(r.screen_pos(Cell::new(30, 20)), Some((BOARD_COL + 6, BOARD_ROW + 2)));
        assert_eq!(r.screen_pos(Cell::new(90, 40)), Some((BOARD_COL + 18, BOARD_ROW + 4)));
    }

    #[test]
    fn edge_and_negative_cells_are_clipped() {
        let r = renderer();
        assert_eq!(r.screen_pos(Cell::new(100, 0)), None);
        assert_eq!(r.screen_pos(Cell::new(0, 50)), None);
        assert_eq!(r.screen_pos(Cell::new(-10, 0)), None);
    }

    #[test]
    fn paint_and_erase_write_two_columns() {
        let mut r = renderer();
        r.fill_board();
        let theme = ThemeConfig::default();
        r.paint(Cell::new(10, 10), Sprite::Food);
        let (col, row) = (BOARD_COL + 2, BOARD_ROW + 1);
        assert_eq!(r.front.get(col, row).ch, '[');
        assert_eq!(r.front.get(col + 1, row).ch, ']');
        assert_eq!(r.front.get(col, row).bg, theme.food);

        r.erase(Cell::new(10, 10));
        assert_eq!(r.front.get(col, row), Glyph::new(' ', Color::White, theme.board));
        assert_eq!(r.front.get(col + 1, row), Glyph::new(' ', Color::White, theme.board));
    }

    #[test]
    fn hud_shows_scores() {
        let mut r = renderer();
        r.show_score(7, 12);
        let row: String = (0..r.front.width).map(|x| r.front.get(x, HUD_ROW).ch).collect();
        assert!(row.contains("Score:7"), "{row}");
        assert!(row.contains("High:12"), "{row}");
    }

    #[test]
    fn border_frames_the_board() {
        let mut r = renderer();
        r.fill_board();
        assert_eq!(r.front.get(0, BOARD_ROW - 1).ch, '┌');
        assert_eq!(r.front.get(BOARD_COL + 20, BOARD_ROW + 5).ch, '┘');
        assert_eq!(r.front.get(0, BOARD_ROW + 2).ch, '│');
    }
}
