/// Presentation layer: double-buffered, diff-based terminal renderer.
///
/// How it works:
///   1. Build the next frame into `front` (a grid of Cells)
///   2. Compare each cell with `back` (previous frame)
///   3. Only emit terminal commands for cells that changed
///   4. Commands are batched with `queue!`, flushed once at the end
///
/// This eliminates flicker caused by full-screen redraws.
///
/// One terminal cell covers one 32-unit map tile, with the map drawn
/// from the terminal origin; `cell_to_world` is the inverse mapping
/// used to turn a mouse click into an aim target.

use std::io::{self, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{
        DisableMouseCapture, EnableMouseCapture, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType, EnterAlternateScreen, LeaveAlternateScreen},
};
use glam::Vec2;

use crate::domain::entity::Facing;
use crate::domain::geometry::Rect;
use crate::sim::level::TILE;
use crate::sim::world::{Game, Mode, Session};

/// Convert a clicked terminal cell into world coordinates (cell center).
pub fn cell_to_world(col: u16, row: u16) -> Vec2 {
    Vec2::new((col as f32 + 0.5) * TILE, (row as f32 + 0.5) * TILE)
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit dark background for all "empty" terminal cells, so the
    /// inter-row gap color matches the cell color on VTE terminals.
    const BASE_BG: Color = Color::Rgb { r: 16, g: 24, b: 48 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Sentinel that differs from any real cell, used to invalidate the
    /// back buffer so every position is re-emitted.
    const INVALID: Cell = Cell { ch: '\0', fg: Color::Magenta, bg: Color::Magenta };
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    /// Returns true when the dimensions changed.
    fn resize(&mut self, w: usize, h: usize) -> bool {
        if self.width != w || self.height != h {
            self.width = w;
            self.height = h;
            self.cells = vec![Cell::BLANK; w * h];
            true
        } else {
            false
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    fn fill(&mut self, cell: Cell) {
        self.cells.fill(cell);
    }

    fn set(&mut self, x: usize, y: usize, cell: Cell) {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x] = cell;
        }
    }

    fn put_str(&mut self, x: usize, y: usize, s: &str, fg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i, y, Cell { ch, fg, bg: Cell::BASE_BG });
        }
    }

    fn put_centered(&mut self, y: usize, s: &str, fg: Color) {
        let x = (self.width.saturating_sub(s.chars().count())) / 2;
        self.put_str(x, y, s, fg);
    }
}

// ── Renderer ──

pub struct Renderer {
    front: FrameBuffer,
    back: FrameBuffer,
    enhanced_keys: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            enhanced_keys: false,
        }
    }

    /// Did the terminal accept the keyboard enhancement (Release events)?
    pub fn enhanced_keys(&self) -> bool {
        self.enhanced_keys
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        let mut out = io::stdout();
        execute!(out, EnterAlternateScreen, cursor::Hide, EnableMouseCapture, Clear(ClearType::All))?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                out,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.enhanced_keys = true;
        }
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        let mut out = io::stdout();
        if self.enhanced_keys {
            execute!(out, PopKeyboardEnhancementFlags)?;
        }
        execute!(out, DisableMouseCapture, cursor::Show, LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    pub fn render(&mut self, game: &Game) -> io::Result<()> {
        let (tw, th) = terminal::size()?;
        let resized = self.front.resize(tw as usize, th as usize);
        if self.back.resize(tw as usize, th as usize) || resized {
            self.back.fill(Cell::INVALID);
        }
        self.front.clear();

        match &game.mode {
            Mode::Title { tip } => self.compose_title(tip),
            Mode::Instructions => self.compose_instructions(),
            Mode::Playing(session) => self.compose_session(session, game.score),
            Mode::GameOver => self.compose_game_over(game.score),
            Mode::Win => self.compose_win(game.score),
        }

        self.flush_diff()
    }

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut out = io::BufWriter::new(io::stdout());
        let mut fg = Color::Reset;
        let mut bg = Color::Reset;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.cells[y * self.front.width + x];
                if cell == self.back.cells[y * self.back.width + x] {
                    continue;
                }
                queue!(out, MoveTo(x as u16, y as u16))?;
                if cell.fg != fg {
                    queue!(out, SetForegroundColor(cell.fg))?;
                    fg = cell.fg;
                }
                if cell.bg != bg {
                    queue!(out, SetBackgroundColor(cell.bg))?;
                    bg = cell.bg;
                }
                queue!(out, Print(cell.ch))?;
            }
        }
        out.flush()?;
        self.back.cells.copy_from_slice(&self.front.cells);
        Ok(())
    }

    // ── Playing ──

    fn compose_session(&mut self, s: &Session, score: u32) {
        // Zones and geometry first, then entities over them —
        // the same layering the draw order of the sprite lists gave.
        for r in &s.water {
            self.fill_rect(r, Cell { ch: '~', fg: Color::Cyan, bg: Color::DarkBlue });
        }
        for r in &s.platforms {
            self.fill_rect(r, Cell { ch: '█', fg: Color::Grey, bg: Cell::BASE_BG });
        }
        for r in &s.ladders {
            self.fill_rect(r, Cell { ch: 'H', fg: Color::DarkYellow, bg: Cell::BASE_BG });
        }
        // Coins blink on the session tick.
        let coin_fg = if s.tick / 8 % 2 == 0 { Color::Yellow } else { Color::DarkYellow };
        for coin in &s.coins {
            self.set_world(coin.pos, Cell { ch: 'o', fg: coin_fg, bg: Cell::BASE_BG });
        }
        for spider in &s.spiders {
            // Mirrored glyph shows which way the spider is headed.
            let ch = match spider.facing {
                Facing::Left => 'm',
                Facing::Right => 'M',
            };
            self.set_world(spider.pos, Cell { ch, fg: Color::Red, bg: Cell::BASE_BG });
        }
        for bullet in &s.bullets {
            self.set_world(bullet.pos, Cell { ch: '*', fg: Color::White, bg: Cell::BASE_BG });
        }

        // Walk cycle: idle '@', striding figure mirrored by facing.
        let player_ch = if s.player.walk_frame == 0 || s.player.walk_frame / 7 % 2 == 0 {
            '@'
        } else {
            match s.player.facing {
                Facing::Right => 'd',
                Facing::Left => 'b',
            }
        };
        let player_fg = if s.player.on_ladder { Color::Cyan } else { Color::Green };
        self.set_world(s.player.pos, Cell { ch: player_ch, fg: player_fg, bg: Cell::BASE_BG });

        let hud_row = (s.bounds.h / TILE) as usize;
        let hud = format!("Score: {}   Level {}: {}", score, s.level, s.name);
        self.front.put_str(1, hud_row, &hud, Color::White);
    }

    fn fill_rect(&mut self, r: &Rect, cell: Cell) {
        let col0 = (r.left() / TILE).floor().max(0.0) as usize;
        let col1 = (r.right() / TILE).ceil() as usize;
        let row0 = (r.top() / TILE).floor().max(0.0) as usize;
        let row1 = (r.bottom() / TILE).ceil() as usize;
        for row in row0..row1 {
            for col in col0..col1 {
                self.front.set(col, row, cell);
            }
        }
    }

    fn set_world(&mut self, pos: Vec2, cell: Cell) {
        if pos.x < 0.0 || pos.y < 0.0 {
            return;
        }
        self.front.set((pos.x / TILE) as usize, (pos.y / TILE) as usize, cell);
    }

    // ── Screens ──

    fn compose_title(&mut self, tip: &str) {
        let mid = self.front.height / 2;
        self.front.put_centered(mid.saturating_sub(3), "S P I D E R   I S L E", Color::Yellow);
        self.front.put_centered(mid, "Press Enter or click to start", Color::White);
        self.front.put_centered(mid + 2, &format!("TIP: {tip}"), Color::DarkGrey);
    }

    fn compose_instructions(&mut self) {
        let mid = self.front.height / 2;
        self.front.put_centered(mid.saturating_sub(3), "Instructions", Color::Yellow);
        self.front.put_centered(
            mid.saturating_sub(1),
            "Move with the arrow keys or WASD; climb ladders with up/down.",
            Color::White,
        );
        self.front.put_centered(mid, "Aim with the mouse and click to shoot.", Color::White);
        self.front.put_centered(
            mid + 1,
            "Kill the spiders and collect the coins to advance.",
            Color::White,
        );
        self.front.put_centered(mid + 3, "Press Enter or click to start", Color::DarkGrey);
    }

    fn compose_game_over(&mut self, score: u32) {
        let mid = self.front.height / 2;
        self.front.put_centered(mid.saturating_sub(2), "You died!", Color::Red);
        self.front.put_centered(mid, &format!("Score: {score}"), Color::White);
        self.front.put_centered(mid + 2, "Press Enter or click to restart", Color::DarkGrey);
    }

    fn compose_win(&mut self, score: u32) {
        let mid = self.front.height / 2;
        self.front.put_centered(mid.saturating_sub(2), "Congratulations!", Color::Yellow);
        self.front.put_centered(
            mid,
            "You cleared every isle and made it to the rescue boat.",
            Color::White,
        );
        self.front.put_centered(mid + 1, &format!("Final score: {score}"), Color::White);
        self.front.put_centered(mid + 3, "Press Enter or click to restart", Color::DarkGrey);
    }
}
