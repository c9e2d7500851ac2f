/// Rendering layer: all terminal I/O lives here.
///
/// `TerminalCanvas` implements the core's `Canvas` by scaling the pixel world
/// onto a grid of terminal cells. The overlay functions draw the frontend's
/// own chrome (hint line, pause and game-over banners). No game logic is
/// performed here.

use std::io::{self, Write};

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};
use space_defender::entities::{SessionStatus, Sprite};
use space_defender::platform::Canvas;

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_SCORE: Color = Color::Yellow;
const C_SHOT: Color = Color::White;
const C_PLAYER: Color = Color::White;
const C_INVADER_A: Color = Color::Green;
const C_INVADER_B: Color = Color::Red;
const C_INVADER_C: Color = Color::Cyan;
const C_HINT: Color = Color::DarkGrey;
const C_BANNER: Color = Color::Red;

/// Play-field size in cells when not in fullscreen mode.
const WINDOWED: (u16, u16) = (64, 24);

// ── Viewport ──────────────────────────────────────────────────────────────────

/// The block of terminal cells the pixel world is mapped onto.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Viewport {
    pub col: u16,
    pub row: u16,
    pub cols: u16,
    pub rows: u16,
}

impl Viewport {
    /// Fit inside a terminal of `term` cells, keeping one cell of border on
    /// every side and the last row for the controls hint.
    pub fn fit(term: (u16, u16), fullscreen: bool) -> Self {
        let avail_cols = term.0.saturating_sub(2).max(1);
        let avail_rows = term.1.saturating_sub(3).max(1);
        let (cols, rows) = if fullscreen {
            (avail_cols, avail_rows)
        } else {
            (WINDOWED.0.min(avail_cols), WINDOWED.1.min(avail_rows))
        };
        Viewport {
            col: 1 + (avail_cols - cols) / 2,
            row: 1 + (avail_rows - rows) / 2,
            cols,
            rows,
        }
    }
}

// ── Canvas ────────────────────────────────────────────────────────────────────

/// Queues crossterm commands for one frame.
///
/// `Canvas` calls cannot fail, so the first I/O error is held and handed back
/// by `finish`; later draws in the same frame are dropped.
pub struct TerminalCanvas<'a, W: Write> {
    out: &'a mut W,
    view: Viewport,
    world: (f32, f32),
    error: Option<io::Error>,
}

impl<'a, W: Write> TerminalCanvas<'a, W> {
    pub fn new(out: &'a mut W, view: Viewport) -> Self {
        TerminalCanvas {
            out,
            view,
            world: (1.0, 1.0),
            error: None,
        }
    }

    pub fn finish(self) -> io::Result<()> {
        match self.error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    fn queue(&mut self, f: impl FnOnce(&mut W) -> io::Result<()>) {
        if self.error.is_some() {
            return;
        }
        if let Err(e) = f(&mut *self.out) {
            self.error = Some(e);
        }
    }

    /// Terminal cell for a world point, or `None` when it lies off screen.
    fn cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        let (w, h) = self.world;
        if x < 0.0 || y < 0.0 || x >= w || y >= h {
            return None;
        }
        let col = (x / w * self.view.cols as f32) as u16;
        let row = (y / h * self.view.rows as f32) as u16;
        Some((self.view.col + col, self.view.row + row))
    }

    /// Number of cells a world width covers starting at `col`, at least one.
    fn span(&self, col: u16, width: f32) -> u16 {
        let cells = (width / self.world.0 * self.view.cols as f32).ceil().max(1.0) as u16;
        let right_edge = self.view.col + self.view.cols;
        cells.min(right_edge.saturating_sub(col))
    }

    fn draw_border(&mut self) {
        let Viewport {
            col,
            row,
            cols,
            rows,
        } = self.view;
        let left = col - 1;
        let top = row - 1;
        self.queue(|out| {
            out.queue(style::SetForegroundColor(C_BORDER))?;
            out.queue(cursor::MoveTo(left, top))?;
            out.queue(Print(format!("┌{}┐", "─".repeat(cols as usize))))?;
            out.queue(cursor::MoveTo(left, row + rows))?;
            out.queue(Print(format!("└{}┘", "─".repeat(cols as usize))))?;
            for r in row..row + rows {
                out.queue(cursor::MoveTo(left, r))?;
                out.queue(Print("│"))?;
                out.queue(cursor::MoveTo(col + cols, r))?;
                out.queue(Print("│"))?;
            }
            Ok(())
        });
    }
}

fn glyph(sprite: Sprite) -> (&'static str, Color) {
    match sprite {
        Sprite::InvaderA => ("«▼»", C_INVADER_A),
        Sprite::InvaderB => ("(◎)", C_INVADER_B),
        Sprite::InvaderC => ("╚═╝", C_INVADER_C),
        Sprite::Ship => ("/▲\\", C_PLAYER),
    }
}

impl<W: Write> Canvas for TerminalCanvas<'_, W> {
    fn clear(&mut self, width: f32, height: f32) {
        self.world = (width.max(1.0), height.max(1.0));
        self.queue(|out| {
            out.queue(terminal::Clear(terminal::ClearType::All))?;
            Ok(())
        });
        self.draw_border();
    }

    fn draw_sprite(&mut self, sprite: Sprite, x: f32, y: f32, width: f32, _height: f32) {
        let Some((col, row)) = self.cell(x, y) else {
            return;
        };
        let (text, color) = glyph(sprite);
        let fit = self.span(col, width).max(text.chars().count() as u16) as usize;
        let room = (self.view.col + self.view.cols).saturating_sub(col) as usize;
        let shown: String = text.chars().take(fit.min(room)).collect();
        self.queue(|out| {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(color))?;
            out.queue(Print(shown))?;
            Ok(())
        });
    }

    fn fill_rect(&mut self, x: f32, y: f32, width: f32, _height: f32) {
        if width <= 0.0 {
            return;
        }
        let Some((col, row)) = self.cell(x.max(0.0), y) else {
            return;
        };
        let cells = self.span(col, width) as usize;
        self.queue(|out| {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_SHOT))?;
            out.queue(Print("█".repeat(cells)))?;
            Ok(())
        });
    }

    fn draw_text(&mut self, text: &str, x: f32, y: f32) {
        let Some((col, row)) = self.cell(x, y) else {
            return;
        };
        let text = text.to_string();
        self.queue(|out| {
            out.queue(cursor::MoveTo(col, row))?;
            out.queue(style::SetForegroundColor(C_SCORE))?;
            out.queue(Print(text))?;
            Ok(())
        });
    }
}

// ── Frontend chrome ───────────────────────────────────────────────────────────

pub fn draw_controls_hint<W: Write>(out: &mut W, term_rows: u16) -> io::Result<()> {
    out.queue(cursor::MoveTo(1, term_rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print(
        "← → / A D : Move   SPACE : Shoot   P : Pause   F : Fullscreen   Q : Quit",
    ))?;
    Ok(())
}

/// Banner over the play field for the paused and game-over states.
pub fn draw_status_banner<W: Write>(
    out: &mut W,
    view: Viewport,
    status: SessionStatus,
    score: u32,
) -> io::Result<()> {
    let lines: Vec<String> = match status {
        SessionStatus::Running => return Ok(()),
        SessionStatus::Paused => vec![
            "╔════════════════════╗".into(),
            "║       PAUSED       ║".into(),
            "╚════════════════════╝".into(),
            "P - Resume".into(),
        ],
        SessionStatus::GameOver => vec![
            "╔════════════════════╗".into(),
            "║    GAME  OVER      ║".into(),
            "╚════════════════════╝".into(),
            format!("Final Score: {:>6}", score),
        ],
    };

    let cx = view.col + view.cols / 2;
    let start_row = (view.row + view.rows / 2).saturating_sub(lines.len() as u16 / 2);
    for (i, line) in lines.iter().enumerate() {
        let col = cx.saturating_sub(line.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, start_row + i as u16))?;
        out.queue(style::SetForegroundColor(C_BANNER))?;
        out.queue(Print(line))?;
    }
    Ok(())
}

/// Park the cursor, reset colours and push the frame out.
pub fn present<W: Write>(out: &mut W, term_rows: u16) -> io::Result<()> {
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, term_rows.saturating_sub(1)))?;
    out.flush()
}
