/// Terminal driver: maps the logical screen onto a character grid.
///
/// Every cell stands for a `CELL_WIDTH` × `CELL_HEIGHT` block of logical
/// pixels. Commands are queued and only flushed by `present`, so one render
/// tick reaches the terminal as a single write.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Print},
    terminal, QueueableCommand,
};

use super::sprites::{INVADER_WIDTH, ZAP_COLS};
use super::{Color, Display};
use crate::entities::{Point, Rect};
use crate::error::GameError;

pub const CELL_WIDTH: i32 = 4;
pub const CELL_HEIGHT: i32 = 8;

const INVADER_GLYPH: [&str; 2] = ["▟▀██▀▙", "▘▚▀▀▞▝"];
const INVADER_GLYPH_COLS: usize = 6;
const _: () = assert!(INVADER_GLYPH_COLS as i32 * CELL_WIDTH >= INVADER_WIDTH);
const ZAP_GLYPH: [&str; 2] = ["╏", "↓"];

pub struct TerminalDisplay<W: Write + Send> {
    out: W,
    width: i32,
    height: i32,
    cols: i32,
    rows: i32,
}

impl<W: Write + Send> TerminalDisplay<W> {
    pub fn new(out: W, width: i32, height: i32) -> Self {
        let (cols, rows) = Self::grid_for(width, height);
        Self {
            out,
            width,
            height,
            cols: cols as i32,
            rows: rows as i32,
        }
    }

    /// Character grid needed for a `width` × `height` logical screen.
    pub fn grid_for(width: i32, height: i32) -> (u16, u16) {
        (
            ceil_div(width, CELL_WIDTH) as u16,
            ceil_div(height, CELL_HEIGHT) as u16,
        )
    }

    /// Fails unless a `cols` × `rows` terminal can hold the whole screen.
    pub fn check_fits(width: i32, height: i32, cols: u16, rows: u16) -> Result<(), GameError> {
        let (need_cols, need_rows) = Self::grid_for(width, height);
        if cols < need_cols || rows < need_rows {
            return Err(GameError::TerminalTooSmall {
                cols,
                rows,
                need_cols,
                need_rows,
            });
        }
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }

    /// Prints `text` at a cell, truncated at the right edge of the grid.
    fn put(&mut self, col: i32, row: i32, text: &str, color: Color) -> Result<(), GameError> {
        if row < 0 || row >= self.rows || col >= self.cols {
            return Ok(());
        }
        let skip = (-col).max(0) as usize;
        let room = (self.cols - col.max(0)) as usize;
        let visible: String = text.chars().skip(skip).take(room).collect();
        if visible.is_empty() {
            return Ok(());
        }
        self.out.queue(cursor::MoveTo(col.max(0) as u16, row as u16))?;
        self.out.queue(style::SetForegroundColor(term_color(color)))?;
        self.out.queue(Print(visible))?;
        Ok(())
    }

    /// A glyph drawn in the background colour becomes blanks of equal width.
    fn put_glyph(
        &mut self,
        col: i32,
        row: i32,
        glyph: &str,
        width: usize,
        color: Color,
    ) -> Result<(), GameError> {
        if color == self.background() {
            self.put(col, row, &" ".repeat(width), color)
        } else {
            self.put(col, row, glyph, color)
        }
    }
}

impl<W: Write + Send> Display for TerminalDisplay<W> {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn background(&self) -> Color {
        Color::Black
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), GameError> {
        let first_col = rect.left.div_euclid(CELL_WIDTH);
        let last_col = ceil_div(rect.right, CELL_WIDTH);
        let cells = (last_col - first_col).max(0) as usize;
        if cells == 0 {
            return Ok(());
        }
        let run = if color == self.background() {
            " ".repeat(cells)
        } else {
            "█".repeat(cells)
        };
        for row in rect.top.div_euclid(CELL_HEIGHT)..ceil_div(rect.bottom, CELL_HEIGHT) {
            self.put(first_col, row, &run, color)?;
        }
        Ok(())
    }

    fn draw_invader(&mut self, at: Point, color: Color) -> Result<(), GameError> {
        let col = at.x.div_euclid(CELL_WIDTH);
        let row = at.y.div_euclid(CELL_HEIGHT);
        for (dy, glyph) in INVADER_GLYPH.iter().enumerate() {
            self.put_glyph(col, row + dy as i32, glyph, INVADER_GLYPH_COLS, color)?;
        }
        Ok(())
    }

    fn draw_zap(&mut self, at: Point, color: Color) -> Result<(), GameError> {
        let col = (at.x + ZAP_COLS / 2).div_euclid(CELL_WIDTH);
        let row = at.y.div_euclid(CELL_HEIGHT);
        for (dy, glyph) in ZAP_GLYPH.iter().enumerate() {
            self.put_glyph(col, row + dy as i32, glyph, 1, color)?;
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, at: Point, color: Color) -> Result<(), GameError> {
        let col = at.x.div_euclid(CELL_WIDTH);
        let row = at.y.div_euclid(CELL_HEIGHT);
        self.put(col, row, text, color)
    }

    fn clear(&mut self) -> Result<(), GameError> {
        self.out.queue(style::ResetColor)?;
        self.out.queue(terminal::Clear(terminal::ClearType::All))?;
        Ok(())
    }

    fn present(&mut self) -> Result<(), GameError> {
        // Park the cursor in a harmless spot before flushing.
        self.out.queue(style::ResetColor)?;
        self.out.queue(cursor::MoveTo(0, 0))?;
        self.out.flush()?;
        Ok(())
    }
}

fn ceil_div(value: i32, by: i32) -> i32 {
    (value + by - 1).div_euclid(by)
}

fn term_color(color: Color) -> style::Color {
    match color {
        Color::Black => style::Color::Black,
        Color::White => style::Color::White,
        Color::Green => style::Color::Green,
        Color::Red => style::Color::Red,
    }
}
