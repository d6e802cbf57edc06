/// Display layer: the driver interface the core draws through, the render
/// stage that diffs game state onto it, and the concrete drivers.
///
/// The render stage performs no game logic; it only translates state into
/// rectangle, sprite and text calls.

mod framebuffer;
mod render;
pub mod sprites;
mod terminal;

pub use framebuffer::Framebuffer;
pub(crate) use render::draw_lamp;
pub use render::{
    draw_round_end, Renderer, HUD_Y, LIVES_INSET, LOST_MESSAGE, RESTART_PROMPT, SCORE_AT,
    WON_MESSAGE,
};
pub use terminal::{TerminalDisplay, CELL_HEIGHT, CELL_WIDTH};

use crate::entities::{Point, Rect};
use crate::error::GameError;

// ── Colour palette ────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum Color {
    #[default]
    Black,
    White,
    Green,
    Red,
}

pub const C_SHIP: Color = Color::Green;
pub const C_SHOT: Color = Color::Green;
pub const C_INVADER: Color = Color::White;
pub const C_ZAP: Color = Color::White;
pub const C_TEXT: Color = Color::White;
pub const C_LED: Color = Color::Red;

// ── Driver interface ──────────────────────────────────────────────────────────

/// Drawing primitives the core needs from a screen.
///
/// Coordinates are logical pixels with the origin at the top-left corner.
/// Drivers clip anything that falls outside their surface.
pub trait Display: Send {
    fn width(&self) -> i32;
    fn height(&self) -> i32;
    fn background(&self) -> Color;

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), GameError>;

    /// Draws the invader sprite with its top-left corner at `at`.
    fn draw_invader(&mut self, at: Point, color: Color) -> Result<(), GameError>;

    /// Draws the enemy shot sprite with its top-left corner at `at`.
    fn draw_zap(&mut self, at: Point, color: Color) -> Result<(), GameError>;

    fn draw_text(&mut self, text: &str, at: Point, color: Color) -> Result<(), GameError>;

    fn clear(&mut self) -> Result<(), GameError>;

    /// Pushes everything queued since the last call to the screen.
    fn present(&mut self) -> Result<(), GameError> {
        Ok(())
    }
}
