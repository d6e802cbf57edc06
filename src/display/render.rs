//! Diff renderer: each entity erases last frame's footprint, draws its
//! current one if present, then remembers where it was drawn.
//!
//! Nothing is double buffered. Repainting only what moved is what keeps a
//! single-buffered panel from flickering, and erase always precedes draw so
//! a moving entity never leaves a trail.

use super::{Color, Display, C_INVADER, C_SHIP, C_SHOT, C_TEXT, C_ZAP};
use crate::entities::{GameState, Outcome, Point, Rect, NO_OF_INVADERS};
use crate::error::GameError;

pub const SCORE_AT: Point = Point { x: 25, y: 20 };
/// Lives sit this far in from the right-hand edge.
pub const LIVES_INSET: i32 = 40;
pub const HUD_Y: i32 = 20;

/// Footprints drawn by the previous render tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Renderer {
    last_ship: Rect,
    last_shot: Rect,
    last_zap: Point,
    last_invaders: [Point; NO_OF_INVADERS],
}

impl Renderer {
    /// Starts with "previous" equal to `state`, as if it had just been drawn
    /// onto a cleared screen.
    pub fn new(state: &GameState) -> Self {
        Self {
            last_ship: state.ship.rect,
            last_shot: state.shot.rect,
            last_zap: state.zap.position,
            last_invaders: state.squad.members.map(|m| m.position),
        }
    }

    /// Render one frame. Each entity's footprint is committed as soon as it
    /// has been drawn, so a failed call leaves the remaining entities to be
    /// erased from their older footprint next time.
    pub fn render<D: Display + ?Sized>(
        &mut self,
        state: &GameState,
        display: &mut D,
    ) -> Result<(), GameError> {
        let background = display.background();

        // Ship
        display.fill_rect(self.last_ship, background)?;
        display.fill_rect(state.ship.rect, C_SHIP)?;
        self.last_ship = state.ship.rect;

        // Invaders; a shot-down member is painted out where it stands.
        for (last, invader) in self.last_invaders.iter_mut().zip(&state.squad.members) {
            display.draw_invader(*last, background)?;
            let color = if invader.visible { C_INVADER } else { background };
            display.draw_invader(invader.position, color)?;
            *last = invader.position;
        }

        // Player shot
        display.fill_rect(self.last_shot, background)?;
        if state.shot.active {
            display.fill_rect(state.shot.rect, C_SHOT)?;
        }
        self.last_shot = state.shot.rect;

        // Enemy shot
        display.draw_zap(self.last_zap, background)?;
        if state.zap.active {
            display.draw_zap(state.zap.position, C_ZAP)?;
        }
        self.last_zap = state.zap.position;

        draw_hud(display, state)?;
        display.present()
    }
}

fn draw_hud<D: Display + ?Sized>(display: &mut D, state: &GameState) -> Result<(), GameError> {
    let lives_at = Point::new(display.width() - LIVES_INSET, HUD_Y);
    display.draw_text(&format!("{:03}", state.round.lives), lives_at, C_TEXT)?;
    display.draw_text(&format!("{:03}", state.round.score), SCORE_AT, C_TEXT)
}

// ── End-of-round screen ───────────────────────────────────────────────────────

pub const LOST_MESSAGE: &str = "You Lost, Try again";
pub const WON_MESSAGE: &str = "You Won";
pub const RESTART_PROMPT: &str = "Press the centre button to play again";

/// Clears the screen and shows the outcome with the restart prompt.
pub fn draw_round_end<D: Display + ?Sized>(
    display: &mut D,
    outcome: Outcome,
) -> Result<(), GameError> {
    let (w, h) = (display.width(), display.height());
    display.clear()?;
    let (message, at) = match outcome {
        Outcome::Lost => (LOST_MESSAGE, Point::new(w / 2 - 53, h / 2)),
        Outcome::Won => (WON_MESSAGE, Point::new(w / 2 - 20, h / 2)),
    };
    display.draw_text(message, at, C_TEXT)?;
    display.draw_text(RESTART_PROMPT, Point::new(50, h - 10), C_TEXT)?;
    display.present()
}

/// Paints an 8×8 lamp in the top-right corner.
pub(crate) fn draw_lamp<D: Display + ?Sized>(
    display: &mut D,
    color: Option<Color>,
) -> Result<(), GameError> {
    let lamp = Rect::new(display.width() - 8, 0, 8, 8);
    let color = color.unwrap_or_else(|| display.background());
    display.fill_rect(lamp, color)?;
    display.present()
}
