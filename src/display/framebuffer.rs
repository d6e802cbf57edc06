//! In-memory display: a pixel grid plus a text layer keyed by position.

use std::collections::BTreeMap;

use super::sprites::{invader_pixels, zap_pixels};
use super::{Color, Display};
use crate::entities::{Point, Rect};
use crate::error::GameError;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Framebuffer {
    width: i32,
    height: i32,
    background: Color,
    pixels: Vec<Color>,
    text: BTreeMap<(i32, i32), (String, Color)>,
}

impl Framebuffer {
    pub fn new(width: i32, height: i32) -> Self {
        let background = Color::default();
        Self {
            width,
            height,
            background,
            pixels: vec![background; (width.max(0) * height.max(0)) as usize],
            text: BTreeMap::new(),
        }
    }

    /// Colour at `(x, y)`; `None` off-screen.
    pub fn pixel(&self, x: i32, y: i32) -> Option<Color> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    pub fn text_at(&self, x: i32, y: i32) -> Option<&str> {
        self.text.get(&(x, y)).map(|(s, _)| s.as_str())
    }

    pub fn texts(&self) -> impl Iterator<Item = &str> {
        self.text.values().map(|(s, _)| s.as_str())
    }

    /// Number of pixels not showing the background.
    pub fn lit_pixels(&self) -> usize {
        self.pixels.iter().filter(|&&c| c != self.background).count()
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        ((0..self.width).contains(&x) && (0..self.height).contains(&y))
            .then(|| (y * self.width + x) as usize)
    }

    fn plot(&mut self, x: i32, y: i32, color: Color) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }
}

impl Display for Framebuffer {
    fn width(&self) -> i32 {
        self.width
    }

    fn height(&self) -> i32 {
        self.height
    }

    fn background(&self) -> Color {
        self.background
    }

    fn fill_rect(&mut self, rect: Rect, color: Color) -> Result<(), GameError> {
        for y in rect.top.max(0)..rect.bottom.min(self.height) {
            for x in rect.left.max(0)..rect.right.min(self.width) {
                self.plot(x, y, color);
            }
        }
        Ok(())
    }

    fn draw_invader(&mut self, at: Point, color: Color) -> Result<(), GameError> {
        for (dx, dy) in invader_pixels() {
            self.plot(at.x + dx, at.y + dy, color);
        }
        Ok(())
    }

    fn draw_zap(&mut self, at: Point, color: Color) -> Result<(), GameError> {
        for (dx, dy) in zap_pixels() {
            self.plot(at.x + dx, at.y + dy, color);
        }
        Ok(())
    }

    fn draw_text(&mut self, text: &str, at: Point, color: Color) -> Result<(), GameError> {
        self.text.insert((at.x, at.y), (text.to_string(), color));
        Ok(())
    }

    fn clear(&mut self) -> Result<(), GameError> {
        self.pixels.fill(self.background);
        self.text.clear();
        Ok(())
    }
}
