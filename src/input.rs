//! Lock-free input signals shared between the input thread and the ticks.
//!
//! The rotary control is an accumulated delta that the logic tick swaps back
//! to zero. Buttons are momentary levels: a press counts as held for a short
//! window unless the terminal reports the release first.

use std::sync::atomic::{AtomicBool, AtomicI32, AtomicU64, Ordering};
use std::time::{Duration, Instant};

use crate::compute::TickInput;

const RELEASED: u64 = u64::MAX;

#[derive(Debug)]
pub struct Button {
    /// Milliseconds since the input epoch of the last press or repeat.
    last_seen_ms: AtomicU64,
}

impl Button {
    fn new() -> Self {
        Self {
            last_seen_ms: AtomicU64::new(RELEASED),
        }
    }

    fn press(&self, at_ms: u64) {
        self.last_seen_ms.store(at_ms, Ordering::Release);
    }

    fn release(&self) {
        self.last_seen_ms.store(RELEASED, Ordering::Release);
    }

    fn is_down(&self, now_ms: u64, hold_ms: u64) -> bool {
        match self.last_seen_ms.load(Ordering::Acquire) {
            RELEASED => false,
            last => now_ms.saturating_sub(last) <= hold_ms,
        }
    }
}

#[derive(Debug)]
pub struct InputState {
    epoch: Instant,
    hold_ms: u64,
    rotary: AtomicI32,
    fire: Button,
    restart: Button,
    quit: AtomicBool,
}

impl InputState {
    pub fn new(hold: Duration) -> Self {
        Self {
            epoch: Instant::now(),
            hold_ms: hold.as_millis() as u64,
            rotary: AtomicI32::new(0),
            fire: Button::new(),
            restart: Button::new(),
            quit: AtomicBool::new(false),
        }
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }

    // ── Producer side (input thread) ─────────────────────────────────────────

    pub fn rotate(&self, detents: i32) {
        self.rotary.fetch_add(detents, Ordering::AcqRel);
    }

    pub fn press_fire(&self) {
        self.fire.press(self.now_ms());
    }

    pub fn release_fire(&self) {
        self.fire.release();
    }

    pub fn press_restart(&self) {
        self.restart.press(self.now_ms());
    }

    pub fn release_restart(&self) {
        self.restart.release();
    }

    pub fn request_quit(&self) {
        self.quit.store(true, Ordering::Release);
    }

    // ── Consumer side (ticks & controller) ───────────────────────────────────

    /// Reads and zeroes the accumulated rotary delta.
    pub fn take_rotary(&self) -> i32 {
        self.rotary.swap(0, Ordering::AcqRel)
    }

    pub fn fire_down(&self) -> bool {
        self.fire.is_down(self.now_ms(), self.hold_ms)
    }

    pub fn restart_down(&self) -> bool {
        self.restart.is_down(self.now_ms(), self.hold_ms)
    }

    pub fn quit_requested(&self) -> bool {
        self.quit.load(Ordering::Acquire)
    }

    /// Everything one logic tick consumes. The rotary delta is drained.
    pub fn sample(&self) -> TickInput {
        TickInput {
            rotary: self.take_rotary(),
            fire: self.fire_down(),
        }
    }
}
