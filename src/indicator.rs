//! Status indicator: on while a round is played, blinking while the game
//! waits for a restart.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::warn;

use crate::display::{draw_lamp, Display, C_LED};

pub trait StatusLed: Send {
    fn set(&mut self, on: bool);
}

/// Lamp painted into a corner of the shared screen.
pub struct DisplayLed<D: Display> {
    display: Arc<Mutex<D>>,
    on: bool,
}

impl<D: Display> DisplayLed<D> {
    pub fn new(display: Arc<Mutex<D>>) -> Self {
        Self { display, on: false }
    }

    pub fn is_on(&self) -> bool {
        self.on
    }
}

impl<D: Display> StatusLed for DisplayLed<D> {
    fn set(&mut self, on: bool) {
        self.on = on;
        let mut display = self.display.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(err) = draw_lamp(&mut *display, on.then_some(C_LED)) {
            warn!(%err, "status lamp update failed");
        }
    }
}
