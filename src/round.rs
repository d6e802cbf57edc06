//! Round lifecycle: INIT → PLAYING → {WON | LOST} → AWAIT_RESTART → INIT.
//!
//! The controller never touches gameplay state. It resets it at INIT while
//! tick delivery is disarmed, then blocks until the logic tick reports an
//! outcome, disarms delivery, and draws the end-of-round screen.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

use tracing::{debug, info, warn};

use crate::compute;
use crate::config::GameConfig;
use crate::display::{draw_round_end, Display, Renderer};
use crate::entities::{GameState, Outcome, Phase};
use crate::error::GameError;
use crate::indicator::StatusLed;
use crate::input::InputState;
use crate::timing::{Task, Timing};

/// Why the controller stopped waiting on a round.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RoundEnd {
    Finished(Outcome),
    Quit,
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

// ── Outcome signal ───────────────────────────────────────────────────────────

/// One-shot slot the logic tick fills and the controller blocks on.
#[derive(Default)]
struct RoundSignal {
    slot: Mutex<Option<RoundEnd>>,
    ready: Condvar,
}

impl RoundSignal {
    fn reset(&self) {
        *lock(&self.slot) = None;
    }

    /// The first posted value wins.
    fn post(&self, end: RoundEnd) {
        let mut slot = lock(&self.slot);
        if slot.is_none() {
            *slot = Some(end);
            self.ready.notify_all();
        }
    }

    fn wait(&self) -> RoundEnd {
        let mut slot = lock(&self.slot);
        loop {
            if let Some(end) = *slot {
                return end;
            }
            slot = self
                .ready
                .wait(slot)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }
}

// ── Shared engine ────────────────────────────────────────────────────────────

/// State shared between the tick handlers and the controller.
pub struct SharedGame {
    state: Mutex<GameState>,
    renderer: Mutex<Renderer>,
    input: Arc<InputState>,
    signal: RoundSignal,
    frames: AtomicU32,
    fps: AtomicU32,
}

impl SharedGame {
    pub fn new(input: Arc<InputState>, width: i32, height: i32) -> Self {
        let state = GameState::new(width, height);
        Self {
            renderer: Mutex::new(Renderer::new(&state)),
            state: Mutex::new(state),
            input,
            signal: RoundSignal::default(),
            frames: AtomicU32::new(0),
            fps: AtomicU32::new(0),
        }
    }

    pub fn input(&self) -> &InputState {
        &self.input
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> GameState {
        *lock(&self.state)
    }

    pub fn lives(&self) -> u8 {
        lock(&self.state).round.lives
    }

    pub fn score(&self) -> u16 {
        lock(&self.state).round.score
    }

    /// Frames rendered during the last diagnostic period.
    pub fn frames_per_second(&self) -> u32 {
        self.fps.load(Ordering::Relaxed)
    }

    /// Replaces the state wholesale; only call while ticks are disarmed.
    pub fn replace_state(&self, state: GameState) {
        *lock(&self.renderer) = Renderer::new(&state);
        *lock(&self.state) = state;
    }

    /// Fresh round state in the PLAYING phase, with an empty outcome slot.
    /// A quit that is already pending stays posted.
    fn reset(&self, width: i32, height: i32) {
        let mut state = GameState::new(width, height);
        state.round.phase = Phase::Playing;
        self.replace_state(state);
        self.signal.reset();
        if self.input.quit_requested() {
            self.signal.post(RoundEnd::Quit);
        }
    }

    pub fn logic_tick(&self) {
        let input = self.input.sample();
        let mut state = lock(&self.state);
        let decided_before = state.round.outcome().is_some();
        *state = compute::tick(&state, &input);
        if let Some(outcome) = state.round.outcome() {
            if !decided_before {
                self.signal.post(RoundEnd::Finished(outcome));
            }
        }
    }

    pub fn render_tick<D: Display + ?Sized>(&self, display: &Mutex<D>) {
        let state = self.snapshot();
        let mut renderer = lock(&self.renderer);
        let mut display = lock(display);
        if let Err(err) = renderer.render(&state, &mut *display) {
            warn!(%err, "render tick failed");
        }
        self.frames.fetch_add(1, Ordering::Relaxed);
    }

    pub fn diagnostic_tick(&self) {
        let frames = self.frames.swap(0, Ordering::Relaxed);
        self.fps.store(frames, Ordering::Relaxed);
        debug!(fps = frames, "frame rate");
    }

    /// Wakes the controller wherever it is waiting and asks it to stop.
    pub fn request_quit(&self) {
        self.input.request_quit();
        self.signal.post(RoundEnd::Quit);
    }

    /// Blocks until the logic tick decides the round or a quit arrives.
    pub fn wait_round_end(&self) -> RoundEnd {
        self.signal.wait()
    }
}

// ── Controller ───────────────────────────────────────────────────────────────

pub struct RoundMachine<D: Display + 'static, L: StatusLed, T: Timing> {
    shared: Arc<SharedGame>,
    display: Arc<Mutex<D>>,
    led: L,
    timing: T,
    config: GameConfig,
    phase: Phase,
    rounds: u32,
}

impl<D: Display + 'static, L: StatusLed, T: Timing> RoundMachine<D, L, T> {
    /// Registers the three tick tasks (disarmed) against `timing`.
    pub fn new(
        display: Arc<Mutex<D>>,
        led: L,
        mut timing: T,
        input: Arc<InputState>,
        config: GameConfig,
    ) -> Result<Self, GameError> {
        let (width, height) = {
            let display = lock(&display);
            (display.width(), display.height())
        };
        let shared = Arc::new(SharedGame::new(input, width, height));
        timing.disarm();

        let game = Arc::clone(&shared);
        let screen = Arc::clone(&display);
        timing.register(
            Task::Render,
            config.render_period(),
            Box::new(move || game.render_tick(&screen)),
        )?;
        let game = Arc::clone(&shared);
        timing.register(
            Task::Logic,
            config.logic_period(),
            Box::new(move || game.logic_tick()),
        )?;
        let game = Arc::clone(&shared);
        timing.register(
            Task::Diagnostic,
            config.diagnostic_period(),
            Box::new(move || game.diagnostic_tick()),
        )?;

        Ok(Self {
            shared,
            display,
            led,
            timing,
            config,
            phase: Phase::Init,
            rounds: 0,
        })
    }

    pub fn shared(&self) -> Arc<SharedGame> {
        Arc::clone(&self.shared)
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn timing(&self) -> &T {
        &self.timing
    }

    pub fn led(&self) -> &L {
        &self.led
    }

    /// Plays rounds back to back until a quit is requested.
    pub fn run(&mut self) -> Result<(), GameError> {
        while !self.shared.input().quit_requested() {
            self.start_round()?;
            match self.wait_round_end() {
                RoundEnd::Quit => {
                    self.timing.disarm();
                    break;
                }
                RoundEnd::Finished(outcome) => {
                    self.finish_round(outcome)?;
                    if !self.await_restart()? {
                        break;
                    }
                }
            }
        }
        info!(rounds = self.rounds, "leaving game");
        Ok(())
    }

    /// INIT: fresh entities, blank screen, lamp on, ticks armed.
    pub fn start_round(&mut self) -> Result<(), GameError> {
        self.phase = Phase::Init;
        self.timing.disarm();

        let (width, height) = {
            let mut display = lock(&self.display);
            display.clear()?;
            display.present()?;
            (display.width(), display.height())
        };
        self.shared.reset(width, height);
        self.led.set(true);

        self.rounds += 1;
        self.phase = Phase::Playing;
        info!(round = self.rounds, "round started");
        self.timing.arm();
        Ok(())
    }

    /// PLAYING: sleeps until the logic tick reports an outcome.
    pub fn wait_round_end(&mut self) -> RoundEnd {
        self.shared.wait_round_end()
    }

    /// WON / LOST: halt the ticks and show the result.
    pub fn finish_round(&mut self, outcome: Outcome) -> Result<(), GameError> {
        self.timing.disarm();
        self.led.set(false);
        self.phase = outcome.into();
        info!(
            ?outcome,
            lives = self.shared.lives(),
            score = self.shared.score(),
            "round over"
        );
        draw_round_end(&mut *lock(&self.display), outcome)
    }

    /// AWAIT_RESTART: blink the lamp until restart is pressed. Returns
    /// `false` if a quit arrived instead.
    pub fn await_restart(&mut self) -> Result<bool, GameError> {
        self.phase = Phase::AwaitRestart;
        let input = self.shared.input();
        let mut lit = false;
        let mut next_toggle = Instant::now();

        loop {
            if input.quit_requested() {
                self.led.set(false);
                return Ok(false);
            }
            if input.restart_down() {
                input.release_restart();
                break;
            }
            if Instant::now() >= next_toggle {
                lit = !lit;
                self.led.set(lit);
                next_toggle += self.config.blink_period();
            }
            thread::sleep(self.config.poll_period());
        }

        self.led.set(false);
        {
            let mut display = lock(&self.display);
            display.clear()?;
            display.present()?;
        }
        self.phase = Phase::Init;
        Ok(true)
    }
}
