//! Periodic tick delivery.
//!
//! Three named tasks stand in for the hardware interrupt vectors. They are
//! registered once and then armed or disarmed as a group. Every handler
//! runs to completion while holding a single gate lock, so no two handlers
//! ever interleave and `disarm` returns only after the handler in flight
//! (if any) has finished.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use crate::error::GameError;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Task {
    /// Display sync; drives the diff renderer.
    Render,
    /// Fixed-rate game logic.
    Logic,
    /// Slow housekeeping; samples the frame counter.
    Diagnostic,
}

impl fmt::Display for Task {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Task::Render => "render",
            Task::Logic => "logic",
            Task::Diagnostic => "diagnostic",
        };
        f.write_str(name)
    }
}

pub type TickHandler = Box<dyn FnMut() + Send + 'static>;

pub trait Timing {
    /// Registers `handler` to run every `period` while armed.
    fn register(&mut self, task: Task, period: Duration, handler: TickHandler)
        -> Result<(), GameError>;

    fn arm(&self);

    /// Stops delivery. On return no handler is running or will run until
    /// the next `arm`.
    fn disarm(&self);

    fn is_armed(&self) -> bool;
}

// ── Thread-backed timing ─────────────────────────────────────────────────────

/// One pacing thread per task, all funnelled through the shared gate.
pub struct ThreadTiming {
    /// Payload is the armed flag.
    gate: Arc<Mutex<bool>>,
    shutdown: Arc<AtomicBool>,
    workers: Vec<JoinHandle<()>>,
}

impl ThreadTiming {
    pub fn new() -> Self {
        Self {
            gate: Arc::new(Mutex::new(false)),
            shutdown: Arc::new(AtomicBool::new(false)),
            workers: Vec::new(),
        }
    }
}

impl Default for ThreadTiming {
    fn default() -> Self {
        Self::new()
    }
}

impl Timing for ThreadTiming {
    fn register(
        &mut self,
        task: Task,
        period: Duration,
        mut handler: TickHandler,
    ) -> Result<(), GameError> {
        let gate = Arc::clone(&self.gate);
        let shutdown = Arc::clone(&self.shutdown);
        let worker = thread::Builder::new()
            .name(format!("{task}-tick"))
            .spawn(move || {
                let mut deadline = Instant::now() + period;
                loop {
                    while let Some(left) = deadline.checked_duration_since(Instant::now()) {
                        if shutdown.load(Ordering::Acquire) {
                            return;
                        }
                        thread::park_timeout(left);
                    }
                    if shutdown.load(Ordering::Acquire) {
                        return;
                    }

                    {
                        let armed = gate.lock().unwrap_or_else(PoisonError::into_inner);
                        if *armed {
                            handler();
                        }
                    }

                    // A late task resumes from now instead of bursting to
                    // catch up on missed periods.
                    deadline = (deadline + period).max(Instant::now());
                }
            })?;
        debug!(%task, ?period, "tick task registered");
        self.workers.push(worker);
        Ok(())
    }

    fn arm(&self) {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = true;
    }

    fn disarm(&self) {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner) = false;
    }

    fn is_armed(&self) -> bool {
        *self.gate.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for ThreadTiming {
    fn drop(&mut self) {
        self.disarm();
        self.shutdown.store(true, Ordering::Release);
        for worker in &self.workers {
            worker.thread().unpark();
        }
        for worker in self.workers.drain(..) {
            let name = worker.thread().name().unwrap_or("tick").to_owned();
            if worker.join().is_err() {
                warn!(worker = %name, "tick task panicked");
            }
        }
    }
}

// ── Manual timing ────────────────────────────────────────────────────────────

/// Delivers ticks only when told to, on the caller's thread. Clones share
/// the same registrations, so a test can keep a handle while the round
/// controller owns another.
#[derive(Clone, Default)]
pub struct ManualTiming {
    inner: Arc<Mutex<ManualInner>>,
}

#[derive(Default)]
struct ManualInner {
    armed: bool,
    handlers: HashMap<Task, (Duration, TickHandler)>,
}

impl ManualTiming {
    pub fn new() -> Self {
        Self::default()
    }

    /// Runs `task` once if armed; returns whether it ran.
    pub fn fire(&self, task: Task) -> bool {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        if !inner.armed {
            return false;
        }
        match inner.handlers.get_mut(&task) {
            Some((_, handler)) => {
                handler();
                true
            }
            None => false,
        }
    }

    /// Fires `task` `n` times; returns how many actually ran.
    pub fn fire_n(&self, task: Task, n: usize) -> usize {
        (0..n).filter(|_| self.fire(task)).count()
    }

    pub fn period(&self, task: Task) -> Option<Duration> {
        let inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.handlers.get(&task).map(|(period, _)| *period)
    }
}

impl Timing for ManualTiming {
    fn register(
        &mut self,
        task: Task,
        period: Duration,
        handler: TickHandler,
    ) -> Result<(), GameError> {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        inner.handlers.insert(task, (period, handler));
        Ok(())
    }

    fn arm(&self) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).armed = true;
    }

    fn disarm(&self) {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).armed = false;
    }

    fn is_armed(&self) -> bool {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner).armed
    }
}
