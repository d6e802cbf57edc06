//! Runtime configuration, read once from the environment at start-up.

use std::env;
use std::path::PathBuf;
use std::time::Duration;

use tracing_subscriber::filter::EnvFilter;

/// Display-sync rate; just above 60 Hz so the diff render stays ahead of
/// the panel refresh.
pub const DEFAULT_RENDER_HZ: u64 = 61;
pub const DEFAULT_LOGIC_HZ: u64 = 122;
pub const DEFAULT_DIAGNOSTIC_MS: u64 = 1000;
pub const DEFAULT_BLINK_MS: u64 = 250;
pub const DEFAULT_POLL_MS: u64 = 10;
/// How long a single key press counts as a held button on terminals that
/// never report key release.
pub const DEFAULT_HOLD_MS: u64 = 130;
/// Log filter used when `RUST_LOG` is unset or unparsable.
pub const DEFAULT_LOG_FILTER: &str = "info";

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub render_hz: u64,
    pub logic_hz: u64,
    pub diagnostic_ms: u64,
    pub blink_ms: u64,
    pub poll_ms: u64,
    pub hold_ms: u64,
    pub log_path: Option<PathBuf>,
    /// Raw `RUST_LOG` directives, if any.
    pub log_directives: Option<String>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            render_hz: DEFAULT_RENDER_HZ,
            logic_hz: DEFAULT_LOGIC_HZ,
            diagnostic_ms: DEFAULT_DIAGNOSTIC_MS,
            blink_ms: DEFAULT_BLINK_MS,
            poll_ms: DEFAULT_POLL_MS,
            hold_ms: DEFAULT_HOLD_MS,
            log_path: None,
            log_directives: None,
        }
    }
}

impl GameConfig {
    pub fn from_env() -> Self {
        Self {
            render_hz: read_env_u64("INVADERS_RENDER_HZ", DEFAULT_RENDER_HZ),
            logic_hz: read_env_u64("INVADERS_LOGIC_HZ", DEFAULT_LOGIC_HZ),
            diagnostic_ms: read_env_u64("INVADERS_DIAGNOSTIC_MS", DEFAULT_DIAGNOSTIC_MS),
            blink_ms: read_env_u64("INVADERS_BLINK_MS", DEFAULT_BLINK_MS),
            poll_ms: read_env_u64("INVADERS_POLL_MS", DEFAULT_POLL_MS),
            hold_ms: read_env_u64("INVADERS_HOLD_MS", DEFAULT_HOLD_MS),
            log_path: env::var_os("INVADERS_LOG")
                .filter(|value| !value.is_empty())
                .map(PathBuf::from),
            log_directives: env::var(EnvFilter::DEFAULT_ENV)
                .ok()
                .filter(|value| !value.trim().is_empty()),
        }
    }

    /// The user's directives win outright; `info` only fills in when there
    /// are none.
    pub fn log_filter(&self) -> EnvFilter {
        self.log_directives
            .as_deref()
            .and_then(|directives| EnvFilter::try_new(directives).ok())
            .unwrap_or_else(|| EnvFilter::new(DEFAULT_LOG_FILTER))
    }

    pub fn render_period(&self) -> Duration {
        hz_to_period(self.render_hz)
    }

    pub fn logic_period(&self) -> Duration {
        hz_to_period(self.logic_hz)
    }

    pub fn diagnostic_period(&self) -> Duration {
        Duration::from_millis(self.diagnostic_ms)
    }

    pub fn blink_period(&self) -> Duration {
        Duration::from_millis(self.blink_ms)
    }

    pub fn poll_period(&self) -> Duration {
        Duration::from_millis(self.poll_ms)
    }
}

fn hz_to_period(hz: u64) -> Duration {
    Duration::from_nanos(1_000_000_000 / hz.max(1))
}

/// Parses a positive integer variable; missing, malformed or zero values
/// fall back to `default`.
pub fn read_env_u64(name: &str, default: u64) -> u64 {
    env::var(name)
        .ok()
        .and_then(|value| value.parse::<u64>().ok())
        .filter(|value| *value > 0)
        .unwrap_or(default)
}
