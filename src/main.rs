use std::fs::File;
use std::io::{stdout, BufWriter, Stdout};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use anyhow::Context;
use crossterm::{
    cursor,
    event::{
        self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers, KeyboardEnhancementFlags,
        PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags,
    },
    terminal, ExecutableCommand,
};

use space_invaders::config::GameConfig;
use space_invaders::display::TerminalDisplay;
use space_invaders::entities::{DISPLAY_HEIGHT, DISPLAY_WIDTH};
use space_invaders::indicator::DisplayLed;
use space_invaders::input::InputState;
use space_invaders::round::{RoundMachine, SharedGame};
use space_invaders::timing::ThreadTiming;

type Screen = TerminalDisplay<BufWriter<Stdout>>;

// ── Logging ───────────────────────────────────────────────────────────────────

/// stdout is the playfield, so events only go somewhere when a log file is
/// configured.
fn init_logging(config: &GameConfig) -> anyhow::Result<()> {
    let Some(path) = &config.log_path else {
        return Ok(());
    };
    let file = File::create(path).with_context(|| format!("creating log file {}", path.display()))?;
    tracing_subscriber::fmt()
        .with_env_filter(config.log_filter())
        .with_ansi(false)
        .with_writer(Mutex::new(file))
        .init();
    Ok(())
}

// ── Input ─────────────────────────────────────────────────────────────────────

/// Translates key events into the rotary / button signals.
///
/// Terminals with keyboard enhancement report releases, which drop a button
/// immediately; elsewhere a press simply expires after the hold window while
/// OS key repeat keeps refreshing it.
fn pump_input(game: &SharedGame) {
    while let Ok(event) = event::read() {
        let Event::Key(KeyEvent {
            code,
            kind,
            modifiers,
            ..
        }) = event
        else {
            continue;
        };
        let input = game.input();
        let held = matches!(kind, KeyEventKind::Press | KeyEventKind::Repeat);

        match code {
            KeyCode::Char('q') | KeyCode::Char('Q') | KeyCode::Esc if held => {
                game.request_quit();
                break;
            }
            KeyCode::Char('c') if held && modifiers.contains(KeyModifiers::CONTROL) => {
                game.request_quit();
                break;
            }
            KeyCode::Left | KeyCode::Char('a') | KeyCode::Char('A') if held => input.rotate(1),
            KeyCode::Right | KeyCode::Char('d') | KeyCode::Char('D') if held => input.rotate(-1),
            KeyCode::Char(' ') if held => input.press_fire(),
            KeyCode::Char(' ') => input.release_fire(),
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') if held => {
                input.press_restart()
            }
            KeyCode::Enter | KeyCode::Char('r') | KeyCode::Char('R') => input.release_restart(),
            _ => {}
        }
    }
}

// ── Entry point ───────────────────────────────────────────────────────────────

fn main() -> anyhow::Result<()> {
    let config = GameConfig::from_env();
    init_logging(&config)?;

    let (cols, rows) = terminal::size().context("querying terminal size")?;
    Screen::check_fits(DISPLAY_WIDTH, DISPLAY_HEIGHT, cols, rows)?;

    let mut out = stdout();
    terminal::enable_raw_mode()?;
    out.execute(terminal::EnterAlternateScreen)?;
    out.execute(cursor::Hide)?;

    // Ask for key-release events; terminals without support fall back to
    // the hold window.
    let keyboard_enhanced = out
        .execute(PushKeyboardEnhancementFlags(
            KeyboardEnhancementFlags::REPORT_EVENT_TYPES,
        ))
        .is_ok();

    let result = run(config);

    // Always restore the terminal
    if keyboard_enhanced {
        let _ = out.execute(PopKeyboardEnhancementFlags);
    }
    let _ = out.execute(cursor::Show);
    let _ = out.execute(terminal::LeaveAlternateScreen);
    let _ = terminal::disable_raw_mode();

    result
}

fn run(config: GameConfig) -> anyhow::Result<()> {
    let input = Arc::new(InputState::new(Duration::from_millis(config.hold_ms)));
    let display = Arc::new(Mutex::new(Screen::new(
        BufWriter::new(stdout()),
        DISPLAY_WIDTH,
        DISPLAY_HEIGHT,
    )));
    let led = DisplayLed::new(Arc::clone(&display));

    let mut machine = RoundMachine::new(display, led, ThreadTiming::new(), input, config)
        .context("registering tick tasks")?;

    // Blocking reads get their own thread so no tick ever waits on I/O.
    let game = machine.shared();
    thread::spawn(move || pump_input(&game));

    machine.run()?;
    Ok(())
}
