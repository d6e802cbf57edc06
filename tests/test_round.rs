use std::sync::{Arc, Mutex};
use std::thread;
use std::time::{Duration, Instant};

use space_invaders::config::GameConfig;
use space_invaders::display::*;
use space_invaders::entities::*;
use space_invaders::indicator::StatusLed;
use space_invaders::input::InputState;
use space_invaders::round::*;
use space_invaders::timing::*;

#[derive(Clone, Default)]
struct LampLog(Arc<Mutex<Vec<bool>>>);

impl LampLog {
    fn history(&self) -> Vec<bool> {
        self.0.lock().unwrap().clone()
    }
}

impl StatusLed for LampLog {
    fn set(&mut self, on: bool) {
        self.0.lock().unwrap().push(on);
    }
}

struct Rig {
    machine: RoundMachine<Framebuffer, LampLog, ManualTiming>,
    timing: ManualTiming,
    screen: Arc<Mutex<Framebuffer>>,
    lamp: LampLog,
    input: Arc<InputState>,
}

fn test_config() -> GameConfig {
    GameConfig {
        blink_ms: 20,
        poll_ms: 5,
        ..GameConfig::default()
    }
}

fn rig() -> Rig {
    let timing = ManualTiming::new();
    let screen = Arc::new(Mutex::new(Framebuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)));
    let lamp = LampLog::default();
    let input = Arc::new(InputState::new(Duration::from_millis(500)));
    let machine = RoundMachine::new(
        Arc::clone(&screen),
        lamp.clone(),
        timing.clone(),
        Arc::clone(&input),
        test_config(),
    )
    .unwrap();
    Rig {
        machine,
        timing,
        screen,
        lamp,
        input,
    }
}

fn wait_until(what: &str, mut cond: impl FnMut() -> bool) {
    let deadline = Instant::now() + Duration::from_secs(5);
    while !cond() {
        assert!(Instant::now() < deadline, "timed out waiting for {what}");
        thread::sleep(Duration::from_millis(2));
    }
}

fn screen_shows(screen: &Mutex<Framebuffer>, text: &str) -> bool {
    screen.lock().unwrap().texts().any(|t| t == text)
}

/// One zap away from losing the last life.
fn about_to_lose(mut state: GameState) -> GameState {
    state.round.lives = 1;
    state.zap = EnemyShot { position: Point::new(150, 220), active: true };
    state
}

/// One shot away from clearing the squad.
fn about_to_win(mut state: GameState) -> GameState {
    for member in state.squad.members.iter_mut().skip(1) {
        member.visible = false;
    }
    state.round.score = NO_OF_INVADERS as u16 - 1;
    state.shot.active = true;
    state.shot.rect = Rect::new(75, 107, SHOT_WIDTH, SHOT_LENGTH);
    state
}

// ── Registration ──────────────────────────────────────────────────────────────

#[test]
fn tasks_registered_disarmed_with_configured_periods() {
    let rig = rig();
    let config = test_config();
    assert!(!rig.timing.is_armed());
    assert_eq!(rig.timing.period(Task::Render), Some(config.render_period()));
    assert_eq!(rig.timing.period(Task::Logic), Some(config.logic_period()));
    assert_eq!(rig.timing.period(Task::Diagnostic), Some(config.diagnostic_period()));
    assert_eq!(rig.machine.phase(), Phase::Init);
}

#[test]
fn no_ticks_before_round_starts() {
    let rig = rig();
    assert!(!rig.timing.fire(Task::Render));
    assert!(!rig.timing.fire(Task::Logic));
    assert_eq!(rig.screen.lock().unwrap().lit_pixels(), 0);
}

// ── INIT → PLAYING ────────────────────────────────────────────────────────────

#[test]
fn start_round_arms_ticks_and_lights_lamp() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();

    assert!(rig.timing.is_armed());
    assert_eq!(rig.machine.phase(), Phase::Playing);
    assert_eq!(rig.lamp.history(), vec![true]);

    let state = rig.machine.shared().snapshot();
    assert_eq!(state.round.phase, Phase::Playing);
    assert_eq!(state.round.lives, START_LIVES);
    assert_eq!(state.round.score, 0);
}

#[test]
fn render_tick_draws_fresh_round() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    assert!(rig.timing.fire(Task::Render));

    let state = rig.machine.shared().snapshot();
    let screen = rig.screen.lock().unwrap();
    assert_eq!(screen.pixel(state.ship.rect.left, state.ship.rect.top), Some(C_SHIP));
    assert_eq!(screen.text_at(SCORE_AT.x, SCORE_AT.y), Some("000"));
}

#[test]
fn logic_tick_drains_rotary() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    let start = rig.machine.shared().snapshot().ship.rect;

    rig.input.rotate(3);
    assert!(rig.timing.fire(Task::Logic));

    assert_eq!(rig.machine.shared().snapshot().ship.rect, start.translate(-SHIP_STEP, 0));
    assert_eq!(rig.input.take_rotary(), 0);
}

#[test]
fn diagnostic_tick_samples_frame_counter() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    let shared = rig.machine.shared();

    assert_eq!(rig.timing.fire_n(Task::Render, 5), 5);
    assert!(rig.timing.fire(Task::Diagnostic));
    assert_eq!(shared.frames_per_second(), 5);

    assert!(rig.timing.fire(Task::Diagnostic));
    assert_eq!(shared.frames_per_second(), 0);
}

// ── PLAYING → WON / LOST ──────────────────────────────────────────────────────

#[test]
fn losing_last_life_ends_round() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    let shared = rig.machine.shared();
    shared.replace_state(about_to_lose(shared.snapshot()));

    assert!(rig.timing.fire(Task::Logic));
    assert_eq!(rig.machine.wait_round_end(), RoundEnd::Finished(Outcome::Lost));
    assert_eq!(shared.lives(), 0);

    rig.machine.finish_round(Outcome::Lost).unwrap();
    assert!(!rig.timing.is_armed());
    assert_eq!(rig.machine.phase(), Phase::Lost);
    assert_eq!(rig.lamp.history(), vec![true, false]);
    assert!(screen_shows(&rig.screen, LOST_MESSAGE));
    assert!(screen_shows(&rig.screen, RESTART_PROMPT));
    assert!(!screen_shows(&rig.screen, WON_MESSAGE));
}

#[test]
fn clearing_squad_ends_round() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    let shared = rig.machine.shared();
    shared.replace_state(about_to_win(shared.snapshot()));

    assert!(rig.timing.fire(Task::Logic));
    assert_eq!(rig.machine.wait_round_end(), RoundEnd::Finished(Outcome::Won));
    assert_eq!(shared.score(), NO_OF_INVADERS as u16);

    rig.machine.finish_round(Outcome::Won).unwrap();
    assert_eq!(rig.machine.phase(), Phase::Won);
    assert!(screen_shows(&rig.screen, WON_MESSAGE));
    assert!(!screen_shows(&rig.screen, LOST_MESSAGE));
}

#[test]
fn nothing_moves_after_finish() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    let shared = rig.machine.shared();
    shared.replace_state(about_to_lose(shared.snapshot()));
    rig.timing.fire(Task::Logic);
    rig.machine.finish_round(Outcome::Lost).unwrap();

    let frozen = shared.snapshot();
    let screen = rig.screen.lock().unwrap().clone();
    rig.input.rotate(5);
    assert!(!rig.timing.fire(Task::Logic));
    assert!(!rig.timing.fire(Task::Render));

    assert_eq!(shared.snapshot(), frozen);
    assert_eq!(*rig.screen.lock().unwrap(), screen);
}

#[test]
fn decided_round_reports_once() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    let shared = rig.machine.shared();
    shared.replace_state(about_to_lose(shared.snapshot()));

    rig.timing.fire_n(Task::Logic, 3);
    assert_eq!(shared.snapshot().round.lives, 0);
    assert_eq!(shared.snapshot().round.phase, Phase::Lost);
    assert_eq!(rig.machine.wait_round_end(), RoundEnd::Finished(Outcome::Lost));
}

// ── AWAIT_RESTART ─────────────────────────────────────────────────────────────

#[test]
fn restart_press_returns_to_init() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    rig.machine.finish_round(Outcome::Lost).unwrap();

    let input = Arc::clone(&rig.input);
    let presser = thread::spawn(move || {
        thread::sleep(Duration::from_millis(120));
        input.press_restart();
    });

    assert!(rig.machine.await_restart().unwrap());
    presser.join().unwrap();

    assert_eq!(rig.machine.phase(), Phase::Init);
    assert!(!rig.input.restart_down());
    let screen = rig.screen.lock().unwrap();
    assert_eq!(screen.texts().count(), 0);
    assert_eq!(screen.lit_pixels(), 0);

    // Lamp went on for play, off at the end, blinked, and is left off.
    let history = rig.lamp.history();
    assert_eq!(&history[..2], &[true, false]);
    let blinks = &history[2..history.len() - 1];
    assert!(blinks.len() >= 2, "lamp never blinked: {history:?}");
    assert!(blinks.windows(2).all(|w| w[0] != w[1]));
    assert_eq!(history.last(), Some(&false));
}

#[test]
fn quit_while_awaiting_restart() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    rig.machine.finish_round(Outcome::Won).unwrap();

    rig.machine.shared().request_quit();
    assert!(!rig.machine.await_restart().unwrap());
    assert_eq!(rig.lamp.history().last(), Some(&false));
    assert!(screen_shows(&rig.screen, WON_MESSAGE));
}

#[test]
fn quit_wakes_waiting_controller() {
    let mut rig = rig();
    rig.machine.start_round().unwrap();
    let shared = rig.machine.shared();

    let quitter = thread::spawn(move || {
        thread::sleep(Duration::from_millis(50));
        shared.request_quit();
    });
    assert_eq!(rig.machine.wait_round_end(), RoundEnd::Quit);
    quitter.join().unwrap();
}

#[test]
fn quit_before_round_start_is_not_lost() {
    let mut rig = rig();
    rig.machine.shared().request_quit();
    rig.machine.start_round().unwrap();
    assert_eq!(rig.machine.wait_round_end(), RoundEnd::Quit);
}

#[test]
fn render_tick_through_trait_object() {
    let screen = Arc::new(Mutex::new(Framebuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)));
    let dynamic: Arc<Mutex<dyn Display>> = screen.clone();
    let shared = SharedGame::new(
        Arc::new(InputState::new(Duration::from_millis(130))),
        DISPLAY_WIDTH,
        DISPLAY_HEIGHT,
    );

    shared.render_tick(&*dynamic);

    let ship = shared.snapshot().ship.rect;
    assert_eq!(screen.lock().unwrap().pixel(ship.left, ship.top), Some(C_SHIP));
}

// ── Full loop ─────────────────────────────────────────────────────────────────

#[test]
fn run_returns_when_quit_already_requested() {
    let mut rig = rig();
    rig.input.request_quit();
    rig.machine.run().unwrap();
    assert!(!rig.timing.is_armed());
    assert!(rig.lamp.history().is_empty());
}

#[test]
fn run_plays_lose_restart_quit() {
    let Rig {
        mut machine,
        timing,
        screen,
        lamp: _lamp,
        input,
    } = rig();
    let shared = machine.shared();
    let controller = thread::spawn(move || machine.run());

    wait_until("first round", || timing.is_armed());
    shared.replace_state(about_to_lose(shared.snapshot()));
    timing.fire(Task::Logic);

    wait_until("lost screen", || screen_shows(&screen, LOST_MESSAGE));
    assert!(!timing.is_armed());
    input.press_restart();

    wait_until("second round", || timing.is_armed());
    let fresh = shared.snapshot();
    assert_eq!(fresh.round.lives, START_LIVES);
    assert_eq!(fresh.round.phase, Phase::Playing);

    shared.request_quit();
    controller.join().unwrap().unwrap();
    assert!(!timing.is_armed());
}

#[test]
fn threaded_ticks_draw_the_round() {
    let screen = Arc::new(Mutex::new(Framebuffer::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)));
    let input = Arc::new(InputState::new(Duration::from_millis(130)));
    let mut machine = RoundMachine::new(
        Arc::clone(&screen),
        LampLog::default(),
        ThreadTiming::new(),
        Arc::clone(&input),
        test_config(),
    )
    .unwrap();
    let shared = machine.shared();
    let controller = thread::spawn(move || machine.run());

    let ship = Ship::start(DISPLAY_WIDTH, DISPLAY_HEIGHT).rect;
    wait_until("first frame", || {
        screen.lock().unwrap().pixel(ship.left, ship.top) == Some(C_SHIP)
    });
    wait_until("squad to start marching", || {
        shared.snapshot().squad.move_timer > 0
    });

    shared.request_quit();
    controller.join().unwrap().unwrap();
}
