/// All game entity types and the fixed tables they are built from.
///
/// Every type here is plain `Copy` data with fixed capacity, so a whole
/// `GameState` can be produced by value once per logic tick.

// ── Screen & geometry constants ──────────────────────────────────────────────

pub const DISPLAY_WIDTH: i32 = 320;
pub const DISPLAY_HEIGHT: i32 = 240;

pub const SHIP_WIDTH: i32 = 40;
pub const SHIP_HEIGHT: i32 = 10;
/// Horizontal distance the ship moves per rotary detent.
pub const SHIP_STEP: i32 = 7;

pub const SHOT_WIDTH: i32 = 2;
pub const SHOT_LENGTH: i32 = 10;
pub const SHOT_VELOCITY: i32 = 2;

pub const NO_OF_INVADERS: usize = 12;
pub const HIT_BOX_SIZE: i32 = 23;
/// Slack on the left edge of the invader hit box.
pub const HIT_BOX_TOLERANCE: i32 = 2;
pub const SQUAD_STEP: i32 = 20;
pub const SQUAD_MOVE_PERIOD: u32 = 75;
pub const SQUAD_LEFT_LIMIT: i32 = 40;
/// The squad turns once its rightmost member passes `width - SQUAD_RIGHT_MARGIN`.
pub const SQUAD_RIGHT_MARGIN: i32 = 45;

pub const ZAP_PERIOD: u32 = 100;
pub const ZAP_OFFSET: Point = Point { x: 8, y: 15 };
pub const ZAP_VELOCITY: i32 = 2;
pub const ZAP_WIDTH: i32 = 3;
pub const ZAP_HEIGHT: i32 = 15;
/// Number of targeting entries probed per spawn cycle.
pub const ZAP_SCAN_LIMIT: usize = 23;

pub const START_LIVES: u8 = 3;

/// Starting squad, column by column: even indices are the bottom row.
pub const SQUAD_START: [Point; NO_OF_INVADERS] = [
    Point { x: 70, y: 100 },
    Point { x: 70, y: 70 },
    Point { x: 100, y: 100 },
    Point { x: 100, y: 70 },
    Point { x: 130, y: 100 },
    Point { x: 130, y: 70 },
    Point { x: 160, y: 100 },
    Point { x: 160, y: 70 },
    Point { x: 190, y: 100 },
    Point { x: 190, y: 70 },
    Point { x: 220, y: 100 },
    Point { x: 220, y: 70 },
];

/// Two interleaved passes over the twelve squad slots.
pub const TARGETING_TABLE: [usize; 24] = [
    1, 8, 2, 11, 5, 10, 3, 6, 0, 9, 4, 7, 2, 11, 5, 8, 1, 3, 9, 6, 0, 7, 10, 4,
];

// ── Primitives ───────────────────────────────────────────────────────────────

/// Axis-aligned box, half-open: `left..right` by `top..bottom`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Rect {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, width: i32, height: i32) -> Self {
        Self {
            left,
            right: left + width,
            top,
            bottom: top + height,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub fn translate(&self, dx: i32, dy: i32) -> Rect {
        Rect {
            left: self.left + dx,
            right: self.right + dx,
            top: self.top + dy,
            bottom: self.bottom + dy,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Point {
    pub x: i32,
    pub y: i32,
}

impl Point {
    pub const ORIGIN: Point = Point { x: 0, y: 0 };

    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    pub fn offset(&self, by: Point) -> Point {
        Point {
            x: self.x + by.x,
            y: self.y + by.y,
        }
    }
}

// ── Player side ──────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Ship {
    pub rect: Rect,
}

impl Ship {
    /// Centred on the bottom edge of a `width` × `height` screen.
    pub fn start(width: i32, height: i32) -> Self {
        Self {
            rect: Rect::new(
                (width - SHIP_WIDTH) / 2,
                height - SHIP_HEIGHT,
                SHIP_WIDTH,
                SHIP_HEIGHT,
            ),
        }
    }

    /// Where a fresh player shot sits: centred on, and just above, the ship.
    pub fn muzzle(&self) -> Rect {
        let centre = self.rect.left + self.rect.width() / 2;
        Rect::new(
            centre - SHOT_WIDTH / 2,
            self.rect.top - SHOT_LENGTH,
            SHOT_WIDTH,
            SHOT_LENGTH,
        )
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PlayerShot {
    pub rect: Rect,
    pub active: bool,
    /// Tracks the ship; the shot returns here whenever it is reset.
    pub spawn: Rect,
}

impl PlayerShot {
    pub fn docked(ship: &Ship) -> Self {
        let spawn = ship.muzzle();
        Self {
            rect: spawn,
            active: false,
            spawn,
        }
    }

    pub fn reset(&mut self) {
        self.active = false;
        self.rect = self.spawn;
    }
}

// ── Invader side ─────────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Invader {
    pub position: Point,
    pub visible: bool,
}

/// The twelve invaders, always translated as one rigid body.
///
/// Members are stored in the column order they were created in. Because
/// every move applies the same delta to all of them that order never
/// changes, but the edge checks go through [`Squad::leftmost_x`] and
/// [`Squad::rightmost_x`] so they do not depend on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Squad {
    pub members: [Invader; NO_OF_INVADERS],
    pub step: i32,
    /// +1 marching right, -1 marching left.
    pub direction: i32,
    pub move_timer: u32,
}

impl Squad {
    pub fn start() -> Self {
        Self {
            members: SQUAD_START.map(|position| Invader {
                position,
                visible: true,
            }),
            step: SQUAD_STEP,
            direction: 1,
            move_timer: 0,
        }
    }

    pub fn leftmost_x(&self) -> i32 {
        self.members
            .iter()
            .map(|m| m.position.x)
            .min()
            .unwrap_or(0)
    }

    pub fn rightmost_x(&self) -> i32 {
        self.members
            .iter()
            .map(|m| m.position.x)
            .max()
            .unwrap_or(0)
    }

    pub fn visible_count(&self) -> usize {
        self.members.iter().filter(|m| m.visible).count()
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct EnemyShot {
    pub position: Point,
    pub active: bool,
}

impl EnemyShot {
    /// Inactive and parked at the origin.
    pub fn clear(&mut self) {
        self.active = false;
        self.position = Point::ORIGIN;
    }
}

/// Cursor over [`TARGETING_TABLE`], picking which invader fires next.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TargetingSequence {
    pub cursor: usize,
}

impl TargetingSequence {
    /// Advances the cursor (wrapping) and returns the squad slot it lands on.
    pub fn advance(&mut self) -> usize {
        self.cursor = (self.cursor + 1) % TARGETING_TABLE.len();
        TARGETING_TABLE[self.cursor]
    }

    /// Probes at most [`ZAP_SCAN_LIMIT`] entries and returns the first slot
    /// whose invader is still visible.
    pub fn next_visible(&mut self, squad: &Squad) -> Option<usize> {
        (0..ZAP_SCAN_LIMIT)
            .map(|_| self.advance())
            .find(|&slot| squad.members[slot].visible)
    }
}

// ── Round bookkeeping ────────────────────────────────────────────────────────

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Phase {
    Init,
    Playing,
    Won,
    Lost,
    AwaitRestart,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Outcome {
    Won,
    Lost,
}

impl From<Outcome> for Phase {
    fn from(outcome: Outcome) -> Self {
        match outcome {
            Outcome::Won => Phase::Won,
            Outcome::Lost => Phase::Lost,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RoundState {
    pub lives: u8,
    pub score: u16,
    pub phase: Phase,
}

impl RoundState {
    pub fn fresh() -> Self {
        Self {
            lives: START_LIVES,
            score: 0,
            phase: Phase::Init,
        }
    }

    /// Lives running out and the squad being cleared are checked in that
    /// order; the logic tick guarantees they never coincide.
    pub fn outcome(&self) -> Option<Outcome> {
        if self.lives == 0 {
            Some(Outcome::Lost)
        } else if self.score as usize >= NO_OF_INVADERS {
            Some(Outcome::Won)
        } else {
            None
        }
    }
}

// ── Master game state ────────────────────────────────────────────────────────

/// Everything the logic tick evolves. Created fresh at round start.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GameState {
    pub ship: Ship,
    pub shot: PlayerShot,
    pub squad: Squad,
    pub zap: EnemyShot,
    pub targeting: TargetingSequence,
    pub round: RoundState,
    pub zap_timer: u32,
    pub width: i32,
    pub height: i32,
}

impl GameState {
    pub fn new(width: i32, height: i32) -> Self {
        let ship = Ship::start(width, height);
        Self {
            ship,
            shot: PlayerShot::docked(&ship),
            squad: Squad::start(),
            zap: EnemyShot::default(),
            targeting: TargetingSequence::default(),
            round: RoundState::fresh(),
            zap_timer: 0,
            width,
            height,
        }
    }
}

impl Default for GameState {
    fn default() -> Self {
        Self::new(DISPLAY_WIDTH, DISPLAY_HEIGHT)
    }
}
