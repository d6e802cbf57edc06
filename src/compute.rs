/// Pure game-logic functions.
///
/// [`tick`] takes an immutable reference to the current `GameState` plus the
/// inputs sampled for this tick and returns the next `GameState`. Nothing is
/// shared while a tick is being computed, so callers can commit the result
/// in one assignment and no other stage ever sees a half-applied tick.

use tracing::{debug, info, trace};

use crate::entities::{
    GameState, Outcome, Point, Rect, HIT_BOX_SIZE, HIT_BOX_TOLERANCE, NO_OF_INVADERS,
    SHIP_STEP, SHOT_VELOCITY, SQUAD_LEFT_LIMIT, SQUAD_MOVE_PERIOD, SQUAD_RIGHT_MARGIN,
    ZAP_HEIGHT, ZAP_OFFSET, ZAP_PERIOD, ZAP_VELOCITY, ZAP_WIDTH,
};

/// Inputs consumed by one logic tick.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct TickInput {
    /// Accumulated rotary delta since the previous tick. Positive turns move
    /// the ship left.
    pub rotary: i32,
    /// Fire button level.
    pub fire: bool,
}

// ── Per-tick update ──────────────────────────────────────────────────────────

/// Advance the simulation by one logic tick.
///
/// Once the round has an outcome the state is returned unchanged. A tick
/// that clears the squad stops right after collision handling, so the same
/// tick can never also cost the last life.
pub fn tick(state: &GameState, input: &TickInput) -> GameState {
    let mut next = *state;
    if next.round.outcome().is_some() {
        return next;
    }

    // ── 1. Player shot ───────────────────────────────────────────────────────
    move_player_shot(&mut next, input.fire);

    // ── 2. Ship ──────────────────────────────────────────────────────────────
    move_ship(&mut next, input.rotary);

    // ── 3. Player shot ↔ invaders ────────────────────────────────────────────
    resolve_invader_hits(&mut next);
    if next.round.outcome() == Some(Outcome::Won) {
        next.round.phase = Outcome::Won.into();
        info!(score = next.round.score, "squad destroyed");
        return next;
    }

    // ── 4. Squad march ───────────────────────────────────────────────────────
    march_squad(&mut next);

    // ── 5. Enemy shot spawn ──────────────────────────────────────────────────
    spawn_zap(&mut next);

    // ── 6. Enemy shot flight ─────────────────────────────────────────────────
    move_zap(&mut next);

    if let Some(outcome) = next.round.outcome() {
        next.round.phase = outcome.into();
        info!(?outcome, score = next.round.score, "round decided");
    }
    next
}

fn move_player_shot(s: &mut GameState, fire: bool) {
    if s.shot.active {
        s.shot.rect = s.shot.rect.translate(0, -SHOT_VELOCITY);
    }
    if fire && !s.shot.active {
        s.shot.active = true;
        s.shot.rect = s.shot.spawn;
    }
    if s.shot.rect.top < 0 {
        s.shot.reset();
    }
}

fn move_ship(s: &mut GameState, rotary: i32) {
    let ship = s.ship.rect;
    // Only whole steps; a step that would not fit is dropped.
    let dx = match rotary.signum() {
        1 if ship.left >= SHIP_STEP => -SHIP_STEP,
        -1 if ship.right < s.width - SHIP_STEP => SHIP_STEP,
        _ => 0,
    };
    if dx == 0 {
        return;
    }

    s.ship.rect = ship.translate(dx, 0);
    s.shot.spawn = s.shot.spawn.translate(dx, 0);
    // A shot in flight keeps its own course.
    if !s.shot.active {
        s.shot.rect = s.shot.rect.translate(dx, 0);
    }
}

/// True when `shot` lies inside the hit box anchored at `invader`.
pub fn shot_hits_invader(shot: &Rect, invader: Point) -> bool {
    shot.left > invader.x - HIT_BOX_TOLERANCE
        && shot.right < invader.x + HIT_BOX_SIZE
        && shot.top > invader.y
        && shot.bottom < invader.y + HIT_BOX_SIZE
}

// Every member is tested even after a hit; the reset shot cannot land in
// a second box, so the scan is left running rather than cut short.
fn resolve_invader_hits(s: &mut GameState) {
    for slot in 0..NO_OF_INVADERS {
        let invader = s.squad.members[slot];
        if s.shot.active && invader.visible && shot_hits_invader(&s.shot.rect, invader.position)
        {
            s.squad.members[slot].visible = false;
            s.shot.reset();
            s.round.score += 1;
            debug!(slot, score = s.round.score, "invader hit");
        }
    }
}

fn march_squad(s: &mut GameState) {
    if s.squad.rightmost_x() > s.width - SQUAD_RIGHT_MARGIN {
        s.squad.direction = -1;
    }
    if s.squad.leftmost_x() < SQUAD_LEFT_LIMIT {
        s.squad.direction = 1;
    }

    s.squad.move_timer += 1;
    if s.squad.move_timer >= SQUAD_MOVE_PERIOD {
        s.squad.move_timer = 0;
        let dx = s.squad.direction * s.squad.step;
        for member in s.squad.members.iter_mut() {
            member.position.x += dx;
        }
    }
}

fn spawn_zap(s: &mut GameState) {
    s.zap_timer += 1;
    if s.zap_timer < ZAP_PERIOD {
        return;
    }
    s.zap_timer = 0;

    // The shot is armed even if nobody is found to fire it; it then carries
    // on from wherever it last was.
    s.zap.active = true;
    match s.targeting.next_visible(&s.squad) {
        Some(slot) => {
            s.zap.position = s.squad.members[slot].position.offset(ZAP_OFFSET);
            trace!(slot, x = s.zap.position.x, y = s.zap.position.y, "enemy shot spawned");
        }
        None => debug!(
            cursor = s.targeting.cursor,
            "no visible invader in scan window"
        ),
    }
}

fn move_zap(s: &mut GameState) {
    if !s.zap.active {
        return;
    }
    s.zap.position.y += ZAP_VELOCITY;
    let zap = s.zap.position;

    if zap.y + ZAP_HEIGHT > s.height {
        s.zap.clear();
        return;
    }

    let ship = s.ship.rect;
    if zap.x < ship.right && zap.x + ZAP_WIDTH > ship.left && zap.y + ZAP_HEIGHT - 1 > ship.top {
        s.round.lives = s.round.lives.saturating_sub(1);
        s.zap.clear();
        debug!(lives = s.round.lives, "ship hit");
        return;
    }

    let shot = s.shot.rect;
    if s.shot.active
        && shot.top > zap.y - 3
        && shot.bottom < zap.y + ZAP_HEIGHT
        && shot.left > zap.x - 3
        && shot.right < zap.x + 8
    {
        s.zap.clear();
        s.shot.reset();
        debug!("shots collided");
    }
}
