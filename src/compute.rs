//! Pure game-logic functions.
//!
//! Every public function takes an immutable reference to the current
//! `GameState` and returns a brand-new `GameState` (or a plain value).  There
//! is no I/O here and no clock: callers pass the time in.

use std::time::Duration;

use crate::config::{Config, EnemyConfig, ScoringRules};
use crate::entities::{EnemyId, EnemyShip, GameState, GameStatus, PlayerShip, Rect};

// ── Constructors ─────────────────────────────────────────────────────────────

/// Horizontal position that centres a ship of `ship_width` on the screen.
pub fn centred_x(screen_width: f32, ship_width: f32) -> f32 {
    screen_width / 2.0 - ship_width / 2.0
}

/// Build the initial game state from the configured geometry.
pub fn init_state(cfg: &Config) -> GameState {
    let screen = &cfg.screen;
    let p = &cfg.player;
    GameState {
        player: PlayerShip {
            x: centred_x(screen.width, p.width),
            y: screen.height - p.height - p.margin,
            width: p.width,
            height: p.height,
            visible: true,
        },
        enemies: Vec::new(),
        score: 0,
        best_score: 0,
        status: GameStatus::Playing,
        screen_width: screen.width,
        screen_height: screen.height,
    }
}

// ── Player position ──────────────────────────────────────────────────────────

/// `current + delta`, clamped to `[0, screen_width - ship_width]`.
///
/// A NaN delta leaves the position where it was.
pub fn clamp_position(current: f32, delta: f32, screen_width: f32, ship_width: f32) -> f32 {
    let max_x = (screen_width - ship_width).max(0.0);
    if delta.is_nan() {
        return current.clamp(0.0, max_x);
    }
    (current + delta).clamp(0.0, max_x)
}

/// Move the player horizontally by `delta`, keeping it fully on screen.
pub fn update_position(state: &GameState, delta: f32) -> GameState {
    let x = clamp_position(
        state.player.x,
        delta,
        state.screen_width,
        state.player.width,
    );
    GameState {
        player: PlayerShip {
            x,
            ..state.player.clone()
        },
        ..state.clone()
    }
}

// ── Collision ────────────────────────────────────────────────────────────────

/// Inclusive overlap test: boxes that share an edge intersect.
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    !(b.x > a.right() || b.right() < a.x || b.y > a.bottom() || b.bottom() < a.y)
}

/// Overlap test used by the tick.  A box still above the top edge (`y < 0`)
/// cannot collide, so a freshly spawned enemy is never a hit.
pub fn collides(a: &Rect, b: &Rect) -> bool {
    if a.y < 0.0 || b.y < 0.0 {
        return false;
    }
    intersects(a, b)
}

/// First enemy (in creation order) touching the player, if any.
pub fn find_collision(state: &GameState) -> Option<EnemyId> {
    let player = state.player.bounds();
    state
        .enemies
        .iter()
        .find(|e| collides(&player, &e.bounds()))
        .map(|e| e.id)
}

// ── Enemy descent ────────────────────────────────────────────────────────────

/// Linear descent from `-height` to `screen_height` over `duration`.
pub fn descent_y(height: f32, screen_height: f32, elapsed: Duration, duration: Duration) -> f32 {
    let t = if duration.is_zero() {
        1.0
    } else {
        (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
    };
    -height + (screen_height + height) * t
}

/// A new enemy at `x`, parked just above the top edge.
pub fn new_enemy(id: EnemyId, x: f32, now: Duration, enemy: &EnemyConfig) -> EnemyShip {
    EnemyShip {
        id,
        x,
        y: -enemy.height,
        width: enemy.width,
        height: enemy.height,
        spawned_at: now,
    }
}

pub fn add_enemy(state: &GameState, enemy: EnemyShip) -> GameState {
    let mut enemies = state.enemies.clone();
    enemies.push(enemy);
    GameState {
        enemies,
        ..state.clone()
    }
}

/// Move every enemy to where its descent puts it at `now`.
pub fn advance_enemies(state: &GameState, now: Duration, descent: Duration) -> GameState {
    let enemies = state
        .enemies
        .iter()
        .map(|e| EnemyShip {
            y: descent_y(
                e.height,
                state.screen_height,
                now.saturating_sub(e.spawned_at),
                descent,
            ),
            ..e.clone()
        })
        .collect();
    GameState {
        enemies,
        ..state.clone()
    }
}

// ── Per-tick scoring ─────────────────────────────────────────────────────────

#[derive(Clone, Debug)]
pub struct TickOutcome {
    pub state: GameState,
    /// The enemy that ended the game this tick.
    pub collision: Option<EnemyId>,
}

/// One collision/scoring step.
///
/// Game over: nothing changes.  Hit: the game ends, the player disappears and
/// the score freezes.  Otherwise the survival reward is added.
pub fn tick(state: &GameState, rules: &ScoringRules) -> TickOutcome {
    if state.is_game_over() {
        return TickOutcome {
            state: state.clone(),
            collision: None,
        };
    }

    if let Some(id) = find_collision(state) {
        return TickOutcome {
            state: GameState {
                player: PlayerShip {
                    visible: false,
                    ..state.player.clone()
                },
                status: GameStatus::GameOver,
                best_score: state.best_score.max(state.score),
                ..state.clone()
            },
            collision: Some(id),
        };
    }

    let score = state.score.saturating_add(rules.survival_reward);
    TickOutcome {
        state: GameState {
            score,
            best_score: state.best_score.max(score),
            ..state.clone()
        },
        collision: None,
    }
}

/// Enemy `id` finished its descent untouched.  Returns `None` when the dodge
/// does not count: the game is over or the enemy is already gone.
pub fn dodge(state: &GameState, id: EnemyId, rules: &ScoringRules) -> Option<GameState> {
    if state.is_game_over() || state.enemy(id).is_none() {
        return None;
    }
    let enemies = state.enemies.iter().filter(|e| e.id != id).cloned().collect();
    let score = state.score.saturating_add(rules.dodge_reward);
    Some(GameState {
        enemies,
        score,
        best_score: state.best_score.max(score),
        ..state.clone()
    })
}

// ── Restart ──────────────────────────────────────────────────────────────────

/// Fresh round: zero score, no enemies, ship centred and visible.  The
/// session best survives.
pub fn restart(state: &GameState) -> GameState {
    GameState {
        player: PlayerShip {
            x: centred_x(state.screen_width, state.player.width),
            visible: true,
            ..state.player.clone()
        },
        enemies: Vec::new(),
        score: 0,
        status: GameStatus::Playing,
        ..state.clone()
    }
}
