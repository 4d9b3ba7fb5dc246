//! All game entity types: pure data, no logic.

use std::time::Duration;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum GameStatus {
    Playing,
    GameOver,
}

/// Creation-order identifier for an enemy.  Ids only ever grow, so sorting
/// by id is the same as sorting by spawn order.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EnemyId(pub u64);

// ── Geometry ──────────────────────────────────────────────────────────────────

/// Axis-aligned box in screen units, `y` growing downward.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f32 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.height
    }
}

// ── Player & enemy ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct PlayerShip {
    pub x: f32,
    /// Fixed for the whole game: `screen_height - height - margin`.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    pub visible: bool,
}

impl PlayerShip {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct EnemyShip {
    pub id: EnemyId,
    pub x: f32,
    /// Animated from `-height` to the screen height over the descent.
    pub y: f32,
    pub width: f32,
    pub height: f32,
    /// Game-clock time the descent started.
    pub spawned_at: Duration,
}

impl EnemyShip {
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

// ── Master game state ─────────────────────────────────────────────────────────

/// Everything the collision and scoring rules look at.  Cloneable so the pure
/// update functions in `compute` can hand back a new copy.
#[derive(Clone, Debug)]
pub struct GameState {
    pub player: PlayerShip,
    /// Active enemies, always in creation order.
    pub enemies: Vec<EnemyShip>,
    pub score: u32,
    /// Best score seen this session (never written anywhere).
    pub best_score: u32,
    pub status: GameStatus,
    pub screen_width: f32,
    pub screen_height: f32,
}

impl GameState {
    pub fn is_game_over(&self) -> bool {
        self.status == GameStatus::GameOver
    }

    pub fn enemy(&self, id: EnemyId) -> Option<&EnemyShip> {
        self.enemies.iter().find(|e| e.id == id)
    }
}
