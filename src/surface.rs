//! Presentation boundary.
//!
//! The controller never draws.  It issues imperative commands against a
//! [`Surface`]: place this sprite, hide that one, show a dialog.  [`Scene`] is
//! the retained implementation the terminal renderer reads from.

use std::collections::BTreeMap;

use crate::entities::EnemyId;

/// Something the surface can draw.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Entity {
    Player,
    /// Shown where the player was hit.
    Explosion,
    Enemy(EnemyId),
}

/// A blocking acknowledgement prompt.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Dialog {
    pub title: String,
    pub message: String,
    /// Label of the only button.
    pub action: String,
}

impl Dialog {
    pub fn game_over() -> Self {
        Self {
            title: "Game Over".into(),
            message: "You've been hit!".into(),
            action: "Restart".into(),
        }
    }
}

pub trait Surface {
    fn set_image(&mut self, entity: Entity, asset: &str);
    fn set_visible(&mut self, entity: Entity, visible: bool);
    fn set_position(&mut self, entity: Entity, x: f32, y: f32);
    fn remove(&mut self, entity: Entity);
    fn set_score(&mut self, score: u32);
    /// Show the prompt.  Acknowledgement comes back as a controller message.
    fn show_dialog(&mut self, dialog: Dialog);
    fn dismiss_dialog(&mut self);
}

// ── Retained scene ────────────────────────────────────────────────────────────

#[derive(Clone, Debug, PartialEq)]
pub struct Sprite {
    pub image: String,
    pub x: f32,
    pub y: f32,
    pub visible: bool,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            image: String::new(),
            x: 0.0,
            y: 0.0,
            visible: true,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Scene {
    sprites: BTreeMap<Entity, Sprite>,
    score: u32,
    dialog: Option<Dialog>,
}

impl Scene {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn sprite(&self, entity: Entity) -> Option<&Sprite> {
        self.sprites.get(&entity)
    }

    /// Sprites in draw order: enemies first, then the player, explosion last.
    pub fn sprites(&self) -> impl Iterator<Item = (Entity, &Sprite)> + '_ {
        let enemies = self
            .sprites
            .iter()
            .filter(|(e, _)| matches!(e, Entity::Enemy(_)));
        let rest = [Entity::Player, Entity::Explosion]
            .into_iter()
            .filter_map(|e| self.sprites.get(&e).map(|s| (e, s)));
        enemies.map(|(e, s)| (*e, s)).chain(rest)
    }

    pub fn enemy_count(&self) -> usize {
        self.sprites
            .keys()
            .filter(|e| matches!(e, Entity::Enemy(_)))
            .count()
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn score_label(&self) -> String {
        format!("HIGH SCORE: {}", self.score)
    }

    pub fn dialog(&self) -> Option<&Dialog> {
        self.dialog.as_ref()
    }

    fn entry(&mut self, entity: Entity) -> &mut Sprite {
        self.sprites.entry(entity).or_default()
    }
}

impl Surface for Scene {
    fn set_image(&mut self, entity: Entity, asset: &str) {
        self.entry(entity).image = asset.to_string();
    }

    fn set_visible(&mut self, entity: Entity, visible: bool) {
        self.entry(entity).visible = visible;
    }

    fn set_position(&mut self, entity: Entity, x: f32, y: f32) {
        let sprite = self.entry(entity);
        sprite.x = x;
        sprite.y = y;
    }

    fn remove(&mut self, entity: Entity) {
        self.sprites.remove(&entity);
    }

    fn set_score(&mut self, score: u32) {
        self.score = score;
    }

    fn show_dialog(&mut self, dialog: Dialog) {
        self.dialog = Some(dialog);
    }

    fn dismiss_dialog(&mut self) {
        self.dialog = None;
    }
}
