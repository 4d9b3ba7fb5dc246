//! Rendering layer: all terminal I/O lives here.
//!
//! Each function receives a mutable writer and an immutable view of the
//! retained [`Scene`].  No game logic is performed; this module only scales
//! screen units to terminal cells and translates sprites into terminal
//! commands.

use std::io::Write;

use crossterm::{
    cursor,
    style::{self, Color, Print},
    terminal,
    QueueableCommand,
};

use crate::surface::{Dialog, Entity, Scene, Sprite};

// ── Colour palette ────────────────────────────────────────────────────────────

const C_BORDER: Color = Color::DarkBlue;
const C_HUD_SCORE: Color = Color::Yellow;
const C_PLAYER: Color = Color::White;
const C_ENEMY: Color = Color::Green;
const C_EXPLOSION: Color = Color::Red;
const C_HINT: Color = Color::DarkGrey;

// ── Sprites ───────────────────────────────────────────────────────────────────

/// Two-row, three-column glyphs, picked by image asset.
struct Glyph {
    top: &'static str,
    bottom: &'static str,
    color: Color,
}

static PLAYER: Glyph = Glyph { top: " ▲ ", bottom: "/█\\", color: C_PLAYER };
static ENEMY: Glyph = Glyph { top: "«▼»", bottom: "╚═╝", color: C_ENEMY };
static EXPLOSION: Glyph = Glyph { top: "\\|/", bottom: "/|\\", color: C_EXPLOSION };

fn glyph_for(entity: Entity, sprite: &Sprite) -> &'static Glyph {
    let image = sprite.image.to_ascii_lowercase();
    if image.contains("explosion") {
        &EXPLOSION
    } else if image.contains("enem") || image.contains("dark") {
        &ENEMY
    } else {
        match entity {
            Entity::Enemy(_) => &ENEMY,
            Entity::Explosion => &EXPLOSION,
            Entity::Player => &PLAYER,
        }
    }
}

// ── Scaling ───────────────────────────────────────────────────────────────────

/// Maps screen units onto the bordered play area of the terminal.
///
/// Row 0 is the HUD, row 1 and row `rows-2` are the border, the last row holds
/// the controls hint.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Viewport {
    pub cols: u16,
    pub rows: u16,
    pub world_width: f32,
    pub world_height: f32,
}

impl Viewport {
    pub fn new(cols: u16, rows: u16, world_width: f32, world_height: f32) -> Self {
        Self { cols, rows, world_width, world_height }
    }

    fn field_cols(&self) -> u16 {
        self.cols.saturating_sub(2)
    }

    fn field_rows(&self) -> u16 {
        self.rows.saturating_sub(4)
    }

    /// Terminal cell of the top-left corner of a sprite at `(x, y)`, or
    /// `None` when that point is outside the play area.
    pub fn to_cell(&self, x: f32, y: f32) -> Option<(u16, u16)> {
        if x < 0.0 || y < 0.0 || x >= self.world_width || y >= self.world_height {
            return None;
        }
        let col = (x / self.world_width * self.field_cols() as f32) as u16;
        let row = (y / self.world_height * self.field_rows() as f32) as u16;
        Some((1 + col, 2 + row))
    }
}

// ── Public entry point ────────────────────────────────────────────────────────

/// Render one complete frame.
pub fn render<W: Write>(out: &mut W, scene: &Scene, view: &Viewport) -> std::io::Result<()> {
    out.queue(terminal::Clear(terminal::ClearType::All))?;

    draw_border(out, view)?;
    draw_hud(out, scene)?;

    for (entity, sprite) in scene.sprites() {
        if sprite.visible {
            draw_sprite(out, entity, sprite, view)?;
        }
    }

    draw_controls_hint(out, view)?;

    if let Some(dialog) = scene.dialog() {
        draw_dialog(out, dialog, view)?;
    }

    // Park cursor in a harmless spot and flush
    out.queue(style::ResetColor)?;
    out.queue(cursor::MoveTo(0, view.rows.saturating_sub(1)))?;
    out.flush()?;
    Ok(())
}

// ── Border ────────────────────────────────────────────────────────────────────

fn draw_border<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    let w = view.cols as usize;
    let h = view.rows;

    out.queue(style::SetForegroundColor(C_BORDER))?;

    out.queue(cursor::MoveTo(0, 1))?;
    out.queue(Print(format!("┌{}┐", "─".repeat(w.saturating_sub(2)))))?;

    out.queue(cursor::MoveTo(0, h.saturating_sub(2)))?;
    out.queue(Print(format!("└{}┘", "─".repeat(w.saturating_sub(2)))))?;

    for row in 2..h.saturating_sub(2) {
        out.queue(cursor::MoveTo(0, row))?;
        out.queue(Print("│"))?;
        out.queue(cursor::MoveTo(view.cols.saturating_sub(1), row))?;
        out.queue(Print("│"))?;
    }

    Ok(())
}

// ── HUD (row 0) ───────────────────────────────────────────────────────────────

fn draw_hud<W: Write>(out: &mut W, scene: &Scene) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, 0))?;
    out.queue(style::SetForegroundColor(C_HUD_SCORE))?;
    out.queue(Print(scene.score_label()))?;
    Ok(())
}

// ── Entities ──────────────────────────────────────────────────────────────────

fn draw_sprite<W: Write>(
    out: &mut W,
    entity: Entity,
    sprite: &Sprite,
    view: &Viewport,
) -> std::io::Result<()> {
    // Enemies above the top edge are not drawn until they enter.
    let Some((col, row)) = view.to_cell(sprite.x, sprite.y) else {
        return Ok(());
    };
    let glyph = glyph_for(entity, sprite);
    let bottom_border = view.rows.saturating_sub(2);
    // Keep the 3-wide glyph inside the side walls.
    let col = col.min(view.cols.saturating_sub(4)).max(1);

    out.queue(style::SetForegroundColor(glyph.color))?;
    out.queue(cursor::MoveTo(col, row))?;
    out.queue(Print(glyph.top))?;
    if row + 1 < bottom_border {
        out.queue(cursor::MoveTo(col, row + 1))?;
        out.queue(Print(glyph.bottom))?;
    }
    Ok(())
}

// ── Controls hint (last row) ──────────────────────────────────────────────────

fn draw_controls_hint<W: Write>(out: &mut W, view: &Viewport) -> std::io::Result<()> {
    out.queue(cursor::MoveTo(1, view.rows.saturating_sub(1)))?;
    out.queue(style::SetForegroundColor(C_HINT))?;
    out.queue(Print("← → / A D : Tilt   Q : Quit"))?;
    Ok(())
}

// ── Game-over dialog ──────────────────────────────────────────────────────────

fn draw_dialog<W: Write>(out: &mut W, dialog: &Dialog, view: &Viewport) -> std::io::Result<()> {
    let button = format!("[ Enter: {} ]", dialog.action);
    let inner = dialog
        .title
        .chars()
        .count()
        .max(dialog.message.chars().count())
        .max(button.chars().count())
        + 4;

    let rule = "═".repeat(inner);
    let boxed = |text: &str| format!("║{:^inner$}║", text, inner = inner);
    let lines: [(String, Color); 6] = [
        (format!("╔{rule}╗"), Color::Red),
        (boxed(&dialog.title), Color::Red),
        (boxed(""), Color::Red),
        (boxed(&dialog.message), Color::Yellow),
        (boxed(&button), Color::White),
        (format!("╚{rule}╝"), Color::Red),
    ];

    let cx = view.cols / 2;
    let start_row = (view.rows / 2).saturating_sub(lines.len() as u16 / 2);

    for (i, (msg, color)) in lines.iter().enumerate() {
        let row = start_row + i as u16;
        let col = cx.saturating_sub(msg.chars().count() as u16 / 2);
        out.queue(cursor::MoveTo(col, row))?;
        out.queue(style::SetForegroundColor(*color))?;
        out.queue(Print(msg))?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::surface::Surface;

    #[test]
    fn origin_maps_to_top_left_of_play_area() {
        let v = Viewport::new(42, 24, 400.0, 700.0);
        assert_eq!(v.to_cell(0.0, 0.0), Some((1, 2)));
    }

    #[test]
    fn far_edge_stays_inside_play_area() {
        let v = Viewport::new(42, 24, 400.0, 700.0);
        let (col, row) = v.to_cell(399.9, 699.9).unwrap();
        assert!(col <= 40);
        assert!(row < 22);
    }

    #[test]
    fn points_off_screen_are_not_drawn() {
        let v = Viewport::new(42, 24, 400.0, 700.0);
        assert_eq!(v.to_cell(10.0, -50.0), None);
        assert_eq!(v.to_cell(10.0, 700.0), None);
        assert_eq!(v.to_cell(-1.0, 10.0), None);
    }

    #[test]
    fn render_writes_score_and_dialog() {
        let mut scene = Scene::new();
        scene.set_score(140);
        scene.set_image(Entity::Player, "starship.png");
        scene.set_position(Entity::Player, 180.0, 640.0);
        scene.show_dialog(Dialog::game_over());

        let mut buf: Vec<u8> = Vec::new();
        render(&mut buf, &scene, &Viewport::new(60, 30, 400.0, 700.0)).unwrap();
        let text = String::from_utf8_lossy(&buf);
        assert!(text.contains("HIGH SCORE: 140"));
        assert!(text.contains("Game Over"));
        assert!(text.contains("Enter: Restart"));
        assert!(text.contains("/█\\"));
    }

    #[test]
    fn hidden_sprites_are_skipped() {
        let mut scene = Scene::new();
        scene.set_image(Entity::Player, "starship.png");
        scene.set_position(Entity::Player, 180.0, 640.0);
        scene.set_visible(Entity::Player, false);

        let mut buf: Vec<u8> = Vec::new();
        render(&mut buf, &scene, &Viewport::new(60, 30, 400.0, 700.0)).unwrap();
        assert!(!String::from_utf8_lossy(&buf).contains("/█\\"));
    }
}
