//! Rendering module
//!
//! Entities describe themselves as filled rectangles and text on a `Surface`.
//! The browser build draws onto a Canvas2D context; tests record the calls.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasSurface;

use crate::consts::*;
use crate::sim::enemy::{Enemy, EnemyKind};
use crate::sim::platform::{Platform, PlatformKind};
use crate::sim::player::Player;
use crate::sim::powerup::{PowerUp, PowerUpKind};
use crate::sim::state::{GamePhase, GameState};

/// RGBA color, components in 0..1
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color(pub [f32; 4]);

impl Color {
    pub const fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self([r, g, b, 1.0])
    }

    /// CSS `rgba(...)` string
    pub fn to_css(self) -> String {
        let [r, g, b, a] = self.0;
        let byte = |c: f32| (c.clamp(0.0, 1.0) * 255.0).round() as u8;
        format!("rgba({},{},{},{:.3})", byte(r), byte(g), byte(b), a.clamp(0.0, 1.0))
    }
}

/// Palette
pub mod palette {
    use super::Color;

    pub const SKY: Color = Color::rgb(0.96, 0.95, 0.88);
    pub const GRID: Color = Color([0.55, 0.7, 0.85, 0.25]);
    pub const PLAYER: Color = Color::rgb(0.55, 0.8, 0.2);
    pub const SHIELD: Color = Color([0.3, 0.6, 1.0, 0.35]);
    pub const NORMAL: Color = Color::rgb(0.35, 0.7, 0.2);
    pub const BOUNCY: Color = Color::rgb(0.2, 0.55, 0.95);
    pub const BREAKABLE: Color = Color::rgb(0.6, 0.4, 0.2);
    pub const MOVING: Color = Color::rgb(0.3, 0.75, 0.85);
    pub const DISAPPEARING: Color = Color::rgb(0.95, 0.95, 0.95);
    pub const HOVER_ENEMY: Color = Color::rgb(0.75, 0.2, 0.5);
    pub const PATROL_ENEMY: Color = Color::rgb(0.85, 0.3, 0.2);
    pub const JETPACK: Color = Color::rgb(0.6, 0.6, 0.65);
    pub const SHIELD_PICKUP: Color = Color::rgb(0.3, 0.6, 1.0);
    pub const SPRINGS: Color = Color::rgb(0.95, 0.8, 0.2);
    pub const TEXT: Color = Color::rgb(0.15, 0.15, 0.15);
    pub const OVERLAY: Color = Color([0.0, 0.0, 0.0, 0.45]);
    pub const OVERLAY_TEXT: Color = Color::rgb(1.0, 1.0, 1.0);
}

/// Which point of the text `x` refers to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextAlign {
    Left,
    Center,
}

/// Minimal 2D drawing target (screen coordinates, y down)
pub trait Surface {
    fn clear(&mut self, color: Color);
    fn fill_rect(&mut self, x: f32, y: f32, w: f32, h: f32, color: Color);
    /// Global alpha for following draws
    fn set_alpha(&mut self, alpha: f32);
    fn fill_text(&mut self, text: &str, x: f32, y: f32, size: f32, align: TextAlign, color: Color);
}

/// Something that can draw itself given the camera offset
pub trait Drawable {
    fn render(&self, surface: &mut dyn Surface, camera_offset: f32);
}

/// Is a world-space span inside the window?
fn on_screen(top: f32, height: f32, camera_offset: f32) -> bool {
    let y = top - camera_offset;
    y + height >= 0.0 && y <= CANVAS_HEIGHT
}

fn platform_color(kind: PlatformKind) -> Color {
    match kind {
        PlatformKind::Normal => palette::NORMAL,
        PlatformKind::Bouncy => palette::BOUNCY,
        PlatformKind::Breakable => palette::BREAKABLE,
        PlatformKind::Moving => palette::MOVING,
        PlatformKind::Disappearing => palette::DISAPPEARING,
    }
}

impl Drawable for Platform {
    fn render(&self, surface: &mut dyn Surface, camera_offset: f32) {
        if !self.active || !on_screen(self.rect.top(), self.rect.size.y, camera_offset) {
            return;
        }
        let y = self.rect.top() - camera_offset;
        surface.set_alpha(self.opacity);
        surface.fill_rect(
            self.rect.left(),
            y,
            self.rect.size.x,
            self.rect.size.y,
            platform_color(self.kind()),
        );
        if self.kind() == PlatformKind::Bouncy {
            // Spring coil
            let w = self.rect.size.x * 0.25;
            surface.fill_rect(self.rect.center().x - w / 2.0, y - 6.0, w, 6.0, palette::SPRINGS);
        }
        surface.set_alpha(1.0);
    }
}

impl Drawable for Enemy {
    fn render(&self, surface: &mut dyn Surface, camera_offset: f32) {
        if !self.active || !on_screen(self.rect.top(), self.rect.size.y, camera_offset) {
            return;
        }
        let color = match self.kind() {
            EnemyKind::Hover => palette::HOVER_ENEMY,
            EnemyKind::Patrol => palette::PATROL_ENEMY,
        };
        let y = self.rect.top() - camera_offset;
        surface.fill_rect(self.rect.left(), y, self.rect.size.x, self.rect.size.y, color);
        // Eyes
        let eye = self.rect.size.x * 0.16;
        for dx in [0.25, 0.6] {
            surface.fill_rect(
                self.rect.left() + self.rect.size.x * dx,
                y + self.rect.size.y * 0.25,
                eye,
                eye,
                palette::OVERLAY_TEXT,
            );
        }
    }
}

impl Drawable for PowerUp {
    fn render(&self, surface: &mut dyn Surface, camera_offset: f32) {
        if !self.active || !on_screen(self.rect.top(), self.rect.size.y, camera_offset) {
            return;
        }
        let color = match self.kind {
            PowerUpKind::Jetpack => palette::JETPACK,
            PowerUpKind::Shield => palette::SHIELD_PICKUP,
            PowerUpKind::Springs => palette::SPRINGS,
        };
        surface.fill_rect(
            self.rect.left(),
            self.rect.top() - camera_offset,
            self.rect.size.x,
            self.rect.size.y,
            color,
        );
    }
}

impl Drawable for Player {
    fn render(&self, surface: &mut dyn Surface, camera_offset: f32) {
        let y = self.pos.y - camera_offset;
        if self.is_shielded() {
            surface.fill_rect(
                self.pos.x - 6.0,
                y - 6.0,
                self.size.x + 12.0,
                self.size.y + 12.0,
                palette::SHIELD,
            );
        }
        surface.fill_rect(self.pos.x, y, self.size.x, self.size.y, palette::PLAYER);
        // Legs, lifted while rising
        let leg_h = if self.vel.y < 0.0 { 4.0 } else { 8.0 };
        for dx in [0.2, 0.65] {
            surface.fill_rect(
                self.pos.x + self.size.x * dx,
                y + self.size.y,
                self.size.x * 0.15,
                leg_h,
                palette::PLAYER,
            );
        }
    }
}

/// Spacing of the graph-paper background lines
const GRID_SPACING: f32 = 30.0;

fn render_background(state: &GameState, surface: &mut dyn Surface) {
    surface.clear(palette::SKY);
    let scroll = state.background.scroll % GRID_SPACING;
    let mut y = scroll - GRID_SPACING;
    while y < CANVAS_HEIGHT {
        surface.fill_rect(0.0, y, CANVAS_WIDTH, 1.0, palette::GRID);
        y += GRID_SPACING;
    }
}

fn render_overlay(state: &GameState, surface: &mut dyn Surface) {
    let title = match state.phase {
        GamePhase::Running => return,
        GamePhase::NotStarted => "Press Space to start",
        GamePhase::Paused => "Paused",
        GamePhase::GameOver => "Game Over",
    };
    surface.fill_rect(0.0, 0.0, CANVAS_WIDTH, CANVAS_HEIGHT, palette::OVERLAY);
    surface.fill_text(
        title,
        CANVAS_WIDTH / 2.0,
        CANVAS_HEIGHT / 2.0,
        28.0,
        TextAlign::Center,
        palette::OVERLAY_TEXT,
    );
    if state.phase == GamePhase::GameOver {
        surface.fill_text(
            &format!("Score: {}  (R to restart)", state.score),
            CANVAS_WIDTH / 2.0,
            CANVAS_HEIGHT / 2.0 + 36.0,
            18.0,
            TextAlign::Center,
            palette::OVERLAY_TEXT,
        );
    }
}

/// Draw a full frame, back to front
pub fn render_scene(state: &GameState, surface: &mut dyn Surface, reduced_motion: bool) {
    let offset = state.camera.offset;

    if reduced_motion {
        surface.clear(palette::SKY);
    } else {
        render_background(state, surface);
    }
    for platform in &state.platforms.platforms {
        platform.render(surface, offset);
    }
    for powerup in &state.powerups.powerups {
        powerup.render(surface, offset);
    }
    for enemy in &state.enemies.enemies {
        enemy.render(surface, offset);
    }
    if state.player.alive || state.phase == GamePhase::GameOver {
        state.player.render(surface, offset);
    }

    surface.fill_text(
        &state.score.to_string(),
        16.0,
        28.0,
        22.0,
        TextAlign::Left,
        palette::TEXT,
    );
    render_overlay(state, surface);
}
