//! Power-up pickups and their manager

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collision::Rect;
use super::platform::{Platform, PlatformKind};
use super::player::Player;
use super::state::GameEvent;
use crate::consts::*;
use crate::tuning::DifficultyParameters;

pub const POWERUP_SIZE: f32 = 28.0;
/// Gap between a pickup and the platform it rests on
pub const POWERUP_HOVER: f32 = 4.0;
pub const BOB_AMPLITUDE: f32 = 4.0;
pub const BOB_RATE: f32 = 4.0;

/// Power-up types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    /// Sustained upward thrust, also protects from enemies
    Jetpack,
    /// Timed enemy immunity
    Shield,
    /// The next few platform jumps are bouncy
    Springs,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 3] = [
        PowerUpKind::Jetpack,
        PowerUpKind::Shield,
        PowerUpKind::Springs,
    ];
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PowerUp {
    pub id: u32,
    pub kind: PowerUpKind,
    pub rect: Rect,
    /// Resting y the bob oscillates around
    pub base_y: f32,
    pub phase: f32,
    pub active: bool,
}

impl PowerUp {
    pub fn update(&mut self, dt: f32) {
        self.phase = (self.phase + BOB_RATE * dt) % std::f32::consts::TAU;
        self.rect.pos.y = self.base_y - self.phase.sin().abs() * BOB_AMPLITUDE;
    }
}

/// Owns the active power-ups
#[derive(Debug, Clone)]
pub struct PowerUpManager {
    pub powerups: Vec<PowerUp>,
    /// Camera offset at which the next spawn roll happens
    pub next_spawn_y: f32,
    next_id: u32,
}

impl Default for PowerUpManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PowerUpManager {
    pub fn new() -> Self {
        Self {
            powerups: Vec::new(),
            next_spawn_y: -SPAWN_CHECK_INTERVAL,
            next_id: 1,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Bob, prune and roll for new pickups as the camera climbs
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        camera: &Camera,
        params: &DifficultyParameters,
        platforms: &[Platform],
        rng: &mut R,
    ) {
        for powerup in &mut self.powerups {
            powerup.update(dt);
        }

        let cutoff = camera.bottom() + DESPAWN_MARGIN;
        self.powerups.retain(|p| p.active && p.rect.top() <= cutoff);

        while camera.offset < self.next_spawn_y {
            self.next_spawn_y -= SPAWN_CHECK_INTERVAL;
            if rng.random::<f32>() < params.powerup_spawn_chance {
                self.spawn(camera, platforms, rng);
            }
        }
    }

    /// Rest a pickup on a random stable platform above the window
    pub fn spawn<R: Rng>(&mut self, camera: &Camera, platforms: &[Platform], rng: &mut R) {
        let candidates: Vec<&Platform> = platforms
            .iter()
            .filter(|p| {
                p.is_solid()
                    && !p.filler
                    && matches!(p.kind(), PlatformKind::Normal | PlatformKind::Bouncy)
                    && p.rect.top() < camera.offset
            })
            .collect();
        if candidates.is_empty() {
            return;
        }

        let platform = candidates[rng.random_range(0..candidates.len())];
        let kind = PowerUpKind::ALL[rng.random_range(0..PowerUpKind::ALL.len())];
        let x = platform.rect.center().x - POWERUP_SIZE / 2.0;
        let base_y = platform.rect.top() - POWERUP_SIZE - POWERUP_HOVER;

        let id = self.next_id;
        self.next_id += 1;
        self.powerups.push(PowerUp {
            id,
            kind,
            rect: Rect::new(Vec2::new(x, base_y), Vec2::splat(POWERUP_SIZE)),
            base_y,
            phase: 0.0,
            active: true,
        });
        log::debug!("{:?} power-up {} placed on platform {}", kind, id, platform.id);
    }

    /// Collect the first pickup the player touches
    pub fn check_collisions(&mut self, player: &mut Player) -> Option<GameEvent> {
        let body = player.rect();
        let powerup = self
            .powerups
            .iter_mut()
            .find(|p| p.active && body.overlaps(&p.rect))?;
        powerup.active = false;
        player.apply_powerup(powerup.kind);
        Some(GameEvent::PowerUpCollected(powerup.kind))
    }
}
