//! Enemies and their manager

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collision::Rect;
use super::player::Player;
use super::state::GameEvent;
use crate::consts::*;
use crate::tuning::DifficultyParameters;

pub const ENEMY_WIDTH: f32 = 50.0;
pub const ENEMY_HEIGHT: f32 = 36.0;
/// Hover enemies bob this many pixels around their origin
pub const HOVER_AMPLITUDE: f32 = 12.0;
/// Hover bob speed (radians/s)
pub const HOVER_RATE: f32 = 3.0;
/// Climb before the first spawn roll, so the opening is always clear
pub const ENEMY_GRACE_HEIGHT: f32 = CANVAS_HEIGHT;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EnemyKind {
    Hover,
    Patrol,
}

/// Per-kind motion state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum EnemyMotion {
    Hover { origin_y: f32, phase: f32 },
    Patrol { direction: f32, speed: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Enemy {
    pub id: u32,
    pub rect: Rect,
    pub motion: EnemyMotion,
    pub active: bool,
}

impl Enemy {
    pub fn kind(&self) -> EnemyKind {
        match self.motion {
            EnemyMotion::Hover { .. } => EnemyKind::Hover,
            EnemyMotion::Patrol { .. } => EnemyKind::Patrol,
        }
    }

    pub fn update(&mut self, dt: f32) {
        match &mut self.motion {
            EnemyMotion::Hover { origin_y, phase } => {
                *phase = (*phase + HOVER_RATE * dt) % std::f32::consts::TAU;
                self.rect.pos.y = *origin_y + phase.sin() * HOVER_AMPLITUDE;
            }
            EnemyMotion::Patrol { direction, speed } => {
                self.rect.pos.x += *direction * *speed * dt;
                let max_x = CANVAS_WIDTH - self.rect.size.x;
                if self.rect.pos.x <= 0.0 {
                    self.rect.pos.x = 0.0;
                    *direction = 1.0;
                } else if self.rect.pos.x >= max_x {
                    self.rect.pos.x = max_x;
                    *direction = -1.0;
                }
            }
        }
    }
}

/// Owns the active enemies
#[derive(Debug, Clone)]
pub struct EnemyManager {
    pub enemies: Vec<Enemy>,
    /// Camera offset at which the next spawn roll happens
    pub next_spawn_y: f32,
    next_id: u32,
}

impl Default for EnemyManager {
    fn default() -> Self {
        Self::new()
    }
}

impl EnemyManager {
    pub fn new() -> Self {
        Self {
            enemies: Vec::new(),
            next_spawn_y: -ENEMY_GRACE_HEIGHT,
            next_id: 1,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Move, prune and roll for new enemies as the camera climbs
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        camera: &Camera,
        params: &DifficultyParameters,
        rng: &mut R,
    ) {
        for enemy in &mut self.enemies {
            enemy.update(dt);
        }

        let cutoff = camera.bottom() + DESPAWN_MARGIN;
        self.enemies.retain(|e| e.active && e.rect.top() <= cutoff);

        while camera.offset < self.next_spawn_y {
            self.next_spawn_y -= SPAWN_CHECK_INTERVAL;
            if rng.random::<f32>() < params.enemy_spawn_chance {
                self.spawn(camera, params, rng);
            }
        }
    }

    /// Place one enemy just above the visible window
    pub fn spawn<R: Rng>(&mut self, camera: &Camera, params: &DifficultyParameters, rng: &mut R) {
        let x = rng.random_range(0.0..=CANVAS_WIDTH - ENEMY_WIDTH);
        let y = camera.offset - rng.random_range(ENEMY_HEIGHT + 20.0..=ENEMY_HEIGHT + 180.0);
        let motion = if rng.random_bool(0.5) {
            EnemyMotion::Hover {
                origin_y: y,
                phase: rng.random_range(0.0..=std::f32::consts::TAU),
            }
        } else {
            EnemyMotion::Patrol {
                direction: if rng.random_bool(0.5) { 1.0 } else { -1.0 },
                speed: params.enemy_speed,
            }
        };

        let id = self.next_id;
        self.next_id += 1;
        self.enemies.push(Enemy {
            id,
            rect: Rect::new(Vec2::new(x, y), Vec2::new(ENEMY_WIDTH, ENEMY_HEIGHT)),
            motion,
            active: true,
        });
        log::debug!("Enemy {} spawned at y {}", id, y);
    }

    /// Resolve the first enemy touching the player.
    ///
    /// Landing on the upper half stomps it; any other contact is fatal unless
    /// the player is shielded.
    pub fn check_collisions(
        &mut self,
        player: &mut Player,
        params: &DifficultyParameters,
    ) -> Option<GameEvent> {
        let body = player.rect();
        let enemy = self
            .enemies
            .iter_mut()
            .find(|e| e.active && body.overlaps(&e.rect))?;

        let stomp_line = enemy.rect.top() + enemy.rect.size.y * 0.5;
        if player.vel.y > 0.0 && body.bottom() <= stomp_line {
            enemy.active = false;
            player.pos.y = enemy.rect.top() - player.size.y;
            player.jump(params.jump_force);
            Some(GameEvent::EnemyStomped(enemy.id))
        } else if player.is_shielded() {
            enemy.active = false;
            Some(GameEvent::EnemyDestroyed(enemy.id))
        } else {
            player.kill();
            Some(GameEvent::PlayerHit(enemy.id))
        }
    }
}
