//! The player character
//!
//! Owns its own kinematics. Managers hand it collision callbacks; it decides
//! the impulse and tells the platform to start breaking or vanishing.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Rect;
use super::platform::{Platform, PlatformKind};
use super::powerup::PowerUpKind;
use super::state::GameEvent;
use crate::consts::*;
use crate::tuning::DifficultyParameters;

/// Jetpack thrust speed (pixels/s, upward)
pub const JETPACK_SPEED: f32 = 900.0;
pub const JETPACK_DURATION: f32 = 2.5;
pub const SHIELD_DURATION: f32 = 8.0;
/// Platform jumps boosted by one springs pickup
pub const SPRING_JUMPS: u32 = 3;
/// Upward speed given after a non-finite state reset
pub const RECOVERY_SPEED: f32 = 200.0;

/// Vertical motion state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Motion {
    Jumping,
    Falling,
}

/// Why the player had to be put back into a valid state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recovery {
    /// Position or velocity stopped being finite
    NonFinite,
    /// Player ended up beside the canvas
    OffScreen,
}

/// Active power-up effects
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ActiveEffects {
    pub jetpack_time: f32,
    pub shield_time: f32,
    pub spring_jumps: u32,
}

/// The player entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Player {
    /// Top-left corner
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: Vec2,
    pub alive: bool,
    pub motion: Motion,
    /// y at the start of the last update (for swept landing checks)
    pub prev_y: f32,
    pub effects: ActiveEffects,
}

impl Player {
    pub fn new(pos: Vec2) -> Self {
        Self {
            pos,
            vel: Vec2::ZERO,
            size: Vec2::new(PLAYER_WIDTH, PLAYER_HEIGHT),
            alive: true,
            motion: Motion::Falling,
            prev_y: pos.y,
            effects: ActiveEffects::default(),
        }
    }

    /// Player standing centred on top of `platform`
    pub fn standing_on(platform: &Rect) -> Self {
        let x = platform.center().x - PLAYER_WIDTH / 2.0;
        Self::new(Vec2::new(x, platform.top() - PLAYER_HEIGHT))
    }

    pub fn rect(&self) -> Rect {
        Rect::new(self.pos, self.size)
    }

    /// Distance fallen during the last update (0 when rising)
    pub fn fall_distance(&self) -> f32 {
        (self.pos.y - self.prev_y).max(0.0)
    }

    pub fn is_shielded(&self) -> bool {
        self.effects.shield_time > 0.0 || self.effects.jetpack_time > 0.0
    }

    /// Integrate one frame. `horizontal` is the steering input in [-1, 1].
    pub fn update(&mut self, dt: f32, horizontal: f32, params: &DifficultyParameters) {
        if !self.alive {
            return;
        }
        self.prev_y = self.pos.y;

        self.vel.x = horizontal.clamp(-1.0, 1.0) * PLAYER_MOVE_SPEED;
        if self.effects.jetpack_time > 0.0 {
            self.effects.jetpack_time = (self.effects.jetpack_time - dt).max(0.0);
            self.vel.y = -JETPACK_SPEED;
        } else {
            self.vel.y += params.gravity * dt;
        }
        if self.effects.shield_time > 0.0 {
            self.effects.shield_time = (self.effects.shield_time - dt).max(0.0);
        }

        self.pos += self.vel * dt;
        self.pos.x = self.pos.x.clamp(0.0, CANVAS_WIDTH - self.size.x);

        self.motion = if self.vel.y < 0.0 {
            Motion::Jumping
        } else {
            Motion::Falling
        };
    }

    /// Launch upward with the given speed
    pub fn jump(&mut self, force: f32) {
        self.vel.y = -force;
        self.motion = Motion::Jumping;
    }

    /// Land on `platform` and take its impulse
    pub fn on_platform_collision(
        &mut self,
        platform: &mut Platform,
        params: &DifficultyParameters,
    ) -> GameEvent {
        self.pos.y = platform.rect.top() - self.size.y;
        let bouncy_force = params.jump_force * BOUNCY_MULTIPLIER;

        match platform.kind() {
            PlatformKind::Bouncy => {
                self.jump(bouncy_force);
                GameEvent::Bounced
            }
            kind @ (PlatformKind::Normal | PlatformKind::Moving) => {
                if self.effects.spring_jumps > 0 {
                    self.effects.spring_jumps -= 1;
                    self.jump(bouncy_force);
                    GameEvent::Bounced
                } else {
                    self.jump(params.jump_force);
                    GameEvent::Jumped(kind)
                }
            }
            PlatformKind::Breakable => {
                // Manager only offers solid platforms, so this is the first landing
                platform.trigger();
                self.jump(params.jump_force);
                GameEvent::PlatformBreaking(platform.id)
            }
            PlatformKind::Disappearing => {
                platform.trigger();
                self.jump(params.jump_force);
                GameEvent::PlatformVanishing(platform.id)
            }
        }
    }

    /// Apply a collected power-up
    pub fn apply_powerup(&mut self, kind: PowerUpKind) {
        match kind {
            PowerUpKind::Jetpack => self.effects.jetpack_time = JETPACK_DURATION,
            PowerUpKind::Shield => self.effects.shield_time = SHIELD_DURATION,
            PowerUpKind::Springs => self.effects.spring_jumps += SPRING_JUMPS,
        }
    }

    pub fn kill(&mut self) {
        self.alive = false;
        self.effects = ActiveEffects::default();
    }

    /// Put the player back into a valid state if needed.
    ///
    /// `safe` is where to respawn after a non-finite state.
    pub fn sanitize(&mut self, safe: Vec2) -> Option<Recovery> {
        if !self.pos.is_finite() || !self.vel.is_finite() {
            self.pos = safe;
            self.prev_y = safe.y;
            self.vel = Vec2::new(0.0, -RECOVERY_SPEED);
            self.motion = Motion::Jumping;
            return Some(Recovery::NonFinite);
        }

        if self.rect().right() <= 0.0 || self.rect().left() >= CANVAS_WIDTH {
            self.pos.x = (CANVAS_WIDTH - self.size.x) / 2.0;
            return Some(Recovery::OffScreen);
        }

        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::platform::PlatformBehavior;

    fn platform_under(player: &Player, kind: PlatformKind) -> Platform {
        Platform::new(
            1,
            Vec2::new(player.pos.x - 20.0, player.rect().bottom()),
            Vec2::new(80.0, 15.0),
            PlatformBehavior::for_kind(kind, 1.0, 80.0),
        )
    }

    #[test]
    fn test_gravity_turns_jump_into_fall() {
        let params = DifficultyParameters::default();
        let mut player = Player::new(Vec2::new(100.0, 300.0));
        player.jump(params.jump_force);
        assert_eq!(player.motion, Motion::Jumping);

        let mut t = 0.0;
        while player.motion == Motion::Jumping && t < 5.0 {
            player.update(DEFAULT_DT, 0.0, &params);
            t += DEFAULT_DT;
        }
        assert_eq!(player.motion, Motion::Falling);
        // Apex lands near v²/2g above the launch point
        let rise = 300.0 - player.pos.y;
        assert!((rise - params.jump_height()).abs() < 15.0, "rise {rise}");
    }

    #[test]
    fn test_horizontal_clamped_to_canvas() {
        let params = DifficultyParameters::default();
        let mut player = Player::new(Vec2::new(5.0, 300.0));
        for _ in 0..30 {
            player.update(DEFAULT_DT, -1.0, &params);
        }
        assert_eq!(player.pos.x, 0.0);

        for _ in 0..200 {
            player.update(DEFAULT_DT, 1.0, &params);
        }
        assert_eq!(player.pos.x, CANVAS_WIDTH - PLAYER_WIDTH);
    }

    #[test]
    fn test_impulse_by_platform_kind() {
        let params = DifficultyParameters::default();
        for (kind, expected) in [
            (PlatformKind::Normal, params.jump_force),
            (PlatformKind::Moving, params.jump_force),
            (PlatformKind::Breakable, params.jump_force),
            (PlatformKind::Disappearing, params.jump_force),
            (PlatformKind::Bouncy, params.jump_force * BOUNCY_MULTIPLIER),
        ] {
            let mut player = Player::new(Vec2::new(100.0, 200.0));
            player.vel.y = 300.0;
            let mut platform = platform_under(&player, kind);
            player.on_platform_collision(&mut platform, &params);
            assert_eq!(player.vel.y, -expected, "{kind:?}");
        }
    }

    #[test]
    fn test_breakable_landing_starts_break() {
        let params = DifficultyParameters::default();
        let mut player = Player::new(Vec2::new(100.0, 200.0));
        let mut platform = platform_under(&player, PlatformKind::Breakable);
        let event = player.on_platform_collision(&mut platform, &params);
        assert_eq!(event, GameEvent::PlatformBreaking(1));
        assert!(!platform.is_solid());
    }

    #[test]
    fn test_springs_boost_next_jumps() {
        let params = DifficultyParameters::default();
        let mut player = Player::new(Vec2::new(100.0, 200.0));
        player.apply_powerup(PowerUpKind::Springs);

        for _ in 0..SPRING_JUMPS {
            let mut platform = platform_under(&player, PlatformKind::Normal);
            assert_eq!(
                player.on_platform_collision(&mut platform, &params),
                GameEvent::Bounced
            );
        }
        let mut platform = platform_under(&player, PlatformKind::Normal);
        assert_eq!(
            player.on_platform_collision(&mut platform, &params),
            GameEvent::Jumped(PlatformKind::Normal)
        );
    }

    #[test]
    fn test_jetpack_overrides_gravity() {
        let params = DifficultyParameters::default();
        let mut player = Player::new(Vec2::new(100.0, 300.0));
        player.apply_powerup(PowerUpKind::Jetpack);
        player.update(0.1, 0.0, &params);
        assert_eq!(player.vel.y, -JETPACK_SPEED);
        assert!(player.is_shielded());

        for _ in 0..40 {
            player.update(0.1, 0.0, &params);
        }
        assert_eq!(player.effects.jetpack_time, 0.0);
        assert!(player.vel.y > -JETPACK_SPEED);
    }

    #[test]
    fn test_sanitize_recovers_non_finite() {
        let mut player = Player::new(Vec2::new(f32::NAN, 100.0));
        let safe = Vec2::new(180.0, 250.0);
        assert_eq!(player.sanitize(safe), Some(Recovery::NonFinite));
        assert_eq!(player.pos, safe);
        assert!(player.vel.y < 0.0);

        player.vel = Vec2::new(f32::INFINITY, 0.0);
        assert_eq!(player.sanitize(safe), Some(Recovery::NonFinite));
    }

    #[test]
    fn test_sanitize_recenters_off_screen() {
        let mut player = Player::new(Vec2::new(-500.0, 100.0));
        assert_eq!(player.sanitize(Vec2::ZERO), Some(Recovery::OffScreen));
        assert_eq!(player.pos.x, (CANVAS_WIDTH - PLAYER_WIDTH) / 2.0);
        assert_eq!(player.pos.y, 100.0);

        assert_eq!(player.sanitize(Vec2::ZERO), None);
    }
}
