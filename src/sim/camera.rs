//! Vertical follow camera
//!
//! The camera keeps the player on the upper-third line while climbing. When
//! the player drops it eases down slowly and only a little way below the
//! highest point it reached, so a real fall carries the player out of the
//! bottom of the window.

use serde::{Deserialize, Serialize};

use super::player::Player;
use crate::consts::*;
use crate::follow_factor;
use crate::tuning::DifficultyParameters;

/// Screen line (from the top) the camera holds the player on
pub const ANCHOR_LINE: f32 = CANVAS_HEIGHT / 3.0;
/// Player in this upper part of the screen is still tracked downward
pub const FOLLOW_ZONE: f32 = CANVAS_HEIGHT * 2.0 / 3.0;
/// How far below its highest point the camera may drift
pub const FALL_SLACK: f32 = CANVAS_HEIGHT / 6.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Current scroll; `screen_y = world_y - offset`
    pub offset: f32,
    /// Where the offset is easing toward
    pub target: f32,
    /// Highest (smallest) target reached this run
    pub peak: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::new()
    }
}

impl Camera {
    pub fn new() -> Self {
        Self {
            offset: 0.0,
            target: 0.0,
            peak: 0.0,
        }
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Upper edge of the area that must already have terrain
    pub fn view_top(&self) -> f32 {
        self.offset.min(self.target)
    }

    /// Lower edge of the visible window in world space
    pub fn bottom(&self) -> f32 {
        self.offset + CANVAS_HEIGHT
    }

    pub fn to_screen(&self, world_y: f32) -> f32 {
        world_y - self.offset
    }

    /// Follow the player for one frame
    pub fn update(&mut self, player: &Player, dt: f32, params: &DifficultyParameters) {
        let desired = player.pos.y - ANCHOR_LINE;
        let screen_y = self.to_screen(player.pos.y);

        if desired < self.target {
            self.target = desired;
        } else if screen_y < FOLLOW_ZONE {
            self.target = desired.min(self.peak + FALL_SLACK);
        }
        self.peak = self.peak.min(self.target);

        let lag = if self.target < self.offset {
            params.camera_rise_lag
        } else {
            params.camera_fall_lag
        };
        self.offset += (self.target - self.offset) * follow_factor(dt, lag);

        // The player may never leave through the top of the window
        let max_offset = player.pos.y - CAMERA_TOP_MARGIN;
        if self.offset > max_offset {
            self.offset = max_offset;
        }
    }

    /// Has the player dropped far enough below the window to lose?
    pub fn has_lost(&self, player: &Player) -> bool {
        self.to_screen(player.pos.y) > CANVAS_HEIGHT + DEATH_MARGIN
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;

    #[test]
    fn test_camera_follows_climb() {
        let params = DifficultyParameters::default();
        let mut camera = Camera::new();
        let mut player = Player::new(Vec2::new(180.0, 100.0));

        for _ in 0..120 {
            camera.update(&player, DEFAULT_DT, &params);
        }
        assert!((camera.offset - (100.0 - ANCHOR_LINE)).abs() < 1.0);

        player.pos.y = -1000.0;
        for _ in 0..120 {
            camera.update(&player, DEFAULT_DT, &params);
        }
        assert!((camera.offset - (-1000.0 - ANCHOR_LINE)).abs() < 1.0);
    }

    #[test]
    fn test_rise_tracked_faster_than_fall() {
        let params = DifficultyParameters::default();

        let mut rising = Camera::new();
        let climber = Player::new(Vec2::new(0.0, ANCHOR_LINE - 60.0));
        rising.update(&climber, DEFAULT_DT, &params);
        let rise_step = -rising.offset;

        let mut falling = Camera::new();
        let faller = Player::new(Vec2::new(0.0, ANCHOR_LINE + 60.0));
        falling.update(&faller, DEFAULT_DT, &params);
        let fall_step = falling.offset;

        assert!(rise_step > 0.0 && fall_step > 0.0);
        assert!(rise_step > fall_step);
    }

    #[test]
    fn test_camera_lags_on_long_fall() {
        let params = DifficultyParameters::default();
        let mut camera = Camera::new();
        let mut player = Player::new(Vec2::new(180.0, 300.0));

        for i in 0..600 {
            player.pos.y = 300.0 + i as f32 * 5.0;
            camera.update(&player, DEFAULT_DT, &params);
        }
        assert!(camera.offset <= FALL_SLACK + 1e-3);
        assert!(camera.has_lost(&player));
    }

    #[test]
    fn test_player_never_above_window() {
        let params = DifficultyParameters::default();
        let mut camera = Camera::new();
        let player = Player::new(Vec2::new(180.0, -5000.0));
        camera.update(&player, DEFAULT_DT, &params);
        assert!(camera.to_screen(player.pos.y) >= CAMERA_TOP_MARGIN - 1e-3);
    }

    #[test]
    fn test_has_lost_threshold() {
        let camera = Camera::new();
        let mut player = Player::new(Vec2::new(0.0, CANVAS_HEIGHT + DEATH_MARGIN));
        assert!(!camera.has_lost(&player));
        player.pos.y += 1.0;
        assert!(camera.has_lost(&player));
    }
}
