//! Doodle Jump - A vertical platformer played in the browser
//!
//! Core modules:
//! - `sim`: Frame simulation (generation, entities, collisions, camera, score)
//! - `tuning`: Data-driven difficulty ratchet
//! - `renderer`: Drawing surface abstraction (Canvas2D on the web)
//! - `persistence`: Key-value storage (LocalStorage on the web)
//! - `api`: Remote auth and leaderboard service

pub mod api;
pub mod audio;
pub mod highscores;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use highscores::{BestScore, Leaderboard};
pub use settings::Settings;
pub use tuning::{DifficultyParameters, Tuning};

/// Game configuration constants
pub mod consts {
    /// Logical canvas size (world units are pixels)
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 600.0;

    /// Nominal frame time used before the first measured frame
    pub const DEFAULT_DT: f32 = 1.0 / 60.0;
    /// Largest delta accepted per frame (tab-switch stalls)
    pub const MAX_FRAME_DT: f32 = 0.05;

    /// Player defaults
    pub const PLAYER_WIDTH: f32 = 40.0;
    pub const PLAYER_HEIGHT: f32 = 40.0;
    /// Horizontal speed at full input (pixels/s)
    pub const PLAYER_MOVE_SPEED: f32 = 300.0;
    /// Bouncy platforms multiply the jump force by this
    pub const BOUNCY_MULTIPLIER: f32 = 1.6;

    /// Starting platform sits this far above the bottom edge
    pub const START_PLATFORM_OFFSET: f32 = 50.0;
    pub const START_PLATFORM_WIDTH: f32 = 90.0;

    /// Pixels of climb per score point
    pub const SCORE_DIVISOR: f32 = 10.0;
    /// Difficulty increases at every multiple of this score
    pub const MILESTONE_INTERVAL: u64 = 1000;

    /// Player dies once its top is this far below the visible window
    pub const DEATH_MARGIN: f32 = 50.0;
    /// Player top is never allowed above this screen line
    pub const CAMERA_TOP_MARGIN: f32 = 40.0;

    /// Vertical slack when matching the player's feet to a platform top
    pub const COLLISION_TOLERANCE: f32 = 12.0;

    /// Terrain is generated this far above the view
    pub const GENERATION_LOOKAHEAD: f32 = CANVAS_HEIGHT;
    /// Entities are dropped this far below the view
    pub const DESPAWN_MARGIN: f32 = 200.0;

    /// Platform behavior timings (seconds)
    pub const BREAK_DURATION: f32 = 0.5;
    pub const DISAPPEAR_DURATION: f32 = 1.0;

    /// Climb distance between enemy/power-up spawn rolls
    pub const SPAWN_CHECK_INTERVAL: f32 = 150.0;
}

/// Linear interpolation factor for an exponential-ish follow with time constant `lag`
#[inline]
pub fn follow_factor(dt: f32, lag: f32) -> f32 {
    if lag <= 0.0 {
        1.0
    } else {
        (dt / lag).clamp(0.0, 1.0)
    }
}
