//! Frame simulation module
//!
//! All gameplay logic lives here. This module must stay deterministic for a
//! given seed and input stream:
//! - Seeded RNG only (carried in `GameState`)
//! - Stable iteration order (entity lists in spawn order)
//! - No rendering, storage or DOM dependencies

pub mod camera;
pub mod collision;
pub mod enemy;
pub mod generator;
pub mod platform;
pub mod player;
pub mod powerup;
pub mod state;
pub mod tick;

pub use camera::Camera;
pub use collision::{Rect, landing_contact};
pub use enemy::{Enemy, EnemyKind, EnemyManager};
pub use generator::{PlatformGenerator, ScoreBand};
pub use platform::{Platform, PlatformBehavior, PlatformKind, PlatformManager};
pub use player::{Motion, Player, Recovery};
pub use powerup::{PowerUp, PowerUpKind, PowerUpManager};
pub use state::{Background, DeathCause, GameEvent, GamePhase, GameState};
pub use tick::{TickInput, clamp_dt, tick};
