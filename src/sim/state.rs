//! Game state and core simulation types
//!
//! `GameState` owns every piece of the run: player, camera, the three entity
//! managers and the score/difficulty record. Nothing here touches the DOM or
//! storage; the host reacts to the `GameEvent`s that `tick` returns.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::enemy::EnemyManager;
use super::platform::{PlatformKind, PlatformManager};
use super::player::{Player, Recovery};
use super::powerup::{PowerUpKind, PowerUpManager};
use crate::consts::*;
use crate::tuning::{Difficulty, DifficultyParameters, Tuning};

/// Session phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GamePhase {
    /// Waiting for the first start input
    NotStarted,
    /// Active gameplay
    Running,
    /// Game is paused
    Paused,
    /// Run ended; only a restart leaves this phase
    GameOver,
}

/// How a run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum DeathCause {
    /// Dropped out of the bottom of the window
    Fell,
    /// Touched an enemy without protection
    Enemy,
}

/// Things that happened during a tick, for audio/HUD/storage consumers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Started,
    Paused,
    Resumed,
    Restarted,
    /// Normal jump off a platform of this kind
    Jumped(PlatformKind),
    /// Boosted jump (bouncy platform or springs)
    Bounced,
    /// Breakable platform (by id) started crumbling
    PlatformBreaking(u32),
    /// Disappearing platform (by id) started fading
    PlatformVanishing(u32),
    EnemyStomped(u32),
    /// Enemy removed by a shielded player
    EnemyDestroyed(u32),
    /// Player touched an enemy unprotected
    PlayerHit(u32),
    PowerUpCollected(PowerUpKind),
    /// Score passed this multiple of the milestone interval
    MilestoneCrossed(u64),
    /// Difficulty rose to this level
    DifficultyIncreased(u32),
    PlayerRecovered(Recovery),
    GameOver { score: u64, cause: DeathCause },
}

/// Parallax background scroll
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Background {
    /// Scroll in [0, CANVAS_HEIGHT)
    pub scroll: f32,
}

/// Background moves at this fraction of the camera speed
pub const PARALLAX_FACTOR: f32 = 0.3;

impl Background {
    pub fn update(&mut self, camera_offset: f32) {
        self.scroll = (-camera_offset * PARALLAX_FACTOR).rem_euclid(CANVAS_HEIGHT);
    }
}

/// Complete state of one run
#[derive(Debug, Clone)]
pub struct GameState {
    /// Seed the current run was started with
    pub seed: u64,
    pub(crate) rng: Pcg32,
    pub tuning: Tuning,
    /// Parameters for `difficulty.level`
    pub params: DifficultyParameters,
    pub difficulty: Difficulty,
    pub phase: GamePhase,
    pub player: Player,
    pub camera: Camera,
    pub platforms: PlatformManager,
    pub enemies: EnemyManager,
    pub powerups: PowerUpManager,
    pub background: Background,
    /// Score derived from peak height; never decreases within a run
    pub score: u64,
    /// Player y at the start of the run
    pub start_y: f32,
    /// Highest (smallest) player y reached
    pub peak_y: f32,
    /// Seconds spent running this run
    pub elapsed: f32,
}

impl GameState {
    /// Create a new game state with default tuning
    pub fn new(seed: u64) -> Self {
        Self::with_tuning(seed, Tuning::default())
    }

    pub fn with_tuning(seed: u64, tuning: Tuning) -> Self {
        let params = tuning.parameters(1);
        let start = PlatformManager::start_platform_rect(&params);
        let player = Player::standing_on(&start);
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            tuning,
            params,
            difficulty: Difficulty::default(),
            phase: GamePhase::NotStarted,
            start_y: player.pos.y,
            peak_y: player.pos.y,
            player,
            camera: Camera::new(),
            platforms: PlatformManager::new(),
            enemies: EnemyManager::new(),
            powerups: PowerUpManager::new(),
            background: Background::default(),
            score: 0,
            elapsed: 0.0,
        };
        state.reset_world();
        state
    }

    /// Start over with a new seed and go straight to `Running`
    pub fn restart(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        self.reset_world();
        self.phase = GamePhase::Running;
        log::info!("Run restarted with seed {}", seed);
    }

    /// Reinitialize entities, camera and score for a fresh run
    fn reset_world(&mut self) {
        self.difficulty = Difficulty::default();
        self.params = self.tuning.parameters(self.difficulty.level);
        self.camera.reset();
        self.background = Background::default();

        let start = PlatformManager::start_platform_rect(&self.params);
        self.player = Player::standing_on(&start);
        self.start_y = self.player.pos.y;
        self.peak_y = self.player.pos.y;
        self.score = 0;
        self.elapsed = 0.0;

        self.platforms.reset(&self.camera, &self.params, &mut self.rng);
        self.enemies.reset();
        self.powerups.reset();
    }

    /// Recompute score from peak height, ratcheting difficulty as boundaries pass
    pub fn update_score(&mut self) -> Vec<GameEvent> {
        let mut events = Vec::new();
        if self.player.pos.y.is_finite() {
            self.peak_y = self.peak_y.min(self.player.pos.y);
        }
        let height = (self.start_y - self.peak_y).max(0.0);
        let score = (height / SCORE_DIVISOR).floor() as u64;
        self.score = self.score.max(score);

        let crossed = self.difficulty.advance(self.score);
        if !crossed.is_empty() {
            self.params = self.tuning.parameters(self.difficulty.level);
            for milestone in crossed {
                // Level reached at this boundary
                let level = (milestone / MILESTONE_INTERVAL) as u32 + 1;
                events.push(GameEvent::MilestoneCrossed(milestone));
                events.push(GameEvent::DifficultyIncreased(level));
            }
            log::info!(
                "Difficulty level {} at score {}",
                self.difficulty.level,
                self.score
            );
        }
        events
    }

    /// Where to put the player back after a non-finite state
    pub fn safe_position(&self) -> Vec2 {
        Vec2::new(
            (CANVAS_WIDTH - PLAYER_WIDTH) / 2.0,
            self.camera.offset + CANVAS_HEIGHT / 2.0,
        )
    }

    /// Draw a fresh seed from the run's RNG (for in-game restarts)
    pub fn next_seed(&mut self) -> u64 {
        use rand::Rng;
        self.rng.random()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_state_waits_for_start() {
        let state = GameState::new(12345);
        assert_eq!(state.phase, GamePhase::NotStarted);
        assert_eq!(state.score, 0);
        assert_eq!(state.difficulty.level, 1);
        assert!(state.player.alive);
        assert!(state.platforms.platforms.len() > 5);
    }

    #[test]
    fn test_player_starts_on_reachable_platform() {
        let state = GameState::new(1);
        let feet = state.player.rect();
        let start = &state.platforms.platforms[0];
        assert_eq!(feet.bottom(), start.rect.top());
        assert!(feet.overlaps_x(&start.rect));
        assert!(start.is_solid());
    }

    #[test]
    fn test_score_never_decreases() {
        let mut state = GameState::new(5);
        state.player.pos.y = state.start_y - 500.0;
        state.update_score();
        assert_eq!(state.score, 50);

        state.player.pos.y = state.start_y - 100.0;
        state.update_score();
        assert_eq!(state.score, 50);
    }

    #[test]
    fn test_score_boundary_raises_difficulty() {
        let mut state = GameState::new(5);
        state.player.pos.y = state.start_y - 1000.0 * SCORE_DIVISOR;
        let events = state.update_score();
        assert_eq!(
            events,
            vec![
                GameEvent::MilestoneCrossed(1000),
                GameEvent::DifficultyIncreased(2)
            ]
        );
        assert_eq!(state.params, state.tuning.parameters(2));

        // Several boundaries in one frame report each level in turn
        state.player.pos.y = state.start_y - 3200.0 * SCORE_DIVISOR;
        let events = state.update_score();
        assert_eq!(
            events,
            vec![
                GameEvent::MilestoneCrossed(2000),
                GameEvent::DifficultyIncreased(3),
                GameEvent::MilestoneCrossed(3000),
                GameEvent::DifficultyIncreased(4),
            ]
        );
        assert_eq!(state.difficulty.level, 4);
        assert_eq!(state.params, state.tuning.parameters(4));
    }

    #[test]
    fn test_background_wraps() {
        let mut bg = Background::default();
        bg.update(-10_000.0);
        assert!(bg.scroll >= 0.0 && bg.scroll < CANVAS_HEIGHT);
        bg.update(0.0);
        assert_eq!(bg.scroll, 0.0);
    }
}
