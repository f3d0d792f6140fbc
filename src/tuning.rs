//! Data-driven game balance
//!
//! Every parameter that tightens with difficulty is described by a [`Ramp`]:
//! a base value, a per-level step and a limit it never passes. The active
//! values for a run live in [`DifficultyParameters`], recomputed from the
//! level whenever it changes and handed to each manager by reference.

use serde::{Deserialize, Serialize};

use crate::consts::MILESTONE_INTERVAL;

/// A value that moves by `step` every `every` levels above 1 and stops at `limit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Ramp {
    pub base: f32,
    pub step: f32,
    pub limit: f32,
    /// Levels per step
    #[serde(default = "one_level")]
    pub every: u32,
}

fn one_level() -> u32 {
    1
}

impl Ramp {
    pub const fn new(base: f32, step: f32, limit: f32) -> Self {
        Self::stepped(base, step, limit, 1)
    }

    /// A ramp that only moves once per `every` levels
    pub const fn stepped(base: f32, step: f32, limit: f32, every: u32) -> Self {
        Self {
            base,
            step,
            limit,
            every,
        }
    }

    /// Value at a difficulty level (level 1 is the base)
    pub fn at(&self, level: u32) -> f32 {
        let steps = level.saturating_sub(1) / self.every.max(1);
        let raw = self.base + self.step * steps as f32;
        if self.step >= 0.0 {
            raw.min(self.limit)
        } else {
            raw.max(self.limit)
        }
    }
}

/// Base balance and per-level ratchets
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Tuning {
    /// Downward acceleration (pixels/s²)
    pub gravity: Ramp,
    /// Upward launch speed from a normal platform (pixels/s)
    pub jump_force: Ramp,
    /// Vertical gap between consecutive generated platforms
    pub min_gap: Ramp,
    pub max_gap: Ramp,
    /// Platform width bounds
    pub min_width: Ramp,
    pub max_width: Ramp,
    pub platform_height: Ramp,
    /// Chance per spawn roll of an enemy appearing
    pub enemy_spawn_chance: Ramp,
    /// Patrol enemy speed (pixels/s)
    pub enemy_speed: Ramp,
    /// Camera time constants (seconds) while rising / falling
    pub camera_rise_lag: Ramp,
    pub camera_fall_lag: Ramp,
    /// Minimum platforms kept inside the visible band
    pub platform_density: Ramp,
    /// Chance per spawn roll of a power-up appearing
    pub powerup_spawn_chance: f32,
    /// Fraction of the ballistic jump height the max gap may use
    pub reach_margin: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            gravity: Ramp::new(1200.0, 48.0, 1500.0),
            jump_force: Ramp::new(650.0, 13.0, 760.0),
            min_gap: Ramp::new(40.0, -2.0, 30.0),
            max_gap: Ramp::new(110.0, -3.0, 85.0),
            min_width: Ramp::new(60.0, -3.0, 45.0),
            max_width: Ramp::new(90.0, -4.0, 60.0),
            platform_height: Ramp::new(15.0, -0.5, 10.0),
            enemy_spawn_chance: Ramp::new(0.08, 0.02, 0.30),
            enemy_speed: Ramp::new(60.0, 10.0, 160.0),
            camera_rise_lag: Ramp::new(0.08, -0.005, 0.04),
            camera_fall_lag: Ramp::new(0.25, -0.015, 0.12),
            platform_density: Ramp::stepped(6.0, -1.0, 4.0, 3),
            powerup_spawn_chance: 0.06,
            reach_margin: 0.9,
        }
    }
}

impl Tuning {
    /// Resolve every ramp at the given level
    pub fn parameters(&self, level: u32) -> DifficultyParameters {
        let gravity = self.gravity.at(level);
        let jump_force = self.jump_force.at(level);

        // A gap the player can't physically clear would strand the run
        let reach = jump_force * jump_force / (2.0 * gravity) * self.reach_margin;
        let max_gap = self.max_gap.at(level).min(reach);
        let min_gap = self.min_gap.at(level).min(max_gap);

        let max_width = self.max_width.at(level);
        let min_width = self.min_width.at(level).min(max_width);

        DifficultyParameters {
            level,
            gravity,
            jump_force,
            min_gap,
            max_gap,
            min_width,
            max_width,
            platform_height: self.platform_height.at(level),
            enemy_spawn_chance: self.enemy_spawn_chance.at(level).clamp(0.0, 1.0),
            enemy_speed: self.enemy_speed.at(level),
            camera_rise_lag: self.camera_rise_lag.at(level),
            camera_fall_lag: self.camera_fall_lag.at(level),
            platform_density: self.platform_density.at(level).round().max(1.0) as usize,
            powerup_spawn_chance: self.powerup_spawn_chance.clamp(0.0, 1.0),
        }
    }
}

/// Gameplay parameters for the current difficulty level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DifficultyParameters {
    pub level: u32,
    pub gravity: f32,
    pub jump_force: f32,
    pub min_gap: f32,
    pub max_gap: f32,
    pub min_width: f32,
    pub max_width: f32,
    pub platform_height: f32,
    pub enemy_spawn_chance: f32,
    pub enemy_speed: f32,
    pub camera_rise_lag: f32,
    pub camera_fall_lag: f32,
    pub platform_density: usize,
    pub powerup_spawn_chance: f32,
}

impl Default for DifficultyParameters {
    fn default() -> Self {
        Tuning::default().parameters(1)
    }
}

impl DifficultyParameters {
    /// Highest rise a normal jump reaches (pixels)
    pub fn jump_height(&self) -> f32 {
        self.jump_force * self.jump_force / (2.0 * self.gravity)
    }
}

/// One-way difficulty ratchet for a single run
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Difficulty {
    pub level: u32,
    /// Score at which the level last went up (0 before the first increase)
    pub last_increase_score: u64,
}

impl Default for Difficulty {
    fn default() -> Self {
        Self {
            level: 1,
            last_increase_score: 0,
        }
    }
}

impl Difficulty {
    /// Raise the level once per milestone boundary `score` has crossed.
    ///
    /// Returns the milestone scores crossed by this call, in ascending order.
    pub fn advance(&mut self, score: u64) -> Vec<u64> {
        let mut crossed = Vec::new();
        loop {
            let next = u64::from(self.level) * MILESTONE_INTERVAL;
            if score < next {
                break;
            }
            self.level += 1;
            self.last_increase_score = next;
            crossed.push(next);
        }
        crossed
    }
}
