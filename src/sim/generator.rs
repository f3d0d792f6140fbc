//! Procedural platform generation
//!
//! Each call places one platform a random gap above the current frontier.
//! Platform kind is score-gated: a "special" roll whose chance climbs with
//! score decides whether to leave `Normal`, then a banded weight table picks
//! the special kind, then the recent history vetoes unfair sequences.

use std::collections::VecDeque;
use std::ops::RangeInclusive;

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::platform::{Platform, PlatformBehavior, PlatformKind};
use crate::consts::CANVAS_WIDTH;
use crate::tuning::DifficultyParameters;

/// How many generated kinds the anti-repetition rules look back over
pub const HISTORY_LEN: usize = 3;

/// Special-kind chance at score 0
pub const BASE_SPECIAL_CHANCE: f32 = 0.1;
/// Special-kind chance never rises above this
pub const MAX_SPECIAL_CHANCE: f32 = 0.6;
/// Score needed to add 100% to the special chance
pub const SPECIAL_CHANCE_SCALE: f32 = 5000.0;

/// Scores where only easy platforms are generated.
///
/// Kept as a compatibility rule: this stretch of the climb always
/// offers plain and bouncy platforms so it stays climbable.
pub const CLIMBABLE_WINDOW: RangeInclusive<u64> = 280..=330;
/// Share of `Bouncy` inside the climbable window (rest is `Normal`)
pub const CLIMBABLE_WINDOW_BOUNCY: f32 = 0.2;

/// Moving platform speed range (pixels/s)
pub const MOVING_SPEED: RangeInclusive<f32> = 60.0..=120.0;

/// Game stage bands for special-kind weights
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ScoreBand {
    Early,
    Mid,
    Late,
}

impl ScoreBand {
    pub fn for_score(score: u64) -> Self {
        match score {
            0..1000 => ScoreBand::Early,
            1000..3000 => ScoreBand::Mid,
            _ => ScoreBand::Late,
        }
    }

    /// Relative weights of the special kinds in this band
    pub fn weights(&self) -> [(PlatformKind, u32); 4] {
        use PlatformKind::*;
        match self {
            ScoreBand::Early => [(Bouncy, 6), (Moving, 3), (Breakable, 1), (Disappearing, 0)],
            ScoreBand::Mid => [(Bouncy, 35), (Moving, 30), (Breakable, 20), (Disappearing, 15)],
            ScoreBand::Late => [(Bouncy, 20), (Moving, 30), (Breakable, 25), (Disappearing, 25)],
        }
    }

    /// Weighted draw from the band's table
    pub fn pick<R: Rng>(&self, rng: &mut R) -> PlatformKind {
        let weights = self.weights();
        let total: u32 = weights.iter().map(|(_, w)| w).sum();
        let mut roll = rng.random_range(0..total);
        for (kind, weight) in weights {
            if roll < weight {
                return kind;
            }
            roll -= weight;
        }
        PlatformKind::Normal
    }
}

/// Chance that a platform at this score is a special kind
pub fn special_chance(score: u64) -> f32 {
    (BASE_SPECIAL_CHANCE + score as f32 / SPECIAL_CHANCE_SCALE).min(MAX_SPECIAL_CHANCE)
}

/// Stateful platform generator (remembers recent kinds)
#[derive(Debug, Clone, Default)]
pub struct PlatformGenerator {
    recent: VecDeque<PlatformKind>,
}

impl PlatformGenerator {
    pub fn new() -> Self {
        Self {
            recent: VecDeque::with_capacity(HISTORY_LEN),
        }
    }

    pub fn reset(&mut self) {
        self.recent.clear();
    }

    /// Remember a kind placed outside `generate_next` (e.g. the start platform)
    pub fn record(&mut self, kind: PlatformKind) {
        if self.recent.len() == HISTORY_LEN {
            self.recent.pop_front();
        }
        self.recent.push_back(kind);
    }

    /// Most recent kinds, oldest first
    pub fn recent(&self) -> impl Iterator<Item = &PlatformKind> {
        self.recent.iter()
    }

    /// Build the next platform above `frontier_y`.
    ///
    /// The new platform's top is `frontier_y - gap` with `gap` drawn from the
    /// difficulty's `[min_gap, max_gap]`; the caller advances its frontier to it.
    pub fn generate_next<R: Rng>(
        &mut self,
        id: u32,
        frontier_y: f32,
        score: u64,
        params: &DifficultyParameters,
        rng: &mut R,
    ) -> Platform {
        let gap = rng.random_range(params.min_gap..=params.max_gap);
        let width = rng.random_range(params.min_width..=params.max_width);
        let x = rng.random_range(0.0..=CANVAS_WIDTH - width);
        let y = frontier_y - gap;

        let kind = self.choose_kind(score, rng);
        let direction = if rng.random_bool(0.5) { 1.0 } else { -1.0 };
        let speed = rng.random_range(MOVING_SPEED);
        let behavior = PlatformBehavior::for_kind(kind, direction, speed);

        Platform::new(
            id,
            Vec2::new(x, y),
            Vec2::new(width, params.platform_height),
            behavior,
        )
    }

    /// Pick the next kind and record it in the history
    pub fn choose_kind<R: Rng>(&mut self, score: u64, rng: &mut R) -> PlatformKind {
        let kind = if CLIMBABLE_WINDOW.contains(&score) {
            if rng.random::<f32>() < CLIMBABLE_WINDOW_BOUNCY {
                PlatformKind::Bouncy
            } else {
                PlatformKind::Normal
            }
        } else if rng.random::<f32>() < special_chance(score) {
            ScoreBand::for_score(score).pick(rng)
        } else {
            PlatformKind::Normal
        };

        let kind = self.apply_history_rules(kind, rng);
        self.record(kind);
        kind
    }

    /// Veto sequences that leave the player without a fair landing
    fn apply_history_rules<R: Rng>(&self, kind: PlatformKind, rng: &mut R) -> PlatformKind {
        match kind {
            PlatformKind::Disappearing
                if self.recent.back() == Some(&PlatformKind::Disappearing) =>
            {
                PlatformKind::Normal
            }
            PlatformKind::Breakable
                if self.recent.contains(&PlatformKind::Disappearing)
                    && self.recent.contains(&PlatformKind::Breakable) =>
            {
                if rng.random_bool(0.5) {
                    PlatformKind::Bouncy
                } else {
                    PlatformKind::Normal
                }
            }
            other => other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::Tuning;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_special_chance_rises_and_caps() {
        assert_eq!(special_chance(0), BASE_SPECIAL_CHANCE);
        assert!(special_chance(1000) > special_chance(500));
        assert_eq!(special_chance(100_000), MAX_SPECIAL_CHANCE);
    }

    #[test]
    fn test_score_bands() {
        assert_eq!(ScoreBand::for_score(0), ScoreBand::Early);
        assert_eq!(ScoreBand::for_score(999), ScoreBand::Early);
        assert_eq!(ScoreBand::for_score(1000), ScoreBand::Mid);
        assert_eq!(ScoreBand::for_score(2999), ScoreBand::Mid);
        assert_eq!(ScoreBand::for_score(3000), ScoreBand::Late);
    }

    #[test]
    fn test_disappearing_never_follows_disappearing() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut generator = PlatformGenerator::new();
        generator.record(PlatformKind::Disappearing);
        for _ in 0..50 {
            let kind = generator.apply_history_rules(PlatformKind::Disappearing, &mut rng);
            assert_eq!(kind, PlatformKind::Normal);
        }
    }

    #[test]
    fn test_breakable_after_disappearing_breakable_combo_falls_back() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut generator = PlatformGenerator::new();
        generator.record(PlatformKind::Disappearing);
        generator.record(PlatformKind::Breakable);
        for _ in 0..50 {
            let kind = generator.apply_history_rules(PlatformKind::Breakable, &mut rng);
            assert!(matches!(kind, PlatformKind::Bouncy | PlatformKind::Normal));
        }

        // Breakable alone in the history is fine
        let mut generator = PlatformGenerator::new();
        generator.record(PlatformKind::Breakable);
        let kind = generator.apply_history_rules(PlatformKind::Breakable, &mut rng);
        assert_eq!(kind, PlatformKind::Breakable);
    }

    #[test]
    fn test_history_keeps_last_three() {
        let mut generator = PlatformGenerator::new();
        for kind in [
            PlatformKind::Bouncy,
            PlatformKind::Moving,
            PlatformKind::Breakable,
            PlatformKind::Normal,
        ] {
            generator.record(kind);
        }
        let recent: Vec<_> = generator.recent().copied().collect();
        assert_eq!(
            recent,
            vec![PlatformKind::Moving, PlatformKind::Breakable, PlatformKind::Normal]
        );
    }

    #[test]
    fn test_climbable_window_only_easy_kinds() {
        let mut rng = Pcg32::seed_from_u64(5);
        let mut generator = PlatformGenerator::new();
        for score in CLIMBABLE_WINDOW {
            for _ in 0..10 {
                let kind = generator.choose_kind(score, &mut rng);
                assert!(matches!(kind, PlatformKind::Normal | PlatformKind::Bouncy));
            }
        }
    }

    #[test]
    fn test_early_game_distribution() {
        let mut rng = Pcg32::seed_from_u64(42);
        let mut generator = PlatformGenerator::new();
        let params = DifficultyParameters::default();

        let mut frontier = 550.0;
        let mut kinds = Vec::new();
        for id in 0..50 {
            let platform = generator.generate_next(id, frontier, 0, &params, &mut rng);
            frontier = platform.rect.top();
            kinds.push(platform.kind());
        }

        let count = |k: PlatformKind| kinds.iter().filter(|&&x| x == k).count();
        let easy = count(PlatformKind::Normal) + count(PlatformKind::Bouncy);
        assert_eq!(count(PlatformKind::Disappearing), 0);
        // At score 0 only ~10% are special and only a tenth of those breakable
        assert!(count(PlatformKind::Breakable) <= 3);
        assert!(easy >= 40, "expected mostly normal/bouncy, got {kinds:?}");
        assert!(count(PlatformKind::Normal) > count(PlatformKind::Bouncy));
    }

    #[test]
    fn test_platform_stays_inside_canvas() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut generator = PlatformGenerator::new();
        let params = DifficultyParameters::default();
        for id in 0..200 {
            let p = generator.generate_next(id, 0.0, 2000, &params, &mut rng);
            assert!(p.rect.left() >= 0.0);
            assert!(p.rect.right() <= CANVAS_WIDTH + 1e-3);
            assert!(p.rect.size.x >= params.min_width && p.rect.size.x <= params.max_width);
        }
    }

    proptest! {
        #[test]
        fn prop_gaps_stay_in_bounds(
            seed in any::<u64>(),
            level in 1u32..30,
            scores in proptest::collection::vec(0u64..20_000, 1..60),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let params = Tuning::default().parameters(level);
            let mut generator = PlatformGenerator::new();

            let mut frontier = 550.0f32;
            for (id, score) in scores.iter().copied().enumerate() {
                let p = generator.generate_next(id as u32, frontier, score, &params, &mut rng);
                let gap = frontier - p.rect.top();
                prop_assert!(gap >= params.min_gap - 1e-3);
                prop_assert!(gap <= params.max_gap + 1e-3);
                frontier = p.rect.top();
            }
        }

        #[test]
        fn prop_no_consecutive_disappearing(
            seed in any::<u64>(),
            scores in proptest::collection::vec(0u64..50_000, 2..120),
        ) {
            let mut rng = Pcg32::seed_from_u64(seed);
            let mut generator = PlatformGenerator::new();
            let mut last = None;
            for score in scores {
                let kind = generator.choose_kind(score, &mut rng);
                let repeated = kind == PlatformKind::Disappearing
                    && last == Some(PlatformKind::Disappearing);
                prop_assert!(!repeated);
                last = Some(kind);
            }
        }
    }
}
