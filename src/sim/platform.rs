//! Platforms and the manager that owns them
//!
//! The manager keeps the single terrain frontier (`frontier_y`), asks the
//! generator for new platforms while the frontier is inside the look-ahead
//! band, prunes spent or left-behind platforms and tops up the visible band
//! with filler platforms when it runs sparse.

use glam::Vec2;
use rand::Rng;
use serde::{Deserialize, Serialize};

use super::camera::Camera;
use super::collision::{Rect, landing_contact};
use super::generator::PlatformGenerator;
use super::player::Player;
use super::state::GameEvent;
use crate::consts::*;
use crate::tuning::DifficultyParameters;

/// Platform categories, used for generation history and rendering
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlatformKind {
    Normal,
    Bouncy,
    Breakable,
    Moving,
    Disappearing,
}

/// Per-kind mutable state
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum PlatformBehavior {
    Normal,
    Bouncy,
    /// Slides horizontally, flipping direction at the canvas edges
    Moving { direction: f32, speed: f32 },
    /// Crumbles once stepped on; `progress` runs 0..1
    Breakable { breaking: bool, progress: f32 },
    /// Fades out once stepped on; `timer` counts seconds since the trigger
    Disappearing { triggered: bool, timer: f32 },
}

impl PlatformBehavior {
    /// Fresh behavior state for a kind
    pub fn for_kind(kind: PlatformKind, direction: f32, speed: f32) -> Self {
        match kind {
            PlatformKind::Normal => PlatformBehavior::Normal,
            PlatformKind::Bouncy => PlatformBehavior::Bouncy,
            PlatformKind::Moving => PlatformBehavior::Moving { direction, speed },
            PlatformKind::Breakable => PlatformBehavior::Breakable {
                breaking: false,
                progress: 0.0,
            },
            PlatformKind::Disappearing => PlatformBehavior::Disappearing {
                triggered: false,
                timer: 0.0,
            },
        }
    }

    pub fn kind(&self) -> PlatformKind {
        match self {
            PlatformBehavior::Normal => PlatformKind::Normal,
            PlatformBehavior::Bouncy => PlatformKind::Bouncy,
            PlatformBehavior::Moving { .. } => PlatformKind::Moving,
            PlatformBehavior::Breakable { .. } => PlatformKind::Breakable,
            PlatformBehavior::Disappearing { .. } => PlatformKind::Disappearing,
        }
    }
}

/// A platform entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Platform {
    pub id: u32,
    pub rect: Rect,
    pub behavior: PlatformBehavior,
    pub active: bool,
    /// 1.0 = fully visible; falls as the platform breaks or vanishes
    pub opacity: f32,
    /// Injected by the density top-up rather than the generator
    pub filler: bool,
}

impl Platform {
    pub fn new(id: u32, pos: Vec2, size: Vec2, behavior: PlatformBehavior) -> Self {
        Self {
            id,
            rect: Rect::new(pos, size),
            behavior,
            active: true,
            opacity: 1.0,
            filler: false,
        }
    }

    pub fn kind(&self) -> PlatformKind {
        self.behavior.kind()
    }

    /// Can the player still land on this platform?
    pub fn is_solid(&self) -> bool {
        self.active
            && match self.behavior {
                PlatformBehavior::Breakable { breaking, .. } => !breaking,
                PlatformBehavior::Disappearing { triggered, .. } => !triggered,
                _ => true,
            }
    }

    /// Start breaking/vanishing. Returns false if already spent.
    pub fn trigger(&mut self) -> bool {
        match &mut self.behavior {
            PlatformBehavior::Breakable { breaking, .. } if !*breaking => {
                *breaking = true;
                true
            }
            PlatformBehavior::Disappearing { triggered, .. } if !*triggered => {
                *triggered = true;
                true
            }
            PlatformBehavior::Breakable { .. } | PlatformBehavior::Disappearing { .. } => false,
            _ => true,
        }
    }

    /// Advance per-kind behavior by `dt` seconds
    pub fn update(&mut self, dt: f32) {
        match &mut self.behavior {
            PlatformBehavior::Normal | PlatformBehavior::Bouncy => {}
            PlatformBehavior::Moving { direction, speed } => {
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
            PlatformBehavior::Breakable { breaking, progress } => {
                if *breaking {
                    *progress = (*progress + dt / BREAK_DURATION).min(1.0);
                    self.opacity = 1.0 - *progress;
                    if *progress >= 1.0 {
                        self.active = false;
                    }
                }
            }
            PlatformBehavior::Disappearing { triggered, timer } => {
                if *triggered {
                    *timer += dt;
                    let t = (*timer / DISAPPEAR_DURATION).min(1.0);
                    self.opacity = 1.0 - t;
                    if t >= 1.0 {
                        self.active = false;
                    }
                }
            }
        }
    }
}

/// Owns the active platform collection
#[derive(Debug, Clone)]
pub struct PlatformManager {
    pub platforms: Vec<Platform>,
    /// y of the highest generated platform (smallest y)
    pub frontier_y: f32,
    pub generator: PlatformGenerator,
    next_id: u32,
}

impl Default for PlatformManager {
    fn default() -> Self {
        Self::new()
    }
}

impl PlatformManager {
    pub fn new() -> Self {
        Self {
            platforms: Vec::new(),
            frontier_y: CANVAS_HEIGHT,
            generator: PlatformGenerator::new(),
            next_id: 1,
        }
    }

    fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Starting platform rect: centred, just above the bottom edge
    pub fn start_platform_rect(params: &DifficultyParameters) -> Rect {
        Rect::new(
            Vec2::new(
                (CANVAS_WIDTH - START_PLATFORM_WIDTH) / 2.0,
                CANVAS_HEIGHT - START_PLATFORM_OFFSET,
            ),
            Vec2::new(START_PLATFORM_WIDTH, params.platform_height),
        )
    }

    /// Discard everything and lay down a fresh starting set under `camera`
    pub fn reset<R: Rng>(&mut self, camera: &Camera, params: &DifficultyParameters, rng: &mut R) {
        self.platforms.clear();
        self.generator.reset();
        self.next_id = 1;

        let start = Self::start_platform_rect(params);
        let id = self.next_entity_id();
        self.platforms
            .push(Platform::new(id, start.pos, start.size, PlatformBehavior::Normal));
        self.generator.record(PlatformKind::Normal);
        self.frontier_y = start.top();

        self.generate_ahead(camera, 0, params, rng);
        self.top_up_density(camera, params, rng);
        log::debug!(
            "Platform set reset: {} platforms, frontier {}",
            self.platforms.len(),
            self.frontier_y
        );
    }

    /// Per-frame update: behaviors, pruning, generation, density top-up
    pub fn update<R: Rng>(
        &mut self,
        dt: f32,
        camera: &Camera,
        score: u64,
        params: &DifficultyParameters,
        rng: &mut R,
    ) {
        for platform in &mut self.platforms {
            platform.update(dt);
        }

        let cutoff = camera.bottom() + DESPAWN_MARGIN;
        self.platforms.retain(|p| p.active && p.rect.top() <= cutoff);

        self.generate_ahead(camera, score, params, rng);
        self.top_up_density(camera, params, rng);
    }

    /// Generate until the frontier sits a full look-ahead above the view
    fn generate_ahead<R: Rng>(
        &mut self,
        camera: &Camera,
        score: u64,
        params: &DifficultyParameters,
        rng: &mut R,
    ) {
        let limit = camera.view_top() - GENERATION_LOOKAHEAD;
        let cutoff = camera.bottom() + DESPAWN_MARGIN;
        while self.frontier_y > limit {
            let id = self.next_entity_id();
            let platform = self
                .generator
                .generate_next(id, self.frontier_y, score, params, rng);
            self.frontier_y = platform.rect.top();
            // A camera that outran the frontier skips the rows it already left behind
            if platform.rect.top() <= cutoff {
                self.platforms.push(platform);
            }
        }
    }

    /// Platforms whose top lies inside the visible band
    pub fn visible_count(&self, camera: &Camera) -> usize {
        let (top, bottom) = (camera.offset, camera.bottom());
        self.platforms
            .iter()
            .filter(|p| p.active && p.rect.top() >= top && p.rect.top() <= bottom)
            .count()
    }

    /// Inject filler platforms when the visible band is too sparse
    fn top_up_density<R: Rng>(
        &mut self,
        camera: &Camera,
        params: &DifficultyParameters,
        rng: &mut R,
    ) {
        let visible = self.visible_count(camera);
        if visible >= params.platform_density {
            return;
        }

        let missing = params.platform_density - visible;
        let width = params.max_width;
        let height = params.platform_height;
        let min_spacing = params.min_gap * 0.5;

        for _ in 0..missing {
            // A few tries to avoid stacking on an existing platform
            let mut placed = None;
            for _ in 0..8 {
                let y = rng.random_range(camera.offset..=camera.bottom() - height);
                let crowded = self
                    .platforms
                    .iter()
                    .any(|p| (p.rect.top() - y).abs() < min_spacing);
                if !crowded {
                    placed = Some(y);
                    break;
                }
            }
            let Some(y) = placed else { continue };

            let x = rng.random_range(0.0..=CANVAS_WIDTH - width);
            let id = self.next_entity_id();
            let mut platform = Platform::new(
                id,
                Vec2::new(x, y),
                Vec2::new(width, height),
                PlatformBehavior::Normal,
            );
            platform.filler = true;
            self.platforms.push(platform);
        }

        log::debug!(
            "Density top-up: {} visible, target {}",
            visible,
            params.platform_density
        );
    }

    /// Resolve at most one landing for a falling player.
    ///
    /// First solid match in list order wins.
    pub fn check_collisions(
        &mut self,
        player: &mut Player,
        params: &DifficultyParameters,
    ) -> Option<GameEvent> {
        if player.vel.y < 0.0 {
            return None;
        }

        let body = player.rect();
        let slack = COLLISION_TOLERANCE + player.fall_distance();

        let platform = self.platforms.iter_mut().find(|p| {
            p.is_solid() && landing_contact(&body, &p.rect, slack) && body.overlaps(&p.rect)
        })?;
        Some(player.on_platform_collision(platform, params))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn platform(kind: PlatformKind) -> Platform {
        Platform::new(
            1,
            Vec2::new(100.0, 300.0),
            Vec2::new(80.0, 15.0),
            PlatformBehavior::for_kind(kind, 1.0, 100.0),
        )
    }

    #[test]
    fn test_moving_platform_bounces_between_edges() {
        let mut p = platform(PlatformKind::Moving);
        p.rect.pos.x = CANVAS_WIDTH - 85.0;
        p.update(0.1); // 10px right, hits the edge
        assert_eq!(p.rect.pos.x, CANVAS_WIDTH - 80.0);
        assert!(matches!(
            p.behavior,
            PlatformBehavior::Moving { direction, .. } if direction < 0.0
        ));

        p.rect.pos.x = 5.0;
        p.update(0.1);
        assert_eq!(p.rect.pos.x, 0.0);
        assert!(matches!(
            p.behavior,
            PlatformBehavior::Moving { direction, .. } if direction > 0.0
        ));
    }

    #[test]
    fn test_breakable_only_breaks_after_trigger() {
        let mut p = platform(PlatformKind::Breakable);
        p.update(1.0);
        assert!(p.active);
        assert_eq!(p.opacity, 1.0);

        assert!(p.trigger());
        assert!(!p.is_solid());
        assert!(!p.trigger(), "second trigger is spent");

        p.update(BREAK_DURATION / 2.0);
        assert!((p.opacity - 0.5).abs() < 1e-4);
        p.update(BREAK_DURATION);
        assert!(!p.active);
        assert_eq!(p.opacity, 0.0);
    }

    #[test]
    fn test_disappearing_fades_over_duration() {
        let mut p = platform(PlatformKind::Disappearing);
        assert!(p.trigger());
        let mut last = p.opacity;
        for _ in 0..20 {
            p.update(DISAPPEAR_DURATION / 10.0);
            assert!(p.opacity <= last);
            last = p.opacity;
        }
        assert!(!p.active);
    }

    #[test]
    fn test_reset_builds_reachable_start() {
        let mut rng = Pcg32::seed_from_u64(7);
        let params = DifficultyParameters::default();
        let camera = Camera::new();
        let mut manager = PlatformManager::new();
        manager.reset(&camera, &params, &mut rng);

        let start = &manager.platforms[0];
        assert_eq!(start.kind(), PlatformKind::Normal);
        assert_eq!(start.rect.top(), CANVAS_HEIGHT - START_PLATFORM_OFFSET);
        assert!(manager.frontier_y <= camera.view_top() - GENERATION_LOOKAHEAD);
        assert!(manager.visible_count(&camera) >= params.platform_density);
    }

    #[test]
    fn test_update_prunes_and_extends_frontier() {
        let mut rng = Pcg32::seed_from_u64(11);
        let params = DifficultyParameters::default();
        let mut camera = Camera::new();
        let mut manager = PlatformManager::new();
        manager.reset(&camera, &params, &mut rng);

        camera.offset = -2000.0;
        camera.target = -2000.0;
        manager.update(0.016, &camera, 200, &params, &mut rng);

        assert!(manager.frontier_y <= -2000.0 - GENERATION_LOOKAHEAD);
        assert!(
            manager
                .platforms
                .iter()
                .all(|p| p.rect.top() <= camera.bottom() + DESPAWN_MARGIN)
        );
    }

    #[test]
    fn test_far_camera_jump_generates_nothing_below_view() {
        let mut rng = Pcg32::seed_from_u64(4);
        let params = DifficultyParameters::default();
        let mut camera = Camera::new();
        let mut manager = PlatformManager::new();
        manager.reset(&camera, &params, &mut rng);

        camera.offset = -10_000.0;
        camera.target = -10_000.0;
        manager.update(0.016, &camera, 1000, &params, &mut rng);

        let cutoff = camera.bottom() + DESPAWN_MARGIN;
        assert!(manager.platforms.iter().all(|p| p.rect.top() <= cutoff));
        assert!(manager.visible_count(&camera) >= 4);
        assert!(manager.frontier_y <= camera.view_top() - GENERATION_LOOKAHEAD);
    }

    #[test]
    fn test_density_filler_marks_injected_platforms() {
        let mut rng = Pcg32::seed_from_u64(3);
        let params = DifficultyParameters::default();
        let camera = Camera::new();
        let mut manager = PlatformManager::new();
        manager.frontier_y = camera.view_top() - GENERATION_LOOKAHEAD - 1.0;

        manager.update(0.016, &camera, 0, &params, &mut rng);
        assert!(manager.platforms.iter().all(|p| p.filler));
        assert!(!manager.platforms.is_empty());
        assert!(manager.platforms.iter().all(|p| p.kind() == PlatformKind::Normal));
    }

    #[test]
    fn test_no_collision_while_rising() {
        let params = DifficultyParameters::default();
        let mut manager = PlatformManager::new();
        manager.platforms.push(platform(PlatformKind::Normal));

        let mut player = Player::new(Vec2::new(110.0, 260.0));
        player.vel.y = -50.0;
        assert!(manager.check_collisions(&mut player, &params).is_none());
        assert_eq!(player.vel.y, -50.0);
    }

    #[test]
    fn test_first_match_in_list_order_wins() {
        let params = DifficultyParameters::default();
        let mut manager = PlatformManager::new();
        let mut bouncy = platform(PlatformKind::Bouncy);
        bouncy.id = 1;
        let mut normal = platform(PlatformKind::Normal);
        normal.id = 2;
        manager.platforms.push(bouncy);
        manager.platforms.push(normal);

        let mut player = Player::new(Vec2::new(110.0, 260.0));
        player.vel.y = 100.0;
        let event = manager.check_collisions(&mut player, &params);
        assert_eq!(event, Some(GameEvent::Bounced));
        assert!(player.vel.y < -params.jump_force);
    }
}
