//! Axis-aligned collision tests
//!
//! Everything in the world is a box. Boxes are stored as top-left corner plus
//! size, with y growing downward (a smaller y is higher up).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::COLLISION_TOLERANCE;

/// An axis-aligned rectangle
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
}

impl Rect {
    pub fn new(pos: Vec2, size: Vec2) -> Self {
        Self { pos, size }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Overlap test with touching edges counted as contact
    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left() < other.right()
            && self.right() > other.left()
            && self.top() <= other.bottom()
            && self.bottom() >= other.top()
    }

    /// Horizontal extents intersect
    pub fn overlaps_x(&self, other: &Rect) -> bool {
        self.left() < other.right() && self.right() > other.left()
    }
}

/// Is a falling body's bottom edge close enough to a surface's top edge to land?
///
/// `slack` widens the band to cover the distance fallen since the last frame,
/// so fast falls can't tunnel through thin platforms.
pub fn landing_contact(body: &Rect, surface: &Rect, slack: f32) -> bool {
    let feet = body.bottom();
    let top = surface.top();
    feet >= top - COLLISION_TOLERANCE
        && feet <= top + slack
        && body.overlaps_x(surface)
}
