//! Collision primitives
//!
//! Everything in the field is an axis-aligned box centred on its position.
//! Objects may carry a collision box smaller than their visual size; every
//! test here prefers the collision box when one is present.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned bounding box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    /// Box of `size` centred on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size * 0.5;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    pub fn center(&self) -> Vec2 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Strict overlap: boxes that merely touch edges do not overlap
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x < other.max.x
            && self.max.x > other.min.x
            && self.min.y < other.max.y
            && self.max.y > other.min.y
    }

    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.min.x && p.x <= self.max.x && p.y >= self.min.y && p.y <= self.max.y
    }

    /// Shortest distance between the two boxes (0 when overlapping)
    pub fn gap(&self, other: &Aabb) -> f32 {
        let dx = (other.min.x - self.max.x).max(self.min.x - other.max.x).max(0.0);
        let dy = (other.min.y - self.max.y).max(self.min.y - other.max.y).max(0.0);
        Vec2::new(dx, dy).length()
    }
}

/// Anything with a position and a size in the field
pub trait Positioned {
    /// World position (centre)
    fn position(&self) -> Vec2;
    /// Logical (visual) size
    fn size(&self) -> Vec2;
    /// Optional smaller collision box
    fn collision_size(&self) -> Option<Vec2> {
        None
    }

    /// The box used by collision tests
    fn bounds(&self) -> Aabb {
        Aabb::from_center(self.position(), self.collision_size().unwrap_or(self.size()))
    }
}

/// AABB overlap between two positioned objects
#[inline]
pub fn overlaps(a: &impl Positioned, b: &impl Positioned) -> bool {
    a.bounds().overlaps(&b.bounds())
}

/// Centre-to-centre distance between two positioned objects
#[inline]
pub fn distance(a: &impl Positioned, b: &impl Positioned) -> f32 {
    a.position().distance(b.position())
}

/// Whether `point` lies within `radius` of the object's centre
#[inline]
pub fn within_radius(a: &impl Positioned, point: Vec2, radius: f32) -> bool {
    a.position().distance_squared(point) <= radius * radius
}

/// Optional terrain collider
///
/// When a run has no obstacles every movement is unobstructed.
pub trait Obstacles {
    /// True if a box at `bounds` would intersect solid terrain
    fn blocks(&self, bounds: &Aabb) -> bool;
}

/// A static list of solid rectangles
#[derive(Debug, Clone, Default)]
pub struct RectObstacles {
    pub rects: Vec<Aabb>,
}

impl RectObstacles {
    pub fn new(rects: Vec<Aabb>) -> Self {
        Self { rects }
    }
}

impl Obstacles for RectObstacles {
    fn blocks(&self, bounds: &Aabb) -> bool {
        self.rects.iter().any(|r| r.overlaps(bounds))
    }
}

/// Move a box by `delta`, rejecting each axis independently if it would end
/// inside an obstacle. Returns the new centre.
pub fn slide_move(
    center: Vec2,
    hitbox: Vec2,
    delta: Vec2,
    obstacles: Option<&dyn Obstacles>,
) -> Vec2 {
    let Some(obstacles) = obstacles else {
        return center + delta;
    };

    let mut pos = center;
    let try_x = Vec2::new(pos.x + delta.x, pos.y);
    if !obstacles.blocks(&Aabb::from_center(try_x, hitbox)) {
        pos = try_x;
    }
    let try_y = Vec2::new(pos.x, pos.y + delta.y);
    if !obstacles.blocks(&Aabb::from_center(try_y, hitbox)) {
        pos = try_y;
    }
    pos
}
