//! Collision primitives for circles and axis-aligned boxes
//!
//! Bullets, pickups and spawn probes are circles; tanks and walls are
//! centered boxes. All tests are strict (touching is not overlapping).

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::{ARENA_HEIGHT, ARENA_WIDTH};

/// A centered axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub center: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(center: Vec2, size: Vec2) -> Self {
        Self { center, size }
    }

    #[inline]
    pub fn half(&self) -> Vec2 {
        self.size / 2.0
    }

    #[inline]
    pub fn min(&self) -> Vec2 {
        self.center - self.half()
    }

    #[inline]
    pub fn max(&self) -> Vec2 {
        self.center + self.half()
    }

    /// Point of the box closest to `p`
    #[inline]
    pub fn closest_point(&self, p: Vec2) -> Vec2 {
        p.clamp(self.min(), self.max())
    }

    pub fn intersects_circle(&self, center: Vec2, radius: f32) -> bool {
        circle_vs_box(center, radius, self.center, self.size)
    }
}

/// Point-in-circle test
#[inline]
pub fn circle_contains(center: Vec2, radius: f32, point: Vec2) -> bool {
    center.distance(point) < radius
}

/// Circle against a centered box, via the closest point on the box
pub fn circle_vs_box(circle: Vec2, radius: f32, box_center: Vec2, box_size: Vec2) -> bool {
    let half = box_size / 2.0;
    let closest = circle.clamp(box_center - half, box_center + half);
    circle.distance(closest) < radius
}

/// Circle against circle
#[inline]
pub fn circle_vs_circle(a: Vec2, ra: f32, b: Vec2, rb: f32) -> bool {
    a.distance(b) < ra + rb
}

/// Keep a body with the given half extent fully inside the arena
pub fn clamp_to_arena(pos: Vec2, half: Vec2) -> Vec2 {
    Vec2::new(
        pos.x.clamp(half.x, ARENA_WIDTH - half.x),
        pos.y.clamp(half.y, ARENA_HEIGHT - half.y),
    )
}

/// True when a point has left the arena rectangle
#[inline]
pub fn out_of_arena(pos: Vec2) -> bool {
    pos.x < 0.0 || pos.x > ARENA_WIDTH || pos.y < 0.0 || pos.y > ARENA_HEIGHT
}
