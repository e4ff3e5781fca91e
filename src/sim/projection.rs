//! Fake-3D perspective projector
//!
//! World points are flattened onto the screen by assigning each a depth that
//! grows with its squared distance from the ship, then applying a perspective
//! divide. Camera rotation leaks parallax into both axes before the divide;
//! the axis swap there is intentional and matches the shipped feel.

use glam::Vec2;

use crate::consts::{BASE_DEPTH, DEPTH_FALLOFF, FOCAL_LENGTH, PARALLAX};

/// Screen dimensions in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f32,
    pub height: f32,
}

impl Viewport {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Screen anchor the ship is drawn at
    pub fn center(&self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }

    /// True when `p` lies on the visible screen
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= 0.0 && p.x <= self.width && p.y >= 0.0 && p.y <= self.height
    }
}

/// A world point after projection
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Projected {
    /// Screen position
    pub pos: Vec2,
    /// Sprite scale; 1.0 directly under the ship, shrinking with distance
    pub scale: f32,
}

/// Project a world point onto the screen relative to the ship
///
/// Pure and total over finite inputs: depth is at least [`BASE_DEPTH`], so
/// the perspective divide cannot blow up.
pub fn project(point: Vec2, ship: Vec2, camera_rot: Vec2, viewport: Viewport) -> Projected {
    let mut rel = point - ship;
    // Cross-axis parallax: yaw nudges x, pitch nudges y
    rel.x += camera_rot.y * PARALLAX;
    rel.y += camera_rot.x * PARALLAX;

    let z = BASE_DEPTH + rel.length_squared() / DEPTH_FALLOFF;
    let scale = FOCAL_LENGTH / z;
    Projected {
        pos: viewport.center() + rel * scale,
        scale,
    }
}
