//! Collision predicates
//!
//! Both checks run in the pre-projection spaces the tick compares in:
//! straight-line distance for player shots against enemies, an axis-aligned
//! box for enemy shots against the ship. Thresholds are strict; a contact
//! exactly on the boundary is a miss.

use glam::Vec2;

/// True when `a` and `b` are strictly closer than `radius`
#[inline]
pub fn within_radius(a: Vec2, b: Vec2, radius: f32) -> bool {
    a.distance_squared(b) < radius * radius
}

/// True when `b` lies strictly inside the axis-aligned box spanning
/// `half_extent` each way from `a`
#[inline]
pub fn within_box(a: Vec2, b: Vec2, half_extent: f32) -> bool {
    (a.x - b.x).abs() < half_extent && (a.y - b.y).abs() < half_extent
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn radius_hit_and_miss() {
        let a = Vec2::ZERO;
        let b = Vec2::new(3.0, 4.0); // distance 5
        assert!(within_radius(a, b, 5.1));
        assert!(!within_radius(a, b, 4.9));
    }

    #[test]
    fn radius_boundary_is_a_miss() {
        assert!(!within_radius(Vec2::ZERO, Vec2::new(3.0, 4.0), 5.0));
    }

    #[test]
    fn box_requires_both_axes() {
        let ship = Vec2::new(100.0, 100.0);
        assert!(within_box(Vec2::new(129.0, 71.0), ship, 30.0));
        assert!(!within_box(Vec2::new(131.0, 100.0), ship, 30.0));
        assert!(!within_box(Vec2::new(100.0, 131.0), ship, 30.0));
    }

    #[test]
    fn box_boundary_is_a_miss() {
        assert!(!within_box(Vec2::new(30.0, 0.0), Vec2::ZERO, 30.0));
    }
}
