//! Contact geometry for medium particles touching obstacle footprints
//!
//! Particles are circles and footprints are axis-aligned boxes (bodies never
//! rotate), so a closest-point test on the box is exact.

use glam::Vec2;

/// Result of a collision check
#[derive(Debug, Clone)]
pub struct CollisionResult {
    /// Whether a collision occurred
    pub hit: bool,
    /// Contact point on the box surface (if hit)
    pub point: Vec2,
    /// Unit normal pointing from the box toward the circle
    pub normal: Vec2,
    /// Penetration depth (for position correction)
    pub penetration: f32,
}

impl CollisionResult {
    pub fn miss() -> Self {
        Self {
            hit: false,
            point: Vec2::ZERO,
            normal: Vec2::ZERO,
            penetration: 0.0,
        }
    }
}

/// Check collision between a circle and an axis-aligned box
///
/// A circle whose centre lies inside the box is pushed out through the
/// nearest face.
pub fn circle_box_collision(
    center: Vec2,
    radius: f32,
    box_center: Vec2,
    half_extents: Vec2,
) -> CollisionResult {
    let local = center - box_center;
    let closest = local.clamp(-half_extents, half_extents);
    let offset = local - closest;
    let dist_sq = offset.length_squared();

    if dist_sq > 0.0 {
        // Centre outside the box
        if dist_sq >= radius * radius {
            return CollisionResult::miss();
        }
        let dist = dist_sq.sqrt();
        return CollisionResult {
            hit: true,
            point: box_center + closest,
            normal: offset / dist,
            penetration: radius - dist,
        };
    }

    // Centre inside (or on the boundary): leave through the nearest face
    let to_right = half_extents.x - local.x;
    let to_left = half_extents.x + local.x;
    let to_bottom = half_extents.y - local.y;
    let to_top = half_extents.y + local.y;

    let (depth, normal) = [
        (to_right, Vec2::X),
        (to_left, Vec2::NEG_X),
        (to_bottom, Vec2::Y),
        (to_top, Vec2::NEG_Y),
    ]
    .into_iter()
    .fold((f32::MAX, Vec2::ZERO), |best, candidate| {
        if candidate.0 < best.0 { candidate } else { best }
    });

    CollisionResult {
        hit: true,
        point: center + normal * depth,
        normal,
        penetration: radius + depth,
    }
}
