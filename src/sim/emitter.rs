//! Wave emission
//!
//! On each transmit, every medium particle inside the emission radius and
//! the antenna's beam cone gets a velocity kick away from the transmit
//! point. The kick grows with transmit power through [`scaling_factor`].
//!
//! Target detection is looser than the beam: any target body caught by
//! the broad-phase query box counts as touched.

use glam::Vec2;

use super::medium::Medium;
use super::obstacles::ObstacleField;
use super::transmission::TransmissionState;
use super::world::{Aabb, PhysicsWorld};
use crate::consts::*;

/// Slack on the cone test so a candidate exactly on the edge is kept
const CONE_EPSILON: f32 = 1e-6;

/// Map transmit power onto a velocity multiplier.
///
/// Linear from `SCALE_MIN / 100` at power 1 to `SCALE_MAX` at power 100;
/// out-of-range power is clamped first.
pub fn scaling_factor(power: i32) -> f32 {
    let p = power.clamp(MIN_TRANSMIT_POWER, MAX_TRANSMIT_POWER);
    let low = SCALE_MIN / 100.0;
    let t = (p - MIN_TRANSMIT_POWER) as f64 / (MAX_TRANSMIT_POWER - MIN_TRANSMIT_POWER) as f64;
    (low + (SCALE_MAX - low) * t) as f32
}

/// Reach of an emission at the given power
pub fn emit_radius(power: i32) -> f32 {
    EMIT_BASE_RADIUS + EMIT_RADIUS_PER_POWER * power as f32
}

/// Cone test.
///
/// `beam_half_angle` is in degrees and is halved again before comparison,
/// so a 45° yagi accepts offsets up to 22.5° from `transmit_direction`.
/// `offset` must be normalised (or zero).
pub fn within_beam(transmit_direction: Vec2, offset: Vec2, beam_half_angle: f32) -> bool {
    let cos_angle = transmit_direction.dot(offset);
    let cos_limit = (beam_half_angle / 2.0).to_radians().cos();
    cos_angle >= cos_limit - CONE_EPSILON
}

/// What one emission did
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EmitReport {
    pub radius: f32,
    /// Power after clamping
    pub power: i32,
    /// Bodies returned by the broad-phase query
    pub candidates: usize,
    /// Mobile particles that received a kick
    pub energized: usize,
    pub target_touched: bool,
}

/// Perform one emission against the world.
///
/// Clamps `tx.transmit_power` in place, kicks qualifying particles, and
/// reports whether a target body fell inside the query box.
pub fn emit_wave(
    world: &mut PhysicsWorld,
    medium: &Medium,
    obstacles: &ObstacleField,
    tx: &mut TransmissionState,
) -> EmitReport {
    let power = tx.clamp_power();
    let radius = emit_radius(power);
    let origin = tx.transmit_position;

    let query = Aabb::from_center(origin, Vec2::splat(radius));
    let candidates = world.bodies_in_aabb(&query);

    let speed = tx.propagation_speed * scaling_factor(power) * (power as f32 / 100.0);
    let mut energized = 0;

    for &body in &candidates {
        let Some(position) = world.position(body) else {
            continue;
        };
        let offset = position - origin;
        if offset.length_squared() > radius * radius {
            continue;
        }
        let direction = offset.normalize_or_zero();
        if !within_beam(tx.transmit_direction, direction, tx.beam_half_angle) {
            continue;
        }
        if medium.is_mobile(body) {
            world.set_linear_velocity(body, direction * speed);
            energized += 1;
        }
    }

    let target_touched = candidates
        .iter()
        .any(|&body| obstacles.is_target_body(world, body));

    log::info!(
        "Wave emitted: power {}, radius {}, beam {}°, speed {}, {} of {} candidates energized",
        power,
        radius,
        tx.beam_half_angle,
        tx.propagation_speed,
        energized,
        candidates.len()
    );

    EmitReport {
        radius,
        power,
        candidates: candidates.len(),
        energized,
        target_touched,
    }
}
