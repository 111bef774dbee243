//! Airwaves - radio-wave propagation sandbox for an educational game
//!
//! Core modules:
//! - `sim`: Physics world, particle medium, obstacles, wave emission
//! - `settings`: Data-driven world tuning (mesh density, link softness)
//!
//! The crate has no rendering or input code. A presentation layer drives a
//! [`sim::Simulation`] at a fixed cadence and listens through
//! [`sim::SimObserver`].

pub mod settings;
pub mod sim;

pub use settings::{MeshDensity, Settings};
pub use sim::{Simulation, SimEvent, SimObserver, WorldSnapshot};

use glam::Vec2;

/// Simulation configuration constants
pub mod consts {
    /// Fixed simulation timestep (60 Hz)
    pub const SIM_DT: f32 = 1.0 / 60.0;
    /// Solver iterations per step; kept fixed so mesh stiffness is reproducible
    pub const VELOCITY_ITERATIONS: u32 = 6;
    pub const POSITION_ITERATIONS: u32 = 2;

    /// Visible world region
    pub const WORLD_WIDTH: f32 = 1200.0;
    pub const WORLD_HEIGHT: f32 = 800.0;
    /// Mesh extends this far past the visible region on the x-axis
    pub const MESH_MARGIN: f32 = 200.0;

    /// World units per antenna height unit
    pub const ANTENNA_HEIGHT_SCALE: f32 = 10.0;
    pub const DEFAULT_ANTENNA_HEIGHT: i32 = 5;

    /// Transmit power domain
    pub const MIN_TRANSMIT_POWER: i32 = 1;
    pub const MAX_TRANSMIT_POWER: i32 = 100;

    /// Emission query radius = base + per_power * power
    pub const EMIT_BASE_RADIUS: f32 = 50.0;
    pub const EMIT_RADIUS_PER_POWER: f32 = 2.0;

    /// Scaling factor range
    pub const SCALE_MIN: f64 = 100_000.0;
    pub const SCALE_MAX: f64 = 1_000_000_000.0;

    /// Omnidirectional beam (degrees)
    pub const DEFAULT_BEAM_HALF_ANGLE: f32 = 360.0;
    pub const DEFAULT_PROPAGATION_SPEED: f32 = 1.0;

    /// Player position used when a level places no target
    pub const DEFAULT_PLAYER_POSITION: (f32, f32) = (400.0, 500.0);

    /// Number of playable levels (numbered 1..=LEVEL_COUNT)
    pub const LEVEL_COUNT: u32 = 5;
}

/// Unit vector for an antenna orientation in degrees.
///
/// 0° maps to `(0, 1)`; positive angles tilt toward +x.
#[inline]
pub fn direction_from_degrees(degrees: f32) -> Vec2 {
    let theta = degrees.to_radians();
    Vec2::new(theta.sin(), theta.cos())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_from_degrees() {
        let up = direction_from_degrees(0.0);
        assert!(up.x.abs() < 1e-6);
        assert!((up.y - 1.0).abs() < 1e-6);

        let right = direction_from_degrees(90.0);
        assert!((right.x - 1.0).abs() < 1e-6);
        assert!(right.y.abs() < 1e-6);

        let left = direction_from_degrees(-90.0);
        assert!((left.x + 1.0).abs() < 1e-6);
    }
}
