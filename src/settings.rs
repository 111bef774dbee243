//! World tuning
//!
//! Everything the simulation would otherwise hard-code: world extents, mesh
//! density, particle material, link softness, and solver cadence. Stored as
//! JSON so a level designer can tweak it without recompiling.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;

/// Mesh density presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum MeshDensity {
    Coarse,
    #[default]
    Standard,
    Fine,
}

impl MeshDensity {
    pub fn as_str(&self) -> &'static str {
        match self {
            MeshDensity::Coarse => "Coarse",
            MeshDensity::Standard => "Standard",
            MeshDensity::Fine => "Fine",
        }
    }

    pub fn from_name(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "coarse" => Some(MeshDensity::Coarse),
            "standard" | "std" => Some(MeshDensity::Standard),
            "fine" => Some(MeshDensity::Fine),
            _ => None,
        }
    }

    /// Grid spacing between neighbouring particles (world units)
    pub fn spacing(&self) -> f32 {
        match self {
            MeshDensity::Coarse => 40.0,
            MeshDensity::Standard => 20.0,
            MeshDensity::Fine => 10.0,
        }
    }
}

/// Simulation settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Mesh density preset (sets particle spacing)
    pub density: MeshDensity,

    // === World ===
    pub world_width: f32,
    pub world_height: f32,
    /// Extra mesh past the visible region on each side of the x-axis
    pub mesh_margin: f32,
    /// Static ground slab below the visible region
    pub ground_center: Vec2,
    pub ground_half_extents: Vec2,

    // === Particles ===
    pub particle_radius: f32,
    pub particle_density: f32,
    pub particle_friction: f32,
    pub particle_restitution: f32,

    // === Mesh links ===
    /// Spring frequency of each link (Hz). 0 makes links rigid.
    pub link_frequency_hz: f32,
    pub link_damping_ratio: f32,

    // === Solver ===
    pub time_step: f32,
    pub velocity_iterations: u32,
    pub position_iterations: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            density: MeshDensity::Standard,

            world_width: WORLD_WIDTH,
            world_height: WORLD_HEIGHT,
            mesh_margin: MESH_MARGIN,
            ground_center: Vec2::new(0.0, 850.0),
            ground_half_extents: Vec2::new(1200.0, 50.0),

            particle_radius: 0.5,
            particle_density: 1.0,
            particle_friction: 0.01,
            particle_restitution: 0.5,

            link_frequency_hz: 2.5,
            link_damping_ratio: 0.1,

            time_step: SIM_DT,
            velocity_iterations: VELOCITY_ITERATIONS,
            position_iterations: POSITION_ITERATIONS,
        }
    }
}

impl Settings {
    /// Default settings with a given mesh density
    pub fn from_preset(density: MeshDensity) -> Self {
        Self {
            density,
            ..Self::default()
        }
    }

    /// Particle spacing for the current density
    pub fn spacing(&self) -> f32 {
        self.density.spacing()
    }

    /// Parse settings from JSON. Solver values are sanitized after parsing.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        let settings: Self = serde_json::from_str(json)?;
        Ok(settings.sanitized())
    }

    /// Pull solver values back into a usable range.
    ///
    /// The time step must be positive and finite, both iteration counts at
    /// least 1, and velocity iterations never fewer than position iterations.
    pub fn sanitized(mut self) -> Self {
        if !(self.time_step.is_finite() && self.time_step > 0.0) {
            log::warn!("Invalid time step {}, using {}", self.time_step, SIM_DT);
            self.time_step = SIM_DT;
        }
        if self.position_iterations == 0 {
            log::warn!("position_iterations must be at least 1");
            self.position_iterations = 1;
        }
        if self.velocity_iterations < self.position_iterations {
            log::warn!(
                "velocity_iterations {} below position_iterations {}, raising it",
                self.velocity_iterations,
                self.position_iterations
            );
            self.velocity_iterations = self.position_iterations;
        }
        self
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Load settings from a JSON file, falling back to defaults
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match std::fs::read_to_string(path) {
            Ok(json) => match Self::from_json(&json) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(e) => {
                    log::warn!("Invalid settings in {}: {}", path.display(), e);
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Could not read {}: {}", path.display(), e);
                log::info!("Using default settings");
                Self::default()
            }
        }
    }
}
