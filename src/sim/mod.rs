//! Deterministic simulation module
//!
//! Everything that moves lives here. This module must stay deterministic:
//! - Fixed timestep only
//! - No randomness
//! - Stable iteration order (creation order for bodies and particles)
//! - No rendering or platform dependencies

pub mod contact;
pub mod emitter;
pub mod events;
pub mod level;
pub mod medium;
pub mod obstacles;
pub mod state;
pub mod tick;
pub mod transmission;
pub mod world;

pub use contact::{CollisionResult, circle_box_collision};
pub use emitter::{EmitReport, emit_radius, emit_wave, scaling_factor, within_beam};
pub use events::{EventLog, SimEvent, SimObserver};
pub use level::{LevelDefinition, ObstacleItem, ObstacleKind, all_levels};
pub use medium::{LinkKind, Medium, MediumParticle, MeshLink};
pub use obstacles::ObstacleField;
pub use state::Simulation;
pub use tick::{WorldSnapshot, tick};
pub use transmission::{AntennaType, FrequencyBand, TransmissionState};
pub use world::{
    Aabb, Body, BodyDef, BodyHandle, BodyKind, DistanceJoint, DistanceJointDef, JointHandle,
    Material, PhysicsWorld, Shape,
};
