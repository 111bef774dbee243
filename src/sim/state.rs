//! Simulation owner
//!
//! [`Simulation`] is the single writer of the physics world. Level setup,
//! stepping, emission and teardown all go through it, one call at a time.

use glam::Vec2;

use super::emitter::{EmitReport, emit_wave};
use super::events::SimObserver;
use super::level::LevelDefinition;
use super::medium::Medium;
use super::obstacles::ObstacleField;
use super::tick::{WorldSnapshot, build_snapshot, tick};
use super::transmission::TransmissionState;
use super::world::{BodyDef, BodyHandle, BodyKind, Material, PhysicsWorld, Shape};
use crate::consts::DEFAULT_PLAYER_POSITION;
use crate::settings::Settings;

const GROUND_MATERIAL: Material = Material {
    density: 0.0,
    friction: 0.2,
    restitution: 0.0,
};

/// The whole simulation: world, medium, obstacles and transmitter
#[derive(Debug, Clone)]
pub struct Simulation {
    pub(super) settings: Settings,
    pub(super) world: PhysicsWorld,
    pub(super) ground: BodyHandle,
    pub(super) medium: Medium,
    pub(super) obstacles: ObstacleField,
    pub(super) transmission: TransmissionState,
    pub(super) level: Option<u32>,
    pub(super) time_ticks: u64,
}

impl Simulation {
    /// Create a world with the ground slab and a medium but no level
    pub fn new(settings: Settings) -> Self {
        let mut world = PhysicsWorld::new(Vec2::ZERO);
        let ground = world.create_body(&BodyDef {
            kind: BodyKind::Static,
            position: settings.ground_center,
            shape: Shape::Box {
                half_extents: settings.ground_half_extents,
            },
            material: GROUND_MATERIAL,
        });
        let medium = Medium::build(&mut world, &settings);

        Self {
            settings,
            world,
            ground,
            medium,
            obstacles: ObstacleField::default(),
            transmission: TransmissionState::default(),
            level: None,
            time_ticks: 0,
        }
    }

    /// Tear down the current level and load level `number`.
    ///
    /// Unknown level numbers are logged and leave everything as it was.
    /// On success the world is stepped once so observers see the new level.
    pub fn select_level(&mut self, number: u32, observer: &mut dyn SimObserver) -> bool {
        let Some(definition) = LevelDefinition::for_level(number) else {
            log::warn!("Invalid level number: {}", number);
            return false;
        };

        self.teardown();
        self.medium = Medium::build(&mut self.world, &self.settings);
        self.obstacles = ObstacleField::place(&mut self.world, &definition);

        let player = self.obstacles.first_target().unwrap_or_else(|| {
            let (x, y) = DEFAULT_PLAYER_POSITION;
            Vec2::new(x, y)
        });
        self.transmission.set_player_position(player);
        self.level = Some(number);
        log::info!(
            "Level {} ready: player at {}, transmitting from {}",
            number,
            player,
            self.transmission.transmit_position
        );

        tick(self, observer);
        true
    }

    /// Destroy every obstacle and medium body. The ground slab stays.
    pub fn teardown(&mut self) {
        self.obstacles.teardown(&mut self.world);
        self.medium.teardown(&mut self.world);
        if let Some(level) = self.level.take() {
            log::info!("Tore down level {}", level);
        }
    }

    pub fn set_antenna_height(&mut self, height: i32) {
        self.transmission.set_antenna_height(height);
    }

    pub fn set_antenna_orientation(&mut self, degrees: i32) {
        self.transmission.set_antenna_orientation(degrees);
    }

    pub fn set_transmit_power(&mut self, power: i32) {
        self.transmission.set_transmit_power(power);
    }

    pub fn set_frequency_band(&mut self, name: &str) {
        self.transmission.set_frequency_band(name);
    }

    pub fn set_antenna_type(&mut self, name: &str) {
        self.transmission.set_antenna_type(name);
    }

    /// Emit one wave; notifies `observer` if a target was reached
    pub fn emit(&mut self, observer: &mut dyn SimObserver) -> EmitReport {
        let report = emit_wave(
            &mut self.world,
            &self.medium,
            &self.obstacles,
            &mut self.transmission,
        );
        if report.target_touched {
            if let Some(level) = self.level {
                log::info!("Target touched on level {}", level);
                observer.target_touched(level);
            }
        }
        report
    }

    /// Advance one fixed step and publish the snapshot
    pub fn tick(&mut self, observer: &mut dyn SimObserver) -> WorldSnapshot {
        tick(self, observer)
    }

    /// Snapshot of the current state without stepping
    pub fn snapshot(&self) -> WorldSnapshot {
        build_snapshot(self)
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn world(&self) -> &PhysicsWorld {
        &self.world
    }

    pub fn ground(&self) -> BodyHandle {
        self.ground
    }

    pub fn medium(&self) -> &Medium {
        &self.medium
    }

    pub fn obstacles(&self) -> &ObstacleField {
        &self.obstacles
    }

    pub fn transmission(&self) -> &TransmissionState {
        &self.transmission
    }

    pub fn level(&self) -> Option<u32> {
        self.level
    }

    pub fn time_ticks(&self) -> u64 {
        self.time_ticks
    }
}

impl Default for Simulation {
    fn default() -> Self {
        Self::new(Settings::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MeshDensity;
    use crate::sim::events::EventLog;
    use proptest::prelude::*;

    fn coarse() -> Simulation {
        Simulation::new(Settings::from_preset(MeshDensity::Coarse))
    }

    #[test]
    fn test_new_has_no_level() {
        let sim = coarse();
        assert_eq!(sim.level(), None);
        assert!(sim.obstacles().is_empty());
        // Medium plus the ground slab
        assert_eq!(sim.world().body_count(), sim.medium().len() + 1);
    }

    #[test]
    fn test_select_level_publishes() {
        let mut sim = coarse();
        let mut log = EventLog::new();
        assert!(sim.select_level(1, &mut log));

        assert_eq!(sim.level(), Some(1));
        assert_eq!(log.last_positions().map(|p| p.len()), Some(sim.medium().len()));
        let level = LevelDefinition::for_level(1).unwrap();
        assert_eq!(log.last_objects(), Some(level.items.as_slice()));
        // First target becomes the player
        assert_eq!(sim.transmission().player_position, Vec2::new(150.0, 700.0));
        assert_eq!(sim.transmission().transmit_position, Vec2::new(150.0, 650.0));
    }

    #[test]
    fn test_invalid_level_is_noop() {
        let mut sim = coarse();
        sim.select_level(2, &mut ());
        let items = sim.obstacles().items().to_vec();
        let bodies = sim.world().body_count();

        let mut log = EventLog::new();
        assert!(!sim.select_level(0, &mut log));
        assert!(!sim.select_level(6, &mut log));
        assert!(log.events.is_empty());
        assert_eq!(sim.level(), Some(2));
        assert_eq!(sim.obstacles().items(), items.as_slice());
        assert_eq!(sim.world().body_count(), bodies);
    }

    #[test]
    fn test_level_switch_matches_fresh_setup() {
        let mut switched = coarse();
        switched.select_level(3, &mut ());
        let stale: Vec<BodyHandle> = switched.obstacles().bodies().to_vec();
        switched.select_level(1, &mut ());

        let mut fresh = coarse();
        fresh.select_level(1, &mut ());

        assert_eq!(switched.obstacles().items(), fresh.obstacles().items());
        assert_eq!(switched.world().body_count(), fresh.world().body_count());
        assert_eq!(switched.world().joint_count(), fresh.world().joint_count());
        assert_eq!(switched.medium().len(), fresh.medium().len());
        assert_eq!(switched.transmission(), fresh.transmission());
        assert!(stale.iter().all(|b| !switched.world().contains(*b)));
    }

    #[test]
    fn test_teardown_keeps_only_ground() {
        let mut sim = coarse();
        sim.select_level(5, &mut ());
        let particle = sim.medium().particles()[0].body;
        sim.teardown();

        assert_eq!(sim.level(), None);
        assert!(sim.obstacles().is_empty());
        assert!(sim.medium().is_empty());
        assert_eq!(sim.world().body_count(), 1);
        assert_eq!(sim.world().joint_count(), 0);
        assert!(sim.world().contains(sim.ground()));
        assert!(!sim.world().contains(particle));
    }

    #[test]
    fn test_target_touched_once_per_emit() {
        let mut sim = coarse();
        sim.select_level(1, &mut ());
        sim.set_antenna_orientation(0);
        sim.set_transmit_power(100);

        let mut log = EventLog::new();
        let report = sim.emit(&mut log);
        assert!(report.target_touched);
        assert_eq!(log.target_touches(), vec![1]);

        sim.tick(&mut log);
        sim.emit(&mut log);
        assert_eq!(log.target_touches(), vec![1, 1]);
    }

    #[test]
    fn test_emit_without_level_never_touches() {
        let mut sim = coarse();
        sim.set_transmit_power(100);
        let mut log = EventLog::new();
        let report = sim.emit(&mut log);
        assert!(!report.target_touched);
        assert!(log.target_touches().is_empty());
    }

    #[test]
    fn test_emission_shows_in_next_snapshot() {
        let mut sim = coarse();
        sim.select_level(1, &mut ());
        let before = sim.snapshot();
        sim.set_transmit_power(60);
        sim.emit(&mut ());
        let after = sim.tick(&mut ());

        assert_eq!(after.tick, before.tick + 1);
        let moved = before
            .positions
            .iter()
            .zip(&after.positions)
            .filter(|(a, b)| a.distance(**b) > 1e-3)
            .count();
        assert!(moved > 0);
    }

    #[test]
    fn test_mesh_stays_finite_after_full_power() {
        let mut sim = coarse();
        sim.select_level(5, &mut ());
        sim.set_antenna_type("dipole");
        sim.set_transmit_power(100);
        sim.emit(&mut ());
        for _ in 0..120 {
            sim.tick(&mut ());
        }
        assert!(sim.snapshot().positions.iter().all(|p| p.is_finite()));
    }

    #[test]
    fn test_antenna_then_band() {
        let mut sim = coarse();
        sim.set_antenna_type("dish");
        assert_eq!(sim.transmission().beam_half_angle, 10.0);
        assert_eq!(sim.transmission().propagation_speed, 30.0);
        sim.set_frequency_band("HF");
        assert_eq!(sim.transmission().propagation_speed, 1.0);
    }

    fn run_with_power(power: i32) -> WorldSnapshot {
        let mut sim = coarse();
        sim.select_level(1, &mut ());
        sim.set_transmit_power(power);
        sim.emit(&mut ());
        for _ in 0..3 {
            sim.tick(&mut ());
        }
        sim.snapshot()
    }

    #[test]
    fn test_overpowered_emit_matches_max_power() {
        assert_eq!(run_with_power(150), run_with_power(100));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(6))]

        #[test]
        fn prop_power_above_range_clamps(power in 101i32..10_000) {
            prop_assert_eq!(run_with_power(power), run_with_power(100));
        }

        #[test]
        fn prop_power_below_range_clamps(power in -10_000i32..1) {
            prop_assert_eq!(run_with_power(power), run_with_power(1));
        }
    }
}
