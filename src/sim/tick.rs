//! Fixed timestep simulation tick
//!
//! Steps the physics world once and publishes the resulting snapshot.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::events::SimObserver;
use super::level::ObstacleItem;
use super::state::Simulation;

/// What observers see after a tick
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    /// Ticks completed since the simulation was created
    pub tick: u64,
    pub level: Option<u32>,
    /// Medium particle positions, in creation order
    pub positions: Vec<Vec2>,
    pub objects: Vec<ObstacleItem>,
}

/// Advance the simulation by one fixed timestep
pub fn tick(sim: &mut Simulation, observer: &mut dyn SimObserver) -> WorldSnapshot {
    let settings = &sim.settings;
    sim.world.step(
        settings.time_step,
        settings.velocity_iterations,
        settings.position_iterations,
    );
    sim.time_ticks += 1;

    let snapshot = build_snapshot(sim);
    observer.positions_updated(&snapshot.positions);
    observer.objects_updated(&snapshot.objects);
    snapshot
}

pub fn build_snapshot(sim: &Simulation) -> WorldSnapshot {
    WorldSnapshot {
        tick: sim.time_ticks,
        level: sim.level,
        positions: sim.medium.positions(&sim.world),
        objects: sim.obstacles.items().to_vec(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::{MeshDensity, Settings};
    use crate::sim::events::{EventLog, SimEvent};
    use crate::sim::obstacles::footprint;

    fn coarse() -> Simulation {
        Simulation::new(Settings::from_preset(MeshDensity::Coarse))
    }

    #[test]
    fn test_tick_advances_counter() {
        let mut sim = coarse();
        let first = tick(&mut sim, &mut ());
        let second = tick(&mut sim, &mut ());
        assert_eq!(first.tick, 1);
        assert_eq!(second.tick, 2);
        assert_eq!(sim.time_ticks(), 2);
    }

    #[test]
    fn test_tick_notifies_positions_then_objects() {
        let mut sim = coarse();
        sim.select_level(4, &mut ());
        let mut log = EventLog::new();
        let snapshot = tick(&mut sim, &mut log);

        assert_eq!(log.events.len(), 2);
        assert!(matches!(&log.events[0], SimEvent::PositionsUpdated(p) if *p == snapshot.positions));
        assert!(matches!(&log.events[1], SimEvent::ObjectsUpdated(o) if *o == snapshot.objects));
        assert_eq!(snapshot.level, Some(4));
    }

    #[test]
    fn test_snapshot_matches_medium_order() {
        let mut sim = coarse();
        sim.select_level(1, &mut ());
        let snapshot = sim.snapshot();
        assert_eq!(snapshot.positions.len(), sim.medium().len());

        // Particles overlapping a footprint get pushed out on the first step
        let near_obstacle = |p: Vec2| {
            sim.obstacles().items().iter().any(|item| {
                let half = footprint(item.kind) + Vec2::splat(sim.medium().spacing());
                (p - item.position).abs().cmple(half).all()
            })
        };
        for (p, pos) in sim.medium().particles().iter().zip(&snapshot.positions) {
            if !near_obstacle(p.origin) {
                assert!(p.origin.distance(*pos) < 1e-3);
            }
        }
    }

    #[test]
    fn test_snapshot_serializes() {
        let mut sim = coarse();
        sim.select_level(3, &mut ());
        let snapshot = sim.snapshot();
        let json = serde_json::to_string(&snapshot).unwrap();
        let back: WorldSnapshot = serde_json::from_str(&json).unwrap();
        assert_eq!(back.level, Some(3));
        assert_eq!(back.objects, snapshot.objects);
        assert_eq!(back.positions.len(), snapshot.positions.len());
    }
}
