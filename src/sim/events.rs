//! Outbound notifications
//!
//! The simulation calls a [`SimObserver`] synchronously after each tick and
//! each emission. Observers decide how (or whether) to deliver the data.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::level::ObstacleItem;

/// Receiver for simulation output. Every method defaults to a no-op.
pub trait SimObserver {
    /// Full medium snapshot, in particle creation order
    fn positions_updated(&mut self, _positions: &[Vec2]) {}

    /// Current level items
    fn objects_updated(&mut self, _items: &[ObstacleItem]) {}

    /// A wave reached a target. Not deduplicated.
    fn target_touched(&mut self, _level: u32) {}
}

/// Observer that discards everything
impl SimObserver for () {}

/// Owned copy of one notification
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SimEvent {
    PositionsUpdated(Vec<Vec2>),
    ObjectsUpdated(Vec<ObstacleItem>),
    TargetTouched { level: u32 },
}

/// Observer that records every notification in order
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<SimEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Levels reported by target touches, in order
    pub fn target_touches(&self) -> Vec<u32> {
        self.events
            .iter()
            .filter_map(|e| match e {
                SimEvent::TargetTouched { level } => Some(*level),
                _ => None,
            })
            .collect()
    }

    pub fn last_positions(&self) -> Option<&[Vec2]> {
        self.events.iter().rev().find_map(|e| match e {
            SimEvent::PositionsUpdated(p) => Some(p.as_slice()),
            _ => None,
        })
    }

    pub fn last_objects(&self) -> Option<&[ObstacleItem]> {
        self.events.iter().rev().find_map(|e| match e {
            SimEvent::ObjectsUpdated(items) => Some(items.as_slice()),
            _ => None,
        })
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }
}

impl SimObserver for EventLog {
    fn positions_updated(&mut self, positions: &[Vec2]) {
        self.events.push(SimEvent::PositionsUpdated(positions.to_vec()));
    }

    fn objects_updated(&mut self, items: &[ObstacleItem]) {
        self.events.push(SimEvent::ObjectsUpdated(items.to_vec()));
    }

    fn target_touched(&mut self, level: u32) {
        self.events.push(SimEvent::TargetTouched { level });
    }
}
