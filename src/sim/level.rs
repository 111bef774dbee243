//! Level catalog
//!
//! Pure data: which obstacles and targets each level places, in order.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::LEVEL_COUNT;

/// Obstacle types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ObstacleKind {
    Rock,
    Tree,
    Hill,
    /// A person the player must reach; touching one completes the level
    Target,
}

impl ObstacleKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ObstacleKind::Rock => "rock",
            ObstacleKind::Tree => "tree",
            ObstacleKind::Hill => "hill",
            ObstacleKind::Target => "target",
        }
    }
}

/// An obstacle placement. Immutable once placed.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ObstacleItem {
    pub kind: ObstacleKind,
    pub position: Vec2,
}

impl ObstacleItem {
    pub const fn new(kind: ObstacleKind, x: f32, y: f32) -> Self {
        Self {
            kind,
            position: Vec2::new(x, y),
        }
    }
}

/// Ordered obstacle list for one level
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LevelDefinition {
    pub number: u32,
    pub items: Vec<ObstacleItem>,
}

use ObstacleKind::*;

const LEVEL_1: &[ObstacleItem] = &[
    ObstacleItem::new(Target, 150.0, 700.0),
    ObstacleItem::new(Target, 420.0, 300.0),
];

const LEVEL_2: &[ObstacleItem] = &[
    ObstacleItem::new(Target, 150.0, 700.0),
    ObstacleItem::new(Target, 1000.0, 700.0),
];

const LEVEL_3: &[ObstacleItem] = &[
    ObstacleItem::new(Hill, 740.0, 300.0),
    ObstacleItem::new(Target, 150.0, 700.0),
    ObstacleItem::new(Target, 630.0, 350.0),
];

const LEVEL_4: &[ObstacleItem] = &[
    ObstacleItem::new(Hill, 800.0, 300.0),
    ObstacleItem::new(Target, 150.0, 700.0),
    ObstacleItem::new(Target, 1000.0, 700.0),
];

const LEVEL_5: &[ObstacleItem] = &[
    ObstacleItem::new(Target, 150.0, 700.0),
    ObstacleItem::new(Target, 1000.0, 700.0),
    ObstacleItem::new(Rock, 500.0, 750.0),
    ObstacleItem::new(Tree, 550.0, 570.0),
];

impl LevelDefinition {
    /// Look up a level by number (1-based). None for unknown levels.
    pub fn for_level(number: u32) -> Option<Self> {
        let items = match number {
            1 => LEVEL_1,
            2 => LEVEL_2,
            3 => LEVEL_3,
            4 => LEVEL_4,
            5 => LEVEL_5,
            _ => return None,
        };
        Some(Self {
            number,
            items: items.to_vec(),
        })
    }

    pub fn targets(&self) -> impl Iterator<Item = &ObstacleItem> {
        self.items.iter().filter(|item| item.kind == Target)
    }
}

/// Every level, in order
pub fn all_levels() -> Vec<LevelDefinition> {
    (1..=LEVEL_COUNT)
        .filter_map(LevelDefinition::for_level)
        .collect()
}
