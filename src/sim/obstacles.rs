//! Obstacle placement
//!
//! Turns a [`LevelDefinition`] into static bodies and keeps the
//! authoritative `items` list that collision checks and renderers read.

use glam::Vec2;

use super::level::{LevelDefinition, ObstacleItem, ObstacleKind};
use super::world::{BodyDef, BodyHandle, BodyKind, Material, PhysicsWorld, Shape};

/// Position match tolerance (squared distance) between a body and its item
pub const TARGET_MATCH_EPSILON_SQ: f32 = 1e-6;

/// Collision footprint half extents per obstacle type
pub fn footprint(kind: ObstacleKind) -> Vec2 {
    match kind {
        ObstacleKind::Rock => Vec2::new(90.0, 50.0),
        ObstacleKind::Tree => Vec2::new(90.0, 70.0),
        // Zero-area: hills are queryable but never block particles
        ObstacleKind::Hill => Vec2::ZERO,
        ObstacleKind::Target => Vec2::new(50.0, 40.0),
    }
}

const OBSTACLE_MATERIAL: Material = Material {
    density: 0.0,
    friction: 0.8,
    restitution: 0.1,
};

/// Obstacles of the current level, with their bodies
#[derive(Debug, Clone, Default)]
pub struct ObstacleField {
    level: Option<u32>,
    bodies: Vec<BodyHandle>,
    items: Vec<ObstacleItem>,
}

impl ObstacleField {
    /// Create one static body per item, in catalog order
    pub fn place(world: &mut PhysicsWorld, level: &LevelDefinition) -> Self {
        let mut field = Self {
            level: Some(level.number),
            ..Default::default()
        };
        for item in &level.items {
            let body = world.create_body(&BodyDef {
                kind: BodyKind::Static,
                position: item.position,
                shape: Shape::Box {
                    half_extents: footprint(item.kind),
                },
                material: OBSTACLE_MATERIAL,
            });
            field.bodies.push(body);
            field.items.push(ObstacleItem {
                kind: item.kind,
                // Record where the body actually landed
                position: world.position(body).unwrap_or(item.position),
            });
        }
        log::info!(
            "Placed {} obstacles for level {}",
            field.items.len(),
            level.number
        );
        field
    }

    /// Destroy every obstacle body and forget the items
    pub fn teardown(&mut self, world: &mut PhysicsWorld) {
        for body in self.bodies.drain(..) {
            world.destroy_body(body);
        }
        self.items.clear();
        if let Some(level) = self.level.take() {
            log::debug!("Removed obstacles of level {}", level);
        }
    }

    pub fn level(&self) -> Option<u32> {
        self.level
    }

    /// The current level items (the list renderers draw)
    pub fn items(&self) -> &[ObstacleItem] {
        &self.items
    }

    pub fn bodies(&self) -> &[BodyHandle] {
        &self.bodies
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Position of the first target, in placement order
    pub fn first_target(&self) -> Option<Vec2> {
        self.items
            .iter()
            .find(|item| item.kind == ObstacleKind::Target)
            .map(|item| item.position)
    }

    pub fn item_for_body(&self, body: BodyHandle) -> Option<&ObstacleItem> {
        self.bodies
            .iter()
            .position(|b| *b == body)
            .map(|i| &self.items[i])
    }

    /// True if `body` is one of our obstacle bodies and sits on a target item
    pub fn is_target_body(&self, world: &PhysicsWorld, body: BodyHandle) -> bool {
        if !self.bodies.contains(&body) {
            return false;
        }
        let Some(pos) = world.position(body) else {
            return false;
        };
        self.items.iter().any(|item| {
            item.kind == ObstacleKind::Target
                && item.position.distance_squared(pos) < TARGET_MATCH_EPSILON_SQ
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_place_creates_one_body_per_item() {
        let mut world = PhysicsWorld::default();
        let level = LevelDefinition::for_level(5).unwrap();
        let field = ObstacleField::place(&mut world, &level);

        assert_eq!(world.body_count(), level.items.len());
        assert_eq!(field.items(), level.items.as_slice());
        assert_eq!(field.first_target(), Some(Vec2::new(150.0, 700.0)));
    }

    #[test]
    fn test_footprints() {
        let rock = footprint(ObstacleKind::Rock);
        let tree = footprint(ObstacleKind::Tree);
        // Tree is taller than the rock; hill has no area
        assert!(tree.y > rock.y);
        assert_eq!(footprint(ObstacleKind::Hill), Vec2::ZERO);
    }

    #[test]
    fn test_teardown_destroys_bodies() {
        let mut world = PhysicsWorld::default();
        let mut field = ObstacleField::place(&mut world, &LevelDefinition::for_level(3).unwrap());
        let old_bodies = field.bodies().to_vec();

        field.teardown(&mut world);
        assert!(field.is_empty());
        assert!(field.bodies().is_empty());
        assert_eq!(world.body_count(), 0);
        assert!(old_bodies.iter().all(|b| !world.contains(*b)));
    }

    #[test]
    fn test_is_target_body() {
        let mut world = PhysicsWorld::default();
        let field = ObstacleField::place(&mut world, &LevelDefinition::for_level(3).unwrap());
        let hill = field.bodies()[0];
        let target = field.bodies()[1];

        assert!(!field.is_target_body(&world, hill));
        assert!(field.is_target_body(&world, target));
        assert_eq!(field.item_for_body(hill).map(|i| i.kind), Some(ObstacleKind::Hill));
    }

    #[test]
    fn test_foreign_body_is_not_a_target() {
        let mut world = PhysicsWorld::default();
        let field = ObstacleField::place(&mut world, &LevelDefinition::for_level(1).unwrap());
        // A body sitting exactly on a target but not owned by the field
        let stray = world.create_body(&BodyDef {
            kind: BodyKind::Dynamic,
            position: Vec2::new(150.0, 700.0),
            shape: Shape::Circle { radius: 0.5 },
            material: Material::default(),
        });
        assert!(!field.is_target_body(&world, stray));
    }
}
