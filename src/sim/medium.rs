//! Particle medium
//!
//! A grid of point bodies joined by soft links. Waves are visualised by
//! kicking particles and letting the links carry the disturbance.
//!
//! Built row-major. Each new particle links back to the particle on its
//! left, the one above, and the one above-left, found through an explicit
//! `(row, col)` index rather than offsets into the creation sequence.

use std::collections::HashMap;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::world::{
    BodyDef, BodyHandle, BodyKind, DistanceJointDef, JointHandle, Material, PhysicsWorld, Shape,
};
use crate::settings::Settings;

/// Which neighbour a link reaches back to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LinkKind {
    Left,
    Above,
    Diagonal,
}

/// Elastic link between two particles
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MeshLink {
    pub joint: JointHandle,
    /// The earlier particle (left / above / above-left)
    pub from: BodyHandle,
    /// The particle that created the link
    pub to: BodyHandle,
    pub kind: LinkKind,
    pub rest_length: f32,
}

/// One grid point of the medium
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MediumParticle {
    pub body: BodyHandle,
    pub row: usize,
    pub col: usize,
    /// Grid position at creation
    pub origin: Vec2,
    /// Anchors (grid boundary) never move
    pub mobile: bool,
}

/// The particle mesh
#[derive(Debug, Clone, Default)]
pub struct Medium {
    spacing: f32,
    rows: usize,
    cols: usize,
    /// Row-major; index = row * cols + col
    particles: Vec<MediumParticle>,
    links: Vec<MeshLink>,
    by_body: HashMap<BodyHandle, usize>,
}

impl Medium {
    /// Build the mesh over the settings' world region
    pub fn build(world: &mut PhysicsWorld, settings: &Settings) -> Self {
        let spacing = settings.spacing();
        let left = -settings.mesh_margin;
        let right = settings.world_width + settings.mesh_margin;
        let bottom = settings.world_height;

        let cols = ((right - left) / spacing).floor() as usize + 1;
        let rows = (bottom / spacing).floor() as usize + 1;
        let diagonal = spacing * std::f32::consts::SQRT_2;

        let material = Material {
            density: settings.particle_density,
            friction: settings.particle_friction,
            restitution: settings.particle_restitution,
        };

        let mut medium = Self {
            spacing,
            rows,
            cols,
            particles: Vec::with_capacity(rows * cols),
            links: Vec::with_capacity(rows * cols * 3),
            by_body: HashMap::with_capacity(rows * cols),
        };

        for row in 0..rows {
            for col in 0..cols {
                let origin = Vec2::new(left + col as f32 * spacing, row as f32 * spacing);
                let mobile = origin.y > 0.0 && origin.y < bottom && origin.x > left && origin.x < right;

                let body = world.create_body(&BodyDef {
                    kind: if mobile {
                        BodyKind::Dynamic
                    } else {
                        BodyKind::Static
                    },
                    position: origin,
                    shape: Shape::Circle {
                        radius: settings.particle_radius,
                    },
                    material,
                });

                medium.by_body.insert(body, medium.particles.len());
                medium.particles.push(MediumParticle {
                    body,
                    row,
                    col,
                    origin,
                    mobile,
                });

                if col > 0 {
                    medium.link(world, settings, (row, col - 1), body, LinkKind::Left, spacing);
                }
                if row > 0 {
                    medium.link(world, settings, (row - 1, col), body, LinkKind::Above, spacing);
                }
                if row > 0 && col > 0 {
                    medium.link(world, settings, (row - 1, col - 1), body, LinkKind::Diagonal, diagonal);
                }
            }
        }

        log::info!(
            "Built medium: {}x{} particles ({} mobile), {} links, spacing {}",
            cols,
            rows,
            medium.mobile_count(),
            medium.links.len(),
            spacing
        );
        medium
    }

    fn link(
        &mut self,
        world: &mut PhysicsWorld,
        settings: &Settings,
        from: (usize, usize),
        to: BodyHandle,
        kind: LinkKind,
        rest_length: f32,
    ) {
        let Some(from) = self.at(from.0, from.1).map(|p| p.body) else {
            return;
        };
        let joint = world.create_distance_joint(&DistanceJointDef {
            body_a: from,
            body_b: to,
            rest_length,
            frequency_hz: settings.link_frequency_hz,
            damping_ratio: settings.link_damping_ratio,
        });
        if let Some(joint) = joint {
            self.links.push(MeshLink {
                joint,
                from,
                to,
                kind,
                rest_length,
            });
        }
    }

    /// Destroy every particle (and with them, every link)
    pub fn teardown(&mut self, world: &mut PhysicsWorld) {
        for particle in self.particles.drain(..) {
            world.destroy_body(particle.body);
        }
        self.links.clear();
        self.by_body.clear();
        self.rows = 0;
        self.cols = 0;
    }

    pub fn spacing(&self) -> f32 {
        self.spacing
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn mobile_count(&self) -> usize {
        self.particles.iter().filter(|p| p.mobile).count()
    }

    /// Particles in creation (row-major) order
    pub fn particles(&self) -> &[MediumParticle] {
        &self.particles
    }

    pub fn links(&self) -> &[MeshLink] {
        &self.links
    }

    /// Particle at a grid cell
    pub fn at(&self, row: usize, col: usize) -> Option<&MediumParticle> {
        if row >= self.rows || col >= self.cols {
            return None;
        }
        self.particles.get(row * self.cols + col)
    }

    pub fn particle_for(&self, body: BodyHandle) -> Option<&MediumParticle> {
        self.by_body.get(&body).map(|&i| &self.particles[i])
    }

    pub fn is_mobile(&self, body: BodyHandle) -> bool {
        self.particle_for(body).is_some_and(|p| p.mobile)
    }

    /// Links touching a particle, in either direction
    pub fn links_of(&self, body: BodyHandle) -> impl Iterator<Item = &MeshLink> {
        self.links
            .iter()
            .filter(move |link| link.from == body || link.to == body)
    }

    /// Current positions, in creation order
    pub fn positions(&self, world: &PhysicsWorld) -> Vec<Vec2> {
        self.particles
            .iter()
            .map(|p| world.position(p.body).unwrap_or(p.origin))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::MeshDensity;

    fn coarse() -> Settings {
        Settings::from_preset(MeshDensity::Coarse)
    }

    #[test]
    fn test_grid_dimensions() {
        let mut world = PhysicsWorld::default();
        let medium = Medium::build(&mut world, &Settings::default());
        // x: -200..=1400 step 20, y: 0..=800 step 20
        assert_eq!(medium.cols(), 81);
        assert_eq!(medium.rows(), 41);
        assert_eq!(medium.len(), 81 * 41);
        assert_eq!(world.body_count(), medium.len());
    }

    #[test]
    fn test_boundary_particles_are_anchors() {
        let mut world = PhysicsWorld::default();
        let medium = Medium::build(&mut world, &coarse());
        for p in medium.particles() {
            let on_edge =
                p.row == 0 || p.col == 0 || p.row == medium.rows() - 1 || p.col == medium.cols() - 1;
            assert_eq!(p.mobile, !on_edge, "particle at ({}, {})", p.row, p.col);
            let kind = world.body(p.body).unwrap().kind;
            assert_eq!(kind == BodyKind::Dynamic, p.mobile);
        }
    }

    const PRESETS: [MeshDensity; 3] = [MeshDensity::Coarse, MeshDensity::Standard, MeshDensity::Fine];

    /// Links a particle at (r, c) should have in a rows x cols grid
    fn implied_link_count(r: usize, c: usize, rows: usize, cols: usize) -> usize {
        let has_left = c > 0;
        let has_above = r > 0;
        let has_right = c + 1 < cols;
        let has_below = r + 1 < rows;
        [
            has_left,
            has_above,
            has_left && has_above,
            has_right,
            has_below,
            has_right && has_below,
        ]
        .iter()
        .filter(|b| **b)
        .count()
    }

    #[test]
    fn test_every_particle_has_implied_links() {
        for density in PRESETS {
            let mut world = PhysicsWorld::default();
            let medium = Medium::build(&mut world, &Settings::from_preset(density));
            let (rows, cols) = (medium.rows(), medium.cols());
            assert_eq!(medium.links().len(), world.joint_count());

            for p in medium.particles() {
                let expected = implied_link_count(p.row, p.col, rows, cols);
                assert_eq!(
                    world.joints_of(p.body).len(),
                    expected,
                    "{} ({}, {})",
                    density.as_str(),
                    p.row,
                    p.col
                );
                assert!(expected > 0);
            }
        }
    }

    #[test]
    fn test_links_of_matches_world_joints() {
        let mut world = PhysicsWorld::default();
        let medium = Medium::build(&mut world, &coarse());
        for p in medium.particles() {
            assert_eq!(medium.links_of(p.body).count(), world.joints_of(p.body).len());
        }
    }

    #[test]
    fn test_links_reach_the_right_neighbours() {
        for density in PRESETS {
            let mut world = PhysicsWorld::default();
            let medium = Medium::build(&mut world, &Settings::from_preset(density));
            let spacing = medium.spacing();
            assert_eq!(spacing, density.spacing());

            for link in medium.links() {
                let from = medium.particle_for(link.from).unwrap();
                let to = medium.particle_for(link.to).unwrap();
                let (dr, dc) = (to.row - from.row, to.col - from.col);
                match link.kind {
                    LinkKind::Left => assert_eq!((dr, dc), (0, 1)),
                    LinkKind::Above => assert_eq!((dr, dc), (1, 0)),
                    LinkKind::Diagonal => assert_eq!((dr, dc), (1, 1)),
                }
                let rest = from.origin.distance(to.origin);
                assert!((link.rest_length - rest).abs() < 1e-3);
                if link.kind == LinkKind::Diagonal {
                    assert!((link.rest_length - spacing * std::f32::consts::SQRT_2).abs() < 1e-4);
                }
            }
        }
    }

    #[test]
    fn test_row_col_lookup() {
        let mut world = PhysicsWorld::default();
        let medium = Medium::build(&mut world, &coarse());
        let p = medium.at(3, 7).unwrap();
        assert_eq!((p.row, p.col), (3, 7));
        assert_eq!(p.origin, Vec2::new(-200.0 + 7.0 * 40.0, 3.0 * 40.0));
        assert!(medium.at(medium.rows(), 0).is_none());
        assert!(medium.at(0, medium.cols()).is_none());
    }

    #[test]
    fn test_mesh_at_rest_stays_put() {
        let mut world = PhysicsWorld::default();
        let medium = Medium::build(&mut world, &coarse());
        for _ in 0..30 {
            world.step(1.0 / 60.0, 6, 2);
        }
        for (p, pos) in medium.particles().iter().zip(medium.positions(&world)) {
            assert!(p.origin.distance(pos) < 1e-3);
        }
    }

    #[test]
    fn test_teardown_leaves_world_empty() {
        let mut world = PhysicsWorld::default();
        let mut medium = Medium::build(&mut world, &coarse());
        let sample = medium.particles()[0].body;
        medium.teardown(&mut world);

        assert!(medium.is_empty());
        assert!(medium.links().is_empty());
        assert!(medium.at(0, 0).is_none());
        assert_eq!(world.body_count(), 0);
        assert_eq!(world.joint_count(), 0);
        assert!(!world.contains(sample));
    }
}
