//! 2D rigid-body world
//!
//! A small impulse-based solver with exactly what the medium needs:
//! non-rotating bodies (circles and axis-aligned boxes), soft distance
//! joints, circle-vs-box contacts, and an AABB region query.
//!
//! Each step runs in a fixed order:
//! 1. integrate velocities
//! 2. gather contacts, initialise joints and contacts, warm start
//! 3. velocity iterations (joints, then contacts)
//! 4. integrate positions (translation capped per step)
//! 5. position iterations (contacts and rigid joints)

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::contact::{CollisionResult, circle_box_collision};

/// Collision tolerance; also the minimum length for a well-defined joint axis
pub const LINEAR_SLOP: f32 = 0.005;
/// Largest position correction applied in a single position iteration
pub const MAX_LINEAR_CORRECTION: f32 = 0.2;
/// Largest distance a body may travel in one step
pub const MAX_TRANSLATION: f32 = 2.0;
/// Fraction of overlap resolved per position iteration
pub const BAUMGARTE: f32 = 0.2;
/// Approach speeds below this do not bounce
pub const VELOCITY_THRESHOLD: f32 = 1.0;

/// Generational handle to a body. Stale handles never resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BodyHandle {
    index: u32,
    generation: u32,
}

/// Generational handle to a distance joint
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct JointHandle {
    index: u32,
    generation: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BodyKind {
    /// Never moves, infinite mass
    Static,
    /// Integrated every step
    Dynamic,
}

/// Collision footprint, centred on the body position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Shape {
    Circle { radius: f32 },
    Box { half_extents: Vec2 },
}

impl Shape {
    pub fn aabb(&self, center: Vec2) -> Aabb {
        match *self {
            Shape::Circle { radius } => Aabb::from_center(center, Vec2::splat(radius)),
            Shape::Box { half_extents } => Aabb::from_center(center, half_extents),
        }
    }

    pub fn area(&self) -> f32 {
        match *self {
            Shape::Circle { radius } => std::f32::consts::PI * radius * radius,
            Shape::Box { half_extents } => 4.0 * half_extents.x * half_extents.y,
        }
    }

    /// Zero-area footprints are queryable but never collide
    pub fn is_degenerate(&self) -> bool {
        self.area() <= 0.0
    }
}

/// Axis-aligned bounding box (inclusive bounds)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn from_center(center: Vec2, half_extents: Vec2) -> Self {
        Self {
            min: center - half_extents,
            max: center + half_extents,
        }
    }

    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }
}

/// Surface properties
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Material {
    pub density: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for Material {
    fn default() -> Self {
        Self {
            density: 0.0,
            friction: 0.2,
            restitution: 0.0,
        }
    }
}

/// Everything needed to create a body
#[derive(Debug, Clone, Copy)]
pub struct BodyDef {
    pub kind: BodyKind,
    pub position: Vec2,
    pub shape: Shape,
    pub material: Material,
}

/// A body in the world
#[derive(Debug, Clone)]
pub struct Body {
    pub kind: BodyKind,
    pub position: Vec2,
    pub linear_velocity: Vec2,
    pub shape: Shape,
    pub material: Material,
    inv_mass: f32,
    joints: Vec<JointHandle>,
}

impl Body {
    fn new(def: &BodyDef) -> Self {
        let inv_mass = match def.kind {
            BodyKind::Static => 0.0,
            BodyKind::Dynamic => {
                let mass = def.material.density * def.shape.area();
                // Massless dynamic bodies still need to move
                if mass > 0.0 { 1.0 / mass } else { 1.0 }
            }
        };
        Self {
            kind: def.kind,
            position: def.position,
            linear_velocity: Vec2::ZERO,
            shape: def.shape,
            material: def.material,
            inv_mass,
            joints: Vec::new(),
        }
    }

    pub fn aabb(&self) -> Aabb {
        self.shape.aabb(self.position)
    }

    pub fn is_dynamic(&self) -> bool {
        self.kind == BodyKind::Dynamic
    }

    pub fn mass(&self) -> f32 {
        if self.inv_mass > 0.0 { 1.0 / self.inv_mass } else { 0.0 }
    }
}

/// Parameters for a distance joint
#[derive(Debug, Clone, Copy)]
pub struct DistanceJointDef {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub rest_length: f32,
    /// Spring frequency (Hz); 0 = rigid
    pub frequency_hz: f32,
    pub damping_ratio: f32,
}

/// Elastic distance constraint between two bodies
#[derive(Debug, Clone)]
pub struct DistanceJoint {
    pub body_a: BodyHandle,
    pub body_b: BodyHandle,
    pub rest_length: f32,
    pub frequency_hz: f32,
    pub damping_ratio: f32,
    /// Accumulated impulse, carried between steps for warm starting
    impulse: f32,
    // Per-step solver data
    index_a: usize,
    index_b: usize,
    axis: Vec2,
    mass: f32,
    gamma: f32,
    bias: f32,
}

#[derive(Debug, Clone)]
struct BodySlot {
    generation: u32,
    body: Option<Body>,
}

#[derive(Debug, Clone)]
struct JointSlot {
    generation: u32,
    joint: Option<DistanceJoint>,
}

/// Contact between a dynamic circle and a static box, live for one step
#[derive(Debug, Clone)]
struct ContactConstraint {
    dynamic: usize,
    fixture: usize,
    normal: Vec2,
    normal_mass: f32,
    friction: f32,
    velocity_bias: f32,
    normal_impulse: f32,
    tangent_impulse: f32,
}

/// The simulation space. Owns every body and joint.
#[derive(Debug, Clone, Default)]
pub struct PhysicsWorld {
    gravity: Vec2,
    bodies: Vec<BodySlot>,
    free_bodies: Vec<u32>,
    joints: Vec<JointSlot>,
    free_joints: Vec<u32>,
    body_count: usize,
    joint_count: usize,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec2) -> Self {
        Self {
            gravity,
            ..Default::default()
        }
    }

    pub fn body_count(&self) -> usize {
        self.body_count
    }

    pub fn joint_count(&self) -> usize {
        self.joint_count
    }

    pub fn create_body(&mut self, def: &BodyDef) -> BodyHandle {
        let body = Body::new(def);
        self.body_count += 1;
        if let Some(index) = self.free_bodies.pop() {
            let slot = &mut self.bodies[index as usize];
            slot.body = Some(body);
            BodyHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.bodies.len() as u32;
            self.bodies.push(BodySlot {
                generation: 0,
                body: Some(body),
            });
            BodyHandle {
                index,
                generation: 0,
            }
        }
    }

    /// Destroy a body and every joint attached to it.
    /// Returns false if the handle was already stale.
    pub fn destroy_body(&mut self, handle: BodyHandle) -> bool {
        let Some(slot) = self.bodies.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation {
            return false;
        }
        let Some(body) = slot.body.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_bodies.push(handle.index);
        self.body_count -= 1;

        for joint in body.joints {
            self.destroy_joint(joint);
        }
        true
    }

    pub fn contains(&self, handle: BodyHandle) -> bool {
        self.body(handle).is_some()
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&Body> {
        self.bodies
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_ref())
    }

    fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut Body> {
        self.bodies
            .get_mut(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.body.as_mut())
    }

    pub fn position(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.position)
    }

    pub fn linear_velocity(&self, handle: BodyHandle) -> Option<Vec2> {
        self.body(handle).map(|b| b.linear_velocity)
    }

    /// Set a body's velocity. Ignored for static bodies and stale handles.
    pub fn set_linear_velocity(&mut self, handle: BodyHandle, velocity: Vec2) {
        if let Some(body) = self.body_mut(handle) {
            if body.is_dynamic() {
                body.linear_velocity = velocity;
            }
        }
    }

    /// Create a distance joint. Returns None if either body is gone.
    pub fn create_distance_joint(&mut self, def: &DistanceJointDef) -> Option<JointHandle> {
        if !self.contains(def.body_a) || !self.contains(def.body_b) {
            return None;
        }

        let joint = DistanceJoint {
            body_a: def.body_a,
            body_b: def.body_b,
            rest_length: def.rest_length,
            frequency_hz: def.frequency_hz,
            damping_ratio: def.damping_ratio,
            impulse: 0.0,
            index_a: def.body_a.index as usize,
            index_b: def.body_b.index as usize,
            axis: Vec2::ZERO,
            mass: 0.0,
            gamma: 0.0,
            bias: 0.0,
        };

        let handle = if let Some(index) = self.free_joints.pop() {
            let slot = &mut self.joints[index as usize];
            slot.joint = Some(joint);
            JointHandle {
                index,
                generation: slot.generation,
            }
        } else {
            let index = self.joints.len() as u32;
            self.joints.push(JointSlot {
                generation: 0,
                joint: Some(joint),
            });
            JointHandle {
                index,
                generation: 0,
            }
        };
        self.joint_count += 1;

        for body in [def.body_a, def.body_b] {
            if let Some(body) = self.body_mut(body) {
                body.joints.push(handle);
            }
        }
        Some(handle)
    }

    pub fn destroy_joint(&mut self, handle: JointHandle) -> bool {
        let Some(slot) = self.joints.get_mut(handle.index as usize) else {
            return false;
        };
        if slot.generation != handle.generation {
            return false;
        }
        let Some(joint) = slot.joint.take() else {
            return false;
        };
        slot.generation = slot.generation.wrapping_add(1);
        self.free_joints.push(handle.index);
        self.joint_count -= 1;

        for body in [joint.body_a, joint.body_b] {
            if let Some(body) = self.body_mut(body) {
                body.joints.retain(|j| *j != handle);
            }
        }
        true
    }

    pub fn joint(&self, handle: JointHandle) -> Option<&DistanceJoint> {
        self.joints
            .get(handle.index as usize)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.joint.as_ref())
    }

    /// Joints attached to a body (empty for stale handles)
    pub fn joints_of(&self, handle: BodyHandle) -> &[JointHandle] {
        self.body(handle).map(|b| b.joints.as_slice()).unwrap_or(&[])
    }

    /// Visit every body whose bounding box overlaps `aabb`.
    ///
    /// The visitor returns `false` to stop early. This is a broad-phase
    /// test only: callers refine with their own exact checks.
    pub fn query_aabb<F>(&self, aabb: &Aabb, mut visitor: F)
    where
        F: FnMut(BodyHandle, &Body) -> bool,
    {
        for (index, slot) in self.bodies.iter().enumerate() {
            let Some(body) = &slot.body else { continue };
            if body.aabb().overlaps(aabb) {
                let handle = BodyHandle {
                    index: index as u32,
                    generation: slot.generation,
                };
                if !visitor(handle, body) {
                    return;
                }
            }
        }
    }

    /// Collect every body whose bounding box overlaps `aabb`
    pub fn bodies_in_aabb(&self, aabb: &Aabb) -> Vec<BodyHandle> {
        let mut found = Vec::new();
        self.query_aabb(aabb, |handle, _| {
            found.push(handle);
            true
        });
        found
    }

    /// Advance the world by one fixed step
    pub fn step(&mut self, dt: f32, velocity_iterations: u32, position_iterations: u32) {
        if dt <= 0.0 {
            return;
        }

        // Integrate velocities
        let gravity = self.gravity;
        for body in self.bodies.iter_mut().filter_map(|s| s.body.as_mut()) {
            if body.is_dynamic() {
                body.linear_velocity += gravity * dt;
            }
        }

        let mut contacts = self.collect_contacts();
        self.init_joints(dt);
        self.warm_start_joints();

        for _ in 0..velocity_iterations {
            self.solve_joint_velocities();
            self.solve_contact_velocities(&mut contacts);
        }

        // Integrate positions
        for body in self.bodies.iter_mut().filter_map(|s| s.body.as_mut()) {
            if !body.is_dynamic() {
                continue;
            }
            let translation = body.linear_velocity * dt;
            let distance_sq = translation.length_squared();
            if distance_sq > MAX_TRANSLATION * MAX_TRANSLATION {
                body.linear_velocity *= MAX_TRANSLATION / distance_sq.sqrt();
            }
            body.position += body.linear_velocity * dt;
        }

        for _ in 0..position_iterations {
            let contacts_ok = self.solve_contact_positions(&contacts);
            let joints_ok = self.solve_joint_positions();
            if contacts_ok && joints_ok {
                break;
            }
        }
    }

    /// Dynamic circles against static, non-degenerate boxes
    fn collect_contacts(&self) -> Vec<ContactConstraint> {
        let fixtures: Vec<usize> = self
            .bodies
            .iter()
            .enumerate()
            .filter_map(|(i, slot)| {
                let body = slot.body.as_ref()?;
                let is_box = matches!(body.shape, Shape::Box { .. });
                (!body.is_dynamic() && is_box && !body.shape.is_degenerate()).then_some(i)
            })
            .collect();

        let mut contacts = Vec::new();
        if fixtures.is_empty() {
            return contacts;
        }

        for (dynamic, slot) in self.bodies.iter().enumerate() {
            let Some(body) = &slot.body else { continue };
            let Shape::Circle { radius } = body.shape else { continue };
            if !body.is_dynamic() {
                continue;
            }
            let body_aabb = body.aabb();

            for &fixture in &fixtures {
                let Some(other) = &self.bodies[fixture].body else { continue };
                if !other.aabb().overlaps(&body_aabb) {
                    continue;
                }
                let Shape::Box { half_extents } = other.shape else { continue };
                let hit = circle_box_collision(body.position, radius, other.position, half_extents);
                if !hit.hit {
                    continue;
                }

                let normal_speed = body.linear_velocity.dot(hit.normal);
                let restitution = body.material.restitution.max(other.material.restitution);
                let velocity_bias = if normal_speed < -VELOCITY_THRESHOLD {
                    -restitution * normal_speed
                } else {
                    0.0
                };
                contacts.push(ContactConstraint {
                    dynamic,
                    fixture,
                    normal: hit.normal,
                    normal_mass: body.mass(),
                    friction: (body.material.friction * other.material.friction).sqrt(),
                    velocity_bias,
                    normal_impulse: 0.0,
                    tangent_impulse: 0.0,
                });
            }
        }
        contacts
    }

    fn init_joints(&mut self, dt: f32) {
        let bodies = &self.bodies;
        for joint in self.joints.iter_mut().filter_map(|s| s.joint.as_mut()) {
            let (Some(a), Some(b)) = (
                bodies[joint.index_a].body.as_ref(),
                bodies[joint.index_b].body.as_ref(),
            ) else {
                joint.mass = 0.0;
                continue;
            };

            let delta = b.position - a.position;
            let length = delta.length();
            joint.axis = if length > LINEAR_SLOP {
                delta / length
            } else {
                Vec2::ZERO
            };

            let mut inv_mass = a.inv_mass + b.inv_mass;
            joint.mass = if inv_mass != 0.0 { 1.0 / inv_mass } else { 0.0 };

            if joint.frequency_hz > 0.0 {
                let c = length - joint.rest_length;
                let omega = std::f32::consts::TAU * joint.frequency_hz;
                let damping = 2.0 * joint.mass * joint.damping_ratio * omega;
                let stiffness = joint.mass * omega * omega;

                let gamma = dt * (damping + dt * stiffness);
                joint.gamma = if gamma != 0.0 { 1.0 / gamma } else { 0.0 };
                joint.bias = c * dt * stiffness * joint.gamma;

                inv_mass += joint.gamma;
                joint.mass = if inv_mass != 0.0 { 1.0 / inv_mass } else { 0.0 };
            } else {
                joint.gamma = 0.0;
                joint.bias = 0.0;
            }
        }
    }

    fn warm_start_joints(&mut self) {
        let bodies = &mut self.bodies;
        for joint in self.joints.iter().filter_map(|s| s.joint.as_ref()) {
            let p = joint.axis * joint.impulse;
            apply_pair_impulse(bodies, joint.index_a, joint.index_b, p);
        }
    }

    fn solve_joint_velocities(&mut self) {
        let bodies = &mut self.bodies;
        for joint in self.joints.iter_mut().filter_map(|s| s.joint.as_mut()) {
            if joint.mass == 0.0 {
                continue;
            }
            let (Some(va), Some(vb)) = (
                velocity_at(bodies, joint.index_a),
                velocity_at(bodies, joint.index_b),
            ) else {
                continue;
            };

            let cdot = joint.axis.dot(vb - va);
            let impulse = -joint.mass * (cdot + joint.bias + joint.gamma * joint.impulse);
            joint.impulse += impulse;
            apply_pair_impulse(bodies, joint.index_a, joint.index_b, joint.axis * impulse);
        }
    }

    /// Rigid joints only; soft joints have no position error to fix
    fn solve_joint_positions(&mut self) -> bool {
        let bodies = &mut self.bodies;
        let mut ok = true;
        for joint in self.joints.iter().filter_map(|s| s.joint.as_ref()) {
            if joint.frequency_hz > 0.0 {
                continue;
            }
            let (Some(a), Some(b)) = (
                bodies[joint.index_a].body.as_ref(),
                bodies[joint.index_b].body.as_ref(),
            ) else {
                continue;
            };
            let inv_mass = a.inv_mass + b.inv_mass;
            if inv_mass == 0.0 {
                continue;
            }

            let delta = b.position - a.position;
            let length = delta.length();
            let axis = delta.normalize_or_zero();
            let c = (length - joint.rest_length).clamp(-MAX_LINEAR_CORRECTION, MAX_LINEAR_CORRECTION);
            let impulse = -c / inv_mass;
            ok &= c.abs() < LINEAR_SLOP;

            if let Some(a) = bodies[joint.index_a].body.as_mut() {
                a.position -= axis * (impulse * a.inv_mass);
            }
            if let Some(b) = bodies[joint.index_b].body.as_mut() {
                b.position += axis * (impulse * b.inv_mass);
            }
        }
        ok
    }

    fn solve_contact_velocities(&mut self, contacts: &mut [ContactConstraint]) {
        for contact in contacts.iter_mut() {
            let Some(body) = self.bodies[contact.dynamic].body.as_mut() else {
                continue;
            };
            let n = contact.normal;
            let t = n.perp();

            // Friction first, bounded by the current normal impulse
            let vt = body.linear_velocity.dot(t);
            let max_friction = contact.friction * contact.normal_impulse;
            let new_tangent =
                (contact.tangent_impulse - contact.normal_mass * vt).clamp(-max_friction, max_friction);
            let dt_impulse = new_tangent - contact.tangent_impulse;
            contact.tangent_impulse = new_tangent;
            body.linear_velocity += t * (dt_impulse * body.inv_mass);

            let vn = body.linear_velocity.dot(n);
            let new_normal =
                (contact.normal_impulse - contact.normal_mass * (vn - contact.velocity_bias)).max(0.0);
            let dn_impulse = new_normal - contact.normal_impulse;
            contact.normal_impulse = new_normal;
            body.linear_velocity += n * (dn_impulse * body.inv_mass);
        }
    }

    fn solve_contact_positions(&mut self, contacts: &[ContactConstraint]) -> bool {
        let mut min_separation = 0.0_f32;
        for contact in contacts {
            let Some(fixture) = self.bodies[contact.fixture].body.as_ref() else {
                continue;
            };
            let (Shape::Box { half_extents }, fixture_pos) = (fixture.shape, fixture.position) else {
                continue;
            };
            let Some(body) = self.bodies[contact.dynamic].body.as_mut() else {
                continue;
            };
            let Shape::Circle { radius } = body.shape else { continue };

            let hit: CollisionResult =
                circle_box_collision(body.position, radius, fixture_pos, half_extents);
            if !hit.hit {
                continue;
            }
            let separation = -hit.penetration;
            min_separation = min_separation.min(separation);

            let correction = (BAUMGARTE * (separation + LINEAR_SLOP)).clamp(-MAX_LINEAR_CORRECTION, 0.0);
            body.position -= hit.normal * correction;
        }
        min_separation >= -3.0 * LINEAR_SLOP
    }
}

fn velocity_at(bodies: &[BodySlot], index: usize) -> Option<Vec2> {
    bodies[index].body.as_ref().map(|b| b.linear_velocity)
}

/// Apply `-p` to body A and `+p` to body B, scaled by inverse mass
fn apply_pair_impulse(bodies: &mut [BodySlot], index_a: usize, index_b: usize, p: Vec2) {
    if let Some(a) = bodies[index_a].body.as_mut() {
        a.linear_velocity -= p * a.inv_mass;
    }
    if let Some(b) = bodies[index_b].body.as_mut() {
        b.linear_velocity += p * b.inv_mass;
    }
}
