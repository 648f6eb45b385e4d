use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::controller::actuator::ImpulseTarget;

/// How far below a surface a body may start a step and still land on it.
const CONTACT_SLOP: f32 = 0.01;
/// Approach speed above the per-step gravity gain that still counts as resting.
const REST_SPEED: f32 = 0.05;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct BodyHandle(pub usize);

/// Mass, friction and restitution as written in a preset. Mass 0 is static.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BodySpec {
    pub mass: f32,
    pub friction: f32,
    pub restitution: f32,
}

impl Default for BodySpec {
    fn default() -> Self {
        Self { mass: 0.0, friction: 0.2, restitution: 0.2 }
    }
}

/// A point-mass body with an axis-aligned box for ground contact.
#[derive(Debug, Clone, PartialEq)]
pub struct RigidBody {
    pub position: Vec3,
    pub velocity: Vec3,
    pub mass: f32,
    pub inv_mass: f32,
    pub friction: f32,
    pub restitution: f32,
    pub half_extents: Vec3,
    pub force_accum: Vec3,
    pub spawn: Vec3,
}

impl RigidBody {
    pub fn new(position: Vec3, mass: f32, half_extents: Vec3) -> Self {
        let mass = mass.max(0.0);
        Self {
            position,
            velocity: Vec3::ZERO,
            mass,
            inv_mass: if mass > 0.0 { 1.0 / mass } else { 0.0 },
            friction: BodySpec::default().friction,
            restitution: BodySpec::default().restitution,
            half_extents: half_extents.abs(),
            force_accum: Vec3::ZERO,
            spawn: position,
        }
    }

    pub fn from_spec(spec: &BodySpec, position: Vec3, half_extents: Vec3) -> Self {
        Self::new(position, spec.mass, half_extents)
            .with_friction(spec.friction)
            .with_restitution(spec.restitution)
    }

    pub fn with_friction(mut self, friction: f32) -> Self {
        self.friction = friction.max(0.0);
        self
    }

    pub fn with_restitution(mut self, restitution: f32) -> Self {
        self.restitution = restitution.max(0.0);
        self
    }

    pub fn is_static(&self) -> bool {
        self.inv_mass == 0.0
    }

    pub fn top(&self) -> f32 {
        self.position.y + self.half_extents.y
    }

    pub fn bottom(&self) -> f32 {
        self.position.y - self.half_extents.y
    }

    fn covers_xz(&self, point: Vec3) -> bool {
        (point.x - self.position.x).abs() <= self.half_extents.x
            && (point.z - self.position.z).abs() <= self.half_extents.z
    }

    pub fn reset(&mut self) {
        self.position = self.spawn;
        self.velocity = Vec3::ZERO;
        self.force_accum = Vec3::ZERO;
    }
}

impl ImpulseTarget for RigidBody {
    fn absolute_position(&self) -> Vec3 {
        self.position
    }

    fn linear_velocity(&self) -> Vec3 {
        self.velocity
    }

    // Point masses have no angular state, so the application point is unused.
    fn apply_impulse(&mut self, impulse: Vec3, _at: Vec3) {
        self.velocity += impulse * self.inv_mass;
    }

    fn apply_force(&mut self, force: Vec3, _at: Vec3) {
        if !self.is_static() {
            self.force_accum += force;
        }
    }
}

/// Gravity, forces and landing on the top faces of static bodies.
pub struct PhysicsWorld {
    pub gravity: Vec3,
    bodies: Vec<RigidBody>,
}

impl PhysicsWorld {
    pub fn new(gravity: Vec3) -> Self {
        Self { gravity, bodies: Vec::new() }
    }

    pub fn add_body(&mut self, body: RigidBody) -> BodyHandle {
        self.bodies.push(body);
        BodyHandle(self.bodies.len() - 1)
    }

    pub fn body(&self, handle: BodyHandle) -> Option<&RigidBody> {
        self.bodies.get(handle.0)
    }

    pub fn body_mut(&mut self, handle: BodyHandle) -> Option<&mut RigidBody> {
        self.bodies.get_mut(handle.0)
    }

    pub fn reset(&mut self) {
        self.bodies.iter_mut().for_each(RigidBody::reset);
    }

    /// Advances every dynamic body by `dt` seconds (semi-implicit Euler).
    pub fn step(&mut self, dt: f32) {
        if dt <= 0.0 {
            // nothing to integrate, but queued forces still belong to this step
            self.bodies.iter_mut().for_each(|b| b.force_accum = Vec3::ZERO);
            return;
        }

        let (statics, dynamics): (Vec<&mut RigidBody>, Vec<&mut RigidBody>) =
            self.bodies.iter_mut().partition(|b| b.is_static());
        let rest_speed = self.gravity.length() * dt * 2.0 + REST_SPEED;

        for body in dynamics {
            let prev_bottom = body.bottom();

            body.velocity += (self.gravity + body.force_accum * body.inv_mass) * dt;
            body.position += body.velocity * dt;
            body.force_accum = Vec3::ZERO;

            let bottom = body.bottom();
            let support = statics
                .iter()
                .filter(|s| s.covers_xz(body.position))
                .filter(|s| prev_bottom >= s.top() - CONTACT_SLOP && bottom < s.top())
                .max_by(|a, b| a.top().total_cmp(&b.top()));

            let Some(support) = support else { continue };

            body.position.y = support.top() + body.half_extents.y;
            let approach = -body.velocity.y;
            if approach > rest_speed {
                let e = body.restitution * support.restitution;
                let mu = body.friction * support.friction;
                body.velocity.y = approach * e;

                let tangential = Vec3::new(body.velocity.x, 0.0, body.velocity.z);
                let speed = tangential.length();
                if speed > 0.0 {
                    let dv = speed.min(mu * (1.0 + e) * approach);
                    body.velocity -= tangential / speed * dv;
                }
            } else {
                body.velocity.y = body.velocity.y.max(0.0);
            }
        }
    }
}
