// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Simulated bodies.
use core::fmt;

use bytes::BytesMut;
use lockstep_math::{Fp, Fp3};

use crate::checksum::fletcher32;
use crate::codec::Encode;
use crate::collider::Collider;
use crate::ident::InstanceId;
use crate::points::Collision;
use crate::transform::Transform;
use crate::world::WorldConfig;

/// Host hook invoked once per collision an object takes part in. Receives the
/// owning object's id and the collision record.
pub type CollisionCallback = Box<dyn FnMut(InstanceId, &Collision)>;

/// A rigid body.
///
/// `is_dynamic` bodies are integrated and have finite mass; other bodies act
/// as immovable obstacles (inverse mass treated as zero). Solvers only move
/// bodies that are both dynamic and kinematic.
pub struct PhysObject {
    id: InstanceId,
    /// Owned transform; its id always equals the object id.
    pub transform: Transform,
    /// Linear velocity.
    pub velocity: Fp3,
    /// Gravity acceleration applied each step.
    pub gravity: Fp3,
    /// Force accumulated for the current step; cleared after integration.
    pub force: Fp3,
    /// Inverse mass.
    pub inv_mass: Fp,
    /// Integrated and given finite mass when set.
    pub is_dynamic: bool,
    /// Moved by the solvers when set (and dynamic).
    pub is_kinematic: bool,
    /// Bounciness; combined multiplicatively per pair.
    pub restitution: Fp,
    /// Static friction coefficient.
    pub static_friction: Fp,
    /// Dynamic friction coefficient.
    pub dynamic_friction: Fp,
    /// Optional shape.
    pub collider: Option<Collider>,
    on_collision: Option<CollisionCallback>,
}

impl PhysObject {
    /// New dynamic, kinematic body at the origin with defaults from `config`.
    pub fn new(id: InstanceId, config: &WorldConfig) -> Self {
        Self {
            id,
            transform: Transform::new(id),
            velocity: Fp3::ZERO,
            gravity: config.gravity,
            force: Fp3::ZERO,
            inv_mass: config.inv_mass,
            is_dynamic: true,
            is_kinematic: true,
            restitution: config.restitution,
            static_friction: config.static_friction,
            dynamic_friction: config.dynamic_friction,
            collider: None,
            on_collision: None,
        }
    }

    // Decode path: every field comes from the stream.
    pub(crate) fn from_parts(id: InstanceId, transform: Transform) -> Self {
        Self::new(id, &WorldConfig::default()).with_transform(transform)
    }

    fn with_transform(mut self, transform: Transform) -> Self {
        self.transform = transform;
        self
    }

    /// Instance id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Builder: attaches a collider.
    pub fn with_collider(mut self, collider: Collider) -> Self {
        self.collider = Some(collider);
        self
    }

    /// Builder: sets the local position.
    pub fn with_position(mut self, position: Fp3) -> Self {
        self.transform.set_position(position);
        self
    }

    /// Builder: sets the dynamic and kinematic flags.
    pub fn with_flags(mut self, is_dynamic: bool, is_kinematic: bool) -> Self {
        self.is_dynamic = is_dynamic;
        self.is_kinematic = is_kinematic;
        self
    }

    /// Installs the collision callback, replacing any previous one.
    pub fn set_on_collision(&mut self, callback: impl FnMut(InstanceId, &Collision) + 'static) {
        self.on_collision = Some(Box::new(callback));
    }

    /// Removes the collision callback.
    pub fn clear_on_collision(&mut self) {
        self.on_collision = None;
    }

    /// Whether a callback is installed.
    pub fn has_on_collision(&self) -> bool {
        self.on_collision.is_some()
    }

    pub(crate) fn notify(&mut self, collision: &Collision) {
        if let Some(cb) = self.on_collision.as_mut() {
            cb(self.id, collision);
        }
    }

    /// Inverse mass seen by the solvers: zero for non-dynamic bodies.
    pub fn effective_inv_mass(&self) -> Fp {
        if self.is_dynamic {
            self.inv_mass
        } else {
            Fp::ZERO
        }
    }

    /// Whether solvers may move this body.
    pub fn responds_to_contacts(&self) -> bool {
        self.is_dynamic && self.is_kinematic
    }

    /// Adds to the force accumulated for this step.
    pub fn apply_force(&mut self, force: Fp3) {
        self.force += force;
    }

    /// Semi-implicit Euler step: velocity first, then position with the new
    /// velocity. The accumulated force is cleared. Non-dynamic bodies only
    /// have their force cleared.
    pub fn integrate(&mut self, dt: Fp) {
        if self.is_dynamic {
            let accel = self.gravity + self.force * self.inv_mass;
            self.velocity += accel * dt;
            self.transform.translate(self.velocity * dt);
        }
        self.force = Fp3::ZERO;
    }

    /// Fletcher-32 of the canonical encoding. The callback is not part of the
    /// state.
    pub fn checksum(&self) -> u32 {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        fletcher32(&buf)
    }
}

impl fmt::Debug for PhysObject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysObject")
            .field("id", &self.id)
            .field("transform", &self.transform)
            .field("velocity", &self.velocity)
            .field("gravity", &self.gravity)
            .field("force", &self.force)
            .field("inv_mass", &self.inv_mass)
            .field("is_dynamic", &self.is_dynamic)
            .field("is_kinematic", &self.is_kinematic)
            .field("restitution", &self.restitution)
            .field("static_friction", &self.static_friction)
            .field("dynamic_friction", &self.dynamic_friction)
            .field("collider", &self.collider)
            .field("on_collision", &self.on_collision.is_some())
            .finish()
    }
}
