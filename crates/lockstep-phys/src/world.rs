// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! The simulation world and its fixed step.
use core::fmt;
use core::mem;

use bytes::{Bytes, BytesMut};
use lockstep_math::{Fp, Fp3};
use rustc_hash::FxHashMap;
use tracing::{debug, instrument, trace};

use crate::broad::{BroadPhase, BruteForcePairs, Proxy};
use crate::checksum::fletcher32;
use crate::codec::{self, Encode};
use crate::collider::Collider;
use crate::error::{CodecError, WorldError};
use crate::ident::InstanceId;
use crate::layer::{CollisionMatrix, Layer, LayerMask};
use crate::object::PhysObject;
use crate::points::{Collision, CollisionPoints};
use crate::query::{Ray, RayHit};
use crate::solver::Solver;
use crate::transform::{check_link, Pose, Transform, TransformLookup};

/// Defaults applied to new objects and the default solver list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorldConfig {
    /// Gravity given to new objects.
    pub gravity: Fp3,
    /// Inverse mass given to new objects.
    pub inv_mass: Fp,
    /// Restitution given to new objects.
    pub restitution: Fp,
    /// Static friction given to new objects.
    pub static_friction: Fp,
    /// Dynamic friction given to new objects.
    pub dynamic_friction: Fp,
    /// Fraction of penetration removed per step by positional correction.
    pub correction_percent: Fp,
    /// Penetration tolerated without positional correction.
    pub correction_slop: Fp,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            gravity: Fp3::new(Fp::ZERO, Fp::from_ratio(-981, 100), Fp::ZERO),
            inv_mass: Fp::from_ratio(1, 5),
            restitution: Fp::HALF,
            static_friction: Fp::HALF,
            dynamic_friction: Fp::from_ratio(3, 10),
            correction_percent: Fp::from_ratio(4, 5),
            correction_slop: Fp::from_ratio(1, 100),
        }
    }
}

impl WorldConfig {
    /// `[Impulse, SmoothPosition]` with this config's correction settings.
    pub fn default_solvers(&self) -> Vec<Solver> {
        vec![
            Solver::Impulse,
            Solver::SmoothPosition {
                percent: self.correction_percent,
                slop: self.correction_slop,
            },
        ]
    }
}

/// Hit returned by world ray queries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectHit {
    /// Struck object.
    pub object: InstanceId,
    /// Intersection details.
    pub hit: RayHit,
}

/// Contact returned by world capsule casts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ObjectContact {
    /// Touched object.
    pub object: InstanceId,
    /// Contact from the cast capsule toward the object.
    pub points: CollisionPoints,
}

fn successor(id: InstanceId) -> Result<u64, WorldError> {
    id.get()
        .checked_add(1)
        .ok_or(WorldError::IdSpaceExhausted(id))
}

/// Owns the objects, solvers, layer matrix, and the latest collision list.
///
/// Object order is insertion order and is part of the simulation state: pair
/// enumeration, collision order, and therefore solver results follow it.
pub struct PhysWorld {
    config: WorldConfig,
    next_id: u64,
    objects: Vec<PhysObject>,
    index: FxHashMap<InstanceId, usize>,
    solvers: Vec<Solver>,
    matrix: CollisionMatrix,
    collisions: Vec<Collision>,
    broad_phase: Box<dyn BroadPhase>,
}

impl Default for PhysWorld {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for PhysWorld {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PhysWorld")
            .field("config", &self.config)
            .field("next_id", &self.next_id)
            .field("objects", &self.objects)
            .field("solvers", &self.solvers)
            .field("matrix", &self.matrix)
            .field("collisions", &self.collisions)
            .finish_non_exhaustive()
    }
}

impl TransformLookup for PhysWorld {
    fn transform(&self, id: InstanceId) -> Option<&Transform> {
        self.object(id).map(|o| &o.transform)
    }
}

impl PhysWorld {
    /// Empty world with [`WorldConfig::default`].
    pub fn new() -> Self {
        Self::with_config(WorldConfig::default())
    }

    /// Empty world with custom defaults.
    pub fn with_config(config: WorldConfig) -> Self {
        Self {
            config,
            next_id: 1,
            objects: Vec::new(),
            index: FxHashMap::default(),
            solvers: config.default_solvers(),
            matrix: CollisionMatrix::new(),
            collisions: Vec::new(),
            broad_phase: Box::new(BruteForcePairs),
        }
    }

    pub(crate) fn from_parts(
        config: WorldConfig,
        next_id: u64,
        matrix: CollisionMatrix,
        solvers: Vec<Solver>,
        objects: Vec<PhysObject>,
        collisions: Vec<Collision>,
    ) -> Self {
        let mut world = Self {
            config,
            next_id,
            objects,
            index: FxHashMap::default(),
            solvers,
            matrix,
            collisions,
            broad_phase: Box::new(BruteForcePairs),
        };
        world.reindex();
        world
    }

    fn reindex(&mut self) {
        self.index = self
            .objects
            .iter()
            .enumerate()
            .map(|(i, o)| (o.id(), i))
            .collect();
    }

    /// Current defaults.
    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    /// Replaces the broad phase. The replacement must honor the ordering
    /// contract of [`BroadPhase`].
    pub fn set_broad_phase(&mut self, broad_phase: impl BroadPhase + 'static) {
        self.broad_phase = Box::new(broad_phase);
    }

    /// Reserves the next instance id. Ids are never reused by a world unless
    /// [`PhysWorld::reset_id_counter`] is called. Fails once the id space is
    /// used up.
    pub fn next_id(&mut self) -> Result<InstanceId, WorldError> {
        let id = InstanceId(self.next_id);
        self.next_id = successor(id)?;
        Ok(id)
    }

    /// Value the next call to [`PhysWorld::next_id`] will return.
    pub fn peek_next_id(&self) -> InstanceId {
        InstanceId(self.next_id)
    }

    /// Restarts id assignment at `1`. Intended for tests that need
    /// reproducible ids across fresh worlds; reusing ids of live objects makes
    /// [`PhysWorld::add_object`] fail.
    pub fn reset_id_counter(&mut self) {
        self.next_id = 1;
    }

    /// Factory: a new object with a fresh id and this world's defaults. The
    /// object is not added; configure it and pass it to
    /// [`PhysWorld::add_object`].
    pub fn new_object(&mut self) -> Result<PhysObject, WorldError> {
        let id = self.next_id()?;
        Ok(PhysObject::new(id, &self.config))
    }

    /// Appends an object. Fails if its id is already present or leaves no
    /// id after it.
    pub fn add_object(&mut self, object: PhysObject) -> Result<InstanceId, WorldError> {
        let id = object.id();
        if self.index.contains_key(&id) {
            return Err(WorldError::DuplicateInstance(id));
        }
        self.next_id = self.next_id.max(successor(id)?);
        self.index.insert(id, self.objects.len());
        self.objects.push(object);
        Ok(id)
    }

    /// Removes an object, keeping the order of the rest. Children of its
    /// transform become roots; their local values are left untouched.
    pub fn remove_object(&mut self, id: InstanceId) -> Option<PhysObject> {
        let pos = self.index.get(&id).copied()?;
        let removed = self.objects.remove(pos);
        for o in &mut self.objects {
            if o.transform.parent() == Some(id) {
                o.transform.set_parent_unchecked(None);
            }
        }
        self.collisions.retain(|c| c.a != id && c.b != id);
        self.reindex();
        Some(removed)
    }

    fn create_with(&mut self, position: Fp3, collider: Collider) -> Result<InstanceId, WorldError> {
        let object = self
            .new_object()?
            .with_position(position)
            .with_collider(collider);
        self.add_object(object)
    }

    /// Adds a dynamic sphere object centered on `position`.
    pub fn create_sphere_object(
        &mut self,
        position: Fp3,
        radius: Fp,
        layer: Layer,
    ) -> Result<InstanceId, WorldError> {
        self.create_with(position, Collider::sphere(Fp3::ZERO, radius).with_layer(layer))
    }

    /// Adds a dynamic capsule object centered on `position`.
    pub fn create_capsule_object(
        &mut self,
        position: Fp3,
        radius: Fp,
        height: Fp,
        axis: Fp3,
        layer: Layer,
    ) -> Result<InstanceId, WorldError> {
        self.create_with(
            position,
            Collider::capsule(Fp3::ZERO, radius, height, axis).with_layer(layer),
        )
    }

    /// Adds a dynamic box object centered on `position` with the given half
    /// extents.
    pub fn create_aabb_object(
        &mut self,
        position: Fp3,
        half_extents: Fp3,
        layer: Layer,
    ) -> Result<InstanceId, WorldError> {
        self.create_with(
            position,
            Collider::aabb(-half_extents, half_extents).with_layer(layer),
        )
    }

    /// Adds a static plane object through `position`.
    pub fn create_plane_object(
        &mut self,
        position: Fp3,
        normal: Fp3,
        layer: Layer,
    ) -> Result<InstanceId, WorldError> {
        let id = self.create_with(position, Collider::plane(normal, Fp::ZERO).with_layer(layer))?;
        if let Some(o) = self.object_mut(id) {
            o.is_dynamic = false;
            o.is_kinematic = false;
        }
        Ok(id)
    }

    /// Object by id.
    pub fn object(&self, id: InstanceId) -> Option<&PhysObject> {
        self.index.get(&id).map(|i| &self.objects[*i])
    }

    /// Mutable object by id. Parent links are changed only through
    /// [`PhysWorld::set_parent`].
    pub fn object_mut(&mut self, id: InstanceId) -> Option<&mut PhysObject> {
        self.index.get(&id).map(|i| &mut self.objects[*i])
    }

    /// Objects in insertion order.
    pub fn objects(&self) -> &[PhysObject] {
        &self.objects
    }

    /// Number of objects.
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the world holds no objects.
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Links `child`'s transform under `parent`'s (or detaches it), rejecting
    /// unknown ids and cycles.
    pub fn set_parent(
        &mut self,
        child: InstanceId,
        parent: Option<InstanceId>,
    ) -> Result<(), WorldError> {
        if !self.index.contains_key(&child) {
            return Err(WorldError::UnknownInstance(child));
        }
        check_link(&*self, child, parent)?;
        if let Some(o) = self.object_mut(child) {
            o.transform.set_parent_unchecked(parent);
        }
        Ok(())
    }

    /// World pose of an object's transform.
    pub fn world_pose(&self, id: InstanceId) -> Option<Pose> {
        self.object(id).map(|o| o.transform.world_pose(self))
    }

    /// Layer pair permissions.
    pub fn matrix(&self) -> &CollisionMatrix {
        &self.matrix
    }

    /// Mutable layer pair permissions.
    pub fn matrix_mut(&mut self) -> &mut CollisionMatrix {
        &mut self.matrix
    }

    /// Registered solvers, in run order.
    pub fn solvers(&self) -> &[Solver] {
        &self.solvers
    }

    /// Mutable solver list.
    pub fn solvers_mut(&mut self) -> &mut Vec<Solver> {
        &mut self.solvers
    }

    /// Collisions found by the most recent step.
    pub fn collisions(&self) -> &[Collision] {
        &self.collisions
    }

    /// Advances the simulation by `dt`.
    ///
    /// 1. Snapshot world poses, enumerate pairs, filter by layer, and run the
    ///    narrow phase; the collision list is rebuilt from scratch.
    /// 2. Run every solver in order over that list.
    /// 3. Fire collision callbacks: for each collision, `a` then `b`.
    /// 4. Integrate every object and clear accumulated forces.
    #[instrument(level = "debug", skip(self), fields(objects = self.objects.len()))]
    pub fn step(&mut self, dt: Fp) {
        self.resolve_collisions();

        for solver in &self.solvers {
            solver.solve(&mut self.objects, &self.index, &self.collisions);
        }

        let collisions = mem::take(&mut self.collisions);
        for collision in &collisions {
            for id in [collision.a, collision.b] {
                if let Some(&i) = self.index.get(&id) {
                    self.objects[i].notify(collision);
                }
            }
        }
        self.collisions = collisions;

        for object in &mut self.objects {
            object.integrate(dt);
        }
    }

    fn resolve_collisions(&mut self) {
        self.collisions.clear();

        let world: &Self = self;
        let poses: Vec<Pose> = world
            .objects
            .iter()
            .map(|o| o.transform.world_pose(world))
            .collect();
        let proxies: Vec<Proxy> = self
            .objects
            .iter()
            .enumerate()
            .filter_map(|(index, o)| {
                o.collider.map(|c| Proxy {
                    index,
                    id: o.id(),
                    layer: c.layer,
                })
            })
            .collect();

        let mut pairs = Vec::new();
        self.broad_phase.collect_pairs(&proxies, &mut pairs);
        let candidates = pairs.len();

        for (i, j) in pairs {
            let (a, b) = (&self.objects[i], &self.objects[j]);
            let (Some(ca), Some(cb)) = (a.collider, b.collider) else {
                continue;
            };
            if !self.matrix.can_layers_collide(ca.layer, cb.layer) {
                continue;
            }
            let points = ca.test_collision(&poses[i], &cb, &poses[j]);
            if points.has_collision {
                trace!(a = %a.id(), b = %b.id(), depth_sq = %points.depth_squared, "collision");
                self.collisions.push(Collision {
                    a: a.id(),
                    b: b.id(),
                    points,
                });
            }
        }
        debug!(candidates, collisions = self.collisions.len(), "narrow phase");
    }

    fn posed_colliders(&self) -> impl Iterator<Item = (InstanceId, Collider, Pose)> + '_ {
        self.objects.iter().filter_map(move |o| {
            o.collider
                .map(|c| (o.id(), c, o.transform.world_pose(self)))
        })
    }

    /// Nearest hit along `ray`; ties go to the earlier object.
    pub fn raycast(&self, ray: &Ray, mask: LayerMask) -> Option<ObjectHit> {
        self.raycast_all(ray, mask)
            .into_iter()
            .reduce(|best, h| if h.hit.t < best.hit.t { h } else { best })
    }

    /// Every hit along `ray`, in object insertion order.
    pub fn raycast_all(&self, ray: &Ray, mask: LayerMask) -> Vec<ObjectHit> {
        self.posed_colliders()
            .filter_map(|(object, c, pose)| {
                c.raycast(&pose, ray, mask).map(|hit| ObjectHit { object, hit })
            })
            .collect()
    }

    /// First object, in insertion order, touched by a capsule of `radius`
    /// and tip-to-tip `height` centered at `center` along `direction`.
    pub fn capsulecast(
        &self,
        center: Fp3,
        direction: Fp3,
        radius: Fp,
        height: Fp,
        mask: LayerMask,
    ) -> Option<ObjectContact> {
        self.capsulecast_all(center, direction, radius, height, mask)
            .into_iter()
            .next()
    }

    /// Every object touched by the capsule, in insertion order.
    pub fn capsulecast_all(
        &self,
        center: Fp3,
        direction: Fp3,
        radius: Fp,
        height: Fp,
        mask: LayerMask,
    ) -> Vec<ObjectContact> {
        self.posed_colliders()
            .filter_map(|(object, c, pose)| {
                let points = c.capsulecast(&pose, center, direction, radius, height, mask);
                points
                    .has_collision
                    .then_some(ObjectContact { object, points })
            })
            .collect()
    }

    /// Canonical binary encoding of the whole world.
    pub fn to_bytes(&self) -> Bytes {
        codec::to_bytes(self)
    }

    /// Decodes a world, re-linking and validating the transform hierarchy.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, CodecError> {
        codec::from_bytes(bytes)
    }

    /// Fletcher-32 of the canonical encoding.
    pub fn checksum(&self) -> u32 {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        fletcher32(&buf)
    }

    /// BLAKE3 digest of the canonical encoding.
    pub fn state_hash(&self) -> [u8; 32] {
        let mut buf = BytesMut::new();
        self.encode(&mut buf);
        *blake3::hash(&buf).as_bytes()
    }

    pub(crate) fn next_id_raw(&self) -> u64 {
        self.next_id
    }
}
