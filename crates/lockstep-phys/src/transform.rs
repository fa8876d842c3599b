// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Parented position/rotation/scale.
//!
//! A [`Transform`] stores only local values plus the *id* of its parent.
//! World values are resolved on demand through a [`TransformLookup`] (the
//! world, a [`TransformArena`], or [`NoParents`]), so transforms never hold
//! references to each other and survive encode/decode unchanged.
use std::collections::BTreeMap;

use lockstep_math::{Fp3, Fpq};

use crate::checksum::{ChecksumCache, CombiningHash};
use crate::error::WorldError;
use crate::ident::InstanceId;

/// Resolves parent ids to transforms.
pub trait TransformLookup {
    /// Returns the transform registered under `id`, if any.
    fn transform(&self, id: InstanceId) -> Option<&Transform>;
}

/// Lookup with no registered transforms; every transform resolves as a root.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoParents;

impl TransformLookup for NoParents {
    fn transform(&self, _id: InstanceId) -> Option<&Transform> {
        None
    }
}

/// World-space placement resolved from a transform chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pose {
    /// World position.
    pub position: Fp3,
    /// World rotation.
    pub rotation: Fpq,
    /// World scale.
    pub scale: Fp3,
}

impl Pose {
    /// Origin, no rotation, unit scale.
    pub const IDENTITY: Self = Self {
        position: Fp3::ZERO,
        rotation: Fpq::IDENTITY,
        scale: Fp3::ONE,
    };

    /// Pose at `position` with identity rotation and unit scale.
    pub const fn at(position: Fp3) -> Self {
        Self {
            position,
            rotation: Fpq::IDENTITY,
            scale: Fp3::ONE,
        }
    }

    /// Maps a local point into world space: scale, then rotate, then translate.
    pub fn apply(&self, local: Fp3) -> Fp3 {
        self.position + self.rotation.rotate(local.mul_elem(self.scale))
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

/// Local position, rotation, and scale with an optional parent.
///
/// Mutators clear the cached checksum; [`Transform::checksum`] recomputes it
/// on the next read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transform {
    id: InstanceId,
    position: Fp3,
    rotation: Fpq,
    scale: Fp3,
    parent: Option<InstanceId>,
    checksum: ChecksumCache,
}

impl Transform {
    /// Root transform at the origin with identity rotation and unit scale.
    pub fn new(id: InstanceId) -> Self {
        Self::from_parts(id, Fp3::ZERO, Fpq::IDENTITY, Fp3::ONE, None)
    }

    pub(crate) fn from_parts(
        id: InstanceId,
        position: Fp3,
        rotation: Fpq,
        scale: Fp3,
        parent: Option<InstanceId>,
    ) -> Self {
        Self {
            id,
            position,
            rotation,
            scale,
            parent,
            checksum: ChecksumCache::default(),
        }
    }

    /// Builder: sets the local position.
    pub fn with_position(mut self, position: Fp3) -> Self {
        self.set_position(position);
        self
    }

    /// Builder: sets the local rotation.
    pub fn with_rotation(mut self, rotation: Fpq) -> Self {
        self.set_rotation(rotation);
        self
    }

    /// Builder: sets the local scale.
    pub fn with_scale(mut self, scale: Fp3) -> Self {
        self.set_scale(scale);
        self
    }

    /// Instance id.
    pub fn id(&self) -> InstanceId {
        self.id
    }

    /// Local position.
    pub fn position(&self) -> Fp3 {
        self.position
    }

    /// Local rotation.
    pub fn rotation(&self) -> Fpq {
        self.rotation
    }

    /// Local scale.
    pub fn scale(&self) -> Fp3 {
        self.scale
    }

    /// Parent id, if linked.
    pub fn parent(&self) -> Option<InstanceId> {
        self.parent
    }

    /// Sets the local position.
    pub fn set_position(&mut self, position: Fp3) {
        self.position = position;
        self.checksum.invalidate();
    }

    /// Sets the local rotation.
    pub fn set_rotation(&mut self, rotation: Fpq) {
        self.rotation = rotation;
        self.checksum.invalidate();
    }

    /// Sets the local scale.
    pub fn set_scale(&mut self, scale: Fp3) {
        self.scale = scale;
        self.checksum.invalidate();
    }

    /// Adds `delta` to the local position.
    pub fn translate(&mut self, delta: Fp3) {
        self.set_position(self.position + delta);
    }

    /// Applies an Euler rotation in degrees on top of the current rotation
    /// (`rotation = euler * rotation`).
    pub fn rotate(&mut self, euler_degrees: Fp3) {
        self.set_rotation(Fpq::from_euler_degrees(euler_degrees) * self.rotation);
    }

    // Unchecked; callers go through `check_link` or decode validation.
    pub(crate) fn set_parent_unchecked(&mut self, parent: Option<InstanceId>) {
        self.parent = parent;
        self.checksum.invalidate();
    }

    fn resolved_parent<'a, L: TransformLookup + ?Sized>(&self, lookup: &'a L) -> Option<&'a Transform> {
        self.parent.and_then(|id| lookup.transform(id))
    }

    /// World position: `parent_position + parent_rotation * local_position`.
    pub fn world_position<L: TransformLookup + ?Sized>(&self, lookup: &L) -> Fp3 {
        match self.resolved_parent(lookup) {
            Some(parent) => {
                parent.world_position(lookup) + parent.world_rotation(lookup).rotate(self.position)
            }
            None => self.position,
        }
    }

    /// World rotation: `parent_rotation * local_rotation`.
    pub fn world_rotation<L: TransformLookup + ?Sized>(&self, lookup: &L) -> Fpq {
        match self.resolved_parent(lookup) {
            Some(parent) => parent.world_rotation(lookup) * self.rotation,
            None => self.rotation,
        }
    }

    /// World scale: component-wise `local_scale * parent_scale`; `(1, 1, 1)`
    /// above the root.
    pub fn world_scale<L: TransformLookup + ?Sized>(&self, lookup: &L) -> Fp3 {
        match self.resolved_parent(lookup) {
            Some(parent) => self.scale.mul_elem(parent.world_scale(lookup)),
            None => self.scale,
        }
    }

    /// All three world values in one walk of the parent chain.
    pub fn world_pose<L: TransformLookup + ?Sized>(&self, lookup: &L) -> Pose {
        match self.resolved_parent(lookup) {
            Some(parent) => {
                let p = parent.world_pose(lookup);
                Pose {
                    position: p.position + p.rotation.rotate(self.position),
                    rotation: p.rotation * self.rotation,
                    scale: self.scale.mul_elem(p.scale),
                }
            }
            None => Pose {
                position: self.position,
                rotation: self.rotation,
                scale: self.scale,
            },
        }
    }

    /// Combining hash over id, local values, and parent id; cached.
    pub fn checksum(&self) -> u32 {
        self.checksum.get_or_compute(|| {
            CombiningHash::new()
                .word(self.id.get())
                .signed_all(&self.position.to_raw())
                .signed_all(&self.rotation.to_raw())
                .signed_all(&self.scale.to_raw())
                .word(self.parent.map_or(0, InstanceId::get))
                .finish()
        })
    }
}

/// Whether making `parent` the parent of `child` would close a loop.
///
/// Walks upward from `parent`; the existing chain is assumed acyclic.
pub(crate) fn would_cycle<L: TransformLookup + ?Sized>(
    lookup: &L,
    child: InstanceId,
    parent: InstanceId,
) -> bool {
    let mut cursor = Some(parent);
    while let Some(id) = cursor {
        if id == child {
            return true;
        }
        cursor = lookup.transform(id).and_then(Transform::parent);
    }
    false
}

/// Validates a parent link before it is stored.
pub(crate) fn check_link<L: TransformLookup + ?Sized>(
    lookup: &L,
    child: InstanceId,
    parent: Option<InstanceId>,
) -> Result<(), WorldError> {
    let Some(parent) = parent else {
        return Ok(());
    };
    if lookup.transform(parent).is_none() {
        return Err(WorldError::UnknownInstance(parent));
    }
    if would_cycle(lookup, child, parent) {
        return Err(WorldError::ParentCycle { child, parent });
    }
    Ok(())
}

/// Standalone transform hierarchy keyed by id.
///
/// Useful for hosts that manage transforms outside a [`crate::PhysWorld`],
/// and for testing hierarchy composition in isolation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransformArena {
    transforms: BTreeMap<InstanceId, Transform>,
}

impl TransformLookup for TransformArena {
    fn transform(&self, id: InstanceId) -> Option<&Transform> {
        self.transforms.get(&id)
    }
}

impl TransformArena {
    /// Empty arena.
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a root transform. Any parent already set on `transform` is
    /// cleared; link with [`TransformArena::set_parent`].
    pub fn insert(&mut self, mut transform: Transform) -> Result<(), WorldError> {
        let id = transform.id();
        if self.transforms.contains_key(&id) {
            return Err(WorldError::DuplicateInstance(id));
        }
        transform.set_parent_unchecked(None);
        self.transforms.insert(id, transform);
        Ok(())
    }

    /// Removes a transform; its children become roots.
    pub fn remove(&mut self, id: InstanceId) -> Option<Transform> {
        let removed = self.transforms.remove(&id)?;
        for t in self.transforms.values_mut() {
            if t.parent() == Some(id) {
                t.set_parent_unchecked(None);
            }
        }
        Some(removed)
    }

    /// Mutable access for local edits. Parent links are changed only through
    /// [`TransformArena::set_parent`].
    pub fn get_mut(&mut self, id: InstanceId) -> Option<&mut Transform> {
        self.transforms.get_mut(&id)
    }

    /// Links `child` under `parent` (or detaches it with `None`), rejecting
    /// unknown ids and cycles.
    pub fn set_parent(
        &mut self,
        child: InstanceId,
        parent: Option<InstanceId>,
    ) -> Result<(), WorldError> {
        if !self.transforms.contains_key(&child) {
            return Err(WorldError::UnknownInstance(child));
        }
        check_link(&*self, child, parent)?;
        if let Some(t) = self.transforms.get_mut(&child) {
            t.set_parent_unchecked(parent);
        }
        Ok(())
    }

    /// World pose of `id`.
    pub fn world_pose(&self, id: InstanceId) -> Option<Pose> {
        self.transform(id).map(|t| t.world_pose(self))
    }

    /// Number of transforms.
    pub fn len(&self) -> usize {
        self.transforms.len()
    }

    /// Whether the arena is empty.
    pub fn is_empty(&self) -> bool {
        self.transforms.is_empty()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use lockstep_math::Fp;

    #[test]
    fn mutation_changes_checksum() {
        let mut t = Transform::new(InstanceId(1));
        let before = t.checksum();
        t.translate(Fp3::from_ints(0, 1, 0));
        assert_ne!(t.checksum(), before);
        t.translate(Fp3::from_ints(0, -1, 0));
        assert_eq!(t.checksum(), before);
    }

    #[test]
    fn equality_ignores_cache_state() {
        let a = Transform::new(InstanceId(4)).with_scale(Fp3::from_ints(2, 2, 2));
        let b = a.clone();
        let _ = a.checksum();
        assert_eq!(a, b);
    }

    #[test]
    fn arena_rejects_self_parent() {
        let mut arena = TransformArena::new();
        arena.insert(Transform::new(InstanceId(1))).unwrap();
        assert_eq!(
            arena.set_parent(InstanceId(1), Some(InstanceId(1))),
            Err(WorldError::ParentCycle {
                child: InstanceId(1),
                parent: InstanceId(1)
            })
        );
    }

    #[test]
    fn root_world_values_are_local() {
        let t = Transform::new(InstanceId(9))
            .with_position(Fp3::from_ints(1, 2, 3))
            .with_scale(Fp3::new(Fp::TWO, Fp::ONE, Fp::HALF));
        let pose = t.world_pose(&NoParents);
        assert_eq!(pose.position, t.position());
        assert_eq!(pose.scale, t.scale());
        assert_eq!(t.world_scale(&NoParents), t.scale());
    }
}
