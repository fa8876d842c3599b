// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Canonical binary encoding.
//!
//! Layout rules (all integers little-endian):
//! - `Fp`: raw `i64`; never a decimal or float rendering.
//! - vectors and quaternions: components in `x, y, z[, w]` order.
//! - `bool`: one byte, `0` or `1`; anything else is rejected.
//! - ids: `u64`; `0` is rejected.
//! - `Option<T>`: a `u8` presence flag followed by `T` when present.
//! - collections: `u32` length, then the elements in order.
//!
//! Records:
//! - `Transform`: id, position, rotation, scale, `Option<parent id>`.
//! - `Collider` / `Option<Collider>`: shape tag `u8` (`0` none, `1` sphere,
//!   `2` capsule, `3` aabb, `4` plane), layer `u8`, payload length `u32`,
//!   payload. An unknown tag is skipped using the length and replaced by
//!   [`Collider::default`].
//! - `PhysObject`: id, transform, velocity, gravity, force, inverse mass,
//!   dynamic flag, kinematic flag, restitution, static friction, dynamic
//!   friction, `Option<Collider>`. Callbacks are not state.
//! - `CollisionMatrix`: `u32` dimension, then `dimension²` bools row-major.
//! - `Solver`: tag `u8` (`0` impulse, `1` smooth position + percent + slop).
//! - `PhysWorld`: magic `LKST`, `u16` version, config, id counter, matrix,
//!   solvers, objects, collisions. Decoding validates the hierarchy: parent
//!   ids must resolve, chains must be acyclic, ids must be unique.
use bytes::{Buf, BufMut, Bytes, BytesMut};
use lockstep_math::{Fp, Fp3, Fpq};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::warn;

use crate::collider::{Aabb, Capsule, Collider, Plane, Shape, Sphere};
use crate::error::CodecError;
use crate::ident::InstanceId;
use crate::layer::{CollisionMatrix, Layer};
use crate::object::PhysObject;
use crate::points::{Collision, CollisionPoints};
use crate::solver::Solver;
use crate::transform::Transform;
use crate::world::{PhysWorld, WorldConfig};

/// Magic prefix of a world stream.
pub const WORLD_MAGIC: [u8; 4] = *b"LKST";

/// Current world format version.
pub const WORLD_VERSION: u16 = 1;

const TAG_NONE: u8 = 0;
const TAG_SPHERE: u8 = 1;
const TAG_CAPSULE: u8 = 2;
const TAG_AABB: u8 = 3;
const TAG_PLANE: u8 = 4;

const SOLVER_IMPULSE: u8 = 0;
const SOLVER_SMOOTH_POSITION: u8 = 1;

/// Writes a value in canonical form.
pub trait Encode {
    /// Appends the encoding of `self` to `buf`.
    fn encode(&self, buf: &mut BytesMut);
}

/// Reads a value written by [`Encode`].
pub trait Decode: Sized {
    /// Consumes one value from the front of `buf`.
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError>;
}

/// Encodes a value into a fresh buffer.
pub fn to_bytes<T: Encode + ?Sized>(value: &T) -> Bytes {
    let mut buf = BytesMut::new();
    value.encode(&mut buf);
    buf.freeze()
}

/// Decodes exactly one value; leftover bytes are an error.
pub fn from_bytes<T: Decode>(bytes: &[u8]) -> Result<T, CodecError> {
    let mut buf = bytes;
    let value = T::decode(&mut buf)?;
    if buf.has_remaining() {
        return Err(CodecError::TrailingBytes(buf.remaining()));
    }
    Ok(value)
}

fn need(buf: &[u8], needed: usize) -> Result<(), CodecError> {
    if buf.remaining() < needed {
        return Err(CodecError::UnexpectedEof {
            needed,
            remaining: buf.remaining(),
        });
    }
    Ok(())
}

fn get_u8(buf: &mut &[u8]) -> Result<u8, CodecError> {
    need(buf, 1)?;
    Ok(buf.get_u8())
}

fn get_u16(buf: &mut &[u8]) -> Result<u16, CodecError> {
    need(buf, 2)?;
    Ok(buf.get_u16_le())
}

fn get_u32(buf: &mut &[u8]) -> Result<u32, CodecError> {
    need(buf, 4)?;
    Ok(buf.get_u32_le())
}

fn get_u64(buf: &mut &[u8]) -> Result<u64, CodecError> {
    need(buf, 8)?;
    Ok(buf.get_u64_le())
}

fn get_len(buf: &mut &[u8]) -> Result<usize, CodecError> {
    get_u32(buf).map(|n| n as usize)
}

fn put_len(buf: &mut BytesMut, len: usize) {
    buf.put_u32_le(u32::try_from(len).unwrap_or(u32::MAX));
}

fn get_bool(buf: &mut &[u8]) -> Result<bool, CodecError> {
    match get_u8(buf)? {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(CodecError::InvalidBool(other)),
    }
}

fn get_layer(buf: &mut &[u8]) -> Result<Layer, CodecError> {
    let raw = get_u8(buf)?;
    Layer::from_u8(raw).ok_or(CodecError::InvalidLayer(raw))
}

impl Encode for bool {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u8(u8::from(*self));
    }
}

impl Decode for bool {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        get_bool(buf)
    }
}

impl Encode for Fp {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_i64_le(self.raw());
    }
}

impl Decode for Fp {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        need(buf, 8)?;
        Ok(Self::from_raw(buf.get_i64_le()))
    }
}

impl Encode for Fp3 {
    fn encode(&self, buf: &mut BytesMut) {
        for c in self.to_array() {
            c.encode(buf);
        }
    }
}

impl Decode for Fp3 {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self::new(Fp::decode(buf)?, Fp::decode(buf)?, Fp::decode(buf)?))
    }
}

impl Encode for Fpq {
    fn encode(&self, buf: &mut BytesMut) {
        for c in [self.x, self.y, self.z, self.w] {
            c.encode(buf);
        }
    }
}

impl Decode for Fpq {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self::new(
            Fp::decode(buf)?,
            Fp::decode(buf)?,
            Fp::decode(buf)?,
            Fp::decode(buf)?,
        ))
    }
}

impl Encode for InstanceId {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_u64_le(self.get());
    }
}

impl Decode for InstanceId {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        match get_u64(buf)? {
            0 => Err(CodecError::ZeroId),
            raw => Ok(Self(raw)),
        }
    }
}

impl<T: Encode> Encode for Option<T> {
    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Some(v) => {
                buf.put_u8(1);
                v.encode(buf);
            }
            None => buf.put_u8(0),
        }
    }
}

impl<T: Decode> Decode for Option<T> {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        if get_bool(buf)? {
            T::decode(buf).map(Some)
        } else {
            Ok(None)
        }
    }
}

impl<T: Encode> Encode for [T] {
    fn encode(&self, buf: &mut BytesMut) {
        put_len(buf, self.len());
        for item in self {
            item.encode(buf);
        }
    }
}

impl<T: Decode> Decode for Vec<T> {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        let len = get_len(buf)?;
        // The length prefix is untrusted; grow only as elements decode.
        let mut out = Self::new();
        for _ in 0..len {
            out.push(T::decode(buf)?);
        }
        Ok(out)
    }
}

impl Encode for Transform {
    fn encode(&self, buf: &mut BytesMut) {
        self.id().encode(buf);
        self.position().encode(buf);
        self.rotation().encode(buf);
        self.scale().encode(buf);
        self.parent().encode(buf);
    }
}

impl Decode for Transform {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        let id = InstanceId::decode(buf)?;
        let position = Fp3::decode(buf)?;
        let rotation = Fpq::decode(buf)?;
        let scale = Fp3::decode(buf)?;
        let parent = Option::<InstanceId>::decode(buf)?;
        Ok(Self::from_parts(id, position, rotation, scale, parent))
    }
}

fn shape_tag(shape: &Shape) -> u8 {
    match shape {
        Shape::Sphere(_) => TAG_SPHERE,
        Shape::Capsule(_) => TAG_CAPSULE,
        Shape::Aabb(_) => TAG_AABB,
        Shape::Plane(_) => TAG_PLANE,
    }
}

fn encode_shape_payload(shape: &Shape, buf: &mut BytesMut) {
    match shape {
        Shape::Sphere(s) => {
            s.center.encode(buf);
            s.radius.encode(buf);
        }
        Shape::Capsule(c) => {
            c.center.encode(buf);
            c.radius.encode(buf);
            c.height.encode(buf);
            c.axis.encode(buf);
        }
        Shape::Aabb(b) => {
            b.min.encode(buf);
            b.max.encode(buf);
        }
        Shape::Plane(p) => {
            p.normal.encode(buf);
            p.distance.encode(buf);
        }
    }
}

fn decode_shape_payload(tag: u8, buf: &mut &[u8]) -> Result<Option<Shape>, CodecError> {
    let shape = match tag {
        TAG_SPHERE => Shape::Sphere(Sphere {
            center: Fp3::decode(buf)?,
            radius: Fp::decode(buf)?,
        }),
        TAG_CAPSULE => Shape::Capsule(Capsule {
            center: Fp3::decode(buf)?,
            radius: Fp::decode(buf)?,
            height: Fp::decode(buf)?,
            axis: Fp3::decode(buf)?,
        }),
        TAG_AABB => Shape::Aabb(Aabb {
            min: Fp3::decode(buf)?,
            max: Fp3::decode(buf)?,
        }),
        TAG_PLANE => Shape::Plane(Plane {
            normal: Fp3::decode(buf)?,
            distance: Fp::decode(buf)?,
        }),
        _ => return Ok(None),
    };
    Ok(Some(shape))
}

fn encode_collider_record(collider: Option<&Collider>, buf: &mut BytesMut) {
    let Some(collider) = collider else {
        buf.put_u8(TAG_NONE);
        buf.put_u8(Layer::Default as u8);
        put_len(buf, 0);
        return;
    };
    let mut payload = BytesMut::new();
    encode_shape_payload(&collider.shape, &mut payload);
    buf.put_u8(shape_tag(&collider.shape));
    buf.put_u8(collider.layer as u8);
    put_len(buf, payload.len());
    buf.put_slice(&payload);
}

fn decode_collider_record(buf: &mut &[u8]) -> Result<Option<Collider>, CodecError> {
    let tag = get_u8(buf)?;
    let layer = get_layer(buf)?;
    let len = get_len(buf)?;
    need(buf, len)?;
    let (mut payload, rest) = buf.split_at(len);
    *buf = rest;

    if tag == TAG_NONE {
        return Ok(None);
    }
    match decode_shape_payload(tag, &mut payload)? {
        Some(shape) => {
            if payload.has_remaining() {
                return Err(CodecError::TrailingBytes(payload.remaining()));
            }
            Ok(Some(Collider { shape, layer }))
        }
        None => {
            warn!(tag, len, "unknown collider tag; substituting default sphere");
            Ok(Some(Collider::default().with_layer(layer)))
        }
    }
}

impl Encode for Collider {
    fn encode(&self, buf: &mut BytesMut) {
        encode_collider_record(Some(self), buf);
    }
}

impl Decode for Collider {
    /// A "no collider" record decodes as the default sphere.
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        decode_collider_record(buf).map(Option::unwrap_or_default)
    }
}

impl Encode for CollisionPoints {
    fn encode(&self, buf: &mut BytesMut) {
        self.a.encode(buf);
        self.b.encode(buf);
        self.normal.encode(buf);
        self.depth_squared.encode(buf);
        self.has_collision.encode(buf);
    }
}

impl Decode for CollisionPoints {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            a: Fp3::decode(buf)?,
            b: Fp3::decode(buf)?,
            normal: Fp3::decode(buf)?,
            depth_squared: Fp::decode(buf)?,
            has_collision: get_bool(buf)?,
        })
    }
}

impl Encode for Collision {
    fn encode(&self, buf: &mut BytesMut) {
        self.a.encode(buf);
        self.b.encode(buf);
        self.points.encode(buf);
    }
}

impl Decode for Collision {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            a: InstanceId::decode(buf)?,
            b: InstanceId::decode(buf)?,
            points: CollisionPoints::decode(buf)?,
        })
    }
}

impl Encode for CollisionMatrix {
    fn encode(&self, buf: &mut BytesMut) {
        put_len(buf, Layer::COUNT);
        for row in self.table() {
            for cell in row {
                cell.encode(buf);
            }
        }
    }
}

impl Decode for CollisionMatrix {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        let n = get_len(buf)?;
        if n != Layer::COUNT {
            return Err(CodecError::LayerCountMismatch {
                expected: Layer::COUNT,
                found: n,
            });
        }
        let mut table = [[false; Layer::COUNT]; Layer::COUNT];
        for row in &mut table {
            for cell in row.iter_mut() {
                *cell = get_bool(buf)?;
            }
        }
        Self::from_table(table).ok_or(CodecError::AsymmetricMatrix)
    }
}

impl Encode for Solver {
    fn encode(&self, buf: &mut BytesMut) {
        match self {
            Self::Impulse => buf.put_u8(SOLVER_IMPULSE),
            Self::SmoothPosition { percent, slop } => {
                buf.put_u8(SOLVER_SMOOTH_POSITION);
                percent.encode(buf);
                slop.encode(buf);
            }
        }
    }
}

impl Decode for Solver {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        match get_u8(buf)? {
            SOLVER_IMPULSE => Ok(Self::Impulse),
            SOLVER_SMOOTH_POSITION => Ok(Self::SmoothPosition {
                percent: Fp::decode(buf)?,
                slop: Fp::decode(buf)?,
            }),
            other => Err(CodecError::InvalidSolver(other)),
        }
    }
}

impl Encode for WorldConfig {
    fn encode(&self, buf: &mut BytesMut) {
        self.gravity.encode(buf);
        self.inv_mass.encode(buf);
        self.restitution.encode(buf);
        self.static_friction.encode(buf);
        self.dynamic_friction.encode(buf);
        self.correction_percent.encode(buf);
        self.correction_slop.encode(buf);
    }
}

impl Decode for WorldConfig {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        Ok(Self {
            gravity: Fp3::decode(buf)?,
            inv_mass: Fp::decode(buf)?,
            restitution: Fp::decode(buf)?,
            static_friction: Fp::decode(buf)?,
            dynamic_friction: Fp::decode(buf)?,
            correction_percent: Fp::decode(buf)?,
            correction_slop: Fp::decode(buf)?,
        })
    }
}

impl Encode for PhysObject {
    fn encode(&self, buf: &mut BytesMut) {
        self.id().encode(buf);
        self.transform.encode(buf);
        self.velocity.encode(buf);
        self.gravity.encode(buf);
        self.force.encode(buf);
        self.inv_mass.encode(buf);
        self.is_dynamic.encode(buf);
        self.is_kinematic.encode(buf);
        self.restitution.encode(buf);
        self.static_friction.encode(buf);
        self.dynamic_friction.encode(buf);
        encode_collider_record(self.collider.as_ref(), buf);
    }
}

impl Decode for PhysObject {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        let id = InstanceId::decode(buf)?;
        let transform = Transform::decode(buf)?;
        if transform.id() != id {
            return Err(CodecError::TransformIdMismatch {
                object: id,
                transform: transform.id(),
            });
        }
        let mut object = Self::from_parts(id, transform);
        object.velocity = Fp3::decode(buf)?;
        object.gravity = Fp3::decode(buf)?;
        object.force = Fp3::decode(buf)?;
        object.inv_mass = Fp::decode(buf)?;
        object.is_dynamic = get_bool(buf)?;
        object.is_kinematic = get_bool(buf)?;
        object.restitution = Fp::decode(buf)?;
        object.static_friction = Fp::decode(buf)?;
        object.dynamic_friction = Fp::decode(buf)?;
        object.collider = decode_collider_record(buf)?;
        Ok(object)
    }
}

impl Encode for PhysWorld {
    fn encode(&self, buf: &mut BytesMut) {
        buf.put_slice(&WORLD_MAGIC);
        buf.put_u16_le(WORLD_VERSION);
        self.config().encode(buf);
        buf.put_u64_le(self.next_id_raw());
        self.matrix().encode(buf);
        self.solvers().encode(buf);
        self.objects().encode(buf);
        self.collisions().encode(buf);
    }
}

impl Decode for PhysWorld {
    fn decode(buf: &mut &[u8]) -> Result<Self, CodecError> {
        need(buf, WORLD_MAGIC.len())?;
        let mut magic = [0_u8; 4];
        buf.copy_to_slice(&mut magic);
        if magic != WORLD_MAGIC {
            return Err(CodecError::BadMagic(magic));
        }
        let version = get_u16(buf)?;
        if version != WORLD_VERSION {
            return Err(CodecError::UnsupportedVersion(version));
        }
        let config = WorldConfig::decode(buf)?;
        let next_id = get_u64(buf)?;
        let matrix = CollisionMatrix::decode(buf)?;
        let solvers = Vec::<Solver>::decode(buf)?;
        let objects = Vec::<PhysObject>::decode(buf)?;
        let collisions = Vec::<Collision>::decode(buf)?;

        validate_objects(next_id, &objects, &collisions)?;
        Ok(Self::from_parts(
            config, next_id, matrix, solvers, objects, collisions,
        ))
    }
}

/// Checks everything a world stream can get wrong beyond field syntax.
fn validate_objects(
    next_id: u64,
    objects: &[PhysObject],
    collisions: &[Collision],
) -> Result<(), CodecError> {
    let mut parents: FxHashMap<InstanceId, Option<InstanceId>> = FxHashMap::default();
    for o in objects {
        if parents.insert(o.id(), o.transform.parent()).is_some() {
            return Err(CodecError::DuplicateObject(o.id()));
        }
    }

    let max = objects.iter().map(|o| o.id().get()).max().unwrap_or(0);
    if next_id <= max {
        return Err(CodecError::StaleIdCounter { next: next_id, max });
    }

    for o in objects {
        let mut seen: FxHashSet<InstanceId> = FxHashSet::default();
        let mut cursor = o.id();
        while let Some(parent) = parents.get(&cursor).copied().flatten() {
            if !parents.contains_key(&parent) {
                return Err(CodecError::DanglingParent {
                    child: cursor,
                    parent,
                });
            }
            if !seen.insert(cursor) {
                return Err(CodecError::ParentCycle(o.id()));
            }
            cursor = parent;
        }
    }

    for c in collisions {
        for id in [c.a, c.b] {
            if !parents.contains_key(&id) {
                return Err(CodecError::DanglingCollision(id));
            }
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn truncated_input_reports_eof() {
        let bytes = to_bytes(&Fp3::from_ints(1, 2, 3));
        let err = from_bytes::<Fp3>(&bytes[..20]).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedEof {
                needed: 8,
                remaining: 4
            }
        );
    }

    #[test]
    fn huge_length_prefix_over_short_input_is_eof() {
        let mut bytes = u32::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&[0; 3]);
        let err = from_bytes::<Vec<PhysObject>>(&bytes).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedEof {
                needed: 8,
                remaining: 3
            }
        );

        let mut bytes = u32::MAX.to_le_bytes().to_vec();
        bytes.extend_from_slice(&to_bytes(&Fp::ONE));
        bytes.extend_from_slice(&to_bytes(&Fp::TWO));
        let err = from_bytes::<Vec<Fp>>(&bytes).unwrap_err();
        assert_eq!(
            err,
            CodecError::UnexpectedEof {
                needed: 8,
                remaining: 0
            }
        );
    }

    #[test]
    fn trailing_bytes_are_rejected() {
        let mut bytes = to_bytes(&Fp::ONE).to_vec();
        bytes.push(0);
        assert_eq!(from_bytes::<Fp>(&bytes), Err(CodecError::TrailingBytes(1)));
    }

    #[test]
    fn unknown_collider_tag_falls_back_to_sphere() {
        let mut buf = BytesMut::new();
        buf.put_u8(9);
        buf.put_u8(Layer::Enemy as u8);
        put_len(&mut buf, 3);
        buf.put_slice(&[1, 2, 3]);
        buf.put_u8(0xAA);
        let mut slice: &[u8] = &buf;
        let collider = decode_collider_record(&mut slice).unwrap();
        assert_eq!(collider, Some(Collider::default().with_layer(Layer::Enemy)));
        assert_eq!(slice, &[0xAA]);
    }

    #[test]
    fn bool_bytes_are_strict() {
        assert_eq!(from_bytes::<bool>(&[2]), Err(CodecError::InvalidBool(2)));
    }

    fn object_with_parent(id: u64, parent: Option<u64>) -> PhysObject {
        let id = InstanceId(id);
        let mut transform = Transform::new(id);
        transform.set_parent_unchecked(parent.map(InstanceId));
        PhysObject::from_parts(id, transform)
    }

    #[test]
    fn hierarchy_validation() {
        let ok = [object_with_parent(1, None), object_with_parent(2, Some(1))];
        assert_eq!(validate_objects(3, &ok, &[]), Ok(()));

        let dangling = [object_with_parent(1, Some(7))];
        assert_eq!(
            validate_objects(8, &dangling, &[]),
            Err(CodecError::DanglingParent {
                child: InstanceId(1),
                parent: InstanceId(7)
            })
        );

        let cycle = [object_with_parent(1, Some(2)), object_with_parent(2, Some(1))];
        assert_eq!(
            validate_objects(3, &cycle, &[]),
            Err(CodecError::ParentCycle(InstanceId(1)))
        );

        let dup = [object_with_parent(1, None), object_with_parent(1, None)];
        assert_eq!(
            validate_objects(2, &dup, &[]),
            Err(CodecError::DuplicateObject(InstanceId(1)))
        );
    }

    #[test]
    fn collisions_must_name_live_objects() {
        let objects = [object_with_parent(1, None)];
        let stray = Collision {
            a: InstanceId(1),
            b: InstanceId(5),
            points: CollisionPoints::NONE,
        };
        assert_eq!(
            validate_objects(2, &objects, &[stray]),
            Err(CodecError::DanglingCollision(InstanceId(5)))
        );
    }

    #[test]
    fn zero_ids_are_rejected() {
        assert_eq!(
            from_bytes::<InstanceId>(&0_u64.to_le_bytes()),
            Err(CodecError::ZeroId)
        );
    }
}
