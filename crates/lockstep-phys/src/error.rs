// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Error types for world mutation and binary decoding.
use thiserror::Error;

use crate::ident::InstanceId;

/// Errors raised by hierarchy and object-list mutations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum WorldError {
    /// No object or transform with this id exists.
    #[error("unknown instance {0}")]
    UnknownInstance(InstanceId),
    /// An object or transform with this id is already registered.
    #[error("duplicate instance {0}")]
    DuplicateInstance(InstanceId),
    /// Linking `child` under `parent` would close a loop in the hierarchy.
    #[error("parenting {child} under {parent} would create a cycle")]
    ParentCycle {
        /// Transform being re-parented.
        child: InstanceId,
        /// Requested parent.
        parent: InstanceId,
    },
    /// No id is left after this one.
    #[error("instance id space exhausted at {0}")]
    IdSpaceExhausted(InstanceId),
}

/// Errors raised while decoding the binary state format.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CodecError {
    /// The stream ended before a field was complete.
    #[error("unexpected end of input: needed {needed} bytes, {remaining} remaining")]
    UnexpectedEof {
        /// Bytes required by the field being read.
        needed: usize,
        /// Bytes left in the stream.
        remaining: usize,
    },
    /// Bytes were left over after a complete value.
    #[error("{0} trailing bytes after value")]
    TrailingBytes(usize),
    /// The world stream does not start with the expected magic.
    #[error("bad magic {0:02x?}")]
    BadMagic([u8; 4]),
    /// The world stream uses a format version this build cannot read.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u16),
    /// A boolean byte was neither `0` nor `1`.
    #[error("invalid bool byte {0}")]
    InvalidBool(u8),
    /// A layer discriminant was out of range.
    #[error("invalid layer {0}")]
    InvalidLayer(u8),
    /// A solver discriminant was out of range.
    #[error("invalid solver tag {0}")]
    InvalidSolver(u8),
    /// An id field held `0`, which is never assigned.
    #[error("zero instance id")]
    ZeroId,
    /// The stored matrix dimension does not match the layer count.
    #[error("collision matrix has {found} layers, expected {expected}")]
    LayerCountMismatch {
        /// Layer count of this build.
        expected: usize,
        /// Layer count found in the stream.
        found: usize,
    },
    /// The stored matrix is not symmetric.
    #[error("collision matrix is not symmetric")]
    AsymmetricMatrix,
    /// A transform names a parent that is not part of the world.
    #[error("transform {child} references missing parent {parent}")]
    DanglingParent {
        /// Transform holding the reference.
        child: InstanceId,
        /// Missing parent id.
        parent: InstanceId,
    },
    /// The decoded hierarchy contains a loop through this transform.
    #[error("parent cycle through {0}")]
    ParentCycle(InstanceId),
    /// An object's transform carries a different id than the object.
    #[error("object {object} owns transform {transform}")]
    TransformIdMismatch {
        /// Object id.
        object: InstanceId,
        /// Transform id found in the stream.
        transform: InstanceId,
    },
    /// Two objects share an id.
    #[error("duplicate object id {0}")]
    DuplicateObject(InstanceId),
    /// The stored id counter would hand out an id that is already in use.
    #[error("id counter {next} is not past the largest object id {max}")]
    StaleIdCounter {
        /// Stored counter value.
        next: u64,
        /// Largest object id in the stream.
        max: u64,
    },
    /// A collision record names an object that is not part of the world.
    #[error("collision references missing object {0}")]
    DanglingCollision(InstanceId),
}

/// A layer name did not match any [`crate::Layer`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown layer name {0:?}")]
pub struct ParseLayerError(pub String);
