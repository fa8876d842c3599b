// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Instance identifiers.
use core::fmt;

/// Numeric identity shared by a [`crate::PhysObject`] and the
/// [`crate::Transform`] it owns.
///
/// Ids are handed out by [`crate::PhysWorld::next_id`] in strictly increasing
/// order starting at `1`; `0` is never a valid id, which lets encodings use it
/// as "none".
#[repr(transparent)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug)]
pub struct InstanceId(pub u64);

impl InstanceId {
    /// Returns the raw numeric value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
