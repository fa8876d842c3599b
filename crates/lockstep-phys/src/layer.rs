// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Collision layers, query masks, and the symmetric layer-pair matrix.
use core::fmt;
use core::str::FromStr;

use bytes::BytesMut;

use crate::checksum::{fletcher32, ChecksumCache};
use crate::codec::Encode;
use crate::error::ParseLayerError;

/// Classification tag carried by every collider.
#[repr(u8)]
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
pub enum Layer {
    /// Untagged geometry.
    #[default]
    Default = 0,
    /// Static level geometry.
    Environment = 1,
    /// Player-controlled bodies.
    Player = 2,
    /// Hostile bodies.
    Enemy = 3,
    /// Fast-moving shots.
    Projectile = 4,
    /// Trigger volumes.
    Trigger = 5,
    /// Collectables.
    Pickup = 6,
    /// Geometry that should usually be left out of queries.
    Ignore = 7,
}

impl Layer {
    /// Number of layer kinds (the matrix dimension).
    pub const COUNT: usize = 8;

    /// Every layer, in discriminant order.
    pub const ALL: [Self; Self::COUNT] = [
        Self::Default,
        Self::Environment,
        Self::Player,
        Self::Enemy,
        Self::Projectile,
        Self::Trigger,
        Self::Pickup,
        Self::Ignore,
    ];

    /// Discriminant as a table index.
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Looks a layer up by discriminant.
    pub fn from_u8(value: u8) -> Option<Self> {
        Self::ALL.get(usize::from(value)).copied()
    }

    /// Lower-case stable name.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Default => "default",
            Self::Environment => "environment",
            Self::Player => "player",
            Self::Enemy => "enemy",
            Self::Projectile => "projectile",
            Self::Trigger => "trigger",
            Self::Pickup => "pickup",
            Self::Ignore => "ignore",
        }
    }
}

impl fmt::Display for Layer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Layer {
    type Err = ParseLayerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|layer| layer.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| ParseLayerError(s.to_owned()))
    }
}

/// Bit set of layers used to filter queries (raycasts, capsule casts).
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct LayerMask(pub u32);

impl LayerMask {
    /// Matches every layer.
    pub const ALL: Self = Self(u32::MAX);
    /// Matches nothing.
    pub const NONE: Self = Self(0);

    /// Mask matching exactly one layer.
    pub const fn of(layer: Layer) -> Self {
        Self(1 << layer as u32)
    }

    /// Adds a layer.
    pub const fn with(self, layer: Layer) -> Self {
        Self(self.0 | Self::of(layer).0)
    }

    /// Removes a layer.
    pub const fn without(self, layer: Layer) -> Self {
        Self(self.0 & !Self::of(layer).0)
    }

    /// Whether `layer` is in the mask.
    pub const fn contains(self, layer: Layer) -> bool {
        self.0 & Self::of(layer).0 != 0
    }
}

impl Default for LayerMask {
    fn default() -> Self {
        Self::ALL
    }
}

impl FromIterator<Layer> for LayerMask {
    fn from_iter<I: IntoIterator<Item = Layer>>(iter: I) -> Self {
        iter.into_iter().fold(Self::NONE, Self::with)
    }
}

/// Symmetric layer-pair permission table.
///
/// Every layer collides with every layer until told otherwise. The only
/// mutator, [`CollisionMatrix::set_layer_collisions`], writes both `(a, b)`
/// and `(b, a)`, so the table is symmetric at all times.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CollisionMatrix {
    table: [[bool; Layer::COUNT]; Layer::COUNT],
    checksum: ChecksumCache,
}

impl Default for CollisionMatrix {
    fn default() -> Self {
        Self::new()
    }
}

impl CollisionMatrix {
    /// All pairs enabled.
    pub fn new() -> Self {
        Self {
            table: [[true; Layer::COUNT]; Layer::COUNT],
            checksum: ChecksumCache::default(),
        }
    }

    /// Builds a matrix from a raw table; `None` unless the table is symmetric.
    pub(crate) fn from_table(table: [[bool; Layer::COUNT]; Layer::COUNT]) -> Option<Self> {
        let symmetric =
            (0..Layer::COUNT).all(|i| (0..i).all(|j| table[i][j] == table[j][i]));
        symmetric.then(|| Self {
            table,
            checksum: ChecksumCache::default(),
        })
    }

    /// Enables or disables collisions between `a` and `b` (both directions).
    pub fn set_layer_collisions(&mut self, a: Layer, b: Layer, enabled: bool) {
        self.table[a.index()][b.index()] = enabled;
        self.table[b.index()][a.index()] = enabled;
        self.checksum.invalidate();
    }

    /// Whether colliders on `a` and `b` are tested against each other.
    pub fn can_layers_collide(&self, a: Layer, b: Layer) -> bool {
        self.table[a.index()][b.index()]
    }

    /// Row-major view of the table.
    pub fn table(&self) -> &[[bool; Layer::COUNT]; Layer::COUNT] {
        &self.table
    }

    /// Fletcher-32 of the canonical encoding; cached until the next mutation.
    pub fn checksum(&self) -> u32 {
        self.checksum.get_or_compute(|| {
            let mut buf = BytesMut::new();
            self.encode(&mut buf);
            fletcher32(&buf)
        })
    }
}
