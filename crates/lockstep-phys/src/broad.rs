// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! Candidate pair enumeration.
use crate::ident::InstanceId;
use crate::layer::Layer;

/// One collider-bearing object as seen by the broad phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Proxy {
    /// Position of the object in the world's insertion-ordered list.
    pub index: usize,
    /// Object id.
    pub id: InstanceId,
    /// Collider layer.
    pub layer: Layer,
}

/// Broad-phase interface producing candidate pairs for the narrow phase.
///
/// Implementations must emit pairs deterministically and in the canonical
/// order: `(i, j)` with `j < i`, sorted by `i` and then by `j`, where `i` and
/// `j` are [`Proxy::index`] values. Collision-list order, and through it the
/// solver results, depend on this order. An implementation may skip pairs
/// it can prove are disjoint but must never reorder the rest.
pub trait BroadPhase {
    /// Appends candidate pairs for `proxies` (given in ascending index order)
    /// to `out`.
    fn collect_pairs(&mut self, proxies: &[Proxy], out: &mut Vec<(usize, usize)>);
}

/// Reference broad phase: every unordered pair exactly once, `O(n²/2)`.
#[derive(Debug, Clone, Copy, Default)]
pub struct BruteForcePairs;

impl BroadPhase for BruteForcePairs {
    fn collect_pairs(&mut self, proxies: &[Proxy], out: &mut Vec<(usize, usize)>) {
        for (pos, a) in proxies.iter().enumerate() {
            for b in &proxies[..pos] {
                out.push((a.index, b.index));
            }
        }
    }
}
