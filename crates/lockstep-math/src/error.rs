// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
use thiserror::Error;

/// Errors raised by checked fixed-point operations.
///
/// Fixed point has no NaN, so operations outside their domain fail loudly
/// instead of producing a sentinel value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum MathError {
    /// `sqrt` was called on a negative operand.
    #[error("square root of negative value (raw {raw})")]
    NegativeSqrt {
        /// Raw Q32.32 bits of the rejected operand.
        raw: i64,
    },
}
