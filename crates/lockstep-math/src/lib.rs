// SPDX-License-Identifier: Apache-2.0
// © James Ross Ω FLYING•ROBOTS <https://github.com/flyingrobots>
//! lockstep-math: bit-exact fixed-point math for lockstep simulation.
//!
//! Every value in this crate is an integer in disguise. `Fp` stores a Q32.32
//! raw `i64`, and every operation (arithmetic, comparison, square root,
//! trigonometry) is computed in integer space so two machines fed the same
//! inputs produce the same raw bits. Floating point appears only at the
//! explicit host boundary (`Fp::from_f64` / `Fp::to_f64`).
#![forbid(unsafe_code)]
#![deny(missing_docs, rust_2018_idioms, unused_must_use)]
#![deny(
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::panic,
    clippy::todo,
    clippy::unimplemented,
    clippy::dbg_macro,
    clippy::print_stdout,
    clippy::print_stderr
)]
#![allow(
    clippy::must_use_candidate,
    clippy::return_self_not_must_use,
    clippy::unreadable_literal,
    clippy::missing_const_for_fn,
    clippy::suboptimal_flops,
    clippy::many_single_char_names,
    clippy::module_name_repetitions,
    clippy::cast_possible_truncation,
    clippy::cast_sign_loss,
    clippy::cast_possible_wrap
)]

mod error;
pub mod fixed_q32_32;
mod quat;
mod scalar;
pub mod trig;
mod vec2;
mod vec3;

/// Domain errors raised by checked numeric operations.
pub use error::MathError;
/// Unit quaternion in fixed point (`fpq`).
pub use quat::Fpq;
/// Q32.32 fixed-point scalar (`fp`).
pub use scalar::Fp;
/// Two-component fixed-point vector (`fp2`).
pub use vec2::Fp2;
/// Three-component fixed-point vector (`fp3`).
pub use vec3::Fp3;
