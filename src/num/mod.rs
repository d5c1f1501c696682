//! Numeric abstraction over scalar and SIMD lane batches.
//!
//! Loss kernels are written once against the [`LaneFloat`] trait and run
//! unmodified over a single `f32` or a full vector register. A `LaneFloat`
//! value represents `LANES` independent samples; every operation applies
//! per lane, and per-lane branching is expressed as compare + [`select`]
//! so all backends execute a straight line of instructions.
//!
//! # Backends
//!
//! - `f32`: one lane, plain scalar arithmetic
//! - [`wide::f32x4`] / [`wide::f32x8`]: 4- and 8-lane SIMD
//!
//! # Contract
//!
//! - No operation may branch per lane.
//! - Division or log of a non-positive value follows native floating-point
//!   semantics (infinity / NaN), never a silent clamp. Guarding illegal
//!   domains is the loss kernel's job, not this layer's.
//! - The same expression evaluated at different lane widths is
//!   mathematically equivalent within floating-point rounding.
//!
//! Masks are represented in the value type itself: all-bits-set lanes for
//! the vector backends, a bit-pattern boolean for the scalar one. A mask is
//! opaque - the only valid consumer is [`select`].
//!
//! [`select`]: LaneFloat::select

mod scalar;
mod vector;

use std::fmt::Debug;
use std::ops::{Add, Div, Mul, Neg, Sub};

/// Widest lane count any backend uses. Tail staging buffers are sized to it.
pub const MAX_LANES: usize = 16;

/// A floating-point value of `LANES` independent lanes.
///
/// Required operations are the minimal capability set loss kernels need:
/// arithmetic via `std::ops`, fused multiply-add, `exp`/`ln`/`sqrt`,
/// `min`/`max`, comparisons producing a lane mask, masked select, lane-sum
/// reduction, broadcast, and load/store against contiguous memory.
/// Combinators (`powf`, `recip`, `sigmoid`) are provided in terms of the
/// required set so every backend runs the same formula source.
pub trait LaneFloat:
    Copy
    + Debug
    + Send
    + Sync
    + Add<Output = Self>
    + Sub<Output = Self>
    + Mul<Output = Self>
    + Div<Output = Self>
    + Neg<Output = Self>
    + 'static
{
    /// Number of values a single operation processes.
    const LANES: usize;

    /// Broadcast one value into all lanes.
    fn splat(value: f32) -> Self;

    /// Load `LANES` values from the front of `src`.
    ///
    /// # Panics
    /// Panics if `src.len() < LANES`.
    fn load(src: &[f32]) -> Self;

    /// Store all lanes to the front of `dst`.
    ///
    /// # Panics
    /// Panics if `dst.len() < LANES`.
    fn store(self, dst: &mut [f32]);

    /// Fused multiply-add: `self * mul + add`, one rounding.
    fn mul_add(self, mul: Self, add: Self) -> Self;

    /// Per-lane natural exponential.
    fn exp(self) -> Self;

    /// Per-lane natural logarithm. `ln(x <= 0)` follows IEEE semantics.
    fn ln(self) -> Self;

    /// Per-lane square root.
    fn sqrt(self) -> Self;

    /// Per-lane absolute value.
    fn abs(self) -> Self;

    /// Per-lane minimum.
    fn min(self, other: Self) -> Self;

    /// Per-lane maximum.
    fn max(self, other: Self) -> Self;

    /// Lane mask, set where `self < other`.
    fn lt(self, other: Self) -> Self;

    /// Lane mask, set where `self > other`.
    fn gt(self, other: Self) -> Self;

    /// Per-lane `if mask { if_true } else { if_false }`.
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self;

    /// Sum of all lanes.
    fn reduce_sum(self) -> f32;

    /// Per-lane `self ^ exponent`, expressed as `exp(ln(self) * exponent)`
    /// so scalar and vector backends agree. Requires `self > 0`.
    #[inline]
    fn powf(self, exponent: f32) -> Self {
        (self.ln() * Self::splat(exponent)).exp()
    }

    /// Per-lane reciprocal.
    #[inline]
    fn recip(self) -> Self {
        Self::splat(1.0) / self
    }

    /// Per-lane logistic function `1 / (1 + exp(-x))`.
    #[inline]
    fn sigmoid(self) -> Self {
        (Self::splat(1.0) + (-self).exp()).recip()
    }
}
