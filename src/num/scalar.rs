//! Scalar backend: one lane, plain `f32` arithmetic.
//!
//! The mask produced by the comparison operations is a bit-pattern boolean
//! (all bits set / all bits clear), mirroring how the vector backends encode
//! masks, so `select` has one meaning everywhere.

use super::LaneFloat;

const MASK_TRUE: u32 = u32::MAX;

impl LaneFloat for f32 {
    const LANES: usize = 1;

    #[inline]
    fn splat(value: f32) -> Self {
        value
    }

    #[inline]
    fn load(src: &[f32]) -> Self {
        src[0]
    }

    #[inline]
    fn store(self, dst: &mut [f32]) {
        dst[0] = self;
    }

    #[inline]
    fn mul_add(self, mul: Self, add: Self) -> Self {
        f32::mul_add(self, mul, add)
    }

    #[inline]
    fn exp(self) -> Self {
        f32::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f32::ln(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32::sqrt(self)
    }

    #[inline]
    fn abs(self) -> Self {
        f32::abs(self)
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        f32::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f32::max(self, other)
    }

    #[inline]
    fn lt(self, other: Self) -> Self {
        f32::from_bits(if self < other { MASK_TRUE } else { 0 })
    }

    #[inline]
    fn gt(self, other: Self) -> Self {
        f32::from_bits(if self > other { MASK_TRUE } else { 0 })
    }

    #[inline]
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
        if mask.to_bits() != 0 {
            if_true
        } else {
            if_false
        }
    }

    #[inline]
    fn reduce_sum(self) -> f32 {
        self
    }
}
