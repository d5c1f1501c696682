//! Vector backends: `wide::f32x4` and `wide::f32x8`.
//!
//! `wide` compiles to real SIMD instructions where the target supports them
//! and to unrolled scalar code elsewhere, so these impls are portable by
//! construction. Comparisons return all-bits-set lane masks, which `blend`
//! consumes directly.

use super::LaneFloat;
use wide::{f32x4, f32x8, CmpGt, CmpLt};

impl LaneFloat for f32x4 {
    const LANES: usize = 4;

    #[inline]
    fn splat(value: f32) -> Self {
        f32x4::splat(value)
    }

    #[inline]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; 4];
        lanes.copy_from_slice(&src[..4]);
        f32x4::new(lanes)
    }

    #[inline]
    fn store(self, dst: &mut [f32]) {
        dst[..4].copy_from_slice(&self.to_array());
    }

    #[inline]
    fn mul_add(self, mul: Self, add: Self) -> Self {
        f32x4::mul_add(self, mul, add)
    }

    #[inline]
    fn exp(self) -> Self {
        f32x4::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f32x4::ln(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32x4::sqrt(self)
    }

    #[inline]
    fn abs(self) -> Self {
        f32x4::abs(self)
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        f32x4::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f32x4::max(self, other)
    }

    #[inline]
    fn lt(self, other: Self) -> Self {
        f32x4::cmp_lt(self, other)
    }

    #[inline]
    fn gt(self, other: Self) -> Self {
        f32x4::cmp_gt(self, other)
    }

    #[inline]
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
        mask.blend(if_true, if_false)
    }

    #[inline]
    fn reduce_sum(self) -> f32 {
        f32x4::reduce_add(self)
    }
}

impl LaneFloat for f32x8 {
    const LANES: usize = 8;

    #[inline]
    fn splat(value: f32) -> Self {
        f32x8::splat(value)
    }

    #[inline]
    fn load(src: &[f32]) -> Self {
        let mut lanes = [0.0f32; 8];
        lanes.copy_from_slice(&src[..8]);
        f32x8::new(lanes)
    }

    #[inline]
    fn store(self, dst: &mut [f32]) {
        dst[..8].copy_from_slice(&self.to_array());
    }

    #[inline]
    fn mul_add(self, mul: Self, add: Self) -> Self {
        f32x8::mul_add(self, mul, add)
    }

    #[inline]
    fn exp(self) -> Self {
        f32x8::exp(self)
    }

    #[inline]
    fn ln(self) -> Self {
        f32x8::ln(self)
    }

    #[inline]
    fn sqrt(self) -> Self {
        f32x8::sqrt(self)
    }

    #[inline]
    fn abs(self) -> Self {
        f32x8::abs(self)
    }

    #[inline]
    fn min(self, other: Self) -> Self {
        f32x8::min(self, other)
    }

    #[inline]
    fn max(self, other: Self) -> Self {
        f32x8::max(self, other)
    }

    #[inline]
    fn lt(self, other: Self) -> Self {
        f32x8::cmp_lt(self, other)
    }

    #[inline]
    fn gt(self, other: Self) -> Self {
        f32x8::cmp_gt(self, other)
    }

    #[inline]
    fn select(mask: Self, if_true: Self, if_false: Self) -> Self {
        mask.blend(if_true, if_false)
    }

    #[inline]
    fn reduce_sum(self) -> f32 {
        f32x8::reduce_add(self)
    }
}
