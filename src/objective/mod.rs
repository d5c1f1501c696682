//! Objective (loss) functions for gradient boosting.
//!
//! An objective turns raw model scores and targets into per-sample gradients
//! and hessians for the boosting update, and owns the link function that
//! maps raw scores into prediction space at inference time.
//!
//! # Layout
//!
//! All multi-output data is **column-major**:
//! `[output0_row0, output0_row1, ..., output0_rowN, output1_row0, ...]`,
//! index formula `values[output * n_rows + row]`.
//!
//! # Two kinds of objectives
//!
//! Losses whose gradient/hessian for a sample depend only on that sample's
//! own score and target implement [`ElementLoss`], a lane-generic kernel
//! that the shared evaluation driver vectorizes. Losses with coupling across
//! output dimensions ([`SoftmaxLoss`]) or across samples ([`LambdaRankLoss`])
//! implement their own batch walk inside [`Objective::compute`].
//!
//! # Weighted training
//!
//! Sample weights are passed as a slice of length `n_rows`; an empty slice
//! means unweighted. Weights scale both gradient and hessian.
//!
//! # Available objectives
//!
//! Regression: [`SquaredLoss`], [`AbsoluteLoss`], [`PinballLoss`],
//! [`PseudoHuberLoss`], [`PoissonLoss`], [`GammaLoss`], [`TweedieLoss`].
//! Classification: [`LogisticLoss`], [`HingeLoss`], [`SoftmaxLoss`].
//! Multitask: [`MultitaskSquaredLoss`]. Ranking: [`LambdaRankLoss`].

mod classification;
mod multitask;
mod ranking;
mod regression;

pub use classification::{HingeLoss, LogisticLoss, SoftmaxLoss};
pub use multitask::MultitaskSquaredLoss;
pub use ranking::LambdaRankLoss;
pub use regression::{
    AbsoluteLoss, GammaLoss, PinballLoss, PoissonLoss, PseudoHuberLoss, SquaredLoss, TweedieLoss,
};

use crate::eval::{Backend, Batch};
use crate::num::LaneFloat;

// =============================================================================
// Descriptor types
// =============================================================================

/// Legal domain for target values, validated before any gradient is computed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TargetDomain {
    /// Any real value (non-finite targets included; they propagate).
    Real,
    /// `target >= 0` (count-like losses).
    NonNegative,
    /// `target > 0`.
    Positive,
    /// `target` is exactly 0.0 or 1.0.
    Binary,
    /// `target` is an integral class index in `[0, num_classes)`.
    ClassIndex(usize),
}

impl TargetDomain {
    /// Whether `value` is a legal target under this domain.
    pub fn contains(&self, value: f32) -> bool {
        match *self {
            TargetDomain::Real => true,
            TargetDomain::NonNegative => value >= 0.0,
            TargetDomain::Positive => value > 0.0,
            TargetDomain::Binary => value == 0.0 || value == 1.0,
            TargetDomain::ClassIndex(k) => {
                value >= 0.0 && value.fract() == 0.0 && (value as usize) < k
            }
        }
    }
}

impl std::fmt::Display for TargetDomain {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match *self {
            TargetDomain::Real => write!(f, "real"),
            TargetDomain::NonNegative => write!(f, "non-negative"),
            TargetDomain::Positive => write!(f, "positive"),
            TargetDomain::Binary => write!(f, "binary {{0, 1}}"),
            TargetDomain::ClassIndex(k) => write!(f, "class index [0, {})", k),
        }
    }
}

/// Link function mapping raw scores into prediction space.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Link {
    /// Prediction is the raw score.
    Identity,
    /// `1 / (1 + exp(-score))`, logits to probabilities.
    Sigmoid,
    /// `exp(score)`, log-rate to rate.
    Exp,
    /// Per-sample softmax across output columns.
    Softmax,
}

impl Link {
    /// Apply the link in place over a column-major score buffer.
    pub fn transform(self, values: &mut [f32], n_rows: usize, n_outputs: usize) {
        match self {
            Link::Identity => {}
            Link::Sigmoid => {
                for v in values.iter_mut() {
                    *v = sigmoid(*v);
                }
            }
            Link::Exp => {
                for v in values.iter_mut() {
                    *v = v.exp();
                }
            }
            Link::Softmax => softmax_columns(values, n_rows, n_outputs),
        }
    }

    /// Apply the link to a single raw score.
    ///
    /// # Panics
    /// Panics for [`Link::Softmax`], which needs the whole output row; use
    /// [`Link::transform`] instead.
    pub fn apply(self, score: f32) -> f32 {
        match self {
            Link::Identity => score,
            Link::Sigmoid => sigmoid(score),
            Link::Exp => score.exp(),
            Link::Softmax => panic!("softmax link needs the full output row; use transform"),
        }
    }
}

/// What the hessian side of an objective's output means.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HessianKind {
    /// True second derivative of the loss.
    Exact,
    /// The loss has no useful second derivative; this fixed value stands in
    /// (weight-scaled) so the boosting update still has a curvature term.
    Surrogate(f32),
    /// No hessian is produced; the output buffer has no hessian side.
    Absent,
}

// =============================================================================
// Objective trait
// =============================================================================

/// A configured objective: static descriptor plus batch gradient computation.
///
/// Implementations are immutable after construction and safe to share across
/// threads evaluating disjoint batches. The trait is object-safe so that
/// losses defined outside this crate can be registered and driven through
/// the same evaluation loop.
pub trait Objective: Send + Sync + std::fmt::Debug {
    /// Registry name of the loss (for error context and logging).
    fn name(&self) -> &'static str;

    /// Predictions per sample: 1 for single-target regression and binary
    /// classification, K for multiclass/multitask.
    fn n_outputs(&self) -> usize {
        1
    }

    /// What the hessian output means for this loss.
    fn hessian_kind(&self) -> HessianKind {
        HessianKind::Exact
    }

    /// Whether a hessian array is produced at all.
    fn has_hessian(&self) -> bool {
        !matches!(self.hessian_kind(), HessianKind::Absent)
    }

    /// Legal domain for target values.
    fn target_domain(&self) -> TargetDomain {
        TargetDomain::Real
    }

    /// Link function from raw score to prediction space.
    fn link(&self) -> Link {
        Link::Identity
    }

    /// Fill `grads` (and `hess`, when present) for the whole batch.
    ///
    /// The batch has already passed shape and target-domain validation.
    /// All variant-specific dispatch happens here, once per batch; the
    /// per-sample loops below this call contain no per-sample branching.
    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>);

    /// Optimal constant raw score per output, used to seed boosting.
    ///
    /// `outputs.len()` determines the output count; targets are column-major.
    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]);

    /// Convert raw scores to prediction space in place (column-major).
    fn transform_predictions(&self, values: &mut [f32], n_rows: usize) {
        self.link().transform(values, n_rows, self.n_outputs());
    }
}

/// Per-element gradient/hessian kernel for separable losses.
///
/// The kernel sees one lane batch of scores and targets and returns the
/// unweighted gradient and hessian; the shared driver applies weights and
/// handles chunking, tails, and multi-output column slicing. Kernels must
/// be straight-line lane code: compare + select, never `if` per lane.
pub trait ElementLoss: Send + Sync {
    /// Unweighted (gradient, hessian) for one lane batch.
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F);
}

// =============================================================================
// Link helpers
// =============================================================================

/// Logistic function `1 / (1 + exp(-x))`.
#[inline]
pub fn sigmoid(x: f32) -> f32 {
    1.0 / (1.0 + (-x).exp())
}

/// Per-sample softmax across output columns, column-major, in place.
///
/// Subtracts the per-sample max before exponentiating so large logits do not
/// overflow.
pub fn softmax_columns(values: &mut [f32], n_rows: usize, n_outputs: usize) {
    debug_assert!(values.len() >= n_rows * n_outputs);

    for row in 0..n_rows {
        let mut max_logit = f32::NEG_INFINITY;
        for c in 0..n_outputs {
            max_logit = max_logit.max(values[c * n_rows + row]);
        }

        let mut sum = 0.0f32;
        for c in 0..n_outputs {
            let e = (values[c * n_rows + row] - max_logit).exp();
            values[c * n_rows + row] = e;
            sum += e;
        }

        if sum > 0.0 {
            for c in 0..n_outputs {
                values[c * n_rows + row] /= sum;
            }
        }
    }
}

// =============================================================================
// Shared base-score helpers
// =============================================================================

/// Iterate per-row weights; an empty slice yields 1.0 for every row.
#[inline]
pub(crate) fn weight_iter<'a>(weights: &'a [f32], n_rows: usize) -> impl Iterator<Item = f32> + 'a {
    debug_assert!(weights.is_empty() || weights.len() >= n_rows);
    (0..n_rows).map(move |i| if weights.is_empty() { 1.0 } else { weights[i] })
}

/// Weighted mean of one target column, accumulated in f64.
pub(crate) fn weighted_mean(targets: &[f32], weights: &[f32], n_rows: usize) -> f64 {
    let (sum_w, sum_wy) = targets
        .iter()
        .zip(weight_iter(weights, n_rows))
        .fold((0.0f64, 0.0f64), |(sw, swy), (&y, w)| {
            (sw + w as f64, swy + w as f64 * y as f64)
        });

    if sum_w > 0.0 {
        sum_wy / sum_w
    } else {
        0.0
    }
}

/// One output's target column: shared (`targets.len() == n_rows`) or the
/// `out_idx`-th column of a column-major `[n_outputs * n_rows]` buffer.
#[inline]
pub(crate) fn target_column(targets: &[f32], n_rows: usize, out_idx: usize) -> &[f32] {
    if targets.len() == n_rows {
        targets
    } else {
        &targets[out_idx * n_rows..(out_idx + 1) * n_rows]
    }
}

/// Weighted quantile of one target column using a step function: the value
/// at which the cumulative weight first reaches `alpha * total_weight`,
/// no interpolation.
pub(crate) fn weighted_quantile(targets: &[f32], weights: &[f32], n_rows: usize, alpha: f32) -> f32 {
    if n_rows == 0 {
        return 0.0;
    }

    let mut sorted: Vec<(f32, f32)> = targets
        .iter()
        .zip(weight_iter(weights, n_rows))
        .map(|(&t, w)| (t, w))
        .collect();
    sorted.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

    let total_weight: f32 = sorted.iter().map(|(_, w)| w).sum();
    let threshold = alpha * total_weight;

    let mut cumulative = 0.0f32;
    for (value, w) in &sorted {
        cumulative += w;
        if cumulative >= threshold {
            return *value;
        }
    }

    sorted[sorted.len() - 1].0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn domain_membership() {
        assert!(TargetDomain::Real.contains(f32::NAN));
        assert!(TargetDomain::NonNegative.contains(0.0));
        assert!(!TargetDomain::NonNegative.contains(-0.5));
        assert!(!TargetDomain::NonNegative.contains(f32::NAN));
        assert!(!TargetDomain::Positive.contains(0.0));
        assert!(TargetDomain::Binary.contains(1.0));
        assert!(!TargetDomain::Binary.contains(0.5));
        assert!(TargetDomain::ClassIndex(3).contains(2.0));
        assert!(!TargetDomain::ClassIndex(3).contains(3.0));
        assert!(!TargetDomain::ClassIndex(3).contains(1.5));
    }

    #[test]
    fn sigmoid_function() {
        assert_relative_eq!(sigmoid(0.0), 0.5);
        assert_relative_eq!(sigmoid(2.0), 0.8807971, max_relative = 1e-5);
        assert_relative_eq!(sigmoid(-2.0), 0.1192029, max_relative = 1e-5);
    }

    #[test]
    fn softmax_columns_normalizes_each_row() {
        // 2 rows, 3 classes, column-major
        let mut values = vec![1.0, 0.0, 2.0, 0.0, 3.0, 0.0];
        softmax_columns(&mut values, 2, 3);

        for row in 0..2 {
            let sum: f32 = (0..3).map(|c| values[c * 2 + row]).sum();
            assert_relative_eq!(sum, 1.0, max_relative = 1e-6);
        }
        // Row 0 logits were [1, 2, 3]: probabilities must be increasing.
        assert!(values[4] > values[2] && values[2] > values[0]);
        // Row 1 logits were all zero: uniform.
        assert_relative_eq!(values[1], values[3], max_relative = 1e-6);
    }

    #[test]
    fn softmax_columns_survives_large_logits() {
        let mut values = vec![1000.0, 1001.0, 1002.0];
        softmax_columns(&mut values, 1, 3);
        let sum: f32 = values.iter().sum();
        assert_relative_eq!(sum, 1.0, max_relative = 1e-6);
    }

    #[test]
    fn link_apply_matches_transform() {
        let mut buf = [0.7f32];
        Link::Sigmoid.transform(&mut buf, 1, 1);
        assert_relative_eq!(Link::Sigmoid.apply(0.7), buf[0]);
    }

    #[test]
    fn weighted_mean_uniform_and_weighted() {
        assert_relative_eq!(weighted_mean(&[1.0, 2.0, 3.0, 4.0], &[], 4), 2.5);
        assert_relative_eq!(weighted_mean(&[1.0, 3.0], &[3.0, 1.0], 2), 1.5);
    }

    #[test]
    fn weighted_quantile_median() {
        let q = weighted_quantile(&[4.0, 1.0, 3.0, 2.0], &[], 4, 0.5);
        assert!(q == 2.0 || q == 3.0);
    }
}
