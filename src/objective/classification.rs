//! Classification objective functions.

use super::{
    sigmoid, target_column, weight_iter, ElementLoss, HessianKind, Link, Objective, TargetDomain,
};
use crate::eval::{run_separable, Backend, Batch};
use crate::num::LaneFloat;

// =============================================================================
// Logistic Loss
// =============================================================================

/// Logistic loss (binary cross-entropy) for binary classification.
///
/// Targets are in {0, 1}; scores are log-odds. With `p = sigmoid(score)`:
///
/// - Loss: `-y*log(p) - (1-y)*log(1-p)`
/// - Gradient: `p - target`
/// - Hessian: `p * (1 - p)`
#[derive(Debug, Clone, Copy, Default)]
pub struct LogisticLoss;

impl ElementLoss for LogisticLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        let p = score.sigmoid();
        (p - target, p * (F::splat(1.0) - p))
    }
}

impl Objective for LogisticLoss {
    fn name(&self) -> &'static str {
        "log_loss"
    }

    fn target_domain(&self) -> TargetDomain {
        TargetDomain::Binary
    }

    fn link(&self) -> Link {
        Link::Sigmoid
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        // Log-odds of the weighted positive rate.
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            let (pos_weight, total_weight) = column
                .iter()
                .zip(weight_iter(weights, n_rows))
                .fold((0.0f64, 0.0f64), |(pos, total), (&t, w)| {
                    (pos + t as f64 * w as f64, total + w as f64)
                });
            let p = (pos_weight / total_weight).clamp(1e-7, 1.0 - 1e-7);
            outputs[out_idx] = (p / (1.0 - p)).ln() as f32;
        }
    }
}

// =============================================================================
// Hinge Loss
// =============================================================================

/// Hinge loss for SVM-style binary classification.
///
/// Targets are in {0, 1} and converted to {-1, +1} internally. With
/// `margin = y * score`:
///
/// - Loss: `max(0, 1 - margin)`
/// - Gradient: `-y` where `margin < 1`, else `0`
/// - Hessian: surrogate `1.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct HingeLoss;

impl ElementLoss for HingeLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        let y = F::select(target.gt(F::splat(0.5)), F::splat(1.0), F::splat(-1.0));
        let margin = y * score;
        let grad = F::select(margin.lt(F::splat(1.0)), -y, F::splat(0.0));
        (grad, F::splat(1.0))
    }
}

impl Objective for HingeLoss {
    fn name(&self) -> &'static str {
        "hinge"
    }

    fn hessian_kind(&self) -> HessianKind {
        HessianKind::Surrogate(1.0)
    }

    fn target_domain(&self) -> TargetDomain {
        TargetDomain::Binary
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, _n_rows: usize, _targets: &[f32], _weights: &[f32], outputs: &mut [f32]) {
        outputs.fill(0.0);
    }
}

// =============================================================================
// Softmax Loss
// =============================================================================

/// Softmax cross-entropy for multiclass classification.
///
/// The general cross-dimension-coupled path: every class's gradient depends
/// on the shared softmax normalization over all K logits of the sample, so
/// this cannot use the separable per-element driver.
///
/// Targets are class indices in `[0, K)` stored as `f32`, one per row.
/// Scores, gradients, and hessians are column-major `[K * n_rows]`.
///
/// - Gradient for class c: `p_c - 1[target == c]`
/// - Hessian for class c: `p_c * (1 - p_c)` (diagonal approximation)
#[derive(Debug, Clone, Copy)]
pub struct SoftmaxLoss {
    /// Number of classes, at least 2.
    pub num_classes: usize,
}

impl SoftmaxLoss {
    /// Create a softmax loss over `num_classes` classes.
    pub fn new(num_classes: usize) -> Self {
        debug_assert!(num_classes >= 2, "num_classes must be >= 2");
        Self { num_classes }
    }
}

impl Objective for SoftmaxLoss {
    fn name(&self) -> &'static str {
        "softmax"
    }

    fn n_outputs(&self) -> usize {
        self.num_classes
    }

    fn target_domain(&self) -> TargetDomain {
        TargetDomain::ClassIndex(self.num_classes)
    }

    fn link(&self) -> Link {
        Link::Softmax
    }

    fn compute(&self, batch: &Batch<'_>, _backend: Backend, grads: &mut [f32], mut hess: Option<&mut [f32]>) {
        let n_rows = batch.n_rows();
        let k = self.num_classes;
        let scores = batch.raw_scores();
        let targets = batch.targets();

        for (row, w) in weight_iter(batch.weights(), n_rows).enumerate() {
            let label = targets[row] as usize;
            debug_assert!(label < k, "label {} >= num_classes {}", label, k);

            // Numerically stable softmax: shift by the row max.
            let mut max_logit = f32::NEG_INFINITY;
            for c in 0..k {
                max_logit = max_logit.max(scores[c * n_rows + row]);
            }
            let mut exp_sum = 0.0f32;
            for c in 0..k {
                exp_sum += (scores[c * n_rows + row] - max_logit).exp();
            }

            for c in 0..k {
                let p = (scores[c * n_rows + row] - max_logit).exp() / exp_sum;
                let indicator = if c == label { 1.0 } else { 0.0 };
                grads[c * n_rows + row] = w * (p - indicator);
                if let Some(h) = hess.as_deref_mut() {
                    h[c * n_rows + row] = w * p * (1.0 - p);
                }
            }
        }
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        let k = outputs.len();
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }

        // Log class priors.
        let mut class_weights = vec![0.0f64; k];
        let mut total_weight = 0.0f64;
        for (row, w) in weight_iter(weights, n_rows).enumerate() {
            let label = targets[row] as usize;
            if label < k {
                class_weights[label] += w as f64;
            }
            total_weight += w as f64;
        }

        for c in 0..k {
            let p = (class_weights[c] / total_weight).clamp(1e-7, 1.0 - 1e-7);
            outputs[c] = p.ln() as f32;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
