//! Regression objective functions.
//!
//! All of these are separable: the gradient and hessian for a sample depend
//! only on that sample's own score and target, so each implements
//! [`ElementLoss`] and runs through the shared vectorized driver.

use super::{
    target_column, weighted_mean, weighted_quantile, ElementLoss, HessianKind, Link, Objective,
    TargetDomain,
};
use crate::eval::{run_separable, Backend, Batch};
use crate::num::LaneFloat;

// =============================================================================
// Squared Loss
// =============================================================================

/// Squared error loss (L2) for regression.
///
/// - Loss: `0.5 * (score - target)²`
/// - Gradient: `score - target`
/// - Hessian: `1.0`
#[derive(Debug, Clone, Copy, Default)]
pub struct SquaredLoss;

impl ElementLoss for SquaredLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        (score - target, F::splat(1.0))
    }
}

impl Objective for SquaredLoss {
    fn name(&self) -> &'static str {
        "squared_error"
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            outputs[out_idx] = weighted_mean(column, weights, n_rows) as f32;
        }
    }
}

// =============================================================================
// Absolute Loss (MAE)
// =============================================================================

/// Absolute error loss (L1) for robust regression.
///
/// - Loss: `|score - target|`
/// - Gradient: `sign(score - target)`
/// - Hessian: surrogate `1.0` (the true second derivative is zero a.e.)
///
/// Base score is the weighted median, the L1 optimum.
#[derive(Debug, Clone, Copy, Default)]
pub struct AbsoluteLoss;

impl ElementLoss for AbsoluteLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        let diff = score - target;
        let grad = F::select(diff.lt(F::splat(0.0)), F::splat(-1.0), F::splat(1.0));
        (grad, F::splat(1.0))
    }
}

impl Objective for AbsoluteLoss {
    fn name(&self) -> &'static str {
        "absolute_error"
    }

    fn hessian_kind(&self) -> HessianKind {
        HessianKind::Surrogate(1.0)
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            outputs[out_idx] = weighted_quantile(column, weights, n_rows, 0.5);
        }
    }
}

// =============================================================================
// Pinball Loss (quantile regression)
// =============================================================================

/// Pinball loss for quantile regression at level `alpha`.
///
/// - Gradient: `alpha - 1` if `score < target`, else `alpha`
/// - Hessian: surrogate `1.0`
///
/// `alpha = 0.5` is median regression; 0.1/0.9 give lower/upper bounds.
#[derive(Debug, Clone, Copy)]
pub struct PinballLoss {
    /// Quantile level in (0, 1).
    pub alpha: f32,
}

impl PinballLoss {
    /// Create a pinball loss for one quantile level.
    pub fn new(alpha: f32) -> Self {
        debug_assert!(
            alpha > 0.0 && alpha < 1.0,
            "alpha must be in (0, 1), got {}",
            alpha
        );
        Self { alpha }
    }
}

impl ElementLoss for PinballLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        let diff = score - target;
        let grad = F::select(
            diff.lt(F::splat(0.0)),
            F::splat(self.alpha - 1.0),
            F::splat(self.alpha),
        );
        (grad, F::splat(1.0))
    }
}

impl Objective for PinballLoss {
    fn name(&self) -> &'static str {
        "quantile"
    }

    fn hessian_kind(&self) -> HessianKind {
        HessianKind::Surrogate(1.0)
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            outputs[out_idx] = weighted_quantile(column, weights, n_rows, self.alpha);
        }
    }
}

// =============================================================================
// Pseudo-Huber Loss
// =============================================================================

/// Pseudo-Huber loss for robust regression.
///
/// Smooth approximation to Huber loss, quadratic near zero and linear for
/// large residuals. With `r = score - target` and transition `delta`:
///
/// - Loss: `delta² * (sqrt(1 + (r/delta)²) - 1)`
/// - Gradient: `r / sqrt(1 + (r/delta)²)`
/// - Hessian: `1 / (1 + (r/delta)²)^(3/2)`
#[derive(Debug, Clone, Copy)]
pub struct PseudoHuberLoss {
    /// Transition parameter; larger behaves like squared loss.
    pub delta: f32,
}

impl PseudoHuberLoss {
    /// Create a Pseudo-Huber loss with the given transition parameter.
    pub fn new(delta: f32) -> Self {
        debug_assert!(delta > 0.0, "delta must be positive, got {}", delta);
        Self { delta }
    }
}

impl ElementLoss for PseudoHuberLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        let residual = score - target;
        let inv_delta_sq = F::splat(1.0 / (self.delta * self.delta));
        // factor = 1 + (r/delta)²
        let factor = residual.mul_add(residual * inv_delta_sq, F::splat(1.0));
        let sqrt_factor = factor.sqrt();
        (residual / sqrt_factor, (factor * sqrt_factor).recip())
    }
}

impl Objective for PseudoHuberLoss {
    fn name(&self) -> &'static str {
        "pseudo_huber"
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        // Median, the robust choice.
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            outputs[out_idx] = weighted_quantile(column, weights, n_rows, 0.5);
        }
    }
}

// =============================================================================
// Poisson Loss
// =============================================================================

/// Poisson deviance for count data.
///
/// Scores are log-rates; the prediction is `mu = exp(score)`.
///
/// - Gradient: `mu - target`
/// - Hessian: `mu`
///
/// Targets must be non-negative. An extreme score produces an infinite `mu`
/// and the non-finite gradient propagates to the caller unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct PoissonLoss;

impl ElementLoss for PoissonLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        let mu = score.exp();
        (mu - target, mu)
    }
}

impl Objective for PoissonLoss {
    fn name(&self) -> &'static str {
        "poisson_deviance"
    }

    fn target_domain(&self) -> TargetDomain {
        TargetDomain::NonNegative
    }

    fn link(&self) -> Link {
        Link::Exp
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        // log of the weighted mean rate; all-zero targets floor the mean so
        // the log stays finite at init time.
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            let mean = weighted_mean(column, weights, n_rows).max(1e-7);
            outputs[out_idx] = mean.ln() as f32;
        }
    }
}

// =============================================================================
// Gamma Loss
// =============================================================================

/// Gamma deviance for strictly positive, right-skewed targets.
///
/// Scores are log-means; the prediction is `mu = exp(score)`.
///
/// - Gradient: `1 - target / mu`
/// - Hessian: `target / mu`
#[derive(Debug, Clone, Copy, Default)]
pub struct GammaLoss;

impl ElementLoss for GammaLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        // target / mu = target * exp(-score)
        let target_over_mu = target * (-score).exp();
        (F::splat(1.0) - target_over_mu, target_over_mu)
    }
}

impl Objective for GammaLoss {
    fn name(&self) -> &'static str {
        "gamma_deviance"
    }

    fn target_domain(&self) -> TargetDomain {
        TargetDomain::Positive
    }

    fn link(&self) -> Link {
        Link::Exp
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            outputs[out_idx] = weighted_mean(column, weights, n_rows).ln() as f32;
        }
    }
}

// =============================================================================
// Tweedie Loss
// =============================================================================

/// Tweedie deviance with variance power `p` in the open interval (1, 2).
///
/// Scores are log-means. Writing `mu = exp(score)`:
///
/// - Gradient: `mu^(2-p) - target * mu^(1-p)`
/// - Hessian: `(2-p) * mu^(2-p) - (1-p) * target * mu^(1-p)`
///
/// Both are computed as `exp((2-p) * score)` / `exp((1-p) * score)` directly
/// from the score, which keeps them continuous at the interval boundaries:
/// as `p -> 1` the gradient tends to the Poisson form `mu - target`, and as
/// `p -> 2` to the Gamma form `1 - target / mu`.
#[derive(Debug, Clone, Copy)]
pub struct TweedieLoss {
    /// Variance power, in (1, 2).
    pub power: f32,
}

impl TweedieLoss {
    /// Create a Tweedie loss with the given variance power.
    pub fn new(power: f32) -> Self {
        debug_assert!(
            power > 1.0 && power < 2.0,
            "power must be in (1, 2), got {}",
            power
        );
        Self { power }
    }
}

impl ElementLoss for TweedieLoss {
    #[inline]
    fn grad_hess<F: LaneFloat>(&self, score: F, target: F) -> (F, F) {
        let a = 1.0 - self.power; // in (-1, 0)
        let b = 2.0 - self.power; // in (0, 1)
        let exp_a = (score * F::splat(a)).exp(); // mu^(1-p)
        let exp_b = (score * F::splat(b)).exp(); // mu^(2-p)
        let target_term = target * exp_a;
        let grad = exp_b - target_term;
        let hess = F::splat(b) * exp_b - F::splat(a) * target_term;
        (grad, hess)
    }
}

impl Objective for TweedieLoss {
    fn name(&self) -> &'static str {
        "tweedie_deviance"
    }

    fn target_domain(&self) -> TargetDomain {
        TargetDomain::NonNegative
    }

    fn link(&self) -> Link {
        Link::Exp
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        run_separable(self, batch, backend, grads, hess);
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], weights: &[f32], outputs: &mut [f32]) {
        if n_rows == 0 {
            outputs.fill(0.0);
            return;
        }
        for out_idx in 0..outputs.len() {
            let column = target_column(targets, n_rows, out_idx);
            let mean = weighted_mean(column, weights, n_rows).max(1e-7);
            outputs[out_idx] = mean.ln() as f32;
        }
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn scalar_grad_hess<L: ElementLoss>(loss: &L, score: f32, target: f32) -> (f32, f32) {
        loss.grad_hess::<f32>(score, target)
    }

    #[test]
    fn squared_loss_gradients() {
        let (g, h) = scalar_grad_hess(&SquaredLoss, 5.0, 3.0);
        assert_relative_eq!(g, 2.0);
        assert_relative_eq!(h, 1.0);
    }

    #[test]
    fn squared_loss_zero_gradient_at_target() {
        let (g, _) = scalar_grad_hess(&SquaredLoss, 3.0, 3.0);
        assert_relative_eq!(g, 0.0);
    }

    #[test]
    fn absolute_loss_is_sign_of_residual() {
        let (g, h) = scalar_grad_hess(&AbsoluteLoss, 1.0, 0.5);
        assert_relative_eq!(g, 1.0);
        assert_relative_eq!(h, 1.0);
        let (g, _) = scalar_grad_hess(&AbsoluteLoss, 2.0, 2.5);
        assert_relative_eq!(g, -1.0);
    }

    #[test]
    fn pinball_loss_tilts_by_alpha() {
        let loss = PinballLoss::new(0.1);
        let (g, _) = scalar_grad_hess(&loss, 5.0, 10.0); // under-prediction
        assert_relative_eq!(g, -0.9);
        let (g, _) = scalar_grad_hess(&loss, 5.0, 0.0); // over-prediction
        assert_relative_eq!(g, 0.1);
    }

    #[test]
    fn pseudo_huber_limits() {
        let loss = PseudoHuberLoss::new(1.0);
        // Tiny residual: behaves like squared loss.
        let (g, h) = scalar_grad_hess(&loss, 0.01, 0.0);
        assert_relative_eq!(g, 0.01, max_relative = 1e-3);
        assert_relative_eq!(h, 1.0, max_relative = 1e-3);
        // Huge residual: gradient saturates near 1, hessian vanishes.
        let (g, h) = scalar_grad_hess(&loss, 100.0, 0.0);
        assert!(g > 0.99 && g < 1.01);
        assert!(h < 0.01);
    }

    #[test]
    fn poisson_gradient_and_hessian() {
        let (g, h) = scalar_grad_hess(&PoissonLoss, 0.0, 2.0);
        assert_relative_eq!(g, -1.0); // exp(0) - 2
        assert_relative_eq!(h, 1.0);

        let (g, h) = scalar_grad_hess(&PoissonLoss, 1.0, 3.0);
        let e = 1.0f32.exp();
        assert_relative_eq!(g, e - 3.0, max_relative = 1e-5);
        assert_relative_eq!(h, e, max_relative = 1e-5);
    }

    #[test]
    fn poisson_zero_gradient_when_rate_matches() {
        // score = ln(4) predicts rate 4.
        let (g, _) = scalar_grad_hess(&PoissonLoss, 4.0f32.ln(), 4.0);
        assert_relative_eq!(g, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn gamma_zero_gradient_when_mean_matches() {
        let (g, h) = scalar_grad_hess(&GammaLoss, 2.0f32.ln(), 2.0);
        assert_relative_eq!(g, 0.0, epsilon = 1e-6);
        assert_relative_eq!(h, 1.0, epsilon = 1e-6);
    }

    #[test]
    fn tweedie_zero_gradient_when_mean_matches() {
        let loss = TweedieLoss::new(1.5);
        let (g, _) = scalar_grad_hess(&loss, 3.0f32.ln(), 3.0);
        assert_relative_eq!(g, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn tweedie_approaches_poisson_near_power_one() {
        let tweedie = TweedieLoss::new(1.0001);
        let (gt, ht) = scalar_grad_hess(&tweedie, 0.7, 2.0);
        let (gp, hp) = scalar_grad_hess(&PoissonLoss, 0.7, 2.0);
        assert_relative_eq!(gt, gp, max_relative = 1e-2);
        assert_relative_eq!(ht, hp, max_relative = 1e-2);
    }

    #[test]
    fn tweedie_approaches_gamma_near_power_two() {
        let tweedie = TweedieLoss::new(1.9999);
        let (gt, ht) = scalar_grad_hess(&tweedie, 0.7, 2.0);
        let (gg, hg) = scalar_grad_hess(&GammaLoss, 0.7, 2.0);
        assert_relative_eq!(gt, gg, max_relative = 1e-2);
        assert_relative_eq!(ht, hg, max_relative = 1e-2);
    }

    #[test]
    fn non_finite_score_propagates() {
        let (g, h) = scalar_grad_hess(&PoissonLoss, f32::INFINITY, 1.0);
        assert!(g.is_infinite());
        assert!(h.is_infinite());
        let (g, _) = scalar_grad_hess(&SquaredLoss, f32::NAN, 1.0);
        assert!(g.is_nan());
    }

    #[test]
    fn base_scores_hit_known_optima() {
        let targets = [1.0f32, 2.0, 3.0, 4.0];
        let mut out = [0.0f32];

        SquaredLoss.base_score(4, &targets, &[], &mut out);
        assert_relative_eq!(out[0], 2.5);

        PoissonLoss.base_score(4, &targets, &[], &mut out);
        assert_relative_eq!(out[0], 2.5f32.ln(), max_relative = 1e-6);

        AbsoluteLoss.base_score(4, &targets, &[], &mut out);
        assert!(out[0] >= 2.0 && out[0] <= 3.0);
    }

    #[test]
    fn weighted_base_score_shifts_mean() {
        let targets = [1.0f32, 3.0];
        let weights = [3.0f32, 1.0];
        let mut out = [0.0f32];
        SquaredLoss.base_score(2, &targets, &weights, &mut out);
        assert_relative_eq!(out[0], 1.5);
    }
}
