//! The batch evaluation loop: the per-boosting-round hot path.
//!
//! Given a validated [`Batch`] and a configured [`Objective`], fills
//! gradient (and, where defined, hessian) arrays of exactly
//! `n_rows * n_outputs` length.
//!
//! All variant-specific branching resolves once, when the objective and
//! [`Backend`] are selected - the inner loop is a monomorphized straight
//! line over lane-width chunks with no per-sample conditionals, which is
//! what lets the vector backends run at full width. The final partial chunk
//! is staged through fixed-size buffers so no out-of-bounds memory is read;
//! padded lanes are computed and then dropped on copy-back.
//!
//! The loop is pure with respect to its inputs: it reads the batch and the
//! immutable objective and writes only its own output buffer, so concurrent
//! calls over disjoint batches need no coordination.

use wide::{f32x4, f32x8};

use crate::error::LossError;
use crate::gradients::Gradients;
use crate::num::{LaneFloat, MAX_LANES};
use crate::objective::{target_column, ElementLoss, Objective, TargetDomain};

// =============================================================================
// Backend
// =============================================================================

/// Lane width the evaluation loop runs at.
///
/// Selected once per evaluation, never per sample.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    /// One value per operation.
    Scalar,
    /// `wide::f32x4`, 4 lanes.
    X4,
    /// `wide::f32x8`, 8 lanes.
    #[default]
    X8,
}

impl Backend {
    /// Number of lanes this backend processes per operation.
    pub fn lanes(self) -> usize {
        match self {
            Backend::Scalar => 1,
            Backend::X4 => 4,
            Backend::X8 => 8,
        }
    }

    /// The widest portable backend; what [`evaluate`] uses.
    pub fn preferred() -> Self {
        Backend::X8
    }
}

// =============================================================================
// Batch
// =============================================================================

/// One batch of raw scores, targets, and optional per-row weights.
///
/// All multi-output data is column-major: `values[output * n_rows + row]`.
/// Targets are either per-output (`n_rows * n_outputs` values) or a single
/// shared column (`n_rows` values - class indices for multiclass, or one
/// target shared across outputs). Weights are per row; an empty slice means
/// unweighted.
///
/// Shapes are validated at construction; target-domain validation happens
/// per objective in [`evaluate`].
#[derive(Debug, Clone, Copy)]
pub struct Batch<'a> {
    raw_scores: &'a [f32],
    targets: &'a [f32],
    weights: &'a [f32],
    n_rows: usize,
    n_outputs: usize,
}

impl<'a> Batch<'a> {
    /// Create a batch, validating array shapes.
    pub fn new(
        raw_scores: &'a [f32],
        targets: &'a [f32],
        weights: &'a [f32],
        n_rows: usize,
        n_outputs: usize,
    ) -> Result<Self, LossError> {
        let expected = n_rows * n_outputs;
        if raw_scores.len() != expected {
            return Err(LossError::ScoreLenMismatch {
                expected,
                got: raw_scores.len(),
            });
        }
        if targets.len() != expected && targets.len() != n_rows {
            return Err(LossError::TargetLenMismatch {
                expected,
                got: targets.len(),
            });
        }
        if !weights.is_empty() && weights.len() != n_rows {
            return Err(LossError::WeightLenMismatch {
                expected: n_rows,
                got: weights.len(),
            });
        }

        Ok(Self {
            raw_scores,
            targets,
            weights,
            n_rows,
            n_outputs,
        })
    }

    /// Convenience constructor for single-output batches.
    pub fn single_output(
        raw_scores: &'a [f32],
        targets: &'a [f32],
        weights: &'a [f32],
    ) -> Result<Self, LossError> {
        Self::new(raw_scores, targets, weights, raw_scores.len(), 1)
    }

    /// Number of samples.
    #[inline]
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    /// Outputs per sample.
    #[inline]
    pub fn n_outputs(&self) -> usize {
        self.n_outputs
    }

    /// Raw scores, column-major `[n_outputs * n_rows]`.
    #[inline]
    pub fn raw_scores(&self) -> &'a [f32] {
        self.raw_scores
    }

    /// Targets, column-major or a single shared column.
    #[inline]
    pub fn targets(&self) -> &'a [f32] {
        self.targets
    }

    /// Per-row weights; empty means unweighted.
    #[inline]
    pub fn weights(&self) -> &'a [f32] {
        self.weights
    }

    #[inline]
    fn weights_opt(&self) -> Option<&'a [f32]> {
        if self.weights.is_empty() {
            None
        } else {
            Some(self.weights)
        }
    }
}

// =============================================================================
// Validation
// =============================================================================

/// Check a batch against an objective's shape and target-domain contract.
///
/// Runs before any per-sample computation, so a bad batch never produces
/// partially computed output.
fn validate_batch(objective: &dyn Objective, batch: &Batch<'_>) -> Result<(), LossError> {
    let k = objective.n_outputs();
    if k > 1 && batch.n_outputs != k {
        return Err(LossError::OutputMismatch {
            loss: objective.name().to_string(),
            expected: k,
            got: batch.n_outputs,
        });
    }

    let domain = objective.target_domain();

    // Class-index targets are one shared column by definition.
    if matches!(domain, TargetDomain::ClassIndex(_)) && batch.targets.len() != batch.n_rows {
        return Err(LossError::TargetLenMismatch {
            expected: batch.n_rows,
            got: batch.targets.len(),
        });
    }

    if !matches!(domain, TargetDomain::Real) {
        for (i, &value) in batch.targets.iter().enumerate() {
            if !domain.contains(value) {
                return Err(LossError::TargetOutOfDomain {
                    loss: objective.name().to_string(),
                    row: i % batch.n_rows,
                    value,
                    domain,
                });
            }
        }
    }

    Ok(())
}

// =============================================================================
// Public entry points
// =============================================================================

/// Evaluate an objective over a batch at the preferred lane width.
///
/// Returns gradient (and, when the objective defines one, hessian) arrays of
/// exactly `n_rows * n_outputs` length. Fails before any per-sample work if
/// the batch violates the objective's target domain or shape contract.
pub fn evaluate(objective: &dyn Objective, batch: &Batch<'_>) -> Result<Gradients, LossError> {
    evaluate_with_backend(objective, batch, Backend::preferred())
}

/// [`evaluate`] with an explicit lane width, for tests and tuning.
pub fn evaluate_with_backend(
    objective: &dyn Objective,
    batch: &Batch<'_>,
    backend: Backend,
) -> Result<Gradients, LossError> {
    validate_batch(objective, batch)?;

    let mut output = Gradients::new(batch.n_rows, batch.n_outputs, objective.has_hessian());
    let (grads, hess) = output.split_mut();
    objective.compute(batch, backend, grads, hess);
    Ok(output)
}

/// Convert raw boosted scores into the objective's prediction space.
///
/// The inference-time counterpart of [`evaluate`]: identity for plain
/// regression, sigmoid for log-loss, exp for the deviance family, per-sample
/// softmax for multiclass.
pub fn predictions_from_scores(
    objective: &dyn Objective,
    raw_scores: &[f32],
    n_rows: usize,
) -> Vec<f32> {
    let mut predictions = raw_scores.to_vec();
    objective.transform_predictions(&mut predictions, n_rows);
    predictions
}

// =============================================================================
// Separable driver
// =============================================================================

/// Drive a separable per-element kernel over every output column of a batch.
///
/// This is the single place the backend dispatch happens; each arm
/// monomorphizes the chunked lane loop for one width.
pub(crate) fn run_separable<L: ElementLoss>(
    loss: &L,
    batch: &Batch<'_>,
    backend: Backend,
    grads: &mut [f32],
    mut hess: Option<&mut [f32]>,
) {
    let n_rows = batch.n_rows;
    debug_assert!(grads.len() >= n_rows * batch.n_outputs);

    for out_idx in 0..batch.n_outputs {
        let offset = out_idx * n_rows;
        let scores = &batch.raw_scores[offset..offset + n_rows];
        let targets = target_column(batch.targets, n_rows, out_idx);
        let col_grads = &mut grads[offset..offset + n_rows];
        let col_hess = hess.as_deref_mut().map(|h| &mut h[offset..offset + n_rows]);
        let weights = batch.weights_opt();

        match backend {
            Backend::Scalar => run_lanes::<f32, L>(loss, scores, targets, weights, col_grads, col_hess),
            Backend::X4 => run_lanes::<f32x4, L>(loss, scores, targets, weights, col_grads, col_hess),
            Backend::X8 => run_lanes::<f32x8, L>(loss, scores, targets, weights, col_grads, col_hess),
        }
    }
}

/// The inner loop: full chunks at `F::LANES`, then a staged tail.
fn run_lanes<F: LaneFloat, L: ElementLoss>(
    loss: &L,
    scores: &[f32],
    targets: &[f32],
    weights: Option<&[f32]>,
    grads: &mut [f32],
    mut hess: Option<&mut [f32]>,
) {
    let n = scores.len();
    debug_assert_eq!(targets.len(), n);
    debug_assert!(F::LANES <= MAX_LANES);

    let mut i = 0;
    while i + F::LANES <= n {
        let score = F::load(&scores[i..]);
        let target = F::load(&targets[i..]);
        let (grad, hess_val) = loss.grad_hess(score, target);

        let w = match weights {
            Some(ws) => F::load(&ws[i..]),
            None => F::splat(1.0),
        };

        (grad * w).store(&mut grads[i..]);
        if let Some(h) = hess.as_deref_mut() {
            (hess_val * w).store(&mut h[i..]);
        }
        i += F::LANES;
    }

    // Tail shorter than the lane width: stage through fixed buffers so no
    // out-of-bounds memory is touched. Padded lanes compute garbage that is
    // dropped on copy-back.
    let rem = n - i;
    if rem > 0 {
        let mut score_buf = [0.0f32; MAX_LANES];
        let mut target_buf = [0.0f32; MAX_LANES];
        let mut weight_buf = [1.0f32; MAX_LANES];
        score_buf[..rem].copy_from_slice(&scores[i..]);
        target_buf[..rem].copy_from_slice(&targets[i..]);
        if let Some(ws) = weights {
            weight_buf[..rem].copy_from_slice(&ws[i..]);
        }

        let (grad, hess_val) = loss.grad_hess(F::load(&score_buf), F::load(&target_buf));
        let w = F::load(&weight_buf);

        let mut out_buf = [0.0f32; MAX_LANES];
        (grad * w).store(&mut out_buf);
        grads[i..].copy_from_slice(&out_buf[..rem]);
        if let Some(h) = hess.as_deref_mut() {
            (hess_val * w).store(&mut out_buf);
            h[i..].copy_from_slice(&out_buf[..rem]);
        }
    }
}

// =============================================================================
// Tests
// =============================================================================
