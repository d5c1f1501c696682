//! Multitask objectives.

use super::{target_column, weighted_mean, Objective, SquaredLoss};
use crate::eval::{run_separable, Backend, Batch};

/// Squared error over K independent output dimensions.
///
/// This is the separable special case of a multi-output loss: the gradient
/// and hessian for dimension k depend only on that dimension's own score and
/// target, with no cross-task coupling term. It therefore bypasses the
/// coupled multi-output path entirely and runs the vectorized single-output
/// squared-error kernel once per output column. A general multi-output loss
/// (see [`SoftmaxLoss`](super::SoftmaxLoss)) cannot do this because its
/// per-dimension derivatives share a normalization term across dimensions.
///
/// Targets are column-major `[n_tasks * n_rows]`, one column per task.
#[derive(Debug, Clone, Copy)]
pub struct MultitaskSquaredLoss {
    /// Number of output dimensions.
    pub n_tasks: usize,
}

impl MultitaskSquaredLoss {
    /// Create a multitask squared-error loss over `n_tasks` outputs.
    pub fn new(n_tasks: usize) -> Self {
        debug_assert!(n_tasks >= 1, "n_tasks must be >= 1");
        Self { n_tasks }
    }
}

impl Objective for MultitaskSquaredLoss {
    fn name(&self) -> &'static str {
        "multitask_squared_error"
    }

    fn n_outputs(&self) -> usize {
        self.n_tasks
    }

    fn compute(&self, batch: &Batch<'_>, backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        // Separable fast path: the single-task kernel, column by column.
        run_separable(&SquaredLoss, batch, backend, grads, hess);
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
