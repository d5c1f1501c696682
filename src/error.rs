//! Error types for objective configuration and batch validation.
//!
//! All failures are fail-fast: configuration errors surface at `create` time
//! and batch errors surface before any per-sample computation runs, each with
//! enough context (offending name, parameter, value) to fix the call site.
//! Non-finite gradients/hessians are *not* errors; they propagate through the
//! output arrays for the training harness to detect.

use crate::objective::TargetDomain;

/// Errors raised while resolving, configuring, or feeding an objective.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum LossError {
    /// The selector string names a loss that is not registered.
    #[error("unknown loss \"{name}\"")]
    UnknownLoss { name: String },

    /// A second registration was attempted under an existing name.
    #[error("loss \"{name}\" is already registered")]
    DuplicateLoss { name: String },

    /// A supplied parameter is missing, unknown, unparsable, or outside its
    /// declared legal range.
    #[error("invalid parameter \"{param}\" for loss \"{loss}\": {reason}")]
    InvalidParameter {
        loss: String,
        param: String,
        reason: String,
    },

    /// A target value violates the objective's declared legal domain.
    #[error("target {value} at row {row} is outside the {domain} domain of loss \"{loss}\"")]
    TargetOutOfDomain {
        loss: String,
        row: usize,
        value: f32,
        domain: TargetDomain,
    },

    /// Raw score array length does not match `n_rows * n_outputs`.
    #[error("raw scores length ({got}) does not match n_rows * n_outputs ({expected})")]
    ScoreLenMismatch { expected: usize, got: usize },

    /// Target array length does not match what the objective expects.
    #[error("targets length ({got}) does not match the expected length ({expected})")]
    TargetLenMismatch { expected: usize, got: usize },

    /// Weight array length does not match the number of rows.
    #[error("number of weights ({got}) does not match number of rows ({expected})")]
    WeightLenMismatch { expected: usize, got: usize },

    /// Batch output dimensionality does not match the objective's.
    #[error("loss \"{loss}\" produces {expected} outputs per row, batch declares {got}")]
    OutputMismatch {
        loss: String,
        expected: usize,
        got: usize,
    },
}
