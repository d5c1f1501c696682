//! boostloss: the objective (loss) computation core of a gradient-boosting
//! training engine.
//!
//! Given raw model scores and targets, this crate computes the per-sample
//! gradients and (where defined) hessians that drive a boosting update. The
//! surrounding engine - dataset binning, tree growth, iteration control,
//! model persistence - is an external collaborator: it hands over batches of
//! (raw score, target, weight) and consumes gradient/hessian arrays.
//!
//! # Key Types
//!
//! - [`Objective`] - a configured loss: descriptor plus batch computation
//! - [`Registry`] / [`create`] - selector strings to objective instances
//! - [`Batch`] / [`evaluate`] - the per-round hot call
//! - [`Gradients`] - column-major gradient/hessian output
//! - [`LaneFloat`] - the numeric abstraction loss kernels are written against
//!
//! # Example
//!
//! ```
//! use boostloss::{create, evaluate, Batch};
//!
//! let objective = create("squared_error")?;
//!
//! let raw_scores = [5.0f32, 1.0, 0.0];
//! let targets = [3.0f32, 1.0, -2.0];
//! let batch = Batch::single_output(&raw_scores, &targets, &[])?;
//!
//! let output = evaluate(objective.as_ref(), &batch)?;
//! assert_eq!(output.grads(), &[2.0, 0.0, 2.0]);
//! # Ok::<(), boostloss::LossError>(())
//! ```
//!
//! # Vectorization
//!
//! Loss kernels are written once against [`LaneFloat`] and run unmodified at
//! lane widths 1, 4, and 8; [`evaluate`] uses the widest backend and
//! [`evaluate_with_backend`] pins one explicitly. Per-lane branching is
//! compare + select, so the inner loop is the same straight line at every
//! width.
//!
//! # Threading
//!
//! Nothing here spawns, blocks, or locks. [`evaluate`] is pure with respect
//! to its inputs, so parallel workers can evaluate disjoint batches of the
//! same objective concurrently; the built-in registry is immutable after its
//! one-time initialization.

pub mod error;
pub mod eval;
pub mod gradients;
pub mod num;
pub mod objective;
pub mod registry;

pub use error::LossError;
pub use eval::{evaluate, evaluate_with_backend, predictions_from_scores, Backend, Batch};
pub use gradients::Gradients;
pub use num::LaneFloat;
pub use objective::{
    AbsoluteLoss, ElementLoss, GammaLoss, HessianKind, HingeLoss, LambdaRankLoss, Link,
    LogisticLoss, MultitaskSquaredLoss, Objective, PinballLoss, PoissonLoss, PseudoHuberLoss,
    SoftmaxLoss, SquaredLoss, TargetDomain, TweedieLoss,
};
pub use registry::{create, LossConfig, LossFactory, ParamRange, ParamSpec, Registry};
