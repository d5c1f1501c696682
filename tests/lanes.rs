//! Lane-width equivalence: every separable loss must produce the same
//! gradients and hessians at widths 1, 4, and 8, within floating-point
//! tolerance, including on batch lengths that leave a partial tail chunk.

use approx::assert_relative_eq;
use boostloss::{create, evaluate_with_backend, Backend, Batch, Objective, TargetDomain};
use rstest::rstest;

/// Deterministic scores spread over a useful range.
fn make_scores(n: usize) -> Vec<f32> {
    (0..n).map(|i| ((i * 13 % 29) as f32) * 0.2 - 2.5).collect()
}

/// Targets that satisfy the objective's declared domain.
fn make_targets(domain: TargetDomain, n: usize) -> Vec<f32> {
    (0..n)
        .map(|i| match domain {
            TargetDomain::Real => ((i * 7 % 19) as f32) * 0.5 - 4.0,
            TargetDomain::NonNegative => (i % 5) as f32,
            TargetDomain::Positive => 0.5 + (i % 5) as f32,
            TargetDomain::Binary => (i % 2) as f32,
            TargetDomain::ClassIndex(k) => (i % k) as f32,
        })
        .collect()
}

fn make_weights(n: usize) -> Vec<f32> {
    (0..n).map(|i| 0.25 + (i % 4) as f32 * 0.5).collect()
}

/// Batch lengths 37 and 40 cover a ragged tail and an exact multiple of
/// both vector widths.
#[rstest]
#[case("squared_error", 37)]
#[case("squared_error", 40)]
#[case("absolute_error", 37)]
#[case("quantile:alpha=0.3", 37)]
#[case("pseudo_huber:delta=0.7", 37)]
#[case("log_loss", 37)]
#[case("log_loss", 40)]
#[case("hinge", 37)]
#[case("poisson_deviance", 37)]
#[case("gamma_deviance", 37)]
#[case("tweedie_deviance:power=1.5", 37)]
#[case("tweedie_deviance:power=1.1", 40)]
fn lane_widths_agree(#[case] selector: &str, #[case] n_rows: usize) {
    let objective = create(selector).unwrap();
    let scores = make_scores(n_rows);
    let targets = make_targets(objective.target_domain(), n_rows);
    let batch = Batch::single_output(&scores, &targets, &[]).unwrap();

    let scalar = evaluate_with_backend(objective.as_ref(), &batch, Backend::Scalar).unwrap();
    let x4 = evaluate_with_backend(objective.as_ref(), &batch, Backend::X4).unwrap();
    let x8 = evaluate_with_backend(objective.as_ref(), &batch, Backend::X8).unwrap();

    for i in 0..n_rows {
        assert_relative_eq!(
            scalar.grads()[i],
            x4.grads()[i],
            epsilon = 1e-5,
            max_relative = 1e-4
        );
        assert_relative_eq!(
            scalar.grads()[i],
            x8.grads()[i],
            epsilon = 1e-5,
            max_relative = 1e-4
        );
        assert_relative_eq!(
            scalar.hess().unwrap()[i],
            x4.hess().unwrap()[i],
            epsilon = 1e-5,
            max_relative = 1e-4
        );
        assert_relative_eq!(
            scalar.hess().unwrap()[i],
            x8.hess().unwrap()[i],
            epsilon = 1e-5,
            max_relative = 1e-4
        );
    }
}

#[rstest]
#[case("squared_error")]
#[case("log_loss")]
#[case("tweedie_deviance:power=1.5")]
fn lane_widths_agree_with_weights(#[case] selector: &str) {
    let n_rows = 23;
    let objective = create(selector).unwrap();
    let scores = make_scores(n_rows);
    let targets = make_targets(objective.target_domain(), n_rows);
    let weights = make_weights(n_rows);
    let batch = Batch::single_output(&scores, &targets, &weights).unwrap();

    let scalar = evaluate_with_backend(objective.as_ref(), &batch, Backend::Scalar).unwrap();
    let x8 = evaluate_with_backend(objective.as_ref(), &batch, Backend::X8).unwrap();

    for i in 0..n_rows {
        assert_relative_eq!(
            scalar.grads()[i],
            x8.grads()[i],
            epsilon = 1e-5,
            max_relative = 1e-4
        );
        assert_relative_eq!(
            scalar.hess().unwrap()[i],
            x8.hess().unwrap()[i],
            epsilon = 1e-5,
            max_relative = 1e-4
        );
    }
}

/// A batch smaller than one vector chunk runs entirely through the staged
/// tail path.
#[test]
fn tiny_batches_run_through_the_tail_path() {
    let objective = create("squared_error").unwrap();
    for n_rows in 1..8 {
        let scores = make_scores(n_rows);
        let targets = make_targets(TargetDomain::Real, n_rows);
        let batch = Batch::single_output(&scores, &targets, &[]).unwrap();

        let scalar = evaluate_with_backend(objective.as_ref(), &batch, Backend::Scalar).unwrap();
        let x8 = evaluate_with_backend(objective.as_ref(), &batch, Backend::X8).unwrap();

        assert_eq!(scalar.grads().len(), n_rows);
        assert_eq!(x8.grads().len(), n_rows);
        for i in 0..n_rows {
            assert_relative_eq!(scalar.grads()[i], x8.grads()[i], max_relative = 1e-5);
        }
    }
}

/// Multi-output separable evaluation agrees across widths too.
#[test]
fn multitask_lane_widths_agree() {
    let n_rows = 13;
    let n_tasks = 3;
    let objective = create("multitask_squared_error:num_task=3").unwrap();

    let scores = make_scores(n_rows * n_tasks);
    let targets = make_targets(TargetDomain::Real, n_rows * n_tasks);
    let batch = Batch::new(&scores, &targets, &[], n_rows, n_tasks).unwrap();

    let scalar = evaluate_with_backend(objective.as_ref(), &batch, Backend::Scalar).unwrap();
    let x4 = evaluate_with_backend(objective.as_ref(), &batch, Backend::X4).unwrap();

    for i in 0..n_rows * n_tasks {
        assert_relative_eq!(scalar.grads()[i], x4.grads()[i], max_relative = 1e-5);
    }
}
