//! Registry behavior through the public API: selector resolution, schema
//! validation, external loss registration, and concurrent lookup.

use boostloss::{
    evaluate, Backend, Batch, HessianKind, LossError, Objective, ParamRange, ParamSpec, Registry,
};

// =============================================================================
// An externally defined loss
// =============================================================================

/// A user-defined loss with no hessian at all: plain gradient descent on a
/// scaled residual. Lives outside the crate's own loss modules on purpose -
/// registration must work without touching the core.
#[derive(Debug, Clone, Copy)]
struct ScaledResidualLoss {
    scale: f32,
}

impl Objective for ScaledResidualLoss {
    fn name(&self) -> &'static str {
        "scaled_residual"
    }

    fn hessian_kind(&self) -> HessianKind {
        HessianKind::Absent
    }

    fn compute(&self, batch: &Batch<'_>, _backend: Backend, grads: &mut [f32], hess: Option<&mut [f32]>) {
        assert!(hess.is_none(), "no hessian side should be allocated");
        let scores = batch.raw_scores();
        let targets = batch.targets();
        for i in 0..batch.n_rows() {
            grads[i] = self.scale * (scores[i] - targets[i]);
        }
    }

    fn base_score(&self, n_rows: usize, targets: &[f32], _weights: &[f32], outputs: &mut [f32]) {
        let mean = targets.iter().sum::<f32>() / n_rows as f32;
        outputs.fill(mean);
    }
}

// =============================================================================
// Tests
// =============================================================================

#[test]
fn custom_loss_round_trips_through_a_registry() {
    let mut registry = Registry::new();
    registry
        .register(
            "scaled_residual",
            vec![ParamSpec::optional("scale", ParamRange::greater_than(0.0), 1.0)],
            |cfg| {
                Box::new(ScaledResidualLoss {
                    scale: cfg.get("scale") as f32,
                })
            },
        )
        .unwrap();

    let objective = registry.create("scaled_residual:scale=2.0").unwrap();

    let scores = [3.0f32, 1.0];
    let targets = [1.0f32, 1.0];
    let batch = Batch::single_output(&scores, &targets, &[]).unwrap();
    let out = evaluate(objective.as_ref(), &batch).unwrap();

    assert_eq!(out.grads(), &[4.0, 0.0]);
    // Declared no hessian: the output has no hessian side.
    assert!(out.hess().is_none());
}

#[test]
fn custom_registry_does_not_see_builtins() {
    let registry = Registry::new();
    let err = registry.create("squared_error").unwrap_err();
    assert!(matches!(err, LossError::UnknownLoss { .. }));
}

#[test]
fn builtin_registry_resolves_every_documented_selector() {
    let selectors = [
        "squared_error",
        "absolute_error",
        "quantile:alpha=0.25",
        "pseudo_huber:delta=2.0",
        "log_loss",
        "hinge",
        "poisson_deviance",
        "gamma_deviance",
        "tweedie_deviance:power=1.5",
        "softmax:num_class=3",
        "multitask_squared_error:num_task=2",
        "lambdarank:sigma=2.0",
    ];
    for selector in selectors {
        let objective = Registry::builtin().create(selector).unwrap();
        assert!(!objective.name().is_empty());
    }
}

#[test]
fn duplicate_registration_is_rejected_with_the_name() {
    let mut registry = Registry::new();
    registry
        .register("mine", vec![], |_| {
            Box::new(ScaledResidualLoss { scale: 1.0 })
        })
        .unwrap();

    let err = registry
        .register("mine", vec![], |_| {
            Box::new(ScaledResidualLoss { scale: 1.0 })
        })
        .unwrap_err();
    assert_eq!(err.to_string(), "loss \"mine\" is already registered");
}

#[test]
fn builtin_registry_is_safe_to_query_concurrently() {
    std::thread::scope(|scope| {
        for power in [11, 13, 15, 17, 19] {
            scope.spawn(move || {
                let selector = format!("tweedie_deviance:power=1.{}", power);
                let objective = Registry::builtin().create(&selector).unwrap();

                let scores = [0.5f32; 9];
                let targets = [2.0f32; 9];
                let batch = Batch::single_output(&scores, &targets, &[]).unwrap();
                let out = evaluate(objective.as_ref(), &batch).unwrap();
                assert!(out.grads().iter().all(|g| g.is_finite()));
            });
        }
    });
}

#[test]
fn objectives_are_immutable_and_reusable() {
    let objective = Registry::builtin().create("log_loss").unwrap();

    let scores = [0.0f32, 1.0];
    let targets = [1.0f32, 0.0];
    let batch = Batch::single_output(&scores, &targets, &[]).unwrap();

    let first = evaluate(objective.as_ref(), &batch).unwrap();
    let second = evaluate(objective.as_ref(), &batch).unwrap();
    assert_eq!(first.grads(), second.grads());
}
