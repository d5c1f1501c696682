//! Loss registry: selector strings to configured objectives.
//!
//! A registry maps a loss name to a factory plus a parameter schema. The
//! built-in set is populated once by straight-line code (no macros, no
//! codegen) behind a [`OnceLock`], after which it is read-only and safe to
//! query from any number of threads. External crates can build their own
//! [`Registry`], register additional losses, and drive them through the same
//! evaluation loop - the boosting core never needs to know.
//!
//! # Selector syntax
//!
//! `name` or `name:param1=value1,param2=value2`, e.g.
//! `tweedie_deviance:power=1.5`. Parameters are validated against the
//! schema before the factory runs: unknown names, unparsable values,
//! out-of-range values, and missing required parameters are all
//! [`LossError::InvalidParameter`].

use std::collections::BTreeMap;
use std::sync::OnceLock;

use crate::error::LossError;
use crate::objective::{
    AbsoluteLoss, GammaLoss, HingeLoss, LambdaRankLoss, LogisticLoss, MultitaskSquaredLoss,
    Objective, PinballLoss, PoissonLoss, PseudoHuberLoss, SoftmaxLoss, SquaredLoss, TweedieLoss,
};

// =============================================================================
// Parameter schema
// =============================================================================

/// Legal interval for one numeric parameter, with open or closed ends.
#[derive(Debug, Clone, Copy)]
pub struct ParamRange {
    min: f64,
    max: f64,
    min_open: bool,
    max_open: bool,
}

impl ParamRange {
    /// Open interval `(min, max)`.
    pub fn open(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_open: true,
            max_open: true,
        }
    }

    /// Closed interval `[min, max]`.
    pub fn closed(min: f64, max: f64) -> Self {
        Self {
            min,
            max,
            min_open: false,
            max_open: false,
        }
    }

    /// Half-open interval `[min, inf)`.
    pub fn at_least(min: f64) -> Self {
        Self {
            min,
            max: f64::INFINITY,
            min_open: false,
            max_open: true,
        }
    }

    /// Open lower bound `(min, inf)`.
    pub fn greater_than(min: f64) -> Self {
        Self {
            min,
            max: f64::INFINITY,
            min_open: true,
            max_open: true,
        }
    }

    /// Whether `value` lies inside the interval.
    pub fn contains(&self, value: f64) -> bool {
        let above = if self.min_open {
            value > self.min
        } else {
            value >= self.min
        };
        let below = if self.max_open {
            value < self.max
        } else {
            value <= self.max
        };
        above && below && value.is_finite()
    }
}

impl std::fmt::Display for ParamRange {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let open = if self.min_open { "(" } else { "[" };
        let close = if self.max_open { ")" } else { "]" };
        write!(f, "{}{}, {}{}", open, self.min, self.max, close)
    }
}

/// Declaration of one loss parameter.
#[derive(Debug, Clone)]
pub struct ParamSpec {
    name: &'static str,
    range: ParamRange,
    default: Option<f64>,
    integer: bool,
}

impl ParamSpec {
    /// A parameter the selector must supply.
    pub fn required(name: &'static str, range: ParamRange) -> Self {
        Self {
            name,
            range,
            default: None,
            integer: false,
        }
    }

    /// A parameter with a default used when the selector omits it.
    pub fn optional(name: &'static str, range: ParamRange, default: f64) -> Self {
        debug_assert!(range.contains(default), "default must satisfy the range");
        Self {
            name,
            range,
            default: Some(default),
            integer: false,
        }
    }

    /// Require the value to be integral (class counts, task counts).
    pub fn integer(mut self) -> Self {
        self.integer = true;
        self
    }
}

/// Validated parameter values handed to a loss factory.
///
/// Every schema parameter is present: supplied values have passed range
/// validation and omitted optional ones carry their defaults.
#[derive(Debug, Clone)]
pub struct LossConfig {
    values: BTreeMap<&'static str, f64>,
}

impl LossConfig {
    /// Value of a schema parameter.
    ///
    /// # Panics
    /// Panics if `name` is not in the loss's schema; factories only query
    /// the parameters they declared.
    pub fn get(&self, name: &str) -> f64 {
        *self
            .values
            .get(name)
            .unwrap_or_else(|| panic!("parameter \"{}\" is not in the schema", name))
    }

    /// Integer-valued schema parameter.
    pub fn get_usize(&self, name: &str) -> usize {
        self.get(name) as usize
    }
}

// =============================================================================
// Registry
// =============================================================================

/// Factory producing a configured objective from validated parameters.
pub type LossFactory = fn(&LossConfig) -> Box<dyn Objective>;

struct Entry {
    params: Vec<ParamSpec>,
    factory: LossFactory,
}

/// Immutable-after-setup map from loss names to factories.
pub struct Registry {
    entries: BTreeMap<String, Entry>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
        }
    }

    /// A registry holding every built-in loss.
    pub fn with_builtins() -> Self {
        let mut registry = Registry::new();

        let defs: Vec<(&str, Vec<ParamSpec>, LossFactory)> = vec![
            ("squared_error", vec![], |_| Box::new(SquaredLoss)),
            ("absolute_error", vec![], |_| Box::new(AbsoluteLoss)),
            (
                "quantile",
                vec![ParamSpec::optional("alpha", ParamRange::open(0.0, 1.0), 0.5)],
                |cfg| Box::new(PinballLoss::new(cfg.get("alpha") as f32)),
            ),
            (
                "pseudo_huber",
                vec![ParamSpec::optional("delta", ParamRange::greater_than(0.0), 1.0)],
                |cfg| Box::new(PseudoHuberLoss::new(cfg.get("delta") as f32)),
            ),
            ("log_loss", vec![], |_| Box::new(LogisticLoss)),
            ("hinge", vec![], |_| Box::new(HingeLoss)),
            ("poisson_deviance", vec![], |_| Box::new(PoissonLoss)),
            ("gamma_deviance", vec![], |_| Box::new(GammaLoss)),
            (
                "tweedie_deviance",
                vec![ParamSpec::required("power", ParamRange::open(1.0, 2.0))],
                |cfg| Box::new(TweedieLoss::new(cfg.get("power") as f32)),
            ),
            (
                "softmax",
                vec![ParamSpec::required("num_class", ParamRange::at_least(2.0)).integer()],
                |cfg| Box::new(SoftmaxLoss::new(cfg.get_usize("num_class"))),
            ),
            (
                "multitask_squared_error",
                vec![ParamSpec::required("num_task", ParamRange::at_least(1.0)).integer()],
                |cfg| Box::new(MultitaskSquaredLoss::new(cfg.get_usize("num_task"))),
            ),
            (
                "lambdarank",
                vec![ParamSpec::optional("sigma", ParamRange::greater_than(0.0), 1.0)],
                |cfg| Box::new(LambdaRankLoss::new(cfg.get("sigma") as f32)),
            ),
        ];

        for (name, params, factory) in defs {
            registry
                .register(name, params, factory)
                .expect("built-in loss names are unique");
        }
        registry
    }

    /// The process-wide built-in registry, initialized on first use and
    /// read-only thereafter.
    pub fn builtin() -> &'static Registry {
        static BUILTIN: OnceLock<Registry> = OnceLock::new();
        BUILTIN.get_or_init(Registry::with_builtins)
    }

    /// Add a loss. Fails if `name` is already taken.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        params: Vec<ParamSpec>,
        factory: LossFactory,
    ) -> Result<(), LossError> {
        let name = name.into();
        if self.entries.contains_key(&name) {
            return Err(LossError::DuplicateLoss { name });
        }
        self.entries.insert(name, Entry { params, factory });
        Ok(())
    }

    /// Whether a loss name is registered.
    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    /// Registered names, sorted.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    /// Resolve a selector string into a configured objective.
    pub fn create(&self, selector: &str) -> Result<Box<dyn Objective>, LossError> {
        let (name, params_str) = match selector.split_once(':') {
            Some((name, rest)) => (name.trim(), Some(rest)),
            None => (selector.trim(), None),
        };

        let entry = self.entries.get(name).ok_or_else(|| LossError::UnknownLoss {
            name: name.to_string(),
        })?;

        let mut values: BTreeMap<&'static str, f64> = BTreeMap::new();

        if let Some(params_str) = params_str {
            for pair in params_str.split(',') {
                let pair = pair.trim();
                if pair.is_empty() {
                    continue;
                }
                let (key, raw_value) = pair.split_once('=').ok_or_else(|| {
                    invalid_param(name, pair, "expected key=value".to_string())
                })?;
                let key = key.trim();
                let raw_value = raw_value.trim();

                let spec = entry
                    .params
                    .iter()
                    .find(|s| s.name == key)
                    .ok_or_else(|| invalid_param(name, key, "unknown parameter".to_string()))?;

                let value: f64 = raw_value.parse().map_err(|_| {
                    invalid_param(name, key, format!("\"{}\" is not a number", raw_value))
                })?;

                if !spec.range.contains(value) {
                    return Err(invalid_param(
                        name,
                        key,
                        format!("must be in {}, got {}", spec.range, value),
                    ));
                }
                if spec.integer && value.fract() != 0.0 {
                    return Err(invalid_param(
                        name,
                        key,
                        format!("must be an integer, got {}", value),
                    ));
                }

                values.insert(spec.name, value);
            }
        }

        // Defaults for omitted parameters; required ones must be present.
        for spec in &entry.params {
            if !values.contains_key(spec.name) {
                match spec.default {
                    Some(default) => {
                        values.insert(spec.name, default);
                    }
                    None => {
                        return Err(invalid_param(
                            name,
                            spec.name,
                            format!("missing required parameter (legal range {})", spec.range),
                        ));
                    }
                }
            }
        }

        Ok((entry.factory)(&LossConfig { values }))
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

fn invalid_param(loss: &str, param: &str, reason: String) -> LossError {
    LossError::InvalidParameter {
        loss: loss.to_string(),
        param: param.to_string(),
        reason,
    }
}

/// Resolve a selector against the built-in registry.
///
/// The one-time setup call a training harness makes per run.
pub fn create(selector: &str) -> Result<Box<dyn Objective>, LossError> {
    Registry::builtin().create(selector)
}

// =============================================================================
// Tests
// =============================================================================
