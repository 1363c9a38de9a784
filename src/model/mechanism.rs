//! Structural equations and their noise sources.
//!
//! Each node carries exactly one equation: a pure function from the values
//! of its parents and one independent noise draw to the node's value. The
//! mechanism taxonomy makes the counterfactual contract explicit: additive
//! mechanisms are invertible in the noise argument, generative ones are
//! not and reject abduction.

use rand::distributions::{Distribution, Uniform};
use rand::Rng;
use rand_distr::Normal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

/// Deterministic map from parent values to a value.
pub type EquationFn = Arc<dyn Fn(&[f64]) -> f64 + Send + Sync>;

/// Arbitrary map from parent values and a noise draw to a value.
pub type GenerativeFn = Arc<dyn Fn(&[f64], f64) -> f64 + Send + Sync>;

/// The distribution of a node's exogenous noise term.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum NoiseModel {
    Gaussian { mean: f64, std_dev: f64 },
    Uniform { low: f64, high: f64 },
    /// Draws 1.0 with probability `p`, else 0.0.
    Bernoulli { p: f64 },
    /// Degenerate noise, for fully deterministic mechanisms.
    Fixed { value: f64 },
}

impl NoiseModel {
    /// Checks parameters once, at model construction; `draw` relies on it.
    pub(crate) fn validate(&self) -> Result<(), String> {
        match *self {
            NoiseModel::Gaussian { mean, std_dev } => {
                if !mean.is_finite() || !std_dev.is_finite() || std_dev < 0.0 {
                    return Err(format!(
                        "gaussian needs finite mean and std_dev >= 0, got ({mean}, {std_dev})"
                    ));
                }
            }
            NoiseModel::Uniform { low, high } => {
                if !low.is_finite() || !high.is_finite() || low > high {
                    return Err(format!("uniform needs finite low <= high, got ({low}, {high})"));
                }
            }
            NoiseModel::Bernoulli { p } => {
                if !(0.0..=1.0).contains(&p) {
                    return Err(format!("bernoulli needs p in [0, 1], got {p}"));
                }
            }
            NoiseModel::Fixed { value } => {
                if !value.is_finite() {
                    return Err(format!("fixed noise must be finite, got {value}"));
                }
            }
        }
        Ok(())
    }

    pub(crate) fn draw(&self, rng: &mut impl Rng) -> f64 {
        match *self {
            NoiseModel::Gaussian { mean, std_dev } => Normal::new(mean, std_dev)
                .expect("BUG: noise parameters validated at construction")
                .sample(rng),
            NoiseModel::Uniform { low, high } => Uniform::new_inclusive(low, high).sample(rng),
            NoiseModel::Bernoulli { p } => {
                if rng.gen_bool(p) {
                    1.0
                } else {
                    0.0
                }
            }
            NoiseModel::Fixed { value } => value,
        }
    }
}

/// How a node's value arises from its parents and noise.
#[derive(Clone)]
pub enum Mechanism {
    /// Root node defined purely by its prior distribution.
    Exogenous { noise: NoiseModel },
    /// value = f(parents) + noise. Invertible: noise = value - f(parents).
    Additive { func: EquationFn, noise: NoiseModel },
    /// value = f(parents, noise). Not invertible; counterfactual queries
    /// over such a node fail with `NonInvertibleEquation`.
    Generative {
        func: GenerativeFn,
        noise: NoiseModel,
    },
    /// Constant value, the result of an intervention.
    Fixed { value: f64 },
}

impl Mechanism {
    pub(crate) fn noise(&self) -> Option<&NoiseModel> {
        match self {
            Mechanism::Exogenous { noise } => Some(noise),
            Mechanism::Additive { noise, .. } => Some(noise),
            Mechanism::Generative { noise, .. } => Some(noise),
            Mechanism::Fixed { .. } => None,
        }
    }
}

impl fmt::Debug for Mechanism {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Mechanism::Exogenous { noise } => {
                f.debug_struct("Exogenous").field("noise", noise).finish()
            }
            Mechanism::Additive { noise, .. } => f
                .debug_struct("Additive")
                .field("noise", noise)
                .finish_non_exhaustive(),
            Mechanism::Generative { noise, .. } => f
                .debug_struct("Generative")
                .field("noise", noise)
                .finish_non_exhaustive(),
            Mechanism::Fixed { value } => f.debug_struct("Fixed").field("value", value).finish(),
        }
    }
}

impl PartialEq for Mechanism {
    /// Structural equality. Function-valued mechanisms compare by pointer
    /// identity, which is what intervention copies preserve.
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Mechanism::Exogenous { noise: a }, Mechanism::Exogenous { noise: b }) => a == b,
            (
                Mechanism::Additive { func: fa, noise: a },
                Mechanism::Additive { func: fb, noise: b },
            ) => Arc::ptr_eq(fa, fb) && a == b,
            (
                Mechanism::Generative { func: fa, noise: a },
                Mechanism::Generative { func: fb, noise: b },
            ) => Arc::ptr_eq(fa, fb) && a == b,
            (Mechanism::Fixed { value: a }, Mechanism::Fixed { value: b }) => a == b,
            _ => false,
        }
    }
}

/// One node's equation: declared parents (in argument order) plus the
/// mechanism consuming them.
#[derive(Debug, Clone, PartialEq)]
pub struct StructuralEquation {
    parents: Vec<String>,
    mechanism: Mechanism,
}

impl StructuralEquation {
    /// A root variable drawn from a prior distribution.
    pub fn exogenous(noise: NoiseModel) -> Self {
        Self {
            parents: Vec::new(),
            mechanism: Mechanism::Exogenous { noise },
        }
    }

    /// A constant node, as produced by an intervention.
    pub fn fixed(value: f64) -> Self {
        Self {
            parents: Vec::new(),
            mechanism: Mechanism::Fixed { value },
        }
    }

    /// value = f(parents) + noise. `parents` fixes the argument order of `f`.
    pub fn additive(
        parents: &[&str],
        func: impl Fn(&[f64]) -> f64 + Send + Sync + 'static,
        noise: NoiseModel,
    ) -> Self {
        Self {
            parents: parents.iter().map(|p| p.to_string()).collect(),
            mechanism: Mechanism::Additive {
                func: Arc::new(func),
                noise,
            },
        }
    }

    /// value = f(parents, noise). Opts the node out of counterfactuals.
    pub fn generative(
        parents: &[&str],
        func: impl Fn(&[f64], f64) -> f64 + Send + Sync + 'static,
        noise: NoiseModel,
    ) -> Self {
        Self {
            parents: parents.iter().map(|p| p.to_string()).collect(),
            mechanism: Mechanism::Generative {
                func: Arc::new(func),
                noise,
            },
        }
    }

    /// Linear additive model: sum of weighted parents plus an offset, with
    /// Gaussian noise of the given scale around zero.
    pub fn linear(terms: &[(&str, f64)], offset: f64, noise_scale: f64) -> Self {
        let parents: Vec<&str> = terms.iter().map(|&(p, _)| p).collect();
        let weights: Vec<f64> = terms.iter().map(|&(_, w)| w).collect();
        Self::additive(
            &parents,
            move |values| {
                values
                    .iter()
                    .zip(&weights)
                    .map(|(v, w)| v * w)
                    .sum::<f64>()
                    + offset
            },
            NoiseModel::Gaussian {
                mean: 0.0,
                std_dev: noise_scale,
            },
        )
    }

    /// Logistic model: a Bernoulli draw through a sigmoid of the weighted
    /// parent sum. Generative, hence exempt from counterfactual abduction.
    pub fn logistic(terms: &[(&str, f64)], offset: f64) -> Self {
        let parents: Vec<&str> = terms.iter().map(|&(p, _)| p).collect();
        let weights: Vec<f64> = terms.iter().map(|&(_, w)| w).collect();
        Self::generative(
            &parents,
            move |values, u| {
                let z = values
                    .iter()
                    .zip(&weights)
                    .map(|(v, w)| v * w)
                    .sum::<f64>()
                    + offset;
                let p = 1.0 / (1.0 + (-z).exp());
                if u < p {
                    1.0
                } else {
                    0.0
                }
            },
            NoiseModel::Uniform {
                low: 0.0,
                high: 1.0,
            },
        )
    }

    pub fn parents(&self) -> &[String] {
        &self.parents
    }

    pub fn mechanism(&self) -> &Mechanism {
        &self.mechanism
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use rstest::rstest;

    #[rstest]
    #[case(NoiseModel::Gaussian { mean: 0.0, std_dev: -1.0 })]
    #[case(NoiseModel::Gaussian { mean: f64::NAN, std_dev: 1.0 })]
    #[case(NoiseModel::Uniform { low: 1.0, high: 0.0 })]
    #[case(NoiseModel::Bernoulli { p: 1.5 })]
    #[case(NoiseModel::Fixed { value: f64::INFINITY })]
    fn test_invalid_noise_rejected(#[case] noise: NoiseModel) {
        assert!(noise.validate().is_err());
    }

    #[rstest]
    #[case(NoiseModel::Gaussian { mean: 0.0, std_dev: 1.0 })]
    #[case(NoiseModel::Uniform { low: 0.0, high: 0.0 })]
    #[case(NoiseModel::Bernoulli { p: 0.0 })]
    #[case(NoiseModel::Fixed { value: 2.5 })]
    fn test_valid_noise_accepted(#[case] noise: NoiseModel) {
        assert!(noise.validate().is_ok());
    }

    #[test]
    fn test_fixed_noise_draw_is_constant() {
        let mut rng = StdRng::seed_from_u64(7);
        let noise = NoiseModel::Fixed { value: 3.25 };
        assert_eq!(noise.draw(&mut rng), 3.25);
        assert_eq!(noise.draw(&mut rng), 3.25);
    }

    #[test]
    fn test_linear_equation_computes_weighted_sum() {
        let eq = StructuralEquation::linear(&[("a", 2.0), ("b", -1.0)], 0.5, 0.0);
        assert_eq!(eq.parents(), &["a".to_string(), "b".to_string()]);
        match eq.mechanism() {
            Mechanism::Additive { func, .. } => {
                assert_eq!(func(&[3.0, 4.0]), 2.5);
            }
            other => panic!("expected additive mechanism, got {:?}", other),
        }
    }

    #[test]
    fn test_logistic_equation_is_binary() {
        let eq = StructuralEquation::logistic(&[("a", 1.0)], 0.0);
        match eq.mechanism() {
            Mechanism::Generative { func, .. } => {
                // Large positive input saturates the sigmoid.
                assert_eq!(func(&[100.0], 0.99), 1.0);
                assert_eq!(func(&[-100.0], 0.01), 0.0);
            }
            other => panic!("expected generative mechanism, got {:?}", other),
        }
    }

    #[test]
    fn test_mechanism_equality_by_pointer() {
        let eq = StructuralEquation::linear(&[("a", 1.0)], 0.0, 1.0);
        let copied = eq.clone();
        let rebuilt = StructuralEquation::linear(&[("a", 1.0)], 0.0, 1.0);
        assert_eq!(eq, copied);
        assert_ne!(eq, rebuilt);
    }
}
