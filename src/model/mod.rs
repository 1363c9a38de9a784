//! The structural-model engine: equations, sampling, interventions and
//! counterfactuals.
pub mod assignment;
pub mod mechanism;
pub mod scm;

mod counterfactual;
mod error;
mod sampler;

pub use assignment::Assignment;
pub use error::ModelError;
pub use mechanism::{EquationFn, GenerativeFn, Mechanism, NoiseModel, StructuralEquation};
pub use scm::{Intervention, StructuralCausalModel};
