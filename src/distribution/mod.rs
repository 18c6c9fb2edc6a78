//! Probability models over action and outcome values.
//!
//! - [`Value`] — A point of a support, discrete index or real number
//! - [`Parametric`] — Sampling, lookup, improvement and raw parameter access
//! - [`Categorical`] — Finite support `{0..n-1}` with an explicit probability vector
//! - [`Gaussian`] — Clamped normal on a bounded interval
//! - [`Distribution`] — Closed union of the two, dispatched by variant

mod categorical;
mod gaussian;
mod parametric;
mod value;

pub use categorical::*;
pub use gaussian::*;
pub use parametric::*;
pub use value::*;

use crate::*;

/// The closed set of distributions a [`ChanceNode`] can carry.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub enum Distribution {
    Discrete(Categorical),
    Continuous(Gaussian),
}

impl Distribution {
    /// Uniform distribution over `{0..n-1}`.
    pub fn discrete(n: usize) -> Self {
        Self::Discrete(Categorical::uniform(n))
    }
    /// Normal distribution clamped into `[min, max]`.
    pub fn continuous(min: f32, max: f32) -> Self {
        Self::Continuous(Gaussian::new(min, max))
    }
    /// [`Parametric::optimize`] with continuous fits searched by `estimator`.
    pub fn fit(&mut self, estimator: &Estimator, values: &[Value], probabilities: &[Probability]) -> anyhow::Result<()> {
        match self {
            Self::Discrete(d) => d.optimize(values, probabilities),
            Self::Continuous(c) => c.fit(estimator, values, probabilities),
        }
    }
}

impl From<Categorical> for Distribution {
    fn from(categorical: Categorical) -> Self {
        Self::Discrete(categorical)
    }
}
impl From<Gaussian> for Distribution {
    fn from(gaussian: Gaussian) -> Self {
        Self::Continuous(gaussian)
    }
}

impl Parametric for Distribution {
    fn sample<R>(&self, rng: &mut R) -> anyhow::Result<(Probability, Value)>
    where
        R: rand::Rng + ?Sized,
    {
        match self {
            Self::Discrete(d) => d.sample(rng),
            Self::Continuous(c) => c.sample(rng),
        }
    }
    fn probability(&self, value: &Value) -> anyhow::Result<Probability> {
        match self {
            Self::Discrete(d) => d.probability(value),
            Self::Continuous(c) => c.probability(value),
        }
    }
    fn optimize(&mut self, values: &[Value], probabilities: &[Probability]) -> anyhow::Result<()> {
        match self {
            Self::Discrete(d) => d.optimize(values, probabilities),
            Self::Continuous(c) => c.optimize(values, probabilities),
        }
    }
    fn parameters(&self) -> Vec<f32> {
        match self {
            Self::Discrete(d) => d.parameters(),
            Self::Continuous(c) => c.parameters(),
        }
    }
    fn set_parameters(&mut self, parameters: Vec<f32>) -> anyhow::Result<()> {
        match self {
            Self::Discrete(d) => d.set_parameters(parameters),
            Self::Continuous(c) => c.set_parameters(parameters),
        }
    }
}
