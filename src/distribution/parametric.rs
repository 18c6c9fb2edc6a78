use crate::*;

/// A learnable probability model over a support of [`Value`]s.
///
/// # Required Methods
///
/// - `sample(rng)` — Draw a value along with the probability it was drawn with
/// - `probability(value)` — Exact probability of a value, error outside the support
/// - `optimize(values, probabilities)` — Move the model toward a target policy
/// - `parameters()` / `set_parameters()` — Raw access for checkpoints
///
/// Randomness is supplied by the caller so that sampling is reproducible
/// up to the random source alone.
pub trait Parametric {
    fn sample<R>(&self, rng: &mut R) -> anyhow::Result<(Probability, Value)>
    where
        R: rand::Rng + ?Sized;
    fn probability(&self, value: &Value) -> anyhow::Result<Probability>;
    fn optimize(&mut self, values: &[Value], probabilities: &[Probability]) -> anyhow::Result<()>;
    fn parameters(&self) -> Vec<f32>;
    fn set_parameters(&mut self, parameters: Vec<f32>) -> anyhow::Result<()>;
}
