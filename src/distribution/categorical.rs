use crate::*;
use rand::distr::Distribution as _;
use rand::distr::weighted::WeightedIndex;

/// Explicit probability vector over `{0..n-1}`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Categorical(Vec<Probability>);

impl Categorical {
    pub fn uniform(n: usize) -> Self {
        Self(vec![1. / n as Probability; n])
    }
    pub fn n(&self) -> usize {
        self.0.len()
    }
    pub fn weights(&self) -> &[Probability] {
        &self.0
    }
    fn index(&self, value: &Value) -> anyhow::Result<usize> {
        match value.index() {
            Some(i) if i < self.n() => Ok(i),
            Some(i) => Err(anyhow::anyhow!("index {} outside support of {}", i, self.n())),
            None => Err(anyhow::anyhow!("continuous value {} on discrete support", value)),
        }
    }
}

impl TryFrom<Vec<Probability>> for Categorical {
    type Error = anyhow::Error;
    fn try_from(weights: Vec<Probability>) -> anyhow::Result<Self> {
        anyhow::ensure!(!weights.is_empty(), "empty categorical");
        anyhow::ensure!(weights.iter().all(|w| *w >= 0.), "negative weight");
        let sum = weights.iter().sum::<Probability>();
        anyhow::ensure!(sum > 0., "weights sum to zero");
        Ok(Self(weights.into_iter().map(|w| w / sum).collect()))
    }
}

impl Parametric for Categorical {
    fn sample<R>(&self, rng: &mut R) -> anyhow::Result<(Probability, Value)>
    where
        R: rand::Rng + ?Sized,
    {
        let index = WeightedIndex::new(self.0.iter().copied())
            .map_err(|e| anyhow::anyhow!(e))?
            .sample(rng);
        Ok((self.0[index], Value::Discrete(index)))
    }
    fn probability(&self, value: &Value) -> anyhow::Result<Probability> {
        self.index(value).map(|i| self.0[i])
    }
    /// Replace the policy with the target, zero outside the listed values.
    fn optimize(&mut self, values: &[Value], probabilities: &[Probability]) -> anyhow::Result<()> {
        anyhow::ensure!(values.len() == probabilities.len(), "values and targets differ in length");
        let mut weights = vec![0.; self.n()];
        for (value, p) in values.iter().zip(probabilities) {
            anyhow::ensure!(*p >= 0., "negative target {} for {}", p, value);
            weights[self.index(value)?] = *p;
        }
        *self = Self::try_from(weights)?;
        Ok(())
    }
    fn parameters(&self) -> Vec<f32> {
        self.0.clone()
    }
    fn set_parameters(&mut self, parameters: Vec<f32>) -> anyhow::Result<()> {
        anyhow::ensure!(
            parameters.len() == self.n(),
            "expected {} parameters, got {}",
            self.n(),
            parameters.len()
        );
        self.0 = parameters;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::Rng;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn sums_to_one_after_optimize() {
        let ref mut rng = SmallRng::seed_from_u64(0);
        let mut categorical = Categorical::uniform(5);
        for _ in 0..100 {
            let values = (0..5).filter(|_| rng.random_bool(0.6)).collect::<Vec<usize>>();
            let values = match values.is_empty() {
                true => vec![0],
                false => values,
            };
            let targets = values.iter().map(|_| rng.random_range(0.01..1.0)).collect::<Vec<f32>>();
            let values = values.into_iter().map(Value::Discrete).collect::<Vec<_>>();
            categorical.optimize(&values, &targets).unwrap();
            let sum = categorical.weights().iter().sum::<f32>();
            assert!((sum - 1.).abs() < 1e-5);
            assert!(categorical.weights().iter().all(|w| *w >= 0.));
        }
    }

    #[test]
    fn point_mass_always_sampled() {
        let ref mut rng = SmallRng::seed_from_u64(1);
        let categorical = Categorical::try_from(vec![1., 0.]).unwrap();
        for _ in 0..100 {
            assert_eq!(categorical.sample(rng).unwrap(), (1., Value::Discrete(0)));
        }
    }

    #[test]
    fn sampled_probability_matches_lookup() {
        let ref mut rng = SmallRng::seed_from_u64(2);
        let categorical = Categorical::try_from(vec![0.2, 0.3, 0.5]).unwrap();
        for _ in 0..50 {
            let (p, value) = categorical.sample(rng).unwrap();
            assert_eq!(p, categorical.probability(&value).unwrap());
        }
    }

    #[test]
    fn outside_support_is_an_error() {
        let categorical = Categorical::uniform(3);
        assert!(categorical.probability(&Value::Discrete(3)).is_err());
        assert!(categorical.probability(&Value::Continuous(0.)).is_err());
        assert!(categorical.clone().optimize(&[Value::Discrete(4)], &[1.]).is_err());
        assert!(categorical.clone().optimize(&[Value::Discrete(0)], &[0.]).is_err());
        assert!(categorical.clone().optimize(&[Value::Discrete(0)], &[-1.]).is_err());
        assert!(categorical.clone().set_parameters(vec![1.]).is_err());
    }

    #[test]
    fn unlisted_values_drop_to_zero() {
        let mut categorical = Categorical::uniform(3);
        categorical
            .optimize(&[Value::Discrete(0), Value::Discrete(2)], &[1., 3.])
            .unwrap();
        assert_eq!(categorical.weights(), &[0.25, 0., 0.75]);
    }
}
