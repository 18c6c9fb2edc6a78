use crate::*;
use rand::distr::Distribution as _;
use rand_distr::Normal;

/// Normal distribution clamped into a bounded interval.
///
/// Densities are never evaluated: [`Parametric::sample`] reports a
/// probability of zero and [`Parametric::probability`] is an error. Fitting
/// goes through the quasi-Newton [`Estimator`] on the weighted negative
/// log-likelihood of the target points.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct Gaussian {
    min: f32,
    max: f32,
    loc: f32,
    scale: f32,
}

impl Gaussian {
    pub fn new(min: f32, max: f32) -> Self {
        debug_assert!(min <= max);
        Self {
            min,
            max,
            loc: min + (max - min) / 2.,
            scale: 1.,
        }
    }
    pub fn loc(&self) -> f32 {
        self.loc
    }
    pub fn scale(&self) -> f32 {
        self.scale
    }
    pub fn support(&self) -> (f32, f32) {
        (self.min, self.max)
    }

    /// Step (location, scale) toward the weighted target points, with the
    /// search budget and memory taken from `estimator`.
    pub fn fit(&mut self, estimator: &Estimator, values: &[Value], probabilities: &[Probability]) -> anyhow::Result<()> {
        anyhow::ensure!(values.len() == probabilities.len(), "values and targets differ in length");
        anyhow::ensure!(probabilities.iter().all(|p| *p >= 0.), "negative target");
        anyhow::ensure!(probabilities.iter().sum::<f32>() > 0., "targets sum to zero");
        let points = values
            .iter()
            .map(|v| v.point().ok_or_else(|| anyhow::anyhow!("discrete value {} on continuous support", v)))
            .collect::<anyhow::Result<Vec<f32>>>()?;
        anyhow::ensure!(points.iter().all(|x| x.is_finite()), "non-finite target point");
        let mut fit = Fit::from(&*self);
        let grads = estimator.estimate(&mut fit, Fit::loss, points.as_slice(), probabilities)?;
        let step = grads.iter().flat_map(|t| t.data().iter().copied()).collect::<Vec<f32>>();
        let (dloc, drho) = match step.as_slice() {
            [dloc, drho] => (*dloc, *drho),
            _ => anyhow::bail!("expected 2 gradient entries, got {}", step.len()),
        };
        if !(dloc.is_finite() && drho.is_finite()) {
            log::warn!("degenerate gaussian fit over {} points", points.len());
            anyhow::bail!("degenerate gaussian fit: step ({}, {})", dloc, drho);
        }
        self.loc = (fit.loc - dloc).clamp(self.min, self.max);
        self.scale = Fit::softplus(fit.rho - drho) + SCALE_MIN;
        Ok(())
    }
}

impl Parametric for Gaussian {
    fn sample<R>(&self, rng: &mut R) -> anyhow::Result<(Probability, Value)>
    where
        R: rand::Rng + ?Sized,
    {
        let x = Normal::new(self.loc, self.scale)
            .map_err(|e| anyhow::anyhow!("{:?}", e))?
            .sample(rng)
            .clamp(self.min, self.max);
        Ok((0., Value::Continuous(x)))
    }
    fn probability(&self, value: &Value) -> anyhow::Result<Probability> {
        anyhow::bail!("density of {} is not evaluated", value)
    }
    fn optimize(&mut self, values: &[Value], probabilities: &[Probability]) -> anyhow::Result<()> {
        self.fit(&Estimator::default(), values, probabilities)
    }
    fn parameters(&self) -> Vec<f32> {
        vec![self.loc, self.scale]
    }
    fn set_parameters(&mut self, parameters: Vec<f32>) -> anyhow::Result<()> {
        match parameters.as_slice() {
            [loc, scale] if *scale > 0. => {
                self.loc = *loc;
                self.scale = *scale;
                Ok(())
            }
            [_, scale] => Err(anyhow::anyhow!("non-positive scale {}", scale)),
            _ => Err(anyhow::anyhow!("expected [loc, scale], got {} parameters", parameters.len())),
        }
    }
}

/// Unconstrained reparametrization: scale = softplus(rho) + floor.
struct Fit {
    loc: f32,
    rho: f32,
}

impl Fit {
    fn softplus(x: f32) -> f32 {
        match x > 20. {
            true => x,
            false => x.exp().ln_1p(),
        }
    }
    fn sigmoid(x: f32) -> f32 {
        1. / (1. + (-x).exp())
    }
    fn inverse(y: f32) -> f32 {
        let y = y.max(1e-6);
        match y > 20. {
            true => y,
            false => y.exp_m1().ln(),
        }
    }
    /// Weighted negative log-likelihood, constant term dropped.
    fn loss(&self, points: &[f32], weights: &[Probability]) -> (Utility, Vec<Tensor>) {
        let scale = Self::softplus(self.rho) + SCALE_MIN;
        let total = weights.iter().sum::<f32>();
        let (mut nll, mut dloc, mut dscale) = (0., 0., 0.);
        for (x, w) in points.iter().zip(weights) {
            let z = (x - self.loc) / scale;
            nll += w * (scale.ln() + z * z / 2.);
            dloc -= w * z / scale;
            dscale += w * (1. - z * z) / scale;
        }
        let drho = dscale * Self::sigmoid(self.rho);
        (nll / total, vec![Tensor::from(vec![dloc / total, drho / total])])
    }
}

impl From<&Gaussian> for Fit {
    fn from(gaussian: &Gaussian) -> Self {
        Self {
            loc: gaussian.loc,
            rho: Self::inverse(gaussian.scale - SCALE_MIN),
        }
    }
}

impl Model for Fit {
    fn tensors(&self) -> Vec<Tensor> {
        vec![Tensor::from(vec![self.loc, self.rho])]
    }
    fn assign(&mut self, tensors: Vec<Tensor>) {
        if let Some(tensor) = tensors.first() {
            self.loc = tensor.data()[0];
            self.rho = tensor.data()[1];
        }
    }
    /// Steps are bounded by the public (location, scale), not by `rho`,
    /// which is zero at an ordinary scale.
    fn norm(&self) -> f32 {
        self.loc.hypot(Self::softplus(self.rho) + SCALE_MIN)
    }
}
