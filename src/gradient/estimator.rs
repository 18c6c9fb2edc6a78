use crate::*;

/// Anything exposing its trainable parameters as a list of shaped tensors.
pub trait Model {
    fn tensors(&self) -> Vec<Tensor>;
    fn assign(&mut self, tensors: Vec<Tensor>);
    /// Bound on the global norm of an estimated step.
    fn norm(&self) -> f32 {
        Tensor::global_norm(&self.tensors())
    }
}

/// Scoped borrow of a model that puts its parameters back on drop.
pub struct Snapshot<'a, M>
where
    M: Model,
{
    model: &'a mut M,
    saved: Option<Vec<Tensor>>,
}

impl<'a, M> Snapshot<'a, M>
where
    M: Model,
{
    pub fn new(model: &'a mut M) -> Self {
        let saved = Some(model.tensors());
        Self { model, saved }
    }
    pub fn saved(&self) -> &[Tensor] {
        self.saved.as_deref().unwrap_or_default()
    }
}

impl<M> std::ops::Deref for Snapshot<'_, M>
where
    M: Model,
{
    type Target = M;
    fn deref(&self) -> &Self::Target {
        self.model
    }
}
impl<M> std::ops::DerefMut for Snapshot<'_, M>
where
    M: Model,
{
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.model
    }
}
impl<M> Drop for Snapshot<'_, M>
where
    M: Model,
{
    fn drop(&mut self) {
        if let Some(saved) = self.saved.take() {
            self.model.assign(saved);
        }
    }
}

/// Quasi-Newton gradient estimate.
///
/// Runs a bounded L-BFGS minimisation of `loss` starting from the model's
/// current parameters and reports the displacement `start - optimum` as
/// the gradient, jointly clipped so its global norm never exceeds
/// [`Model::norm`] at the starting parameters. Applying `params - gradient` therefore moves
/// toward the optimum found within the budget. Both the iteration budget
/// and the line-search budget equal `parameters × cover`.
///
/// The model's parameters are unchanged on return; callers apply the step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Estimator {
    cover: f32,
    memory: usize,
    tolerance: f32,
}

impl Default for Estimator {
    fn default() -> Self {
        Self {
            cover: PARAM_COVER_FACTOR,
            memory: LBFGS_MEMORY,
            tolerance: LBFGS_TOLERANCE,
        }
    }
}

impl TryFrom<&Options> for Estimator {
    type Error = anyhow::Error;
    fn try_from(options: &Options) -> anyhow::Result<Self> {
        let default = Self::default();
        let cover = options.get::<f32>("cover_factor")?.unwrap_or(default.cover);
        let memory = options.get::<usize>("memory")?.unwrap_or(default.memory);
        let tolerance = options.get::<f32>("tolerance")?.unwrap_or(default.tolerance);
        anyhow::ensure!(cover.is_finite() && cover >= 0., "invalid cover factor {}", cover);
        anyhow::ensure!(memory > 0, "L-BFGS memory must be positive");
        anyhow::ensure!(tolerance.is_finite() && tolerance >= 0., "invalid tolerance {}", tolerance);
        Ok(Self {
            cover,
            memory,
            tolerance,
        })
    }
}

impl Estimator {
    pub fn new(cover: f32) -> Self {
        Self {
            cover,
            ..Self::default()
        }
    }
    pub fn cover(&self) -> f32 {
        self.cover
    }

    pub fn estimate<M, L, X, Y>(&self, model: &mut M, loss: L, x: &X, y: &Y) -> anyhow::Result<Vec<Tensor>>
    where
        M: Model,
        L: Fn(&M, &X, &Y) -> (Utility, Vec<Tensor>),
        X: ?Sized,
        Y: ?Sized,
    {
        let clip = model.norm();
        let mut snapshot = Snapshot::new(model);
        let initial = snapshot.saved().to_vec();
        let stitch = Stitch::from(initial.as_slice());
        let start = stitch.stitch(&initial)?;
        let budget = (stitch.n() as f32 * self.cover) as usize;
        let mut failure = None;
        let minimum = Lbfgs::new(budget, budget)
            .memory(self.memory)
            .tolerance(self.tolerance)
            .minimize(
                |flat| {
                    let evaluation = stitch
                        .partition(flat)
                        .map(|tensors| snapshot.assign(tensors))
                        .map(|_| loss(&*snapshot, x, y))
                        .and_then(|(value, grads)| stitch.stitch(&grads).map(|g| (value, g)));
                    match evaluation {
                        Ok(evaluation) => evaluation,
                        Err(e) => {
                            failure.get_or_insert(e);
                            (f32::NAN, Vec::new())
                        }
                    }
                },
                start.clone(),
            );
        if let Some(e) = failure {
            return Err(e);
        }
        log::debug!(
            "lbfgs over {} parameters: {} iterations, objective {:.6}, converged {}",
            stitch.n(),
            minimum.iterations,
            minimum.objective,
            minimum.converged
        );
        let displacement = start
            .iter()
            .zip(minimum.position.iter())
            .map(|(a, b)| a - b)
            .collect::<Vec<f32>>();
        let grads = stitch.partition(&displacement)?;
        Ok(Tensor::clip_by_global_norm(grads, clip))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Two tensors pulled toward a fixed target by a squared error.
    struct Quadratic {
        a: Tensor,
        b: Tensor,
    }

    impl Model for Quadratic {
        fn tensors(&self) -> Vec<Tensor> {
            vec![self.a.clone(), self.b.clone()]
        }
        fn assign(&mut self, tensors: Vec<Tensor>) {
            let mut tensors = tensors.into_iter();
            self.a = tensors.next().unwrap();
            self.b = tensors.next().unwrap();
        }
    }

    fn squared(model: &Quadratic, target: &[f32], _: &()) -> (Utility, Vec<Tensor>) {
        let params = model.a.data().iter().chain(model.b.data()).copied().collect::<Vec<f32>>();
        let diff = params.iter().zip(target).map(|(p, t)| p - t).collect::<Vec<f32>>();
        let value = diff.iter().map(|d| d * d).sum::<f32>() / 2.;
        let a = Tensor::new(model.a.shape().to_vec(), diff[..2].to_vec()).unwrap();
        let b = Tensor::new(model.b.shape().to_vec(), diff[2..].to_vec()).unwrap();
        (value, vec![a, b])
    }

    fn quadratic() -> Quadratic {
        Quadratic {
            a: Tensor::from(vec![1., 2.]),
            b: Tensor::new(vec![2, 1], vec![3., 4.]).unwrap(),
        }
    }

    #[test]
    fn gradient_points_from_optimum() {
        let mut model = quadratic();
        let target = [0.5, 1.5, 2.5, 3.5];
        let grads = Estimator::default().estimate(&mut model, squared, &target[..], &()).unwrap();
        assert_eq!(grads[0].shape(), &[2]);
        assert_eq!(grads[1].shape(), &[2, 1]);
        grads
            .iter()
            .flat_map(|t| t.data().iter())
            .for_each(|g| assert!((g - 0.5).abs() < 1e-3));
    }

    #[test]
    fn model_is_restored() {
        let mut model = quadratic();
        let target = [0., 0., 0., 0.];
        Estimator::default().estimate(&mut model, squared, &target[..], &()).unwrap();
        assert_eq!(model.tensors(), quadratic().tensors());
    }

    #[test]
    fn clipped_to_parameter_norm() {
        let mut model = Quadratic {
            a: Tensor::from(vec![1., 0.]),
            b: Tensor::new(vec![2, 1], vec![0., 0.]).unwrap(),
        };
        let target = [-10., 0., 0., 0.];
        let grads = Estimator::default().estimate(&mut model, squared, &target[..], &()).unwrap();
        assert!((Tensor::global_norm(&grads) - 1.).abs() < 1e-4);
        assert!(grads[0].data()[0] > 0.99);
    }

    #[test]
    fn empty_budget_is_a_zero_step() {
        let mut model = quadratic();
        let target = [0., 0., 0., 0.];
        let grads = Estimator::new(0.).estimate(&mut model, squared, &target[..], &()).unwrap();
        assert_eq!(Tensor::global_norm(&grads), 0.);
    }

    #[test]
    fn malformed_loss_is_an_error() {
        let mut model = quadratic();
        let broken = |_: &Quadratic, _: &(), _: &()| (0f32, vec![Tensor::from(vec![1.])]);
        assert!(Estimator::default().estimate(&mut model, broken, &(), &()).is_err());
        assert_eq!(model.tensors(), quadratic().tensors());
    }

    #[test]
    fn reads_overrides_from_options() {
        let options = Options::default().with("cover_factor", 2.0).unwrap().with("memory", 3).unwrap();
        let estimator = Estimator::try_from(&options).unwrap();
        assert_eq!(estimator.cover(), 2.);
        assert_eq!(estimator.memory, 3);
        assert_eq!(estimator.tolerance, LBFGS_TOLERANCE);
        let options = Options::default().with("memory", "many").unwrap();
        assert!(Estimator::try_from(&options).is_err());
    }
}
