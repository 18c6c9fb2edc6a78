/// Dense row-major block of parameters with an explicit shape.
#[derive(Debug, Clone, PartialEq)]
pub struct Tensor {
    shape: Vec<usize>,
    data: Vec<f32>,
}

impl Tensor {
    pub fn new(shape: Vec<usize>, data: Vec<f32>) -> anyhow::Result<Self> {
        anyhow::ensure!(
            shape.iter().product::<usize>() == data.len(),
            "shape {:?} does not hold {} entries",
            shape,
            data.len()
        );
        Ok(Self { shape, data })
    }
    pub fn shape(&self) -> &[usize] {
        &self.shape
    }
    pub fn data(&self) -> &[f32] {
        &self.data
    }
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    fn scale(self, factor: f32) -> Self {
        Self {
            shape: self.shape,
            data: self.data.into_iter().map(|x| x * factor).collect(),
        }
    }

    /// Euclidean norm of all tensors taken together.
    pub fn global_norm(tensors: &[Tensor]) -> f32 {
        tensors
            .iter()
            .flat_map(|t| t.data.iter())
            .map(|x| x * x)
            .sum::<f32>()
            .sqrt()
    }
    /// Rescale jointly so the global norm does not exceed `clip`.
    pub fn clip_by_global_norm(tensors: Vec<Tensor>, clip: f32) -> Vec<Tensor> {
        let norm = Self::global_norm(&tensors);
        match norm > clip {
            true => tensors.into_iter().map(|t| t.scale(clip / norm)).collect(),
            false => tensors,
        }
    }
}

impl From<Vec<f32>> for Tensor {
    fn from(data: Vec<f32>) -> Self {
        Self {
            shape: vec![data.len()],
            data,
        }
    }
}
