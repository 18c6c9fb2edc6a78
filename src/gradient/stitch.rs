use super::Tensor;

/// Map between a list of shaped tensors and one flat vector.
///
/// Built from the tensors it will later reassemble, so partitioning a
/// vector of the right length always reproduces the original shapes.
#[derive(Debug, Clone, PartialEq)]
pub struct Stitch {
    shapes: Vec<Vec<usize>>,
}

impl Stitch {
    /// Total number of scalar entries across all tensors.
    pub fn n(&self) -> usize {
        self.shapes
            .iter()
            .map(|s| s.iter().product::<usize>())
            .sum()
    }
    pub fn stitch(&self, tensors: &[Tensor]) -> anyhow::Result<Vec<f32>> {
        anyhow::ensure!(tensors.len() == self.shapes.len(), "expected {} tensors, got {}", self.shapes.len(), tensors.len());
        for (tensor, shape) in tensors.iter().zip(self.shapes.iter()) {
            anyhow::ensure!(tensor.shape() == shape.as_slice(), "shape {:?} differs from {:?}", tensor.shape(), shape);
        }
        Ok(tensors
            .iter()
            .flat_map(|t| t.data().iter().copied())
            .collect())
    }
    pub fn partition(&self, flat: &[f32]) -> anyhow::Result<Vec<Tensor>> {
        anyhow::ensure!(flat.len() == self.n(), "expected {} entries, got {}", self.n(), flat.len());
        let mut offset = 0;
        self.shapes
            .iter()
            .map(|shape| {
                let size = shape.iter().product::<usize>();
                let data = flat[offset..offset + size].to_vec();
                offset += size;
                Tensor::new(shape.clone(), data)
            })
            .collect()
    }
}

impl From<&[Tensor]> for Stitch {
    fn from(tensors: &[Tensor]) -> Self {
        Self {
            shapes: tensors.iter().map(|t| t.shape().to_vec()).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partition_inverts_stitch() {
        let tensors = vec![
            Tensor::new(vec![2, 2], vec![1., 2., 3., 4.]).unwrap(),
            Tensor::from(vec![5.]),
            Tensor::new(vec![3, 1], vec![6., 7., 8.]).unwrap(),
        ];
        let stitch = Stitch::from(tensors.as_slice());
        let flat = stitch.stitch(&tensors).unwrap();
        assert_eq!(stitch.n(), 8);
        assert_eq!(flat, vec![1., 2., 3., 4., 5., 6., 7., 8.]);
        assert_eq!(stitch.partition(&flat).unwrap(), tensors);
    }

    #[test]
    fn rejects_wrong_sizes() {
        let tensors = vec![Tensor::from(vec![1., 2.])];
        let stitch = Stitch::from(tensors.as_slice());
        assert!(stitch.partition(&[1.]).is_err());
        assert!(stitch.stitch(&[Tensor::from(vec![1.])]).is_err());
    }
}
