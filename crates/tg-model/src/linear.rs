use rand::rngs::StdRng;
use rand::Rng;
use rand_distr::StandardNormal;
use tg_tensor::{ComputeBackend, Shape, Tensor};

use crate::error::Result;

/// Standard deviation for Gaussian weight initialization.
pub(crate) const INIT_STD: f32 = 0.02;

/// Draw `n` samples from N(0, INIT_STD^2).
pub(crate) fn gaussian(n: usize, rng: &mut StdRng) -> Vec<f32> {
    (0..n)
        .map(|_| rng.sample::<f32, _>(StandardNormal) * INIT_STD)
        .collect()
}

/// A learned linear map without bias.
///
/// The weight is stored [in_features, out_features] row-major, so a batch of
/// row vectors multiplies through directly: [rows, in] @ [in, out].
pub struct Linear {
    /// Weight matrix, shape [in_features, out_features].
    pub weight: Tensor,
}

impl Linear {
    /// Create a linear layer with weights drawn from N(0, 0.02^2).
    pub fn init(in_features: usize, out_features: usize, rng: &mut StdRng) -> Self {
        let weight = Tensor::new(
            gaussian(in_features * out_features, rng),
            Shape::new(vec![in_features, out_features]),
        );
        Linear { weight }
    }

    /// Apply to a 2-D input [rows, in_features], producing [rows, out_features].
    pub fn forward(&self, x: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        Ok(x.matmul(&self.weight, backend)?)
    }
}
