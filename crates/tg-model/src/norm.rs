use tg_tensor::{ComputeBackend, Shape, Tensor};

use crate::error::Result;

/// Layer normalization over the channel axis with learned scale and shift.
pub struct LayerNorm {
    /// Per-channel scale, length dim_model. Initialized to ones.
    pub gamma: Tensor,
    /// Per-channel shift, length dim_model. Initialized to zeros.
    pub beta: Tensor,
    eps: f32,
}

impl LayerNorm {
    pub fn new(dim: usize, eps: f32) -> Self {
        LayerNorm {
            gamma: Tensor::ones(Shape::new(vec![dim])),
            beta: Tensor::zeros(Shape::new(vec![dim])),
            eps,
        }
    }

    /// Normalize each channel row of `x` independently. Shape is preserved;
    /// the last axis of `x` must equal the layer width.
    pub fn forward(&self, x: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        let dim = self.gamma.shape().dim(0);
        let out = backend.layer_norm(
            x.data_f32(),
            self.gamma.data_f32(),
            self.beta.data_f32(),
            self.eps,
            dim,
        )?;
        Ok(Tensor::new(out, x.shape().clone()))
    }
}
