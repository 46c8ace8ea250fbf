use rand::rngs::StdRng;
use rand::Rng;
use tg_tensor::{ComputeBackend, Shape, Tensor};

use crate::config::{Activation, GptConfig};
use crate::dropout::Dropout;
use crate::error::{ModelError, Result};
use crate::linear::Linear;

/// Position-wise feed-forward network.
///
/// Expands each position to the feed-forward width, applies the configured
/// activation, and contracts back to the model width. Dropout runs after the
/// activation and again after the contraction.
pub struct FeedForward {
    /// Expansion projection, shape [dim_model, feed_forward_dim].
    pub expand: Linear,
    /// Contraction projection, shape [feed_forward_dim, dim_model].
    pub contract: Linear,
    activation: Activation,
    hidden_dropout: Dropout,
    output_dropout: Dropout,
}

impl FeedForward {
    pub fn init(config: &GptConfig, rng: &mut StdRng) -> Self {
        let ff = config.feed_forward_dim();
        FeedForward {
            expand: Linear::init(config.dim_model, ff, rng),
            contract: Linear::init(ff, config.dim_model, rng),
            activation: config.feed_forward_activation,
            hidden_dropout: Dropout::new(config.feed_forward_dropout, rng.gen()),
            output_dropout: Dropout::new(config.feed_forward_dropout, rng.gen()),
        }
    }

    /// Transform a [batch, seq, dim_model] input. Shape is preserved.
    pub fn forward(
        &mut self,
        x: &Tensor,
        backend: &dyn ComputeBackend,
        training: bool,
    ) -> Result<Tensor> {
        let dims = x.shape().dims();
        if dims.len() != 3 {
            return Err(ModelError::Other(format!(
                "feed-forward expects [batch, seq, dim] input, got {}",
                x.shape()
            )));
        }
        let rows = dims[0] * dims[1];
        let flat = x.reshape(Shape::new(vec![rows, dims[2]]))?;

        let hidden = self.expand.forward(&flat, backend)?;
        let mut activated = match self.activation {
            Activation::Gelu => backend.gelu(hidden.data_f32()),
            Activation::Relu => backend.relu(hidden.data_f32()),
            Activation::Silu => backend.silu(hidden.data_f32()),
        }
        .map_err(|e| ModelError::Other(format!("feed-forward activation failed: {}", e)))?;
        self.hidden_dropout.apply(&mut activated, training);

        let hidden = Tensor::new(activated, hidden.shape().clone());
        let mut out = self.contract.forward(&hidden, backend)?;
        self.output_dropout.apply(out.data_f32_mut(), training);
        Ok(out.reshape(x.shape().clone())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::gaussian;
    use rand::SeedableRng;
    use tg_tensor::CpuBackend;

    const C: usize = 32;

    fn ffn(seed: u64) -> FeedForward {
        let mut rng = StdRng::seed_from_u64(seed);
        FeedForward::init(&GptConfig::tiny(), &mut rng)
    }

    fn input(seed: u64, batch: usize, seq: usize) -> Tensor {
        let mut rng = StdRng::seed_from_u64(seed);
        Tensor::new(
            gaussian(batch * seq * C, &mut rng),
            Shape::new(vec![batch, seq, C]),
        )
    }

    #[test]
    fn test_output_shape_preserved() {
        let backend = CpuBackend::new();
        let mut layer = ffn(0);
        let x = input(1, 2, 3);
        let y = layer.forward(&x, &backend, false).unwrap();
        assert_eq!(y.shape().dims(), &[2, 3, C]);
    }

    #[test]
    fn test_expansion_width() {
        let layer = ffn(0);
        let config = GptConfig::tiny();
        assert_eq!(
            layer.expand.weight.shape().dims(),
            &[config.dim_model, config.feed_forward_dim()]
        );
        assert_eq!(
            layer.contract.weight.shape().dims(),
            &[config.feed_forward_dim(), config.dim_model]
        );
    }

    #[test]
    fn test_activation_selects_kernel() {
        let backend = CpuBackend::new();
        let x = input(5, 1, 2);

        let outputs: Vec<Vec<f32>> = [Activation::Gelu, Activation::Relu, Activation::Silu]
            .iter()
            .map(|&activation| {
                let mut rng = StdRng::seed_from_u64(4);
                let config = GptConfig {
                    feed_forward_activation: activation,
                    ..GptConfig::tiny()
                };
                let mut layer = FeedForward::init(&config, &mut rng);
                layer
                    .forward(&x, &backend, false)
                    .unwrap()
                    .data_f32()
                    .to_vec()
            })
            .collect();

        // Same weights, different nonlinearity, different outputs.
        assert_ne!(outputs[0], outputs[1]);
        assert_ne!(outputs[0], outputs[2]);
        assert_ne!(outputs[1], outputs[2]);
    }

    #[test]
    fn test_positions_are_independent() {
        let backend = CpuBackend::new();
        let mut layer = ffn(2);
        let seq = 4;

        let x = input(3, 1, seq);
        let mut perturbed_data = x.data_f32().to_vec();
        for v in &mut perturbed_data[(seq - 1) * C..] {
            *v += 1.0;
        }
        let perturbed = Tensor::new(perturbed_data, Shape::new(vec![1, seq, C]));

        let y_base = layer.forward(&x, &backend, false).unwrap();
        let y_pert = layer.forward(&perturbed, &backend, false).unwrap();

        // The transform is per position, so untouched rows come out identical.
        assert_eq!(
            &y_base.data_f32()[..(seq - 1) * C],
            &y_pert.data_f32()[..(seq - 1) * C]
        );
    }

    #[test]
    fn test_rejects_non_3d_input() {
        let backend = CpuBackend::new();
        let mut layer = ffn(0);
        let x = Tensor::zeros(Shape::new(vec![4, C]));
        assert!(layer.forward(&x, &backend, false).is_err());
    }
}
