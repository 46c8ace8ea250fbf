use rand::rngs::StdRng;
use tg_tensor::{ComputeBackend, Tensor};

use crate::attention::MultiHeadAttention;
use crate::config::GptConfig;
use crate::error::{ModelError, Result};
use crate::feed_forward::FeedForward;
use crate::norm::LayerNorm;

/// Pre-norm transformer block.
///
/// Each sublayer reads a normalized copy of its input and its output is added
/// back onto the raw input, so the residual stream itself is never normalized
/// in place.
pub struct TransformerBlock {
    /// Normalization feeding the attention sublayer.
    pub norm1: LayerNorm,
    pub attention: MultiHeadAttention,
    /// Normalization feeding the feed-forward sublayer.
    pub norm2: LayerNorm,
    pub feed_forward: FeedForward,
}

impl TransformerBlock {
    pub fn init(config: &GptConfig, rng: &mut StdRng) -> Self {
        TransformerBlock {
            norm1: LayerNorm::new(config.dim_model, config.norm_eps),
            attention: MultiHeadAttention::init(config, rng),
            norm2: LayerNorm::new(config.dim_model, config.norm_eps),
            feed_forward: FeedForward::init(config, rng),
        }
    }

    /// Transform a [batch, seq, dim_model] input. Shape is preserved.
    pub fn forward(
        &mut self,
        x: &Tensor,
        backend: &dyn ComputeBackend,
        training: bool,
    ) -> Result<Tensor> {
        // x = x + attention(norm1(x))
        let normed = self.norm1.forward(x, backend)?;
        let attended = self.attention.forward(&normed, backend, training)?;
        let summed = backend
            .add(x.data_f32(), attended.data_f32())
            .map_err(|e| ModelError::Other(format!("attention residual failed: {}", e)))?;
        let x = Tensor::new(summed, x.shape().clone());

        // x = x + feed_forward(norm2(x))
        let normed = self.norm2.forward(&x, backend)?;
        let transformed = self.feed_forward.forward(&normed, backend, training)?;
        let summed = backend
            .add(x.data_f32(), transformed.data_f32())
            .map_err(|e| ModelError::Other(format!("feed-forward residual failed: {}", e)))?;
        Ok(Tensor::new(summed, x.shape().clone()))
    }
}
