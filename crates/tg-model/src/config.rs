use crate::error::{ModelError, Result};

/// Activation function used inside the feed-forward sublayer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Activation {
    Gelu,
    Relu,
    Silu,
}

/// Hyperparameters for a GPT model.
#[derive(Debug, Clone)]
pub struct GptConfig {
    /// Embedding dimension / model width.
    pub dim_model: usize,
    /// Number of attention heads per layer.
    pub num_heads: usize,
    /// Number of transformer blocks.
    pub num_layers: usize,
    /// Dropout probability on the summed token + position embeddings.
    pub embedding_dropout: f32,
    /// Dropout probability on per-head attention weights.
    pub head_dropout: f32,
    /// Dropout probability after the multi-head output projection.
    pub multi_head_dropout: f32,
    /// Activation function for the feed-forward sublayer.
    pub feed_forward_activation: Activation,
    /// Dropout probability inside the feed-forward sublayer.
    pub feed_forward_dropout: f32,
    /// Feed-forward expansion factor (hidden size = dim_model * multiplier).
    pub feed_forward_multiplier: usize,
    /// Maximum sequence length / context window size.
    pub max_seq_len: usize,
    /// Vocabulary size (number of token embeddings).
    pub vocab_size: usize,
    /// Rotary encoding frequency base (theta).
    pub rope_base: f32,
    /// Layer normalization epsilon.
    pub norm_eps: f32,
}

impl GptConfig {
    /// A minimal configuration suited to unit tests and quick experiments.
    pub fn tiny() -> Self {
        GptConfig {
            dim_model: 32,
            num_heads: 4,
            num_layers: 2,
            embedding_dropout: 0.0,
            head_dropout: 0.0,
            multi_head_dropout: 0.0,
            feed_forward_activation: Activation::Gelu,
            feed_forward_dropout: 0.0,
            feed_forward_multiplier: 4,
            max_seq_len: 16,
            vocab_size: 128,
            rope_base: 10000.0,
            norm_eps: 1e-5,
        }
    }

    /// A small configuration for character-level experiments.
    pub fn small() -> Self {
        GptConfig {
            dim_model: 128,
            num_heads: 4,
            num_layers: 4,
            embedding_dropout: 0.1,
            head_dropout: 0.1,
            multi_head_dropout: 0.1,
            feed_forward_activation: Activation::Gelu,
            feed_forward_dropout: 0.1,
            feed_forward_multiplier: 4,
            max_seq_len: 128,
            vocab_size: 512,
            rope_base: 10000.0,
            norm_eps: 1e-5,
        }
    }

    /// Dimension of each attention head (dim_model / num_heads).
    pub fn head_dim(&self) -> usize {
        self.dim_model / self.num_heads
    }

    /// Hidden size of the feed-forward sublayer.
    pub fn feed_forward_dim(&self) -> usize {
        self.dim_model * self.feed_forward_multiplier
    }

    /// Check the construction invariants.
    ///
    /// All dimensions must be non-zero, the model width must divide evenly
    /// into heads of even width (rotary encoding rotates half-vectors), and
    /// every dropout probability must lie in [0, 1).
    pub fn validate(&self) -> Result<()> {
        if self.dim_model == 0
            || self.num_heads == 0
            || self.num_layers == 0
            || self.feed_forward_multiplier == 0
            || self.max_seq_len == 0
            || self.vocab_size == 0
        {
            return Err(ModelError::Config(
                "all dimensions must be non-zero".to_string(),
            ));
        }
        if self.dim_model % self.num_heads != 0 {
            return Err(ModelError::Config(format!(
                "dim_model {} is not divisible by num_heads {}",
                self.dim_model, self.num_heads
            )));
        }
        if self.head_dim() % 2 != 0 {
            return Err(ModelError::Config(format!(
                "head width {} must be even for rotary encoding",
                self.head_dim()
            )));
        }
        for (name, p) in [
            ("embedding_dropout", self.embedding_dropout),
            ("head_dropout", self.head_dropout),
            ("multi_head_dropout", self.multi_head_dropout),
            ("feed_forward_dropout", self.feed_forward_dropout),
        ] {
            if !(0.0..1.0).contains(&p) {
                return Err(ModelError::Config(format!(
                    "{} = {} is outside [0, 1)",
                    name, p
                )));
            }
        }
        if self.rope_base <= 0.0 {
            return Err(ModelError::Config(format!(
                "rope_base {} must be positive",
                self.rope_base
            )));
        }
        if self.norm_eps <= 0.0 {
            return Err(ModelError::Config(format!(
                "norm_eps {} must be positive",
                self.norm_eps
            )));
        }
        Ok(())
    }
}

impl Default for GptConfig {
    fn default() -> Self {
        Self::small()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_presets_validate() {
        assert!(GptConfig::tiny().validate().is_ok());
        assert!(GptConfig::small().validate().is_ok());
        assert!(GptConfig::default().validate().is_ok());
    }

    #[test]
    fn test_head_dim() {
        let cfg = GptConfig::tiny();
        assert_eq!(cfg.head_dim(), 8);
        assert_eq!(cfg.feed_forward_dim(), 128);
    }

    #[test]
    fn test_rejects_indivisible_width() {
        let cfg = GptConfig {
            dim_model: 30,
            ..GptConfig::tiny()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_odd_head_width() {
        let cfg = GptConfig {
            dim_model: 12,
            num_heads: 4,
            ..GptConfig::tiny()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_zero_dimension() {
        let cfg = GptConfig {
            num_layers: 0,
            ..GptConfig::tiny()
        };
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_rejects_dropout_of_one() {
        let cfg = GptConfig {
            head_dropout: 1.0,
            ..GptConfig::tiny()
        };
        assert!(cfg.validate().is_err());

        let cfg = GptConfig {
            embedding_dropout: -0.1,
            ..GptConfig::tiny()
        };
        assert!(cfg.validate().is_err());
    }
}
