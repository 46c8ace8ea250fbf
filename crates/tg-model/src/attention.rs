use std::collections::HashMap;

use rand::rngs::StdRng;
use rand::Rng;
use tg_tensor::{ComputeBackend, Shape, Tensor};

use crate::config::GptConfig;
use crate::dropout::Dropout;
use crate::error::{ModelError, Result};
use crate::linear::Linear;
use crate::rotary::RotaryEncoding;

/// A single causal self-attention head.
///
/// Projects the input to per-head queries, keys, and values, rotates queries
/// and keys with rotary encoding, and attends with scores scaled by the
/// inverse square root of the head width.
pub struct AttentionHead {
    /// Query projection, shape [dim_model, head_dim].
    pub query: Linear,
    /// Key projection, shape [dim_model, head_dim].
    pub key: Linear,
    /// Value projection, shape [dim_model, head_dim].
    pub value: Linear,
    rotary: RotaryEncoding,
    dropout: Dropout,
    head_dim: usize,
}

impl AttentionHead {
    pub fn init(config: &GptConfig, rng: &mut StdRng) -> Self {
        let head_dim = config.head_dim();
        AttentionHead {
            query: Linear::init(config.dim_model, head_dim, rng),
            key: Linear::init(config.dim_model, head_dim, rng),
            value: Linear::init(config.dim_model, head_dim, rng),
            rotary: RotaryEncoding::new(head_dim, config.rope_base),
            dropout: Dropout::new(config.head_dropout, rng.gen()),
            head_dim,
        }
    }

    /// Attend over a flattened [batch * seq, dim_model] input.
    ///
    /// `mask` is the additive [seq, seq] causal mask supplied by the owning
    /// multi-head layer. Returns the head output as a flat
    /// [batch * seq, head_dim] buffer.
    fn attend(
        &mut self,
        x: &Tensor,
        mask: &[f32],
        batch: usize,
        seq: usize,
        backend: &dyn ComputeBackend,
        training: bool,
    ) -> Result<Vec<f32>> {
        let ch = self.head_dim;

        // Project, then rotate queries and keys in place.
        let mut q = self.query.forward(x, backend)?;
        let mut k = self.key.forward(x, backend)?;
        let v = self.value.forward(x, backend)?;
        self.rotary.apply(q.data_f32_mut(), batch, seq);
        self.rotary.apply(k.data_f32_mut(), batch, seq);

        let scale = 1.0 / (ch as f32).sqrt();
        let q_data = q.data_f32();
        let k_data = k.data_f32();
        let v_data = v.data_f32();

        let mut out = vec![0.0f32; batch * seq * ch];
        for b in 0..batch {
            let span = b * seq * ch;
            let q_b = &q_data[span..span + seq * ch];
            let k_b = &k_data[span..span + seq * ch];
            let v_b = &v_data[span..span + seq * ch];

            // Scores [seq, seq]: (q @ k^T) / sqrt(head_dim), masked, softmaxed.
            let scores = backend
                .matmul_nt(q_b, k_b, seq, ch, seq)
                .map_err(|e| ModelError::Other(format!("attention scores failed: {}", e)))?;
            let scaled = backend
                .scale(&scores, scale)
                .map_err(|e| ModelError::Other(format!("attention scale failed: {}", e)))?;
            let masked = backend
                .add(&scaled, mask)
                .map_err(|e| ModelError::Other(format!("attention mask failed: {}", e)))?;
            let mut probs = backend
                .softmax(&masked, seq)
                .map_err(|e| ModelError::Other(format!("attention softmax failed: {}", e)))?;
            self.dropout.apply(&mut probs, training);

            // Weighted sum of values: [seq, seq] @ [seq, head_dim].
            let ctx = backend
                .matmul(&probs, v_b, seq, seq, ch)
                .map_err(|e| ModelError::Other(format!("attention context failed: {}", e)))?;
            out[span..span + seq * ch].copy_from_slice(&ctx);
        }

        Ok(out)
    }
}

/// Multi-head causal self-attention.
///
/// Runs every head over the same input, concatenates the head outputs along
/// the channel axis, and applies a single learned output projection followed
/// by dropout. Owns the additive causal masks, cached per sequence length.
pub struct MultiHeadAttention {
    /// Attention heads, one slice of the channel axis each.
    pub heads: Vec<AttentionHead>,
    /// Output projection, shape [dim_model, dim_model].
    pub proj: Linear,
    dropout: Dropout,
    head_dim: usize,
    masks: HashMap<usize, Vec<f32>>,
}

impl MultiHeadAttention {
    pub fn init(config: &GptConfig, rng: &mut StdRng) -> Self {
        let heads = (0..config.num_heads)
            .map(|_| AttentionHead::init(config, rng))
            .collect();
        MultiHeadAttention {
            heads,
            proj: Linear::init(config.dim_model, config.dim_model, rng),
            dropout: Dropout::new(config.multi_head_dropout, rng.gen()),
            head_dim: config.head_dim(),
            masks: HashMap::new(),
        }
    }

    /// Attend over a [batch, seq, dim_model] input. Shape is preserved.
    pub fn forward(
        &mut self,
        x: &Tensor,
        backend: &dyn ComputeBackend,
        training: bool,
    ) -> Result<Tensor> {
        let dims = x.shape().dims();
        if dims.len() != 3 {
            return Err(ModelError::Other(format!(
                "attention expects [batch, seq, dim] input, got {}",
                x.shape()
            )));
        }
        let (batch, seq, c) = (dims[0], dims[1], dims[2]);
        let rows = batch * seq;
        let flat = x.reshape(Shape::new(vec![rows, c]))?;

        if !self.masks.contains_key(&seq) {
            self.masks.insert(seq, causal_mask(seq));
        }
        let mask = &self.masks[&seq];

        // Each head fills its own slice of the channel axis.
        let ch = self.head_dim;
        let mut concat = vec![0.0f32; rows * c];
        for (h, head) in self.heads.iter_mut().enumerate() {
            let head_out = head.attend(&flat, mask, batch, seq, backend, training)?;
            for row in 0..rows {
                concat[row * c + h * ch..row * c + (h + 1) * ch]
                    .copy_from_slice(&head_out[row * ch..(row + 1) * ch]);
            }
        }

        let mut projected = self
            .proj
            .forward(&Tensor::new(concat, Shape::new(vec![rows, c])), backend)?;
        self.dropout.apply(projected.data_f32_mut(), training);
        Ok(projected.reshape(Shape::new(vec![batch, seq, c]))?)
    }
}

/// Additive causal mask: 0 on and below the diagonal, -inf above.
fn causal_mask(seq: usize) -> Vec<f32> {
    let mut mask = vec![0.0f32; seq * seq];
    for i in 0..seq {
        for j in (i + 1)..seq {
            mask[i * seq + j] = f32::NEG_INFINITY;
        }
    }
    mask
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::linear::gaussian;
    use rand::SeedableRng;
    use tg_tensor::CpuBackend;

    const C: usize = 32;

    fn mha(seed: u64) -> MultiHeadAttention {
        let mut rng = StdRng::seed_from_u64(seed);
        MultiHeadAttention::init(&GptConfig::tiny(), &mut rng)
    }

    fn input(seed: u64, batch: usize, seq: usize) -> Tensor {
        let mut rng = StdRng::seed_from_u64(seed);
        Tensor::new(
            gaussian(batch * seq * C, &mut rng),
            Shape::new(vec![batch, seq, C]),
        )
    }

    #[test]
    fn test_causal_mask_layout() {
        let m = causal_mask(3);
        assert_eq!(m[0], 0.0);
        assert_eq!(m[1], f32::NEG_INFINITY);
        assert_eq!(m[2], f32::NEG_INFINITY);
        assert_eq!(m[3], 0.0);
        assert_eq!(m[4], 0.0);
        assert_eq!(m[5], f32::NEG_INFINITY);
        assert!(m[6..9].iter().all(|&v| v == 0.0));
    }

    #[test]
    fn test_output_shape_preserved() {
        let backend = CpuBackend::new();
        let mut layer = mha(0);
        let x = input(1, 2, 5);
        let y = layer.forward(&x, &backend, false).unwrap();
        assert_eq!(y.shape().dims(), &[2, 5, C]);
    }

    #[test]
    fn test_rejects_non_3d_input() {
        let backend = CpuBackend::new();
        let mut layer = mha(0);
        let x = Tensor::zeros(Shape::new(vec![4, C]));
        assert!(layer.forward(&x, &backend, false).is_err());
    }

    #[test]
    fn test_future_positions_do_not_affect_past() {
        let backend = CpuBackend::new();
        let mut layer = mha(2);
        let seq = 6;

        let x = input(3, 1, seq);
        let mut perturbed_data = x.data_f32().to_vec();
        for v in &mut perturbed_data[(seq - 1) * C..] {
            *v += 1.0;
        }
        let perturbed = Tensor::new(perturbed_data, Shape::new(vec![1, seq, C]));

        let y_base = layer.forward(&x, &backend, false).unwrap();
        let y_pert = layer.forward(&perturbed, &backend, false).unwrap();

        // Changing the final position leaves every earlier position untouched.
        let base = y_base.data_f32();
        let pert = y_pert.data_f32();
        assert_eq!(&base[..(seq - 1) * C], &pert[..(seq - 1) * C]);
        assert_ne!(&base[(seq - 1) * C..], &pert[(seq - 1) * C..]);
    }

    #[test]
    fn test_mask_cache_keyed_by_length() {
        let backend = CpuBackend::new();

        // One layer sees lengths 4 then 2; a same-seed layer sees 2 directly.
        let mut warmed = mha(5);
        let long = input(6, 1, 4);
        warmed.forward(&long, &backend, false).unwrap();

        let short = input(7, 1, 2);
        let warmed_out = warmed.forward(&short, &backend, false).unwrap();

        let mut fresh = mha(5);
        let fresh_out = fresh.forward(&short, &backend, false).unwrap();

        assert_eq!(warmed_out.data_f32(), fresh_out.data_f32());
    }
}
