use rand::rngs::StdRng;
use rand::Rng;
use tg_tensor::{Shape, Tensor};

use crate::config::GptConfig;
use crate::dropout::Dropout;
use crate::error::{ModelError, Result};
use crate::linear::gaussian;

/// Token and position embedding.
///
/// Every (batch, position) pair maps to the sum of its token embedding and
/// its position embedding, followed by dropout. Position indices are derived
/// from the sequence length of the current call, never from an earlier one.
pub struct Embedding {
    /// Token embedding table, shape [vocab_size, dim_model].
    pub token_table: Tensor,
    /// Position embedding table, shape [max_seq_len, dim_model].
    pub position_table: Tensor,
    dropout: Dropout,
    dim_model: usize,
    vocab_size: usize,
    max_seq_len: usize,
}

impl Embedding {
    /// Create both tables with weights drawn from N(0, 0.02^2).
    pub fn init(config: &GptConfig, rng: &mut StdRng) -> Self {
        let c = config.dim_model;
        let token_table = Tensor::new(
            gaussian(config.vocab_size * c, rng),
            Shape::new(vec![config.vocab_size, c]),
        );
        let position_table = Tensor::new(
            gaussian(config.max_seq_len * c, rng),
            Shape::new(vec![config.max_seq_len, c]),
        );
        Embedding {
            token_table,
            position_table,
            dropout: Dropout::new(config.embedding_dropout, rng.gen()),
            dim_model: c,
            vocab_size: config.vocab_size,
            max_seq_len: config.max_seq_len,
        }
    }

    /// Embed a flat [batch * seq] id buffer into [batch, seq, dim_model].
    pub fn forward(
        &mut self,
        ids: &[u32],
        batch: usize,
        seq: usize,
        training: bool,
    ) -> Result<Tensor> {
        if seq > self.max_seq_len {
            return Err(ModelError::SequenceTooLong {
                len: seq,
                max: self.max_seq_len,
            });
        }
        debug_assert_eq!(ids.len(), batch * seq);

        let c = self.dim_model;
        let tokens = self.token_table.data_f32();
        let positions = self.position_table.data_f32();
        let mut out = vec![0.0f32; batch * seq * c];

        for b in 0..batch {
            for t in 0..seq {
                let id = ids[b * seq + t];
                if id as usize >= self.vocab_size {
                    return Err(ModelError::TokenOutOfRange {
                        id,
                        vocab: self.vocab_size,
                    });
                }
                let tok_off = id as usize * c;
                let pos_off = t * c;
                let out_off = (b * seq + t) * c;
                for i in 0..c {
                    out[out_off + i] = tokens[tok_off + i] + positions[pos_off + i];
                }
            }
        }

        self.dropout.apply(&mut out, training);
        Ok(Tensor::new(out, Shape::new(vec![batch, seq, c])))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn embedding() -> Embedding {
        let mut rng = StdRng::seed_from_u64(0);
        Embedding::init(&GptConfig::tiny(), &mut rng)
    }

    #[test]
    fn test_output_shape() {
        let mut emb = embedding();
        let ids = vec![1, 2, 3, 4, 5, 6];
        let out = emb.forward(&ids, 2, 3, false).unwrap();
        assert_eq!(out.shape().dims(), &[2, 3, 32]);
    }

    #[test]
    fn test_sums_token_and_position_rows() {
        let mut emb = embedding();
        let c = 32;
        let out = emb.forward(&[7, 7], 1, 2, false).unwrap();
        let data = out.data_f32();
        let tok = &emb.token_table.data_f32()[7 * c..8 * c];
        let pos = emb.position_table.data_f32();

        // Same token at positions 0 and 1 differs only by the position row.
        for i in 0..c {
            assert_eq!(data[i], tok[i] + pos[i]);
            assert_eq!(data[c + i], tok[i] + pos[c + i]);
        }
    }

    #[test]
    fn test_rejects_out_of_range_token() {
        let mut emb = embedding();
        let err = emb.forward(&[128], 1, 1, false).unwrap_err();
        assert!(matches!(err, ModelError::TokenOutOfRange { id: 128, .. }));
    }

    #[test]
    fn test_rejects_sequence_beyond_window() {
        let mut emb = embedding();
        let ids = vec![0; 17];
        let err = emb.forward(&ids, 1, 17, false).unwrap_err();
        assert!(matches!(err, ModelError::SequenceTooLong { len: 17, max: 16 }));
    }

    #[test]
    fn test_eval_mode_is_deterministic() {
        let mut emb = embedding();
        let a = emb.forward(&[3, 9], 1, 2, false).unwrap();
        let b = emb.forward(&[3, 9], 1, 2, false).unwrap();
        assert_eq!(a.data_f32(), b.data_f32());
    }
}
