use rand::rngs::StdRng;
use rand::SeedableRng;
use tg_tensor::{ComputeBackend, CpuBackend, Shape, Tensor};

use crate::block::TransformerBlock;
use crate::config::GptConfig;
use crate::embedding::Embedding;
use crate::error::{ModelError, Result};
use crate::linear::Linear;
use crate::norm::LayerNorm;

/// Decoder-only GPT language model.
///
/// The forward pass embeds a batch of token ids, runs the transformer blocks,
/// normalizes, and projects to vocabulary logits. Inputs longer than the
/// model's context window are trimmed to their trailing window before
/// embedding, so position ids always fit the position table.
pub struct GptModel {
    config: GptConfig,
    backend: Box<dyn ComputeBackend>,
    /// Token and position embedding stage.
    pub embedding: Embedding,
    /// Transformer blocks, applied in order.
    pub blocks: Vec<TransformerBlock>,
    /// Normalization applied after the last block.
    pub final_norm: LayerNorm,
    /// Vocabulary projection, shape [dim_model, vocab_size].
    pub lm_head: Linear,
    training: bool,
}

impl GptModel {
    /// Build a model with freshly sampled weights and an entropy seed.
    pub fn new(config: GptConfig) -> Result<Self> {
        Self::with_seed(config, rand::random())
    }

    /// Build a model with weights sampled from a seeded generator. The same
    /// config and seed always produce the same weights.
    pub fn with_seed(config: GptConfig, seed: u64) -> Result<Self> {
        config.validate()?;
        let mut rng = StdRng::seed_from_u64(seed);

        let embedding = Embedding::init(&config, &mut rng);
        let blocks = (0..config.num_layers)
            .map(|_| TransformerBlock::init(&config, &mut rng))
            .collect();
        let final_norm = LayerNorm::new(config.dim_model, config.norm_eps);
        let lm_head = Linear::init(config.dim_model, config.vocab_size, &mut rng);

        Ok(GptModel {
            config,
            backend: Box::new(CpuBackend::new()),
            embedding,
            blocks,
            final_norm,
            lm_head,
            training: false,
        })
    }

    pub fn config(&self) -> &GptConfig {
        &self.config
    }

    pub fn vocab_size(&self) -> usize {
        self.config.vocab_size
    }

    /// Whether dropout layers are active.
    pub fn training(&self) -> bool {
        self.training
    }

    /// Switch dropout layers on (training) or off (inference).
    pub fn set_training(&mut self, training: bool) {
        self.training = training;
    }

    /// Run the forward pass over a batch of token rows.
    ///
    /// Every row must hold the same number of ids. Rows longer than the
    /// context window contribute only their trailing window. Returns logits
    /// shaped [batch, seq, vocab_size] where seq is the embedded length.
    pub fn forward(&mut self, tokens: &[Vec<u32>]) -> Result<Tensor> {
        let (flat, batch, seq) = self.window(tokens)?;
        let backend = self.backend.as_ref();
        let training = self.training;

        // Step 1: Token and position embeddings, [batch, seq, dim_model].
        let mut x = self.embedding.forward(&flat, batch, seq, training)?;

        // Step 2: Transformer blocks.
        for block in self.blocks.iter_mut() {
            x = block.forward(&x, backend, training)?;
        }

        // Step 3: Final norm.
        let x = self.final_norm.forward(&x, backend)?;

        // Step 4: Project to vocabulary logits, [batch, seq, vocab_size].
        let rows = batch * seq;
        let flat = x.reshape(Shape::new(vec![rows, self.config.dim_model]))?;
        let logits = self.lm_head.forward(&flat, backend)?;
        Ok(logits.reshape(Shape::new(vec![batch, seq, self.config.vocab_size]))?)
    }

    /// Validate the batch and flatten it, keeping at most the trailing
    /// `max_seq_len` ids of each row.
    fn window(&self, tokens: &[Vec<u32>]) -> Result<(Vec<u32>, usize, usize)> {
        if tokens.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        let full = tokens[0].len();
        if full == 0 {
            return Err(ModelError::EmptyBatch);
        }
        for (row, ids) in tokens.iter().enumerate() {
            if ids.len() != full {
                return Err(ModelError::RaggedBatch {
                    row,
                    len: ids.len(),
                    expected: full,
                });
            }
        }

        let seq = full.min(self.config.max_seq_len);
        let mut flat = Vec::with_capacity(tokens.len() * seq);
        for ids in tokens {
            flat.extend_from_slice(&ids[full - seq..]);
        }
        Ok((flat, tokens.len(), seq))
    }
}
