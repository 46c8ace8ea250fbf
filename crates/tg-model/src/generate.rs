use rand::rngs::StdRng;
use rand::SeedableRng;
use tg_sampler::{
    CategoricalSampler, GreedySampler, SamplerChain, TemperatureSampler, TopKSampler, TopPSampler,
};

use crate::error::{ModelError, Result};
use crate::model::GptModel;

/// Knobs for the sampling stage of generation.
#[derive(Debug, Clone)]
pub struct SampleOptions {
    /// Logit temperature, applied before any filtering. 1.0 is neutral.
    pub temperature: f32,
    /// Keep only the k highest-logit tokens. 0 disables the filter.
    pub top_k: usize,
    /// Keep the smallest set of tokens whose probability mass reaches p.
    /// 1.0 disables the filter.
    pub top_p: f32,
    /// Select the argmax instead of drawing from the distribution.
    pub greedy: bool,
    /// Seed for the sampling stream. None seeds from entropy.
    pub seed: Option<u64>,
    /// Token that marks a row as finished once generated.
    pub stop_token: Option<u32>,
}

impl Default for SampleOptions {
    fn default() -> Self {
        SampleOptions {
            temperature: 1.0,
            top_k: 0,
            top_p: 1.0,
            greedy: false,
            seed: None,
            stop_token: None,
        }
    }
}

/// Mutable state of one generation run: the growing token rows plus
/// per-row completion flags.
#[derive(Debug)]
pub struct GenerationState {
    tokens: Vec<Vec<u32>>,
    finished: Vec<bool>,
    steps: usize,
}

impl GenerationState {
    pub fn new(seed_tokens: &[Vec<u32>]) -> Self {
        GenerationState {
            tokens: seed_tokens.to_vec(),
            finished: vec![false; seed_tokens.len()],
            steps: 0,
        }
    }

    pub fn tokens(&self) -> &[Vec<u32>] {
        &self.tokens
    }

    /// Number of advance calls so far.
    pub fn steps(&self) -> usize {
        self.steps
    }

    pub fn is_finished(&self, row: usize) -> bool {
        self.finished[row]
    }

    pub fn all_finished(&self) -> bool {
        self.finished.iter().all(|&f| f)
    }

    /// Append one token per row. Rows grow in lockstep, so a finished row
    /// keeps receiving the stop token as padding.
    pub fn advance(&mut self, next: Vec<u32>, stop_token: Option<u32>) {
        debug_assert_eq!(next.len(), self.tokens.len());
        for (row, token) in next.into_iter().enumerate() {
            self.tokens[row].push(token);
            if stop_token == Some(token) {
                self.finished[row] = true;
            }
        }
        self.steps += 1;
    }

    pub fn into_tokens(self) -> Vec<Vec<u32>> {
        self.tokens
    }
}

/// Assemble the sampler pipeline for the given options: temperature, then
/// filters, then a final selector.
fn build_chain(opts: &SampleOptions) -> SamplerChain {
    let mut chain = SamplerChain::new();
    if opts.temperature != 1.0 {
        chain = chain.with(Box::new(TemperatureSampler::new(opts.temperature)));
    }
    if opts.top_k > 0 {
        chain = chain.with(Box::new(TopKSampler::new(opts.top_k)));
    }
    if opts.top_p < 1.0 {
        chain = chain.with(Box::new(TopPSampler::new(opts.top_p)));
    }
    if opts.greedy {
        chain.with(Box::new(GreedySampler::new()))
    } else {
        chain.with(Box::new(CategoricalSampler::new()))
    }
}

impl GptModel {
    /// Autoregressively extend every row of `seed_tokens` by up to
    /// `max_new_tokens` sampled tokens.
    ///
    /// Each step feeds the grown rows back through the forward pass (windowed
    /// to the context length) and samples each row's next token from its
    /// final-position logits. With a stop token configured, a row that emits
    /// it stops sampling, and the run ends early once every row is finished.
    /// Dropout is forced off for the whole run; the previous training mode is
    /// restored before returning.
    pub fn generate(
        &mut self,
        seed_tokens: &[Vec<u32>],
        max_new_tokens: usize,
        opts: &SampleOptions,
    ) -> Result<Vec<Vec<u32>>> {
        let was_training = self.training();
        self.set_training(false);
        let result = self.run_generation(seed_tokens, max_new_tokens, opts);
        self.set_training(was_training);
        result
    }

    fn run_generation(
        &mut self,
        seed_tokens: &[Vec<u32>],
        max_new_tokens: usize,
        opts: &SampleOptions,
    ) -> Result<Vec<Vec<u32>>> {
        if seed_tokens.is_empty() {
            return Err(ModelError::EmptyBatch);
        }
        let chain = build_chain(opts);
        let mut rng = match opts.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let vocab = self.vocab_size();
        let mut state = GenerationState::new(seed_tokens);

        for _ in 0..max_new_tokens {
            if state.all_finished() {
                break;
            }
            let logits = self.forward(state.tokens())?;
            let dims = logits.shape().dims();
            let (batch, seq) = (dims[0], dims[1]);
            let data = logits.data_f32();

            let mut next = Vec::with_capacity(batch);
            for row in 0..batch {
                let token = if state.is_finished(row) {
                    // A row only finishes when stop_token is Some.
                    opts.stop_token.unwrap_or(0)
                } else {
                    let at = (row * seq + (seq - 1)) * vocab;
                    chain.sample(&data[at..at + vocab], &mut rng)
                };
                next.push(token);
            }
            state.advance(next, opts.stop_token);
        }

        Ok(state.into_tokens())
    }
}
