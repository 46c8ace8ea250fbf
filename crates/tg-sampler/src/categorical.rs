use crate::sampler::{softmax_probs, Sampler, TokenLogit};
use rand::distributions::{Distribution, WeightedIndex};
use rand::RngCore;

/// Selector that softmaxes the surviving candidates and draws one of them,
/// advancing the RNG supplied by the caller.
pub struct CategoricalSampler;

impl CategoricalSampler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for CategoricalSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for CategoricalSampler {
    fn name(&self) -> &str {
        "categorical"
    }

    fn apply(&self, logits: &mut Vec<TokenLogit>, rng: &mut dyn RngCore) {
        if logits.is_empty() {
            return;
        }

        let probs = softmax_probs(logits);
        let selected = match WeightedIndex::new(&probs) {
            Ok(dist) => dist.sample(rng),
            // Degenerate weights (all zero or non-finite): fall back to the
            // first candidate.
            Err(_) => 0,
        };

        let chosen = logits[selected].clone();
        logits.clear();
        logits.push(chosen);
    }
}
