use crate::sampler::{sort_by_logit_desc, Sampler, TokenLogit};
use rand::RngCore;

/// Selector that keeps the single highest-logit candidate.
pub struct GreedySampler;

impl GreedySampler {
    pub fn new() -> Self {
        Self
    }
}

impl Default for GreedySampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for GreedySampler {
    fn name(&self) -> &str {
        "greedy"
    }

    fn apply(&self, logits: &mut Vec<TokenLogit>, _rng: &mut dyn RngCore) {
        if logits.is_empty() {
            return;
        }
        sort_by_logit_desc(logits);
        logits.truncate(1);
    }
}
