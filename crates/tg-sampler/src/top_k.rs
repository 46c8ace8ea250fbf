use crate::sampler::{sort_by_logit_desc, Sampler, TokenLogit};
use rand::RngCore;

/// Filter that keeps the `k` highest-logit candidates. k = 0 disables it.
pub struct TopKSampler {
    k: usize,
}

impl TopKSampler {
    pub fn new(k: usize) -> Self {
        Self { k }
    }
}

impl Sampler for TopKSampler {
    fn name(&self) -> &str {
        "top_k"
    }

    fn apply(&self, logits: &mut Vec<TokenLogit>, _rng: &mut dyn RngCore) {
        if self.k == 0 || self.k >= logits.len() {
            return;
        }
        sort_by_logit_desc(logits);
        logits.truncate(self.k);
    }
}
