use crate::sampler::{softmax_probs, sort_by_logit_desc, Sampler, TokenLogit};
use rand::RngCore;

/// Nucleus filter: keeps the smallest prefix of the probability-sorted
/// candidates whose cumulative mass exceeds `p`. At least one candidate
/// always survives.
pub struct TopPSampler {
    p: f32,
}

impl TopPSampler {
    pub fn new(p: f32) -> Self {
        Self { p }
    }
}

impl Sampler for TopPSampler {
    fn name(&self) -> &str {
        "top_p"
    }

    fn apply(&self, logits: &mut Vec<TokenLogit>, _rng: &mut dyn RngCore) {
        if logits.is_empty() {
            return;
        }

        sort_by_logit_desc(logits);
        let probs = softmax_probs(logits);

        let mut cumulative = 0.0f32;
        let cutoff = probs
            .iter()
            .position(|&prob| {
                cumulative += prob;
                cumulative > self.p
            })
            .map(|i| i + 1)
            .unwrap_or(logits.len());

        logits.truncate(cutoff.max(1));
    }
}
