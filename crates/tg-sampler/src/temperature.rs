use crate::sampler::{Sampler, TokenLogit};
use rand::RngCore;

/// Divides every logit by a temperature.
///
/// Temperatures above 1.0 flatten the distribution toward uniform; values
/// below 1.0 sharpen it toward the argmax.
pub struct TemperatureSampler {
    temperature: f32,
}

impl TemperatureSampler {
    pub fn new(temperature: f32) -> Self {
        Self { temperature }
    }
}

impl Sampler for TemperatureSampler {
    fn name(&self) -> &str {
        "temperature"
    }

    fn apply(&self, logits: &mut Vec<TokenLogit>, _rng: &mut dyn RngCore) {
        // Non-positive temperatures clamp to a tiny value, which behaves
        // like an argmax.
        let temp = self.temperature.max(1e-7);
        for token in logits.iter_mut() {
            token.logit /= temp;
        }
    }
}
