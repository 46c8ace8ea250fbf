use rand::RngCore;

/// A token ID paired with its logit value.
#[derive(Debug, Clone)]
pub struct TokenLogit {
    pub token_id: u32,
    pub logit: f32,
}

/// Trait for samplers that modify or select from a set of token logits.
///
/// The RNG is threaded through every stage so that a multi-step generation
/// run draws from one evolving random stream instead of repeating the same
/// draw each step. Filter stages simply ignore it.
pub trait Sampler: Send + Sync {
    /// Returns the name of this sampler.
    fn name(&self) -> &str;

    /// Modify logits in-place (filtering, scaling, selecting).
    fn apply(&self, logits: &mut Vec<TokenLogit>, rng: &mut dyn RngCore);
}

/// Sort candidates by logit, highest first. NaN logits compare as equal.
pub(crate) fn sort_by_logit_desc(logits: &mut [TokenLogit]) {
    logits.sort_by(|a, b| {
        b.logit
            .partial_cmp(&a.logit)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}

/// Softmax over the candidates' logits, in candidate order.
pub(crate) fn softmax_probs(logits: &[TokenLogit]) -> Vec<f32> {
    let max = logits
        .iter()
        .map(|t| t.logit)
        .fold(f32::NEG_INFINITY, f32::max);
    let exps: Vec<f32> = logits.iter().map(|t| (t.logit - max).exp()).collect();
    let sum: f32 = exps.iter().sum();
    exps.iter().map(|e| e / sum).collect()
}

/// Composes multiple samplers into a pipeline.
/// The last sampler in the chain should be a selector (greedy or categorical).
pub struct SamplerChain {
    samplers: Vec<Box<dyn Sampler>>,
}

impl SamplerChain {
    /// Create a new empty sampler chain.
    pub fn new() -> Self {
        Self {
            samplers: Vec::new(),
        }
    }

    /// Add a sampler to the end of the chain. Returns self for builder-style usage.
    pub fn with(mut self, sampler: Box<dyn Sampler>) -> Self {
        self.samplers.push(sampler);
        self
    }

    /// Run all samplers in order on raw logits, return the selected token ID.
    ///
    /// 1. Converts the `&[f32]` logits into `Vec<TokenLogit>` (token_id = index).
    /// 2. Applies each sampler in sequence.
    /// 3. Returns the first token's id (the selected one).
    pub fn sample(&self, logits: &[f32], rng: &mut dyn RngCore) -> u32 {
        let mut token_logits: Vec<TokenLogit> = logits
            .iter()
            .enumerate()
            .map(|(i, &logit)| TokenLogit {
                token_id: i as u32,
                logit,
            })
            .collect();

        for sampler in &self.samplers {
            sampler.apply(&mut token_logits, rng);
        }

        token_logits.first().map(|t| t.token_id).unwrap_or(0)
    }
}

impl Default for SamplerChain {
    fn default() -> Self {
        Self::new()
    }
}
