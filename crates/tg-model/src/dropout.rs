use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Inverted dropout.
///
/// In training mode each element is zeroed with probability `p` and the
/// survivors are scaled by 1 / (1 - p), keeping the expected activation
/// unchanged. Outside training mode (and at p = 0) the layer is an identity.
pub struct Dropout {
    p: f32,
    rng: StdRng,
}

impl Dropout {
    /// Create a dropout layer with probability `p` and its own mask RNG.
    pub fn new(p: f32, seed: u64) -> Self {
        Dropout {
            p,
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Apply dropout to `data` in place.
    pub fn apply(&mut self, data: &mut [f32], training: bool) {
        if !training || self.p <= 0.0 {
            return;
        }
        let keep_scale = 1.0 / (1.0 - self.p);
        for v in data.iter_mut() {
            if self.rng.gen::<f32>() < self.p {
                *v = 0.0;
            } else {
                *v *= keep_scale;
            }
        }
    }
}
