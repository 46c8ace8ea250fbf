use std::collections::HashMap;

/// Rotary positional encoding for one attention head.
///
/// Queries and keys are rotated by position-dependent angles so that the dot
/// product of a rotated query at position p with a rotated key at position q
/// depends only on the offset p - q. The fixed inverse-frequency vector is
/// inv_freq[i] = base^(-2i / head_dim) for i in [0, head_dim / 2).
///
/// Cos/sin tables are cached per sequence length: an unseen length gets a
/// fresh [seq, head_dim] pair, and no call order can observe a table built
/// for a different length.
pub struct RotaryEncoding {
    head_dim: usize,
    inv_freq: Vec<f32>,
    tables: HashMap<usize, (Vec<f32>, Vec<f32>)>,
}

impl RotaryEncoding {
    /// Create a rotary encoding for heads of width `head_dim` (must be even).
    pub fn new(head_dim: usize, base: f32) -> Self {
        let half = head_dim / 2;
        let inv_freq = (0..half)
            .map(|i| base.powf(-2.0 * i as f32 / head_dim as f32))
            .collect();
        RotaryEncoding {
            head_dim,
            inv_freq,
            tables: HashMap::new(),
        }
    }

    /// Rotate a [batch, seq, head_dim] buffer in place.
    ///
    /// Rows are rotated independently: position t within each batch row uses
    /// angle t * inv_freq[i] for the i-th half-vector lane. With x split into
    /// halves (x1, x2), the output is x * cos + (-x2, x1) * sin.
    pub fn apply(&mut self, x: &mut [f32], batch: usize, seq: usize) {
        let d = self.head_dim;
        let half = d / 2;
        debug_assert_eq!(x.len(), batch * seq * d);

        let (cos, sin) = self.tables_for(seq);
        for b in 0..batch {
            for t in 0..seq {
                let off = (b * seq + t) * d;
                let row = &mut x[off..off + d];
                let tbl = t * d;
                for i in 0..half {
                    let x1 = row[i];
                    let x2 = row[half + i];
                    row[i] = x1 * cos[tbl + i] - x2 * sin[tbl + i];
                    row[half + i] = x2 * cos[tbl + half + i] + x1 * sin[tbl + half + i];
                }
            }
        }
    }

    /// Cos/sin tables of shape [seq, head_dim], built on first use of `seq`.
    ///
    /// Each table row holds the half-width angle vector duplicated to full
    /// head width, matching the half-vector rotation layout.
    fn tables_for(&mut self, seq: usize) -> (&[f32], &[f32]) {
        if !self.tables.contains_key(&seq) {
            let d = self.head_dim;
            let half = d / 2;
            let mut cos = vec![0.0f32; seq * d];
            let mut sin = vec![0.0f32; seq * d];
            for t in 0..seq {
                for i in 0..half {
                    let angle = t as f32 * self.inv_freq[i];
                    let (s, c) = angle.sin_cos();
                    cos[t * d + i] = c;
                    cos[t * d + half + i] = c;
                    sin[t * d + i] = s;
                    sin[t * d + half + i] = s;
                }
            }
            self.tables.insert(seq, (cos, sin));
        }
        let (cos, sin) = &self.tables[&seq];
        (cos.as_slice(), sin.as_slice())
    }
}
