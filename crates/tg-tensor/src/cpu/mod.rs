use crate::backend::ComputeBackend;
use crate::error::{Result, TensorError};

/// Pure-Rust CPU compute backend.
///
/// Implements all operations with straightforward loops optimized for
/// correctness rather than peak performance. Intended as a reference
/// implementation and fallback.
#[derive(Debug, Clone)]
pub struct CpuBackend;

impl CpuBackend {
    pub fn new() -> Self {
        CpuBackend
    }
}

impl Default for CpuBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl ComputeBackend for CpuBackend {
    fn name(&self) -> &str {
        "cpu"
    }

    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        if a.len() != m * k {
            return Err(TensorError::Other(format!(
                "matmul: a.len()={} but expected m*k={}",
                a.len(),
                m * k
            )));
        }
        if b.len() != k * n {
            return Err(TensorError::Other(format!(
                "matmul: b.len()={} but expected k*n={}",
                b.len(),
                k * n
            )));
        }

        let mut c = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0f32;
                for p in 0..k {
                    sum += a[i * k + p] * b[p * n + j];
                }
                c[i * n + j] = sum;
            }
        }
        Ok(c)
    }

    fn matmul_nt(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>> {
        if a.len() != m * k {
            return Err(TensorError::Other(format!(
                "matmul_nt: a.len()={} but expected m*k={}",
                a.len(),
                m * k
            )));
        }
        if b.len() != n * k {
            return Err(TensorError::Other(format!(
                "matmul_nt: b.len()={} but expected n*k={}",
                b.len(),
                n * k
            )));
        }

        let mut c = vec![0.0f32; m * n];
        for i in 0..m {
            for j in 0..n {
                let mut sum = 0.0f32;
                for p in 0..k {
                    sum += a[i * k + p] * b[j * k + p];
                }
                c[i * n + j] = sum;
            }
        }
        Ok(c)
    }

    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>> {
        if a.len() != b.len() {
            return Err(TensorError::ShapeMismatch {
                expected: vec![a.len()],
                got: vec![b.len()],
            });
        }
        Ok(a.iter().zip(b.iter()).map(|(x, y)| x + y).collect())
    }

    fn scale(&self, a: &[f32], s: f32) -> Result<Vec<f32>> {
        Ok(a.iter().map(|x| x * s).collect())
    }

    fn layer_norm(
        &self,
        x: &[f32],
        gamma: &[f32],
        beta: &[f32],
        eps: f32,
        hidden_size: usize,
    ) -> Result<Vec<f32>> {
        if gamma.len() != hidden_size {
            return Err(TensorError::Other(format!(
                "layer_norm: gamma.len()={} but hidden_size={}",
                gamma.len(),
                hidden_size
            )));
        }
        if beta.len() != hidden_size {
            return Err(TensorError::Other(format!(
                "layer_norm: beta.len()={} but hidden_size={}",
                beta.len(),
                hidden_size
            )));
        }
        if hidden_size == 0 || x.len() % hidden_size != 0 {
            return Err(TensorError::Other(format!(
                "layer_norm: x.len()={} is not a multiple of hidden_size={}",
                x.len(),
                hidden_size
            )));
        }

        let n_rows = x.len() / hidden_size;
        let mut result = vec![0.0f32; x.len()];

        for row in 0..n_rows {
            let offset = row * hidden_size;
            let row_data = &x[offset..offset + hidden_size];

            let mean: f32 = row_data.iter().sum::<f32>() / hidden_size as f32;
            let var: f32 = row_data
                .iter()
                .map(|v| (v - mean) * (v - mean))
                .sum::<f32>()
                / hidden_size as f32;
            let inv_std = 1.0 / (var + eps).sqrt();

            for i in 0..hidden_size {
                result[offset + i] = (row_data[i] - mean) * inv_std * gamma[i] + beta[i];
            }
        }

        Ok(result)
    }

    fn softmax(&self, x: &[f32], chunk_size: usize) -> Result<Vec<f32>> {
        if chunk_size == 0 {
            return Err(TensorError::Other(
                "softmax: chunk_size must be > 0".to_string(),
            ));
        }
        if x.len() % chunk_size != 0 {
            return Err(TensorError::Other(format!(
                "softmax: x.len()={} is not a multiple of chunk_size={}",
                x.len(),
                chunk_size
            )));
        }

        let n_chunks = x.len() / chunk_size;
        let mut result = vec![0.0f32; x.len()];

        for chunk in 0..n_chunks {
            let offset = chunk * chunk_size;
            let chunk_data = &x[offset..offset + chunk_size];

            // Find max for numerical stability
            let max_val = chunk_data
                .iter()
                .copied()
                .fold(f32::NEG_INFINITY, f32::max);

            // Compute exp(x - max) and sum
            let mut sum = 0.0f32;
            for i in 0..chunk_size {
                let e = (chunk_data[i] - max_val).exp();
                result[offset + i] = e;
                sum += e;
            }

            // Normalize
            for i in 0..chunk_size {
                result[offset + i] /= sum;
            }
        }

        Ok(result)
    }

    fn gelu(&self, x: &[f32]) -> Result<Vec<f32>> {
        const SQRT_2_OVER_PI: f32 = 0.797_884_6;
        Ok(x.iter()
            .map(|&v| {
                let inner = SQRT_2_OVER_PI * (v + 0.044715 * v * v * v);
                0.5 * v * (1.0 + inner.tanh())
            })
            .collect())
    }

    fn relu(&self, x: &[f32]) -> Result<Vec<f32>> {
        Ok(x.iter().map(|&v| v.max(0.0)).collect())
    }

    fn silu(&self, x: &[f32]) -> Result<Vec<f32>> {
        Ok(x.iter().map(|&v| v / (1.0 + (-v).exp())).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn backend() -> CpuBackend {
        CpuBackend::new()
    }

    #[test]
    fn test_name() {
        assert_eq!(backend().name(), "cpu");
    }

    #[test]
    fn test_matmul_identity() {
        let b = backend();
        // 2x2 identity @ [1,2;3,4]
        let a = vec![1.0, 0.0, 0.0, 1.0];
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let c = b.matmul(&a, &x, 2, 2, 2).unwrap();
        assert_eq!(c, vec![1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_matmul_basic() {
        let b = backend();
        // [1,2;3,4] @ [5,6;7,8] = [19,22;43,50]
        let a = vec![1.0, 2.0, 3.0, 4.0];
        let x = vec![5.0, 6.0, 7.0, 8.0];
        let c = b.matmul(&a, &x, 2, 2, 2).unwrap();
        assert_eq!(c, vec![19.0, 22.0, 43.0, 50.0]);
    }

    #[test]
    fn test_matmul_nt_matches_explicit_transpose() {
        let b = backend();
        // a: [2x3], bt: [2x3] interpreted as the transpose of a [3x2] b
        let a = vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0];
        let bt = vec![1.0, 0.0, 2.0, 0.0, 1.0, 3.0];
        // b (transposed back) is [1,0;0,1;2,3], so a @ b = [7,11;16,23]
        let transposed = vec![1.0, 0.0, 0.0, 1.0, 2.0, 3.0];
        let via_nt = b.matmul_nt(&a, &bt, 2, 3, 2).unwrap();
        let via_plain = b.matmul(&a, &transposed, 2, 3, 2).unwrap();
        assert_eq!(via_nt, via_plain);
        assert_eq!(via_nt, vec![7.0, 11.0, 16.0, 23.0]);
    }

    #[test]
    fn test_matmul_bad_lengths() {
        let b = backend();
        assert!(b.matmul(&[1.0], &[1.0, 2.0], 2, 2, 2).is_err());
        assert!(b.matmul_nt(&[1.0, 2.0], &[1.0], 1, 2, 1).is_err());
    }

    #[test]
    fn test_add() {
        let b = backend();
        let r = b.add(&[1.0, 2.0], &[3.0, 4.0]).unwrap();
        assert_eq!(r, vec![4.0, 6.0]);
    }

    #[test]
    fn test_add_length_mismatch() {
        let b = backend();
        assert!(b.add(&[1.0], &[1.0, 2.0]).is_err());
    }

    #[test]
    fn test_scale() {
        let b = backend();
        let r = b.scale(&[1.0, 2.0, 3.0], 2.0).unwrap();
        assert_eq!(r, vec![2.0, 4.0, 6.0]);
    }

    #[test]
    fn test_layer_norm_unit_gamma() {
        let b = backend();
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let gamma = vec![1.0; 4];
        let beta = vec![0.0; 4];
        let r = b.layer_norm(&x, &gamma, &beta, 1e-5, 4).unwrap();
        // mean = 2.5, var = 1.25, std ~= 1.1180
        assert_relative_eq!(r[0], -1.3416, epsilon = 1e-3);
        assert_relative_eq!(r[1], -0.4472, epsilon = 1e-3);
        assert_relative_eq!(r[2], 0.4472, epsilon = 1e-3);
        assert_relative_eq!(r[3], 1.3416, epsilon = 1e-3);
        // Normalized rows are zero-mean
        let sum: f32 = r.iter().sum();
        assert_relative_eq!(sum, 0.0, epsilon = 1e-5);
    }

    #[test]
    fn test_layer_norm_gamma_beta() {
        let b = backend();
        let x = vec![1.0, 2.0, 3.0, 4.0];
        let gamma = vec![2.0; 4];
        let beta = vec![1.0; 4];
        let plain = b.layer_norm(&x, &[1.0; 4], &[0.0; 4], 1e-5, 4).unwrap();
        let scaled = b.layer_norm(&x, &gamma, &beta, 1e-5, 4).unwrap();
        for i in 0..4 {
            assert_relative_eq!(scaled[i], plain[i] * 2.0 + 1.0, epsilon = 1e-5);
        }
    }

    #[test]
    fn test_layer_norm_multiple_rows() {
        let b = backend();
        // Two rows normalized independently
        let x = vec![1.0, 3.0, -2.0, 2.0];
        let r = b.layer_norm(&x, &[1.0, 1.0], &[0.0, 0.0], 1e-5, 2).unwrap();
        assert_relative_eq!(r[0], -r[1], epsilon = 1e-5);
        assert_relative_eq!(r[2], -r[3], epsilon = 1e-5);
    }

    #[test]
    fn test_layer_norm_bad_sizes() {
        let b = backend();
        assert!(b.layer_norm(&[1.0, 2.0, 3.0], &[1.0, 1.0], &[0.0, 0.0], 1e-5, 2).is_err());
        assert!(b.layer_norm(&[1.0, 2.0], &[1.0], &[0.0, 0.0], 1e-5, 2).is_err());
    }

    #[test]
    fn test_softmax() {
        let b = backend();
        let r = b.softmax(&[1.0, 2.0, 3.0], 3).unwrap();
        let sum: f32 = r.iter().sum();
        assert_relative_eq!(sum, 1.0, epsilon = 1e-6);
        // Values should be monotonically increasing
        assert!(r[0] < r[1]);
        assert!(r[1] < r[2]);
    }

    #[test]
    fn test_softmax_chunked() {
        let b = backend();
        let r = b.softmax(&[0.0, 0.0, 5.0, 5.0], 2).unwrap();
        assert_relative_eq!(r[0], 0.5, epsilon = 1e-6);
        assert_relative_eq!(r[1], 0.5, epsilon = 1e-6);
        assert_relative_eq!(r[2], 0.5, epsilon = 1e-6);
        assert_relative_eq!(r[3], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_softmax_neg_infinity_gets_zero_mass() {
        let b = backend();
        let r = b.softmax(&[0.0, f32::NEG_INFINITY, 0.0], 3).unwrap();
        assert_relative_eq!(r[0], 0.5, epsilon = 1e-6);
        assert_eq!(r[1], 0.0);
        assert_relative_eq!(r[2], 0.5, epsilon = 1e-6);
    }

    #[test]
    fn test_gelu() {
        let b = backend();
        let r = b.gelu(&[0.0, 1.0, -1.0]).unwrap();
        assert_relative_eq!(r[0], 0.0, epsilon = 1e-6);
        assert_relative_eq!(r[1], 0.8412, epsilon = 1e-3);
        assert_relative_eq!(r[2], -0.1588, epsilon = 1e-3);
    }

    #[test]
    fn test_relu() {
        let b = backend();
        let r = b.relu(&[-2.0, 0.0, 3.0]).unwrap();
        assert_eq!(r, vec![0.0, 0.0, 3.0]);
    }

    #[test]
    fn test_silu() {
        let b = backend();
        let r = b.silu(&[0.0]).unwrap();
        // silu(0) = 0 / (1 + 1) = 0
        assert!((r[0] - 0.0).abs() < 1e-6);

        let r2 = b.silu(&[1.0]).unwrap();
        // silu(1) = 1 / (1 + exp(-1)) ~= 0.7310586
        assert!((r2[0] - 0.7310586).abs() < 1e-5);
    }
}
