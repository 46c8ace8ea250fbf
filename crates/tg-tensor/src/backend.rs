use std::fmt::Debug;

use crate::error::Result;

/// Trait for pluggable compute backends.
///
/// All operations work on f32 slices. Data is passed in as slices and
/// returned as owned vectors. The backend is responsible for performing
/// the computation and returning the result.
pub trait ComputeBackend: Send + Sync + Debug {
    /// Returns the name of this backend (e.g., "cpu").
    fn name(&self) -> &str;

    /// Matrix multiplication: C = A @ B.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [k, n]
    /// - Returns: row-major data of shape [m, n]
    fn matmul(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>>;

    /// Matrix multiplication with a transposed right operand: C = A @ B^T.
    ///
    /// - `a`: row-major data of shape [m, k]
    /// - `b`: row-major data of shape [n, k]
    /// - Returns: row-major data of shape [m, n]
    fn matmul_nt(&self, a: &[f32], b: &[f32], m: usize, k: usize, n: usize) -> Result<Vec<f32>>;

    /// Element-wise addition: result[i] = a[i] + b[i].
    fn add(&self, a: &[f32], b: &[f32]) -> Result<Vec<f32>>;

    /// Scalar multiplication: result[i] = a[i] * s.
    fn scale(&self, a: &[f32], s: f32) -> Result<Vec<f32>>;

    /// Layer normalization.
    ///
    /// For each row of `hidden_size` elements in `x`:
    ///   mu    = mean(row)
    ///   var   = mean((row - mu)^2)
    ///   result[i] = (row[i] - mu) / sqrt(var + eps) * gamma[i] + beta[i]
    ///
    /// - `x`: input data, length must be a multiple of `hidden_size`
    /// - `gamma`: per-element scale, length == `hidden_size`
    /// - `beta`: per-element shift, length == `hidden_size`
    /// - `eps`: small constant for numerical stability
    /// - `hidden_size`: size of each row to normalize
    fn layer_norm(
        &self,
        x: &[f32],
        gamma: &[f32],
        beta: &[f32],
        eps: f32,
        hidden_size: usize,
    ) -> Result<Vec<f32>>;

    /// Softmax over chunks of `chunk_size` elements.
    ///
    /// For each chunk: result[i] = exp(x[i] - max(x)) / sum(exp(x[j] - max(x)))
    fn softmax(&self, x: &[f32], chunk_size: usize) -> Result<Vec<f32>>;

    /// GELU activation (tanh approximation):
    /// result[i] = 0.5 * x * (1 + tanh(sqrt(2/pi) * (x + 0.044715 * x^3))).
    fn gelu(&self, x: &[f32]) -> Result<Vec<f32>>;

    /// ReLU activation: result[i] = max(x[i], 0).
    fn relu(&self, x: &[f32]) -> Result<Vec<f32>>;

    /// SiLU activation: result[i] = x[i] * sigmoid(x[i]) = x[i] / (1 + exp(-x[i])).
    fn silu(&self, x: &[f32]) -> Result<Vec<f32>>;
}
