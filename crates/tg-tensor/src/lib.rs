//! `tg-tensor` - Tensor library with pluggable compute backends for tinygpt.
//!
//! This crate provides:
//! - A `Tensor` type backed by contiguous row-major f32 CPU storage
//! - A `ComputeBackend` trait for pluggable compute
//! - A reference `CpuBackend` implementation
//! - Shape utilities

pub mod backend;
pub mod cpu;
pub mod error;
pub mod shape;
pub mod storage;
pub mod tensor;

// Re-export primary types at the crate root for convenience.
pub use backend::ComputeBackend;
pub use cpu::CpuBackend;
pub use error::{Result, TensorError};
pub use shape::Shape;
pub use storage::CpuStorage;
pub use tensor::Tensor;
