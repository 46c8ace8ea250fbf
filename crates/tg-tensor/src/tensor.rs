use crate::backend::ComputeBackend;
use crate::error::{Result, TensorError};
use crate::shape::Shape;
use crate::storage::CpuStorage;

/// A dense tensor owning contiguous row-major f32 storage.
///
/// The tensor itself only carries data and shape; anything that computes
/// goes through a `ComputeBackend`.
#[derive(Debug, Clone)]
pub struct Tensor {
    storage: CpuStorage,
    shape: Shape,
}

impl Tensor {
    /// Wrap existing data in a tensor of the given shape.
    ///
    /// # Panics
    /// Panics if `data.len() != shape.numel()`.
    pub fn new(data: Vec<f32>, shape: Shape) -> Self {
        assert_eq!(
            data.len(),
            shape.numel(),
            "data length {} does not fill shape {}",
            data.len(),
            shape
        );
        Tensor {
            storage: CpuStorage::from_f32_vec(data),
            shape,
        }
    }

    /// Tensor filled with zeros.
    pub fn zeros(shape: Shape) -> Self {
        Tensor::new(vec![0.0; shape.numel()], shape)
    }

    /// Tensor filled with ones.
    pub fn ones(shape: Shape) -> Self {
        Tensor::new(vec![1.0; shape.numel()], shape)
    }

    pub fn shape(&self) -> &Shape {
        &self.shape
    }

    /// The underlying data as an f32 slice.
    pub fn data_f32(&self) -> &[f32] {
        self.storage.as_f32_slice()
    }

    /// The underlying data as a mutable f32 slice.
    pub fn data_f32_mut(&mut self) -> &mut [f32] {
        self.storage.as_f32_slice_mut()
    }

    /// Reinterpret the data under a new shape with the same element count.
    pub fn reshape(&self, shape: Shape) -> Result<Tensor> {
        if shape.numel() != self.shape.numel() {
            return Err(TensorError::ShapeMismatch {
                expected: self.shape.dims().to_vec(),
                got: shape.dims().to_vec(),
            });
        }
        Ok(Tensor {
            storage: self.storage.clone(),
            shape,
        })
    }

    /// Matrix multiplication through the given backend.
    ///
    /// `self` is [m, k], `rhs` is [k, n], the result is [m, n]. Both
    /// operands must be 2-D.
    pub fn matmul(&self, rhs: &Tensor, backend: &dyn ComputeBackend) -> Result<Tensor> {
        if self.shape.ndim() != 2 || rhs.shape.ndim() != 2 {
            return Err(TensorError::Other(format!(
                "matmul requires 2-D operands, got {} and {}",
                self.shape, rhs.shape
            )));
        }
        let (m, k) = (self.shape.dim(0), self.shape.dim(1));
        let (k2, n) = (rhs.shape.dim(0), rhs.shape.dim(1));
        if k != k2 {
            return Err(TensorError::MatmulMismatch { m, k, k2, n });
        }

        let data = backend.matmul(self.data_f32(), rhs.data_f32(), m, k, n)?;
        Ok(Tensor::new(data, Shape::new(vec![m, n])))
    }
}
