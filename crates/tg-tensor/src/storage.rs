/// CPU-side tensor storage.
///
/// The model computes in f32 throughout, so f32 is the only storage variant.
#[derive(Debug, Clone)]
pub enum CpuStorage {
    /// 32-bit floating point storage.
    F32(Vec<f32>),
}

impl CpuStorage {
    /// Number of elements in this storage.
    pub fn len(&self) -> usize {
        match self {
            CpuStorage::F32(v) => v.len(),
        }
    }

    /// Returns true if the storage contains no elements.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Returns the data as an f32 slice.
    pub fn as_f32_slice(&self) -> &[f32] {
        match self {
            CpuStorage::F32(v) => v.as_slice(),
        }
    }

    /// Returns the data as a mutable f32 slice.
    pub fn as_f32_slice_mut(&mut self) -> &mut [f32] {
        match self {
            CpuStorage::F32(v) => v.as_mut_slice(),
        }
    }

    /// Create storage from an f32 vector.
    pub fn from_f32_vec(data: Vec<f32>) -> Self {
        CpuStorage::F32(data)
    }
}
