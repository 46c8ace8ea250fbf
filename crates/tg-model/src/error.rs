use thiserror::Error;

#[derive(Error, Debug)]
pub enum ModelError {
    #[error("invalid configuration: {0}")]
    Config(String),
    #[error("token id {id} out of range for vocabulary of size {vocab}")]
    TokenOutOfRange { id: u32, vocab: usize },
    #[error("sequence length {len} exceeds maximum window {max}")]
    SequenceTooLong { len: usize, max: usize },
    #[error("batch row {row} has length {len}, expected {expected}")]
    RaggedBatch {
        row: usize,
        len: usize,
        expected: usize,
    },
    #[error("input batch contains no tokens")]
    EmptyBatch,
    #[error("tensor error: {0}")]
    TensorError(#[from] tg_tensor::TensorError),
    #[error("{0}")]
    Other(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
