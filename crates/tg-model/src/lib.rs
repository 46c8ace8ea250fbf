pub mod attention;
pub mod block;
pub mod config;
pub mod dropout;
pub mod embedding;
pub mod error;
pub mod feed_forward;
pub mod generate;
pub mod linear;
pub mod model;
pub mod norm;
pub mod rotary;

pub use config::{Activation, GptConfig};
pub use error::{ModelError, Result};
pub use generate::{GenerationState, SampleOptions};
pub use model::GptModel;
