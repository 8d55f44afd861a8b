//! Titanic ML - Rust библиотека

pub mod data;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod types;

pub use error::{PipelineError, PipelineResult};
pub use models::*;
pub use preprocessing::*;
pub use types::*;

// Re-export для удобства
pub use pipeline::{run, PipelineConfig};
