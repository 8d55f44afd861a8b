//! Ошибки пайплайна

use thiserror::Error;

/// Ошибки загрузки, преобразования и выгрузки данных
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Missing required column '{column}' in {path}")]
    MissingColumn { column: String, path: String },

    #[error("Empty input: {0}")]
    EmptyInput(String),

    #[error("Model error: {0}")]
    Model(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<String> for PipelineError {
    fn from(message: String) -> Self {
        PipelineError::Model(message)
    }
}

/// Result для операций пайплайна
pub type PipelineResult<T> = Result<T, PipelineError>;
