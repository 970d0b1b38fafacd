use thiserror::Error;

#[derive(Error, Debug)]
pub enum ReaderError {
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Filter operator \"{0}\" is not supported.")]
    UnsupportedOperator(String),

    #[error("Invalid filter: {0}")]
    InvalidFilter(String),

    #[error("Execution error: {0}")]
    ExecutionError(String),

    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
}

impl ReaderError {
    /// Tag of the filter operator this error refers to, if any
    pub fn operator(&self) -> Option<&str> {
        match self {
            ReaderError::UnsupportedOperator(tag) => Some(tag),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, ReaderError>;
