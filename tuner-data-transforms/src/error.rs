//! Error types for data transforms

use thiserror::Error;

/// Error type for data transforms
#[derive(Error, Debug)]
pub enum Error {
    /// Core library error
    #[error("Core error: {0}")]
    Core(#[from] tuner_data_core::Error),

    /// Error raised while decoding a record's resource
    #[error("Reader error: {0}")]
    Reader(#[from] tuner_data_readers::Error),

    /// Malformed configuration document
    #[error("Configuration error: {0}")]
    Config(#[from] serde_json::Error),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl Error {
    /// Whether this error reports a record with neither an array nor a locator
    pub fn is_missing_attribute(&self) -> bool {
        match self {
            Error::Core(err) => err.is_missing_attribute(),
            Error::Reader(tuner_data_readers::Error::Core(err)) => err.is_missing_attribute(),
            _ => false,
        }
    }
}

/// Result type for data transforms
pub type Result<T> = std::result::Result<T, Error>;
