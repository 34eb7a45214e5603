//! Error types for fine-tuning data preprocessing

use thiserror::Error;

/// Result type for core preprocessing operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for core preprocessing operations
#[derive(Error, Debug)]
pub enum Error {
    /// A record is missing every field a stage needs
    #[error("Missing required attribute: {0}")]
    MissingAttribute(String),

    /// Axis index outside the array's dimensions
    #[error("Axis {axis} is out of bounds for an array with {ndim} dimensions")]
    InvalidAxis {
        /// Requested axis (negative counts from the right)
        axis: isize,
        /// Number of dimensions of the array
        ndim: usize,
    },

    /// Invalid argument
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Array shape error raised by ndarray
    #[error("Shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// Transformation error
    #[error("Transformation error: {0}")]
    TransformationError(String),
}

impl Error {
    /// Whether this error reports a record without any usable source
    pub fn is_missing_attribute(&self) -> bool {
        matches!(self, Error::MissingAttribute(_))
    }
}
