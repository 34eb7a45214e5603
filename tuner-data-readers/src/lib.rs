//! Resource readers for fine-tuning data preprocessing
//!
//! This crate decodes the external resources records point at (currently
//! local image files) into the raw arrays the transforms crate consumes.

mod error;

pub mod image;

pub use error::{Error, Result};
pub use crate::image::{ColorMode, ImageFormat, ImageLoader, ImageReaderOptions};

// Re-export core types
pub use tuner_data_core::{RawArray, Record};
