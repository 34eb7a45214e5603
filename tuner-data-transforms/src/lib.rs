//! Vision preprocessing for fine-tuning data
//!
//! Turns a [`Record`] holding an in-memory array or an image locator into a
//! normalized `f32` tensor of fixed spatial size. Training-phase records go
//! through randomized augmentation; validation-phase records are resized
//! deterministically.
//!
//! ```ignore
//! use tuner_data_transforms::{vision_preprocessor, Phase, Record};
//!
//! let record = Record::from_uri("images/cat.png");
//! let tensor = vision_preprocessor(&record, 224, 224, -1, 0, Phase::Validation)?;
//! assert_eq!(tensor.dim(), (3, 224, 224));
//! ```

mod error;
mod preprocess;

pub mod vision;

pub use error::{Error, Result};
pub use preprocess::{vision_preprocessor, vision_preprocessor_default, VisionPreprocessor, VisionPreprocessorOptions};
pub use vision::{AugmentationConfig, AugmentationPolicy, NormalizationConfig, Phase, ValidationResize};

// Re-export the input types
pub use tuner_data_core::{RawArray, Record};
pub use tuner_data_readers::{ColorMode, ImageReaderOptions};
