//! Core records, arrays and abstractions for fine-tuning data preprocessing
//!
//! This crate provides the foundational components shared by the readers and
//! transforms crates: the [`Record`] input unit, the dtype-tagged
//! [`RawArray`], axis helpers, the error type and the [`Transform`] trait
//! that augmentation stages implement.

#![warn(missing_docs)]

pub mod axis;
pub mod error;
pub mod record;
pub mod schema;
pub mod tensor;
pub mod transform;

// Re-export key types for convenience
pub use axis::{move_axis, resolve_axis};
pub use error::{Error, Result};
pub use record::Record;
pub use schema::DataType;
pub use tensor::RawArray;
pub use transform::{Transform, TransformChain};
