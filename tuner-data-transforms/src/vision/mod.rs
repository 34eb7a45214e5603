//! Vision transforms for image records.
//!
//! Every transform here operates on `f32` images in `(height, width,
//! channels)` layout. Records are brought into that layout by
//! [`axis::to_channels_last`] and leave it through [`finalize::TensorFinalizer`].
//!
//! Available transforms:
//! - Geometric: [`Resize`], [`ResizeShorterSide`], [`CenterCrop`], [`RandomResizedCrop`]
//! - Augmentation: [`RandomHorizontalFlip`], [`GridDropout`]
//! - Photometric: [`GaussianBlur`], [`RandomBrightnessContrast`], [`Normalize`]

use ndarray::Array3;
use tuner_data_core::{Error, Result};

pub mod augmentation;
pub mod axis;
pub mod finalize;
pub mod geometric;
pub mod photometric;
pub mod pipeline;
mod planes;
pub mod source;

pub use augmentation::{GridDropout, RandomHorizontalFlip};
pub use finalize::{NormalizationConfig, TensorFinalizer};
pub use geometric::{CenterCrop, RandomResizedCrop, Resize, ResizeShorterSide};
pub use photometric::{GaussianBlur, Normalize, RandomBrightnessContrast};
pub use pipeline::{AugmentationConfig, AugmentationPolicy, ImageTransform, Phase, ValidationResize};
pub use source::resolve_source;

/// `f32` image in `(height, width, channels)` layout
pub type HwcImage = Array3<f32>;

pub(crate) fn check_probability(name: &str, p: f64) -> Result<()> {
    if (0.0..=1.0).contains(&p) {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "{name} probability must be in [0.0, 1.0] (got {p})"
        )))
    }
}

/// Rejects ranges that are not finite, positive and ordered.
pub(crate) fn check_range(name: &str, range: (f32, f32)) -> Result<()> {
    let (lo, hi) = range;
    if lo.is_finite() && hi.is_finite() && lo > 0.0 && lo <= hi {
        Ok(())
    } else {
        Err(Error::InvalidArgument(format!(
            "{name} range must satisfy 0 < min <= max (got {range:?})"
        )))
    }
}

pub(crate) fn check_positive_size(height: usize, width: usize) -> Result<()> {
    if height == 0 || width == 0 {
        return Err(Error::InvalidArgument(format!(
            "output size must be positive (got {height}x{width})"
        )));
    }
    Ok(())
}
