//! Normalization and output layout, applied in every phase.

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::trace;
use tuner_data_core::{Result, Transform};

use super::axis::{check_target_axis, to_layout};
use super::{HwcImage, Normalize};

/// Per-channel statistics used to standardize pixels.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizationConfig {
    pub mean: Vec<f32>,
    pub std: Vec<f32>,
}

impl Default for NormalizationConfig {
    fn default() -> Self {
        Self {
            mean: vec![0.485, 0.456, 0.406],
            std: vec![0.229, 0.224, 0.225],
        }
    }
}

impl NormalizationConfig {
    /// Builds the [`Normalize`] stage, validating the statistics.
    pub fn build(&self) -> Result<Normalize> {
        Normalize::new(&self.mean, &self.std)
    }
}

/// Standardizes an HWC image and places its channel axis.
#[derive(Debug, Clone)]
pub struct TensorFinalizer {
    normalize: Normalize,
    target_channel_axis: isize,
}

impl TensorFinalizer {
    pub fn new(normalization: &NormalizationConfig, target_channel_axis: isize) -> Result<Self> {
        check_target_axis(target_channel_axis)?;
        Ok(Self {
            normalize: normalization.build()?,
            target_channel_axis,
        })
    }
}

impl Transform for TensorFinalizer {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, rng: &mut dyn RngCore) -> Result<HwcImage> {
        let normalized = self.normalize.apply(image, rng)?;
        let output = to_layout(normalized, self.target_channel_axis)?;
        trace!(shape = ?output.shape(), axis = self.target_channel_axis, "finalized tensor");
        Ok(output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_finalize_channel_first() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let finalizer = TensorFinalizer::new(&NormalizationConfig::default(), 0)?;

        let image = Array3::from_elem((6, 5, 3), 0.485f32);
        let output = finalizer.apply(image, &mut rng)?;
        assert_eq!(output.dim(), (3, 6, 5));
        assert!(output.is_standard_layout());
        assert!(output.index_axis(ndarray::Axis(0), 0).iter().all(|v| v.abs() < 1e-6));
        Ok(())
    }

    #[test]
    fn test_finalize_channel_last() -> Result<()> {
        let mut rng = StdRng::seed_from_u64(0);
        let config = NormalizationConfig {
            mean: vec![0.5],
            std: vec![0.5],
        };
        let finalizer = TensorFinalizer::new(&config, -1)?;

        let output = finalizer.apply(Array3::ones((2, 3, 1)), &mut rng)?;
        assert_eq!(output.dim(), (2, 3, 1));
        assert!(output.iter().all(|&v| (v - 1.0).abs() < 1e-6));
        Ok(())
    }

    #[test]
    fn test_finalizer_rejects_middle_axis() {
        assert!(TensorFinalizer::new(&NormalizationConfig::default(), 1).is_err());
        assert!(TensorFinalizer::new(&NormalizationConfig::default(), 5).is_err());
    }

    #[test]
    fn test_normalization_config_serde() {
        let config: NormalizationConfig =
            serde_json::from_str(r#"{"mean": [0.5, 0.5, 0.5], "std": [0.25, 0.25, 0.25]}"#).unwrap();
        assert_eq!(config.mean, vec![0.5; 3]);
        assert!(config.build().is_ok());
    }
}
