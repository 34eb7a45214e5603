use image::imageops;
use ndarray::Axis;
use rand::{Rng, RngCore};
use tuner_data_core::{Error, Result, Transform};

use super::planes::map_planes;
use super::{check_probability, check_range, HwcImage};

// ============================================================================
// GaussianBlur
// ============================================================================

/// Largest blur sigma accepted; `imageops::blur` cost grows linearly with it.
pub const MAX_BLUR_SIGMA: f32 = 50.0;

/// Blurs with a Gaussian of random width.
///
/// Sigma is sampled uniformly from `sigma` and each channel goes through
/// [`imageops::blur`].
#[derive(Debug, Clone)]
pub struct GaussianBlur {
    p: f64,
    sigma: (f32, f32),
}

impl GaussianBlur {
    pub fn new(p: f64, sigma: (f32, f32)) -> Result<Self> {
        check_probability("blur", p)?;
        check_range("blur sigma", sigma)?;
        if sigma.1 > MAX_BLUR_SIGMA {
            return Err(Error::InvalidArgument(format!(
                "blur sigma must be at most {MAX_BLUR_SIGMA} (got {})",
                sigma.1
            )));
        }
        Ok(Self { p, sigma })
    }
}

impl Transform for GaussianBlur {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, rng: &mut dyn RngCore) -> Result<HwcImage> {
        if image.is_empty() || !rng.random_bool(self.p) {
            return Ok(image);
        }

        let sigma = rng.random_range(self.sigma.0..=self.sigma.1);
        let (height, width, _) = image.dim();
        map_planes(image.view(), height, width, |plane| imageops::blur(plane, sigma))
    }

    fn is_random(&self) -> bool {
        self.p > 0.0
    }
}

// ============================================================================
// RandomBrightnessContrast
// ============================================================================

/// Randomly scales contrast and shifts brightness.
///
/// # Mathematical Operation:
/// ```text
/// output = (1 + c) * input + b,   c ~ U(-contrast, contrast), b ~ U(-brightness, brightness)
/// ```
#[derive(Debug, Clone)]
pub struct RandomBrightnessContrast {
    p: f64,
    brightness: f32,
    contrast: f32,
}

impl RandomBrightnessContrast {
    pub fn new(p: f64, brightness: f32, contrast: f32) -> Result<Self> {
        check_probability("brightness/contrast", p)?;
        let valid = |limit: f32| limit.is_finite() && limit >= 0.0;
        if !(valid(brightness) && valid(contrast)) {
            return Err(Error::InvalidArgument(format!(
                "brightness and contrast limits must be finite and non-negative (got {brightness}, {contrast})"
            )));
        }
        Ok(Self {
            p,
            brightness,
            contrast,
        })
    }
}

impl Transform for RandomBrightnessContrast {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, mut image: HwcImage, rng: &mut dyn RngCore) -> Result<HwcImage> {
        if !rng.random_bool(self.p) {
            return Ok(image);
        }

        let alpha = 1.0 + rng.random_range(-self.contrast..=self.contrast);
        let beta = rng.random_range(-self.brightness..=self.brightness);
        image.mapv_inplace(|v| alpha * v + beta);
        Ok(image)
    }

    fn is_random(&self) -> bool {
        self.p > 0.0
    }
}

// ============================================================================
// Normalize
// ============================================================================

/// Normalizes `(H, W, C)` images using channel-wise statistics.
///
/// Statistics whose length matches the channel count apply per channel, a
/// single value applies to every channel, and any other length falls back
/// to the channel-averaged mean and std so grayscale or RGBA inputs keep
/// their channel count.
///
/// # Mathematical Operation:
/// ```text
/// output[h,w,c] = (input[h,w,c] - mean[c]) / std[c]
/// ```
///
/// # Example
/// ```ignore
/// let norm = Normalize::imagenet();
/// let normalized = norm.apply(image, &mut rng)?;
/// ```
#[derive(Debug, Clone)]
pub struct Normalize {
    mean: Vec<f32>,
    std: Vec<f32>,
}

impl Normalize {
    /// Creates new normalization parameters.
    pub fn new(mean: &[f32], std: &[f32]) -> Result<Self> {
        if mean.is_empty() {
            return Err(Error::InvalidArgument("Normalization mean cannot be empty".into()));
        }
        if mean.len() != std.len() {
            return Err(Error::InvalidArgument(format!(
                "The mean and standard deviation for normalization must match in dimension. \
                 The dimension of mean is {} but the dimension of std is {}.",
                mean.len(),
                std.len()
            )));
        }
        if let Some(bad) = std.iter().find(|s| !(s.is_finite() && **s > 0.0)) {
            return Err(Error::InvalidArgument(format!(
                "Standard deviation must be finite and greater than 0, got {bad}"
            )));
        }
        if mean.iter().any(|m| !m.is_finite()) {
            return Err(Error::InvalidArgument("Normalization mean must be finite".into()));
        }

        Ok(Self {
            mean: mean.to_vec(),
            std: std.to_vec(),
        })
    }

    /// ImageNet standard normalization (RGB)
    pub fn imagenet() -> Self {
        Self {
            mean: vec![0.485, 0.456, 0.406],
            std: vec![0.229, 0.224, 0.225],
        }
    }

    /// `(mean, std)` to use for an image with `channels` channels
    pub fn stats_for(&self, channels: usize) -> Vec<(f32, f32)> {
        if self.mean.len() == channels {
            return self.mean.iter().copied().zip(self.std.iter().copied()).collect();
        }

        let n = self.mean.len() as f32;
        let mean = self.mean.iter().sum::<f32>() / n;
        let std = self.std.iter().sum::<f32>() / n;
        vec![(mean, std); channels]
    }
}

impl Transform for Normalize {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, mut image: HwcImage, _rng: &mut dyn RngCore) -> Result<HwcImage> {
        let stats = self.stats_for(image.len_of(Axis(2)));
        for (mut channel, (mean, std)) in image.axis_iter_mut(Axis(2)).zip(stats) {
            channel.mapv_inplace(|v| (v - mean) / std);
        }
        Ok(image)
    }
}
