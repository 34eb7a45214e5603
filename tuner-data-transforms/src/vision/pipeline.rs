//! Phase-dependent augmentation policies.

use std::fmt;
use std::str::FromStr;

use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::debug;
use tuner_data_core::{Error, Result, Transform, TransformChain};

use super::{
    CenterCrop, GaussianBlur, GridDropout, HwcImage, RandomBrightnessContrast,
    RandomHorizontalFlip, RandomResizedCrop, Resize, ResizeShorterSide,
};

/// Boxed image-to-image stage
pub type ImageTransform = Box<dyn Transform<Input = HwcImage, Output = HwcImage>>;

/// Which augmentation regime applies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    #[default]
    #[serde(alias = "training")]
    Train,
    #[serde(alias = "val", alias = "eval")]
    Validation,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Train => write!(f, "train"),
            Phase::Validation => write!(f, "validation"),
        }
    }
}

impl FromStr for Phase {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "train" | "training" => Ok(Phase::Train),
            "validation" | "val" | "eval" => Ok(Phase::Validation),
            other => Err(Error::InvalidArgument(format!(
                "unknown phase '{other}', expected 'train' or 'validation'"
            ))),
        }
    }
}

/// How validation images reach the output size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationResize {
    /// Plain resize to the output size
    #[default]
    Resize,
    /// Scale the shorter side to cover the output, then crop the centre
    ShorterSideThenCenterCrop,
}

/// Parameters of the training augmentations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AugmentationConfig {
    pub flip_probability: f64,
    pub crop_scale: (f32, f32),
    pub crop_ratio: (f32, f32),
    pub crop_attempts: usize,
    pub blur_probability: f64,
    pub blur_sigma: (f32, f32),
    pub grid_dropout_probability: f64,
    pub grid_dropout_ratio: f32,
    pub grid_unit: (usize, usize),
    pub brightness_contrast_probability: f64,
    pub brightness_limit: f32,
    pub contrast_limit: f32,
    pub validation_resize: ValidationResize,
}

impl Default for AugmentationConfig {
    fn default() -> Self {
        Self {
            flip_probability: 0.5,
            crop_scale: (0.08, 1.0),
            crop_ratio: (3.0 / 4.0, 4.0 / 3.0),
            crop_attempts: 10,
            blur_probability: 1.0,
            blur_sigma: (0.1, 2.0),
            grid_dropout_probability: 0.5,
            grid_dropout_ratio: 0.2,
            grid_unit: (8, 32),
            brightness_contrast_probability: 0.2,
            brightness_limit: 0.2,
            contrast_limit: 0.2,
            validation_resize: ValidationResize::Resize,
        }
    }
}

impl AugmentationConfig {
    /// Checks every training parameter, whichever phase is configured.
    pub fn validate(&self) -> Result<()> {
        self.training_stages(1, 1).map(|_| ())
    }

    fn training_stages(&self, height: usize, width: usize) -> Result<Vec<ImageTransform>> {
        let stages: Vec<ImageTransform> = vec![
            Box::new(RandomHorizontalFlip::new(self.flip_probability)?),
            Box::new(RandomResizedCrop::with_params(
                height,
                width,
                self.crop_scale,
                self.crop_ratio,
                self.crop_attempts,
            )?),
            Box::new(GaussianBlur::new(self.blur_probability, self.blur_sigma)?),
            Box::new(GridDropout::new(
                self.grid_dropout_probability,
                self.grid_dropout_ratio,
                self.grid_unit,
            )?),
            Box::new(RandomBrightnessContrast::new(
                self.brightness_contrast_probability,
                self.brightness_limit,
                self.contrast_limit,
            )?),
        ];
        Ok(stages)
    }
}

/// The ordered stages applied before normalization.
///
/// Training: horizontal flip, random resized crop, Gaussian blur, grid
/// dropout, brightness/contrast. Validation: a deterministic resize.
/// Either way the output is exactly `height x width`.
pub struct AugmentationPolicy {
    phase: Phase,
    height: usize,
    width: usize,
    chain: TransformChain<ImageTransform>,
}

impl AugmentationPolicy {
    pub fn for_phase(phase: Phase, height: usize, width: usize, config: &AugmentationConfig) -> Result<Self> {
        config.validate()?;

        let stages: Vec<ImageTransform> = match phase {
            Phase::Train => config.training_stages(height, width)?,
            Phase::Validation => match config.validation_resize {
                ValidationResize::Resize => vec![Box::new(Resize::new(height, width)?)],
                ValidationResize::ShorterSideThenCenterCrop => vec![
                    Box::new(ResizeShorterSide::new(height, width)?),
                    Box::new(CenterCrop::new(height, width)?),
                ],
            },
        };

        debug!(%phase, height, width, stages = stages.len(), "built augmentation policy");

        Ok(Self {
            phase,
            height,
            width,
            chain: TransformChain::new(stages),
        })
    }

    /// Names of the stages in application order
    pub fn stage_names(&self) -> Vec<&'static str> {
        self.chain.transforms().iter().map(|t| t.name()).collect()
    }
}

impl fmt::Debug for AugmentationPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AugmentationPolicy")
            .field("phase", &self.phase)
            .field("height", &self.height)
            .field("width", &self.width)
            .field("stages", &self.stage_names())
            .finish()
    }
}

impl Transform for AugmentationPolicy {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, rng: &mut dyn RngCore) -> Result<HwcImage> {
        let output = self.chain.apply(image, rng)?;
        let (height, width, _) = output.dim();
        if (height, width) != (self.height, self.width) {
            return Err(Error::TransformationError(format!(
                "{} policy produced {height}x{width}, expected {}x{}",
                self.phase, self.height, self.width
            )));
        }
        Ok(output)
    }

    fn is_random(&self) -> bool {
        self.chain.is_random()
    }
}
