//! Record-to-tensor preprocessing entry points.

use std::fs;
use std::path::Path;

use ndarray::Array3;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument};
use tuner_data_core::{Record, Transform};
use tuner_data_readers::{ColorMode, ImageLoader, ImageReaderOptions};

use crate::error::{Error, Result};
use crate::vision::axis::{check_target_axis, to_channels_last};
use crate::vision::{resolve_source, AugmentationConfig, AugmentationPolicy, NormalizationConfig, Phase, TensorFinalizer};

/// Options for [`VisionPreprocessor`].
///
/// Missing fields fall back to their defaults when deserialized:
///
/// ```text
/// height = 224, width = 224
/// default_channel_axis = -1   (input arrays are channel-last)
/// target_channel_axis  = 0    (output is channel-first)
/// phase = train
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VisionPreprocessorOptions {
    pub height: usize,
    pub width: usize,
    /// Channel axis of in-memory arrays, and where decoded images put it
    pub default_channel_axis: isize,
    /// Channel axis of the output, `0` or `-1`
    pub target_channel_axis: isize,
    pub phase: Phase,
    pub augmentation: AugmentationConfig,
    pub normalization: NormalizationConfig,
    /// Colour conversion applied when decoding a record's `uri`
    pub color_mode: ColorMode,
}

impl Default for VisionPreprocessorOptions {
    fn default() -> Self {
        Self {
            height: 224,
            width: 224,
            default_channel_axis: -1,
            target_channel_axis: 0,
            phase: Phase::Train,
            augmentation: AugmentationConfig::default(),
            normalization: NormalizationConfig::default(),
            color_mode: ColorMode::Rgb,
        }
    }
}

impl VisionPreprocessorOptions {
    /// Options with the given geometry and phase, everything else default.
    pub fn new(
        height: usize,
        width: usize,
        default_channel_axis: isize,
        target_channel_axis: isize,
        phase: Phase,
    ) -> Self {
        Self {
            height,
            width,
            default_channel_axis,
            target_channel_axis,
            phase,
            ..Self::default()
        }
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Configuration file not found: {}", path.display()),
            )));
        }
        Self::from_json_str(&fs::read_to_string(path)?)
    }

    /// Rejects options no record could be preprocessed with.
    pub fn validate(&self) -> Result<()> {
        if self.height == 0 || self.width == 0 {
            return Err(Error::InvalidArgument(format!(
                "output size must be positive (got {}x{})",
                self.height, self.width
            )));
        }
        if !(-3..=2).contains(&self.default_channel_axis) {
            return Err(Error::InvalidArgument(format!(
                "default channel axis {} is out of range for an image array",
                self.default_channel_axis
            )));
        }
        check_target_axis(self.target_channel_axis)?;
        self.augmentation.validate()?;
        Ok(())
    }
}

/// Turns records into normalized `f32` tensors of a fixed size.
///
/// Holds only immutable configuration, so one instance can be shared across
/// threads. Train-phase calls are randomized; validation-phase calls are
/// deterministic.
#[derive(Debug)]
pub struct VisionPreprocessor {
    options: VisionPreprocessorOptions,
    loader: ImageLoader,
    policy: AugmentationPolicy,
    finalizer: TensorFinalizer,
}

impl VisionPreprocessor {
    pub fn new(options: VisionPreprocessorOptions) -> Result<Self> {
        options.validate()?;

        let loader = ImageLoader::new(ImageReaderOptions {
            color_mode: options.color_mode,
        });
        let policy = AugmentationPolicy::for_phase(options.phase, options.height, options.width, &options.augmentation)?;
        let finalizer = TensorFinalizer::new(&options.normalization, options.target_channel_axis)?;

        debug!(
            phase = %options.phase,
            height = options.height,
            width = options.width,
            default_channel_axis = options.default_channel_axis,
            target_channel_axis = options.target_channel_axis,
            "created vision preprocessor"
        );

        Ok(Self {
            options,
            loader,
            policy,
            finalizer,
        })
    }

    /// Preprocesses `record` using the thread-local generator.
    pub fn preprocess(&self, record: &Record) -> Result<Array3<f32>> {
        self.preprocess_with_rng(record, &mut rand::rng())
    }

    /// Preprocesses `record`, drawing augmentation randomness from `rng`.
    ///
    /// Fails with a missing-attribute error when the record has neither a
    /// `tensor` nor a `uri`, before any transform runs.
    #[instrument(level = "debug", skip_all, fields(record = %record.id(), phase = %self.options.phase))]
    pub fn preprocess_with_rng<R: RngCore>(&self, record: &Record, rng: &mut R) -> Result<Array3<f32>> {
        let raw = resolve_source(record, &self.loader, self.options.default_channel_axis)?;
        let image = to_channels_last(&raw, self.options.default_channel_axis)?;

        let augmented = self.policy.apply(image, rng)?;
        let output = self.finalizer.apply(augmented, rng)?;

        debug!(shape = ?output.shape(), "preprocessed record");
        Ok(output)
    }
}

/// Preprocesses a single record.
///
/// Equivalent to building a [`VisionPreprocessor`] from
/// [`VisionPreprocessorOptions::new`] and calling
/// [`VisionPreprocessor::preprocess`]. Prefer the preprocessor when handling
/// many records.
pub fn vision_preprocessor(
    record: &Record,
    height: usize,
    width: usize,
    default_channel_axis: isize,
    target_channel_axis: isize,
    phase: Phase,
) -> Result<Array3<f32>> {
    let options = VisionPreprocessorOptions::new(height, width, default_channel_axis, target_channel_axis, phase);
    VisionPreprocessor::new(options)?.preprocess(record)
}

/// [`vision_preprocessor`] with every default: 224x224, axes `-1 -> 0`, train.
pub fn vision_preprocessor_default(record: &Record) -> Result<Array3<f32>> {
    VisionPreprocessor::new(VisionPreprocessorOptions::default())?.preprocess(record)
}
