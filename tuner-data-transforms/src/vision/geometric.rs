use image::imageops::{self, FilterType};
use ndarray::{s, Array3, ArrayView3};
use rand::{Rng, RngCore};
use tracing::warn;
use tuner_data_core::{Error, Result, Transform};

use super::planes::{map_planes, to_u32};
use super::{check_positive_size, check_range, HwcImage};

// ============================================================================
// Sampling helpers
// ============================================================================

/// Bilinear resize of an `(H, W, C)` image, one channel at a time through
/// [`imageops::resize`] with the triangle filter.
///
/// Empty inputs produce a zero-filled image of the requested size.
pub fn resize_bilinear(image: ArrayView3<'_, f32>, height: usize, width: usize) -> Result<HwcImage> {
    let (src_height, src_width, channels) = image.dim();

    if src_height == 0 || src_width == 0 {
        return Ok(Array3::zeros((height, width, channels)));
    }
    if (src_height, src_width) == (height, width) {
        return Ok(image.to_owned());
    }

    let (target_height, target_width) = (to_u32(height)?, to_u32(width)?);
    map_planes(image, height, width, |plane| {
        imageops::resize(plane, target_width, target_height, FilterType::Triangle)
    })
}

/// Copies the `height x width` window starting at `(top, left)`.
pub fn crop(image: ArrayView3<'_, f32>, top: usize, left: usize, height: usize, width: usize) -> Result<HwcImage> {
    let (src_height, src_width, _) = image.dim();
    if top + height > src_height || left + width > src_width {
        return Err(Error::InvalidArgument(format!(
            "crop window {height}x{width} at ({top}, {left}) exceeds image {src_height}x{src_width}"
        )));
    }

    Ok(image
        .slice(s![top..top + height, left..left + width, ..])
        .to_owned())
}

// ============================================================================
// Resize
// ============================================================================

/// Resizes an image to exactly `height x width`, ignoring aspect ratio.
///
/// # Example
/// ```ignore
/// let resize = Resize::new(224, 224)?;
/// let resized = resize.apply(image, &mut rand::rng())?;
/// ```
#[derive(Debug, Clone)]
pub struct Resize {
    height: usize,
    width: usize,
}

impl Resize {
    /// Creates a new Resize transform.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        check_positive_size(height, width)?;
        Ok(Self { height, width })
    }
}

impl Transform for Resize {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, _rng: &mut dyn RngCore) -> Result<HwcImage> {
        resize_bilinear(image.view(), self.height, self.width)
    }
}

// ============================================================================
// ResizeShorterSide + CenterCrop
// ============================================================================

/// Scales an image uniformly so that it covers `height x width`.
///
/// The result is at least as large as the target in both dimensions, so a
/// following [`CenterCrop`] never has to pad.
#[derive(Debug, Clone)]
pub struct ResizeShorterSide {
    height: usize,
    width: usize,
}

impl ResizeShorterSide {
    /// Creates a new ResizeShorterSide transform.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        check_positive_size(height, width)?;
        Ok(Self { height, width })
    }
}

impl Transform for ResizeShorterSide {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, _rng: &mut dyn RngCore) -> Result<HwcImage> {
        let (src_height, src_width, _) = image.dim();
        if src_height == 0 || src_width == 0 {
            return resize_bilinear(image.view(), self.height, self.width);
        }

        let scale = f32::max(
            self.height as f32 / src_height as f32,
            self.width as f32 / src_width as f32,
        );
        let new_height = ((src_height as f32 * scale).round() as usize).max(self.height);
        let new_width = ((src_width as f32 * scale).round() as usize).max(self.width);

        resize_bilinear(image.view(), new_height, new_width)
    }
}

/// Crops the central `height x width` window.
///
/// Images smaller than the window in either dimension are resized up to it
/// instead of padded.
#[derive(Debug, Clone)]
pub struct CenterCrop {
    height: usize,
    width: usize,
}

impl CenterCrop {
    /// Creates a new CenterCrop transform.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        check_positive_size(height, width)?;
        Ok(Self { height, width })
    }
}

impl Transform for CenterCrop {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, _rng: &mut dyn RngCore) -> Result<HwcImage> {
        let (src_height, src_width, _) = image.dim();
        if src_height < self.height || src_width < self.width {
            return resize_bilinear(image.view(), self.height, self.width);
        }

        let top = (src_height - self.height) / 2;
        let left = (src_width - self.width) / 2;
        crop(image.view(), top, left, self.height, self.width)
    }
}

// ============================================================================
// RandomResizedCrop
// ============================================================================

/// Crops a random region of random area and aspect ratio, then resizes it
/// to `height x width`.
///
/// Area is sampled as a fraction of the source area from `scale`, aspect
/// ratio log-uniformly from `ratio`. After `attempts` failed samples the
/// largest central crop within `ratio` is used.
#[derive(Debug, Clone)]
pub struct RandomResizedCrop {
    height: usize,
    width: usize,
    scale: (f32, f32),
    ratio: (f32, f32),
    attempts: usize,
}

impl RandomResizedCrop {
    /// Creates a crop with the usual `(0.08, 1.0)` scale and `(3/4, 4/3)` ratio.
    pub fn new(height: usize, width: usize) -> Result<Self> {
        Self::with_params(height, width, (0.08, 1.0), (3.0 / 4.0, 4.0 / 3.0), 10)
    }

    /// Creates a crop with explicit sampling ranges.
    pub fn with_params(
        height: usize,
        width: usize,
        scale: (f32, f32),
        ratio: (f32, f32),
        attempts: usize,
    ) -> Result<Self> {
        check_positive_size(height, width)?;
        check_range("crop scale", scale)?;
        check_range("crop ratio", ratio)?;
        if scale.1 > 1.0 {
            return Err(Error::InvalidArgument(format!(
                "crop scale upper bound must be at most 1.0 (got {})",
                scale.1
            )));
        }

        Ok(Self {
            height,
            width,
            scale,
            ratio,
            attempts,
        })
    }

    /// Picks the `(top, left, height, width)` window to crop.
    fn sample_window(&self, src_height: usize, src_width: usize, rng: &mut dyn RngCore) -> (usize, usize, usize, usize) {
        let area = (src_height * src_width) as f32;
        let log_ratio = (self.ratio.0.ln(), self.ratio.1.ln());

        for _ in 0..self.attempts {
            let target_area = area * rng.random_range(self.scale.0..=self.scale.1);
            let aspect = rng.random_range(log_ratio.0..=log_ratio.1).exp();

            let width = (target_area * aspect).sqrt().round() as usize;
            let height = (target_area / aspect).sqrt().round() as usize;

            if width > 0 && width <= src_width && height > 0 && height <= src_height {
                let top = rng.random_range(0..=src_height - height);
                let left = rng.random_range(0..=src_width - width);
                return (top, left, height, width);
            }
        }

        warn!(
            src_height,
            src_width,
            attempts = self.attempts,
            "random resized crop fell back to a central crop"
        );

        let in_ratio = src_width as f32 / src_height as f32;
        let (height, width) = if in_ratio < self.ratio.0 {
            let width = src_width;
            (((width as f32 / self.ratio.0).round() as usize).clamp(1, src_height), width)
        } else if in_ratio > self.ratio.1 {
            let height = src_height;
            (height, ((height as f32 * self.ratio.1).round() as usize).clamp(1, src_width))
        } else {
            (src_height, src_width)
        };

        ((src_height - height) / 2, (src_width - width) / 2, height, width)
    }
}

impl Transform for RandomResizedCrop {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, rng: &mut dyn RngCore) -> Result<HwcImage> {
        let (src_height, src_width, _) = image.dim();
        if src_height == 0 || src_width == 0 {
            return resize_bilinear(image.view(), self.height, self.width);
        }

        let (top, left, height, width) = self.sample_window(src_height, src_width, rng);
        let window = image.slice(s![top..top + height, left..left + width, ..]);
        resize_bilinear(window, self.height, self.width)
    }

    fn is_random(&self) -> bool {
        true
    }
}
