use ndarray::{s, Axis};
use rand::{Rng, RngCore};
use tuner_data_core::{Error, Result, Transform};

use super::{check_probability, HwcImage};

// ============================================================================
// RandomHorizontalFlip
// ============================================================================

/// Randomly flips images horizontally during training.
///
/// # Example
/// ```ignore
/// let flip = RandomHorizontalFlip::new(0.5)?; // 50% flip chance
/// let augmented = flip.apply(image, &mut rng)?;
/// ```
#[derive(Debug, Clone)]
pub struct RandomHorizontalFlip {
    p: f64,
}

impl RandomHorizontalFlip {
    pub fn new(p: f64) -> Result<Self> {
        check_probability("flip", p)?;
        Ok(Self { p })
    }
}

impl Transform for RandomHorizontalFlip {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, rng: &mut dyn RngCore) -> Result<HwcImage> {
        if rng.random_bool(self.p) {
            Ok(image.slice(s![.., ..;-1, ..]).to_owned())
        } else {
            Ok(image)
        }
    }

    fn is_random(&self) -> bool {
        self.p > 0.0 && self.p < 1.0
    }
}

// ============================================================================
// GridDropout
// ============================================================================

/// Zeroes a regular grid of square holes.
///
/// Each call samples a grid unit size from `unit_range` (clamped to the
/// image) and a random grid offset; every unit gets one hole whose side is
/// `ratio` times the unit size.
#[derive(Debug, Clone)]
pub struct GridDropout {
    p: f64,
    ratio: f32,
    unit_range: (usize, usize),
}

impl GridDropout {
    pub fn new(p: f64, ratio: f32, unit_range: (usize, usize)) -> Result<Self> {
        check_probability("grid dropout", p)?;
        if !(ratio > 0.0 && ratio < 1.0) {
            return Err(Error::InvalidArgument(format!(
                "grid dropout ratio must be in (0.0, 1.0) (got {ratio})"
            )));
        }
        if unit_range.0 < 2 || unit_range.0 > unit_range.1 {
            return Err(Error::InvalidArgument(format!(
                "grid unit range must satisfy 2 <= min <= max (got {unit_range:?})"
            )));
        }

        Ok(Self {
            p,
            ratio,
            unit_range,
        })
    }

    fn drop_holes(&self, mut image: HwcImage, rng: &mut dyn RngCore) -> HwcImage {
        let (height, width, _) = image.dim();
        let max_unit = self.unit_range.1.min(height).min(width);
        if max_unit < 2 {
            return image;
        }
        let unit = rng.random_range(self.unit_range.0.min(max_unit)..=max_unit);
        let hole = ((unit as f32 * self.ratio).round() as usize).clamp(1, unit - 1);

        let shift_y = rng.random_range(0..unit);
        let shift_x = rng.random_range(0..unit);

        // Start one unit early so the partial cell before the offset is covered
        let mut top = shift_y as isize - unit as isize;
        while top < height as isize {
            let mut left = shift_x as isize - unit as isize;
            while left < width as isize {
                let y0 = top.max(0) as usize;
                let x0 = left.max(0) as usize;
                let y1 = ((top + hole as isize).max(0) as usize).min(height);
                let x1 = ((left + hole as isize).max(0) as usize).min(width);
                if y0 < y1 && x0 < x1 {
                    image.slice_mut(s![y0..y1, x0..x1, ..]).fill(0.0);
                }
                left += unit as isize;
            }
            top += unit as isize;
        }

        image
    }
}

impl Transform for GridDropout {
    type Input = HwcImage;
    type Output = HwcImage;

    fn apply(&self, image: HwcImage, rng: &mut dyn RngCore) -> Result<HwcImage> {
        if image.len_of(Axis(0)) == 0 || !rng.random_bool(self.p) {
            return Ok(image);
        }
        Ok(self.drop_holes(image, rng))
    }

    fn is_random(&self) -> bool {
        self.p > 0.0
    }
}
