//! Runs `image::imageops` filters over the channels of an HWC array.
//!
//! Each channel becomes a single-channel `f32` buffer, so any channel count
//! works. `imageops` clamps float samples to `[0, 1]`, so each plane is
//! mapped onto that interval first and back afterwards.

use image::{ImageBuffer, Luma};
use ndarray::{Array2, Array3, ArrayView2, ArrayView3, Axis};
use tuner_data_core::{Error, Result};

use super::HwcImage;

/// Single-channel `f32` image
pub(crate) type Plane = ImageBuffer<Luma<f32>, Vec<f32>>;

pub(crate) fn to_u32(value: usize) -> Result<u32> {
    u32::try_from(value)
        .map_err(|_| Error::InvalidArgument(format!("image dimension {value} does not fit in u32")))
}

/// Applies `filter` to every channel and reassembles the result.
///
/// `filter` must produce a `height x width` plane.
pub(crate) fn map_planes<F>(image: ArrayView3<'_, f32>, height: usize, width: usize, filter: F) -> Result<HwcImage>
where
    F: Fn(&Plane) -> Plane,
{
    let (src_height, src_width, channels) = image.dim();
    let (src_h, src_w) = (to_u32(src_height)?, to_u32(src_width)?);

    let mut output = Array3::zeros((height, width, channels));
    for (channel, mut target) in image.axis_iter(Axis(2)).zip(output.axis_iter_mut(Axis(2))) {
        let (offset, span) = value_range(channel);
        let samples = channel.iter().map(|&v| (v - offset) / span).collect();
        let plane = Plane::from_raw(src_w, src_h, samples)
            .ok_or_else(|| Error::TransformationError("channel plane has the wrong length".into()))?;

        let filtered = filter(&plane);
        let values = Array2::from_shape_vec((height, width), filtered.into_raw())?;
        target.assign(&values.mapv(|v| v * span + offset));
    }

    Ok(output)
}

/// `(min, max - min)` of a channel, with a unit span for flat or
/// non-finite channels.
fn value_range(channel: ArrayView2<'_, f32>) -> (f32, f32) {
    let (lo, hi) = channel
        .iter()
        .fold((f32::INFINITY, f32::NEG_INFINITY), |(lo, hi), &v| (lo.min(v), hi.max(v)));

    if !lo.is_finite() {
        return (0.0, 1.0);
    }
    let span = hi - lo;
    if span.is_finite() && span > 0.0 {
        (lo, span)
    } else {
        (lo, 1.0)
    }
}
