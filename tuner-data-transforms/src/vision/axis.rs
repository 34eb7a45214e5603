//! Channel-axis normalization between record layouts and the HWC layout
//! the vision transforms operate on.

use ndarray::{Axis, Ix3};
use tuner_data_core::{Error, RawArray, Result};

pub use tuner_data_core::axis::{move_axis, move_axis_order, resolve_axis};

use super::HwcImage;

/// Converts a raw array to a channel-last `f32` image.
///
/// 3-D arrays have their `channel_axis` moved last; 2-D arrays are treated
/// as single-channel and gain a trailing channel axis. Integer pixels are
/// rescaled into `[0, 1]` using [`tuner_data_core::DataType::pixel_max`].
pub fn to_channels_last(raw: &RawArray, channel_axis: isize) -> Result<HwcImage> {
    let pixels = raw.to_unit_f32();

    match raw.ndim() {
        2 => Ok(pixels.insert_axis(Axis(2)).into_dimensionality::<Ix3>()?),
        3 => Ok(move_axis(pixels, channel_axis, -1)?.into_dimensionality::<Ix3>()?),
        ndim => Err(Error::InvalidArgument(format!(
            "expected a 2-D or 3-D image array, got {ndim} dimensions with shape {:?}",
            raw.shape()
        ))),
    }
}

/// Places the channel axis of an HWC image at `target_channel_axis`.
///
/// Only the first (`0`) and last (`-1` / `2`) positions are defined. The
/// result is always in standard (row-major contiguous) layout.
pub fn to_layout(image: HwcImage, target_channel_axis: isize) -> Result<HwcImage> {
    match check_target_axis(target_channel_axis)? {
        0 => Ok(image.permuted_axes([2, 0, 1]).as_standard_layout().into_owned()),
        _ => Ok(image.as_standard_layout().into_owned()),
    }
}

/// Resolves `target_channel_axis` against a 3-D output and rejects the
/// middle position.
pub fn check_target_axis(target_channel_axis: isize) -> Result<usize> {
    match resolve_axis(target_channel_axis, 3)? {
        1 => Err(Error::InvalidArgument(format!(
            "target channel axis must be first (0) or last (-1), got {target_channel_axis}"
        ))),
        axis => Ok(axis),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};
    use test_case::test_case;

    #[test_case(&[16, 12, 3], -1 => (16, 12, 3); "channel last")]
    #[test_case(&[3, 16, 12], 0 => (16, 12, 3); "channel first")]
    #[test_case(&[16, 3, 12], 1 => (16, 12, 3); "channel middle")]
    #[test_case(&[16, 12, 1], 2 => (16, 12, 1); "grayscale")]
    fn test_to_channels_last_shapes(shape: &[usize], axis: isize) -> (usize, usize, usize) {
        let raw = RawArray::F64(ndarray::ArrayD::zeros(shape));
        to_channels_last(&raw, axis).unwrap().dim()
    }

    #[test]
    fn test_to_channels_last_moves_values() {
        let chw = Array3::from_shape_fn((3, 2, 2), |(c, y, x)| (c * 100 + y * 10 + x) as f32);
        let hwc = to_channels_last(&chw.clone().into(), 0).unwrap();
        assert_eq!(hwc[[1, 0, 2]], chw[[2, 1, 0]]);
        assert_eq!(hwc[[0, 1, 1]], chw[[1, 0, 1]]);
    }

    #[test]
    fn test_to_channels_last_rescales_bytes() {
        let raw: RawArray = Array3::from_elem((2, 2, 3), 255u8).into();
        let hwc = to_channels_last(&raw, -1).unwrap();
        assert!(hwc.iter().all(|&v| (v - 1.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_to_channels_last_grayscale_2d() {
        let raw: RawArray = Array2::<u16>::zeros((5, 7)).into();
        assert_eq!(to_channels_last(&raw, -1).unwrap().dim(), (5, 7, 1));
    }

    #[test]
    fn test_to_channels_last_rejects_other_ranks() {
        let raw = RawArray::U8(ndarray::ArrayD::zeros(vec![2, 2, 2, 2]));
        assert!(matches!(to_channels_last(&raw, -1), Err(Error::InvalidArgument(_))));

        let raw: RawArray = Array3::<u8>::zeros((2, 2, 3)).into();
        assert!(matches!(to_channels_last(&raw, 3), Err(Error::InvalidAxis { .. })));
    }

    #[test]
    fn test_to_layout() {
        let hwc = Array3::from_shape_fn((4, 5, 3), |(y, x, c)| (y * 100 + x * 10 + c) as f32);

        let chw = to_layout(hwc.clone(), 0).unwrap();
        assert_eq!(chw.dim(), (3, 4, 5));
        assert!(chw.is_standard_layout());
        assert_eq!(chw[[2, 3, 1]], hwc[[3, 1, 2]]);

        assert_eq!(to_layout(hwc.clone(), -1).unwrap(), hwc);
        assert_eq!(to_layout(hwc.clone(), 2).unwrap(), hwc);
    }

    #[test_case(1)]
    #[test_case(-2)]
    #[test_case(3)]
    fn test_to_layout_rejects_undefined_axes(axis: isize) {
        assert!(to_layout(Array3::zeros((2, 2, 3)), axis).is_err());
    }
}
