//! Axis resolution and permutation helpers

use ndarray::ArrayD;

use crate::error::{Error, Result};

/// Resolves a possibly negative axis index against `ndim` dimensions.
///
/// Non-negative indices are returned as-is, negative ones count from the
/// right so `-1` is the last axis.
pub fn resolve_axis(axis: isize, ndim: usize) -> Result<usize> {
    let resolved = if axis >= 0 {
        axis.unsigned_abs()
    } else {
        match ndim.checked_sub(axis.unsigned_abs()) {
            Some(resolved) => resolved,
            None => return Err(Error::InvalidAxis { axis, ndim }),
        }
    };

    if resolved >= ndim {
        return Err(Error::InvalidAxis { axis, ndim });
    }

    Ok(resolved)
}

/// Permutation that moves axis `source` to position `destination` while
/// keeping every other axis in its original relative order.
pub fn move_axis_order(ndim: usize, source: usize, destination: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..ndim).filter(|&axis| axis != source).collect();
    order.insert(destination, source);
    order
}

/// Moves axis `source` of `array` to `destination`.
///
/// Both indices follow [`resolve_axis`]. The returned array is a
/// permuted view of the same data and is not necessarily contiguous.
pub fn move_axis<T>(array: ArrayD<T>, source: isize, destination: isize) -> Result<ArrayD<T>> {
    let ndim = array.ndim();
    let source = resolve_axis(source, ndim)?;
    let destination = resolve_axis(destination, ndim)?;

    if source == destination {
        return Ok(array);
    }

    let order = move_axis_order(ndim, source, destination);
    Ok(array.permuted_axes(order))
}
