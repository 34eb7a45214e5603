//! Raw N-dimensional arrays carried by records

use ndarray::{Array, ArrayD, Dimension};

use crate::schema::DataType;

/// A decoded N-dimensional array tagged with its element type.
///
/// Records arrive with pixels in whatever type the producer used. The
/// preprocessor only needs to read them once, so every variant is an owned
/// dynamic-rank [`ArrayD`].
#[derive(Debug, Clone, PartialEq)]
pub enum RawArray {
    /// 8-bit unsigned pixels, usually `0..=255`
    U8(ArrayD<u8>),
    /// 16-bit unsigned pixels
    U16(ArrayD<u16>),
    /// 32-bit signed values
    I32(ArrayD<i32>),
    /// 64-bit signed values
    I64(ArrayD<i64>),
    /// 32-bit floats
    F32(ArrayD<f32>),
    /// 64-bit floats
    F64(ArrayD<f64>),
}

macro_rules! impl_from_array {
    ($($ty:ty => $variant:ident),* $(,)?) => {
        $(
            impl<D: Dimension> From<Array<$ty, D>> for RawArray {
                fn from(array: Array<$ty, D>) -> Self {
                    RawArray::$variant(array.into_dyn())
                }
            }
        )*
    };
}

impl_from_array!(
    u8 => U8,
    u16 => U16,
    i32 => I32,
    i64 => I64,
    f32 => F32,
    f64 => F64,
);

impl RawArray {
    /// Element type of this array
    pub fn dtype(&self) -> DataType {
        match self {
            RawArray::U8(_) => DataType::UInt8,
            RawArray::U16(_) => DataType::UInt16,
            RawArray::I32(_) => DataType::Int32,
            RawArray::I64(_) => DataType::Int64,
            RawArray::F32(_) => DataType::Float32,
            RawArray::F64(_) => DataType::Float64,
        }
    }

    /// Shape of this array
    pub fn shape(&self) -> &[usize] {
        match self {
            RawArray::U8(a) => a.shape(),
            RawArray::U16(a) => a.shape(),
            RawArray::I32(a) => a.shape(),
            RawArray::I64(a) => a.shape(),
            RawArray::F32(a) => a.shape(),
            RawArray::F64(a) => a.shape(),
        }
    }

    /// Number of dimensions
    pub fn ndim(&self) -> usize {
        self.shape().len()
    }

    /// Casts to `f32` and rescales integer pixels into `[0, 1]`.
    ///
    /// The divisor is [`DataType::pixel_max`]; floating point arrays are
    /// only cast.
    pub fn to_unit_f32(&self) -> ArrayD<f32> {
        self.map_f32(self.dtype().pixel_max())
    }

    fn map_f32(&self, divisor: f32) -> ArrayD<f32> {
        match self {
            RawArray::U8(a) => a.mapv(|v| f32::from(v) / divisor),
            RawArray::U16(a) => a.mapv(|v| f32::from(v) / divisor),
            RawArray::I32(a) => a.mapv(|v| v as f32 / divisor),
            RawArray::I64(a) => a.mapv(|v| v as f32 / divisor),
            RawArray::F32(a) => a.mapv(|v| v / divisor),
            RawArray::F64(a) => a.mapv(|v| v as f32 / divisor),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array2, Array3};

    #[test]
    fn test_raw_array_from_typed_arrays() {
        let raw: RawArray = Array3::<u8>::zeros((4, 5, 3)).into();
        assert_eq!(raw.dtype(), DataType::UInt8);
        assert_eq!(raw.shape(), &[4, 5, 3]);
        assert_eq!(raw.ndim(), 3);

        let raw: RawArray = Array2::<f64>::zeros((2, 2)).into();
        assert_eq!(raw.dtype(), DataType::Float64);
        assert_eq!(raw.ndim(), 2);
    }

    #[test]
    fn test_raw_array_empty() {
        let raw: RawArray = Array3::<f32>::zeros((0, 8, 3)).into();
        assert_eq!(raw.to_unit_f32().shape(), &[0, 8, 3]);
    }

    #[test]
    fn test_to_unit_f32_rescales_integers() {
        let raw: RawArray = Array2::from_shape_vec((1, 3), vec![0u8, 51, 255]).unwrap().into();
        let unit = raw.to_unit_f32();
        let values: Vec<f32> = unit.iter().copied().collect();
        assert_eq!(values, vec![0.0, 0.2, 1.0]);

        let raw: RawArray = Array2::from_shape_vec((1, 2), vec![0u16, 65535]).unwrap().into();
        let values: Vec<f32> = raw.to_unit_f32().iter().copied().collect();
        assert_eq!(values, vec![0.0, 1.0]);
    }

    #[test]
    fn test_to_unit_f32_keeps_floats() {
        let raw: RawArray = Array2::from_shape_vec((1, 2), vec![0.25f64, 0.75]).unwrap().into();
        let values: Vec<f32> = raw.to_unit_f32().iter().copied().collect();
        assert_eq!(values, vec![0.25, 0.75]);
    }
}
