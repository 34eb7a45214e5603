//! Element type descriptions for raw arrays

use std::fmt;

use serde::{Deserialize, Serialize};

/// Numeric element type of a raw array
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DataType {
    /// 8-bit unsigned integer
    UInt8,

    /// 16-bit unsigned integer
    UInt16,

    /// 32-bit signed integer
    Int32,

    /// 64-bit signed integer
    Int64,

    /// 32-bit floating point
    Float32,

    /// 64-bit floating point
    Float64,
}

impl DataType {
    /// Value that maps to full intensity when pixels are rescaled to `[0, 1]`.
    ///
    /// Wide signed integers are treated as byte-range pixels stored in a
    /// larger type. Floating point values are assumed to already be in
    /// `[0, 1]`.
    pub fn pixel_max(self) -> f32 {
        match self {
            DataType::UInt8 | DataType::Int32 | DataType::Int64 => 255.0,
            DataType::UInt16 => 65535.0,
            DataType::Float32 | DataType::Float64 => 1.0,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataType::UInt8 => "uint8",
            DataType::UInt16 => "uint16",
            DataType::Int32 => "int32",
            DataType::Int64 => "int64",
            DataType::Float32 => "float32",
            DataType::Float64 => "float64",
        };
        f.write_str(name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case(DataType::UInt8, 255.0)]
    #[test_case(DataType::UInt16, 65535.0)]
    #[test_case(DataType::Int32, 255.0)]
    #[test_case(DataType::Int64, 255.0)]
    #[test_case(DataType::Float32, 1.0)]
    #[test_case(DataType::Float64, 1.0)]
    fn test_data_type_pixel_max(dtype: DataType, max: f32) {
        assert!((dtype.pixel_max() - max).abs() < f32::EPSILON);
    }

    #[test]
    fn test_data_type_display() {
        assert_eq!(DataType::UInt8.to_string(), "uint8");
        assert_eq!(DataType::Float64.to_string(), "float64");
    }
}
