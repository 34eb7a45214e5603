//! Resolves the raw array a record carries.

use std::borrow::Cow;

use tracing::debug;
use tuner_data_core::{Error as CoreError, RawArray, Record};
use tuner_data_readers::ImageLoader;

use crate::error::Result;

/// Returns the record's in-memory array, or decodes its resource.
///
/// The in-memory array wins when both are set and is borrowed as-is. A
/// decoded resource gets its channel axis at `channel_axis`, the same layout
/// in-memory arrays are expected to use. A record with neither is a
/// precondition violation and fails with a missing-attribute error.
pub fn resolve_source<'a>(
    record: &'a Record,
    loader: &ImageLoader,
    channel_axis: isize,
) -> Result<Cow<'a, RawArray>> {
    if let Some(tensor) = record.tensor() {
        debug!(
            record = %record.id(),
            source = "tensor",
            shape = ?tensor.shape(),
            dtype = %tensor.dtype(),
            "resolved record source"
        );
        return Ok(Cow::Borrowed(tensor));
    }

    if let Some(uri) = record.uri() {
        let decoded = loader.load(uri, channel_axis)?;
        debug!(
            record = %record.id(),
            source = "uri",
            uri,
            shape = ?decoded.shape(),
            "resolved record source"
        );
        return Ok(Cow::Owned(decoded));
    }

    Err(CoreError::MissingAttribute(format!(
        "record {} has neither `tensor` nor `uri` set",
        record.id()
    ))
    .into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use image::{Rgb, RgbImage};
    use ndarray::Array3;
    use tempfile::NamedTempFile;

    fn write_png(width: u32, height: u32) -> NamedTempFile {
        let img = RgbImage::from_pixel(width, height, Rgb([10, 20, 30]));
        let file = NamedTempFile::with_suffix(".png").unwrap();
        img.save(file.path()).unwrap();
        file
    }

    #[test]
    fn test_tensor_is_borrowed() {
        let record = Record::from_tensor(Array3::<f32>::zeros((4, 4, 3)));
        let resolved = resolve_source(&record, &ImageLoader::default(), -1).unwrap();
        assert!(matches!(resolved, Cow::Borrowed(_)));
        assert_eq!(resolved.shape(), &[4, 4, 3]);
    }

    #[test]
    fn test_tensor_wins_over_uri() {
        let record = Record::from_tensor(Array3::<u8>::zeros((2, 2, 1))).with_uri("missing.png");
        let resolved = resolve_source(&record, &ImageLoader::default(), -1).unwrap();
        assert_eq!(resolved.shape(), &[2, 2, 1]);
    }

    #[test]
    fn test_uri_is_decoded_with_channel_axis() {
        let file = write_png(6, 4);
        let record = Record::from_uri(file.path().to_string_lossy());

        let resolved = resolve_source(&record, &ImageLoader::default(), 0).unwrap();
        assert!(matches!(resolved, Cow::Owned(RawArray::U8(_))));
        assert_eq!(resolved.shape(), &[3, 4, 6]);
    }

    #[test]
    fn test_missing_source() {
        let err = resolve_source(&Record::new(), &ImageLoader::default(), -1).unwrap_err();
        assert!(err.is_missing_attribute());
        assert!(err.to_string().contains("neither `tensor` nor `uri`"));
    }

    #[test]
    fn test_decode_failure_propagates() {
        let record = Record::from_uri("does/not/exist.png");
        let err = resolve_source(&record, &ImageLoader::default(), -1).unwrap_err();
        assert!(matches!(err, Error::Reader(_)));
        assert!(!err.is_missing_attribute());
    }
}
