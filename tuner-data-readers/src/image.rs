//! Image resource decoding
//!
//! This module turns a resource locator into a decoded pixel array with the
//! channel axis wherever the caller expects it.

use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::io::Reader as ImageReader;
use image::DynamicImage;
use ndarray::Array3;
use serde::{Deserialize, Serialize};
use tracing::debug;

use tuner_data_core::{move_axis, RawArray};

use crate::error::{Error, Result};

/// Image format
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageFormat {
    /// JPEG format
    Jpeg,
    /// PNG format
    Png,
    /// BMP format
    Bmp,
    /// GIF format
    Gif,
    /// TIFF format
    Tiff,
    /// WebP format
    WebP,
    /// Unknown format
    Unknown,
}

impl ImageFormat {
    /// Detect image format from file extension
    pub fn from_extension(extension: &str) -> Self {
        match extension.to_lowercase().as_str() {
            "jpg" | "jpeg" => ImageFormat::Jpeg,
            "png" => ImageFormat::Png,
            "bmp" => ImageFormat::Bmp,
            "gif" => ImageFormat::Gif,
            "tiff" | "tif" => ImageFormat::Tiff,
            "webp" => ImageFormat::WebP,
            _ => ImageFormat::Unknown,
        }
    }

    /// Detect image format from magic bytes
    pub fn from_bytes(bytes: &[u8]) -> Self {
        match bytes {
            // JPEG: FF D8 FF
            [0xFF, 0xD8, 0xFF, ..] => ImageFormat::Jpeg,

            // PNG: 89 50 4E 47 0D 0A 1A 0A
            [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => ImageFormat::Png,

            // BMP: 42 4D
            [0x42, 0x4D, ..] => ImageFormat::Bmp,

            // GIF: 47 49 46 38
            [0x47, 0x49, 0x46, 0x38, ..] => ImageFormat::Gif,

            // TIFF: 49 49 2A 00 or 4D 4D 00 2A
            [0x49, 0x49, 0x2A, 0x00, ..] | [0x4D, 0x4D, 0x00, 0x2A, ..] => ImageFormat::Tiff,

            // WebP: 52 49 46 46 ?? ?? ?? ?? 57 45 42 50
            [0x52, 0x49, 0x46, 0x46, _, _, _, _, 0x57, 0x45, 0x42, 0x50, ..] => ImageFormat::WebP,

            _ => ImageFormat::Unknown,
        }
    }

    /// Detect from magic bytes, falling back to the path's extension
    pub fn detect(bytes: &[u8], path: &Path) -> Self {
        match Self::from_bytes(bytes) {
            ImageFormat::Unknown => path
                .extension()
                .and_then(|ext| ext.to_str())
                .map_or(ImageFormat::Unknown, Self::from_extension),
            format => format,
        }
    }

    fn codec(self) -> Option<image::ImageFormat> {
        match self {
            ImageFormat::Jpeg => Some(image::ImageFormat::Jpeg),
            ImageFormat::Png => Some(image::ImageFormat::Png),
            ImageFormat::Bmp => Some(image::ImageFormat::Bmp),
            ImageFormat::Gif => Some(image::ImageFormat::Gif),
            ImageFormat::Tiff => Some(image::ImageFormat::Tiff),
            ImageFormat::WebP => Some(image::ImageFormat::WebP),
            ImageFormat::Unknown => None,
        }
    }
}

/// Color model decoded images are converted to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColorMode {
    /// Three channel RGB
    #[default]
    Rgb,
    /// Single channel luminance
    Luma,
    /// Four channel RGBA
    Rgba,
    /// Native 8-bit channel count (L, LA, RGB, RGBA); anything else becomes RGB
    Keep,
}

/// Options for the image reader
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ImageReaderOptions {
    /// Color model of the decoded array
    pub color_mode: ColorMode,
}

/// Decodes images referenced by a resource locator into [`RawArray`]s.
#[derive(Debug, Clone, Default)]
pub struct ImageLoader {
    options: ImageReaderOptions,
}

impl ImageLoader {
    /// Create a loader with the given options
    pub fn new(options: ImageReaderOptions) -> Self {
        Self { options }
    }

    /// Resolve a locator to a local path.
    ///
    /// Plain paths and `file://` URIs are accepted; every other scheme is
    /// rejected. A `file://` URI must name no host or `localhost`. Paths are
    /// used verbatim, so percent-escapes such as `%20` are not decoded.
    pub fn parse_locator(uri: &str) -> Result<PathBuf> {
        if uri.is_empty() {
            return Err(Error::InvalidArgument("empty resource locator".into()));
        }

        if let Some(rest) = uri.strip_prefix("file://") {
            let path = rest.strip_prefix("localhost").unwrap_or(rest);
            if !path.starts_with('/') {
                return Err(Error::Unsupported(format!(
                    "file URIs must refer to the local host, got '{uri}'"
                )));
            }
            return Ok(PathBuf::from(path));
        }

        if uri.starts_with("data:") || uri.contains("://") {
            return Err(Error::Unsupported(format!(
                "only local paths and file:// URIs can be loaded, got '{uri}'"
            )));
        }

        Ok(PathBuf::from(uri))
    }

    /// Load and decode the image at `uri`, placing channels at `channel_axis`
    /// (negative counts from the right).
    pub fn load(&self, uri: &str, channel_axis: isize) -> Result<RawArray> {
        let path = Self::parse_locator(uri)?;

        if !path.exists() {
            return Err(Error::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                format!("Image file not found: {}", path.display()),
            )));
        }

        let bytes = std::fs::read(&path)?;
        let format = ImageFormat::detect(&bytes, &path);
        let image = Self::decode_bytes(bytes, format)?;

        let pixels = self.to_pixels(&image)?;
        debug!(
            path = %path.display(),
            ?format,
            shape = ?pixels.shape(),
            channel_axis,
            "decoded image resource"
        );

        let moved = move_axis(pixels.into_dyn(), -1, channel_axis)?;
        Ok(RawArray::U8(moved))
    }

    /// Decode raw bytes, trusting `format` when it is known.
    pub fn decode_bytes(bytes: Vec<u8>, format: ImageFormat) -> Result<DynamicImage> {
        let reader = match format.codec() {
            Some(codec) => ImageReader::with_format(Cursor::new(bytes), codec),
            None => ImageReader::new(Cursor::new(bytes)).with_guessed_format()?,
        };

        if reader.format().is_none() {
            return Err(Error::Format("unrecognised image format".into()));
        }

        Ok(reader.decode()?)
    }

    /// Convert a decoded image to an `(H, W, C)` byte array.
    pub fn to_pixels(&self, image: &DynamicImage) -> Result<Array3<u8>> {
        let (width, height) = (image.width() as usize, image.height() as usize);

        let (raw, channels) = match (self.options.color_mode, image) {
            (ColorMode::Rgb, _) => (image.to_rgb8().into_raw(), 3),
            (ColorMode::Luma, _) => (image.to_luma8().into_raw(), 1),
            (ColorMode::Rgba, _) => (image.to_rgba8().into_raw(), 4),
            (ColorMode::Keep, DynamicImage::ImageLuma8(buffer)) => (buffer.as_raw().clone(), 1),
            (ColorMode::Keep, DynamicImage::ImageLumaA8(buffer)) => (buffer.as_raw().clone(), 2),
            (ColorMode::Keep, DynamicImage::ImageRgba8(buffer)) => (buffer.as_raw().clone(), 4),
            (ColorMode::Keep, _) => (image.to_rgb8().into_raw(), 3),
        };

        Array3::from_shape_vec((height, width, channels), raw)
            .map_err(|e| Error::Core(e.into()))
    }
}
