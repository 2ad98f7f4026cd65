//! Production codec built on the `image` and `webp` crates.
//!
//! Decoding applies EXIF orientation correction, since camera evidence
//! photos routinely arrive rotated via metadata rather than pixels.
//! Resampling uses Lanczos3. JPEG encoding goes through the `image`
//! crate's encoder; lossy WebP goes through `libwebp` via the `webp`
//! crate, because the `image` crate only encodes lossless WebP.

use std::io::Cursor;

use exif::{In, Reader, Tag};
use image::codecs::jpeg::JpegEncoder;
use image::DynamicImage;
use image::ExtendedColorType;
use image::ImageEncoder;
use image::ImageReader;

use super::codec::Codec;
use super::error::{DecodeError, EncodeError};
use super::request::OutputFormat;

/// Source mime types the pipeline accepts.
const SUPPORTED_MIMES: &[&str] = &["image/jpeg", "image/jpg", "image/png", "image/webp"];

/// A decoded image with RGB pixel data.
#[derive(Debug, Clone)]
pub struct Bitmap {
    /// Image width in pixels.
    pub width: u32,
    /// Image height in pixels.
    pub height: u32,
    /// RGB pixel data in row-major order (3 bytes per pixel).
    pub pixels: Vec<u8>,
}

impl Bitmap {
    /// Create a new bitmap from dimensions and pixel data.
    pub fn new(width: u32, height: u32, pixels: Vec<u8>) -> Self {
        debug_assert_eq!(
            pixels.len(),
            (width as usize) * (height as usize) * 3,
            "Pixel buffer size mismatch"
        );
        Self {
            width,
            height,
            pixels,
        }
    }

    /// Create a bitmap from an `image::RgbImage`.
    pub fn from_rgb_image(img: image::RgbImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            pixels: img.into_raw(),
        }
    }

    /// Convert to an `image::RgbImage` for further processing.
    pub fn to_rgb_image(&self) -> Option<image::RgbImage> {
        image::RgbImage::from_raw(self.width, self.height, self.pixels.clone())
    }

    /// Size of the pixel buffer in bytes.
    pub fn byte_size(&self) -> usize {
        self.pixels.len()
    }
}

/// EXIF orientation values (1-8).
/// See: https://exiftool.org/TagNames/EXIF.html
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum Orientation {
    #[default]
    Normal,
    FlipHorizontal,
    Rotate180,
    FlipVertical,
    Transpose,
    Rotate90CW,
    Transverse,
    Rotate270CW,
}

impl From<u32> for Orientation {
    fn from(value: u32) -> Self {
        match value {
            2 => Orientation::FlipHorizontal,
            3 => Orientation::Rotate180,
            4 => Orientation::FlipVertical,
            5 => Orientation::Transpose,
            6 => Orientation::Rotate90CW,
            7 => Orientation::Transverse,
            8 => Orientation::Rotate270CW,
            _ => Orientation::Normal,
        }
    }
}

/// Extract EXIF orientation from image bytes.
///
/// Returns `Orientation::Normal` if no EXIF data is found or orientation
/// cannot be determined (PNG and most WebP sources have none).
fn extract_orientation(bytes: &[u8]) -> Orientation {
    let exif_reader = Reader::new();
    let mut cursor = Cursor::new(bytes);

    match exif_reader.read_from_container(&mut cursor) {
        Ok(exif) => {
            if let Some(field) = exif.get_field(Tag::Orientation, In::PRIMARY) {
                if let Some(value) = field.value.get_uint(0) {
                    return Orientation::from(value);
                }
            }
            Orientation::Normal
        }
        Err(_) => Orientation::Normal,
    }
}

/// Apply EXIF orientation transformation to an image.
fn apply_orientation(img: DynamicImage, orientation: Orientation) -> DynamicImage {
    match orientation {
        Orientation::Normal => img,
        Orientation::FlipHorizontal => img.fliph(),
        Orientation::Rotate180 => img.rotate180(),
        Orientation::FlipVertical => img.flipv(),
        Orientation::Transpose => img.rotate90().fliph(),
        Orientation::Rotate90CW => img.rotate90(),
        Orientation::Transverse => img.rotate270().fliph(),
        Orientation::Rotate270CW => img.rotate270(),
    }
}

/// Map a `[0.0, 1.0]` quality to the 1-100 scale shared by both encoders.
fn quality_to_percent(quality: f32) -> f32 {
    (quality.clamp(0.0, 1.0) * 100.0).max(1.0)
}

/// The production [`Codec`]: `image`-crate decode/resize, JPEG and lossy
/// WebP encode.
#[derive(Debug, Clone, Copy, Default)]
pub struct RasterCodec;

impl RasterCodec {
    /// Create a new codec instance.
    pub fn new() -> Self {
        Self
    }
}

impl Codec for RasterCodec {
    type Bitmap = Bitmap;

    fn decode(&self, bytes: &[u8], mime: &str) -> Result<Bitmap, DecodeError> {
        if !SUPPORTED_MIMES.contains(&mime) {
            return Err(DecodeError::UnsupportedMime(mime.to_string()));
        }

        let orientation = extract_orientation(bytes);

        let reader = ImageReader::new(Cursor::new(bytes))
            .with_guessed_format()
            .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

        if reader.format().is_none() {
            return Err(DecodeError::InvalidFormat);
        }

        let img = reader
            .decode()
            .map_err(|e| DecodeError::Corrupted(e.to_string()))?;

        let oriented = apply_orientation(img, orientation);
        Ok(Bitmap::from_rgb_image(oriented.into_rgb8()))
    }

    fn dimensions(&self, bitmap: &Bitmap) -> (u32, u32) {
        (bitmap.width, bitmap.height)
    }

    fn resize(&self, bitmap: &Bitmap, width: u32, height: u32) -> Result<Bitmap, DecodeError> {
        if width == 0 || height == 0 {
            return Err(DecodeError::InvalidFormat);
        }

        // Fast path: if dimensions match, just clone
        if bitmap.width == width && bitmap.height == height {
            return Ok(bitmap.clone());
        }

        let rgb_image = bitmap
            .to_rgb_image()
            .ok_or_else(|| DecodeError::Corrupted("Failed to create RgbImage".to_string()))?;

        let resized = image::imageops::resize(
            &rgb_image,
            width,
            height,
            image::imageops::FilterType::Lanczos3,
        );

        Ok(Bitmap::from_rgb_image(resized))
    }

    fn encode(
        &self,
        bitmap: &Bitmap,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, EncodeError> {
        if bitmap.width == 0 || bitmap.height == 0 {
            return Err(EncodeError::InvalidDimensions {
                width: bitmap.width,
                height: bitmap.height,
            });
        }

        let expected_len = (bitmap.width as usize) * (bitmap.height as usize) * 3;
        if bitmap.pixels.len() != expected_len {
            return Err(EncodeError::InvalidPixelData {
                expected: expected_len,
                actual: bitmap.pixels.len(),
            });
        }

        let percent = quality_to_percent(quality);

        let data = match format {
            OutputFormat::Jpeg => {
                let mut buffer = Cursor::new(Vec::new());
                let encoder =
                    JpegEncoder::new_with_quality(&mut buffer, percent.round() as u8);
                encoder
                    .write_image(
                        &bitmap.pixels,
                        bitmap.width,
                        bitmap.height,
                        ExtendedColorType::Rgb8,
                    )
                    .map_err(|e| EncodeError::EncodingFailed {
                        format,
                        reason: e.to_string(),
                    })?;
                buffer.into_inner()
            }
            OutputFormat::Webp => {
                let encoder = webp::Encoder::from_rgb(&bitmap.pixels, bitmap.width, bitmap.height);
                encoder.encode(percent).to_vec()
            }
        };

        if data.is_empty() {
            return Err(EncodeError::EncodingFailed {
                format,
                reason: "encoder produced no bytes".to_string(),
            });
        }

        Ok(data)
    }
}
