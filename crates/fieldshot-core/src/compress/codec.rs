//! The codec seam of the compression engine.
//!
//! The engine treats image codecs as a black box: decode bytes into a
//! bitmap, resample it, and encode it at a quality level. This trait is
//! that boundary. The production implementation is
//! [`RasterCodec`](super::raster::RasterCodec); tests substitute
//! instrumented fakes to pin down the engine's loop behavior without
//! real codecs.
//!
//! Bitmaps are owned values. Dropping one releases its buffer, so the
//! engine's scoped ownership guarantees release on every exit path.

use super::error::{DecodeError, EncodeError};
use super::request::OutputFormat;

/// Black-box decode/resample/encode capability used by the engine.
pub trait Codec {
    /// An owned, decoded raster buffer.
    type Bitmap;

    /// Decode source bytes into a bitmap.
    ///
    /// `mime` is the caller-declared source type; implementations may use
    /// it to reject unsupported inputs before sniffing the bytes.
    fn decode(&self, bytes: &[u8], mime: &str) -> Result<Self::Bitmap, DecodeError>;

    /// Pixel dimensions of a bitmap, as `(width, height)`.
    fn dimensions(&self, bitmap: &Self::Bitmap) -> (u32, u32);

    /// Resample a bitmap to exact dimensions with a high-quality filter.
    fn resize(&self, bitmap: &Self::Bitmap, width: u32, height: u32)
        -> Result<Self::Bitmap, DecodeError>;

    /// Encode a bitmap at `quality` in `[0.0, 1.0]`.
    fn encode(
        &self,
        bitmap: &Self::Bitmap,
        format: OutputFormat,
        quality: f32,
    ) -> Result<Vec<u8>, EncodeError>;
}
