//! Error types for the compression engine.

use thiserror::Error;

use super::request::OutputFormat;

/// Errors that can occur while decoding source bytes into a bitmap.
#[derive(Debug, Error)]
pub enum DecodeError {
    /// The declared mime type is not one the pipeline accepts.
    #[error("Unsupported source mime type: {0}")]
    UnsupportedMime(String),

    /// The bytes are not a decodable image.
    #[error("Invalid or unsupported image format")]
    InvalidFormat,

    /// The image data is corrupted or incomplete.
    #[error("Corrupted or incomplete image data: {0}")]
    Corrupted(String),
}

/// Errors that can occur while encoding a bitmap to output bytes.
#[derive(Debug, Error)]
pub enum EncodeError {
    /// Width or height is zero.
    #[error("Invalid dimensions: width ({width}) and height ({height}) must be non-zero")]
    InvalidDimensions { width: u32, height: u32 },

    /// Pixel data length doesn't match expected dimensions.
    #[error("Invalid pixel data: expected {expected} bytes (width * height * 3), got {actual}")]
    InvalidPixelData { expected: usize, actual: usize },

    /// The codec produced no bytes for this attempt.
    #[error("{format:?} encoding failed: {reason}")]
    EncodingFailed {
        format: OutputFormat,
        reason: String,
    },
}

/// Terminal outcome of a failed compression call.
///
/// Every failure path of [`compress`](super::compress) resolves to exactly one
/// of these variants; the engine never returns an oversized result and never
/// panics on bad input.
#[derive(Debug, Error)]
pub enum CompressError {
    /// The request violates its own declared parameter constraints.
    #[error("Invalid compression request: {0}")]
    InvalidRequest(&'static str),

    /// The source bytes could not be decoded.
    #[error(transparent)]
    Decode(#[from] DecodeError),

    /// An encode attempt produced no usable bytes.
    #[error(transparent)]
    Encode(#[from] EncodeError),

    /// The quality search exhausted `max_attempts` without meeting the byte
    /// budget. `smallest_bytes` is the smallest encoding seen, for diagnostics.
    #[error("Size budget unreachable after {attempts} attempts (smallest encoding: {smallest_bytes} bytes)")]
    BudgetUnreachable { attempts: u32, smallest_bytes: usize },

    /// The wall-clock deadline elapsed before an attempt was accepted.
    #[error("Compression timed out after {elapsed_ms:.0} ms")]
    Timeout { elapsed_ms: f64 },

    /// The caller's cancellation token was triggered.
    #[error("Compression cancelled by caller")]
    Cancelled,
}
