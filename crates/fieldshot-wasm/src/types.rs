//! WASM-compatible wrapper types for the compression pipeline.
//!
//! This module provides JavaScript-friendly types that wrap the core
//! Fieldshot types, handling the conversion between Rust and JavaScript
//! data representations.

use fieldshot_core::compress::{CompressionRequest, CompressionResult, DeviceClass, OutputFormat};
use serde::Deserialize;
use wasm_bindgen::prelude::*;

/// A compressed evidence photo, ready for upload.
///
/// Wraps the core `CompressionResult`. The encoded bytes live in WASM
/// memory; `data()` copies them out as a `Uint8Array` when the upload
/// flow needs them.
#[wasm_bindgen]
pub struct JsCompressedImage {
    inner: CompressionResult,
}

#[wasm_bindgen]
impl JsCompressedImage {
    /// Mime type of the encoded bytes (`image/webp` or `image/jpeg`).
    #[wasm_bindgen(getter)]
    pub fn mime_type(&self) -> String {
        self.inner.mime.clone()
    }

    /// Quality of the accepted attempt (0.0-1.0).
    #[wasm_bindgen(getter)]
    pub fn quality(&self) -> f32 {
        self.inner.quality
    }

    /// Output width in pixels.
    #[wasm_bindgen(getter)]
    pub fn width(&self) -> u32 {
        self.inner.width
    }

    /// Output height in pixels.
    #[wasm_bindgen(getter)]
    pub fn height(&self) -> u32 {
        self.inner.height
    }

    /// Number of encode attempts performed.
    #[wasm_bindgen(getter)]
    pub fn attempts(&self) -> u32 {
        self.inner.attempts
    }

    /// Wall-clock duration of the call in milliseconds.
    #[wasm_bindgen(getter)]
    pub fn elapsed_ms(&self) -> f64 {
        self.inner.elapsed_ms
    }

    /// Encoded size in bytes, without copying the data out.
    #[wasm_bindgen(getter)]
    pub fn byte_length(&self) -> usize {
        self.inner.data.len()
    }

    /// Returns the encoded bytes as a `Uint8Array`.
    ///
    /// Note: This creates a copy of the data so the JS side owns its
    /// buffer independently of WASM memory.
    pub fn data(&self) -> Vec<u8> {
        self.inner.data.clone()
    }

    /// Explicitly free WASM memory.
    ///
    /// This is optional - wasm-bindgen's finalizer will handle cleanup
    /// automatically. Call this to immediately release a large result.
    pub fn free(self) {
        // Dropping self releases the memory
    }
}

impl JsCompressedImage {
    /// Wrap a core result. Internal constructor used by the compress binding.
    pub(crate) fn from_result(inner: CompressionResult) -> Self {
        Self { inner }
    }
}

/// Compression options as passed from JavaScript.
///
/// Every field is optional; missing fields keep the defaults of the
/// selected device class (`standard` when unspecified). Field names are
/// camelCase on the JS side:
///
/// ```typescript
/// const options = {
///   deviceClass: 'constrained',
///   targetSizeBytes: 150 * 1024,
///   maxLongEdgePx: 1280,
///   outputFormat: 'webp',
/// };
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub(crate) struct CompressOptions {
    pub device_class: Option<String>,
    pub target_size_bytes: Option<usize>,
    pub max_long_edge_px: Option<u32>,
    pub min_quality: Option<f32>,
    pub max_quality: Option<f32>,
    pub quality_step: Option<f32>,
    pub max_attempts: Option<u32>,
    pub timeout_ms: Option<f64>,
    pub output_format: Option<String>,
}

impl CompressOptions {
    /// Apply these options on top of `request`. The device class preset
    /// is applied first so explicit fields override it.
    pub(crate) fn apply(self, request: CompressionRequest) -> Result<CompressionRequest, String> {
        let mut request = match self.device_class.as_deref() {
            None => request,
            Some("standard") => request.device_class(DeviceClass::Standard),
            Some("constrained") => request.device_class(DeviceClass::Constrained),
            Some(other) => return Err(format!("Unknown device class: {other}")),
        };

        if let Some(bytes) = self.target_size_bytes {
            request.target_size_bytes = bytes;
        }
        if let Some(pixels) = self.max_long_edge_px {
            request.max_long_edge_px = pixels;
        }
        if let Some(quality) = self.min_quality {
            request.min_quality = quality;
        }
        if let Some(quality) = self.max_quality {
            request.max_quality = quality;
        }
        if let Some(step) = self.quality_step {
            request.quality_step = step;
        }
        if let Some(attempts) = self.max_attempts {
            request.max_attempts = attempts;
        }
        if let Some(timeout) = self.timeout_ms {
            request.timeout_ms = timeout;
        }

        match self.output_format.as_deref() {
            None => {}
            Some("webp") => request.output_format = OutputFormat::Webp,
            Some("jpeg") | Some("jpg") => request.output_format = OutputFormat::Jpeg,
            Some(other) => return Err(format!("Unknown output format: {other}")),
        }

        Ok(request)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn base_request() -> CompressionRequest {
        CompressionRequest::new(vec![0u8; 8], "image/jpeg")
    }

    #[test]
    fn test_empty_options_keep_defaults() {
        let request = CompressOptions::default().apply(base_request()).unwrap();
        assert_eq!(request.target_size_bytes, 300 * 1024);
        assert_eq!(request.output_format, OutputFormat::Webp);
    }

    #[test]
    fn test_explicit_fields_override_device_class() {
        let options = CompressOptions {
            device_class: Some("constrained".to_string()),
            target_size_bytes: Some(64 * 1024),
            ..Default::default()
        };
        let request = options.apply(base_request()).unwrap();

        // Preset applied, then the explicit budget on top
        assert_eq!(request.max_long_edge_px, 1280);
        assert_eq!(request.target_size_bytes, 64 * 1024);
    }

    #[test]
    fn test_output_format_parsing() {
        let options = CompressOptions {
            output_format: Some("jpeg".to_string()),
            ..Default::default()
        };
        let request = options.apply(base_request()).unwrap();
        assert_eq!(request.output_format, OutputFormat::Jpeg);

        let options = CompressOptions {
            output_format: Some("bmp".to_string()),
            ..Default::default()
        };
        assert!(options.apply(base_request()).is_err());
    }

    #[test]
    fn test_unknown_device_class_is_rejected() {
        let options = CompressOptions {
            device_class: Some("quantum".to_string()),
            ..Default::default()
        };
        assert!(options.apply(base_request()).is_err());
    }

    #[test]
    fn test_wrapper_exposes_result_fields() {
        let result = CompressionResult {
            data: vec![1, 2, 3, 4],
            mime: "image/webp".to_string(),
            quality: 0.82,
            width: 1600,
            height: 1200,
            attempts: 2,
            elapsed_ms: 340.0,
        };
        let wrapped = JsCompressedImage::from_result(result);

        assert_eq!(wrapped.mime_type(), "image/webp");
        assert_eq!(wrapped.byte_length(), 4);
        assert_eq!(wrapped.data(), vec![1, 2, 3, 4]);
        assert_eq!((wrapped.width(), wrapped.height()), (1600, 1200));
        assert_eq!(wrapped.attempts(), 2);
    }
}
