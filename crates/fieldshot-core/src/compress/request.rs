//! Compression request configuration.
//!
//! A [`CompressionRequest`] carries the source bytes and the full budget
//! configuration for one compression call. Requests are built with chained
//! setters on top of per-device-class defaults and are never mutated once
//! the call starts.

use serde::{Deserialize, Serialize};

use super::error::CompressError;

/// Output encoding for compressed evidence photos.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OutputFormat {
    /// WebP lossy encoding (generally smaller at equivalent quality).
    #[default]
    Webp,

    /// JPEG encoding.
    Jpeg,
}

impl OutputFormat {
    /// The mime type reported for results in this format.
    pub fn mime_type(self) -> &'static str {
        match self {
            OutputFormat::Webp => "image/webp",
            OutputFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Coarse device class used to pick default budgets.
///
/// Constrained devices (low-end phones on poor connections) get tighter
/// byte and resolution budgets and a longer deadline to compensate for
/// slower encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DeviceClass {
    /// Typical phone or desktop hardware.
    #[default]
    Standard,

    /// Low-memory or low-bandwidth hardware.
    Constrained,
}

/// Immutable configuration for one compression call.
///
/// # Defaults
///
/// Defaults come from [`DeviceClass::Standard`]:
///
/// - `target_size_bytes`: 300 KiB (150 KiB constrained)
/// - `max_long_edge_px`: 1920 (1280 constrained)
/// - `quality range`: 0.5–0.92 (0.4–0.85 constrained)
/// - `quality_step`: 0.1
/// - `max_attempts`: 6
/// - `timeout_ms`: 10 000 (15 000 constrained); 0 disables the deadline
/// - `output_format`: WebP
#[derive(Debug, Clone)]
pub struct CompressionRequest {
    /// Raw source image bytes (JPEG, PNG, or WebP).
    pub source: Vec<u8>,
    /// Declared mime type of the source bytes.
    pub mime: String,
    /// Maximum acceptable output size in bytes.
    pub target_size_bytes: usize,
    /// Maximum pixel length of the output's longer edge.
    pub max_long_edge_px: u32,
    /// Lowest quality the search may reach (0.0–1.0).
    pub min_quality: f32,
    /// Quality of the first attempt (0.0–1.0).
    pub max_quality: f32,
    /// Fixed decrement applied between attempts.
    pub quality_step: f32,
    /// Total attempt budget for the quality search.
    pub max_attempts: u32,
    /// Wall-clock deadline for the whole call. 0 disables the deadline.
    pub timeout_ms: f64,
    /// Output encoding.
    pub output_format: OutputFormat,
}

impl CompressionRequest {
    /// Create a request with [`DeviceClass::Standard`] defaults.
    pub fn new(source: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            source,
            mime: mime.into(),
            target_size_bytes: 300 * 1024,
            max_long_edge_px: 1920,
            min_quality: 0.5,
            max_quality: 0.92,
            quality_step: 0.1,
            max_attempts: 6,
            timeout_ms: 10_000.0,
            output_format: OutputFormat::default(),
        }
    }

    /// Apply the default budgets for a device class. Individual settings
    /// can be overridden after this call.
    pub fn device_class(mut self, class: DeviceClass) -> Self {
        match class {
            DeviceClass::Standard => {
                self.target_size_bytes = 300 * 1024;
                self.max_long_edge_px = 1920;
                self.min_quality = 0.5;
                self.max_quality = 0.92;
                self.timeout_ms = 10_000.0;
            }
            DeviceClass::Constrained => {
                self.target_size_bytes = 150 * 1024;
                self.max_long_edge_px = 1280;
                self.min_quality = 0.4;
                self.max_quality = 0.85;
                self.timeout_ms = 15_000.0;
            }
        }
        self
    }

    /// Set the maximum acceptable output size in bytes.
    pub fn target_size_bytes(mut self, bytes: usize) -> Self {
        self.target_size_bytes = bytes;
        self
    }

    /// Set the maximum pixel length of the output's longer edge.
    pub fn max_long_edge_px(mut self, pixels: u32) -> Self {
        self.max_long_edge_px = pixels;
        self
    }

    /// Set the quality search range (both 0.0–1.0, `min <= max`).
    pub fn quality_range(mut self, min: f32, max: f32) -> Self {
        self.min_quality = min;
        self.max_quality = max;
        self
    }

    /// Set the fixed quality decrement between attempts.
    pub fn quality_step(mut self, step: f32) -> Self {
        self.quality_step = step;
        self
    }

    /// Set the total attempt budget.
    pub fn max_attempts(mut self, attempts: u32) -> Self {
        self.max_attempts = attempts;
        self
    }

    /// Set the wall-clock deadline in milliseconds. 0 disables the deadline.
    pub fn timeout_ms(mut self, timeout: f64) -> Self {
        self.timeout_ms = timeout;
        self
    }

    /// Set the output encoding.
    pub fn output_format(mut self, format: OutputFormat) -> Self {
        self.output_format = format;
        self
    }

    /// Check the declared parameter constraints.
    pub(crate) fn validate(&self) -> Result<(), CompressError> {
        if self.target_size_bytes == 0 {
            return Err(CompressError::InvalidRequest(
                "target_size_bytes must be greater than zero",
            ));
        }
        if self.max_long_edge_px == 0 {
            return Err(CompressError::InvalidRequest(
                "max_long_edge_px must be greater than zero",
            ));
        }
        if !(self.min_quality > 0.0 && self.min_quality <= self.max_quality) {
            return Err(CompressError::InvalidRequest(
                "quality range must satisfy 0 < min_quality <= max_quality",
            ));
        }
        if self.max_quality > 1.0 {
            return Err(CompressError::InvalidRequest(
                "max_quality must not exceed 1.0",
            ));
        }
        if self.quality_step <= 0.0 {
            return Err(CompressError::InvalidRequest(
                "quality_step must be greater than zero",
            ));
        }
        if self.max_attempts == 0 {
            return Err(CompressError::InvalidRequest(
                "max_attempts must be at least 1",
            ));
        }
        if self.timeout_ms < 0.0 {
            return Err(CompressError::InvalidRequest(
                "timeout_ms must not be negative",
            ));
        }
        Ok(())
    }
}
