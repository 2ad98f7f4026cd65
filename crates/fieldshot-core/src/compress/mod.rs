//! Adaptive, size-constrained image compression.
//!
//! This module implements the compression engine run before every
//! evidence upload: decode the source once, resample once to a capped
//! resolution, then walk encoding quality downward until the output fits
//! the byte budget or the attempt/deadline budget runs out.
//!
//! # Algorithm
//!
//! 1. Decode the source bytes into a bitmap ([`DecodeError`] on failure).
//! 2. Compute target dimensions once: the longer edge is capped at
//!    `max_long_edge_px`, aspect ratio preserved, never upscaled.
//! 3. Resample once at high quality, then release the full-resolution
//!    bitmap immediately. Peak memory is bounded by one full-resolution
//!    buffer plus one target-resolution buffer.
//! 4. Encode at `max_quality`, then step quality down by `quality_step`
//!    (clamped to `min_quality`) until an attempt fits
//!    `target_size_bytes`, up to `max_attempts` attempts. The search is
//!    greedy: it returns the highest tested quality that fits, assuming
//!    encoded size shrinks as quality drops.
//! 5. Exhausting the attempts fails with
//!    [`CompressError::BudgetUnreachable`] - the engine never returns an
//!    oversized result.
//! 6. The whole call races a wall-clock deadline and a caller-supplied
//!    [`CancelToken`], both checked at every step boundary.
//!
//! Resolution is fixed after step 2; the engine reduces only quality,
//! never dimensions, when the budget is hard to meet.
//!
//! # Concurrency
//!
//! One call holds no shared mutable state: independent calls may be
//! interleaved freely. Within a call, attempts are strictly sequential
//! in decreasing quality order.

mod cancel;
mod clock;
mod codec;
mod error;
mod progress;
mod raster;
mod request;

pub use cancel::CancelToken;
pub use clock::{Clock, SystemClock};
pub use codec::Codec;
pub use error::{CompressError, DecodeError, EncodeError};
pub use progress::{ProgressEvent, ProgressSink, ProgressStatus};
pub use raster::{Bitmap, RasterCodec};
pub use request::{CompressionRequest, DeviceClass, OutputFormat};

/// Terminal output of a successful compression call.
#[derive(Debug, Clone)]
pub struct CompressionResult {
    /// Encoded image bytes, guaranteed `<= target_size_bytes`.
    pub data: Vec<u8>,
    /// Mime type of the encoded bytes.
    pub mime: String,
    /// Quality of the accepted attempt.
    pub quality: f32,
    /// Output width in pixels.
    pub width: u32,
    /// Output height in pixels.
    pub height: u32,
    /// Number of encode attempts performed, including the accepted one.
    pub attempts: u32,
    /// Wall-clock duration of the call in milliseconds.
    pub elapsed_ms: f64,
}

/// Calculate target dimensions under a long-edge cap.
///
/// If the longer edge already fits, the source dimensions are returned
/// unchanged - the engine never upscales. Otherwise both dimensions are
/// scaled by `max_long_edge / long_edge` and rounded to the nearest
/// pixel, preserving the aspect ratio within rounding.
pub fn fit_dimensions(width: u32, height: u32, max_long_edge: u32) -> (u32, u32) {
    let long_edge = width.max(height);
    if long_edge <= max_long_edge {
        return (width, height);
    }

    let ratio = max_long_edge as f64 / long_edge as f64;
    let new_width = ((width as f64 * ratio).round() as u32).max(1);
    let new_height = ((height as f64 * ratio).round() as u32).max(1);
    (new_width, new_height)
}

/// Compress `request.source` to fit `request.target_size_bytes`.
///
/// Progress events are pushed synchronously to `on_progress` as the call
/// advances; `cancel` aborts the call at the next step boundary. See the
/// module docs for the algorithm and [`CompressError`] for the failure
/// taxonomy. The call owns all intermediate buffers and releases them on
/// every exit path.
pub fn compress<'a, C: Codec>(
    codec: &'a C,
    clock: &'a dyn Clock,
    request: &'a CompressionRequest,
    on_progress: Option<ProgressSink<'a>>,
    cancel: Option<&'a CancelToken>,
) -> Result<CompressionResult, CompressError> {
    let started = clock.now_ms();
    let deadline = if request.timeout_ms > 0.0 {
        Some(started + request.timeout_ms)
    } else {
        None
    };

    let mut engine = Engine {
        codec,
        clock,
        request,
        sink: on_progress,
        cancel,
        started,
        deadline,
        attempt: 0,
        quality: request.max_quality,
        encoded: None,
        width: 0,
        height: 0,
    };

    let result = engine.run();
    if let Err(err) = &result {
        let status = match err {
            CompressError::Timeout { .. } => ProgressStatus::Timeout,
            _ => ProgressStatus::Error,
        };
        engine.emit(status);
    }
    result
}

/// Per-call state: the request, the injected seams, and the fields of
/// the current attempt for progress reporting.
struct Engine<'a, C: Codec> {
    codec: &'a C,
    clock: &'a dyn Clock,
    request: &'a CompressionRequest,
    sink: Option<ProgressSink<'a>>,
    cancel: Option<&'a CancelToken>,
    started: f64,
    deadline: Option<f64>,
    attempt: u32,
    quality: f32,
    encoded: Option<usize>,
    width: u32,
    height: u32,
}

impl<C: Codec> Engine<'_, C> {
    fn emit(&mut self, status: ProgressStatus) {
        let event = ProgressEvent {
            status,
            attempt: self.attempt,
            quality: self.quality,
            encoded_size_bytes: self.encoded,
            width: self.width,
            height: self.height,
        };
        if let Some(sink) = self.sink.as_mut() {
            (*sink)(&event);
        }
    }

    /// Cancellation and deadline check, run at every step boundary.
    fn guard(&self) -> Result<(), CompressError> {
        if let Some(token) = self.cancel {
            if token.is_cancelled() {
                return Err(CompressError::Cancelled);
            }
        }
        if let Some(deadline) = self.deadline {
            let now = self.clock.now_ms();
            if now >= deadline {
                return Err(CompressError::Timeout {
                    elapsed_ms: now - self.started,
                });
            }
        }
        Ok(())
    }

    fn run(&mut self) -> Result<CompressionResult, CompressError> {
        self.request.validate()?;
        self.emit(ProgressStatus::PreProcessing);

        self.guard()?;
        let decoded = self
            .codec
            .decode(&self.request.source, &self.request.mime)?;
        let (src_width, src_height) = self.codec.dimensions(&decoded);

        let (width, height) = fit_dimensions(src_width, src_height, self.request.max_long_edge_px);
        self.width = width;
        self.height = height;

        self.guard()?;
        let surface = if (width, height) != (src_width, src_height) {
            let resized = self.codec.resize(&decoded, width, height)?;
            // Full-resolution buffer is dead from here on; release it
            // before the encode loop starts.
            drop(decoded);
            resized
        } else {
            decoded
        };

        let mut smallest_bytes = usize::MAX;
        for attempt in 1..=self.request.max_attempts {
            let quality = (self.request.max_quality
                - self.request.quality_step * (attempt - 1) as f32)
                .max(self.request.min_quality);
            self.attempt = attempt;
            self.quality = quality;
            self.encoded = None;

            self.guard()?;
            let data = self
                .codec
                .encode(&surface, self.request.output_format, quality)?;
            // An attempt whose deadline already passed is abandoned, not
            // measured or accepted.
            self.guard()?;

            let size = data.len();
            smallest_bytes = smallest_bytes.min(size);
            self.encoded = Some(size);
            self.emit(ProgressStatus::Compressing);

            if size <= self.request.target_size_bytes {
                self.emit(ProgressStatus::Compressed);
                return Ok(CompressionResult {
                    data,
                    mime: self.request.output_format.mime_type().to_string(),
                    quality,
                    width,
                    height,
                    attempts: attempt,
                    elapsed_ms: self.clock.now_ms() - self.started,
                });
            }
        }

        Err(CompressError::BudgetUnreachable {
            attempts: self.request.max_attempts,
            smallest_bytes,
        })
    }
}


// ============================================================================
// Property-Based Tests
// ============================================================================
