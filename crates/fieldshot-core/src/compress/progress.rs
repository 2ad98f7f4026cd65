//! Progress notifications emitted during a compression call.
//!
//! Events are transient: consumers may log or render them, but they carry
//! no control authority. The engine does not depend on what the sink does
//! with them (cancellation goes through
//! [`CancelToken`](super::CancelToken), not the sink).

use serde::Serialize;

/// Phase of the compression call an event was emitted from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum ProgressStatus {
    /// Decoding and resampling the source, before the first attempt.
    PreProcessing,
    /// An encode attempt finished and its size was measured.
    Compressing,
    /// An attempt met the byte budget; the call is about to return it.
    Compressed,
    /// The wall-clock deadline elapsed.
    Timeout,
    /// The call is failing with a decode/encode/budget/cancel error.
    Error,
}

/// A snapshot of the current attempt, pushed to the caller's sink.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressEvent {
    /// Phase of the call.
    pub status: ProgressStatus,
    /// 1-based attempt index; 0 before the first attempt.
    pub attempt: u32,
    /// Quality of the current attempt.
    pub quality: f32,
    /// Encoded size of the current attempt, once measured.
    pub encoded_size_bytes: Option<usize>,
    /// Target-resolution width; 0 until computed.
    pub width: u32,
    /// Target-resolution height; 0 until computed.
    pub height: u32,
}

/// Caller-supplied progress sink, invoked synchronously on the call path.
pub type ProgressSink<'a> = &'a mut dyn FnMut(&ProgressEvent);
