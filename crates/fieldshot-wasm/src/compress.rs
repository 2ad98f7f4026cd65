//! Compression WASM bindings.
//!
//! This module exposes the fieldshot-core compression engine to the
//! upload flow. The engine runs synchronously inside a Web Worker; the
//! progress callback is invoked on the call path, so a slow device still
//! surfaces attempt-by-attempt feedback (and can cancel from inside the
//! callback via a [`CancelHandle`]).
//!
//! # Example
//!
//! ```typescript
//! import { compress, CancelHandle } from '@fieldshot/wasm';
//!
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const cancel = new CancelHandle();
//! const result = compress_cancellable(
//!   bytes,
//!   file.type,
//!   { deviceClass: 'constrained', targetSizeBytes: 150 * 1024 },
//!   (event) => console.log(event.status, event.encodedSizeBytes),
//!   cancel,
//! );
//! await upload(result.data(), result.mime_type);
//! ```

use fieldshot_core::compress::{
    compress as run_engine, CancelToken, Clock, CompressionRequest, ProgressEvent, ProgressSink,
    RasterCodec,
};
use js_sys::Function;
use wasm_bindgen::prelude::*;

use crate::types::{CompressOptions, JsCompressedImage};

/// Wall clock backed by `Date.now()`.
///
/// `std::time::Instant` is unavailable on `wasm32-unknown-unknown`, so
/// the deadline race reads JavaScript time instead.
struct DateClock;

impl Clock for DateClock {
    fn now_ms(&self) -> f64 {
        js_sys::Date::now()
    }
}

/// Cancellation handle for an in-flight compression call.
///
/// Because the engine runs synchronously in its worker, the practical
/// place to cancel from the same thread is the progress callback; other
/// threads (or other workers sharing the token) can cancel at any time.
#[wasm_bindgen]
pub struct CancelHandle {
    token: CancelToken,
}

#[wasm_bindgen]
impl CancelHandle {
    /// Create a fresh, un-cancelled handle.
    #[wasm_bindgen(constructor)]
    pub fn new() -> CancelHandle {
        CancelHandle {
            token: CancelToken::new(),
        }
    }

    /// Abort the associated call at its next step boundary.
    pub fn cancel(&self) {
        self.token.cancel();
    }

    /// Whether cancellation has been requested.
    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Default for CancelHandle {
    fn default() -> Self {
        Self::new()
    }
}

/// Compress evidence photo bytes to fit the configured byte budget.
///
/// # Arguments
///
/// * `bytes` - Raw source image bytes (JPEG, PNG, or WebP) as a `Uint8Array`
/// * `mime` - Declared mime type of the source (e.g. `file.type`)
/// * `options` - Optional JS object with camelCase fields; see
///   [`CompressOptions`](crate::types) for the accepted keys
/// * `on_progress` - Optional callback receiving progress event objects
///
/// # Returns
///
/// A [`JsCompressedImage`] whose size is guaranteed to be within the
/// byte budget, or an error string naming the typed failure
/// (decode/encode error, unreachable budget, timeout, cancellation).
#[wasm_bindgen]
pub fn compress(
    bytes: &[u8],
    mime: &str,
    options: JsValue,
    on_progress: Option<Function>,
) -> Result<JsCompressedImage, JsValue> {
    compress_inner(bytes, mime, options, on_progress, None)
}

/// [`compress`] with a cancellation handle attached.
#[wasm_bindgen]
pub fn compress_cancellable(
    bytes: &[u8],
    mime: &str,
    options: JsValue,
    on_progress: Option<Function>,
    cancel: &CancelHandle,
) -> Result<JsCompressedImage, JsValue> {
    compress_inner(bytes, mime, options, on_progress, Some(&cancel.token))
}

fn compress_inner(
    bytes: &[u8],
    mime: &str,
    options: JsValue,
    on_progress: Option<Function>,
    cancel: Option<&CancelToken>,
) -> Result<JsCompressedImage, JsValue> {
    let request = build_request(bytes, mime, options)?;

    let mut callback_sink = on_progress.map(|callback| {
        move |event: &ProgressEvent| {
            if let Ok(value) = serde_wasm_bindgen::to_value(event) {
                if callback.call1(&JsValue::NULL, &value).is_err() {
                    web_sys::console::warn_1(&JsValue::from_str(
                        "fieldshot: progress callback threw; continuing",
                    ));
                }
            }
        }
    });
    let sink: Option<ProgressSink<'_>> = match callback_sink.as_mut() {
        Some(sink) => Some(sink),
        None => None,
    };

    run_engine(&RasterCodec::new(), &DateClock, &request, sink, cancel)
        .map(JsCompressedImage::from_result)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

fn build_request(bytes: &[u8], mime: &str, options: JsValue) -> Result<CompressionRequest, JsValue> {
    let request = CompressionRequest::new(bytes.to_vec(), mime);
    if options.is_undefined() || options.is_null() {
        return Ok(request);
    }

    let parsed: CompressOptions =
        serde_wasm_bindgen::from_value(options).map_err(|e| JsValue::from_str(&e.to_string()))?;
    parsed.apply(request).map_err(|e| JsValue::from_str(&e))
}


/// WASM-specific tests that require JsValue.
///
/// These use functions that return `Result<T, JsValue>` and can only
/// run on wasm32 targets. Use `wasm-pack test` to run these.
#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    #[wasm_bindgen_test]
    fn test_compress_rejects_garbage_bytes() {
        let result = compress(b"not an image", "image/jpeg", JsValue::UNDEFINED, None);
        assert!(result.is_err());
    }

    #[wasm_bindgen_test]
    fn test_compress_rejects_unknown_device_class() {
        let options = js_sys::Object::new();
        js_sys::Reflect::set(
            &options,
            &"deviceClass".into(),
            &"quantum".into(),
        )
        .unwrap();

        let result = compress(b"bytes", "image/jpeg", options.into(), None);
        assert!(result.is_err());
    }

    #[wasm_bindgen_test]
    fn test_cancelled_handle_aborts_before_decode() {
        let handle = CancelHandle::new();
        handle.cancel();

        let result =
            compress_cancellable(b"bytes", "image/jpeg", JsValue::UNDEFINED, None, &handle);
        let err = result.err().expect("cancelled call must fail");
        let message = err.as_string().unwrap_or_default();
        assert!(message.contains("cancelled"));
    }
}
