//! Fieldshot WASM - WebAssembly bindings for the Fieldshot image pipeline
//!
//! This crate exposes the fieldshot-core pipeline to the field-inspection
//! web app:
//!
//! - `compress` - byte-budgeted compression of evidence photos before
//!   upload, with progress callbacks and cancellation
//! - `viewer` - the zoom/pan evidence viewer driven from DOM event
//!   handlers
//! - `types` - WASM-compatible wrapper types for results and options
//!
//! # Usage
//!
//! ```typescript
//! import init, { compress, Viewer } from '@fieldshot/wasm';
//!
//! // Initialize WASM module (must call first)
//! await init();
//!
//! // Compress a captured photo before upload
//! const bytes = new Uint8Array(await file.arrayBuffer());
//! const result = compress(bytes, file.type, { deviceClass: 'standard' });
//! console.log(`Compressed to ${result.byte_length} bytes in ${result.attempts} attempts`);
//! ```

use wasm_bindgen::prelude::*;

mod compress;
mod types;
mod viewer;

// Re-export public surface
pub use compress::{compress, compress_cancellable, CancelHandle};
pub use types::JsCompressedImage;
pub use viewer::Viewer;

/// Initialize the WASM module (called automatically on load)
#[wasm_bindgen(start)]
pub fn init() {
    // Future: Set up panic hook for better error messages in browser console
    // when console_error_panic_hook feature is added
}

/// Get the version of the WASM module
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
