//! Fieldshot Core - Client-side image pipeline
//!
//! This crate provides the image pipeline of the Fieldshot field-inspection
//! app: adaptive byte-budgeted compression of evidence photos before
//! upload, and the zoom/pan/gesture core of the evidence viewer. It runs
//! on-device (in the browser via the `fieldshot-wasm` bindings) under the
//! memory and responsiveness constraints of low-end mobile hardware.
//!
//! # Components
//!
//! - [`compress`] - decode, resample to a capped resolution, then walk
//!   encoding quality downward until the output fits a byte budget, under
//!   a wall-clock deadline. See [`compress::compress`].
//! - [`viewer`] - focal-point-preserving zoom/pan transforms, gesture
//!   disambiguation, and session/navigation state for viewing uploaded
//!   evidence. See [`viewer::ViewerSession`].
//!
//! The two components are independent; the surrounding application
//! composes them (compress before upload, view after download).

pub mod compress;
pub mod viewer;

pub use compress::{
    compress, CancelToken, CompressError, CompressionRequest, CompressionResult, RasterCodec,
    SystemClock,
};
pub use viewer::{Transform, ViewerSession};
