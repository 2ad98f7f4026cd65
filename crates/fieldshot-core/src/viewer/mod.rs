//! Interactive zoom/pan viewer for uploaded evidence photos.
//!
//! The viewer is split into three layers, all free of platform types:
//!
//! - [`transform`] - the focal-point-preserving zoom/pan math and its
//!   clamping invariants.
//! - [`gesture`] - disambiguation of pointer streams into pan, pinch,
//!   tap, and double-tap.
//! - [`session`] - the open session: ordered references, circular
//!   navigation, per-image load lifecycle, and ownership of the
//!   committed transform.
//!
//! The host (a WASM binding in production, plain Rust in tests) feeds
//! pointer positions and load outcomes in, and reads the committed
//! transform back out for rendering. The viewer itself never fetches or
//! mutates remote data.

pub mod gesture;
pub mod session;
pub mod transform;

pub use gesture::{GestureRecognizer, GestureState, DOUBLE_TAP_SLOP_PX, DOUBLE_TAP_WINDOW_MS};
pub use session::{
    LoadState, UrlNormalizer, ViewerError, ViewerSession, BUTTON_ZOOM_FACTOR, WHEEL_ZOOM_FACTOR,
};
pub use transform::{Size, Transform, Vec2, DOUBLE_TAP_SCALE, MAX_SCALE, MIN_SCALE};
