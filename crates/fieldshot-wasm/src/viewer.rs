//! Evidence viewer WASM bindings.
//!
//! This module wraps [`ViewerSession`] in a JS class the host screen
//! drives from its DOM event handlers. Touch points cross the boundary
//! as flat `[x0, y0, x1, y1, ...]` arrays; the committed transform comes
//! back as separate scale/translate getters or a ready-made CSS
//! transform string.
//!
//! # Example
//!
//! ```typescript
//! import { Viewer } from '@fieldshot/wasm';
//!
//! const viewer = new Viewer(photoRefs, startIndex, 'Unit 4B');
//! viewer.set_url_normalizer((raw) => resolveImageUrl(raw));
//! viewer.set_viewport(container.clientWidth, container.clientHeight);
//!
//! container.addEventListener('touchmove', (e) => {
//!   if (viewer.touch_move(flatten(e.touches), e.scale)) {
//!     img.style.transform = viewer.css_transform();
//!   }
//! });
//! ```

use fieldshot_core::viewer::{Vec2, ViewerSession};
use js_sys::Function;
use wasm_bindgen::prelude::*;

/// Convert a flat `[x0, y0, x1, y1, ...]` array into touch points.
/// A trailing odd coordinate is ignored.
fn parse_points(flat: &[f32]) -> Vec<Vec2> {
    flat.chunks_exact(2)
        .map(|pair| Vec2::new(pair[0], pair[1]))
        .collect()
}

/// Invoke a best-effort host callback with one string argument,
/// swallowing any exception it throws.
fn call_silently(callback: &Option<Function>, argument: &str) {
    if let Some(callback) = callback {
        let _ = callback.call1(&JsValue::NULL, &JsValue::from_str(argument));
    }
}

/// Interactive viewer over an ordered list of uploaded image references.
#[wasm_bindgen]
pub struct Viewer {
    session: ViewerSession,
    on_close: Option<Function>,
    on_download: Option<Function>,
    on_share: Option<Function>,
}

#[wasm_bindgen]
impl Viewer {
    /// Open a viewer over `references`, starting at `initial_index`
    /// (wrapped into range), with an optional contextual label.
    #[wasm_bindgen(constructor)]
    pub fn new(
        references: Vec<String>,
        initial_index: usize,
        label: Option<String>,
    ) -> Result<Viewer, JsValue> {
        let session = ViewerSession::open(references, initial_index, label)
            .map_err(|e| JsValue::from_str(&e.to_string()))?;
        Ok(Viewer {
            session,
            on_close: None,
            on_download: None,
            on_share: None,
        })
    }

    // --- Host callbacks ----------------------------------------------------

    /// Attach the URL-normalization collaborator: `(rawRef) => url`.
    /// Used once per image when the first load attempt fails.
    pub fn set_url_normalizer(&mut self, normalize: Function) {
        self.session.set_url_normalizer(Box::new(move |raw: &str| {
            normalize
                .call1(&JsValue::NULL, &JsValue::from_str(raw))
                .ok()
                .and_then(|value| value.as_string())
                .unwrap_or_else(|| raw.to_string())
        }));
    }

    /// Attach a callback invoked when the viewer closes (explicit close,
    /// escape key, or external dismissal routed through `close()`).
    pub fn set_on_close(&mut self, callback: Function) {
        self.on_close = Some(callback);
    }

    /// Attach the host's download capability: `(currentRef) => void`.
    /// Without one, `download_current` silently does nothing.
    pub fn set_on_download(&mut self, callback: Function) {
        self.on_download = Some(callback);
    }

    /// Attach the host's share capability: `(currentRef) => void`.
    /// Without one, `share_current` silently does nothing.
    pub fn set_on_share(&mut self, callback: Function) {
        self.on_share = Some(callback);
    }

    // --- Geometry and state ------------------------------------------------

    /// Update the visible viewport size (call on open and on resize).
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.session.set_viewport(width, height);
    }

    #[wasm_bindgen(getter)]
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }

    #[wasm_bindgen(getter)]
    pub fn image_count(&self) -> usize {
        self.session.image_count()
    }

    #[wasm_bindgen(getter)]
    pub fn current_index(&self) -> usize {
        self.session.current_index()
    }

    /// The stored reference of the currently displayed image.
    #[wasm_bindgen(getter)]
    pub fn current_reference(&self) -> String {
        self.session.current_reference().to_string()
    }

    /// Contextual label supplied at open, for display only.
    #[wasm_bindgen(getter)]
    pub fn label(&self) -> Option<String> {
        self.session.label().map(str::to_string)
    }

    #[wasm_bindgen(getter)]
    pub fn scale(&self) -> f32 {
        self.session.transform().scale
    }

    #[wasm_bindgen(getter)]
    pub fn translate_x(&self) -> f32 {
        self.session.transform().translate.x
    }

    #[wasm_bindgen(getter)]
    pub fn translate_y(&self) -> f32 {
        self.session.transform().translate.y
    }

    /// The committed transform as a CSS `transform` value for an element
    /// centered in the viewport.
    pub fn css_transform(&self) -> String {
        let transform = self.session.transform();
        format!(
            "translate({:.3}px, {:.3}px) scale({:.4})",
            transform.translate.x, transform.translate.y, transform.scale
        )
    }

    // --- Navigation --------------------------------------------------------

    /// Advance to the next image (wraps around; resets zoom).
    pub fn next(&mut self) {
        self.session.next();
    }

    /// Go back to the previous image (wraps around; resets zoom).
    pub fn previous(&mut self) {
        self.session.previous();
    }

    /// Jump to an index (wrapped into range; resets zoom).
    pub fn jump_to(&mut self, index: usize) {
        self.session.jump_to(index);
    }

    /// Keyboard bindings: ArrowLeft/ArrowRight navigate, Escape closes.
    /// Returns true when the key was handled.
    pub fn handle_key(&mut self, key: &str) -> bool {
        match key {
            "ArrowLeft" => {
                self.previous();
                true
            }
            "ArrowRight" => {
                self.next();
                true
            }
            "Escape" => {
                self.close();
                true
            }
            _ => false,
        }
    }

    /// Close the session, reset all transform state, and notify the host.
    pub fn close(&mut self) {
        self.session.close();
        if let Some(callback) = &self.on_close {
            let _ = callback.call0(&JsValue::NULL);
        }
    }

    // --- Zoom and gestures -------------------------------------------------

    /// Discrete zoom-in step, anchored at the viewport center.
    pub fn zoom_in(&mut self) {
        self.session.zoom_in();
    }

    /// Discrete zoom-out step, anchored at the viewport center.
    pub fn zoom_out(&mut self) {
        self.session.zoom_out();
    }

    /// Reset zoom and pan to the identity.
    pub fn reset_zoom(&mut self) {
        self.session.reset_transform();
    }

    /// Wheel/trackpad zoom anchored at the cursor position.
    pub fn wheel(&mut self, cursor_x: f32, cursor_y: f32, delta_y: f32) {
        self.session.wheel_zoom(Vec2::new(cursor_x, cursor_y), delta_y);
    }

    /// Pointer-down with all active touch points as `[x0, y0, x1, y1, ...]`.
    /// Returns true when the transform changed (double-tap toggles here).
    pub fn touch_start(&mut self, points: Vec<f32>, time_ms: f64) -> bool {
        self.session.touch_start(&parse_points(&points), time_ms)
    }

    /// Pointer-move with all active touch points. `platform_ratio` is an
    /// optional platform-reported zoom ratio for the current gesture
    /// (e.g. `event.scale` where available).
    pub fn touch_move(&mut self, points: Vec<f32>, platform_ratio: Option<f32>) -> bool {
        self.session.touch_move(&parse_points(&points), platform_ratio)
    }

    /// Pointer-up with the remaining touch points and the release
    /// position of the lifted pointer.
    pub fn touch_end(
        &mut self,
        points: Vec<f32>,
        release_x: f32,
        release_y: f32,
        time_ms: f64,
    ) -> bool {
        self.session.touch_end(
            &parse_points(&points),
            Vec2::new(release_x, release_y),
            time_ms,
        )
    }

    // --- Host integration --------------------------------------------------

    /// Download the currently displayed image through the host's
    /// capability. Best-effort: a missing callback is a silent no-op.
    pub fn download_current(&self) {
        call_silently(&self.on_download, self.session.current_reference());
    }

    /// Share the currently displayed image through the host's
    /// capability. Best-effort: a missing callback is a silent no-op.
    pub fn share_current(&self) {
        call_silently(&self.on_share, self.session.current_reference());
    }

    // --- Load lifecycle ----------------------------------------------------

    /// Begin loading an index; returns the URL to fetch, or undefined
    /// for an out-of-range or already-broken index.
    pub fn begin_load(&mut self, index: usize) -> Option<String> {
        self.session.begin_load(index)
    }

    /// Record a successful image load and its natural pixel size.
    pub fn image_loaded(&mut self, index: usize, natural_width: f32, natural_height: f32) {
        self.session.mark_loaded(index, natural_width, natural_height);
    }

    /// Record a failed image load. Returns the normalized URL for the
    /// one retry, or undefined once the index has given up (the host
    /// should then render the broken-image placeholder).
    pub fn image_failed(&mut self, index: usize) -> Option<String> {
        let retry = self.session.mark_failed(index);
        if retry.is_none() && self.session.is_broken(index) {
            web_sys::console::warn_1(&JsValue::from_str(&format!(
                "fieldshot: image {index} failed to load after retry"
            )));
        }
        retry
    }

    /// Whether an index has given up loading.
    pub fn is_broken(&self, index: usize) -> bool {
        self.session.is_broken(index)
    }
}
