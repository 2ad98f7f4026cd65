//! Viewer session state: image list, navigation, and load lifecycle.
//!
//! A [`ViewerSession`] is owned by the screen that opens it and holds the
//! only mutable copy of the transform. Closing the session resets all
//! state; reopening always starts from the caller-supplied initial index,
//! never from a previously left zoom/scroll position.

use thiserror::Error;

use serde::Serialize;

use super::gesture::GestureRecognizer;
use super::transform::{Size, Transform, Vec2};

/// Multiplicative step applied by the discrete zoom buttons.
pub const BUTTON_ZOOM_FACTOR: f32 = 1.5;

/// Zoom factor per 100 units of wheel delta.
pub const WHEEL_ZOOM_FACTOR: f32 = 1.25;

/// Errors opening a viewer session.
#[derive(Debug, Error)]
pub enum ViewerError {
    /// The reference list was empty.
    #[error("Cannot open a viewer session with no images")]
    EmptyImageList,
}

/// Load lifecycle of a single image reference.
///
/// A failing reference is retried once with the normalized URL, then
/// marked [`LoadState::Broken`] for the rest of the session. A broken
/// index renders as a placeholder; it never affects navigation or the
/// other indices.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum LoadState {
    /// Not requested yet.
    Pending,
    /// First attempt in flight, using the raw stored reference.
    Loading,
    /// Second attempt in flight, using the normalized URL.
    Retrying,
    /// Displayable.
    Loaded,
    /// Both attempts failed; shown as a broken-image placeholder.
    Broken,
}

/// Per-reference load bookkeeping.
#[derive(Debug)]
struct LoadSlot {
    state: LoadState,
    natural: Option<Size>,
}

impl LoadSlot {
    fn new() -> Self {
        Self {
            state: LoadState::Pending,
            natural: None,
        }
    }
}

/// External URL-normalization collaborator: raw stored reference in,
/// reliably fetchable URL out. Treated as a pure function.
pub type UrlNormalizer = Box<dyn Fn(&str) -> String>;

/// An open viewing session over an ordered list of image references.
pub struct ViewerSession {
    references: Vec<String>,
    current: usize,
    open: bool,
    label: Option<String>,
    viewport: Size,
    transform: Transform,
    gesture: GestureRecognizer,
    slots: Vec<LoadSlot>,
    normalizer: Option<UrlNormalizer>,
}

impl ViewerSession {
    /// Open a session over `references`, starting at `initial_index`
    /// (wrapped into range), with an optional contextual label shown by
    /// the host (e.g. a site/unit identifier).
    pub fn open(
        references: Vec<String>,
        initial_index: usize,
        label: Option<String>,
    ) -> Result<Self, ViewerError> {
        if references.is_empty() {
            return Err(ViewerError::EmptyImageList);
        }
        let current = initial_index % references.len();
        let slots = references.iter().map(|_| LoadSlot::new()).collect();
        Ok(Self {
            references,
            current,
            open: true,
            label,
            viewport: Size::ZERO,
            transform: Transform::identity(),
            gesture: GestureRecognizer::new(),
            slots,
            normalizer: None,
        })
    }

    /// Attach the URL-normalization collaborator used for load retries.
    /// Without one, retries reuse the raw reference.
    pub fn with_url_normalizer(mut self, normalizer: UrlNormalizer) -> Self {
        self.set_url_normalizer(normalizer);
        self
    }

    /// Setter form of [`with_url_normalizer`](Self::with_url_normalizer).
    pub fn set_url_normalizer(&mut self, normalizer: UrlNormalizer) {
        self.normalizer = Some(normalizer);
    }

    // --- Introspection -----------------------------------------------------

    pub fn is_open(&self) -> bool {
        self.open
    }

    pub fn image_count(&self) -> usize {
        self.references.len()
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    /// The stored reference of the currently displayed image.
    pub fn current_reference(&self) -> &str {
        &self.references[self.current]
    }

    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    pub fn transform(&self) -> Transform {
        self.transform
    }

    /// Displayed content size at scale 1: the current image's natural
    /// size fitted into the viewport, aspect preserved. Falls back to
    /// the viewport until the image has loaded.
    pub fn content_size(&self) -> Size {
        let Some(natural) = self.slots[self.current].natural else {
            return self.viewport;
        };
        if natural.width <= 0.0 || natural.height <= 0.0 {
            return self.viewport;
        }
        let fit = (self.viewport.width / natural.width).min(self.viewport.height / natural.height);
        Size::new(natural.width * fit, natural.height * fit)
    }

    // --- Geometry ----------------------------------------------------------

    /// Update the visible viewport size; the committed transform is
    /// re-clamped into the new bounds.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = Size::new(width, height);
        self.transform = self.transform.clamped(self.content_size(), self.viewport);
    }

    // --- Navigation --------------------------------------------------------

    /// Advance to the next image, wrapping circularly.
    pub fn next(&mut self) {
        self.jump_to(self.current + 1);
    }

    /// Go back to the previous image, wrapping circularly.
    pub fn previous(&mut self) {
        self.jump_to(self.current + self.references.len() - 1);
    }

    /// Jump to an index (wrapped into range). Navigation always resets
    /// the transform to the identity.
    pub fn jump_to(&mut self, index: usize) {
        self.current = index % self.references.len();
        self.reset_transform();
    }

    /// Reset zoom and pan to the identity and drop any gesture tracking.
    pub fn reset_transform(&mut self) {
        self.transform = Transform::identity();
        self.gesture.reset();
    }

    /// Close the session. All transform state is reset; the session
    /// holds nothing worth restoring on reopen.
    pub fn close(&mut self) {
        self.open = false;
        self.reset_transform();
    }

    // --- Zoom controls -----------------------------------------------------

    /// Discrete zoom-in step, anchored at the viewport center.
    pub fn zoom_in(&mut self) {
        self.zoom_by(BUTTON_ZOOM_FACTOR, self.viewport.center());
    }

    /// Discrete zoom-out step, anchored at the viewport center.
    pub fn zoom_out(&mut self) {
        self.zoom_by(1.0 / BUTTON_ZOOM_FACTOR, self.viewport.center());
    }

    /// Continuous wheel/trackpad zoom anchored at the cursor. `delta_y`
    /// follows wheel-event conventions: negative scrolls zoom in.
    pub fn wheel_zoom(&mut self, cursor: Vec2, delta_y: f32) {
        let factor = WHEEL_ZOOM_FACTOR.powf(-delta_y / 100.0);
        self.zoom_by(factor, cursor);
    }

    fn zoom_by(&mut self, factor: f32, anchor: Vec2) {
        let target = self.transform.scale * factor;
        self.transform =
            self.transform
                .zoomed_at(anchor, target, self.content_size(), self.viewport);
    }

    // --- Gestures ----------------------------------------------------------

    /// Feed a pointer-down event. Returns true when the transform changed.
    pub fn touch_start(&mut self, touches: &[Vec2], time_ms: f64) -> bool {
        let content = self.content_size();
        let update =
            self.gesture
                .on_touch_start(touches, time_ms, self.transform, content, self.viewport);
        self.commit(update)
    }

    /// Feed a pointer-move event. `platform_ratio` is an optional
    /// platform-reported zoom ratio for this gesture.
    pub fn touch_move(&mut self, touches: &[Vec2], platform_ratio: Option<f32>) -> bool {
        let content = self.content_size();
        let update = self.gesture.on_touch_move(
            touches,
            platform_ratio,
            self.transform,
            content,
            self.viewport,
        );
        self.commit(update)
    }

    /// Feed a pointer-up event. `touches` are the points still active,
    /// `position` is where the lifted pointer released.
    pub fn touch_end(&mut self, touches: &[Vec2], position: Vec2, time_ms: f64) -> bool {
        let content = self.content_size();
        let update = self.gesture.on_touch_end(
            touches,
            position,
            time_ms,
            self.transform,
            content,
            self.viewport,
        );
        self.commit(update)
    }

    fn commit(&mut self, update: Option<Transform>) -> bool {
        match update {
            Some(transform) => {
                self.transform = transform;
                true
            }
            None => false,
        }
    }

    // --- Load lifecycle ----------------------------------------------------

    /// Begin loading `index`. Returns the URL to fetch, or `None` for an
    /// out-of-range or already-broken index.
    pub fn begin_load(&mut self, index: usize) -> Option<String> {
        let slot = self.slots.get_mut(index)?;
        match slot.state {
            LoadState::Broken => None,
            _ => {
                slot.state = LoadState::Loading;
                Some(self.references[index].clone())
            }
        }
    }

    /// Record a successful load and the image's natural pixel size.
    pub fn mark_loaded(&mut self, index: usize, natural_width: f32, natural_height: f32) {
        if let Some(slot) = self.slots.get_mut(index) {
            slot.state = LoadState::Loaded;
            slot.natural = Some(Size::new(natural_width, natural_height));
            if index == self.current {
                // Content size just changed; keep the transform legal.
                self.transform = self.transform.clamped(self.content_size(), self.viewport);
            }
        }
    }

    /// Record a failed load attempt for `index`.
    ///
    /// The first failure returns the normalized URL to retry with; the
    /// second returns `None` and marks the index broken. Other indices
    /// and navigation are unaffected either way.
    pub fn mark_failed(&mut self, index: usize) -> Option<String> {
        let slot = self.slots.get_mut(index)?;
        match slot.state {
            LoadState::Loading => {
                slot.state = LoadState::Retrying;
                let raw = &self.references[index];
                Some(match &self.normalizer {
                    Some(normalize) => normalize(raw),
                    None => raw.clone(),
                })
            }
            _ => {
                slot.state = LoadState::Broken;
                None
            }
        }
    }

    /// Load state of an index, or `None` when out of range.
    pub fn load_state(&self, index: usize) -> Option<LoadState> {
        self.slots.get(index).map(|slot| slot.state)
    }

    /// Whether an index has given up loading.
    pub fn is_broken(&self, index: usize) -> bool {
        self.load_state(index) == Some(LoadState::Broken)
    }
}
