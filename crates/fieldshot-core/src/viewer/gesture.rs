//! Gesture disambiguation for the evidence viewer.
//!
//! A [`GestureRecognizer`] classifies a stream of pointer/touch events
//! into pan, pinch, tap, and double-tap, and computes the resulting
//! transform updates. It is a pure state machine over positions and
//! timestamps - no platform event types anywhere - so the disambiguation
//! logic is unit-testable without simulating real pointer hardware.
//!
//! Event methods take the set of active touch points *after* the event
//! applied, the committed [`Transform`], and the content/viewport
//! geometry. They return `Some(transform)` when the caller should commit
//! a new transform.
//!
//! Platform-reported zoom signals (e.g. trackpad gesture scale delivered
//! alongside a single touch) enter as an `Option<f32>` ratio blended with
//! the distance-derived ratio; the core math never branches on platform.

use super::transform::{Size, Transform, Vec2, DOUBLE_TAP_SCALE, MIN_SCALE};

/// Maximum delay between two taps that still counts as a double-tap.
pub const DOUBLE_TAP_WINDOW_MS: f64 = 250.0;

/// Maximum distance between two taps that still counts as a double-tap.
pub const DOUBLE_TAP_SLOP_PX: f32 = 32.0;

/// Maximum travel between press and release for the release to count as
/// a tap.
const TAP_MOVE_SLOP_PX: f32 = 8.0;

/// Pinches starting closer than this give no usable distance ratio.
const MIN_PINCH_DISTANCE_PX: f32 = 10.0;

/// Which gesture the active pointer sequence has been classified as.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GestureState {
    /// No gesture in progress.
    Idle,
    /// Single-pointer pan. `start` is the press position, `origin` the
    /// translate at press time.
    Panning { start: Vec2, origin: Vec2 },
    /// Two-pointer (or platform-signalled) pinch. `start_distance` is
    /// `None` when the fingers began too close together or the pinch was
    /// promoted from a platform zoom signal.
    Pinching {
        start_distance: Option<f32>,
        start_scale: f32,
    },
}

/// Timestamped single-tap candidate, kept for double-tap detection.
#[derive(Debug, Clone, Copy)]
struct TapRecord {
    time_ms: f64,
    position: Vec2,
}

/// Blend the distance-derived pinch ratio with an optional
/// platform-reported one. With both present they are averaged to smooth
/// cross-platform variance; with neither, the pinch is inert.
fn blend_zoom_ratio(distance: Option<f32>, platform: Option<f32>) -> f32 {
    match (distance, platform) {
        (Some(d), Some(p)) => (d + p) / 2.0,
        (Some(d), None) => d,
        (None, Some(p)) => p,
        (None, None) => 1.0,
    }
}

/// Target transform for a double-tap at `anchor`: scale 1 toggles to
/// [`DOUBLE_TAP_SCALE`] anchored at the tap point, anything above 1
/// toggles back to the identity. Never any other scale.
fn double_tap_target(
    transform: Transform,
    anchor: Vec2,
    content: Size,
    viewport: Size,
) -> Transform {
    if transform.scale > MIN_SCALE + 1e-3 {
        Transform::identity()
    } else {
        transform.zoomed_at(anchor, DOUBLE_TAP_SCALE, content, viewport)
    }
}

/// State machine turning touch events into transform updates.
#[derive(Debug)]
pub struct GestureRecognizer {
    state: GestureState,
    last_tap: Option<TapRecord>,
    pending_press: Option<Vec2>,
}

impl Default for GestureRecognizer {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureRecognizer {
    pub fn new() -> Self {
        Self {
            state: GestureState::Idle,
            last_tap: None,
            pending_press: None,
        }
    }

    /// Current classification of the active pointer sequence.
    pub fn state(&self) -> GestureState {
        self.state
    }

    /// Drop all gesture and tap tracking (index change, session close).
    pub fn reset(&mut self) {
        self.state = GestureState::Idle;
        self.last_tap = None;
        self.pending_press = None;
    }

    /// A pointer went down; `touches` are all active points including it.
    pub fn on_touch_start(
        &mut self,
        touches: &[Vec2],
        time_ms: f64,
        transform: Transform,
        content: Size,
        viewport: Size,
    ) -> Option<Transform> {
        match touches.len() {
            0 => None,
            1 => {
                let position = touches[0];

                // Double-tap: second press inside the window, near the
                // first release.
                if let Some(tap) = self.last_tap.take() {
                    if time_ms - tap.time_ms <= DOUBLE_TAP_WINDOW_MS
                        && position.distance(tap.position) <= DOUBLE_TAP_SLOP_PX
                    {
                        self.state = GestureState::Idle;
                        self.pending_press = None;
                        return Some(double_tap_target(transform, position, content, viewport));
                    }
                }

                self.pending_press = Some(position);
                if transform.scale > MIN_SCALE + 1e-3 {
                    self.state = GestureState::Panning {
                        start: position,
                        origin: transform.translate,
                    };
                } else {
                    self.state = GestureState::Idle;
                }
                None
            }
            _ => {
                let distance = touches[0].distance(touches[1]);
                self.state = GestureState::Pinching {
                    start_distance: (distance >= MIN_PINCH_DISTANCE_PX).then_some(distance),
                    start_scale: transform.scale,
                };
                self.last_tap = None;
                self.pending_press = None;
                None
            }
        }
    }

    /// Active pointers moved. `platform_ratio` is an optional
    /// platform-reported zoom ratio relative to the gesture start.
    pub fn on_touch_move(
        &mut self,
        touches: &[Vec2],
        platform_ratio: Option<f32>,
        transform: Transform,
        content: Size,
        viewport: Size,
    ) -> Option<Transform> {
        match self.state {
            GestureState::Panning { start, origin } if touches.len() == 1 => {
                let next = Transform {
                    scale: transform.scale,
                    translate: origin + (touches[0] - start),
                };
                Some(next.clamped(content, viewport))
            }
            GestureState::Pinching {
                start_distance,
                start_scale,
            } if !touches.is_empty() => {
                let (midpoint, distance_ratio) = if touches.len() >= 2 {
                    let midpoint = Vec2::midpoint(touches[0], touches[1]);
                    let ratio = start_distance
                        .map(|d0| touches[0].distance(touches[1]) / d0);
                    (midpoint, ratio)
                } else {
                    (touches[0], None)
                };

                let ratio = blend_zoom_ratio(distance_ratio, platform_ratio);
                Some(transform.zoomed_at(midpoint, start_scale * ratio, content, viewport))
            }
            GestureState::Idle if touches.len() == 1 && platform_ratio.is_some() => {
                // Native secondary zoom signal alongside a single touch:
                // promote straight to a pinch with no distance basis.
                self.state = GestureState::Pinching {
                    start_distance: None,
                    start_scale: transform.scale,
                };
                self.pending_press = None;
                let ratio = blend_zoom_ratio(None, platform_ratio);
                Some(transform.zoomed_at(touches[0], transform.scale * ratio, content, viewport))
            }
            _ => None,
        }
    }

    /// A pointer lifted; `touches` are the points still down, `position`
    /// is where the lifted pointer was released.
    pub fn on_touch_end(
        &mut self,
        touches: &[Vec2],
        position: Vec2,
        time_ms: f64,
        transform: Transform,
        content: Size,
        viewport: Size,
    ) -> Option<Transform> {
        match touches.len() {
            0 => {
                let previous = std::mem::replace(&mut self.state, GestureState::Idle);
                match previous {
                    GestureState::Idle => {
                        if let Some(press) = self.pending_press.take() {
                            if position.distance(press) <= TAP_MOVE_SLOP_PX {
                                self.last_tap = Some(TapRecord { time_ms, position });
                            }
                        }
                        None
                    }
                    GestureState::Panning { start, .. } => {
                        if position.distance(start) <= TAP_MOVE_SLOP_PX {
                            self.last_tap = Some(TapRecord { time_ms, position });
                        }
                        self.pending_press = None;
                        Some(transform.clamped(content, viewport))
                    }
                    GestureState::Pinching { .. } => Some(transform.clamped(content, viewport)),
                }
            }
            1 => {
                // Dropped below two pointers: pinch ends with a final clamp.
                let was_pinching = matches!(self.state, GestureState::Pinching { .. });
                self.state = GestureState::Idle;
                self.pending_press = None;
                was_pinching.then(|| transform.clamped(content, viewport))
            }
            _ => {
                // Still two or more pointers down: re-anchor the pinch on
                // the surviving pair.
                let distance = touches[0].distance(touches[1]);
                self.state = GestureState::Pinching {
                    start_distance: (distance >= MIN_PINCH_DISTANCE_PX).then_some(distance),
                    start_scale: transform.scale,
                };
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 800.0,
        height: 600.0,
    };
    const CONTENT: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    /// Press and release at one spot. Returns the double-tap toggle
    /// update when the press fired one (release-time clamps are not a
    /// toggle and are ignored here).
    fn tap(
        recognizer: &mut GestureRecognizer,
        transform: Transform,
        position: Vec2,
        time_ms: f64,
    ) -> Option<Transform> {
        let on_down =
            recognizer.on_touch_start(&[position], time_ms, transform, CONTENT, VIEWPORT);
        recognizer.on_touch_end(
            &[],
            position,
            time_ms + 20.0,
            on_down.unwrap_or(transform),
            CONTENT,
            VIEWPORT,
        );
        on_down
    }

    #[test]
    fn test_single_touch_at_scale_one_stays_idle() {
        let mut recognizer = GestureRecognizer::new();
        let result = recognizer.on_touch_start(
            &[Vec2::new(100.0, 100.0)],
            0.0,
            Transform::identity(),
            CONTENT,
            VIEWPORT,
        );
        assert!(result.is_none());
        assert_eq!(recognizer.state(), GestureState::Idle);
    }

    #[test]
    fn test_single_touch_above_scale_one_starts_pan() {
        let mut recognizer = GestureRecognizer::new();
        let zoomed = Transform {
            scale: 2.0,
            translate: Vec2::ZERO,
        };
        recognizer.on_touch_start(&[Vec2::new(100.0, 100.0)], 0.0, zoomed, CONTENT, VIEWPORT);
        assert!(matches!(recognizer.state(), GestureState::Panning { .. }));
    }

    #[test]
    fn test_pan_moves_translate_by_raw_delta() {
        let mut recognizer = GestureRecognizer::new();
        let zoomed = Transform {
            scale: 2.0,
            translate: Vec2::ZERO,
        };
        recognizer.on_touch_start(&[Vec2::new(100.0, 100.0)], 0.0, zoomed, CONTENT, VIEWPORT);

        let moved = recognizer
            .on_touch_move(&[Vec2::new(160.0, 130.0)], None, zoomed, CONTENT, VIEWPORT)
            .unwrap();
        assert_eq!(moved.translate, Vec2::new(60.0, 30.0));
        assert_eq!(moved.scale, 2.0);
    }

    #[test]
    fn test_pan_is_clamped_to_bounds() {
        let mut recognizer = GestureRecognizer::new();
        let zoomed = Transform {
            scale: 2.0,
            translate: Vec2::ZERO,
        };
        recognizer.on_touch_start(&[Vec2::new(0.0, 0.0)], 0.0, zoomed, CONTENT, VIEWPORT);

        let moved = recognizer
            .on_touch_move(&[Vec2::new(5000.0, 5000.0)], None, zoomed, CONTENT, VIEWPORT)
            .unwrap();
        // Bounds at scale 2 with 800x600 content in an 800x600 viewport
        assert_eq!(moved.translate, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_pan_release_returns_to_idle_with_final_clamp() {
        let mut recognizer = GestureRecognizer::new();
        let zoomed = Transform {
            scale: 2.0,
            translate: Vec2::new(100.0, 0.0),
        };
        recognizer.on_touch_start(&[Vec2::new(50.0, 50.0)], 0.0, zoomed, CONTENT, VIEWPORT);

        let released = recognizer.on_touch_end(
            &[],
            Vec2::new(300.0, 200.0),
            100.0,
            zoomed,
            CONTENT,
            VIEWPORT,
        );
        assert!(released.is_some());
        assert_eq!(recognizer.state(), GestureState::Idle);
    }

    #[test]
    fn test_two_touches_start_pinch() {
        let mut recognizer = GestureRecognizer::new();
        recognizer.on_touch_start(
            &[Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0)],
            0.0,
            Transform::identity(),
            CONTENT,
            VIEWPORT,
        );
        assert!(matches!(
            recognizer.state(),
            GestureState::Pinching {
                start_distance: Some(_),
                ..
            }
        ));
    }

    #[test]
    fn test_pinch_spread_scales_by_distance_ratio() {
        let mut recognizer = GestureRecognizer::new();
        let identity = Transform::identity();
        recognizer.on_touch_start(
            &[Vec2::new(350.0, 300.0), Vec2::new(450.0, 300.0)],
            0.0,
            identity,
            CONTENT,
            VIEWPORT,
        );

        // Fingers spread from 100px apart to 200px: ratio 2
        let result = recognizer
            .on_touch_move(
                &[Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0)],
                None,
                identity,
                CONTENT,
                VIEWPORT,
            )
            .unwrap();
        assert!((result.scale - 2.0).abs() < 1e-4);
    }

    #[test]
    fn test_pinch_scale_clamps_at_max() {
        let mut recognizer = GestureRecognizer::new();
        let identity = Transform::identity();
        recognizer.on_touch_start(
            &[Vec2::new(390.0, 300.0), Vec2::new(410.0, 300.0)],
            0.0,
            identity,
            CONTENT,
            VIEWPORT,
        );

        // 20px -> 600px is a 30x ratio; scale must clamp to 4
        let result = recognizer
            .on_touch_move(
                &[Vec2::new(100.0, 300.0), Vec2::new(700.0, 300.0)],
                None,
                identity,
                CONTENT,
                VIEWPORT,
            )
            .unwrap();
        assert_eq!(result.scale, 4.0);
    }

    #[test]
    fn test_pinch_blends_platform_ratio() {
        let mut recognizer = GestureRecognizer::new();
        let identity = Transform::identity();
        recognizer.on_touch_start(
            &[Vec2::new(350.0, 300.0), Vec2::new(450.0, 300.0)],
            0.0,
            identity,
            CONTENT,
            VIEWPORT,
        );

        // Distance ratio 2.0, platform says 3.0: blended to 2.5
        let result = recognizer
            .on_touch_move(
                &[Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0)],
                Some(3.0),
                identity,
                CONTENT,
                VIEWPORT,
            )
            .unwrap();
        assert!((result.scale - 2.5).abs() < 1e-4);
    }

    #[test]
    fn test_platform_signal_promotes_single_touch_to_pinch() {
        let mut recognizer = GestureRecognizer::new();
        let identity = Transform::identity();
        recognizer.on_touch_start(
            &[Vec2::new(400.0, 300.0)],
            0.0,
            identity,
            CONTENT,
            VIEWPORT,
        );
        assert_eq!(recognizer.state(), GestureState::Idle);

        let result = recognizer.on_touch_move(
            &[Vec2::new(400.0, 300.0)],
            Some(1.8),
            identity,
            CONTENT,
            VIEWPORT,
        );
        assert!((result.unwrap().scale - 1.8).abs() < 1e-4);
        assert!(matches!(
            recognizer.state(),
            GestureState::Pinching {
                start_distance: None,
                ..
            }
        ));
    }

    #[test]
    fn test_too_close_pinch_has_no_distance_basis() {
        let mut recognizer = GestureRecognizer::new();
        let identity = Transform::identity();
        recognizer.on_touch_start(
            &[Vec2::new(400.0, 300.0), Vec2::new(403.0, 300.0)],
            0.0,
            identity,
            CONTENT,
            VIEWPORT,
        );

        // Without a distance basis or platform signal, the pinch is inert
        let result = recognizer
            .on_touch_move(
                &[Vec2::new(400.0, 300.0), Vec2::new(460.0, 300.0)],
                None,
                identity,
                CONTENT,
                VIEWPORT,
            )
            .unwrap();
        assert_eq!(result.scale, 1.0);
    }

    #[test]
    fn test_pinch_release_returns_to_idle() {
        let mut recognizer = GestureRecognizer::new();
        let identity = Transform::identity();
        recognizer.on_touch_start(
            &[Vec2::new(350.0, 300.0), Vec2::new(450.0, 300.0)],
            0.0,
            identity,
            CONTENT,
            VIEWPORT,
        );

        let result = recognizer.on_touch_end(
            &[Vec2::new(350.0, 300.0)],
            Vec2::new(450.0, 300.0),
            50.0,
            identity,
            CONTENT,
            VIEWPORT,
        );
        assert!(result.is_some());
        assert_eq!(recognizer.state(), GestureState::Idle);
    }

    #[test]
    fn test_three_to_two_touches_reanchors_pinch() {
        let mut recognizer = GestureRecognizer::new();
        let zoomed = Transform {
            scale: 2.0,
            translate: Vec2::ZERO,
        };
        recognizer.on_touch_start(
            &[
                Vec2::new(300.0, 300.0),
                Vec2::new(500.0, 300.0),
                Vec2::new(400.0, 500.0),
            ],
            0.0,
            zoomed,
            CONTENT,
            VIEWPORT,
        );

        recognizer.on_touch_end(
            &[Vec2::new(300.0, 300.0), Vec2::new(500.0, 300.0)],
            Vec2::new(400.0, 500.0),
            10.0,
            zoomed,
            CONTENT,
            VIEWPORT,
        );
        match recognizer.state() {
            GestureState::Pinching {
                start_distance,
                start_scale,
            } => {
                assert_eq!(start_distance, Some(200.0));
                assert_eq!(start_scale, 2.0);
            }
            other => panic!("expected Pinching, got {other:?}"),
        }
    }

    #[test]
    fn test_double_tap_toggles_one_two_one() {
        let mut recognizer = GestureRecognizer::new();
        let position = Vec2::new(500.0, 400.0);

        // First tap records, second within the window zooms to 2
        assert!(tap(&mut recognizer, Transform::identity(), position, 0.0).is_none());
        let zoomed = tap(&mut recognizer, Transform::identity(), position, 100.0).unwrap();
        assert!((zoomed.scale - DOUBLE_TAP_SCALE).abs() < 1e-4);

        // Second double-tap on the same spot returns to the identity
        assert!(tap(&mut recognizer, zoomed, position, 400.0).is_none());
        let reset = tap(&mut recognizer, zoomed, position, 500.0).unwrap();
        assert_eq!(reset, Transform::identity());
    }

    #[test]
    fn test_double_tap_preserves_focal_point() {
        let mut recognizer = GestureRecognizer::new();
        let anchor = Vec2::new(600.0, 200.0);
        let before = Transform::identity();
        let content_point = before.screen_to_content(anchor, VIEWPORT);

        tap(&mut recognizer, before, anchor, 0.0);
        let after = tap(&mut recognizer, before, anchor, 100.0).unwrap();

        let back = after.content_to_screen(content_point, VIEWPORT);
        assert!(back.distance(anchor) < 1e-2);
    }

    #[test]
    fn test_tap_outside_window_does_not_toggle() {
        let mut recognizer = GestureRecognizer::new();
        let position = Vec2::new(400.0, 300.0);

        assert!(tap(&mut recognizer, Transform::identity(), position, 0.0).is_none());
        // 300ms later: outside the 250ms window
        assert!(tap(&mut recognizer, Transform::identity(), position, 320.0).is_none());
    }

    #[test]
    fn test_tap_far_away_does_not_toggle() {
        let mut recognizer = GestureRecognizer::new();

        assert!(tap(&mut recognizer, Transform::identity(), Vec2::new(100.0, 100.0), 0.0).is_none());
        assert!(tap(&mut recognizer, Transform::identity(), Vec2::new(400.0, 300.0), 100.0).is_none());
    }

    #[test]
    fn test_drag_release_is_not_a_tap() {
        let mut recognizer = GestureRecognizer::new();
        let zoomed = Transform {
            scale: 2.0,
            translate: Vec2::ZERO,
        };

        // Pan 200px, release far from the press point
        recognizer.on_touch_start(&[Vec2::new(100.0, 100.0)], 0.0, zoomed, CONTENT, VIEWPORT);
        recognizer.on_touch_end(
            &[],
            Vec2::new(300.0, 100.0),
            50.0,
            zoomed,
            CONTENT,
            VIEWPORT,
        );

        // A quick press near the release point must not read as a double-tap
        let result = recognizer.on_touch_start(
            &[Vec2::new(300.0, 100.0)],
            120.0,
            zoomed,
            CONTENT,
            VIEWPORT,
        );
        assert!(result.is_none());
    }

    #[test]
    fn test_reset_clears_gesture_and_tap_state() {
        let mut recognizer = GestureRecognizer::new();
        let position = Vec2::new(400.0, 300.0);

        tap(&mut recognizer, Transform::identity(), position, 0.0);
        recognizer.reset();

        // The pre-reset tap no longer pairs into a double-tap
        assert!(tap(&mut recognizer, Transform::identity(), position, 100.0).is_none());
        assert_eq!(recognizer.state(), GestureState::Idle);
    }

    #[test]
    fn test_blend_zoom_ratio() {
        assert_eq!(blend_zoom_ratio(Some(2.0), Some(3.0)), 2.5);
        assert_eq!(blend_zoom_ratio(Some(2.0), None), 2.0);
        assert_eq!(blend_zoom_ratio(None, Some(3.0)), 3.0);
        assert_eq!(blend_zoom_ratio(None, None), 1.0);
    }
}
