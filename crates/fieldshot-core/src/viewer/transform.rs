//! Zoom/pan transform math for the evidence viewer.
//!
//! All coordinates are in screen pixels with the origin at the viewport's
//! top-left corner. "Content space" is the image's own coordinate system
//! at scale 1, centered in the viewport.
//!
//! The two invariants every operation maintains:
//!
//! - At `scale = 1` the translate is exactly `(0, 0)` - content is forced
//!   centered, with no residual drift.
//! - At `scale > 1` the translate stays inside the pan bounds derived
//!   from content size, viewport size, and scale.

use std::ops::{Add, Div, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Minimum zoom scale (fit-to-viewport).
pub const MIN_SCALE: f32 = 1.0;

/// Maximum zoom scale.
pub const MAX_SCALE: f32 = 4.0;

/// Scale a double-tap toggles to from scale 1.
pub const DOUBLE_TAP_SCALE: f32 = 2.0;

/// A 2D point or offset in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    /// The zero vector.
    pub const ZERO: Vec2 = Vec2 { x: 0.0, y: 0.0 };

    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Euclidean distance to another point.
    pub fn distance(self, other: Vec2) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        (dx * dx + dy * dy).sqrt()
    }

    /// Midpoint between two points.
    pub fn midpoint(a: Vec2, b: Vec2) -> Vec2 {
        Vec2::new((a.x + b.x) / 2.0, (a.y + b.y) / 2.0)
    }
}

impl Add for Vec2 {
    type Output = Vec2;
    fn add(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Vec2 {
    type Output = Vec2;
    fn sub(self, rhs: Vec2) -> Vec2 {
        Vec2::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Mul<f32> for Vec2 {
    type Output = Vec2;
    fn mul(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x * rhs, self.y * rhs)
    }
}

impl Div<f32> for Vec2 {
    type Output = Vec2;
    fn div(self, rhs: f32) -> Vec2 {
        Vec2::new(self.x / rhs, self.y / rhs)
    }
}

/// Width/height pair in screen pixels.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    /// The zero size.
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Center point of a rectangle of this size anchored at the origin.
    pub fn center(self) -> Vec2 {
        Vec2::new(self.width / 2.0, self.height / 2.0)
    }
}

/// The viewer's committed zoom/pan state.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    /// Zoom scale, always within `[MIN_SCALE, MAX_SCALE]`.
    pub scale: f32,
    /// Pan offset in screen pixels, always within the pan bounds.
    pub translate: Vec2,
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}

impl Transform {
    /// Scale 1, centered.
    pub fn identity() -> Self {
        Self {
            scale: MIN_SCALE,
            translate: Vec2::ZERO,
        }
    }

    /// Whether this transform is (numerically) the identity.
    pub fn is_identity(&self) -> bool {
        (self.scale - MIN_SCALE).abs() < 1e-4 && self.translate.distance(Vec2::ZERO) < 1e-4
    }

    /// Half-extent of the allowed translate range per axis.
    ///
    /// An axis where the scaled content fits inside the viewport collapses
    /// to zero: content stays centered on that axis rather than drifting.
    pub fn pan_bounds(content: Size, viewport: Size, scale: f32) -> Vec2 {
        Vec2::new(
            ((content.width * scale - viewport.width) / 2.0).max(0.0),
            ((content.height * scale - viewport.height) / 2.0).max(0.0),
        )
    }

    /// Clamp this transform into its invariants: scale into
    /// `[MIN_SCALE, MAX_SCALE]`, translate into the pan bounds, and the
    /// exact identity at scale 1.
    pub fn clamped(self, content: Size, viewport: Size) -> Self {
        let scale = self.scale.clamp(MIN_SCALE, MAX_SCALE);
        if scale <= MIN_SCALE {
            return Self::identity();
        }

        let bounds = Self::pan_bounds(content, viewport, scale);
        Self {
            scale,
            translate: Vec2::new(
                self.translate.x.clamp(-bounds.x, bounds.x),
                self.translate.y.clamp(-bounds.y, bounds.y),
            ),
        }
    }

    /// Translate by a raw screen-space delta, then clamp.
    pub fn panned_by(self, delta: Vec2, content: Size, viewport: Size) -> Self {
        Self {
            scale: self.scale,
            translate: self.translate + delta,
        }
        .clamped(content, viewport)
    }

    /// Change scale while keeping the content point under `anchor` fixed
    /// on screen.
    ///
    /// The anchor is a screen-space point (pinch midpoint, cursor, tap
    /// location). Solving for the translate that maps the same content
    /// point back to the anchor:
    ///
    /// ```text
    /// c             = (anchor - center - translate_old) / scale_old
    /// translate_new = anchor - center - c * scale_new
    /// ```
    ///
    /// The result is clamped, so near the edges the anchor may shift by
    /// however much the bounds require.
    pub fn zoomed_at(self, anchor: Vec2, new_scale: f32, content: Size, viewport: Size) -> Self {
        let scale = new_scale.clamp(MIN_SCALE, MAX_SCALE);
        let center = viewport.center();
        let content_point = (anchor - center - self.translate) / self.scale;
        Self {
            scale,
            translate: anchor - center - content_point * scale,
        }
        .clamped(content, viewport)
    }

    /// Map a screen-space point into content space under this transform.
    pub fn screen_to_content(self, point: Vec2, viewport: Size) -> Vec2 {
        (point - viewport.center() - self.translate) / self.scale
    }

    /// Map a content-space point back onto the screen under this transform.
    pub fn content_to_screen(self, point: Vec2, viewport: Size) -> Vec2 {
        viewport.center() + self.translate + point * self.scale
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    // Content fitted to the viewport at scale 1, the common case.
    const CONTENT: Size = Size {
        width: 800.0,
        height: 600.0,
    };

    #[test]
    fn test_identity_is_default() {
        assert_eq!(Transform::default(), Transform::identity());
        assert!(Transform::identity().is_identity());
    }

    #[test]
    fn test_pan_bounds_collapse_when_content_fits() {
        let bounds = Transform::pan_bounds(CONTENT, VIEWPORT, 1.0);
        assert_eq!(bounds, Vec2::ZERO);

        // Content smaller than the viewport on one axis at scale 2
        let tall = Size::new(200.0, 600.0);
        let bounds = Transform::pan_bounds(tall, VIEWPORT, 2.0);
        assert_eq!(bounds.x, 0.0); // 400 < 800, centered
        assert_eq!(bounds.y, 300.0); // (1200 - 600) / 2
    }

    #[test]
    fn test_clamp_at_scale_one_forces_identity() {
        let drifted = Transform {
            scale: 1.0,
            translate: Vec2::new(55.0, -20.0),
        };
        assert_eq!(drifted.clamped(CONTENT, VIEWPORT), Transform::identity());
    }

    #[test]
    fn test_clamp_pulls_translate_into_bounds() {
        let wild = Transform {
            scale: 2.0,
            translate: Vec2::new(9999.0, -9999.0),
        };
        let clamped = wild.clamped(CONTENT, VIEWPORT);
        assert_eq!(clamped.translate, Vec2::new(400.0, -300.0));
    }

    #[test]
    fn test_clamp_limits_scale_range() {
        let over = Transform {
            scale: 10.0,
            translate: Vec2::ZERO,
        };
        assert_eq!(over.clamped(CONTENT, VIEWPORT).scale, MAX_SCALE);

        let under = Transform {
            scale: 0.2,
            translate: Vec2::ZERO,
        };
        assert_eq!(under.clamped(CONTENT, VIEWPORT), Transform::identity());
    }

    #[test]
    fn test_pan_accumulates_and_clamps() {
        let t = Transform {
            scale: 2.0,
            translate: Vec2::ZERO,
        };
        let panned = t.panned_by(Vec2::new(100.0, 50.0), CONTENT, VIEWPORT);
        assert_eq!(panned.translate, Vec2::new(100.0, 50.0));

        let panned = panned.panned_by(Vec2::new(1000.0, 1000.0), CONTENT, VIEWPORT);
        assert_eq!(panned.translate, Vec2::new(400.0, 300.0));
    }

    #[test]
    fn test_pan_at_scale_one_is_inert() {
        let panned = Transform::identity().panned_by(Vec2::new(40.0, 40.0), CONTENT, VIEWPORT);
        assert_eq!(panned, Transform::identity());
    }

    #[test]
    fn test_zoom_at_center_keeps_centered() {
        let zoomed =
            Transform::identity().zoomed_at(VIEWPORT.center(), 2.0, CONTENT, VIEWPORT);
        assert_eq!(zoomed.scale, 2.0);
        assert_eq!(zoomed.translate, Vec2::ZERO);
    }

    #[test]
    fn test_zoom_keeps_anchor_point_fixed() {
        let anchor = Vec2::new(600.0, 450.0);
        let before = Transform::identity();
        let content_point = before.screen_to_content(anchor, VIEWPORT);

        let after = before.zoomed_at(anchor, 2.0, CONTENT, VIEWPORT);
        let back = after.content_to_screen(content_point, VIEWPORT);

        assert!(back.distance(anchor) < 1e-3);
    }

    #[test]
    fn test_zoom_back_to_one_recenters() {
        let zoomed = Transform::identity().zoomed_at(Vec2::new(700.0, 100.0), 3.0, CONTENT, VIEWPORT);
        assert!(zoomed.scale > 1.0);

        let reset = zoomed.zoomed_at(Vec2::new(700.0, 100.0), 1.0, CONTENT, VIEWPORT);
        assert_eq!(reset, Transform::identity());
    }

    #[test]
    fn test_zoom_clamps_into_bounds_near_edges() {
        // Zooming anchored at a corner cannot push content off-screen
        let zoomed = Transform::identity().zoomed_at(Vec2::ZERO, 2.0, CONTENT, VIEWPORT);
        let bounds = Transform::pan_bounds(CONTENT, VIEWPORT, zoomed.scale);
        assert!(zoomed.translate.x.abs() <= bounds.x + 1e-3);
        assert!(zoomed.translate.y.abs() <= bounds.y + 1e-3);
    }

    #[test]
    fn test_screen_content_roundtrip() {
        let t = Transform {
            scale: 2.5,
            translate: Vec2::new(60.0, -40.0),
        };
        let point = Vec2::new(123.0, 456.0);
        let roundtrip = t.content_to_screen(t.screen_to_content(point, VIEWPORT), VIEWPORT);
        assert!(roundtrip.distance(point) < 1e-3);
    }

    #[test]
    fn test_vec2_helpers() {
        assert_eq!(Vec2::new(3.0, 4.0).distance(Vec2::ZERO), 5.0);
        assert_eq!(
            Vec2::midpoint(Vec2::new(0.0, 0.0), Vec2::new(10.0, 20.0)),
            Vec2::new(5.0, 10.0)
        );
    }
}

// ============================================================================
// Property-Based Tests
// ============================================================================
