//! Pure view-transform math.
//!
//! A [`ViewTransform`] maps image pixels to screen pixels:
//! `screen = offset + image * scale`.

use tracing::debug;

use crate::anim::easing::lerp;

/// Smallest scale used as a divisor.
const MIN_SCALE_EPSILON: f64 = 1e-6;
/// Smallest scale a zoom may land on.
const MIN_ZOOM_SCALE: f64 = 0.01;

/// Offsets closer than this to the origin are treated as "never positioned".
const NEAR_ZERO_PX: f64 = 5.0;
/// Offsets further than this from the expected position are treated as stale.
const FAR_PX: f64 = 50.0;
/// Scales within this distance of 1.0 count as 1:1.
const UNIT_SCALE_TOLERANCE: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub scale: f64,
    pub offset_x: f64,
    pub offset_y: f64,
}

impl ViewTransform {
    pub fn new(scale: f64, offset_x: f64, offset_y: f64) -> Self {
        Self {
            scale,
            offset_x,
            offset_y,
        }
    }

    /// Screen point to image-space point.
    pub fn to_image(&self, x: f64, y: f64) -> (f64, f64) {
        let scale = self.scale.max(MIN_SCALE_EPSILON);
        ((x - self.offset_x) / scale, (y - self.offset_y) / scale)
    }

    /// Shift by a screen-space delta.
    pub fn translated(&self, dx: f64, dy: f64) -> Self {
        Self::new(self.scale, self.offset_x + dx, self.offset_y + dy)
    }

    pub fn approx_eq(&self, other: &Self, eps: f64) -> bool {
        (self.scale - other.scale).abs() <= eps
            && (self.offset_x - other.offset_x).abs() <= eps
            && (self.offset_y - other.offset_y).abs() <= eps
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::new(1.0, 0.0, 0.0)
    }
}

/// Width and height in pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Size {
    pub width: f64,
    pub height: f64,
}

impl Size {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

impl From<(u32, u32)> for Size {
    fn from((width, height): (u32, u32)) -> Self {
        Self::new(width as f64, height as f64)
    }
}

/// Scale that fits `image` into `frac` of `screen`. 1.0 for an empty image.
pub fn fit_scale(image: Size, screen: Size, frac: f64) -> f64 {
    if image.is_empty() {
        return 1.0;
    }
    (screen.width * frac / image.width).min(screen.height * frac / image.height)
}

/// Center `image` on `screen` at `scale`.
pub fn center_view(scale: f64, image: Size, screen: Size) -> ViewTransform {
    ViewTransform::new(
        scale,
        (screen.width - image.width * scale) / 2.0,
        (screen.height - image.height * scale) / 2.0,
    )
}

pub fn fit_view(image: Size, screen: Size, frac: f64) -> ViewTransform {
    center_view(fit_scale(image, screen, frac), image, screen)
}

pub fn one_to_one_view(image: Size, screen: Size) -> ViewTransform {
    center_view(1.0, image, screen)
}

/// Change scale while keeping the image point under `anchor` fixed on screen.
pub fn anchor_zoom(view: &ViewTransform, new_scale: f64, anchor: (f64, f64)) -> ViewTransform {
    let (wx, wy) = view.to_image(anchor.0, anchor.1);
    let scale = new_scale.max(MIN_ZOOM_SCALE);
    ViewTransform::new(scale, anchor.0 - wx * scale, anchor.1 - wy * scale)
}

/// Keep the image center within `|screen - scaled| / 2` of the screen center
/// on each axis. Small images stay centered; large ones may pan up to their edges.
pub fn clamp_pan(view: &ViewTransform, image: Size, screen: Size) -> ViewTransform {
    let clamp_axis = |offset: f64, image_len: f64, screen_len: f64| {
        let scaled = image_len * view.scale;
        let center = offset + scaled / 2.0;
        let screen_center = screen_len / 2.0;
        let max_dev = (screen_len - scaled).abs() / 2.0;
        center.clamp(screen_center - max_dev, screen_center + max_dev) - scaled / 2.0
    };
    ViewTransform::new(
        view.scale,
        clamp_axis(view.offset_x, image.width, screen.width),
        clamp_axis(view.offset_y, image.height, screen.height),
    )
}

/// Best-effort repair of a stored or drifted view.
///
/// Rules, first match wins:
/// 1. both offsets near zero: recenter at the same scale
/// 2. one offset near zero, the other far: recenter at the same scale
/// 3. scale ~1.0 but far from the 1:1 centered position: 1:1 centered
/// 4. otherwise [`clamp_pan`]
pub fn sanitize_view(view: &ViewTransform, image: Size, screen: Size) -> ViewTransform {
    let ax = view.offset_x.abs();
    let ay = view.offset_y.abs();

    let (fixed, rule) = if ax < NEAR_ZERO_PX && ay < NEAR_ZERO_PX {
        (center_view(view.scale, image, screen), "near_zero")
    } else if (ax < NEAR_ZERO_PX && ay > FAR_PX) || (ay < NEAR_ZERO_PX && ax > FAR_PX) {
        (center_view(view.scale, image, screen), "asymmetric")
    } else if (view.scale - 1.0).abs() < UNIT_SCALE_TOLERANCE && {
        let centered = one_to_one_view(image, screen);
        (view.offset_x - centered.offset_x).abs() > FAR_PX
            || (view.offset_y - centered.offset_y).abs() > FAR_PX
    } {
        (one_to_one_view(image, screen), "one_to_one")
    } else {
        (clamp_pan(view, image, screen), "clamp")
    };

    if !fixed.approx_eq(view, 1e-9) {
        debug!(
            rule,
            before = ?view,
            after = ?fixed,
            "Sanitized view"
        );
    }
    fixed
}

/// Component-wise interpolation between two views.
pub fn lerp_view(from: &ViewTransform, to: &ViewTransform, t: f64) -> ViewTransform {
    ViewTransform::new(
        lerp(from.scale, to.scale, t),
        lerp(from.offset_x, to.offset_x, t),
        lerp(from.offset_y, to.offset_y, t),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    fn screen() -> Size {
        Size::new(1920.0, 1080.0)
    }

    #[test]
    fn test_fit_full_hd_on_full_hd() {
        let img = Size::new(1920.0, 1080.0);
        assert!((fit_scale(img, screen(), 0.95) - 0.95).abs() < EPS);
        let view = fit_view(img, screen(), 0.95);
        assert!(view.approx_eq(&ViewTransform::new(0.95, 48.0, 27.0), 1e-6));
    }

    #[test]
    fn test_fit_scale_empty_image() {
        assert_eq!(fit_scale(Size::new(0.0, 100.0), screen(), 0.95), 1.0);
    }

    #[test]
    fn test_sanitize_recenters_near_zero_offsets() {
        let view = ViewTransform::new(1.0, 0.0, 0.0);
        let fixed = sanitize_view(&view, Size::new(800.0, 600.0), screen());
        assert!(fixed.approx_eq(&ViewTransform::new(1.0, 560.0, 240.0), EPS));
    }

    #[test]
    fn test_sanitize_recenters_asymmetric_offsets() {
        let img = Size::new(4000.0, 3000.0);
        let view = ViewTransform::new(2.0, 1.0, -900.0);
        let fixed = sanitize_view(&view, img, screen());
        assert!(fixed.approx_eq(&center_view(2.0, img, screen()), EPS));
    }

    #[test]
    fn test_sanitize_snaps_drifted_one_to_one() {
        let img = Size::new(800.0, 600.0);
        let view = ViewTransform::new(1.005, 300.0, 240.0);
        let fixed = sanitize_view(&view, img, screen());
        assert!(fixed.approx_eq(&one_to_one_view(img, screen()), EPS));
    }

    #[test]
    fn test_sanitize_is_noop_on_fit_view() {
        for img in [
            Size::new(1920.0, 1080.0),
            Size::new(800.0, 600.0),
            Size::new(300.0, 5000.0),
        ] {
            let view = fit_view(img, screen(), 0.95);
            assert!(sanitize_view(&view, img, screen()).approx_eq(&view, 1e-6));
        }
    }

    #[test]
    fn test_anchor_zoom_keeps_point_under_cursor() {
        let views = [
            ViewTransform::new(1.0, 10.0, 20.0),
            ViewTransform::new(0.25, -300.0, 45.5),
            ViewTransform::new(3.7, -2000.0, -900.0),
        ];
        let anchors = [(0.0, 0.0), (960.0, 540.0), (1500.3, 77.7)];
        for view in &views {
            for &anchor in &anchors {
                for new_scale in [0.1, 0.95, 2.0, 8.0] {
                    let before = view.to_image(anchor.0, anchor.1);
                    let zoomed = anchor_zoom(view, new_scale, anchor);
                    let after = zoomed.to_image(anchor.0, anchor.1);
                    assert!((before.0 - after.0).abs() < 1e-6);
                    assert!((before.1 - after.1).abs() < 1e-6);
                }
            }
        }
    }

    #[test]
    fn test_anchor_zoom_floors_scale() {
        let view = ViewTransform::new(1.0, 0.0, 0.0);
        assert_eq!(anchor_zoom(&view, 0.0, (0.0, 0.0)).scale, MIN_ZOOM_SCALE);
    }

    #[test]
    fn test_clamp_pan_small_image_stays_centered() {
        let img = Size::new(100.0, 100.0);
        let view = ViewTransform::new(1.0, 1900.0, 0.0);
        let clamped = clamp_pan(&view, img, screen());
        // Max deviation is (1920 - 100) / 2, so the image may reach but not pass the edge.
        assert!((clamped.offset_x - 1820.0).abs() < EPS);
        assert!((clamped.offset_y - 0.0).abs() < EPS);
    }

    #[test]
    fn test_clamp_pan_large_image_reveals_edges() {
        let img = Size::new(4000.0, 2000.0);
        let view = ViewTransform::new(1.0, 500.0, -5000.0);
        let clamped = clamp_pan(&view, img, screen());
        assert!((clamped.offset_x - 0.0).abs() < EPS);
        assert!((clamped.offset_y - (1080.0 - 2000.0)).abs() < EPS);
    }

    #[test]
    fn test_clamp_pan_is_idempotent() {
        let img = Size::new(3000.0, 2000.0);
        for view in [
            ViewTransform::new(0.3, -700.0, 4000.0),
            ViewTransform::new(1.5, 123.0, -456.0),
            ViewTransform::new(4.0, -99999.0, 99999.0),
        ] {
            let once = clamp_pan(&view, img, screen());
            let twice = clamp_pan(&once, img, screen());
            assert!(once.approx_eq(&twice, 1e-9));
        }
    }

    #[test]
    fn test_lerp_view_endpoints() {
        let a = ViewTransform::new(1.0, 0.0, 0.0);
        let b = ViewTransform::new(2.0, 100.0, -50.0);
        assert_eq!(lerp_view(&a, &b, 0.0), a);
        assert_eq!(lerp_view(&a, &b, 1.0), b);
        assert!(lerp_view(&a, &b, 0.5).approx_eq(&ViewTransform::new(1.5, 50.0, -25.0), EPS));
    }
}
