//! Camera module for pan/zoom transforms.
//!
//! The world origin is mapped to the centre of the viewport (not its top-left
//! corner), so panning and zooming feel anchored on the origin.

use kurbo::{Affine, Point, Rect, Size, Vec2};
use serde::{Deserialize, Serialize};

/// Zoom level that corresponds to "100%".
pub const DEFAULT_ZOOM: f64 = 1.0;
/// Smallest zoom the camera accepts.
pub const MIN_ZOOM: f64 = 0.2;
/// Largest zoom the camera accepts.
pub const MAX_ZOOM: f64 = 8.0;

/// Zoom change per unit of wheel delta.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.001;
/// Lower bound for a single wheel step factor.
const MIN_WHEEL_FACTOR: f64 = 0.05;

/// Camera manages the view transform for the canvas.
///
/// `screen = viewport_center + offset + world * zoom`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Camera {
    /// Current translation offset (pan), in screen pixels.
    pub offset: Vec2,
    /// Current zoom level.
    pub zoom: f64,
    /// Minimum allowed zoom level.
    pub min_zoom: f64,
    /// Maximum allowed zoom level.
    pub max_zoom: f64,
    /// Size of the viewport in screen pixels.
    pub viewport: Size,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            offset: Vec2::ZERO,
            zoom: DEFAULT_ZOOM,
            min_zoom: MIN_ZOOM,
            max_zoom: MAX_ZOOM,
            viewport: Size::new(800.0, 600.0),
        }
    }
}

impl Camera {
    /// Create a new camera with default settings.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a camera with a custom zoom range.
    pub fn with_zoom_range(min_zoom: f64, max_zoom: f64) -> Self {
        Self {
            zoom: DEFAULT_ZOOM.clamp(min_zoom, max_zoom),
            min_zoom,
            max_zoom,
            ..Self::default()
        }
    }

    /// Set the viewport size.
    pub fn set_viewport_size(&mut self, width: f64, height: f64) {
        self.viewport = Size::new(width, height);
    }

    /// Centre of the viewport in screen coordinates.
    pub fn viewport_center(&self) -> Vec2 {
        Vec2::new(self.viewport.width / 2.0, self.viewport.height / 2.0)
    }

    /// Get the affine transform for rendering (world to screen).
    pub fn transform(&self) -> Affine {
        Affine::translate(self.viewport_center() + self.offset) * Affine::scale(self.zoom)
    }

    /// Get the inverse transform for input handling (screen to world).
    pub fn inverse_transform(&self) -> Affine {
        Affine::scale(1.0 / self.zoom) * Affine::translate(-(self.viewport_center() + self.offset))
    }

    /// Convert a screen point to world coordinates.
    pub fn screen_to_world(&self, screen_point: Point) -> Point {
        self.inverse_transform() * screen_point
    }

    /// Convert a world point to screen coordinates.
    pub fn world_to_screen(&self, world_point: Point) -> Point {
        self.transform() * world_point
    }

    /// Convert a screen-space distance into world units at the current zoom.
    pub fn world_tolerance(&self, screen_pixels: f64) -> f64 {
        screen_pixels / self.zoom
    }

    /// Set the pan offset directly, in screen coordinates.
    pub fn pan_to(&mut self, offset: Vec2) {
        self.offset = offset;
    }

    /// Zoom the camera, keeping the world point under `screen_point` fixed.
    ///
    /// The offset is solved from absolute quantities on every call, so many
    /// small wheel steps do not accumulate drift.
    pub fn zoom_at(&mut self, screen_point: Point, factor: f64) {
        if !factor.is_finite() || factor <= 0.0 {
            return;
        }
        let new_zoom = (self.zoom * factor).clamp(self.min_zoom, self.max_zoom);
        if (new_zoom - self.zoom).abs() < f64::EPSILON {
            return;
        }

        let world_point = self.screen_to_world(screen_point);
        self.zoom = new_zoom;
        self.offset = screen_point.to_vec2() - self.viewport_center() - world_point.to_vec2() * new_zoom;
    }

    /// Zoom factor for a wheel event with the given vertical delta.
    ///
    /// Scrolling down (positive delta) zooms out.
    pub fn wheel_factor(delta_y: f64, sensitivity: f64) -> f64 {
        (1.0 - delta_y * sensitivity).max(MIN_WHEEL_FACTOR)
    }

    /// Reset camera to default position and zoom.
    pub fn reset(&mut self) {
        self.offset = Vec2::ZERO;
        self.zoom = DEFAULT_ZOOM.clamp(self.min_zoom, self.max_zoom);
    }

    /// The world-space rectangle currently visible in the viewport.
    pub fn visible_world_rect(&self) -> Rect {
        let top_left = self.screen_to_world(Point::ZERO);
        let bottom_right = self.screen_to_world(Point::new(self.viewport.width, self.viewport.height));
        Rect::from_points(top_left, bottom_right)
    }

    /// Fit the camera to show the given bounding box.
    pub fn fit_to_bounds(&mut self, bounds: Rect, padding: f64) {
        if bounds.width() <= f64::EPSILON && bounds.height() <= f64::EPSILON {
            self.reset();
            self.offset = -bounds.center().to_vec2() * self.zoom;
            return;
        }

        let padded_viewport = Size::new(
            (self.viewport.width - padding * 2.0).max(1.0),
            (self.viewport.height - padding * 2.0).max(1.0),
        );

        let scale_x = padded_viewport.width / bounds.width().max(f64::EPSILON);
        let scale_y = padded_viewport.height / bounds.height().max(f64::EPSILON);
        self.zoom = scale_x.min(scale_y).clamp(self.min_zoom, self.max_zoom);

        // Bring the bounds centre onto the viewport centre.
        self.offset = -bounds.center().to_vec2() * self.zoom;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_close(a: Point, b: Point, eps: f64) {
        assert!((a.x - b.x).abs() < eps, "x: {} vs {}", a.x, b.x);
        assert!((a.y - b.y).abs() < eps, "y: {} vs {}", a.y, b.y);
    }

    #[test]
    fn test_default_camera() {
        let camera = Camera::new();
        assert_eq!(camera.offset, Vec2::ZERO);
        assert!((camera.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_origin_maps_to_viewport_center() {
        let camera = Camera::new();
        let screen = camera.world_to_screen(Point::ZERO);
        assert_close(screen, Point::new(400.0, 300.0), 1e-12);
    }

    #[test]
    fn test_screen_to_world_with_offset() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(50.0, 100.0);
        let world = camera.screen_to_world(Point::new(450.0, 400.0));
        assert_close(world, Point::ZERO, 1e-12);
    }

    #[test]
    fn test_screen_to_world_with_zoom() {
        let mut camera = Camera::new();
        camera.zoom = 2.0;
        let world = camera.screen_to_world(Point::new(500.0, 500.0));
        assert_close(world, Point::new(50.0, 100.0), 1e-12);
    }

    #[test]
    fn test_roundtrip_conversion() {
        for &zoom in &[0.2, 0.75, 1.0, 3.3, 8.0] {
            let mut camera = Camera::new();
            camera.offset = Vec2::new(30.0, -20.0);
            camera.zoom = zoom;

            let original = Point::new(123.0, 456.0);
            let back = camera.world_to_screen(camera.screen_to_world(original));
            assert_close(back, original, 1e-9);
        }
    }

    #[test]
    fn test_zoom_at_pins_cursor() {
        let mut camera = Camera::new();
        camera.offset = Vec2::new(-35.0, 12.5);
        let cursor = Point::new(612.0, 97.0);

        let before = camera.screen_to_world(cursor);
        camera.zoom_at(cursor, 1.7);
        let after = camera.screen_to_world(cursor);

        assert!((camera.zoom - 1.7).abs() < 1e-12);
        assert_close(before, after, 1e-9);
    }

    #[test]
    fn test_zoom_at_many_small_steps_no_drift() {
        let mut camera = Camera::new();
        let cursor = Point::new(123.0, 456.0);
        let anchor = camera.screen_to_world(cursor);

        for i in 0..2000 {
            let factor = if i % 3 == 0 { 0.99 } else { 1.01 };
            camera.zoom_at(cursor, factor);
        }

        assert_close(camera.screen_to_world(cursor), anchor, 1e-6);
    }

    #[test]
    fn test_zoom_clamp() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, 0.001);
        assert!((camera.zoom - camera.min_zoom).abs() < f64::EPSILON);

        camera.zoom = 1.0;
        camera.zoom_at(Point::ZERO, 1000.0);
        assert!((camera.zoom - camera.max_zoom).abs() < f64::EPSILON);
    }

    #[test]
    fn test_zoom_ignores_bad_factor() {
        let mut camera = Camera::new();
        camera.zoom_at(Point::ZERO, f64::NAN);
        camera.zoom_at(Point::ZERO, -2.0);
        assert!((camera.zoom - DEFAULT_ZOOM).abs() < f64::EPSILON);
        assert_eq!(camera.offset, Vec2::ZERO);
    }

    #[test]
    fn test_wheel_factor() {
        assert!(Camera::wheel_factor(100.0, WHEEL_ZOOM_SENSITIVITY) < 1.0);
        assert!(Camera::wheel_factor(-100.0, WHEEL_ZOOM_SENSITIVITY) > 1.0);
        assert!(Camera::wheel_factor(1.0e6, WHEEL_ZOOM_SENSITIVITY) > 0.0);
    }

    #[test]
    fn test_pan() {
        let mut camera = Camera::new();
        camera.pan_to(Vec2::new(-5.0, 20.0));
        assert_eq!(camera.offset, Vec2::new(-5.0, 20.0));
        assert_close(camera.world_to_screen(Point::ZERO), Point::new(395.0, 320.0), 1e-12);
    }

    #[test]
    fn test_fit_to_bounds_centers_content() {
        let mut camera = Camera::new();
        let bounds = Rect::new(100.0, 100.0, 300.0, 200.0);
        camera.fit_to_bounds(bounds, 50.0);

        let center = camera.world_to_screen(bounds.center());
        assert_close(center, Point::new(400.0, 300.0), 1e-9);
        assert!(camera.zoom <= MAX_ZOOM);
    }

    #[test]
    fn test_visible_world_rect() {
        let camera = Camera::new();
        let rect = camera.visible_world_rect();
        assert!((rect.x0 + 400.0).abs() < 1e-9);
        assert!((rect.y1 - 300.0).abs() < 1e-9);
    }
}
