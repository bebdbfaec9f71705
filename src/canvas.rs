use glam::Vec2;

use crate::config::{DEFAULT_WINDOW_HEIGHT, DEFAULT_WINDOW_WIDTH};

/// Maps world coordinates (tree root at the origin) onto a viewport.
///
/// The origin sits at the viewport center and the zoom scales with the
/// viewport so the tree keeps its proportions when the window is resized.
#[derive(Debug, Clone)]
pub struct Camera {
    pub viewport: Rect,
    pub zoom: f32,
}

impl Camera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        let mut camera = Self {
            viewport: Rect::new(0.0, 0.0, viewport_width, viewport_height),
            zoom: 1.0,
        };
        camera.fit(viewport_width, viewport_height);
        camera
    }

    /// Recenter on a resized viewport and refit the zoom.
    pub fn fit(&mut self, width: f32, height: f32) {
        self.viewport = Rect::new(self.viewport.x, self.viewport.y, width, height);
        self.zoom = (height / DEFAULT_WINDOW_HEIGHT).min(width / DEFAULT_WINDOW_WIDTH);
    }

    /// Place the viewport at an offset in screen space, keeping its size.
    pub fn set_origin(&mut self, x: f32, y: f32) {
        self.viewport.x = x;
        self.viewport.y = y;
    }

    pub fn world_to_screen(&self, world_pos: Vec2) -> Vec2 {
        world_pos * self.zoom + self.viewport.center()
    }

    pub fn screen_to_world(&self, screen_pos: Vec2) -> Vec2 {
        (screen_pos - self.viewport.center()) / self.zoom
    }

    /// World-space extent visible in the viewport: `(min, max)`.
    pub fn visible_world(&self) -> (Vec2, Vec2) {
        let top_left = self.screen_to_world(Vec2::new(self.viewport.x, self.viewport.y));
        let bottom_right = self.screen_to_world(Vec2::new(
            self.viewport.x + self.viewport.width,
            self.viewport.y + self.viewport.height,
        ));
        (top_left, bottom_right)
    }
}

/// Rectangle helper
#[derive(Debug, Clone, Copy)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self { x, y, width, height }
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(self.x + self.width * 0.5, self.y + self.height * 0.5)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_world_origin_at_center() {
        let camera = Camera::new(1000.0, 800.0);
        let screen_pos = camera.world_to_screen(Vec2::ZERO);
        assert!((screen_pos.x - 500.0).abs() < 0.1);
        assert!((screen_pos.y - 400.0).abs() < 0.1);
    }

    #[test]
    fn test_zoom_follows_smaller_axis() {
        let mut camera = Camera::new(1200.0, 1200.0);
        assert_eq!(camera.zoom, 1.0);

        camera.fit(2400.0, 600.0);
        assert_eq!(camera.zoom, 0.5);
        camera.fit(600.0, 2400.0);
        assert_eq!(camera.zoom, 0.5);
    }

    #[test]
    fn test_roundtrip_conversion() {
        let mut camera = Camera::new(1000.0, 800.0);
        camera.set_origin(20.0, 40.0);

        let world_pos = Vec2::new(123.45, -67.8);
        let back = camera.screen_to_world(camera.world_to_screen(world_pos));
        assert!((back - world_pos).length() < 0.01);
    }

    #[test]
    fn test_visible_world_is_symmetric() {
        let camera = Camera::new(600.0, 600.0);
        let (min, max) = camera.visible_world();
        assert!((min.x + max.x).abs() < 1e-3);
        assert!((max.x - 600.0).abs() < 1e-3);
    }
}
