//! Camera module for pan/zoom transforms.

use crate::input::{Modifiers, WheelEvent};
use kurbo::{Affine, Point, Vec2};
use serde::{Deserialize, Serialize};

/// Multiplicative zoom step for one wheel notch.
pub const WHEEL_ZOOM_FACTOR: f64 = 0.9;
/// Additive zoom step for the zoom buttons.
pub const BUTTON_ZOOM_STEP: f64 = 0.1;
pub const MIN_ZOOM: f64 = 0.1;
pub const MAX_ZOOM: f64 = 5.0;

/// Camera manages the view transform for the canvas.
///
/// Screen = world * zoom + pan.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Camera {
    /// Translation in screen pixels.
    pub pan: Vec2,
    pub zoom: f64,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }
}

impl Camera {
    pub fn new() -> Self {
        Self::default()
    }

    /// World to screen transform.
    pub fn transform(&self) -> Affine {
        Affine::translate(self.pan) * Affine::scale(self.zoom)
    }

    pub fn screen_to_world(&self, screen: Point) -> Point {
        Point::new((screen.x - self.pan.x) / self.zoom, (screen.y - self.pan.y) / self.zoom)
    }

    pub fn world_to_screen(&self, world: Point) -> Point {
        Point::new(world.x * self.zoom + self.pan.x, world.y * self.zoom + self.pan.y)
    }

    /// Pan by a raw screen-space delta.
    pub fn pan_by(&mut self, delta: Vec2) {
        self.pan += delta;
    }

    /// Set the zoom, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom + BUTTON_ZOOM_STEP);
    }

    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom - BUTTON_ZOOM_STEP);
    }

    /// Apply a wheel event.
    ///
    /// Ctrl/Cmd zooms, Shift pans horizontally, anything else pans vertically.
    pub fn apply_wheel(&mut self, event: &WheelEvent) {
        let Modifiers { shift, .. } = event.modifiers;
        let delta = event.delta.y;
        if event.modifiers.action() {
            if delta > 0.0 {
                self.set_zoom(self.zoom * WHEEL_ZOOM_FACTOR);
            } else if delta < 0.0 {
                self.set_zoom(self.zoom / WHEEL_ZOOM_FACTOR);
            }
        } else if shift {
            self.pan.x -= delta;
        } else {
            self.pan.y -= delta;
        }
    }

    /// Reset to 100% at the origin.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wheel(dy: f64, modifiers: Modifiers) -> WheelEvent {
        WheelEvent {
            delta: Vec2::new(0.0, dy),
            modifiers,
        }
    }

    #[test]
    fn test_screen_world_roundtrip() {
        let camera = Camera {
            pan: Vec2::new(30.0, -20.0),
            zoom: 2.0,
        };
        let world = camera.screen_to_world(Point::new(130.0, 80.0));
        assert!((world.x - 50.0).abs() < f64::EPSILON);
        assert!((world.y - 50.0).abs() < f64::EPSILON);
        let screen = camera.world_to_screen(world);
        assert!((screen.x - 130.0).abs() < f64::EPSILON);
        assert_eq!(camera.transform() * world, screen);
    }

    #[test]
    fn test_wheel_zoom() {
        let mut camera = Camera::new();
        camera.apply_wheel(&wheel(100.0, Modifiers::CTRL));
        assert!((camera.zoom - 0.9).abs() < 1e-12);
        camera.apply_wheel(&wheel(-100.0, Modifiers::CTRL));
        assert!((camera.zoom - 1.0).abs() < 1e-12);
        assert_eq!(camera.pan, Vec2::ZERO);
    }

    #[test]
    fn test_wheel_zoom_clamps() {
        let mut camera = Camera::new();
        for _ in 0..100 {
            camera.apply_wheel(&wheel(1.0, Modifiers::CTRL));
        }
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
        for _ in 0..100 {
            camera.apply_wheel(&wheel(-1.0, Modifiers::META));
        }
        assert!((camera.zoom - MAX_ZOOM).abs() < f64::EPSILON);
    }

    #[test]
    fn test_wheel_pans() {
        let mut camera = Camera::new();
        camera.apply_wheel(&wheel(40.0, Modifiers::SHIFT));
        assert_eq!(camera.pan, Vec2::new(-40.0, 0.0));
        camera.apply_wheel(&wheel(25.0, Modifiers::NONE));
        assert_eq!(camera.pan, Vec2::new(-40.0, -25.0));
    }

    #[test]
    fn test_zoom_buttons() {
        let mut camera = Camera::new();
        camera.zoom_in();
        assert!((camera.zoom - 1.1).abs() < 1e-12);
        camera.set_zoom(0.15);
        camera.zoom_out();
        assert!((camera.zoom - MIN_ZOOM).abs() < f64::EPSILON);
    }
}
