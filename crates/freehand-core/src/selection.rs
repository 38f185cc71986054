//! Selection handles and direct-manipulation math.

use crate::element::{Element, ElementId, ElementPatch, ElementType};
use crate::geometry::to_local;
use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};

/// Side of a corner handle in screen pixels.
pub const HANDLE_SIZE: f64 = 28.0;
/// Distance of the rotation handle above the box, in screen pixels.
pub const ROTATE_HANDLE_OFFSET: f64 = 40.0;
/// Rotation handle hit radius as a multiple of [`HANDLE_SIZE`].
pub const ROTATE_HANDLE_RADIUS_FACTOR: f64 = 1.5;
/// Smallest width or height a resize may produce.
pub const MIN_RESIZE_EXTENT: f64 = 1.0;

/// A hotspot on a selected element's box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Handle {
    #[serde(rename = "tl")]
    TopLeft,
    #[serde(rename = "tr")]
    TopRight,
    #[serde(rename = "bl")]
    BottomLeft,
    #[serde(rename = "br")]
    BottomRight,
    #[serde(rename = "rotate")]
    Rotate,
}

impl Handle {
    /// Corner handles in hit-test priority order.
    pub const CORNERS: [Handle; 4] = [
        Handle::TopLeft,
        Handle::TopRight,
        Handle::BottomLeft,
        Handle::BottomRight,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Handle::TopLeft => "tl",
            Handle::TopRight => "tr",
            Handle::BottomLeft => "bl",
            Handle::BottomRight => "br",
            Handle::Rotate => "rotate",
        }
    }

    pub fn is_corner(self) -> bool {
        !matches!(self, Handle::Rotate)
    }
}

/// Center of `handle` in the element's unrotated frame.
pub fn handle_position(element: &Element, handle: Handle, zoom: f64) -> Point {
    let (x, y, w, h) = (element.x, element.y, element.width, element.height);
    match handle {
        Handle::TopLeft => Point::new(x, y),
        Handle::TopRight => Point::new(x + w, y),
        Handle::BottomLeft => Point::new(x, y + h),
        Handle::BottomRight => Point::new(x + w, y + h),
        Handle::Rotate => Point::new(x + w / 2.0, y - ROTATE_HANDLE_OFFSET / zoom),
    }
}

/// All handles of an element with their unrotated positions.
pub fn handles(element: &Element, zoom: f64) -> Vec<(Handle, Point)> {
    Handle::CORNERS
        .iter()
        .chain(std::iter::once(&Handle::Rotate))
        .map(|&handle| (handle, handle_position(element, handle, zoom)))
        .collect()
}

/// The handle of `element` under `point`, if any.
///
/// Corners are squares of side `HANDLE_SIZE / zoom`; the rotation handle is a
/// circle of radius `1.5 * HANDLE_SIZE / zoom`. Corners are tested first.
pub fn handle_at_position(point: Point, element: &Element, zoom: f64) -> Option<Handle> {
    if !element.is_drawable() {
        return None;
    }
    let local = to_local(point, element);
    let half = HANDLE_SIZE / zoom / 2.0;

    let corner = Handle::CORNERS.into_iter().find(|&handle| {
        let center = handle_position(element, handle, zoom);
        (local.x - center.x).abs() < half && (local.y - center.y).abs() < half
    });
    if corner.is_some() {
        return corner;
    }

    let radius = ROTATE_HANDLE_RADIUS_FACTOR * HANDLE_SIZE / zoom;
    let rotate = handle_position(element, Handle::Rotate, zoom);
    ((local - rotate).hypot() < radius).then_some(Handle::Rotate)
}

/// Resize `original` by dragging `handle` to `pointer`.
///
/// The opposite corner stays fixed; the result is clamped to
/// [`MIN_RESIZE_EXTENT`]. Pencil samples are rescaled into the new box.
pub fn resize_element(original: &Element, handle: Handle, pointer: Point) -> Element {
    let (x, y, w, h) = (original.x, original.y, original.width, original.height);
    let (px, py) = (pointer.x, pointer.y);

    let (new_x, new_y, new_w, new_h) = match handle {
        Handle::TopLeft => (px, py, x + w - px, y + h - py),
        Handle::TopRight => (x, py, px - x, y + h - py),
        Handle::BottomLeft => (px, y, x + w - px, py - y),
        Handle::BottomRight => (x, y, px - x, py - y),
        Handle::Rotate => return original.clone(),
    };

    let mut resized = original.clone();
    resized.x = new_x;
    resized.y = new_y;
    resized.width = new_w.max(MIN_RESIZE_EXTENT);
    resized.height = new_h.max(MIN_RESIZE_EXTENT);

    if original.element_type() == ElementType::Pencil {
        rescale_points(original, &mut resized);
    }
    resized
}

fn rescale_points(original: &Element, resized: &mut Element) {
    let old_width = original.width.max(MIN_RESIZE_EXTENT);
    let old_height = original.height.max(MIN_RESIZE_EXTENT);
    let scale_x = resized.width / old_width;
    let scale_y = resized.height / old_height;
    let origin = Point::new(resized.x, resized.y);

    let points = original
        .points()
        .iter()
        .map(|p| {
            Point::new(
                origin.x + (p.x - original.x) * scale_x,
                origin.y + (p.y - original.y) * scale_y,
            )
        })
        .collect();
    resized.apply(&ElementPatch::new().with_points(points));
}

/// Angle from `center` to `point`, in radians.
pub fn pointer_angle(center: Point, point: Point) -> f64 {
    (point.y - center.y).atan2(point.x - center.x)
}

/// Working state of a rotation gesture.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationOrigin {
    /// Pointer angle about the element center at gesture start.
    pub start_angle: f64,
    /// Element angle at gesture start.
    pub element_angle: f64,
    /// Rotation center, fixed for the gesture.
    pub center: Point,
}

impl RotationOrigin {
    pub fn new(element: &Element, pointer: Point) -> Self {
        let center = element.center();
        Self {
            start_angle: pointer_angle(center, pointer),
            element_angle: element.angle,
            center,
        }
    }

    /// Element angle for the current pointer position.
    pub fn angle_at(&self, pointer: Point) -> f64 {
        self.element_angle + (pointer_angle(self.center, pointer) - self.start_angle)
    }
}

/// Working state of a move gesture: each element's origin at gesture start.
#[derive(Debug, Clone, PartialEq)]
pub struct MoveOrigin {
    pub pointer: Point,
    pub origins: Vec<(ElementId, Point)>,
}

impl MoveOrigin {
    pub fn new(pointer: Point, elements: &[&Element]) -> Self {
        Self {
            pointer,
            origins: elements.iter().map(|e| (e.id.clone(), e.origin())).collect(),
        }
    }

    pub fn delta(&self, pointer: Point) -> Vec2 {
        pointer - self.pointer
    }
}

/// Rubber-band rectangle anchored at the gesture start.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SelectionRect {
    pub start: Point,
    pub current: Point,
}

impl SelectionRect {
    pub fn new(start: Point) -> Self {
        Self { start, current: start }
    }

    /// Normalized rectangle with non-negative extents.
    pub fn to_rect(&self) -> Rect {
        Rect::from_points(self.start, self.current)
    }
}
