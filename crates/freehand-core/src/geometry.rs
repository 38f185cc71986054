//! Hit-testing and drag geometry.
//!
//! Pure functions over elements and world-space points. Rotation is never
//! baked into an element's box, so every query first maps the point into the
//! element's unrotated local frame.

use crate::element::{Element, ElementPatch, ElementType};
use kurbo::{Affine, Point, Rect};

/// Distance within which a point hits a freehand stroke, in world units.
pub const PENCIL_HIT_THRESHOLD: f64 = 5.0;

/// An origin plus signed extents.
///
/// Unlike [`Rect`], extents may be negative: lines and arrows keep the drag
/// direction in the sign of their width and height.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Bounds {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Normalized rectangle covering the same area.
    pub fn to_rect(self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    /// Patch that writes these bounds onto an element.
    pub fn to_patch(self) -> ElementPatch {
        ElementPatch::new()
            .with_position(Point::new(self.x, self.y))
            .with_size(self.width, self.height)
    }
}

impl From<Rect> for Bounds {
    fn from(rect: Rect) -> Self {
        let rect = rect.abs();
        Self::new(rect.x0, rect.y0, rect.width(), rect.height())
    }
}

/// Rotate `point` by `angle` radians about `center`.
pub fn rotate_about(point: Point, center: Point, angle: f64) -> Point {
    if angle == 0.0 {
        return point;
    }
    Affine::rotate_about(angle, center) * point
}

/// Map a world point into the element's unrotated frame.
pub fn to_local(point: Point, element: &Element) -> Point {
    rotate_about(point, element.center(), -element.angle)
}

/// Distance from `point` to the segment `a..b`.
///
/// The closest point is clamped to the segment, not the infinite line.
pub fn point_to_segment_dist(point: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len_sq = ab.hypot2();
    if len_sq == 0.0 {
        return (point - a).hypot();
    }
    let t = ((point - a).dot(ab) / len_sq).clamp(0.0, 1.0);
    let closest = a + ab * t;
    (point - closest).hypot()
}

/// Minimum distance from `point` to a polyline.
///
/// A single-sample polyline is treated as a point.
pub fn point_to_polyline_dist(point: Point, points: &[Point]) -> f64 {
    match points {
        [] => f64::INFINITY,
        [only] => (point - *only).hypot(),
        _ => points
            .windows(2)
            .map(|pair| point_to_segment_dist(point, pair[0], pair[1]))
            .fold(f64::INFINITY, f64::min),
    }
}

/// Whether `point` falls on `element`, using `pencil_tolerance` for strokes.
pub fn hit_test(point: Point, element: &Element, pencil_tolerance: f64) -> bool {
    if !element.is_drawable() {
        return false;
    }
    let local = to_local(point, element);
    match element.element_type() {
        ElementType::Pencil => point_to_polyline_dist(local, element.points()) < pencil_tolerance,
        _ => {
            let x0 = element.x.min(element.x + element.width);
            let x1 = element.x.max(element.x + element.width);
            let y0 = element.y.min(element.y + element.height);
            let y1 = element.y.max(element.y + element.height);
            local.x >= x0 && local.x <= x1 && local.y >= y0 && local.y <= y1
        }
    }
}

/// Rotation-aware containment test with the default stroke tolerance.
pub fn point_in_element(point: Point, element: &Element) -> bool {
    hit_test(point, element, PENCIL_HIT_THRESHOLD)
}

/// The highest element in z-order containing `point`.
pub fn topmost_hit_at(point: Point, elements: &[Element]) -> Option<&Element> {
    elements.iter().rev().find(|element| point_in_element(point, element))
}

/// Bounds of a shape being drawn from `start` to `current`.
///
/// Boxes normalize negative extents; with `aspect_locked`, rectangles and
/// diamonds become squares of side `max(|dw|, |dh|)` in the drag direction.
/// Lines and arrows keep their signed extents anchored at `start`.
pub fn bounds_from_drag(
    start: Point,
    current: Point,
    element_type: ElementType,
    aspect_locked: bool,
) -> Bounds {
    let mut width = current.x - start.x;
    let mut height = current.y - start.y;

    match element_type {
        ElementType::Line | ElementType::Arrow => Bounds::new(start.x, start.y, width, height),
        ElementType::Rectangle | ElementType::Diamond => {
            if aspect_locked {
                let size = width.abs().max(height.abs());
                width = size.copysign(width);
                height = size.copysign(height);
            }
            normalized(start, width, height)
        }
        _ => normalized(start, width, height),
    }
}

fn normalized(start: Point, width: f64, height: f64) -> Bounds {
    Bounds::new(
        start.x.min(start.x + width),
        start.y.min(start.y + height),
        width.abs(),
        height.abs(),
    )
}

/// Whether the element's whole box lies inside `rect`.
///
/// Elements with zero width or height never qualify.
pub fn contained_within(element: &Element, rect: Rect) -> bool {
    if element.width == 0.0 || element.height == 0.0 || !element.is_drawable() {
        return false;
    }
    let rect = rect.abs();
    let bounds = element.bounds();
    bounds.x0 >= rect.x0 && bounds.x1 <= rect.x1 && bounds.y0 >= rect.y0 && bounds.y1 <= rect.y1
}

/// Union of the boxes of all drawable elements.
pub fn collection_bounds(elements: &[Element]) -> Option<Rect> {
    elements
        .iter()
        .filter(|element| element.is_drawable())
        .map(rotated_bounds)
        .reduce(|acc, rect| acc.union(rect))
}

/// Axis-aligned box of the element after rotation.
pub fn rotated_bounds(element: &Element) -> Rect {
    let bounds = element.bounds();
    if element.angle == 0.0 {
        return bounds;
    }
    let transform = Affine::rotate_about(element.angle, element.center());
    let corners = [
        Point::new(bounds.x0, bounds.y0),
        Point::new(bounds.x1, bounds.y0),
        Point::new(bounds.x0, bounds.y1),
        Point::new(bounds.x1, bounds.y1),
    ];
    let first = transform * corners[0];
    corners[1..]
        .iter()
        .fold(Rect::from_points(first, first), |acc, corner| acc.union_pt(transform * *corner))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::{ElementKind, ElementPatch};
    use std::f64::consts::FRAC_PI_2;

    fn rect(id: &str, x: f64, y: f64, w: f64, h: f64) -> Element {
        Element::create(
            id,
            ElementKind::Rectangle,
            &ElementPatch::new().with_position(Point::new(x, y)).with_size(w, h),
        )
    }

    #[test]
    fn test_point_in_unrotated_box() {
        let element = rect("a", 0.0, 0.0, 100.0, 100.0);
        assert!(point_in_element(Point::new(50.0, 50.0), &element));
        assert!(point_in_element(Point::new(0.0, 100.0), &element));
        assert!(!point_in_element(Point::new(101.0, 50.0), &element));
    }

    #[test]
    fn test_point_in_rotated_box() {
        let mut element = rect("a", 0.0, 0.0, 100.0, 20.0);
        // A wide, short box rotated a quarter turn becomes tall and thin.
        assert!(point_in_element(Point::new(90.0, 10.0), &element));
        element.angle = FRAC_PI_2;
        assert!(!point_in_element(Point::new(90.0, 10.0), &element));
        assert!(point_in_element(Point::new(50.0, 50.0), &element));
        assert!(point_in_element(Point::new(50.0, -30.0), &element));
    }

    #[test]
    fn test_rotation_keeps_center_inside() {
        let mut element = rect("a", 0.0, 0.0, 100.0, 100.0);
        element.angle = FRAC_PI_2;
        assert!(point_in_element(Point::new(50.0, 50.0), &element));

        let world = rotate_about(Point::new(10.0, 10.0), element.center(), element.angle);
        assert!(point_in_element(world, &element));
        let local = to_local(world, &element);
        assert!((local.x - 10.0).abs() < 1e-9);
        assert!((local.y - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_segment_distance_clamps_to_endpoints() {
        let a = Point::new(0.0, 0.0);
        let b = Point::new(10.0, 0.0);
        assert!((point_to_segment_dist(Point::new(5.0, 3.0), a, b) - 3.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(13.0, 4.0), a, b) - 5.0).abs() < 1e-9);
        assert!((point_to_segment_dist(Point::new(3.0, 4.0), a, a) - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_pencil_hit() {
        let mut pencil = Element::new("p", ElementType::Pencil.into());
        pencil.push_point(Point::new(0.0, 0.0));
        pencil.push_point(Point::new(100.0, 0.0));
        assert!(point_in_element(Point::new(50.0, 4.0), &pencil));
        assert!(!point_in_element(Point::new(50.0, 6.0), &pencil));
        assert!(!point_in_element(Point::new(110.0, 0.0), &pencil));
    }

    #[test]
    fn test_empty_pencil_never_hits() {
        let pencil = Element::new("p", ElementType::Pencil.into());
        assert!(!point_in_element(Point::new(0.0, 0.0), &pencil));
    }

    #[test]
    fn test_topmost_hit_prefers_last() {
        let elements = vec![rect("below", 0.0, 0.0, 100.0, 100.0), rect("above", 50.0, 50.0, 100.0, 100.0)];
        let hit = topmost_hit_at(Point::new(75.0, 75.0), &elements).map(|e| e.id.as_str());
        assert_eq!(hit, Some("above"));
        let hit = topmost_hit_at(Point::new(10.0, 10.0), &elements).map(|e| e.id.as_str());
        assert_eq!(hit, Some("below"));
        assert!(topmost_hit_at(Point::new(500.0, 500.0), &elements).is_none());
    }

    #[test]
    fn test_bounds_from_drag_normalizes_boxes() {
        let bounds = bounds_from_drag(
            Point::new(100.0, 100.0),
            Point::new(40.0, 70.0),
            ElementType::Ellipse,
            false,
        );
        assert_eq!(bounds, Bounds::new(40.0, 70.0, 60.0, 30.0));
    }

    #[test]
    fn test_bounds_from_drag_aspect_locked() {
        let bounds = bounds_from_drag(
            Point::new(100.0, 100.0),
            Point::new(60.0, 120.0),
            ElementType::Rectangle,
            true,
        );
        assert_eq!(bounds, Bounds::new(60.0, 100.0, 40.0, 40.0));
    }

    #[test]
    fn test_bounds_from_drag_keeps_line_direction() {
        let bounds = bounds_from_drag(
            Point::new(100.0, 100.0),
            Point::new(40.0, 130.0),
            ElementType::Arrow,
            true,
        );
        assert_eq!(bounds, Bounds::new(100.0, 100.0, -60.0, 30.0));
    }

    #[test]
    fn test_contained_within_excludes_partial_overlap() {
        let element = rect("a", 10.0, 10.0, 20.0, 20.0);
        assert!(contained_within(&element, Rect::new(0.0, 0.0, 50.0, 50.0)));
        assert!(!contained_within(&element, Rect::new(0.0, 0.0, 25.0, 25.0)));
    }

    #[test]
    fn test_contained_within_excludes_zero_size() {
        let element = rect("a", 10.0, 10.0, 0.0, 20.0);
        assert!(!contained_within(&element, Rect::new(0.0, 0.0, 50.0, 50.0)));
    }

    #[test]
    fn test_collection_bounds_includes_rotation() {
        let mut element = rect("a", 0.0, 40.0, 100.0, 20.0);
        element.angle = FRAC_PI_2;
        let bounds = collection_bounds(&[element]).unwrap();
        assert!((bounds.x0 - 40.0).abs() < 1e-9);
        assert!((bounds.y0 - 0.0).abs() < 1e-9);
        assert!((bounds.width() - 20.0).abs() < 1e-9);
        assert!((bounds.height() - 100.0).abs() < 1e-9);
    }
}
