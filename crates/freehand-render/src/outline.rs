//! Per-kind outline geometry in world coordinates.

use crate::stroke::{StrokeOptions, StrokeOutliner};
use freehand_core::element::{Element, ElementKind};
use kurbo::{Affine, BezPath, Ellipse, Line, Point, Rect, Shape, Vec2};
use std::f64::consts::FRAC_PI_6;

/// Maximum arrowhead barb length, in world units.
pub const ARROW_HEAD_LENGTH: f64 = 20.0;
/// Angle between the shaft and each barb.
pub const ARROW_HEAD_ANGLE: f64 = FRAC_PI_6;
/// Flattening tolerance for curved outlines.
pub const PATH_TOLERANCE: f64 = 0.1;

/// Rotation of `element` about its box center.
pub fn element_transform(element: &Element) -> Affine {
    if element.angle == 0.0 {
        return Affine::IDENTITY;
    }
    Affine::rotate_about(element.angle, element.center())
}

/// Edge midpoints of `rect`: top, right, bottom, left.
pub fn diamond_vertices(rect: Rect) -> [Point; 4] {
    let center = rect.center();
    [
        Point::new(center.x, rect.y0),
        Point::new(rect.x1, center.y),
        Point::new(center.x, rect.y1),
        Point::new(rect.x0, center.y),
    ]
}

/// Endpoints of a line or arrow element: the drag start and the opposite corner.
pub fn line_endpoints(element: &Element) -> (Point, Point) {
    let start = element.origin();
    (start, start + Vec2::new(element.width, element.height))
}

/// Barb tips of an arrowhead at `end`, or `None` for a zero-length shaft.
pub fn arrow_head(start: Point, end: Point) -> Option<[Point; 2]> {
    let shaft = end - start;
    let length = shaft.hypot();
    if length == 0.0 {
        return None;
    }
    let head = ARROW_HEAD_LENGTH.min(length / 2.0);
    let angle = shaft.atan2();
    let barb = |theta: f64| end - Vec2::from_angle(theta) * head;
    Some([barb(angle - ARROW_HEAD_ANGLE), barb(angle + ARROW_HEAD_ANGLE)])
}

/// Closed polygon through `points`.
pub fn polygon(points: &[Point]) -> BezPath {
    let mut path = BezPath::new();
    let mut iter = points.iter();
    if let Some(first) = iter.next() {
        path.move_to(*first);
        for point in iter {
            path.line_to(*point);
        }
        path.close_path();
    }
    path
}

/// Outline of `element` in unrotated world coordinates.
///
/// Boxes and diamonds are closed, lines and arrows are open strokes and
/// pencil strokes are the filled polygon from `outliner`. Text and images
/// have no vector outline and return `None`, as do pencil elements without
/// samples.
pub fn element_path(element: &Element, outliner: &dyn StrokeOutliner) -> Option<BezPath> {
    let bounds = element.bounds();
    match &element.kind {
        ElementKind::Rectangle => Some(bounds.to_path(PATH_TOLERANCE)),
        ElementKind::Ellipse => Some(Ellipse::from_rect(bounds).to_path(PATH_TOLERANCE)),
        ElementKind::Diamond => Some(polygon(&diamond_vertices(bounds))),
        ElementKind::Line => {
            let (start, end) = line_endpoints(element);
            Some(Line::new(start, end).to_path(PATH_TOLERANCE))
        }
        ElementKind::Arrow => {
            let (start, end) = line_endpoints(element);
            let mut path = BezPath::new();
            path.move_to(start);
            path.line_to(end);
            if let Some([left, right]) = arrow_head(start, end) {
                path.move_to(left);
                path.line_to(end);
                path.line_to(right);
            }
            Some(path)
        }
        ElementKind::Pencil { points } => {
            let options = StrokeOptions::for_stroke_width(element.stroke_width);
            let outline = outliner.outline(points, &options);
            (!outline.is_empty()).then(|| polygon(&outline))
        }
        ElementKind::Text(_) | ElementKind::Image { .. } => None,
    }
}

/// Whether the outline of `element` encloses area (can take a fill).
pub fn is_closed(element: &Element) -> bool {
    matches!(
        element.kind,
        ElementKind::Rectangle | ElementKind::Ellipse | ElementKind::Diamond
    )
}
