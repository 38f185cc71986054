//! Freehand stroke outlining: polyline samples to a fillable polygon.

use kurbo::{Point, Vec2};
use std::f64::consts::TAU;

/// Parameters for turning pencil samples into a filled outline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StrokeOptions {
    /// Diameter of the stroke.
    pub size: f64,
    /// How much pressure narrows the stroke, 0 to 1.
    pub thinning: f64,
    /// Edge softening, 0 to 1.
    pub smoothing: f64,
    /// How strongly input is pulled toward the previous point, 0 to 1.
    pub streamline: f64,
}

impl Default for StrokeOptions {
    fn default() -> Self {
        Self {
            size: 4.0,
            thinning: 0.5,
            smoothing: 0.5,
            streamline: 0.5,
        }
    }
}

impl StrokeOptions {
    /// Options for an element drawn with `stroke_width`.
    pub fn for_stroke_width(stroke_width: f64) -> Self {
        Self {
            size: stroke_width * 2.0,
            ..Self::default()
        }
    }
}

/// Freehand stroke smoothing backend.
pub trait StrokeOutliner: Send + Sync {
    /// Closed polygon enclosing the stroke through `points`. Empty input
    /// yields an empty polygon.
    fn outline(&self, points: &[Point], options: &StrokeOptions) -> Vec<Point>;
}

/// Number of vertices used for the outline of a single dot.
const DOT_SEGMENTS: usize = 12;

/// Constant-width outline with streamlined input.
///
/// Samples are first pulled toward their predecessor by `streamline`, then
/// offset by half of `size` on both sides. `thinning` and `smoothing` are
/// accepted but have no effect.
#[derive(Debug, Clone, Copy, Default)]
pub struct SimpleOutliner;

impl SimpleOutliner {
    fn streamlined(points: &[Point], streamline: f64) -> Vec<Point> {
        let t = 1.0 - streamline.clamp(0.0, 0.99);
        let mut out: Vec<Point> = Vec::with_capacity(points.len());
        for &point in points {
            let next = match out.last() {
                Some(&prev) => prev.lerp(point, t),
                None => point,
            };
            if out.last() != Some(&next) {
                out.push(next);
            }
        }
        // The stroke must still reach the last sample.
        if let (Some(&last), Some(end)) = (points.last(), out.last_mut()) {
            *end = last;
        }
        out
    }

    fn dot(center: Point, radius: f64) -> Vec<Point> {
        (0..DOT_SEGMENTS)
            .map(|i| {
                let theta = TAU * i as f64 / DOT_SEGMENTS as f64;
                center + Vec2::from_angle(theta) * radius
            })
            .collect()
    }
}

impl StrokeOutliner for SimpleOutliner {
    fn outline(&self, points: &[Point], options: &StrokeOptions) -> Vec<Point> {
        let radius = (options.size / 2.0).max(0.5);
        let samples = Self::streamlined(points, options.streamline);

        match samples.as_slice() {
            [] => Vec::new(),
            [only] => Self::dot(*only, radius),
            _ => {
                let mut left = Vec::with_capacity(samples.len());
                let mut right = Vec::with_capacity(samples.len());
                for (i, &point) in samples.iter().enumerate() {
                    let prev = samples[i.saturating_sub(1)];
                    let next = samples[(i + 1).min(samples.len() - 1)];
                    let dir = next - prev;
                    let len = dir.hypot();
                    if len == 0.0 {
                        continue;
                    }
                    let normal = Vec2::new(-dir.y, dir.x) * (radius / len);
                    left.push(point + normal);
                    right.push(point - normal);
                }
                right.reverse();
                left.extend(right);
                left
            }
        }
    }
}
