//! Software rasterizer for display lists.
//!
//! Replays [`DrawCommand`]s into an RGBA8 buffer. Paths are flattened to
//! polygons; fills use the nonzero rule sampled at pixel centers and strokes
//! get a one pixel anti-aliased edge. Text runs need a font backend and are
//! not drawn.

use crate::display_list::{DrawCommand, Primitive};
use crate::renderer::{RenderResult, RendererError};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use freehand_core::element::FillStyle;
use kurbo::{Affine, BezPath, PathEl, Point, Rect};
use peniko::Color;

/// Largest accepted raster side, in pixels.
pub const MAX_RASTER_SIDE: u32 = 16384;
const FLATTEN_TOLERANCE: f64 = 0.25;
/// Spacing of hachure lines, in pixels.
const HACHURE_GAP: i64 = 8;
/// Thickness of hachure lines, in pixels.
const HACHURE_THICKNESS: i64 = 2;

/// An RGBA8 image, row-major, straight alpha.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Raster {
    width: u32,
    height: u32,
    pixels: Vec<u8>,
}

impl Raster {
    /// A raster cleared to `background`.
    pub fn new(width: u32, height: u32, background: Color) -> RenderResult<Self> {
        if width == 0 || height == 0 || width > MAX_RASTER_SIDE || height > MAX_RASTER_SIDE {
            return Err(RendererError::InvalidSize { width, height });
        }
        let bg = background.to_rgba8();
        let pixels = [bg.r, bg.g, bg.b, bg.a].repeat(width as usize * height as usize);
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    pub fn into_pixels(self) -> Vec<u8> {
        self.pixels
    }

    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = self.index(x, y);
        Some([self.pixels[i], self.pixels[i + 1], self.pixels[i + 2], self.pixels[i + 3]])
    }

    fn index(&self, x: u32, y: u32) -> usize {
        (y as usize * self.width as usize + x as usize) * 4
    }

    /// Composite `rgba` over the pixel with the given coverage.
    fn blend(&mut self, x: u32, y: u32, rgba: [f32; 4], coverage: f32) {
        let sa = rgba[3] * coverage;
        if sa <= 0.0 {
            return;
        }
        let i = self.index(x, y);
        let dst = &mut self.pixels[i..i + 4];
        let da = f32::from(dst[3]) / 255.0;
        let out_a = sa + da * (1.0 - sa);
        for c in 0..3 {
            let dc = f32::from(dst[c]) / 255.0;
            let v = (rgba[c] * sa + dc * da * (1.0 - sa)) / out_a;
            dst[c] = to_byte(v);
        }
        dst[3] = to_byte(out_a);
    }

    /// Pixel bounds of `rect` clipped to the raster, as `(x0, y0, x1, y1)`.
    fn clip(&self, rect: Rect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x0.floor().max(0.0);
        let y0 = rect.y0.floor().max(0.0);
        let x1 = rect.x1.ceil().min(f64::from(self.width));
        let y1 = rect.y1.ceil().min(f64::from(self.height));
        (x0 < x1 && y0 < y1).then(|| (x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

fn to_byte(v: f32) -> u8 {
    (v * 255.0).round().clamp(0.0, 255.0) as u8
}

fn components(color: Color, opacity: f64) -> [f32; 4] {
    let c = color.to_rgba8();
    [
        f32::from(c.r) / 255.0,
        f32::from(c.g) / 255.0,
        f32::from(c.b) / 255.0,
        f32::from(c.a) / 255.0 * opacity.clamp(0.0, 1.0) as f32,
    ]
}

/// Per-command coverage over a pixel window; overlapping segments take the max.
struct Mask {
    x0: u32,
    y0: u32,
    width: u32,
    values: Vec<f32>,
}

impl Mask {
    fn new((x0, y0, x1, y1): (u32, u32, u32, u32)) -> Self {
        let width = x1 - x0;
        Self {
            x0,
            y0,
            width,
            values: vec![0.0; width as usize * (y1 - y0) as usize],
        }
    }

    fn cover(&mut self, x: u32, y: u32, value: f32) {
        let i = (y - self.y0) as usize * self.width as usize + (x - self.x0) as usize;
        if let Some(slot) = self.values.get_mut(i) {
            *slot = slot.max(value);
        }
    }

    fn composite(&self, raster: &mut Raster, rgba: [f32; 4]) {
        for (i, &coverage) in self.values.iter().enumerate() {
            if coverage > 0.0 {
                let x = self.x0 + (i % self.width as usize) as u32;
                let y = self.y0 + (i / self.width as usize) as u32;
                raster.blend(x, y, rgba, coverage);
            }
        }
    }
}

/// Flatten `path` under `transform` into polylines.
fn flatten(path: &BezPath, transform: Affine) -> Vec<Vec<Point>> {
    let mut path = path.clone();
    path.apply_affine(transform);

    let mut polylines = Vec::new();
    let mut current: Vec<Point> = Vec::new();
    kurbo::flatten(path.iter(), FLATTEN_TOLERANCE, |el| match el {
        PathEl::MoveTo(p) => {
            if current.len() > 1 {
                polylines.push(std::mem::take(&mut current));
            }
            current.clear();
            current.push(p);
        }
        PathEl::LineTo(p) => current.push(p),
        PathEl::ClosePath => {
            if let Some(&first) = current.first() {
                current.push(first);
            }
        }
        _ => {}
    });
    if current.len() > 1 {
        polylines.push(current);
    }
    polylines
}

fn polyline_bounds(polylines: &[Vec<Point>]) -> Option<Rect> {
    polylines
        .iter()
        .flatten()
        .map(|p| Rect::from_points(*p, *p))
        .reduce(|acc, r| acc.union(r))
}

fn fill_mask(raster: &Raster, polylines: &[Vec<Point>], style: FillStyle) -> Option<Mask> {
    let window = raster.clip(polyline_bounds(polylines)?)?;
    let mut mask = Mask::new(window);
    let (x0, y0, x1, y1) = window;

    let mut crossings: Vec<(f64, i32)> = Vec::new();
    for py in y0..y1 {
        let yc = f64::from(py) + 0.5;
        crossings.clear();
        for polyline in polylines {
            // Subpaths are filled as if closed.
            let closing = [polyline[polyline.len() - 1], polyline[0]];
            let edges = polyline.windows(2).chain(std::iter::once(&closing[..]));
            for edge in edges {
                let (a, b) = (edge[0], edge[1]);
                let winding = if a.y <= yc && yc < b.y {
                    1
                } else if b.y <= yc && yc < a.y {
                    -1
                } else {
                    continue;
                };
                let t = (yc - a.y) / (b.y - a.y);
                crossings.push((a.x + t * (b.x - a.x), winding));
            }
        }
        crossings.sort_by(|a, b| a.0.total_cmp(&b.0));

        let mut winding = 0;
        for pair in crossings.windows(2) {
            winding += pair[0].1;
            if winding == 0 {
                continue;
            }
            let start = (pair[0].0 - 0.5).ceil().max(f64::from(x0)) as u32;
            let end = (pair[1].0 - 0.5).ceil().min(f64::from(x1)) as u32;
            for px in start..end {
                if style == FillStyle::Hachure
                    && (i64::from(px) + i64::from(py)).rem_euclid(HACHURE_GAP) >= HACHURE_THICKNESS
                {
                    continue;
                }
                mask.cover(px, py, 1.0);
            }
        }
    }
    Some(mask)
}

fn stroke_mask(raster: &Raster, polylines: &[Vec<Point>], width: f64) -> Option<Mask> {
    let half = (width / 2.0).max(0.5);
    let window = raster.clip(polyline_bounds(polylines)?.inflate(half + 1.0, half + 1.0))?;
    let mut mask = Mask::new(window);
    let (wx0, wy0, wx1, wy1) = window;

    for polyline in polylines {
        for segment in polyline.windows(2) {
            let (a, b) = (segment[0], segment[1]);
            let reach = Rect::from_points(a, b).inflate(half + 1.0, half + 1.0);
            let Some((x0, y0, x1, y1)) = raster.clip(reach) else {
                continue;
            };
            for py in y0.max(wy0)..y1.min(wy1) {
                for px in x0.max(wx0)..x1.min(wx1) {
                    let center = Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
                    let distance = segment_distance(center, a, b);
                    let coverage = (half + 0.5 - distance).clamp(0.0, 1.0);
                    if coverage > 0.0 {
                        mask.cover(px, py, coverage as f32);
                    }
                }
            }
        }
    }
    Some(mask)
}

fn segment_distance(p: Point, a: Point, b: Point) -> f64 {
    let ab = b - a;
    let len2 = ab.hypot2();
    if len2 == 0.0 {
        return (p - a).hypot();
    }
    let t = ((p - a).dot(ab) / len2).clamp(0.0, 1.0);
    (p - (a + ab * t)).hypot()
}

/// Raw bytes of a base64 `data:` URI.
pub fn decode_data_uri(uri: &str) -> Option<Vec<u8>> {
    let (header, payload) = uri.split_once(',')?;
    if !header.starts_with("data:") || !header.ends_with(";base64") {
        return None;
    }
    STANDARD.decode(payload.trim()).ok()
}

fn draw_image(raster: &mut Raster, rect: Rect, data_uri: &str, transform: Affine, opacity: f64) {
    let Some(bytes) = decode_data_uri(data_uri) else {
        log::warn!("Skipping image with malformed data URI");
        return;
    };
    let bitmap = match image::load_from_memory(&bytes) {
        Ok(decoded) => decoded.to_rgba8(),
        Err(e) => {
            log::warn!("Skipping undecodable image: {e}");
            return;
        }
    };
    let (image_width, image_height) = bitmap.dimensions();
    if image_width == 0 || image_height == 0 || rect.width() <= 0.0 || rect.height() <= 0.0 {
        return;
    }
    let Some((x0, y0, x1, y1)) = raster.clip(transform.transform_rect_bbox(rect)) else {
        return;
    };

    let inverse = transform.inverse();
    for py in y0..y1 {
        for px in x0..x1 {
            let local = inverse * Point::new(f64::from(px) + 0.5, f64::from(py) + 0.5);
            if !(rect.x0..rect.x1).contains(&local.x) || !(rect.y0..rect.y1).contains(&local.y) {
                continue;
            }
            let u = ((local.x - rect.x0) / rect.width() * f64::from(image_width)) as u32;
            let v = ((local.y - rect.y0) / rect.height() * f64::from(image_height)) as u32;
            let texel = bitmap.get_pixel(u.min(image_width - 1), v.min(image_height - 1)).0;
            let rgba = [
                f32::from(texel[0]) / 255.0,
                f32::from(texel[1]) / 255.0,
                f32::from(texel[2]) / 255.0,
                f32::from(texel[3]) / 255.0 * opacity.clamp(0.0, 1.0) as f32,
            ];
            raster.blend(px, py, rgba, 1.0);
        }
    }
}

/// Paint `commands` in order onto a `width` x `height` raster cleared to `background`.
pub fn rasterize(
    commands: &[DrawCommand],
    (width, height): (u32, u32),
    background: Color,
) -> RenderResult<Raster> {
    let mut raster = Raster::new(width, height, background)?;

    for command in commands {
        match &command.primitive {
            Primitive::Path(path) => {
                let polylines = flatten(path, command.transform);
                if polylines.is_empty() {
                    continue;
                }
                if let Some(fill) = command.fill {
                    if let Some(mask) = fill_mask(&raster, &polylines, command.fill_style) {
                        mask.composite(&mut raster, components(fill, command.opacity));
                    }
                }
                if let Some(stroke) = command.stroke {
                    let scale = command.transform.determinant().abs().sqrt();
                    if let Some(mask) = stroke_mask(&raster, &polylines, command.width * scale) {
                        mask.composite(&mut raster, components(stroke, command.opacity));
                    }
                }
            }
            Primitive::Image { rect, data_uri } => {
                draw_image(&mut raster, *rect, data_uri, command.transform, command.opacity);
            }
            Primitive::Text { text, .. } => {
                log::debug!("Text run {text:?} not rasterized");
            }
        }
    }
    Ok(raster)
}

#[cfg(test)]
mod tests {
    use super::*;
    use kurbo::Shape;

    const BLACK: Color = Color::from_rgba8(0, 0, 0, 255);
    const RED: Color = Color::from_rgba8(255, 0, 0, 255);

    fn command(primitive: Primitive) -> DrawCommand {
        DrawCommand {
            primitive,
            transform: Affine::IDENTITY,
            stroke: None,
            fill: None,
            fill_style: FillStyle::Solid,
            width: 1.0,
            opacity: 1.0,
            element_id: None,
        }
    }

    fn rect_path(x0: f64, y0: f64, x1: f64, y1: f64) -> Primitive {
        Primitive::Path(Rect::new(x0, y0, x1, y1).to_path(0.1))
    }

    #[test]
    fn test_invalid_size() {
        assert!(matches!(
            rasterize(&[], (0, 10), BLACK),
            Err(RendererError::InvalidSize { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_background() {
        let raster = rasterize(&[], (4, 3), BLACK).unwrap();
        assert_eq!(raster.pixels().len(), 48);
        assert_eq!(raster.pixel(3, 2), Some([0, 0, 0, 255]));
        assert_eq!(raster.pixel(4, 0), None);
    }

    #[test]
    fn test_solid_fill() {
        let cmd = DrawCommand {
            fill: Some(RED),
            ..command(rect_path(2.0, 2.0, 8.0, 8.0))
        };
        let raster = rasterize(&[cmd], (10, 10), BLACK).unwrap();
        assert_eq!(raster.pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(2, 2), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(8, 8), Some([0, 0, 0, 255]));
        assert_eq!(raster.pixel(0, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_curved_fill_is_flattened() {
        let circle = kurbo::Circle::new((10.0, 10.0), 8.0).to_path(0.1);
        let cmd = DrawCommand {
            fill: Some(RED),
            ..command(Primitive::Path(circle))
        };
        let raster = rasterize(&[cmd], (20, 20), BLACK).unwrap();
        assert_eq!(raster.pixel(10, 10), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(10, 3), Some([255, 0, 0, 255]));
        // Corners of the bounding box lie outside the circle.
        assert_eq!(raster.pixel(3, 3), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_hachure_leaves_gaps() {
        let cmd = DrawCommand {
            fill: Some(RED),
            fill_style: FillStyle::Hachure,
            ..command(rect_path(0.0, 0.0, 20.0, 20.0))
        };
        let raster = rasterize(&[cmd], (20, 20), BLACK).unwrap();
        assert_eq!(raster.pixel(0, 0), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(4, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_line() {
        let mut path = BezPath::new();
        path.move_to((0.0, 5.5));
        path.line_to((10.0, 5.5));
        let cmd = DrawCommand {
            stroke: Some(RED),
            width: 2.0,
            ..command(Primitive::Path(path))
        };
        let raster = rasterize(&[cmd], (10, 10), BLACK).unwrap();
        assert_eq!(raster.pixel(5, 5), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(5, 0), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_stroke_scales_with_view() {
        let mut path = BezPath::new();
        path.move_to((0.0, 2.5));
        path.line_to((5.0, 2.5));
        let cmd = DrawCommand {
            stroke: Some(RED),
            width: 2.0,
            transform: Affine::scale(2.0),
            ..command(Primitive::Path(path))
        };
        let raster = rasterize(&[cmd], (10, 10), BLACK).unwrap();
        // Four pixels thick around y = 5.
        assert_eq!(raster.pixel(5, 3), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(5, 6), Some([255, 0, 0, 255]));
        assert_eq!(raster.pixel(5, 9), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_opacity_blends() {
        let white = Color::from_rgba8(255, 255, 255, 255);
        let cmd = DrawCommand {
            fill: Some(white),
            opacity: 0.5,
            ..command(rect_path(0.0, 0.0, 4.0, 4.0))
        };
        let raster = rasterize(&[cmd], (4, 4), BLACK).unwrap();
        let [r, g, b, a] = raster.pixel(1, 1).unwrap();
        assert!((127..=128).contains(&r));
        assert_eq!((r, g), (g, b));
        assert_eq!(a, 255);
    }

    #[test]
    fn test_offscreen_commands_are_culled() {
        let cmd = DrawCommand {
            fill: Some(RED),
            ..command(rect_path(100.0, 100.0, 200.0, 200.0))
        };
        let raster = rasterize(&[cmd], (10, 10), BLACK).unwrap();
        assert!(raster.pixels().chunks(4).all(|p| p == [0, 0, 0, 255]));
    }

    #[test]
    fn test_image_is_stretched_over_rect() {
        let bitmap = image::RgbaImage::from_pixel(2, 2, image::Rgba([0, 0, 255, 255]));
        let mut png = Vec::new();
        bitmap
            .write_to(&mut std::io::Cursor::new(&mut png), image::ImageFormat::Png)
            .unwrap();
        let data_uri = format!("data:image/png;base64,{}", STANDARD.encode(&png));

        let cmd = command(Primitive::Image {
            rect: Rect::new(2.0, 2.0, 8.0, 8.0),
            data_uri,
        });
        let raster = rasterize(&[cmd], (10, 10), BLACK).unwrap();
        assert_eq!(raster.pixel(5, 5), Some([0, 0, 255, 255]));
        assert_eq!(raster.pixel(9, 9), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_bad_image_is_skipped() {
        let cmd = command(Primitive::Image {
            rect: Rect::new(0.0, 0.0, 10.0, 10.0),
            data_uri: "data:image/png;base64,AAAA".to_string(),
        });
        let raster = rasterize(&[cmd], (10, 10), BLACK).unwrap();
        assert_eq!(raster.pixel(5, 5), Some([0, 0, 0, 255]));
    }

    #[test]
    fn test_decode_data_uri() {
        assert_eq!(decode_data_uri("data:text/plain;base64,aGk="), Some(b"hi".to_vec()));
        assert!(decode_data_uri("data:text/plain,hi").is_none());
        assert!(decode_data_uri("nope").is_none());
    }
}
