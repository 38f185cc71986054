//! Raster export: frame, rasterize, encode.

use crate::error::AppResult;
use freehand_core::geometry::collection_bounds;
use freehand_core::{Camera, Canvas};
use freehand_render::{DisplayListRenderer, RenderContext, Renderer, rasterize};
use kurbo::{Rect, Size};

/// Encode RGBA pixel data to PNG bytes.
pub fn encode_png(rgba_data: &[u8], width: u32, height: u32) -> AppResult<Vec<u8>> {
    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, width, height);
        encoder.set_color(png::ColorType::Rgba);
        encoder.set_depth(png::BitDepth::Eight);

        let mut writer = encoder.write_header()?;
        writer.write_image_data(rgba_data)?;
    }
    Ok(png_data)
}

/// World rectangle covering every element plus `padding` on each side.
///
/// An empty canvas exports a `2 * padding` square at the origin.
pub fn content_frame(canvas: &Canvas, padding: f64) -> Rect {
    let padding = padding.max(0.0);
    collection_bounds(canvas.store.elements())
        .unwrap_or(Rect::ZERO)
        .inflate(padding, padding)
}

fn render(canvas: &Canvas, camera: Camera, (width, height): (u32, u32)) -> AppResult<Vec<u8>> {
    let size = Size::new(f64::from(width), f64::from(height));
    let ctx = RenderContext::from_canvas(canvas, size)
        .with_camera(camera)
        .with_selection(&[]);
    let mut renderer = DisplayListRenderer::new();
    renderer.build_scene(&ctx);

    let raster = rasterize(renderer.commands(), (width, height), renderer.background_color(&ctx))?;
    let png = encode_png(raster.pixels(), width, height)?;
    log::info!("Rendered {}x{} PNG ({} bytes)", width, height, png.len());
    Ok(png)
}

/// PNG of the visible viewport, as the user currently sees it.
pub fn render_viewport_png(canvas: &Canvas, viewport: (u32, u32)) -> AppResult<Vec<u8>> {
    render(canvas, canvas.camera, viewport)
}

/// PNG of all content at 100% zoom, framed with `padding`.
pub fn render_content_png(canvas: &Canvas, padding: f64) -> AppResult<Vec<u8>> {
    let frame = content_frame(canvas, padding);
    let width = (frame.width().ceil() as u32).max(1);
    let height = (frame.height().ceil() as u32).max(1);
    let camera = Camera {
        pan: -frame.origin().to_vec2(),
        zoom: 1.0,
    };
    render(canvas, camera, (width, height))
}

#[cfg(test)]
mod tests {
    use super::*;
    use freehand_core::element::{Element, ElementKind, ElementPatch, FillStyle};
    use kurbo::Point;

    fn decode(png_bytes: &[u8]) -> (png::OutputInfo, Vec<u8>) {
        let decoder = png::Decoder::new(png_bytes);
        let mut reader = decoder.read_info().unwrap();
        let mut buf = vec![0; reader.output_buffer_size()];
        let info = reader.next_frame(&mut buf).unwrap();
        buf.truncate(info.buffer_size());
        (info, buf)
    }

    fn filled_rect(x: f64, y: f64) -> Element {
        let mut element = Element::create(
            "r",
            ElementKind::Rectangle,
            &ElementPatch::new()
                .with_position(Point::new(x, y))
                .with_size(40.0, 40.0)
                .with_stroke_color("#ff0000")
                .with_fill_color("#ff0000"),
        );
        element.fill_style = FillStyle::Solid;
        element
    }

    #[test]
    fn test_encode_png_header() {
        let png_bytes = encode_png(&[255, 0, 0, 255].repeat(6), 3, 2).unwrap();
        assert_eq!(&png_bytes[..8], b"\x89PNG\r\n\x1a\n");
        let (info, pixels) = decode(&png_bytes);
        assert_eq!((info.width, info.height), (3, 2));
        assert_eq!(&pixels[..4], &[255, 0, 0, 255]);
    }

    #[test]
    fn test_encode_rejects_short_buffer() {
        assert!(encode_png(&[0; 4], 2, 2).is_err());
    }

    #[test]
    fn test_content_frame() {
        let canvas = Canvas::with_elements(vec![filled_rect(100.0, 50.0)]);
        assert_eq!(content_frame(&canvas, 10.0), Rect::new(90.0, 40.0, 150.0, 100.0));
        assert_eq!(content_frame(&Canvas::new(), 5.0), Rect::new(-5.0, -5.0, 5.0, 5.0));
    }

    #[test]
    fn test_content_png_frames_elements() {
        let canvas = Canvas::with_elements(vec![filled_rect(100.0, 50.0)]);
        let (info, pixels) = decode(&render_content_png(&canvas, 10.0).unwrap());
        assert_eq!((info.width, info.height), (60, 60));

        let at = |x: usize, y: usize| &pixels[(y * 60 + x) * 4..(y * 60 + x) * 4 + 4];
        assert_eq!(at(30, 30), &[255, 0, 0, 255]);
        assert_eq!(at(2, 2), &[0, 0, 0, 255]);
    }

    #[test]
    fn test_viewport_png_uses_camera_and_background() {
        let mut canvas = Canvas::with_elements(vec![filled_rect(0.0, 0.0)]);
        canvas.set_background("#fff");
        canvas.camera.pan = kurbo::Vec2::new(100.0, 0.0);
        canvas.store.select("r");

        let (info, pixels) = decode(&render_viewport_png(&canvas, (20, 20)).unwrap());
        assert_eq!((info.width, info.height), (20, 20));
        // The element is panned out of view and the overlay is not exported.
        assert!(pixels.chunks(4).all(|p| p == [255, 255, 255, 255]));
    }
}
