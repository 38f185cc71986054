//! Renderer trait abstraction.

use crate::color::parse_color_or;
use freehand_core::canvas::Canvas;
use freehand_core::element::{Element, ElementId};
use freehand_core::Camera;
use kurbo::{Rect, Size};
use peniko::Color;
use thiserror::Error;

/// Renderer errors.
#[derive(Debug, Error)]
pub enum RendererError {
    #[error("Render failed: {0}")]
    RenderFailed(String),
    #[error("Invalid surface size {width}x{height}")]
    InvalidSize { width: u32, height: u32 },
}

/// Result type for renderer operations.
pub type RenderResult<T> = Result<T, RendererError>;

/// Outline and handle color of the selection overlay.
pub const SELECTION_COLOR: Color = Color::from_rgba8(138, 43, 226, 255);
/// Outline color of the rubber-band rectangle.
pub const MARQUEE_COLOR: Color = Color::from_rgba8(25, 118, 210, 255);
/// Background used when none is set.
pub const DEFAULT_BACKGROUND_COLOR: Color = Color::from_rgba8(0, 0, 0, 255);

/// Context for a single render frame.
pub struct RenderContext<'a> {
    /// Elements in paint order.
    pub elements: &'a [Element],
    /// View transform.
    pub camera: Camera,
    /// Selected element ids.
    pub selection: &'a [ElementId],
    /// Rubber-band rectangle in world coordinates.
    pub selection_rect: Option<Rect>,
    /// Viewport size in pixels.
    pub viewport_size: Size,
    pub background_color: Color,
    pub selection_color: Color,
    /// Element currently under the text input (skipped in build_scene).
    pub editing_element_id: Option<&'a str>,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(elements: &'a [Element], viewport_size: Size) -> Self {
        Self {
            elements,
            camera: Camera::default(),
            selection: &[],
            selection_rect: None,
            viewport_size,
            background_color: DEFAULT_BACKGROUND_COLOR,
            selection_color: SELECTION_COLOR,
            editing_element_id: None,
        }
    }

    /// Context for the live state of `canvas`.
    pub fn from_canvas(canvas: &'a Canvas, viewport_size: Size) -> Self {
        Self::new(canvas.store.elements(), viewport_size)
            .with_camera(canvas.camera)
            .with_selection(canvas.store.selection())
            .with_background(parse_color_or(&canvas.background, DEFAULT_BACKGROUND_COLOR))
    }

    pub fn with_camera(mut self, camera: Camera) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_selection(mut self, selection: &'a [ElementId]) -> Self {
        self.selection = selection;
        self
    }

    /// Set the selection rectangle.
    pub fn with_selection_rect(mut self, rect: Option<Rect>) -> Self {
        self.selection_rect = rect;
        self
    }

    /// Set the background color.
    pub fn with_background(mut self, color: Color) -> Self {
        self.background_color = color;
        self
    }

    /// Set the element being edited (will be skipped in build_scene).
    pub fn with_editing_element(mut self, id: Option<&'a str>) -> Self {
        self.editing_element_id = id;
        self
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.selection.iter().any(|s| s == id)
    }
}

/// Trait for rendering backends.
pub trait Renderer: Send + Sync {
    /// Build the draw commands for a frame.
    fn build_scene(&mut self, ctx: &RenderContext);

    /// Get the background color (for clearing).
    fn background_color(&self, ctx: &RenderContext) -> Color {
        ctx.background_color
    }
}

/// Draws one element with the painter's current view.
pub trait ElementPainter {
    fn draw(&mut self, element: &Element);
}
