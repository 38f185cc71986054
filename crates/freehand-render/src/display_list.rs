//! Backend-agnostic display list renderer.
//!
//! [`DisplayListRenderer`] turns a [`RenderContext`] into an ordered list of
//! [`DrawCommand`]s. Backends replay the list; the software rasterizer in
//! [`crate::raster`] is one of them.

use crate::color::parse_color_or;
use crate::outline::{element_path, element_transform, is_closed};
use crate::renderer::{ElementPainter, RenderContext, Renderer};
use crate::stroke::{SimpleOutliner, StrokeOutliner};
use freehand_core::element::{Element, ElementId, ElementKind, FillStyle, TextAlign};
use freehand_core::geometry::collection_bounds;
use freehand_core::selection::{Handle, handle_position};
use kurbo::{Affine, BezPath, Circle, Line, Point, Rect, Shape, Vec2};
use peniko::Color;

/// On-screen side of a corner handle, in pixels.
pub const HANDLE_DRAW_SIZE: f64 = 16.0;
/// Stroke width of the text box outline, in world units.
pub const TEXT_BOX_STROKE_WIDTH: f64 = 1.0;
/// Text baseline position as a fraction of the box height.
pub const TEXT_BASELINE_RATIO: f64 = 0.8;

const FALLBACK_STROKE: Color = Color::from_rgba8(0, 0, 0, 255);
const PLACEHOLDER_FILL: Color = Color::from_rgba8(200, 200, 200, 255);
const PLACEHOLDER_CROSS: Color = Color::from_rgba8(150, 150, 150, 255);
const PLACEHOLDER_BORDER: Color = Color::from_rgba8(100, 100, 100, 255);
const PLACEHOLDER_STROKE_WIDTH: f64 = 2.0;

/// What a draw command paints.
#[derive(Debug, Clone, PartialEq)]
pub enum Primitive {
    /// Vector path, stroked and/or filled.
    Path(BezPath),
    /// A run of text starting at `origin` on its baseline.
    Text {
        text: String,
        origin: Point,
        font_size: f64,
        font_family: String,
        align: TextAlign,
    },
    /// A bitmap stretched over `rect`.
    Image { rect: Rect, data_uri: String },
}

/// One ordered drawing operation.
#[derive(Debug, Clone, PartialEq)]
pub struct DrawCommand {
    pub primitive: Primitive,
    /// Local to screen transform (element rotation then view).
    pub transform: Affine,
    pub stroke: Option<Color>,
    pub fill: Option<Color>,
    pub fill_style: FillStyle,
    /// Stroke width in local units.
    pub width: f64,
    pub opacity: f64,
    /// Element the command belongs to; `None` for overlay.
    pub element_id: Option<ElementId>,
}

impl DrawCommand {
    fn path(path: BezPath, transform: Affine) -> Self {
        Self {
            primitive: Primitive::Path(path),
            transform,
            stroke: None,
            fill: None,
            fill_style: FillStyle::Solid,
            width: 1.0,
            opacity: 1.0,
            element_id: None,
        }
    }

    fn stroked(mut self, color: Color, width: f64) -> Self {
        self.stroke = Some(color);
        self.width = width;
        self
    }

    fn filled(mut self, color: Color) -> Self {
        self.fill = Some(color);
        self
    }

    fn for_element(mut self, element: &Element) -> Self {
        self.opacity = element.opacity;
        self.element_id = Some(element.id.clone());
        self
    }
}

/// Builds a display list per frame.
pub struct DisplayListRenderer {
    commands: Vec<DrawCommand>,
    view: Affine,
    zoom: f64,
    outliner: Box<dyn StrokeOutliner>,
}

impl Default for DisplayListRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl DisplayListRenderer {
    pub fn new() -> Self {
        Self::with_outliner(Box::new(SimpleOutliner))
    }

    /// Use a different freehand stroke backend for pencil elements.
    pub fn with_outliner(outliner: Box<dyn StrokeOutliner>) -> Self {
        Self {
            commands: Vec::new(),
            view: Affine::IDENTITY,
            zoom: 1.0,
            outliner,
        }
    }

    /// Commands of the last built frame.
    pub fn commands(&self) -> &[DrawCommand] {
        &self.commands
    }

    pub fn take_commands(&mut self) -> Vec<DrawCommand> {
        std::mem::take(&mut self.commands)
    }

    /// Set the world to screen transform used by [`ElementPainter::draw`].
    pub fn set_view(&mut self, view: Affine, zoom: f64) {
        self.view = view;
        self.zoom = zoom;
    }

    fn draw_shape(&mut self, element: &Element, transform: Affine) {
        let Some(path) = element_path(element, self.outliner.as_ref()) else {
            return;
        };
        let stroke = parse_color_or(&element.stroke_color, FALLBACK_STROKE);

        let mut command = DrawCommand::path(path, transform).for_element(element);
        if let ElementKind::Pencil { .. } = element.kind {
            // The outline polygon is filled with the stroke color.
            command = command.filled(stroke);
        } else {
            command = command.stroked(stroke, element.stroke_width);
            if is_closed(element) && element.fill_style != FillStyle::None {
                command = command.filled(parse_color_or(&element.fill_color, Color::TRANSPARENT));
                command.fill_style = element.fill_style;
            }
        }
        self.commands.push(command);
    }

    fn draw_text(&mut self, element: &Element, transform: Affine) {
        let Some(content) = element.text() else {
            return;
        };
        if content.text.is_empty() {
            return;
        }
        let stroke = parse_color_or(&element.stroke_color, FALLBACK_STROKE);

        let bounds = element.bounds();
        if bounds.width() > 0.0 && bounds.height() > 0.0 {
            let fill = parse_color_or(&element.fill_color, Color::TRANSPARENT);
            self.commands.push(
                DrawCommand::path(bounds.to_path(0.1), transform)
                    .stroked(stroke, TEXT_BOX_STROKE_WIDTH)
                    .filled(fill)
                    .for_element(element),
            );
        }

        let baseline = if element.height != 0.0 {
            element.height * TEXT_BASELINE_RATIO
        } else {
            content.font_size
        };
        self.commands.push(DrawCommand {
            primitive: Primitive::Text {
                text: content.text.clone(),
                origin: Point::new(element.x, element.y + baseline),
                font_size: content.font_size,
                font_family: content.font_family.clone(),
                align: content.text_align,
            },
            fill: Some(stroke),
            ..DrawCommand::path(BezPath::new(), transform).for_element(element)
        });
    }

    fn draw_image(&mut self, element: &Element, image: Option<&str>, transform: Affine) {
        let rect = element.bounds();
        match image {
            Some(data_uri) => self.commands.push(DrawCommand {
                primitive: Primitive::Image {
                    rect,
                    data_uri: data_uri.to_string(),
                },
                ..DrawCommand::path(BezPath::new(), transform).for_element(element)
            }),
            None => {
                // Gray box with a cross until the user picks a file.
                let outline = rect.to_path(0.1);
                let mut cross = BezPath::new();
                cross.move_to(Point::new(rect.x0, rect.y0));
                cross.line_to(Point::new(rect.x1, rect.y1));
                cross.move_to(Point::new(rect.x1, rect.y0));
                cross.line_to(Point::new(rect.x0, rect.y1));

                self.commands.push(
                    DrawCommand::path(outline.clone(), transform)
                        .filled(PLACEHOLDER_FILL)
                        .for_element(element),
                );
                self.commands.push(
                    DrawCommand::path(cross, transform)
                        .stroked(PLACEHOLDER_CROSS, PLACEHOLDER_STROKE_WIDTH)
                        .for_element(element),
                );
                self.commands.push(
                    DrawCommand::path(outline, transform)
                        .stroked(PLACEHOLDER_BORDER, PLACEHOLDER_STROKE_WIDTH)
                        .for_element(element),
                );
            }
        }
    }

    fn draw_selection_overlay(&mut self, ctx: &RenderContext) {
        let selected: Vec<Element> = ctx
            .elements
            .iter()
            .filter(|e| ctx.is_selected(&e.id))
            .cloned()
            .collect();
        let line_width = 1.0 / self.zoom;
        let color = ctx.selection_color;

        for element in &selected {
            let transform = self.view * element_transform(element);
            self.commands
                .push(DrawCommand::path(element.bounds().to_path(0.1), transform).stroked(color, line_width));
        }

        match selected.as_slice() {
            [element] => self.draw_handles(element, color, line_width),
            [] => {}
            _ => {
                if let Some(group) = collection_bounds(&selected) {
                    self.commands
                        .push(DrawCommand::path(group.to_path(0.1), self.view).stroked(color, line_width));
                }
            }
        }
    }

    fn draw_handles(&mut self, element: &Element, color: Color, line_width: f64) {
        let transform = self.view * element_transform(element);
        let side = HANDLE_DRAW_SIZE / self.zoom;

        for handle in Handle::CORNERS {
            let center = handle_position(element, handle, self.zoom);
            let square = Rect::from_center_size(center, (side, side));
            self.commands.push(
                DrawCommand::path(square.to_path(0.1), transform)
                    .filled(Color::WHITE)
                    .stroked(color, line_width),
            );
        }

        let knob = handle_position(element, Handle::Rotate, self.zoom);
        let radius = side / 2.0;
        let top_center = Point::new(element.center().x, element.bounds().y0);
        let connector = Line::new(top_center, knob + Vec2::new(0.0, radius));
        self.commands.push(DrawCommand::path(connector.to_path(0.1), transform).stroked(color, line_width));
        self.commands.push(
            DrawCommand::path(Circle::new(knob, radius).to_path(0.1), transform)
                .filled(Color::WHITE)
                .stroked(color, line_width),
        );
    }
}

impl ElementPainter for DisplayListRenderer {
    fn draw(&mut self, element: &Element) {
        if !element.is_drawable() {
            return;
        }
        let transform = self.view * element_transform(element);
        match &element.kind {
            ElementKind::Text(_) => self.draw_text(element, transform),
            ElementKind::Image { image } => self.draw_image(element, image.as_deref(), transform),
            _ => self.draw_shape(element, transform),
        }
    }
}

impl Renderer for DisplayListRenderer {
    fn build_scene(&mut self, ctx: &RenderContext) {
        self.commands.clear();
        self.set_view(ctx.camera.transform(), ctx.camera.zoom);

        for element in ctx.elements {
            if ctx.editing_element_id == Some(element.id.as_str()) {
                continue;
            }
            self.draw(element);
        }

        self.draw_selection_overlay(ctx);

        if let Some(rect) = ctx.selection_rect {
            let width = 1.0 / self.zoom;
            self.commands.push(
                DrawCommand::path(rect.to_path(0.1), self.view).stroked(crate::renderer::MARQUEE_COLOR, width),
            );
        }
        log::trace!("Built display list with {} commands", self.commands.len());
    }
}
