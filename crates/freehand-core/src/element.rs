//! Element model: the shapes, text and images that make up a scene.

use kurbo::{Point, Rect, Vec2};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for an element.
pub type ElementId = String;

/// Generate a fresh, collection-unique element id.
pub fn new_element_id() -> ElementId {
    Uuid::new_v4().to_string()
}

pub const DEFAULT_STROKE_COLOR: &str = "#000000";
pub const DEFAULT_FILL_COLOR: &str = "transparent";
pub const DEFAULT_STROKE_WIDTH: f64 = 2.0;
pub const DEFAULT_ROUGHNESS: f64 = 1.0;
pub const DEFAULT_OPACITY: f64 = 1.0;
pub const DEFAULT_FONT_SIZE: f64 = 20.0;
pub const DEFAULT_FONT_FAMILY: &str = "sans-serif";

fn default_stroke_color() -> String {
    DEFAULT_STROKE_COLOR.to_string()
}

fn default_fill_color() -> String {
    DEFAULT_FILL_COLOR.to_string()
}

fn default_stroke_width() -> f64 {
    DEFAULT_STROKE_WIDTH
}

fn default_roughness() -> f64 {
    DEFAULT_ROUGHNESS
}

fn default_opacity() -> f64 {
    DEFAULT_OPACITY
}

fn default_font_size() -> f64 {
    DEFAULT_FONT_SIZE
}

fn default_font_family() -> String {
    DEFAULT_FONT_FAMILY.to_string()
}

/// Fill style for closed shapes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStyle {
    /// Outline only.
    #[default]
    None,
    /// Sketchy parallel lines.
    Hachure,
    /// Solid fill color.
    Solid,
}

/// Horizontal alignment of text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    #[default]
    Left,
    Center,
    Right,
}

/// Discriminant of an element kind, without payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ElementType {
    Rectangle,
    Ellipse,
    Diamond,
    Line,
    Arrow,
    Pencil,
    Text,
    Image,
}

impl ElementType {
    /// Name used in the serialized format.
    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Rectangle => "rectangle",
            ElementType::Ellipse => "ellipse",
            ElementType::Diamond => "diamond",
            ElementType::Line => "line",
            ElementType::Arrow => "arrow",
            ElementType::Pencil => "pencil",
            ElementType::Text => "text",
            ElementType::Image => "image",
        }
    }
}

/// Text payload of a text element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    #[serde(default)]
    pub text: String,
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl Default for TextContent {
    fn default() -> Self {
        Self {
            text: String::new(),
            font_size: DEFAULT_FONT_SIZE,
            font_family: DEFAULT_FONT_FAMILY.to_string(),
            text_align: TextAlign::Left,
        }
    }
}

/// Kind-specific part of an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum ElementKind {
    Rectangle,
    Ellipse,
    Diamond,
    Line,
    Arrow,
    Pencil {
        /// World-space samples in drawing order.
        #[serde(default, with = "point_pairs")]
        points: Vec<Point>,
    },
    Text(TextContent),
    Image {
        /// Data URI of the image, or `None` while the file is still pending.
        #[serde(default, with = "image_payload")]
        image: Option<String>,
    },
}

impl ElementKind {
    /// Payload-less discriminant.
    pub fn element_type(&self) -> ElementType {
        match self {
            ElementKind::Rectangle => ElementType::Rectangle,
            ElementKind::Ellipse => ElementType::Ellipse,
            ElementKind::Diamond => ElementType::Diamond,
            ElementKind::Line => ElementType::Line,
            ElementKind::Arrow => ElementType::Arrow,
            ElementKind::Pencil { .. } => ElementType::Pencil,
            ElementKind::Text(_) => ElementType::Text,
            ElementKind::Image { .. } => ElementType::Image,
        }
    }
}

impl From<ElementType> for ElementKind {
    fn from(element_type: ElementType) -> Self {
        match element_type {
            ElementType::Rectangle => ElementKind::Rectangle,
            ElementType::Ellipse => ElementKind::Ellipse,
            ElementType::Diamond => ElementKind::Diamond,
            ElementType::Line => ElementKind::Line,
            ElementType::Arrow => ElementKind::Arrow,
            ElementType::Pencil => ElementKind::Pencil { points: Vec::new() },
            ElementType::Text => ElementKind::Text(TextContent::default()),
            ElementType::Image => ElementKind::Image { image: None },
        }
    }
}

/// A single entity on the canvas.
///
/// `(x, y)` is the top-left corner of the unrotated box; `angle` is applied
/// about the box center at render and hit-test time only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Element {
    pub id: ElementId,
    #[serde(flatten)]
    pub kind: ElementKind,
    #[serde(default)]
    pub x: f64,
    #[serde(default)]
    pub y: f64,
    #[serde(default)]
    pub width: f64,
    #[serde(default)]
    pub height: f64,
    /// Rotation in radians about the box center.
    #[serde(default)]
    pub angle: f64,
    #[serde(default = "default_stroke_color")]
    pub stroke_color: String,
    #[serde(default = "default_fill_color")]
    pub fill_color: String,
    #[serde(default = "default_stroke_width")]
    pub stroke_width: f64,
    #[serde(default = "default_roughness")]
    pub roughness: f64,
    #[serde(default = "default_opacity")]
    pub opacity: f64,
    #[serde(default)]
    pub fill_style: FillStyle,
}

impl Element {
    /// Create an element with default style at the origin.
    pub fn new(id: impl Into<ElementId>, kind: ElementKind) -> Self {
        Self {
            id: id.into(),
            kind,
            x: 0.0,
            y: 0.0,
            width: 0.0,
            height: 0.0,
            angle: 0.0,
            stroke_color: default_stroke_color(),
            fill_color: default_fill_color(),
            stroke_width: DEFAULT_STROKE_WIDTH,
            roughness: DEFAULT_ROUGHNESS,
            opacity: DEFAULT_OPACITY,
            fill_style: FillStyle::None,
        }
    }

    /// Create an element with defaults merged with `overrides`.
    pub fn create(id: impl Into<ElementId>, kind: ElementKind, overrides: &ElementPatch) -> Self {
        let mut element = Self::new(id, kind);
        element.apply(overrides);
        element
    }

    pub fn element_type(&self) -> ElementType {
        self.kind.element_type()
    }

    /// Axis-aligned, normalized bounding box of the unrotated element.
    pub fn bounds(&self) -> Rect {
        Rect::new(self.x, self.y, self.x + self.width, self.y + self.height).abs()
    }

    /// Rotation center.
    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    /// Pencil samples; empty for every other kind.
    pub fn points(&self) -> &[Point] {
        match &self.kind {
            ElementKind::Pencil { points } => points,
            _ => &[],
        }
    }

    pub fn text(&self) -> Option<&TextContent> {
        match &self.kind {
            ElementKind::Text(content) => Some(content),
            _ => None,
        }
    }

    /// Whether the element has anything to render or hit.
    pub fn is_drawable(&self) -> bool {
        match &self.kind {
            ElementKind::Pencil { points } => !points.is_empty(),
            _ => true,
        }
    }

    /// Translate the element, including any pencil samples.
    pub fn translate(&mut self, delta: Vec2) {
        self.x += delta.x;
        self.y += delta.y;
        if let ElementKind::Pencil { points } = &mut self.kind {
            for point in points.iter_mut() {
                *point += delta;
            }
        }
    }

    /// Move the element so its origin lands on `origin`.
    pub fn set_origin(&mut self, origin: Point) {
        self.translate(origin - self.origin());
    }

    /// Append a pencil sample and refit the box. Ignored for other kinds.
    pub fn push_point(&mut self, point: Point) {
        if let ElementKind::Pencil { points } = &mut self.kind {
            points.push(point);
            self.fit_to_points();
        }
    }

    /// Set the box to the bounding box of the pencil samples.
    pub fn fit_to_points(&mut self) {
        let Some(first) = self.points().first().copied() else {
            return;
        };
        let bounds = self
            .points()
            .iter()
            .fold(Rect::from_points(first, first), |acc, p| acc.union_pt(*p));
        self.x = bounds.x0;
        self.y = bounds.y0;
        self.width = bounds.width();
        self.height = bounds.height();
    }

    /// Clone with a new id, shifted by `offset`.
    pub fn duplicate(&self, id: impl Into<ElementId>, offset: Vec2) -> Self {
        let mut copy = self.clone();
        copy.id = id.into();
        copy.translate(offset);
        copy
    }

    /// Shallow-merge `patch` into this element.
    ///
    /// Kind-specific fields only apply to elements of the matching kind.
    pub fn apply(&mut self, patch: &ElementPatch) {
        if let Some(x) = patch.x {
            self.x = x;
        }
        if let Some(y) = patch.y {
            self.y = y;
        }
        if let Some(width) = patch.width {
            self.width = width;
        }
        if let Some(height) = patch.height {
            self.height = height;
        }
        if let Some(angle) = patch.angle {
            self.angle = angle;
        }
        if let Some(color) = &patch.stroke_color {
            self.stroke_color = color.clone();
        }
        if let Some(color) = &patch.fill_color {
            self.fill_color = color.clone();
        }
        if let Some(width) = patch.stroke_width {
            self.stroke_width = width;
        }
        if let Some(roughness) = patch.roughness {
            self.roughness = roughness;
        }
        if let Some(opacity) = patch.opacity {
            self.opacity = opacity;
        }
        if let Some(fill_style) = patch.fill_style {
            self.fill_style = fill_style;
        }

        match &mut self.kind {
            ElementKind::Pencil { points } => {
                if let Some(new_points) = &patch.points {
                    *points = new_points.clone();
                }
            }
            ElementKind::Text(content) => {
                if let Some(text) = &patch.text {
                    content.text = text.clone();
                }
                if let Some(size) = patch.font_size {
                    content.font_size = size;
                }
                if let Some(family) = &patch.font_family {
                    content.font_family = family.clone();
                }
                if let Some(align) = patch.text_align {
                    content.text_align = align;
                }
            }
            ElementKind::Image { image } => {
                if let Some(data) = &patch.image {
                    *image = Some(data.clone());
                }
            }
            _ => {}
        }
    }
}

/// Partial element update. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ElementPatch {
    pub x: Option<f64>,
    pub y: Option<f64>,
    pub width: Option<f64>,
    pub height: Option<f64>,
    pub angle: Option<f64>,
    pub stroke_color: Option<String>,
    pub fill_color: Option<String>,
    pub stroke_width: Option<f64>,
    pub roughness: Option<f64>,
    pub opacity: Option<f64>,
    pub fill_style: Option<FillStyle>,
    pub points: Option<Vec<Point>>,
    pub text: Option<String>,
    pub font_size: Option<f64>,
    pub font_family: Option<String>,
    pub text_align: Option<TextAlign>,
    pub image: Option<String>,
}

impl ElementPatch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_position(mut self, point: Point) -> Self {
        self.x = Some(point.x);
        self.y = Some(point.y);
        self
    }

    pub fn with_size(mut self, width: f64, height: f64) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn with_angle(mut self, angle: f64) -> Self {
        self.angle = Some(angle);
        self
    }

    pub fn with_points(mut self, points: Vec<Point>) -> Self {
        self.points = Some(points);
        self
    }

    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.text = Some(text.into());
        self
    }

    pub fn with_image(mut self, data: impl Into<String>) -> Self {
        self.image = Some(data.into());
        self
    }

    pub fn with_stroke_color(mut self, color: impl Into<String>) -> Self {
        self.stroke_color = Some(color.into());
        self
    }

    pub fn with_fill_color(mut self, color: impl Into<String>) -> Self {
        self.fill_color = Some(color.into());
        self
    }

    pub fn with_opacity(mut self, opacity: f64) -> Self {
        self.opacity = Some(opacity);
        self
    }

    /// Overlay `other` on top of this patch; fields set in `other` win.
    pub fn merge(mut self, other: &ElementPatch) -> Self {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if other.$field.is_some() {
                    self.$field = other.$field.clone();
                })*
            };
        }
        take!(
            x, y, width, height, angle, stroke_color, fill_color, stroke_width, roughness,
            opacity, fill_style, points, text, font_size, font_family, text_align, image
        );
        self
    }
}

/// Return a copy of `collection` with element `id` merged with `patch`.
///
/// Order is preserved; an unknown id yields an equal collection.
pub fn patch(collection: &[Element], id: &str, patch: &ElementPatch) -> Vec<Element> {
    collection
        .iter()
        .map(|element| {
            if element.id == id {
                let mut updated = element.clone();
                updated.apply(patch);
                updated
            } else {
                element.clone()
            }
        })
        .collect()
}

/// Pencil points are stored as `[x, y]` pairs.
mod point_pairs {
    use kurbo::Point;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(points: &[Point], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(points.iter().map(|p| [p.x, p.y]))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<Point>, D::Error> {
        let pairs = Vec::<[f64; 2]>::deserialize(deserializer)?;
        Ok(pairs.into_iter().map(|[x, y]| Point::new(x, y)).collect())
    }
}

/// A pending image is stored as an empty string.
mod image_payload {
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(image: &Option<String>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(image.as_deref().unwrap_or(""))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
        let raw = Option::<String>::deserialize(deserializer)?;
        Ok(raw.filter(|data| !data.is_empty()))
    }
}
