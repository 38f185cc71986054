//! Tool system for the whiteboard.

use crate::element::{ElementPatch, ElementType, FillStyle, TextAlign};
use serde::{Deserialize, Serialize};

/// Available tools.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum ToolKind {
    #[default]
    Selection,
    Rectangle,
    Diamond,
    Ellipse,
    Arrow,
    Line,
    Pencil,
    Text,
    Image,
}

impl ToolKind {
    /// Tools in toolbar order.
    pub const ALL: [ToolKind; 9] = [
        ToolKind::Selection,
        ToolKind::Rectangle,
        ToolKind::Diamond,
        ToolKind::Ellipse,
        ToolKind::Arrow,
        ToolKind::Line,
        ToolKind::Pencil,
        ToolKind::Text,
        ToolKind::Image,
    ];

    /// Kind of element this tool creates, if any.
    pub fn element_type(self) -> Option<ElementType> {
        match self {
            ToolKind::Selection => None,
            ToolKind::Rectangle => Some(ElementType::Rectangle),
            ToolKind::Diamond => Some(ElementType::Diamond),
            ToolKind::Ellipse => Some(ElementType::Ellipse),
            ToolKind::Arrow => Some(ElementType::Arrow),
            ToolKind::Line => Some(ElementType::Line),
            ToolKind::Pencil => Some(ElementType::Pencil),
            ToolKind::Text => Some(ElementType::Text),
            ToolKind::Image => Some(ElementType::Image),
        }
    }

    /// Display name.
    pub fn name(self) -> &'static str {
        match self {
            ToolKind::Selection => "Selection",
            ToolKind::Rectangle => "Rectangle",
            ToolKind::Diamond => "Diamond",
            ToolKind::Ellipse => "Ellipse",
            ToolKind::Arrow => "Arrow",
            ToolKind::Line => "Line",
            ToolKind::Pencil => "Pencil",
            ToolKind::Text => "Text",
            ToolKind::Image => "Image",
        }
    }
}

fn default_stroke_color() -> String {
    "#ffffff".to_string()
}

fn default_fill_color() -> String {
    "transparent".to_string()
}

fn default_stroke_width() -> f64 {
    2.0
}

fn default_roughness() -> f64 {
    1.0
}

fn default_opacity() -> f64 {
    1.0
}

fn default_font_size() -> f64 {
    20.0
}

fn default_font_family() -> String {
    "sans-serif".to_string()
}

/// Style applied to newly created elements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolSettings {
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
    #[serde(default = "default_font_size")]
    pub font_size: f64,
    #[serde(default = "default_font_family")]
    pub font_family: String,
    #[serde(default)]
    pub text_align: TextAlign,
}

impl Default for ToolSettings {
    fn default() -> Self {
        Self {
            stroke_color: default_stroke_color(),
            fill_color: default_fill_color(),
            stroke_width: default_stroke_width(),
            roughness: default_roughness(),
            opacity: default_opacity(),
            fill_style: FillStyle::None,
            font_size: default_font_size(),
            font_family: default_font_family(),
            text_align: TextAlign::Left,
        }
    }
}

impl ToolSettings {
    /// Overrides for a new element.
    pub fn style_patch(&self) -> ElementPatch {
        ElementPatch {
            stroke_color: Some(self.stroke_color.clone()),
            fill_color: Some(self.fill_color.clone()),
            stroke_width: Some(self.stroke_width),
            roughness: Some(self.roughness),
            opacity: Some(self.opacity),
            fill_style: Some(self.fill_style),
            font_size: Some(self.font_size),
            font_family: Some(self.font_family.clone()),
            text_align: Some(self.text_align),
            ..ElementPatch::default()
        }
    }

    /// Take the style fields set in `patch`; geometry and content are ignored.
    pub fn apply(&mut self, patch: &ElementPatch) {
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
        if let Some(size) = patch.font_size {
            self.font_size = size;
        }
        if let Some(family) = &patch.font_family {
            self.font_family = family.clone();
        }
        if let Some(align) = patch.text_align {
            self.text_align = align;
        }
    }
}

/// Manages the current tool and its options.
#[derive(Debug, Clone, Default)]
pub struct ToolManager {
    /// Currently selected tool.
    pub current_tool: ToolKind,
    /// Keep the drawing tool active after each shape instead of returning to selection.
    pub locked: bool,
    /// Style for new elements.
    pub settings: ToolSettings,
}

impl ToolManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_tool(&mut self, tool: ToolKind) {
        if self.current_tool != tool {
            log::debug!("Tool changed to {}", tool.name());
        }
        self.current_tool = tool;
    }

    pub fn toggle_lock(&mut self) {
        self.locked = !self.locked;
    }

    /// Called after a creation gesture completes.
    pub fn finish_creation(&mut self) {
        if !self.locked {
            self.set_tool(ToolKind::Selection);
        }
    }
}
