//! Inline text editing and text measurement.

use crate::element::{ElementId, TextContent};
use kurbo::{Point, Size};

/// Minimum width of a committed text element.
pub const MIN_TEXT_WIDTH: f64 = 40.0;

/// Font metrics provider, supplied by the host.
pub trait TextMeasure {
    /// Advance width of `text` at `font_size` in `font_family`.
    fn measure(&self, text: &str, font_size: f64, font_family: &str) -> f64;
}

/// Fixed per-character advance, for hosts without a font system.
#[derive(Debug, Clone, Copy)]
pub struct ApproximateMeasure {
    /// Advance of one character as a fraction of the font size.
    pub advance: f64,
}

impl Default for ApproximateMeasure {
    fn default() -> Self {
        Self { advance: 0.6 }
    }
}

impl TextMeasure for ApproximateMeasure {
    fn measure(&self, text: &str, font_size: f64, _font_family: &str) -> f64 {
        text.chars().count() as f64 * font_size * self.advance
    }
}

/// Box of a text element holding `text` with the given style.
pub fn text_size(text: &str, content: &TextContent, measure: &dyn TextMeasure) -> Size {
    let width = if text.is_empty() {
        MIN_TEXT_WIDTH
    } else {
        measure
            .measure(text, content.font_size, &content.font_family)
            .max(MIN_TEXT_WIDTH)
    };
    Size::new(width, content.font_size)
}

/// State of the inline text input while it has focus.
#[derive(Debug, Clone, PartialEq)]
pub struct TextEditor {
    /// Element receiving the text.
    pub element_id: ElementId,
    /// Where the input is shown, in screen pixels.
    pub screen_position: Point,
    /// Current input value.
    pub value: String,
}

impl TextEditor {
    pub fn new(element_id: ElementId, screen_position: Point) -> Self {
        Self {
            element_id,
            screen_position,
            value: String::new(),
        }
    }

    pub fn set_value(&mut self, value: impl Into<String>) {
        self.value = value.into();
    }

    pub fn push_str(&mut self, text: &str) {
        self.value.push_str(text);
    }

    pub fn backspace(&mut self) {
        self.value.pop();
    }
}
