//! Canvas: the document, its view and the active tool.

use crate::camera::Camera;
use crate::commands::DEFAULT_BACKGROUND;
use crate::element::Element;
use crate::store::Store;
use crate::tools::ToolManager;

/// Everything a render pass or gesture needs about one whiteboard.
#[derive(Debug, Clone)]
pub struct Canvas {
    /// Elements, history and selection.
    pub store: Store,
    /// View transform.
    pub camera: Camera,
    /// Active tool and style for new elements.
    pub tools: ToolManager,
    /// Canvas background color.
    pub background: String,
}

impl Default for Canvas {
    fn default() -> Self {
        Self::new()
    }
}

impl Canvas {
    pub fn new() -> Self {
        Self {
            store: Store::new(),
            camera: Camera::default(),
            tools: ToolManager::default(),
            background: DEFAULT_BACKGROUND.to_string(),
        }
    }

    /// Canvas seeded with `elements` as its first snapshot.
    pub fn with_elements(elements: Vec<Element>) -> Self {
        Self {
            store: Store::with_elements(elements),
            ..Self::new()
        }
    }

    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = color.into();
    }

    /// Clear the canvas as an undoable step and restore the default background.
    pub fn reset(&mut self) {
        log::info!("Resetting canvas");
        self.store.deselect_all();
        self.store.replace_all(Vec::new());
        self.background = DEFAULT_BACKGROUND.to_string();
    }

    /// Replace the scene with loaded elements as one undoable step.
    pub fn load_elements(&mut self, elements: Vec<Element>) {
        self.store.deselect_all();
        self.store.replace_all(elements);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::element::ElementKind;

    #[test]
    fn test_reset_is_undoable() {
        let mut canvas = Canvas::new();
        canvas.store.add(Element::new("a", ElementKind::Rectangle));
        canvas.store.select("a");
        canvas.set_background("#fff");

        canvas.reset();
        assert!(canvas.store.is_empty());
        assert!(canvas.store.selection().is_empty());
        assert_eq!(canvas.background, "#000");

        assert!(canvas.store.undo());
        assert_eq!(canvas.store.len(), 1);
    }

    #[test]
    fn test_load_elements_replaces_scene() {
        let mut canvas = Canvas::with_elements(vec![Element::new("a", ElementKind::Ellipse)]);
        canvas.load_elements(vec![
            Element::new("b", ElementKind::Rectangle),
            Element::new("c", ElementKind::Diamond),
        ]);
        assert_eq!(canvas.store.len(), 2);
        assert_eq!(canvas.store.history_len(), 2);
    }
}
