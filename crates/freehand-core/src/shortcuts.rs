//! Keyboard shortcut registry.

use crate::input::KeyEvent;
use crate::tools::ToolKind;

/// Effect of a keyboard shortcut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShortcutAction {
    SelectTool(ToolKind),
    Undo,
    Redo,
    DeleteSelection,
    DuplicateSelection,
}

/// A keyboard shortcut definition.
#[derive(Debug, Clone, Copy)]
pub struct Shortcut {
    /// Lower-case key name.
    pub key: &'static str,
    /// Requires Ctrl (or Cmd).
    pub ctrl: bool,
    pub shift: bool,
    pub action: ShortcutAction,
    pub description: &'static str,
}

impl Shortcut {
    pub const fn new(
        key: &'static str,
        ctrl: bool,
        shift: bool,
        action: ShortcutAction,
        description: &'static str,
    ) -> Self {
        Self {
            key,
            ctrl,
            shift,
            action,
            description,
        }
    }

    /// Format the shortcut for display (e.g., "Ctrl+Shift+Z").
    pub fn format(&self) -> String {
        let mut parts = Vec::new();
        if self.ctrl {
            parts.push("Ctrl".to_string());
        }
        if self.shift {
            parts.push("Shift".to_string());
        }
        let mut chars = self.key.chars();
        let key = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect(),
            None => String::new(),
        };
        parts.push(key);
        parts.join("+")
    }

    fn matches(&self, key: &str, event: &KeyEvent) -> bool {
        self.key == key
            && self.ctrl == event.modifiers.action()
            && (!self.ctrl || self.shift == event.modifiers.shift)
    }
}

use ShortcutAction::*;

/// Every shortcut, in display order.
pub const SHORTCUTS: &[Shortcut] = &[
    Shortcut::new("1", false, false, SelectTool(ToolKind::Selection), "Selection tool"),
    Shortcut::new("v", false, false, SelectTool(ToolKind::Selection), "Selection tool"),
    Shortcut::new("2", false, false, SelectTool(ToolKind::Rectangle), "Rectangle"),
    Shortcut::new("r", false, false, SelectTool(ToolKind::Rectangle), "Rectangle"),
    Shortcut::new("3", false, false, SelectTool(ToolKind::Diamond), "Diamond"),
    Shortcut::new("d", false, false, SelectTool(ToolKind::Diamond), "Diamond"),
    Shortcut::new("4", false, false, SelectTool(ToolKind::Ellipse), "Ellipse"),
    Shortcut::new("e", false, false, SelectTool(ToolKind::Ellipse), "Ellipse"),
    Shortcut::new("5", false, false, SelectTool(ToolKind::Arrow), "Arrow"),
    Shortcut::new("a", false, false, SelectTool(ToolKind::Arrow), "Arrow"),
    Shortcut::new("6", false, false, SelectTool(ToolKind::Line), "Line"),
    Shortcut::new("l", false, false, SelectTool(ToolKind::Line), "Line"),
    Shortcut::new("7", false, false, SelectTool(ToolKind::Pencil), "Pencil"),
    Shortcut::new("p", false, false, SelectTool(ToolKind::Pencil), "Pencil"),
    Shortcut::new("8", false, false, SelectTool(ToolKind::Text), "Text"),
    Shortcut::new("t", false, false, SelectTool(ToolKind::Text), "Text"),
    Shortcut::new("9", false, false, SelectTool(ToolKind::Image), "Image"),
    Shortcut::new("i", false, false, SelectTool(ToolKind::Image), "Image"),
    Shortcut::new("z", true, false, Undo, "Undo"),
    Shortcut::new("z", true, true, Redo, "Redo"),
    Shortcut::new("y", true, false, Redo, "Redo"),
    Shortcut::new("delete", false, false, DeleteSelection, "Delete selected elements"),
    Shortcut::new("backspace", false, false, DeleteSelection, "Delete selected elements"),
    Shortcut::new("d", true, false, DuplicateSelection, "Duplicate selected elements"),
];

/// Action bound to `event`, if any.
///
/// Plain keys ignore Shift; Ctrl/Cmd bindings require an exact Shift match,
/// except that Shift+Ctrl+Y still redoes.
pub fn resolve(event: &KeyEvent) -> Option<ShortcutAction> {
    let key = event.key.to_lowercase();
    SHORTCUTS
        .iter()
        .find(|shortcut| shortcut.matches(&key, event))
        .or_else(|| {
            (key == "y" && event.modifiers.action())
                .then(|| SHORTCUTS.iter().find(|s| s.key == "y"))
                .flatten()
        })
        .map(|shortcut| shortcut.action)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::Modifiers;

    fn key(key: &str, modifiers: Modifiers) -> Option<ShortcutAction> {
        resolve(&KeyEvent::new(key, modifiers))
    }

    #[test]
    fn test_tool_keys() {
        assert_eq!(key("1", Modifiers::NONE), Some(SelectTool(ToolKind::Selection)));
        assert_eq!(key("R", Modifiers::NONE), Some(SelectTool(ToolKind::Rectangle)));
        assert_eq!(key("9", Modifiers::NONE), Some(SelectTool(ToolKind::Image)));
        assert_eq!(key("p", Modifiers::SHIFT), Some(SelectTool(ToolKind::Pencil)));
    }

    #[test]
    fn test_undo_redo() {
        assert_eq!(key("z", Modifiers::CTRL), Some(Undo));
        assert_eq!(key("z", Modifiers::META), Some(Undo));
        assert_eq!(key("Z", Modifiers::CTRL_SHIFT), Some(Redo));
        assert_eq!(key("y", Modifiers::CTRL), Some(Redo));
        assert_eq!(key("y", Modifiers::CTRL_SHIFT), Some(Redo));
        assert_eq!(key("z", Modifiers::NONE), None);
    }

    #[test]
    fn test_ctrl_d_duplicates_instead_of_diamond() {
        assert_eq!(key("d", Modifiers::CTRL), Some(DuplicateSelection));
        assert_eq!(key("d", Modifiers::NONE), Some(SelectTool(ToolKind::Diamond)));
    }

    #[test]
    fn test_delete_keys() {
        assert_eq!(key("Delete", Modifiers::NONE), Some(DeleteSelection));
        assert_eq!(key("Backspace", Modifiers::NONE), Some(DeleteSelection));
    }

    #[test]
    fn test_format() {
        let redo = SHORTCUTS.iter().find(|s| s.action == Redo).unwrap();
        assert_eq!(redo.format(), "Ctrl+Shift+Z");
        assert_eq!(SHORTCUTS[0].format(), "1");
    }
}
