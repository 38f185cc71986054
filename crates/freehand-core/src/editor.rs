//! Editor: one canvas plus the input plumbing around it.

use crate::canvas::Canvas;
use crate::element::{DEFAULT_FILL_COLOR, ElementId, ElementPatch, FillStyle};
use crate::input::{KeyEvent, PointerEvent, WheelEvent};
use crate::interaction::{Effect, InteractionSession, InteractionState, resolve_image};
use crate::shortcuts::{self, ShortcutAction};
use crate::text::{ApproximateMeasure, TextMeasure};

/// Fill color picked when a fill style is chosen while the fill is transparent.
pub const DEFAULT_STYLED_FILL: &str = "#f28b82";

/// Application context for a single whiteboard.
///
/// Owns the canvas, the gesture session and the font metrics used to size
/// text. Hosts feed it raw input and act on the returned [`Effect`]s.
pub struct Editor {
    pub canvas: Canvas,
    session: InteractionSession,
    measure: Box<dyn TextMeasure>,
}

impl Default for Editor {
    fn default() -> Self {
        Self::new(Canvas::new())
    }
}

impl Editor {
    pub fn new(canvas: Canvas) -> Self {
        Self::with_measure(canvas, Box::new(ApproximateMeasure::default()))
    }

    pub fn with_measure(canvas: Canvas, measure: Box<dyn TextMeasure>) -> Self {
        Self {
            canvas,
            session: InteractionSession::new(),
            measure,
        }
    }

    pub fn session(&self) -> &InteractionSession {
        &self.session
    }

    pub fn state(&self) -> InteractionState {
        self.session.state()
    }

    /// Handle a pointer event. A press first commits any open text input.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> Option<Effect> {
        if matches!(event, PointerEvent::Down { .. }) && self.session.is_editing_text() {
            self.session.commit_text(&mut self.canvas, self.measure.as_ref());
        }
        self.session.handle_pointer(&mut self.canvas, event)
    }

    pub fn handle_wheel(&mut self, event: &WheelEvent) {
        self.canvas.camera.apply_wheel(event);
    }

    /// Handle a key press. Returns whether it was consumed.
    ///
    /// While the text input is open every key goes to it; Enter commits and
    /// Escape cancels.
    pub fn handle_key(&mut self, event: &KeyEvent) -> bool {
        if self.session.is_editing_text() {
            return self.handle_text_key(event);
        }
        if event.key == "Escape" && self.session.state() != InteractionState::Idle {
            self.session.cancel(&mut self.canvas);
            return true;
        }
        match shortcuts::resolve(event) {
            Some(action) => {
                self.run_shortcut(action);
                true
            }
            None => false,
        }
    }

    fn handle_text_key(&mut self, event: &KeyEvent) -> bool {
        match event.key.as_str() {
            "Enter" => {
                self.commit_text();
            }
            "Escape" => {
                self.cancel_text();
            }
            "Backspace" => {
                if let Some(editor) = self.session.text_editor_mut() {
                    editor.backspace();
                }
            }
            key if key.chars().count() == 1 && !event.modifiers.action() => {
                if let Some(editor) = self.session.text_editor_mut() {
                    editor.push_str(key);
                }
            }
            _ => return false,
        }
        true
    }

    /// Replace the whole value of the open text input.
    pub fn set_text(&mut self, value: &str) -> bool {
        match self.session.text_editor_mut() {
            Some(editor) => {
                editor.set_value(value);
                true
            }
            None => false,
        }
    }

    pub fn commit_text(&mut self) -> bool {
        self.session.commit_text(&mut self.canvas, self.measure.as_ref())
    }

    pub fn cancel_text(&mut self) -> bool {
        self.session.cancel_text(&mut self.canvas)
    }

    /// Fill image placeholder `element_id` with `data_uri`.
    pub fn resolve_image(&mut self, element_id: &str, data_uri: &str) -> bool {
        resolve_image(&mut self.canvas, element_id, data_uri)
    }

    pub fn run_shortcut(&mut self, action: ShortcutAction) {
        match action {
            ShortcutAction::SelectTool(tool) => self.canvas.tools.set_tool(tool),
            ShortcutAction::Undo => {
                self.canvas.store.undo();
            }
            ShortcutAction::Redo => {
                self.canvas.store.redo();
            }
            ShortcutAction::DeleteSelection => {
                self.delete_selection();
            }
            ShortcutAction::DuplicateSelection => {
                self.duplicate_selection();
            }
        }
    }

    pub fn delete_selection(&mut self) -> bool {
        let ids = self.canvas.store.selection().to_vec();
        self.canvas.store.delete(&ids)
    }

    pub fn duplicate_selection(&mut self) -> Vec<ElementId> {
        let ids = self.canvas.store.selection().to_vec();
        self.canvas.store.duplicate(&ids)
    }

    /// Change the current style and restyle the selection as one history entry.
    ///
    /// Choosing hachure or solid while the fill is transparent also picks a
    /// visible fill color. Returns whether any element changed.
    pub fn apply_style(&mut self, patch: &ElementPatch) -> bool {
        let mut patch = patch.clone();
        let filled = matches!(patch.fill_style, Some(FillStyle::Hachure | FillStyle::Solid));
        let fill = patch
            .fill_color
            .as_deref()
            .unwrap_or(&self.canvas.tools.settings.fill_color);
        if filled && fill == DEFAULT_FILL_COLOR {
            patch.fill_color = Some(DEFAULT_STYLED_FILL.to_string());
        }
        self.canvas.tools.settings.apply(&patch);

        let style = ElementPatch {
            stroke_color: patch.stroke_color,
            fill_color: patch.fill_color,
            stroke_width: patch.stroke_width,
            roughness: patch.roughness,
            opacity: patch.opacity,
            fill_style: patch.fill_style,
            font_size: patch.font_size,
            font_family: patch.font_family,
            text_align: patch.text_align,
            ..ElementPatch::default()
        };
        let ids = self.canvas.store.selection().to_vec();
        self.canvas.store.update_many(&ids, &style)
    }

    pub fn bring_to_front(&mut self) -> bool {
        let ids = self.canvas.store.selection().to_vec();
        self.canvas.store.reorder_to_front(&ids)
    }

    pub fn send_to_back(&mut self) -> bool {
        let ids = self.canvas.store.selection().to_vec();
        self.canvas.store.reorder_to_back(&ids)
    }
}
