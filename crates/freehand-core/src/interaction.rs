//! Pointer-driven interaction state machine.
//!
//! An [`InteractionSession`] owns only the transient state of the gesture in
//! progress. All element changes go through the canvas's [`Store`]: gestures
//! write the live collection on every move and commit once on release.
//!
//! [`Store`]: crate::store::Store

use crate::canvas::Canvas;
use crate::element::{Element, ElementId, ElementPatch, ElementType, new_element_id};
use crate::geometry::{PENCIL_HIT_THRESHOLD, bounds_from_drag, contained_within, hit_test};
use crate::input::{Modifiers, MouseButton, PointerEvent};
use crate::selection::{
    Handle, MoveOrigin, RotationOrigin, SelectionRect, handle_at_position, resize_element,
};
use crate::text::{TextEditor, TextMeasure, text_size};
use kurbo::Point;

/// Size of a freshly placed image placeholder, in world units.
pub const IMAGE_PLACEHOLDER_SIZE: f64 = 100.0;

/// Named interaction states.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InteractionState {
    Idle,
    Drawing,
    Moving,
    Resizing,
    Rotating,
    Panning,
    GroupSelecting,
}

/// Working state of the gesture in progress.
#[derive(Debug, Clone, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Drawing {
        element_id: ElementId,
        element_type: ElementType,
        start: Point,
    },
    Moving(MoveOrigin),
    Resizing {
        handle: Handle,
        /// Element as it was when the gesture started.
        original: Element,
    },
    Rotating {
        element_id: ElementId,
        origin: RotationOrigin,
    },
    Panning {
        /// Last pointer position in screen pixels.
        last: Point,
    },
    GroupSelecting(SelectionRect),
}

impl Gesture {
    pub fn state(&self) -> InteractionState {
        match self {
            Gesture::Idle => InteractionState::Idle,
            Gesture::Drawing { .. } => InteractionState::Drawing,
            Gesture::Moving(_) => InteractionState::Moving,
            Gesture::Resizing { .. } => InteractionState::Resizing,
            Gesture::Rotating { .. } => InteractionState::Rotating,
            Gesture::Panning { .. } => InteractionState::Panning,
            Gesture::GroupSelecting(_) => InteractionState::GroupSelecting,
        }
    }
}

/// Requests from the state machine to the host UI.
#[derive(Debug, Clone, PartialEq)]
pub enum Effect {
    /// Show the inline text input for `element_id` at `screen_position`.
    EditText {
        element_id: ElementId,
        screen_position: Point,
    },
    /// Ask the user for an image file for the placeholder `element_id`.
    RequestImage { element_id: ElementId },
}

/// What a selection-mode press landed on.
enum Pick {
    Handle(Handle, Element),
    Body(ElementId),
    Nothing,
}

/// Transient interaction state for one canvas.
#[derive(Debug, Clone, Default)]
pub struct InteractionSession {
    gesture: Gesture,
    text_editor: Option<TextEditor>,
}

impl InteractionSession {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InteractionState {
        self.gesture.state()
    }

    pub fn gesture(&self) -> &Gesture {
        &self.gesture
    }

    /// Rubber-band rectangle in world coordinates while group-selecting.
    pub fn selection_rect(&self) -> Option<kurbo::Rect> {
        match &self.gesture {
            Gesture::GroupSelecting(band) => Some(band.to_rect()),
            _ => None,
        }
    }

    pub fn text_editor(&self) -> Option<&TextEditor> {
        self.text_editor.as_ref()
    }

    pub fn text_editor_mut(&mut self) -> Option<&mut TextEditor> {
        self.text_editor.as_mut()
    }

    pub fn is_editing_text(&self) -> bool {
        self.text_editor.is_some()
    }

    /// Dispatch a pointer event.
    pub fn handle_pointer(&mut self, canvas: &mut Canvas, event: PointerEvent) -> Option<Effect> {
        match event {
            PointerEvent::Down { position, button, .. } => self.pointer_down(canvas, position, button),
            PointerEvent::Move { position, modifiers } => {
                self.pointer_move(canvas, position, modifiers);
                None
            }
            PointerEvent::Up { .. } | PointerEvent::Leave => {
                self.pointer_up(canvas);
                None
            }
        }
    }

    /// Start a gesture. `screen` is canvas-relative.
    pub fn pointer_down(
        &mut self,
        canvas: &mut Canvas,
        screen: Point,
        button: MouseButton,
    ) -> Option<Effect> {
        if !matches!(self.gesture, Gesture::Idle) {
            log::warn!("Pointer down during {:?}; ending it first", self.state());
            self.pointer_up(canvas);
        }

        match button {
            MouseButton::Middle => {
                self.gesture = Gesture::Panning { last: screen };
                return None;
            }
            MouseButton::Right => return None,
            MouseButton::Left => {}
        }

        let world = canvas.camera.screen_to_world(screen);
        let tool = canvas.tools.current_tool;
        match tool.element_type() {
            None => {
                self.begin_selection(canvas, world);
                None
            }
            Some(ElementType::Text) => Some(self.begin_text(canvas, world)),
            Some(ElementType::Image) => Some(self.place_image(canvas, world)),
            Some(element_type) => {
                self.begin_drawing(canvas, world, element_type);
                None
            }
        }
    }

    fn begin_selection(&mut self, canvas: &mut Canvas, world: Point) {
        let zoom = canvas.camera.zoom;
        let tolerance = PENCIL_HIT_THRESHOLD / zoom;

        // Handles are checked before the body of each element, topmost first.
        let pick = canvas
            .store
            .elements()
            .iter()
            .rev()
            .find_map(|element| {
                if let Some(handle) = handle_at_position(world, element, zoom) {
                    Some(Pick::Handle(handle, element.clone()))
                } else if hit_test(world, element, tolerance) {
                    Some(Pick::Body(element.id.clone()))
                } else {
                    None
                }
            })
            .unwrap_or(Pick::Nothing);

        match pick {
            Pick::Handle(handle, element) => {
                canvas.store.select(&element.id);
                self.gesture = match handle {
                    Handle::Rotate => Gesture::Rotating {
                        element_id: element.id.clone(),
                        origin: RotationOrigin::new(&element, world),
                    },
                    _ => Gesture::Resizing {
                        handle,
                        original: element,
                    },
                };
            }
            Pick::Body(id) if canvas.store.is_selected(&id) => {
                let selected = canvas.store.selected_elements();
                self.gesture = Gesture::Moving(MoveOrigin::new(world, &selected));
            }
            Pick::Body(id) => {
                canvas.store.select(&id);
            }
            Pick::Nothing => {
                canvas.store.deselect_all();
                self.gesture = Gesture::GroupSelecting(SelectionRect::new(world));
            }
        }
    }

    fn begin_drawing(
        &mut self,
        canvas: &mut Canvas,
        world: Point,
        element_type: ElementType,
    ) {
        let overrides = canvas
            .tools
            .settings
            .style_patch()
            .merge(&ElementPatch::new().with_position(world).with_size(0.0, 0.0));
        let mut element = Element::create(new_element_id(), element_type.into(), &overrides);
        if element_type == ElementType::Pencil {
            element.push_point(world);
        }

        let element_id = element.id.clone();
        log::debug!("Drawing {} {}", element_type.as_str(), element_id);
        canvas.store.push_live(element);
        canvas.store.select(&element_id);
        self.gesture = Gesture::Drawing {
            element_id,
            element_type,
            start: world,
        };
    }

    fn begin_text(&mut self, canvas: &mut Canvas, world: Point) -> Effect {
        let overrides = canvas
            .tools
            .settings
            .style_patch()
            .merge(&ElementPatch::new().with_position(world).with_size(0.0, 0.0));
        let element = Element::create(new_element_id(), ElementType::Text.into(), &overrides);
        let element_id = element.id.clone();

        canvas.store.push_live(element);
        canvas.store.select(&element_id);
        let screen_position = canvas.camera.world_to_screen(world);
        self.text_editor = Some(TextEditor::new(element_id.clone(), screen_position));
        Effect::EditText {
            element_id,
            screen_position,
        }
    }

    fn place_image(&mut self, canvas: &mut Canvas, world: Point) -> Effect {
        let overrides = canvas.tools.settings.style_patch().merge(
            &ElementPatch::new()
                .with_position(world)
                .with_size(IMAGE_PLACEHOLDER_SIZE, IMAGE_PLACEHOLDER_SIZE),
        );
        let element = Element::create(new_element_id(), ElementType::Image.into(), &overrides);
        let element_id = element.id.clone();

        canvas.store.add(element);
        canvas.store.select(&element_id);
        canvas.tools.finish_creation();
        Effect::RequestImage { element_id }
    }

    /// Advance the gesture. `screen` is canvas-relative.
    pub fn pointer_move(&mut self, canvas: &mut Canvas, screen: Point, modifiers: Modifiers) {
        let world = canvas.camera.screen_to_world(screen);
        let store = &mut canvas.store;

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Panning { last } => {
                canvas.camera.pan_by(screen - *last);
                *last = screen;
            }
            Gesture::GroupSelecting(band) => {
                band.current = world;
            }
            Gesture::Drawing {
                element_id,
                element_type,
                start,
            } => {
                if *element_type == ElementType::Pencil {
                    store.update_live(element_id, |e| e.push_point(world));
                } else {
                    let bounds = bounds_from_drag(*start, world, *element_type, modifiers.shift);
                    store.update_live(element_id, |e| e.apply(&bounds.to_patch()));
                }
            }
            Gesture::Moving(origin) => {
                let delta = origin.delta(world);
                for (id, start) in &origin.origins {
                    store.update_live(id, |e| e.set_origin(*start + delta));
                }
            }
            Gesture::Resizing { handle, original } => {
                store.replace_live(resize_element(original, *handle, world));
            }
            Gesture::Rotating { element_id, origin } => {
                let angle = origin.angle_at(world);
                store.update_live(element_id, |e| e.angle = angle);
            }
        }
    }

    /// End the gesture, on release or when the pointer leaves the canvas.
    pub fn pointer_up(&mut self, canvas: &mut Canvas) {
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Panning { .. } => {}
            Gesture::GroupSelecting(band) => {
                let rect = band.to_rect();
                let ids: Vec<ElementId> = canvas
                    .store
                    .elements()
                    .iter()
                    .filter(|e| contained_within(e, rect))
                    .map(|e| e.id.clone())
                    .collect();
                canvas.store.select_many(&ids);
            }
            Gesture::Drawing { .. } => {
                canvas.store.commit_live();
                canvas.tools.finish_creation();
            }
            Gesture::Moving(_) | Gesture::Resizing { .. } | Gesture::Rotating { .. } => {
                canvas.store.commit_live();
            }
        }
    }

    /// Abandon the gesture and drop its uncommitted changes.
    pub fn cancel(&mut self, canvas: &mut Canvas) {
        if matches!(
            self.gesture,
            Gesture::Drawing { .. }
                | Gesture::Moving(_)
                | Gesture::Resizing { .. }
                | Gesture::Rotating { .. }
        ) {
            canvas.store.discard_live();
        }
        self.gesture = Gesture::Idle;
    }

    /// Close the text input and write its value into the element.
    ///
    /// The element box is sized from `measure`: at least 40 wide and one
    /// font size tall.
    pub fn commit_text(&mut self, canvas: &mut Canvas, measure: &dyn TextMeasure) -> bool {
        let Some(editor) = self.text_editor.take() else {
            return false;
        };
        let Some(content) = canvas
            .store
            .element(&editor.element_id)
            .and_then(|e| e.text())
            .cloned()
        else {
            return false;
        };

        let size = text_size(&editor.value, &content, measure);
        let patch = ElementPatch::new()
            .with_text(editor.value)
            .with_size(size.width, size.height);
        canvas.store.update_live(&editor.element_id, |e| e.apply(&patch));
        canvas.store.commit_live();
        canvas.tools.finish_creation();
        true
    }

    /// Close the text input and drop the element it was creating.
    pub fn cancel_text(&mut self, canvas: &mut Canvas) -> bool {
        if self.text_editor.take().is_none() {
            return false;
        }
        canvas.store.discard_live();
        true
    }
}

/// Patch a resolved image into placeholder `element_id`.
///
/// Ignored if the element is gone or is not an image. The last resolution wins.
pub fn resolve_image(canvas: &mut Canvas, element_id: &str, data_uri: &str) -> bool {
    let is_image = canvas
        .store
        .element(element_id)
        .is_some_and(|e| e.element_type() == ElementType::Image);
    if !is_image {
        return false;
    }
    canvas
        .store
        .update_one(element_id, &ElementPatch::new().with_image(data_uri))
}
