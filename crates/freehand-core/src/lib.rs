//! Freehand Core Library
//!
//! Platform-agnostic element model, geometry, history and interaction logic
//! for the Freehand whiteboard.

pub mod camera;
pub mod canvas;
pub mod commands;
pub mod editor;
pub mod element;
pub mod geometry;
pub mod history;
pub mod input;
pub mod interaction;
pub mod library;
pub mod scene;
pub mod selection;
pub mod shortcuts;
pub mod storage;
pub mod store;
pub mod text;
pub mod tools;

pub use camera::Camera;
pub use canvas::Canvas;
pub use commands::{BACKGROUND_PALETTE, Command, CommandError, DEFAULT_BACKGROUND, Theme};
pub use editor::Editor;
pub use element::{
    Element, ElementId, ElementKind, ElementPatch, ElementType, FillStyle, TextAlign, TextContent,
};
pub use geometry::{Bounds, hit_test, point_in_element, topmost_hit_at};
pub use history::History;
pub use input::{KeyEvent, Modifiers, MouseButton, PointerEvent, WheelEvent};
pub use interaction::{Effect, InteractionSession, InteractionState};
pub use library::{Library, LibraryError, LibraryItem};
pub use scene::SceneError;
pub use selection::Handle;
pub use shortcuts::{SHORTCUTS, Shortcut, ShortcutAction};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError};
pub use store::Store;
pub use text::{ApproximateMeasure, TextEditor, TextMeasure};
pub use tools::{ToolKind, ToolManager, ToolSettings};
