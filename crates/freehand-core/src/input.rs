//! Platform-independent input events.
//!
//! Positions are canvas-relative screen pixels; the canvas converts them to
//! world coordinates through its camera.

use kurbo::{Point, Vec2};

/// Pointer button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    Left,
    Middle,
    Right,
}

/// Keyboard modifier state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    /// Cmd on macOS, Windows key elsewhere.
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        shift: false,
        ctrl: false,
        alt: false,
        meta: false,
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };
    pub const CTRL_SHIFT: Self = Self {
        shift: true,
        ctrl: true,
        ..Self::NONE
    };

    /// Ctrl or Cmd: the platform action modifier.
    pub fn action(&self) -> bool {
        self.ctrl || self.meta
    }
}

/// Pointer events delivered to the canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down {
        position: Point,
        button: MouseButton,
        modifiers: Modifiers,
    },
    Move {
        position: Point,
        modifiers: Modifiers,
    },
    Up {
        position: Point,
    },
    /// The pointer left the canvas.
    Leave,
}

/// Wheel or trackpad scroll.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WheelEvent {
    /// Scroll delta in pixels; positive `y` scrolls down.
    pub delta: Vec2,
    pub modifiers: Modifiers,
}

/// Key press.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyEvent {
    /// Logical key name, e.g. `"z"`, `"Delete"`, `"Enter"`.
    pub key: String,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: impl Into<String>, modifiers: Modifiers) -> Self {
        Self {
            key: key.into(),
            modifiers,
        }
    }

    /// A key press with no modifiers.
    pub fn plain(key: impl Into<String>) -> Self {
        Self::new(key, Modifiers::NONE)
    }
}
