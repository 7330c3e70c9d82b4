use std::fmt;

/// Keyboard key identifier.
///
/// Only the keys the editor binds or the widgets react to are named; the rest
/// arrive as `Unknown` with the platform code.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum Key {
    Escape,
    Enter,
    Tab,
    Backspace,
    Space,
    Delete,

    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,

    // Letters
    A, B, C, D, E, F, G, H, I, J, K, L, M,
    N, O, P, Q, R, S, T, U, V, W, X, Y, Z,

    // Function keys
    F1, F2, F3, F4, F5, F6,
    F7, F8, F9, F10, F11, F12,

    Unknown(u32),
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// Press/release state shared by keys and mouse buttons.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum ElementState {
    Pressed,
    Released,
}

#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
    Other(u16),
}

#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub struct Modifiers {
    pub shift: bool,
    pub ctrl: bool,
    pub alt: bool,
    pub meta: bool,
}

impl Modifiers {
    pub fn any(&self) -> bool {
        self.shift || self.ctrl || self.alt || self.meta
    }
}

/// Platform-agnostic input events emitted by the runtime.
///
/// Pointer coordinates are logical pixels.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    Key {
        key: Key,
        state: ElementState,
        modifiers: Modifiers,
        /// True for auto-repeat presses.
        repeat: bool,
    },
    PointerMoved { x: f32, y: f32 },
    PointerButton {
        button: MouseButton,
        state: ElementState,
        x: f32,
        y: f32,
    },
    /// Vertical wheel motion in lines (positive = away from the user).
    Wheel { lines: f32 },
    PointerLeft,
    Focused(bool),
}

impl InputEvent {
    /// Shorthand used by bindings and tests.
    pub fn key_pressed(key: Key) -> Self {
        InputEvent::Key {
            key,
            state: ElementState::Pressed,
            modifiers: Modifiers::default(),
            repeat: false,
        }
    }

    pub fn mouse_pressed(button: MouseButton, x: f32, y: f32) -> Self {
        InputEvent::PointerButton { button, state: ElementState::Pressed, x, y }
    }
}
