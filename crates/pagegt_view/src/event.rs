use serde::{Deserialize, Serialize};

use crate::ScreenPoint;

/// Input events delivered by the host to the editor.
///
/// Positions are screen pixels; the editor maps them to image space.
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed.
    PointerDown {
        button: MouseButton,
        position: ScreenPoint,
    },
    /// Mouse moved (with or without a button held).
    PointerMove { position: ScreenPoint },
    /// Mouse button released.
    PointerUp {
        button: MouseButton,
        position: ScreenPoint,
    },
    /// Double click, delivered after the two press/release pairs.
    DoubleClick { position: ScreenPoint },
    /// Mouse wheel scrolled (positive = zoom in).
    Wheel { delta: f64, position: ScreenPoint },
    /// Keyboard key pressed.
    KeyPressed { key: KeyCode },
}

/// Mouse buttons.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MouseButton {
    Left,
    Right,
    Middle,
}

/// Keyboard keys the editor understands.
///
/// Serializable so key bindings can live in the configuration file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    A,
    B,
    C,
    D,
    E,
    F,
    G,
    H,
    I,
    J,
    K,
    L,
    M,
    N,
    O,
    P,
    Q,
    R,
    S,
    T,
    U,
    V,
    W,
    X,
    Y,
    Z,
    Key0,
    Key1,
    Key2,
    Key3,
    Key4,
    Key5,
    Key6,
    Key7,
    Key8,
    Key9,
    Enter,
    Escape,
    Delete,
    Backspace,
    Tab,
    Space,
    Plus,
    Minus,
    Equals,
    Up,
    Down,
    Left,
    Right,
}
