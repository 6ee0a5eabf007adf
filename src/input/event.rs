use glam::DVec2;

/// Platform-agnostic input events.
///
/// These mirror the DOM events the camera controls listen to. Coordinates
/// are client pixels as reported by `clientX`/`clientY`. They are fed
/// into [`CameraControls::handle_event`](crate::camera::CameraControls::handle_event).
///
/// # Example
///
/// ```ignore
/// manager.handle_input(InputEvent::MouseDown { button: MouseButton::Left, x: 10.0, y: 20.0 }, now);
/// manager.handle_input(InputEvent::Wheel { delta_y: -120.0 }, now);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum InputEvent {
    /// Mouse button pressed over the controlled element.
    MouseDown {
        /// Which button was pressed.
        button: MouseButton,
        /// Horizontal client position.
        x: f64,
        /// Vertical client position.
        y: f64,
    },
    /// Cursor moved anywhere in the window.
    MouseMove {
        /// Horizontal client position.
        x: f64,
        /// Vertical client position.
        y: f64,
    },
    /// Mouse button released anywhere in the window.
    MouseUp,
    /// Cursor left the controlled element.
    MouseLeave,
    /// One or more fingers touched the element.
    TouchStart(TouchPoints),
    /// Fingers moved.
    TouchMove(TouchPoints),
    /// Fingers lifted.
    TouchEnd(TouchPoints),
    /// The platform cancelled the touch sequence.
    TouchCancel(TouchPoints),
    /// Wheel scrolled over the element (`deltaY`, positive = away from the
    /// user).
    Wheel {
        /// Vertical scroll amount.
        delta_y: f64,
    },
    /// Key pressed.
    KeyDown(KeyInput),
    /// Key released.
    KeyUp(KeyInput),
    /// The window lost focus.
    WindowBlur,
}

/// A keyboard event's key plus whether it targeted a text field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyInput {
    /// DOM `key` value (`"ArrowUp"`, `"Shift"`, `"r"`, ...).
    pub key: String,
    /// Whether the event target is an `<input>`/`<textarea>` or another
    /// element holding focus.
    pub from_text_field: bool,
}

impl KeyInput {
    /// Key event that did not originate from a text field.
    #[must_use]
    pub fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            from_text_field: false,
        }
    }
}

/// Platform-agnostic mouse button identifier (DOM `button` numbering).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MouseButton {
    /// Primary (left) mouse button.
    Left,
    /// Middle mouse button (wheel click).
    Middle,
    /// Secondary (right) mouse button.
    Right,
    /// Any other button.
    Other(i16),
}

impl From<i16> for MouseButton {
    fn from(button: i16) -> Self {
        match button {
            0 => Self::Left,
            1 => Self::Middle,
            2 => Self::Right,
            other => Self::Other(other),
        }
    }
}

/// The active touch list of a touch event: how many fingers are down and
/// where the first two are.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct TouchPoints {
    /// Number of active touches.
    pub count: usize,
    /// First touch, if any.
    pub first: DVec2,
    /// Second touch, if any.
    pub second: DVec2,
}

impl TouchPoints {
    /// No active touches.
    pub const NONE: Self = Self {
        count: 0,
        first: DVec2::ZERO,
        second: DVec2::ZERO,
    };

    /// A single finger at `(x, y)`.
    #[must_use]
    pub fn one(x: f64, y: f64) -> Self {
        Self {
            count: 1,
            first: DVec2::new(x, y),
            second: DVec2::ZERO,
        }
    }

    /// Two fingers.
    #[must_use]
    pub fn two(first: DVec2, second: DVec2) -> Self {
        Self {
            count: 2,
            first,
            second,
        }
    }

    /// Distance between the first two touches.
    #[must_use]
    pub fn separation(&self) -> f64 {
        self.first.distance(self.second)
    }
}
