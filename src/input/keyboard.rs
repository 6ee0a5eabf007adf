//! Modifier tracking and text-field filtering for key events.

use serde::{Deserialize, Serialize};

use super::event::KeyInput;

/// Camera actions that can be bound to keys.
///
/// Serde serializes as `snake_case` strings so TOML presets stay readable:
/// ```toml
/// [keybindings.bindings]
/// toggle_auto_rotate = "r"
/// zoom_in = "+"
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum KeyAction {
    /// Start or stop autorotation.
    ToggleAutoRotate,
    /// Move the camera closer by one zoom step.
    ZoomIn,
    /// Move the camera away by one zoom step.
    ZoomOut,
    /// Orbit left by one key step.
    RotateLeft,
    /// Orbit right by one key step.
    RotateRight,
    /// Orbit toward the top pole by one key step.
    RotateUp,
    /// Orbit toward the bottom pole by one key step.
    RotateDown,
    /// Return to the configured initial view.
    ResetView,
}

/// DOM key names the controls care about.
pub mod keys {
    /// Escape key.
    pub const ESCAPE: &str = "Escape";
    /// Enter key.
    pub const ENTER: &str = "Enter";
    /// Space bar.
    pub const SPACE: &str = " ";
    /// Tab key.
    pub const TAB: &str = "Tab";
    /// Control key.
    pub const CTRL: &str = "Control";
    /// Shift key.
    pub const SHIFT: &str = "Shift";
    /// Alt key.
    pub const ALT: &str = "Alt";
    /// Up arrow.
    pub const ARROW_UP: &str = "ArrowUp";
    /// Right arrow.
    pub const ARROW_RIGHT: &str = "ArrowRight";
    /// Down arrow.
    pub const ARROW_DOWN: &str = "ArrowDown";
    /// Left arrow.
    pub const ARROW_LEFT: &str = "ArrowLeft";
}

/// Held state of the modifier-like keys.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
#[allow(clippy::struct_excessive_bools)]
pub struct KeyboardState {
    /// Alt is held.
    pub alt: bool,
    /// Control is held.
    pub ctrl: bool,
    /// Shift is held.
    pub shift: bool,
    /// Tab is held.
    pub tab: bool,
    /// Space is held.
    pub space: bool,
}

impl KeyboardState {
    /// Whether a key event should reach listeners. Typing in a text field
    /// is left alone, except for Escape and Enter.
    #[must_use]
    pub fn allows(input: &KeyInput) -> bool {
        input.key == keys::ESCAPE
            || input.key == keys::ENTER
            || !input.from_text_field
    }

    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            keys::ALT => Some(&mut self.alt),
            keys::CTRL => Some(&mut self.ctrl),
            keys::SHIFT => Some(&mut self.shift),
            keys::TAB => Some(&mut self.tab),
            keys::SPACE => Some(&mut self.space),
            _ => None,
        }
    }

    /// Record a key press. Returns whether it should be forwarded.
    pub fn key_down(&mut self, input: &KeyInput) -> bool {
        if let Some(flag) = self.flag_mut(&input.key) {
            *flag = true;
        }
        Self::allows(input)
    }

    /// Record a key release. Returns whether it should be forwarded.
    pub fn key_up(&mut self, input: &KeyInput) -> bool {
        if let Some(flag) = self.flag_mut(&input.key) {
            *flag = false;
        }
        Self::allows(input)
    }

    /// Focus left the window; nothing can be held any more.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
