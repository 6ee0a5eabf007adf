//! Input handling: platform-agnostic event types and keyboard state.

/// Platform-agnostic input events.
pub mod event;
/// Modifier tracking and key filtering.
pub mod keyboard;

pub use event::{InputEvent, KeyInput, MouseButton, TouchPoints};
pub use keyboard::{keys, KeyAction, KeyboardState};
