//! Camera: orbit and look-around controls, angle conversion and the
//! renderer-facing camera description.

/// Pointer/touch/wheel/key orbit controls.
pub mod controls;
/// Core camera struct and GPU uniform types.
pub mod core;
/// First-person controls that turn the view around a fixed eye.
pub mod look_around;
/// Orbit angles to and from unit directions.
pub mod spherical;

pub use self::controls::{CameraControls, ClickEvent, ControlSignals, Gesture};
pub use self::core::{Camera, CameraUniform};
pub use self::look_around::{CursorHint, LookAroundControls};
