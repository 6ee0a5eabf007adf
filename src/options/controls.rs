use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Controls", inline)]
#[serde(default)]
/// Pointer, touch and wheel behavior of the orbit controls.
pub struct ControlsOptions {
    /// Drag sensitivity; angle change per pixel scales with
    /// `sensitivity * distance / viewport height`.
    #[schemars(title = "Sensitivity", range(min = 0.1, max = 5.0), extend("step" = 0.05))]
    pub sensitivity: f64,
    /// Largest cursor travel (px, per axis) that still counts as a click.
    #[schemars(title = "Click Tolerance", range(min = 0.0, max = 20.0), extend("step" = 1.0))]
    pub click_max_cursor_delta: f64,
    /// Longest press (ms) that still counts as a click.
    #[schemars(title = "Click Duration", range(min = 100.0, max = 3000.0), extend("step" = 50.0))]
    pub click_max_duration_ms: f64,
    /// A drag that rests this long (ms) before release gets no inertia.
    #[schemars(skip)]
    pub inertia_idle_timeout_ms: f64,
    /// Duration (ms) of orbit animations and of the post-release glide.
    #[schemars(title = "Damping", range(min = 0.0, max = 5000.0), extend("step" = 100.0))]
    pub damping_duration_ms: f64,
    /// Autorotation speed around u and v, in radians per millisecond.
    #[schemars(skip)]
    pub auto_rotation: [f64; 2],
    /// Distance factor of one wheel notch.
    #[schemars(title = "Zoom Step", range(min = 1.01, max = 2.0), extend("step" = 0.01))]
    pub zoom_step: f64,
    /// Angle (radians) of one arrow-key orbit step.
    #[schemars(skip)]
    pub key_rotate_step: f64,
    /// Lower bound of the polar angle.
    #[schemars(skip)]
    pub polar_min: f64,
    /// Upper bound of the polar angle.
    #[schemars(skip)]
    pub polar_max: f64,
    /// Camera direction (from the target) on activation; normalized on use.
    #[schemars(skip)]
    pub initial_direction: [f64; 3],
    /// End the gesture when the cursor leaves the element.
    #[schemars(title = "Release On Leave")]
    pub release_on_leave: bool,
}

impl Default for ControlsOptions {
    fn default() -> Self {
        Self {
            sensitivity: 1.2,
            click_max_cursor_delta: 3.0,
            click_max_duration_ms: 1000.0,
            inertia_idle_timeout_ms: 100.0,
            damping_duration_ms: 2000.0,
            auto_rotation: [0.0002, 0.0],
            zoom_step: 1.1,
            key_rotate_step: 0.1,
            polar_min: 0.01,
            polar_max: 3.14,
            initial_direction: [-1.0, 0.3, 0.0],
            release_on_leave: false,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Look Around", inline)]
#[serde(default)]
/// First-person look-around mode.
pub struct LookAroundOptions {
    /// Multiplier on the turn per pixel (0.1 degree at 1.0).
    #[schemars(title = "Sensitivity", range(min = 0.1, max = 10.0), extend("step" = 0.1))]
    pub sensitivity: f64,
    /// Duration (ms) the view takes to catch up with the pointer.
    #[schemars(title = "Damping", range(min = 0.0, max = 2000.0), extend("step" = 50.0))]
    pub animation_duration_ms: f64,
}

impl Default for LookAroundOptions {
    fn default() -> Self {
        Self {
            sensitivity: 1.0,
            animation_duration_ms: 400.0,
        }
    }
}
