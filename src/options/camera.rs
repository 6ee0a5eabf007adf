use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Projection", inline)]
#[serde(default)]
/// Camera projection parameters.
pub struct ProjectionOptions {
    /// Vertical field of view in degrees.
    #[schemars(title = "Field of View", range(min = 20.0, max = 90.0), extend("step" = 1.0))]
    pub fovy: f32,
    /// Near clipping plane distance.
    #[schemars(skip)]
    pub znear: f32,
    /// Far clipping plane distance.
    #[schemars(skip)]
    pub zfar: f32,
}

impl Default for ProjectionOptions {
    fn default() -> Self {
        Self {
            fovy: 60.0,
            znear: 0.05,
            zfar: 70.0,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
#[schemars(title = "Distance", inline)]
#[serde(default)]
/// Camera distance from the orbit target.
pub struct DistanceOptions {
    /// Distance on startup.
    #[schemars(title = "Initial Distance", range(min = 0.1, max = 1000.0), extend("step" = 0.5))]
    pub initial: f64,
    /// Closest allowed distance.
    #[schemars(title = "Min Distance", range(min = 0.0, max = 1000.0), extend("step" = 0.5))]
    pub min: f64,
    /// Farthest allowed distance.
    #[schemars(title = "Max Distance", range(min = 0.0, max = 10000.0), extend("step" = 1.0))]
    pub max: f64,
    /// Duration (ms) of zoom animations.
    #[schemars(skip)]
    pub animation_duration_ms: f64,
}

impl Default for DistanceOptions {
    fn default() -> Self {
        Self {
            initial: 10.0,
            min: 1.0,
            max: 100.0,
            animation_duration_ms: 400.0,
        }
    }
}
