//! Headless gesture replay.
//!
//! A replay script is a TOML list of timestamped input events. Running it
//! feeds the events into a fresh [`SceneManager`] at their timestamps,
//! ticks frames at a fixed rate and records the camera every time a frame
//! renders:
//!
//! ```toml
//! width = 800
//! height = 600
//!
//! [[events]]
//! at = 0
//! type = "mouse_down"
//! x = 400
//! y = 300
//!
//! [[events]]
//! at = 16
//! type = "mouse_move"
//! x = 380
//! y = 300
//!
//! [[events]]
//! at = 32
//! type = "mouse_up"
//! ```
//!
//! A top-level `mode = "look_around"` drives the look-around controls
//! instead of the orbit ones.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use crate::animation::{BoundedConvergence, Handle};
use crate::error::OrbicamError;
use crate::input::{InputEvent, KeyInput, MouseButton, TouchPoints};
use crate::options::Options;
use crate::scene::{CameraMode, SceneHost, SceneManager};

/// Touch phase of a scripted touch event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TouchPhase {
    /// `touchstart`.
    Start,
    /// `touchmove`.
    Move,
    /// `touchend`.
    End,
    /// `touchcancel`.
    Cancel,
}

/// One scripted input.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ScriptEvent {
    /// Button press; `button` follows DOM numbering (0 = left).
    MouseDown {
        /// Horizontal client position.
        x: f64,
        /// Vertical client position.
        y: f64,
        /// DOM button number.
        #[serde(default)]
        button: i16,
    },
    /// Cursor move.
    MouseMove {
        /// Horizontal client position.
        x: f64,
        /// Vertical client position.
        y: f64,
    },
    /// Button release.
    MouseUp,
    /// Cursor left the element.
    MouseLeave,
    /// Touch event with the active touches after it.
    Touch {
        /// Which touch event.
        phase: TouchPhase,
        /// Client positions of the active touches.
        #[serde(default)]
        points: Vec<[f64; 2]>,
    },
    /// Wheel scroll.
    Wheel {
        /// Vertical scroll amount.
        delta_y: f64,
    },
    /// Key press.
    KeyDown {
        /// DOM key value.
        key: String,
    },
    /// Key release.
    KeyUp {
        /// DOM key value.
        key: String,
    },
    /// Window lost focus.
    Blur,
}

impl ScriptEvent {
    /// The input event this script entry stands for.
    #[must_use]
    pub fn to_input(&self) -> InputEvent {
        match self {
            Self::MouseDown { x, y, button } => InputEvent::MouseDown {
                button: MouseButton::from(*button),
                x: *x,
                y: *y,
            },
            Self::MouseMove { x, y } => InputEvent::MouseMove { x: *x, y: *y },
            Self::MouseUp => InputEvent::MouseUp,
            Self::MouseLeave => InputEvent::MouseLeave,
            Self::Touch { phase, points } => {
                let point = |i: usize| {
                    points.get(i).map_or(DVec2::ZERO, |p| DVec2::from_array(*p))
                };
                let touches = TouchPoints {
                    count: points.len(),
                    first: point(0),
                    second: point(1),
                };
                match phase {
                    TouchPhase::Start => InputEvent::TouchStart(touches),
                    TouchPhase::Move => InputEvent::TouchMove(touches),
                    TouchPhase::End => InputEvent::TouchEnd(touches),
                    TouchPhase::Cancel => InputEvent::TouchCancel(touches),
                }
            }
            Self::Wheel { delta_y } => InputEvent::Wheel { delta_y: *delta_y },
            Self::KeyDown { key } => InputEvent::KeyDown(KeyInput::new(key.as_str())),
            Self::KeyUp { key } => InputEvent::KeyUp(KeyInput::new(key.as_str())),
            Self::Blur => InputEvent::WindowBlur,
        }
    }
}

/// A script entry with its timestamp.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimedEvent {
    /// Milliseconds since the start of the replay.
    pub at: f64,
    /// The input.
    #[serde(flatten)]
    pub event: ScriptEvent,
}

fn default_width() -> f64 {
    800.0
}

fn default_height() -> f64 {
    600.0
}

/// A gesture replay script.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Script {
    /// Viewport width in pixels.
    #[serde(default = "default_width")]
    pub width: f64,
    /// Viewport height in pixels.
    #[serde(default = "default_height")]
    pub height: f64,
    /// Replay length in milliseconds; defaults to the last event plus the
    /// damping duration.
    #[serde(default)]
    pub duration_ms: Option<f64>,
    /// Whether autorotation stays on.
    #[serde(default)]
    pub auto_rotate: bool,
    /// Controls the events drive.
    #[serde(default)]
    pub mode: CameraMode,
    /// Events in time order.
    #[serde(default)]
    pub events: Vec<TimedEvent>,
}

impl Script {
    /// Parse and validate a script.
    pub fn from_toml(content: &str) -> Result<Self, OrbicamError> {
        let script: Self = toml::from_str(content)
            .map_err(|e| OrbicamError::Replay(e.to_string()))?;
        script.validate()?;
        Ok(script)
    }

    fn validate(&self) -> Result<(), OrbicamError> {
        if self.height <= 0.0 || self.width <= 0.0 {
            return Err(OrbicamError::Replay(format!(
                "viewport {}x{} is empty",
                self.width, self.height
            )));
        }
        if let Some(duration) = self.duration_ms {
            if !duration.is_finite() || duration < 0.0 {
                return Err(OrbicamError::Replay(format!(
                    "duration {duration}ms is not a finite, non-negative length"
                )));
            }
        }
        let mut last = 0.0;
        for (index, timed) in self.events.iter().enumerate() {
            if !timed.at.is_finite() || timed.at < last {
                return Err(OrbicamError::Replay(format!(
                    "event {index} at {}ms is out of order",
                    timed.at
                )));
            }
            last = timed.at;
        }
        Ok(())
    }
}

/// Camera state of one rendered frame.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Frame time in milliseconds.
    pub time: f64,
    /// Azimuth angle.
    pub u: f64,
    /// Polar angle.
    pub v: f64,
    /// Camera distance.
    pub distance: f64,
    /// Eye position.
    pub eye: [f32; 3],
}

fn record(manager: &SceneManager, time: f64) -> FrameRecord {
    let scheduler = manager.state().scheduler();
    let angle = |handle: Handle<BoundedConvergence>| {
        scheduler
            .get(handle)
            .map_or(f64::NAN, BoundedConvergence::value)
    };
    let (u, v) = match manager.mode() {
        CameraMode::Orbit => (manager.controls().u(), manager.controls().v()),
        CameraMode::LookAround => {
            (manager.look_around().u(), manager.look_around().v())
        }
    };
    FrameRecord {
        time,
        u: angle(u),
        v: angle(v),
        distance: manager.state().distance_value(),
        eye: manager.camera().eye.to_array(),
    }
}

/// Replay `script` at `fps` frames per second, returning every rendered
/// frame.
pub fn run(
    script: &Script,
    options: &Options,
    fps: f64,
) -> Result<Vec<FrameRecord>, OrbicamError> {
    if !fps.is_finite() || fps <= 0.0 {
        return Err(OrbicamError::Replay(format!("invalid frame rate {fps}")));
    }
    script.validate()?;
    let step = 1000.0 / fps;
    let end = script.duration_ms.unwrap_or_else(|| {
        script.events.last().map_or(0.0, |e| e.at)
            + options.controls.damping_duration_ms
    });
    if !end.is_finite() {
        return Err(OrbicamError::Replay(format!("replay length {end}ms")));
    }

    let mut manager = SceneManager::new(options, script.width, script.height);
    if !script.auto_rotate {
        manager.controls_mut().set_auto_rotation(DVec2::ZERO);
    }
    let _ = manager.set_mode(script.mode);
    let _ = manager.activate();

    let mut events = script.events.iter().peekable();
    let mut frames = Vec::new();
    let mut frame = 0_u64;
    loop {
        let time = frame as f64 * step;
        while let Some(timed) = events.next_if(|e| e.at <= time) {
            let _ = manager.handle_input(&timed.event.to_input(), timed.at);
        }
        if manager.frame(time).is_some() {
            frames.push(record(&manager, time));
        }
        if time >= end {
            break;
        }
        frame += 1;
    }
    log::info!(
        "replayed {} events, {} of {} frames rendered",
        script.events.len(),
        frames.len(),
        frame + 1
    );
    Ok(frames)
}
