//! Render-host side of the camera: frame clock, distance convergence and
//! the dirty flag.
//!
//! [`SceneHost`] is the whole contract the camera controls need from
//! whoever owns the render loop. [`SceneState`] is the stock
//! implementation, and [`SceneManager`] wires it to a [`CameraControls`]
//! and a [`Camera`] so that one [`frame`](SceneManager::frame) call per
//! display refresh yields a camera only when something moved.
//!
//! ```
//! # use orbicam::{InputEvent, Options, SceneManager};
//! let mut options = Options::default();
//! options.controls.auto_rotation = [0.0, 0.0];
//! let mut manager = SceneManager::new(&options, 800.0, 600.0);
//! let _ = manager.activate();
//! assert!(manager.frame(0.0).is_some());
//! let _ = manager.frame(16.0);
//! assert!(manager.frame(32.0).is_none());
//!
//! let _ = manager.handle_input(&InputEvent::Wheel { delta_y: -100.0 }, 40.0);
//! assert!(manager.frame(48.0).is_some());
//! ```

use glam::DVec3;
use serde::{Deserialize, Serialize};
use web_time::Instant;

use crate::animation::{
    BoundedConvergence, ConvergenceScheduler, Easing, Handle,
};
use crate::camera::{Camera, CameraControls, CameraUniform, LookAroundControls};
use crate::input::InputEvent;
use crate::options::{DistanceOptions, Options};

// ── Host contract ────────────────────────────────────────────────────────

/// What camera controls need from the render host.
pub trait SceneHost {
    /// Scheduler owning every animator of the scene.
    fn scheduler(&self) -> &ConvergenceScheduler;
    /// Mutable scheduler access.
    fn scheduler_mut(&mut self) -> &mut ConvergenceScheduler;
    /// Camera distance from the orbit target.
    fn distance(&self) -> Handle<BoundedConvergence>;
    /// Milliseconds between the last two frames.
    fn delta_frame(&self) -> f64;
    /// Clock reading of the last frame, in milliseconds.
    fn time_stamp(&self) -> f64;
    /// Viewport height in pixels.
    fn viewport_height(&self) -> f64;
    /// Mark the scene dirty so the next frame renders.
    fn request_render(&mut self);

    /// Current clock reading (frame or input event), in milliseconds.
    fn now(&self) -> f64 {
        self.scheduler().now()
    }
}

// ── Stock host ───────────────────────────────────────────────────────────

/// Frame clock, distance convergence and dirty flag of one viewport.
#[derive(Debug)]
pub struct SceneState {
    scheduler: ConvergenceScheduler,
    distance: Handle<BoundedConvergence>,
    last_frame: Option<f64>,
    delta_frame: f64,
    width: f64,
    height: f64,
    needs_render: bool,
}

impl SceneState {
    /// New state with a distance convergence built from `options`.
    #[must_use]
    pub fn new(options: &DistanceOptions, width: f64, height: f64) -> Self {
        let mut scheduler = ConvergenceScheduler::new();
        let distance = scheduler.insert(BoundedConvergence::new(
            options.initial,
            options.initial,
            options.min,
            options.max,
            Easing::EASE_OUT,
            options.animation_duration_ms,
        ));
        Self {
            scheduler,
            distance,
            last_frame: None,
            delta_frame: 0.0,
            width,
            height,
            needs_render: true,
        }
    }

    /// Advance the frame clock to `now` and tick every active animator.
    ///
    /// Returns whether the scene needs rendering. The first frame reports a
    /// zero frame delta.
    pub fn tick(&mut self, now: f64) -> bool {
        let now = self.last_frame.map_or(now, |last| now.max(last));
        self.delta_frame = self.last_frame.map_or(0.0, |last| now - last);
        self.last_frame = Some(now);

        let changed = self.scheduler.update_active(now);
        self.needs_render = changed || self.needs_render;
        self.needs_render
    }

    /// Whether a render has been requested since the last
    /// [`take_render`](Self::take_render).
    #[must_use]
    pub fn needs_render(&self) -> bool {
        self.needs_render
    }

    /// Clear the dirty flag, returning its previous state.
    pub fn take_render(&mut self) -> bool {
        std::mem::take(&mut self.needs_render)
    }

    /// Current camera distance.
    #[must_use]
    pub fn distance_value(&self) -> f64 {
        self.scheduler
            .get(self.distance)
            .map_or(0.0, BoundedConvergence::value)
    }

    /// Viewport width in pixels.
    #[must_use]
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Set the viewport size. Marks the scene dirty.
    pub fn resize(&mut self, width: f64, height: f64) {
        if height <= 0.0 {
            log::warn!("ignoring viewport height {height}");
            return;
        }
        self.width = width;
        self.height = height;
        self.needs_render = true;
    }
}

impl SceneHost for SceneState {
    fn scheduler(&self) -> &ConvergenceScheduler {
        &self.scheduler
    }

    fn scheduler_mut(&mut self) -> &mut ConvergenceScheduler {
        &mut self.scheduler
    }

    fn distance(&self) -> Handle<BoundedConvergence> {
        self.distance
    }

    fn delta_frame(&self) -> f64 {
        self.delta_frame
    }

    fn time_stamp(&self) -> f64 {
        self.last_frame.unwrap_or(0.0)
    }

    fn viewport_height(&self) -> f64 {
        self.height
    }

    fn request_render(&mut self) {
        self.needs_render = true;
    }
}

// ── Manager ──────────────────────────────────────────────────────────────

/// Which controls drive the camera.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum CameraMode {
    /// Orbit around the target at the scene distance.
    #[default]
    Orbit,
    /// Stand still and turn the view.
    LookAround,
}

/// Camera driven by input events and frames, orbiting a target or looking
/// around from a fixed eye.
#[derive(Debug)]
pub struct SceneManager {
    state: SceneState,
    controls: CameraControls,
    look_around: LookAroundControls,
    mode: CameraMode,
    camera: Camera,
    uniform: CameraUniform,
    epoch: Instant,
}

impl SceneManager {
    /// Manager for a `width` x `height` viewport in orbit mode. Controls
    /// start inactive.
    #[must_use]
    pub fn new(options: &Options, width: f64, height: f64) -> Self {
        let mut state = SceneState::new(&options.distance, width, height);
        let controls = CameraControls::new(options, state.scheduler_mut());
        let look_around = LookAroundControls::new(options, state.scheduler_mut());
        let aspect = if height > 0.0 { (width / height) as f32 } else { 1.0 };
        let mut camera = Camera::new(&options.projection, aspect);
        camera.orbit(controls.position(), state.distance_value());
        let mut uniform = CameraUniform::new();
        uniform.update_view_proj(&camera);

        Self {
            state,
            controls,
            look_around,
            mode: CameraMode::Orbit,
            camera,
            uniform,
            epoch: Instant::now(),
        }
    }

    /// Milliseconds since the manager was created, for callers without
    /// their own frame clock.
    #[must_use]
    pub fn elapsed_ms(&self) -> f64 {
        self.epoch.elapsed().as_secs_f64() * 1000.0
    }

    /// Start reacting to input with the controls of the current mode.
    /// Returns false if already active.
    pub fn activate(&mut self) -> bool {
        match self.mode {
            CameraMode::Orbit => self.controls.activate(&mut self.state),
            CameraMode::LookAround => self.look_around.activate(&mut self.state),
        }
    }

    /// Stop reacting to input. Returns false if already inactive.
    pub fn deactivate(&mut self) -> bool {
        match self.mode {
            CameraMode::Orbit => self.controls.deactivate(),
            CameraMode::LookAround => self.look_around.deactivate(),
        }
    }

    /// Whether the controls of the current mode react to input.
    #[must_use]
    pub fn is_active(&self) -> bool {
        match self.mode {
            CameraMode::Orbit => self.controls.is_enabled(),
            CameraMode::LookAround => self.look_around.is_enabled(),
        }
    }

    /// Active camera mode.
    #[must_use]
    pub fn mode(&self) -> CameraMode {
        self.mode
    }

    /// Switch camera mode. Returns false if already in `mode`.
    ///
    /// Look-around starts from the eye and view direction of the last
    /// rendered frame. If input was enabled it stays enabled, handed over
    /// to the new controls.
    pub fn set_mode(&mut self, mode: CameraMode) -> bool {
        if self.mode == mode {
            return false;
        }
        if mode == CameraMode::LookAround {
            let eye = self.camera.eye.as_dvec3();
            let direction = (self.camera.target - self.camera.eye).as_dvec3();
            self.look_around.set_view(eye, direction);
        }
        let enabled = self.deactivate();
        self.mode = mode;
        if enabled {
            let _ = self.activate();
        }
        self.state.request_render();
        log::info!("camera mode {mode:?}");
        true
    }

    /// Feed one input event stamped `now`. Returns whether the controls
    /// of the current mode consumed it.
    pub fn handle_input(&mut self, event: &InputEvent, now: f64) -> bool {
        self.state.scheduler_mut().set_time(now);
        match self.mode {
            CameraMode::Orbit => self.controls.handle_event(event, &mut self.state),
            CameraMode::LookAround => {
                self.look_around.handle_event(event, &mut self.state)
            }
        }
    }

    /// Run one frame at `now`.
    ///
    /// Returns the updated camera when the scene needs rendering, `None`
    /// when nothing moved since the last rendered frame.
    pub fn frame(&mut self, now: f64) -> Option<&Camera> {
        let _ = self.state.tick(now);
        match self.mode {
            CameraMode::Orbit => {
                let position = self.controls.update(&mut self.state);
                if !self.state.take_render() {
                    return None;
                }
                self.camera.target = self.controls.target(&self.state).as_vec3();
                self.camera.orbit(position, self.state.distance_value());
            }
            CameraMode::LookAround => {
                let direction = self.look_around.update(&mut self.state);
                if !self.state.take_render() {
                    return None;
                }
                self.camera.eye = self.look_around.eye().as_vec3();
                self.camera.target = self.camera.eye + direction.as_vec3();
            }
        }
        self.uniform.update_view_proj(&self.camera);
        Some(&self.camera)
    }

    /// Resize the viewport; the next frame renders.
    pub fn resize(&mut self, width: f64, height: f64) {
        self.state.resize(width, height);
        if height > 0.0 {
            self.camera.aspect = (width / height) as f32;
        }
    }

    /// Animate the camera to look at the target from `direction`, or in
    /// look-around mode to look along `direction`.
    pub fn set_direction(&mut self, direction: DVec3) {
        match self.mode {
            CameraMode::Orbit => {
                self.controls.set_direction(direction, &mut self.state);
            }
            CameraMode::LookAround => {
                self.look_around.look_toward(direction, &mut self.state);
            }
        }
    }

    /// Glide the orbit target to `target` over `duration_ms`.
    pub fn set_target(&mut self, target: DVec3, duration_ms: f64) {
        self.controls.set_target(target, duration_ms, &mut self.state);
        self.state.request_render();
    }

    /// Orbit `distance` away from the target, capping zoom-out at 1.2 times
    /// that. With `transition` the distance eases there.
    pub fn set_distance_from_target(&mut self, distance: f64, transition: bool) {
        self.controls
            .set_distance_from_target(distance, transition, &mut self.state);
        self.state.request_render();
    }

    /// The camera as of the last rendered frame.
    #[must_use]
    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    /// Uniform block matching [`camera`](Self::camera).
    #[must_use]
    pub fn uniform(&self) -> &CameraUniform {
        &self.uniform
    }

    /// The orbit controls.
    #[must_use]
    pub fn controls(&self) -> &CameraControls {
        &self.controls
    }

    /// Mutable orbit controls, e.g. to subscribe to their signals.
    pub fn controls_mut(&mut self) -> &mut CameraControls {
        &mut self.controls
    }

    /// The look-around controls.
    #[must_use]
    pub fn look_around(&self) -> &LookAroundControls {
        &self.look_around
    }

    /// Mutable look-around controls, e.g. to subscribe to the cursor hint.
    pub fn look_around_mut(&mut self) -> &mut LookAroundControls {
        &mut self.look_around
    }

    /// Frame clock and distance state.
    #[must_use]
    pub fn state(&self) -> &SceneState {
        &self.state
    }

    /// Orbit controls and state together, for calls that need both.
    pub fn parts_mut(&mut self) -> (&mut CameraControls, &mut SceneState) {
        (&mut self.controls, &mut self.state)
    }
}

#[cfg(test)]
mod tests {
    use glam::DVec2;

    use super::*;
    use crate::input::MouseButton;

    fn manager() -> SceneManager {
        let mut manager = SceneManager::new(&Options::default(), 800.0, 600.0);
        manager.controls_mut().set_auto_rotation(DVec2::ZERO);
        assert!(manager.activate());
        manager
    }

    fn settle(manager: &mut SceneManager, from: f64, to: f64) {
        let mut t = from;
        while t < to {
            t += 16.0;
            let _ = manager.frame(t);
        }
    }

    #[test]
    fn first_frame_renders_then_goes_idle() {
        let mut manager = manager();
        assert!(manager.frame(0.0).is_some());
        // activation snapped u/v; one more tick observes them settle
        let _ = manager.frame(16.0);
        assert!(manager.frame(32.0).is_none());
        assert!(manager.frame(48.0).is_none());
    }

    #[test]
    fn camera_sits_at_initial_distance() {
        let mut manager = manager();
        let eye = manager.frame(0.0).map(|c| c.eye);
        let eye = eye.unwrap();
        assert!((eye.length() - 10.0).abs() < 1e-4);
        // initial direction is (-1, 0.3, 0)
        assert!(eye.x < 0.0 && eye.y > 0.0);
        assert!(eye.z.abs() < 1e-4);
    }

    #[test]
    fn wheel_zoom_animates_distance() {
        let mut manager = manager();
        let _ = manager.frame(0.0);
        let _ = manager.frame(16.0);
        assert!(manager.handle_input(&InputEvent::Wheel { delta_y: 120.0 }, 20.0));

        let mut last = manager.state().distance_value();
        let mut t = 20.0;
        while t < 500.0 {
            t += 16.0;
            let _ = manager.frame(t);
            let d = manager.state().distance_value();
            assert!(d >= last);
            last = d;
        }
        assert!((last - 11.0).abs() < 1e-9);
    }

    #[test]
    fn resize_updates_aspect_and_requests_render() {
        let mut manager = manager();
        let _ = manager.frame(0.0);
        let _ = manager.frame(16.0);
        let _ = manager.frame(32.0);
        manager.resize(1000.0, 500.0);
        let camera = manager.frame(48.0).cloned();
        assert_eq!(camera.map(|c| c.aspect), Some(2.0));

        manager.resize(1000.0, 0.0);
        assert!(manager.frame(64.0).is_none());
        assert_eq!(manager.camera().aspect, 2.0);
    }

    #[test]
    fn frame_delta_is_measured_between_frames() {
        let mut state = SceneState::new(&DistanceOptions::default(), 10.0, 10.0);
        let _ = state.tick(100.0);
        assert_eq!(state.delta_frame(), 0.0);
        let _ = state.tick(116.0);
        assert_eq!(state.delta_frame(), 16.0);
        assert_eq!(state.time_stamp(), 116.0);
        // a stale timestamp does not run the clock backwards
        let _ = state.tick(90.0);
        assert_eq!(state.delta_frame(), 0.0);
        assert_eq!(state.time_stamp(), 116.0);
    }

    #[test]
    fn elapsed_clock_is_monotonic() {
        let manager = manager();
        let a = manager.elapsed_ms();
        let b = manager.elapsed_ms();
        assert!(b >= a && a >= 0.0);
    }

    #[test]
    fn target_glide_moves_the_camera_with_it() {
        let mut manager = manager();
        let _ = manager.frame(0.0);
        let _ = manager.frame(16.0);
        let offset = manager.camera().eye - manager.camera().target;

        manager.set_target(DVec3::new(2.0, 0.0, -1.0), 300.0);
        assert!(manager.frame(32.0).is_some());
        settle(&mut manager, 32.0, 600.0);

        let camera = manager.camera();
        assert!((camera.target - glam::Vec3::new(2.0, 0.0, -1.0)).length() < 1e-5);
        assert!((camera.eye - camera.target - offset).length() < 1e-4);
    }

    #[test]
    fn distance_from_target_sets_distance_and_zoom_cap() {
        let mut manager = manager();
        let _ = manager.frame(0.0);
        manager.set_distance_from_target(4.0, false);
        assert!(manager.frame(16.0).is_some());
        assert!((manager.state().distance_value() - 4.0).abs() < 1e-9);

        for t in [20.0, 24.0, 28.0, 32.0] {
            let _ = manager.handle_input(&InputEvent::Wheel { delta_y: 100.0 }, t);
        }
        settle(&mut manager, 32.0, 1500.0);
        assert!((manager.state().distance_value() - 4.8).abs() < 1e-9);
    }

    #[test]
    fn look_around_keeps_the_eye_and_turns_the_view() {
        let mut manager = manager();
        let _ = manager.frame(0.0);
        let eye = manager.camera().eye;
        let forward = (manager.camera().target - eye).normalize();

        assert!(manager.set_mode(CameraMode::LookAround));
        assert!(!manager.set_mode(CameraMode::LookAround));
        assert_eq!(manager.mode(), CameraMode::LookAround);
        assert!(manager.is_active());
        assert!(!manager.controls().is_enabled());

        let camera = manager.frame(16.0).cloned().unwrap();
        assert!((camera.eye - eye).length() < 1e-5);
        assert!(((camera.target - camera.eye).normalize() - forward).length() < 1e-5);

        let down = InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 400.0,
            y: 300.0,
        };
        assert!(manager.handle_input(&down, 20.0));
        assert!(manager.handle_input(&InputEvent::MouseMove { x: 400.0, y: 300.0 }, 24.0));
        assert!(manager.handle_input(&InputEvent::MouseMove { x: 500.0, y: 300.0 }, 28.0));
        assert!(manager.handle_input(&InputEvent::MouseUp, 32.0));
        settle(&mut manager, 32.0, 1000.0);

        let camera = manager.camera();
        assert!((camera.eye - eye).length() < 1e-5);
        let turned = (camera.target - camera.eye).normalize();
        // horizontal drag: same pitch, heading turned by 10 degrees
        assert!((turned.y - forward.y).abs() < 1e-5);
        let heading = |d: glam::Vec3| f64::from(d.z.atan2(d.x));
        let turn = (heading(turned) - heading(forward)).abs();
        assert!((turn - 10f64.to_radians()).abs() < 1e-4);
    }

    #[test]
    fn mode_switch_hands_over_activation() {
        let mut manager = SceneManager::new(&Options::default(), 800.0, 600.0);
        assert!(manager.set_mode(CameraMode::LookAround));
        assert!(!manager.is_active());
        assert!(manager.activate());
        assert!(manager.look_around().is_enabled());

        assert!(manager.set_mode(CameraMode::Orbit));
        assert!(manager.controls().is_enabled());
        assert!(!manager.look_around().is_enabled());
        assert!(manager.deactivate());
        assert!(!manager.is_active());
    }
}
