//! Orbit controls: pointer, touch, wheel and key input to camera angles.
//!
//! The camera orbits the origin on two angles held in
//! [`BoundedConvergence`]s: `u` (azimuth, unbounded) and `v` (polar angle,
//! kept off the poles). Dragging snaps both targets each move; releasing a
//! drag that was still moving adds an inertial glide over the damping
//! duration. Two-finger pinches and the wheel retarget the host's distance
//! convergence instead.
//!
//! ```text
//!            1 contact             release
//!   Idle ────────────────▶ Dragging ────────▶ Idle
//!     │                      │ 2 contacts
//!     │ 2 contacts           ▼
//!     └────────────────▶ Pinching ──────────▶ Idle
//! ```

use std::f64::consts::FRAC_PI_2;

use glam::{DVec2, DVec3};

use super::spherical::{direction_from_uv, nearest_turn, uv_from_direction};
use crate::animation::{
    BoundedConvergence, Convergence, ConvergenceScheduler, Easing, Handle,
    ResetArgs,
};
use crate::input::{
    InputEvent, KeyAction, KeyInput, KeyboardState, MouseButton, TouchPoints,
};
use crate::options::{ControlsOptions, KeybindingOptions, Options};
use crate::scene::SceneHost;
use crate::signal::Signal;

/// Which gesture is in progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Gesture {
    /// No pointer is down.
    #[default]
    Idle,
    /// One contact point is rotating the camera.
    Dragging,
    /// Two touches are zooming.
    Pinching,
}

/// Payload of the `click` signal: where the pointer was released.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClickEvent {
    /// Horizontal client position.
    pub client_x: f64,
    /// Vertical client position.
    pub client_y: f64,
}

/// Signals emitted by [`CameraControls`].
#[derive(Debug, Default)]
pub struct ControlSignals {
    /// A press and release that stayed within the click thresholds.
    pub click: Signal<ClickEvent>,
    /// The user started (`true`) or stopped (`false`) rotating.
    pub rotating: Signal<bool>,
}

/// Pointer bookkeeping for the current drag.
#[derive(Debug, Clone, Copy, Default)]
struct PointerTrack {
    down_time: f64,
    start: DVec2,
    prev: Option<DVec2>,
    trigger_click: bool,
}

#[derive(Debug, Clone, Copy)]
struct Pinch {
    start_separation: f64,
    start_distance: f64,
}

/// Apply `f` to an animator registered on the host's scheduler.
fn animate<H, R>(
    host: &mut H,
    handle: Handle<BoundedConvergence>,
    f: impl FnOnce(&mut BoundedConvergence) -> R,
) -> Option<R>
where
    H: SceneHost + ?Sized,
{
    host.scheduler_mut().get_mut(handle).map(|mut conv| f(&mut conv))
}

/// Value of `handle` at the host's event clock rather than its last tick.
fn live_value<H>(host: &H, handle: Handle<BoundedConvergence>) -> Option<f64>
where
    H: SceneHost + ?Sized,
{
    let now = host.now();
    host.scheduler().get(handle).map(|conv| conv.value_at(now))
}

/// Jump value and target to `to(conv)`.
fn snap(
    conv: &mut BoundedConvergence,
    to: impl FnOnce(&BoundedConvergence) -> f64,
) {
    let value = to(conv);
    conv.reset(value, value);
}

/// Orbit camera controls driven by platform-agnostic input events.
#[derive(Debug)]
pub struct CameraControls {
    options: ControlsOptions,
    keybindings: KeybindingOptions,
    u: Handle<BoundedConvergence>,
    v: Handle<BoundedConvergence>,
    /// Orbit target, one animator per axis.
    target: [Handle<Convergence>; 3],
    enabled: bool,
    gesture: Gesture,
    pointer: PointerTrack,
    pinch: Option<Pinch>,
    /// Release before this time glides; unset when no move armed it.
    damping_deadline: Option<f64>,
    prev_speed: DVec2,
    auto_rotation: DVec2,
    position: DVec3,
    keyboard: KeyboardState,
    rotating: bool,
    /// Click and rotation notifications.
    pub signals: ControlSignals,
}

impl CameraControls {
    /// Register the u/v angle animators on `scheduler` and build inactive
    /// controls.
    #[must_use]
    pub fn new(options: &Options, scheduler: &mut ConvergenceScheduler) -> Self {
        let controls = options.controls.clone();
        let damping = controls.damping_duration_ms;
        let u = scheduler.insert(BoundedConvergence::new(
            0.0,
            0.0,
            f64::NEG_INFINITY,
            f64::INFINITY,
            Easing::EASE_OUT,
            damping,
        ));
        let v = scheduler.insert(BoundedConvergence::new(
            FRAC_PI_2,
            FRAC_PI_2,
            controls.polar_min,
            controls.polar_max,
            Easing::EASE_OUT,
            damping,
        ));
        let target =
            [(); 3].map(|()| scheduler.insert(Convergence::at_rest(0.0)));
        let position = DVec3::from_array(controls.initial_direction)
            .normalize_or(DVec3::NEG_X);

        Self {
            auto_rotation: DVec2::from_array(controls.auto_rotation),
            options: controls,
            keybindings: options.keybindings.clone(),
            u,
            v,
            target,
            enabled: false,
            gesture: Gesture::Idle,
            pointer: PointerTrack::default(),
            pinch: None,
            damping_deadline: None,
            prev_speed: DVec2::ZERO,
            position,
            keyboard: KeyboardState::default(),
            rotating: false,
            signals: ControlSignals::default(),
        }
    }

    // ── Accessors ────────────────────────────────────────────────────────

    /// Whether the controls react to input.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    /// Gesture in progress.
    #[must_use]
    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Whether the user is rotating the camera.
    #[must_use]
    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Normalized camera position as of the last
    /// [`update`](Self::update).
    #[must_use]
    pub fn position(&self) -> DVec3 {
        self.position
    }

    /// Azimuth animator.
    #[must_use]
    pub fn u(&self) -> Handle<BoundedConvergence> {
        self.u
    }

    /// Polar angle animator.
    #[must_use]
    pub fn v(&self) -> Handle<BoundedConvergence> {
        self.v
    }

    /// Autorotation speed around u and v, in radians per millisecond.
    #[must_use]
    pub fn auto_rotation(&self) -> DVec2 {
        self.auto_rotation
    }

    /// Set the autorotation speed. Zero stops it.
    pub fn set_auto_rotation(&mut self, speed: DVec2) {
        self.auto_rotation = speed;
    }

    /// Held modifier keys.
    #[must_use]
    pub fn keyboard(&self) -> &KeyboardState {
        &self.keyboard
    }

    // ── Lifecycle ────────────────────────────────────────────────────────

    /// Start reacting to input, seeding the angles from the current camera
    /// position. Returns false if already active.
    pub fn activate<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.enabled {
            return false;
        }
        self.enabled = true;
        let (u, v) = uv_from_direction(self.position);
        let _ = animate(host, self.u, |conv| snap(conv, |_| u));
        let _ = animate(host, self.v, |conv| snap(conv, |_| v));
        log::debug!("camera controls activated at u={u:.3} v={v:.3}");
        true
    }

    /// Stop reacting to input and drop any gesture in progress. Returns
    /// false if already inactive.
    pub fn deactivate(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.end_gesture();
        self.set_rotating(false);
        log::debug!("camera controls deactivated");
        true
    }

    // ── Input ────────────────────────────────────────────────────────────

    /// Feed one input event. Returns whether it was consumed.
    ///
    /// The host's scheduler clock must already be at the event's time.
    pub fn handle_event<H: SceneHost + ?Sized>(
        &mut self,
        event: &InputEvent,
        host: &mut H,
    ) -> bool {
        if !self.enabled {
            return false;
        }

        match event {
            InputEvent::MouseDown {
                button: MouseButton::Left,
                x,
                y,
            } => {
                self.pointer_down(DVec2::new(*x, *y), host);
                true
            }
            InputEvent::MouseDown { .. } => false,
            InputEvent::MouseMove { x, y } => {
                self.pointer_move(DVec2::new(*x, *y), host)
            }
            InputEvent::MouseUp
            | InputEvent::TouchEnd(_)
            | InputEvent::TouchCancel(_) => self.pointer_up(host),
            InputEvent::MouseLeave => {
                self.options.release_on_leave && self.pointer_up(host)
            }
            InputEvent::TouchStart(touches) => {
                self.touch_start(touches, host);
                true
            }
            InputEvent::TouchMove(touches) => self.touch_move(touches, host),
            InputEvent::Wheel { delta_y } => self.wheel(*delta_y, host),
            InputEvent::KeyDown(input) => self.key_down(input, host),
            InputEvent::KeyUp(input) => self.keyboard.key_up(input),
            InputEvent::WindowBlur => {
                self.keyboard.reset();
                false
            }
        }
    }

    fn pointer_down<H: SceneHost + ?Sized>(&mut self, at: DVec2, host: &mut H) {
        self.stop_rotating(host);
        self.gesture = Gesture::Dragging;
        self.pinch = None;
        self.prev_speed = DVec2::ZERO;
        self.pointer = PointerTrack {
            down_time: host.now(),
            start: at,
            prev: Some(at),
            trigger_click: true,
        };
        self.set_rotating(true);
        log::debug!("drag started at ({:.1}, {:.1})", at.x, at.y);
    }

    fn pointer_move<H: SceneHost + ?Sized>(
        &mut self,
        at: DVec2,
        host: &mut H,
    ) -> bool {
        if self.gesture != Gesture::Dragging {
            return false;
        }
        // Some platforms report a move on press without any travel.
        if self.pointer.prev == Some(at) {
            return true;
        }
        self.set_rotating(true);

        if let Some(prev) = self.pointer.prev {
            self.drag_angles(prev, at, host);
            let travel = (self.pointer.start - at).abs();
            let max = self.options.click_max_cursor_delta;
            if travel.x > max || travel.y > max {
                self.pointer.trigger_click = false;
            }
        }
        self.pointer.prev = Some(at);

        let now = host.now();
        if now - self.pointer.down_time > self.options.click_max_duration_ms {
            self.pointer.trigger_click = false;
        }
        self.damping_deadline = Some(now + self.options.inertia_idle_timeout_ms);
        true
    }

    /// Snap the angle targets by the pointer travel from `prev` to `at`.
    fn drag_angles<H: SceneHost + ?Sized>(
        &self,
        prev: DVec2,
        at: DVec2,
        host: &mut H,
    ) {
        let height = host.viewport_height();
        if height <= 0.0 {
            log::warn!("viewport height {height}; drag ignored");
            return;
        }
        let distance = live_value(host, host.distance()).unwrap_or(1.0);
        let scale = self.options.sensitivity / height * distance;
        let delta_u = (prev.x - at.x) * scale;
        let delta_v = (at.y - prev.y) * scale;

        let _ = animate(host, self.u, |u| snap(u, |u| u.end() - delta_u));
        let _ = animate(host, self.v, |v| snap(v, |v| v.end() - delta_v));
    }

    /// End the current gesture. Returns whether one was in progress.
    fn pointer_up<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> bool {
        let was = self.gesture;
        if was == Gesture::Dragging {
            let now = host.now();
            self.set_rotating(false);

            if self.damping_deadline.is_some_and(|deadline| now <= deadline) {
                self.apply_inertia(host);
            }

            if now - self.pointer.down_time > self.options.click_max_duration_ms
            {
                self.pointer.trigger_click = false;
            }
            if let (true, Some(at)) =
                (self.pointer.trigger_click, self.pointer.prev)
            {
                log::debug!("click at ({:.1}, {:.1})", at.x, at.y);
                self.signals.click.dispatch(&ClickEvent {
                    client_x: at.x,
                    client_y: at.y,
                });
            }
        }
        self.end_gesture();
        was != Gesture::Idle
    }

    fn end_gesture(&mut self) {
        if self.gesture != Gesture::Idle {
            log::debug!("{:?} ended", self.gesture);
        }
        self.gesture = Gesture::Idle;
        self.pointer = PointerTrack::default();
        self.pinch = None;
        self.damping_deadline = None;
    }

    /// Turn the last measured angular speed into a glide: the eased curve
    /// leaves the current value at `delta * f'(0) / duration`, so
    /// `delta = duration * speed / f'(0)` keeps the release speed.
    fn apply_inertia<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        let speed = self.prev_speed;
        let speed_sq = speed.length_squared();
        if !speed_sq.is_finite() || speed_sq <= 0.0 {
            log::debug!("inertia skipped, speed {speed}");
            return;
        }

        let glide = |conv: &mut BoundedConvergence, speed: f64| {
            let delta =
                conv.original_animation_duration() * speed / conv.derivate_at0();
            if delta.is_finite() {
                conv.set_end(conv.value() + delta, false);
            }
        };
        let _ = animate(host, self.u, |u| glide(u, speed.x));
        let _ = animate(host, self.v, |v| glide(v, speed.y));
        log::debug!("inertia applied, speed {speed}");
    }

    fn touch_start<H: SceneHost + ?Sized>(
        &mut self,
        touches: &TouchPoints,
        host: &mut H,
    ) {
        match touches.count {
            1 => self.pointer_down(touches.first, host),
            2 => self.pinch_start(touches, host),
            _ => {
                let _ = self.pointer_up(host);
            }
        }
    }

    fn pinch_start<H: SceneHost + ?Sized>(
        &mut self,
        touches: &TouchPoints,
        host: &H,
    ) {
        self.set_rotating(false);
        self.gesture = Gesture::Pinching;
        self.damping_deadline = None;
        self.pointer = PointerTrack::default();
        let start_distance =
            live_value(host, host.distance()).unwrap_or(1.0);
        self.pinch = Some(Pinch {
            start_separation: touches.separation(),
            start_distance,
        });
        log::debug!("pinch started, separation {:.1}", touches.separation());
    }

    fn touch_move<H: SceneHost + ?Sized>(
        &mut self,
        touches: &TouchPoints,
        host: &mut H,
    ) -> bool {
        match touches.count {
            1 => self.pointer_move(touches.first, host),
            2 => {
                let Some(pinch) = self.pinch else {
                    self.pinch_start(touches, host);
                    return true;
                };
                let separation = touches.separation();
                if pinch.start_separation > 0.0 && separation > 0.0 {
                    let end = pinch.start_separation / separation
                        * pinch.start_distance;
                    let distance = host.distance();
                    let _ = animate(host, distance, |d| d.set_end(end, false));
                }
                true
            }
            _ => self.pointer_up(host),
        }
    }

    fn wheel<H: SceneHost + ?Sized>(&self, delta_y: f64, host: &mut H) -> bool {
        if delta_y < 0.0 {
            self.zoom_in(host);
        } else if delta_y > 0.0 {
            self.zoom_out(host);
        } else {
            return false;
        }
        true
    }

    fn key_down<H: SceneHost + ?Sized>(
        &mut self,
        input: &KeyInput,
        host: &mut H,
    ) -> bool {
        if !self.keyboard.key_down(input)
            || self.keyboard.ctrl
            || self.keyboard.alt
        {
            return false;
        }
        let Some(action) = self.keybindings.lookup(&input.key) else {
            return false;
        };
        self.perform(action, host);
        true
    }

    /// Run a bound key action.
    pub fn perform<H: SceneHost + ?Sized>(
        &mut self,
        action: KeyAction,
        host: &mut H,
    ) {
        let step = self.options.key_rotate_step;
        match action {
            KeyAction::ToggleAutoRotate => self.toggle_auto_rotate(host),
            KeyAction::ZoomIn => self.zoom_in(host),
            KeyAction::ZoomOut => self.zoom_out(host),
            KeyAction::RotateLeft => self.rotate_by(DVec2::new(-step, 0.0), host),
            KeyAction::RotateRight => self.rotate_by(DVec2::new(step, 0.0), host),
            KeyAction::RotateUp => self.rotate_by(DVec2::new(0.0, -step), host),
            KeyAction::RotateDown => self.rotate_by(DVec2::new(0.0, step), host),
            KeyAction::ResetView => self.reset_view(host),
        }
        log::debug!("key action {action:?}");
    }

    // ── Programmatic control ─────────────────────────────────────────────

    /// Move the distance target one zoom step closer.
    pub fn zoom_in<H: SceneHost + ?Sized>(&self, host: &mut H) {
        let step = self.options.zoom_step;
        let distance = host.distance();
        let _ = animate(host, distance, |d| d.set_end(d.end() / step, true));
    }

    /// Move the distance target one zoom step away.
    pub fn zoom_out<H: SceneHost + ?Sized>(&self, host: &mut H) {
        let step = self.options.zoom_step;
        let distance = host.distance();
        let _ = animate(host, distance, |d| d.set_end(d.end() * step, true));
    }

    /// Animate the angles toward the view from `direction`, turning the
    /// short way round.
    pub fn set_direction<H: SceneHost + ?Sized>(
        &self,
        direction: DVec3,
        host: &mut H,
    ) {
        let (u, v) = uv_from_direction(direction);
        let _ = animate(host, self.u, |conv| {
            conv.set_end(nearest_turn(conv.end(), u), false);
        });
        let _ = animate(host, self.v, |conv| conv.set_end(v, false));
    }

    /// Shift both angle targets by `delta`, keeping the current motion.
    pub fn rotate_by<H: SceneHost + ?Sized>(&self, delta: DVec2, host: &mut H) {
        let _ = animate(host, self.u, |u| u.increase_end_by(delta.x));
        let _ = animate(host, self.v, |v| v.increase_end_by(delta.y));
    }

    /// Return to the configured direction and the initial distance.
    pub fn reset_view<H: SceneHost + ?Sized>(&self, host: &mut H) {
        let direction = DVec3::from_array(self.options.initial_direction);
        self.set_direction(direction, host);
        let distance = host.distance();
        let _ = animate(host, distance, |d| {
            d.set_end(d.inner().original_end(), false);
        });
    }

    /// Point the camera orbits around, at the scheduler clock.
    #[must_use]
    pub fn target<H: SceneHost + ?Sized>(&self, host: &H) -> DVec3 {
        let scheduler = host.scheduler();
        let axis = |handle: Handle<Convergence>| {
            scheduler.get(handle).map_or(0.0, Convergence::value)
        };
        DVec3::new(
            axis(self.target[0]),
            axis(self.target[1]),
            axis(self.target[2]),
        )
    }

    /// Glide the orbit target to `target` over `duration_ms`, easing out.
    pub fn set_target<H: SceneHost + ?Sized>(
        &self,
        target: DVec3,
        duration_ms: f64,
        host: &mut H,
    ) {
        for (handle, end) in self.target.into_iter().zip(target.to_array()) {
            if let Some(mut axis) = host.scheduler_mut().get_mut(handle) {
                axis.set_animation_duration(duration_ms);
                axis.set_end(end, false);
            }
        }
        log::debug!("orbit target moving to {target} over {duration_ms}ms");
    }

    /// Put the camera `distance` away from the target and cap zooming out
    /// at 1.2 times that. With `transition` the distance eases there from
    /// its current value, otherwise it jumps.
    pub fn set_distance_from_target<H: SceneHost + ?Sized>(
        &self,
        distance: f64,
        transition: bool,
        host: &mut H,
    ) {
        let handle = host.distance();
        let _ = animate(host, handle, |d| {
            let start = if transition { d.value() } else { distance };
            d.reset_with(ResetArgs {
                start: Some(start),
                end: Some(distance),
                max: Some(distance * 1.2),
                ..ResetArgs::default()
            });
        });
    }

    /// Start autorotation at the configured speed, or stop it.
    pub fn toggle_auto_rotate<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        if self.auto_rotation == DVec2::ZERO {
            self.auto_rotation = DVec2::from_array(self.options.auto_rotation);
        } else {
            self.stop_rotating(host);
        }
    }

    /// Stop autorotation and pin both angles where they are.
    fn stop_rotating<H: SceneHost + ?Sized>(&mut self, host: &mut H) {
        self.auto_rotation = DVec2::ZERO;
        let _ = animate(host, self.u, |u| snap(u, BoundedConvergence::value));
        let _ = animate(host, self.v, |v| snap(v, BoundedConvergence::value));
    }

    fn set_rotating(&mut self, rotating: bool) {
        if self.rotating != rotating {
            self.rotating = rotating;
            self.signals.rotating.dispatch(&rotating);
        }
    }

    // ── Frame ────────────────────────────────────────────────────────────

    /// Per-frame step, run after the scheduler ticked.
    ///
    /// Advances autorotation, records the angular speed used for inertia
    /// and returns the normalized camera position. Requests a render when
    /// either angle or the target moved.
    pub fn update<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> DVec3 {
        if !self.enabled {
            return self.position;
        }

        let step = self.auto_rotation * host.delta_frame();
        if self.auto_rotation.x != 0.0 {
            let _ = animate(host, self.u, |u| snap(u, |u| u.end() + step.x));
        }
        if self.auto_rotation.y != 0.0 {
            let _ = animate(host, self.v, |v| {
                let end = v.end() + step.y;
                v.reset_with(ResetArgs {
                    start: Some(end),
                    end: Some(end),
                    clamp: true,
                    ..ResetArgs::default()
                });
            });
        }

        let scheduler = host.scheduler();
        let mut moved = self.target.iter().any(|&handle| {
            scheduler
                .get(handle)
                .is_some_and(Convergence::has_changed_since_last_tick)
        });
        if let (Some(u), Some(v)) = (scheduler.get(self.u), scheduler.get(self.v))
        {
            if u.has_changed_since_last_tick() || v.has_changed_since_last_tick()
            {
                self.prev_speed = DVec2::new(
                    u.prev_delta_value() / u.prev_delta_time(),
                    v.prev_delta_value() / v.prev_delta_time(),
                );
                self.position = direction_from_uv(u.value(), v.value());
                moved = true;
            }
        }
        if moved {
            host.request_render();
        }
        self.position
    }
}
