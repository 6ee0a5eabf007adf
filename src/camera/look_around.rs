//! First-person look-around controls.
//!
//! The eye stays where it is and dragging turns the view direction. Both
//! angles live in [`BoundedConvergence`]s on the host's scheduler, like the
//! orbit controls, but every move eases the targets with
//! `increase_end_by` instead of snapping them, and the polar angle may
//! reach straight up or down.

use std::f64::consts::PI;

use glam::{DVec2, DVec3};

use super::spherical::{direction_from_uv, nearest_turn, uv_from_direction};
use crate::animation::{
    BoundedConvergence, ConvergenceScheduler, Easing, Handle,
};
use crate::input::{InputEvent, MouseButton};
use crate::options::{LookAroundOptions, Options};
use crate::scene::SceneHost;
use crate::signal::Signal;

/// Polar angles closer than this to a pole are nudged off it when turned
/// into a direction, so the view never lines up with the up vector.
const POLE_EPSILON: f64 = 1e-6;

/// Turn per pixel at sensitivity 1: a tenth of a degree.
const RADIANS_PER_PIXEL: f64 = PI / 180.0 / 10.0;

/// What the cursor over the element should convey.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorHint {
    /// Pointer away or controls inactive.
    #[default]
    Default,
    /// Hovering; a press would start turning.
    Rotatable,
    /// Turning the view.
    Rotating,
}

/// Look-around controls driven by platform-agnostic input events.
#[derive(Debug)]
pub struct LookAroundControls {
    options: LookAroundOptions,
    u: Handle<BoundedConvergence>,
    v: Handle<BoundedConvergence>,
    enabled: bool,
    eye: DVec3,
    direction: DVec3,
    pressed: bool,
    prev: Option<DVec2>,
    hint: CursorHint,
    /// Emitted whenever the cursor hint changes.
    pub cursor: Signal<CursorHint>,
}

impl LookAroundControls {
    /// Register the angle animators on `scheduler` and build inactive
    /// controls. The eye starts where the orbit camera starts, looking at
    /// the origin.
    #[must_use]
    pub fn new(options: &Options, scheduler: &mut ConvergenceScheduler) -> Self {
        let look = options.look_around.clone();
        let duration = look.animation_duration_ms;
        let mut angle = |min, max| {
            scheduler.insert(BoundedConvergence::new(
                0.0,
                0.0,
                min,
                max,
                Easing::EASE_OUT,
                duration,
            ))
        };
        let u = angle(f64::NEG_INFINITY, f64::INFINITY);
        let v = angle(0.0, PI);

        let outward = DVec3::from_array(options.controls.initial_direction)
            .normalize_or(DVec3::NEG_X);
        Self {
            options: look,
            u,
            v,
            enabled: false,
            eye: outward * options.distance.initial,
            direction: -outward,
            pressed: false,
            prev: None,
            hint: CursorHint::Default,
            cursor: Signal::new(),
        }
    }

    /// Whether the controls react to input.
    #[must_use]
    pub fn is_enabled(&self) -> bool {
        self.enabled
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

    /// Fixed camera position.
    #[must_use]
    pub fn eye(&self) -> DVec3 {
        self.eye
    }

    /// Unit view direction as of the last [`update`](Self::update).
    #[must_use]
    pub fn direction(&self) -> DVec3 {
        self.direction
    }

    /// Current cursor hint.
    #[must_use]
    pub fn cursor_hint(&self) -> CursorHint {
        self.hint
    }

    /// Turn multiplier.
    #[must_use]
    pub fn sensitivity(&self) -> f64 {
        self.options.sensitivity
    }

    /// Change the turn multiplier.
    pub fn set_sensitivity(&mut self, sensitivity: f64) {
        self.options.sensitivity = sensitivity;
    }

    /// Place the eye and view direction. Takes effect on the angles at the
    /// next [`activate`](Self::activate).
    pub fn set_view(&mut self, eye: DVec3, direction: DVec3) {
        self.eye = eye;
        self.direction = direction.normalize_or(self.direction);
    }

    /// Start reacting to input with the angles at the current direction.
    /// Returns false if already active.
    pub fn activate<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> bool {
        if self.enabled {
            return false;
        }
        self.enabled = true;
        let (u, v) = uv_from_direction(self.direction);
        for (handle, angle) in [(self.u, u), (self.v, v)] {
            if let Some(mut conv) = host.scheduler_mut().get_mut(handle) {
                conv.reset(angle, angle);
            }
        }
        host.request_render();
        log::debug!("look-around activated at u={u:.3} v={v:.3}");
        true
    }

    /// Stop reacting to input. Returns false if already inactive.
    pub fn deactivate(&mut self) -> bool {
        if !self.enabled {
            return false;
        }
        self.enabled = false;
        self.release();
        log::debug!("look-around deactivated");
        true
    }

    /// Feed one input event. Returns whether it was consumed.
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
                ..
            } => {
                self.pressed = true;
                self.prev = None;
                self.set_hint(CursorHint::Rotating);
                true
            }
            InputEvent::MouseMove { x, y } => {
                if self.pressed {
                    self.set_hint(CursorHint::Rotating);
                    self.turn(DVec2::new(*x, *y), host);
                    true
                } else {
                    self.set_hint(CursorHint::Rotatable);
                    false
                }
            }
            InputEvent::MouseUp | InputEvent::MouseLeave => {
                let was = self.pressed;
                self.release();
                was
            }
            _ => false,
        }
    }

    /// Ease the view toward `direction`, turning the short way round.
    pub fn look_toward<H: SceneHost + ?Sized>(
        &self,
        direction: DVec3,
        host: &mut H,
    ) {
        let (u, v) = uv_from_direction(direction);
        if let Some(mut conv) = host.scheduler_mut().get_mut(self.u) {
            let end = nearest_turn(conv.end(), u);
            conv.set_end(end, false);
        }
        if let Some(mut conv) = host.scheduler_mut().get_mut(self.v) {
            conv.set_end(v, false);
        }
    }

    fn turn<H: SceneHost + ?Sized>(&mut self, at: DVec2, host: &mut H) {
        if let Some(prev) = self.prev {
            let delta =
                (at - prev) * RADIANS_PER_PIXEL * self.options.sensitivity;
            if let Some(mut u) = host.scheduler_mut().get_mut(self.u) {
                u.increase_end_by(delta.x);
            }
            if let Some(mut v) = host.scheduler_mut().get_mut(self.v) {
                v.decrease_end_by(delta.y);
            }
        }
        self.prev = Some(at);
    }

    fn release(&mut self) {
        self.pressed = false;
        self.prev = None;
        self.set_hint(CursorHint::Default);
    }

    fn set_hint(&mut self, hint: CursorHint) {
        if self.hint != hint {
            self.hint = hint;
            self.cursor.dispatch(&hint);
        }
    }

    /// Per-frame step, run after the scheduler ticked. Returns the view
    /// direction and requests a render when it changed.
    pub fn update<H: SceneHost + ?Sized>(&mut self, host: &mut H) -> DVec3 {
        let scheduler = host.scheduler();
        let (Some(u), Some(v)) = (scheduler.get(self.u), scheduler.get(self.v))
        else {
            return self.direction;
        };
        if u.has_changed_since_last_tick() || v.has_changed_since_last_tick() {
            let polar = v.value().clamp(POLE_EPSILON, PI - POLE_EPSILON);
            self.direction = direction_from_uv(u.value(), polar);
            host.request_render();
        }
        self.direction
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::options::DistanceOptions;
    use crate::scene::SceneState;

    struct Rig {
        state: SceneState,
        look: LookAroundControls,
        t: f64,
    }

    impl Rig {
        fn new() -> Self {
            let mut state =
                SceneState::new(&DistanceOptions::default(), 800.0, 600.0);
            let mut look =
                LookAroundControls::new(&Options::default(), state.scheduler_mut());
            look.set_view(DVec3::ZERO, DVec3::Z);
            assert!(look.activate(&mut state));
            let mut rig = Self { state, look, t: 0.0 };
            rig.frames(2);
            rig
        }

        fn event(&mut self, event: &InputEvent) -> bool {
            self.state.scheduler_mut().set_time(self.t);
            self.look.handle_event(event, &mut self.state)
        }

        fn frames(&mut self, n: usize) {
            for _ in 0..n {
                self.t += 16.0;
                let _ = self.state.tick(self.t);
                let _ = self.look.update(&mut self.state);
            }
        }

        fn end(&self, handle: Handle<BoundedConvergence>) -> f64 {
            self.state.scheduler().get(handle).unwrap().end()
        }
    }

    fn press() -> InputEvent {
        InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 0.0,
            y: 0.0,
        }
    }

    #[test]
    fn activation_keeps_the_view() {
        let rig = Rig::new();
        assert!((rig.look.direction() - DVec3::Z).length() < 1e-9);
        assert_eq!(rig.look.eye(), DVec3::ZERO);
    }

    #[test]
    fn first_move_after_press_only_anchors() {
        let mut rig = Rig::new();
        let u0 = rig.end(rig.look.u());
        assert!(rig.event(&press()));
        assert!(rig.event(&InputEvent::MouseMove { x: 50.0, y: 0.0 }));
        assert_eq!(rig.end(rig.look.u()), u0);
    }

    #[test]
    fn drag_turns_by_a_tenth_degree_per_pixel() {
        let mut rig = Rig::new();
        let (u0, v0) = (rig.end(rig.look.u()), rig.end(rig.look.v()));
        let _ = rig.event(&press());
        let _ = rig.event(&InputEvent::MouseMove { x: 0.0, y: 0.0 });
        let _ = rig.event(&InputEvent::MouseMove { x: 100.0, y: -50.0 });

        let degree = PI / 180.0;
        assert!((rig.end(rig.look.u()) - (u0 + 10.0 * degree)).abs() < 1e-9);
        assert!((rig.end(rig.look.v()) - (v0 + 5.0 * degree)).abs() < 1e-9);

        rig.frames(40);
        let (u, v) = (rig.end(rig.look.u()), rig.end(rig.look.v()));
        assert!((rig.look.direction() - direction_from_uv(u, v)).length() < 1e-9);
    }

    #[test]
    fn sensitivity_scales_the_turn() {
        let mut rig = Rig::new();
        rig.look.set_sensitivity(3.0);
        assert_eq!(rig.look.sensitivity(), 3.0);
        let u0 = rig.end(rig.look.u());
        let _ = rig.event(&press());
        let _ = rig.event(&InputEvent::MouseMove { x: 0.0, y: 0.0 });
        let _ = rig.event(&InputEvent::MouseMove { x: 10.0, y: 0.0 });
        assert!((rig.end(rig.look.u()) - (u0 + 3.0 * PI / 180.0)).abs() < 1e-9);
    }

    #[test]
    fn polar_angle_reaches_the_poles_but_not_past() {
        let mut rig = Rig::new();
        let _ = rig.event(&press());
        let _ = rig.event(&InputEvent::MouseMove { x: 0.0, y: 0.0 });
        let _ = rig.event(&InputEvent::MouseMove { x: 0.0, y: 100_000.0 });
        assert_eq!(rig.end(rig.look.v()), 0.0);

        rig.frames(40);
        let up = rig.look.direction();
        assert!(up.y > 0.999_999 && up.is_finite());
    }

    #[test]
    fn cursor_hint_follows_hover_and_press() {
        let mut rig = Rig::new();
        let seen = Rc::new(RefCell::new(Vec::new()));
        let sink = seen.clone();
        let _ = rig
            .look
            .cursor
            .add(move |hint: &CursorHint| sink.borrow_mut().push(*hint));

        assert!(!rig.event(&InputEvent::MouseMove { x: 1.0, y: 1.0 }));
        assert!(rig.event(&press()));
        assert!(rig.event(&InputEvent::MouseUp));
        assert!(!rig.event(&InputEvent::MouseLeave));
        assert_eq!(
            *seen.borrow(),
            vec![
                CursorHint::Rotatable,
                CursorHint::Rotating,
                CursorHint::Default
            ]
        );
    }

    #[test]
    fn inactive_controls_ignore_input() {
        let mut rig = Rig::new();
        assert!(!rig.look.activate(&mut rig.state));
        assert!(rig.look.deactivate());
        assert!(!rig.look.deactivate());
        assert!(!rig.event(&press()));
        assert_eq!(rig.look.cursor_hint(), CursorHint::Default);
    }

    #[test]
    fn look_toward_turns_the_short_way() {
        let mut rig = Rig::new();
        rig.look.look_toward(DVec3::X, &mut rig.state);
        let u0 = uv_from_direction(DVec3::Z).0;
        assert!((rig.end(rig.look.u()) - u0).abs() <= PI);
        rig.frames(40);
        assert!((rig.look.direction() - DVec3::X).length() < 1e-9);
    }
}
