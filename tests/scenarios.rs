//! End-to-end gesture scenarios driven through `SceneManager` with a
//! manual millisecond clock.

use std::cell::RefCell;
use std::rc::Rc;

use glam::{DVec2, DVec3};
use orbicam::animation::BoundedConvergence;
use orbicam::{
    CameraMode, ClickEvent, Convergence, ConvergenceScheduler, Easing,
    InputEvent, MouseButton, Options, SceneHost, SceneManager, TouchPoints,
};

const FRAME: f64 = 16.0;

struct Harness {
    manager: SceneManager,
    now: f64,
}

impl Harness {
    fn new() -> Self {
        let mut manager = SceneManager::new(&Options::default(), 800.0, 600.0);
        manager.controls_mut().set_auto_rotation(DVec2::ZERO);
        assert!(manager.activate());
        let mut harness = Self { manager, now: 0.0 };
        harness.run_for(3.0 * FRAME);
        harness
    }

    fn input(&mut self, event: &InputEvent) -> bool {
        self.manager.handle_input(event, self.now)
    }

    fn run_for(&mut self, ms: f64) {
        let until = self.now + ms;
        while self.now < until {
            self.now += FRAME;
            let _ = self.manager.frame(self.now);
        }
    }

    fn angle(&self, u: bool) -> &BoundedConvergence {
        let controls = self.manager.controls();
        let handle = if u { controls.u() } else { controls.v() };
        self.manager.state().scheduler().get(handle).unwrap()
    }

    fn distance(&self) -> &BoundedConvergence {
        let state = self.manager.state();
        state.scheduler().get(state.distance()).unwrap()
    }
}

#[test]
fn small_quick_press_fires_click_with_release_position() {
    let mut h = Harness::new();
    let clicks = Rc::new(RefCell::new(Vec::new()));
    let sink = clicks.clone();
    let _ = h
        .manager
        .controls_mut()
        .signals
        .click
        .add(move |e: &ClickEvent| sink.borrow_mut().push(*e));

    assert!(h.input(&InputEvent::MouseDown {
        button: MouseButton::Left,
        x: 200.0,
        y: 150.0,
    }));
    h.run_for(FRAME * 3.0);
    assert!(h.input(&InputEvent::MouseMove { x: 201.0, y: 152.0 }));
    h.run_for(FRAME * 3.0);
    assert!(h.input(&InputEvent::MouseUp));

    assert_eq!(
        *clicks.borrow(),
        vec![ClickEvent {
            client_x: 201.0,
            client_y: 152.0,
        }]
    );
}

#[test]
fn fifty_pixel_drag_glides_after_release() {
    let mut h = Harness::new();
    let _ = h.input(&InputEvent::MouseDown {
        button: MouseButton::Left,
        x: 400.0,
        y: 300.0,
    });
    // 50 px to the right over ~200 ms, one move per frame
    for step in 1..=12 {
        h.run_for(FRAME);
        let x = 400.0 + 50.0 * f64::from(step) / 12.0;
        let _ = h.input(&InputEvent::MouseMove { x, y: 300.0 });
    }
    h.run_for(FRAME);

    let end_before = h.angle(true).end();
    assert!(h.input(&InputEvent::MouseUp));
    let glide = h.angle(true);
    let end_after = glide.end();
    assert!(end_after > end_before, "{end_after} <= {end_before}");
    assert!(glide.is_playing());

    // value approaches the new end monotonically and lands on it after the
    // damping duration
    let mut last = h.angle(true).value();
    let released = h.now;
    while h.now < released + 2000.0 {
        h.run_for(FRAME);
        let value = h.angle(true).value();
        assert!(value >= last);
        assert!(value <= end_after + 1e-12);
        last = value;
    }
    h.run_for(FRAME);
    assert_eq!(h.angle(true).value(), end_after);
    assert!(!h.angle(true).is_playing());
}

#[test]
fn halving_pinch_separation_doubles_distance_target() {
    let mut h = Harness::new();
    let start = h.distance().value();
    assert!(h.input(&InputEvent::TouchStart(TouchPoints::two(
        DVec2::new(100.0, 100.0),
        DVec2::new(100.0, 300.0),
    ))));
    h.run_for(FRAME);
    assert!(h.input(&InputEvent::TouchMove(TouchPoints::two(
        DVec2::new(100.0, 150.0),
        DVec2::new(100.0, 250.0),
    ))));
    assert!((h.distance().end() - 2.0 * start).abs() < 1e-9);

    assert!(h.input(&InputEvent::TouchEnd(TouchPoints::NONE)));
    h.run_for(1000.0);
    assert!((h.distance().value() - 2.0 * start).abs() < 1e-9);
}

#[test]
fn autorotation_turns_until_pressed() {
    let mut manager = SceneManager::new(&Options::default(), 800.0, 600.0);
    assert!(manager.activate());
    let mut now = 0.0;
    let mut eyes = Vec::new();
    for _ in 0..10 {
        now += FRAME;
        if let Some(camera) = manager.frame(now) {
            eyes.push(camera.eye);
        }
    }
    assert!(eyes.len() >= 8);
    assert_ne!(eyes[eyes.len() - 1], eyes[eyes.len() - 2]);

    let _ = manager.handle_input(
        &InputEvent::MouseDown {
            button: MouseButton::Left,
            x: 10.0,
            y: 10.0,
        },
        now,
    );
    for _ in 0..3 {
        now += FRAME;
        let _ = manager.frame(now);
    }
    now += FRAME;
    assert!(manager.frame(now).is_none());
}

#[test]
fn activation_is_idempotent() {
    let mut manager = SceneManager::new(&Options::default(), 800.0, 600.0);
    assert!(manager.activate());
    assert!(!manager.activate());
    assert!(manager.deactivate());
    assert!(!manager.deactivate());
    assert!(!manager.handle_input(&InputEvent::Wheel { delta_y: 1.0 }, 0.0));
}

#[test]
fn direction_change_animates_to_requested_view() {
    let mut h = Harness::new();
    let target = DVec3::new(0.0, 1.0, 1.0).normalize();
    h.manager.set_direction(target);
    h.run_for(2500.0);
    assert!((h.manager.controls().position() - target).length() < 1e-9);
    let eye = h.manager.camera().eye.as_dvec3();
    assert!((eye.normalize() - target).length() < 1e-5);
}

#[test]
fn independent_schedulers_do_not_interfere() {
    let mut a = ConvergenceScheduler::new();
    let mut b = ConvergenceScheduler::new();
    let ha = a.insert(Convergence::new(0.0, 10.0, Easing::Linear, 100.0));
    let hb = b.insert(Convergence::new(0.0, 10.0, Easing::Linear, 100.0));

    assert!(a.update_active(50.0));
    assert_eq!(a.get(ha).map(Convergence::value), Some(5.0));
    assert_eq!(b.get(hb).map(Convergence::value), Some(0.0));
    assert!(b.update_active(100.0));
    assert_eq!(b.get(hb).map(Convergence::value), Some(10.0));
}

#[test]
fn look_around_round_trip_restores_the_orbit() {
    let mut h = Harness::new();
    let orbit_eye = h.manager.camera().eye;

    assert!(h.manager.set_mode(CameraMode::LookAround));
    assert!(h.input(&InputEvent::MouseDown {
        button: MouseButton::Left,
        x: 400.0,
        y: 300.0,
    }));
    assert!(h.input(&InputEvent::MouseMove { x: 400.0, y: 300.0 }));
    h.run_for(FRAME);
    assert!(h.input(&InputEvent::MouseMove { x: 300.0, y: 250.0 }));
    assert!(h.input(&InputEvent::MouseUp));
    h.run_for(1000.0);

    let camera = h.manager.camera().clone();
    assert_eq!(camera.eye, orbit_eye);
    let view = (camera.target - camera.eye).normalize();
    assert!((view + orbit_eye.normalize()).length() > 0.1);

    assert!(h.manager.set_mode(CameraMode::Orbit));
    h.run_for(FRAME);
    let camera = h.manager.camera();
    assert!((camera.eye - orbit_eye).length() < 1e-5);
    assert!(camera.target.length() < 1e-6);
}
