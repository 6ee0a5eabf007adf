//! DOM wiring for the browser (feature `web`).
//!
//! [`DomControls`] translates DOM events into [`InputEvent`]s for a shared
//! [`SceneManager`]. Presses, touches, wheel and leave are listened for on
//! the controlled element; moves, releases, keys and blur on the window so
//! a drag keeps working when the pointer leaves the element. Every closure
//! is kept so [`DomControls::deactivate`] can remove exactly what
//! [`DomControls::activate`] added. The element carries
//! [`ROTATING_CLASS`] while the camera is being turned and
//! [`ROTATABLE_CLASS`] while idle look-around controls are hovered.

use std::cell::RefCell;
use std::rc::Rc;

use glam::DVec2;
use wasm_bindgen::closure::Closure;
use wasm_bindgen::{JsCast, JsValue};
use web_sys::{
    AddEventListenerOptions, Event, EventTarget, HtmlElement, KeyboardEvent,
    MouseEvent, TouchEvent, TouchList, WheelEvent,
};

use crate::camera::{Camera, CameraUniform, CursorHint};
use crate::error::OrbicamError;
use crate::input::{InputEvent, KeyInput, MouseButton, TouchPoints};
use crate::scene::SceneManager;
use crate::signal::Subscription;

/// CSS class present on the element while the user rotates the camera.
pub const ROTATING_CLASS: &str = "rotating";

/// CSS class present while look-around controls are hovered and idle.
pub const ROTATABLE_CLASS: &str = "rotatable";

fn apply_cursor_hint(element: &HtmlElement, hint: CursorHint) {
    let classes = element.class_list();
    let (on, off): (&[&str], &[&str]) = match hint {
        CursorHint::Default => (&[], &[ROTATABLE_CLASS, ROTATING_CLASS]),
        CursorHint::Rotatable => (&[ROTATABLE_CLASS], &[ROTATING_CLASS]),
        CursorHint::Rotating => (&[ROTATING_CLASS], &[ROTATABLE_CLASS]),
    };
    for class in off {
        let _ = classes.remove_1(class);
    }
    for class in on {
        let _ = classes.add_1(class);
    }
}

/// Install the panic hook and route `log` to the browser console.
pub fn init_logging(level: log::Level) {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(level);
}

fn dom_error(value: &JsValue) -> OrbicamError {
    OrbicamError::Dom(format!("{value:?}"))
}

// ── Event translation ────────────────────────────────────────────────────

/// DOM event types the controls listen to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DomEvent {
    MouseDown,
    MouseMove,
    MouseUp,
    MouseLeave,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    Wheel,
    KeyDown,
    KeyUp,
    Blur,
}

const ELEMENT_EVENTS: [DomEvent; 4] = [
    DomEvent::MouseDown,
    DomEvent::TouchStart,
    DomEvent::Wheel,
    DomEvent::MouseLeave,
];

const WINDOW_EVENTS: [DomEvent; 8] = [
    DomEvent::MouseMove,
    DomEvent::TouchMove,
    DomEvent::MouseUp,
    DomEvent::TouchEnd,
    DomEvent::TouchCancel,
    DomEvent::KeyDown,
    DomEvent::KeyUp,
    DomEvent::Blur,
];

impl DomEvent {
    fn name(self) -> &'static str {
        match self {
            Self::MouseDown => "mousedown",
            Self::MouseMove => "mousemove",
            Self::MouseUp => "mouseup",
            Self::MouseLeave => "mouseleave",
            Self::TouchStart => "touchstart",
            Self::TouchMove => "touchmove",
            Self::TouchEnd => "touchend",
            Self::TouchCancel => "touchcancel",
            Self::Wheel => "wheel",
            Self::KeyDown => "keydown",
            Self::KeyUp => "keyup",
            Self::Blur => "blur",
        }
    }

    /// Whether the page's default handling (scrolling, zooming) must be
    /// suppressed, which requires a non-passive listener.
    fn prevents_default(self) -> bool {
        matches!(self, Self::TouchStart | Self::Wheel)
    }

    fn translate(self, event: &Event) -> Option<InputEvent> {
        match self {
            Self::MouseDown => event.dyn_ref::<MouseEvent>().map(|e| {
                InputEvent::MouseDown {
                    button: MouseButton::from(e.button()),
                    x: f64::from(e.client_x()),
                    y: f64::from(e.client_y()),
                }
            }),
            Self::MouseMove => {
                event.dyn_ref::<MouseEvent>().map(|e| InputEvent::MouseMove {
                    x: f64::from(e.client_x()),
                    y: f64::from(e.client_y()),
                })
            }
            Self::MouseUp => Some(InputEvent::MouseUp),
            Self::MouseLeave => Some(InputEvent::MouseLeave),
            Self::TouchStart => touches(event).map(InputEvent::TouchStart),
            Self::TouchMove => touches(event).map(InputEvent::TouchMove),
            Self::TouchEnd => touches(event).map(InputEvent::TouchEnd),
            Self::TouchCancel => touches(event).map(InputEvent::TouchCancel),
            Self::Wheel => event.dyn_ref::<WheelEvent>().map(|e| {
                InputEvent::Wheel {
                    delta_y: e.delta_y(),
                }
            }),
            Self::KeyDown => key_input(event).map(InputEvent::KeyDown),
            Self::KeyUp => key_input(event).map(InputEvent::KeyUp),
            Self::Blur => Some(InputEvent::WindowBlur),
        }
    }
}

fn touches(event: &Event) -> Option<TouchPoints> {
    let list: TouchList = event.dyn_ref::<TouchEvent>()?.touches();
    let point = |index| {
        list.get(index).map_or(DVec2::ZERO, |touch| {
            DVec2::new(
                f64::from(touch.client_x()),
                f64::from(touch.client_y()),
            )
        })
    };
    Some(TouchPoints {
        count: list.length() as usize,
        first: point(0),
        second: point(1),
    })
}

fn key_input(event: &Event) -> Option<KeyInput> {
    let key = event.dyn_ref::<KeyboardEvent>()?.key();
    let from_text_field = event
        .target()
        .and_then(|target| target.dyn_into::<HtmlElement>().ok())
        .is_some_and(|element| {
            matches!(element.tag_name().as_str(), "INPUT" | "TEXTAREA" | "SELECT")
                || element.is_content_editable()
        });
    Some(KeyInput {
        key,
        from_text_field,
    })
}

// ── Listeners ────────────────────────────────────────────────────────────

struct Listener {
    target: EventTarget,
    kind: DomEvent,
    closure: Closure<dyn FnMut(Event)>,
}

/// Camera controls attached to a DOM element.
pub struct DomControls {
    element: HtmlElement,
    manager: Rc<RefCell<SceneManager>>,
    listeners: Vec<Listener>,
    rotating: Option<Subscription>,
    cursor: Option<Subscription>,
}

impl DomControls {
    /// Controls for `element`; nothing is listened to until
    /// [`activate`](Self::activate).
    #[must_use]
    pub fn new(element: HtmlElement, manager: Rc<RefCell<SceneManager>>) -> Self {
        Self {
            element,
            manager,
            listeners: Vec::new(),
            rotating: None,
            cursor: None,
        }
    }

    /// The scene manager events are forwarded to.
    #[must_use]
    pub fn manager(&self) -> &Rc<RefCell<SceneManager>> {
        &self.manager
    }

    /// Whether listeners are installed.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.listeners.is_empty()
    }

    /// Install the listeners and activate the controls. Returns
    /// `Ok(false)` if already active.
    pub fn activate(&mut self) -> Result<bool, OrbicamError> {
        if self.is_active() {
            return Ok(false);
        }
        if let Err(e) = self.attach() {
            let _ = self.deactivate();
            return Err(e);
        }
        log::debug!("DOM listeners installed: {}", self.listeners.len());
        Ok(true)
    }

    fn attach(&mut self) -> Result<(), OrbicamError> {
        let window = web_sys::window()
            .ok_or_else(|| OrbicamError::Dom("no window".into()))?;
        let element: EventTarget = self.element.clone().into();
        let window: EventTarget = window.into();
        for kind in ELEMENT_EVENTS {
            self.listen(&element, kind)?;
        }
        for kind in WINDOW_EVENTS {
            self.listen(&window, kind)?;
        }

        let mut manager = self
            .manager
            .try_borrow_mut()
            .map_err(|_| OrbicamError::Dom("scene manager busy".into()))?;
        let class_target = self.element.clone();
        self.rotating = Some(manager.controls_mut().signals.rotating.add(
            move |rotating: &bool| {
                let classes = class_target.class_list();
                let _ = if *rotating {
                    classes.add_1(ROTATING_CLASS)
                } else {
                    classes.remove_1(ROTATING_CLASS)
                };
            },
        ));
        let class_target = self.element.clone();
        self.cursor = Some(manager.look_around_mut().cursor.add(
            move |hint: &CursorHint| apply_cursor_hint(&class_target, *hint),
        ));
        let _ = manager.activate();
        Ok(())
    }

    fn listen(
        &mut self,
        target: &EventTarget,
        kind: DomEvent,
    ) -> Result<(), OrbicamError> {
        let manager = Rc::clone(&self.manager);
        let closure = Closure::<dyn FnMut(Event)>::new(move |event: Event| {
            if kind.prevents_default() {
                event.prevent_default();
            }
            let Some(input) = kind.translate(&event) else {
                return;
            };
            let Ok(mut manager) = manager.try_borrow_mut() else {
                log::warn!("{} dropped: scene manager busy", kind.name());
                return;
            };
            let now = manager.elapsed_ms();
            let _ = manager.handle_input(&input, now);
        });

        let options = AddEventListenerOptions::new();
        options.set_passive(!kind.prevents_default());
        target
            .add_event_listener_with_callback_and_add_event_listener_options(
                kind.name(),
                closure.as_ref().unchecked_ref(),
                &options,
            )
            .map_err(|e| dom_error(&e))?;

        self.listeners.push(Listener {
            target: target.clone(),
            kind,
            closure,
        });
        Ok(())
    }

    /// Remove the listeners and deactivate the controls. Returns false if
    /// already inactive.
    pub fn deactivate(&mut self) -> bool {
        let was_active = self.is_active();
        for listener in self.listeners.drain(..) {
            let _ = listener.target.remove_event_listener_with_callback(
                listener.kind.name(),
                listener.closure.as_ref().unchecked_ref(),
            );
        }

        if let Ok(mut manager) = self.manager.try_borrow_mut() {
            let _ = manager.deactivate();
            if let Some(subscription) = self.rotating.take() {
                let _ = manager.controls_mut().signals.rotating.remove(subscription);
            }
            if let Some(subscription) = self.cursor.take() {
                let _ = manager.look_around_mut().cursor.remove(subscription);
            }
        }
        apply_cursor_hint(&self.element, CursorHint::Default);
        if was_active {
            log::debug!("DOM listeners removed");
        }
        was_active
    }
}

impl Drop for DomControls {
    fn drop(&mut self) {
        let _ = self.deactivate();
    }
}

// ── Frame loop ───────────────────────────────────────────────────────────

fn request_frame(callback: &Closure<dyn FnMut()>) -> Result<(), OrbicamError> {
    let window = web_sys::window()
        .ok_or_else(|| OrbicamError::Dom("no window".into()))?;
    let _ = window
        .request_animation_frame(callback.as_ref().unchecked_ref())
        .map_err(|e| dom_error(&e))?;
    Ok(())
}

/// Drive `manager` from `requestAnimationFrame`, calling `render` for every
/// frame in which the camera changed. Runs for the lifetime of the page.
pub fn start_render_loop<F>(
    manager: Rc<RefCell<SceneManager>>,
    mut render: F,
) -> Result<(), OrbicamError>
where
    F: FnMut(&Camera, &CameraUniform) + 'static,
{
    let tick: Rc<RefCell<Option<Closure<dyn FnMut()>>>> =
        Rc::new(RefCell::new(None));
    let next = Rc::clone(&tick);

    *tick.borrow_mut() = Some(Closure::<dyn FnMut()>::new(move || {
        if let Ok(mut manager) = manager.try_borrow_mut() {
            let now = manager.elapsed_ms();
            if manager.frame(now).is_some() {
                render(manager.camera(), manager.uniform());
            }
        }
        if let Some(callback) = next.borrow().as_ref() {
            if let Err(e) = request_frame(callback) {
                log::error!("render loop stopped: {e}");
            }
        }
    }));

    if let Some(callback) = tick.borrow().as_ref() {
        request_frame(callback)?;
    }
    Ok(())
}
