// -- Lint policy ---------------------------------------------------------
// This is the single source of truth for crate-wide lints.

// Broad lint groups
#![deny(clippy::all)]
#![deny(clippy::pedantic)]
#![deny(clippy::nursery)]
// Documentation
#![deny(missing_docs)]
#![deny(rustdoc::broken_intra_doc_links)]
#![deny(rustdoc::private_intra_doc_links)]
#![deny(rustdoc::bare_urls)]
// No panicking in library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![deny(clippy::panic)]
#![deny(clippy::todo)]
#![deny(clippy::unimplemented)]
// No debug/print artifacts
#![deny(clippy::dbg_macro)]
#![deny(clippy::print_stdout)]
#![deny(clippy::print_stderr)]
// Import hygiene
#![deny(clippy::wildcard_imports)]
// Complexity limits (thresholds in clippy.toml)
#![deny(clippy::cognitive_complexity)]
#![deny(clippy::too_many_lines)]
#![deny(clippy::excessive_nesting)]
// Function signature hygiene
#![deny(clippy::too_many_arguments)]
#![deny(clippy::fn_params_excessive_bools)]
// Clone / pass-by-value hygiene
#![deny(clippy::needless_pass_by_value)]
#![deny(clippy::implicit_clone)]
// String hygiene
#![deny(clippy::inefficient_to_string)]
#![deny(clippy::redundant_closure_for_method_calls)]
#![deny(clippy::manual_string_new)]
#![deny(clippy::str_to_string)]
// Cargo lints (warn, not deny since cargo lints can be noisy)
#![warn(clippy::cargo)]
// Unused / redundant code
#![deny(unused_results)]
#![deny(unused_qualifications)]
// Cast hygiene
#![deny(trivial_casts)]
#![deny(trivial_numeric_casts)]

//! Damped orbit camera controls for 3D viewers.
//!
//! orbicam turns pointer, touch, wheel and key input into smoothly eased
//! camera motion around a target, for native hosts or the browser.
//!
//! # Key entry points
//!
//! - [`scene::SceneManager`] - owns the frame clock, the distance
//!   convergence and the controls; call `frame(now)` once per display
//!   refresh
//! - [`camera::CameraControls`] - the drag/pinch/wheel state machine with
//!   click detection, inertia and autorotation
//! - [`camera::LookAroundControls`] - first-person mode turning the view
//!   around a fixed eye; [`SceneManager::set_mode`] switches between them
//! - [`animation`] - [`Convergence`], [`BoundedConvergence`] and the
//!   [`ConvergenceScheduler`] that ticks them
//! - [`options::Options`] - TOML-backed tuning of every constant
//!
//! # Architecture
//!
//! Everything runs on one thread. Input handlers retarget convergences on
//! the host's scheduler; the frame loop ticks the active ones, and a frame
//! only renders when some value actually changed. Time is an explicit
//! millisecond clock passed in by the caller, which keeps the whole crate
//! deterministic under test. The `web` feature adds DOM listener wiring in
//! [`web`].

pub mod animation;
pub mod camera;
pub mod error;
pub mod input;
pub mod options;
pub mod replay;
pub mod scene;
pub mod signal;
#[cfg(feature = "web")]
pub mod web;

pub use animation::{
    BoundedConvergence, Convergence, ConvergenceScheduler, Easing, Handle,
};
pub use camera::{
    Camera, CameraControls, CameraUniform, ClickEvent, CursorHint, Gesture,
    LookAroundControls,
};
pub use error::OrbicamError;
pub use input::{InputEvent, KeyInput, MouseButton, TouchPoints};
pub use options::Options;
pub use scene::{CameraMode, SceneHost, SceneManager, SceneState};
pub use signal::{Propagation, Signal, Subscription};
