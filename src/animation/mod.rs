//! Scalar animation: easing curves, damped convergence, bounded ranges and
//! the scheduler that ticks them once per frame.

pub mod bounded;
pub mod convergence;
pub mod easing;
pub mod scheduler;

pub use bounded::{BoundedConvergence, ResetArgs};
pub use convergence::{Convergence, ANIMATION_DURATION, DAMPING_DURATION};
pub use easing::Easing;
pub use scheduler::{Animator, AnimatorMut, ConvergenceScheduler, Handle};
