//! Explicit registry of live animators.
//!
//! The scheduler owns every animator it hands a [`Handle`] out for and keeps
//! the subset that still needs ticking. One call to
//! [`ConvergenceScheduler::update_active`] per frame advances all of them
//! and reports whether anything moved, which is what drives the renderer's
//! dirty flag. Schedulers are plain values, so independent instances can
//! coexist (one per viewer, one per test).

use std::any::Any;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;
use std::ops::{Deref, DerefMut};

use rustc_hash::FxHashSet;

use super::bounded::BoundedConvergence;
use super::convergence::Convergence;

/// Something the scheduler can tick.
pub trait Animator: Any {
    /// Record a tick at `now`; returns whether the value changed.
    fn tick(&mut self, now: f64) -> bool;
    /// Whether another tick is needed before the animator is at rest.
    fn needs_tick(&self) -> bool;
    /// Advance the animator's clock without ticking.
    fn sync_clock(&mut self, now: f64);
    /// Restart the animator's clock when it is registered.
    fn start_clock(&mut self, now: f64);
    /// Upcast for typed handle lookups.
    fn as_any(&self) -> &dyn Any;
    /// Upcast for typed handle lookups.
    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl Animator for Convergence {
    fn tick(&mut self, now: f64) -> bool {
        self.update(now)
    }

    fn needs_tick(&self) -> bool {
        Convergence::needs_tick(self)
    }

    fn sync_clock(&mut self, now: f64) {
        Convergence::sync_clock(self, now);
    }

    fn start_clock(&mut self, now: f64) {
        Convergence::start_clock(self, now);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

impl Animator for BoundedConvergence {
    fn tick(&mut self, now: f64) -> bool {
        self.update(now)
    }

    fn needs_tick(&self) -> bool {
        BoundedConvergence::needs_tick(self)
    }

    fn sync_clock(&mut self, now: f64) {
        BoundedConvergence::sync_clock(self, now);
    }

    fn start_clock(&mut self, now: f64) {
        BoundedConvergence::start_clock(self, now);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// Typed reference to an animator owned by a [`ConvergenceScheduler`].
pub struct Handle<T> {
    index: usize,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Handle<T> {
    fn new(index: usize) -> Self {
        Self {
            index,
            _marker: PhantomData,
        }
    }
}

impl<T> Clone for Handle<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for Handle<T> {}

impl<T> PartialEq for Handle<T> {
    fn eq(&self, other: &Self) -> bool {
        self.index == other.index
    }
}

impl<T> Eq for Handle<T> {}

impl<T> Hash for Handle<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.index.hash(state);
    }
}

impl<T> fmt::Debug for Handle<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Handle({})", self.index)
    }
}

/// Mutable access to a registered animator.
///
/// The animator's clock is synced to the scheduler on creation; on drop it
/// is (re)entered into the active set if the mutation left it moving.
pub struct AnimatorMut<'a, T: Animator> {
    animator: &'a mut T,
    active: &'a mut FxHashSet<usize>,
    index: usize,
}

impl<T: Animator> Deref for AnimatorMut<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        self.animator
    }
}

impl<T: Animator> DerefMut for AnimatorMut<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        self.animator
    }
}

impl<T: Animator> Drop for AnimatorMut<'_, T> {
    fn drop(&mut self) {
        if self.animator.needs_tick() {
            let _ = self.active.insert(self.index);
        }
    }
}

/// Owner of all animators plus the set that still needs ticking.
#[derive(Default)]
pub struct ConvergenceScheduler {
    animators: Vec<Box<dyn Animator>>,
    active: FxHashSet<usize>,
    now: f64,
}

impl ConvergenceScheduler {
    /// Empty scheduler with its clock at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Current scheduler clock, in milliseconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Move the clock forward without ticking. Earlier readings are
    /// ignored.
    pub fn set_time(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    /// Register an animator; it starts its clock now.
    pub fn insert<T: Animator>(&mut self, mut animator: T) -> Handle<T> {
        animator.start_clock(self.now);
        let index = self.animators.len();
        if animator.needs_tick() {
            let _ = self.active.insert(index);
        }
        self.animators.push(Box::new(animator));
        Handle::new(index)
    }

    /// Shared access to a registered animator.
    #[must_use]
    pub fn get<T: Animator>(&self, handle: Handle<T>) -> Option<&T> {
        self.animators
            .get(handle.index)
            .and_then(|a| a.as_any().downcast_ref::<T>())
    }

    /// Mutable access to a registered animator, synced to the clock.
    pub fn get_mut<T: Animator>(
        &mut self,
        handle: Handle<T>,
    ) -> Option<AnimatorMut<'_, T>> {
        let now = self.now;
        let slot = self.animators.get_mut(handle.index)?;
        slot.sync_clock(now);
        let animator = slot.as_any_mut().downcast_mut::<T>()?;
        Some(AnimatorMut {
            animator,
            active: &mut self.active,
            index: handle.index,
        })
    }

    /// Whether the animator behind `handle` is waiting for ticks.
    #[must_use]
    pub fn is_active<T>(&self, handle: Handle<T>) -> bool {
        self.active.contains(&handle.index)
    }

    /// Number of animators waiting for ticks.
    #[must_use]
    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Number of registered animators.
    #[must_use]
    pub fn len(&self) -> usize {
        self.animators.len()
    }

    /// Whether no animator is registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.animators.is_empty()
    }

    /// Tick every active animator at `now` and drop the ones at rest.
    ///
    /// Returns true if any value changed.
    pub fn update_active(&mut self, now: f64) -> bool {
        self.set_time(now);
        let now = self.now;
        let animators = &mut self.animators;
        let mut changed = false;

        self.active.retain(|&index| {
            let Some(animator) = animators.get_mut(index) else {
                return false;
            };
            changed |= animator.tick(now);
            animator.needs_tick()
        });

        log::trace!(
            "scheduler tick at {now:.1}ms: changed={changed}, {} active",
            self.active.len()
        );
        changed
    }
}

impl fmt::Debug for ConvergenceScheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConvergenceScheduler")
            .field("animators", &self.animators.len())
            .field("active", &self.active.len())
            .field("now", &self.now)
            .finish()
    }
}
