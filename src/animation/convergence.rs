//! Damped scalar animator.
//!
//! A [`Convergence`] eases one scalar from `start` toward `end` over a fixed
//! duration. Time is an explicit millisecond clock: the animator remembers
//! the last reading it was given and every retarget starts there, which
//! keeps it deterministic under test and independent of any global timer.

use super::easing::Easing;

/// Time window, in milliseconds, of a default camera animation.
pub const ANIMATION_DURATION: f64 = 400.0;

/// Time window, in milliseconds, of the post-release glide.
pub const DAMPING_DURATION: f64 = 2000.0;

/// Clamp without panicking on inverted or NaN bounds.
#[inline]
pub(crate) fn clamp_range(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Shape of the velocity correction added by velocity-preserving retargets.
/// Zero at both ends, unit slope at 0, flat at 1.
#[inline]
fn carry_shape(t: f64) -> f64 {
    let omt = 1.0 - t;
    t * omt * omt
}

#[inline]
fn carry_shape_derivative(t: f64) -> f64 {
    (1.0 - t) * (1.0 - 3.0 * t)
}

/// One scalar easing from a start value toward a target value.
#[derive(Debug, Clone)]
pub struct Convergence {
    start: f64,
    end: f64,
    original_start: f64,
    original_end: f64,
    easing: Easing,
    animation_duration: f64,
    original_animation_duration: f64,
    start_time: f64,
    /// Coefficient of [`carry_shape`] in the current animation.
    carried: f64,
    /// Last clock reading this animator was given.
    now: f64,
    /// Value recorded at the last tick.
    ticked_value: f64,
    last_tick: f64,
    prev_delta_value: f64,
    prev_delta_time: f64,
    has_changed_since_last_tick: bool,
}

impl Convergence {
    /// Create an animator easing from `start` to `end` over
    /// `animation_duration` milliseconds.
    #[must_use]
    pub fn new(
        start: f64,
        end: f64,
        easing: Easing,
        animation_duration: f64,
    ) -> Self {
        Self {
            start,
            end,
            original_start: start,
            original_end: end,
            easing,
            animation_duration,
            original_animation_duration: animation_duration,
            start_time: 0.0,
            carried: 0.0,
            now: 0.0,
            ticked_value: start,
            last_tick: 0.0,
            prev_delta_value: 0.0,
            prev_delta_time: 1.0,
            has_changed_since_last_tick: false,
        }
    }

    /// Animator that starts at rest on `value`.
    #[must_use]
    pub fn at_rest(value: f64) -> Self {
        Self::new(value, value, Easing::EASE_OUT, ANIMATION_DURATION)
    }

    /// Value the current animation started from.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.start
    }

    /// Target of the current animation.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.end
    }

    /// Start value given at construction.
    #[must_use]
    pub fn original_start(&self) -> f64 {
        self.original_start
    }

    /// End value given at construction.
    #[must_use]
    pub fn original_end(&self) -> f64 {
        self.original_end
    }

    /// Easing curve of this animator.
    #[must_use]
    pub fn easing(&self) -> Easing {
        self.easing
    }

    /// Duration of the animation currently in flight.
    #[must_use]
    pub fn animation_duration(&self) -> f64 {
        self.animation_duration
    }

    /// Duration given at construction (or via
    /// [`set_animation_duration`](Self::set_animation_duration)).
    #[must_use]
    pub fn original_animation_duration(&self) -> f64 {
        self.original_animation_duration
    }

    /// Change the duration used by subsequent animations.
    pub fn set_animation_duration(&mut self, duration: f64) {
        self.original_animation_duration = duration;
    }

    /// Slope of the easing curve at t = 0.
    #[must_use]
    pub fn derivate_at0(&self) -> f64 {
        self.easing.derivate_at0()
    }

    /// Last clock reading this animator was given, in milliseconds.
    #[must_use]
    pub fn now(&self) -> f64 {
        self.now
    }

    /// Value change between the last two ticks.
    #[must_use]
    pub fn prev_delta_value(&self) -> f64 {
        self.prev_delta_value
    }

    /// Time between the last two ticks, in milliseconds.
    #[must_use]
    pub fn prev_delta_time(&self) -> f64 {
        self.prev_delta_time
    }

    /// Whether the value moved during the last tick.
    #[must_use]
    pub fn has_changed_since_last_tick(&self) -> bool {
        self.has_changed_since_last_tick
    }

    /// Value recorded by the last [`update`](Self::update).
    #[must_use]
    pub fn ticked_value(&self) -> f64 {
        self.ticked_value
    }

    /// Normalized progress of the current animation at time `t`.
    #[must_use]
    pub fn progress_at(&self, t: f64) -> f64 {
        if self.animation_duration > 0.0 {
            ((t - self.start_time) / self.animation_duration).clamp(0.0, 1.0)
        } else {
            1.0
        }
    }

    /// Interpolated value at time `t`.
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        let progress = self.progress_at(t);
        if progress >= 1.0 {
            return self.end;
        }
        self.start
            + (self.end - self.start) * self.easing.evaluate(progress)
            + self.carried * carry_shape(progress)
    }

    /// Interpolated value at the animator's clock.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.value_at(self.now)
    }

    /// Instantaneous velocity at time `t`, in units per millisecond.
    #[must_use]
    pub fn velocity_at(&self, t: f64) -> f64 {
        let progress = self.progress_at(t);
        if progress >= 1.0 {
            return 0.0;
        }
        ((self.end - self.start) * self.easing.derivative(progress)
            + self.carried * carry_shape_derivative(progress))
            / self.animation_duration
    }

    /// Instantaneous velocity at the animator's clock.
    #[must_use]
    pub fn velocity(&self) -> f64 {
        self.velocity_at(self.now)
    }

    /// True while the value has not reached the end.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.value() != self.end
    }

    /// Drop any in-flight animation and ease from `start` to `end`,
    /// starting at the animator's clock.
    pub fn reset(&mut self, start: f64, end: f64) {
        self.start = start;
        self.end = end;
        self.start_time = self.now;
        self.carried = 0.0;
        self.animation_duration = self.original_animation_duration;
    }

    /// Retarget toward `end`, starting from the current value.
    ///
    /// With `preserve_velocity` the new curve leaves the current value with
    /// the same velocity the old one had, so reversing or extending a
    /// motion never snaps.
    pub fn set_end(&mut self, end: f64, preserve_velocity: bool) {
        let current = self.value();
        let velocity = self.velocity();
        self.reset(current, end);

        if preserve_velocity {
            let carried = velocity * self.animation_duration
                - (end - current) * self.easing.derivate_at0();
            if carried.is_finite() {
                self.carried = carried;
            }
        }
    }

    /// Push the end further by `delta`, keeping the current velocity.
    pub fn increase_end_by(&mut self, delta: f64) {
        self.set_end(self.end + delta, true);
    }

    /// Pull the end back by `delta`, keeping the current velocity.
    pub fn decrease_end_by(&mut self, delta: f64) {
        self.set_end(self.end - delta, true);
    }

    /// Advance the clock without recording a tick.
    pub fn sync_clock(&mut self, now: f64) {
        self.now = self.now.max(now);
    }

    /// Restart the clock at `now`, as if the animator was created then.
    pub(crate) fn start_clock(&mut self, now: f64) {
        self.now = now;
        self.start_time = now;
        self.last_tick = now;
    }

    /// Record a tick at `now`. Returns whether the value changed.
    pub fn update(&mut self, now: f64) -> bool {
        self.update_within(now, f64::NEG_INFINITY, f64::INFINITY)
    }

    /// Record a tick at `now`, clamping the value into `[min, max]`.
    pub(crate) fn update_within(&mut self, now: f64, min: f64, max: f64) -> bool {
        self.sync_clock(now);
        let value = clamp_range(self.value(), min, max);

        self.prev_delta_value = value - self.ticked_value;
        self.prev_delta_time = self.now - self.last_tick;
        self.has_changed_since_last_tick = value != self.ticked_value;
        self.ticked_value = value;
        self.last_tick = self.now;

        self.has_changed_since_last_tick
    }

    /// Whether another tick is needed before this animator is at rest.
    #[must_use]
    pub fn needs_tick(&self) -> bool {
        self.needs_tick_within(f64::NEG_INFINITY, f64::INFINITY)
    }

    pub(crate) fn needs_tick_within(&self, min: f64, max: f64) -> bool {
        let end = clamp_range(self.end, min, max);
        self.has_changed_since_last_tick
            || self.ticked_value != end
            || clamp_range(self.value(), min, max) != end
    }
}
