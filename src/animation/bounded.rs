//! Range-limited convergence.

use super::convergence::{clamp_range, Convergence, ANIMATION_DURATION};
use super::easing::Easing;

/// Arguments of [`BoundedConvergence::reset_with`]. `None` fields keep
/// their defaults: the original start/end and the current bounds.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct ResetArgs {
    /// New start value; defaults to the original start.
    pub start: Option<f64>,
    /// New end value; defaults to the original end.
    pub end: Option<f64>,
    /// New lower bound; defaults to the current one.
    pub min: Option<f64>,
    /// New upper bound; defaults to the current one.
    pub max: Option<f64>,
    /// Clamp the resolved start and end into the bounds.
    pub clamp: bool,
}

/// A [`Convergence`] whose observable value never leaves `[min, max]`.
///
/// Mutators that take explicit values (`reset`) pass them through as
/// given; the bounds are enforced on every read, so `min <= value <= max`
/// holds after any call as long as `min <= max`.
#[derive(Debug, Clone)]
pub struct BoundedConvergence {
    inner: Convergence,
    min: f64,
    max: f64,
    original_min: f64,
    original_max: f64,
}

impl BoundedConvergence {
    /// Create a bounded animator from `start` to `end` within `[min, max]`.
    #[must_use]
    pub fn new(
        start: f64,
        end: f64,
        min: f64,
        max: f64,
        easing: Easing,
        animation_duration: f64,
    ) -> Self {
        Self {
            inner: Convergence::new(start, end, easing, animation_duration),
            min,
            max,
            original_min: min,
            original_max: max,
        }
    }

    /// Bounded animator with the default ease-out curve and duration.
    #[must_use]
    pub fn with_bounds(start: f64, end: f64, min: f64, max: f64) -> Self {
        Self::new(start, end, min, max, Easing::EASE_OUT, ANIMATION_DURATION)
    }

    /// The wrapped unbounded animator.
    #[must_use]
    pub fn inner(&self) -> &Convergence {
        &self.inner
    }

    /// Current lower bound.
    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    /// Current upper bound.
    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    /// Lower bound given at construction.
    #[must_use]
    pub fn original_min(&self) -> f64 {
        self.original_min
    }

    /// Upper bound given at construction.
    #[must_use]
    pub fn original_max(&self) -> f64 {
        self.original_max
    }

    fn clamp(&self, value: f64) -> f64 {
        clamp_range(value, self.min, self.max)
    }

    /// Start of the current animation, within bounds.
    #[must_use]
    pub fn start(&self) -> f64 {
        self.clamp(self.inner.start())
    }

    /// Target of the current animation, within bounds.
    #[must_use]
    pub fn end(&self) -> f64 {
        self.clamp(self.inner.end())
    }

    /// Current value, within bounds.
    #[must_use]
    pub fn value(&self) -> f64 {
        self.clamp(self.inner.value())
    }

    /// Value at time `t`, within bounds.
    #[must_use]
    pub fn value_at(&self, t: f64) -> f64 {
        self.clamp(self.inner.value_at(t))
    }

    /// True while the value has not reached the end.
    #[must_use]
    pub fn is_playing(&self) -> bool {
        self.value() != self.end()
    }

    /// Slope of the easing curve at t = 0.
    #[must_use]
    pub fn derivate_at0(&self) -> f64 {
        self.inner.derivate_at0()
    }

    /// Duration used for new animations.
    #[must_use]
    pub fn original_animation_duration(&self) -> f64 {
        self.inner.original_animation_duration()
    }

    /// Change the duration used by subsequent animations.
    pub fn set_animation_duration(&mut self, duration: f64) {
        self.inner.set_animation_duration(duration);
    }

    /// Value change between the last two ticks.
    #[must_use]
    pub fn prev_delta_value(&self) -> f64 {
        self.inner.prev_delta_value()
    }

    /// Time between the last two ticks, in milliseconds.
    #[must_use]
    pub fn prev_delta_time(&self) -> f64 {
        self.inner.prev_delta_time()
    }

    /// Whether the value moved during the last tick.
    #[must_use]
    pub fn has_changed_since_last_tick(&self) -> bool {
        self.inner.has_changed_since_last_tick()
    }

    /// Lower the bound; start and end are clamped and the animation
    /// restarts from them.
    pub fn set_min(&mut self, min: f64) {
        self.min = min;
        self.reclamp();
    }

    /// Change the upper bound; start and end are clamped and the animation
    /// restarts from them.
    pub fn set_max(&mut self, max: f64) {
        self.max = max;
        self.reclamp();
    }

    fn reclamp(&mut self) {
        let start = self.clamp(self.inner.start());
        let end = self.clamp(self.inner.end());
        self.inner.reset(start, end);
    }

    /// Restart from `start` to `end` without clamping.
    pub fn reset(&mut self, start: f64, end: f64) {
        self.inner.reset(start, end);
    }

    /// Partial reset; see [`ResetArgs`] for the defaults.
    pub fn reset_with(&mut self, args: ResetArgs) {
        self.min = args.min.unwrap_or(self.min);
        self.max = args.max.unwrap_or(self.max);

        let start = args.start.unwrap_or_else(|| self.inner.original_start());
        let end = args.end.unwrap_or_else(|| self.inner.original_end());
        if args.clamp {
            self.inner.reset(self.clamp(start), self.clamp(end));
        } else {
            self.inner.reset(start, end);
        }
    }

    /// Reset value and bounds to their construction-time state.
    pub fn restore(&mut self) {
        self.reset_with(ResetArgs {
            min: Some(self.original_min),
            max: Some(self.original_max),
            clamp: true,
            ..ResetArgs::default()
        });
    }

    /// Retarget toward `end` (clamped) from the current value.
    pub fn set_end(&mut self, end: f64, preserve_velocity: bool) {
        let end = self.clamp(end);
        let current = self.value();
        if current != self.inner.value() {
            // Restart from inside the range so the new curve does not
            // begin beyond a bound.
            self.inner.reset(current, current);
        }
        self.inner.set_end(end, preserve_velocity);
    }

    /// Push the end further by `delta`, keeping the current velocity.
    pub fn increase_end_by(&mut self, delta: f64) {
        self.set_end(self.end() + delta, true);
    }

    /// Pull the end back by `delta`, keeping the current velocity.
    pub fn decrease_end_by(&mut self, delta: f64) {
        self.set_end(self.end() - delta, true);
    }

    /// Advance the clock without recording a tick.
    pub fn sync_clock(&mut self, now: f64) {
        self.inner.sync_clock(now);
    }

    pub(crate) fn start_clock(&mut self, now: f64) {
        self.inner.start_clock(now);
    }

    /// Record a tick at `now`. Returns whether the value changed.
    pub fn update(&mut self, now: f64) -> bool {
        self.inner.update_within(now, self.min, self.max)
    }

    /// Whether another tick is needed before this animator is at rest.
    #[must_use]
    pub fn needs_tick(&self) -> bool {
        self.inner.needs_tick_within(self.min, self.max)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_in_bounds(conv: &BoundedConvergence) {
        let value = conv.value();
        assert!(
            conv.min() <= value && value <= conv.max(),
            "{value} outside [{}, {}]",
            conv.min(),
            conv.max()
        );
    }

    #[test]
    fn set_max_clamps_value() {
        let mut conv = BoundedConvergence::with_bounds(0.0, 0.0, -10.0, 10.0);
        conv.set_max(5.0);
        assert_eq!(conv.max(), 5.0);
        assert!(conv.value() <= 5.0);

        conv.reset(8.0, 8.0);
        conv.set_max(5.0);
        assert_eq!(conv.value(), 5.0);
        assert_eq!(conv.end(), 5.0);
        assert_eq!(conv.original_max(), 10.0);
    }

    #[test]
    fn set_min_clamps_value() {
        let mut conv = BoundedConvergence::with_bounds(-3.0, -3.0, -10.0, 10.0);
        conv.set_min(0.0);
        assert_eq!(conv.value(), 0.0);
        assert_eq!(conv.original_min(), -10.0);
    }

    #[test]
    fn unclamped_reset_still_reads_in_bounds() {
        let mut conv = BoundedConvergence::with_bounds(0.0, 0.0, 0.01, 3.14);
        conv.reset(-1.0, -1.0);
        assert_eq!(conv.value(), 0.01);
        assert_eq!(conv.end(), 0.01);
        assert!(!conv.is_playing());
    }

    #[test]
    fn reset_with_defaults_to_original_values() {
        let mut conv = BoundedConvergence::with_bounds(2.0, 4.0, 0.0, 10.0);
        conv.reset(7.0, 9.0);
        conv.reset_with(ResetArgs::default());
        assert_eq!(conv.start(), 2.0);
        assert_eq!(conv.end(), 4.0);
        assert_eq!(conv.min(), 0.0);
        assert_eq!(conv.max(), 10.0);
    }

    #[test]
    fn reset_with_clamps_on_request() {
        let mut conv = BoundedConvergence::with_bounds(2.0, 4.0, 0.0, 10.0);
        conv.reset_with(ResetArgs {
            start: Some(-4.0),
            end: Some(40.0),
            max: Some(20.0),
            clamp: true,
            ..ResetArgs::default()
        });
        assert_eq!(conv.inner().start(), 0.0);
        assert_eq!(conv.inner().end(), 20.0);

        conv.reset_with(ResetArgs {
            start: Some(-4.0),
            end: Some(40.0),
            ..ResetArgs::default()
        });
        assert_eq!(conv.inner().start(), -4.0);
        assert_eq!(conv.inner().end(), 40.0);
        assert_in_bounds(&conv);
    }

    #[test]
    fn restore_returns_to_original_state() {
        let mut conv = BoundedConvergence::with_bounds(1.0, 1.0, 0.0, 2.0);
        conv.set_max(0.5);
        conv.reset(0.2, 0.3);
        conv.restore();
        assert_eq!(conv.max(), 2.0);
        assert_eq!(conv.end(), 1.0);
    }

    #[test]
    fn set_end_clamps_target() {
        let mut conv = BoundedConvergence::with_bounds(5.0, 5.0, 1.0, 100.0);
        conv.set_end(500.0, true);
        assert_eq!(conv.end(), 100.0);
        assert_eq!(conv.value_at(10_000.0), 100.0);
    }

    #[test]
    fn is_playing_tracks_end() {
        let mut conv = BoundedConvergence::with_bounds(0.0, 0.0, -1.0, 1.0);
        assert!(!conv.is_playing());
        conv.set_end(1.0, false);
        assert!(conv.is_playing());
        let _ = conv.update(ANIMATION_DURATION);
        assert!(!conv.is_playing());
        assert_eq!(conv.value(), conv.end());
    }

    #[test]
    fn invariant_holds_across_mutations() {
        let mut conv = BoundedConvergence::with_bounds(0.0, 0.0, -10.0, 10.0);
        let mut t = 0.0;
        let steps: [(u8, f64); 10] = [
            (0, 7.0),
            (1, -8.0),
            (2, 30.0),
            (3, 3.0),
            (0, -2.0),
            (4, -50.0),
            (1, -1.0),
            (2, -30.0),
            (3, 0.5),
            (4, 50.0),
        ];
        for (op, x) in steps {
            match op {
                0 => conv.set_max(x),
                1 => conv.set_min(x),
                2 => conv.reset(x, -x),
                3 => conv.set_end(x * 4.0, true),
                _ => conv.reset_with(ResetArgs {
                    end: Some(x),
                    clamp: true,
                    ..ResetArgs::default()
                }),
            }
            if conv.min() <= conv.max() {
                assert_in_bounds(&conv);
            }
            t += 50.0;
            let _ = conv.update(t);
            if conv.min() <= conv.max() {
                assert_in_bounds(&conv);
            }
        }
    }
}
