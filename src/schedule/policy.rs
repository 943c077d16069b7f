//! Schedule types and delay arithmetic.

use std::iter::FusedIterator;
use std::time::Duration;

/// An immutable description of when to run something again.
///
/// A schedule yields one delay per repetition. It says nothing about what is
/// being repeated, so one value can be shared by any number of concurrent
/// drives. Iteration always starts over: every call to [`iter`](Self::iter)
/// replays the same sequence (up to jitter).
///
/// Bounds compose: a schedule stops at whichever of `recurs`,
/// `max_cumulative` runs out first, and `max_delay` caps each single delay.
///
/// # Examples
///
/// ```rust
/// use millrace::schedule::Schedule;
/// use std::time::Duration;
///
/// let schedule = Schedule::exponential(Duration::from_millis(100))
///     .with_recurs(4)
///     .with_max_delay(Duration::from_millis(500));
///
/// let delays: Vec<_> = schedule.iter().collect();
/// assert_eq!(
///     delays,
///     vec![
///         Duration::from_millis(100),
///         Duration::from_millis(200),
///         Duration::from_millis(400),
///         Duration::from_millis(500),
///     ]
/// );
///
/// // restartable
/// assert_eq!(schedule.iter().count(), 4);
/// ```
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Schedule {
    strategy: DelayStrategy,
    recurs: Option<u32>,
    max_delay: Option<Duration>,
    max_cumulative: Option<Duration>,
    jitter: JitterStrategy,
}

/// How the delay grows from one repetition to the next.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum DelayStrategy {
    /// The same delay every time.
    Spaced(Duration),
    /// Delay increases linearly: base * (n + 1).
    Linear {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay doubles: base * 2^n.
    Exponential {
        /// Base delay duration.
        base: Duration,
    },
    /// Delay follows the Fibonacci sequence: base * fib(n + 1).
    Fibonacci {
        /// Base delay duration.
        base: Duration,
    },
}

/// Strategy for adding randomness to delays.
///
/// Without the `jitter` feature every strategy leaves delays untouched.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum JitterStrategy {
    /// No jitter applied.
    #[default]
    None,
    /// Add ±percentage randomness to delay.
    Proportional(f64),
    /// Random delay between 0 and calculated delay.
    Full,
    /// Random delay between the calculated delay and 3x the previous one.
    Decorrelated,
}

impl Schedule {
    fn with_strategy(strategy: DelayStrategy) -> Self {
        Self {
            strategy,
            recurs: None,
            max_delay: None,
            max_cumulative: None,
            jitter: JitterStrategy::None,
        }
    }

    /// Repeat forever without waiting.
    ///
    /// Termination is left entirely to the driver's predicate or to a failure.
    pub fn forever() -> Self {
        Self::spaced(Duration::ZERO)
    }

    /// Never repeat: the driven effect runs exactly once.
    pub fn never() -> Self {
        Self::recurs(0)
    }

    /// Repeat exactly once after the first run.
    pub fn once() -> Self {
        Self::recurs(1)
    }

    /// Repeat `n` times after the first run, without waiting.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use millrace::schedule::Schedule;
    ///
    /// assert_eq!(Schedule::recurs(3).iter().count(), 3);
    /// assert_eq!(Schedule::recurs(0).iter().count(), 0);
    /// ```
    pub fn recurs(n: u32) -> Self {
        Self::forever().with_recurs(n)
    }

    /// Run `n` times in total, without waiting.
    ///
    /// `times(0)` and `times(1)` both run once, since a drive always makes
    /// its first run.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use millrace::schedule::Schedule;
    ///
    /// assert_eq!(Schedule::times(3), Schedule::recurs(2));
    /// ```
    pub fn times(n: u32) -> Self {
        Self::recurs(n.saturating_sub(1))
    }

    /// Wait `delay` before every repetition.
    pub fn spaced(delay: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Spaced(delay))
    }

    /// Linearly increasing delay: base, 2*base, 3*base, ...
    pub fn linear(base: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Linear { base })
    }

    /// Doubling delay: base, 2*base, 4*base, ...
    ///
    /// # Examples
    ///
    /// ```rust
    /// use millrace::schedule::Schedule;
    /// use std::time::Duration;
    ///
    /// let schedule = Schedule::exponential(Duration::from_millis(100));
    /// assert_eq!(schedule.delay_for(0), Some(Duration::from_millis(100)));
    /// assert_eq!(schedule.delay_for(3), Some(Duration::from_millis(800)));
    /// ```
    pub fn exponential(base: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Exponential { base })
    }

    /// Fibonacci delay: base, base, 2*base, 3*base, 5*base, ...
    pub fn fibonacci(base: Duration) -> Self {
        Self::with_strategy(DelayStrategy::Fibonacci { base })
    }

    /// Stop after `n` repetitions.
    pub fn with_recurs(mut self, n: u32) -> Self {
        self.recurs = Some(n);
        self
    }

    /// Cap every single delay at `max`.
    pub fn with_max_delay(mut self, max: Duration) -> Self {
        self.max_delay = Some(max);
        self
    }

    /// Stop once the delays waited so far would exceed `budget`.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use millrace::schedule::Schedule;
    /// use std::time::Duration;
    ///
    /// // 100 + 200 + 400 fits in 800ms, the next 800ms delay does not
    /// let schedule = Schedule::exponential(Duration::from_millis(100))
    ///     .with_max_cumulative(Duration::from_millis(800));
    /// assert_eq!(schedule.iter().count(), 3);
    /// ```
    pub fn with_max_cumulative(mut self, budget: Duration) -> Self {
        self.max_cumulative = Some(budget);
        self
    }

    /// Add proportional jitter: `0.25` means ±25% of each delay.
    ///
    /// The factor is clamped to `0.0..=1.0`; NaN counts as `0.0`.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_jitter(mut self, factor: f64) -> Self {
        let factor = if factor.is_nan() { 0.0 } else { factor.clamp(0.0, 1.0) };
        self.jitter = JitterStrategy::Proportional(factor);
        self
    }

    /// Use full jitter: each delay is random between zero and the computed delay.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_full_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Full;
        self
    }

    /// Use decorrelated jitter: each delay is random between the computed
    /// delay and three times the previous one.
    ///
    /// **Note**: Requires the `jitter` feature. Without it, this method does nothing.
    pub fn with_decorrelated_jitter(mut self) -> Self {
        self.jitter = JitterStrategy::Decorrelated;
        self
    }

    /// The delay growth strategy.
    pub fn strategy(&self) -> &DelayStrategy {
        &self.strategy
    }

    /// The repetition limit, if any.
    pub fn recurs_limit(&self) -> Option<u32> {
        self.recurs
    }

    /// The cap on a single delay, if any.
    pub fn max_delay(&self) -> Option<Duration> {
        self.max_delay
    }

    /// The budget for all delays together, if any.
    pub fn max_cumulative(&self) -> Option<Duration> {
        self.max_cumulative
    }

    /// The jitter strategy.
    pub fn jitter(&self) -> &JitterStrategy {
        &self.jitter
    }

    /// Returns true if iteration is guaranteed to end.
    pub fn is_finite(&self) -> bool {
        let waits = match &self.strategy {
            DelayStrategy::Spaced(delay) => !delay.is_zero(),
            DelayStrategy::Linear { base }
            | DelayStrategy::Exponential { base }
            | DelayStrategy::Fibonacci { base } => !base.is_zero(),
        };
        self.recurs.is_some() || (self.max_cumulative.is_some() && waits)
    }

    /// The delay before repetition `n` (0-indexed), without jitter or budget.
    ///
    /// Returns `None` once the repetition limit is reached.
    pub fn delay_for(&self, n: u32) -> Option<Duration> {
        if let Some(limit) = self.recurs {
            if n >= limit {
                return None;
            }
        }

        let delay = match &self.strategy {
            DelayStrategy::Spaced(delay) => *delay,
            DelayStrategy::Linear { base } => base.saturating_mul(n.saturating_add(1)),
            DelayStrategy::Exponential { base } => base.saturating_mul(2u32.saturating_pow(n)),
            DelayStrategy::Fibonacci { base } => {
                base.saturating_mul(fibonacci(n.saturating_add(1)))
            }
        };

        Some(match self.max_delay {
            Some(max) => delay.min(max),
            None => delay,
        })
    }

    /// A fresh, lazy iterator over this schedule's delays.
    pub fn iter(&self) -> ScheduleIter {
        ScheduleIter {
            schedule: self.clone(),
            n: 0,
            previous: None,
            waited: Duration::ZERO,
            done: false,
        }
    }
}

impl<'a> IntoIterator for &'a Schedule {
    type Item = Duration;
    type IntoIter = ScheduleIter;

    fn into_iter(self) -> ScheduleIter {
        self.iter()
    }
}

/// The delays of one pass over a [`Schedule`].
///
/// Produced on demand; an unbounded schedule gives an infinite iterator.
#[derive(Debug, Clone)]
pub struct ScheduleIter {
    schedule: Schedule,
    n: u32,
    previous: Option<Duration>,
    waited: Duration,
    done: bool,
}

impl Iterator for ScheduleIter {
    type Item = Duration;

    fn next(&mut self) -> Option<Duration> {
        if self.done {
            return None;
        }

        let Some(base) = self.schedule.delay_for(self.n) else {
            self.done = true;
            return None;
        };
        let delay = self
            .schedule
            .jitter
            .apply(base, self.previous, self.schedule.max_delay);

        let waited = self.waited.saturating_add(delay);
        if let Some(budget) = self.schedule.max_cumulative {
            if waited > budget {
                self.done = true;
                return None;
            }
        }

        self.n = self.n.saturating_add(1);
        self.previous = Some(delay);
        self.waited = waited;
        Some(delay)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        if self.done {
            return (0, Some(0));
        }
        match self.schedule.recurs {
            Some(limit) => (0, Some(limit.saturating_sub(self.n) as usize)),
            None => (0, None),
        }
    }
}

impl FusedIterator for ScheduleIter {}

impl JitterStrategy {
    /// Apply jitter to a computed delay.
    ///
    /// `previous` is the last delay actually used (for decorrelated jitter);
    /// the result never exceeds `max_delay`.
    pub fn apply(
        &self,
        delay: Duration,
        #[cfg_attr(not(feature = "jitter"), allow(unused_variables))] previous: Option<Duration>,
        max_delay: Option<Duration>,
    ) -> Duration {
        let jittered = match self {
            JitterStrategy::None => delay,
            #[cfg(feature = "jitter")]
            JitterStrategy::Proportional(factor) => {
                use rand::Rng;
                let millis = delay.as_millis() as f64;
                let spread = millis * factor;
                let low = (millis - spread).max(0.0);
                let high = millis + spread;
                if high <= low {
                    delay
                } else {
                    Duration::from_millis(rand::rng().random_range(low..=high) as u64)
                }
            }
            #[cfg(feature = "jitter")]
            JitterStrategy::Full => {
                use rand::Rng;
                let high = delay.as_millis() as u64;
                if high == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::rng().random_range(0..=high))
                }
            }
            #[cfg(feature = "jitter")]
            JitterStrategy::Decorrelated => {
                use rand::Rng;
                let low = delay.as_millis() as u64;
                let high = previous.unwrap_or(delay).as_millis().saturating_mul(3) as u64;
                if high <= low {
                    delay
                } else {
                    Duration::from_millis(rand::rng().random_range(low..=high))
                }
            }
            #[cfg(not(feature = "jitter"))]
            JitterStrategy::Proportional(_)
            | JitterStrategy::Full
            | JitterStrategy::Decorrelated => delay,
        };

        match max_delay {
            Some(max) => jittered.min(max),
            None => jittered,
        }
    }
}

/// The nth Fibonacci number, saturating.
fn fibonacci(n: u32) -> u32 {
    if n == 0 {
        return 0;
    }
    let (mut a, mut b) = (0u32, 1u32);
    for _ in 1..n {
        let next = a.saturating_add(b);
        a = b;
        b = next;
    }
    b
}

#[cfg(test)]
mod policy_tests {
    use super::*;

    fn millis(values: &[u64]) -> Vec<Duration> {
        values.iter().copied().map(Duration::from_millis).collect()
    }

    #[test]
    fn test_spaced_delays() {
        let schedule = Schedule::spaced(Duration::from_millis(100)).with_recurs(3);
        assert_eq!(schedule.iter().collect::<Vec<_>>(), millis(&[100, 100, 100]));
    }

    #[test]
    fn test_linear_delays() {
        let schedule = Schedule::linear(Duration::from_millis(100)).with_recurs(4);
        assert_eq!(
            schedule.iter().collect::<Vec<_>>(),
            millis(&[100, 200, 300, 400])
        );
    }

    #[test]
    fn test_fibonacci_delays() {
        let schedule = Schedule::fibonacci(Duration::from_millis(100)).with_recurs(6);
        assert_eq!(
            schedule.iter().collect::<Vec<_>>(),
            millis(&[100, 100, 200, 300, 500, 800])
        );
    }

    #[test]
    fn test_forever_is_unbounded_and_zero() {
        let schedule = Schedule::forever();
        assert!(!schedule.is_finite());
        assert!(schedule.iter().take(1000).all(|delay| delay.is_zero()));
        assert_eq!(schedule.iter().take(1000).count(), 1000);
    }

    #[test]
    fn test_never_yields_nothing() {
        assert_eq!(Schedule::never().iter().next(), None);
        assert!(Schedule::never().is_finite());
    }

    #[test]
    fn test_times_counts_total_runs() {
        assert_eq!(Schedule::times(3).iter().count(), 2);
        assert_eq!(Schedule::times(1).iter().count(), 0);
        assert_eq!(Schedule::times(0).iter().count(), 0);
    }

    #[test]
    fn test_iteration_restarts() {
        let schedule = Schedule::linear(Duration::from_millis(10)).with_recurs(2);
        let first: Vec<_> = schedule.iter().collect();
        let second: Vec<_> = (&schedule).into_iter().collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_iterator_is_fused_after_budget() {
        let mut iter = Schedule::spaced(Duration::from_millis(300))
            .with_max_cumulative(Duration::from_millis(700))
            .iter();
        assert_eq!(iter.next(), Some(Duration::from_millis(300)));
        assert_eq!(iter.next(), Some(Duration::from_millis(300)));
        assert_eq!(iter.next(), None);
        assert_eq!(iter.next(), None);
    }

    #[test]
    fn test_exponential_saturates_instead_of_overflowing() {
        let schedule = Schedule::exponential(Duration::from_secs(1));
        assert!(schedule.delay_for(200).is_some());
    }

    #[test]
    fn test_size_hint_follows_recurs() {
        let mut iter = Schedule::recurs(3).iter();
        assert_eq!(iter.size_hint(), (0, Some(3)));
        iter.next();
        assert_eq!(iter.size_hint(), (0, Some(2)));
    }

    #[test]
    fn test_fibonacci_function() {
        let values: Vec<u32> = (0..8).map(fibonacci).collect();
        assert_eq!(values, vec![0, 1, 1, 2, 3, 5, 8, 13]);
    }

    #[test]
    fn test_jitter_none_returns_delay() {
        let delay = Duration::from_millis(100);
        assert_eq!(JitterStrategy::None.apply(delay, None, None), delay);
    }

    #[test]
    fn test_jitter_respects_max_delay() {
        let delay = Duration::from_millis(100);
        let capped = JitterStrategy::Decorrelated.apply(
            delay,
            Some(Duration::from_secs(10)),
            Some(Duration::from_millis(150)),
        );
        assert!(capped <= Duration::from_millis(150));
    }

    #[test]
    fn test_with_jitter_clamps_factor() {
        let schedule = Schedule::spaced(Duration::from_millis(10)).with_jitter(4.0);
        assert_eq!(schedule.jitter(), &JitterStrategy::Proportional(1.0));
    }

    #[test]
    fn test_with_jitter_nan_means_none() {
        let schedule = Schedule::spaced(Duration::from_millis(10))
            .with_jitter(f64::NAN)
            .with_recurs(3);
        assert_eq!(schedule.jitter(), &JitterStrategy::Proportional(0.0));
        assert!(schedule.iter().all(|delay| delay == Duration::from_millis(10)));
    }

    #[cfg(feature = "jitter")]
    #[test]
    fn test_full_jitter_stays_in_range() {
        let schedule = Schedule::spaced(Duration::from_millis(100))
            .with_full_jitter()
            .with_recurs(50);
        assert!(schedule.iter().all(|delay| delay <= Duration::from_millis(100)));
    }

    #[cfg(feature = "serde")]
    #[test]
    fn test_schedule_serde_round_trip() {
        let schedule = Schedule::exponential(Duration::from_millis(50))
            .with_recurs(5)
            .with_max_delay(Duration::from_secs(1));
        let json = serde_json::to_string(&schedule).unwrap();
        let restored: Schedule = serde_json::from_str(&json).unwrap();
        assert_eq!(schedule, restored);
    }
}
