//! Repeat and retry drivers.
//!
//! Every driver takes a factory rather than an effect: effects are consumed
//! when they run, so each run gets a fresh one. A drive goes through these
//! states until it is done:
//!
//! 1. run a fresh effect
//! 2. decide from the outcome whether to go again (repeat drivers go again on
//!    success, retry drivers on failure, each optionally gated by a predicate)
//! 3. take the next delay from the schedule; an exhausted schedule ends the
//!    drive
//! 4. wait the delay, then go back to 1
//!
//! A drive ends with the outcome of its last run, unchanged. Cancellation,
//! observed while running or while waiting, ends it with `E::from(Cancelled)`.

use std::time::Duration;

use tokio::time::Instant;

use crate::effect::{from_async, BoxedEffect, Effect, EffectExt};
use crate::error::Cancelled;
use crate::proxy::Payload;
use crate::runtime::{cancellable, CancellationToken, HasCancel};
use crate::schedule::Schedule;

/// Information about a failed run, passed to retry hooks.
#[derive(Debug, Clone)]
pub struct DriveEvent<'a, E> {
    /// Which run just failed (1-indexed).
    pub attempt: u32,
    /// The error from the failed run.
    pub error: &'a E,
    /// Delay before the next run, or `None` if the schedule is exhausted.
    pub next_delay: Option<Duration>,
    /// Total elapsed time since the first run started.
    pub elapsed: Duration,
}

type Hook<E> = Box<dyn Fn(&DriveEvent<'_, E>) + Send + Sync>;

/// Which outcome sends the drive around again.
enum Gate<T, E> {
    OnSuccess(Box<dyn Fn(&T) -> bool + Send + Sync>),
    OnFailure(Box<dyn Fn(&E) -> bool + Send + Sync>),
}

impl<T, E> Gate<T, E> {
    fn again(&self, outcome: &Result<T, E>) -> bool {
        match (self, outcome) {
            (Gate::OnSuccess(pred), Ok(value)) => pred(value),
            (Gate::OnFailure(pred), Err(error)) => pred(error),
            _ => false,
        }
    }
}

/// Run `make()` again after every success, for as long as `schedule` lasts.
///
/// The first failure ends the drive. Otherwise the result is the value of
/// the last run.
///
/// # Example
///
/// ```rust
/// use std::sync::atomic::{AtomicU32, Ordering};
/// use std::sync::Arc;
/// use millrace::effect::{from_fn, Effect};
/// use millrace::schedule::{driver, Schedule};
///
/// # tokio_test::block_on(async {
/// let calls = Arc::new(AtomicU32::new(0));
/// let counter = calls.clone();
/// let effect = driver::repeat(
///     move || {
///         let counter = counter.clone();
///         from_fn(move |_: &()| Ok::<_, String>(counter.fetch_add(1, Ordering::SeqCst)))
///     },
///     Schedule::times(3),
/// );
///
/// assert_eq!(effect.run(&()).await, Ok(2));
/// assert_eq!(calls.load(Ordering::SeqCst), 3);
/// # });
/// ```
pub fn repeat<T, E, Env, F, Eff>(make: F, schedule: Schedule) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
{
    drive_effect(make, schedule, Gate::OnSuccess(Box::new(|_: &T| true)), None)
}

/// Like [`repeat`], but only go again while `pred` holds for the last value.
pub fn repeat_while<T, E, Env, F, Eff, P>(
    make: F,
    schedule: Schedule,
    pred: P,
) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    drive_effect(make, schedule, Gate::OnSuccess(Box::new(pred)), None)
}

/// Like [`repeat`], but stop as soon as `pred` holds for the last value.
pub fn repeat_until<T, E, Env, F, Eff, P>(
    make: F,
    schedule: Schedule,
    pred: P,
) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    P: Fn(&T) -> bool + Send + Sync + 'static,
{
    drive_effect(
        make,
        schedule,
        Gate::OnSuccess(Box::new(move |value: &T| !pred(value))),
        None,
    )
}

/// Run `make()` again after every failure, for as long as `schedule` lasts.
///
/// The first success ends the drive. If the schedule runs out first, the
/// last error is returned.
pub fn retry<T, E, Env, F, Eff>(make: F, schedule: Schedule) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
{
    drive_effect(make, schedule, Gate::OnFailure(Box::new(|_: &E| true)), None)
}

/// Like [`retry`], but only retry errors for which `pred` holds.
///
/// Any other error is returned at once.
///
/// # Example
///
/// ```rust
/// use std::time::Duration;
/// use millrace::effect::{fail, Effect};
/// use millrace::schedule::{driver, Schedule};
///
/// #[derive(Debug, PartialEq)]
/// enum AppError { Transient, Permanent, Cancelled }
///
/// impl From<millrace::Cancelled> for AppError {
///     fn from(_: millrace::Cancelled) -> Self { AppError::Cancelled }
/// }
///
/// # tokio_test::block_on(async {
/// let effect = driver::retry_while(
///     || fail::<(), _, ()>(AppError::Permanent),
///     Schedule::spaced(Duration::from_millis(10)).with_recurs(3),
///     |err| matches!(err, AppError::Transient),
/// );
///
/// assert_eq!(effect.run(&()).await, Err(AppError::Permanent));
/// # });
/// ```
pub fn retry_while<T, E, Env, F, Eff, P>(
    make: F,
    schedule: Schedule,
    pred: P,
) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    P: Fn(&E) -> bool + Send + Sync + 'static,
{
    drive_effect(make, schedule, Gate::OnFailure(Box::new(pred)), None)
}

/// Like [`retry`], but give up as soon as `pred` holds for the error.
pub fn retry_until<T, E, Env, F, Eff, P>(
    make: F,
    schedule: Schedule,
    pred: P,
) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    P: Fn(&E) -> bool + Send + Sync + 'static,
{
    drive_effect(
        make,
        schedule,
        Gate::OnFailure(Box::new(move |error: &E| !pred(error))),
        None,
    )
}

/// Like [`retry`], calling `on_retry` after every failed run.
///
/// The hook runs before the delay and also after the last failure, with
/// `next_delay: None`. It is synchronous and should not block.
pub fn retry_with_hooks<T, E, Env, F, Eff, H>(
    make: F,
    schedule: Schedule,
    on_retry: H,
) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    H: Fn(&DriveEvent<'_, E>) + Send + Sync + 'static,
{
    drive_effect(
        make,
        schedule,
        Gate::OnFailure(Box::new(|_: &E| true)),
        Some(Box::new(on_retry)),
    )
}

fn drive_effect<T, E, Env, F, Eff>(
    make: F,
    schedule: Schedule,
    gate: Gate<T, E>,
    hook: Option<Hook<E>>,
) -> BoxedEffect<T, E, Env>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
{
    from_async(move |env: &Env| {
        let env = env.clone();
        async move { drive(&make, &schedule, &gate, hook.as_ref(), &env).await }
    })
    .boxed()
}

async fn drive<T, E, Env, F, Eff>(
    make: &F,
    schedule: &Schedule,
    gate: &Gate<T, E>,
    hook: Option<&Hook<E>>,
    env: &Env,
) -> Result<T, E>
where
    T: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
    F: Fn() -> Eff + Send + Sync,
    Eff: Effect<Output = T, Error = E, Env = Env>,
{
    let start = Instant::now();
    let mut delays = schedule.iter();
    let mut attempt: u32 = 0;

    loop {
        attempt = attempt.saturating_add(1);
        let outcome = match cancellable(env, make().run(env)).await {
            Ok(outcome) => outcome,
            Err(cancelled) => {
                tracing::debug!(attempt, "drive cancelled while running");
                return Err(E::from(cancelled));
            }
        };
        // A run that observed the token itself reports the cancellation as
        // its own error.
        if env.cancellation().is_some_and(CancellationToken::is_cancelled) {
            tracing::debug!(attempt, "drive cancelled while running");
            return Err(E::from(Cancelled));
        }

        if !gate.again(&outcome) {
            tracing::debug!(attempt, succeeded = outcome.is_ok(), "drive finished");
            return outcome;
        }

        let next_delay = delays.next();
        if let (Some(hook), Err(error)) = (hook, &outcome) {
            hook(&DriveEvent {
                attempt,
                error,
                next_delay,
                elapsed: start.elapsed(),
            });
        }

        let Some(delay) = next_delay else {
            tracing::debug!(attempt, succeeded = outcome.is_ok(), "schedule exhausted");
            return outcome;
        };
        drop(outcome);

        tracing::debug!(attempt, ?delay, "running again after delay");
        if delay.is_zero() {
            tokio::task::yield_now().await;
        } else if let Err(cancelled) = cancellable(env, tokio::time::sleep(delay)).await {
            tracing::debug!(attempt, "drive cancelled while waiting");
            return Err(E::from(cancelled));
        }
    }
}
