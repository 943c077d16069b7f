//! The loop that runs closed pipelines.

use std::ops::Deref;

use crate::effect::Effect as Step;
use crate::error::Cancelled;
use crate::pipes::Effect;
use crate::proxy::{Environment, Payload, Proxy};
use crate::runtime::cancel::{cancellable, CancellationToken, HasCancel};

/// Run a closed pipeline to completion.
///
/// Each `Lift` step is raced against the environment's cancellation token,
/// and the token is checked again before the next step starts. The first
/// step failure ends the run with that error. Cancellation ends it with
/// `E::from(Cancelled)`.
///
/// # Example
///
/// ```rust
/// use millrace::pipes::{consumer, producer};
/// use millrace::runtime::run_effect;
///
/// # tokio_test::block_on(async {
/// let pipeline = producer::yield_all(vec![1, 2, 3]).map(|()| 0)
///     | consumer::fold_n(3, 0, |acc, n: i32| acc + n);
///
/// let total: Result<i32, String> = run_effect(pipeline, &()).await;
/// assert_eq!(total, Ok(6));
/// # });
/// ```
pub async fn run_effect<A, E, Env>(effect: Effect<A, E, Env>, env: &Env) -> Result<A, E>
where
    A: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
{
    let mut node = effect.into_proxy();
    let mut steps: u64 = 0;

    loop {
        match node {
            Proxy::Pure(result) => {
                tracing::trace!(steps, "pipeline finished");
                return Ok(result);
            }
            Proxy::Lift(step) => {
                steps += 1;
                node = match cancellable(env, step.run(env)).await {
                    Ok(Ok(next)) => next,
                    Ok(Err(error)) => {
                        tracing::trace!(steps, "pipeline step failed");
                        return Err(error);
                    }
                    Err(cancelled) => {
                        tracing::debug!(steps, "pipeline cancelled");
                        return Err(E::from(cancelled));
                    }
                };
            }
            Proxy::Bind(bound) => node = bound.resume(),
            Proxy::Request(never, _) => match never {},
            Proxy::Respond(never, _) => match never {},
        }
    }
}

/// An environment paired with a cancellation token.
///
/// Lifted steps see the runtime itself as their environment and reach the
/// wrapped value through `Deref`. Cancelling the runtime stops every pipeline
/// and scheduled drive running in it at their next step or delay.
///
/// # Example
///
/// ```rust
/// use millrace::effect::{from_fn, EffectExt};
/// use millrace::runtime::Runtime;
///
/// #[derive(Clone)]
/// struct Config { retries: u32 }
///
/// # tokio_test::block_on(async {
/// let runtime = Runtime::new(Config { retries: 3 });
/// let step = from_fn(|rt: &Runtime<Config>| Ok::<_, String>(rt.retries * 2));
///
/// assert_eq!(runtime.run(step).await, Ok(6));
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct Runtime<Env> {
    env: Env,
    cancel: CancellationToken,
}

impl<Env: Environment> Runtime<Env> {
    /// Wrap `env` with a fresh cancellation token.
    pub fn new(env: Env) -> Self {
        Self::with_cancellation(env, CancellationToken::new())
    }

    /// Wrap `env` with an existing token, shared with whoever holds a clone.
    pub fn with_cancellation(env: Env, cancel: CancellationToken) -> Self {
        Self { env, cancel }
    }

    /// The wrapped environment.
    pub fn env(&self) -> &Env {
        &self.env
    }

    /// The token this runtime observes.
    pub fn cancellation_token(&self) -> &CancellationToken {
        &self.cancel
    }

    /// Cancel everything running in this runtime.
    pub fn cancel(&self) {
        self.cancel.cancel();
    }

    /// Run any step, closed pipelines included, in this runtime.
    pub async fn run<Eff, A, E>(&self, step: Eff) -> Result<A, E>
    where
        Eff: Step<Output = A, Error = E, Env = Self>,
        E: From<Cancelled>,
    {
        cancellable(self, step.run(self)).await.map_err(E::from)?
    }
}

impl<Env> Deref for Runtime<Env> {
    type Target = Env;

    fn deref(&self) -> &Env {
        &self.env
    }
}

impl<Env: Environment> HasCancel for Runtime<Env> {
    fn cancellation(&self) -> Option<&CancellationToken> {
        Some(&self.cancel)
    }
}
