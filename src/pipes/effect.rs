//! Closed pipelines.

use std::fmt;
use std::future::Future;
use std::ops::BitAnd;

use crate::effect::Effect as Step;
use crate::error::Cancelled;
use crate::proxy::{Environment, Payload, Proxy, Void};
use crate::runtime::{run_effect, HasCancel};

/// A pipeline with both ends closed, ready to run.
///
/// A closed pipeline is itself a step: it implements
/// [`effect::Effect`](crate::effect::Effect), so it can be boxed, timed out,
/// instrumented, or handed to a [schedule driver](crate::schedule::driver).
pub struct Effect<A, E, Env = ()> {
    inner: Proxy<Void, (), (), Void, A, E, Env>,
}

impl<A, E, Env> fmt::Debug for Effect<A, E, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Effect").field(&self.inner).finish()
    }
}

impl<A, E, Env> Effect<A, E, Env>
where
    A: Payload,
    E: Payload,
    Env: Environment,
{
    /// Wrap a closed proxy.
    pub fn from_proxy(inner: Proxy<Void, (), (), Void, A, E, Env>) -> Self {
        Self { inner }
    }

    /// The underlying proxy.
    pub fn into_proxy(self) -> Proxy<Void, (), (), Void, A, E, Env> {
        self.inner
    }

    /// Finish immediately with `value`.
    pub fn pure(value: A) -> Self {
        Self::from_proxy(Proxy::pure(value))
    }

    /// Run one step and finish with its result.
    pub fn lift<Eff>(step: Eff) -> Self
    where
        Eff: Step<Output = A, Error = E, Env = Env> + 'static,
    {
        Self::from_proxy(Proxy::lift(step))
    }

    /// Continue with `f` once this pipeline finishes.
    pub fn bind<B, F>(self, f: F) -> Effect<B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> Effect<B, E, Env> + Send + 'static,
    {
        Effect::from_proxy(self.inner.bind(move |result| f(result).inner))
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Effect<B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Effect::from_proxy(self.inner.map(f))
    }

    /// Run `next` after this pipeline, discarding this pipeline's result.
    pub fn then<B: Payload>(self, next: Effect<B, E, Env>) -> Effect<B, E, Env> {
        Effect::from_proxy(self.inner.then(next.inner))
    }

    /// Fuse consecutive lifted steps. See [`Proxy::observe`].
    pub fn observe(self) -> Self {
        Self::from_proxy(self.inner.observe())
    }

    /// Run the pipeline to completion with the [engine](crate::runtime::run_effect).
    pub async fn run(self, env: &Env) -> Result<A, E>
    where
        E: From<Cancelled>,
        Env: HasCancel,
    {
        run_effect(self, env).await
    }
}

impl<A, E, Env> Step for Effect<A, E, Env>
where
    A: Payload,
    E: Payload + From<Cancelled>,
    Env: HasCancel,
{
    type Output = A;
    type Error = E;
    type Env = Env;

    fn run(self, env: &Env) -> impl Future<Output = Result<A, E>> + Send {
        run_effect(self, env)
    }
}

impl<A, B, E, Env> BitAnd<Effect<B, E, Env>> for Effect<A, E, Env>
where
    A: Payload,
    B: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Effect<B, E, Env>;

    fn bitand(self, next: Effect<B, E, Env>) -> Self::Output {
        self.then(next)
    }
}
