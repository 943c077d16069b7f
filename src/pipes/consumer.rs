//! Consumers: stages that only await.

use std::fmt;
use std::ops::BitAnd;

use crate::effect::Effect as Step;
use crate::pipes::{Effect, Pipe, Producer};
use crate::proxy::{Environment, Payload, Proxy, Void};

/// A stage that awaits `IN` values from upstream and finishes with `A`.
pub struct Consumer<IN, A, E, Env = ()> {
    inner: Proxy<(), IN, (), Void, A, E, Env>,
}

impl<IN, A, E, Env> fmt::Debug for Consumer<IN, A, E, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Consumer").field(&self.inner).finish()
    }
}

impl<IN, E, Env> Consumer<IN, IN, E, Env>
where
    IN: Payload,
    E: Payload,
    Env: Environment,
{
    /// Wait for the next upstream value.
    pub fn await_() -> Self {
        Self::from_proxy(Proxy::request(()))
    }
}

impl<IN, A, E, Env> Consumer<IN, A, E, Env>
where
    IN: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    /// Wrap a proxy of the consumer shape.
    pub fn from_proxy(inner: Proxy<(), IN, (), Void, A, E, Env>) -> Self {
        Self { inner }
    }

    /// The underlying proxy.
    pub fn into_proxy(self) -> Proxy<(), IN, (), Void, A, E, Env> {
        self.inner
    }

    /// Finish without awaiting.
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

    /// Continue with `f` once this consumer finishes.
    pub fn bind<B, F>(self, f: F) -> Consumer<IN, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> Consumer<IN, B, E, Env> + Send + 'static,
    {
        Consumer::from_proxy(self.inner.bind(move |result| f(result).inner))
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Consumer<IN, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Consumer::from_proxy(self.inner.map(f))
    }

    /// Hand the following upstream values to `next`.
    pub fn then<B: Payload>(self, next: Consumer<IN, B, E, Env>) -> Consumer<IN, B, E, Env> {
        Consumer::from_proxy(self.inner.then(next.inner))
    }

    /// Answer the first await with `value` and close the pipeline.
    ///
    /// The result is `Some` if the consumer finished with that one value, and
    /// `None` if it awaited again.
    pub fn feed(self, value: IN) -> Effect<Option<A>, E, Env> {
        Producer::yield_(value).map(|()| None).sink(self.map(Some))
    }

    /// Answer every await with the result of a fresh step from `make`.
    pub fn fed_by<F, Eff>(self, make: F) -> Effect<A, E, Env>
    where
        F: Fn() -> Eff + Send + Sync + 'static,
        Eff: Step<Output = IN, Error = E, Env = Env> + 'static,
    {
        Effect::from_proxy(self.inner.replace_request(move |()| Proxy::lift(make())))
    }

    /// View this consumer as a pipe that never yields.
    pub fn into_pipe<OUT: Payload>(self) -> Pipe<IN, OUT, A, E, Env> {
        Pipe::from_proxy(self.inner.replace_respond(|never: Void| match never {}))
    }
}

/// Wait for the next upstream value.
pub fn await_<IN, E, Env>() -> Consumer<IN, IN, E, Env>
where
    IN: Payload,
    E: Payload,
    Env: Environment,
{
    Consumer::await_()
}

/// Await `count` values and fold them into one result.
///
/// # Example
///
/// ```rust
/// use millrace::pipes::consumer;
///
/// # tokio_test::block_on(async {
/// let sum = consumer::fold_n(2, 0, |acc, n: i32| acc + n);
/// let partial = sum.feed(5).run(&()).await;
/// // one value is not enough
/// assert_eq!(partial, Ok::<_, String>(None));
/// # });
/// ```
pub fn fold_n<IN, B, E, Env, F>(count: usize, init: B, f: F) -> Consumer<IN, B, E, Env>
where
    IN: Payload,
    B: Payload,
    E: Payload,
    Env: Environment,
    F: Fn(B, IN) -> B + Send + 'static,
{
    if count == 0 {
        return Consumer::pure(init);
    }
    Consumer::await_().bind(move |value| {
        let acc = f(init, value);
        fold_n(count - 1, acc, f)
    })
}

/// Run a fresh step from `body` for every upstream value, forever.
pub fn for_each<IN, A, E, Env, F, Eff>(body: F) -> Consumer<IN, A, E, Env>
where
    IN: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
    F: Fn(IN) -> Eff + Send + 'static,
    Eff: Step<Output = (), Error = E, Env = Env> + 'static,
{
    Consumer::await_().bind(move |value| {
        let step = body(value);
        Consumer::lift(step).bind(move |()| for_each(body))
    })
}

/// Await and discard every upstream value, forever.
pub fn drain<IN, A, E, Env>() -> Consumer<IN, A, E, Env>
where
    IN: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    Consumer::await_().bind(|_: IN| drain())
}

impl<IN, A, B, E, Env> BitAnd<Consumer<IN, B, E, Env>> for Consumer<IN, A, E, Env>
where
    IN: Payload,
    A: Payload,
    B: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Consumer<IN, B, E, Env>;

    fn bitand(self, next: Consumer<IN, B, E, Env>) -> Self::Output {
        self.then(next)
    }
}
