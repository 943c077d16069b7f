//! Producers: stages that only yield.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::effect::Effect as Step;
use crate::error::Cancelled;
use crate::pipes::{Consumer, Effect, Pipe};
use crate::proxy::{compose, Environment, Payload, Proxy, Void};
use crate::runtime::{cancellable, HasCancel};

/// A stage that yields `OUT` values downstream and finishes with `A`.
pub struct Producer<OUT, A, E, Env = ()> {
    inner: Proxy<Void, (), (), OUT, A, E, Env>,
}

/// One step of pulling from a producer by hand.
pub enum Next<OUT, A, E, Env = ()> {
    /// The producer yielded a value; the rest of it is returned alongside.
    Yielded(OUT, Producer<OUT, A, E, Env>),
    /// The producer finished.
    Done(A),
}

impl<OUT, A, E, Env> fmt::Debug for Producer<OUT, A, E, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Producer").field(&self.inner).finish()
    }
}

impl<OUT: fmt::Debug, A: fmt::Debug, E, Env> fmt::Debug for Next<OUT, A, E, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Next::Yielded(value, _) => f.debug_tuple("Yielded").field(value).finish(),
            Next::Done(result) => f.debug_tuple("Done").field(result).finish(),
        }
    }
}

impl<OUT, E, Env> Producer<OUT, (), E, Env>
where
    OUT: Payload,
    E: Payload,
    Env: Environment,
{
    /// Yield one value.
    pub fn yield_(value: OUT) -> Self {
        Self::from_proxy(Proxy::respond(value))
    }
}

impl<OUT, A, E, Env> Producer<OUT, A, E, Env>
where
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    /// Wrap a proxy of the producer shape.
    pub fn from_proxy(inner: Proxy<Void, (), (), OUT, A, E, Env>) -> Self {
        Self { inner }
    }

    /// The underlying proxy.
    pub fn into_proxy(self) -> Proxy<Void, (), (), OUT, A, E, Env> {
        self.inner
    }

    /// Finish without yielding.
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

    /// Continue with `f` once this producer finishes.
    pub fn bind<B, F>(self, f: F) -> Producer<OUT, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> Producer<OUT, B, E, Env> + Send + 'static,
    {
        Producer::from_proxy(self.inner.bind(move |result| f(result).inner))
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Producer<OUT, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Producer::from_proxy(self.inner.map(f))
    }

    /// Yield everything `next` yields after this producer.
    pub fn then<B: Payload>(self, next: Producer<OUT, B, E, Env>) -> Producer<OUT, B, E, Env> {
        Producer::from_proxy(self.inner.then(next.inner))
    }

    /// Feed every yielded value through `pipe`.
    pub fn pipe<NEXT: Payload>(
        self,
        pipe: Pipe<OUT, NEXT, A, E, Env>,
    ) -> Producer<NEXT, A, E, Env> {
        Producer::from_proxy(compose(self.inner, pipe.into_proxy()))
    }

    /// Connect to `consumer`, closing the pipeline.
    pub fn sink(self, consumer: Consumer<OUT, A, E, Env>) -> Effect<A, E, Env> {
        Effect::from_proxy(compose(self.inner, consumer.into_proxy()))
    }

    /// Run `body` for every yielded value.
    ///
    /// Unlike [`sink`](Self::sink), the producer decides when to stop.
    pub fn for_each<F>(self, body: F) -> Effect<A, E, Env>
    where
        F: Fn(OUT) -> Effect<(), E, Env> + Send + Sync + 'static,
    {
        Effect::from_proxy(self.inner.for_each(move |value| body(value).into_proxy()))
    }

    /// View this producer as a pipe that never awaits.
    pub fn into_pipe<IN: Payload>(self) -> Pipe<IN, OUT, A, E, Env> {
        Pipe::from_proxy(self.inner.replace_request(|never: Void| match never {}))
    }

    /// Run until the next yield.
    ///
    /// The rest of the producer is returned untouched, so nothing past the
    /// yielded value has been evaluated.
    pub async fn next(self, env: &Env) -> Result<Next<OUT, A, E, Env>, E>
    where
        E: From<Cancelled>,
        Env: HasCancel,
    {
        let mut node = self.inner;
        loop {
            match node {
                Proxy::Respond(value, rest) => {
                    let rest = Proxy::suspend(move || rest(()));
                    return Ok(Next::Yielded(value, Producer::from_proxy(rest)));
                }
                Proxy::Pure(result) => return Ok(Next::Done(result)),
                Proxy::Lift(step) => {
                    node = cancellable(env, step.run(env)).await.map_err(E::from)??;
                }
                Proxy::Bind(bound) => node = bound.resume(),
                Proxy::Request(never, _) => match never {},
            }
        }
    }

    /// Drive the producer to the end, folding every yielded value.
    ///
    /// Returns the accumulator together with the producer's own result.
    pub async fn fold<B, F>(self, env: &Env, init: B, mut f: F) -> Result<(B, A), E>
    where
        F: FnMut(B, OUT) -> B,
        E: From<Cancelled>,
        Env: HasCancel,
    {
        let mut acc = init;
        let mut node = self.inner;
        loop {
            match node {
                Proxy::Respond(value, rest) => {
                    acc = f(acc, value);
                    node = rest(());
                }
                Proxy::Pure(result) => return Ok((acc, result)),
                Proxy::Lift(step) => {
                    node = cancellable(env, step.run(env)).await.map_err(E::from)??;
                }
                Proxy::Bind(bound) => node = bound.resume(),
                Proxy::Request(never, _) => match never {},
            }
        }
    }

    /// Drive the producer to the end, collecting every yielded value.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millrace::pipes::{pipe, producer};
    ///
    /// # tokio_test::block_on(async {
    /// let evens = producer::yield_all(1..=6) | pipe::filter(|n: &i32| n % 2 == 0);
    /// let (values, ()) = evens.collect(&()).await.map_err(|e: String| e).unwrap();
    /// assert_eq!(values, vec![2, 4, 6]);
    /// # });
    /// ```
    pub async fn collect(self, env: &Env) -> Result<(Vec<OUT>, A), E>
    where
        E: From<Cancelled>,
        Env: HasCancel,
    {
        self.fold(env, Vec::new(), |mut values, value| {
            values.push(value);
            values
        })
        .await
    }
}

/// Yield one value.
pub fn yield_<OUT, E, Env>(value: OUT) -> Producer<OUT, (), E, Env>
where
    OUT: Payload,
    E: Payload,
    Env: Environment,
{
    Producer::yield_(value)
}

/// Yield every value of `values`, in order.
///
/// The iterator is advanced only when downstream asks for the next value, so
/// infinite iterators are fine.
pub fn yield_all<I, E, Env>(values: I) -> Producer<I::Item, (), E, Env>
where
    I: IntoIterator,
    I::IntoIter: Send + 'static,
    I::Item: Payload,
    E: Payload,
    Env: Environment,
{
    let iter = values.into_iter();
    Producer::from_proxy(Proxy::suspend(move || yield_rest(iter)))
}

fn yield_rest<It, E, Env>(mut iter: It) -> Proxy<Void, (), (), It::Item, (), E, Env>
where
    It: Iterator + Send + 'static,
    It::Item: Payload,
    E: Payload,
    Env: Environment,
{
    match iter.next() {
        Some(value) => Proxy::Respond(value, Box::new(move |()| yield_rest(iter))),
        None => Proxy::Pure(()),
    }
}

/// Run a fresh step from `make` and yield its result, forever.
///
/// The first step failure ends the pipeline with that error.
pub fn repeat<OUT, A, E, Env, F, Eff>(make: F) -> Producer<OUT, A, E, Env>
where
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
    F: Fn() -> Eff + Send + 'static,
    Eff: Step<Output = OUT, Error = E, Env = Env> + 'static,
{
    Producer::lift(make()).bind(move |value| Producer::yield_(value).bind(move |()| repeat(make)))
}

impl<OUT, A, B, E, Env> BitAnd<Producer<OUT, B, E, Env>> for Producer<OUT, A, E, Env>
where
    OUT: Payload,
    A: Payload,
    B: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Producer<OUT, B, E, Env>;

    fn bitand(self, next: Producer<OUT, B, E, Env>) -> Self::Output {
        self.then(next)
    }
}

impl<OUT, NEXT, A, E, Env> BitOr<Pipe<OUT, NEXT, A, E, Env>> for Producer<OUT, A, E, Env>
where
    OUT: Payload,
    NEXT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Producer<NEXT, A, E, Env>;

    fn bitor(self, pipe: Pipe<OUT, NEXT, A, E, Env>) -> Self::Output {
        self.pipe(pipe)
    }
}

impl<OUT, A, E, Env> BitOr<Consumer<OUT, A, E, Env>> for Producer<OUT, A, E, Env>
where
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Effect<A, E, Env>;

    fn bitor(self, consumer: Consumer<OUT, A, E, Env>) -> Self::Output {
        self.sink(consumer)
    }
}
