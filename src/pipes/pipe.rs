//! Pipes: stages that await and yield.
//!
//! The functions in this module are the stock stages. Infinite stages are
//! generic in their result type so they fit in front of, or behind, any
//! other stage.

use std::fmt;
use std::ops::{BitAnd, BitOr};

use crate::effect::Effect as Step;
use crate::pipes::Consumer;
use crate::proxy::{compose, Environment, Payload, Proxy};

/// A stage that awaits `IN` values, yields `OUT` values, and finishes with `A`.
pub struct Pipe<IN, OUT, A, E, Env = ()> {
    inner: Proxy<(), IN, (), OUT, A, E, Env>,
}

impl<IN, OUT, A, E, Env> fmt::Debug for Pipe<IN, OUT, A, E, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Pipe").field(&self.inner).finish()
    }
}

impl<IN, OUT, E, Env> Pipe<IN, OUT, IN, E, Env>
where
    IN: Payload,
    OUT: Payload,
    E: Payload,
    Env: Environment,
{
    /// Wait for the next upstream value.
    pub fn await_() -> Self {
        Self::from_proxy(Proxy::request(()))
    }
}

impl<IN, OUT, E, Env> Pipe<IN, OUT, (), E, Env>
where
    IN: Payload,
    OUT: Payload,
    E: Payload,
    Env: Environment,
{
    /// Yield one value downstream.
    pub fn yield_(value: OUT) -> Self {
        Self::from_proxy(Proxy::respond(value))
    }
}

impl<IN, OUT, A, E, Env> Pipe<IN, OUT, A, E, Env>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    /// Wrap a proxy of the pipe shape.
    pub fn from_proxy(inner: Proxy<(), IN, (), OUT, A, E, Env>) -> Self {
        Self { inner }
    }

    /// The underlying proxy.
    pub fn into_proxy(self) -> Proxy<(), IN, (), OUT, A, E, Env> {
        self.inner
    }

    /// Finish without awaiting or yielding.
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

    /// Continue with `f` once this pipe finishes.
    pub fn bind<B, F>(self, f: F) -> Pipe<IN, OUT, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> Pipe<IN, OUT, B, E, Env> + Send + 'static,
    {
        Pipe::from_proxy(self.inner.bind(move |result| f(result).inner))
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Pipe<IN, OUT, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        Pipe::from_proxy(self.inner.map(f))
    }

    /// Run `next` after this pipe, discarding this pipe's result.
    pub fn then<B: Payload>(self, next: Pipe<IN, OUT, B, E, Env>) -> Pipe<IN, OUT, B, E, Env> {
        Pipe::from_proxy(self.inner.then(next.inner))
    }

    /// Feed every yielded value through `next`.
    pub fn pipe<NEXT: Payload>(
        self,
        next: Pipe<OUT, NEXT, A, E, Env>,
    ) -> Pipe<IN, NEXT, A, E, Env> {
        Pipe::from_proxy(compose(self.inner, next.inner))
    }

    /// Connect to `consumer`; the result still awaits `IN` values.
    pub fn sink(self, consumer: Consumer<OUT, A, E, Env>) -> Consumer<IN, A, E, Env> {
        Consumer::from_proxy(compose(self.inner, consumer.into_proxy()))
    }
}

/// Wait for the next upstream value.
pub fn await_<IN, OUT, E, Env>() -> Pipe<IN, OUT, IN, E, Env>
where
    IN: Payload,
    OUT: Payload,
    E: Payload,
    Env: Environment,
{
    Pipe::await_()
}

/// Yield one value downstream.
pub fn yield_<IN, OUT, E, Env>(value: OUT) -> Pipe<IN, OUT, (), E, Env>
where
    IN: Payload,
    OUT: Payload,
    E: Payload,
    Env: Environment,
{
    Pipe::yield_(value)
}

/// Pass every value through unchanged.
pub fn cat<T, A, E, Env>() -> Pipe<T, T, A, E, Env>
where
    T: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    Pipe::await_().bind(|value| Pipe::yield_(value).bind(|()| cat()))
}

/// Apply `f` to every value.
pub fn map<IN, OUT, A, E, Env, F>(f: F) -> Pipe<IN, OUT, A, E, Env>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
    F: Fn(IN) -> OUT + Send + 'static,
{
    Pipe::await_().bind(move |value| {
        let out = f(value);
        Pipe::yield_(out).bind(move |()| map(f))
    })
}

/// Pass on only the values `keep` accepts.
pub fn filter<T, A, E, Env, P>(keep: P) -> Pipe<T, T, A, E, Env>
where
    T: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
    P: Fn(&T) -> bool + Send + 'static,
{
    Pipe::await_().bind(move |value| {
        if keep(&value) {
            Pipe::yield_(value).bind(move |()| filter(keep))
        } else {
            filter(keep)
        }
    })
}

/// Pass on the first `count` values, then finish.
pub fn take<T, E, Env>(count: usize) -> Pipe<T, T, (), E, Env>
where
    T: Payload,
    E: Payload,
    Env: Environment,
{
    if count == 0 {
        return Pipe::pure(());
    }
    Pipe::await_().bind(move |value| Pipe::yield_(value).bind(move |()| take(count - 1)))
}

/// Run a fresh step from `f` for every value and yield its result.
pub fn map_m<IN, OUT, A, E, Env, F, Eff>(f: F) -> Pipe<IN, OUT, A, E, Env>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
    F: Fn(IN) -> Eff + Send + 'static,
    Eff: Step<Output = OUT, Error = E, Env = Env> + 'static,
{
    Pipe::await_().bind(move |value| {
        let step = f(value);
        Pipe::lift(step).bind(move |out| Pipe::yield_(out).bind(move |()| map_m(f)))
    })
}

/// Yield the running accumulation of every value, starting after the first.
pub fn scan<IN, B, A, E, Env, F>(init: B, f: F) -> Pipe<IN, B, A, E, Env>
where
    IN: Payload,
    B: Payload + Clone,
    A: Payload,
    E: Payload,
    Env: Environment,
    F: Fn(B, IN) -> B + Send + 'static,
{
    Pipe::await_().bind(move |value| {
        let acc = f(init, value);
        Pipe::yield_(acc.clone()).bind(move |()| scan(acc, f))
    })
}

impl<IN, OUT, A, B, E, Env> BitAnd<Pipe<IN, OUT, B, E, Env>> for Pipe<IN, OUT, A, E, Env>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    B: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Pipe<IN, OUT, B, E, Env>;

    fn bitand(self, next: Pipe<IN, OUT, B, E, Env>) -> Self::Output {
        self.then(next)
    }
}

impl<IN, MID, OUT, A, E, Env> BitOr<Pipe<MID, OUT, A, E, Env>> for Pipe<IN, MID, A, E, Env>
where
    IN: Payload,
    MID: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Pipe<IN, OUT, A, E, Env>;

    fn bitor(self, next: Pipe<MID, OUT, A, E, Env>) -> Self::Output {
        self.pipe(next)
    }
}

impl<IN, OUT, A, E, Env> BitOr<Consumer<OUT, A, E, Env>> for Pipe<IN, OUT, A, E, Env>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    type Output = Consumer<IN, A, E, Env>;

    fn bitor(self, consumer: Consumer<OUT, A, E, Env>) -> Self::Output {
        self.sink(consumer)
    }
}
