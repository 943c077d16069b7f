//! Environment-free consumers.
//!
//! Built from [`await_`](Consumer::await_), lifted steps and `bind`, then
//! lowered into a [`pipes::Consumer`] for whatever environment the pipeline
//! runs in.

use std::fmt;
use std::ops::BitAnd;

use crate::effect::{BoxedEffect, Effect as Step, EffectExt};
use crate::pipes;
use crate::proxy::bound::{erase, unerase, Value};
use crate::proxy::{Bound, Continuation, Environment, Payload, Proxy};
use crate::pure::Pipe;

/// An environment-free stage that awaits `IN` values and finishes with `A`.
pub enum Consumer<IN, A, E> {
    /// Finished.
    Pure(A),
    /// Run one step; its success value is the rest of the consumer.
    Lift(BoxedEffect<Self, E, ()>),
    /// Wait for the next upstream value.
    Await(Continuation<IN, Self>),
    /// Binds not yet applied.
    Bind(Bound<Consumer<IN, Value, E>, A>),
}

impl<IN, A: fmt::Debug, E> fmt::Debug for Consumer<IN, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Consumer::Pure(result) => f.debug_tuple("Pure").field(result).finish(),
            Consumer::Lift(_) => f.write_str("Lift"),
            Consumer::Await(_) => f.write_str("Await"),
            Consumer::Bind(bound) => f.debug_tuple("Bind").field(bound).finish(),
        }
    }
}

impl<IN: Payload, E: Payload> Consumer<IN, IN, E> {
    /// Wait for the next upstream value.
    pub fn await_() -> Self {
        Consumer::Await(Box::new(Consumer::Pure))
    }
}

impl<IN, A, E> Consumer<IN, A, E>
where
    IN: Payload,
    A: Payload,
    E: Payload,
{
    /// Finish immediately with `value`.
    pub fn pure(value: A) -> Self {
        Consumer::Pure(value)
    }

    /// Run one environment-free step and finish with its result.
    pub fn lift<Eff>(step: Eff) -> Self
    where
        Eff: Step<Output = A, Error = E, Env = ()> + 'static,
    {
        Consumer::Lift(step.map(Consumer::Pure).boxed())
    }

    /// Continue with `f` once this consumer finishes.
    pub fn bind<B, F>(self, f: F) -> Consumer<IN, B, E>
    where
        B: Payload,
        F: FnOnce(A) -> Consumer<IN, B, E> + Send + 'static,
    {
        match self {
            Consumer::Pure(result) => f(result),
            Consumer::Bind(bound) => {
                Consumer::Bind(bound.push(move |result| f(result).into_erased()))
            }
            node => {
                let bound = Bound::<_, A>::new(node.into_erased());
                Consumer::Bind(bound.push(move |result| f(result).into_erased()))
            }
        }
    }

    fn into_erased(self) -> Consumer<IN, Value, E> {
        match self {
            Consumer::Pure(result) => Consumer::Pure(erase(result)),
            Consumer::Lift(step) => Consumer::Lift(step.map(Consumer::into_erased).boxed()),
            Consumer::Await(next) => {
                Consumer::Await(Box::new(move |value| next(value).into_erased()))
            }
            Consumer::Bind(bound) => Consumer::Bind(bound.erase()),
        }
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Consumer<IN, B, E>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.bind(move |result| Consumer::Pure(f(result)))
    }

    /// Hand the following upstream values to `next`.
    pub fn then<B: Payload>(self, next: Consumer<IN, B, E>) -> Consumer<IN, B, E> {
        self.bind(move |_| next)
    }

    /// View this consumer as a pipe that never yields.
    pub fn into_pipe<OUT: Payload>(self) -> Pipe<IN, OUT, A, E> {
        match self {
            Consumer::Pure(result) => Pipe::Pure(result),
            Consumer::Lift(step) => Pipe::Lift(step.map(Consumer::into_pipe).boxed()),
            Consumer::Await(next) => Pipe::Await(Box::new(move |value| next(value).into_pipe())),
            Consumer::Bind(bound) => bound.resume().into_pipe(),
        }
    }

    /// Bind to an environment.
    pub fn interpret<Env: Environment>(self) -> pipes::Consumer<IN, A, E, Env> {
        pipes::Consumer::from_proxy(self.lower())
    }

    fn lower<Env: Environment>(self) -> Proxy<(), IN, (), crate::proxy::Void, A, E, Env> {
        match self {
            Consumer::Pure(result) => Proxy::Pure(result),
            Consumer::Lift(step) => Proxy::Lift(
                step.with_any_env::<Env>()
                    .map(|next: Self| next.lower::<Env>())
                    .boxed(),
            ),
            Consumer::Await(next) => Proxy::Request((), Box::new(move |value| next(value).lower())),
            Consumer::Bind(bound) => bound.resume().lower(),
        }
    }
}

impl<IN, A, E> Bound<Consumer<IN, Value, E>, A>
where
    IN: Payload,
    A: Payload,
    E: Payload,
{
    /// Apply binds until the consumer awaits, lifts a step or finishes.
    pub fn resume(self) -> Consumer<IN, A, E> {
        let (mut head, mut links) = self.into_parts();
        loop {
            head = match head {
                Consumer::Pure(value) => match links.next() {
                    Some(link) => link(value),
                    None => return Consumer::Pure(unerase(value)),
                },
                Consumer::Bind(inner) => {
                    let (inner_head, inner_links) = inner.into_parts();
                    links.prepend(inner_links);
                    inner_head
                }
                Consumer::Await(next) => {
                    return Consumer::Await(Box::new(move |value| {
                        Consumer::Bind(Bound::from_parts(next(value), links))
                    }))
                }
                Consumer::Lift(step) => {
                    return Consumer::Lift(
                        step.map(move |next| Consumer::Bind(Bound::from_parts(next, links)))
                            .boxed(),
                    )
                }
            };
        }
    }
}

impl<IN, A, E, Env> From<Consumer<IN, A, E>> for pipes::Consumer<IN, A, E, Env>
where
    IN: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    fn from(consumer: Consumer<IN, A, E>) -> Self {
        consumer.interpret()
    }
}

impl<IN, A, B, E> BitAnd<Consumer<IN, B, E>> for Consumer<IN, A, E>
where
    IN: Payload,
    A: Payload,
    B: Payload,
    E: Payload,
{
    type Output = Consumer<IN, B, E>;

    fn bitand(self, next: Consumer<IN, B, E>) -> Self::Output {
        self.then(next)
    }
}
