//! Environment-free pipes.
//!
//! [`Consumer::into_pipe`](crate::pure::Consumer::into_pipe) and
//! [`Producer::into_pipe`](crate::pure::Producer::into_pipe) land here when a
//! stage has to sit between two others.

use std::fmt;
use std::ops::BitAnd;

use crate::effect::{BoxedEffect, Effect as Step, EffectExt};
use crate::pipes;
use crate::proxy::bound::{erase, unerase, Value};
use crate::proxy::{Bound, Continuation, Environment, Payload, Proxy};

/// An environment-free stage that awaits `IN`, yields `OUT`, and finishes with `A`.
pub enum Pipe<IN, OUT, A, E> {
    /// Finished.
    Pure(A),
    /// Run one step; its success value is the rest of the pipe.
    Lift(BoxedEffect<Self, E, ()>),
    /// Wait for the next upstream value.
    Await(Continuation<IN, Self>),
    /// Yield a value; the rest runs when downstream asks again.
    Yield(OUT, Box<dyn FnOnce() -> Self + Send>),
    /// Binds not yet applied.
    Bind(Bound<Pipe<IN, OUT, Value, E>, A>),
}

impl<IN, OUT: fmt::Debug, A: fmt::Debug, E> fmt::Debug for Pipe<IN, OUT, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pipe::Pure(result) => f.debug_tuple("Pure").field(result).finish(),
            Pipe::Lift(_) => f.write_str("Lift"),
            Pipe::Await(_) => f.write_str("Await"),
            Pipe::Yield(value, _) => f.debug_tuple("Yield").field(value).finish(),
            Pipe::Bind(bound) => f.debug_tuple("Bind").field(bound).finish(),
        }
    }
}

impl<IN: Payload, OUT: Payload, E: Payload> Pipe<IN, OUT, IN, E> {
    /// Wait for the next upstream value.
    pub fn await_() -> Self {
        Pipe::Await(Box::new(Pipe::Pure))
    }
}

impl<IN: Payload, OUT: Payload, E: Payload> Pipe<IN, OUT, (), E> {
    /// Yield one value downstream.
    pub fn yield_(value: OUT) -> Self {
        Pipe::Yield(value, Box::new(|| Pipe::Pure(())))
    }
}

impl<IN, OUT, A, E> Pipe<IN, OUT, A, E>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
{
    /// Finish immediately with `value`.
    pub fn pure(value: A) -> Self {
        Pipe::Pure(value)
    }

    /// Run one environment-free step and finish with its result.
    pub fn lift<Eff>(step: Eff) -> Self
    where
        Eff: Step<Output = A, Error = E, Env = ()> + 'static,
    {
        Pipe::Lift(step.map(Pipe::Pure).boxed())
    }

    /// Continue with `f` once this pipe finishes.
    pub fn bind<B, F>(self, f: F) -> Pipe<IN, OUT, B, E>
    where
        B: Payload,
        F: FnOnce(A) -> Pipe<IN, OUT, B, E> + Send + 'static,
    {
        match self {
            Pipe::Pure(result) => f(result),
            Pipe::Bind(bound) => Pipe::Bind(bound.push(move |result| f(result).into_erased())),
            node => {
                let bound = Bound::<_, A>::new(node.into_erased());
                Pipe::Bind(bound.push(move |result| f(result).into_erased()))
            }
        }
    }

    fn into_erased(self) -> Pipe<IN, OUT, Value, E> {
        match self {
            Pipe::Pure(result) => Pipe::Pure(erase(result)),
            Pipe::Lift(step) => Pipe::Lift(step.map(Pipe::into_erased).boxed()),
            Pipe::Await(next) => Pipe::Await(Box::new(move |value| next(value).into_erased())),
            Pipe::Yield(value, next) => Pipe::Yield(value, Box::new(move || next().into_erased())),
            Pipe::Bind(bound) => Pipe::Bind(bound.erase()),
        }
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Pipe<IN, OUT, B, E>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.bind(move |result| Pipe::Pure(f(result)))
    }

    /// Run `next` after this pipe, discarding this pipe's result.
    pub fn then<B: Payload>(self, next: Pipe<IN, OUT, B, E>) -> Pipe<IN, OUT, B, E> {
        self.bind(move |_| next)
    }

    /// Bind to an environment.
    pub fn interpret<Env: Environment>(self) -> pipes::Pipe<IN, OUT, A, E, Env> {
        pipes::Pipe::from_proxy(self.lower())
    }

    fn lower<Env: Environment>(self) -> Proxy<(), IN, (), OUT, A, E, Env> {
        match self {
            Pipe::Pure(result) => Proxy::Pure(result),
            Pipe::Lift(step) => Proxy::Lift(
                step.with_any_env::<Env>()
                    .map(|next: Self| next.lower::<Env>())
                    .boxed(),
            ),
            Pipe::Await(next) => Proxy::Request((), Box::new(move |value| next(value).lower())),
            Pipe::Yield(value, next) => Proxy::Respond(value, Box::new(move |()| next().lower())),
            Pipe::Bind(bound) => bound.resume().lower(),
        }
    }
}

impl<IN, OUT, A, E> Bound<Pipe<IN, OUT, Value, E>, A>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
{
    /// Apply binds until the pipe awaits, yields, lifts a step or finishes.
    pub fn resume(self) -> Pipe<IN, OUT, A, E> {
        let (mut head, mut links) = self.into_parts();
        loop {
            head = match head {
                Pipe::Pure(value) => match links.next() {
                    Some(link) => link(value),
                    None => return Pipe::Pure(unerase(value)),
                },
                Pipe::Bind(inner) => {
                    let (inner_head, inner_links) = inner.into_parts();
                    links.prepend(inner_links);
                    inner_head
                }
                Pipe::Await(next) => {
                    return Pipe::Await(Box::new(move |value| {
                        Pipe::Bind(Bound::from_parts(next(value), links))
                    }))
                }
                Pipe::Yield(value, next) => {
                    return Pipe::Yield(
                        value,
                        Box::new(move || Pipe::Bind(Bound::from_parts(next(), links))),
                    )
                }
                Pipe::Lift(step) => {
                    return Pipe::Lift(
                        step.map(move |next| Pipe::Bind(Bound::from_parts(next, links)))
                            .boxed(),
                    )
                }
            };
        }
    }
}

impl<IN, OUT, A, E, Env> From<Pipe<IN, OUT, A, E>> for pipes::Pipe<IN, OUT, A, E, Env>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    fn from(pipe: Pipe<IN, OUT, A, E>) -> Self {
        pipe.interpret()
    }
}

impl<IN, OUT, A, B, E> BitAnd<Pipe<IN, OUT, B, E>> for Pipe<IN, OUT, A, E>
where
    IN: Payload,
    OUT: Payload,
    A: Payload,
    B: Payload,
    E: Payload,
{
    type Output = Pipe<IN, OUT, B, E>;

    fn bitand(self, next: Pipe<IN, OUT, B, E>) -> Self::Output {
        self.then(next)
    }
}
