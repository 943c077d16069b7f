//! Environment-free producers.

use std::fmt;
use std::ops::BitAnd;

use crate::effect::{BoxedEffect, Effect as Step, EffectExt};
use crate::pipes;
use crate::proxy::bound::{erase, unerase, Value};
use crate::proxy::{Bound, Environment, Payload, Proxy, Void};
use crate::pure::Pipe;

/// An environment-free stage that yields `OUT` values and finishes with `A`.
pub enum Producer<OUT, A, E> {
    /// Finished.
    Pure(A),
    /// Run one step; its success value is the rest of the producer.
    Lift(BoxedEffect<Self, E, ()>),
    /// Yield a value; the rest runs when downstream asks again.
    Yield(OUT, Box<dyn FnOnce() -> Self + Send>),
    /// Binds not yet applied.
    Bind(Bound<Producer<OUT, Value, E>, A>),
}

impl<OUT: fmt::Debug, A: fmt::Debug, E> fmt::Debug for Producer<OUT, A, E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Producer::Pure(result) => f.debug_tuple("Pure").field(result).finish(),
            Producer::Lift(_) => f.write_str("Lift"),
            Producer::Yield(value, _) => f.debug_tuple("Yield").field(value).finish(),
            Producer::Bind(bound) => f.debug_tuple("Bind").field(bound).finish(),
        }
    }
}

impl<OUT: Payload, E: Payload> Producer<OUT, (), E> {
    /// Yield one value.
    pub fn yield_(value: OUT) -> Self {
        Producer::Yield(value, Box::new(|| Producer::Pure(())))
    }
}

impl<OUT, A, E> Producer<OUT, A, E>
where
    OUT: Payload,
    A: Payload,
    E: Payload,
{
    /// Finish without yielding.
    pub fn pure(value: A) -> Self {
        Producer::Pure(value)
    }

    /// Run one environment-free step and finish with its result.
    pub fn lift<Eff>(step: Eff) -> Self
    where
        Eff: Step<Output = A, Error = E, Env = ()> + 'static,
    {
        Producer::Lift(step.map(Producer::Pure).boxed())
    }

    /// Continue with `f` once this producer finishes.
    pub fn bind<B, F>(self, f: F) -> Producer<OUT, B, E>
    where
        B: Payload,
        F: FnOnce(A) -> Producer<OUT, B, E> + Send + 'static,
    {
        match self {
            Producer::Pure(result) => f(result),
            Producer::Bind(bound) => {
                Producer::Bind(bound.push(move |result| f(result).into_erased()))
            }
            node => {
                let bound = Bound::<_, A>::new(node.into_erased());
                Producer::Bind(bound.push(move |result| f(result).into_erased()))
            }
        }
    }

    fn into_erased(self) -> Producer<OUT, Value, E> {
        match self {
            Producer::Pure(result) => Producer::Pure(erase(result)),
            Producer::Lift(step) => Producer::Lift(step.map(Producer::into_erased).boxed()),
            Producer::Yield(value, next) => {
                Producer::Yield(value, Box::new(move || next().into_erased()))
            }
            Producer::Bind(bound) => Producer::Bind(bound.erase()),
        }
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Producer<OUT, B, E>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.bind(move |result| Producer::Pure(f(result)))
    }

    /// Yield everything `next` yields after this producer.
    pub fn then<B: Payload>(self, next: Producer<OUT, B, E>) -> Producer<OUT, B, E> {
        self.bind(move |_| next)
    }

    /// View this producer as a pipe that never awaits.
    pub fn into_pipe<IN: Payload>(self) -> Pipe<IN, OUT, A, E> {
        match self {
            Producer::Pure(result) => Pipe::Pure(result),
            Producer::Lift(step) => Pipe::Lift(step.map(Producer::into_pipe).boxed()),
            Producer::Yield(value, next) => {
                Pipe::Yield(value, Box::new(move || next().into_pipe()))
            }
            Producer::Bind(bound) => bound.resume().into_pipe(),
        }
    }

    /// Bind to an environment.
    pub fn interpret<Env: Environment>(self) -> pipes::Producer<OUT, A, E, Env> {
        pipes::Producer::from_proxy(self.lower())
    }

    fn lower<Env: Environment>(self) -> Proxy<Void, (), (), OUT, A, E, Env> {
        match self {
            Producer::Pure(result) => Proxy::Pure(result),
            Producer::Lift(step) => Proxy::Lift(
                step.with_any_env::<Env>()
                    .map(|next: Self| next.lower::<Env>())
                    .boxed(),
            ),
            Producer::Yield(value, next) => {
                Proxy::Respond(value, Box::new(move |()| next().lower()))
            }
            Producer::Bind(bound) => bound.resume().lower(),
        }
    }
}

impl<OUT, A, E> Bound<Producer<OUT, Value, E>, A>
where
    OUT: Payload,
    A: Payload,
    E: Payload,
{
    /// Apply binds until the producer yields, lifts a step or finishes.
    pub fn resume(self) -> Producer<OUT, A, E> {
        let (mut head, mut links) = self.into_parts();
        loop {
            head = match head {
                Producer::Pure(value) => match links.next() {
                    Some(link) => link(value),
                    None => return Producer::Pure(unerase(value)),
                },
                Producer::Bind(inner) => {
                    let (inner_head, inner_links) = inner.into_parts();
                    links.prepend(inner_links);
                    inner_head
                }
                Producer::Yield(value, next) => {
                    return Producer::Yield(
                        value,
                        Box::new(move || Producer::Bind(Bound::from_parts(next(), links))),
                    )
                }
                Producer::Lift(step) => {
                    return Producer::Lift(
                        step.map(move |next| Producer::Bind(Bound::from_parts(next, links)))
                            .boxed(),
                    )
                }
            };
        }
    }
}

impl<OUT, A, E, Env> From<Producer<OUT, A, E>> for pipes::Producer<OUT, A, E, Env>
where
    OUT: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    fn from(producer: Producer<OUT, A, E>) -> Self {
        producer.interpret()
    }
}

impl<OUT, A, B, E> BitAnd<Producer<OUT, B, E>> for Producer<OUT, A, E>
where
    OUT: Payload,
    A: Payload,
    B: Payload,
    E: Payload,
{
    type Output = Producer<OUT, B, E>;

    fn bitand(self, next: Producer<OUT, B, E>) -> Self::Output {
        self.then(next)
    }
}
