//! The bidirectional pipeline primitive.
//!
//! A [`Proxy`] is a process with two interfaces:
//!
//! ```text
//!          Upstream | Downstream
//!              +---------+
//!              |         |
//!     UO  <==       <==  DI
//!              |  Proxy  |
//!     UI  ==>       ==>  DO
//!              |    |    |
//!              +----|----+
//!                   v
//!                   A
//! ```
//!
//! It may send `UO` upstream and wait for a `UI` reply (`Request`), send `DO`
//! downstream and wait for a `DI` reply (`Respond`), run one effect step
//! (`Lift`), or finish with `A` (`Pure`). A `Bind` node holds binds not yet
//! applied; [`Proxy::resume`] turns it into one of the other four. Every streaming role in
//! [`pipes`](crate::pipes) is a `Proxy` with some of these channels closed
//! off by [`Void`].
//!
//! A `Proxy` is plain data. Composition operators rearrange continuations and
//! never run anything; the [engine](crate::runtime) is the only place lifted
//! steps are awaited.

pub(crate) mod bound;
mod compose;
mod reflect;

use std::fmt;

use crate::effect::{from_fn, BoxedEffect, Effect, EffectExt};

pub use bound::Bound;
pub use compose::compose;

use bound::{erase, unerase, Value};

/// The uninhabited channel type.
///
/// A role with a `Void` channel can never emit on it, so matching on a value
/// that arrived through one is `match v {}`.
pub type Void = std::convert::Infallible;

/// A suspended rest-of-pipeline waiting for a value of type `I`.
pub type Continuation<I, P> = Box<dyn FnOnce(I) -> P + Send>;

/// Values that can travel through a pipeline or be produced by one.
pub trait Payload: Send + 'static {}

impl<T: Send + 'static> Payload for T {}

/// Environments that lifted steps can read.
pub trait Environment: Clone + Send + Sync + 'static {}

impl<T: Clone + Send + Sync + 'static> Environment for T {}

/// One node of a bidirectional pipeline.
///
/// Type parameters:
///
/// - `UO`/`UI`: value sent upstream and the reply expected back
/// - `DI`/`DO`: reply expected from downstream and the value sent to it
/// - `A`: the final result
/// - `E`: the error lifted steps can fail with
/// - `Env`: the environment lifted steps read
pub enum Proxy<UO, UI, DI, DO, A, E, Env = ()> {
    /// Send a value upstream and suspend until it answers.
    Request(UO, Continuation<UI, Self>),
    /// Send a value downstream and suspend until it asks again.
    Respond(DO, Continuation<DI, Self>),
    /// Finished.
    Pure(A),
    /// Run one effect step; its success value is the rest of the pipeline.
    Lift(BoxedEffect<Self, E, Env>),
    /// A node followed by binds not yet applied.
    Bind(Bound<Proxy<UO, UI, DI, DO, Value, E, Env>, A>),
}

/// The shape of a [`Proxy`] node, without its payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    /// [`Proxy::Request`]
    Request,
    /// [`Proxy::Respond`]
    Respond,
    /// [`Proxy::Pure`]
    Pure,
    /// [`Proxy::Lift`]
    Lift,
    /// [`Proxy::Bind`]
    Bind,
}

impl<UO, UI, DI, DO, A, E, Env> Proxy<UO, UI, DI, DO, A, E, Env> {
    /// The shape of this node.
    pub fn shape(&self) -> Shape {
        match self {
            Proxy::Request(..) => Shape::Request,
            Proxy::Respond(..) => Shape::Respond,
            Proxy::Pure(_) => Shape::Pure,
            Proxy::Lift(_) => Shape::Lift,
            Proxy::Bind(_) => Shape::Bind,
        }
    }
}

impl<UO, UI, DI, DO, A, E, Env> fmt::Debug for Proxy<UO, UI, DI, DO, A, E, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Proxy").field(&self.shape()).finish()
    }
}

impl<UO, UI, DI, DO, E, Env> Proxy<UO, UI, DI, DO, UI, E, Env>
where
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    E: Payload,
    Env: Environment,
{
    /// Send `value` upstream and finish with the reply.
    pub fn request(value: UO) -> Self {
        Proxy::Request(value, Box::new(Proxy::Pure))
    }
}

impl<UO, UI, DI, DO, E, Env> Proxy<UO, UI, DI, DO, DI, E, Env>
where
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    E: Payload,
    Env: Environment,
{
    /// Send `value` downstream and finish with the reply.
    pub fn respond(value: DO) -> Self {
        Proxy::Respond(value, Box::new(Proxy::Pure))
    }
}

impl<UO, UI, DI, DO, A, E, Env> Proxy<UO, UI, DI, DO, A, E, Env>
where
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    /// Finish immediately with `value`.
    pub fn pure(value: A) -> Self {
        Proxy::Pure(value)
    }

    /// Run one effect step and finish with its result.
    ///
    /// The step is not run here; it is stored in a `Lift` node for the engine.
    pub fn lift<Eff>(step: Eff) -> Self
    where
        Eff: Effect<Output = A, Error = E, Env = Env> + 'static,
    {
        Proxy::Lift(step.map(Proxy::Pure).boxed())
    }

    /// Defer building a node until the engine reaches it.
    ///
    /// This is a `Lift` that does no work. Composition inserts one at every
    /// hand-over between stages, which turns what would be mutual recursion
    /// into iterations of the engine loop.
    pub fn suspend<F>(thunk: F) -> Self
    where
        F: FnOnce() -> Self + Send + 'static,
    {
        Proxy::Lift(from_fn(move |_: &Env| Ok::<_, E>(thunk())).boxed())
    }

    /// Sequence `f` after this proxy finishes.
    ///
    /// `Proxy::pure(a).bind(f)` is `f(a)`. Any other node becomes a `Bind`
    /// with `f` queued behind it, so binding in a loop costs constant stack
    /// when the chain is later resumed.
    pub fn bind<B, F>(self, f: F) -> Proxy<UO, UI, DI, DO, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> Proxy<UO, UI, DI, DO, B, E, Env> + Send + 'static,
    {
        match self {
            Proxy::Pure(result) => f(result),
            Proxy::Bind(bound) => Proxy::Bind(bound.push(move |result| f(result).into_erased())),
            node => {
                let bound = Bound::<_, A>::new(node.into_erased());
                Proxy::Bind(bound.push(move |result| f(result).into_erased()))
            }
        }
    }

    /// Apply pending binds until the node is not a `Bind`.
    ///
    /// Every interpreter calls this before matching on a node.
    pub fn resume(self) -> Self {
        match self {
            Proxy::Bind(bound) => bound.resume(),
            node => node,
        }
    }

    fn into_erased(self) -> Proxy<UO, UI, DI, DO, Value, E, Env> {
        match self {
            Proxy::Request(value, next) => {
                Proxy::Request(value, Box::new(move |reply| next(reply).into_erased()))
            }
            Proxy::Respond(value, next) => {
                Proxy::Respond(value, Box::new(move |reply| next(reply).into_erased()))
            }
            Proxy::Pure(result) => Proxy::Pure(erase(result)),
            Proxy::Lift(step) => Proxy::Lift(step.map(Proxy::into_erased).boxed()),
            Proxy::Bind(bound) => Proxy::Bind(bound.erase()),
        }
    }

    /// Transform the final result.
    pub fn map<B, F>(self, f: F) -> Proxy<UO, UI, DI, DO, B, E, Env>
    where
        B: Payload,
        F: FnOnce(A) -> B + Send + 'static,
    {
        self.bind(move |result| Proxy::Pure(f(result)))
    }

    /// Run `next` after this proxy, discarding this proxy's result.
    pub fn then<B>(self, next: Proxy<UO, UI, DI, DO, B, E, Env>) -> Proxy<UO, UI, DI, DO, B, E, Env>
    where
        B: Payload,
    {
        self.bind(move |_| next)
    }

    /// Answer every `Request` of this proxy by running `upstream` until it
    /// responds (`upstream +>> self`).
    ///
    /// `upstream` receives the first requested value; later requests resume
    /// it where it last responded. The result has `upstream`'s upstream
    /// interface and this proxy's downstream interface.
    pub fn pair_each_request_with_respond<XO, XI, F>(
        self,
        upstream: F,
    ) -> Proxy<XO, XI, DI, DO, A, E, Env>
    where
        XO: Payload,
        XI: Payload,
        F: FnOnce(UO) -> Proxy<XO, XI, UO, UI, A, E, Env> + Send + 'static,
    {
        compose::pull(Box::new(upstream), self)
    }

    /// Answer every `Respond` of this proxy by running `downstream` until it
    /// requests (`self >>~ downstream`).
    ///
    /// `downstream` receives the first responded value; later responses resume
    /// it where it last requested.
    pub fn pair_each_respond_with_request<YI, YO, F>(
        self,
        downstream: F,
    ) -> Proxy<UO, UI, YI, YO, A, E, Env>
    where
        YI: Payload,
        YO: Payload,
        F: FnOnce(DO) -> Proxy<DI, DO, YI, YO, A, E, Env> + Send + 'static,
    {
        compose::push(self, Box::new(downstream))
    }

    /// Substitute every `Request` of this proxy with `f` applied to the
    /// requested value (`f >\\ self`).
    ///
    /// The result of `f` is the reply the request receives. `f` may itself
    /// request with a different upstream interface, which retypes the
    /// pipeline's upstream end.
    pub fn replace_request<XO, XI, F>(self, f: F) -> Proxy<XO, XI, DI, DO, A, E, Env>
    where
        XO: Payload,
        XI: Payload,
        F: Fn(UO) -> Proxy<XO, XI, DI, DO, UI, E, Env> + Send + Sync + 'static,
    {
        compose::replace_request(std::sync::Arc::new(f), self)
    }

    /// Substitute every `Respond` of this proxy with `f` applied to the
    /// responded value (`self //> f`).
    ///
    /// The result of `f` is the reply the response receives.
    pub fn replace_respond<YI, YO, F>(self, f: F) -> Proxy<UO, UI, YI, YO, A, E, Env>
    where
        YI: Payload,
        YO: Payload,
        F: Fn(DO) -> Proxy<UO, UI, YI, YO, DI, E, Env> + Send + Sync + 'static,
    {
        compose::replace_respond(std::sync::Arc::new(f), self)
    }

    /// Run `body` for every value this proxy responds with.
    ///
    /// Same as [`replace_respond`](Self::replace_respond).
    pub fn for_each<YI, YO, F>(self, body: F) -> Proxy<UO, UI, YI, YO, A, E, Env>
    where
        YI: Payload,
        YO: Payload,
        F: Fn(DO) -> Proxy<UO, UI, YI, YO, DI, E, Env> + Send + Sync + 'static,
    {
        self.replace_respond(body)
    }

    /// Fuse runs of consecutive `Lift` nodes.
    ///
    /// After `observe`, every `Lift` is followed by a non-`Lift` node. The
    /// fused steps run back to back inside one boxed step, so cancellation is
    /// only checked before the run. Costs one extra allocation per fused run;
    /// only worth it where independently lifted steps meet.
    pub fn observe(self) -> Self {
        match self {
            Proxy::Request(value, next) => {
                Proxy::Request(value, Box::new(move |reply| next(reply).observe()))
            }
            Proxy::Respond(value, next) => {
                Proxy::Respond(value, Box::new(move |reply| next(reply).observe()))
            }
            Proxy::Pure(result) => Proxy::Pure(result),
            Proxy::Bind(bound) => bound.resume().observe(),
            Proxy::Lift(step) => Proxy::Lift(
                crate::effect::from_async(move |env: &Env| {
                    let env = env.clone();
                    async move {
                        let mut node = step.run(&env).await?.resume();
                        while let Proxy::Lift(next) = node {
                            node = next.run(&env).await?.resume();
                        }
                        Ok::<_, E>(node.observe())
                    }
                })
                .boxed(),
            ),
        }
    }
}

impl<UO, UI, DI, DO, A, E, Env> Bound<Proxy<UO, UI, DI, DO, Value, E, Env>, A>
where
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    /// Apply binds until the next request, response, step or result.
    ///
    /// Nested chains are merged into one queue rather than resumed
    /// recursively.
    pub fn resume(self) -> Proxy<UO, UI, DI, DO, A, E, Env> {
        let (mut head, mut links) = self.into_parts();
        loop {
            head = match head {
                Proxy::Pure(value) => match links.next() {
                    Some(link) => link(value),
                    None => return Proxy::Pure(unerase(value)),
                },
                Proxy::Bind(inner) => {
                    let (inner_head, inner_links) = inner.into_parts();
                    links.prepend(inner_links);
                    inner_head
                }
                Proxy::Request(value, next) => {
                    return Proxy::Request(
                        value,
                        Box::new(move |reply| Proxy::Bind(Bound::from_parts(next(reply), links))),
                    )
                }
                Proxy::Respond(value, next) => {
                    return Proxy::Respond(
                        value,
                        Box::new(move |reply| Proxy::Bind(Bound::from_parts(next(reply), links))),
                    )
                }
                Proxy::Lift(step) => {
                    return Proxy::Lift(
                        step.map(move |next| Proxy::Bind(Bound::from_parts(next, links)))
                            .boxed(),
                    )
                }
            };
        }
    }
}

#[cfg(test)]
mod tests;
