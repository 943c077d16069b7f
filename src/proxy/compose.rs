//! Pairing and replacement of request/response channels.

use std::sync::Arc;

use super::{Continuation, Environment, Payload, Proxy};
use crate::effect::EffectExt;

type Replacement<V, P> = Arc<dyn Fn(V) -> P + Send + Sync>;

/// Connect `upstream`'s responses to `downstream`'s requests (`>->`).
///
/// The first request of `downstream` starts `upstream`; each later request
/// resumes it. Whichever side finishes first decides the result.
///
/// # Example
///
/// ```rust
/// use millrace::proxy::{compose, Proxy, Void};
///
/// # tokio_test::block_on(async {
/// let upstream: Proxy<Void, (), (), i32, i32, String> =
///     Proxy::respond(20).then(Proxy::pure(0));
/// let downstream: Proxy<(), i32, (), Void, i32, String> =
///     Proxy::request(()).map(|n: i32| n + 1);
///
/// let closed = millrace::pipes::Effect::from_proxy(compose(upstream, downstream));
/// assert_eq!(closed.run(&()).await, Ok(21));
/// # });
/// ```
pub fn compose<XO, XI, UI, DI, DO, A, E, Env>(
    upstream: Proxy<XO, XI, (), UI, A, E, Env>,
    downstream: Proxy<(), UI, DI, DO, A, E, Env>,
) -> Proxy<XO, XI, DI, DO, A, E, Env>
where
    XO: Payload,
    XI: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    downstream.pair_each_request_with_respond(move |()| upstream)
}

/// `upstream +>> downstream`
pub(super) fn pull<XO, XI, UO, UI, DI, DO, A, E, Env>(
    upstream: Continuation<UO, Proxy<XO, XI, UO, UI, A, E, Env>>,
    downstream: Proxy<UO, UI, DI, DO, A, E, Env>,
) -> Proxy<XO, XI, DI, DO, A, E, Env>
where
    XO: Payload,
    XI: Payload,
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    match downstream {
        // One suspend per round trip keeps the stack flat.
        Proxy::Request(value, next) => Proxy::suspend(move || push(upstream(value), next)),
        Proxy::Respond(value, next) => {
            Proxy::Respond(value, Box::new(move |reply| pull(upstream, next(reply))))
        }
        Proxy::Pure(result) => Proxy::Pure(result),
        Proxy::Lift(step) => Proxy::Lift(step.map(move |next| pull(upstream, next)).boxed()),
        Proxy::Bind(bound) => pull(upstream, bound.resume()),
    }
}

/// `upstream >>~ downstream`
pub(super) fn push<XO, XI, UO, UI, DI, DO, A, E, Env>(
    upstream: Proxy<XO, XI, UO, UI, A, E, Env>,
    downstream: Continuation<UI, Proxy<UO, UI, DI, DO, A, E, Env>>,
) -> Proxy<XO, XI, DI, DO, A, E, Env>
where
    XO: Payload,
    XI: Payload,
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    match upstream {
        Proxy::Request(value, next) => {
            Proxy::Request(value, Box::new(move |reply| push(next(reply), downstream)))
        }
        Proxy::Respond(value, next) => pull(next, downstream(value)),
        Proxy::Pure(result) => Proxy::Pure(result),
        Proxy::Lift(step) => Proxy::Lift(step.map(move |next| push(next, downstream)).boxed()),
        Proxy::Bind(bound) => push(bound.resume(), downstream),
    }
}

/// `f >\\ proxy`
pub(super) fn replace_request<XO, XI, UO, UI, DI, DO, A, E, Env>(
    f: Replacement<UO, Proxy<XO, XI, DI, DO, UI, E, Env>>,
    proxy: Proxy<UO, UI, DI, DO, A, E, Env>,
) -> Proxy<XO, XI, DI, DO, A, E, Env>
where
    XO: Payload,
    XI: Payload,
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    match proxy {
        Proxy::Request(value, next) => Proxy::suspend(move || {
            let answer = f(value);
            answer.bind(move |reply| replace_request(f, next(reply)))
        }),
        Proxy::Respond(value, next) => {
            Proxy::Respond(value, Box::new(move |reply| replace_request(f, next(reply))))
        }
        Proxy::Pure(result) => Proxy::Pure(result),
        Proxy::Lift(step) => {
            Proxy::Lift(step.map(move |next| replace_request(f, next)).boxed())
        }
        Proxy::Bind(bound) => replace_request(f, bound.resume()),
    }
}

/// `proxy //> f`
pub(super) fn replace_respond<YI, YO, UO, UI, DI, DO, A, E, Env>(
    f: Replacement<DO, Proxy<UO, UI, YI, YO, DI, E, Env>>,
    proxy: Proxy<UO, UI, DI, DO, A, E, Env>,
) -> Proxy<UO, UI, YI, YO, A, E, Env>
where
    YI: Payload,
    YO: Payload,
    UO: Payload,
    UI: Payload,
    DI: Payload,
    DO: Payload,
    A: Payload,
    E: Payload,
    Env: Environment,
{
    match proxy {
        Proxy::Request(value, next) => {
            Proxy::Request(value, Box::new(move |reply| replace_respond(f, next(reply))))
        }
        Proxy::Respond(value, next) => Proxy::suspend(move || {
            let body = f(value);
            body.bind(move |reply| replace_respond(f, next(reply)))
        }),
        Proxy::Pure(result) => Proxy::Pure(result),
        Proxy::Lift(step) => {
            Proxy::Lift(step.map(move |next| replace_respond(f, next)).boxed())
        }
        Proxy::Bind(bound) => replace_respond(f, bound.resume()),
    }
}
