//! Duality.

use super::{Environment, Payload, Proxy};
use crate::effect::EffectExt;

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
    /// Swap the upstream and downstream interfaces.
    ///
    /// Every `Request` becomes a `Respond` and vice versa. Reflecting twice
    /// gives back a proxy that behaves exactly like the original.
    pub fn reflect(self) -> Proxy<DO, DI, UI, UO, A, E, Env> {
        match self {
            Proxy::Request(value, next) => {
                Proxy::Respond(value, Box::new(move |reply| next(reply).reflect()))
            }
            Proxy::Respond(value, next) => {
                Proxy::Request(value, Box::new(move |reply| next(reply).reflect()))
            }
            Proxy::Pure(result) => Proxy::Pure(result),
            Proxy::Lift(step) => Proxy::Lift(step.map(Proxy::reflect).boxed()),
            Proxy::Bind(bound) => bound.resume().reflect(),
        }
    }
}
