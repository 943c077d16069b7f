//! Effect trait definition - the unit of work a pipeline lifts and a schedule drives.
//!
//! An effect is a lazy computation that:
//! - Produces a value of type `Output` on success
//! - May fail with an error of type `Error`
//! - Reads an environment of type `Env`
//!
//! Pipelines never run effects themselves. A [`Proxy::Lift`](crate::proxy::Proxy::Lift)
//! node holds one boxed effect and hands it to the execution engine, which is
//! the only place an effect is actually awaited.
//!
//! # Environment Cloning
//!
//! `Env` requires `Clone` so that effects can be boxed: a boxed effect clones
//! the environment into its future to obtain a `'static` lifetime. Keep
//! environments cheap to clone (`Arc` the heavy parts, share a
//! [`CancellationToken`](crate::runtime::CancellationToken)).

use std::future::Future;

/// A computation that may perform effects.
///
/// Combinators return concrete types (see [`EffectExt`](crate::effect::EffectExt)),
/// so composing effects costs nothing until `.boxed()` is called.
///
/// # Example
///
/// ```rust
/// use millrace::effect::{from_fn, Effect, EffectExt};
///
/// #[derive(Clone)]
/// struct Env { base: i32 }
///
/// # tokio_test::block_on(async {
/// let effect = from_fn(|env: &Env| Ok::<_, String>(env.base)).map(|x| x * 2);
/// assert_eq!(effect.run(&Env { base: 21 }).await, Ok(42));
/// # });
/// ```
pub trait Effect: Sized + Send {
    /// The success type produced by this effect.
    type Output: Send;

    /// The error type that may be produced.
    type Error: Send;

    /// The environment type required to run this effect.
    type Env: Clone + Send + Sync;

    /// Execute this effect with the given environment.
    fn run(self, env: &Self::Env)
        -> impl Future<Output = Result<Self::Output, Self::Error>> + Send;
}
