//! Methods every step gets for free.

use crate::effect::boxed::BoxedEffect;
use crate::effect::combinators::Map;
use crate::effect::trait_def::Effect;

/// Combinators available on every [`Effect`].
///
/// Pipelines need only these: `map` to grow a lifted step's continuation and
/// `boxed` to store it in a `Lift` node.
///
/// # Example
///
/// ```rust
/// use millrace::effect::{from_fn, EffectExt};
///
/// #[derive(Clone)]
/// struct Quota { remaining: u32 }
///
/// # tokio_test::block_on(async {
/// let percent = from_fn(|quota: &Quota| Ok::<_, String>(quota.remaining))
///     .map(|remaining| remaining * 100 / 500);
///
/// assert_eq!(percent.execute(&Quota { remaining: 125 }).await, Ok(25));
/// # });
/// ```
#[allow(async_fn_in_trait)]
pub trait EffectExt: Effect {
    /// Transform the success value.
    fn map<U, F>(self, f: F) -> Map<Self, F>
    where
        F: FnOnce(Self::Output) -> U + Send,
        U: Send,
    {
        Map { inner: self, f }
    }

    /// Erase the concrete type.
    fn boxed(self) -> BoxedEffect<Self::Output, Self::Error, Self::Env>
    where
        Self: 'static,
        Self::Output: 'static,
        Self::Error: 'static,
        Self::Env: 'static,
    {
        BoxedEffect::new(self)
    }

    /// Run and await the effect.
    async fn execute(self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        self.run(env).await
    }
}

impl<E: Effect> EffectExt for E {}
