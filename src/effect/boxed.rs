//! BoxedEffect - type-erased effect.
//!
//! Pipelines store their lifted steps as `BoxedEffect`s: a `Proxy` is a
//! recursive type and every `Lift` node erases the concrete effect behind it.
//! Boxing clones the environment to achieve a `'static` future.

use std::future::Future;
use std::marker::PhantomData;
use std::pin::Pin;

use crate::effect::trait_def::Effect;

/// A boxed future that is Send + 'static
pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

/// A type-erased step.
///
/// # Example
///
/// ```rust
/// use millrace::effect::{from_fn, pure, BoxedEffect, Effect, EffectExt};
///
/// # tokio_test::block_on(async {
/// let batch: Vec<BoxedEffect<i32, String, ()>> = vec![
///     pure(1).boxed(),
///     from_fn(|_: &()| Ok(2)).map(|x| x * 2).boxed(),
/// ];
///
/// let mut total = 0;
/// for step in batch {
///     total += step.run(&()).await.unwrap();
/// }
/// assert_eq!(total, 5);
/// # });
/// ```
pub struct BoxedEffect<T, E, Env> {
    // owns its Env, cloned from the caller's reference at run time
    run_fn: Box<dyn FnOnce(Env) -> BoxFuture<'static, Result<T, E>> + Send>,
    _env: PhantomData<fn(Env)>,
}

impl<T, E, Env> std::fmt::Debug for BoxedEffect<T, E, Env> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BoxedEffect").finish_non_exhaustive()
    }
}

impl<T, E, Env> BoxedEffect<T, E, Env>
where
    T: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    /// Create a boxed effect from any effect.
    ///
    /// The environment will be cloned when the effect is run.
    pub fn new<Eff>(effect: Eff) -> Self
    where
        Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    {
        BoxedEffect {
            run_fn: Box::new(move |env: Env| Box::pin(async move { effect.run(&env).await })),
            _env: PhantomData,
        }
    }
}

impl<T, E> BoxedEffect<T, E, ()>
where
    T: Send + 'static,
    E: Send + 'static,
{
    /// Re-type an environment-free effect so it can run in any environment.
    ///
    /// The environment handed to the returned effect is dropped unread. This is
    /// how steps authored without an environment are bound to a concrete one.
    pub fn with_any_env<Env>(self) -> BoxedEffect<T, E, Env>
    where
        Env: Clone + Send + Sync + 'static,
    {
        BoxedEffect {
            run_fn: Box::new(move |_env: Env| (self.run_fn)(())),
            _env: PhantomData,
        }
    }
}

impl<T, E, Env> Effect for BoxedEffect<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    fn run(self, env: &Env) -> impl Future<Output = Result<T, E>> + Send {
        let env_owned = env.clone(); // Clone here for 'static lifetime
        (self.run_fn)(env_owned)
    }
}
