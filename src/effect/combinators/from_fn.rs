//! Synchronous steps.

use std::fmt;
use std::marker::PhantomData;

use crate::effect::trait_def::Effect;

/// A step computed synchronously from the environment.
///
/// `Proxy::suspend` wraps its thunk in one of these, and most sources and
/// sinks that only touch memory are written with [`from_fn`](crate::effect::from_fn).
///
/// # Example
///
/// ```rust
/// use millrace::effect::{from_fn, Effect};
///
/// #[derive(Clone)]
/// struct Settings { batch: usize }
///
/// # tokio_test::block_on(async {
/// let batch = from_fn(|settings: &Settings| Ok::<_, String>(settings.batch));
/// assert_eq!(batch.run(&Settings { batch: 64 }).await, Ok(64));
/// # });
/// ```
pub struct FromFn<F, Env> {
    f: F,
    _env: PhantomData<fn(&Env)>,
}

impl<F, Env> fmt::Debug for FromFn<F, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromFn").finish_non_exhaustive()
    }
}

impl<F, Env> FromFn<F, Env> {
    pub(crate) fn new(f: F) -> Self {
        FromFn {
            f,
            _env: PhantomData,
        }
    }
}

impl<F, T, E, Env> Effect for FromFn<F, Env>
where
    F: FnOnce(&Env) -> Result<T, E> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(self, env: &Env) -> Result<T, E> {
        (self.f)(env)
    }
}
