//! Asynchronous steps.

use std::fmt;
use std::future::Future;
use std::marker::PhantomData;

use crate::effect::trait_def::Effect;

/// A step that awaits a future built from the environment.
///
/// The future is created only when the step runs, so a pipeline can hold
/// the step for as long as it likes without starting any I/O. The drivers
/// and `observe` are built on this.
pub struct FromAsync<F, Env> {
    f: F,
    _env: PhantomData<fn(&Env)>,
}

impl<F, Env> fmt::Debug for FromAsync<F, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FromAsync").finish_non_exhaustive()
    }
}

impl<F, Env> FromAsync<F, Env> {
    pub(crate) fn new(f: F) -> Self {
        FromAsync {
            f,
            _env: PhantomData,
        }
    }
}

impl<F, Fut, T, E, Env> Effect for FromAsync<F, Env>
where
    F: FnOnce(&Env) -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    fn run(self, env: &Env) -> impl Future<Output = Result<T, E>> + Send {
        (self.f)(env)
    }
}
