//! Steps whose outcome is fixed before they run.

use std::fmt;
use std::marker::PhantomData;

use crate::effect::trait_def::Effect;

/// A step that finishes with an outcome chosen at construction.
///
/// Built by [`pure`](crate::effect::pure) and [`fail`](crate::effect::fail).
/// Running it never reads the environment, so a pipeline can lift one to
/// inject a value or a failure at a precise point.
pub struct Ready<T, E, Env> {
    outcome: Result<T, E>,
    _env: PhantomData<fn(&Env)>,
}

impl<T: fmt::Debug, E: fmt::Debug, Env> fmt::Debug for Ready<T, E, Env> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ready").field(&self.outcome).finish()
    }
}

impl<T, E, Env> Ready<T, E, Env> {
    pub(crate) fn new(outcome: Result<T, E>) -> Self {
        Ready {
            outcome,
            _env: PhantomData,
        }
    }
}

impl<T, E, Env> Effect for Ready<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    type Output = T;
    type Error = E;
    type Env = Env;

    async fn run(self, _env: &Env) -> Result<T, E> {
        self.outcome
    }
}
