//! Post-processing a step's success value.

use std::fmt;

use crate::effect::trait_def::Effect;

/// A step followed by a function of its success value.
///
/// Binding or composing a pipeline re-maps the step of every `Lift` node it
/// passes this way. The work stays the same and only the continuation grows.
pub struct Map<Inner, F> {
    pub(crate) inner: Inner,
    pub(crate) f: F,
}

impl<Inner, F> fmt::Debug for Map<Inner, F> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Map").finish_non_exhaustive()
    }
}

impl<Inner, F, U> Effect for Map<Inner, F>
where
    Inner: Effect,
    F: FnOnce(Inner::Output) -> U + Send,
    U: Send,
{
    type Output = U;
    type Error = Inner::Error;
    type Env = Inner::Env;

    async fn run(self, env: &Self::Env) -> Result<U, Self::Error> {
        self.inner.run(env).await.map(self.f)
    }
}
