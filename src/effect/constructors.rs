//! Building steps.
//!
//! These are the usual way to make the work that gets lifted into a
//! pipeline or handed to a scheduling driver.

use std::future::Future;

use crate::effect::combinators::{FromAsync, FromFn, Ready};

/// A step that succeeds with `value`.
///
/// # Example
///
/// ```rust
/// use millrace::effect::{pure, Effect};
///
/// # tokio_test::block_on(async {
/// assert_eq!(pure::<_, String, ()>(42).run(&()).await, Ok(42));
/// # });
/// ```
pub fn pure<T, E, Env>(value: T) -> Ready<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    Ready::new(Ok(value))
}

/// A step that fails with `error`.
///
/// # Example
///
/// ```rust
/// use millrace::effect::{fail, Effect};
///
/// # tokio_test::block_on(async {
/// let broken = fail::<i32, _, ()>("disk full".to_string());
/// assert_eq!(broken.run(&()).await, Err("disk full".to_string()));
/// # });
/// ```
pub fn fail<T, E, Env>(error: E) -> Ready<T, E, Env>
where
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    Ready::new(Err(error))
}

/// A step computed synchronously from the environment.
pub fn from_fn<T, E, Env, F>(f: F) -> FromFn<F, Env>
where
    F: FnOnce(&Env) -> Result<T, E> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    FromFn::new(f)
}

/// A step that awaits a future built from the environment.
///
/// # Example
///
/// ```rust
/// use millrace::effect::{from_async, Effect};
///
/// # tokio_test::block_on(async {
/// let fetched = from_async(|_: &()| async { Ok::<_, String>(42) });
/// assert_eq!(fetched.run(&()).await, Ok(42));
/// # });
/// ```
pub fn from_async<T, E, Env, F, Fut>(f: F) -> FromAsync<F, Env>
where
    F: FnOnce(&Env) -> Fut + Send,
    Fut: Future<Output = Result<T, E>> + Send,
    T: Send,
    E: Send,
    Env: Clone + Send + Sync,
{
    FromAsync::new(f)
}
