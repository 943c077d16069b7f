//! Cancellation tokens and the environments that carry them.

use std::future::Future;
use std::pin::pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use futures::future::{select, Either};
use tokio::sync::Notify;

use crate::error::Cancelled;

/// A cloneable cancellation signal.
///
/// All clones observe the same signal. Once cancelled a token stays
/// cancelled.
///
/// # Example
///
/// ```rust
/// use millrace::runtime::CancellationToken;
///
/// let token = CancellationToken::new();
/// let observer = token.clone();
/// assert!(!observer.is_cancelled());
///
/// token.cancel();
/// assert!(observer.is_cancelled());
/// ```
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    inner: Arc<Inner>,
}

#[derive(Debug, Default)]
struct Inner {
    cancelled: AtomicBool,
    notify: Notify,
}

impl CancellationToken {
    /// Create a token that has not been cancelled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Signal cancellation to every clone of this token.
    pub fn cancel(&self) {
        if !self.inner.cancelled.swap(true, Ordering::SeqCst) {
            tracing::debug!("cancellation requested");
            self.inner.notify.notify_waiters();
        }
    }

    /// Returns true once [`cancel`](Self::cancel) has been called.
    pub fn is_cancelled(&self) -> bool {
        self.inner.cancelled.load(Ordering::SeqCst)
    }

    /// Wait until the token is cancelled.
    pub async fn cancelled(&self) {
        let mut notified = pin!(self.inner.notify.notified());
        // Register before checking the flag so a concurrent cancel is not lost.
        notified.as_mut().enable();
        if self.is_cancelled() {
            return;
        }
        notified.await;
    }
}

/// An environment that may carry a cancellation token.
///
/// The engine and the scheduling drivers only require this of the
/// environment; steps are free to read anything else from it.
pub trait HasCancel: Clone + Send + Sync + 'static {
    /// The token to observe, or `None` if this environment cannot be cancelled.
    fn cancellation(&self) -> Option<&CancellationToken>;
}

impl HasCancel for () {
    fn cancellation(&self) -> Option<&CancellationToken> {
        None
    }
}

impl HasCancel for CancellationToken {
    fn cancellation(&self) -> Option<&CancellationToken> {
        Some(self)
    }
}

impl<Env: HasCancel> HasCancel for Arc<Env> {
    fn cancellation(&self) -> Option<&CancellationToken> {
        self.as_ref().cancellation()
    }
}

/// Await `fut` unless the environment's token fires first.
pub(crate) async fn cancellable<Env, F>(env: &Env, fut: F) -> Result<F::Output, Cancelled>
where
    Env: HasCancel,
    F: Future,
{
    let Some(token) = env.cancellation() else {
        return Ok(fut.await);
    };
    if token.is_cancelled() {
        return Err(Cancelled);
    }

    let fut = pin!(fut);
    let cancelled = pin!(token.cancelled());
    match select(fut, cancelled).await {
        Either::Left((output, _)) => Ok(output),
        Either::Right(((), _)) => Err(Cancelled),
    }
}
