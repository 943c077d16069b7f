//! Timeouts for effects.
//!
//! Cancellation of a running step is the effect layer's business: a step that
//! must not outlive a deadline is wrapped with [`with_timeout`] before it is
//! lifted into a pipeline or driven by a schedule.

use std::time::Duration;

use crate::effect::boxed::BoxedEffect;
use crate::effect::constructors::from_async;
use crate::effect::ext::EffectExt;
use crate::effect::trait_def::Effect;

/// Add a timeout to an effect.
///
/// If the effect doesn't complete within the duration, it fails with
/// [`TimeoutError::Timeout`]; its own errors come back as
/// [`TimeoutError::Inner`].
///
/// # Example
///
/// ```rust
/// use millrace::effect::{from_async, with_timeout, EffectExt, TimeoutError};
/// use std::time::Duration;
///
/// # tokio_test::block_on(async {
/// let effect = with_timeout(
///     from_async(|_: &()| async {
///         tokio::time::sleep(Duration::from_secs(10)).await;
///         Ok::<_, String>(42)
///     }),
///     Duration::from_millis(10),
/// );
///
/// assert!(matches!(
///     effect.execute(&()).await,
///     Err(TimeoutError::Timeout { .. })
/// ));
/// # });
/// ```
pub fn with_timeout<T, E, Env, Eff>(
    effect: Eff,
    duration: Duration,
) -> BoxedEffect<T, TimeoutError<E>, Env>
where
    T: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
{
    from_async(move |env: &Env| {
        let env = env.clone();
        async move {
            match tokio::time::timeout(duration, effect.run(&env)).await {
                Ok(Ok(value)) => Ok(value),
                Ok(Err(e)) => Err(TimeoutError::Inner(e)),
                Err(_) => {
                    tracing::debug!(?duration, "effect timed out");
                    Err(TimeoutError::Timeout { duration })
                }
            }
        }
    })
    .boxed()
}

/// Error returned by [`with_timeout`].
///
/// Wraps either the elapsed deadline or the inner effect's own error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimeoutError<E> {
    /// The operation timed out.
    Timeout {
        /// The timeout duration that was exceeded.
        duration: Duration,
    },
    /// An inner error occurred before timeout.
    Inner(E),
}

impl<E> TimeoutError<E> {
    /// Returns true if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout { .. })
    }

    /// Get the inner error if present.
    pub fn into_inner(self) -> Option<E> {
        match self {
            Self::Inner(e) => Some(e),
            Self::Timeout { .. } => None,
        }
    }
}

impl<E: std::fmt::Display> std::fmt::Display for TimeoutError<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Timeout { duration } => write!(f, "operation timed out after {:?}", duration),
            Self::Inner(e) => write!(f, "{}", e),
        }
    }
}

impl<E: std::error::Error + 'static> std::error::Error for TimeoutError<E> {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Timeout { .. } => None,
            Self::Inner(e) => Some(e),
        }
    }
}

impl<E> From<crate::error::Cancelled> for TimeoutError<E>
where
    E: From<crate::error::Cancelled>,
{
    fn from(cancelled: crate::error::Cancelled) -> Self {
        TimeoutError::Inner(E::from(cancelled))
    }
}
