//! Error types owned by the runtime.
//!
//! Step failures are the user's own error type and travel through pipelines
//! and drivers untouched. The only error this crate produces itself is
//! [`Cancelled`], raised when a cancellation token fires between steps or
//! during a scheduled delay.

/// Cancellation was observed by the engine or by a scheduling driver.
///
/// Error types used with [`run_effect`](crate::runtime::run_effect) and the
/// schedule drivers opt in by implementing `From<Cancelled>`.
///
/// # Examples
///
/// ```rust
/// use millrace::Cancelled;
///
/// #[derive(Debug, PartialEq)]
/// enum AppError {
///     Cancelled,
///     Io(String),
/// }
///
/// impl From<Cancelled> for AppError {
///     fn from(_: Cancelled) -> Self {
///         AppError::Cancelled
///     }
/// }
///
/// assert_eq!(AppError::from(Cancelled), AppError::Cancelled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Cancelled;

impl std::fmt::Display for Cancelled {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "operation cancelled")
    }
}

impl std::error::Error for Cancelled {}

impl From<Cancelled> for String {
    fn from(cancelled: Cancelled) -> Self {
        cancelled.to_string()
    }
}
