//! Execution engine for closed pipelines.
//!
//! A closed [`Effect`](crate::pipes::Effect) is plain data: a chain of
//! `Lift` nodes ending in `Pure`. The engine is a loop that runs one lifted
//! step at a time, checking the environment's cancellation token before every
//! step and racing the step against it. Because composition hands control back
//! to this loop at every request/response exchange, evaluation uses bounded
//! stack however long the pipeline runs.

mod cancel;
mod engine;

pub use cancel::{CancellationToken, HasCancel};
pub use engine::{run_effect, Runtime};

pub(crate) use cancel::cancellable;
