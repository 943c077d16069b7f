//! # millrace
//!
//! Composable effectful streaming pipelines, with declarative repeat and
//! retry schedules.
//!
//! A pipeline is built from four roles that share one bidirectional
//! primitive, [`Proxy`](proxy::Proxy):
//!
//! - [`Producer`](pipes::Producer) yields values
//! - [`Consumer`](pipes::Consumer) awaits values
//! - [`Pipe`](pipes::Pipe) does both
//! - [`Effect`](pipes::Effect) does neither and can be run
//!
//! Stages are connected with `|`. Building a pipeline never runs anything;
//! side effects live in [effect steps](effect) lifted into the pipeline and
//! are performed by the [engine](runtime) one at a time, in lock-step with the
//! flow of values.
//!
//! ## Quick Example
//!
//! ```rust
//! use millrace::prelude::*;
//!
//! # tokio_test::block_on(async {
//! let pipeline = producer::yield_all(vec!["3", "x", "4"]).map(|()| 0)
//!     | pipe::map(|s: &str| s.parse::<i32>().ok())
//!     | pipe::filter(|n: &Option<i32>| n.is_some())
//!     | consumer::fold_n(2, 0, |acc, n: Option<i32>| acc + n.unwrap_or(0));
//!
//! assert_eq!(pipeline.run(&()).await, Ok::<_, String>(7));
//! # });
//! ```
//!
//! Any step, including a whole closed pipeline, can be driven by a
//! [`Schedule`](schedule::Schedule):
//!
//! ```rust
//! use std::time::Duration;
//! use millrace::prelude::*;
//! use millrace::effect::pure;
//!
//! # tokio_test::block_on(async {
//! let polled = driver::repeat_until(
//!     || pure::<_, String, ()>(0),
//!     Schedule::spaced(Duration::from_millis(5)).with_recurs(10),
//!     |n| *n == 0,
//! );
//! assert_eq!(polled.run(&()).await, Ok(0));
//! # });
//! ```

#![warn(missing_docs)]
#![warn(missing_debug_implementations)]

pub mod effect;
pub mod error;
pub mod pipes;
pub mod proxy;
pub mod pure;
pub mod runtime;
pub mod schedule;
pub mod traverse;

// Re-exports
pub use error::Cancelled;
pub use runtime::{run_effect, CancellationToken, HasCancel, Runtime};
pub use schedule::Schedule;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::effect::Effect as _;
    pub use crate::effect::{EffectExt, EffectTracingExt};
    pub use crate::error::Cancelled;
    pub use crate::pipes::{consumer, pipe, producer, Consumer, Effect, Pipe, Producer};
    pub use crate::runtime::{CancellationToken, HasCancel, Runtime};
    pub use crate::schedule::{driver, Schedule};
}
