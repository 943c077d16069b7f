//! Declarative repetition schedules and the drivers that follow them.
//!
//! A [`Schedule`] is pure data: a lazily produced, possibly infinite sequence
//! of delays. The functions in [`driver`] run an effect, consult the schedule
//! after each run, and wait the next delay before running a fresh one.
//!
//! # Example
//!
//! ```rust
//! use std::sync::atomic::{AtomicU32, Ordering};
//! use std::sync::Arc;
//! use std::time::Duration;
//! use millrace::effect::{from_fn, Effect};
//! use millrace::schedule::{driver, Schedule};
//!
//! # tokio_test::block_on(async {
//! let calls = Arc::new(AtomicU32::new(0));
//! let counter = calls.clone();
//!
//! let effect = driver::retry(
//!     move || {
//!         let counter = counter.clone();
//!         from_fn(move |_: &()| {
//!             let n = counter.fetch_add(1, Ordering::SeqCst) + 1;
//!             if n < 3 { Err(format!("attempt {} failed", n)) } else { Ok(n) }
//!         })
//!     },
//!     Schedule::spaced(Duration::from_millis(1)).with_recurs(5),
//! );
//!
//! assert_eq!(effect.run(&()).await, Ok(3));
//! assert_eq!(calls.load(Ordering::SeqCst), 3);
//! # });
//! ```

pub mod driver;
mod policy;

pub use driver::DriveEvent;
pub use policy::{DelayStrategy, JitterStrategy, Schedule, ScheduleIter};
