//! Effect steps: the units of work a pipeline lifts and a schedule drives.
//!
//! An effect is a lazy, environment-dependent async computation producing a
//! `Result`. The streaming algebra never performs I/O itself; every side
//! effect of a pipeline lives in an effect embedded in a
//! [`Proxy::Lift`](crate::proxy::Proxy::Lift) node, and the scheduling driver
//! re-runs effects built by a factory.
//!
//! # Zero-Cost by Default
//!
//! ```rust
//! use millrace::effect::{from_fn, EffectExt};
//!
//! # tokio_test::block_on(async {
//! // Map<Map<FromFn<..>, ..>, ..> - no heap allocation
//! let effect = from_fn(|_: &()| Ok::<_, String>(20))
//!     .map(|x| x + 1)
//!     .map(|x| x * 2);
//!
//! assert_eq!(effect.execute(&()).await, Ok(42));
//! # });
//! ```
//!
//! # Boxing
//!
//! `.boxed()` erases the concrete type. Pipelines box every lifted step, since
//! a `Proxy` is a recursive type whose `Lift` nodes must all share one type.

pub mod boxed;
pub mod combinators;
pub mod constructors;
pub mod ext;
pub mod instrument;
pub mod timeout;
mod trait_def;

// Re-export core trait
pub use trait_def::Effect;

// Re-export extension traits
pub use ext::EffectExt;
pub use instrument::{EffectTracingExt, Instrument};

// Re-export boxed types
pub use boxed::{BoxFuture, BoxedEffect};

// Re-export combinator types
pub use combinators::{FromAsync, FromFn, Map, Ready};

// Re-export constructors
pub use constructors::{fail, from_async, from_fn, pure};

// Re-export timeout
pub use timeout::{with_timeout, TimeoutError};
