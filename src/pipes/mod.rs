//! Streaming roles.
//!
//! Each role is a [`Proxy`](crate::proxy::Proxy) with some channels closed
//! off by [`Void`](crate::proxy::Void):
//!
//! | Role | Awaits | Yields |
//! |---|---|---|
//! | [`Producer`] | no | yes |
//! | [`Consumer`] | yes | no |
//! | [`Pipe`] | yes | yes |
//! | [`Effect`] | no | no |
//!
//! Stages are connected with `|`, and only a fully closed [`Effect`] can be
//! run. Connected stages share one result type: whichever stage finishes
//! first decides the result of the whole pipeline. Evaluation is lock-step:
//! a producer does not get past a yield until the consumer asks for the next
//! value.
//!
//! ```rust
//! use millrace::pipes::{consumer, pipe, producer};
//!
//! # tokio_test::block_on(async {
//! let pipeline = producer::yield_all(1..).map(|()| 0)
//!     | pipe::map(|n: u64| n * n)
//!     | pipe::filter(|n: &u64| n % 2 == 1)
//!     | consumer::fold_n(3, 0, |acc, n: u64| acc + n);
//!
//! // 1 + 9 + 25
//! assert_eq!(pipeline.run(&()).await, Ok::<_, String>(35));
//! # });
//! ```

pub mod consumer;
pub mod effect;
pub mod pipe;
pub mod producer;

pub use consumer::Consumer;
pub use effect::Effect;
pub use pipe::Pipe;
pub use producer::{Next, Producer};

#[cfg(test)]
mod tests;
