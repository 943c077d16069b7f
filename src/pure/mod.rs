//! Environment-free stages.
//!
//! The types here mirror the [`pipes`](crate::pipes) roles without an
//! environment parameter. Their lifted steps run in `()`, so a stage can be
//! written before the environment of the pipeline it will join is known.
//! [`interpret`](Consumer::interpret) lowers one into the matching role for
//! any environment; `From` does the same.
//!
//! ```rust
//! use millrace::pipes::producer;
//! use millrace::pure;
//! use millrace::runtime::CancellationToken;
//!
//! # tokio_test::block_on(async {
//! let sum_two: pure::Consumer<i32, i32, String> =
//!     pure::Consumer::await_().bind(|a| pure::Consumer::await_().map(move |b| a + b));
//!
//! let token = CancellationToken::new();
//! let pipeline = producer::yield_all(vec![4, 5]).map(|()| 0)
//!     | sum_two.interpret::<CancellationToken>();
//! assert_eq!(pipeline.run(&token).await, Ok(9));
//! # });
//! ```

mod consumer;
mod pipe;
mod producer;

pub use consumer::Consumer;
pub use pipe::Pipe;
pub use producer::Producer;

#[cfg(test)]
mod tests;
