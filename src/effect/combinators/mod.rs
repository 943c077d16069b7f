//! Concrete step types.
//!
//! Returned by the constructors and by [`EffectExt::map`](crate::effect::EffectExt::map).
//! None of them allocate; a step is boxed only when it is lifted into a
//! pipeline or erased with `.boxed()`.

mod from_async;
mod from_fn;
mod map;
mod ready;

pub use from_async::FromAsync;
pub use from_fn::FromFn;
pub use map::Map;
pub use ready::Ready;
