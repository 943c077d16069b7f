//! Tracing support for effects.
//!
//! Wraps any effect, closed pipelines included, in a `tracing` span that is
//! entered whenever the effect's future is polled.

use crate::effect::trait_def::Effect;

/// An effect wrapped in a tracing span.
///
/// Created by [`EffectTracingExt::instrument`].
#[derive(Debug)]
pub struct Instrument<E> {
    pub(crate) inner: E,
    pub(crate) span: tracing::Span,
}

impl<E> Effect for Instrument<E>
where
    E: Effect,
{
    type Output = E::Output;
    type Error = E::Error;
    type Env = E::Env;

    async fn run(self, env: &Self::Env) -> Result<Self::Output, Self::Error> {
        use tracing::Instrument as _;
        self.inner.run(env).instrument(self.span).await
    }
}

/// Extension trait for adding tracing instrumentation to effects.
pub trait EffectTracingExt: Effect {
    /// Wrap this effect in a tracing span.
    ///
    /// # Example
    ///
    /// ```rust
    /// use millrace::effect::{pure, EffectExt, EffectTracingExt};
    ///
    /// # tokio_test::block_on(async {
    /// let effect = pure::<_, String, ()>(42).instrument(tracing::info_span!("answer"));
    /// assert_eq!(effect.execute(&()).await, Ok(42));
    /// # });
    /// ```
    fn instrument(self, span: tracing::Span) -> Instrument<Self> {
        Instrument { inner: self, span }
    }
}

impl<E: Effect> EffectTracingExt for E {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::effect::constructors::{fail, pure};
    use crate::effect::ext::EffectExt;

    #[tokio::test]
    async fn test_instrument_returns_value() {
        let effect = pure::<_, String, ()>(42).instrument(tracing::info_span!("test_span"));
        assert_eq!(effect.execute(&()).await, Ok(42));
    }

    #[tokio::test]
    async fn test_error_in_span_propagates() {
        let effect =
            fail::<i32, _, ()>("oops".to_string()).instrument(tracing::info_span!("failing"));
        assert_eq!(effect.execute(&()).await, Err("oops".to_string()));
    }

    #[tokio::test]
    async fn test_nested_spans() {
        let inner = pure::<_, String, ()>(1).instrument(tracing::debug_span!("inner_op"));
        let outer = inner.map(|x| x + 1).instrument(tracing::debug_span!("outer_op"));
        assert_eq!(outer.execute(&()).await, Ok(2));
    }
}
