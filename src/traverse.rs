//! Traverse and sequence utilities.
//!
//! Two flavours:
//!
//! - **Collections**: `sequence` treats each inner vector as a set of
//!   alternatives and produces every combination, in row-major order.
//!   `Vec<Vec<T>>` → `Vec<Vec<T>>`.
//! - **Effects**: `sequence_effect` runs effects one after another and
//!   collects their values, stopping at the first failure.
//!   `Vec<impl Effect<Output = T>>` → `BoxedEffect<Vec<T>, E, Env>`.
//!
//! # Examples
//!
//! ```
//! use millrace::traverse::sequence;
//!
//! let pairs = sequence(vec![vec![1, 2], vec![10, 20, 30]]);
//! assert_eq!(
//!     pairs,
//!     vec![
//!         vec![1, 10], vec![1, 20], vec![1, 30],
//!         vec![2, 10], vec![2, 20], vec![2, 30],
//!     ]
//! );
//! ```

use crate::effect::{from_async, BoxedEffect, Effect, EffectExt};

/// Map every element to its alternatives and combine them.
///
/// Equivalent to `sequence(iter.map(f))`.
///
/// # Examples
///
/// ```
/// use millrace::traverse::traverse;
///
/// let signs = traverse(vec![1, 2], |n| vec![n, -n]);
/// assert_eq!(signs, vec![vec![1, 2], vec![1, -2], vec![-1, 2], vec![-1, -2]]);
/// ```
pub fn traverse<T, U, F, I>(iter: I, f: F) -> Vec<Vec<U>>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Vec<U>,
    U: Clone,
{
    sequence(iter.into_iter().map(f))
}

/// Every way of picking one element from each inner collection.
///
/// An empty outer collection has exactly one combination, the empty one. Any
/// empty inner collection leaves no combinations at all.
///
/// # Examples
///
/// ```
/// use millrace::traverse::sequence;
///
/// assert_eq!(sequence(Vec::<Vec<i32>>::new()), vec![Vec::<i32>::new()]);
/// assert!(sequence(vec![Vec::<i32>::new(), vec![]]).is_empty());
/// ```
pub fn sequence<T, I, J>(iter: I) -> Vec<Vec<T>>
where
    I: IntoIterator<Item = J>,
    J: IntoIterator<Item = T>,
    T: Clone,
{
    iter.into_iter()
        .fold(vec![Vec::new()], |combinations, alternatives| {
            let alternatives: Vec<T> = alternatives.into_iter().collect();
            combinations
                .iter()
                .flat_map(|prefix| {
                    alternatives.iter().map(move |choice| {
                        let mut combination = prefix.clone();
                        combination.push(choice.clone());
                        combination
                    })
                })
                .collect()
        })
}

/// Traverse a collection with an effect function.
///
/// Applies `f` to each element and runs the effects in order, collecting all
/// results. Uses fail-fast semantics: stops at the first error.
///
/// # Examples
///
/// ```
/// use millrace::effect::{pure, Effect};
/// use millrace::traverse::traverse_effect;
///
/// # tokio_test::block_on(async {
/// let result = traverse_effect(vec![1, 2, 3], |x| pure::<_, String, ()>(x * 2));
/// assert_eq!(result.run(&()).await, Ok(vec![2, 4, 6]));
/// # });
/// ```
pub fn traverse_effect<T, U, E, Env, F, Eff, I>(iter: I, f: F) -> BoxedEffect<Vec<U>, E, Env>
where
    I: IntoIterator<Item = T>,
    F: Fn(T) -> Eff,
    Eff: Effect<Output = U, Error = E, Env = Env> + 'static,
    U: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    sequence_effect(iter.into_iter().map(f))
}

/// Sequence a collection of effects.
///
/// Runs the effects one after another with fail-fast semantics.
pub fn sequence_effect<T, E, Env, Eff, I>(iter: I) -> BoxedEffect<Vec<T>, E, Env>
where
    I: IntoIterator<Item = Eff>,
    Eff: Effect<Output = T, Error = E, Env = Env> + 'static,
    T: Send + 'static,
    E: Send + 'static,
    Env: Clone + Send + Sync + 'static,
{
    let effects: Vec<Eff> = iter.into_iter().collect();
    from_async(move |env: &Env| {
        let env = env.clone();
        async move {
            let mut values = Vec::with_capacity(effects.len());
            for effect in effects {
                values.push(effect.run(&env).await?);
            }
            Ok::<_, E>(values)
        }
    })
    .boxed()
}
