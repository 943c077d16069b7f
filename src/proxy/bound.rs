//! Flattened bind chains.
//!
//! `bind` never wraps one continuation in another. It appends to a queue
//! attached to the node instead, and interpreting a node pops that queue in a
//! loop. Chains built by binding in a loop (`c = c & next`) therefore resume
//! on a flat stack however long they grow.
//!
//! Results travel through the queue as [`Value`]s. Each link knows the type it
//! receives and downcasts on entry.

use std::any::Any;
use std::collections::VecDeque;
use std::fmt;
use std::marker::PhantomData;

/// A result whose type is known only to the link that receives it.
pub type Value = Box<dyn Any + Send>;

type Link<P> = Box<dyn FnOnce(Value) -> P + Send>;

/// Pending binds, in the order they run.
pub(crate) struct Links<P>(VecDeque<Link<P>>);

impl<P> Links<P> {
    /// The next bind to apply.
    pub(crate) fn next(&mut self) -> Option<Link<P>> {
        self.0.pop_front()
    }

    /// Queue `earlier` ahead of the links already here.
    pub(crate) fn prepend(&mut self, mut earlier: Links<P>) {
        if earlier.0.len() < self.0.len() {
            while let Some(link) = earlier.0.pop_back() {
                self.0.push_front(link);
            }
        } else {
            earlier.0.append(&mut self.0);
            self.0 = earlier.0;
        }
    }
}

/// A node with binds still to apply.
///
/// `P` is the node type with its result erased to [`Value`]; `A` is the
/// result the chain finishes with. Resume it (`resume` on the matching node
/// type) to see the next request, response, step or result.
pub struct Bound<P, A> {
    head: Box<P>,
    links: Links<P>,
    _result: PhantomData<fn() -> A>,
}

impl<P, A> fmt::Debug for Bound<P, A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Bound")
            .field("links", &self.links.0.len())
            .finish_non_exhaustive()
    }
}

impl<P, A> Bound<P, A> {
    /// A chain with no binds yet.
    pub(crate) fn new(head: P) -> Self {
        Self::from_parts(head, Links(VecDeque::new()))
    }

    pub(crate) fn from_parts(head: P, links: Links<P>) -> Self {
        Bound {
            head: Box::new(head),
            links,
            _result: PhantomData,
        }
    }

    pub(crate) fn into_parts(self) -> (P, Links<P>) {
        (*self.head, self.links)
    }

    /// Append `link`, which receives this chain's result.
    pub(crate) fn push<B, F>(mut self, link: F) -> Bound<P, B>
    where
        A: Any,
        F: FnOnce(A) -> P + Send + 'static,
    {
        self.links.0.push_back(Box::new(move |value| link(unerase(value))));
        Bound {
            head: self.head,
            links: self.links,
            _result: PhantomData,
        }
    }

    /// Forget the result type.
    ///
    /// An erased chain is only ever merged into an enclosing one, whose next
    /// link receives the boxed result unchanged.
    pub(crate) fn erase(self) -> Bound<P, Value> {
        Bound {
            head: self.head,
            links: self.links,
            _result: PhantomData,
        }
    }
}

/// Recover a value erased by the link that produced it.
pub(crate) fn unerase<A: Any>(value: Value) -> A {
    match value.downcast::<A>() {
        Ok(value) => *value,
        Err(_) => unreachable!("bind chain passed a value of the wrong type"),
    }
}

/// Erase a result for the next link.
pub(crate) fn erase<A: Any + Send>(value: A) -> Value {
    Box::new(value)
}
