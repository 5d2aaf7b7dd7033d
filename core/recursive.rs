//! Lazy breadth-first flattening of arbitrarily shaped trees.
//!
//! The walker knows nothing about the nodes it visits. The caller supplies a
//! child policy that returns the children of a node, or nothing to stop
//! descent there. All roots are yielded first, in input order, then a single
//! FIFO queue is drained across the whole forest: the children of every root
//! in root order, then grandchildren, and so on.
//!
//! Children are requested only when the consumer pulls past everything that
//! was queued before them, so a consumer that stops early never pays for the
//! branches it did not reach. Nothing is cached or deduplicated: a node that
//! is reachable along two edges is yielded twice.

use std::collections::VecDeque;
use std::convert::Infallible;

/// Iterator returned by [`try_flatten`].
///
/// Yields `Err` when the child policy fails for a node; that node then
/// contributes no children and iteration continues with what was already
/// queued.
#[derive(Debug)]
pub struct BreadthFirst<R, F, T> {
    roots: R,
    child_policy: F,
    /// Yielded nodes whose children have not been requested yet.
    pending: VecDeque<T>,
    /// Discovered nodes not yet yielded.
    ready: VecDeque<T>,
}

impl<R, F, T, I, E> Iterator for BreadthFirst<R, F, T>
where
    R: Iterator<Item = T>,
    T: Clone,
    F: FnMut(&T) -> Result<I, E>,
    I: IntoIterator,
    I::Item: Into<Option<T>>,
{
    type Item = Result<T, E>;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.roots.next() {
            self.pending.push_back(root.clone());
            return Some(Ok(root));
        }

        loop {
            if let Some(node) = self.ready.pop_front() {
                self.pending.push_back(node.clone());
                return Some(Ok(node));
            }

            let parent = self.pending.pop_front()?;
            match (self.child_policy)(&parent) {
                Ok(children) => {
                    // Absent entries are skipped without affecting siblings.
                    self.ready
                        .extend(children.into_iter().filter_map(Into::into));
                }
                Err(e) => return Some(Err(e)),
            }
        }
    }
}

/// Flattens `roots` and everything below them, breadth first.
///
/// `child_policy` may return any iterable of `T` or `Option<T>`; `None`
/// entries are absent references and are skipped.
pub fn try_flatten<R, F, T, I, E>(roots: R, child_policy: F) -> BreadthFirst<R::IntoIter, F, T>
where
    R: IntoIterator<Item = T>,
    T: Clone,
    F: FnMut(&T) -> Result<I, E>,
    I: IntoIterator,
    I::Item: Into<Option<T>>,
{
    BreadthFirst {
        roots: roots.into_iter(),
        child_policy,
        pending: VecDeque::new(),
        ready: VecDeque::new(),
    }
}

/// Infallible form of [`try_flatten`].
pub fn flatten<R, F, T, I>(roots: R, mut child_policy: F) -> impl Iterator<Item = T>
where
    R: IntoIterator<Item = T>,
    T: Clone,
    F: FnMut(&T) -> I,
    I: IntoIterator,
    I::Item: Into<Option<T>>,
{
    try_flatten(roots, move |node: &T| Ok::<I, Infallible>(child_policy(node))).map(
        |result| match result {
            Ok(node) => node,
            Err(never) => match never {},
        },
    )
}

/// Method-call forms of [`flatten`] and [`try_flatten`].
pub trait RecursiveExt: Iterator + Sized
where
    Self::Item: Clone,
{
    fn breadth_first<F, I>(self, child_policy: F) -> impl Iterator<Item = Self::Item>
    where
        F: FnMut(&Self::Item) -> I,
        I: IntoIterator,
        I::Item: Into<Option<Self::Item>>,
    {
        flatten(self, child_policy)
    }

    fn try_breadth_first<F, I, E>(self, child_policy: F) -> BreadthFirst<Self, F, Self::Item>
    where
        F: FnMut(&Self::Item) -> Result<I, E>,
        I: IntoIterator,
        I::Item: Into<Option<Self::Item>>,
    {
        try_flatten(self, child_policy)
    }
}

impl<It> RecursiveExt for It
where
    It: Iterator,
    It::Item: Clone,
{
}
