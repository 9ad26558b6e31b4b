//! Immutable, structurally shared singly-linked list.
//!
//! A `PersistentList` is never empty: the shortest list holds one element.
//! Prepending (`cons`) is O(1) and leaves the tail untouched, so any number of
//! longer lists can share a common suffix. Nodes are reference counted and
//! never mutated after construction, which makes a list `Send + Sync`
//! whenever its elements are, with no locking on the read path.
//!
//! Iteration is forward only (most recently prepended element first).
//! Chronological order requires materialising the list, see
//! [`PersistentList::to_vec_reversed`].

use std::fmt;
use std::hash::{Hash, Hasher};
use std::iter::FusedIterator;
use std::sync::Arc;

/// Cached lengths stop growing at this value instead of overflowing.
pub const MAX_CACHED_LEN: u32 = u32::MAX;

#[inline]
fn next_size(tail_size: u32) -> u32 {
    tail_size.saturating_add(1)
}

struct Node<T> {
    value: T,
    next: Option<PersistentList<T>>,
    size: u32,
}

impl<T> Drop for Node<T> {
    // Unlink uniquely owned successors one at a time so that dropping a long
    // chain does not recurse once per node.
    fn drop(&mut self) {
        let mut next = self.next.take();
        while let Some(list) = next {
            match Arc::try_unwrap(list.head) {
                Ok(mut node) => next = node.next.take(),
                Err(_) => break,
            }
        }
    }
}

/// Handle to the head node of a persistent list. Cloning is O(1).
pub struct PersistentList<T> {
    head: Arc<Node<T>>,
}

impl<T> PersistentList<T> {
    /// One-element list.
    pub fn singleton(value: T) -> Self {
        Self::cons(value, None)
    }

    /// Prepend `value` to `tail` (or start a new list when `tail` is `None`).
    pub fn cons(value: T, tail: Option<&Self>) -> Self {
        let size = tail.map_or(1, |t| next_size(t.head.size));
        Self {
            head: Arc::new(Node {
                value,
                next: tail.cloned(),
                size,
            }),
        }
    }

    /// Equivalent to `PersistentList::cons(value, Some(self))`.
    #[inline]
    pub fn prepend(&self, value: T) -> Self {
        Self::cons(value, Some(self))
    }

    #[inline]
    pub fn first(&self) -> &T {
        &self.head.value
    }

    #[inline]
    pub fn rest(&self) -> Option<&Self> {
        self.head.next.as_ref()
    }

    /// Number of elements, saturating at [`MAX_CACHED_LEN`].
    #[inline]
    pub fn len(&self) -> usize {
        self.head.size as usize
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    /// True when both handles point at the same node.
    #[inline]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.head, &other.head)
    }

    pub fn iter(&self) -> Iter<'_, T> {
        Iter {
            cursor: Some(self),
            remaining: self.len(),
        }
    }

    /// Elements in insertion (chronological) order: the element the list was
    /// started with comes first.
    pub fn to_vec_reversed(&self) -> Vec<T>
    where
        T: Clone,
    {
        let mut out: Vec<T> = self.iter().cloned().collect();
        out.reverse();
        out
    }

    /// Build a list by prepending each element in turn, so the last element
    /// yielded becomes `first()`. Returns `None` for an empty input.
    pub fn from_chronological<I>(items: I) -> Option<Self>
    where
        I: IntoIterator<Item = T>,
    {
        let mut list: Option<Self> = None;
        for item in items {
            list = Some(Self::cons(item, list.as_ref()));
        }
        list
    }
}

impl<T> Clone for PersistentList<T> {
    fn clone(&self) -> Self {
        Self {
            head: Arc::clone(&self.head),
        }
    }
}

impl<T: PartialEq> PartialEq for PersistentList<T> {
    fn eq(&self, other: &Self) -> bool {
        if self.len() != other.len() {
            return false;
        }
        let mut left = Some(self);
        let mut right = Some(other);
        while let (Some(l), Some(r)) = (left, right) {
            if l.ptr_eq(r) {
                return true;
            }
            if l.first() != r.first() {
                return false;
            }
            left = l.rest();
            right = r.rest();
        }
        left.is_none() && right.is_none()
    }
}

impl<T: Eq> Eq for PersistentList<T> {}

impl<T: Hash> Hash for PersistentList<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        state.write_usize(self.len());
        for value in self.iter() {
            value.hash(state);
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for PersistentList<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

/// Forward iterator over a [`PersistentList`].
pub struct Iter<'a, T> {
    cursor: Option<&'a PersistentList<T>>,
    remaining: usize,
}

impl<'a, T> Iterator for Iter<'a, T> {
    type Item = &'a T;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor?;
        self.cursor = current.rest();
        self.remaining = self.remaining.saturating_sub(1);
        Some(current.first())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match self.cursor {
            None => (0, Some(0)),
            Some(_) => (self.remaining.max(1), None),
        }
    }
}

impl<T> FusedIterator for Iter<'_, T> {}

impl<'a, T> IntoIterator for &'a PersistentList<T> {
    type Item = &'a T;
    type IntoIter = Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
