//! Small two-field value types used by the statistics layer.
//!
//! `Pair` is a plain ordered pair with no ordering of its own; it pairs a
//! filter's statistics key with its counter. `ComparablePair` adds a total
//! order (first component, then second) and is used wherever a report has to
//! be sorted deterministically.

use std::cmp::Ordering;

/// An ordered `(first, second)` pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub struct Pair<A, B> {
    first: A,
    second: B,
}

impl<A, B> Pair<A, B> {
    #[inline]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    #[inline]
    pub fn first(&self) -> &A {
        &self.first
    }

    #[inline]
    pub fn second(&self) -> &B {
        &self.second
    }
}

/// A pair ordered lexicographically: by `first`, ties broken by `second`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ComparablePair<A: Ord, B: Ord> {
    first: A,
    second: B,
}

impl<A: Ord, B: Ord> ComparablePair<A, B> {
    #[inline]
    pub fn new(first: A, second: B) -> Self {
        Self { first, second }
    }

    #[inline]
    pub fn first(&self) -> &A {
        &self.first
    }

    #[inline]
    pub fn second(&self) -> &B {
        &self.second
    }
}

impl<A: Ord, B: Ord> PartialOrd for ComparablePair<A, B> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl<A: Ord, B: Ord> Ord for ComparablePair<A, B> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.first
            .cmp(&other.first)
            .then_with(|| self.second.cmp(&other.second))
    }
}
