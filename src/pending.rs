//! Pending-tuple buffer (§3, §4.2).
//!
//! An unordered, append-only buffer of `(i, j, value)` triples awaiting
//! assembly by `wait`/`Build`. Per §9's design note ("in-place pending-
//! tuple buffer growth"), growth under concurrent writers is handled by
//! giving each task its own local buffer and concatenating them under a
//! single lock at phase end, rather than contending on one shared `Vec`.

use crate::types::Scalar;

/// One buffered `(i, j, value)` triple.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tuple<T> {
    /// Row-in-vector index.
    pub i: usize,
    /// Vector (global) index.
    pub j: usize,
    /// The pending value.
    pub v: T,
}

/// The append-only buffer attached to a matrix (§3).
///
/// Tuples may be out of order and may contain duplicate `(i, j)` pairs;
/// `opdup` (default [`crate::ops::builtin::second`]) resolves duplicates
/// left-to-right in append order when `wait` assembles them via `Build`
/// (§4.2, §4.7).
#[derive(Clone, Debug, Default)]
pub struct PendingTuples<T> {
    tuples: Vec<Tuple<T>>,
}

impl<T: Scalar> PendingTuples<T> {
    /// An empty pending buffer.
    pub fn new() -> Self {
        Self { tuples: Vec::new() }
    }

    /// Number of buffered tuples (including duplicates).
    pub fn len(&self) -> usize {
        self.tuples.len()
    }

    /// Whether the buffer holds no tuples.
    pub fn is_empty(&self) -> bool {
        self.tuples.is_empty()
    }

    /// Append one tuple, preserving append order for `opdup` tie-breaking.
    pub fn push(&mut self, i: usize, j: usize, v: T) {
        self.tuples.push(Tuple { i, j, v });
    }

    /// Merge another task-local buffer into this one, preserving the
    /// receiving buffer's tuples before the merged-in ones (so overall
    /// append order across tasks is: this buffer's prior content, then
    /// `other`'s, task by task, in the order tasks are merged).
    pub fn extend(&mut self, other: PendingTuples<T>) {
        self.tuples.extend(other.tuples);
    }

    /// Drain all tuples, in append order.
    pub fn drain(&mut self) -> Vec<Tuple<T>> {
        std::mem::take(&mut self.tuples)
    }

    /// Borrow the buffered tuples, in append order.
    pub fn as_slice(&self) -> &[Tuple<T>] {
        &self.tuples
    }

    /// Discard all buffered tuples.
    pub fn clear(&mut self) {
        self.tuples.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_preserves_append_order() {
        let mut p: PendingTuples<i32> = PendingTuples::new();
        p.push(0, 0, 5);
        p.push(2, 1, 7);
        p.push(0, 0, 9);
        let tuples = p.as_slice();
        assert_eq!(tuples.len(), 3);
        assert_eq!(tuples[0].v, 5);
        assert_eq!(tuples[2].v, 9);
    }

    #[test]
    fn extend_appends_after_existing_tuples() {
        let mut a: PendingTuples<i32> = PendingTuples::new();
        a.push(0, 0, 1);
        let mut b: PendingTuples<i32> = PendingTuples::new();
        b.push(1, 1, 2);
        a.extend(b);
        let got: Vec<_> = a.as_slice().iter().map(|t| t.v).collect();
        assert_eq!(got, vec![1, 2]);
    }
}
