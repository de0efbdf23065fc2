//! Heap-based saxpy matrix multiply (§4.5.3).
//!
//! Merges the contributing `A` columns for an output column through a
//! binary min-heap keyed by row, so entries emerge already in sorted
//! order with no dense workspace and no final sort — the better choice
//! than Gustavson when the output column is sparse relative to `vlen`.

use crate::engine::Engine;
use crate::error::Result;
use crate::matrix::{Matrix, Slot};
use crate::ops::Semiring;
use crate::types::Scalar;
use rayon::prelude::*;
use std::cmp::{Ordering, Reverse};
use std::collections::BinaryHeap;

struct Cursor<Y> {
    row: usize,
    pos: usize,
    end: usize,
    b_val: Y,
}

impl<Y> PartialEq for Cursor<Y> {
    fn eq(&self, other: &Self) -> bool {
        self.row == other.row
    }
}
impl<Y> Eq for Cursor<Y> {}
impl<Y> PartialOrd for Cursor<Y> {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl<Y> Ord for Cursor<Y> {
    fn cmp(&self, other: &Self) -> Ordering {
        self.row.cmp(&other.row)
    }
}

fn push_next<X: Scalar, Y: Copy>(
    heap: &mut BinaryHeap<Reverse<Cursor<Y>>>,
    a: &Matrix<X>,
    pos: usize,
    end: usize,
    b_val: Y,
) {
    let mut p = pos + 1;
    while p < end && a.raw_i()[p].is_zombie() {
        p += 1;
    }
    if p < end {
        heap.push(Reverse(Cursor { row: a.raw_i()[p].index(), pos: p, end, b_val }));
    }
}

fn heap_column<X: Scalar, Y: Scalar, Z: Scalar>(
    a: &Matrix<X>,
    b: &Matrix<Y>,
    j: usize,
    semiring: &Semiring<X, Y, Z>,
) -> (Vec<Slot>, Vec<Z>) {
    let mut heap: BinaryHeap<Reverse<Cursor<Y>>> = BinaryHeap::new();

    if let Some(kb) = b.find_vector(j) {
        let (lo, hi) = b.vector_bounds(kb);
        for pos in lo..hi {
            let bslot = b.raw_i()[pos];
            if bslot.is_zombie() {
                continue;
            }
            let k = bslot.index();
            let b_val = b.raw_x()[pos];
            let Some(ka) = a.find_vector(k) else { continue };
            let (alo, ahi) = a.vector_bounds(ka);
            let mut p = alo;
            while p < ahi && a.raw_i()[p].is_zombie() {
                p += 1;
            }
            if p < ahi {
                heap.push(Reverse(Cursor { row: a.raw_i()[p].index(), pos: p, end: ahi, b_val }));
            }
        }
    }

    let mut out_i = Vec::new();
    let mut out_z = Vec::new();
    while let Some(Reverse(top)) = heap.pop() {
        let row = top.row;
        let mut acc = semiring.mul.apply(a.raw_x()[top.pos], top.b_val);
        push_next(&mut heap, a, top.pos, top.end, top.b_val);

        while let Some(Reverse(peeked)) = heap.peek() {
            if peeked.row != row {
                break;
            }
            let Reverse(next) = heap.pop().unwrap();
            let contribution = semiring.mul.apply(a.raw_x()[next.pos], next.b_val);
            acc = semiring.add.op.apply(acc, contribution);
            push_next(&mut heap, a, next.pos, next.end, next.b_val);
        }

        out_i.push(Slot::Live(row));
        out_z.push(acc);
    }
    (out_i, out_z)
}

pub fn mxm_heap<X: Scalar, Y: Scalar, Z: Scalar>(
    a: &Matrix<X>,
    b: &Matrix<Y>,
    semiring: &Semiring<X, Y, Z>,
    engine: &Engine,
) -> Result<Matrix<Z>> {
    let vlen_out = a.vlen();
    let vdim_out = b.vdim();
    let per_vector: Vec<(Vec<Slot>, Vec<Z>)> = engine
        .install(|| (0..vdim_out).into_par_iter().map(|j| heap_column(a, b, j, semiring)).collect());
    Ok(super::assemble_columns(vlen_out, vdim_out, a.is_csc(), per_vector, a.hyper_ratio()))
}
