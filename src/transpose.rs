//! Transpose: two physical algorithms over the same logical operation
//! (§4.7).
//!
//! `transpose_bucket` counting-sorts entries into the new vector
//! dimension in `O(nnz + vlen_out)` — fast, but its counting array is
//! sized by the *output* vector count, which is this matrix's current
//! `vlen` (its row count if column-major). `transpose_quicksort` instead
//! comparison-sorts the `(i, j)` pairs directly, `O(nnz log nnz)` but with
//! no allocation proportional to a dimension — the only choice that
//! stays cheap when a hypersparse matrix has a huge `vlen` and few
//! entries. [`transpose`] picks between them the same way.

use crate::matrix::{Matrix, Slot};
use crate::types::Scalar;

/// Counting-sort transpose: `O(nnz + vlen_out)` time and an `O(vlen_out)`
/// counting array.
pub fn transpose_bucket<T: Scalar>(m: &Matrix<T>) -> Matrix<T> {
    let vlen_out = m.vdim();
    let vdim_out = m.vlen();

    let mut p = vec![0usize; vdim_out + 1];
    for k in 0..m.nvec() {
        let (lo, hi) = m.vector_bounds(k);
        for pos in lo..hi {
            let slot = m.raw_i()[pos];
            if !slot.is_zombie() {
                p[slot.index() + 1] += 1;
            }
        }
    }
    for idx in 0..vdim_out {
        p[idx + 1] += p[idx];
    }

    let nnz_out = p[vdim_out];
    let mut cursor = p.clone();
    let mut out_i = vec![Slot::Live(0); nnz_out];
    let mut out_x = vec![T::zero(); nnz_out];

    // Scanning input vectors in ascending vector-id order fills each
    // output bucket with entries already sorted by (new) row-in-vector
    // index, with no extra sort needed.
    for k in 0..m.nvec() {
        let j = m.vector_id(k);
        let (lo, hi) = m.vector_bounds(k);
        for pos in lo..hi {
            let slot = m.raw_i()[pos];
            if slot.is_zombie() {
                continue;
            }
            let i = slot.index();
            let dest = cursor[i];
            out_i[dest] = Slot::Live(j);
            out_x[dest] = m.raw_x()[pos];
            cursor[i] += 1;
        }
    }

    let mut out = Matrix::from_parts(vlen_out, vdim_out, m.is_csc(), p, None, out_i, out_x, m.hyper_ratio());
    out.conform();
    out
}

/// Comparison-sort transpose: `O(nnz log nnz)` time, no allocation sized
/// by a dimension. Always assembles into hypersparse form, since this
/// path is only taken when `vlen_out` would make a standard-form `p`
/// array wasteful.
pub fn transpose_quicksort<T: Scalar>(m: &Matrix<T>) -> Matrix<T> {
    let vlen_out = m.vdim();
    let vdim_out = m.vlen();

    let mut triples: Vec<(usize, usize, T)> = Vec::new();
    for k in 0..m.nvec() {
        let j = m.vector_id(k);
        let (lo, hi) = m.vector_bounds(k);
        for pos in lo..hi {
            let slot = m.raw_i()[pos];
            if !slot.is_zombie() {
                triples.push((slot.index(), j, m.raw_x()[pos]));
            }
        }
    }
    triples.sort_unstable_by_key(|&(i, j, _)| (i, j));

    let mut h = Vec::new();
    let mut p = vec![0usize];
    let mut out_i = Vec::with_capacity(triples.len());
    let mut out_x = Vec::with_capacity(triples.len());
    let mut idx = 0;
    while idx < triples.len() {
        let cur = triples[idx].0;
        while idx < triples.len() && triples[idx].0 == cur {
            out_i.push(Slot::Live(triples[idx].1));
            out_x.push(triples[idx].2);
            idx += 1;
        }
        h.push(cur);
        p.push(out_i.len());
    }

    let mut out =
        Matrix::from_parts(vlen_out, vdim_out, m.is_csc(), p, Some(h), out_i, out_x, m.hyper_ratio());
    out.conform();
    out
}

/// Transpose `m`, choosing the counting-sort or comparison-sort algorithm
/// by whichever avoids an allocation proportional to `m.vdim()` (the
/// output's `vlen`).
pub fn transpose<T: Scalar>(m: &Matrix<T>) -> Matrix<T> {
    if m.is_hypersparse() {
        transpose_quicksort(m)
    } else {
        transpose_bucket(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build;
    use crate::ops::builtin;

    #[test]
    fn bucket_transpose_matches_expected_entries() {
        // A(0,1)=10, A(1,0)=20 -> A^T(1,0)=10, A^T(0,1)=20.
        let i = vec![0, 1];
        let j = vec![1, 0];
        let x = vec![10, 20];
        let a = build(2, 2, false, &i, &j, &x, builtin::second(), 1.0).unwrap();
        let at = transpose_bucket(&a);
        assert_eq!(at.get_committed(1, 0), Some(10));
        assert_eq!(at.get_committed(0, 1), Some(20));
        assert_eq!(at.nvals(), 2);
    }

    #[test]
    fn quicksort_transpose_agrees_with_bucket_transpose() {
        let i = vec![0, 2, 1];
        let j = vec![2, 1, 1];
        let x = vec![1, 2, 3];
        let a = build(3, 3, false, &i, &j, &x, builtin::second(), 1.0).unwrap();
        let at_bucket = transpose_bucket(&a);
        let at_qs = transpose_quicksort(&a);
        for row in 0..3 {
            for col in 0..3 {
                assert_eq!(at_bucket.get_committed(row, col), at_qs.get_committed(row, col));
            }
        }
    }

    #[test]
    fn transpose_drops_zombies() {
        let i = vec![0, 1];
        let j = vec![0, 1];
        let x = vec![1, 2];
        let mut a = build(2, 2, false, &i, &j, &x, builtin::second(), 1.0).unwrap();
        a.remove_element(0, 0).unwrap();
        let at = transpose(&a);
        assert_eq!(at.nvals(), 1);
        assert_eq!(at.get_committed(0, 0), None);
    }
}
