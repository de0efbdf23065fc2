//! Build: tuples to matrix (§4.7).
//!
//! Sort the `(I, J, X)` triples into vector-major order, fold duplicate
//! `(i, j)` pairs through `dup` in strict append order (the explicit
//! insertion-order contract resolving this crate's one Open Question from
//! the construction side), then assemble the compressed-vector arrays in
//! one pass and conform the result to standard or hypersparse form.

use crate::error::{Error, Result};
use crate::matrix::{Matrix, Slot};
use crate::ops::BinaryOp;
use crate::types::Scalar;

/// Build a matrix from coordinate triples.
///
/// `i_list[k]`/`j_list[k]` are in vector orientation (row-in-vector,
/// vector id), the same convention [`Matrix::set_element`] uses — callers
/// translating from user-facing `(row, col)` must already have applied
/// the `is_csc` swap.
///
/// Duplicate `(i, j)` pairs are combined via `dup`, applied left to right
/// in the order the triples were given: `dup(dup(x1, x2), x3)` for three
/// tuples targeting the same position in input order `x1, x2, x3` (§4.2,
/// §4.7). This is the one point where insertion order is externally
/// observable, so it is part of this function's contract, not an
/// incidental detail of how the sort happens to be implemented.
pub fn build<T: Scalar>(
    vlen: usize,
    vdim: usize,
    is_csc: bool,
    i_list: &[usize],
    j_list: &[usize],
    x_list: &[T],
    dup: BinaryOp<T, T, T>,
    hyper_ratio: f64,
) -> Result<Matrix<T>> {
    let n = i_list.len();
    if j_list.len() != n || x_list.len() != n {
        return Err(Error::InvalidObject(
            "Build: I, J, and X must have equal length".into(),
        ));
    }
    for (&i, &j) in i_list.iter().zip(j_list.iter()) {
        if i >= vlen {
            return Err(Error::IndexOutOfBounds { index: i, bound: vlen });
        }
        if j >= vdim {
            return Err(Error::IndexOutOfBounds { index: j, bound: vdim });
        }
    }

    // Stable sort by (vector, row); ties (equal (i, j)) keep their
    // original relative order, which is exactly the append order `dup`
    // needs to fold correctly.
    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| (j_list[a], i_list[a]).cmp(&(j_list[b], i_list[b])));

    let mut p = vec![0usize; vdim + 1];
    let mut out_i = Vec::with_capacity(n);
    let mut out_x = Vec::with_capacity(n);

    let mut pos = 0;
    while pos < n {
        let first = order[pos];
        let (cur_j, cur_i) = (j_list[first], i_list[first]);
        let mut acc = x_list[first];
        let mut end = pos + 1;
        while end < n {
            let next = order[end];
            if j_list[next] != cur_j || i_list[next] != cur_i {
                break;
            }
            acc = dup.apply(acc, x_list[next]);
            end += 1;
        }
        out_i.push(Slot::Live(cur_i));
        out_x.push(acc);
        p[cur_j + 1] += 1;
        pos = end;
    }
    for k in 0..vdim {
        p[k + 1] += p[k];
    }

    let mut m = Matrix::from_parts(vlen, vdim, is_csc, p, None, out_i, out_x, hyper_ratio);
    m.conform();
    Ok(m)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::builtin;

    #[test]
    fn duplicates_fold_left_to_right_via_dup() {
        // Three tuples at (0, 0): 1, then 2, then 3, with `second` (y
        // wins) should leave 3; with `plus` should leave 6.
        let i = vec![0, 0, 0];
        let j = vec![0, 0, 0];
        let x = vec![1, 2, 3];
        let m = build(2, 2, false, &i, &j, &x, builtin::second(), 1.0).unwrap();
        assert_eq!(m.get_committed(0, 0), Some(3));

        let m = build(2, 2, false, &i, &j, &x, builtin::plus(), 1.0).unwrap();
        assert_eq!(m.get_committed(0, 0), Some(6));
    }

    #[test]
    fn builds_sorted_vector_major_regardless_of_input_order() {
        let i = vec![1, 0, 0];
        let j = vec![0, 1, 0];
        let x = vec![10, 20, 30];
        let m = build(2, 2, false, &i, &j, &x, builtin::second(), 1.0).unwrap();
        assert_eq!(m.nvals(), 3);
        assert_eq!(m.get_committed(1, 0), Some(10));
        assert_eq!(m.get_committed(0, 1), Some(20));
        assert_eq!(m.get_committed(0, 0), Some(30));
    }

    #[test]
    fn mismatched_lengths_error() {
        let i = vec![0];
        let j = vec![0, 1];
        let x = vec![1];
        assert!(build(2, 2, false, &i, &j, &x, builtin::second(), 1.0).is_err());
    }

    #[test]
    fn out_of_bounds_index_errors() {
        let i = vec![5];
        let j = vec![0];
        let x = vec![1];
        assert!(build(2, 2, false, &i, &j, &x, builtin::second(), 1.0).is_err());
    }

    #[test]
    fn conforms_to_hypersparse_when_sparse_enough() {
        // vdim = 100, only one occupied vector: ratio 1/100 <= 1/16.
        let i = vec![0];
        let j = vec![42];
        let x = vec![1];
        let m = build(10, 100, false, &i, &j, &x, builtin::second(), 1.0 / 16.0).unwrap();
        assert!(m.is_hypersparse());
    }
}
