//! Reduce: to a scalar and to a vector (§4.8).
//!
//! Both fold through a [`Monoid`], stopping early the moment the running
//! value hits the monoid's terminal value if it has one — the same
//! short-circuit the dot-product `mxm` algorithm relies on (§4.5.4).

use crate::matrix::Matrix;
use crate::ops::{builtin, Monoid};
use crate::types::Scalar;

/// Fold every live entry of `a` through `monoid`, row-major vector order.
/// Returns `monoid.identity` for an empty matrix.
pub fn reduce_to_scalar<T: Scalar>(a: &Matrix<T>, monoid: &Monoid<T>) -> T {
    let mut acc = monoid.identity;
    let mut has_value = false;
    for k in 0..a.nvec() {
        let (lo, hi) = a.vector_bounds(k);
        for pos in lo..hi {
            let slot = a.raw_i()[pos];
            if slot.is_zombie() {
                continue;
            }
            let v = a.raw_x()[pos];
            acc = if has_value { monoid.op.apply(acc, v) } else { v };
            has_value = true;
            if monoid.is_terminal(&acc) {
                return acc;
            }
        }
    }
    if has_value {
        acc
    } else {
        monoid.identity
    }
}

/// Reduce `a` across its vectors into a single vector of length
/// `a.vlen()`, combining every vector's value at row `i` through
/// `monoid`. Rows with no live entry in any vector are absent from the
/// result, not filled with the identity.
pub fn reduce_to_vector<T: Scalar>(a: &Matrix<T>, monoid: &Monoid<T>) -> Matrix<T> {
    let mut acc: Vec<Option<T>> = vec![None; a.vlen()];
    for k in 0..a.nvec() {
        let (lo, hi) = a.vector_bounds(k);
        for pos in lo..hi {
            let slot = a.raw_i()[pos];
            if slot.is_zombie() {
                continue;
            }
            let i = slot.index();
            let v = a.raw_x()[pos];
            acc[i] = Some(match acc[i] {
                None => v,
                Some(prev) => monoid.op.apply(prev, v),
            });
        }
    }

    let mut i_list = Vec::new();
    let mut x_list = Vec::new();
    for (i, val) in acc.into_iter().enumerate() {
        if let Some(v) = val {
            i_list.push(i);
            x_list.push(v);
        }
    }
    let j_list = vec![0usize; i_list.len()];
    crate::build::build(a.vlen(), 1, false, &i_list, &j_list, &x_list, builtin::second(), a.hyper_ratio())
        .expect("reduce_to_vector assembles from already-unique, in-bounds coordinates")
}
