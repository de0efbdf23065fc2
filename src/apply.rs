//! Apply: pattern-preserving unary map (§4.8).
//!
//! `C(i,j) = op(A(i,j))` for every live entry of `A`; the sparsity
//! pattern itself never changes; one task per vector, the same slicing
//! `ewise` and `select` use.
//!
//! `A`'s stored type `S` need not equal `op`'s declared domain `X`: each
//! value is typecast into `X` through [`crate::types::cast`] before `op`
//! runs, the way the 11x11 built-in typecast matrix (§6) covers operands
//! whose declared type doesn't match the value actually stored (§4.8).

use crate::engine::Engine;
use crate::matrix::{Matrix, Slot};
use crate::mxm::{assemble_columns, live_entries};
use crate::ops::UnaryOp;
use crate::types::{cast, CastFrom, Scalar};
use rayon::prelude::*;

/// `C(i,j) = op(cast(A(i,j)))` for every live `(i,j)` in `A`, casting
/// `A`'s stored type `S` into `op`'s declared domain `X` first.
pub fn apply<S: Scalar, X: CastFrom<S>, Z: Scalar>(
    a: &Matrix<S>,
    op: &UnaryOp<X, Z>,
    engine: &Engine,
) -> Matrix<Z> {
    let vdim = a.vdim();
    let per_vector: Vec<(Vec<Slot>, Vec<Z>)> = engine.install(|| {
        (0..vdim)
            .into_par_iter()
            .map(|j| {
                let (idx, val) = live_entries(a, j);
                let out_i: Vec<Slot> = idx.into_iter().map(Slot::Live).collect();
                let out_z: Vec<Z> = val.into_iter().map(|v| op.apply(cast(v))).collect();
                (out_i, out_z)
            })
            .collect()
    });
    assemble_columns(a.vlen(), vdim, a.is_csc(), per_vector, a.hyper_ratio())
}
