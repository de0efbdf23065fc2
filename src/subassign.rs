//! Subassign: `C(I, J)⟨M, repl⟩ = accum(C(I, J), A)`, or scalar expansion
//! thereof (§4.6).
//!
//! Built on the same extract-then-merge-then-scatter shape as the rest of
//! the write path: pull the addressed submatrix out with
//! [`crate::extract::extract`], combine it with `A` through
//! [`crate::mask::mask_accum_assign`] (the mask here is already sized to
//! the submatrix), then scatter the result back through
//! [`crate::matrix::Matrix::set_element`]/[`crate::matrix::Matrix::remove_element`]
//! so positions the merge cleared become zombies rather than silently
//! vanishing (§4.2's deferred-work discipline applies here too).
//!
//! [`subassign_scalar`] implements the scalar-expansion form: the scalar
//! `x` is treated as an implicit constant matrix over `(I, J)`, built by
//! `apply`-ing a bound `second` operator (§4.8's bind mechanism) over a
//! dense all-true pattern, then handed to [`subassign`] like any other
//! right-hand-side matrix.

use crate::apply::apply;
use crate::build::build;
use crate::descriptor::Descriptor;
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::extract::extract;
use crate::index::Index;
use crate::mask::mask_accum_assign;
use crate::matrix::Matrix;
use crate::ops::{builtin, BinaryOp};
use crate::types::Scalar;

/// A dense all-true `(rows, cols)` pattern matrix, the "implicit constant
/// matrix of appropriate shape" (§4.6) a scalar is expanded against.
pub(crate) fn dense_pattern(rows: usize, cols: usize, hyper_ratio: f64) -> Result<Matrix<bool>> {
    let mut i = Vec::with_capacity(rows * cols);
    let mut j = Vec::with_capacity(rows * cols);
    for jj in 0..cols {
        for ii in 0..rows {
            i.push(ii);
            j.push(jj);
        }
    }
    let x = vec![true; rows * cols];
    build(rows, cols, false, &i, &j, &x, builtin::second(), hyper_ratio)
}

/// Expand scalar `x` into a dense `(rows, cols)` matrix of type `T`, via
/// `apply` over [`dense_pattern`] with `second`'s second operand bound to
/// `x` — the mechanism §4.8 names for scalar broadcast.
pub(crate) fn expand_scalar<T: Scalar>(
    rows: usize,
    cols: usize,
    hyper_ratio: f64,
    x: T,
    engine: &Engine,
) -> Result<Matrix<T>> {
    let pattern = dense_pattern(rows, cols, hyper_ratio)?;
    let bound = builtin::second::<bool, T>().bind_second(x);
    Ok(apply(&pattern, &bound, engine))
}

/// `C(I, J)⟨M, repl⟩ = accum(C(I, J), A)`. `mask`, if given, must already
/// be shaped `(|I|, |J|)` — see [`crate::assign::assign`] for the
/// full-size-mask variant.
pub fn subassign<T: Scalar, M: Scalar>(
    c: &mut Matrix<T>,
    i_idx: &Index,
    j_idx: &Index,
    mask: Option<&Matrix<M>>,
    descriptor: &Descriptor,
    a: &Matrix<T>,
    accum: Option<BinaryOp<T, T, T>>,
) -> Result<()> {
    let i_list = i_idx.resolve(c.vlen())?;
    let j_list = j_idx.resolve(c.vdim())?;
    if a.vlen() != i_list.len() || a.vdim() != j_list.len() {
        return Err(Error::dims("subassign: A vs (I, J)", (i_list.len(), j_list.len()), a.dims()));
    }

    let mut csub = extract(c, i_idx, j_idx)?;
    mask_accum_assign(&mut csub, mask, descriptor, a, accum)?;

    for (nj, &oj) in j_list.iter().enumerate() {
        for (ni, &oi) in i_list.iter().enumerate() {
            match csub.get_committed(ni, nj) {
                Some(v) => c.set_element(oi, oj, v)?,
                None => c.remove_element(oi, oj)?,
            }
        }
    }
    Ok(())
}

/// `C(I, J)⟨M, repl⟩ = accum(C(I, J), x)`: the scalar-expansion form of
/// [`subassign`], broadcasting `x` over every addressed `(i, j)` (§4.6).
pub fn subassign_scalar<T: Scalar, M: Scalar>(
    c: &mut Matrix<T>,
    i_idx: &Index,
    j_idx: &Index,
    mask: Option<&Matrix<M>>,
    descriptor: &Descriptor,
    x: T,
    accum: Option<BinaryOp<T, T, T>>,
    engine: &Engine,
) -> Result<()> {
    let i_list = i_idx.resolve(c.vlen())?;
    let j_list = j_idx.resolve(c.vdim())?;
    let expanded = expand_scalar(i_list.len(), j_list.len(), c.hyper_ratio(), x, engine)?;
    subassign(c, i_idx, j_idx, mask, descriptor, &expanded, accum)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build;
    use crate::ops::builtin;

    fn m(vlen: usize, vdim: usize, entries: &[(usize, usize, i32)]) -> Matrix<i32> {
        let i: Vec<usize> = entries.iter().map(|e| e.0).collect();
        let j: Vec<usize> = entries.iter().map(|e| e.1).collect();
        let x: Vec<i32> = entries.iter().map(|e| e.2).collect();
        build(vlen, vdim, false, &i, &j, &x, builtin::second(), 1.0).unwrap()
    }

    #[test]
    fn subassign_writes_into_the_addressed_block() {
        let mut c = m(3, 3, &[(0, 0, 1)]);
        let a = m(2, 2, &[(0, 0, 9), (1, 1, 8)]);
        subassign::<i32, bool>(
            &mut c,
            &Index::List(vec![1, 2]),
            &Index::List(vec![1, 2]),
            None,
            &Descriptor::new(),
            &a,
            None,
        )
        .unwrap();
        assert_eq!(c.get_committed(0, 0), Some(1));
        assert_eq!(c.get_committed(1, 1), Some(9));
        assert_eq!(c.get_committed(2, 2), Some(8));
    }

    #[test]
    fn subassign_with_replace_clears_masked_out_positions() {
        let mut c = m(2, 2, &[(0, 0, 5), (1, 1, 6)]);
        let a = m(2, 2, &[]);
        let mask = m(2, 2, &[(1, 1, 1)]);
        subassign(&mut c, &Index::All, &Index::All, Some(&mask), &Descriptor::new().replace(true), &a, None)
            .unwrap();
        assert_eq!(c.get_committed(0, 0), None);
        assert_eq!(c.get_committed(1, 1), Some(6));
    }

    #[test]
    fn shape_mismatch_errors() {
        let mut c = m(3, 3, &[]);
        let a = m(3, 3, &[]);
        let res = subassign::<i32, bool>(
            &mut c,
            &Index::List(vec![0, 1]),
            &Index::List(vec![0, 1]),
            None,
            &Descriptor::new(),
            &a,
            None,
        );
        assert!(res.is_err());
    }

    #[test]
    fn subassign_scalar_broadcasts_x_over_the_addressed_block() {
        let mut c = m(3, 3, &[(0, 0, 1)]);
        let engine = Engine::new();
        subassign_scalar::<i32, bool>(
            &mut c,
            &Index::List(vec![1, 2]),
            &Index::List(vec![1, 2]),
            None,
            &Descriptor::new(),
            9,
            None,
            &engine,
        )
        .unwrap();
        assert_eq!(c.get_committed(0, 0), Some(1));
        assert_eq!(c.get_committed(1, 1), Some(9));
        assert_eq!(c.get_committed(2, 2), Some(9));
        assert_eq!(c.get_committed(1, 2), Some(9));
    }

    #[test]
    fn subassign_scalar_honours_the_mask() {
        let mut c = m(2, 2, &[]);
        let mask = m(2, 2, &[(1, 1, 1)]);
        let engine = Engine::new();
        subassign_scalar(&mut c, &Index::All, &Index::All, Some(&mask), &Descriptor::new(), 4, None, &engine)
            .unwrap();
        assert_eq!(c.get_committed(0, 0), None);
        assert_eq!(c.get_committed(1, 1), Some(4));
    }
}
