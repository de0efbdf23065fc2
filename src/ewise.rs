//! Element-wise add and multiply (§4.4).
//!
//! Both dispatch one task per vector across the `Engine`'s pool (the
//! coarse per-vector slicing the saxpy MxM variants also use, §4.5.1),
//! then assemble the per-vector results with the same select/count/fill
//! shape as `Build`: select each vector's merged entries in parallel,
//! count them into a prefix-summed `p` array, then fill the final arrays
//! by concatenation.
//!
//! `ewise_add` takes a [`Monoid`] (not a bare [`BinaryOp`]) because a
//! union op needs an answer for positions only one operand has; passing
//! that value through unchanged is exactly what a monoid's identity
//! represents. `ewise_mult` only ever touches positions both operands
//! have, so a plain `BinaryOp` suffices.

use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::matrix::{Matrix, Slot};
use crate::ops::{BinaryOp, Monoid};
use crate::types::Scalar;
use rayon::prelude::*;
use std::cmp::Ordering;

fn vector_slice<T: Scalar>(m: &Matrix<T>, j: usize) -> (Vec<usize>, Vec<T>) {
    match m.find_vector(j) {
        None => (Vec::new(), Vec::new()),
        Some(k) => {
            let (lo, hi) = m.vector_bounds(k);
            let mut idx = Vec::with_capacity(hi - lo);
            let mut val = Vec::with_capacity(hi - lo);
            for pos in lo..hi {
                let slot = m.raw_i()[pos];
                if !slot.is_zombie() {
                    idx.push(slot.index());
                    val.push(m.raw_x()[pos]);
                }
            }
            (idx, val)
        }
    }
}

fn merge_union<T: Scalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    j: usize,
    monoid: &Monoid<T>,
) -> (Vec<Slot>, Vec<T>) {
    let (ai, ax) = vector_slice(a, j);
    let (bi, bx) = vector_slice(b, j);
    let mut out_i = Vec::with_capacity(ai.len() + bi.len());
    let mut out_x = Vec::with_capacity(ai.len() + bi.len());
    let (mut pi, mut pj) = (0, 0);
    while pi < ai.len() && pj < bi.len() {
        match ai[pi].cmp(&bi[pj]) {
            Ordering::Less => {
                out_i.push(Slot::Live(ai[pi]));
                out_x.push(ax[pi]);
                pi += 1;
            }
            Ordering::Greater => {
                out_i.push(Slot::Live(bi[pj]));
                out_x.push(bx[pj]);
                pj += 1;
            }
            Ordering::Equal => {
                out_i.push(Slot::Live(ai[pi]));
                out_x.push(monoid.op.apply(ax[pi], bx[pj]));
                pi += 1;
                pj += 1;
            }
        }
    }
    out_i.extend(ai[pi..].iter().copied().map(Slot::Live));
    out_x.extend_from_slice(&ax[pi..]);
    out_i.extend(bi[pj..].iter().copied().map(Slot::Live));
    out_x.extend_from_slice(&bx[pj..]);
    (out_i, out_x)
}

fn merge_intersect<T: Scalar, Z: Scalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    j: usize,
    op: BinaryOp<T, T, Z>,
) -> (Vec<Slot>, Vec<Z>) {
    let (ai, ax) = vector_slice(a, j);
    let (bi, bx) = vector_slice(b, j);
    let mut out_i = Vec::new();
    let mut out_z = Vec::new();
    let (mut pi, mut pj) = (0, 0);
    while pi < ai.len() && pj < bi.len() {
        match ai[pi].cmp(&bi[pj]) {
            Ordering::Less => pi += 1,
            Ordering::Greater => pj += 1,
            Ordering::Equal => {
                out_i.push(Slot::Live(ai[pi]));
                out_z.push(op.apply(ax[pi], bx[pj]));
                pi += 1;
                pj += 1;
            }
        }
    }
    (out_i, out_z)
}

fn assemble<Z: Scalar>(
    vlen: usize,
    vdim: usize,
    is_csc: bool,
    per_vector: Vec<(Vec<Slot>, Vec<Z>)>,
    hyper_ratio: f64,
) -> Matrix<Z> {
    let mut p = vec![0usize; vdim + 1];
    for (j, (out_i, _)) in per_vector.iter().enumerate() {
        p[j + 1] = out_i.len();
    }
    for k in 0..vdim {
        p[k + 1] += p[k];
    }
    let total = p[vdim];
    let mut i_all = Vec::with_capacity(total);
    let mut x_all = Vec::with_capacity(total);
    for (out_i, out_x) in per_vector {
        i_all.extend(out_i);
        x_all.extend(out_x);
    }
    let mut out = Matrix::from_parts(vlen, vdim, is_csc, p, None, i_all, x_all, hyper_ratio);
    out.conform();
    out
}

/// `T(i,j) = A(i,j) ⊕ B(i,j)` where both exist, else whichever exists
/// unchanged (§4.4).
pub fn ewise_add<T: Scalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    monoid: &Monoid<T>,
    engine: &Engine,
) -> Result<Matrix<T>> {
    if a.dims() != b.dims() {
        return Err(Error::dims("ewise_add", a.dims(), b.dims()));
    }
    let vdim = a.vdim();
    let per_vector: Vec<(Vec<Slot>, Vec<T>)> =
        engine.install(|| (0..vdim).into_par_iter().map(|j| merge_union(a, b, j, monoid)).collect());
    Ok(assemble(a.vlen(), vdim, a.is_csc(), per_vector, a.hyper_ratio()))
}

/// `T(i,j) = A(i,j) ⊗ B(i,j)` only where both exist (§4.4).
pub fn ewise_mult<T: Scalar, Z: Scalar>(
    a: &Matrix<T>,
    b: &Matrix<T>,
    op: BinaryOp<T, T, Z>,
    engine: &Engine,
) -> Result<Matrix<Z>> {
    if a.dims() != b.dims() {
        return Err(Error::dims("ewise_mult", a.dims(), b.dims()));
    }
    let vdim = a.vdim();
    let per_vector: Vec<(Vec<Slot>, Vec<Z>)> =
        engine.install(|| (0..vdim).into_par_iter().map(|j| merge_intersect(a, b, j, op)).collect());
    Ok(assemble(a.vlen(), vdim, a.is_csc(), per_vector, a.hyper_ratio()))
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
    fn ewise_add_unions_with_monoid_combine_on_overlap() {
        let engine = Engine::new();
        let a = m(2, 2, &[(0, 0, 1), (1, 1, 2)]);
        let b = m(2, 2, &[(0, 0, 10), (0, 1, 5)]);
        let t = ewise_add(&a, &b, &builtin::plus_monoid::<i32>(), &engine).unwrap();
        assert_eq!(t.get_committed(0, 0), Some(11));
        assert_eq!(t.get_committed(0, 1), Some(5));
        assert_eq!(t.get_committed(1, 1), Some(2));
        assert_eq!(t.nvals(), 3);
    }

    #[test]
    fn ewise_mult_keeps_only_the_intersection() {
        let engine = Engine::new();
        let a = m(2, 2, &[(0, 0, 2), (1, 1, 3)]);
        let b = m(2, 2, &[(0, 0, 5), (0, 1, 9)]);
        let t = ewise_mult(&a, &b, builtin::times(), &engine).unwrap();
        assert_eq!(t.get_committed(0, 0), Some(10));
        assert_eq!(t.nvals(), 1);
    }

    #[test]
    fn dimension_mismatch_errors() {
        let engine = Engine::new();
        let a = m(2, 2, &[]);
        let b = m(3, 3, &[]);
        assert!(ewise_add(&a, &b, &builtin::plus_monoid::<i32>(), &engine).is_err());
    }
}
