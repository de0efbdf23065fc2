//! Dot-product matrix multiply (§4.5.4).
//!
//! Computes each output entry as a sorted-stream merge of one `A` row
//! against one `B` column, accumulating through the semiring and
//! stopping the merge early the moment the running value hits the
//! monoid's terminal value (if it has one) — the only one of the three
//! algorithms that can short-circuit per-entry, at the cost of visiting
//! every candidate `(i, j)` pair rather than only the ones a saxpy pass
//! would touch. `A` is accessed by row, so this transposes `A` once up
//! front rather than re-deriving row access inline.

use crate::engine::Engine;
use crate::error::Result;
use crate::matrix::{Matrix, Slot};
use crate::ops::Semiring;
use crate::transpose::transpose;
use crate::types::Scalar;
use rayon::prelude::*;
use std::cmp::Ordering;

fn dot_column<X: Scalar, Y: Scalar, Z: Scalar>(
    at: &Matrix<X>,
    b: &Matrix<Y>,
    j: usize,
    semiring: &Semiring<X, Y, Z>,
) -> (Vec<Slot>, Vec<Z>) {
    let mut out_i = Vec::new();
    let mut out_z = Vec::new();

    let Some(kb) = b.find_vector(j) else { return (out_i, out_z) };
    let (blo, bhi) = b.vector_bounds(kb);
    let bk: Vec<usize> = b.raw_i()[blo..bhi]
        .iter()
        .filter(|s| !s.is_zombie())
        .map(|s| s.index())
        .collect();
    let bv: Vec<Y> = (blo..bhi)
        .filter(|&pos| !b.raw_i()[pos].is_zombie())
        .map(|pos| b.raw_x()[pos])
        .collect();

    for i in 0..at.vdim() {
        let Some(ka) = at.find_vector(i) else { continue };
        let (alo, ahi) = at.vector_bounds(ka);
        let mut pi = alo;
        let mut pj = 0;
        let mut acc: Option<Z> = None;
        while pi < ahi && pj < bk.len() {
            let aslot = at.raw_i()[pi];
            if aslot.is_zombie() {
                pi += 1;
                continue;
            }
            let ak = aslot.index();
            match ak.cmp(&bk[pj]) {
                Ordering::Less => pi += 1,
                Ordering::Greater => pj += 1,
                Ordering::Equal => {
                    let contribution = semiring.mul.apply(at.raw_x()[pi], bv[pj]);
                    let next = match acc {
                        None => contribution,
                        Some(prev) => semiring.add.op.apply(prev, contribution),
                    };
                    let hit_terminal = semiring.add.is_terminal(&next);
                    acc = Some(next);
                    pi += 1;
                    pj += 1;
                    if hit_terminal {
                        break;
                    }
                }
            }
        }
        if let Some(v) = acc {
            out_i.push(Slot::Live(i));
            out_z.push(v);
        }
    }
    (out_i, out_z)
}

pub fn mxm_dot<X: Scalar, Y: Scalar, Z: Scalar>(
    a: &Matrix<X>,
    b: &Matrix<Y>,
    semiring: &Semiring<X, Y, Z>,
    engine: &Engine,
) -> Result<Matrix<Z>> {
    let at = transpose(a);
    let vlen_out = a.vlen();
    let vdim_out = b.vdim();
    let per_vector: Vec<(Vec<Slot>, Vec<Z>)> = engine.install(|| {
        (0..vdim_out).into_par_iter().map(|j| dot_column(&at, b, j, semiring)).collect()
    });
    Ok(super::assemble_columns(vlen_out, vdim_out, a.is_csc(), per_vector, a.hyper_ratio()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build;
    use crate::ops::builtin;

    #[test]
    fn dot_terminates_early_on_terminal_value() {
        // OR/AND semiring: as soon as one true*true contributes, the
        // running OR hits its terminal and the rest of the row is
        // skipped; correctness-wise the result should still be `true`.
        let a = build(1, 2, true, &[0, 0], &[0, 1], &[true, true], builtin::second(), 1.0).unwrap();
        let b = build(2, 1, true, &[0, 1], &[0, 0], &[true, true], builtin::second(), 1.0).unwrap();
        let engine = Engine::new();
        let c = mxm_dot(&a, &b, &builtin::lor_land(), &engine).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(true));
    }

    #[test]
    fn dot_matches_scenario_1() {
        let a = build(2, 2, true, &[0, 0, 1], &[0, 1, 1], &[1, 2, 3], builtin::second(), 1.0).unwrap();
        let b = build(2, 2, true, &[0, 1, 1], &[0, 0, 1], &[4, 5, 6], builtin::second(), 1.0).unwrap();
        let engine = Engine::new();
        let c = mxm_dot(&a, &b, &builtin::plus_times::<i32>(), &engine).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(14));
    }
}
