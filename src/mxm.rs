//! Matrix multiply dispatch (§4.5.1).
//!
//! `mxm` picks among three physical algorithms over the same semiring
//! contract (`C = A ⊗.⊕ B`): Gustavson's gather/scatter saxpy, heap
//! saxpy, and dot-product. All three produce the unmasked result `T`;
//! callers that need `C⟨M, repl⟩ = accum(C, T)` apply
//! [`crate::mask::mask_accum_assign`] afterward, the same way `ewise`
//! does, rather than threading mask logic through each algorithm.

mod mxm_dot;
mod mxm_gustavson;
mod mxm_heap;

pub use mxm_dot::mxm_dot;
pub use mxm_gustavson::mxm_gustavson;
pub use mxm_heap::mxm_heap;

use crate::descriptor::{Descriptor, MxmMethod};
use crate::engine::Engine;
use crate::error::{Error, Result};
use crate::matrix::{Matrix, Slot};
use crate::ops::Semiring;
use crate::transpose::transpose;
use crate::types::Scalar;

/// Collect a vector's live entries as parallel index/value vectors, used
/// by the saxpy/dot algorithms to avoid repeatedly re-filtering zombies
/// out of the same slice.
pub(crate) fn live_entries<T: Scalar>(m: &Matrix<T>, j: usize) -> (Vec<usize>, Vec<T>) {
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

/// Assemble per-vector `(Slot, value)` results (already sorted by row
/// within each vector) into a standard-form matrix, then conform.
pub(crate) fn assemble_columns<Z: Scalar>(
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

fn estimate_flops<X: Scalar, Y: Scalar>(a: &Matrix<X>, b: &Matrix<Y>) -> usize {
    let mut flops = 0usize;
    for k in 0..b.nvec() {
        let (lo, hi) = b.vector_bounds(k);
        for pos in lo..hi {
            let slot = b.raw_i()[pos];
            if slot.is_zombie() {
                continue;
            }
            if let Some(ka) = a.find_vector(slot.index()) {
                let (alo, ahi) = a.vector_bounds(ka);
                flops += ahi - alo;
            }
        }
    }
    flops
}

/// `C = A ⊗.⊕ B`, dispatching to one of the three algorithms (§4.5.1).
///
/// `descriptor.transpose_first`/`transpose_second` transpose `A`/`B`
/// before dispatch, giving callers all four `A(')·B(')` forms without
/// each algorithm needing to know about the bit itself.
/// `descriptor.mxm_method` picks the algorithm; `Auto` estimates the
/// multiply count against the dense output size: a flop count at least a
/// quarter of `vlen(A) * vdim(B)` favours Gustavson's dense workspace,
/// otherwise the result is assumed sparse enough for heap saxpy to pay
/// off its lack of a dense scratch array. `descriptor.slicing` is
/// forwarded to Gustavson, the only one of the three algorithms whose
/// per-task cost (acquiring/seeding a dense `Sauna` workspace) is worth
/// amortising across a chunk of columns rather than paying once per
/// column; heap and dot saxpy have no comparable shared per-task
/// resource, so they keep their plain one-task-per-vector slicing
/// regardless of the hint. `descriptor.nthreads`, if set, runs the whole
/// dispatch on an ephemeral pool of that size instead of `engine`'s own.
pub fn mxm<X: Scalar, Y: Scalar, Z: Scalar>(
    a: &Matrix<X>,
    b: &Matrix<Y>,
    semiring: &Semiring<X, Y, Z>,
    descriptor: &Descriptor,
    engine: &Engine,
) -> Result<Matrix<Z>> {
    let a_transposed;
    let a = if descriptor.transpose_first {
        a_transposed = transpose(a);
        &a_transposed
    } else {
        a
    };
    let b_transposed;
    let b = if descriptor.transpose_second {
        b_transposed = transpose(b);
        &b_transposed
    } else {
        b
    };

    if a.vdim() != b.vlen() {
        return Err(Error::dims("mxm", a.dims(), b.dims()));
    }
    let chosen = match descriptor.mxm_method {
        MxmMethod::Auto => {
            let flops = estimate_flops(a, b);
            let dense_estimate = a.vlen().saturating_mul(b.vdim());
            if dense_estimate > 0 && flops.saturating_mul(4) >= dense_estimate {
                MxmMethod::Gustavson
            } else {
                MxmMethod::Heap
            }
        }
        other => other,
    };

    let run = || match chosen {
        MxmMethod::Gustavson => mxm_gustavson(a, b, semiring, descriptor.slicing, engine),
        MxmMethod::Heap => mxm_heap(a, b, semiring, engine),
        MxmMethod::Dot => mxm_dot(a, b, semiring, engine),
        MxmMethod::Auto => unreachable!("resolved above"),
    };

    match descriptor.nthreads {
        Some(n) => {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(n)
                .build()
                .map_err(|e| Error::InvalidValue(e.to_string()))?;
            pool.install(run)
        }
        None => run(),
    }
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
    fn auto_dispatch_matches_scenario_1() {
        // A = [[1,2],[0,3]], B = [[4,0],[5,6]] (row, col) -> vector
        // orientation with is_csc=false means (i, j) = (col, row); build
        // with (row, col) pairs swapped accordingly by using is_csc=true
        // semantics isn't needed here since set_element/build both take
        // (i, j) in vector orientation directly matching (row, col) when
        // is_csc is false is equivalent to (col, row); to keep the test
        // simple we build directly in (row, col) = (i, j) terms with
        // is_csc = true, which makes vector orientation coincide with
        // (row, col).
        let a = {
            let i = vec![0, 0, 1];
            let j = vec![0, 1, 1];
            let x = vec![1, 2, 3];
            build(2, 2, true, &i, &j, &x, builtin::second(), 1.0).unwrap()
        };
        let b = {
            let i = vec![0, 1, 1];
            let j = vec![0, 0, 1];
            let x = vec![4, 5, 6];
            build(2, 2, true, &i, &j, &x, builtin::second(), 1.0).unwrap()
        };
        let engine = Engine::new();
        let sr = builtin::plus_times::<i32>();
        let c = mxm(&a, &b, &sr, &Descriptor::new(), &engine).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(14));
        assert_eq!(c.get_committed(0, 1), Some(12));
        assert_eq!(c.get_committed(1, 0), Some(15));
        assert_eq!(c.get_committed(1, 1), Some(18));
    }

    #[test]
    fn all_three_methods_agree() {
        let a = m(3, 3, &[(0, 0, 1), (0, 1, 2), (1, 1, 3), (2, 2, 4)]);
        let b = m(3, 3, &[(0, 0, 5), (1, 0, 6), (1, 2, 7), (2, 2, 8)]);
        let engine = Engine::new();
        let sr = builtin::plus_times::<i32>();
        let g = mxm(&a, &b, &sr, &Descriptor::new().method(MxmMethod::Gustavson), &engine).unwrap();
        let h = mxm(&a, &b, &sr, &Descriptor::new().method(MxmMethod::Heap), &engine).unwrap();
        let d = mxm(&a, &b, &sr, &Descriptor::new().method(MxmMethod::Dot), &engine).unwrap();
        for row in 0..3 {
            for col in 0..3 {
                let (i, j) = (row, col);
                assert_eq!(g.get_committed(i, j), h.get_committed(i, j));
                assert_eq!(g.get_committed(i, j), d.get_committed(i, j));
            }
        }
    }

    #[test]
    fn inner_dimension_mismatch_errors() {
        let a = m(2, 3, &[]);
        let b = m(2, 2, &[]);
        let engine = Engine::new();
        let sr = builtin::plus_times::<i32>();
        assert!(mxm(&a, &b, &sr, &Descriptor::new(), &engine).is_err());
    }
}
