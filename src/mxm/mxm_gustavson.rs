//! Gather/scatter saxpy matrix multiply (§4.5.2).
//!
//! One output column per task: scatter each contributing `A` column into
//! a dense [`crate::engine::Sauna`] workspace keyed by row, accumulating
//! duplicates through the semiring's monoid, then gather the touched
//! rows back out in sorted order. Best when the output is dense enough
//! that the Sauna's `O(vlen)` workspace pays for itself.
//!
//! Columns are grouped into contiguous chunks before dispatch
//! (`descriptor.slicing`, §4.5.1 step 4) rather than spawned one task per
//! column: acquiring and seeding a Sauna is the one per-task cost this
//! algorithm pays that the others don't, so amortising it across a few
//! columns per task is worth the grouping step. `Fine` keeps the
//! original one-task-per-column behaviour for callers that want maximum
//! parallelism over a small, even workload.

use crate::descriptor::SlicingHint;
use crate::engine::{Engine, Sauna};
use crate::error::Result;
use crate::matrix::{Matrix, Slot};
use crate::ops::Semiring;
use crate::types::Scalar;
use rayon::prelude::*;

/// Split `0..n` into `parts` contiguous, near-equal-size ranges.
fn chunk_by_count(n: usize, parts: usize) -> Vec<Vec<usize>> {
    if n == 0 {
        return Vec::new();
    }
    let parts = parts.min(n).max(1);
    let base = n / parts;
    let rem = n % parts;
    let mut out = Vec::with_capacity(parts);
    let mut start = 0;
    for p in 0..parts {
        let size = base + if p < rem { 1 } else { 0 };
        out.push((start..start + size).collect());
        start += size;
    }
    out
}

/// Split `0..weights.len()` into contiguous groups whose summed weight is
/// roughly `total / parts` each (a running-sum bin-pack, not an optimal
/// partition, matching `BFLOPS`/`ATNZ`-style balancing).
fn chunk_by_weight(weights: &[usize], parts: usize) -> Vec<Vec<usize>> {
    let n = weights.len();
    if n == 0 {
        return Vec::new();
    }
    let total: usize = weights.iter().sum();
    let parts = parts.min(n).max(1);
    let target = (total / parts).max(1);
    let mut out = Vec::new();
    let mut current = Vec::new();
    let mut acc = 0usize;
    for j in 0..n {
        current.push(j);
        acc += weights[j];
        if acc >= target && out.len() + 1 < parts {
            out.push(std::mem::take(&mut current));
            acc = 0;
        }
    }
    if !current.is_empty() {
        out.push(current);
    }
    out
}

/// Per-column flop estimate: the sum, over `B`'s live entries in column
/// `j`, of the corresponding `A` column's live-entry count.
fn column_flops<X: Scalar, Y: Scalar>(a: &Matrix<X>, b: &Matrix<Y>, j: usize) -> usize {
    let Some(kb) = b.find_vector(j) else { return 0 };
    let (lo, hi) = b.vector_bounds(kb);
    let mut flops = 0usize;
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
    flops
}

/// Group `0..vdim_out`'s columns into contiguous chunks per `slicing`.
fn column_groups<X: Scalar, Y: Scalar>(
    a: &Matrix<X>,
    b: &Matrix<Y>,
    vdim_out: usize,
    slicing: SlicingHint,
    parts: usize,
) -> Vec<Vec<usize>> {
    match slicing {
        SlicingHint::Fine => (0..vdim_out).map(|j| vec![j]).collect(),
        SlicingHint::Coarse => chunk_by_count(vdim_out, parts),
        SlicingHint::Flops => {
            let weights: Vec<usize> = (0..vdim_out).map(|j| column_flops(a, b, j)).collect();
            chunk_by_weight(&weights, parts)
        }
    }
}

/// Compute one output column `j`, scattering `A`'s contributing columns
/// into `sauna` and gathering the touched rows back out in row order.
fn gustavson_column<X: Scalar, Y: Scalar, Z: Scalar>(
    a: &Matrix<X>,
    b: &Matrix<Y>,
    semiring: &Semiring<X, Y, Z>,
    sauna: &mut Sauna<Z>,
    vlen_out: usize,
    j: usize,
) -> (Vec<Slot>, Vec<Z>) {
    sauna.begin_vector(vlen_out);
    let mut touched = Vec::new();

    if let Some(kb) = b.find_vector(j) {
        let (blo, bhi) = b.vector_bounds(kb);
        for bpos in blo..bhi {
            let bslot = b.raw_i()[bpos];
            if bslot.is_zombie() {
                continue;
            }
            let k = bslot.index();
            let b_kj = b.raw_x()[bpos];
            let Some(ka) = a.find_vector(k) else { continue };
            let (alo, ahi) = a.vector_bounds(ka);
            for apos in alo..ahi {
                let aslot = a.raw_i()[apos];
                if aslot.is_zombie() {
                    continue;
                }
                let i = aslot.index();
                let contribution = semiring.mul.apply(a.raw_x()[apos], b_kj);
                if sauna.is_live(i) {
                    sauna.combine(i, contribution, |x, y| semiring.add.op.apply(x, y));
                } else {
                    sauna.seed(i, contribution);
                    touched.push(i);
                }
            }
        }
    }

    touched.sort_unstable();
    let mut out_i = Vec::with_capacity(touched.len());
    let mut out_x = Vec::with_capacity(touched.len());
    for i in touched {
        out_i.push(Slot::Live(i));
        out_x.push(sauna.get(i));
    }
    (out_i, out_x)
}

pub fn mxm_gustavson<X: Scalar, Y: Scalar, Z: Scalar>(
    a: &Matrix<X>,
    b: &Matrix<Y>,
    semiring: &Semiring<X, Y, Z>,
    slicing: SlicingHint,
    engine: &Engine,
) -> Result<Matrix<Z>> {
    let vlen_out = a.vlen();
    let vdim_out = b.vdim();
    let groups = column_groups(a, b, vdim_out, slicing, engine.num_threads());

    let per_vector: Vec<(Vec<Slot>, Vec<Z>)> = engine.install(|| {
        groups
            .into_par_iter()
            .flat_map_iter(|group| {
                let tid = engine.current_thread_index();
                let mut sauna = engine.sauna_pool().acquire::<Z>(tid);
                let results: Vec<(Vec<Slot>, Vec<Z>)> = group
                    .into_iter()
                    .map(|j| gustavson_column(a, b, semiring, &mut sauna, vlen_out, j))
                    .collect();
                engine.sauna_pool().release(tid, sauna);
                results
            })
            .collect()
    });

    Ok(super::assemble_columns(vlen_out, vdim_out, a.is_csc(), per_vector, a.hyper_ratio()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build;
    use crate::ops::builtin;

    #[test]
    fn gustavson_sums_contributions_across_shared_rows() {
        // C(0,0) = A(0,0)*B(0,0) + A(0,1)*B(1,0) = 2*3 + 5*7.
        let a = build(2, 2, true, &[0, 0], &[0, 1], &[2, 5], builtin::second(), 1.0).unwrap();
        let b = build(2, 2, true, &[0, 1], &[0, 0], &[3, 7], builtin::second(), 1.0).unwrap();
        let engine = Engine::new();
        let c = mxm_gustavson(&a, &b, &builtin::plus_times::<i32>(), SlicingHint::Coarse, &engine).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(2 * 3 + 5 * 7));
    }

    #[test]
    fn fine_slicing_agrees_with_coarse_and_flops() {
        let a = build(3, 3, true, &[0, 0, 1, 2], &[0, 1, 1, 2], &[1, 2, 3, 4], builtin::second(), 1.0).unwrap();
        let b = build(3, 3, true, &[0, 1, 1, 2], &[0, 0, 2, 2], &[5, 6, 7, 8], builtin::second(), 1.0).unwrap();
        let engine = Engine::new();
        let sr = builtin::plus_times::<i32>();
        let fine = mxm_gustavson(&a, &b, &sr, SlicingHint::Fine, &engine).unwrap();
        let coarse = mxm_gustavson(&a, &b, &sr, SlicingHint::Coarse, &engine).unwrap();
        let flops = mxm_gustavson(&a, &b, &sr, SlicingHint::Flops, &engine).unwrap();
        for i in 0..3 {
            for j in 0..3 {
                assert_eq!(fine.get_committed(i, j), coarse.get_committed(i, j));
                assert_eq!(fine.get_committed(i, j), flops.get_committed(i, j));
            }
        }
    }

    #[test]
    fn chunking_helpers_cover_every_index_once_in_order() {
        let groups = chunk_by_count(7, 3);
        let flat: Vec<usize> = groups.into_iter().flatten().collect();
        assert_eq!(flat, (0..7).collect::<Vec<_>>());

        let groups = chunk_by_weight(&[1, 1, 10, 1, 1], 3);
        let flat: Vec<usize> = groups.into_iter().flatten().collect();
        assert_eq!(flat, (0..5).collect::<Vec<_>>());
    }
}
