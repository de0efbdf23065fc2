//! Select: structural, value-relational, and index-relational predicates
//! (§4.8).
//!
//! `Nonzero`/`Zero` are structural (they only ever look at the value,
//! never the indices); `ValueGt`/`ValueLt`/`ValueEq`/`ValueNe` are
//! value-relational against a threshold; `Diag`/`OffDiag`/`Triu`/`Tril`
//! are index-relational, comparing `row - col` against an offset exactly
//! like the source library's `GxB_TRIL`/`GxB_TRIU`/`GxB_DIAG` selectops.
//! Value-relational ordering predicates require `PartialOrd`, which
//! mirrors the source library just as much as it looks like a Rust-isms:
//! complex scalars have no total order there either, so a `select`
//! comparing them is a type error here rather than a silently undefined
//! runtime comparison.

use crate::engine::Engine;
use crate::matrix::{Matrix, Slot};
use crate::mxm::{assemble_columns, live_entries};
use crate::types::Scalar;
use rayon::prelude::*;

/// A select predicate, keeping an entry when it evaluates to `true`.
#[derive(Clone, Copy, Debug)]
pub enum Select<T> {
    /// Keep non-structural-zero entries.
    Nonzero,
    /// Keep structural-zero entries.
    Zero,
    /// Keep non-zombie entries (§4.8). [`live_entries`] has already
    /// dropped zombies by the time `keep` runs, the same view `Wait`'s
    /// compaction pass uses internally to decide what survives, so this
    /// predicate always holds for anything `select` ever sees it applied
    /// to; it exists to complete the predicate set named alongside
    /// `Nonzero`, not to filter anything further.
    Nonzombie,
    /// Keep entries whose value differs from `t`.
    ValueNe(T),
    /// Keep entries whose value equals `t`.
    ValueEq(T),
    /// Keep entries with value greater than `t`.
    ValueGt(T),
    /// Keep entries with value less than `t`.
    ValueLt(T),
    /// Keep entries on the diagonal `row - col == k`.
    Diag(i64),
    /// Keep entries off the diagonal `row - col == k`.
    OffDiag(i64),
    /// Keep entries on/above the diagonal `row - col == k` (`row <= col + k`).
    Triu(i64),
    /// Keep entries on/below the diagonal `row - col == k` (`row >= col + k`).
    Tril(i64),
}

fn keep<T: Scalar + PartialOrd>(pred: &Select<T>, i: usize, j: usize, v: T) -> bool {
    match *pred {
        Select::Nonzero => !v.is_zero_value(),
        Select::Zero => v.is_zero_value(),
        Select::Nonzombie => true,
        Select::ValueNe(t) => v != t,
        Select::ValueEq(t) => v == t,
        Select::ValueGt(t) => v > t,
        Select::ValueLt(t) => v < t,
        Select::Diag(k) => i as i64 - j as i64 == k,
        Select::OffDiag(k) => i as i64 - j as i64 != k,
        Select::Triu(k) => (i as i64) <= j as i64 + k,
        Select::Tril(k) => (i as i64) >= j as i64 + k,
    }
}

/// Apply `pred` to every live entry of `a`, dropping those it rejects.
/// One task per vector, same slicing as `ewise`/`apply`.
pub fn select<T: Scalar + PartialOrd>(a: &Matrix<T>, pred: &Select<T>, engine: &Engine) -> Matrix<T> {
    let vdim = a.vdim();
    let per_vector: Vec<(Vec<Slot>, Vec<T>)> = engine.install(|| {
        (0..vdim)
            .into_par_iter()
            .map(|j| {
                let (idx, val) = live_entries(a, j);
                let mut out_i = Vec::new();
                let mut out_x = Vec::new();
                for (i, v) in idx.into_iter().zip(val) {
                    if keep(pred, i, j, v) {
                        out_i.push(Slot::Live(i));
                        out_x.push(v);
                    }
                }
                (out_i, out_x)
            })
            .collect()
    });
    assemble_columns(a.vlen(), vdim, a.is_csc(), per_vector, a.hyper_ratio())
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
    fn nonzero_drops_structural_zeros() {
        let a = m(2, 2, &[(0, 0, 0), (1, 1, 4)]);
        let engine = Engine::new();
        let c = select(&a, &Select::Nonzero, &engine);
        assert_eq!(c.nvals(), 1);
        assert_eq!(c.get_committed(1, 1), Some(4));
    }

    #[test]
    fn nonzombie_keeps_every_entry_select_ever_sees() {
        let a = m(2, 2, &[(0, 0, 0), (1, 1, 4)]);
        let engine = Engine::new();
        let c = select(&a, &Select::Nonzombie, &engine);
        assert_eq!(c.nvals(), a.nvals());
    }

    #[test]
    fn value_gt_keeps_entries_above_threshold() {
        let a = m(1, 3, &[(0, 0, 1), (0, 1, 5), (0, 2, 9)]);
        let engine = Engine::new();
        let c = select(&a, &Select::ValueGt(4), &engine);
        assert_eq!(c.nvals(), 2);
    }

    #[test]
    fn tril_keeps_lower_triangle() {
        let a = m(3, 3, &[(0, 0, 1), (1, 0, 2), (0, 1, 3), (2, 2, 4)]);
        let engine = Engine::new();
        let c = select(&a, &Select::Tril(0), &engine);
        assert_eq!(c.get_committed(1, 0), Some(2));
        assert_eq!(c.get_committed(0, 1), None);
        assert_eq!(c.nvals(), 3);
    }
}
