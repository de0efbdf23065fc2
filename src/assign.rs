//! Assign: `C(I, J)⟨M, repl⟩ = accum(C(I, J), A)` with a full `C`-sized
//! mask, or scalar expansion thereof (§4.6).
//!
//! The main difference from [`crate::subassign::subassign`] is the
//! mask's shape: assign's mask is addressed like `C` itself, subassign's
//! like the `(I, J)` submatrix. Slicing the mask down to the submatrix
//! with [`crate::extract::extract`] reduces the inside-the-box write to a
//! plain subassign rather than re-deriving the merge. The second
//! difference — the one that actually distinguishes `assign` from
//! `subassign` — is `replace`'s reach: when `descriptor.output_replace` is
//! set and a full-size mask is given, entries of `C` *outside* `(I, J)`
//! that the mask rejects are also cleared, which [`clear_outside_box`]
//! implements as a pass over `C`'s own stored entries after the inside-
//! the-box write completes.

use crate::descriptor::Descriptor;
use crate::engine::Engine;
use crate::error::Result;
use crate::extract::extract;
use crate::index::Index;
use crate::mask::mask_true;
use crate::matrix::Matrix;
use crate::ops::BinaryOp;
use crate::subassign::{expand_scalar, subassign};
use crate::types::Scalar;
use std::collections::HashSet;

/// Clear every stored entry of `c` that lies outside the `(I, J)` box and
/// that `mask` (honouring `complement`) rejects (§4.6's "replace outside
/// the submatrix" semantics).
fn clear_outside_box<T: Scalar, M: Scalar>(
    c: &mut Matrix<T>,
    i_list: &[usize],
    j_list: &[usize],
    mask: &Matrix<M>,
    complement: bool,
) -> Result<()> {
    let i_set: HashSet<usize> = i_list.iter().copied().collect();
    let j_set: HashSet<usize> = j_list.iter().copied().collect();

    let mut to_clear = Vec::new();
    for k in 0..c.nvec() {
        let j = c.vector_id(k);
        let (lo, hi) = c.vector_bounds(k);
        for pos in lo..hi {
            let slot = c.raw_i()[pos];
            if slot.is_zombie() {
                continue;
            }
            let i = slot.index();
            if i_set.contains(&i) && j_set.contains(&j) {
                continue; // inside the addressed box; subassign already handled it
            }
            if !mask_true(Some(mask), complement, i, j) {
                to_clear.push((i, j));
            }
        }
    }
    for (i, j) in to_clear {
        c.remove_element(i, j)?;
    }
    Ok(())
}

/// `C(I, J)⟨M, repl⟩ = accum(C(I, J), A)`, where `mask` (if given) is
/// sized like the whole of `C`.
pub fn assign<T: Scalar, M: Scalar>(
    c: &mut Matrix<T>,
    i_idx: &Index,
    j_idx: &Index,
    mask: Option<&Matrix<M>>,
    descriptor: &Descriptor,
    a: &Matrix<T>,
    accum: Option<BinaryOp<T, T, T>>,
) -> Result<()> {
    let mask_sub = mask.map(|m| extract(m, i_idx, j_idx)).transpose()?;
    subassign(c, i_idx, j_idx, mask_sub.as_ref(), descriptor, a, accum)?;

    if descriptor.output_replace {
        if let Some(m) = mask {
            let i_list = i_idx.resolve(c.vlen())?;
            let j_list = j_idx.resolve(c.vdim())?;
            clear_outside_box(c, &i_list, &j_list, m, descriptor.mask_complement)?;
        }
    }
    Ok(())
}

/// `C(I, J)⟨M, repl⟩ = accum(C(I, J), x)`: the scalar-expansion form of
/// [`assign`], broadcasting `x` over every addressed `(i, j)` (§4.6).
pub fn assign_scalar<T: Scalar, M: Scalar>(
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
    assign(c, i_idx, j_idx, mask, descriptor, &expanded, accum)
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
    fn assign_slices_a_full_size_mask_to_the_submatrix() {
        let mut c = m(2, 2, &[]);
        let a = m(1, 1, &[(0, 0, 7)]);
        let mask = m(2, 2, &[(1, 1, 1)]); // mask true only at the (1,1) cell, which is I=[1], J=[1]
        assign(
            &mut c,
            &Index::List(vec![1]),
            &Index::List(vec![1]),
            Some(&mask),
            &Descriptor::new(),
            &a,
            None,
        )
        .unwrap();
        assert_eq!(c.get_committed(1, 1), Some(7));
    }

    #[test]
    fn assign_with_replace_clears_masked_out_entries_outside_the_box() {
        // C starts with entries both inside I=[0],J=[0] and outside it at
        // (1,1); the mask only ever passes at (0,0), so a replacing assign
        // into the (0,0) box must also clear (1,1), which subassign alone
        // would never touch.
        let mut c = m(2, 2, &[(0, 0, 1), (1, 1, 99)]);
        let a = m(1, 1, &[(0, 0, 5)]);
        let mask = m(2, 2, &[(0, 0, 1)]);
        assign(
            &mut c,
            &Index::List(vec![0]),
            &Index::List(vec![0]),
            Some(&mask),
            &Descriptor::new().replace(true),
            &a,
            None,
        )
        .unwrap();
        assert_eq!(c.get_committed(0, 0), Some(5));
        assert_eq!(c.get_committed(1, 1), None);
    }

    #[test]
    fn assign_without_replace_leaves_entries_outside_the_box_untouched() {
        let mut c = m(2, 2, &[(0, 0, 1), (1, 1, 99)]);
        let a = m(1, 1, &[(0, 0, 5)]);
        let mask = m(2, 2, &[(0, 0, 1)]);
        assign(
            &mut c,
            &Index::List(vec![0]),
            &Index::List(vec![0]),
            Some(&mask),
            &Descriptor::new(),
            &a,
            None,
        )
        .unwrap();
        assert_eq!(c.get_committed(0, 0), Some(5));
        assert_eq!(c.get_committed(1, 1), Some(99));
    }

    #[test]
    fn assign_scalar_broadcasts_x_over_the_addressed_block() {
        let mut c = m(2, 2, &[]);
        let mask = m(2, 2, &[(1, 1, 1)]);
        let engine = Engine::new();
        assign_scalar(
            &mut c,
            &Index::List(vec![1]),
            &Index::List(vec![1]),
            Some(&mask),
            &Descriptor::new(),
            7,
            None,
            &engine,
        )
        .unwrap();
        assert_eq!(c.get_committed(1, 1), Some(7));
    }
}
