//! Masked accumulate-assign: `C⟨M, repl⟩ = accum(C, T)` (§4.3).
//!
//! The one kernel every other write path funnels through: element-wise
//! add/multiply, `mxm`, `apply`, and reduce-to-vector all compute a same-
//! shape result `T` and hand it here together with `C`, the optional
//! mask, and the descriptor bits, rather than each re-deriving the four-
//! way combination of mask truth, `repl`, and `accum` themselves.
//!
//! Only `(i, j)` positions live in `C` or `T` can ever change value: a
//! mask entry with neither a `C` nor a `T` value behind it folds to
//! `None` either way, so the merge only needs to walk the union of `C`'s
//! and `T`'s stored entries, not the mask's.

use crate::descriptor::Descriptor;
use crate::error::{Error, Result};
use crate::matrix::Matrix;
use crate::ops::BinaryOp;
use crate::types::Scalar;

/// Evaluate the mask predicate at `(i, j)`: `None` behaves as all-true,
/// `complement` negates the raw truth value. `pub(crate)` so `assign`'s
/// "replace outside the submatrix" pass (§4.6) can reuse the same rule.
pub(crate) fn mask_true<M: Scalar>(mask: Option<&Matrix<M>>, complement: bool, i: usize, j: usize) -> bool {
    let raw = match mask {
        None => true,
        Some(m) => m.get_committed(i, j).is_some_and(|v| !v.is_zero_value()),
    };
    raw ^ complement
}

/// `C⟨M, repl⟩ = accum(C, T)`.
///
/// - `mask = None` behaves as the all-true mask (every position passes).
/// - `descriptor.mask_complement` negates the mask's truth value before use.
/// - `accum = None` means plain assignment: `T`'s value replaces `C`'s
///   wherever the mask passes.
/// - `descriptor.output_replace` clears `C` wherever the mask does *not*
///   pass; without it, `C`'s existing value survives unmasked positions
///   untouched.
pub fn mask_accum_assign<T: Scalar, M: Scalar>(
    c: &mut Matrix<T>,
    mask: Option<&Matrix<M>>,
    descriptor: &Descriptor,
    t: &Matrix<T>,
    accum: Option<BinaryOp<T, T, T>>,
) -> Result<()> {
    if c.dims() != t.dims() {
        return Err(Error::dims("mask_accum_assign: C vs T", c.dims(), t.dims()));
    }
    if let Some(m) = mask {
        if m.dims() != c.dims() {
            return Err(Error::dims("mask_accum_assign: C vs mask", c.dims(), m.dims()));
        }
    }

    let complement = descriptor.mask_complement;
    let replace = descriptor.output_replace;
    let mut updates: Vec<(usize, usize, Option<T>)> = Vec::new();
    for j in 0..c.vdim() {
        let mut keys: Vec<usize> = Vec::new();
        if let Some(kc) = c.find_vector(j) {
            let (lo, hi) = c.vector_bounds(kc);
            keys.extend(c.raw_i()[lo..hi].iter().filter(|s| !s.is_zombie()).map(|s| s.index()));
        }
        if let Some(kt) = t.find_vector(j) {
            let (lo, hi) = t.vector_bounds(kt);
            keys.extend(t.raw_i()[lo..hi].iter().filter(|s| !s.is_zombie()).map(|s| s.index()));
        }
        keys.sort_unstable();
        keys.dedup();

        for i in keys {
            let passes = mask_true(mask, complement, i, j);
            let c_val = c.get_committed(i, j);
            let t_val = t.get_committed(i, j);
            let new_val = if passes {
                match (c_val, t_val, accum) {
                    (Some(c0), Some(tv), Some(op)) => Some(op.apply(c0, tv)),
                    (_, Some(tv), None) => Some(tv),
                    (Some(c0), None, _) => Some(c0),
                    (None, None, _) => None,
                }
            } else if replace {
                None
            } else {
                c_val
            };
            if new_val != c_val {
                updates.push((i, j, new_val));
            }
        }
    }

    for (i, j, v) in updates {
        match v {
            Some(val) => c.set_element(i, j, val)?,
            None => c.remove_element(i, j)?,
        }
    }
    Ok(())
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
    fn unmasked_plain_assign_overwrites_with_t() {
        let mut c = m(2, 2, &[(0, 0, 1)]);
        let t = m(2, 2, &[(0, 0, 9), (1, 1, 5)]);
        mask_accum_assign::<i32, bool>(&mut c, None, &Descriptor::new(), &t, None).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(9));
        assert_eq!(c.get_committed(1, 1), Some(5));
    }

    #[test]
    fn accum_combines_existing_and_new() {
        let mut c = m(2, 2, &[(0, 0, 10)]);
        let t = m(2, 2, &[(0, 0, 1)]);
        mask_accum_assign::<i32, bool>(&mut c, None, &Descriptor::new(), &t, Some(builtin::plus()))
            .unwrap();
        assert_eq!(c.get_committed(0, 0), Some(11));
    }

    #[test]
    fn mask_false_without_replace_leaves_c_untouched() {
        let mut c = m(2, 2, &[(0, 0, 10)]);
        let t = m(2, 2, &[(0, 0, 99)]);
        let mask = m(2, 2, &[(1, 1, 1)]); // mask true only at (1,1)
        mask_accum_assign(&mut c, Some(&mask), &Descriptor::new(), &t, None).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(10));
    }

    #[test]
    fn replace_clears_unmasked_existing_entries() {
        let mut c = m(2, 2, &[(0, 0, 10)]);
        let t = m(2, 2, &[]);
        let mask = m(2, 2, &[(1, 1, 1)]);
        mask_accum_assign::<i32, i32>(&mut c, Some(&mask), &Descriptor::new().replace(true), &t, None)
            .unwrap();
        assert_eq!(c.get_committed(0, 0), None);
    }

    #[test]
    fn mask_complement_inverts_selection() {
        let mut c = m(2, 2, &[]);
        let t = m(2, 2, &[(0, 0, 7), (1, 1, 8)]);
        let mask = m(2, 2, &[(1, 1, 1)]); // true only at (1,1); complemented -> true elsewhere
        mask_accum_assign(&mut c, Some(&mask), &Descriptor::new().complement(true), &t, None).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(7));
        assert_eq!(c.get_committed(1, 1), None);
    }
}
