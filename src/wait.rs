//! Wait: deferred-work reconciliation (§4.2).
//!
//! Flushes a matrix's pending tuples and compacts its zombies in a single
//! reassembly pass, then conforms the result to standard or hypersparse
//! form. Since [`crate::matrix::Matrix::set_element`] already guarantees
//! pending tuples never target a position already held by a live
//! committed entry (an in-place update happens immediately instead), the
//! only folding `wait` needs to do against `opdup` is among the pending
//! tuples themselves — so this reuses [`crate::build::build`] wholesale
//! rather than re-deriving its merge logic.

use crate::build::build;
use crate::engine::Engine;
use crate::error::Result;
use crate::matrix::Matrix;
use crate::ops::BinaryOp;
use crate::types::Scalar;

/// Reconcile `m`'s deferred work: fold duplicate pending tuples through
/// `opdup` (in append order), merge them with the existing live entries,
/// drop zombies, and conform the resulting form.
///
/// A no-op beyond `conform` if `m` carries no deferred work.
pub fn wait<T: Scalar>(m: &mut Matrix<T>, opdup: BinaryOp<T, T, T>, engine: &Engine) -> Result<()> {
    if !m.has_deferred_work() {
        m.conform();
        return Ok(());
    }

    let mut i_list = Vec::with_capacity(m.nvals() + m.npending());
    let mut j_list = Vec::with_capacity(m.nvals() + m.npending());
    let mut x_list = Vec::with_capacity(m.nvals() + m.npending());

    for k in 0..m.nvec() {
        let j = m.vector_id(k);
        let (lo, hi) = m.vector_bounds(k);
        for pos in lo..hi {
            let slot = m.raw_i()[pos];
            if !slot.is_zombie() {
                i_list.push(slot.index());
                j_list.push(j);
                x_list.push(m.raw_x()[pos]);
            }
        }
    }
    for t in m.pending().as_slice() {
        i_list.push(t.i);
        j_list.push(t.j);
        x_list.push(t.v);
    }

    let rebuilt = build(
        m.vlen(),
        m.vdim(),
        m.is_csc(),
        &i_list,
        &j_list,
        &x_list,
        opdup,
        m.hyper_ratio(),
    )?;
    *m = rebuilt;
    engine.note_flushed();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ops::builtin;

    #[test]
    fn wait_flushes_pending_and_compacts_zombies() {
        let engine = Engine::new();
        let mut m: Matrix<i32> = Matrix::new(4, 4, false, 1.0);
        m.set_element(0, 0, 1).unwrap();
        m.set_element(1, 1, 2).unwrap();
        m.set_element(2, 2, 3).unwrap();
        wait(&mut m, builtin::second(), &engine).unwrap();
        assert_eq!(m.nvals(), 3);
        assert_eq!(m.npending(), 0);

        m.remove_element(1, 1).unwrap();
        assert_eq!(m.nzombies(), 1);
        wait(&mut m, builtin::second(), &engine).unwrap();
        assert_eq!(m.nzombies(), 0);
        assert_eq!(m.nvals(), 2);
        assert_eq!(m.get_committed(1, 1), None);
    }

    #[test]
    fn wait_folds_duplicate_pending_tuples_via_opdup() {
        let engine = Engine::new();
        let mut m: Matrix<i32> = Matrix::new(2, 2, false, 1.0);
        m.set_element(0, 0, 1).unwrap();
        m.set_element(0, 0, 2).unwrap();
        assert_eq!(m.npending(), 2);
        wait(&mut m, builtin::plus(), &engine).unwrap();
        assert_eq!(m.get_committed(0, 0), Some(3));
    }

    #[test]
    fn wait_on_clean_matrix_is_a_cheap_noop() {
        let engine = Engine::new();
        let mut m: Matrix<i32> = Matrix::new(4, 4, false, 1.0);
        m.set_element(0, 0, 1).unwrap();
        wait(&mut m, builtin::second(), &engine).unwrap();
        wait(&mut m, builtin::second(), &engine).unwrap();
        assert_eq!(m.nvals(), 1);
    }
}
