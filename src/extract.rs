//! Extract: `C = A(I, J)` (§4.6).
//!
//! Index lists may repeat an index (GraphBLAS allows this, unlike a
//! plain slice), so extraction visits every `(new row, new vector)` pair
//! independently rather than assuming a one-to-one row/vector mapping.

use crate::build::build;
use crate::error::Result;
use crate::index::Index;
use crate::matrix::Matrix;
use crate::ops::builtin;
use crate::types::Scalar;

/// `C = A(I, J)`, a new matrix of shape `(|I|, |J|)`.
pub fn extract<T: Scalar>(a: &Matrix<T>, i_idx: &Index, j_idx: &Index) -> Result<Matrix<T>> {
    let i_list = i_idx.resolve(a.vlen())?;
    let j_list = j_idx.resolve(a.vdim())?;

    let mut i_coords = Vec::new();
    let mut j_coords = Vec::new();
    let mut x_coords = Vec::new();
    for (nj, &oj) in j_list.iter().enumerate() {
        for (ni, &oi) in i_list.iter().enumerate() {
            if let Some(v) = a.get_committed(oi, oj) {
                i_coords.push(ni);
                j_coords.push(nj);
                x_coords.push(v);
            }
        }
    }

    build(
        i_list.len(),
        j_list.len(),
        a.is_csc(),
        &i_coords,
        &j_coords,
        &x_coords,
        builtin::second(),
        a.hyper_ratio(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::build::build as build_matrix;

    #[test]
    fn extract_selects_the_named_submatrix() {
        let i = vec![0, 1, 2];
        let j = vec![0, 1, 2];
        let x = vec![10, 20, 30];
        let a = build_matrix(3, 3, false, &i, &j, &x, builtin::second(), 1.0).unwrap();
        let c = extract(&a, &Index::List(vec![1, 2]), &Index::List(vec![1, 2])).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(20));
        assert_eq!(c.get_committed(1, 1), Some(30));
        assert_eq!(c.nvals(), 2);
    }

    #[test]
    fn extract_supports_repeated_indices() {
        let a = build_matrix(2, 2, false, &[0], &[0], &[5], builtin::second(), 1.0).unwrap();
        let c = extract(&a, &Index::List(vec![0, 0]), &Index::All).unwrap();
        assert_eq!(c.get_committed(0, 0), Some(5));
        assert_eq!(c.get_committed(1, 0), Some(5));
    }
}
