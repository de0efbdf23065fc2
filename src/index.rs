//! Index lists (§4.6).
//!
//! The three ways a caller names a set of vector-orientation indices for
//! extract/assign/subassign: an explicit (possibly repeating, possibly
//! unordered) list, the whole dimension (`All`), or the `begin:inc:end`
//! colon expression (`Range`), which strides from `begin` to `end`
//! inclusive by `inc` — forwards when `inc` is positive, backwards when
//! it's negative, matching the source library's `GxB_RANGE`/
//! `GxB_STRIDE`/`GxB_BACKWARDS` colon forms.

use crate::error::{Error, Result};

/// An index-list argument to extract/assign/subassign.
#[derive(Clone, Debug)]
pub enum Index {
    /// An explicit, possibly repeating list of indices, in the given
    /// order.
    List(Vec<usize>),
    /// Every index of the dimension, `0..dim`.
    All,
    /// The colon expression `begin:inc:end`, inclusive of both ends.
    /// `inc > 0` walks forward (`begin` must be `<= end`), `inc < 0`
    /// walks backward (`begin` must be `>= end`); `inc == 0` is invalid.
    Range {
        /// First index.
        start: usize,
        /// Last index, inclusive.
        end: usize,
        /// Stride; negative strides walk from `start` down to `end`.
        inc: i64,
    },
}

impl Index {
    /// A forward unit-stride range, the common case of [`Index::Range`].
    pub fn range(start: usize, end: usize) -> Self {
        Index::Range { start, end, inc: 1 }
    }

    /// A strided range, the general `begin:inc:end` colon expression.
    pub fn strided_range(start: usize, end: usize, inc: i64) -> Self {
        Index::Range { start, end, inc }
    }

    /// Materialize this index list against a concrete dimension size,
    /// validating every entry is in bounds.
    pub fn resolve(&self, dim: usize) -> Result<Vec<usize>> {
        match self {
            Index::All => Ok((0..dim).collect()),
            Index::Range { start, end, inc } => {
                if *inc == 0 {
                    return Err(Error::InvalidValue("index range increment must be nonzero".into()));
                }
                let bound = (*start).max(*end);
                if bound >= dim {
                    return Err(Error::IndexOutOfBounds { index: bound, bound: dim });
                }
                if *inc > 0 {
                    if start > end {
                        return Err(Error::InvalidValue(format!(
                            "index range start {start} > end {end} with positive increment {inc}"
                        )));
                    }
                    let mut out = Vec::new();
                    let mut cur = *start as i64;
                    let end = *end as i64;
                    while cur <= end {
                        out.push(cur as usize);
                        cur += inc;
                    }
                    Ok(out)
                } else {
                    if start < end {
                        return Err(Error::InvalidValue(format!(
                            "index range start {start} < end {end} with negative increment {inc}"
                        )));
                    }
                    let mut out = Vec::new();
                    let mut cur = *start as i64;
                    let end = *end as i64;
                    while cur >= end {
                        out.push(cur as usize);
                        cur += inc;
                    }
                    Ok(out)
                }
            }
            Index::List(list) => {
                for &idx in list {
                    if idx >= dim {
                        return Err(Error::IndexOutOfBounds { index: idx, bound: dim });
                    }
                }
                Ok(list.clone())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_resolves_to_the_full_range() {
        assert_eq!(Index::All.resolve(3).unwrap(), vec![0, 1, 2]);
    }

    #[test]
    fn range_is_inclusive() {
        assert_eq!(Index::range(1, 3).resolve(5).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn list_allows_repeats_and_rejects_out_of_bounds() {
        assert_eq!(Index::List(vec![2, 0, 2]).resolve(3).unwrap(), vec![2, 0, 2]);
        assert!(Index::List(vec![5]).resolve(3).is_err());
    }

    #[test]
    fn inverted_forward_range_errors() {
        assert!(Index::range(3, 1).resolve(5).is_err());
    }

    #[test]
    fn positive_stride_skips_by_inc() {
        assert_eq!(Index::strided_range(0, 6, 2).resolve(8).unwrap(), vec![0, 2, 4, 6]);
    }

    #[test]
    fn negative_stride_walks_backward() {
        assert_eq!(Index::strided_range(4, 0, -2).resolve(5).unwrap(), vec![4, 2, 0]);
    }

    #[test]
    fn zero_increment_errors() {
        assert!(Index::strided_range(0, 3, 0).resolve(5).is_err());
    }

    #[test]
    fn backward_range_with_forward_bounds_errors() {
        assert!(Index::strided_range(0, 3, -1).resolve(5).is_err());
    }
}
