//! Crate-wide error type.
//!
//! The original design routes every failure through a thread-local status
//! code and string (§6, §7). This crate instead returns `Result<T, Error>`
//! from every fallible operation, so error state composes with the
//! `Engine`'s parallelism instead of relying on TLS (§9 design note).
//!
//! `NoValue` from the abstract error table is deliberately *not* a variant
//! here: it is non-fatal and not logged to any error channel, so accessors
//! that can miss (`extract_element`) return `Option` instead.

use thiserror::Error;

/// The `Error` kinds of the abstract table in §7 this crate can actually
/// raise at runtime, minus `NoValue` (represented as `Option::None`, see
/// module docs). `DomainMismatch` and `Poisoned` from the abstract table
/// are deliberately absent: operator/type domain agreement (a monoid's
/// `T` matching a semiring's `mult.z`, a typecast the built-in matrix
/// defines) is enforced entirely by the type system here, never at
/// runtime, and the one lock the original design could poison (the Sauna
/// pool's slot table) is a lock-free [`crate::engine::SaunaPool`] queue
/// instead (§5, §9), so there is no runtime event either variant would
/// ever correspond to.
#[derive(Debug, Error)]
pub enum Error {
    /// Any allocation failure reported by the configured [`crate::alloc::Allocator`].
    #[error("out of memory (requested {requested} bytes)")]
    OutOfMemory {
        /// Size of the failed allocation, in bytes.
        requested: usize,
    },

    /// Operand shapes are incompatible for the requested operation.
    #[error("dimension mismatch: {context} (got {lhs:?} vs {rhs:?})")]
    DimensionMismatch {
        /// Which operation/operand pair triggered the mismatch.
        context: &'static str,
        /// Shape of the left-hand operand.
        lhs: (usize, usize),
        /// Shape of the right-hand operand.
        rhs: (usize, usize),
    },

    /// An argument's own invariants are broken (e.g. a non-monotone `p`
    /// array handed to `Build`, or a matrix still flagged partially
    /// initialised).
    #[error("invalid object: {0}")]
    InvalidObject(String),

    /// An `I`/`J` index list entry is `>= ` the corresponding dimension.
    #[error("index {index} out of bounds for dimension of size {bound}")]
    IndexOutOfBounds {
        /// The offending index.
        index: usize,
        /// The dimension size it was checked against.
        bound: usize,
    },

    /// An option/descriptor value fell outside its allowed set.
    #[error("invalid value: {0}")]
    InvalidValue(String),
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Build a [`Error::DimensionMismatch`] for a binary operation.
    pub fn dims(context: &'static str, lhs: (usize, usize), rhs: (usize, usize)) -> Self {
        Error::DimensionMismatch { context, lhs, rhs }
    }
}
