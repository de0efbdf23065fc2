//! A sparse linear-algebra execution engine over semirings (§1).
//!
//! This is the single entry-point for downstream users. It re-exports the
//! public surface — the matrix type, the scalar/operator vocabulary, the
//! per-call `Descriptor`, and the free functions implementing each
//! operation (build, wait, ewise, mxm, extract, assign/subassign, reduce,
//! apply, select, transpose) — and documents how they fit together.
//!
//! ## Invariants
//!
//! - **Deferred work is explicit.** Every mutating operation either
//!   updates a matrix's committed storage in place or appends a pending
//!   tuple; nothing is silently dropped. [`Matrix::has_deferred_work`]
//!   tells you whether [`wait::wait`] has anything to do.
//! - **No hidden process-global state.** Everything a parallel algorithm
//!   needs — the thread pool, the Sauna workspace pool, the allocator —
//!   lives in an [`Engine`] value the caller owns and threads through by
//!   reference (§5, §9).
//! - **Masked write is the one write primitive.** `C⟨M, repl⟩ =
//!   accum(C, T)` ([`mask::mask_accum_assign`]) is shared by `ewise`,
//!   `mxm`, `subassign`, and `assign`; none of them re-derive the merge.
//! - **Failure is a `Result`, never UB.** `#![forbid(unsafe_code)]` holds
//!   crate-wide; shape mismatches and out-of-bounds indices return
//!   [`error::Error`] rather than panicking.

#![forbid(unsafe_code)]
#![deny(rust_2018_idioms)]

/// Scalar domain: the built-in type code and the sealed `Scalar` bound.
pub mod types;
/// Operators: unary/binary ops, monoids, semirings, and the builtin library.
pub mod ops;
/// Error type and crate-wide `Result` alias.
pub mod error;
/// Per-call configuration (`Descriptor`, `MxmMethod`, `SlicingHint`).
pub mod descriptor;
/// Pluggable allocator trait and the default system allocator.
pub mod alloc;
/// The `Engine`: thread pool, Sauna workspace pool, deferred-work counter.
pub mod engine;
/// Deferred-write bookkeeping (`PendingTuples`).
pub mod pending;
/// The matrix representation: compressed vectors, zombies, shallow aliasing.
pub mod matrix;
/// Build a matrix from coordinate triplets, folding duplicates via a binary op.
pub mod build;
/// Flush deferred work (pending tuples, zombies) into committed storage.
pub mod wait;
/// Transpose, dispatching between counting-sort and comparison-sort algorithms.
pub mod transpose;
/// The masked accumulate-assign merge shared by the write-path operations.
pub mod mask;
/// Element-wise union (`ewise_add`) and intersection (`ewise_mult`).
pub mod ewise;
/// Matrix multiply: dispatch plus the Gustavson/heap/dot-product algorithms.
pub mod mxm;
/// Row/column index sets (`All`, `Range`, `List`) used by extract/assign.
pub mod index;
/// Extract a submatrix addressed by row/column index sets.
pub mod extract;
/// `C(I, J)⟨M, repl⟩ = accum(C(I, J), A)` with a submatrix-shaped mask.
pub mod subassign;
/// `C(I, J)⟨M, repl⟩ = accum(C(I, J), A)` with a full-`C`-shaped mask.
pub mod assign;
/// Reduce to a scalar or to a vector through a monoid.
pub mod reduce;
/// Pattern-preserving unary map.
pub mod apply;
/// Structural, value-relational, and index-relational entry selection.
pub mod select;

pub use descriptor::{Descriptor, MxmMethod, SlicingHint};
pub use engine::{Engine, DEFAULT_HYPER_RATIO};
pub use error::{Error, Result};
pub use index::Index;
pub use matrix::Matrix;
pub use ops::{builtin, BinaryOp, Monoid, Semiring, UnaryOp};
pub use select::Select;
pub use types::{Code, Scalar};

pub use apply::apply;
pub use assign::{assign, assign_scalar};
pub use build::build;
pub use ewise::{ewise_add, ewise_mult};
pub use extract::extract;
pub use mask::mask_accum_assign;
pub use mxm::mxm;
pub use reduce::{reduce_to_scalar, reduce_to_vector};
pub use select::select;
pub use subassign::{subassign, subassign_scalar};
pub use transpose::transpose;
pub use wait::wait;
