//! Descriptor: per-call configuration bits (§6).
//!
//! Bundles the output-replace flag, mask-complement flag, input transpose
//! bits, MxM method/slicing hints, and a thread-count override. Built with
//! a small fluent builder, the way the teacher crate's `ProverBuilder`
//! wires up optional per-call configuration (`api.rs`) instead of a single
//! monolithic options struct with public fields everywhere.

/// Hint selecting one of the three matrix-multiply algorithms (§4.5.1).
/// `Auto` lets the dispatcher estimate flops and decide (the default).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum MxmMethod {
    /// Let the dispatcher choose based on the flop estimate and mask.
    #[default]
    Auto,
    /// Force the gather/scatter (Gustavson) saxpy algorithm (§4.5.2).
    Gustavson,
    /// Force the heap-based saxpy algorithm (§4.5.3).
    Heap,
    /// Force the dot-product algorithm (§4.5.4).
    Dot,
}

/// Hint selecting how `B` (saxpy methods) or `A'` (dot methods) is sliced
/// across tasks (§4.5.1 step 4).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum SlicingHint {
    /// Coarse slices, one contiguous column/row range per task, sized by
    /// nnz.
    #[default]
    Coarse,
    /// Coarse slices sized by flop count (`BFLOPS`/`ATNZ`-style balancing).
    Flops,
    /// Fine slices within a single dense column/row (`BNZFINE`/`ATROW`).
    Fine,
}

/// Per-call configuration bits consumed by Mask/Accum (§4.3), MxM (§4.5),
/// and Subassign/Assign (§4.6).
#[derive(Clone, Copy, Debug, Default)]
pub struct Descriptor {
    /// `C⟨M, repl⟩`'s `repl` flag: clear `C` outside the mask's selection.
    pub output_replace: bool,
    /// Negate the mask predicate (`Mcomp`, §4.3 step 2).
    pub mask_complement: bool,
    /// Transpose the first input before use.
    pub transpose_first: bool,
    /// Transpose the second input before use.
    pub transpose_second: bool,
    /// MxM algorithm hint (§4.5.1).
    pub mxm_method: MxmMethod,
    /// MxM task-slicing hint (§4.5.1 step 4).
    pub slicing: SlicingHint,
    /// Thread count override; `None` uses the `Engine`'s configured pool
    /// size.
    pub nthreads: Option<usize>,
}

impl Descriptor {
    /// The all-default descriptor: no replace, no complement, no
    /// transpose, automatic method/slicing choice.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the output-replace flag.
    pub fn replace(mut self, yes: bool) -> Self {
        self.output_replace = yes;
        self
    }

    /// Set the mask-complement flag.
    pub fn complement(mut self, yes: bool) -> Self {
        self.mask_complement = yes;
        self
    }

    /// Mark the first input as needing transpose before use.
    pub fn transpose_a(mut self) -> Self {
        self.transpose_first = true;
        self
    }

    /// Mark the second input as needing transpose before use.
    pub fn transpose_b(mut self) -> Self {
        self.transpose_second = true;
        self
    }

    /// Force a specific MxM algorithm instead of automatic dispatch.
    pub fn method(mut self, m: MxmMethod) -> Self {
        self.mxm_method = m;
        self
    }

    /// Force a specific task-slicing strategy.
    pub fn slicing(mut self, s: SlicingHint) -> Self {
        self.slicing = s;
        self
    }

    /// Override the thread count for this call only.
    pub fn nthreads(mut self, n: usize) -> Self {
        self.nthreads = Some(n.max(1));
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builder_chains_set_the_expected_fields() {
        let d = Descriptor::new()
            .replace(true)
            .complement(true)
            .method(MxmMethod::Heap)
            .nthreads(4);
        assert!(d.output_replace);
        assert!(d.mask_complement);
        assert_eq!(d.mxm_method, MxmMethod::Heap);
        assert_eq!(d.nthreads, Some(4));
        assert!(!d.transpose_first);
    }
}
