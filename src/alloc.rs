//! Pluggable allocator interface (§6).
//!
//! The original design routes every internal allocation through four
//! function pointers (`malloc`, `calloc`, `realloc`, `free`) set once at
//! process initialisation. Rust's ordinary collections already go through
//! the global allocator, so re-plumbing every `Vec` through a custom
//! allocator trait (stable `Allocator` is still unstable) would fight the
//! language rather than follow it. Instead this crate exposes the
//! *policy* half of that interface — an accounting/limit boundary that
//! every growth of a matrix's `i`/`x`/`p`/`h` arrays is checked against —
//! which is the part higher layers actually rely on (deterministic,
//! testable `OutOfMemory` errors and cooperative cancellation, §5).

use crate::error::Error;
use std::sync::atomic::{AtomicUsize, Ordering};

/// Accounting/limit boundary that storage growth is checked against.
///
/// A real embedding would typically just track usage for metrics; tests in
/// this crate use [`Allocator::with_limit`] to deterministically exercise
/// the `OutOfMemory` error path without allocating actual unbounded
/// memory.
pub trait Allocator: Send + Sync {
    /// Reserve `bytes` more against this allocator's budget. Returns
    /// `Error::OutOfMemory` if the reservation would exceed a configured
    /// limit.
    fn reserve(&self, bytes: usize) -> Result<(), Error>;

    /// Release a previously reserved amount back to the budget.
    fn release(&self, bytes: usize);

    /// Bytes currently reserved.
    fn in_use(&self) -> usize;
}

/// The default allocator: tracks usage, optionally capped by a byte limit.
#[derive(Debug, Default)]
pub struct SystemAllocator {
    used: AtomicUsize,
    limit: Option<usize>,
}

impl SystemAllocator {
    /// An allocator with no limit; `reserve` never fails.
    pub fn unbounded() -> Self {
        Self { used: AtomicUsize::new(0), limit: None }
    }

    /// An allocator that fails `reserve` once `limit` bytes are in use.
    pub fn with_limit(limit: usize) -> Self {
        Self { used: AtomicUsize::new(0), limit: Some(limit) }
    }
}

impl Allocator for SystemAllocator {
    fn reserve(&self, bytes: usize) -> Result<(), Error> {
        if let Some(limit) = self.limit {
            loop {
                let current = self.used.load(Ordering::Acquire);
                let next = current.saturating_add(bytes);
                if next > limit {
                    tracing::warn!(requested = bytes, in_use = current, limit, "allocation rejected: over budget");
                    return Err(Error::OutOfMemory { requested: bytes });
                }
                if self
                    .used
                    .compare_exchange_weak(current, next, Ordering::AcqRel, Ordering::Acquire)
                    .is_ok()
                {
                    return Ok(());
                }
            }
        } else {
            self.used.fetch_add(bytes, Ordering::AcqRel);
            Ok(())
        }
    }

    fn release(&self, bytes: usize) {
        self.used.fetch_sub(bytes, Ordering::AcqRel);
    }

    fn in_use(&self) -> usize {
        self.used.load(Ordering::Acquire)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unbounded_never_fails() {
        let a = SystemAllocator::unbounded();
        assert!(a.reserve(1 << 30).is_ok());
        assert_eq!(a.in_use(), 1 << 30);
    }

    #[test]
    fn limited_allocator_rejects_past_the_cap() {
        let a = SystemAllocator::with_limit(100);
        assert!(a.reserve(60).is_ok());
        assert!(a.reserve(60).is_err());
        a.release(60);
        assert!(a.reserve(40).is_ok());
    }
}
