//! The matrix representation (§3): compressed vectors, hypersparse/
//! standard form, zombies, pending tuples, and shallow aliasing.
//!
//! All internal algorithms treat a matrix as a sequence of *vectors* in
//! its own orientation (`is_csc` only changes how `(row, col)` map to
//! `(i, vector index)`, never the algorithms themselves, §3).

use crate::error::{Error, Result};
use crate::pending::PendingTuples;
use crate::types::Scalar;
use std::sync::Arc;

/// One stored index slot: either *live* or a *zombie* — an entry marked
/// for deletion but not yet compacted (§3). Per §9's design note this is
/// an explicit sum type rather than a sign-flip trick, so it works
/// uniformly for unsigned indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Slot {
    /// A live entry at this absolute row-in-vector index.
    Live(usize),
    /// A zombie: logically absent, physically still occupying its slot.
    Dead(usize),
}

impl Slot {
    /// The absolute row-in-vector index, whether live or dead.
    #[inline]
    pub fn index(&self) -> usize {
        match *self {
            Slot::Live(i) | Slot::Dead(i) => i,
        }
    }

    /// Whether this slot is a zombie.
    #[inline]
    pub fn is_zombie(&self) -> bool {
        matches!(self, Slot::Dead(_))
    }

    /// Flip a live slot to dead, keeping its index (a no-op on an already
    /// dead slot).
    #[inline]
    pub fn kill(&mut self) {
        if let Slot::Live(i) = *self {
            *self = Slot::Dead(i);
        }
    }

    /// Flip a dead slot back to live (zombie resurrection, §4.6 case
    /// `[X A 1]`).
    #[inline]
    pub fn resurrect(&mut self) {
        if let Slot::Dead(i) = *self {
            *self = Slot::Live(i);
        }
    }
}

/// A storage array that is either owned or a read-only borrow of another
/// matrix's array (§3 "shallow"). The owner of a `Shallow` segment is kept
/// alive by the `Arc`; a borrower can read it but never frees, grows, or
/// mutates it in place (§5 "shallow aliasing discipline").
#[derive(Clone)]
pub enum Storage<T: Clone> {
    /// Owned, freely mutable storage.
    Owned(Vec<T>),
    /// A read-only, reference-counted borrow of another matrix's array.
    Shallow(Arc<[T]>),
}

impl<T: Clone> Storage<T> {
    fn empty() -> Self {
        Storage::Owned(Vec::new())
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        match self {
            Storage::Owned(v) => v.len(),
            Storage::Shallow(a) => a.len(),
        }
    }

    /// Whether the array is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Read-only view, regardless of ownership.
    pub fn as_slice(&self) -> &[T] {
        match self {
            Storage::Owned(v) => v,
            Storage::Shallow(a) => a,
        }
    }

    /// Whether this array is a shallow (borrowed) copy.
    pub fn is_shallow(&self) -> bool {
        matches!(self, Storage::Shallow(_))
    }

    /// Deep-copy a shallow array into owned storage in place, if needed.
    pub fn make_owned(&mut self) {
        if let Storage::Shallow(a) = self {
            *self = Storage::Owned(a.to_vec());
        }
    }

    /// Mutable access, deep-copying first if this array was shallow.
    pub fn as_mut_vec(&mut self) -> &mut Vec<T> {
        self.make_owned();
        match self {
            Storage::Owned(v) => v,
            Storage::Shallow(_) => unreachable!("make_owned just ran"),
        }
    }

    /// Wrap an owned vector as a read-only, shareable shallow segment.
    pub fn freeze(vec: Vec<T>) -> Arc<[T]> {
        Arc::from(vec.into_boxed_slice())
    }
}

impl<T: Clone> From<Vec<T>> for Storage<T> {
    fn from(v: Vec<T>) -> Self {
        Storage::Owned(v)
    }
}

/// Lifecycle tag (§3). Rust's ownership model already prevents use-after-
/// free, so `Freed` is never observed on a reachable `Matrix`; the tag
/// exists to catch the one state Rust *cannot* rule out statically — a
/// matrix left `PartiallyInitialised` after a mutation aborted partway
/// through (allocator failure during `resize`/`hyper_realloc`), which per
/// §3 is valid only for destruction/replacement, not for further use.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Magic {
    /// Normal, usable state.
    Valid,
    /// A destructive operation failed partway through; only `clear`/
    /// reassignment may touch this matrix next.
    PartiallyInitialized,
}

/// The sole storage entity (§3): a sparse matrix over compressed vectors,
/// generic over its [`Scalar`] element type.
#[derive(Clone)]
pub struct Matrix<T: Scalar> {
    vlen: usize,
    vdim: usize,
    is_csc: bool,
    p: Storage<usize>,
    h: Option<Storage<usize>>,
    i: Storage<Slot>,
    x: Storage<T>,
    pending: PendingTuples<T>,
    nzombies: usize,
    hyper_ratio: f64,
    magic: Magic,
}

impl<T: Scalar> Matrix<T> {
    /// A new, empty, standard-form matrix of the given logical dimensions
    /// and orientation.
    pub fn new(vlen: usize, vdim: usize, is_csc: bool, hyper_ratio: f64) -> Self {
        Self {
            vlen,
            vdim,
            is_csc,
            p: Storage::Owned(vec![0usize; vdim + 1]),
            h: None,
            i: Storage::empty(),
            x: Storage::empty(),
            pending: PendingTuples::new(),
            nzombies: 0,
            hyper_ratio,
            magic: Magic::Valid,
        }
    }

    /// A vector is a matrix with `vdim == 1` that never goes hypersparse
    /// (§6).
    pub fn new_vector(vlen: usize, hyper_ratio: f64) -> Self {
        Self::new(vlen, 1, false, hyper_ratio)
    }

    /// Whether this is a vector (`vdim == 1`).
    pub fn is_vector(&self) -> bool {
        self.vdim == 1
    }

    /// Orientation: true means column-major (vector *j* is column *j*).
    pub fn is_csc(&self) -> bool {
        self.is_csc
    }

    /// Logical dimensions in vector orientation, `(vlen, vdim)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.vlen, self.vdim)
    }

    /// Logical `(rows, cols)` shape, honouring orientation.
    pub fn shape(&self) -> (usize, usize) {
        if self.is_csc {
            (self.vlen, self.vdim)
        } else {
            (self.vdim, self.vlen)
        }
    }

    /// Length of each stored vector's domain (`vlen`).
    pub fn vlen(&self) -> usize {
        self.vlen
    }

    /// Number of logical vectors (`vdim`).
    pub fn vdim(&self) -> usize {
        self.vdim
    }

    /// Whether the matrix is in hypersparse form.
    pub fn is_hypersparse(&self) -> bool {
        self.h.is_some()
    }

    /// Number of *stored* vectors: `vdim` in standard form, `h.len()` in
    /// hypersparse form.
    pub fn nvec(&self) -> usize {
        match &self.h {
            Some(h) => h.len(),
            None => self.vdim,
        }
    }

    /// Count of live (non-zombie) stored entries, excluding pending
    /// tuples.
    pub fn nvals(&self) -> usize {
        self.i.len() - self.nzombies
    }

    /// Count of zombie entries.
    pub fn nzombies(&self) -> usize {
        self.nzombies
    }

    /// Number of pending tuples awaiting `wait`.
    pub fn npending(&self) -> usize {
        self.pending.len()
    }

    /// Whether this matrix carries deferred work (pending tuples and/or
    /// zombies) that `wait` has not yet reconciled (§4.2).
    pub fn has_deferred_work(&self) -> bool {
        self.nzombies > 0 || !self.pending.is_empty()
    }

    /// The configured hyper ratio `θ` (§3).
    pub fn hyper_ratio(&self) -> f64 {
        self.hyper_ratio
    }

    pub(crate) fn set_hyper_ratio(&mut self, ratio: f64) {
        self.hyper_ratio = ratio;
    }

    pub(crate) fn magic(&self) -> Magic {
        self.magic
    }

    pub(crate) fn mark_partially_initialized(&mut self) {
        self.magic = Magic::PartiallyInitialized;
    }

    pub(crate) fn mark_valid(&mut self) {
        self.magic = Magic::Valid;
    }

    fn require_valid(&self) -> Result<()> {
        if self.magic != Magic::Valid {
            return Err(Error::InvalidObject(
                "matrix is partially initialised after a prior failure".into(),
            ));
        }
        Ok(())
    }

    /// The half-open `[start, end)` range of `self.i`/`self.x` holding the
    /// `k`-th *stored* vector's entries.
    pub fn vector_bounds(&self, k: usize) -> (usize, usize) {
        let p = self.p.as_slice();
        (p[k], p[k + 1])
    }

    /// The global vector index of the `k`-th stored vector.
    pub fn vector_id(&self, k: usize) -> usize {
        match &self.h {
            Some(h) => h.as_slice()[k],
            None => k,
        }
    }

    /// Find the stored-vector offset `k` for global vector index `j`, if
    /// any entries are stored for it.
    pub fn find_vector(&self, j: usize) -> Option<usize> {
        match &self.h {
            None => {
                if j < self.vdim {
                    Some(j)
                } else {
                    None
                }
            }
            Some(h) => h.as_slice().binary_search(&j).ok(),
        }
    }

    /// Read-only access to the raw offsets array.
    pub fn raw_p(&self) -> &[usize] {
        self.p.as_slice()
    }

    /// Read-only access to the raw hyperlist, if hypersparse.
    pub fn raw_h(&self) -> Option<&[usize]> {
        self.h.as_ref().map(|h| h.as_slice())
    }

    /// Read-only access to the raw index-slot array.
    pub fn raw_i(&self) -> &[Slot] {
        self.i.as_slice()
    }

    /// Read-only access to the raw value array.
    pub fn raw_x(&self) -> &[T] {
        self.x.as_slice()
    }

    /// Read-only access to the pending-tuple buffer.
    pub fn pending(&self) -> &PendingTuples<T> {
        &self.pending
    }

    /// Count of vectors (within `vdim`) holding at least one stored
    /// entry. The basis `conform` actually switches form on, since a
    /// standard-form matrix's [`Matrix::nvec`] is `vdim` regardless of
    /// occupancy.
    pub fn occupied_vectors(&self) -> usize {
        let p = self.p.as_slice();
        (0..self.nvec()).filter(|&k| p[k] != p[k + 1]).count()
    }

    /// Convert standard form into hypersparse form, keeping only
    /// non-empty vectors (§3, §4.1). A no-op if already hypersparse.
    pub fn to_hyper(&mut self) {
        if self.is_hypersparse() {
            return;
        }
        let p_old = self.p.as_slice().to_vec();
        let mut h = Vec::new();
        let mut p_new = vec![0usize];
        for k in 0..self.vdim {
            if p_old[k] != p_old[k + 1] {
                h.push(k);
                p_new.push(p_old[k + 1]);
            }
        }
        self.p = Storage::Owned(p_new);
        self.h = Some(Storage::Owned(h));
    }

    /// Convert hypersparse form back into standard form, materialising an
    /// empty range for every vector `h` does not list (§3, §4.1). A no-op
    /// if already standard.
    pub fn to_standard(&mut self) {
        let h = match self.h.take() {
            Some(h) => h,
            None => return,
        };
        let h = h.as_slice().to_vec();
        let p_old = self.p.as_slice().to_vec();
        let mut p_new = vec![0usize; self.vdim + 1];
        for (k, &j) in h.iter().enumerate() {
            p_new[j + 1] = p_old[k + 1];
        }
        for k in 0..self.vdim {
            if p_new[k + 1] < p_new[k] {
                p_new[k + 1] = p_new[k];
            }
        }
        self.p = Storage::Owned(p_new);
        self.h = None;
    }

    /// Switch between hypersparse and standard form based on the
    /// occupied-vector ratio against [`Matrix::hyper_ratio`] (§3): a
    /// matrix is hypersparse iff `occupied / vdim <= θ`.
    pub fn conform(&mut self) {
        if self.vdim == 0 {
            return;
        }
        let ratio = self.occupied_vectors() as f64 / self.vdim as f64;
        if self.is_hypersparse() {
            if ratio > self.hyper_ratio {
                self.to_standard();
            }
        } else if ratio <= self.hyper_ratio {
            self.to_hyper();
        }
    }

    /// Reserve extra capacity in `p`/`h` ahead of an expected growth, the
    /// Rust analogue of the original's explicit `hyper_realloc` capacity
    /// bump (§4.1). `Vec` already grows geometrically on push, so this is
    /// an optimisation hint, not a correctness requirement.
    pub fn hyper_realloc(&mut self, additional_vectors: usize) {
        self.p.as_mut_vec().reserve(additional_vectors);
        if let Some(h) = &mut self.h {
            h.as_mut_vec().reserve(additional_vectors);
        }
    }

    /// Whether any of `p`, `h`, `i`, `x` is a shallow (borrowed) array.
    pub fn has_shallow_component(&self) -> bool {
        self.p.is_shallow()
            || self.h.as_ref().is_some_and(Storage::is_shallow)
            || self.i.is_shallow()
            || self.x.is_shallow()
    }

    /// Locate the storage position of live-or-dead entry `(i, j)`, if
    /// stored.
    pub fn locate(&self, i: usize, j: usize) -> Option<usize> {
        let k = self.find_vector(j)?;
        let (lo, hi) = self.vector_bounds(k);
        let slots = self.i.as_slice();
        slots[lo..hi]
            .binary_search_by_key(&i, Slot::index)
            .ok()
            .map(|off| lo + off)
    }

    fn check_bounds(&self, i: usize, j: usize) -> Result<()> {
        let (rows, cols) = self.shape();
        let (row, col) = if self.is_csc { (i, j) } else { (j, i) };
        if row >= rows {
            return Err(Error::IndexOutOfBounds { index: row, bound: rows });
        }
        if col >= cols {
            return Err(Error::IndexOutOfBounds { index: col, bound: cols });
        }
        Ok(())
    }

    /// Read a *committed* (non-pending) live value at `(i, j)` in vector
    /// orientation, ignoring any pending tuple that might also target it.
    /// Used internally by algorithms that operate on the already-waited
    /// form; user-facing extraction should call [`crate::wait::wait`]
    /// first for a consistent view (§4.2).
    pub fn get_committed(&self, i: usize, j: usize) -> Option<T> {
        let pos = self.locate(i, j)?;
        if self.i.as_slice()[pos].is_zombie() {
            None
        } else {
            Some(self.x.as_slice()[pos])
        }
    }

    /// `C(i, j) = v` honouring the disjointness invariant (§4.2): a write
    /// to an existing live entry is an in-place update, a write to an
    /// existing zombie resurrects it, and only a write to a genuinely new
    /// position becomes a pending tuple.
    pub fn set_element(&mut self, i: usize, j: usize, v: T) -> Result<()> {
        self.require_valid()?;
        self.check_bounds(i, j)?;
        if let Some(pos) = self.locate(i, j) {
            if self.i.as_slice()[pos].is_zombie() {
                self.i.as_mut_vec()[pos].resurrect();
                self.nzombies -= 1;
            }
            self.x.as_mut_vec()[pos] = v;
            return Ok(());
        }
        self.pending.push(i, j, v);
        Ok(())
    }

    /// Delete `C(i, j)` by zombifying its stored entry, if present. A
    /// no-op if the position has no committed entry (creating, then
    /// immediately deleting, a pending tuple would violate the
    /// disjointness invariant by leaving a dangling pending delete, so
    /// this only ever touches committed storage).
    pub fn remove_element(&mut self, i: usize, j: usize) -> Result<()> {
        self.require_valid()?;
        self.check_bounds(i, j)?;
        if let Some(pos) = self.locate(i, j) {
            let slot = &mut self.i.as_mut_vec()[pos];
            if !slot.is_zombie() {
                slot.kill();
                self.nzombies += 1;
                self.prune_if_all_zombie(j);
            }
        }
        Ok(())
    }

    /// If vector `j`'s stored range is now entirely zombie and the matrix
    /// is hypersparse, splice it out of `h`/`p` immediately rather than
    /// waiting for the next `wait`: a hypersparse vector reduced to
    /// all-zombies is pruned the moment its last live entry is zombified,
    /// keeping `nvec` monotonically reflective of live content.
    fn prune_if_all_zombie(&mut self, j: usize) {
        if !self.is_hypersparse() {
            return;
        }
        let Some(k) = self.find_vector(j) else { return };
        let (lo, hi) = self.vector_bounds(k);
        if !self.i.as_slice()[lo..hi].iter().all(Slot::is_zombie) {
            return;
        }
        let width = hi - lo;
        self.nzombies -= width;
        self.i.as_mut_vec().drain(lo..hi);
        self.x.as_mut_vec().drain(lo..hi);
        if let Some(h) = &mut self.h {
            h.as_mut_vec().remove(k);
        }
        let p = self.p.as_mut_vec();
        p.remove(k + 1);
        for off in &mut p[(k + 1)..] {
            *off -= width;
        }
    }

    /// Discard all content, leaving an empty standard-form matrix of the
    /// same logical shape, orientation, and hyper ratio.
    pub fn clear(&mut self) {
        self.p = Storage::Owned(vec![0usize; self.vdim + 1]);
        self.h = None;
        self.i = Storage::empty();
        self.x = Storage::empty();
        self.pending.clear();
        self.nzombies = 0;
        self.magic = Magic::Valid;
    }

    /// Resize the logical dimensions. Entries whose row or stored-vector
    /// id fall outside the new bounds are dropped (committed entries are
    /// zombified then compacted away on the next `wait`; pending tuples
    /// outside bounds are simply discarded, since they were never
    /// observable).
    pub fn resize(&mut self, new_vlen: usize, new_vdim: usize) {
        if new_vlen < self.vlen {
            let slots = self.i.as_mut_vec();
            for (pos, slot) in slots.iter_mut().enumerate() {
                let _ = pos;
                if !slot.is_zombie() && slot.index() >= new_vlen {
                    slot.kill();
                    self.nzombies += 1;
                }
            }
        }
        if new_vdim < self.vdim {
            match &mut self.h {
                None => {
                    // Standard form: truncate p, dropping vectors >= new_vdim.
                    let p = self.p.as_mut_vec();
                    p.truncate(new_vdim + 1);
                }
                Some(h) => {
                    let keep = h
                        .as_slice()
                        .iter()
                        .take_while(|&&j| j < new_vdim)
                        .count();
                    h.as_mut_vec().truncate(keep);
                    let new_len = self.p.as_slice()[keep];
                    self.p.as_mut_vec().truncate(keep + 1);
                    // Drop now-unreachable entries beyond `new_len` and any
                    // zombies among them from the zombie count.
                    let dead_tail = self.i.as_slice()[new_len..]
                        .iter()
                        .filter(|s| s.is_zombie())
                        .count();
                    self.nzombies -= dead_tail;
                    self.i.as_mut_vec().truncate(new_len);
                    self.x.as_mut_vec().truncate(new_len);
                }
            }
        }
        self.vlen = new_vlen;
        self.vdim = new_vdim;
        self.pending
            .drain()
            .into_iter()
            .filter(|t| t.i < new_vlen && t.j < new_vdim)
            .for_each(|t| self.pending.push(t.i, t.j, t.v));
    }

    /// A fully independent deep copy: no shallow flags set, pending
    /// tuples and zombies replicated (§4.1).
    pub fn dup(&self) -> Self {
        Self {
            vlen: self.vlen,
            vdim: self.vdim,
            is_csc: self.is_csc,
            p: Storage::Owned(self.p.as_slice().to_vec()),
            h: self.h.as_ref().map(|h| Storage::Owned(h.as_slice().to_vec())),
            i: Storage::Owned(self.i.as_slice().to_vec()),
            x: Storage::Owned(self.x.as_slice().to_vec()),
            pending: self.pending.clone(),
            nzombies: self.nzombies,
            hyper_ratio: self.hyper_ratio,
            magic: self.magic,
        }
    }

    /// Move `src`'s content into `self`, honouring typecasting and the
    /// shallow-forces-deep-copy rule (§4.1): if `src` has any shallow
    /// component, the arrays are deep-copied; otherwise ownership moves
    /// and `src` becomes empty.
    pub fn transplant(&mut self, mut src: Matrix<T>) -> Result<()> {
        src.require_valid()?;
        if src.has_shallow_component() {
            *self = src.dup();
        } else {
            *self = src.clone();
        }
        src.clear();
        Ok(())
    }

    /// Build a matrix directly from already-sorted, already-deduplicated
    /// parts. Used internally by Build/Transpose (§4.7); callers outside
    /// this crate should prefer [`crate::build::build`].
    pub(crate) fn from_parts(
        vlen: usize,
        vdim: usize,
        is_csc: bool,
        p: Vec<usize>,
        h: Option<Vec<usize>>,
        i: Vec<Slot>,
        x: Vec<T>,
        hyper_ratio: f64,
    ) -> Self {
        debug_assert_eq!(p.len(), h.as_ref().map_or(vdim, Vec::len) + 1);
        let nzombies = i.iter().filter(|s| s.is_zombie()).count();
        Self {
            vlen,
            vdim,
            is_csc,
            p: Storage::Owned(p),
            h: h.map(Storage::Owned),
            i: Storage::Owned(i),
            x: Storage::Owned(x),
            pending: PendingTuples::new(),
            nzombies,
            hyper_ratio,
            magic: Magic::Valid,
        }
    }

    /// Borrow the internal arrays as shallow (read-only, reference-
    /// counted) segments, producing a new matrix that shares storage
    /// with `self` (§3 "shallow").
    pub fn shallow_copy(&self) -> Self {
        Self {
            vlen: self.vlen,
            vdim: self.vdim,
            is_csc: self.is_csc,
            p: Storage::Shallow(Storage::freeze(self.p.as_slice().to_vec())),
            h: self
                .h
                .as_ref()
                .map(|h| Storage::Shallow(Storage::freeze(h.as_slice().to_vec()))),
            i: Storage::Shallow(Storage::freeze(self.i.as_slice().to_vec())),
            x: Storage::Shallow(Storage::freeze(self.x.as_slice().to_vec())),
            pending: PendingTuples::new(),
            nzombies: self.nzombies,
            hyper_ratio: self.hyper_ratio,
            magic: self.magic,
        }
    }

    /// Direct (unsafe-free) mutable access to `(p, h, i, x, nzombies)` for
    /// use by the Wait/Build/Transpose/MxM internals that assemble a new
    /// physical form from scratch. Deep-copies any shallow array first.
    pub(crate) fn parts_mut(
        &mut self,
    ) -> (&mut Vec<usize>, &mut Option<Storage<usize>>, &mut Vec<Slot>, &mut Vec<T>, &mut usize)
    {
        self.p.make_owned();
        self.i.make_owned();
        self.x.make_owned();
        if let Some(h) = &mut self.h {
            h.make_owned();
        }
        (self.p.as_mut_vec(), &mut self.h, self.i.as_mut_vec(), self.x.as_mut_vec(), &mut self.nzombies)
    }

    pub(crate) fn set_h(&mut self, h: Option<Vec<usize>>) {
        self.h = h.map(Storage::Owned);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::DEFAULT_HYPER_RATIO;

    #[test]
    fn new_matrix_is_empty() {
        let m: Matrix<i32> = Matrix::new(3, 3, false, DEFAULT_HYPER_RATIO);
        assert_eq!(m.nvals(), 0);
        assert_eq!(m.shape(), (3, 3));
        assert!(!m.is_hypersparse());
    }

    #[test]
    fn set_element_then_resurrect_after_delete() {
        let mut m: Matrix<i32> = Matrix::new(3, 3, false, DEFAULT_HYPER_RATIO);
        m.set_element(0, 0, 5).unwrap();
        assert_eq!(m.npending(), 1);
    }

    #[test]
    fn resize_drops_out_of_bounds_pending_tuples() {
        let mut m: Matrix<i32> = Matrix::new(4, 4, false, DEFAULT_HYPER_RATIO);
        m.set_element(3, 3, 1).unwrap();
        m.set_element(0, 0, 2).unwrap();
        m.resize(2, 2);
        assert_eq!(m.npending(), 1);
    }

    #[test]
    fn out_of_bounds_set_element_errors() {
        let mut m: Matrix<i32> = Matrix::new(2, 2, false, DEFAULT_HYPER_RATIO);
        assert!(m.set_element(5, 0, 1).is_err());
    }

    #[test]
    fn remove_element_prunes_all_zombie_vector_from_hyper_h() {
        let engine = crate::engine::Engine::new();
        let mut m: Matrix<i32> = Matrix::new(4, 4, false, 1.0);
        m.set_element(0, 1, 10).unwrap();
        m.set_element(2, 3, 20).unwrap();
        crate::wait::wait(&mut m, crate::ops::builtin::second(), &engine).unwrap();
        m.to_hyper();
        assert_eq!(m.nvec(), 2);
        assert_eq!(m.raw_h(), Some(&[1usize, 3][..]));

        m.remove_element(0, 1).unwrap();
        assert_eq!(m.nvec(), 1);
        assert_eq!(m.nzombies(), 0, "the zombie vector is pruned away, not just marked");
        assert_eq!(m.raw_h(), Some(&[3usize][..]));
        assert_eq!(m.get_committed(2, 3), Some(20));
    }
}
