use crate::ids::WireId;
use crate::range::Range;
use crate::skiplist::SkipList;
use thiserror::Error;

/// Errors raised by a single `Scope` operation. These are *recoverable*:
/// the interpreter's directive dispatch ANDs the success of each
/// operation into its running result and keeps going.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ScopeError {
    #[error("invalid range [{first}, {last}]: first must not be greater than last")]
    InvalidRange { first: WireId, last: WireId },
    #[error("wire {0} is out of any allocated range")]
    NotAllocated(WireId),
    #[error("wire {0} is already constructed")]
    AlreadyConstructed(WireId),
    #[error("wire {0} is not yet constructed")]
    NotConstructed(WireId),
    #[error("range [{first}, {last}] does not exactly match any deletable range")]
    UnmatchedDelete { first: WireId, last: WireId },
    #[error("range [{first}, {last}] overlaps an existing allocation")]
    RangeCollision { first: WireId, last: WireId },
    #[error(
        "output range [{first}, {last}] was not fully assigned by the callee"
    )]
    UnassignedOutput { first: WireId, last: WireId },
    #[error("input range [{first}, {last}] is not a single allocated, active range")]
    InvalidInputShape { first: WireId, last: WireId },
    #[error("output range [{first}, {last}] is not a single fresh range")]
    InvalidOutputShape { first: WireId, last: WireId },
}

const RANGE_DEFAULT_SIZE: u64 = 4;

/// Per-type, per-call-frame wire memory: a sparse table of allocated
/// [`Range`]s plus two [`SkipList`]s tracking which wires have ever been
/// assigned a value and which are currently constructed.
///
/// Wire indices are local to the scope: a fresh call frame always starts
/// numbering its own wires from 0, with `first_local` the watermark past
/// which `map_output`/`map_input` append newly remapped ranges.
#[derive(Debug)]
pub struct Scope<W> {
    // Sorted ascending by first wire id of the range.
    ranges: Vec<(u64, Range<W>)>,
    assigned: SkipList,
    active: SkipList,
    first_local: u64,
}

impl<W> Default for Scope<W> {
    fn default() -> Self {
        Scope {
            ranges: Vec::new(),
            assigned: SkipList::new(),
            active: SkipList::new(),
            first_local: 0,
        }
    }
}

impl<W> Scope<W> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn first_local(&self) -> u64 {
        self.first_local
    }

    pub fn assigned(&self) -> &SkipList {
        &self.assigned
    }

    pub fn active(&self) -> &SkipList {
        &self.active
    }

    fn find_range_idx(&self, wire: u64) -> Option<usize> {
        match self
            .ranges
            .binary_search_by(|(first, r)| {
                let last = first + r.len() - 1;
                if last < wire {
                    std::cmp::Ordering::Less
                } else if *first > wire {
                    std::cmp::Ordering::Greater
                } else {
                    std::cmp::Ordering::Equal
                }
            }) {
            Ok(idx) => Some(idx),
            Err(_) => None,
        }
    }

    fn insertion_point(&self, first: u64) -> usize {
        self.ranges.partition_point(|(f, _)| *f < first)
    }

    fn overlaps_any(&self, first: u64, last: u64) -> bool {
        self.ranges
            .iter()
            .any(|(f, r)| *f <= last && first <= f + r.len() - 1)
    }

    /// `@new first last` — allocate a fixed-size, non-growable range.
    pub fn new_range(&mut self, first: WireId, last: WireId) -> Result<(), ScopeError> {
        if first.get() > last.get() {
            return Err(ScopeError::InvalidRange { first, last });
        }
        let (first, last) = (first.get(), last.get());
        if self.overlaps_any(first, last) {
            return Err(ScopeError::RangeCollision {
                first: WireId(first),
                last: WireId(last),
            });
        }
        let len = last - first + 1;
        let range = Range::with_capacity(len, true, false);
        let pos = self.insertion_point(first);
        self.ranges.insert(pos, (first, range));
        Ok(())
    }

    /// `@delete first last` — fully remove a `@new` range, or shrink a
    /// growable range from either end.
    pub fn delete_range(&mut self, first: WireId, last: WireId) -> Result<(), ScopeError> {
        if first.get() > last.get() {
            return Err(ScopeError::InvalidRange { first, last });
        }
        let (first_u, last_u) = (first.get(), last.get());
        let idx = self
            .find_range_idx(first_u)
            .filter(|&idx| self.find_range_idx(last_u) == Some(idx))
            .ok_or(ScopeError::UnmatchedDelete { first, last })?;
        let (range_first, range) = &self.ranges[idx];
        let range_first = *range_first;
        let range_last = range_first + range.len() - 1;

        let exact_match = first_u == range_first && last_u == range_last;
        if range.new_range {
            if exact_match {
                let (_, _) = self.ranges.remove(idx);
                self.assigned.remove_range(first_u, last_u);
                self.active.remove_range(first_u, last_u);
                Ok(())
            } else {
                Err(ScopeError::UnmatchedDelete { first, last })
            }
        } else if exact_match {
            self.ranges.remove(idx);
            self.assigned.remove_range(first_u, last_u);
            self.active.remove_range(first_u, last_u);
            Ok(())
        } else if first_u == range_first {
            // Shrink from the front.
            let n = last_u - first_u + 1;
            self.ranges[idx].0 = last_u + 1;
            self.ranges[idx].1.shrink_front(n);
            self.ranges[idx].1.can_grow = false;
            self.assigned.remove_range(first_u, last_u);
            self.active.remove_range(first_u, last_u);
            Ok(())
        } else if last_u == range_last {
            // Shrink from the back.
            let n = last_u - first_u + 1;
            self.ranges[idx].1.shrink_back(n);
            self.ranges[idx].1.can_grow = false;
            self.assigned.remove_range(first_u, last_u);
            self.active.remove_range(first_u, last_u);
            Ok(())
        } else {
            Err(ScopeError::UnmatchedDelete { first, last })
        }
    }

    /// `wire <- value` — construct (or reconstruct) a single wire,
    /// allocating a growable range on demand if the wire is not yet
    /// covered by any range.
    pub fn assign(&mut self, wire: WireId, value: W) -> Result<(), ScopeError> {
        let w = wire.get();
        if self.assigned.has(w) {
            return Err(ScopeError::AlreadyConstructed(wire));
        }
        if let Some(idx) = self.find_range_idx(w) {
            let (range_first, range) = &mut self.ranges[idx];
            let local = w - *range_first;
            range.construct(local, value);
        } else {
            // Try to extend the range immediately preceding `w`, if growable.
            let mut extended = false;
            if let Some(idx) = self
                .ranges
                .iter()
                .position(|(f, r)| f + r.len() == w && r.can_grow)
            {
                let next_bound = self
                    .ranges
                    .get(idx + 1)
                    .map(|(f, _)| *f)
                    .unwrap_or(u64::MAX);
                let (range_first, range) = &mut self.ranges[idx];
                let cur_len = range.len();
                let grown = cur_len + (cur_len >> 1).max(1);
                let new_len = grown.min(next_bound.saturating_sub(*range_first));
                if new_len > cur_len {
                    range.grow_to(new_len);
                    let local = w - *range_first;
                    range.construct(local, value);
                    extended = true;
                }
            }
            if !extended {
                // Allocate a brand-new growable range starting at `w`.
                let next_bound = {
                    let pos = self.insertion_point(w);
                    self.ranges.get(pos).map(|(f, _)| *f).unwrap_or(u64::MAX)
                };
                let room = next_bound.saturating_sub(w);
                let (len, can_grow) = if w > u64::MAX - RANGE_DEFAULT_SIZE || room < RANGE_DEFAULT_SIZE
                {
                    // Open Question #2: overflow-adjacent allocation falls
                    // back to a non-growable single-slot range.
                    (1u64.min(room.max(1)), false)
                } else {
                    (RANGE_DEFAULT_SIZE, true)
                };
                let mut range = Range::with_capacity(len, false, can_grow);
                range.construct(0, value);
                let pos = self.insertion_point(w);
                self.ranges.insert(pos, (w, range));
            }
        }
        self.assigned.insert(w);
        self.active.insert(w);
        Ok(())
    }

    pub fn retrieve(&self, wire: WireId) -> Result<&W, ScopeError> {
        let w = wire.get();
        let idx = self.find_range_idx(w).ok_or(ScopeError::NotAllocated(wire))?;
        let (range_first, range) = &self.ranges[idx];
        range
            .get(w - range_first)
            .ok_or(ScopeError::NotConstructed(wire))
    }

    pub fn retrieve_mut(&mut self, wire: WireId) -> Result<&mut W, ScopeError> {
        let w = wire.get();
        let idx = self.find_range_idx(w).ok_or(ScopeError::NotAllocated(wire))?;
        let (range_first, range) = &mut self.ranges[idx];
        let local = w - *range_first;
        range.get_mut(local).ok_or(ScopeError::NotConstructed(wire))
    }

    /// Validate that `[first,last]` is eligible to be used as a
    /// function-call output range: a single fresh (not yet assigned),
    /// contiguous span, a span that fits entirely inside one already
    /// allocated `@new`/remapped range: if `[first,last]` already fits
    /// inside a single `new_range`/`remapped` range, that whole sub-span
    /// counts as eligible, or a single wire. The contained-sub-range case
    /// is what lets the iteration plugin carve a fresh per-iteration slot
    /// out of a larger output range that earlier iterations already wrote
    /// into, without first having to "unmark" anything.
    fn validate_output_shape(&self, first: u64, last: u64) -> bool {
        if first == last {
            return true;
        }
        match self.find_range_idx(first) {
            Some(idx) => {
                let (range_first, range) = &self.ranges[idx];
                let range_last = range_first + range.len() - 1;
                (range.new_range || range.remapped) && last <= range_last
            }
            None => !self.assigned.has_range(first, last),
        }
    }

    /// `map_output` — take ownership of `[first,last]` in this (the
    /// caller's) scope to hand to a freshly pushed callee scope. On
    /// success returns an owned [`Range`] of empty slots the callee will
    /// fill in; the caller's bookkeeping for that span is left pending
    /// until [`Scope::check_output`] commits it.
    pub fn map_output(&mut self, first: WireId, last: WireId) -> Result<Range<W>, ScopeError> {
        let (f, l) = (first.get(), last.get());
        if !self.validate_output_shape(f, l) {
            return Err(ScopeError::InvalidOutputShape { first, last });
        }
        let mut range = Range::with_capacity(l - f + 1, false, false);
        range.remapped = true;
        Ok(range)
    }

    /// `check_output` — commit a callee-filled output range back into
    /// this scope, marking `[first,last]` assigned and active. Scans the
    /// whole range and marks whatever prefix/sub-ranges are actually
    /// constructed even on failure, rather than stopping at the first gap.
    ///
    /// If `[first,last]` already sits inside a tracked range (the
    /// `find_outputs`-contained case `map_output` validated), the filled
    /// values are written in place into that range's existing slots
    /// rather than replacing the whole range — this is what lets the
    /// iteration plugin commit one iteration's slice of a larger output
    /// range without discarding the slices earlier iterations already
    /// wrote.
    pub fn check_output(
        &mut self,
        first: WireId,
        last: WireId,
        mut filled: Range<W>,
    ) -> Result<(), ScopeError> {
        let (f, l) = (first.get(), last.get());
        let len = l - f + 1;
        let mut all_ok = true;
        for local in 0..len {
            if !filled.is_constructed(local) {
                all_ok = false;
            }
        }
        match self.find_range_idx(f) {
            Some(idx) => {
                let (range_first, range) = &mut self.ranges[idx];
                let range_first = *range_first;
                for local in 0..len {
                    if let Some(v) = filled.destroy(local) {
                        range.construct(f + local - range_first, v);
                        self.assigned.insert(f + local);
                        self.active.insert(f + local);
                    }
                }
            }
            None => {
                for local in 0..len {
                    if filled.is_constructed(local) {
                        self.assigned.insert(f + local);
                        self.active.insert(f + local);
                    }
                }
                filled.remapped = true;
                let pos = self.insertion_point(f);
                self.ranges.insert(pos, (f, filled));
            }
        }
        if all_ok {
            Ok(())
        } else {
            Err(ScopeError::UnassignedOutput { first, last })
        }
    }

    /// Append an externally-constructed range (produced by a parent
    /// scope's `map_output`/`map_input`) at this scope's `first_local`
    /// watermark, advancing it. If `mark_active` is set (the range is
    /// already fully constructed, as for an input) the appended span is
    /// immediately marked assigned and active.
    pub fn append_mapped(&mut self, range: Range<W>, mark_active: bool) -> (WireId, WireId) {
        let first = self.first_local;
        let len = range.len();
        let last = first + len - 1;
        self.ranges.push((first, range));
        self.first_local = last + 1;
        if mark_active {
            self.assigned.insert_range(first, last);
            self.active.insert_range(first, last);
        }
        (WireId(first), WireId(last))
    }

    /// Remove and return the single range exactly spanning
    /// `[first,last]`, e.g. to hand a callee's filled output range back
    /// to its caller. Errors if no single stored range matches exactly.
    pub fn take_range(&mut self, first: WireId, last: WireId) -> Result<Range<W>, ScopeError> {
        let (f, l) = (first.get(), last.get());
        let idx = self
            .find_range_idx(f)
            .filter(|&idx| {
                let (rf, r) = &self.ranges[idx];
                *rf == f && rf + r.len() - 1 == l
            })
            .ok_or(ScopeError::UnmatchedDelete { first, last })?;
        let (_, range) = self.ranges.remove(idx);
        Ok(range)
    }

    /// A direct slice view over the single range exactly spanning
    /// `[first,last]`, for a plugin operation to read.
    pub fn range_slice(&self, first: WireId, last: WireId) -> Option<&[Option<W>]> {
        let (f, l) = (first.get(), last.get());
        let idx = self.find_range_idx(f)?;
        let (rf, r) = &self.ranges[idx];
        if *rf == f && rf + r.len() - 1 == l {
            Some(r.as_slice())
        } else {
            None
        }
    }

    /// The mutable counterpart of [`Scope::range_slice`].
    pub fn range_slice_mut(&mut self, first: WireId, last: WireId) -> Option<&mut [Option<W>]> {
        let (f, l) = (first.get(), last.get());
        let idx = self.find_range_idx(f)?;
        let (rf, r) = &mut self.ranges[idx];
        if *rf == f && rf.wrapping_add(r.len()).wrapping_sub(1) == l {
            Some(r.as_mut_slice())
        } else {
            None
        }
    }

    /// `find_inputs`/`map_input` — validate `[first,last]` is a single
    /// active, already-assigned span and return a cloned [`Range`] for
    /// the callee to read. Input wires remain owned (and usable) by the
    /// caller afterward, hence the clone rather than a move.
    pub fn map_input(&self, first: WireId, last: WireId) -> Result<Range<W>, ScopeError>
    where
        W: Clone,
    {
        let (f, l) = (first.get(), last.get());
        if !self.active.has_all(f, l) {
            return Err(ScopeError::InvalidInputShape { first, last });
        }
        let mut range = Range::with_capacity(l - f + 1, false, false);
        range.remapped = true;
        for local in 0..(l - f + 1) {
            if let Some(v) = self.retrieve(WireId(f + local)).ok() {
                range.construct(local, v.clone());
            }
        }
        Ok(range)
    }
}

impl<W> Drop for Scope<W> {
    fn drop(&mut self) {
        // Destructors run naturally: dropping `ranges` drops every
        // `Option<W>` slot, remapped or otherwise. Remapped ranges in
        // this workspace own cloned or moved-in values (see
        // `map_input`/`map_output`), so there is nothing extra to do
        // here beyond what `Vec`'s own `Drop` already performs; this
        // impl exists to document that fact, matching the reference
        // implementation's explicit (and more delicate, pointer-based)
        // destructor walk over `active`.
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::number::Number;

    #[test]
    fn assign_allocates_growable_default_size() {
        let mut s: Scope<Number> = Scope::new();
        s.assign(WireId(10), Number::from(1u64)).unwrap();
        assert!(s.assigned().has(10));
        assert!(s.active().has(10));
        assert_eq!(*s.retrieve(WireId(10)).unwrap(), Number::from(1u64));
    }

    #[test]
    fn new_range_then_assign_within_it() {
        let mut s: Scope<Number> = Scope::new();
        s.new_range(WireId(0), WireId(3)).unwrap();
        s.assign(WireId(2), Number::from(7u64)).unwrap();
        assert_eq!(*s.retrieve(WireId(2)).unwrap(), Number::from(7u64));
        assert!(s.retrieve(WireId(0)).is_err());
    }

    #[test]
    fn new_range_partial_delete_rejected() {
        let mut s: Scope<Number> = Scope::new();
        s.new_range(WireId(0), WireId(3)).unwrap();
        assert!(matches!(
            s.delete_range(WireId(0), WireId(1)),
            Err(ScopeError::UnmatchedDelete { .. })
        ));
        assert!(s.delete_range(WireId(0), WireId(3)).is_ok());
    }

    #[test]
    fn growable_range_partial_delete_from_front() {
        let mut s: Scope<Number> = Scope::new();
        for i in 0..4 {
            s.assign(WireId(i), Number::from(i)).unwrap();
        }
        s.delete_range(WireId(0), WireId(1)).unwrap();
        assert!(s.retrieve(WireId(0)).is_err());
        assert_eq!(*s.retrieve(WireId(2)).unwrap(), Number::from(2u64));
    }

    #[test]
    fn reassigning_a_live_wire_is_rejected() {
        let mut s: Scope<Number> = Scope::new();
        s.assign(WireId(5), Number::from(1u64)).unwrap();
        assert!(matches!(
            s.assign(WireId(5), Number::from(2u64)),
            Err(ScopeError::AlreadyConstructed(_))
        ));
    }

    #[test]
    fn assign_after_full_delete_succeeds() {
        let mut s: Scope<Number> = Scope::new();
        s.new_range(WireId(0), WireId(3)).unwrap();
        s.assign(WireId(0), Number::from(1u64)).unwrap();
        s.assign(WireId(1), Number::from(2u64)).unwrap();
        s.delete_range(WireId(0), WireId(3)).unwrap();
        s.assign(WireId(0), Number::from(5u64)).unwrap();
        assert_eq!(*s.retrieve(WireId(0)).unwrap(), Number::from(5u64));
        assert!(s.retrieve(WireId(1)).is_err());
    }

    #[test]
    fn new_range_rejects_first_greater_than_last() {
        let mut s: Scope<Number> = Scope::new();
        assert!(matches!(
            s.new_range(WireId(5), WireId(2)),
            Err(ScopeError::InvalidRange { .. })
        ));
    }

    #[test]
    fn delete_range_rejects_first_greater_than_last() {
        let mut s: Scope<Number> = Scope::new();
        s.new_range(WireId(0), WireId(3)).unwrap();
        assert!(matches!(
            s.delete_range(WireId(3), WireId(0)),
            Err(ScopeError::InvalidRange { .. })
        ));
    }

    #[test]
    fn range_collision_rejected() {
        let mut s: Scope<Number> = Scope::new();
        s.new_range(WireId(0), WireId(3)).unwrap();
        assert!(matches!(
            s.new_range(WireId(2), WireId(5)),
            Err(ScopeError::RangeCollision { .. })
        ));
    }
}
