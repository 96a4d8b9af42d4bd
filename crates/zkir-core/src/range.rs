/// A contiguous block of wire slots backing one `@new`/`@for`-allocated
/// or remapped range, addressed by the scope's local wire numbering.
///
/// Each slot is `Option<W>`: `None` means "not yet constructed" or
/// "destroyed", mirroring the reference implementation's raw memory plus
/// manual placement-new/destructor discipline without needing unsafe
/// code here.
#[derive(Debug)]
pub struct Range<W> {
    slots: Vec<Option<W>>,
    /// True for a range created directly by `@new` (as opposed to one
    /// produced by `map_output`/`map_input` aliasing a caller's memory).
    /// `@new` ranges may only be deleted in full; remapped ranges never
    /// grow and are deleted by the callee unwinding, not by `@delete`.
    pub new_range: bool,
    /// True if this range is an alias into a parent scope's memory
    /// (produced by `map_output`/`map_input`/`plugin_output`/`plugin_input`).
    pub remapped: bool,
    /// True if this range may still be extended in place by a later
    /// `assign` past its current end (disabled permanently after any
    /// partial delete, matching the reference implementation).
    pub can_grow: bool,
}

impl<W> Range<W> {
    pub fn new_default_size(size: u64, new_range: bool) -> Self {
        let mut slots = Vec::with_capacity(size as usize);
        slots.resize_with(size as usize, || None);
        Range {
            slots,
            new_range,
            remapped: false,
            can_grow: !new_range,
        }
    }

    pub fn with_capacity(size: u64, new_range: bool, can_grow: bool) -> Self {
        let mut slots = Vec::with_capacity(size as usize);
        slots.resize_with(size as usize, || None);
        Range {
            slots,
            new_range,
            remapped: false,
            can_grow,
        }
    }

    pub fn len(&self) -> u64 {
        self.slots.len() as u64
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    pub fn get(&self, local_idx: u64) -> Option<&W> {
        self.slots.get(local_idx as usize).and_then(|s| s.as_ref())
    }

    pub fn get_mut(&mut self, local_idx: u64) -> Option<&mut W> {
        self.slots.get_mut(local_idx as usize).and_then(|s| s.as_mut())
    }

    pub fn is_constructed(&self, local_idx: u64) -> bool {
        self.slots
            .get(local_idx as usize)
            .map(|s| s.is_some())
            .unwrap_or(false)
    }

    pub fn construct(&mut self, local_idx: u64, value: W) {
        self.slots[local_idx as usize] = Some(value);
    }

    pub fn destroy(&mut self, local_idx: u64) -> Option<W> {
        self.slots.get_mut(local_idx as usize).and_then(|s| s.take())
    }

    /// Grow the backing storage to `new_len` slots, filling the new
    /// tail with `None`. Used by `Scope::assign`'s 1.5x growth policy.
    pub fn grow_to(&mut self, new_len: u64) {
        debug_assert!(new_len as usize >= self.slots.len());
        self.slots.resize_with(new_len as usize, || None);
    }

    /// Remove the first `n` slots (used when a partial `@delete` shrinks
    /// a growable range from its low end).
    pub fn shrink_front(&mut self, n: u64) {
        self.slots.drain(0..n as usize);
    }

    /// Remove the last `n` slots (partial `@delete` from the high end).
    pub fn shrink_back(&mut self, n: u64) {
        let new_len = self.slots.len() - n as usize;
        self.slots.truncate(new_len);
    }

    pub fn as_slice(&self) -> &[Option<W>] {
        &self.slots
    }

    pub fn as_mut_slice(&mut self) -> &mut [Option<W>] {
        &mut self.slots
    }
}
