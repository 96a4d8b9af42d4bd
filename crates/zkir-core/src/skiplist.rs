/// A sparse, ordered set of `u64` keys stored as merged ascending
/// inclusive intervals `(first, last)`.
///
/// This is the Rust-idiomatic counterpart of the reference
/// implementation's reverse-ordered intrusive linked list: a sorted
/// `Vec` gives the same O(log n) membership/insert/remove behavior via
/// binary search, without manual node splicing, and comes out in
/// ascending order for `for_range` directly.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SkipList {
    // Sorted, non-overlapping, non-adjacent (gap of at least 1 between
    // consecutive intervals) inclusive ranges.
    intervals: Vec<(u64, u64)>,
}

impl SkipList {
    pub fn new() -> Self {
        SkipList {
            intervals: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Index of the first interval whose `last >= key`, i.e. the only
    /// interval that could contain `key`.
    fn locate(&self, key: u64) -> Result<usize, usize> {
        self.intervals.binary_search_by(|&(first, last)| {
            if last < key {
                std::cmp::Ordering::Less
            } else if first > key {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        })
    }

    pub fn has(&self, key: u64) -> bool {
        self.locate(key).is_ok()
    }

    /// True if `[first, last]` overlaps any stored interval.
    pub fn has_range(&self, first: u64, last: u64) -> bool {
        debug_assert!(first <= last);
        match self.intervals.binary_search_by(|&(f, l)| {
            if l < first {
                std::cmp::Ordering::Less
            } else if f > last {
                std::cmp::Ordering::Greater
            } else {
                std::cmp::Ordering::Equal
            }
        }) {
            Ok(_) => true,
            Err(_) => false,
        }
    }

    /// True if every key in `[first, last]` is present.
    pub fn has_all(&self, first: u64, last: u64) -> bool {
        debug_assert!(first <= last);
        match self.locate(first) {
            Ok(idx) => self.intervals[idx].1 >= last,
            Err(_) => false,
        }
    }

    /// Insert `key`. Returns `false` without modifying the set if `key`
    /// is already present (spec.md §4.A "insert(n) ... returns false if
    /// any element already present").
    pub fn insert(&mut self, key: u64) -> bool {
        self.insert_range(key, key)
    }

    /// Insert `[first, last]`, merging with any overlapping or adjacent
    /// existing intervals. Returns `false` without modifying the set if
    /// any key in `[first, last]` is already present.
    pub fn insert_range(&mut self, first: u64, last: u64) -> bool {
        debug_assert!(first <= last);
        if self.has_range(first, last) {
            return false;
        }
        let mut new_first = first;
        let mut new_last = last;
        let mut remove_start = self.intervals.len();
        let mut remove_end = 0;
        for (i, &(f, l)) in self.intervals.iter().enumerate() {
            let touches = f <= new_last.saturating_add(1) && new_first <= l.saturating_add(1);
            if touches {
                remove_start = remove_start.min(i);
                remove_end = i + 1;
                new_first = new_first.min(f);
                new_last = new_last.max(l);
            } else if f > new_last + 1 {
                break;
            }
        }
        if remove_end == 0 {
            let pos = self.intervals.partition_point(|&(f, _)| f < new_first);
            self.intervals.insert(pos, (new_first, new_last));
        } else {
            self.intervals
                .splice(remove_start..remove_end, [(new_first, new_last)]);
        }
        true
    }

    /// Remove `key`. Returns `false` without modifying the set if `key`
    /// is not present (spec.md §4.A "remove(n) ... returns false if any
    /// element already absent").
    pub fn remove(&mut self, key: u64) -> bool {
        self.remove_range(key, key)
    }

    /// Remove every key in `[first, last]`, splitting intervals as
    /// needed. Returns `false` without modifying the set if any key in
    /// `[first, last]` is absent.
    pub fn remove_range(&mut self, first: u64, last: u64) -> bool {
        debug_assert!(first <= last);
        if !self.has_all(first, last) {
            return false;
        }
        let mut result = Vec::with_capacity(self.intervals.len() + 1);
        for &(f, l) in &self.intervals {
            if l < first || f > last {
                result.push((f, l));
                continue;
            }
            if f < first {
                result.push((f, first - 1));
            }
            if l > last {
                result.push((last + 1, l));
            }
        }
        self.intervals = result;
        true
    }

    /// Visit every contiguous present sub-interval that overlaps
    /// `[first, last]`, clipped to that window, in ascending order.
    pub fn for_range(&self, first: u64, last: u64, mut f: impl FnMut(u64, u64)) {
        debug_assert!(first <= last);
        for &(a, b) in &self.intervals {
            if b < first {
                continue;
            }
            if a > last {
                break;
            }
            f(a.max(first), b.min(last));
        }
    }

    /// Visit every present key in ascending order (used by tests and
    /// debug rendering; production code should prefer `for_range`).
    pub fn iter(&self) -> impl Iterator<Item = u64> + '_ {
        self.intervals.iter().flat_map(|&(f, l)| f..=l)
    }

    pub fn intervals(&self) -> &[(u64, u64)] {
        &self.intervals
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_merges_adjacent() {
        let mut s = SkipList::new();
        s.insert_range(0, 3);
        s.insert_range(4, 7);
        assert_eq!(s.intervals(), &[(0, 7)]);
    }

    #[test]
    fn insert_merges_overlap_and_gap() {
        let mut s = SkipList::new();
        s.insert_range(10, 20);
        s.insert_range(0, 5);
        s.insert_range(6, 9);
        assert_eq!(s.intervals(), &[(0, 20)]);
    }

    #[test]
    fn insert_returns_false_on_overlap() {
        let mut s = SkipList::new();
        assert!(s.insert_range(0, 5));
        assert!(!s.insert_range(5, 8));
        assert_eq!(s.intervals(), &[(0, 5)]);
        assert!(s.insert_range(6, 8));
    }

    #[test]
    fn remove_returns_false_when_not_fully_present() {
        let mut s = SkipList::new();
        s.insert_range(0, 5);
        assert!(!s.remove_range(4, 8));
        assert_eq!(s.intervals(), &[(0, 5)]);
        assert!(s.remove_range(4, 5));
        assert_eq!(s.intervals(), &[(0, 3)]);
    }

    #[test]
    fn has_all_requires_full_containment() {
        let mut s = SkipList::new();
        s.insert_range(0, 10);
        s.remove_range(5, 5);
        assert!(s.has_all(0, 4));
        assert!(!s.has_all(0, 10));
        assert!(s.has_all(6, 10));
    }

    #[test]
    fn remove_splits_interval() {
        let mut s = SkipList::new();
        s.insert_range(0, 10);
        s.remove_range(4, 6);
        assert_eq!(s.intervals(), &[(0, 3), (7, 10)]);
    }

    #[test]
    fn for_range_clips_to_window() {
        let mut s = SkipList::new();
        s.insert_range(0, 2);
        s.insert_range(5, 9);
        let mut seen = Vec::new();
        s.for_range(1, 6, |a, b| seen.push((a, b)));
        assert_eq!(seen, vec![(1, 2), (5, 6)]);
    }

    #[test]
    fn has_range_overlap_only() {
        let mut s = SkipList::new();
        s.insert_range(10, 20);
        assert!(s.has_range(5, 10));
        assert!(s.has_range(20, 30));
        assert!(!s.has_range(21, 30));
        assert!(!s.has_range(0, 9));
    }
}
