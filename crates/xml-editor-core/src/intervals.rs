//! Style intervals.
//!
//! Highlighters attach [`StyleId`]s to character ranges; renderers query the
//! ranges overlapping the viewport. Layers keep independently-sourced styles
//! (syntax classes, error underlines) separable, so one producer can replace
//! its output without clobbering another's.

/// Style ID type. Producers define their own id spaces; see the highlight
/// crate for the XML token style ids.
pub type StyleId = u32;

/// Identifies which producer a set of intervals came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StyleLayerId(pub u32);

impl StyleLayerId {
    /// Create a style layer id from a raw numeric identifier.
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Token-class syntax highlighting.
    pub const SYNTAX: Self = Self(1);

    /// Lexical error underlines.
    pub const ERRORS: Self = Self(2);
}

/// A styled character range, end exclusive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Interval {
    /// Start offset in characters.
    pub start: usize,
    /// End offset (exclusive) in characters.
    pub end: usize,
    /// Style attached to the range.
    pub style_id: StyleId,
}

impl Interval {
    /// Create a new interval with `[start, end)` offsets and a style id.
    pub fn new(start: usize, end: usize, style_id: StyleId) -> Self {
        Self {
            start,
            end,
            style_id,
        }
    }

    /// Whether the interval contains `pos`.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos < self.end
    }

    /// Whether two intervals overlap.
    pub fn overlaps(&self, other: &Interval) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Interval set kept sorted by start offset.
///
/// Scanner-produced intervals never nest and arrive in document order, so a
/// sorted vector with binary search beats a real tree here: queries are
/// O(log n + k) and bulk replacement is a plain re-sort.
#[derive(Default)]
pub struct IntervalTree {
    intervals: Vec<Interval>,
}

impl IntervalTree {
    /// Create an empty interval tree.
    pub fn new() -> Self {
        Self {
            intervals: Vec::new(),
        }
    }

    /// Insert an interval, keeping start order.
    pub fn insert(&mut self, interval: Interval) {
        let pos = self
            .intervals
            .binary_search_by_key(&interval.start, |i| i.start)
            .unwrap_or_else(|pos| pos);
        self.intervals.insert(pos, interval);
    }

    /// Replace the whole interval set at once. Sorts the input by start.
    pub fn replace_all(&mut self, mut intervals: Vec<Interval>) {
        intervals.sort_by_key(|i| i.start);
        self.intervals = intervals;
    }

    /// Remove the interval that exactly matches the arguments.
    pub fn remove(&mut self, start: usize, end: usize, style_id: StyleId) -> bool {
        if let Some(pos) = self
            .intervals
            .iter()
            .position(|i| i.start == start && i.end == end && i.style_id == style_id)
        {
            self.intervals.remove(pos);
            true
        } else {
            false
        }
    }

    /// All intervals containing `pos`, in start order.
    pub fn query_point(&self, pos: usize) -> Vec<&Interval> {
        self.query_range(pos, pos + 1)
    }

    /// All intervals overlapping `[start, end)`, in start order.
    pub fn query_range(&self, start: usize, end: usize) -> Vec<&Interval> {
        if self.intervals.is_empty() || start >= end {
            return Vec::new();
        }
        // First interval starting at or past `end` cannot overlap, nor can
        // anything after it.
        let stop = self
            .intervals
            .binary_search_by_key(&end, |i| i.start)
            .unwrap_or_else(|idx| idx);
        self.intervals[..stop]
            .iter()
            .filter(|i| i.end > start)
            .collect()
    }

    /// Clear all intervals.
    pub fn clear(&mut self) {
        self.intervals.clear();
    }

    /// Number of intervals.
    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    /// Whether the set is empty.
    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }

    /// Shift intervals for an insertion of `delta` characters at `pos`.
    /// An interval spanning the insertion point stretches over it.
    pub fn update_for_insertion(&mut self, pos: usize, delta: usize) {
        for interval in &mut self.intervals {
            if interval.start >= pos {
                interval.start += delta;
                interval.end += delta;
            } else if interval.end > pos {
                interval.end += delta;
            }
        }
    }

    /// Shift intervals for a deletion of `[start, end)`. Intervals fully
    /// inside the deleted range disappear; partial overlaps are clipped.
    pub fn update_for_deletion(&mut self, start: usize, end: usize) {
        let delta = end - start;
        self.intervals.retain_mut(|interval| {
            if interval.end <= start {
                return true;
            }
            if interval.start >= end {
                interval.start -= delta;
                interval.end -= delta;
                return true;
            }
            if interval.start >= start && interval.end <= end {
                return false;
            }
            if interval.start < start && interval.end > end {
                interval.end -= delta;
            } else if interval.start < start {
                interval.end = start;
            } else {
                interval.start = start;
                interval.end -= delta;
            }
            true
        });
    }
}
