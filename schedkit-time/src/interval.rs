use range_set_blaze::RangeSetBlaze;
use serde::{Deserialize, Serialize};

/// UTC instant in epoch milliseconds.
pub type EpochMs = i64;

/// Sorted disjoint set of millisecond instants, the normalised form behind the
/// interval algebra. A half-open interval `[start, end)` is stored as the
/// inclusive integer range `start..=end-1`.
pub type TimeSet = RangeSetBlaze<i64>;

/// A half-open time interval `[start, end)`. Empty when `start >= end`;
/// every operation in this module drops empty intervals.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Interval {
    pub start: EpochMs,
    pub end: EpochMs,
}

impl Interval {
    pub fn new(start: EpochMs, end: EpochMs) -> Interval {
        Interval { start, end }
    }

    pub fn is_empty(&self) -> bool {
        self.start >= self.end
    }

    pub fn duration_ms(&self) -> i64 {
        (self.end - self.start).max(0)
    }

    pub fn contains(&self, instant: EpochMs) -> bool {
        self.start <= instant && instant < self.end
    }

    /// True when `other` is non-empty and lies entirely inside `self`.
    pub fn contains_interval(&self, other: &Interval) -> bool {
        !other.is_empty() && self.start <= other.start && other.end <= self.end
    }

    /// Intersection with `bounds`, or None when nothing remains.
    pub fn clip(&self, bounds: &Interval) -> Option<Interval> {
        let clipped = Interval::new(self.start.max(bounds.start), self.end.min(bounds.end));
        if clipped.is_empty() { None } else { Some(clipped) }
    }
}

pub fn to_time_set(intervals: &[Interval]) -> TimeSet {
    intervals
        .iter()
        .filter(|iv| !iv.is_empty())
        .map(|iv| iv.start..=iv.end - 1)
        .collect()
}

pub fn from_time_set(set: &TimeSet) -> Vec<Interval> {
    set.ranges()
        .map(|r| Interval::new(*r.start(), *r.end() + 1))
        .collect()
}

/// Union of `intervals`: sorted ascending by start, pairwise disjoint, with
/// touching endpoints coalesced (`[a,b)` and `[b,c)` become `[a,c)`).
pub fn merge_intervals(intervals: &[Interval]) -> Vec<Interval> {
    from_time_set(&to_time_set(intervals))
}

/// Difference `from \ sub`. Never widens an input interval and keeps order;
/// a shared endpoint alone removes nothing under the half-open rule.
pub fn subtract_intervals(from: &[Interval], sub: &[Interval]) -> Vec<Interval> {
    let from = to_time_set(from);
    let sub = to_time_set(sub);
    from_time_set(&(&from - &sub))
}

/// Intersection of the two sets. Commutative.
pub fn intersect_intervals(a: &[Interval], b: &[Interval]) -> Vec<Interval> {
    let a = to_time_set(a);
    let b = to_time_set(b);
    from_time_set(&(&a & &b))
}
