use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::time_range::{second_after, second_before, TimeRange};

/// The set of time intervals confirmed as fully fetched for one series.
///
/// Internally a sorted list of disjoint ranges; inserting a range that
/// overlaps or sits one second from an existing range merges them, so two
/// entries always have a real gap between them. Coverage records what the
/// provider was asked for, not what it returned: points inside a covered
/// range may legitimately be sparse.
///
/// Deserialization rebuilds the set through [`Coverage::insert`], so a
/// hand-edited file with overlapping entries normalizes itself on load.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<TimeRange>", into = "Vec<TimeRange>")]
pub struct Coverage {
    ranges: Vec<TimeRange>,
}

impl Coverage {
    /// Empty coverage: everything is a gap.
    pub fn new() -> Self {
        Self::default()
    }

    /// The disjoint covered ranges, ascending.
    pub fn ranges(&self) -> &[TimeRange] {
        &self.ranges
    }

    /// Number of disjoint covered ranges.
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// True when nothing is covered.
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    /// Mark `range` as covered, merging with overlapping or adjacent entries.
    ///
    /// Inserting an already-covered range is a no-op in effect; insertion
    /// order never changes the resulting set.
    pub fn insert(&mut self, range: TimeRange) {
        let mut merged = range;
        let mut result = Vec::with_capacity(self.ranges.len() + 1);
        let mut placed = false;

        for existing in self.ranges.drain(..) {
            if existing.touches(&merged) {
                merged = merged.merge(&existing);
            } else if existing.end() < merged.start() {
                // entirely before the merged block, gap included
                result.push(existing);
            } else {
                // entirely after; later entries cannot touch either
                if !placed {
                    result.push(merged);
                    placed = true;
                }
                result.push(existing);
            }
        }
        if !placed {
            result.push(merged);
        }
        self.ranges = result;
    }

    /// Is `range` covered end to end?
    ///
    /// Because adjacent entries are merged, full containment by the set
    /// implies containment by a single entry.
    pub fn contains(&self, range: &TimeRange) -> bool {
        self.ranges.iter().any(|r| r.contains_range(range))
    }

    /// Is `time` inside any covered range?
    pub fn contains_time(&self, time: DateTime<Utc>) -> bool {
        self.ranges.iter().any(|r| r.contains(time))
    }

    /// Maximal uncovered sub-ranges of `range`, ascending and disjoint.
    ///
    /// Returns the whole of `range` when nothing is covered and an empty
    /// vector when `range` is fully covered.
    pub fn missing_within(&self, range: &TimeRange) -> Vec<TimeRange> {
        let mut holes = Vec::new();
        let mut cursor = range.start();

        for covered in &self.ranges {
            if covered.end() < cursor {
                continue;
            }
            if covered.start() > range.end() {
                break;
            }
            if covered.start() > cursor {
                let hole_end = second_before(covered.start()).min(range.end());
                holes.push(TimeRange::from_parts(cursor, hole_end));
            }
            cursor = second_after(covered.end());
            if cursor > range.end() {
                return holes;
            }
        }

        if cursor <= range.end() {
            holes.push(TimeRange::from_parts(cursor, range.end()));
        }
        holes
    }

    /// Forget everything.
    pub fn clear(&mut self) {
        self.ranges.clear();
    }
}

impl From<Vec<TimeRange>> for Coverage {
    fn from(ranges: Vec<TimeRange>) -> Self {
        let mut coverage = Coverage::new();
        for range in ranges {
            coverage.insert(range);
        }
        coverage
    }
}

impl From<Coverage> for Vec<TimeRange> {
    fn from(coverage: Coverage) -> Self {
        coverage.ranges
    }
}
