/*!
 * Dialogue intervals and their merging.
 *
 * Every subtitle entry contributes one half-open interval `[start, end)`.
 * Merging coalesces overlapping and touching intervals so that the result
 * is sorted with a strictly positive gap between neighbours.
 */

use crate::subtitle_processor::SubtitleEntry;

/// Half-open time range in milliseconds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Interval {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl Interval {
    pub fn new(start_ms: u64, end_ms: u64) -> Self {
        debug_assert!(start_ms <= end_ms, "interval ends before it starts");
        Self { start_ms, end_ms }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

impl From<&SubtitleEntry> for Interval {
    fn from(entry: &SubtitleEntry) -> Self {
        Interval::new(entry.start_ms, entry.end_ms)
    }
}

/// One dialogue interval after merging.
///
/// A merged set is sorted, and `merged[i].end_ms < merged[i + 1].start_ms`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MergedInterval {
    pub start_ms: u64,
    pub end_ms: u64,
}

impl MergedInterval {
    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

impl From<MergedInterval> for Interval {
    fn from(merged: MergedInterval) -> Self {
        Interval::new(merged.start_ms, merged.end_ms)
    }
}

/// Derive one interval per entry
pub fn intervals_from_entries(entries: &[SubtitleEntry]) -> Vec<Interval> {
    entries.iter().map(Interval::from).collect()
}

/// Sort and coalesce intervals.
///
/// An interval is folded into the running one when it starts at or before
/// the running end, so touching intervals merge and no zero-length gap is
/// left between adjacent subtitle lines.
pub fn merge_intervals(mut intervals: Vec<Interval>) -> Vec<MergedInterval> {
    intervals.sort_by_key(|interval| interval.start_ms);

    let mut merged: Vec<MergedInterval> = Vec::with_capacity(intervals.len());
    for current in intervals {
        match merged.last_mut() {
            Some(last) if current.start_ms <= last.end_ms => {
                last.end_ms = last.end_ms.max(current.end_ms);
            }
            _ => merged.push(MergedInterval {
                start_ms: current.start_ms,
                end_ms: current.end_ms,
            }),
        }
    }

    merged
}
