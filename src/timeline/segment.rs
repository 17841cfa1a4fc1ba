/*!
 * Partitioning of the audio timeline into gap and dialogue segments.
 */

use super::interval::MergedInterval;

/// A contiguous slice of the original timeline.
///
/// `source_interval` is set exactly when `is_dialogue` is true and holds the
/// merged interval as it was before clipping to the audio length.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Segment {
    pub is_dialogue: bool,
    pub start_ms: u64,
    pub end_ms: u64,
    pub source_interval: Option<MergedInterval>,
}

impl Segment {
    pub fn gap(start_ms: u64, end_ms: u64) -> Self {
        Self {
            is_dialogue: false,
            start_ms,
            end_ms,
            source_interval: None,
        }
    }

    pub fn dialogue(start_ms: u64, end_ms: u64, source: MergedInterval) -> Self {
        Self {
            is_dialogue: true,
            start_ms,
            end_ms,
            source_interval: Some(source),
        }
    }

    pub fn duration_ms(&self) -> u64 {
        self.end_ms - self.start_ms
    }
}

/// Split `[0, total_duration_ms)` into alternating gap/dialogue segments.
///
/// The list always starts and ends with a gap (possibly zero-length) and
/// holds `2 * merged.len() + 1` segments. Intervals reaching past the end
/// of the audio are clipped to `total_duration_ms` here, before any
/// boundary is emitted.
pub fn segment_timeline(merged: &[MergedInterval], total_duration_ms: u64) -> Vec<Segment> {
    let mut segments = Vec::with_capacity(merged.len() * 2 + 1);
    let mut cursor = 0;

    for interval in merged {
        let start = interval.start_ms.min(total_duration_ms).max(cursor);
        let end = interval.end_ms.min(total_duration_ms).max(start);

        segments.push(Segment::gap(cursor, start));
        segments.push(Segment::dialogue(start, end, *interval));
        cursor = end;
    }

    segments.push(Segment::gap(cursor, total_duration_ms.max(cursor)));
    segments
}
