/*!
 * Translation of original subtitle timestamps into the output timeline.
 */

use crate::subtitle_processor::SubtitleEntry;

use super::lyric::LyricLine;
use super::transform::RetainedMapping;

/// Entries that could be placed, and the ones that could not
#[derive(Debug, Clone, Default)]
pub struct RemapOutcome {
    /// Placed entries in input order (not yet sorted)
    pub placed: Vec<LyricLine>,
    /// Entries not fully contained in any retained dialogue interval
    pub dropped: Vec<SubtitleEntry>,
}

/// Join multi-line subtitle text into one trimmed line
pub fn flatten_text(text: &str) -> String {
    text.lines().collect::<Vec<_>>().join(" ").trim().to_string()
}

/// First mapping whose original span fully contains the entry
pub fn find_mapping<'a>(entry: &SubtitleEntry, mappings: &'a [RetainedMapping]) -> Option<&'a RetainedMapping> {
    mappings
        .iter()
        .find(|m| m.original_start_ms <= entry.start_ms && entry.end_ms <= m.original_end_ms)
}

/// Output timestamp for an entry inside `mapping`.
///
/// The offset from the interval start is preserved as is. For an interval
/// clipped at the end of the audio this can point past the output end.
pub fn remap_timestamp(entry: &SubtitleEntry, mapping: &RetainedMapping) -> u64 {
    let offset = entry.start_ms - mapping.original_start_ms;
    mapping.processed_start_ms + offset
}

/// Place every entry that sits entirely inside one retained interval.
///
/// Entries straddling two intervals cannot be placed; they are returned in
/// `dropped` rather than raising an error.
pub fn remap_entries(entries: &[SubtitleEntry], mappings: &[RetainedMapping]) -> RemapOutcome {
    let mut outcome = RemapOutcome::default();

    for entry in entries {
        match find_mapping(entry, mappings) {
            Some(mapping) => outcome.placed.push(LyricLine {
                timestamp_ms: remap_timestamp(entry, mapping),
                text: flatten_text(&entry.text),
            }),
            None => outcome.dropped.push(entry.clone()),
        }
    }

    outcome
}
