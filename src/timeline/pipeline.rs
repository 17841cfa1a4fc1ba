/*!
 * Single-file processing: subtitles + decoded audio in, transformed audio +
 * lyric sheet out. Pure and synchronous; file and codec access stay with the
 * caller.
 */

use anyhow::{Context, Result};
use log::debug;

use crate::audio::AudioBuffer;
use crate::subtitle_processor::SubtitleEntry;

use super::interval::{intervals_from_entries, merge_intervals};
use super::lyric::LyricSheet;
use super::remap::remap_entries;
use super::segment::{segment_timeline, Segment};
use super::transform::{transform_segments, ProcessingMode, RetainedMapping};

/// Parameters of one processing run
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessingOptions {
    pub mode: ProcessingMode,
    pub fade_duration_ms: u64,
    pub speed_factor: f64,
}

impl Default for ProcessingOptions {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::Remove,
            fade_duration_ms: 200,
            speed_factor: 3.0,
        }
    }
}

/// Counts describing the segmentation of the input timeline
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SegmentStats {
    pub dialogue_segments: usize,
    pub gap_segments: usize,
    pub dialogue_ms: u64,
    pub gap_ms: u64,
}

impl SegmentStats {
    pub fn from_segments(segments: &[Segment]) -> Self {
        segments.iter().fold(Self::default(), |mut stats, segment| {
            if segment.is_dialogue {
                stats.dialogue_segments += 1;
                stats.dialogue_ms += segment.duration_ms();
            } else {
                stats.gap_segments += 1;
                stats.gap_ms += segment.duration_ms();
            }
            stats
        })
    }
}

/// Everything produced for one file
#[derive(Debug, Clone)]
pub struct ProcessingOutcome {
    /// Reassembled audio
    pub audio: AudioBuffer,
    /// Output timeline length
    pub duration_ms: u64,
    /// Sorted lyric lines in output time
    pub lyrics: LyricSheet,
    /// Where each dialogue interval landed
    pub mappings: Vec<RetainedMapping>,
    /// Entries that could not be placed
    pub dropped: Vec<SubtitleEntry>,
    /// Input segmentation
    pub stats: SegmentStats,
}

/// Run merge, segmentation, transformation and remapping for one file
pub fn process(entries: &[SubtitleEntry], audio: &AudioBuffer, options: &ProcessingOptions) -> Result<ProcessingOutcome> {
    let strategy = options
        .mode
        .strategy(options.fade_duration_ms, options.speed_factor)
        .context("Invalid processing options")?;

    let merged = merge_intervals(intervals_from_entries(entries));
    let total_duration_ms = audio.duration_ms();
    let segments = segment_timeline(&merged, total_duration_ms);
    let stats = SegmentStats::from_segments(&segments);

    debug!(
        "{} entries -> {} dialogue intervals over {} ms ({} ms dialogue, {} ms gaps)",
        entries.len(),
        merged.len(),
        total_duration_ms,
        stats.dialogue_ms,
        stats.gap_ms
    );

    let transformed = transform_segments(audio, &segments, strategy.as_ref())
        .context("Failed to reassemble audio")?;
    let remapped = remap_entries(entries, &transformed.mappings);

    debug!(
        "Mode {}: output {} ms, {} lyric lines, {} dropped",
        options.mode,
        transformed.duration_ms,
        remapped.placed.len(),
        remapped.dropped.len()
    );

    Ok(ProcessingOutcome {
        audio: transformed.audio,
        duration_ms: transformed.duration_ms,
        lyrics: LyricSheet::from_lines(remapped.placed),
        mappings: transformed.mappings,
        dropped: remapped.dropped,
        stats,
    })
}
