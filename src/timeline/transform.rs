/*!
 * Per-mode transformation of segments and reassembly of the output timeline.
 *
 * Each mode is one `SegmentStrategy`. `transform_segments` walks the segment
 * list in order, asks the strategy for a chunk per segment, and hands the
 * chunks to an `OutputBuilder` which owns the output cursor and records a
 * `RetainedMapping` for every dialogue segment.
 */

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::audio::AudioBuffer;
use crate::errors::{AudioError, TimelineError};

use super::interval::MergedInterval;
use super::segment::Segment;

/// Processing mode selected by the user
#[derive(Debug, Serialize, Deserialize, Clone, Copy, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum ProcessingMode {
    /// Drop gaps entirely
    #[default]
    Remove,
    /// Drop gaps, fade the edges of dialogue
    Fade,
    /// Keep gaps, time-compressed
    Speed,
}

impl ProcessingMode {
    // @returns: Lowercase mode identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Remove => "remove",
            Self::Fade => "fade",
            Self::Speed => "speed",
        }
    }

    /// Build the strategy implementing this mode
    pub fn strategy(&self, fade_duration_ms: u64, speed_factor: f64) -> Result<Box<dyn SegmentStrategy>, TimelineError> {
        Ok(match self {
            Self::Remove => Box::new(RemoveStrategy),
            Self::Fade => Box::new(FadeStrategy::new(fade_duration_ms)),
            Self::Speed => Box::new(SpeedStrategy::new(speed_factor)?),
        })
    }
}

impl fmt::Display for ProcessingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for ProcessingMode {
    type Err = TimelineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "remove" => Ok(Self::Remove),
            "fade" => Ok(Self::Fade),
            "speed" => Ok(Self::Speed),
            _ => Err(TimelineError::UnknownMode(s.to_string())),
        }
    }
}

/// Where a dialogue interval landed in the reassembled output
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetainedMapping {
    pub original_start_ms: u64,
    pub original_end_ms: u64,
    pub processed_start_ms: u64,
    pub processed_end_ms: u64,
}

/// Transformation applied to one kind of segment
///
/// Gap chunks are optional (a mode may drop them); dialogue is always kept
/// and must keep its duration.
pub trait SegmentStrategy: Send + Sync + fmt::Debug {
    /// Output chunk for a gap segment, or `None` to drop it
    fn transform_gap(&self, audio: &AudioBuffer, segment: &Segment) -> Option<AudioBuffer>;

    /// Output chunk for a dialogue segment
    fn transform_dialogue(&self, audio: &AudioBuffer, segment: &Segment) -> AudioBuffer;
}

/// Drops gaps, passes dialogue through unchanged
#[derive(Debug, Clone, Copy, Default)]
pub struct RemoveStrategy;

impl SegmentStrategy for RemoveStrategy {
    fn transform_gap(&self, _audio: &AudioBuffer, _segment: &Segment) -> Option<AudioBuffer> {
        None
    }

    fn transform_dialogue(&self, audio: &AudioBuffer, segment: &Segment) -> AudioBuffer {
        audio.slice_ms(segment.start_ms, segment.end_ms)
    }
}

/// Drops gaps and fades each dialogue segment in and out.
///
/// Gaps are not kept with a fade: only the cut edges of the dialogue are
/// softened.
#[derive(Debug, Clone, Copy)]
pub struct FadeStrategy {
    pub fade_duration_ms: u64,
}

impl FadeStrategy {
    pub fn new(fade_duration_ms: u64) -> Self {
        Self { fade_duration_ms }
    }
}

impl SegmentStrategy for FadeStrategy {
    fn transform_gap(&self, _audio: &AudioBuffer, _segment: &Segment) -> Option<AudioBuffer> {
        None
    }

    fn transform_dialogue(&self, audio: &AudioBuffer, segment: &Segment) -> AudioBuffer {
        audio
            .slice_ms(segment.start_ms, segment.end_ms)
            .fade_in(self.fade_duration_ms)
            .fade_out(self.fade_duration_ms)
    }
}

/// Keeps gaps but plays them `factor` times faster (pitch rises)
#[derive(Debug, Clone, Copy)]
pub struct SpeedStrategy {
    factor: f64,
}

impl SpeedStrategy {
    pub fn new(factor: f64) -> Result<Self, TimelineError> {
        if !factor.is_finite() || factor <= 0.0 {
            return Err(TimelineError::InvalidSpeedFactor(factor));
        }
        Ok(Self { factor })
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }
}

impl SegmentStrategy for SpeedStrategy {
    fn transform_gap(&self, audio: &AudioBuffer, segment: &Segment) -> Option<AudioBuffer> {
        Some(audio.slice_ms(segment.start_ms, segment.end_ms).change_speed(self.factor))
    }

    fn transform_dialogue(&self, audio: &AudioBuffer, segment: &Segment) -> AudioBuffer {
        audio.slice_ms(segment.start_ms, segment.end_ms)
    }
}

/// Ordered accumulator for output chunks and the running output cursor.
///
/// The cursor counts frames actually appended; millisecond values are
/// derived from it, so mappings never drift from the concatenated audio.
#[derive(Debug)]
pub struct OutputBuilder {
    sample_rate: u32,
    channels: u16,
    chunks: Vec<AudioBuffer>,
    cursor_frames: u64,
    mappings: Vec<RetainedMapping>,
}

impl OutputBuilder {
    pub fn new(sample_rate: u32, channels: u16) -> Self {
        Self {
            sample_rate,
            channels,
            chunks: Vec::new(),
            cursor_frames: 0,
            mappings: Vec::new(),
        }
    }

    fn frames_to_ms(&self, frames: u64) -> u64 {
        if self.sample_rate == 0 {
            return 0;
        }
        frames * 1000 / self.sample_rate as u64
    }

    /// Current end of the output timeline
    pub fn cursor_ms(&self) -> u64 {
        self.frames_to_ms(self.cursor_frames)
    }

    /// Append a dialogue chunk and record where its source interval landed
    pub fn push_dialogue(&mut self, segment: &Segment, chunk: AudioBuffer) {
        let processed_start_ms = self.cursor_ms();
        self.cursor_frames += chunk.frames() as u64;

        // Segment came from the segmenter, so the source is always present
        let source = segment.source_interval.unwrap_or(MergedInterval {
            start_ms: segment.start_ms,
            end_ms: segment.end_ms,
        });
        self.mappings.push(RetainedMapping {
            original_start_ms: source.start_ms,
            original_end_ms: source.end_ms,
            processed_start_ms,
            processed_end_ms: self.cursor_ms(),
        });
        self.chunks.push(chunk);
    }

    /// Append a transformed gap chunk; gaps emit no mapping
    pub fn push_gap(&mut self, chunk: AudioBuffer) {
        self.cursor_frames += chunk.frames() as u64;
        self.chunks.push(chunk);
    }

    /// Concatenate the chunks into the output buffer
    pub fn finish(self) -> Result<TransformOutput, AudioError> {
        let duration_ms = self.cursor_ms();
        let audio = AudioBuffer::concat(self.sample_rate, self.channels, self.chunks)?;
        Ok(TransformOutput {
            audio,
            mappings: self.mappings,
            duration_ms,
        })
    }
}

/// Result of the transform stage
#[derive(Debug, Clone)]
pub struct TransformOutput {
    /// Reassembled audio
    pub audio: AudioBuffer,
    /// One mapping per dialogue segment, ordered by output position
    pub mappings: Vec<RetainedMapping>,
    /// Output cursor after the last segment
    pub duration_ms: u64,
}

/// Apply `strategy` to every segment in order and reassemble the output
pub fn transform_segments(
    audio: &AudioBuffer,
    segments: &[Segment],
    strategy: &dyn SegmentStrategy,
) -> Result<TransformOutput, AudioError> {
    let mut builder = OutputBuilder::new(audio.sample_rate(), audio.channels());

    for segment in segments {
        if segment.is_dialogue {
            let chunk = strategy.transform_dialogue(audio, segment);
            builder.push_dialogue(segment, chunk);
        } else if let Some(chunk) = strategy.transform_gap(audio, segment) {
            builder.push_gap(chunk);
        }
    }

    builder.finish()
}
