/*!
 * Timeline transformation core.
 *
 * Subtitle entries are turned into dialogue intervals, the audio timeline is
 * cut into gap/dialogue segments, gaps are transformed according to the
 * processing mode, and subtitle timestamps are mapped into the new timeline:
 *
 * - `interval`: interval merging
 * - `segment`: timeline segmentation
 * - `transform`: per-mode strategies and output reassembly
 * - `remap`: timestamp remapping
 * - `lyric`: LRC formatting
 * - `pipeline`: the whole chain for one file
 */

// Re-export main types for easier usage
pub use self::interval::{merge_intervals, Interval, MergedInterval};
pub use self::lyric::{format_lrc_timestamp, LyricLine, LyricSheet};
pub use self::pipeline::{process, ProcessingOptions, ProcessingOutcome, SegmentStats};
pub use self::remap::{remap_entries, RemapOutcome};
pub use self::segment::{segment_timeline, Segment};
pub use self::transform::{
    transform_segments, FadeStrategy, OutputBuilder, ProcessingMode, RemoveStrategy, RetainedMapping,
    SegmentStrategy, SpeedStrategy, TransformOutput,
};

// Submodules
pub mod interval;
pub mod lyric;
pub mod pipeline;
pub mod remap;
pub mod segment;
pub mod transform;
