/*!
 * # lyricsync - cut the silence out of a video, keep the words in sync
 *
 * A Rust library that aligns a subtitle track with an audio timeline,
 * removes or compresses the spans without dialogue, and emits an LRC lyric
 * file synchronized with the transformed audio.
 *
 * ## Features
 *
 * - Parse SRT subtitles into timed entries
 * - Merge overlapping subtitle spans into dialogue intervals
 * - Three processing modes for the gaps between dialogue:
 *   - `remove`: drop them
 *   - `fade`: drop them and fade the dialogue edges
 *   - `speed`: keep them, played three times faster
 * - Exact remapping of subtitle timestamps into the new timeline
 * - Batch processing of whole directories with per-file isolation
 *
 * ## Architecture
 *
 * The library is organized in these main modules:
 * - `app_config`: Configuration management
 * - `subtitle_processor`: SRT parsing
 * - `timeline`: the pure transformation core:
 *   - `timeline::interval`: interval merging
 *   - `timeline::segment`: gap/dialogue segmentation
 *   - `timeline::transform`: per-mode strategies and reassembly
 *   - `timeline::remap`: timestamp remapping
 *   - `timeline::lyric`: LRC output
 * - `audio`: PCM buffers and the ffmpeg codec backend
 * - `file_utils`: File system operations
 * - `app_controller`: Per-file and per-folder orchestration
 * - `errors`: Custom error types for the application
 *
 * ## License
 *
 * This project is licensed under the MIT License
 */

// Global lints configuration
// These lints will be allowed but not auto-fixed
#![allow(clippy::uninlined_format_args)]
#![allow(clippy::redundant_closure_for_method_calls)]

// Public modules
pub mod app_config;
pub mod app_controller;
pub mod audio;
pub mod errors;
pub mod file_utils;
pub mod subtitle_processor;
pub mod timeline;

// Re-export main types for easier usage
pub use app_config::Config;
pub use app_controller::{BatchSummary, Controller, FileJob, FileOutcome, FileReport};
pub use audio::{AudioBuffer, AudioCodec, FfmpegCodec};
pub use errors::{AppError, AudioError, SubtitleError, TimelineError};
pub use subtitle_processor::{SubtitleCollection, SubtitleEntry};
pub use timeline::{LyricLine, LyricSheet, ProcessingMode, ProcessingOptions, ProcessingOutcome};
