use anyhow::{anyhow, Context, Result};
use futures::stream::{self, StreamExt};
use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, error, info, warn};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::app_config::Config;
use crate::audio::{AudioCodec, FfmpegCodec};
use crate::file_utils::{FileManager, FileType};
use crate::subtitle_processor::{SubtitleCollection, SubtitleEntry};
use crate::timeline;

// @module: Application controller driving per-file processing

// @const: Summary log written into the output directory by folder runs
const BATCH_LOG_FILE: &str = "lyricsync.log";

/// Inputs and outputs of one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileJob {
    /// Audio or video container to read
    pub media_path: PathBuf,
    /// SRT file aligned with the media
    pub subtitle_path: PathBuf,
    /// Encoded audio to write; the lyric file sits next to it
    pub audio_output: PathBuf,
}

impl FileJob {
    pub fn new(media_path: PathBuf, subtitle_path: PathBuf, audio_output: PathBuf) -> Self {
        Self {
            media_path,
            subtitle_path,
            audio_output,
        }
    }

    pub fn lyric_output(&self) -> PathBuf {
        FileManager::lyric_path_for(&self.audio_output)
    }
}

/// What happened to a single file
#[derive(Debug, Clone)]
pub struct FileReport {
    pub audio_path: PathBuf,
    pub lyric_path: PathBuf,
    pub lyric_lines: usize,
    pub dropped_entries: Vec<SubtitleEntry>,
    pub input_duration_ms: u64,
    pub output_duration_ms: u64,
    pub elapsed: Duration,
}

/// Result of `Controller::run`
#[derive(Debug, Clone)]
pub enum FileOutcome {
    /// Outputs were written
    Processed(FileReport),
    /// Nothing was done, with the reason
    Skipped(String),
}

/// Totals of a folder run
#[derive(Debug, Clone, Default)]
pub struct BatchSummary {
    pub processed: usize,
    pub skipped: usize,
    pub failed: Vec<(PathBuf, String)>,
    pub elapsed: Duration,
}

impl BatchSummary {
    pub fn failed_count(&self) -> usize {
        self.failed.len()
    }
}

/// Main application controller
pub struct Controller {
    // @field: App configuration
    config: Config,
    // @field: Decode/encode backend
    codec: Arc<dyn AudioCodec>,
}

impl Controller {
    // @method: Create a new controller using ffmpeg as codec backend
    pub fn with_config(config: Config) -> Result<Self> {
        let codec = Arc::new(FfmpegCodec::new(config.ffmpeg.clone()));
        Self::with_codec(config, codec)
    }

    // @method: Create a new controller with an explicit codec backend
    pub fn with_codec(config: Config, codec: Arc<dyn AudioCodec>) -> Result<Self> {
        config.validate().context("Configuration validation failed")?;
        Ok(Self { config, codec })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Job for a media file using the companion subtitle and configured output format
    pub fn job_for_media(&self, media_path: &Path, output_dir: &Path) -> FileJob {
        let subtitle_path = FileManager::companion_subtitle_path(media_path, &self.config.batch.subtitle_suffix);
        let (audio_output, _) = FileManager::output_paths(media_path, output_dir, &self.config.batch.output_format);
        FileJob::new(media_path.to_path_buf(), subtitle_path, audio_output)
    }

    /// Process one file: parse subtitles, decode, transform, encode, write lyrics
    pub async fn run(&self, job: FileJob, force_overwrite: bool) -> Result<FileOutcome> {
        let start_time = Instant::now();
        let lyric_path = job.lyric_output();

        if !FileManager::file_exists(&job.media_path) {
            return Err(anyhow!("Input file does not exist or is not a file: {:?}", job.media_path));
        }
        if FileManager::detect_file_type(&job.media_path)? == FileType::Subtitle {
            return Err(anyhow!("Expected an audio or video file, got a subtitle: {:?}", job.media_path));
        }

        if !force_overwrite && (job.audio_output.exists() || lyric_path.exists()) {
            warn!("Skipping {:?}, output already exists (use -f to force overwrite)", job.media_path);
            return Ok(FileOutcome::Skipped("output already exists".to_string()));
        }

        let subtitles = SubtitleCollection::from_file(&job.subtitle_path)
            .with_context(|| format!("Failed to load subtitles: {}", job.subtitle_path.display()))?;

        let audio = self
            .codec
            .decode(&job.media_path)
            .await
            .with_context(|| format!("Failed to decode audio: {}", job.media_path.display()))?;
        let input_duration_ms = audio.duration_ms();

        let options = self.config.processing.options();
        let entries = subtitles.entries;
        let outcome = tokio::task::spawn_blocking(move || timeline::process(&entries, &audio, &options))
            .await
            .context("Processing task failed")??;

        if !outcome.dropped.is_empty() {
            warn!(
                "{} subtitle entries could not be placed in the output timeline",
                outcome.dropped.len()
            );
            for entry in &outcome.dropped {
                debug!(
                    "Dropped entry {} ({} --> {}): {}",
                    entry.seq_num,
                    SubtitleEntry::format_timestamp(entry.start_ms),
                    SubtitleEntry::format_timestamp(entry.end_ms),
                    timeline::remap::flatten_text(&entry.text)
                );
            }
        }

        if let Some(parent) = job.audio_output.parent() {
            FileManager::ensure_dir(parent)?;
        }
        self.codec
            .encode(&outcome.audio, &job.audio_output)
            .await
            .with_context(|| format!("Failed to encode audio: {}", job.audio_output.display()))?;
        outcome.lyrics.write_to_file(&lyric_path)?;

        let elapsed = start_time.elapsed();
        info!(
            "Success: {} ({} -> {}, {} lyric lines, {})",
            job.audio_output.display(),
            Self::format_duration(Duration::from_millis(input_duration_ms)),
            Self::format_duration(Duration::from_millis(outcome.duration_ms)),
            outcome.lyrics.len(),
            self.config.processing.mode
        );

        Ok(FileOutcome::Processed(FileReport {
            audio_path: job.audio_output,
            lyric_path,
            lyric_lines: outcome.lyrics.len(),
            dropped_entries: outcome.dropped,
            input_duration_ms,
            output_duration_ms: outcome.duration_ms,
            elapsed,
        }))
    }

    /// Process every media file of a directory that has a companion subtitle.
    ///
    /// A failing file is logged and counted; it never stops the others.
    pub async fn run_folder(&self, input_dir: PathBuf, output_dir: PathBuf, force_overwrite: bool) -> Result<BatchSummary> {
        let start_time = Instant::now();

        if !input_dir.is_dir() {
            return Err(anyhow!("Input directory does not exist: {:?}", input_dir));
        }
        FileManager::ensure_dir(&output_dir)?;

        let mut media_files = Vec::new();
        for ext in &self.config.batch.media_extensions {
            let mut files = FileManager::find_files(&input_dir, ext, self.config.batch.recursive)?;
            media_files.append(&mut files);
        }
        media_files.sort();
        media_files.dedup();

        if media_files.is_empty() {
            return Err(anyhow!("No media files found in directory: {:?}", input_dir));
        }

        let mut summary = BatchSummary::default();
        let mut jobs = Vec::with_capacity(media_files.len());
        for media in &media_files {
            let job = self.job_for_media(media, &output_dir);
            if !job.subtitle_path.exists() {
                warn!(
                    "Skipping {}: subtitle not found ({})",
                    media.display(),
                    job.subtitle_path.display()
                );
                summary.skipped += 1;
                continue;
            }
            jobs.push(job);
        }

        let folder_pb = ProgressBar::new(jobs.len() as u64);
        let template_result = ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files ({percent}%) {msg} {eta}")
            .or_else(|_| ProgressStyle::default_bar().template("{spinner} [{elapsed_precise}] [{bar:40}] {pos}/{len} ({percent}%) {msg}"))
            .unwrap_or_else(|_| ProgressStyle::default_bar());
        folder_pb.set_style(template_result.progress_chars("█▓▒░"));
        folder_pb.set_message("Processing files");

        let concurrency = self.config.batch.concurrent_files.max(1);
        let results: Vec<(FileJob, Result<FileOutcome>)> = stream::iter(jobs)
            .map(|job| {
                let pb = folder_pb.clone();
                async move {
                    let result = self.run(job.clone(), force_overwrite).await;
                    pb.inc(1);
                    (job, result)
                }
            })
            .buffer_unordered(concurrency)
            .collect()
            .await;

        folder_pb.finish_with_message("Folder processing complete");

        for (job, result) in results {
            match result {
                Ok(FileOutcome::Processed(_)) => summary.processed += 1,
                Ok(FileOutcome::Skipped(_)) => summary.skipped += 1,
                Err(e) => {
                    error!("Error processing file {}: {:#}", job.media_path.display(), e);
                    summary.failed.push((job.media_path, format!("{:#}", e)));
                }
            }
        }
        summary.elapsed = start_time.elapsed();

        let summary_message = format!(
            "Folder processing completed: {} processed, {} skipped, {} errors",
            summary.processed,
            summary.skipped,
            summary.failed_count()
        );
        info!("{}", summary_message);

        if let Err(e) = self.write_batch_log(&output_dir, &input_dir, &summary, &summary_message) {
            warn!("Failed to write folder log: {}", e);
        }

        Ok(summary)
    }

    fn write_batch_log(&self, output_dir: &Path, input_dir: &Path, summary: &BatchSummary, message: &str) -> Result<()> {
        let log_path = output_dir.join(BATCH_LOG_FILE);
        FileManager::append_to_log_file(
            &log_path,
            &format!(
                "{} [{}, mode {}] - Duration: {}",
                message,
                input_dir.display(),
                self.config.processing.mode,
                Self::format_duration(summary.elapsed)
            ),
        )?;
        for (path, reason) in &summary.failed {
            FileManager::append_to_log_file(&log_path, &format!("FAILED {}: {}", path.display(), reason))?;
        }
        Ok(())
    }

    // Format duration in a human-readable format
    pub fn format_duration(duration: Duration) -> String {
        let total_seconds = duration.as_secs();
        let hours = total_seconds / 3600;
        let minutes = (total_seconds % 3600) / 60;
        let seconds = total_seconds % 60;

        if hours > 0 {
            format!("{}h {}m {}s", hours, minutes, seconds)
        } else if minutes > 0 {
            format!("{}m {}s", minutes, seconds)
        } else {
            format!("{}.{:03}s", seconds, duration.subsec_millis())
        }
    }
}
