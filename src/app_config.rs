/*!
 * Application configuration: loading, validating and saving settings.
 */

use anyhow::{anyhow, Context, Result};
use log::warn;
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::timeline::{ProcessingMode, ProcessingOptions};

/// Represents the application configuration
#[derive(Debug, Serialize, Deserialize, Clone, Default)]
pub struct Config {
    /// Timeline processing settings
    #[serde(default)]
    pub processing: ProcessingConfig,

    /// Directory (batch) processing settings
    #[serde(default)]
    pub batch: BatchConfig,

    /// Codec backend settings
    #[serde(default)]
    pub ffmpeg: FfmpegConfig,

    /// Log level
    #[serde(default)]
    pub log_level: LogLevel,
}

/// How gap segments are treated
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct ProcessingConfig {
    /// Processing mode (remove, fade or speed)
    #[serde(default)]
    pub mode: ProcessingMode,

    /// Fade applied to dialogue edges in fade mode, in milliseconds
    #[serde(default = "default_fade_duration_ms")]
    pub fade_duration_ms: u64,

    /// Time compression applied to gaps in speed mode
    #[serde(default = "default_speed_factor")]
    pub speed_factor: f64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        Self {
            mode: ProcessingMode::default(),
            fade_duration_ms: default_fade_duration_ms(),
            speed_factor: default_speed_factor(),
        }
    }
}

impl ProcessingConfig {
    /// Options handed to the timeline core
    pub fn options(&self) -> ProcessingOptions {
        ProcessingOptions {
            mode: self.mode,
            fade_duration_ms: self.fade_duration_ms,
            speed_factor: self.speed_factor,
        }
    }
}

/// Settings for processing a whole directory
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct BatchConfig {
    /// Media file extensions picked up in a directory
    #[serde(default = "default_media_extensions")]
    pub media_extensions: Vec<String>,

    /// Language suffix of the companion subtitle (`<stem>.<suffix>.srt`)
    #[serde(default = "default_subtitle_suffix")]
    pub subtitle_suffix: String,

    /// Extension (and container) of the generated audio
    #[serde(default = "default_output_format")]
    pub output_format: String,

    /// Number of files processed at the same time
    #[serde(default = "default_concurrent_files")]
    pub concurrent_files: usize,

    /// Descend into subdirectories
    #[serde(default)]
    pub recursive: bool,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self {
            media_extensions: default_media_extensions(),
            subtitle_suffix: default_subtitle_suffix(),
            output_format: default_output_format(),
            concurrent_files: default_concurrent_files(),
            recursive: false,
        }
    }
}

/// ffmpeg/ffprobe settings
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct FfmpegConfig {
    /// ffmpeg executable
    #[serde(default = "default_ffmpeg_path")]
    pub ffmpeg_path: String,

    /// ffprobe executable
    #[serde(default = "default_ffprobe_path")]
    pub ffprobe_path: String,

    /// Timeout for a single codec invocation, in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FfmpegConfig {
    fn default() -> Self {
        Self {
            ffmpeg_path: default_ffmpeg_path(),
            ffprobe_path: default_ffprobe_path(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Log verbosity level
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    #[default]
    Info,
    Debug,
    Trace,
}

impl LogLevel {
    pub fn to_level_filter(&self) -> log::LevelFilter {
        match self {
            LogLevel::Error => log::LevelFilter::Error,
            LogLevel::Warn => log::LevelFilter::Warn,
            LogLevel::Info => log::LevelFilter::Info,
            LogLevel::Debug => log::LevelFilter::Debug,
            LogLevel::Trace => log::LevelFilter::Trace,
        }
    }
}

fn default_fade_duration_ms() -> u64 {
    200
}

fn default_speed_factor() -> f64 {
    3.0
}

fn default_media_extensions() -> Vec<String> {
    vec!["mkv".to_string()]
}

fn default_subtitle_suffix() -> String {
    "ja".to_string()
}

fn default_output_format() -> String {
    "mp3".to_string()
}

fn default_concurrent_files() -> usize {
    1
}

fn default_ffmpeg_path() -> String {
    "ffmpeg".to_string()
}

fn default_ffprobe_path() -> String {
    "ffprobe".to_string()
}

fn default_timeout_secs() -> u64 {
    600
}

impl Config {
    /// Load a configuration file, writing the defaults there if it does not exist yet
    pub fn load_or_create<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to open config file: {}", path.display()))?;
            let config: Config = serde_json::from_str(&content)
                .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
            return Ok(config);
        }

        warn!("Config file not found at '{}', creating default config.", path.display());
        let config = Config::default();
        let config_json = serde_json::to_string_pretty(&config)
            .context("Failed to serialize default config to JSON")?;
        std::fs::write(path, config_json)
            .with_context(|| format!("Failed to write default config to file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate the configuration for consistency and required values
    pub fn validate(&self) -> Result<()> {
        let factor = self.processing.speed_factor;
        if !factor.is_finite() || factor <= 0.0 {
            return Err(anyhow!("Speed factor must be a positive number, got {}", factor));
        }

        if self.batch.concurrent_files == 0 {
            return Err(anyhow!("concurrent_files must be at least 1"));
        }

        if self.batch.media_extensions.iter().all(|e| e.trim().is_empty()) {
            return Err(anyhow!("At least one media extension is required"));
        }

        let format = &self.batch.output_format;
        if format.is_empty() || !format.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(anyhow!("Invalid output format: '{}'", format));
        }

        if self.ffmpeg.timeout_secs == 0 {
            return Err(anyhow!("ffmpeg timeout must be at least one second"));
        }

        Ok(())
    }
}
