/*!
 * Error types for the lyricsync application.
 *
 * This module contains custom error types for the different layers of the
 * application, using the thiserror crate for ergonomic error definitions.
 */

use thiserror::Error;

/// Errors that can occur while reading timed-text (SRT) input
#[derive(Error, Debug)]
pub enum SubtitleError {
    /// The subtitle file could not be read
    #[error("Failed to read subtitle file {path}: {source}")]
    Io {
        /// Path of the subtitle file
        path: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The content is not well-formed SRT
    #[error("Malformed subtitle content at line {line}: {message}")]
    Parse {
        /// 1-based line number
        line: usize,
        /// What was wrong with the line
        message: String,
    },

    /// A single timestamp could not be parsed
    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    /// Entry ends before it starts
    #[error("Subtitle entry {seq_num} ends before it starts ({start_ms} ms > {end_ms} ms)")]
    InvalidRange {
        /// Sequence number of the entry
        seq_num: usize,
        /// Start time in milliseconds
        start_ms: u64,
        /// End time in milliseconds
        end_ms: u64,
    },
}

/// Errors produced at the audio boundary (PCM buffers and the codec backend)
#[derive(Error, Debug)]
pub enum AudioError {
    /// A PCM buffer was constructed with inconsistent parameters
    #[error("Invalid audio buffer: {0}")]
    InvalidBuffer(String),

    /// Two buffers with different formats were combined
    #[error("Audio format mismatch: expected {expected_rate} Hz/{expected_channels} ch, got {actual_rate} Hz/{actual_channels} ch")]
    FormatMismatch {
        expected_rate: u32,
        expected_channels: u16,
        actual_rate: u32,
        actual_channels: u16,
    },

    /// Codec executable is missing or could not be started
    #[error("Audio codec unavailable: {0}")]
    CodecUnavailable(String),

    /// Probing the input stream failed
    #[error("Failed to probe audio stream: {0}")]
    ProbeFailed(String),

    /// Decoding failed
    #[error("Failed to decode audio: {0}")]
    DecodeFailed(String),

    /// Encoding failed
    #[error("Failed to encode audio: {0}")]
    EncodeFailed(String),

    /// Codec subprocess exceeded its time budget
    #[error("Audio codec timed out after {secs} seconds")]
    Timeout {
        /// Timeout that was exceeded
        secs: u64,
    },

    /// I/O error while talking to the codec
    #[error("Audio I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised when building the timeline transformation
#[derive(Error, Debug, PartialEq)]
pub enum TimelineError {
    /// Speed factor must be a positive, finite number
    #[error("Invalid speed factor: {0}")]
    InvalidSpeedFactor(f64),

    /// Unknown processing mode name
    #[error("Unknown processing mode '{0}' (expected remove, fade or speed)")]
    UnknownMode(String),
}

/// Main application error type that wraps all other errors
#[derive(Error, Debug)]
pub enum AppError {
    /// Error from a file operation
    #[error("File error: {0}")]
    File(String),

    /// Error from subtitle parsing
    #[error("Subtitle error: {0}")]
    Subtitle(#[from] SubtitleError),

    /// Error from the audio boundary
    #[error("Audio error: {0}")]
    Audio(#[from] AudioError),

    /// Error from the timeline core
    #[error("Timeline error: {0}")]
    Timeline(#[from] TimelineError),

    /// Invalid configuration
    #[error("Configuration error: {0}")]
    Config(String),

    /// Any other error
    #[error("Unknown error: {0}")]
    Unknown(String),
}

// Utility functions for error conversion
impl From<anyhow::Error> for AppError {
    fn from(error: anyhow::Error) -> Self {
        Self::Unknown(error.to_string())
    }
}

impl From<std::io::Error> for AppError {
    fn from(error: std::io::Error) -> Self {
        Self::File(error.to_string())
    }
}
