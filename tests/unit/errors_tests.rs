/*!
 * Tests for error types
 */

use lyricsync::errors::{AppError, AudioError, SubtitleError, TimelineError};

/// Test subtitle error messages
#[test]
fn test_subtitle_error_display_withParseError_shouldIncludeLine() {
    let error = SubtitleError::Parse { line: 12, message: "expected sequence number".to_string() };
    assert_eq!(error.to_string(), "Malformed subtitle content at line 12: expected sequence number");

    let error = SubtitleError::InvalidRange { seq_num: 3, start_ms: 2000, end_ms: 1000 };
    assert!(error.to_string().contains("entry 3"));
}

/// Test audio error messages
#[test]
fn test_audio_error_display_withTimeout_shouldIncludeSeconds() {
    assert_eq!(AudioError::Timeout { secs: 30 }.to_string(), "Audio codec timed out after 30 seconds");
    let error = AudioError::FormatMismatch {
        expected_rate: 48000,
        expected_channels: 2,
        actual_rate: 44100,
        actual_channels: 1,
    };
    assert!(error.to_string().contains("48000 Hz/2 ch"));
}

/// Test conversions into the application error
#[test]
fn test_app_error_from_withLayerErrors_shouldWrap() {
    let app: AppError = SubtitleError::InvalidTimestamp("99".to_string()).into();
    assert!(matches!(app, AppError::Subtitle(_)));

    let app: AppError = AudioError::CodecUnavailable("ffmpeg".to_string()).into();
    assert_eq!(app.to_string(), "Audio error: Audio codec unavailable: ffmpeg");

    let app: AppError = TimelineError::InvalidSpeedFactor(0.0).into();
    assert!(matches!(app, AppError::Timeline(TimelineError::InvalidSpeedFactor(_))));

    let app: AppError = std::io::Error::new(std::io::ErrorKind::NotFound, "gone").into();
    assert!(matches!(app, AppError::File(_)));

    let app: AppError = anyhow::anyhow!("boom").into();
    assert_eq!(app.to_string(), "Unknown error: boom");
}

/// Test that io errors convert into audio errors
#[test]
fn test_audio_error_from_withIoError_shouldWrap() {
    let error: AudioError = std::io::Error::new(std::io::ErrorKind::BrokenPipe, "pipe").into();
    assert!(matches!(error, AudioError::Io(_)));
}
