use async_trait::async_trait;
use log::debug;
use serde_json::Value;
use std::path::Path;
use std::process::Stdio;
use std::time::Duration;
use tokio::io::AsyncWriteExt;
use tokio::process::Command;

use crate::app_config::FfmpegConfig;
use crate::errors::AudioError;

use super::{AudioBuffer, AudioCodec};

// @module: Codec backend driving the ffmpeg/ffprobe executables

/// Codec backend that shells out to ffmpeg and exchanges raw `s16le` PCM over pipes
#[derive(Debug, Clone)]
pub struct FfmpegCodec {
    config: FfmpegConfig,
}

impl FfmpegCodec {
    pub fn new(config: FfmpegConfig) -> Self {
        Self { config }
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout_secs)
    }

    /// Sample rate and channel count of the first audio stream
    async fn probe(&self, path: &Path) -> Result<(u32, u16), AudioError> {
        let probe_future = Command::new(&self.config.ffprobe_path)
            .args(["-v", "quiet", "-print_format", "json", "-show_streams", "-select_streams", "a:0"])
            .arg(path)
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = probe_future => result.map_err(|e| spawn_error(&self.config.ffprobe_path, e))?,
            _ = tokio::time::sleep(self.timeout()) => {
                return Err(AudioError::Timeout { secs: self.config.timeout_secs });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::ProbeFailed(filter_ffmpeg_stderr(&stderr)));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }
}

#[async_trait]
impl AudioCodec for FfmpegCodec {
    async fn decode(&self, path: &Path) -> Result<AudioBuffer, AudioError> {
        if !path.exists() {
            return Err(AudioError::DecodeFailed(format!("input does not exist: {}", path.display())));
        }

        let (sample_rate, channels) = self.probe(path).await?;
        debug!("Decoding {} ({} Hz, {} ch)", path.display(), sample_rate, channels);

        let rate = sample_rate.to_string();
        let ch = channels.to_string();
        let decode_future = Command::new(&self.config.ffmpeg_path)
            .args(["-v", "error", "-nostdin", "-i"])
            .arg(path)
            .args(["-vn", "-map", "0:a:0", "-f", "s16le", "-acodec", "pcm_s16le", "-ar", &rate, "-ac", &ch, "pipe:1"])
            .kill_on_drop(true)
            .output();

        let output = tokio::select! {
            result = decode_future => result.map_err(|e| spawn_error(&self.config.ffmpeg_path, e))?,
            _ = tokio::time::sleep(self.timeout()) => {
                return Err(AudioError::Timeout { secs: self.config.timeout_secs });
            }
        };

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::DecodeFailed(filter_ffmpeg_stderr(&stderr)));
        }

        // A truncated final sample is dropped rather than rejected
        let usable = output.stdout.len() - output.stdout.len() % (2 * channels as usize);
        AudioBuffer::from_le_bytes(&output.stdout[..usable], sample_rate, channels)
    }

    async fn encode(&self, buffer: &AudioBuffer, path: &Path) -> Result<(), AudioError> {
        let rate = buffer.sample_rate().to_string();
        let ch = buffer.channels().to_string();
        let mut child = Command::new(&self.config.ffmpeg_path)
            .args(["-y", "-v", "error", "-f", "s16le", "-ar", &rate, "-ac", &ch, "-i", "pipe:0"])
            .arg(path)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| spawn_error(&self.config.ffmpeg_path, e))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| AudioError::EncodeFailed("encoder stdin unavailable".to_string()))?;
        let bytes = buffer.to_le_bytes();

        let write = async move {
            stdin.write_all(&bytes).await?;
            stdin.shutdown().await
        };
        let run = async { tokio::join!(write, child.wait_with_output()) };

        let (written, output) = tokio::select! {
            result = run => result,
            _ = tokio::time::sleep(self.timeout()) => {
                return Err(AudioError::Timeout { secs: self.config.timeout_secs });
            }
        };

        let output = output?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(AudioError::EncodeFailed(filter_ffmpeg_stderr(&stderr)));
        }
        written?;

        debug!("Encoded {} ms of audio to {}", buffer.duration_ms(), path.display());
        Ok(())
    }
}

fn spawn_error(program: &str, error: std::io::Error) -> AudioError {
    if error.kind() == std::io::ErrorKind::NotFound {
        AudioError::CodecUnavailable(format!("'{}' not found in PATH", program))
    } else {
        AudioError::Io(error)
    }
}

/// Read sample rate and channel count from `ffprobe -print_format json` output
pub fn parse_probe_output(stdout: &str) -> Result<(u32, u16), AudioError> {
    let json: Value = serde_json::from_str(stdout)
        .map_err(|e| AudioError::ProbeFailed(format!("invalid ffprobe JSON: {}", e)))?;

    let stream = json
        .get("streams")
        .and_then(|s| s.as_array())
        .and_then(|streams| streams.first())
        .ok_or_else(|| AudioError::ProbeFailed("no audio stream found".to_string()))?;

    // ffprobe reports sample_rate as a string
    let sample_rate = stream
        .get("sample_rate")
        .and_then(|v| v.as_str().and_then(|s| s.parse::<u32>().ok()).or_else(|| v.as_u64().map(|n| n as u32)))
        .filter(|rate| *rate > 0)
        .ok_or_else(|| AudioError::ProbeFailed("audio stream has no sample rate".to_string()))?;

    let channels = stream
        .get("channels")
        .and_then(|v| v.as_u64())
        .filter(|ch| *ch > 0 && *ch <= u16::MAX as u64)
        .ok_or_else(|| AudioError::ProbeFailed("audio stream has no channel count".to_string()))?;

    Ok((sample_rate, channels as u16))
}

/// Filter ffmpeg stderr to only show meaningful error lines, stripping the
/// version banner, build configuration, and stream metadata noise.
pub fn filter_ffmpeg_stderr(stderr: &str) -> String {
    let noise_prefixes = [
        "ffmpeg version",
        "ffprobe version",
        "built with",
        "configuration:",
        "lib",
        "Input #",
        "Metadata:",
        "Duration:",
        "Chapter",
        "Stream #",
        "Output #",
        "Stream mapping:",
        "Press [q]",
    ];

    let meaningful: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .filter(|line| !noise_prefixes.iter().any(|p| line.starts_with(p)))
        .collect();

    if meaningful.is_empty() {
        "unknown ffmpeg error (stderr was empty after filtering)".to_string()
    } else {
        meaningful.join("\n")
    }
}
