use std::fmt;
use std::path::{Path, PathBuf};
use regex::Regex;
use once_cell::sync::Lazy;
use log::{debug, warn};

use crate::errors::SubtitleError;

// @module: Timed-text (SRT) input

// @const: SRT timing line regex
static TIMING_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(\d+):(\d{2}):(\d{2})[,.](\d{3})\s*-->\s*(\d+):(\d{2}):(\d{2})[,.](\d{3})")
        .expect("timing regex is valid")
});

// @struct: Single subtitle entry
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleEntry {
    // @field: Sequence number as written in the file
    pub seq_num: usize,

    // @field: Start time in ms
    pub start_ms: u64,

    // @field: End time in ms
    pub end_ms: u64,

    // @field: Subtitle text, lines joined with '\n'
    pub text: String,
}

impl SubtitleEntry {
    /// Creates a new subtitle entry
    pub fn new(seq_num: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Self {
        SubtitleEntry {
            seq_num,
            start_ms,
            end_ms,
            text: text.into(),
        }
    }

    // @creates: Validated subtitle entry
    // @validates: start <= end (zero-width entries are allowed)
    pub fn new_validated(seq_num: usize, start_ms: u64, end_ms: u64, text: impl Into<String>) -> Result<Self, SubtitleError> {
        if start_ms > end_ms {
            return Err(SubtitleError::InvalidRange { seq_num, start_ms, end_ms });
        }
        Ok(Self::new(seq_num, start_ms, end_ms, text))
    }

    /// Parse an SRT timestamp (`HH:MM:SS,mmm`) to milliseconds
    pub fn parse_timestamp(timestamp: &str) -> Result<u64, SubtitleError> {
        let parts: Vec<&str> = timestamp.trim().split(&[':', ',', '.'][..]).collect();

        if parts.len() != 4 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        let parse = |part: &str| -> Result<u64, SubtitleError> {
            if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
                return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
            }
            part.parse().map_err(|_| SubtitleError::InvalidTimestamp(timestamp.to_string()))
        };

        let hours = parse(parts[0])?;
        let minutes = parse(parts[1])?;
        let seconds = parse(parts[2])?;
        let millis = parse(parts[3])?;

        if minutes >= 60 || seconds >= 60 || millis >= 1000 {
            return Err(SubtitleError::InvalidTimestamp(timestamp.to_string()));
        }

        hours
            .checked_mul(3_600_000)
            .and_then(|ms| ms.checked_add(minutes * 60_000 + seconds * 1_000 + millis))
            .ok_or_else(|| SubtitleError::InvalidTimestamp(timestamp.to_string()))
    }

    /// Format a timestamp in milliseconds to SRT format (HH:MM:SS,mmm)
    pub fn format_timestamp(ms: u64) -> String {
        let hours = ms / 3_600_000;
        let minutes = (ms % 3_600_000) / 60_000;
        let seconds = (ms % 60_000) / 1_000;
        let millis = ms % 1_000;

        format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
    }
}

impl fmt::Display for SubtitleEntry {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "{}", self.seq_num)?;
        writeln!(f, "{} --> {}", Self::format_timestamp(self.start_ms), Self::format_timestamp(self.end_ms))?;
        writeln!(f, "{}", self.text)?;
        writeln!(f)
    }
}

/// Collection of subtitle entries read from one file
#[derive(Debug)]
pub struct SubtitleCollection {
    /// Source filename
    pub source_file: PathBuf,

    /// Entries in file order
    pub entries: Vec<SubtitleEntry>,
}

impl SubtitleCollection {
    /// Create an empty collection
    pub fn new(source_file: PathBuf) -> Self {
        SubtitleCollection {
            source_file,
            entries: Vec::new(),
        }
    }

    /// Read and parse an SRT file. A missing file is an error, never an empty track.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SubtitleError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|source| SubtitleError::Io {
            path: path.display().to_string(),
            source,
        })?;

        let entries = Self::parse_srt_string(&content)?;
        debug!("Parsed {} subtitle entries from {}", entries.len(), path.display());

        Ok(SubtitleCollection {
            source_file: path.to_path_buf(),
            entries,
        })
    }

    /// Parse SRT format string into subtitle entries.
    ///
    /// Entries keep file order. Any structural problem is reported with its
    /// line number instead of being skipped.
    pub fn parse_srt_string(content: &str) -> Result<Vec<SubtitleEntry>, SubtitleError> {
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let mut entries = Vec::new();

        // State for the entry being read
        let mut current_seq_num: Option<usize> = None;
        let mut current_timing: Option<(u64, u64)> = None;
        let mut current_text: Vec<&str> = Vec::new();

        let finish = |seq_num: usize, (start_ms, end_ms): (u64, u64), text: &[&str]| {
            SubtitleEntry::new_validated(seq_num, start_ms, end_ms, text.join("\n"))
        };

        for (index, line) in content.lines().enumerate() {
            let line_number = index + 1;
            let trimmed = line.trim();

            if trimmed.is_empty() {
                match (current_seq_num, current_timing) {
                    (Some(seq_num), Some(timing)) => {
                        entries.push(finish(seq_num, timing, &current_text)?);
                        current_seq_num = None;
                        current_timing = None;
                        current_text.clear();
                    }
                    (Some(_), None) => {
                        return Err(SubtitleError::Parse {
                            line: line_number,
                            message: "missing timing line after sequence number".to_string(),
                        });
                    }
                    _ => {}
                }
                continue;
            }

            match (current_seq_num, current_timing) {
                (None, _) => {
                    let seq_num = trimmed.parse::<usize>().map_err(|_| SubtitleError::Parse {
                        line: line_number,
                        message: format!("expected sequence number, found '{}'", trimmed),
                    })?;
                    current_seq_num = Some(seq_num);
                }
                (Some(_), None) => {
                    current_timing = Some(Self::parse_timing_line(trimmed, line_number)?);
                }
                (Some(_), Some(_)) => current_text.push(trimmed),
            }
        }

        // Last entry may not be followed by a blank line
        match (current_seq_num, current_timing) {
            (Some(seq_num), Some(timing)) => entries.push(finish(seq_num, timing, &current_text)?),
            (Some(seq_num), None) => {
                return Err(SubtitleError::Parse {
                    line: content.lines().count(),
                    message: format!("entry {} has no timing line", seq_num),
                });
            }
            _ => {}
        }

        if entries.is_empty() {
            warn!("No subtitle entries found in content");
        }

        Ok(entries)
    }

    fn parse_timing_line(line: &str, line_number: usize) -> Result<(u64, u64), SubtitleError> {
        let caps = TIMING_REGEX.captures(line).ok_or_else(|| SubtitleError::Parse {
            line: line_number,
            message: format!("expected 'HH:MM:SS,mmm --> HH:MM:SS,mmm', found '{}'", line),
        })?;

        let timestamp = |first: usize| format!("{}:{}:{},{}", &caps[first], &caps[first + 1], &caps[first + 2], &caps[first + 3]);
        let start_ms = SubtitleEntry::parse_timestamp(&timestamp(1))?;
        let end_ms = SubtitleEntry::parse_timestamp(&timestamp(5))?;

        Ok((start_ms, end_ms))
    }
}

impl fmt::Display for SubtitleCollection {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "Subtitle Collection")?;
        writeln!(f, "Source: {:?}", self.source_file)?;
        writeln!(f, "Entries: {}", self.entries.len())?;
        Ok(())
    }
}
