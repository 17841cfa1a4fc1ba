/*!
 * LRC lyric output.
 *
 * Each line is `[MM:SS.xx] text` followed by a newline, ascending by
 * timestamp. Minutes are unbounded and padded to two digits; seconds and
 * hundredths are truncated, never rounded.
 */

use anyhow::{Context, Result};
use std::fmt;
use std::path::Path;

use crate::file_utils::FileManager;

/// One timed lyric line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LyricLine {
    pub timestamp_ms: u64,
    pub text: String,
}

impl LyricLine {
    pub fn new(timestamp_ms: u64, text: impl Into<String>) -> Self {
        Self {
            timestamp_ms,
            text: text.into(),
        }
    }
}

impl fmt::Display for LyricLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", format_lrc_timestamp(self.timestamp_ms), self.text)
    }
}

/// Format milliseconds as `MM:SS.xx`
pub fn format_lrc_timestamp(ms: u64) -> String {
    let minutes = ms / 60_000;
    let seconds = (ms / 1_000) % 60;
    let hundredths = (ms % 1_000) / 10;
    format!("{:02}:{:02}.{:02}", minutes, seconds, hundredths)
}

/// Lyric lines sorted by timestamp, ties kept in input order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LyricSheet {
    lines: Vec<LyricLine>,
}

impl LyricSheet {
    pub fn from_lines(mut lines: Vec<LyricLine>) -> Self {
        // sort_by_key is stable
        lines.sort_by_key(|line| line.timestamp_ms);
        Self { lines }
    }

    pub fn lines(&self) -> &[LyricLine] {
        &self.lines
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// The LRC file content
    pub fn render(&self) -> String {
        self.lines.iter().map(|line| format!("{}\n", line)).collect()
    }

    /// Write the sheet as a UTF-8 LRC file
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        FileManager::write_to_file(path, &self.render())
            .with_context(|| format!("Failed to write lyric file: {}", path.display()))
    }
}
