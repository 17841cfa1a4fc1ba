use anyhow::{Result, Context};
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;
use std::fs::OpenOptions;
use std::io::Write;
use chrono::Local;

// @module: File and directory utilities

// @const: Extensions treated as audio/video containers
const MEDIA_EXTENSIONS: &[&str] = &[
    "mp4", "mkv", "avi", "mov", "wmv", "flv", "webm", "m4v", "mpg", "mpeg", "ts",
    "mp3", "wav", "flac", "ogg", "opus", "m4a", "aac",
];

// @struct: File operations utility
pub struct FileManager;

impl FileManager {
    // @checks: File existence
    pub fn file_exists<P: AsRef<Path>>(path: P) -> bool {
        path.as_ref().is_file()
    }

    // @creates: Directory and parents if needed
    pub fn ensure_dir<P: AsRef<Path>>(path: P) -> Result<()> {
        let path = path.as_ref();
        if !path.as_os_str().is_empty() && !path.exists() {
            fs::create_dir_all(path)
                .with_context(|| format!("Failed to create directory: {}", path.display()))?;
        }
        Ok(())
    }

    // @returns: `<dir>/<stem>.<suffix>.srt` next to the media file
    pub fn companion_subtitle_path<P: AsRef<Path>>(media_file: P, suffix: &str) -> PathBuf {
        let media_file = media_file.as_ref();
        let stem = media_file.file_stem().unwrap_or_default().to_string_lossy();
        let filename = if suffix.is_empty() {
            format!("{}.srt", stem)
        } else {
            format!("{}.{}.srt", stem, suffix)
        };
        media_file.with_file_name(filename)
    }

    // @generates: Audio and lyric output paths for a media file
    // @params: media_file, output_dir, format
    pub fn output_paths<P1: AsRef<Path>, P2: AsRef<Path>>(
        media_file: P1,
        output_dir: P2,
        format: &str,
    ) -> (PathBuf, PathBuf) {
        let stem = media_file.as_ref().file_stem().unwrap_or_default().to_string_lossy().to_string();
        let audio = output_dir.as_ref().join(format!("{}.{}", stem, format));
        let lyric = Self::lyric_path_for(&audio);
        (audio, lyric)
    }

    // @returns: Lyric file path sitting next to an audio output
    pub fn lyric_path_for<P: AsRef<Path>>(audio_output: P) -> PathBuf {
        audio_output.as_ref().with_extension("lrc")
    }

    /// Find files with a specific extension in a directory
    pub fn find_files<P: AsRef<Path>>(dir: P, extension: &str, recursive: bool) -> Result<Vec<PathBuf>> {
        let mut result = Vec::new();
        let wanted = extension.trim_start_matches('.');

        let walker = WalkDir::new(dir.as_ref())
            .follow_links(true)
            .max_depth(if recursive { usize::MAX } else { 1 });

        for entry in walker {
            let entry = entry.context("Failed to read directory entry")?;
            let path = entry.path();

            if path.is_file() {
                if let Some(ext) = path.extension() {
                    if ext.to_string_lossy().eq_ignore_ascii_case(wanted) {
                        result.push(path.to_path_buf());
                    }
                }
            }
        }

        result.sort();
        Ok(result)
    }

    /// Read a file to a string
    pub fn read_to_string<P: AsRef<Path>>(path: P) -> Result<String> {
        fs::read_to_string(&path)
            .with_context(|| format!("Failed to read file: {:?}", path.as_ref()))
    }

    /// Write a string to a file
    pub fn write_to_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        // Ensure the parent directory exists
        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        fs::write(&path, content)
            .with_context(|| format!("Failed to write to file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Append content to a log file with timestamp
    pub fn append_to_log_file<P: AsRef<Path>>(path: P, content: &str) -> Result<()> {
        let timestamp = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();

        if let Some(parent) = path.as_ref().parent() {
            Self::ensure_dir(parent)?;
        }

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .with_context(|| format!("Failed to open log file: {:?}", path.as_ref()))?;

        writeln!(file, "[{}] {}", timestamp, content)
            .with_context(|| format!("Failed to write to log file: {:?}", path.as_ref()))?;

        Ok(())
    }

    /// Classify a file by its extension
    pub fn detect_file_type<P: AsRef<Path>>(path: P) -> Result<FileType> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(anyhow::anyhow!("File does not exist: {:?}", path));
        }

        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();

        Ok(if ext == "srt" {
            FileType::Subtitle
        } else if MEDIA_EXTENSIONS.contains(&ext.as_str()) {
            FileType::Media
        } else {
            FileType::Unknown
        })
    }
}

/// Enum representing different file types
#[derive(Debug, PartialEq, Eq)]
pub enum FileType {
    /// Subtitle file (SRT)
    Subtitle,
    /// Audio or video container
    Media,
    /// Unknown file type
    Unknown,
}
