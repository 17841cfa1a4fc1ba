// Module-specific lints configuration
#![allow(clippy::uninlined_format_args)]

use anyhow::{Result, anyhow};
use clap::{Args, CommandFactory, Parser, Subcommand, ValueEnum};
use clap_complete::{generate, Shell};
use log::{info, LevelFilter, Log, Metadata, Record, Level, SetLoggerError};
use std::io::Write;
use std::path::{Path, PathBuf};

use lyricsync::app_config::{self, Config};
use lyricsync::app_controller::{Controller, FileJob, FileOutcome};
use lyricsync::file_utils::FileManager;
use lyricsync::timeline::ProcessingMode;

/// CLI Wrapper for ProcessingMode to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliProcessingMode {
    /// Drop spans without dialogue
    Remove,
    /// Drop spans without dialogue and fade the cut edges
    Fade,
    /// Keep spans without dialogue, played faster
    Speed,
}

impl From<CliProcessingMode> for ProcessingMode {
    fn from(cli_mode: CliProcessingMode) -> Self {
        match cli_mode {
            CliProcessingMode::Remove => ProcessingMode::Remove,
            CliProcessingMode::Fade => ProcessingMode::Fade,
            CliProcessingMode::Speed => ProcessingMode::Speed,
        }
    }
}

/// CLI Wrapper for LogLevel to implement ValueEnum
#[derive(Debug, Clone, ValueEnum)]
enum CliLogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<CliLogLevel> for app_config::LogLevel {
    fn from(cli_level: CliLogLevel) -> Self {
        match cli_level {
            CliLogLevel::Error => app_config::LogLevel::Error,
            CliLogLevel::Warn => app_config::LogLevel::Warn,
            CliLogLevel::Info => app_config::LogLevel::Info,
            CliLogLevel::Debug => app_config::LogLevel::Debug,
            CliLogLevel::Trace => app_config::LogLevel::Trace,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Cut a media file (or every media file of a directory) and write synced lyrics (default command)
    Process(ProcessArgs),

    /// Generate shell completions for lyricsync
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Args, Debug)]
struct ProcessArgs {
    /// Input media file or directory to process
    #[arg(value_name = "INPUT_PATH", required = true)]
    input_path: Option<PathBuf>,

    /// SRT subtitle for a single input file (default: <stem>.<suffix>.srt next to it)
    #[arg(value_name = "SUBTITLE_PATH")]
    subtitle_path: Option<PathBuf>,

    /// Output audio file (single file) or output directory (directory input)
    #[arg(short, long, value_name = "OUTPUT")]
    output: Option<PathBuf>,

    /// Force overwrite of existing output files
    #[arg(short, long)]
    force_overwrite: bool,

    /// How to treat spans without dialogue
    #[arg(short, long, value_enum)]
    mode: Option<CliProcessingMode>,

    /// Fade duration in milliseconds (fade mode)
    #[arg(long, value_name = "MS")]
    fade_ms: Option<u64>,

    /// Speed factor for spans without dialogue (speed mode)
    #[arg(long, value_name = "FACTOR")]
    speed_factor: Option<f64>,

    /// Number of files processed in parallel (directory input)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Configuration file path
    #[arg(short, long, default_value = "conf.json")]
    config_path: String,

    /// Set logging level
    #[arg(short, long, value_enum)]
    log_level: Option<CliLogLevel>,
}

/// lyricsync - cut the silence out of a video and keep the subtitles in sync
#[derive(Parser, Debug)]
#[command(name = "lyricsync")]
#[command(version)]
#[command(about = "Turn subtitled videos into dialogue-only audio with synced LRC lyrics")]
#[command(args_conflicts_with_subcommands = true, subcommand_negates_reqs = true)]
#[command(long_about = "lyricsync extracts the audio of a video, removes (or speeds up) every span without
dialogue according to its SRT subtitles, and writes an LRC lyric file synchronized with the result.

EXAMPLES:
    lyricsync movie.mkv                           # Uses movie.ja.srt, writes movie.mp3 + movie.lrc
    lyricsync movie.mkv movie.en.srt -o out.mp3   # Explicit subtitle and output
    lyricsync -m fade movie.mkv                   # Fade the cut edges
    lyricsync -m speed --speed-factor 4 movie.mkv # Keep gaps, four times faster
    lyricsync /videos -o /audio -j 4              # Process a directory, four files at a time
    lyricsync completions bash > lyricsync.bash   # Generate bash completions

CONFIGURATION:
    Configuration is stored in conf.json by default. You can specify a different
    config file with --config-path. If the config file doesn't exist, a default one
    will be created automatically.

MODES:
    remove - drop spans without dialogue
    fade   - drop them and fade each dialogue span in and out
    speed  - keep them, time-compressed (pitch rises)")]
struct CommandLineOptions {
    #[command(subcommand)]
    command: Option<Commands>,

    #[command(flatten)]
    process: ProcessArgs,
}

// @struct: Custom logger implementation
struct CustomLogger {
    level: LevelFilter,
}

impl CustomLogger {
    // @creates: New logger with specified level
    fn new(level: LevelFilter) -> Self {
        CustomLogger { level }
    }

    // @initializes: Global logger
    fn init(level: LevelFilter) -> Result<(), SetLoggerError> {
        let logger = Box::new(CustomLogger::new(level));
        log::set_boxed_logger(logger)?;
        log::set_max_level(level);
        Ok(())
    }

    // @returns: ANSI color and emoji prefix for log level
    fn style_for_level(level: Level) -> (&'static str, &'static str) {
        match level {
            Level::Error => ("\x1B[1;31m", "❌ "),
            Level::Warn => ("\x1B[1;33m", "🚧 "),
            Level::Info => ("\x1B[1;32m", " "),
            Level::Debug => ("\x1B[1;36m", "🔍 "),
            Level::Trace => ("\x1B[1;35m", "📋 "),
        }
    }
}

impl Log for CustomLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        // The effective level is adjusted later through log::set_max_level
        metadata.level() <= self.level.max(log::max_level())
    }

    fn log(&self, record: &Record) {
        if self.enabled(record.metadata()) {
            let now = chrono::Local::now().format("%H:%M:%S.%3f");
            let (color, emoji) = Self::style_for_level(record.level());
            let mut stderr = std::io::stderr();
            let _ = writeln!(stderr, "{}{} {} {}\x1B[0m", color, now, emoji, record.args());
        }
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    // Info by default; config or CLI may change the level afterwards
    CustomLogger::init(LevelFilter::Info)?;

    let cli = CommandLineOptions::parse();

    match cli.command {
        Some(Commands::Completions { shell }) => {
            let mut cmd = CommandLineOptions::command();
            generate(shell, &mut cmd, "lyricsync", &mut std::io::stdout());
            Ok(())
        }
        Some(Commands::Process(args)) => run_process(args).await,
        None => run_process(cli.process).await,
    }
}

async fn run_process(options: ProcessArgs) -> Result<()> {
    let input_path = options
        .input_path
        .clone()
        .ok_or_else(|| anyhow!("INPUT_PATH is required when no subcommand is specified"))?;

    // If log level is set via command line, apply it immediately
    if let Some(cmd_log_level) = &options.log_level {
        let level: app_config::LogLevel = cmd_log_level.clone().into();
        log::set_max_level(level.to_level_filter());
    }

    let mut config = Config::load_or_create(&options.config_path)?;
    apply_overrides(&mut config, &options);

    if options.log_level.is_none() {
        log::set_max_level(config.log_level.to_level_filter());
    }

    let controller = Controller::with_config(config)?;

    if input_path.is_file() {
        let job = single_file_job(&controller, &input_path, &options)?;
        match controller.run(job, options.force_overwrite).await? {
            FileOutcome::Processed(report) => {
                info!("Lyrics: {} ({} lines)", report.lyric_path.display(), report.lyric_lines);
                info!("Done in {}", Controller::format_duration(report.elapsed));
            }
            FileOutcome::Skipped(reason) => info!("Nothing to do: {}", reason),
        }
        Ok(())
    } else if input_path.is_dir() {
        let output_dir = options.output.clone().unwrap_or_else(|| input_path.clone());
        let summary = controller
            .run_folder(input_path, output_dir, options.force_overwrite)
            .await?;
        if summary.failed_count() > 0 {
            return Err(anyhow!("{} file(s) failed, see the log above", summary.failed_count()));
        }
        Ok(())
    } else {
        Err(anyhow!("Input path does not exist: {:?}", input_path))
    }
}

fn apply_overrides(config: &mut Config, options: &ProcessArgs) {
    if let Some(mode) = &options.mode {
        config.processing.mode = mode.clone().into();
    }
    if let Some(fade_ms) = options.fade_ms {
        config.processing.fade_duration_ms = fade_ms;
    }
    if let Some(factor) = options.speed_factor {
        config.processing.speed_factor = factor;
    }
    if let Some(jobs) = options.jobs {
        config.batch.concurrent_files = jobs;
    }
    if let Some(log_level) = &options.log_level {
        config.log_level = log_level.clone().into();
    }
}

fn single_file_job(controller: &Controller, media: &Path, options: &ProcessArgs) -> Result<FileJob> {
    let media = media.to_path_buf();
    let parent = media.parent().unwrap_or(Path::new(".")).to_path_buf();
    let default_job = controller.job_for_media(&media, &parent);

    let subtitle_path = options.subtitle_path.clone().unwrap_or(default_job.subtitle_path);
    let audio_output = options.output.clone().unwrap_or(default_job.audio_output);

    if audio_output == media || FileManager::lyric_path_for(&audio_output) == subtitle_path {
        return Err(anyhow!(
            "Output {:?} would overwrite an input file, choose another path with -o",
            audio_output
        ));
    }

    Ok(FileJob::new(media, subtitle_path, audio_output))
}
