/*!
 * Controller tests running the full per-file and per-folder flow with a mock codec
 */

use anyhow::Result;
use std::fs;
use std::sync::Arc;
use std::time::Duration;
use lyricsync::app_config::Config;
use lyricsync::app_controller::{Controller, FileJob, FileOutcome};
use lyricsync::timeline::ProcessingMode;
use crate::common::{self, mock_codec::MockCodec};

fn controller_with(codec: MockCodec, config: Config) -> Result<Controller> {
    common::init_test_logging();
    Controller::with_codec(config, Arc::new(codec))
}

/// Test processing a single file end to end
#[tokio::test]
async fn test_run_withValidFile_shouldWriteAudioAndLyrics() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let media = common::create_test_file(dir, "movie.mkv", "video")?;
    common::create_test_subtitle(dir, "movie.ja.srt")?;

    let codec = MockCodec::new(common::indexed_buffer(5000));
    let tracker = codec.tracker();
    let controller = controller_with(codec, Config::default())?;
    let job = controller.job_for_media(&media, dir);
    assert_eq!(job.subtitle_path, dir.join("movie.ja.srt"));
    assert_eq!(job.audio_output, dir.join("movie.mp3"));

    let outcome = controller.run(job, false).await?;

    let report = match outcome {
        FileOutcome::Processed(report) => report,
        FileOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    };
    assert_eq!(report.input_duration_ms, 5000);
    assert_eq!(report.output_duration_ms, 1500);
    assert_eq!(report.lyric_lines, 2);
    assert!(report.dropped_entries.is_empty());

    assert_eq!(fs::read_to_string(dir.join("movie.lrc"))?, "[00:00.00] a\n[00:00.50] b\n");
    assert_eq!(fs::read(dir.join("movie.mp3"))?.len(), 1500 * 2);

    let tracker = tracker.lock().unwrap();
    assert_eq!(tracker.decoded, vec![media]);
    assert_eq!(tracker.encoded, vec![(dir.join("movie.mp3"), 1500)]);
    Ok(())
}

/// Test that the configured mode is applied
#[tokio::test]
async fn test_run_withSpeedMode_shouldKeepCompressedGaps() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let media = common::create_test_file(dir, "movie.mkv", "video")?;
    common::create_test_subtitle(dir, "movie.ja.srt")?;

    let mut config = Config::default();
    config.processing.mode = ProcessingMode::Speed;
    config.processing.speed_factor = 2.0;
    let controller = controller_with(MockCodec::new(common::indexed_buffer(5000)), config)?;

    let job = FileJob::new(media, dir.join("movie.ja.srt"), dir.join("out").join("speed.wav"));
    let outcome = controller.run(job, false).await?;

    match outcome {
        FileOutcome::Processed(report) => assert_eq!(report.output_duration_ms, 500 + 1500 + 1250),
        FileOutcome::Skipped(reason) => panic!("unexpected skip: {}", reason),
    }
    assert_eq!(
        fs::read_to_string(dir.join("out").join("speed.lrc"))?,
        "[00:00.50] a\n[00:01.00] b\n"
    );
    Ok(())
}

/// Test that existing outputs are kept unless forced
#[tokio::test]
async fn test_run_withExistingOutput_shouldSkipUnlessForced() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let media = common::create_test_file(dir, "movie.mkv", "video")?;
    common::create_test_subtitle(dir, "movie.ja.srt")?;
    common::create_test_file(dir, "movie.lrc", "old lyrics")?;

    let codec = MockCodec::new(common::indexed_buffer(5000));
    let tracker = codec.tracker();
    let controller = controller_with(codec, Config::default())?;

    let skipped = controller.run(controller.job_for_media(&media, dir), false).await?;
    assert!(matches!(skipped, FileOutcome::Skipped(_)));
    assert_eq!(fs::read_to_string(dir.join("movie.lrc"))?, "old lyrics");
    assert!(tracker.lock().unwrap().decoded.is_empty());

    let forced = controller.run(controller.job_for_media(&media, dir), true).await?;
    assert!(matches!(forced, FileOutcome::Processed(_)));
    assert_eq!(fs::read_to_string(dir.join("movie.lrc"))?, "[00:00.00] a\n[00:00.50] b\n");
    Ok(())
}

/// Test that a missing subtitle file is an error for a single file
#[tokio::test]
async fn test_run_withMissingSubtitle_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let media = common::create_test_file(dir, "movie.mkv", "video")?;

    let controller = controller_with(MockCodec::new(common::indexed_buffer(1000)), Config::default())?;
    let result = controller.run(controller.job_for_media(&media, dir), false).await;

    assert!(result.is_err());
    assert!(!dir.join("movie.mp3").exists());
    assert!(!dir.join("movie.lrc").exists());
    Ok(())
}

/// Test that a malformed subtitle file stops the file before decoding
#[tokio::test]
async fn test_run_withMalformedSubtitle_shouldFailBeforeDecoding() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let media = common::create_test_file(dir, "movie.mkv", "video")?;
    common::create_test_file(dir, "movie.ja.srt", "1\nnot a timing line\ntext\n")?;

    let codec = MockCodec::new(common::indexed_buffer(1000));
    let tracker = codec.tracker();
    let controller = controller_with(codec, Config::default())?;

    let error = controller.run(controller.job_for_media(&media, dir), false).await.unwrap_err();
    assert!(format!("{:#}", error).contains("line 2"));
    assert!(tracker.lock().unwrap().decoded.is_empty());
    Ok(())
}

/// Test that a subtitle given as media input is rejected
#[tokio::test]
async fn test_run_withSubtitleAsMedia_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let srt = common::create_test_subtitle(dir, "movie.ja.srt")?;

    let controller = controller_with(MockCodec::new(common::indexed_buffer(1000)), Config::default())?;
    let job = FileJob::new(srt.clone(), srt, dir.join("movie.mp3"));
    assert!(controller.run(job, false).await.is_err());
    Ok(())
}

/// Test that a directory given as single-file media input is rejected before decoding
#[tokio::test]
async fn test_run_withDirectoryAsMedia_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    let media = dir.join("movie.mkv");
    fs::create_dir(&media)?;
    let srt = common::create_test_subtitle(dir, "movie.ja.srt")?;

    let codec = MockCodec::new(common::indexed_buffer(1000));
    let tracker = codec.tracker();
    let controller = controller_with(codec, Config::default())?;
    let job = FileJob::new(media, srt, dir.join("movie.mp3"));

    let error = controller.run(job, false).await.unwrap_err();
    assert!(error.to_string().contains("does not exist"));
    assert!(tracker.lock().unwrap().decoded.is_empty());
    Ok(())
}

/// Test that an invalid configuration is refused
#[test]
fn test_with_codec_withInvalidConfig_shouldFail() {
    let mut config = Config::default();
    config.batch.concurrent_files = 0;
    assert!(controller_with(MockCodec::new(common::indexed_buffer(10)), config).is_err());
}

/// Test folder processing with per-file isolation
#[tokio::test]
async fn test_run_folder_withMixedFiles_shouldIsolateFailures() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let input = temp_dir.path().join("videos");
    let output = temp_dir.path().join("audio");
    fs::create_dir(&input)?;

    common::create_test_file(&input, "ep01.mkv", "video")?;
    common::create_test_subtitle(&input, "ep01.ja.srt")?;
    common::create_test_file(&input, "ep02.mkv", "video")?;
    common::create_test_subtitle(&input, "ep02.ja.srt")?;
    common::create_test_file(&input, "ep03.mkv", "video")?;
    common::create_test_file(&input, "notes.txt", "ignored")?;

    let mut config = Config::default();
    config.batch.concurrent_files = 2;
    let codec = MockCodec::new(common::indexed_buffer(5000)).fail_on("ep02.mkv");
    let controller = controller_with(codec, config)?;

    let summary = controller.run_folder(input.clone(), output.clone(), false).await?;

    assert_eq!(summary.processed, 1);
    assert_eq!(summary.skipped, 1);
    assert_eq!(summary.failed_count(), 1);
    assert_eq!(summary.failed[0].0, input.join("ep02.mkv"));

    assert!(output.join("ep01.mp3").exists());
    assert_eq!(fs::read_to_string(output.join("ep01.lrc"))?, "[00:00.00] a\n[00:00.50] b\n");
    assert!(!output.join("ep02.lrc").exists());
    assert!(!output.join("ep03.lrc").exists());

    let log = fs::read_to_string(output.join("lyricsync.log"))?;
    assert!(log.contains("1 processed, 1 skipped, 1 errors"));
    assert!(log.contains("FAILED"));
    Ok(())
}

/// Test that a second folder run skips files already done
#[tokio::test]
async fn test_run_folder_withPreviousRun_shouldSkipDoneFiles() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    let dir = temp_dir.path();
    common::create_test_file(dir, "ep01.mkv", "video")?;
    common::create_test_subtitle(dir, "ep01.ja.srt")?;

    let controller = controller_with(MockCodec::new(common::indexed_buffer(5000)), Config::default())?;

    let first = controller.run_folder(dir.to_path_buf(), dir.to_path_buf(), false).await?;
    assert_eq!(first.processed, 1);

    let second = controller.run_folder(dir.to_path_buf(), dir.to_path_buf(), false).await?;
    assert_eq!(second.processed, 0);
    assert_eq!(second.skipped, 1);
    Ok(())
}

/// Test that a folder without media files is an error
#[test]
fn test_run_folder_withNoMedia_shouldFail() -> Result<()> {
    let temp_dir = common::create_temp_dir()?;
    common::create_test_subtitle(temp_dir.path(), "lonely.ja.srt")?;

    let controller = controller_with(MockCodec::new(common::indexed_buffer(10)), Config::default())?;
    let result = tokio_test::block_on(controller.run_folder(
        temp_dir.path().to_path_buf(),
        temp_dir.path().join("out"),
        false,
    ));
    assert!(result.is_err());
    Ok(())
}

/// Test human-readable durations
#[test]
fn test_format_duration_withVariousDurations_shouldFormat() {
    assert_eq!(Controller::format_duration(Duration::from_millis(1_250)), "1.250s");
    assert_eq!(Controller::format_duration(Duration::from_secs(75)), "1m 15s");
    assert_eq!(Controller::format_duration(Duration::from_secs(3_725)), "1h 2m 5s");
}
