/*!
 * Tests for per-mode segment transformation and output reassembly
 */

use lyricsync::errors::TimelineError;
use lyricsync::timeline::{
    segment_timeline, transform_segments, FadeStrategy, MergedInterval, OutputBuilder, ProcessingMode,
    RemoveStrategy, RetainedMapping, Segment, SegmentStrategy, SpeedStrategy,
};
use crate::common::{self, TEST_AMPLITUDE, TEST_RATE};

fn merged(start_ms: u64, end_ms: u64) -> MergedInterval {
    MergedInterval { start_ms, end_ms }
}

/// Test remove mode keeps only dialogue, in order
#[test]
fn test_remove_strategy_withOneInterval_shouldKeepDialogueOnly() {
    let audio = common::indexed_buffer(5000);
    let segments = segment_timeline(&[merged(1000, 2500)], 5000);

    let output = transform_segments(&audio, &segments, &RemoveStrategy).unwrap();

    assert_eq!(output.duration_ms, 1500);
    assert_eq!(output.audio.duration_ms(), 1500);
    assert_eq!(output.audio.samples()[0], 1000);
    assert_eq!(output.audio.samples()[1499], 2499);
    assert_eq!(
        output.mappings,
        vec![RetainedMapping {
            original_start_ms: 1000,
            original_end_ms: 2500,
            processed_start_ms: 0,
            processed_end_ms: 1500,
        }]
    );
}

/// Test remove mode places consecutive dialogue back to back
#[test]
fn test_remove_strategy_withTwoIntervals_shouldStackMappings() {
    let audio = common::indexed_buffer(10_000);
    let segments = segment_timeline(&[merged(1000, 2000), merged(5000, 5500)], 10_000);

    let output = transform_segments(&audio, &segments, &RemoveStrategy).unwrap();

    assert_eq!(output.duration_ms, 1500);
    assert_eq!(output.mappings[1].processed_start_ms, 1000);
    assert_eq!(output.mappings[1].processed_end_ms, 1500);
    assert_eq!(output.audio.samples()[1000], 5000);
}

/// Test fade mode drops gaps and softens dialogue edges without changing durations
#[test]
fn test_fade_strategy_withOneInterval_shouldFadeEdges() {
    let audio = common::constant_buffer(5000);
    let segments = segment_timeline(&[merged(1000, 2500)], 5000);

    let output = transform_segments(&audio, &segments, &FadeStrategy::new(200)).unwrap();
    let samples = output.audio.samples();

    assert_eq!(output.duration_ms, 1500);
    assert_eq!(samples.len(), 1500);
    assert_eq!(samples[0], 0);
    assert!(samples[100] < TEST_AMPLITUDE / 100);
    assert_eq!(samples[200], TEST_AMPLITUDE);
    assert_eq!(samples[750], TEST_AMPLITUDE);
    assert_eq!(samples[1299], TEST_AMPLITUDE);
    assert_eq!(samples[1499], 0);
    assert_eq!(output.mappings[0].processed_start_ms, 0);
}

/// Test speed mode keeps gaps time-compressed
#[test]
fn test_speed_strategy_withOneInterval_shouldCompressGaps() {
    let audio = common::indexed_buffer(5000);
    let segments = segment_timeline(&[merged(1000, 2500)], 5000);
    let strategy = SpeedStrategy::new(2.0).unwrap();

    let output = transform_segments(&audio, &segments, &strategy).unwrap();

    // 500 ms + 1500 ms + 1250 ms
    assert_eq!(output.duration_ms, 3250);
    assert_eq!(output.audio.duration_ms(), 3250);
    assert_eq!(output.mappings[0].processed_start_ms, 500);
    assert_eq!(output.mappings[0].processed_end_ms, 2000);
    assert_eq!(output.audio.samples()[500], 1000);
}

/// Test the default speed factor rounds gap lengths down
#[test]
fn test_speed_strategy_withFactorThree_shouldFloorFrames() {
    let audio = common::indexed_buffer(3000);
    let segments = segment_timeline(&[merged(1000, 2000)], 3000);
    let strategy = ProcessingMode::Speed.strategy(200, 3.0).unwrap();

    let output = transform_segments(&audio, &segments, strategy.as_ref()).unwrap();

    assert_eq!(output.mappings[0].processed_start_ms, 333);
    assert_eq!(output.duration_ms, 333 + 1000 + 333);
}

/// Test that dialogue segments never change duration in any mode
#[test]
fn test_strategies_withDialogueSegment_shouldPreserveDuration() {
    let audio = common::constant_buffer(4000);
    let segment = Segment::dialogue(500, 1700, merged(500, 1700));
    let strategies: Vec<Box<dyn SegmentStrategy>> = vec![
        Box::new(RemoveStrategy),
        Box::new(FadeStrategy::new(300)),
        Box::new(SpeedStrategy::new(4.0).unwrap()),
    ];

    for strategy in &strategies {
        assert_eq!(strategy.transform_dialogue(&audio, &segment).duration_ms(), 1200);
    }
}

/// Test the output cursor with an explicit builder
#[test]
fn test_output_builder_withMixedChunks_shouldAdvanceCursor() {
    let audio = common::constant_buffer(3000);
    let mut builder = OutputBuilder::new(TEST_RATE, 1);

    builder.push_gap(audio.slice_ms(0, 250));
    assert_eq!(builder.cursor_ms(), 250);

    let dialogue = Segment::dialogue(1000, 2000, merged(1000, 2000));
    builder.push_dialogue(&dialogue, audio.slice_ms(1000, 2000));
    assert_eq!(builder.cursor_ms(), 1250);

    let output = builder.finish().unwrap();
    assert_eq!(output.duration_ms, 1250);
    assert_eq!(output.mappings[0].processed_start_ms, 250);
    assert_eq!(output.mappings[0].original_start_ms, 1000);
}

/// Test that the cursor follows the appended frames when a millisecond is not a whole number of frames
#[test]
fn test_output_builder_withFractionalFramesPerMs_shouldMatchAudioLength() {
    let audio = common::indexed_buffer_at(44_100, 60_000);
    let speed = SpeedStrategy::new(3.0).unwrap();
    let mut builder = OutputBuilder::new(44_100, 1);

    for i in 0..30u64 {
        let gap_start = i * 2000;
        let gap = Segment::gap(gap_start, gap_start + 1001);
        builder.push_gap(speed.transform_gap(&audio, &gap).unwrap());

        let dialogue = Segment::dialogue(gap_start + 1001, gap_start + 2000, merged(gap_start + 1001, gap_start + 2000));
        builder.push_dialogue(&dialogue, speed.transform_dialogue(&audio, &dialogue));
    }

    let cursor_ms = builder.cursor_ms();
    let output = builder.finish().unwrap();
    assert_eq!(output.duration_ms, cursor_ms);
    assert_eq!(output.duration_ms, output.audio.duration_ms());
    assert_eq!(output.mappings.last().unwrap().processed_end_ms, output.audio.duration_ms());
}

/// Test that a clipped interval keeps its unclipped original bounds
#[test]
fn test_transform_withClippedInterval_shouldMapOriginalBounds() {
    let audio = common::constant_buffer(5000);
    let segments = segment_timeline(&[merged(4000, 7000)], 5000);

    let output = transform_segments(&audio, &segments, &RemoveStrategy).unwrap();

    assert_eq!(output.duration_ms, 1000);
    assert_eq!(output.mappings[0].original_end_ms, 7000);
    assert_eq!(output.mappings[0].processed_end_ms, 1000);
}

/// Test mode parsing and serialization
#[test]
fn test_processing_mode_withNames_shouldParseAndSerialize() {
    assert_eq!("remove".parse::<ProcessingMode>().unwrap(), ProcessingMode::Remove);
    assert_eq!(" SPEED ".parse::<ProcessingMode>().unwrap(), ProcessingMode::Speed);
    assert!(matches!("slow".parse::<ProcessingMode>(), Err(TimelineError::UnknownMode(_))));

    assert_eq!(ProcessingMode::default(), ProcessingMode::Remove);
    assert_eq!(ProcessingMode::Fade.to_string(), "fade");
    assert_eq!(serde_json::to_string(&ProcessingMode::Speed).unwrap(), "\"speed\"");
    let parsed: ProcessingMode = serde_json::from_str("\"fade\"").unwrap();
    assert_eq!(parsed, ProcessingMode::Fade);
}

/// Test invalid speed factors
#[test]
fn test_speed_strategy_withInvalidFactor_shouldFail() {
    assert_eq!(SpeedStrategy::new(-2.0).unwrap_err(), TimelineError::InvalidSpeedFactor(-2.0));
    assert!(SpeedStrategy::new(f64::INFINITY).is_err());
    assert_eq!(SpeedStrategy::new(1.5).unwrap().factor(), 1.5);
}
