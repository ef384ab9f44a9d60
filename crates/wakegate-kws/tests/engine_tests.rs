//! End-to-end engine tests with scripted recognizer and classifier doubles.
//!
//! Time is driven by the virtual clock, so cooldown behavior is exact.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use wakegate_foundation::clock::{test_clock, SharedClock, TestClock};
use wakegate_kws::{ControlCommand, KwsConfig, KwsEngine, SessionEvent, Vocabulary};
use wakegate_stt::{SttError, Transcriber};
use wakegate_vad::{FrameGate, GateConfig, VadError, VoiceDetector, SUB_FRAME_SAMPLES};

/// Classifier double: answers from a script, repeating the last answer.
struct ScriptedDetector {
    answers: Vec<bool>,
    next: usize,
}

impl ScriptedDetector {
    fn always_speech() -> Self {
        Self {
            answers: vec![true],
            next: 0,
        }
    }

    fn script(answers: Vec<bool>) -> Self {
        Self { answers, next: 0 }
    }
}

impl VoiceDetector for ScriptedDetector {
    fn is_speech(&mut self, _sub_frame: &[i16]) -> Result<bool, VadError> {
        let answer = *self
            .answers
            .get(self.next)
            .or(self.answers.last())
            .unwrap_or(&false);
        self.next += 1;
        Ok(answer)
    }
}

/// Recognizer double: yields one scripted result per accepted block.
struct ScriptedTranscriber {
    results: VecDeque<Option<String>>,
}

impl ScriptedTranscriber {
    fn new<const N: usize>(results: [Option<&str>; N]) -> Self {
        Self {
            results: results.into_iter().map(|r| r.map(String::from)).collect(),
        }
    }

    fn silent() -> Self {
        Self {
            results: VecDeque::new(),
        }
    }
}

impl Transcriber for ScriptedTranscriber {
    fn accept_pcm16(&mut self, _pcm: &[i16]) -> Result<Option<String>, SttError> {
        Ok(self.results.pop_front().flatten())
    }

    fn finalize(&mut self) -> Result<Option<String>, SttError> {
        Ok(None)
    }
}

/// A block loud enough to clear the -35 dBFS gate.
fn loud_block(sub_frames: usize) -> Vec<i16> {
    (0..sub_frames * SUB_FRAME_SAMPLES)
        .map(|i| if i % 2 == 0 { 12000 } else { -12000 })
        .collect()
}

fn test_config() -> KwsConfig {
    KwsConfig {
        chunk_samples: SUB_FRAME_SAMPLES,
        ..KwsConfig::default()
    }
}

fn engine_with(
    config: KwsConfig,
    detector: ScriptedDetector,
    transcriber: ScriptedTranscriber,
) -> (
    KwsEngine<ScriptedDetector, ScriptedTranscriber>,
    Arc<TestClock>,
) {
    let clock = test_clock();
    let shared: SharedClock = clock.clone();
    let gate = FrameGate::new(GateConfig::default(), detector);
    let engine = KwsEngine::new(
        config,
        Vocabulary::default_command_set(),
        gate,
        transcriber,
        shared,
    );
    (engine, clock)
}

#[test]
fn one_start_hit_does_not_open_a_session() {
    let (mut engine, _clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai tes")]),
    );

    let events = engine.process_block(&loud_block(1));
    assert!(events.is_empty());
    assert!(!engine.session().is_active());
}

#[test]
fn two_start_hits_open_a_session_with_chunk_zero() {
    let (mut engine, _clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai mu")]),
    );

    let events = engine.process_block(&loud_block(1));
    assert_eq!(events, vec![SessionEvent::Started]);
    assert!(engine.session().is_active());
    assert_eq!(engine.session().chunk_number(), 0);
    // The triggering block's audio was cleared with the start transition.
    assert_eq!(engine.session().buffered_samples(), 0);
}

#[test]
fn start_hits_accumulate_across_utterances() {
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai tes"), Some("mu")]),
    );

    assert!(engine.process_block(&loud_block(1)).is_empty());
    clock.advance(Duration::from_millis(100));
    // Window is now [mulai, tes, mu]: two start hits.
    let events = engine.process_block(&loud_block(1));
    assert_eq!(events, vec![SessionEvent::Started]);
}

#[test]
fn quiet_blocks_never_reach_the_recognizer() {
    let (mut engine, _clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai mu")]),
    );

    let quiet = vec![3i16; SUB_FRAME_SAMPLES];
    let events = engine.process_block(&quiet);
    assert!(events.is_empty());
    assert!(!engine.session().is_active());
}

#[test]
fn chunk_numbers_increase_from_one() {
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai mu")]),
    );

    engine.process_block(&loud_block(1));
    clock.advance(Duration::from_millis(50));

    let mut numbers = Vec::new();
    for _ in 0..3 {
        for event in engine.process_block(&loud_block(1)) {
            if let SessionEvent::Chunk { chunk_number, pcm } = event {
                assert_eq!(pcm.len(), SUB_FRAME_SAMPLES);
                numbers.push(chunk_number);
            }
        }
    }
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn partial_chunk_is_retained_in_buffer() {
    // One and a half chunks buffered: exactly one chunk out, the remainder
    // stays put.
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai mu")]),
    );

    engine.process_block(&loud_block(1));
    clock.advance(Duration::from_millis(50));

    // 480 samples against a 320-sample chunk size.
    let mut block = loud_block(1);
    block.extend_from_slice(&loud_block(1)[..SUB_FRAME_SAMPLES / 2]);
    let events = engine.process_block(&block);

    let chunks: Vec<_> = events
        .iter()
        .filter(|e| matches!(e, SessionEvent::Chunk { .. }))
        .collect();
    assert_eq!(chunks.len(), 1);
    assert_eq!(engine.session().buffered_samples(), SUB_FRAME_SAMPLES / 2);
}

#[test]
fn slice_failing_regate_is_dropped_not_rebuffered() {
    // Script: block gate pass, slice re-gate fail, then block pass and
    // slice pass.
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::script(vec![true, true, false, true, true]),
        ScriptedTranscriber::new([Some("mulai mu")]),
    );

    engine.process_block(&loud_block(1));
    clock.advance(Duration::from_millis(50));

    let events = engine.process_block(&loud_block(1));
    assert!(events.is_empty());
    assert_eq!(engine.session().chunk_number(), 0);
    assert_eq!(engine.session().buffered_samples(), 0);

    let events = engine.process_block(&loud_block(1));
    assert_eq!(
        events
            .iter()
            .filter(|e| matches!(e, SessionEvent::Chunk { chunk_number: 1, .. }))
            .count(),
        1
    );
}

#[test]
fn end_request_needs_cooldown_after_start() {
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai mu"), Some("selesai sel se sai")]),
    );

    engine.process_block(&loud_block(1));
    // Inside the cooldown window: no end event despite four end hits.
    clock.advance(Duration::from_millis(400));
    let events = engine.process_block(&loud_block(1));
    assert!(!events
        .iter()
        .any(|e| matches!(e, SessionEvent::EndRequested { .. })));
    assert!(engine.session().is_active());
}

#[test]
fn double_end_within_cooldown_emits_once() {
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([
            Some("mulai mu"),
            Some("selesai sel se sai"),
            Some("selesai sel se sai"),
        ]),
    );

    engine.process_block(&loud_block(1));
    clock.advance(Duration::from_millis(900));

    let first = engine.process_block(&loud_block(1));
    assert!(first
        .iter()
        .any(|e| matches!(e, SessionEvent::EndRequested { .. })));

    clock.advance(Duration::from_millis(100));
    let second = engine.process_block(&loud_block(1));
    assert!(!second
        .iter()
        .any(|e| matches!(e, SessionEvent::EndRequested { .. })));
}

#[test]
fn end_request_reports_current_chunk_number() {
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([
            Some("mulai mu"),
            None,
            None,
            Some("selesai sel se sai"),
        ]),
    );

    engine.process_block(&loud_block(1));
    clock.advance(Duration::from_millis(900));
    engine.process_block(&loud_block(1));
    engine.process_block(&loud_block(1));

    let events = engine.process_block(&loud_block(1));
    assert!(events
        .iter()
        .any(|e| matches!(e, SessionEvent::EndRequested { chunk_number: 2 })));
}

#[test]
fn confirm_end_returns_to_idle_and_zeroes_counter() {
    let (mut engine, clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("mulai mu")]),
    );

    engine.process_block(&loud_block(1));
    clock.advance(Duration::from_millis(50));
    engine.process_block(&loud_block(1));
    assert_eq!(engine.session().chunk_number(), 1);

    engine.handle_control(ControlCommand::ConfirmEnd);
    assert!(!engine.session().is_active());
    assert!(!engine.session().is_streaming());
    assert_eq!(engine.session().chunk_number(), 0);
    assert_eq!(engine.session().buffered_samples(), 0);
}

#[test]
fn confirm_end_while_idle_is_harmless() {
    let (mut engine, _clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::silent(),
    );

    engine.handle_control(ControlCommand::ConfirmEnd);
    assert!(!engine.session().is_active());
}

#[test]
fn blank_recognizer_text_changes_nothing() {
    let (mut engine, _clock) = engine_with(
        test_config(),
        ScriptedDetector::always_speech(),
        ScriptedTranscriber::new([Some("   ")]),
    );

    let events = engine.process_block(&loud_block(1));
    assert!(events.is_empty());
    assert!(!engine.session().is_active());
}
