use std::sync::atomic::Ordering;
use std::sync::Arc;

use tracing::{debug, info, warn};
use wakegate_foundation::clock::SharedClock;
use wakegate_stt::Transcriber;
use wakegate_telemetry::PipelineMetrics;
use wakegate_vad::{FrameGate, GateDecision, VoiceDetector};

use crate::config::KwsConfig;
use crate::session::{Session, SessionSignal};
use crate::vocab::{TokenWindow, Vocabulary};

/// Domain event produced by the engine; the transport layer turns these
/// into wire messages.
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    /// A session opened. Carries chunk number 0 on the wire.
    Started,
    /// End requested; the session keeps streaming until confirmed.
    EndRequested { chunk_number: u32 },
    /// One second of session audio that survived the re-gate.
    Chunk { chunk_number: u32, pcm: Vec<i16> },
}

/// Inbound command from the control topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControlCommand {
    /// The remote consumer acknowledged the end request; tear down local
    /// session state.
    ConfirmEnd,
}

/// Per-block processing pipeline: frame gate -> session buffer ->
/// recognizer -> token window -> session transitions -> chunk drain.
///
/// One engine instance is owned by one thread; every piece of session
/// state lives here and nowhere else.
pub struct KwsEngine<D: VoiceDetector, T: Transcriber> {
    config: KwsConfig,
    vocab: Vocabulary,
    gate: FrameGate<D>,
    transcriber: T,
    window: TokenWindow,
    session: Session,
    clock: SharedClock,
    metrics: Option<Arc<PipelineMetrics>>,
}

impl<D: VoiceDetector, T: Transcriber> KwsEngine<D, T> {
    pub fn new(
        config: KwsConfig,
        vocab: Vocabulary,
        gate: FrameGate<D>,
        transcriber: T,
        clock: SharedClock,
    ) -> Self {
        let window = TokenWindow::new(config.window);
        Self {
            config,
            vocab,
            gate,
            transcriber,
            window,
            session: Session::new(),
            clock,
            metrics: None,
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<PipelineMetrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run one capture block through the whole pipeline and return the
    /// events it produced, in emission order.
    pub fn process_block(&mut self, block: &[i16]) -> Vec<SessionEvent> {
        let mut events = Vec::new();

        match self.gate.check(block) {
            GateDecision::TooQuiet => {
                if let Some(m) = &self.metrics {
                    m.gate_rejected_loudness.fetch_add(1, Ordering::Relaxed);
                }
                return events;
            }
            GateDecision::NoVoice => {
                if let Some(m) = &self.metrics {
                    m.gate_rejected_voice.fetch_add(1, Ordering::Relaxed);
                }
                return events;
            }
            GateDecision::Pass => {
                if let Some(m) = &self.metrics {
                    m.gate_passed.fetch_add(1, Ordering::Relaxed);
                    m.mark_stage_active(wakegate_telemetry::PipelineStage::Gate);
                }
            }
        }

        self.session.append_audio(block);

        match self.transcriber.accept_pcm16(block) {
            Ok(Some(text)) => self.handle_final_text(&text, &mut events),
            Ok(None) => {}
            Err(e) => {
                if let Some(m) = &self.metrics {
                    m.stt_errors.fetch_add(1, Ordering::Relaxed);
                }
                warn!(target: "kws", "recognizer error, block discarded: {}", e);
            }
        }

        self.drain_chunks(&mut events);

        if let Some(m) = &self.metrics {
            m.buffered_samples
                .store(self.session.buffered_samples(), Ordering::Relaxed);
        }

        events
    }

    fn handle_final_text(&mut self, text: &str, events: &mut Vec<SessionEvent>) {
        let text = text.trim();
        if text.is_empty() {
            if let Some(m) = &self.metrics {
                m.empty_results.fetch_add(1, Ordering::Relaxed);
            }
            return;
        }

        if let Some(m) = &self.metrics {
            m.utterances_finalized.fetch_add(1, Ordering::Relaxed);
            m.mark_stage_active(wakegate_telemetry::PipelineStage::Recognize);
        }

        let hits = self.window.push_text(text, &self.vocab);
        let now = self.clock.now();

        if self.session.is_active() {
            debug!(target: "kws", "[active] '{}' start={} end={}", text, hits.start, hits.end);
        } else {
            debug!(target: "kws", "[idle] '{}' start={}", text, hits.start);
        }

        match self.session.observe_hits(hits, now, &self.config) {
            Some(SessionSignal::Started) => {
                // Start effects are one unit: the session cleared its buffer
                // and counter, the window clears here, still on this thread.
                self.window.clear();
                if let Some(m) = &self.metrics {
                    m.mark_session_start(now);
                }
                info!(target: "kws", "session started");
                events.push(SessionEvent::Started);
            }
            Some(SessionSignal::EndRequested { chunk_number }) => {
                if let Some(m) = &self.metrics {
                    m.session_end_requests.fetch_add(1, Ordering::Relaxed);
                }
                info!(target: "kws", chunk_number, "session end requested, awaiting confirmation");
                events.push(SessionEvent::EndRequested { chunk_number });
            }
            None => {}
        }
    }

    fn drain_chunks(&mut self, events: &mut Vec<SessionEvent>) {
        while let Some(slice) = self.session.take_chunk(self.config.chunk_samples) {
            if !self.gate.check(&slice).is_pass() {
                // Intentionally lossy: a slice that fails the re-gate is
                // noise, not session audio. It is dropped, not re-buffered.
                if let Some(m) = &self.metrics {
                    m.chunks_dropped.fetch_add(1, Ordering::Relaxed);
                }
                debug!(target: "kws", "stream chunk failed re-gate, dropped");
                continue;
            }

            let now = self.clock.now();
            let chunk_number = self.session.record_chunk(now);
            if let Some(m) = &self.metrics {
                m.chunks_emitted.fetch_add(1, Ordering::Relaxed);
                m.mark_stage_active(wakegate_telemetry::PipelineStage::Stream);
            }
            events.push(SessionEvent::Chunk {
                chunk_number,
                pcm: slice,
            });
        }
    }

    /// Handle an inbound control command. Runs on the engine thread; the
    /// transport only forwards commands through a channel.
    pub fn handle_control(&mut self, command: ControlCommand) {
        match command {
            ControlCommand::ConfirmEnd => {
                if self.session.is_active() {
                    info!(target: "kws", "session end confirmed, audio stream closed");
                } else {
                    debug!(target: "kws", "end confirmation while idle, state cleared");
                }
                self.window.clear();
                self.session.confirm_end();
                if let Some(m) = &self.metrics {
                    m.mark_session_confirm();
                }
            }
        }
    }
}
