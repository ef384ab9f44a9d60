use std::time::Instant;

use crate::config::KwsConfig;
use crate::vocab::WindowHits;

/// Signal produced by a window evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionSignal {
    /// The session just opened. Buffer, window and chunk counter were reset
    /// as one unit.
    Started,
    /// End was requested; the session stays active until the remote consumer
    /// confirms, so in-flight audio keeps streaming.
    EndRequested { chunk_number: u32 },
}

/// The one stateful aggregate of the pipeline.
///
/// All mutation happens on the engine thread; the control channel delivers
/// the confirmed-end from the transport without sharing this struct across
/// threads.
#[derive(Debug, Default)]
pub struct Session {
    active: bool,
    streaming: bool,
    start_time: Option<Instant>,
    last_event: Option<Instant>,
    last_chunk_time: Option<Instant>,
    chunk_number: u32,
    audio: Vec<i16>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    pub fn chunk_number(&self) -> u32 {
        self.chunk_number
    }

    pub fn start_time(&self) -> Option<Instant> {
        self.start_time
    }

    pub fn buffered_samples(&self) -> usize {
        self.audio.len()
    }

    /// Evaluate the freshly scored window. Both transitions debounce on the
    /// same `last_event`: hits compare with `>=`, elapsed time strictly
    /// with `>`.
    pub fn observe_hits(
        &mut self,
        hits: WindowHits,
        now: Instant,
        config: &KwsConfig,
    ) -> Option<SessionSignal> {
        let cooled = self
            .last_event
            .map_or(true, |t| now.duration_since(t) > config.cooldown());

        if !self.active {
            if hits.start >= config.start_threshold && cooled {
                self.begin(now);
                return Some(SessionSignal::Started);
            }
        } else if hits.end >= config.end_threshold && cooled {
            self.last_event = Some(now);
            return Some(SessionSignal::EndRequested {
                chunk_number: self.chunk_number,
            });
        }

        None
    }

    fn begin(&mut self, now: Instant) {
        self.active = true;
        self.streaming = true;
        self.start_time = Some(now);
        self.last_event = Some(now);
        self.last_chunk_time = None;
        self.chunk_number = 0;
        self.audio.clear();
    }

    /// Confirmed end from the control topic: the only path back to idle.
    /// `last_event` is deliberately kept so the debounce spans the reset.
    pub fn confirm_end(&mut self) {
        self.active = false;
        self.streaming = false;
        self.start_time = None;
        self.last_chunk_time = None;
        self.chunk_number = 0;
        self.audio.clear();
    }

    /// Buffer gated audio. Audio only accumulates while a session is open;
    /// whatever arrives before the start transition is not part of the
    /// session (the buffer is cleared at start anyway).
    pub fn append_audio(&mut self, pcm: &[i16]) {
        if self.active {
            self.audio.extend_from_slice(pcm);
        }
    }

    /// Remove one chunk-sized slice from the front of the buffer, if
    /// streaming and enough audio is buffered.
    pub fn take_chunk(&mut self, chunk_samples: usize) -> Option<Vec<i16>> {
        if !self.streaming || self.audio.len() < chunk_samples {
            return None;
        }
        Some(self.audio.drain(..chunk_samples).collect())
    }

    /// Account for an emitted chunk; returns its number. Numbers are
    /// strictly increasing from 1 within a session.
    pub fn record_chunk(&mut self, now: Instant) -> u32 {
        self.chunk_number += 1;
        self.last_chunk_time = Some(now);
        self.chunk_number
    }
}
