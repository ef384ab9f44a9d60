use serde::{Deserialize, Serialize};

use crate::constants::SUB_FRAME_SAMPLES;
use crate::energy::frame_dbfs;
use crate::VoiceDetector;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GateConfig {
    /// Frames quieter than this are discarded before any classification.
    pub min_dbfs: f32,
    /// Minimum fraction of sub-frames classified as speech.
    pub voice_ratio: f32,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            min_dbfs: -35.0,
            voice_ratio: 0.4,
        }
    }
}

/// Verdict for a single frame. Anything other than `Pass` is discarded by
/// the pipeline.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GateDecision {
    Pass,
    TooQuiet,
    NoVoice,
}

impl GateDecision {
    pub fn is_pass(self) -> bool {
        self == GateDecision::Pass
    }
}

/// Loudness + voice-presence filter applied to capture blocks and, again,
/// to outgoing stream chunks.
///
/// Loudness is checked over the whole frame; voice presence over consecutive
/// 20 ms sub-frames, a trailing partial sub-frame is ignored.
pub struct FrameGate<D: VoiceDetector> {
    config: GateConfig,
    detector: D,
}

impl<D: VoiceDetector> FrameGate<D> {
    pub fn new(config: GateConfig, detector: D) -> Self {
        Self { config, detector }
    }

    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    pub fn check(&mut self, frame: &[i16]) -> GateDecision {
        if frame_dbfs(frame) < self.config.min_dbfs {
            return GateDecision::TooQuiet;
        }
        if !self.has_speech(frame) {
            return GateDecision::NoVoice;
        }
        GateDecision::Pass
    }

    fn has_speech(&mut self, frame: &[i16]) -> bool {
        let mut speech = 0usize;
        let mut total = 0usize;

        for sub_frame in frame.chunks_exact(SUB_FRAME_SAMPLES) {
            total += 1;
            match self.detector.is_speech(sub_frame) {
                Ok(true) => speech += 1,
                Ok(false) => {}
                Err(e) => {
                    // A classifier hiccup counts as non-speech; the frame is
                    // still judged on its remaining sub-frames.
                    tracing::debug!("voice classifier error: {}", e);
                }
            }
        }

        total > 0 && (speech as f32 / total as f32) >= self.config.voice_ratio
    }
}
